//! Profile service - builds, saves and clears the hardware profile

use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::hardware::{
    HardwareProfile, HardwareResolver, OsFamily, ProfileRepository, StoredProfile,
    UserPreferences,
};
use crate::domain::DomainError;

/// Raw probe results plus the user's stated preferences
#[derive(Debug, Clone, Default)]
pub struct ProfileInput {
    /// Free-text renderer string; blank means no GPU
    pub gpu_identifier: Option<String>,
    pub system_memory_gb: f64,
    pub cpu_core_count: Option<u32>,
    pub os_family: OsFamily,
    pub preferences: UserPreferences,
    pub detection_errors: Vec<String>,
}

/// Profile service; GPU capacity always comes from the resolver
pub struct ProfileService<R: ProfileRepository> {
    repository: Arc<R>,
    resolver: Option<HardwareResolver>,
}

impl<R: ProfileRepository> ProfileService<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self {
            repository,
            resolver: None,
        }
    }

    /// Needed only to build profiles that name a GPU
    pub fn with_resolver(mut self, resolver: HardwareResolver) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Turn probe input into a profile
    pub fn build(&self, input: ProfileInput) -> Result<HardwareProfile, DomainError> {
        if !input.system_memory_gb.is_finite() || input.system_memory_gb < 0.0 {
            return Err(DomainError::validation(format!(
                "System memory must be a non-negative number of GB, got: {}",
                input.system_memory_gb
            )));
        }

        let mut profile = HardwareProfile::new(input.system_memory_gb)
            .with_os_family(input.os_family)
            .with_preferences(input.preferences);

        if let Some(cores) = input.cpu_core_count {
            profile = profile.with_cpu_cores(cores);
        }

        for error in input.detection_errors {
            profile = profile.with_detection_error(error);
        }

        let identifier = input
            .gpu_identifier
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty());

        if let Some(identifier) = identifier {
            let resolver = self.resolver.as_ref().ok_or_else(|| {
                DomainError::configuration("A GPU was given but no hardware resolver is configured")
            })?;
            let estimate = resolver.resolve(&identifier, Some(input.system_memory_gb));
            profile = profile.with_gpu(identifier, estimate.capacity_gb, estimate.fidelity);
        }

        Ok(profile)
    }

    /// Build and persist a profile, replacing any saved one
    pub fn save(&self, input: ProfileInput) -> Result<StoredProfile, DomainError> {
        let profile = self.build(input)?;

        if !profile.detection_errors.is_empty() {
            warn!(
                errors = profile.detection_errors.len(),
                "Profile saved with detection errors"
            );
        }

        let record = StoredProfile::new(profile);
        self.repository.set(record.clone())?;

        info!(
            gpu = record.profile.gpu_identifier.as_deref().unwrap_or("none"),
            gpu_capacity_gb = record.profile.gpu_capacity_gb.unwrap_or(0.0),
            system_memory_gb = record.profile.system_memory_gb,
            "Saved hardware profile"
        );

        Ok(record)
    }

    pub fn load(&self) -> Result<Option<StoredProfile>, DomainError> {
        self.repository.get()
    }

    pub fn load_required(&self) -> Result<StoredProfile, DomainError> {
        self.repository
            .get()?
            .ok_or_else(|| DomainError::not_found("No hardware profile saved; run `profile set` first"))
    }

    /// Remove the saved profile; absent is not an error
    pub fn clear(&self) -> Result<bool, DomainError> {
        self.repository.clear()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::hardware::{
        DeviceDatabase, DeviceRecord, Fidelity, InMemoryProfileRepository, MockProfileRepository,
    };

    fn resolver() -> HardwareResolver {
        HardwareResolver::new(Arc::new(DeviceDatabase::new(vec![
            DeviceRecord::discrete("NVIDIA", "GeForce RTX 3070", 8.0),
            DeviceRecord::integrated("AMD", "Radeon 890M"),
        ])))
    }

    fn service() -> ProfileService<InMemoryProfileRepository> {
        ProfileService::new(Arc::new(InMemoryProfileRepository::new())).with_resolver(resolver())
    }

    fn input(gpu: Option<&str>, memory: f64) -> ProfileInput {
        ProfileInput {
            gpu_identifier: gpu.map(str::to_string),
            system_memory_gb: memory,
            ..Default::default()
        }
    }

    #[test]
    fn test_build_resolves_gpu() {
        let service = service();
        let profile = service
            .build(input(Some("NVIDIA GeForce RTX 3070"), 16.0))
            .unwrap();

        assert_eq!(profile.gpu_capacity_gb, Some(8.0));
        assert_eq!(profile.gpu_fidelity, Some(Fidelity::MatchedExact));
        assert_eq!(profile.gpu_identifier.as_deref(), Some("NVIDIA GeForce RTX 3070"));
    }

    #[test]
    fn test_build_uses_memory_for_shared_gpu() {
        let service = service();
        let profile = service.build(input(Some("AMD Radeon 890M"), 64.0)).unwrap();
        assert_eq!(profile.gpu_capacity_gb, Some(16.0));
    }

    #[test]
    fn test_blank_identifier_means_no_gpu() {
        let service = service();
        let profile = service.build(input(Some("   "), 16.0)).unwrap();

        assert!(!profile.has_gpu());
        assert!(profile.gpu_identifier.is_none());
    }

    #[test]
    fn test_negative_memory_rejected() {
        let service = service();
        let err = service.build(input(None, -1.0)).unwrap_err();
        assert!(matches!(err, DomainError::Validation { .. }));
    }

    #[test]
    fn test_save_persists_resolved_profile() {
        let mut repo = MockProfileRepository::new();
        repo.expect_set()
            .withf(|record| {
                record.profile.gpu_capacity_gb == Some(8.0) && record.profile.cpu_core_count == Some(8)
            })
            .times(1)
            .returning(|_| Ok(()));

        let service = ProfileService::new(Arc::new(repo)).with_resolver(resolver());
        let mut request = input(Some("NVIDIA GeForce RTX 3070"), 32.0);
        request.cpu_core_count = Some(8);

        let record = service.save(request).unwrap();
        assert_eq!(record.profile.system_memory_gb, 32.0);
    }

    #[test]
    fn test_save_propagates_storage_errors() {
        let mut repo = MockProfileRepository::new();
        repo.expect_set()
            .returning(|_| Err(DomainError::storage("disk full")));

        let service = ProfileService::new(Arc::new(repo)).with_resolver(resolver());
        let err = service.save(input(None, 16.0)).unwrap_err();
        assert!(matches!(err, DomainError::Storage { .. }));
    }

    #[test]
    fn test_load_required_without_profile() {
        let mut repo = MockProfileRepository::new();
        repo.expect_get().returning(|| Ok(None));

        let service = ProfileService::new(Arc::new(repo)).with_resolver(resolver());
        let err = service.load_required().unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
    }

    #[test]
    fn test_gpu_without_resolver_is_configuration_error() {
        let service = ProfileService::new(Arc::new(InMemoryProfileRepository::new()));

        assert!(service.build(input(None, 16.0)).is_ok());
        let err = service.build(input(Some("RTX 3070"), 16.0)).unwrap_err();
        assert!(matches!(err, DomainError::Configuration { .. }));
    }

    #[test]
    fn test_clear_round_trip() {
        let service = service();

        assert!(!service.clear().unwrap());
        service.save(input(None, 16.0)).unwrap();
        assert!(service.load().unwrap().is_some());
        assert!(service.clear().unwrap());
        assert!(service.load().unwrap().is_none());
    }
}
