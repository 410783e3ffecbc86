//! Reference datasets: loaded once per process, read-only afterwards

mod loader;

pub use loader::{load_catalog, load_device_database, load_resolver_rules};

use std::sync::Arc;

use once_cell::sync::OnceCell;

use crate::config::DataConfig;
use crate::domain::catalog::Artifact;
use crate::domain::hardware::{DeviceDatabase, HardwareResolver, ResolverRules};
use crate::domain::DomainError;

/// Lazily loaded catalog, device database and resolver rules.
///
/// Each dataset is read at most once; later calls hand out the same `Arc`.
/// A failed load is not cached, so the next call retries.
#[derive(Debug)]
pub struct ReferenceData {
    config: DataConfig,
    catalog: OnceCell<Arc<Vec<Artifact>>>,
    devices: OnceCell<Arc<DeviceDatabase>>,
    rules: OnceCell<Arc<ResolverRules>>,
}

impl ReferenceData {
    pub fn new(config: DataConfig) -> Self {
        Self {
            config,
            catalog: OnceCell::new(),
            devices: OnceCell::new(),
            rules: OnceCell::new(),
        }
    }

    pub fn config(&self) -> &DataConfig {
        &self.config
    }

    pub fn catalog(&self) -> Result<Arc<Vec<Artifact>>, DomainError> {
        self.catalog
            .get_or_try_init(|| load_catalog(&self.config.catalog_path).map(Arc::new))
            .cloned()
    }

    pub fn devices(&self) -> Result<Arc<DeviceDatabase>, DomainError> {
        self.devices
            .get_or_try_init(|| load_device_database(&self.config.devices_path).map(Arc::new))
            .cloned()
    }

    /// Configured rules file, or the built-in rules when none is set
    pub fn rules(&self) -> Result<Arc<ResolverRules>, DomainError> {
        self.rules
            .get_or_try_init(|| match &self.config.resolver_rules_path {
                Some(path) => load_resolver_rules(path).map(Arc::new),
                None => Ok(Arc::new(ResolverRules::default())),
            })
            .cloned()
    }

    pub fn resolver(&self) -> Result<HardwareResolver, DomainError> {
        Ok(HardwareResolver::with_rules(self.devices()?, self.rules()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;

    use crate::domain::hardware::Fidelity;

    fn data_config(dir: &Path) -> DataConfig {
        DataConfig {
            catalog_path: dir.join("models.json"),
            devices_path: dir.join("gpus.json"),
            profile_path: dir.join("profile.json"),
            resolver_rules_path: None,
        }
    }

    #[test]
    fn test_datasets_load_once() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("gpus.json"),
            r#"[{"manufacturer": "AMD", "modelName": "Radeon 890M", "class": "integrated", "capacityGB": "shared"}]"#,
        )
        .unwrap();

        let data = ReferenceData::new(data_config(dir.path()));
        let first = data.devices().unwrap();

        // the cached copy survives the file going away
        fs::remove_file(dir.path().join("gpus.json")).unwrap();
        let second = data.devices().unwrap();

        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_resolver_uses_loaded_devices() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("gpus.json"),
            r#"[{"manufacturer": "AMD", "modelName": "Radeon 890M", "class": "integrated", "capacityGB": "shared"}]"#,
        )
        .unwrap();

        let resolver = ReferenceData::new(data_config(dir.path())).resolver().unwrap();
        let estimate = resolver.resolve("AMD Radeon 890M", Some(64.0));

        assert_eq!(estimate.capacity_gb, 16.0);
        assert_eq!(estimate.fidelity, Fidelity::MatchedExact);
    }

    #[test]
    fn test_failed_load_is_not_cached() {
        let dir = tempfile::tempdir().unwrap();
        let data = ReferenceData::new(data_config(dir.path()));
        assert!(data.catalog().is_err());

        fs::write(dir.path().join("models.json"), "[]").unwrap();
        assert!(data.catalog().unwrap().is_empty());
    }

    #[test]
    fn test_builtin_rules_without_path() {
        let dir = tempfile::tempdir().unwrap();
        let data = ReferenceData::new(data_config(dir.path()));
        assert_eq!(*data.rules().unwrap(), ResolverRules::default());
    }
}
