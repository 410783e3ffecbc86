//! Hardware profile repository trait

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::HardwareProfile;
use crate::domain::DomainError;

/// Persisted hardware profile record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredProfile {
    pub saved_at: DateTime<Utc>,
    pub profile: HardwareProfile,
}

impl StoredProfile {
    pub fn new(profile: HardwareProfile) -> Self {
        Self {
            saved_at: Utc::now(),
            profile,
        }
    }
}

/// Repository for the single saved hardware profile
///
/// A missing record is a normal state and is reported as `Ok(None)`.
#[cfg_attr(test, mockall::automock)]
pub trait ProfileRepository: Send + Sync {
    /// Read the saved profile, if any
    fn get(&self) -> Result<Option<StoredProfile>, DomainError>;

    /// Replace the saved profile
    fn set(&self, record: StoredProfile) -> Result<(), DomainError>;

    /// Remove the saved profile; returns whether one existed
    fn clear(&self) -> Result<bool, DomainError>;
}

/// In-memory implementation of ProfileRepository
pub mod in_memory {
    use super::*;
    use std::sync::Mutex;

    /// In-memory profile repository for testing and one-shot runs
    #[derive(Debug, Default)]
    pub struct InMemoryProfileRepository {
        record: Mutex<Option<StoredProfile>>,
    }

    impl InMemoryProfileRepository {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_profile(self, profile: HardwareProfile) -> Self {
            if let Ok(mut record) = self.record.lock() {
                *record = Some(StoredProfile::new(profile));
            }
            self
        }

        fn lock(&self) -> Result<std::sync::MutexGuard<'_, Option<StoredProfile>>, DomainError> {
            self.record
                .lock()
                .map_err(|_| DomainError::internal("Profile store lock poisoned"))
        }
    }

    impl ProfileRepository for InMemoryProfileRepository {
        fn get(&self) -> Result<Option<StoredProfile>, DomainError> {
            Ok(self.lock()?.clone())
        }

        fn set(&self, record: StoredProfile) -> Result<(), DomainError> {
            *self.lock()? = Some(record);
            Ok(())
        }

        fn clear(&self) -> Result<bool, DomainError> {
            Ok(self.lock()?.take().is_some())
        }
    }
}
