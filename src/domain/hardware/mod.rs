//! Hardware domain - profiles, reference devices and GPU resolution

mod device;
mod entity;
mod repository;
mod resolver;
mod rules;

pub use device::{
    DeviceCapacity, DeviceClass, DeviceDatabase, DeviceRecord, DeviceValidationError,
    SharedMarker,
};
pub use entity::{AcceptableQuality, HardwareProfile, OsFamily, Priority, UserPreferences};
pub use repository::{in_memory::InMemoryProfileRepository, ProfileRepository, StoredProfile};
pub use resolver::{
    CapacityEstimate, Fidelity, HardwareResolver, ResolutionSource, ResolutionStep,
    DEFAULT_RESOLUTION_CHAIN,
};
pub use rules::{
    CapacityPattern, ChipTier, NamePattern, ResolverRules, RuleValidationError, SharePolicy,
    SharedMemoryTier,
};

#[cfg(test)]
pub use repository::MockProfileRepository;
