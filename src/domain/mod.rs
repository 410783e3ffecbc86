//! Domain layer - Core business logic and entities

pub mod catalog;
pub mod error;
pub mod fitness;
pub mod hardware;

pub use catalog::{Artifact, ArtifactVariant, CatalogValidationError, CatalogValidationReport};
pub use error::DomainError;
pub use fitness::{
    evaluate, recommend, sort_recommendations, FitnessAssessment, FitnessCategory,
    RecommendationFilters, RecommendedArtifact, SortMode,
};
pub use hardware::{
    CapacityEstimate, DeviceDatabase, Fidelity, HardwareProfile, HardwareResolver,
    ProfileRepository, UserPreferences,
};
