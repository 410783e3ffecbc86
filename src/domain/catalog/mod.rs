//! Catalog domain - model artifacts, their variants and load-time validation

mod entity;
mod validation;

pub use entity::{
    Artifact, ArtifactLinks, ArtifactVariant, InferenceSpeed, PerformanceProfile, QualityLevel,
    QualityMetrics, DEFAULT_RECOMMENDED_CONTEXT,
};
pub use validation::{
    parse_parameter_count, validate_artifact, validate_artifact_id, validate_catalog,
    validate_quality_metrics, validate_variant, CatalogIssue, CatalogValidationError,
    CatalogValidationReport,
};
