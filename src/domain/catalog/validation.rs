//! Catalog validation utilities
//!
//! Validation runs at load time and collects every problem so a curator can
//! fix a catalog in one pass. Scoring never re-checks these rules.

use std::collections::HashSet;
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

use super::entity::{Artifact, ArtifactVariant, QualityMetrics};

/// Regex pattern for valid artifact IDs (lowercase alphanumeric, hyphens and dots)
static ARTIFACT_ID_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-z0-9.-]+$").unwrap());

/// Parameter labels such as `7B`, `1.5B` or `500M`
static PARAMETERS_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+(?:\.\d+)?)([BM])$").unwrap());

/// Known quantization families
static QUANTIZATION_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(Q[2-8]_[0-1]|Q[2-8]_K(_[SML])?|FP(16|32)|BF16|INT[248]|W[0-9]A[0-9]{1,2}|(AWQ|GPTQ)(-[0-9]+bit)?|full|none)$",
    )
    .unwrap()
});

static URL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^https?://(?:(?:[A-Z0-9](?:[A-Z0-9-]{0,61}[A-Z0-9])?\.)+[A-Z]{2,6}\.?|localhost|\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3})(?::\d+)?(?:/?|[/?]\S+)$",
    )
    .unwrap()
});

pub const MAX_VRAM_GB: f64 = 200.0;
pub const MAX_RAM_GB: f64 = 500.0;
pub const MAX_FILE_SIZE_GB: f64 = 300.0;
pub const MIN_CONTEXT_WINDOW: u32 = 1_000;
pub const MAX_CONTEXT_WINDOW: u32 = 500_000;

/// Catalog validation errors
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogValidationError {
    /// Two artifacts share an ID
    DuplicateId { id: String },
    /// ID contains characters outside `[a-z0-9.-]`
    InvalidIdFormat { id: String },
    /// Parameter label is not `<number>B` or `<number>M`
    InvalidParameters { value: String },
    /// No use cases declared
    EmptyUseCases,
    /// No variants declared
    EmptyVariants,
    /// Quantization label is not a known format
    InvalidQuantization { variant: usize, value: String },
    /// A size field is zero, negative or not a number
    NonPositiveValue { variant: usize, field: &'static str, value: f64 },
    /// A size field exceeds its sanity ceiling
    ValueTooHigh { variant: usize, field: &'static str, value: f64, max: f64 },
    /// Context window outside 1k-500k tokens
    UnusualContextWindow { variant: usize, value: u32 },
    /// No download or install link
    MissingLinks,
    /// Ollama link is not an `ollama run` command
    InvalidOllamaLink { value: String },
    /// Link is not an http(s) URL
    InvalidUrl { key: &'static str, value: String },
    /// Quality metric outside its range
    MetricOutOfRange { field: &'static str, value: f64, min: f64, max: f64 },
}

impl fmt::Display for CatalogValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateId { id } => write!(f, "Duplicate model ID: {}", id),
            Self::InvalidIdFormat { id } => write!(
                f,
                "Invalid ID format: {}. Use lowercase alphanumeric with hyphens and dots.",
                id
            ),
            Self::InvalidParameters { value } => write!(
                f,
                "Invalid parameters format: {}. Use format like '7B' or '13B'.",
                value
            ),
            Self::EmptyUseCases => write!(f, "useCases must be a non-empty list"),
            Self::EmptyVariants => write!(f, "variants must be a non-empty list"),
            Self::InvalidQuantization { variant, value } => {
                write!(f, "Variant {}: Invalid quantization format: {}", variant, value)
            }
            Self::NonPositiveValue { variant, field, value } => write!(
                f,
                "Variant {}: {} must be a positive number, got: {}",
                variant, field, value
            ),
            Self::ValueTooHigh { variant, field, value, max } => write!(
                f,
                "Variant {}: {} seems too high: {}GB (max {}GB)",
                variant, field, value, max
            ),
            Self::UnusualContextWindow { variant, value } => write!(
                f,
                "Variant {}: contextWindow seems unusual: {} tokens",
                variant, value
            ),
            Self::MissingLinks => write!(f, "links must contain at least one link"),
            Self::InvalidOllamaLink { value } => write!(
                f,
                "Ollama link should start with 'ollama run ', got: {}",
                value
            ),
            Self::InvalidUrl { key, value } => write!(f, "Invalid URL for {}: {}", key, value),
            Self::MetricOutOfRange { field, value, min, max } => write!(
                f,
                "{} must be between {} and {}, got: {}",
                field, min, max, value
            ),
        }
    }
}

impl std::error::Error for CatalogValidationError {}

/// A validation error tied to the catalog record it was found in
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogIssue {
    pub index: usize,
    pub id: String,
    pub error: CatalogValidationError,
}

impl fmt::Display for CatalogIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Model {} ({}): {}", self.index, self.id, self.error)
    }
}

/// Every issue found in a catalog
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogValidationReport {
    pub issues: Vec<CatalogIssue>,
}

impl CatalogValidationReport {
    pub fn is_valid(&self) -> bool {
        self.issues.is_empty()
    }
}

impl fmt::Display for CatalogValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lines: Vec<String> = self.issues.iter().map(|issue| issue.to_string()).collect();
        write!(f, "{}", lines.join("; "))
    }
}

/// Parse a parameter label into billions (`7B` -> 7.0, `500M` -> 0.5)
pub fn parse_parameter_count(label: &str) -> Option<f64> {
    let captures = PARAMETERS_PATTERN.captures(label.trim())?;
    let value: f64 = captures.get(1)?.as_str().parse().ok()?;

    match captures.get(2)?.as_str() {
        "M" => Some(value / 1000.0),
        _ => Some(value),
    }
}

/// Validate an artifact ID
pub fn validate_artifact_id(id: &str) -> Result<(), CatalogValidationError> {
    if !ARTIFACT_ID_PATTERN.is_match(id) {
        return Err(CatalogValidationError::InvalidIdFormat { id: id.to_string() });
    }

    Ok(())
}

/// Validate a single variant
pub fn validate_variant(index: usize, variant: &ArtifactVariant) -> Vec<CatalogValidationError> {
    let mut errors = Vec::new();

    if !QUANTIZATION_PATTERN.is_match(&variant.quantization) {
        errors.push(CatalogValidationError::InvalidQuantization {
            variant: index,
            value: variant.quantization.clone(),
        });
    }

    let sized = [
        ("vramRequired", variant.vram_required, MAX_VRAM_GB),
        ("ramRequired", variant.ram_required, MAX_RAM_GB),
        ("fileSize", variant.file_size, MAX_FILE_SIZE_GB),
    ];

    for (field, value, max) in sized {
        if !(value > 0.0) || !value.is_finite() {
            errors.push(CatalogValidationError::NonPositiveValue {
                variant: index,
                field,
                value,
            });
        } else if value > max {
            errors.push(CatalogValidationError::ValueTooHigh {
                variant: index,
                field,
                value,
                max,
            });
        }
    }

    if variant.context_window == 0 {
        errors.push(CatalogValidationError::NonPositiveValue {
            variant: index,
            field: "contextWindow",
            value: 0.0,
        });
    } else if !(MIN_CONTEXT_WINDOW..=MAX_CONTEXT_WINDOW).contains(&variant.context_window) {
        errors.push(CatalogValidationError::UnusualContextWindow {
            variant: index,
            value: variant.context_window,
        });
    }

    errors
}

/// Validate quality metric ranges
pub fn validate_quality_metrics(metrics: &QualityMetrics) -> Vec<CatalogValidationError> {
    let checks = [
        ("overallRating", Some(metrics.overall_rating), 5.0),
        ("mmlu", metrics.mmlu, 100.0),
        ("humanEval", metrics.human_eval, 100.0),
        ("mt_bench", metrics.mt_bench, 10.0),
    ];

    checks
        .into_iter()
        .filter_map(|(field, value, max)| value.map(|v| (field, v, max)))
        .filter(|(_, value, max)| !(0.0..=*max).contains(value))
        .map(|(field, value, max)| CatalogValidationError::MetricOutOfRange {
            field,
            value,
            min: 0.0,
            max,
        })
        .collect()
}

/// Validate a complete artifact
pub fn validate_artifact(artifact: &Artifact) -> Vec<CatalogValidationError> {
    let mut errors = Vec::new();

    if let Err(e) = validate_artifact_id(&artifact.id) {
        errors.push(e);
    }

    if parse_parameter_count(&artifact.parameters).is_none() {
        errors.push(CatalogValidationError::InvalidParameters {
            value: artifact.parameters.clone(),
        });
    }

    if artifact.use_cases.is_empty() {
        errors.push(CatalogValidationError::EmptyUseCases);
    }

    if artifact.variants.is_empty() {
        errors.push(CatalogValidationError::EmptyVariants);
    }

    for (index, variant) in artifact.variants.iter().enumerate() {
        errors.extend(validate_variant(index, variant));
    }

    let links = artifact.links.entries();
    if links.is_empty() {
        errors.push(CatalogValidationError::MissingLinks);
    }

    for (key, value) in links {
        if key == "ollama" {
            if !value.starts_with("ollama run ") {
                errors.push(CatalogValidationError::InvalidOllamaLink {
                    value: value.to_string(),
                });
            }
        } else if !URL_PATTERN.is_match(value) {
            errors.push(CatalogValidationError::InvalidUrl {
                key,
                value: value.to_string(),
            });
        }
    }

    if let Some(metrics) = &artifact.quality_metrics {
        errors.extend(validate_quality_metrics(metrics));
    }

    errors
}

/// Validate a whole catalog, including ID uniqueness
pub fn validate_catalog(artifacts: &[Artifact]) -> CatalogValidationReport {
    let mut issues = Vec::new();
    let mut seen = HashSet::new();

    for (index, artifact) in artifacts.iter().enumerate() {
        if !seen.insert(artifact.id.as_str()) {
            issues.push(CatalogIssue {
                index,
                id: artifact.id.clone(),
                error: CatalogValidationError::DuplicateId {
                    id: artifact.id.clone(),
                },
            });
        }

        issues.extend(validate_artifact(artifact).into_iter().map(|error| CatalogIssue {
            index,
            id: artifact.id.clone(),
            error,
        }));
    }

    CatalogValidationReport { issues }
}
