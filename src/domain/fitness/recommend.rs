//! Catalog-wide recommendation: hard filters, per-variant evaluation and ranking

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::assessment::FitnessAssessment;
use super::evaluator::evaluate;
use super::factors::Capability;
use crate::domain::catalog::{Artifact, ArtifactVariant};
use crate::domain::hardware::HardwareProfile;

/// Floor for the efficiency denominator
const MIN_EFFICIENCY_VRAM_GB: f64 = 0.1;

/// Caller-supplied thresholds applied on top of the hardware checks
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationFilters {
    /// Artifact must tag at least one of these; empty means no restriction
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub use_cases: Vec<String>,

    #[serde(default, rename = "maxVRAM", skip_serializing_if = "Option::is_none")]
    pub max_vram_gb: Option<f64>,

    #[serde(default, rename = "maxRAM", skip_serializing_if = "Option::is_none")]
    pub max_ram_gb: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_context_window: Option<u32>,
}

impl RecommendationFilters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_use_case(mut self, use_case: impl Into<String>) -> Self {
        self.use_cases.push(use_case.into());
        self
    }

    pub fn with_max_vram(mut self, gb: f64) -> Self {
        self.max_vram_gb = Some(gb);
        self
    }

    pub fn with_max_ram(mut self, gb: f64) -> Self {
        self.max_ram_gb = Some(gb);
        self
    }

    pub fn with_min_context_window(mut self, tokens: u32) -> Self {
        self.min_context_window = Some(tokens);
        self
    }
}

/// Why a variant was dropped before scoring
#[derive(Debug, Clone, PartialEq)]
pub enum FilterRejection {
    ExceedsGpuCapacity { required: f64, available: f64 },
    ExceedsSystemMemory { required: f64, available: f64 },
    ExceedsMaxVram { required: f64, limit: f64 },
    ExceedsMaxRam { required: f64, limit: f64 },
    ContextTooSmall { window: u32, minimum: u32 },
    UseCaseMismatch,
}

impl fmt::Display for FilterRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ExceedsGpuCapacity { required, available } => {
                write!(f, "needs {} GB VRAM, GPU has {} GB", required, available)
            }
            Self::ExceedsSystemMemory { required, available } => {
                write!(f, "needs {} GB RAM, system has {} GB", required, available)
            }
            Self::ExceedsMaxVram { required, limit } => {
                write!(f, "needs {} GB VRAM, limit is {} GB", required, limit)
            }
            Self::ExceedsMaxRam { required, limit } => {
                write!(f, "needs {} GB RAM, limit is {} GB", required, limit)
            }
            Self::ContextTooSmall { window, minimum } => {
                write!(f, "context window {} is below the minimum {}", window, minimum)
            }
            Self::UseCaseMismatch => write!(f, "none of the requested use cases"),
        }
    }
}

/// Apply the hard filters in order; the first failure wins
pub fn check_hard_filters(
    artifact: &Artifact,
    variant: &ArtifactVariant,
    hardware: &HardwareProfile,
    filters: Option<&RecommendationFilters>,
) -> Result<(), FilterRejection> {
    if let Some(capacity) = hardware.gpu_capacity() {
        if variant.vram_required > capacity {
            return Err(FilterRejection::ExceedsGpuCapacity {
                required: variant.vram_required,
                available: capacity,
            });
        }
    }

    if variant.ram_required > hardware.system_memory_gb {
        return Err(FilterRejection::ExceedsSystemMemory {
            required: variant.ram_required,
            available: hardware.system_memory_gb,
        });
    }

    let Some(filters) = filters else {
        return Ok(());
    };

    if let Some(limit) = filters.max_vram_gb {
        if variant.vram_required > limit {
            return Err(FilterRejection::ExceedsMaxVram {
                required: variant.vram_required,
                limit,
            });
        }
    }

    if let Some(limit) = filters.max_ram_gb {
        if variant.ram_required > limit {
            return Err(FilterRejection::ExceedsMaxRam {
                required: variant.ram_required,
                limit,
            });
        }
    }

    if let Some(minimum) = filters.min_context_window {
        if variant.context_window < minimum {
            return Err(FilterRejection::ContextTooSmall {
                window: variant.context_window,
                minimum,
            });
        }
    }

    if !filters.use_cases.is_empty() && !filters.use_cases.iter().any(|uc| artifact.has_use_case(uc)) {
        return Err(FilterRejection::UseCaseMismatch);
    }

    Ok(())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantAssessment {
    pub variant: ArtifactVariant,
    pub assessment: FitnessAssessment,
}

/// An artifact with at least one compatible variant
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendedArtifact {
    pub artifact: Artifact,
    /// Score-descending; ties keep catalog order
    pub variant_assessments: Vec<VariantAssessment>,
    /// Highest-scoring compatible variant
    pub default_variant: ArtifactVariant,
    pub top_assessment: FitnessAssessment,
}

impl RecommendedArtifact {
    /// Build from surviving variants; `None` when nothing survived
    pub fn from_assessments(artifact: Artifact, mut variant_assessments: Vec<VariantAssessment>) -> Option<Self> {
        variant_assessments.sort_by(|a, b| b.assessment.score.total_cmp(&a.assessment.score));
        let top = variant_assessments.first()?.clone();

        Some(Self {
            artifact,
            variant_assessments,
            default_variant: top.variant,
            top_assessment: top.assessment,
        })
    }

    pub fn score(&self) -> f64 {
        self.top_assessment.score
    }

    /// Capability proxy of the default variant per GB of VRAM
    pub fn efficiency(&self) -> f64 {
        let variant = &self.default_variant;
        Capability::of(&self.artifact, variant).proxy() / variant.vram_required.max(MIN_EFFICIENCY_VRAM_GB)
    }
}

/// Evaluate every compatible variant of every artifact, best first.
///
/// Total: an empty result means nothing fits, not an error.
pub fn recommend(
    hardware: &HardwareProfile,
    catalog: &[Artifact],
    filters: Option<&RecommendationFilters>,
) -> Vec<RecommendedArtifact> {
    let mut results: Vec<RecommendedArtifact> = catalog
        .iter()
        .filter_map(|artifact| {
            let assessments: Vec<VariantAssessment> = artifact
                .variants
                .iter()
                .filter(|variant| match check_hard_filters(artifact, variant, hardware, filters) {
                    Ok(()) => true,
                    Err(rejection) => {
                        trace!(
                            artifact = %artifact.id,
                            quantization = %variant.quantization,
                            reason = %rejection,
                            "Variant filtered out"
                        );
                        false
                    }
                })
                .map(|variant| VariantAssessment {
                    variant: variant.clone(),
                    assessment: evaluate(artifact, variant, hardware),
                })
                .collect();

            RecommendedArtifact::from_assessments(artifact.clone(), assessments)
        })
        .collect();

    sort_recommendations(&mut results, SortMode::Score);

    debug!(
        catalog_size = catalog.len(),
        recommended = results.len(),
        "Recommendation complete"
    );

    results
}

/// Secondary orderings over an already computed result
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
    /// Top score, descending
    #[default]
    Score,
    /// Default variant VRAM, ascending
    Vram,
    /// Default variant file size, ascending
    Size,
    /// Default variant context window, descending
    Context,
    /// Capability per GB of VRAM, descending
    Efficiency,
}

impl SortMode {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Score => "score",
            Self::Vram => "vram",
            Self::Size => "size",
            Self::Context => "context",
            Self::Efficiency => "efficiency",
        }
    }
}

impl FromStr for SortMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "score" => Ok(Self::Score),
            "vram" => Ok(Self::Vram),
            "size" | "filesize" | "file-size" => Ok(Self::Size),
            "context" => Ok(Self::Context),
            "efficiency" => Ok(Self::Efficiency),
            other => Err(format!("unknown sort mode '{}'", other)),
        }
    }
}

/// Stable re-sort; nothing is re-evaluated
pub fn sort_recommendations(results: &mut [RecommendedArtifact], mode: SortMode) {
    match mode {
        SortMode::Score => results.sort_by(|a, b| b.score().total_cmp(&a.score())),
        SortMode::Vram => results.sort_by(|a, b| {
            a.default_variant
                .vram_required
                .total_cmp(&b.default_variant.vram_required)
        }),
        SortMode::Size => results.sort_by(|a, b| {
            a.default_variant
                .file_size
                .total_cmp(&b.default_variant.file_size)
        }),
        SortMode::Context => results.sort_by(|a, b| {
            b.default_variant
                .context_window
                .cmp(&a.default_variant.context_window)
        }),
        SortMode::Efficiency => results.sort_by(|a, b| b.efficiency().total_cmp(&a.efficiency())),
    }
}
