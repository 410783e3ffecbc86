//! Numeric scoring factors
//!
//! Every factor is a pure function of the artifact, the variant and the
//! hardware profile. The output records carry the numbers the explanation
//! formatter needs, but no user-facing text.

use serde::Serialize;

use super::assessment::{Impact, Rating};
use crate::domain::catalog::{Artifact, ArtifactVariant, InferenceSpeed, QualityLevel};
use crate::domain::hardware::{AcceptableQuality, HardwareProfile, Priority};

/// Contributions at or beyond this magnitude are rated positive/negative
pub const RATING_THRESHOLD: f64 = 2.0;

/// Utilization up to this share of capacity is not penalized
pub const HEADROOM_KNEE: f64 = 0.5;
pub const HEADROOM_EXPONENT: f64 = 1.8;
pub const VRAM_PENALTY_WEIGHT: f64 = 30.0;
pub const RAM_PENALTY_WEIGHT: f64 = 15.0;
pub const NO_GPU_PENALTY: f64 = -20.0;

pub const MAX_CAPABILITY_SCORE: f64 = 25.0;
pub const CAPABILITY_PER_BILLION: f64 = 1.5;
pub const BENCHMARK_BONUS_WEIGHT: f64 = 10.0;
pub const HIGH_QUALITY_FLOOR: f64 = 4.0;
pub const QUALITY_FLOOR_PENALTY: f64 = -20.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FactorKind {
    VramHeadroom,
    RamHeadroom,
    ModelQuality,
    ContextWindow,
    PerformanceProfile,
    Quantization,
}

impl FactorKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::VramHeadroom => "VRAM Usage",
            Self::RamHeadroom => "RAM Usage",
            Self::ModelQuality => "Model Quality",
            Self::ContextWindow => "Context Window",
            Self::PerformanceProfile => "Performance Profile",
            Self::Quantization => "Quantization",
        }
    }

    pub fn impact(&self) -> Impact {
        match self {
            Self::VramHeadroom | Self::ModelQuality => Impact::High,
            Self::RamHeadroom | Self::ContextWindow | Self::PerformanceProfile => Impact::Medium,
            Self::Quantization => Impact::Low,
        }
    }
}

/// Where the capability bonus came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum BonusSource {
    Benchmarks,
    ContextSize,
}

/// Inputs behind a factor's contribution, kept for the formatter
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum FactorDetail {
    NoGpu,
    #[serde(rename_all = "camelCase")]
    Memory {
        required_gb: f64,
        available_gb: f64,
        utilization: f64,
    },
    #[serde(rename_all = "camelCase")]
    Quality {
        params_b: f64,
        capability: f64,
        bonus: f64,
        bonus_source: BonusSource,
        estimate: f64,
        below_floor: bool,
    },
    #[serde(rename_all = "camelCase")]
    Context {
        window: u32,
        recommended: u32,
        use_case: Option<String>,
        ratio: f64,
    },
    #[serde(rename_all = "camelCase")]
    Performance {
        priority: Priority,
        speed: InferenceSpeed,
        quality: QualityLevel,
    },
    Quantization { label: String },
}

/// One factor's signed contribution to the score
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FactorScore {
    pub kind: FactorKind,
    pub contribution: f64,
    pub rating: Rating,
    pub impact: Impact,
    pub detail: FactorDetail,
}

impl FactorScore {
    fn new(kind: FactorKind, contribution: f64, detail: FactorDetail) -> Self {
        Self {
            kind,
            contribution,
            rating: rate(contribution),
            impact: kind.impact(),
            detail,
        }
    }

    fn with_rating(mut self, rating: Rating) -> Self {
        self.rating = rating;
        self
    }

    pub fn is_negative(&self) -> bool {
        self.rating == Rating::Negative
    }
}

/// Rating from a net contribution and the fixed threshold
pub fn rate(contribution: f64) -> Rating {
    if contribution >= RATING_THRESHOLD {
        Rating::Positive
    } else if contribution <= -RATING_THRESHOLD {
        Rating::Negative
    } else {
        Rating::Neutral
    }
}

/// Share of a memory pool a requirement takes
pub fn utilization(required_gb: f64, available_gb: f64) -> f64 {
    if required_gb <= 0.0 {
        0.0
    } else if available_gb <= 0.0 {
        f64::INFINITY
    } else {
        required_gb / available_gb
    }
}

/// Convex penalty: 0 up to the knee, then `-((u - 0.5) * 2)^1.8 * weight`
pub fn headroom_penalty(utilization: f64, weight: f64) -> f64 {
    if utilization <= HEADROOM_KNEE {
        0.0
    } else {
        -((utilization - HEADROOM_KNEE) * 2.0).powf(HEADROOM_EXPONENT) * weight
    }
}

/// Capability bonus from context size when there are no benchmarks (0-3)
pub fn context_size_bonus(context_window: u32) -> f64 {
    match context_window {
        w if w >= 131_072 => 3.0,
        w if w >= 32_768 => 2.0,
        w if w >= 8_192 => 1.0,
        _ => 0.0,
    }
}

/// Parameter/benchmark blend shared by scoring and the efficiency sort
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Capability {
    pub params_b: f64,
    pub capability: f64,
    pub bonus: f64,
    pub bonus_source: BonusSource,
    /// Mean of the available 0-5 quality signals
    pub estimate: f64,
}

impl Capability {
    pub fn of(artifact: &Artifact, variant: &ArtifactVariant) -> Self {
        let params_b = artifact.params_b();
        let capability = (params_b * CAPABILITY_PER_BILLION).clamp(0.0, MAX_CAPABILITY_SCORE);

        let benchmarks = artifact
            .quality_metrics
            .as_ref()
            .and_then(|m| m.normalized_benchmark_average());

        let (bonus, bonus_source) = match benchmarks {
            Some(avg) => (avg * BENCHMARK_BONUS_WEIGHT, BonusSource::Benchmarks),
            None => (context_size_bonus(variant.context_window), BonusSource::ContextSize),
        };

        let mut signals = vec![capability / MAX_CAPABILITY_SCORE * 5.0];
        if let Some(avg) = benchmarks {
            signals.push(avg * 5.0);
        }
        if let Some(metrics) = &artifact.quality_metrics {
            signals.push(metrics.overall_rating.clamp(0.0, 5.0));
        }
        let estimate = signals.iter().sum::<f64>() / signals.len() as f64;

        Self {
            params_b,
            capability,
            bonus,
            bonus_source,
            estimate,
        }
    }

    /// Capability score plus bonus, without preference penalties
    pub fn proxy(&self) -> f64 {
        self.capability + self.bonus
    }
}

/// Score every factor for one variant
pub fn score_factors(artifact: &Artifact, variant: &ArtifactVariant, hardware: &HardwareProfile) -> Vec<FactorScore> {
    let mut factors = vec![
        vram_factor(variant, hardware),
        ram_factor(variant, hardware),
        quality_factor(artifact, variant, hardware),
        context_factor(artifact, variant, hardware),
    ];

    if let Some(performance) = performance_factor(artifact, hardware) {
        factors.push(performance);
    }

    factors.push(quantization_factor(variant));
    factors
}

fn memory_factor(kind: FactorKind, required_gb: f64, available_gb: f64, weight: f64) -> FactorScore {
    let utilization = utilization(required_gb, available_gb);
    let score = FactorScore::new(
        kind,
        headroom_penalty(utilization, weight),
        FactorDetail::Memory {
            required_gb,
            available_gb,
            utilization,
        },
    );

    // below the knee the factor is at its best possible value
    if utilization <= HEADROOM_KNEE {
        score.with_rating(Rating::Positive)
    } else {
        score
    }
}

fn vram_factor(variant: &ArtifactVariant, hardware: &HardwareProfile) -> FactorScore {
    match hardware.gpu_capacity() {
        Some(capacity) => memory_factor(
            FactorKind::VramHeadroom,
            variant.vram_required,
            capacity,
            VRAM_PENALTY_WEIGHT,
        ),
        None => FactorScore::new(FactorKind::VramHeadroom, NO_GPU_PENALTY, FactorDetail::NoGpu)
            .with_rating(Rating::Neutral),
    }
}

fn ram_factor(variant: &ArtifactVariant, hardware: &HardwareProfile) -> FactorScore {
    memory_factor(
        FactorKind::RamHeadroom,
        variant.ram_required,
        hardware.system_memory_gb,
        RAM_PENALTY_WEIGHT,
    )
}

fn quality_factor(artifact: &Artifact, variant: &ArtifactVariant, hardware: &HardwareProfile) -> FactorScore {
    let capability = Capability::of(artifact, variant);
    let below_floor = hardware.preferences.acceptable_quality == AcceptableQuality::High
        && capability.estimate < HIGH_QUALITY_FLOOR;

    let penalty = if below_floor { QUALITY_FLOOR_PENALTY } else { 0.0 };
    let score = FactorScore::new(
        FactorKind::ModelQuality,
        capability.proxy() + penalty,
        FactorDetail::Quality {
            params_b: capability.params_b,
            capability: capability.capability,
            bonus: capability.bonus,
            bonus_source: capability.bonus_source,
            estimate: capability.estimate,
            below_floor,
        },
    );

    if below_floor {
        score.with_rating(Rating::Negative)
    } else {
        score
    }
}

fn context_factor(artifact: &Artifact, variant: &ArtifactVariant, hardware: &HardwareProfile) -> FactorScore {
    // first selected use case the artifact supports; else the artifact's own first
    let selected = hardware
        .preferences
        .selected_use_cases
        .iter()
        .find(|uc| artifact.has_use_case(uc))
        .map(String::as_str);

    let (use_case, recommended) = artifact.recommended_context_for(selected);
    let ratio = variant.context_window as f64 / recommended as f64;

    let contribution = if ratio >= 2.0 {
        8.0
    } else if ratio >= 1.0 {
        5.0
    } else if ratio >= 0.5 {
        0.0
    } else {
        -5.0
    };

    FactorScore::new(
        FactorKind::ContextWindow,
        contribution,
        FactorDetail::Context {
            window: variant.context_window,
            recommended,
            use_case: use_case.map(str::to_string),
            ratio,
        },
    )
}

fn performance_factor(artifact: &Artifact, hardware: &HardwareProfile) -> Option<FactorScore> {
    let profile = artifact.performance_profile?;
    let priority = hardware.preferences.priority;

    let contribution = match priority {
        Priority::Speed => match profile.inference_speed {
            InferenceSpeed::Fast => 10.0,
            InferenceSpeed::Medium => 0.0,
            InferenceSpeed::Slow => -15.0,
        },
        Priority::Quality => match profile.quality_level {
            QualityLevel::High => 10.0,
            QualityLevel::Medium | QualityLevel::Low => 0.0,
        },
        Priority::Balanced => 0.0,
    };

    Some(FactorScore::new(
        FactorKind::PerformanceProfile,
        contribution,
        FactorDetail::Performance {
            priority,
            speed: profile.inference_speed,
            quality: profile.quality_level,
        },
    ))
}

fn quantization_factor(variant: &ArtifactVariant) -> FactorScore {
    let label = variant.quantization.to_uppercase();
    let contribution = if label.contains("Q4") {
        5.0
    } else if label.contains("Q5") {
        3.0
    } else {
        0.0
    };

    FactorScore::new(
        FactorKind::Quantization,
        contribution,
        FactorDetail::Quantization {
            label: variant.quantization.clone(),
        },
    )
}
