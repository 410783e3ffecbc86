//! Combines factor scores into a fitness assessment

use tracing::trace;

use super::assessment::{FitnessAssessment, FitnessCategory};
use super::explain::explain_all;
use super::factors::{score_factors, utilization, FactorKind, FactorScore};
use crate::domain::catalog::{Artifact, ArtifactVariant};
use crate::domain::hardware::HardwareProfile;

pub const BASE_SCORE: f64 = 100.0;

pub const VRAM_WARNING_UTILIZATION: f64 = 0.9;
pub const RAM_WARNING_UTILIZATION: f64 = 0.8;
pub const LOW_CORE_COUNT: u32 = 4;

pub const HIGH_VRAM_WARNING: &str =
    "High VRAM usage: this variant uses more than 90% of available GPU memory";
pub const HIGH_RAM_WARNING: &str =
    "High RAM usage: this variant uses more than 80% of system memory";
pub const LOW_CORES_WARNING: &str =
    "Low CPU core count: fewer than 4 cores may slow down inference";

pub const GENERAL_SUGGESTION: &str =
    "Consider a smaller model or better hardware for a smoother experience";
pub const QUANTIZATION_SUGGESTION: &str =
    "Try a more aggressive quantization (e.g. Q4_K_M or Q3_K_M) to reduce VRAM usage";
pub const LARGER_MODEL_SUGGESTION: &str =
    "Consider a larger model if your hardware allows, to meet your quality requirements";
pub const FASTER_MODEL_SUGGESTION: &str = "Consider a smaller model for faster inference";

/// Score one variant against a hardware profile.
///
/// Pure: no I/O and no state, so the same inputs always give the same
/// assessment. The score starts at [`BASE_SCORE`], takes the sum of all factor
/// contributions and is floored at 0. There is no upper clamp.
pub fn evaluate(artifact: &Artifact, variant: &ArtifactVariant, hardware: &HardwareProfile) -> FitnessAssessment {
    let factors = score_factors(artifact, variant, hardware);

    let raw: f64 = BASE_SCORE + factors.iter().map(|f| f.contribution).sum::<f64>();
    let score = raw.max(0.0);
    let category = FitnessCategory::from_score(score);

    trace!(
        artifact = %artifact.id,
        quantization = %variant.quantization,
        score,
        category = category.label(),
        "Evaluated variant"
    );

    FitnessAssessment {
        category,
        score,
        reasons: explain_all(&factors),
        warnings: warnings(variant, hardware),
        suggestions: suggestions(category, &factors),
    }
}

/// Threshold warnings, independent of the score
pub fn warnings(variant: &ArtifactVariant, hardware: &HardwareProfile) -> Vec<String> {
    let mut warnings = Vec::new();

    if let Some(capacity) = hardware.gpu_capacity() {
        if utilization(variant.vram_required, capacity) > VRAM_WARNING_UTILIZATION {
            warnings.push(HIGH_VRAM_WARNING.to_string());
        }
    }

    if utilization(variant.ram_required, hardware.system_memory_gb) > RAM_WARNING_UTILIZATION {
        warnings.push(HIGH_RAM_WARNING.to_string());
    }

    if hardware.cpu_core_count.is_some_and(|cores| cores < LOW_CORE_COUNT) {
        warnings.push(LOW_CORES_WARNING.to_string());
    }

    warnings
}

/// Remediation hints keyed off the category and negatively rated factors
pub fn suggestions(category: FitnessCategory, factors: &[FactorScore]) -> Vec<String> {
    let mut suggestions = Vec::new();

    if category.needs_general_advice() {
        suggestions.push(GENERAL_SUGGESTION.to_string());
    }

    let negative = |kind: FactorKind| factors.iter().any(|f| f.kind == kind && f.is_negative());

    if negative(FactorKind::VramHeadroom) {
        suggestions.push(QUANTIZATION_SUGGESTION.to_string());
    }
    if negative(FactorKind::ModelQuality) {
        suggestions.push(LARGER_MODEL_SUGGESTION.to_string());
    }
    if negative(FactorKind::PerformanceProfile) {
        suggestions.push(FASTER_MODEL_SUGGESTION.to_string());
    }

    suggestions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::{InferenceSpeed, PerformanceProfile, QualityLevel};
    use crate::domain::hardware::{AcceptableQuality, Fidelity, Priority, UserPreferences};

    fn artifact() -> Artifact {
        Artifact::new("mistral-7b", "Mistral 7B", "7B")
            .with_use_case("chat")
            .with_recommended_context("chat", 4096)
    }

    fn q4(vram: f64) -> ArtifactVariant {
        ArtifactVariant::new("Q4_K_M", vram, 8.0, 4.4, 8192)
    }

    fn gpu_profile(gpu: f64, ram: f64) -> HardwareProfile {
        HardwareProfile::new(ram).with_gpu("Test GPU", gpu, Fidelity::MatchedExact)
    }

    #[test]
    fn test_comfortable_fit_is_excellent() {
        let assessment = evaluate(&artifact(), &q4(4.0), &gpu_profile(8.0, 16.0));

        assert_eq!(assessment.category, FitnessCategory::Excellent);
        assert!(assessment.score > 100.0);
        assert!(assessment.warnings.is_empty());
        assert!(assessment.suggestions.is_empty());
        assert_eq!(assessment.reasons.len(), 5);
    }

    #[test]
    fn test_full_vram_scores_lower_than_half() {
        let hw = gpu_profile(8.0, 16.0);
        let half = evaluate(&artifact(), &q4(4.0), &hw);
        let full = evaluate(&artifact(), &q4(8.0), &hw);

        assert!(full.score < half.score);
        assert!((half.score - full.score - 30.0).abs() < 1e-9);
        assert!(full.warnings.contains(&HIGH_VRAM_WARNING.to_string()));
        assert!(full.suggestions.contains(&QUANTIZATION_SUGGESTION.to_string()));
    }

    #[test]
    fn test_evaluation_is_deterministic() {
        let hw = gpu_profile(8.0, 16.0).with_cpu_cores(8);
        let first = evaluate(&artifact(), &q4(6.0), &hw);
        let second = evaluate(&artifact(), &q4(6.0), &hw);
        assert_eq!(first, second);
    }

    #[test]
    fn test_score_never_negative() {
        let tiny = Artifact::new("tiny", "Tiny", "500M").with_use_case("chat");
        let variant = ArtifactVariant::new("F16", 50.0, 200.0, 1.0, 512);
        let hw = gpu_profile(2.0, 4.0);

        let assessment = evaluate(&tiny, &variant, &hw);
        assert_eq!(assessment.score, 0.0);
        assert_eq!(assessment.category, FitnessCategory::Incompatible);
        assert_eq!(assessment.suggestions[0], GENERAL_SUGGESTION);
    }

    #[test]
    fn test_no_gpu_penalty_without_negative_rating() {
        let assessment = evaluate(&artifact(), &q4(5.0), &HardwareProfile::new(32.0));
        let with_gpu = evaluate(&artifact(), &q4(5.0), &gpu_profile(16.0, 32.0));

        assert!((with_gpu.score - assessment.score - 20.0).abs() < 1e-9);
        assert!(!assessment.suggestions.contains(&QUANTIZATION_SUGGESTION.to_string()));
    }

    #[test]
    fn test_warnings() {
        let hw = gpu_profile(8.0, 10.0).with_cpu_cores(2);
        let variant = ArtifactVariant::new("Q8_0", 7.5, 8.5, 7.0, 8192);

        assert_eq!(
            warnings(&variant, &hw),
            vec![
                HIGH_VRAM_WARNING.to_string(),
                HIGH_RAM_WARNING.to_string(),
                LOW_CORES_WARNING.to_string(),
            ]
        );

        // unknown core count never warns
        assert!(warnings(&q4(2.0), &gpu_profile(8.0, 32.0)).is_empty());
    }

    #[test]
    fn test_quality_floor_suggests_larger_model() {
        let prefs = UserPreferences::new().with_acceptable_quality(AcceptableQuality::High);
        let hw = gpu_profile(8.0, 16.0).with_preferences(prefs);

        let assessment = evaluate(&artifact(), &q4(5.0), &hw);
        assert!(assessment.suggestions.contains(&LARGER_MODEL_SUGGESTION.to_string()));
    }

    #[test]
    fn test_slow_model_under_speed_priority() {
        let slow = artifact().with_performance_profile(PerformanceProfile {
            inference_speed: InferenceSpeed::Slow,
            quality_level: QualityLevel::Medium,
        });
        let prefs = UserPreferences::new().with_priority(Priority::Speed);
        let hw = gpu_profile(8.0, 16.0).with_preferences(prefs);

        let assessment = evaluate(&slow, &q4(4.0), &hw);
        assert_eq!(assessment.suggestions, vec![FASTER_MODEL_SUGGESTION.to_string()]);
    }

    #[test]
    fn test_general_suggestion_comes_first() {
        let prefs = UserPreferences::new().with_acceptable_quality(AcceptableQuality::High);
        let hw = gpu_profile(4.0, 8.0).with_preferences(prefs);
        let variant = ArtifactVariant::new("Q8_0", 5.0, 8.0, 7.0, 1024);

        let assessment = evaluate(&artifact(), &variant, &hw);
        assert!(assessment.category.needs_general_advice());
        assert_eq!(
            assessment.suggestions,
            vec![
                GENERAL_SUGGESTION.to_string(),
                QUANTIZATION_SUGGESTION.to_string(),
                LARGER_MODEL_SUGGESTION.to_string(),
            ]
        );
    }
}
