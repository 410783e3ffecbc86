//! Turns numeric factor scores into user-facing reasons

use super::assessment::ExplainableReason;
use super::factors::{BonusSource, FactorDetail, FactorKind, FactorScore, HEADROOM_KNEE};
use crate::domain::catalog::{InferenceSpeed, QualityLevel};
use crate::domain::hardware::Priority;

const TIGHT_UTILIZATION: f64 = 0.9;

pub fn explain(score: &FactorScore) -> ExplainableReason {
    ExplainableReason {
        factor: score.kind.label().to_string(),
        rating: score.rating,
        impact: score.impact,
        explanation: describe(&score.detail, score.kind),
    }
}

pub fn explain_all(scores: &[FactorScore]) -> Vec<ExplainableReason> {
    scores.iter().map(explain).collect()
}

fn describe(detail: &FactorDetail, kind: FactorKind) -> String {
    match detail {
        FactorDetail::NoGpu => {
            "No dedicated GPU detected; the model will run on the CPU from system memory".to_string()
        }
        FactorDetail::Memory {
            required_gb,
            available_gb,
            utilization,
        } => describe_memory(kind, *required_gb, *available_gb, *utilization),
        FactorDetail::Quality {
            params_b,
            capability,
            bonus,
            bonus_source,
            estimate,
            below_floor,
        } => {
            let source = match bonus_source {
                BonusSource::Benchmarks => "benchmark results",
                BonusSource::ContextSize => "context size",
            };
            let mut text = format!(
                "{:.1}B parameters give a capability score of {:.1}, plus {:.1} from {}",
                params_b, capability, bonus, source
            );
            if *below_floor {
                text.push_str(&format!(
                    "; estimated quality {:.1}/5 is below your high quality requirement",
                    estimate
                ));
            }
            text
        }
        FactorDetail::Context {
            window,
            recommended,
            use_case,
            ratio,
        } => {
            let purpose = use_case
                .as_deref()
                .map(|uc| format!(" for {}", uc))
                .unwrap_or_default();
            let verdict = if *ratio >= 2.0 {
                "is well above"
            } else if *ratio >= 1.0 {
                "meets"
            } else if *ratio >= 0.5 {
                "is somewhat below"
            } else {
                "is far below"
            };
            format!(
                "{} token context window {} the recommended {} tokens{}",
                window, verdict, recommended, purpose
            )
        }
        FactorDetail::Performance {
            priority,
            speed,
            quality,
        } => match priority {
            Priority::Speed => match speed {
                InferenceSpeed::Fast => "Fast inference matches your speed priority".to_string(),
                InferenceSpeed::Medium => "Medium inference speed; neither helps nor hurts your speed priority".to_string(),
                InferenceSpeed::Slow => "Slow inference works against your speed priority".to_string(),
            },
            Priority::Quality => match quality {
                QualityLevel::High => "High output quality matches your quality priority".to_string(),
                QualityLevel::Medium | QualityLevel::Low => {
                    "Output quality is not in the top tier for your quality priority".to_string()
                }
            },
            Priority::Balanced => "Balanced priority; performance profile is not weighted".to_string(),
        },
        FactorDetail::Quantization { label } => {
            let upper = label.to_uppercase();
            if upper.contains("Q4") {
                format!("{} quantization is a memory-efficient choice", label)
            } else if upper.contains("Q5") {
                format!("{} quantization balances quality and memory use", label)
            } else {
                format!("{} quantization keeps more precision at a higher memory cost", label)
            }
        }
    }
}

fn describe_memory(kind: FactorKind, required_gb: f64, available_gb: f64, utilization: f64) -> String {
    let pool = match kind {
        FactorKind::VramHeadroom => "VRAM",
        _ => "RAM",
    };

    if !utilization.is_finite() {
        return format!("Requires {:.1} GB {} but none is available", required_gb, pool);
    }

    let verdict = if utilization <= HEADROOM_KNEE {
        "leaving plenty of headroom"
    } else if utilization <= TIGHT_UTILIZATION {
        "leaving moderate headroom"
    } else {
        "close to the limit"
    };

    format!(
        "Uses {:.1} GB of {:.1} GB {} ({:.0}%), {}",
        required_gb,
        available_gb,
        pool,
        utilization * 100.0,
        verdict
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::{Artifact, ArtifactVariant};
    use crate::domain::fitness::assessment::{Impact, Rating};
    use crate::domain::fitness::factors::score_factors;
    use crate::domain::hardware::{Fidelity, HardwareProfile};

    fn scores(hardware: &HardwareProfile) -> Vec<FactorScore> {
        let artifact = Artifact::new("test-7b", "Test 7B", "7B").with_use_case("chat");
        let variant = ArtifactVariant::new("Q4_K_M", 4.0, 8.0, 4.4, 8192);
        score_factors(&artifact, &variant, hardware)
    }

    #[test]
    fn test_one_reason_per_factor() {
        let hw = HardwareProfile::new(16.0).with_gpu("RTX 3070", 8.0, Fidelity::MatchedExact);
        let factors = scores(&hw);
        let reasons = explain_all(&factors);

        assert_eq!(reasons.len(), factors.len());
        for (reason, factor) in reasons.iter().zip(&factors) {
            assert_eq!(reason.factor, factor.kind.label());
            assert_eq!(reason.rating, factor.rating);
            assert!(!reason.explanation.is_empty());
        }
    }

    #[test]
    fn test_memory_explanation_mentions_numbers() {
        let hw = HardwareProfile::new(16.0).with_gpu("RTX 3070", 8.0, Fidelity::MatchedExact);
        let factors = scores(&hw);
        let vram = factors.iter().find(|f| f.kind == FactorKind::VramHeadroom).unwrap();
        let reason = explain(vram);

        assert_eq!(reason.impact, Impact::High);
        assert_eq!(reason.rating, Rating::Positive);
        assert_eq!(
            reason.explanation,
            "Uses 4.0 GB of 8.0 GB VRAM (50%), leaving plenty of headroom"
        );
    }

    #[test]
    fn test_no_gpu_explanation() {
        let factors = scores(&HardwareProfile::new(16.0));
        let reason = explain(&factors[0]);

        assert_eq!(reason.factor, "VRAM Usage");
        assert_eq!(reason.rating, Rating::Neutral);
        assert!(reason.explanation.contains("No dedicated GPU"));
    }

    #[test]
    fn test_context_explanation_names_use_case() {
        let factors = scores(&HardwareProfile::new(16.0));
        let context = factors.iter().find(|f| f.kind == FactorKind::ContextWindow).unwrap();

        assert_eq!(
            explain(context).explanation,
            "8192 token context window is well above the recommended 4096 tokens for chat"
        );
    }
}
