//! Fitness assessment output types

use serde::{Deserialize, Serialize};

pub const EXCELLENT_THRESHOLD: f64 = 90.0;
pub const GOOD_THRESHOLD: f64 = 70.0;
pub const FAIR_THRESHOLD: f64 = 50.0;
pub const POOR_THRESHOLD: f64 = 30.0;

/// Qualitative bucket derived from the numeric score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FitnessCategory {
    Excellent,
    Good,
    Fair,
    Poor,
    Incompatible,
}

impl FitnessCategory {
    /// Map a final score onto the fixed category thresholds
    pub fn from_score(score: f64) -> Self {
        if score >= EXCELLENT_THRESHOLD {
            Self::Excellent
        } else if score >= GOOD_THRESHOLD {
            Self::Good
        } else if score >= FAIR_THRESHOLD {
            Self::Fair
        } else if score >= POOR_THRESHOLD {
            Self::Poor
        } else {
            Self::Incompatible
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Excellent => "Excellent",
            Self::Good => "Good",
            Self::Fair => "Fair",
            Self::Poor => "Poor",
            Self::Incompatible => "Incompatible",
        }
    }

    /// Poor and incompatible fits get a general downsizing suggestion
    pub fn needs_general_advice(&self) -> bool {
        matches!(self, Self::Poor | Self::Incompatible)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rating {
    Positive,
    Neutral,
    Negative,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    High,
    Medium,
    Low,
}

/// User-facing explanation of one scoring factor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplainableReason {
    pub factor: String,
    pub rating: Rating,
    pub impact: Impact,
    pub explanation: String,
}

/// Score, category and explanations for one (artifact, variant, hardware) tuple
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FitnessAssessment {
    pub category: FitnessCategory,
    /// Floor-clamped at 0; may exceed 100
    pub score: f64,
    pub reasons: Vec<ExplainableReason>,
    pub warnings: Vec<String>,
    pub suggestions: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_thresholds() {
        assert_eq!(FitnessCategory::from_score(120.0), FitnessCategory::Excellent);
        assert_eq!(FitnessCategory::from_score(90.0), FitnessCategory::Excellent);
        assert_eq!(FitnessCategory::from_score(89.9), FitnessCategory::Good);
        assert_eq!(FitnessCategory::from_score(70.0), FitnessCategory::Good);
        assert_eq!(FitnessCategory::from_score(50.0), FitnessCategory::Fair);
        assert_eq!(FitnessCategory::from_score(30.0), FitnessCategory::Poor);
        assert_eq!(FitnessCategory::from_score(29.99), FitnessCategory::Incompatible);
        assert_eq!(FitnessCategory::from_score(0.0), FitnessCategory::Incompatible);
    }

    #[test]
    fn test_general_advice_only_for_weak_fits() {
        assert!(FitnessCategory::Poor.needs_general_advice());
        assert!(FitnessCategory::Incompatible.needs_general_advice());
        assert!(!FitnessCategory::Fair.needs_general_advice());
    }

    #[test]
    fn test_category_serializes_lowercase() {
        let json = serde_json::to_string(&FitnessCategory::Excellent).unwrap();
        assert_eq!(json, "\"excellent\"");
    }
}
