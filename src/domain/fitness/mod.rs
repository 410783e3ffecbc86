//! Fitness domain - scoring artifact variants against a hardware profile

mod assessment;
mod evaluator;
mod explain;
mod factors;
mod recommend;

pub use assessment::{
    ExplainableReason, FitnessAssessment, FitnessCategory, Impact, Rating, EXCELLENT_THRESHOLD,
    FAIR_THRESHOLD, GOOD_THRESHOLD, POOR_THRESHOLD,
};
pub use evaluator::{
    evaluate, suggestions, warnings, BASE_SCORE, FASTER_MODEL_SUGGESTION, GENERAL_SUGGESTION,
    HIGH_RAM_WARNING, HIGH_VRAM_WARNING, LARGER_MODEL_SUGGESTION, LOW_CORES_WARNING,
    QUANTIZATION_SUGGESTION,
};
pub use explain::{explain, explain_all};
pub use factors::{
    headroom_penalty, rate, score_factors, BonusSource, Capability, FactorDetail, FactorKind,
    FactorScore, RATING_THRESHOLD,
};
pub use recommend::{
    check_hard_filters, recommend, sort_recommendations, FilterRejection, RecommendationFilters,
    RecommendedArtifact, SortMode, VariantAssessment,
};
