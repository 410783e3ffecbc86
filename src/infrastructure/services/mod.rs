//! Infrastructure services

mod profile_service;
mod recommendation_service;

pub use profile_service::{ProfileInput, ProfileService};
pub use recommendation_service::{
    ProfileSummary, RecommendationReport, RecommendationRequest, RecommendationService,
};
