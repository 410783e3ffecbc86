//! Recommendation service - runs the evaluator over the loaded catalog

use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use crate::domain::catalog::Artifact;
use crate::domain::fitness::{
    recommend, sort_recommendations, RecommendationFilters, RecommendedArtifact, SortMode,
};
use crate::domain::hardware::{AcceptableQuality, Fidelity, HardwareProfile, Priority};

/// What to recommend and how to present it
#[derive(Debug, Clone, Default)]
pub struct RecommendationRequest {
    pub filters: RecommendationFilters,
    pub sort: SortMode,
    /// Keep only the first N results after sorting
    pub limit: Option<usize>,
}

/// Hardware facts the report was computed against
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gpu_identifier: Option<String>,
    #[serde(rename = "gpuCapacityGB", skip_serializing_if = "Option::is_none")]
    pub gpu_capacity_gb: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gpu_fidelity: Option<Fidelity>,
    #[serde(rename = "systemMemoryGB")]
    pub system_memory_gb: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpu_core_count: Option<u32>,
    pub priority: Priority,
    pub acceptable_quality: AcceptableQuality,
}

impl From<&HardwareProfile> for ProfileSummary {
    fn from(profile: &HardwareProfile) -> Self {
        Self {
            gpu_identifier: profile.gpu_identifier.clone(),
            gpu_capacity_gb: profile.gpu_capacity(),
            gpu_fidelity: profile.gpu_fidelity,
            system_memory_gb: profile.system_memory_gb,
            cpu_core_count: profile.cpu_core_count,
            priority: profile.preferences.priority,
            acceptable_quality: profile.preferences.acceptable_quality,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationReport {
    pub profile: ProfileSummary,
    pub sort: SortMode,
    /// Compatible artifacts before the limit was applied
    pub total_compatible: usize,
    pub results: Vec<RecommendedArtifact>,
    /// True when no artifact has a compatible variant
    pub nothing_fits: bool,
}

/// Recommendation service over an immutable catalog
#[derive(Debug, Clone)]
pub struct RecommendationService {
    catalog: Arc<Vec<Artifact>>,
}

impl RecommendationService {
    pub fn new(catalog: Arc<Vec<Artifact>>) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &[Artifact] {
        &self.catalog
    }

    pub fn recommend(&self, hardware: &HardwareProfile, request: &RecommendationRequest) -> RecommendationReport {
        let mut results = recommend(hardware, &self.catalog, Some(&request.filters));
        let total_compatible = results.len();

        if request.sort != SortMode::Score {
            sort_recommendations(&mut results, request.sort);
        }

        if let Some(limit) = request.limit {
            results.truncate(limit);
        }

        info!(
            catalog = self.catalog.len(),
            compatible = total_compatible,
            sort = request.sort.label(),
            "Built recommendation report"
        );

        RecommendationReport {
            profile: ProfileSummary::from(hardware),
            sort: request.sort,
            total_compatible,
            results,
            nothing_fits: total_compatible == 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::ArtifactVariant;

    fn catalog() -> Arc<Vec<Artifact>> {
        Arc::new(vec![
            Artifact::new("mistral-7b", "Mistral 7B", "7B")
                .with_use_case("chat")
                .with_variant(ArtifactVariant::new("Q4_K_M", 5.0, 8.0, 4.4, 32768)),
            Artifact::new("qwen-coder-1.5b", "Qwen Coder 1.5B", "1.5B")
                .with_use_case("coding")
                .with_variant(ArtifactVariant::new("Q4_K_M", 1.5, 2.0, 1.0, 8192)),
            Artifact::new("llama-70b", "Llama 70B", "70B")
                .with_use_case("chat")
                .with_variant(ArtifactVariant::new("Q4_K_M", 40.0, 48.0, 40.0, 131072)),
        ])
    }

    fn hardware() -> HardwareProfile {
        HardwareProfile::new(16.0).with_gpu("RTX 3070", 8.0, Fidelity::MatchedExact)
    }

    #[test]
    fn test_report_lists_compatible_artifacts() {
        let service = RecommendationService::new(catalog());
        let report = service.recommend(&hardware(), &RecommendationRequest::default());

        assert_eq!(report.total_compatible, 2);
        assert!(!report.nothing_fits);
        assert_eq!(report.profile.gpu_capacity_gb, Some(8.0));
        assert!(report.results.windows(2).all(|w| w[0].score() >= w[1].score()));
    }

    #[test]
    fn test_limit_applies_after_sort() {
        let service = RecommendationService::new(catalog());
        let request = RecommendationRequest {
            sort: SortMode::Vram,
            limit: Some(1),
            ..Default::default()
        };
        let report = service.recommend(&hardware(), &request);

        assert_eq!(report.total_compatible, 2);
        assert_eq!(report.results.len(), 1);
        assert_eq!(report.results[0].artifact.id, "qwen-coder-1.5b");
    }

    #[test]
    fn test_nothing_fits() {
        let service = RecommendationService::new(catalog());
        let report = service.recommend(&HardwareProfile::new(1.0), &RecommendationRequest::default());

        assert!(report.nothing_fits);
        assert!(report.results.is_empty());
    }

    #[test]
    fn test_report_serializes_camel_case() {
        let service = RecommendationService::new(catalog());
        let report = service.recommend(&hardware(), &RecommendationRequest::default());
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["nothingFits"], false);
        assert_eq!(json["profile"]["systemMemoryGB"], 16.0);
        assert!(json["results"][0]["topAssessment"]["category"].is_string());
        assert!(json["results"][0]["defaultVariant"]["vramRequired"].is_number());
    }
}
