//! Artifact catalog entities

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::validation::parse_parameter_count;

/// Context size assumed when an artifact has no recommendation for a use case
pub const DEFAULT_RECOMMENDED_CONTEXT: u32 = 4096;

/// One quantized build of an artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactVariant {
    pub quantization: String,
    pub vram_required: f64,
    pub ram_required: f64,
    pub file_size: f64,
    pub context_window: u32,
}

impl ArtifactVariant {
    pub fn new(
        quantization: impl Into<String>,
        vram_required: f64,
        ram_required: f64,
        file_size: f64,
        context_window: u32,
    ) -> Self {
        Self {
            quantization: quantization.into(),
            vram_required,
            ram_required,
            file_size,
            context_window,
        }
    }
}

/// Benchmark results and curated rating
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityMetrics {
    /// MMLU, 0-100
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mmlu: Option<f64>,

    /// HumanEval, 0-100
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub human_eval: Option<f64>,

    /// MT-Bench, 0-10
    #[serde(default, rename = "mt_bench", skip_serializing_if = "Option::is_none")]
    pub mt_bench: Option<f64>,

    /// Curated rating, 0-5
    pub overall_rating: f64,
}

impl QualityMetrics {
    pub fn new(overall_rating: f64) -> Self {
        Self {
            mmlu: None,
            human_eval: None,
            mt_bench: None,
            overall_rating,
        }
    }

    pub fn with_mmlu(mut self, value: f64) -> Self {
        self.mmlu = Some(value);
        self
    }

    pub fn with_human_eval(mut self, value: f64) -> Self {
        self.human_eval = Some(value);
        self
    }

    pub fn with_mt_bench(mut self, value: f64) -> Self {
        self.mt_bench = Some(value);
        self
    }

    /// Mean of the available benchmarks, each scaled to 0-1
    pub fn normalized_benchmark_average(&self) -> Option<f64> {
        let normalized: Vec<f64> = [
            self.mmlu.map(|v| v / 100.0),
            self.human_eval.map(|v| v / 100.0),
            self.mt_bench.map(|v| v / 10.0),
        ]
        .into_iter()
        .flatten()
        .map(|v| v.clamp(0.0, 1.0))
        .collect();

        if normalized.is_empty() {
            None
        } else {
            Some(normalized.iter().sum::<f64>() / normalized.len() as f64)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InferenceSpeed {
    Fast,
    Medium,
    Slow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityLevel {
    High,
    Medium,
    Low,
}

/// Declared speed/quality trade-off of an artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceProfile {
    pub inference_speed: InferenceSpeed,
    pub quality_level: QualityLevel,
}

/// Where to get an artifact
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactLinks {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hugging_face: Option<String>,

    /// Shell command, e.g. `ollama run llama3`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ollama: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
}

impl ArtifactLinks {
    /// (key, value) pairs of the links that are set
    pub fn entries(&self) -> Vec<(&'static str, &str)> {
        [
            ("huggingFace", self.hugging_face.as_deref()),
            ("ollama", self.ollama.as_deref()),
            ("website", self.website.as_deref()),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.map(|v| (key, v)))
        .collect()
    }
}

/// A catalog entry: one model family with its quantized variants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Size label such as `7B` or `500M`
    pub parameters: String,
    pub provider: String,
    pub license: String,
    pub use_cases: Vec<String>,
    pub tags: Vec<String>,
    pub variants: Vec<ArtifactVariant>,
    pub links: ArtifactLinks,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality_metrics: Option<QualityMetrics>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub performance_profile: Option<PerformanceProfile>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub recommended_contexts: BTreeMap<String, u32>,
}

impl Artifact {
    pub fn new(id: impl Into<String>, name: impl Into<String>, parameters: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            parameters: parameters.into(),
            provider: String::new(),
            license: String::new(),
            use_cases: Vec::new(),
            tags: Vec::new(),
            variants: Vec::new(),
            links: ArtifactLinks::default(),
            quality_metrics: None,
            performance_profile: None,
            recommended_contexts: BTreeMap::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = provider.into();
        self
    }

    pub fn with_license(mut self, license: impl Into<String>) -> Self {
        self.license = license.into();
        self
    }

    pub fn with_use_case(mut self, use_case: impl Into<String>) -> Self {
        self.use_cases.push(use_case.into());
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn with_variant(mut self, variant: ArtifactVariant) -> Self {
        self.variants.push(variant);
        self
    }

    pub fn with_links(mut self, links: ArtifactLinks) -> Self {
        self.links = links;
        self
    }

    pub fn with_quality_metrics(mut self, metrics: QualityMetrics) -> Self {
        self.quality_metrics = Some(metrics);
        self
    }

    pub fn with_performance_profile(mut self, profile: PerformanceProfile) -> Self {
        self.performance_profile = Some(profile);
        self
    }

    pub fn with_recommended_context(mut self, use_case: impl Into<String>, tokens: u32) -> Self {
        self.recommended_contexts.insert(use_case.into(), tokens);
        self
    }

    /// Parameter count in billions; 0 when the label cannot be parsed
    pub fn params_b(&self) -> f64 {
        parse_parameter_count(&self.parameters).unwrap_or(0.0)
    }

    pub fn has_use_case(&self, use_case: &str) -> bool {
        self.use_cases
            .iter()
            .any(|uc| uc.eq_ignore_ascii_case(use_case.trim()))
    }

    /// Recommended context for a use case, else for the artifact's first use case
    pub fn recommended_context_for<'a>(
        &'a self,
        use_case: Option<&'a str>,
    ) -> (Option<&'a str>, u32) {
        let use_case = use_case.or_else(|| self.use_cases.first().map(String::as_str));

        let tokens = use_case
            .and_then(|uc| {
                self.recommended_contexts
                    .iter()
                    .find(|(key, _)| key.eq_ignore_ascii_case(uc))
                    .map(|(_, tokens)| *tokens)
            })
            .filter(|tokens| *tokens > 0)
            .unwrap_or(DEFAULT_RECOMMENDED_CONTEXT);

        (use_case, tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_json() -> &'static str {
        r#"{
            "id": "llama-3.1-8b",
            "name": "Llama 3.1 8B",
            "description": "General purpose model",
            "parameters": "8B",
            "provider": "Meta",
            "license": "Llama 3 Community License",
            "useCases": ["chat", "coding"],
            "tags": ["instruct"],
            "variants": [
                {"quantization": "Q4_K_M", "vramRequired": 6, "ramRequired": 8, "fileSize": 4.9, "contextWindow": 131072}
            ],
            "links": {"huggingFace": "https://huggingface.co/meta-llama/Llama-3.1-8B", "ollama": "ollama run llama3.1"},
            "qualityMetrics": {"mmlu": 68.4, "humanEval": 62.2, "overallRating": 4.1},
            "performanceProfile": {"inferenceSpeed": "fast", "qualityLevel": "high"},
            "recommendedContexts": {"chat": 4096, "coding": 8192}
        }"#
    }

    #[test]
    fn test_artifact_deserializes_catalog_shape() {
        let artifact: Artifact = serde_json::from_str(sample_json()).unwrap();

        assert_eq!(artifact.id, "llama-3.1-8b");
        assert_eq!(artifact.params_b(), 8.0);
        assert_eq!(artifact.variants[0].context_window, 131072);
        assert_eq!(artifact.links.entries().len(), 2);
        assert_eq!(
            artifact.performance_profile.unwrap().inference_speed,
            InferenceSpeed::Fast
        );
    }

    #[test]
    fn test_missing_required_field_fails_to_parse() {
        let json = sample_json().replace(r#""parameters": "8B","#, "");
        let result: Result<Artifact, _> = serde_json::from_str(&json);

        assert!(result.unwrap_err().to_string().contains("parameters"));
    }

    #[test]
    fn test_normalized_benchmark_average() {
        let metrics = QualityMetrics::new(4.0).with_mmlu(80.0).with_mt_bench(6.0);
        let avg = metrics.normalized_benchmark_average().unwrap();
        assert!((avg - 0.7).abs() < 1e-9);

        assert!(QualityMetrics::new(3.0).normalized_benchmark_average().is_none());
    }

    #[test]
    fn test_recommended_context_defaults_to_first_use_case() {
        let artifact: Artifact = serde_json::from_str(sample_json()).unwrap();

        assert_eq!(artifact.recommended_context_for(None), (Some("chat"), 4096));
        assert_eq!(artifact.recommended_context_for(Some("Coding")), (Some("Coding"), 8192));
        assert_eq!(
            artifact.recommended_context_for(Some("writing")),
            (Some("writing"), DEFAULT_RECOMMENDED_CONTEXT)
        );
    }

    #[test]
    fn test_recommended_context_echoes_caller_use_case() {
        let artifact: Artifact = serde_json::from_str(sample_json()).unwrap();
        let selected = String::from("coding");

        let (use_case, tokens) = artifact.recommended_context_for(Some(selected.as_str()));
        assert_eq!(use_case, Some("coding"));
        assert_eq!(tokens, 8192);
    }

    #[test]
    fn test_unparseable_parameters_count_as_zero() {
        let artifact = Artifact::new("mixtral", "Mixtral", "8x7B");
        assert_eq!(artifact.params_b(), 0.0);
    }

    #[test]
    fn test_has_use_case_is_case_insensitive() {
        let artifact = Artifact::new("a", "A", "1B").with_use_case("Coding");
        assert!(artifact.has_use_case("coding"));
        assert!(!artifact.has_use_case("chat"));
    }
}
