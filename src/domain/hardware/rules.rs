//! Swappable rule data for identifier resolution
//!
//! Patterns are literal text with `*` wildcards. A wildcard stands for any run
//! of non-whitespace characters, so `radeon* 780m` matches both
//! `Radeon 780M` and `AMD Radeon(TM) 780M Graphics`. Matching is
//! case-insensitive and unanchored.

use std::fmt;

use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// Compiled literal/wildcard name pattern
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NamePattern {
    source: String,
    regex: Regex,
}

impl NamePattern {
    pub fn new(pattern: impl Into<String>) -> Result<Self, DomainError> {
        let source = pattern.into();
        let trimmed = source.trim();

        if trimmed.is_empty() {
            return Err(DomainError::configuration("Name pattern cannot be empty"));
        }

        let expression = trimmed
            .split('*')
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join(r"\S*");

        let regex = RegexBuilder::new(&expression)
            .case_insensitive(true)
            .build()
            .map_err(|e| {
                DomainError::configuration(format!("Invalid name pattern '{}': {}", source, e))
            })?;

        Ok(Self { source, regex })
    }

    pub fn matches(&self, identifier: &str) -> bool {
        self.regex.is_match(identifier)
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }
}

impl PartialEq for NamePattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl TryFrom<String> for NamePattern {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<NamePattern> for String {
    fn from(pattern: NamePattern) -> Self {
        pattern.source
    }
}

/// Well-known device name fragment with its memory capacity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapacityPattern {
    pub pattern: NamePattern,
    #[serde(rename = "capacityGB")]
    pub capacity_gb: f64,
}

/// Chip family tier for shared-memory GPUs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChipTier {
    HighEnd,
    Mid,
    Basic,
    Unknown,
}

impl ChipTier {
    pub fn label(&self) -> &'static str {
        match self {
            Self::HighEnd => "high-end",
            Self::Mid => "mid-range",
            Self::Basic => "basic",
            Self::Unknown => "unknown",
        }
    }
}

/// Share of system memory a chip tier may claim, and its ceiling
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharePolicy {
    pub fraction: f64,
    #[serde(rename = "capGB")]
    pub cap_gb: f64,
}

impl SharePolicy {
    pub const fn new(fraction: f64, cap_gb: f64) -> Self {
        Self { fraction, cap_gb }
    }

    /// `min(floor(system_memory * fraction), cap)`
    pub fn apply(&self, system_memory_gb: f64) -> f64 {
        (system_memory_gb * self.fraction).floor().min(self.cap_gb).max(0.0)
    }
}

/// Tier definition: patterns that identify the tier plus its share policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedMemoryTier {
    pub tier: ChipTier,
    #[serde(flatten)]
    pub policy: SharePolicy,
    pub patterns: Vec<NamePattern>,
}

/// Complete rule set consumed by the resolver
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResolverRules {
    /// Ordered newest/highest-capacity first; first match wins
    pub capacity_patterns: Vec<CapacityPattern>,
    /// Fragments that mark an identifier as an integrated chip
    pub integrated_keywords: Vec<NamePattern>,
    /// Evaluated in order; the first tier with a matching pattern applies
    pub shared_tiers: Vec<SharedMemoryTier>,
    pub unknown_integrated: SharePolicy,
    /// Used for shared-memory chips when no system memory hint is available
    #[serde(rename = "sharedDefaultGB")]
    pub shared_default_gb: f64,
    /// Used when nothing identifies the device
    #[serde(rename = "discreteDefaultGB")]
    pub discrete_default_gb: f64,
}

impl Default for ResolverRules {
    fn default() -> Self {
        BUILTIN_RULES.clone()
    }
}

impl ResolverRules {
    /// Tier for a shared-memory chip, with the policy that applies to it
    pub fn classify_tier(&self, identifier: &str) -> (ChipTier, SharePolicy) {
        self.shared_tiers
            .iter()
            .find(|tier| tier.patterns.iter().any(|p| p.matches(identifier)))
            .map(|tier| (tier.tier, tier.policy))
            .unwrap_or((ChipTier::Unknown, self.unknown_integrated))
    }

    pub fn match_capacity_pattern(&self, identifier: &str) -> Option<&CapacityPattern> {
        self.capacity_patterns
            .iter()
            .find(|entry| entry.pattern.matches(identifier))
    }

    pub fn match_integrated_keyword(&self, identifier: &str) -> Option<&NamePattern> {
        self.integrated_keywords
            .iter()
            .find(|keyword| keyword.matches(identifier))
    }

    /// Check every capacity and share policy, returning all problems found
    pub fn validate(&self) -> Vec<RuleValidationError> {
        let mut errors = Vec::new();
        let positive = |value: f64| value.is_finite() && value > 0.0;

        for entry in &self.capacity_patterns {
            if !positive(entry.capacity_gb) {
                errors.push(RuleValidationError::InvalidCapacity {
                    field: format!("capacityPatterns '{}'", entry.pattern.as_str()),
                    value: entry.capacity_gb,
                });
            }
        }

        let policies = self
            .shared_tiers
            .iter()
            .map(|tier| (tier.tier.label(), tier.policy))
            .chain(std::iter::once(("unknownIntegrated", self.unknown_integrated)));

        for (name, policy) in policies {
            if !(policy.fraction.is_finite() && policy.fraction > 0.0 && policy.fraction <= 1.0) {
                errors.push(RuleValidationError::InvalidFraction {
                    tier: name.to_string(),
                    value: policy.fraction,
                });
            }
            if !positive(policy.cap_gb) {
                errors.push(RuleValidationError::InvalidCapacity {
                    field: format!("{} capGB", name),
                    value: policy.cap_gb,
                });
            }
        }

        for (field, value) in [
            ("sharedDefaultGB", self.shared_default_gb),
            ("discreteDefaultGB", self.discrete_default_gb),
        ] {
            if !positive(value) {
                errors.push(RuleValidationError::InvalidCapacity {
                    field: field.to_string(),
                    value,
                });
            }
        }

        errors
    }
}

/// Resolver rule validation errors
#[derive(Debug, Clone, PartialEq)]
pub enum RuleValidationError {
    InvalidCapacity { field: String, value: f64 },
    InvalidFraction { tier: String, value: f64 },
}

impl fmt::Display for RuleValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidCapacity { field, value } => write!(
                f,
                "{}: capacity must be a positive number, got: {}",
                field, value
            ),
            Self::InvalidFraction { tier, value } => write!(
                f,
                "{} tier: fraction must be in (0, 1], got: {}",
                tier, value
            ),
        }
    }
}

impl std::error::Error for RuleValidationError {}

const CAPACITY_PATTERNS: &[(&str, f64)] = &[
    // NVIDIA data centre and workstation
    ("h100", 80.0),
    ("a100", 80.0),
    ("rtx 6000 ada", 48.0),
    ("rtx a6000", 48.0),
    ("l40*", 48.0),
    // NVIDIA consumer, newest first
    ("rtx 5090", 32.0),
    ("rtx 5080", 16.0),
    ("rtx 5070 ti", 16.0),
    ("rtx 5070", 12.0),
    ("rtx 5060 ti", 16.0),
    ("rtx 5060", 8.0),
    ("rtx 4090 laptop", 16.0),
    ("rtx 4090", 24.0),
    ("rtx 4080 laptop", 12.0),
    ("rtx 4080*", 16.0),
    ("rtx 4070 ti super", 16.0),
    ("rtx 4070 laptop", 8.0),
    ("rtx 4070*", 12.0),
    ("rtx 4060 ti", 8.0),
    ("rtx 4060*", 8.0),
    ("rtx 4050*", 6.0),
    ("rtx 3090*", 24.0),
    ("rtx 3080 ti", 12.0),
    ("rtx 3080*", 10.0),
    ("rtx 3070*", 8.0),
    ("rtx 3060 ti", 8.0),
    ("rtx 3060 laptop", 6.0),
    ("rtx 3060", 12.0),
    ("rtx 3050*", 8.0),
    ("titan rtx", 24.0),
    ("rtx 2080 ti", 11.0),
    ("rtx 2080*", 8.0),
    ("rtx 2070*", 8.0),
    ("rtx 2060*", 6.0),
    ("gtx 1080 ti", 11.0),
    ("gtx 1080", 8.0),
    ("gtx 1070*", 8.0),
    ("gtx 1660*", 6.0),
    ("gtx 1650*", 4.0),
    ("gtx 1060*", 6.0),
    ("gtx 1050*", 4.0),
    // AMD
    ("rx 9070 xt", 16.0),
    ("rx 9070", 16.0),
    ("rx 7900 xtx", 24.0),
    ("rx 7900*", 20.0),
    ("rx 7800*", 16.0),
    ("rx 7700*", 12.0),
    ("rx 7600 xt", 16.0),
    ("rx 7600*", 8.0),
    ("rx 6950*", 16.0),
    ("rx 6900*", 16.0),
    ("rx 6800*", 16.0),
    ("rx 6750*", 12.0),
    ("rx 6700*", 12.0),
    ("rx 6650*", 8.0),
    ("rx 6600*", 8.0),
    ("rx 6500*", 4.0),
    ("rx 5700*", 8.0),
    ("rx 5600*", 6.0),
    ("rx 580", 8.0),
    ("rx 570", 4.0),
    // Intel discrete
    ("arc* b580", 12.0),
    ("arc* b570", 10.0),
    ("arc* a770", 16.0),
    ("arc* a750", 8.0),
    ("arc* a580", 8.0),
    ("arc* a380", 6.0),
];

const INTEGRATED_KEYWORDS: &[&str] = &[
    "integrated",
    "intel",
    "iris",
    "uhd",
    "apple m*",
    "apple gpu",
    "radeon* graphics",
    "radeon* *m",
    "radeon* 80*0s",
    "vega",
    "adreno",
    "mali",
    "powervr",
];

const HIGH_END_TIER: &[&str] = &[
    "radeon* 8060s",
    "radeon* 8050s",
    "radeon* 890m",
    "radeon* 880m",
    "radeon* 780m",
    "arc* graphics",
    "apple m* max",
    "apple m* ultra",
];

const MID_TIER: &[&str] = &[
    "radeon* 760m",
    "radeon* 740m",
    "radeon* 680m",
    "radeon* 660m",
    "iris* xe",
    "apple m* pro",
    "apple m*",
];

const BASIC_TIER: &[&str] = &[
    "uhd",
    "hd graphics",
    "vega",
    "radeon* graphics",
    "adreno",
    "mali",
    "powervr",
];

fn compile_all(patterns: &[&str]) -> Vec<NamePattern> {
    patterns
        .iter()
        .map(|p| NamePattern::new(*p).expect("built-in name pattern is valid"))
        .collect()
}

static BUILTIN_RULES: Lazy<ResolverRules> = Lazy::new(|| ResolverRules {
    capacity_patterns: CAPACITY_PATTERNS
        .iter()
        .map(|(pattern, capacity_gb)| CapacityPattern {
            pattern: NamePattern::new(*pattern).expect("built-in capacity pattern is valid"),
            capacity_gb: *capacity_gb,
        })
        .collect(),
    integrated_keywords: compile_all(INTEGRATED_KEYWORDS),
    shared_tiers: vec![
        SharedMemoryTier {
            tier: ChipTier::HighEnd,
            policy: SharePolicy::new(0.5, 16.0),
            patterns: compile_all(HIGH_END_TIER),
        },
        SharedMemoryTier {
            tier: ChipTier::Mid,
            policy: SharePolicy::new(0.4, 12.0),
            patterns: compile_all(MID_TIER),
        },
        SharedMemoryTier {
            tier: ChipTier::Basic,
            policy: SharePolicy::new(0.25, 8.0),
            patterns: compile_all(BASIC_TIER),
        },
    ],
    unknown_integrated: SharePolicy::new(0.3, 8.0),
    shared_default_gb: 4.0,
    discrete_default_gb: 6.0,
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_pattern_is_case_insensitive() {
        let pattern = NamePattern::new("rtx 4090").unwrap();
        assert!(pattern.matches("NVIDIA GeForce RTX 4090/PCIe/SSE2"));
        assert!(!pattern.matches("NVIDIA GeForce RTX 4080"));
    }

    #[test]
    fn test_wildcard_stays_within_a_token() {
        let pattern = NamePattern::new("radeon* *m").unwrap();
        assert!(pattern.matches("AMD Radeon(TM) 780M Graphics"));
        assert!(pattern.matches("radeon 890m"));
        assert!(!pattern.matches("AMD Radeon RX 7900 XTX"));
    }

    #[test]
    fn test_regex_metacharacters_are_literal() {
        let pattern = NamePattern::new("radeon(tm) graphics").unwrap();
        assert!(pattern.matches("AMD Radeon(TM) Graphics"));
        assert!(!pattern.matches("AMD Radeontm Graphics"));
    }

    #[test]
    fn test_empty_pattern_is_rejected() {
        assert!(NamePattern::new("  ").is_err());
    }

    #[test]
    fn test_specific_patterns_precede_generic_ones() {
        let rules = ResolverRules::default();
        let hit = |id: &str| rules.match_capacity_pattern(id).map(|p| p.capacity_gb);

        assert_eq!(hit("GeForce RTX 3060 Ti"), Some(8.0));
        assert_eq!(hit("GeForce RTX 3060"), Some(12.0));
        assert_eq!(hit("GeForce RTX 4070 Ti SUPER"), Some(16.0));
        assert_eq!(hit("GeForce RTX 4070 SUPER"), Some(12.0));
        assert_eq!(hit("Radeon RX 7900 XTX"), Some(24.0));
        assert_eq!(hit("Intel(R) Arc(TM) A770 Graphics"), Some(16.0));
        assert_eq!(hit("Mystery Accelerator 9000"), None);
    }

    #[test]
    fn test_tier_classification() {
        let rules = ResolverRules::default();

        assert_eq!(rules.classify_tier("radeon 890m").0, ChipTier::HighEnd);
        assert_eq!(rules.classify_tier("apple m3 max").0, ChipTier::HighEnd);
        assert_eq!(rules.classify_tier("apple m2").0, ChipTier::Mid);
        assert_eq!(rules.classify_tier("intel(r) iris(r) xe graphics").0, ChipTier::Mid);
        assert_eq!(rules.classify_tier("intel(r) uhd graphics 620").0, ChipTier::Basic);

        let (tier, policy) = rules.classify_tier("some integrated thing");
        assert_eq!(tier, ChipTier::Unknown);
        assert_eq!(policy, SharePolicy::new(0.3, 8.0));
    }

    #[test]
    fn test_share_policy_floors_then_caps() {
        let policy = SharePolicy::new(0.4, 12.0);
        assert_eq!(policy.apply(15.0), 6.0);
        assert_eq!(policy.apply(64.0), 12.0);
    }

    #[test]
    fn test_builtin_rules_are_valid() {
        assert!(ResolverRules::default().validate().is_empty());
    }

    #[test]
    fn test_validate_rejects_non_positive_values() {
        let json = r#"{
            "capacityPatterns": [{"pattern": "rtx", "capacityGB": -8}],
            "unknownIntegrated": {"fraction": 1.5, "capGB": -1},
            "discreteDefaultGB": -1
        }"#;
        let rules: ResolverRules = serde_json::from_str(json).unwrap();
        let errors = rules.validate();

        assert_eq!(errors.len(), 4);
        assert!(errors.contains(&RuleValidationError::InvalidFraction {
            tier: "unknownIntegrated".to_string(),
            value: 1.5,
        }));
        assert!(errors[0].to_string().contains("capacityPatterns 'rtx'"));
    }

    #[test]
    fn test_rules_deserialize_with_partial_overrides() {
        let json = r#"{
            "capacityPatterns": [{"pattern": "quantum gpu*", "capacityGB": 42}],
            "discreteDefaultGB": 4
        }"#;
        let rules: ResolverRules = serde_json::from_str(json).unwrap();

        assert_eq!(rules.capacity_patterns.len(), 1);
        assert_eq!(
            rules.match_capacity_pattern("Quantum GPU-X").map(|p| p.capacity_gb),
            Some(42.0)
        );
        assert_eq!(rules.discrete_default_gb, 4.0);
        assert_eq!(rules.shared_default_gb, 4.0);
        assert!(!rules.shared_tiers.is_empty());
    }
}
