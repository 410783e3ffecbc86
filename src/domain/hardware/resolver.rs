//! GPU identifier resolution
//!
//! Turns a free-text renderer string into a memory capacity estimate. The
//! lookup is an explicit ordered chain of steps; the first step that produces
//! an estimate wins and the last step always does, so resolution never fails.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::device::{DeviceDatabase, DeviceRecord};
use super::rules::{ChipTier, ResolverRules, SharePolicy};

/// Confidence tier of a capacity estimate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Fidelity {
    MatchedExact,
    MatchedPattern,
    Estimated,
}

impl Fidelity {
    pub fn label(&self) -> &'static str {
        match self {
            Self::MatchedExact => "matched-exact",
            Self::MatchedPattern => "matched-pattern",
            Self::Estimated => "estimated",
        }
    }
}

/// Where an estimate came from
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ResolutionSource {
    /// Reference database entry; `shared_tier` is set for shared-memory chips
    #[serde(rename_all = "camelCase")]
    Device {
        name: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        shared_tier: Option<ChipTier>,
    },
    /// Built-in or configured name pattern
    Pattern { pattern: String },
    /// Integrated-chip keyword routed to the shared-memory estimator
    #[serde(rename_all = "camelCase")]
    IntegratedKeyword { keyword: String, shared_tier: ChipTier },
    /// Nothing matched
    ConservativeDefault,
}

/// Result of resolving an identifier
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CapacityEstimate {
    #[serde(rename = "capacityGB")]
    pub capacity_gb: f64,
    pub fidelity: Fidelity,
    pub source: ResolutionSource,
}

/// One link of the resolution chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionStep {
    /// Identifier contains manufacturer and model name
    ExactMatch,
    /// Identifier contains the model name only
    PartialMatch,
    /// Ordered capacity pattern table
    PatternTable,
    /// Integrated-chip keywords
    IntegratedKeyword,
    /// Fixed discrete fallback
    ConservativeDefault,
}

pub const DEFAULT_RESOLUTION_CHAIN: [ResolutionStep; 5] = [
    ResolutionStep::ExactMatch,
    ResolutionStep::PartialMatch,
    ResolutionStep::PatternTable,
    ResolutionStep::IntegratedKeyword,
    ResolutionStep::ConservativeDefault,
];

/// Resolves GPU identifiers against an injected reference database
#[derive(Debug, Clone)]
pub struct HardwareResolver {
    database: Arc<DeviceDatabase>,
    rules: Arc<ResolverRules>,
    chain: Vec<ResolutionStep>,
}

impl HardwareResolver {
    /// Create a resolver with the built-in rules
    pub fn new(database: Arc<DeviceDatabase>) -> Self {
        Self::with_rules(database, Arc::new(ResolverRules::default()))
    }

    pub fn with_rules(database: Arc<DeviceDatabase>, rules: Arc<ResolverRules>) -> Self {
        Self {
            database,
            rules,
            chain: DEFAULT_RESOLUTION_CHAIN.to_vec(),
        }
    }

    /// Replace the step order; the conservative default still backs the chain
    pub fn with_chain(mut self, chain: Vec<ResolutionStep>) -> Self {
        self.chain = chain;
        self
    }

    pub fn rules(&self) -> &ResolverRules {
        &self.rules
    }

    /// Resolve an identifier to a capacity estimate
    ///
    /// A negative or non-finite memory hint counts as absent.
    pub fn resolve(&self, identifier: &str, system_memory_hint_gb: Option<f64>) -> CapacityEstimate {
        let needle = identifier.trim().to_lowercase();
        let hint = system_memory_hint_gb.filter(|gb| gb.is_finite() && *gb >= 0.0);

        let estimate = self
            .chain
            .iter()
            .find_map(|step| self.apply(*step, &needle, hint))
            .unwrap_or_else(|| self.conservative_default());

        debug!(
            "Resolved GPU '{}' to {} GB ({})",
            identifier,
            estimate.capacity_gb,
            estimate.fidelity.label()
        );

        estimate
    }

    /// Capacity of a shared-memory chip, sized by its tier and the memory hint
    pub fn estimate_shared(&self, identifier: &str, system_memory_hint_gb: Option<f64>) -> (f64, ChipTier) {
        let needle = identifier.trim().to_lowercase();
        self.size_shared(self.rules.classify_tier(&needle), system_memory_hint_gb)
    }

    fn size_shared(&self, classified: (ChipTier, SharePolicy), hint: Option<f64>) -> (f64, ChipTier) {
        let (tier, policy) = classified;

        let capacity = match hint.filter(|gb| gb.is_finite() && *gb >= 0.0) {
            Some(memory) => policy.apply(memory),
            None => self.rules.shared_default_gb,
        };

        (capacity, tier)
    }

    fn apply(&self, step: ResolutionStep, needle: &str, hint: Option<f64>) -> Option<CapacityEstimate> {
        match step {
            ResolutionStep::ExactMatch => self
                .best_device(needle, |record| {
                    let manufacturer = record.manufacturer.trim().to_lowercase();
                    !manufacturer.is_empty() && needle.contains(&manufacturer)
                })
                .map(|record| self.device_estimate(record, needle, hint)),
            ResolutionStep::PartialMatch => self
                .best_device(needle, |_| true)
                .map(|record| self.device_estimate(record, needle, hint)),
            ResolutionStep::PatternTable => {
                self.rules
                    .match_capacity_pattern(needle)
                    .map(|entry| CapacityEstimate {
                        capacity_gb: entry.capacity_gb,
                        fidelity: Fidelity::MatchedPattern,
                        source: ResolutionSource::Pattern {
                            pattern: entry.pattern.as_str().to_string(),
                        },
                    })
            }
            ResolutionStep::IntegratedKeyword => {
                self.rules.match_integrated_keyword(needle).map(|keyword| {
                    let (capacity_gb, tier) = self.estimate_shared(needle, hint);
                    CapacityEstimate {
                        capacity_gb,
                        fidelity: Fidelity::Estimated,
                        source: ResolutionSource::IntegratedKeyword {
                            keyword: keyword.as_str().to_string(),
                            shared_tier: tier,
                        },
                    }
                })
            }
            ResolutionStep::ConservativeDefault => Some(self.conservative_default()),
        }
    }

    /// Longest model name contained in the identifier wins; ties keep database order
    fn best_device<F>(&self, needle: &str, accept: F) -> Option<&DeviceRecord>
    where
        F: Fn(&DeviceRecord) -> bool,
    {
        let mut best: Option<(&DeviceRecord, usize)> = None;

        for record in self.database.records() {
            let model = record.model_name.trim().to_lowercase();
            if model.is_empty() || !needle.contains(&model) || !accept(record) {
                continue;
            }

            if best.is_none_or(|(_, len)| model.len() > len) {
                best = Some((record, model.len()));
            }
        }

        best.map(|(record, _)| record)
    }

    fn device_estimate(&self, record: &DeviceRecord, needle: &str, hint: Option<f64>) -> CapacityEstimate {
        let dedicated = if record.uses_shared_memory() {
            None
        } else {
            record.dedicated_capacity()
        };

        let (capacity_gb, shared_tier) = match dedicated {
            Some(capacity) => (capacity, None),
            None => {
                // The matched record names the chip; the raw identifier may lack the vendor
                let classified = match self.rules.classify_tier(&record.display_name().to_lowercase()) {
                    (ChipTier::Unknown, _) => self.rules.classify_tier(needle),
                    known => known,
                };
                let (capacity, tier) = self.size_shared(classified, hint);
                (capacity, Some(tier))
            }
        };

        CapacityEstimate {
            capacity_gb,
            fidelity: Fidelity::MatchedExact,
            source: ResolutionSource::Device {
                name: record.display_name(),
                shared_tier,
            },
        }
    }

    fn conservative_default(&self) -> CapacityEstimate {
        CapacityEstimate {
            capacity_gb: self.rules.discrete_default_gb,
            fidelity: Fidelity::Estimated,
            source: ResolutionSource::ConservativeDefault,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::hardware::device::DeviceCapacity;

    fn test_database() -> Arc<DeviceDatabase> {
        Arc::new(DeviceDatabase::new(vec![
            DeviceRecord::discrete("NVIDIA", "RTX 4060", 8.0),
            DeviceRecord::discrete("NVIDIA", "RTX 4060 Ti", 8.0)
                .with_capacity(DeviceCapacity::Variants(vec![8.0, 16.0])),
            DeviceRecord::discrete("AMD", "RX 7800 XT", 16.0),
            DeviceRecord::integrated("AMD", "Radeon 890M"),
            DeviceRecord::integrated("Intel", "Iris Xe"),
        ]))
    }

    fn resolver() -> HardwareResolver {
        HardwareResolver::new(test_database())
    }

    #[test]
    fn test_exact_match_uses_declared_capacity() {
        let estimate = resolver().resolve("NVIDIA GeForce RTX 4060", None);

        assert_eq!(estimate.capacity_gb, 8.0);
        assert_eq!(estimate.fidelity, Fidelity::MatchedExact);
        assert!(matches!(
            estimate.source,
            ResolutionSource::Device { ref name, shared_tier: None } if name == "NVIDIA RTX 4060"
        ));
    }

    #[test]
    fn test_sku_variants_are_sized_by_maximum() {
        let estimate = resolver().resolve("NVIDIA GeForce RTX 4060 Ti", None);
        assert_eq!(estimate.capacity_gb, 16.0);
    }

    #[test]
    fn test_partial_match_without_manufacturer() {
        let estimate = resolver().resolve("Radeon RX 7800 XT", None);

        assert_eq!(estimate.capacity_gb, 16.0);
        assert_eq!(estimate.fidelity, Fidelity::MatchedExact);
    }

    #[test]
    fn test_integrated_device_uses_shared_estimator() {
        let estimate = resolver().resolve("Radeon 890M", Some(64.0));

        assert_eq!(estimate.capacity_gb, 16.0);
        assert_eq!(estimate.fidelity, Fidelity::MatchedExact);
        assert!(matches!(
            estimate.source,
            ResolutionSource::Device { shared_tier: Some(ChipTier::HighEnd), .. }
        ));
    }

    #[test]
    fn test_shared_tier_follows_matched_record() {
        let resolver = HardwareResolver::new(Arc::new(DeviceDatabase::new(vec![
            DeviceRecord::integrated("Apple", "M3 Max"),
        ])));

        let with_vendor = resolver.resolve("Apple M3 Max", Some(64.0));
        let without_vendor = resolver.resolve("M3 Max", Some(64.0));

        assert_eq!(with_vendor.capacity_gb, 16.0);
        assert_eq!(without_vendor.capacity_gb, 16.0);
        assert!(matches!(
            without_vendor.source,
            ResolutionSource::Device { shared_tier: Some(ChipTier::HighEnd), .. }
        ));
    }

    #[test]
    fn test_shared_estimator_floors_before_capping() {
        // mid tier: floor(20 * 0.4) = 8, below the 12 GB cap
        let estimate = resolver().resolve("Intel(R) Iris Xe Graphics", Some(20.0));
        assert_eq!(estimate.capacity_gb, 8.0);
    }

    #[test]
    fn test_shared_estimator_without_hint_uses_default() {
        let estimate = resolver().resolve("Radeon 890M", None);
        assert_eq!(estimate.capacity_gb, 4.0);
    }

    #[test]
    fn test_pattern_fallback() {
        let estimate = resolver().resolve("NVIDIA GeForce RTX 4090/PCIe/SSE2", None);

        assert_eq!(estimate.capacity_gb, 24.0);
        assert_eq!(estimate.fidelity, Fidelity::MatchedPattern);
    }

    #[test]
    fn test_integrated_keyword_fallback() {
        let estimate = resolver().resolve("Intel(R) UHD Graphics 620", Some(16.0));

        // basic tier: floor(16 * 0.25) = 4
        assert_eq!(estimate.capacity_gb, 4.0);
        assert_eq!(estimate.fidelity, Fidelity::Estimated);
        assert!(matches!(
            estimate.source,
            ResolutionSource::IntegratedKeyword { shared_tier: ChipTier::Basic, .. }
        ));
    }

    #[test]
    fn test_unknown_identifier_uses_conservative_default() {
        let estimate = resolver().resolve("Mystery Accelerator 9000", Some(32.0));

        assert_eq!(estimate.capacity_gb, 6.0);
        assert_eq!(estimate.fidelity, Fidelity::Estimated);
        assert_eq!(estimate.source, ResolutionSource::ConservativeDefault);
    }

    #[test]
    fn test_resolution_is_total() {
        let resolver = resolver();
        let identifiers = ["", "   ", "????", "ANGLE (Unknown, Unknown, D3D11)", "日本語"];
        let hints = [None, Some(0.0), Some(-8.0), Some(f64::NAN), Some(128.0)];

        for identifier in identifiers {
            for hint in hints {
                let estimate = resolver.resolve(identifier, hint);
                assert!(estimate.capacity_gb >= 0.0);
            }
        }
    }

    #[test]
    fn test_empty_database_still_resolves() {
        let resolver = HardwareResolver::new(Arc::new(DeviceDatabase::default()));
        let estimate = resolver.resolve("RTX 3060 Ti", None);

        assert_eq!(estimate.capacity_gb, 8.0);
        assert_eq!(estimate.fidelity, Fidelity::MatchedPattern);
    }

    #[test]
    fn test_custom_chain_without_default_still_answers() {
        let resolver = resolver().with_chain(vec![ResolutionStep::ExactMatch]);
        let estimate = resolver.resolve("RTX 9999", None);

        assert_eq!(estimate.capacity_gb, 6.0);
        assert_eq!(estimate.fidelity, Fidelity::Estimated);
    }
}
