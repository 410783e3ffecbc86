//! Hardware profile and user preference types

use serde::{Deserialize, Serialize};

use super::resolver::Fidelity;

/// Operating system family reported by the probing layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OsFamily {
    Windows,
    Macos,
    Linux,
    #[default]
    Unknown,
}

impl std::str::FromStr for OsFamily {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "windows" | "win" => Ok(Self::Windows),
            "macos" | "mac" | "darwin" | "osx" => Ok(Self::Macos),
            "linux" => Ok(Self::Linux),
            "unknown" => Ok(Self::Unknown),
            other => Err(format!("Unknown OS family '{}'", other)),
        }
    }
}

/// What the user wants the recommendation to optimise for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Quality,
    Speed,
    #[default]
    Balanced,
}

impl Priority {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Quality => "quality",
            Self::Speed => "speed",
            Self::Balanced => "balanced",
        }
    }
}

impl std::str::FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "quality" => Ok(Self::Quality),
            "speed" => Ok(Self::Speed),
            "balanced" => Ok(Self::Balanced),
            other => Err(format!(
                "Unknown priority '{}': expected quality, speed or balanced",
                other
            )),
        }
    }
}

/// Lowest output quality the user is willing to accept
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AcceptableQuality {
    High,
    Medium,
    #[default]
    Any,
}

impl std::str::FromStr for AcceptableQuality {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "high" => Ok(Self::High),
            "medium" => Ok(Self::Medium),
            "any" => Ok(Self::Any),
            other => Err(format!(
                "Unknown quality floor '{}': expected high, medium or any",
                other
            )),
        }
    }
}

/// User preferences that steer scoring
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPreferences {
    #[serde(default)]
    pub priority: Priority,

    #[serde(default)]
    pub acceptable_quality: AcceptableQuality,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub selected_use_cases: Vec<String>,
}

impl UserPreferences {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_acceptable_quality(mut self, quality: AcceptableQuality) -> Self {
        self.acceptable_quality = quality;
        self
    }

    pub fn with_use_case(mut self, use_case: impl Into<String>) -> Self {
        self.selected_use_cases.push(use_case.into());
        self
    }
}

/// Resolved description of the user's machine
///
/// `gpu_capacity_gb` always comes out of hardware resolution; the raw detector
/// string is kept in `gpu_identifier` for display only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HardwareProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gpu_identifier: Option<String>,

    #[serde(default, rename = "gpuCapacityGB", skip_serializing_if = "Option::is_none")]
    pub gpu_capacity_gb: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gpu_fidelity: Option<Fidelity>,

    #[serde(rename = "systemMemoryGB")]
    pub system_memory_gb: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu_core_count: Option<u32>,

    #[serde(default)]
    pub os_family: OsFamily,

    #[serde(default)]
    pub preferences: UserPreferences,

    /// Soft failures reported while probing; informational only
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub detection_errors: Vec<String>,
}

impl HardwareProfile {
    /// Create a RAM-only profile; negative or non-finite memory is recorded as 0
    pub fn new(system_memory_gb: f64) -> Self {
        let system_memory_gb = if system_memory_gb.is_finite() {
            system_memory_gb.max(0.0)
        } else {
            0.0
        };

        Self {
            gpu_identifier: None,
            gpu_capacity_gb: None,
            gpu_fidelity: None,
            system_memory_gb,
            cpu_core_count: None,
            os_family: OsFamily::Unknown,
            preferences: UserPreferences::default(),
            detection_errors: Vec::new(),
        }
    }

    pub fn with_gpu(mut self, identifier: impl Into<String>, capacity_gb: f64, fidelity: Fidelity) -> Self {
        self.gpu_identifier = Some(identifier.into());
        self.gpu_capacity_gb = Some(capacity_gb.max(0.0));
        self.gpu_fidelity = Some(fidelity);
        self
    }

    pub fn with_cpu_cores(mut self, cores: u32) -> Self {
        self.cpu_core_count = Some(cores);
        self
    }

    pub fn with_os_family(mut self, os_family: OsFamily) -> Self {
        self.os_family = os_family;
        self
    }

    pub fn with_preferences(mut self, preferences: UserPreferences) -> Self {
        self.preferences = preferences;
        self
    }

    pub fn with_detection_error(mut self, error: impl Into<String>) -> Self {
        self.detection_errors.push(error.into());
        self
    }

    /// GPU capacity when the profile has a usable GPU
    pub fn gpu_capacity(&self) -> Option<f64> {
        self.gpu_capacity_gb.filter(|gb| *gb > 0.0)
    }

    pub fn has_gpu(&self) -> bool {
        self.gpu_capacity().is_some()
    }
}
