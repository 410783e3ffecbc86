//! Reference device database types

use std::fmt;

use serde::{Deserialize, Serialize};

/// Whether a GPU has its own memory pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceClass {
    Discrete,
    Integrated,
}

/// Marker used in the database for GPUs that borrow system memory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SharedMarker {
    Shared,
}

/// Declared memory capacity of a device
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DeviceCapacity {
    /// Single capacity in GB
    Fixed(f64),
    /// SKU variants sold under one model name
    Variants(Vec<f64>),
    /// No dedicated memory
    Shared(SharedMarker),
}

/// One entry of the reference device database
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceRecord {
    pub manufacturer: String,
    pub model_name: String,
    pub class: DeviceClass,
    #[serde(rename = "capacityGB")]
    pub capacity_gb: DeviceCapacity,
}

impl DeviceRecord {
    pub fn discrete(manufacturer: impl Into<String>, model_name: impl Into<String>, capacity_gb: f64) -> Self {
        Self {
            manufacturer: manufacturer.into(),
            model_name: model_name.into(),
            class: DeviceClass::Discrete,
            capacity_gb: DeviceCapacity::Fixed(capacity_gb),
        }
    }

    pub fn integrated(manufacturer: impl Into<String>, model_name: impl Into<String>) -> Self {
        Self {
            manufacturer: manufacturer.into(),
            model_name: model_name.into(),
            class: DeviceClass::Integrated,
            capacity_gb: DeviceCapacity::Shared(SharedMarker::Shared),
        }
    }

    pub fn with_capacity(mut self, capacity: DeviceCapacity) -> Self {
        self.capacity_gb = capacity;
        self
    }

    /// True when capacity must be derived from system memory
    pub fn uses_shared_memory(&self) -> bool {
        self.class == DeviceClass::Integrated
            || matches!(self.capacity_gb, DeviceCapacity::Shared(_))
    }

    /// Dedicated capacity; SKU variants are sized by their maximum
    pub fn dedicated_capacity(&self) -> Option<f64> {
        match &self.capacity_gb {
            DeviceCapacity::Fixed(gb) => Some(*gb),
            DeviceCapacity::Variants(values) => values.iter().copied().reduce(f64::max),
            DeviceCapacity::Shared(_) => None,
        }
    }

    pub fn display_name(&self) -> String {
        format!("{} {}", self.manufacturer, self.model_name)
    }
}

/// Device database validation errors
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceValidationError {
    EmptyManufacturer { index: usize },
    EmptyModelName { index: usize },
    InvalidCapacity { index: usize, model: String, value: f64 },
    EmptyCapacityVariants { index: usize, model: String },
}

impl fmt::Display for DeviceValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyManufacturer { index } => {
                write!(f, "Device {}: manufacturer cannot be empty", index)
            }
            Self::EmptyModelName { index } => {
                write!(f, "Device {}: modelName cannot be empty", index)
            }
            Self::InvalidCapacity { index, model, value } => write!(
                f,
                "Device {} ({}): capacity must be a positive number, got: {}",
                index, model, value
            ),
            Self::EmptyCapacityVariants { index, model } => write!(
                f,
                "Device {} ({}): capacity list cannot be empty",
                index, model
            ),
        }
    }
}

impl std::error::Error for DeviceValidationError {}

/// Read-only reference database, loaded once and handed to the resolver
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceDatabase {
    records: Vec<DeviceRecord>,
}

impl DeviceDatabase {
    pub fn new(records: Vec<DeviceRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[DeviceRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Check every record, returning all problems found
    pub fn validate(&self) -> Vec<DeviceValidationError> {
        let mut errors = Vec::new();

        for (index, record) in self.records.iter().enumerate() {
            if record.manufacturer.trim().is_empty() {
                errors.push(DeviceValidationError::EmptyManufacturer { index });
            }

            if record.model_name.trim().is_empty() {
                errors.push(DeviceValidationError::EmptyModelName { index });
            }

            let values: &[f64] = match &record.capacity_gb {
                DeviceCapacity::Fixed(gb) => std::slice::from_ref(gb),
                DeviceCapacity::Variants(values) => {
                    if values.is_empty() {
                        errors.push(DeviceValidationError::EmptyCapacityVariants {
                            index,
                            model: record.model_name.clone(),
                        });
                    }
                    values
                }
                DeviceCapacity::Shared(_) => &[],
            };

            for value in values {
                if !value.is_finite() || *value <= 0.0 {
                    errors.push(DeviceValidationError::InvalidCapacity {
                        index,
                        model: record.model_name.clone(),
                        value: *value,
                    });
                }
            }
        }

        errors
    }
}

impl From<Vec<DeviceRecord>> for DeviceDatabase {
    fn from(records: Vec<DeviceRecord>) -> Self {
        Self::new(records)
    }
}
