//! JSON loaders for the catalog, the device database and resolver rules

use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use tracing::{info, warn};

use crate::domain::catalog::{validate_catalog, Artifact};
use crate::domain::hardware::{DeviceDatabase, ResolverRules};
use crate::domain::DomainError;

fn read_json<T: DeserializeOwned>(path: &Path, what: &str) -> Result<T, DomainError> {
    let content = fs::read_to_string(path).map_err(|e| {
        DomainError::storage(format!("Failed to read {} '{}': {}", what, path.display(), e))
    })?;

    serde_json::from_str(&content).map_err(|e| {
        DomainError::validation(format!("Malformed {} '{}': {}", what, path.display(), e))
    })
}

/// Parse and validate the artifact catalog, failing on the first bad load
pub fn load_catalog(path: &Path) -> Result<Vec<Artifact>, DomainError> {
    let artifacts: Vec<Artifact> = read_json(path, "catalog")?;

    let report = validate_catalog(&artifacts);
    if !report.is_valid() {
        warn!(
            path = %path.display(),
            issues = report.issues.len(),
            "Catalog failed validation"
        );
        return Err(DomainError::validation(format!(
            "Invalid catalog '{}': {}",
            path.display(),
            report
        )));
    }

    info!(path = %path.display(), artifacts = artifacts.len(), "Loaded catalog");
    Ok(artifacts)
}

pub fn load_device_database(path: &Path) -> Result<DeviceDatabase, DomainError> {
    let database: DeviceDatabase = read_json(path, "device database")?;

    let errors = database.validate();
    if !errors.is_empty() {
        let details: Vec<String> = errors.iter().map(ToString::to_string).collect();
        return Err(DomainError::validation(format!(
            "Invalid device database '{}': {}",
            path.display(),
            details.join("; ")
        )));
    }

    info!(path = %path.display(), devices = database.len(), "Loaded device database");
    Ok(database)
}

/// Rules file; sections left out fall back to the built-in lists
pub fn load_resolver_rules(path: &Path) -> Result<ResolverRules, DomainError> {
    let content = fs::read_to_string(path).map_err(|e| {
        DomainError::storage(format!("Failed to read resolver rules '{}': {}", path.display(), e))
    })?;

    let rules: ResolverRules = serde_json::from_str(&content).map_err(|e| {
        DomainError::configuration(format!("Invalid resolver rules '{}': {}", path.display(), e))
    })?;

    let errors = rules.validate();
    if !errors.is_empty() {
        let details: Vec<String> = errors.iter().map(ToString::to_string).collect();
        return Err(DomainError::configuration(format!(
            "Invalid resolver rules '{}': {}",
            path.display(),
            details.join("; ")
        )));
    }

    info!(
        path = %path.display(),
        patterns = rules.capacity_patterns.len(),
        "Loaded resolver rules"
    );
    Ok(rules)
}
