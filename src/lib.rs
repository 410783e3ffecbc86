//! LLM fit advisor
//!
//! Decides which locally runnable language models fit a machine:
//! - GPU identifier resolution to a usable memory estimate
//! - Hard compatibility filters and weighted fitness scoring
//! - Ranked, explained recommendations over a model catalog

pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;
pub use domain::{
    evaluate, recommend, DomainError, FitnessAssessment, HardwareProfile, HardwareResolver,
};
