//! Infrastructure layer - File-backed data, persistence and services

pub mod logging;
pub mod profile;
pub mod reference;
pub mod services;
