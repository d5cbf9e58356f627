//! Shared foundations: errors and configuration.

pub mod config;
pub mod errors;
