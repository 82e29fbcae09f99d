//! Shared plumbing for the airgrab command-line tools.

pub mod config;
pub mod telemetry;
