//! Capacity advisory engine for GKE node pools
//!
//! This crate provides the core functionality for:
//! - Kubernetes quantity parsing
//! - Node pool classification and machine-type upgrade hints
//! - Pod memory risk scanning
//! - Snapshot acquisition from files or a live cluster
//! - Structured logging and Prometheus exposition

pub mod advisor;
pub mod config;
pub mod models;
pub mod observability;
pub mod quantity;
pub mod source;

pub use advisor::{Advisor, AdvisoryReport};
pub use config::{AdvisorConfig, ConfigError, Thresholds};
pub use models::*;
pub use observability::{AdvisorMetrics, StructuredLogger};
