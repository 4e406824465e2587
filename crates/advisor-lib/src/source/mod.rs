//! Snapshot acquisition
//!
//! A source produces one frozen `ClusterSnapshot`. Two implementations are
//! provided: a JSON snapshot file and a live cluster read through the
//! Kubernetes API and metrics-server.

mod file;
mod cluster;

#[cfg(test)]
mod tests;

pub use self::file::{write_snapshot, FileSnapshotSource};
pub use self::cluster::{
    node_to_inventory, or_empty, pod_to_inventory, pod_usage_from_metrics, KubeSnapshotSource,
    MetricsList, NodeMetrics, PodMetrics,
};

use std::path::PathBuf;

use crate::models::ClusterSnapshot;

pub use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("Failed to access snapshot file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid snapshot file {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to encode snapshot: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Kubeconfig error: {0}")]
    KubeConfig(String),

    #[error("Kubernetes API error: {0}")]
    Kube(#[from] kube::Error),

    #[error("Request error: {0}")]
    Request(String),

    #[error("Timed out after {secs}s while {what}")]
    Timeout { what: &'static str, secs: u64 },
}

/// Trait for snapshot acquisition
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    /// Acquire a complete snapshot
    async fn fetch(&self) -> Result<ClusterSnapshot, SourceError>;

    /// Short human-readable description used in logs
    fn describe(&self) -> String;
}
