//! CLI subcommands

pub mod analyze;
pub mod show_config;
pub mod snapshot;

use std::path::{Path, PathBuf};
use std::time::Duration;

use advisor_lib::source::{FileSnapshotSource, KubeSnapshotSource, SnapshotSource};
use advisor_lib::AdvisorConfig;
use anyhow::{Context, Result};

/// Cluster connection flags shared by the subcommands
#[derive(Debug, Clone, Default)]
pub struct SourceArgs {
    pub kubeconfig: Option<PathBuf>,
    pub context: Option<String>,
}

impl SourceArgs {
    pub async fn connect(&self, config: &AdvisorConfig) -> Result<KubeSnapshotSource> {
        KubeSnapshotSource::connect(
            self.kubeconfig.as_deref(),
            self.context.as_deref(),
            Duration::from_secs(config.source.request_timeout_secs),
        )
        .await
        .context("Failed to connect to the Kubernetes cluster")
    }

    /// A snapshot file when given, the live cluster otherwise
    pub async fn source(
        &self,
        config: &AdvisorConfig,
        snapshot: Option<&Path>,
    ) -> Result<Box<dyn SnapshotSource>> {
        match snapshot {
            Some(path) => Ok(Box::new(FileSnapshotSource::new(path))),
            None => Ok(Box::new(self.connect(config).await?)),
        }
    }
}
