//! Capture a live snapshot for offline analysis

use std::path::Path;

use advisor_lib::source::{write_snapshot, SnapshotSource};
use advisor_lib::AdvisorConfig;
use anyhow::{Context, Result};
use serde_json::json;

use super::SourceArgs;
use crate::output::{print_json, print_success, OutputFormat};

pub async fn run(
    config: &AdvisorConfig,
    args: &SourceArgs,
    output: &Path,
    format: OutputFormat,
) -> Result<()> {
    let source = args.connect(config).await?;
    let snapshot = source
        .fetch()
        .await
        .with_context(|| format!("Failed to read {}", source.describe()))?;

    write_snapshot(output, &snapshot)
        .await
        .with_context(|| format!("Failed to write snapshot to {}", output.display()))?;

    match format {
        OutputFormat::Json => print_json(&json!({
            "path": output.display().to_string(),
            "captured_at": snapshot.captured_at,
            "nodes": snapshot.nodes.len(),
            "pods": snapshot.pods.len(),
            "pod_usage": snapshot.pod_usage.len(),
        }))?,
        OutputFormat::Table => print_success(&format!(
            "Wrote snapshot of {} nodes and {} pods to {}",
            snapshot.nodes.len(),
            snapshot.pods.len(),
            output.display()
        )),
    }
    Ok(())
}
