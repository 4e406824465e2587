//! Pool, node and pod analysis

use std::path::{Path, PathBuf};
use std::time::Instant;

use advisor_lib::{Advisor, AdvisorConfig, AdvisorMetrics, AdvisoryReport, StructuredLogger};
use anyhow::{Context, Result};
use colored::Colorize;
use tabled::Tabled;

use super::SourceArgs;
use crate::output::{
    color_health, color_risk, format_mi, format_pct, highlight_action, print_heading, print_info,
    print_json, print_success, print_warning, short_node_name, truncate_namespace,
    truncate_pod_name, OutputFormat,
};

/// Row for the pool decision table
#[derive(Tabled)]
struct PoolRow {
    #[tabled(rename = "Pool")]
    pool: String,
    #[tabled(rename = "Machine Type")]
    machine_type: String,
    #[tabled(rename = "Nodes")]
    nodes: String,
    #[tabled(rename = "Avg CPU")]
    cpu: String,
    #[tabled(rename = "Avg Mem")]
    mem: String,
    #[tabled(rename = "Recommendation")]
    recommendation: String,
}

/// Row for the node inspection table
#[derive(Tabled)]
struct NodeRow {
    #[tabled(rename = "Node")]
    node: String,
    #[tabled(rename = "Pool")]
    pool: String,
    #[tabled(rename = "CPU")]
    cpu: String,
    #[tabled(rename = "Mem")]
    mem: String,
    #[tabled(rename = "Status")]
    status: String,
}

/// Row for the risky pod table
#[derive(Tabled)]
struct PodRow {
    #[tabled(rename = "Namespace")]
    namespace: String,
    #[tabled(rename = "Pod")]
    pod: String,
    #[tabled(rename = "Mem Used")]
    used: String,
    #[tabled(rename = "Mem Limit")]
    limit: String,
    #[tabled(rename = "Mem Request")]
    request: String,
    #[tabled(rename = "Risk")]
    risk: String,
    #[tabled(rename = "Ratio")]
    ratio: String,
}

pub async fn run(
    config: AdvisorConfig,
    args: &SourceArgs,
    snapshot: Option<PathBuf>,
    metrics_out: Option<PathBuf>,
    format: OutputFormat,
) -> Result<()> {
    let source = args.source(&config, snapshot.as_deref()).await?;
    let description = source.describe();
    let snapshot = source
        .fetch()
        .await
        .with_context(|| format!("Failed to read {}", description))?;

    let started = Instant::now();
    let advisor = Advisor::with_logger(config, StructuredLogger::new(description));
    let report = advisor.analyze(&snapshot);
    let elapsed = started.elapsed().as_secs_f64();

    if let Some(path) = metrics_out.as_deref() {
        write_metrics(path, &report, elapsed).await?;
    }

    match format {
        OutputFormat::Json => print_json(&report)?,
        OutputFormat::Table => render(&report),
    }
    Ok(())
}

async fn write_metrics(path: &Path, report: &AdvisoryReport, duration_secs: f64) -> Result<()> {
    let metrics = AdvisorMetrics::new();
    metrics.record_report(report, duration_secs);
    let text = metrics.encode_text()?;
    tokio::fs::write(path, text)
        .await
        .with_context(|| format!("Failed to write metrics to {}", path.display()))
}

fn pool_rows(report: &AdvisoryReport) -> Vec<PoolRow> {
    report
        .pools
        .iter()
        .map(|p| {
            let paint = |text: String| highlight_action(p.action, &text);
            PoolRow {
                pool: paint(p.pool_name.clone()),
                machine_type: paint(p.machine_type.clone()),
                nodes: paint(p.node_count.to_string()),
                cpu: paint(format_pct(p.avg_cpu_pct)),
                mem: paint(format_pct(p.avg_mem_pct)),
                recommendation: paint(p.recommendation.clone()),
            }
        })
        .collect()
}

fn node_rows(report: &AdvisoryReport) -> Vec<NodeRow> {
    report
        .nodes
        .iter()
        .map(|n| NodeRow {
            node: short_node_name(&n.name),
            pool: n.pool.clone(),
            cpu: format_pct(n.cpu_pct),
            mem: format_pct(n.mem_pct),
            status: color_health(n.status),
        })
        .collect()
}

fn pod_rows(report: &AdvisoryReport) -> Vec<PodRow> {
    report
        .risky_pods
        .iter()
        .map(|r| PodRow {
            namespace: truncate_namespace(&r.namespace),
            pod: truncate_pod_name(&r.name),
            used: format_mi(r.mem_used_mi),
            limit: format_mi(r.mem_limit_mi),
            request: format_mi(r.mem_request_mi),
            risk: color_risk(r.risk_kind),
            ratio: format_pct(r.risk_ratio * 100.0),
        })
        .collect()
}

fn table<T: Tabled>(rows: Vec<T>) -> String {
    tabled::Table::new(rows)
        .with(tabled::settings::Style::rounded())
        .to_string()
}

fn render(report: &AdvisoryReport) {
    print_heading("Pool Decision Dashboard");
    if report.pools.is_empty() {
        print_info("No node pools with allocatable capacity");
    } else {
        println!("{}", table(pool_rows(report)));
    }
    for pool in &report.skipped_pools {
        print_info(&format!("Skipped pool {} (no allocatable CPU or memory)", pool));
    }

    print_heading("Node Inspection");
    if report.nodes.is_empty() {
        print_info("No nodes found");
    } else {
        println!("{}", table(node_rows(report)));
    }

    print_heading("High Risk Pods (system namespaces excluded)");
    if report.risky_pods.is_empty() {
        print_success("No workload pods at memory risk");
    } else {
        println!("{}", table(pod_rows(report)));
        if report.total_risky_pods > report.risky_pods.len() {
            print_warning(&format!(
                "Showing top {} of {} risky pods",
                report.risky_pods.len(),
                report.total_risky_pods
            ));
        }
    }

    print_action_guide();
}

const ACTION_GUIDE: &[&str] = &[
    "  1. Upgrade machine type: create a node pool with the suggested shape",
    "     and migrate pods to it.",
    "     gcloud container node-pools create highmem-pool --machine-type=n2-highmem-4 ...",
    "  2. Scale out: enable autoscaling on the pool or raise its node count.",
    "     gcloud container node-pools update <pool-name> --enable-autoscaling \\",
    "       --min-nodes 2 --max-nodes 10",
    "  3. Burst overcommit: raise requests.memory on the pod so the scheduler stops",
    "     overpacking its node.",
];

fn print_action_guide() {
    println!("\n{}", "Action guide:".bold());
    for line in ACTION_GUIDE {
        println!("{}", line);
    }
}
