//! Observability infrastructure for the capacity advisor
//!
//! Provides:
//! - Prometheus gauges describing the last analysis (pool utilization, actions, risky pods)
//! - Structured logging with tracing

use prometheus::{
    register_gauge, register_gauge_vec, register_histogram, register_int_gauge,
    register_int_gauge_vec, Encoder, Gauge, GaugeVec, Histogram, IntGauge, IntGaugeVec,
    TextEncoder,
};
use std::sync::OnceLock;
use tracing::{debug, info, warn};

use crate::advisor::AdvisoryReport;
use crate::models::{NodeHealth, PodRiskEntry, PoolVerdict, RiskKind};

/// Histogram buckets for analysis duration (in seconds)
const DURATION_BUCKETS: &[f64] = &[0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0];

/// Global metrics instance (registered once)
static GLOBAL_METRICS: OnceLock<AdvisorMetricsInner> = OnceLock::new();

struct AdvisorMetricsInner {
    pool_cpu_utilization: GaugeVec,
    pool_memory_utilization: GaugeVec,
    pool_action: IntGaugeVec,
    pool_nodes: IntGaugeVec,
    pools_analyzed: IntGauge,
    pools_skipped: IntGauge,
    risky_pods: IntGaugeVec,
    nodes_by_status: IntGaugeVec,
    analysis_duration_seconds: Histogram,
    last_run_timestamp_seconds: Gauge,
}

impl AdvisorMetricsInner {
    fn new() -> Self {
        Self {
            pool_cpu_utilization: register_gauge_vec!(
                "gke_advisor_pool_cpu_utilization_percent",
                "Average CPU utilization of a node pool",
                &["pool"]
            )
            .expect("Failed to register pool_cpu_utilization_percent"),

            pool_memory_utilization: register_gauge_vec!(
                "gke_advisor_pool_memory_utilization_percent",
                "Average memory utilization of a node pool",
                &["pool"]
            )
            .expect("Failed to register pool_memory_utilization_percent"),

            pool_action: register_int_gauge_vec!(
                "gke_advisor_pool_action",
                "Recommended action for a node pool (1 for the current action)",
                &["pool", "action", "machine_type"]
            )
            .expect("Failed to register pool_action"),

            pool_nodes: register_int_gauge_vec!(
                "gke_advisor_pool_nodes",
                "Number of nodes in a node pool",
                &["pool"]
            )
            .expect("Failed to register pool_nodes"),

            pools_analyzed: register_int_gauge!(
                "gke_advisor_pools_analyzed",
                "Number of node pools classified in the last analysis"
            )
            .expect("Failed to register pools_analyzed"),

            pools_skipped: register_int_gauge!(
                "gke_advisor_pools_skipped",
                "Number of node pools skipped for lack of allocatable capacity"
            )
            .expect("Failed to register pools_skipped"),

            risky_pods: register_int_gauge_vec!(
                "gke_advisor_risky_pods",
                "Number of pods at memory risk, by risk kind",
                &["risk_kind"]
            )
            .expect("Failed to register risky_pods"),

            nodes_by_status: register_int_gauge_vec!(
                "gke_advisor_nodes_by_status",
                "Number of nodes per memory pressure status",
                &["status"]
            )
            .expect("Failed to register nodes_by_status"),

            analysis_duration_seconds: register_histogram!(
                "gke_advisor_analysis_duration_seconds",
                "Time spent analyzing a cluster snapshot",
                DURATION_BUCKETS.to_vec()
            )
            .expect("Failed to register analysis_duration_seconds"),

            last_run_timestamp_seconds: register_gauge!(
                "gke_advisor_last_run_timestamp_seconds",
                "Unix timestamp of the last completed analysis"
            )
            .expect("Failed to register last_run_timestamp_seconds"),
        }
    }
}

/// Advisor metrics for Prometheus exposition
///
/// Lightweight handle to the global metrics instance; clones share the
/// same underlying metrics.
#[derive(Clone)]
pub struct AdvisorMetrics {
    _private: (),
}

impl Default for AdvisorMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl AdvisorMetrics {
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(AdvisorMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &AdvisorMetricsInner {
        GLOBAL_METRICS.get_or_init(AdvisorMetricsInner::new)
    }

    /// Replace all gauges with the contents of `report`
    pub fn record_report(&self, report: &AdvisoryReport, duration_secs: f64) {
        let inner = self.inner();

        inner.pool_cpu_utilization.reset();
        inner.pool_memory_utilization.reset();
        inner.pool_action.reset();
        inner.pool_nodes.reset();
        for pool in &report.pools {
            let name = pool.pool_name.as_str();
            inner
                .pool_cpu_utilization
                .with_label_values(&[name])
                .set(pool.avg_cpu_pct);
            inner
                .pool_memory_utilization
                .with_label_values(&[name])
                .set(pool.avg_mem_pct);
            inner
                .pool_action
                .with_label_values(&[name, pool.action.as_str(), pool.machine_type.as_str()])
                .set(1);
            inner
                .pool_nodes
                .with_label_values(&[name])
                .set(pool.node_count as i64);
        }
        inner.pools_analyzed.set(report.pools.len() as i64);
        inner.pools_skipped.set(report.skipped_pools.len() as i64);

        inner.risky_pods.reset();
        for kind in [RiskKind::LimitCritical, RiskKind::BurstOvercommit] {
            inner
                .risky_pods
                .with_label_values(&[kind.as_str()])
                .set(report.risky_pod_count(kind) as i64);
        }

        inner.nodes_by_status.reset();
        for status in [NodeHealth::Nominal, NodeHealth::HighLoad, NodeHealth::OomDanger] {
            let count = report.nodes.iter().filter(|n| n.status == status).count();
            inner
                .nodes_by_status
                .with_label_values(&[status.as_str()])
                .set(count as i64);
        }

        inner.analysis_duration_seconds.observe(duration_secs);
        inner
            .last_run_timestamp_seconds
            .set(report.generated_at.timestamp() as f64);
    }

    /// Render the default registry in the Prometheus text format
    pub fn encode_text(&self) -> anyhow::Result<String> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&prometheus::gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}

/// Structured logger for advisor events
#[derive(Debug, Clone)]
pub struct StructuredLogger {
    source: String,
}

impl StructuredLogger {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }

    pub fn log_snapshot_loaded(&self, nodes: usize, pods: usize, pod_usage_samples: usize) {
        info!(
            event = "snapshot_loaded",
            source = %self.source,
            nodes = nodes,
            pods = pods,
            pod_usage_samples = pod_usage_samples,
            "Cluster snapshot loaded"
        );
    }

    /// Pods or usage could not be fetched; the run continues without them
    pub fn log_source_unavailable(&self, kind: &str, reason: &str) {
        warn!(
            event = "source_unavailable",
            source = %self.source,
            kind = %kind,
            reason = %reason,
            "Cluster data unavailable, continuing without it"
        );
    }

    pub fn log_analysis_started(&self, nodes: usize, pods: usize) {
        debug!(
            event = "analysis_started",
            source = %self.source,
            nodes = nodes,
            pods = pods,
            "Analyzing cluster snapshot"
        );
    }

    pub fn log_pool_verdict(&self, verdict: &PoolVerdict) {
        if verdict.action.is_actionable() {
            info!(
                event = "pool_verdict",
                source = %self.source,
                pool = %verdict.pool_name,
                machine_type = %verdict.machine_type,
                node_count = verdict.node_count,
                avg_cpu_pct = verdict.avg_cpu_pct,
                avg_mem_pct = verdict.avg_mem_pct,
                action = %verdict.action,
                recommendation = %verdict.recommendation,
                "Pool needs attention"
            );
        } else {
            debug!(
                event = "pool_verdict",
                source = %self.source,
                pool = %verdict.pool_name,
                avg_cpu_pct = verdict.avg_cpu_pct,
                avg_mem_pct = verdict.avg_mem_pct,
                action = %verdict.action,
                "Pool within thresholds"
            );
        }
    }

    pub fn log_pod_risk(&self, risk: &PodRiskEntry) {
        match risk.risk_kind {
            RiskKind::LimitCritical => {
                warn!(
                    event = "pod_risk",
                    source = %self.source,
                    namespace = %risk.namespace,
                    pod_name = %risk.name,
                    risk_kind = %risk.risk_kind,
                    risk_ratio = risk.risk_ratio,
                    mem_used_mi = risk.mem_used_mi,
                    mem_limit_mi = risk.mem_limit_mi,
                    "Pod close to its memory limit"
                );
            }
            RiskKind::BurstOvercommit => {
                info!(
                    event = "pod_risk",
                    source = %self.source,
                    namespace = %risk.namespace,
                    pod_name = %risk.name,
                    risk_kind = %risk.risk_kind,
                    risk_ratio = risk.risk_ratio,
                    mem_used_mi = risk.mem_used_mi,
                    mem_request_mi = risk.mem_request_mi,
                    "Pod using more memory than requested"
                );
            }
        }
    }

    pub fn log_analysis_completed(
        &self,
        pools: usize,
        skipped_pools: usize,
        risky_pods: usize,
        duration_ms: f64,
    ) {
        info!(
            event = "analysis_completed",
            source = %self.source,
            pools = pools,
            skipped_pools = skipped_pools,
            risky_pods = risky_pods,
            duration_ms = duration_ms,
            "Analysis completed"
        );
    }
}
