//! Report assembly
//!
//! Runs every engine component over one snapshot and orders the results
//! for display: pools by name, nodes by pool then name, risky pods by
//! memory usage (largest first) truncated to the configured count.

use std::collections::{BTreeMap, BTreeSet};
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{NodeInspector, PodRiskScanner, PoolAggregator};
use crate::config::AdvisorConfig;
use crate::models::{
    ClusterSnapshot, NodeInspection, PodRiskEntry, PodUsageIndex, PoolAction, PoolVerdict,
    RiskKind,
};
use crate::observability::StructuredLogger;

/// Everything the renderer needs from one analysis run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvisoryReport {
    pub generated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub captured_at: Option<DateTime<Utc>>,
    pub pools: Vec<PoolVerdict>,
    /// Pools left out because they report no allocatable capacity
    #[serde(default)]
    pub skipped_pools: Vec<String>,
    pub nodes: Vec<NodeInspection>,
    pub risky_pods: Vec<PodRiskEntry>,
    /// Risky pods found before truncation
    pub total_risky_pods: usize,
    /// Per-kind counts, also taken before truncation
    #[serde(default)]
    pub risky_pods_by_kind: BTreeMap<RiskKind, usize>,
}

impl AdvisoryReport {
    pub fn actionable_pools(&self) -> impl Iterator<Item = &PoolVerdict> {
        self.pools.iter().filter(|p| p.action.is_actionable())
    }

    pub fn pools_with_action(&self, action: PoolAction) -> usize {
        self.pools.iter().filter(|p| p.action == action).count()
    }

    pub fn risky_pod_count(&self, kind: RiskKind) -> usize {
        self.risky_pods_by_kind.get(&kind).copied().unwrap_or(0)
    }
}

/// Sort by memory usage, largest first, and keep the top entries
pub fn rank_risky_pods(mut risks: Vec<PodRiskEntry>, top: usize) -> Vec<PodRiskEntry> {
    risks.sort_by(|a, b| b.mem_used_mi.total_cmp(&a.mem_used_mi));
    risks.truncate(top);
    risks
}

/// Runs the decision engine over cluster snapshots
#[derive(Debug, Clone)]
pub struct Advisor {
    config: AdvisorConfig,
    aggregator: PoolAggregator,
    scanner: PodRiskScanner,
    inspector: NodeInspector,
    logger: StructuredLogger,
}

impl Advisor {
    pub fn new(config: AdvisorConfig) -> Self {
        Self::with_logger(config, StructuredLogger::new("snapshot"))
    }

    pub fn with_logger(config: AdvisorConfig, logger: StructuredLogger) -> Self {
        Self {
            aggregator: PoolAggregator::new(&config),
            scanner: PodRiskScanner::new(&config),
            inspector: NodeInspector::new(&config.thresholds),
            config,
            logger,
        }
    }

    pub fn config(&self) -> &AdvisorConfig {
        &self.config
    }

    pub fn analyze(&self, snapshot: &ClusterSnapshot) -> AdvisoryReport {
        let started = Instant::now();
        self.logger.log_analysis_started(snapshot.nodes.len(), snapshot.pods.len());

        let records = self.aggregator.ingest(&snapshot.nodes, &snapshot.node_usage);
        let pools = self.aggregator.aggregate(&records);
        for verdict in &pools {
            self.logger.log_pool_verdict(verdict);
        }

        let classified: BTreeSet<&str> = pools.iter().map(|p| p.pool_name.as_str()).collect();
        let skipped_pools: Vec<String> = records
            .iter()
            .map(|r| r.pool.as_str())
            .collect::<BTreeSet<&str>>()
            .into_iter()
            .filter(|pool| !classified.contains(pool))
            .map(str::to_string)
            .collect();

        let usage: PodUsageIndex = snapshot.pod_usage.iter().collect();
        let risks = self.scanner.scan(&snapshot.pods, &usage);
        for risk in &risks {
            self.logger.log_pod_risk(risk);
        }
        let total_risky_pods = risks.len();
        let mut risky_pods_by_kind = BTreeMap::new();
        for risk in &risks {
            *risky_pods_by_kind.entry(risk.risk_kind).or_insert(0) += 1;
        }

        let report = AdvisoryReport {
            generated_at: Utc::now(),
            captured_at: snapshot.captured_at,
            nodes: self.inspector.inspect(&records),
            pools,
            skipped_pools,
            risky_pods: rank_risky_pods(risks, self.config.report.top_pods),
            total_risky_pods,
            risky_pods_by_kind,
        };

        self.logger.log_analysis_completed(
            report.pools.len(),
            report.skipped_pools.len(),
            report.total_risky_pods,
            started.elapsed().as_secs_f64() * 1000.0,
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DEFAULT_MACHINE_TYPE_LABEL, DEFAULT_POOL_LABEL};
    use crate::models::{
        ContainerResources, NodeHealth, NodeInventoryItem, PodInventoryItem, PodUsage, RiskKind,
        UsageSample, RUNNING_PHASE,
    };

    fn node(
        name: &str,
        pool: &str,
        machine_type: &str,
        cpu: &str,
        memory: &str,
    ) -> NodeInventoryItem {
        let mut item = NodeInventoryItem {
            name: Some(name.to_string()),
            ..Default::default()
        };
        item.labels.insert(DEFAULT_POOL_LABEL.to_string(), pool.to_string());
        item.labels.insert(DEFAULT_MACHINE_TYPE_LABEL.to_string(), machine_type.to_string());
        item.allocatable.insert("cpu".to_string(), cpu.to_string());
        item.allocatable.insert("memory".to_string(), memory.to_string());
        item
    }

    fn pod(namespace: &str, name: &str, limit: &str) -> PodInventoryItem {
        PodInventoryItem {
            namespace: namespace.to_string(),
            name: Some(name.to_string()),
            phase: Some(RUNNING_PHASE.to_string()),
            containers: vec![ContainerResources {
                name: None,
                requests_memory: None,
                limits_memory: Some(limit.to_string()),
            }],
        }
    }

    fn pod_usage(namespace: &str, name: &str, memory: &str) -> PodUsage {
        PodUsage {
            namespace: namespace.to_string(),
            name: name.to_string(),
            usage: UsageSample::new("5m", memory),
        }
    }

    fn snapshot() -> ClusterSnapshot {
        let mut snapshot = ClusterSnapshot {
            nodes: vec![
                node("mem-1", "memory-heavy", "n2-standard-4", "4", "16Gi"),
                node("idle-1", "idle", "e2-standard-2", "2", "8Gi"),
                node("empty-1", "empty", "e2-standard-2", "0", "0"),
            ],
            ..Default::default()
        };
        snapshot
            .node_usage
            .insert("mem-1".to_string(), UsageSample::new("400m", "15Gi"));
        snapshot
            .node_usage
            .insert("idle-1".to_string(), UsageSample::new("100m", "512Mi"));

        for i in 0..20 {
            let name = format!("api-{}", i);
            snapshot.pods.push(pod("app", &name, "100Mi"));
            snapshot
                .pod_usage
                .push(pod_usage("app", &name, &format!("{}Mi", 80 + i)));
        }
        snapshot
    }

    #[test]
    fn test_analyze_end_to_end() {
        let report = Advisor::new(AdvisorConfig::default()).analyze(&snapshot());

        let pools: Vec<(&str, PoolAction)> = report
            .pools
            .iter()
            .map(|p| (p.pool_name.as_str(), p.action))
            .collect();
        assert_eq!(
            pools,
            vec![("idle", PoolAction::ScaleIn), ("memory-heavy", PoolAction::UpgradeMem)]
        );
        assert_eq!(report.skipped_pools, vec!["empty".to_string()]);
        assert_eq!(report.actionable_pools().count(), 2);
        assert_eq!(report.pools_with_action(PoolAction::UpgradeMem), 1);

        assert_eq!(report.nodes.len(), 3);
        let mem_node = report.nodes.iter().find(|n| n.name == "mem-1").unwrap();
        assert_eq!(mem_node.status, NodeHealth::OomDanger);
    }

    #[test]
    fn test_risky_pods_ranked_and_truncated() {
        let report = Advisor::new(AdvisorConfig::default()).analyze(&snapshot());

        // 86Mi..99Mi exceed 85% of the 100Mi limit
        assert_eq!(report.total_risky_pods, 14);
        assert_eq!(report.risky_pods.len(), 14);
        assert_eq!(report.risky_pods[0].name, "api-19");
        assert!(report
            .risky_pods
            .windows(2)
            .all(|w| w[0].mem_used_mi >= w[1].mem_used_mi));
        assert!(report
            .risky_pods
            .iter()
            .all(|r| r.risk_kind == RiskKind::LimitCritical));

        let mut config = AdvisorConfig::default();
        config.report.top_pods = 3;
        let report = Advisor::new(config).analyze(&snapshot());
        assert_eq!(report.total_risky_pods, 14);
        let names: Vec<&str> = report.risky_pods.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["api-19", "api-18", "api-17"]);
        assert_eq!(report.risky_pod_count(RiskKind::LimitCritical), 14);
        assert_eq!(report.risky_pod_count(RiskKind::BurstOvercommit), 0);
    }

    #[test]
    fn test_empty_snapshot() {
        let report = Advisor::new(AdvisorConfig::default()).analyze(&ClusterSnapshot::default());
        assert!(report.pools.is_empty());
        assert!(report.nodes.is_empty());
        assert!(report.risky_pods.is_empty());
        assert_eq!(report.total_risky_pods, 0);
    }

    #[test]
    fn test_report_serializes_actions_in_screaming_case() {
        let report = Advisor::new(AdvisorConfig::default()).analyze(&snapshot());
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["pools"][1]["action"], "UPGRADE_MEM");
        assert_eq!(json["risky_pods"][0]["risk_kind"], "LIMIT_CRITICAL");
        assert_eq!(json["nodes"][0]["status"], "NOMINAL");
        assert_eq!(json["risky_pods_by_kind"]["LIMIT_CRITICAL"], 14);
    }
}
