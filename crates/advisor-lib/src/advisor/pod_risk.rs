//! Pod memory risk scanning
//!
//! Flags workload pods whose live memory usage is close to their limit
//! (OOM kill imminent) or above their request (eviction candidate when the
//! node is oversubscribed).

use std::collections::HashSet;

use tracing::debug;

use crate::config::{AdvisorConfig, Thresholds};
use crate::models::{
    ContainerResources, PodInventoryItem, PodRecord, PodRiskEntry, PodUsageIndex, RiskKind,
    RUNNING_PHASE,
};
use crate::quantity::parse_memory;

#[derive(Debug, Clone)]
pub struct PodRiskScanner {
    /// Usage/limit ratio above which a pod is limit-critical
    limit_ratio: f64,
    /// Usage/request ratio above which a pod is overcommitted
    burst_ratio: f64,
    excluded_namespaces: HashSet<String>,
}

impl PodRiskScanner {
    pub fn new(config: &AdvisorConfig) -> Self {
        Self::with_thresholds(&config.thresholds, config.excluded_namespaces.iter().cloned())
    }

    pub fn with_thresholds(
        thresholds: &Thresholds,
        excluded_namespaces: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            limit_ratio: thresholds.pod_limit_critical / 100.0,
            burst_ratio: thresholds.pod_burst_critical / 100.0,
            excluded_namespaces: excluded_namespaces.into_iter().collect(),
        }
    }

    pub fn is_excluded(&self, namespace: &str) -> bool {
        self.excluded_namespaces.contains(namespace)
    }

    /// Build the per-pod record, or `None` if the pod is not a scan candidate
    pub fn to_record(&self, pod: &PodInventoryItem, usage: &PodUsageIndex) -> Option<PodRecord> {
        if pod.phase.as_deref() != Some(RUNNING_PHASE) {
            return None;
        }
        if self.is_excluded(&pod.namespace) {
            return None;
        }
        let name = pod.name.as_deref().filter(|n| !n.is_empty())?;

        Some(PodRecord {
            namespace: pod.namespace.clone(),
            name: name.to_string(),
            mem_request_mi: sum_memory(&pod.containers, |c| c.requests_memory.as_deref()),
            mem_limit_mi: sum_memory(&pod.containers, |c| c.limits_memory.as_deref()),
            mem_used_mi: usage
                .get(&pod.namespace, name)
                .map(|u| parse_memory(&u.memory))
                .unwrap_or(0.0),
        })
    }

    /// Classify a single pod. Limit pressure takes precedence over burst.
    pub fn assess(&self, record: &PodRecord) -> Option<PodRiskEntry> {
        let used = record.mem_used_mi;

        let (risk_kind, risk_ratio) = if record.mem_limit_mi > 0.0
            && used / record.mem_limit_mi > self.limit_ratio
        {
            (RiskKind::LimitCritical, used / record.mem_limit_mi)
        } else if record.mem_request_mi > 0.0 && used / record.mem_request_mi > self.burst_ratio {
            (RiskKind::BurstOvercommit, used / record.mem_request_mi)
        } else {
            return None;
        };

        Some(PodRiskEntry {
            namespace: record.namespace.clone(),
            name: record.name.clone(),
            mem_used_mi: used,
            mem_limit_mi: record.mem_limit_mi,
            mem_request_mi: record.mem_request_mi,
            risk_kind,
            risk_ratio,
        })
    }

    /// Scan pods in inventory order and emit one entry per risky pod
    pub fn scan(&self, pods: &[PodInventoryItem], usage: &PodUsageIndex) -> Vec<PodRiskEntry> {
        let risks: Vec<PodRiskEntry> = pods
            .iter()
            .filter_map(|pod| self.to_record(pod, usage))
            .filter_map(|record| self.assess(&record))
            .collect();

        debug!(
            pods = pods.len(),
            usage_samples = usage.len(),
            risky = risks.len(),
            "Pod risk scan complete"
        );
        risks
    }
}

/// Sum one memory field across containers; missing fields count as zero
fn sum_memory<'a>(
    containers: &'a [ContainerResources],
    select: impl Fn(&'a ContainerResources) -> Option<&'a str>,
) -> f64 {
    containers
        .iter()
        .map(|c| select(c).map(parse_memory).unwrap_or(0.0))
        .sum()
}

impl Default for PodRiskScanner {
    fn default() -> Self {
        Self::new(&AdvisorConfig::default())
    }
}
