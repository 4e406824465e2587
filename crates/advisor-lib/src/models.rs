//! Core data models for the capacity advisor

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Pool assigned to nodes that carry no pool label
pub const DEFAULT_POOL: &str = "default";

/// Machine type assigned to nodes that carry no instance-type label
pub const UNKNOWN_MACHINE_TYPE: &str = "unknown";

/// Pod phase eligible for risk scanning
pub const RUNNING_PHASE: &str = "Running";

/// Raw CPU/memory usage as reported by metrics-server
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UsageSample {
    #[serde(default)]
    pub cpu: String,
    #[serde(default)]
    pub memory: String,
}

impl UsageSample {
    pub fn new(cpu: impl Into<String>, memory: impl Into<String>) -> Self {
        Self {
            cpu: cpu.into(),
            memory: memory.into(),
        }
    }
}

/// Node entry from the inventory snapshot
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeInventoryItem {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    /// Raw allocatable quantities keyed by resource name ("cpu", "memory")
    #[serde(default)]
    pub allocatable: BTreeMap<String, String>,
}

/// Memory requests and limits declared by a single container
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContainerResources {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub requests_memory: Option<String>,
    #[serde(default)]
    pub limits_memory: Option<String>,
}

/// Pod entry from the inventory snapshot
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PodInventoryItem {
    #[serde(default)]
    pub namespace: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub phase: Option<String>,
    #[serde(default)]
    pub containers: Vec<ContainerResources>,
}

/// Usage sample for a single pod
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PodUsage {
    pub namespace: String,
    pub name: String,
    #[serde(flatten)]
    pub usage: UsageSample,
}

/// Frozen view of the cluster handed to the advisor
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClusterSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub captured_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub nodes: Vec<NodeInventoryItem>,
    /// Usage keyed by node name; absent nodes are treated as idle
    #[serde(default)]
    pub node_usage: BTreeMap<String, UsageSample>,
    #[serde(default)]
    pub pods: Vec<PodInventoryItem>,
    #[serde(default)]
    pub pod_usage: Vec<PodUsage>,
}

/// Pod usage samples indexed by (namespace, name)
#[derive(Debug, Clone, Default)]
pub struct PodUsageIndex {
    samples: HashMap<(String, String), UsageSample>,
}

impl PodUsageIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(
        &mut self,
        namespace: impl Into<String>,
        name: impl Into<String>,
        usage: UsageSample,
    ) {
        self.samples.insert((namespace.into(), name.into()), usage);
    }

    pub fn get(&self, namespace: &str, name: &str) -> Option<&UsageSample> {
        self.samples
            .get(&(namespace.to_string(), name.to_string()))
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

impl<'a> FromIterator<&'a PodUsage> for PodUsageIndex {
    fn from_iter<I: IntoIterator<Item = &'a PodUsage>>(iter: I) -> Self {
        let mut index = Self::new();
        for entry in iter {
            index.insert(entry.namespace.clone(), entry.name.clone(), entry.usage.clone());
        }
        index
    }
}

/// Node with labels resolved and quantities normalized (cores, MiB)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub name: String,
    pub pool: String,
    pub machine_type: String,
    pub cpu_allocatable: f64,
    pub mem_allocatable: f64,
    pub cpu_used: f64,
    pub mem_used: f64,
}

/// Remediation action for a node pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PoolAction {
    None,
    UpgradeMem,
    UpgradeCpu,
    ScaleOut,
    ScaleIn,
}

impl PoolAction {
    /// Returns true if the action asks the operator to change the pool
    pub fn is_actionable(&self) -> bool {
        !matches!(self, PoolAction::None)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PoolAction::None => "NONE",
            PoolAction::UpgradeMem => "UPGRADE_MEM",
            PoolAction::UpgradeCpu => "UPGRADE_CPU",
            PoolAction::ScaleOut => "SCALE_OUT",
            PoolAction::ScaleIn => "SCALE_IN",
        }
    }
}

impl fmt::Display for PoolAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classification outcome for one node pool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolVerdict {
    pub pool_name: String,
    /// Machine type of the first node seen in the pool
    pub machine_type: String,
    pub node_count: usize,
    pub avg_cpu_pct: f64,
    pub avg_mem_pct: f64,
    pub action: PoolAction,
    pub recommendation: String,
}

/// Pod with container memory summed and usage joined (MiB)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PodRecord {
    pub namespace: String,
    pub name: String,
    pub mem_request_mi: f64,
    pub mem_limit_mi: f64,
    pub mem_used_mi: f64,
}

/// Kind of memory risk detected on a pod
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskKind {
    /// Usage is close to the enforced limit
    LimitCritical,
    /// Usage exceeds the declared request
    BurstOvercommit,
}

impl RiskKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskKind::LimitCritical => "LIMIT_CRITICAL",
            RiskKind::BurstOvercommit => "BURST_OVERCOMMIT",
        }
    }
}

impl fmt::Display for RiskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PodRiskEntry {
    pub namespace: String,
    pub name: String,
    pub mem_used_mi: f64,
    pub mem_limit_mi: f64,
    pub mem_request_mi: f64,
    pub risk_kind: RiskKind,
    /// usage/limit for limit risks, usage/request for burst risks
    pub risk_ratio: f64,
}

/// Display bucket for a node's memory pressure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeHealth {
    Nominal,
    HighLoad,
    OomDanger,
}

impl NodeHealth {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeHealth::Nominal => "NOMINAL",
            NodeHealth::HighLoad => "HIGH_LOAD",
            NodeHealth::OomDanger => "OOM_DANGER",
        }
    }
}

impl fmt::Display for NodeHealth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-node utilization row for the inspection table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeInspection {
    pub name: String,
    pub pool: String,
    pub cpu_pct: f64,
    pub mem_pct: f64,
    pub status: NodeHealth,
}
