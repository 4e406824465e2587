//! Node ingestion and per-pool aggregation

use std::collections::BTreeMap;

use tracing::{debug, warn};

use super::classifier::PoolClassifier;
use crate::config::{AdvisorConfig, LabelConfig};
use crate::models::{
    NodeInventoryItem, NodeRecord, PoolVerdict, UsageSample, DEFAULT_POOL, UNKNOWN_MACHINE_TYPE,
};
use crate::quantity::{parse_cpu, parse_memory};

/// Groups nodes by pool and classifies each pool
#[derive(Debug, Clone)]
pub struct PoolAggregator {
    classifier: PoolClassifier,
    labels: LabelConfig,
}

impl PoolAggregator {
    pub fn new(config: &AdvisorConfig) -> Self {
        Self::with_classifier(PoolClassifier::new(config.thresholds.clone()), config.labels.clone())
    }

    pub fn with_classifier(classifier: PoolClassifier, labels: LabelConfig) -> Self {
        Self { classifier, labels }
    }

    /// Resolve labels and parse quantities for every named node.
    ///
    /// Nodes without a usage sample are treated as idle.
    pub fn ingest(
        &self,
        inventory: &[NodeInventoryItem],
        usage: &BTreeMap<String, UsageSample>,
    ) -> Vec<NodeRecord> {
        inventory
            .iter()
            .filter_map(|item| {
                let Some(name) = item.name.as_deref().filter(|n| !n.is_empty()) else {
                    debug!("Skipping node without a name");
                    return None;
                };
                Some(self.to_record(name, item, usage.get(name)))
            })
            .collect()
    }

    fn to_record(
        &self,
        name: &str,
        item: &NodeInventoryItem,
        usage: Option<&UsageSample>,
    ) -> NodeRecord {
        let label = |key: &str, fallback: &str| {
            item.labels
                .get(key)
                .cloned()
                .unwrap_or_else(|| fallback.to_string())
        };
        let allocatable = |resource: &str| {
            item.allocatable
                .get(resource)
                .map(String::as_str)
                .unwrap_or("0")
        };

        NodeRecord {
            name: name.to_string(),
            pool: label(&self.labels.pool, DEFAULT_POOL),
            machine_type: label(&self.labels.machine_type, UNKNOWN_MACHINE_TYPE),
            cpu_allocatable: parse_cpu(allocatable("cpu")),
            mem_allocatable: parse_memory(allocatable("memory")),
            cpu_used: usage.map(|u| parse_cpu(&u.cpu)).unwrap_or(0.0),
            mem_used: usage.map(|u| parse_memory(&u.memory)).unwrap_or(0.0),
        }
    }

    /// Group records by pool, keeping inventory order inside each pool
    pub fn group(records: &[NodeRecord]) -> BTreeMap<String, Vec<NodeRecord>> {
        let mut pools: BTreeMap<String, Vec<NodeRecord>> = BTreeMap::new();
        for record in records {
            pools
                .entry(record.pool.clone())
                .or_default()
                .push(record.clone());
        }
        pools
    }

    /// Classify every pool; pools without allocatable capacity are dropped.
    ///
    /// Verdicts are ordered by pool name.
    pub fn aggregate(&self, records: &[NodeRecord]) -> Vec<PoolVerdict> {
        Self::group(records)
            .into_iter()
            .filter_map(|(pool, nodes)| {
                let verdict = self.classifier.classify(&pool, &nodes);
                if verdict.is_none() {
                    warn!(
                        event = "pool_skipped",
                        pool = %pool,
                        node_count = nodes.len(),
                        "Pool has no allocatable CPU or memory, skipping"
                    );
                }
                verdict
            })
            .collect()
    }
}
