//! Per-node memory pressure buckets for the inspection table

use super::percent_of;
use crate::config::Thresholds;
use crate::models::{NodeHealth, NodeInspection, NodeRecord};

#[derive(Debug, Clone)]
pub struct NodeInspector {
    high_load: f64,
    oom_danger: f64,
}

impl NodeInspector {
    pub fn new(thresholds: &Thresholds) -> Self {
        Self {
            high_load: thresholds.node_high_load,
            oom_danger: thresholds.node_oom_danger,
        }
    }

    pub fn health(&self, mem_pct: f64) -> NodeHealth {
        if mem_pct > self.oom_danger {
            NodeHealth::OomDanger
        } else if mem_pct > self.high_load {
            NodeHealth::HighLoad
        } else {
            NodeHealth::Nominal
        }
    }

    pub fn inspect_node(&self, node: &NodeRecord) -> NodeInspection {
        let mem_pct = percent_of(node.mem_used, node.mem_allocatable);
        NodeInspection {
            name: node.name.clone(),
            pool: node.pool.clone(),
            cpu_pct: percent_of(node.cpu_used, node.cpu_allocatable),
            mem_pct,
            status: self.health(mem_pct),
        }
    }

    /// Inspect every node, ordered by pool then node name
    pub fn inspect(&self, nodes: &[NodeRecord]) -> Vec<NodeInspection> {
        let mut rows: Vec<NodeInspection> = nodes.iter().map(|n| self.inspect_node(n)).collect();
        rows.sort_by(|a, b| a.pool.cmp(&b.pool).then_with(|| a.name.cmp(&b.name)));
        rows
    }
}

impl Default for NodeInspector {
    fn default() -> Self {
        Self::new(&Thresholds::default())
    }
}
