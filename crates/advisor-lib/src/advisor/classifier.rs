//! Node pool classification
//!
//! Pools are classified by an ordered rule table evaluated top to bottom;
//! the first matching rule decides the action. Shape problems (memory or
//! CPU starved while the other resource idles) come before capacity
//! problems, so a memory-bound pool is re-shaped rather than grown.

use super::machine_type::{suggest_upgrade, UpgradeDirection};
use super::percent_of;
use crate::config::Thresholds;
use crate::models::{NodeRecord, PoolAction, PoolVerdict};

/// Recommendation used when no rule matches
pub const KEEP_LABEL: &str = "Keep as-is";

/// Average utilization of a pool, in percent
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoolUtilization {
    pub avg_cpu_pct: f64,
    pub avg_mem_pct: f64,
}

impl PoolUtilization {
    /// Compute pool-wide utilization from summed usage over summed capacity.
    ///
    /// Returns `None` for an empty pool or when either allocatable sum is zero.
    pub fn from_nodes(nodes: &[NodeRecord]) -> Option<Self> {
        let cpu_allocatable: f64 = nodes.iter().map(|n| n.cpu_allocatable).sum();
        let mem_allocatable: f64 = nodes.iter().map(|n| n.mem_allocatable).sum();
        if cpu_allocatable <= 0.0 || mem_allocatable <= 0.0 {
            return None;
        }

        let cpu_used: f64 = nodes.iter().map(|n| n.cpu_used).sum();
        let mem_used: f64 = nodes.iter().map(|n| n.mem_used).sum();

        Some(Self {
            avg_cpu_pct: percent_of(cpu_used, cpu_allocatable),
            avg_mem_pct: percent_of(mem_used, mem_allocatable),
        })
    }
}

type RulePredicate = fn(&PoolUtilization, &Thresholds) -> bool;

/// One row of the classification table
#[derive(Clone)]
pub struct ClassificationRule {
    pub action: PoolAction,
    pub label: &'static str,
    predicate: RulePredicate,
}

impl ClassificationRule {
    pub fn new(action: PoolAction, label: &'static str, predicate: RulePredicate) -> Self {
        Self {
            action,
            label,
            predicate,
        }
    }

    pub fn matches(&self, utilization: &PoolUtilization, thresholds: &Thresholds) -> bool {
        (self.predicate)(utilization, thresholds)
    }
}

impl std::fmt::Debug for ClassificationRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassificationRule")
            .field("action", &self.action)
            .field("label", &self.label)
            .finish()
    }
}

/// The rule table in priority order
pub fn default_rules() -> Vec<ClassificationRule> {
    vec![
        ClassificationRule::new(
            PoolAction::UpgradeMem,
            "Upgrade machine type (HighMem)",
            |u, t| u.avg_mem_pct > t.mem_upgrade && u.avg_cpu_pct < t.cpu_crossover,
        ),
        ClassificationRule::new(
            PoolAction::UpgradeCpu,
            "Upgrade machine type (HighCPU)",
            |u, t| u.avg_cpu_pct > t.cpu_upgrade && u.avg_mem_pct < t.mem_crossover,
        ),
        ClassificationRule::new(PoolAction::ScaleOut, "Scale out (add nodes)", |u, t| {
            u.avg_mem_pct > t.scale_out || u.avg_cpu_pct > t.scale_out
        }),
        ClassificationRule::new(PoolAction::ScaleIn, "Scale in (remove nodes)", |u, t| {
            u.avg_mem_pct < t.scale_in && u.avg_cpu_pct < t.scale_in
        }),
        ClassificationRule::new(PoolAction::None, KEEP_LABEL, |_, _| true),
    ]
}

/// Applies the rule table to node pools
#[derive(Debug, Clone)]
pub struct PoolClassifier {
    thresholds: Thresholds,
    rules: Vec<ClassificationRule>,
}

impl PoolClassifier {
    pub fn new(thresholds: Thresholds) -> Self {
        Self::with_rules(thresholds, default_rules())
    }

    pub fn with_rules(thresholds: Thresholds, rules: Vec<ClassificationRule>) -> Self {
        Self { thresholds, rules }
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    pub fn rules(&self) -> &[ClassificationRule] {
        &self.rules
    }

    /// Pick the action and label of the first matching rule
    pub fn decide(&self, utilization: &PoolUtilization) -> (PoolAction, &'static str) {
        self.rules
            .iter()
            .find(|rule| rule.matches(utilization, &self.thresholds))
            .map(|rule| (rule.action, rule.label))
            .unwrap_or((PoolAction::None, KEEP_LABEL))
    }

    /// Classify a pool, or `None` when it has no allocatable capacity
    pub fn classify(&self, pool_name: &str, nodes: &[NodeRecord]) -> Option<PoolVerdict> {
        let first = nodes.first()?;
        let utilization = PoolUtilization::from_nodes(nodes)?;
        let (action, label) = self.decide(&utilization);

        let hint = match action {
            PoolAction::UpgradeMem => {
                suggest_upgrade(&first.machine_type, UpgradeDirection::UpgradeMem)
            }
            PoolAction::UpgradeCpu => {
                suggest_upgrade(&first.machine_type, UpgradeDirection::UpgradeCpu)
            }
            _ => String::new(),
        };

        Some(PoolVerdict {
            pool_name: pool_name.to_string(),
            machine_type: first.machine_type.clone(),
            node_count: nodes.len(),
            avg_cpu_pct: utilization.avg_cpu_pct,
            avg_mem_pct: utilization.avg_mem_pct,
            action,
            recommendation: format!("{}{}", label, hint),
        })
    }
}

impl Default for PoolClassifier {
    fn default() -> Self {
        Self::new(Thresholds::default())
    }
}
