//! Capacity decision engine
//!
//! Pure, synchronous analysis over a frozen cluster snapshot:
//! - Pool aggregation and rule-based classification
//! - Machine-type upgrade hints
//! - Pod memory risk scanning
//! - Node memory pressure buckets

mod aggregator;
mod classifier;
mod machine_type;
mod node_status;
mod pod_risk;
mod report;

pub use aggregator::PoolAggregator;
pub use classifier::{
    default_rules, ClassificationRule, PoolClassifier, PoolUtilization, KEEP_LABEL,
};
pub use machine_type::{suggest_upgrade, UpgradeDirection};
pub use node_status::NodeInspector;
pub use pod_risk::PodRiskScanner;
pub use report::{rank_risky_pods, Advisor, AdvisoryReport};

/// `used / total` as a percentage, 0 when there is no capacity
pub fn percent_of(used: f64, total: f64) -> f64 {
    if total > 0.0 {
        used / total * 100.0
    } else {
        0.0
    }
}
