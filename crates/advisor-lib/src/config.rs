//! Advisor configuration
//!
//! All decision thresholds and the excluded-namespace set live here and are
//! handed to the classifier and scanner at construction, so alternate fleets
//! can retune them without touching the engine.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Namespaces that host platform services rather than workloads
pub const DEFAULT_EXCLUDED_NAMESPACES: &[&str] = &[
    "kube-system",
    "gke-managed-system",
    "istio-system",
    "gmp-system",
    "gke-gmp-system",
    "gke-managed-cim",
    "gke-managed-dpv2-observability",
];

pub const DEFAULT_POOL_LABEL: &str = "cloud.google.com/gke-nodepool";
pub const DEFAULT_MACHINE_TYPE_LABEL: &str = "node.kubernetes.io/instance-type";

/// Number of risky pods kept in the report
pub const DEFAULT_TOP_PODS: usize = 15;

/// Timeout for each call to the Kubernetes API
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid config: {0}")]
    Validation(String),
}

/// Decision thresholds, all in percent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Pool memory above this with idle CPU asks for a high-memory shape
    pub mem_upgrade: f64,
    /// Pool CPU above this with idle memory asks for a high-CPU shape
    pub cpu_upgrade: f64,
    /// Either resource above this asks for more nodes
    pub scale_out: f64,
    /// Both resources below this asks for fewer nodes
    pub scale_in: f64,
    /// CPU below this counts as idle for a memory upgrade
    pub cpu_crossover: f64,
    /// Memory below this counts as idle for a CPU upgrade
    pub mem_crossover: f64,
    /// Pod usage above this share of its limit is critical
    pub pod_limit_critical: f64,
    /// Pod usage above this share of its request is overcommitted
    pub pod_burst_critical: f64,
    pub node_oom_danger: f64,
    pub node_high_load: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            mem_upgrade: 80.0,
            cpu_upgrade: 80.0,
            scale_out: 75.0,
            scale_in: 20.0,
            cpu_crossover: 40.0,
            mem_crossover: 40.0,
            pod_limit_critical: 85.0,
            pod_burst_critical: 100.0,
            node_oom_danger: 90.0,
            node_high_load: 80.0,
        }
    }
}

impl Thresholds {
    /// Named view used for validation and display
    pub fn entries(&self) -> [(&'static str, f64); 10] {
        [
            ("mem_upgrade", self.mem_upgrade),
            ("cpu_upgrade", self.cpu_upgrade),
            ("scale_out", self.scale_out),
            ("scale_in", self.scale_in),
            ("cpu_crossover", self.cpu_crossover),
            ("mem_crossover", self.mem_crossover),
            ("pod_limit_critical", self.pod_limit_critical),
            ("pod_burst_critical", self.pod_burst_critical),
            ("node_oom_danger", self.node_oom_danger),
            ("node_high_load", self.node_high_load),
        ]
    }
}

/// Label keys read from node metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelConfig {
    pub pool: String,
    pub machine_type: String,
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            pool: DEFAULT_POOL_LABEL.to_string(),
            machine_type: DEFAULT_MACHINE_TYPE_LABEL.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub top_pods: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            top_pods: DEFAULT_TOP_PODS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub request_timeout_secs: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

/// Complete advisor configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvisorConfig {
    pub thresholds: Thresholds,
    pub excluded_namespaces: Vec<String>,
    pub labels: LabelConfig,
    pub report: ReportConfig,
    pub source: SourceConfig,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            thresholds: Thresholds::default(),
            excluded_namespaces: DEFAULT_EXCLUDED_NAMESPACES
                .iter()
                .map(|ns| ns.to_string())
                .collect(),
            labels: LabelConfig::default(),
            report: ReportConfig::default(),
            source: SourceConfig::default(),
        }
    }
}

impl AdvisorConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in self.thresholds.entries() {
            if name == "pod_burst_critical" {
                if !value.is_finite() || value <= 0.0 {
                    return Err(ConfigError::Validation(format!(
                        "thresholds.{} must be a positive number",
                        name
                    )));
                }
            } else {
                validate_percentage(name, value)?;
            }
        }
        if self.labels.pool.trim().is_empty() {
            return Err(ConfigError::Validation(
                "labels.pool must not be empty".to_string(),
            ));
        }
        if self.labels.machine_type.trim().is_empty() {
            return Err(ConfigError::Validation(
                "labels.machine_type must not be empty".to_string(),
            ));
        }
        if self.report.top_pods == 0 {
            return Err(ConfigError::Validation(
                "report.top_pods must be greater than 0".to_string(),
            ));
        }
        if self.source.request_timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "source.request_timeout_secs must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

fn validate_percentage(name: &str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() || !(0.0..=100.0).contains(&value) {
        return Err(ConfigError::Validation(format!(
            "thresholds.{} must be between 0 and 100",
            name
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_fleet_baseline() {
        let config = AdvisorConfig::default();
        assert_eq!(config.thresholds.mem_upgrade, 80.0);
        assert_eq!(config.thresholds.scale_out, 75.0);
        assert_eq!(config.thresholds.scale_in, 20.0);
        assert_eq!(config.excluded_namespaces.len(), 7);
        assert!(config.excluded_namespaces.iter().any(|ns| ns == "kube-system"));
        assert_eq!(config.report.top_pods, 15);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_out_of_range_threshold_rejected() {
        let mut config = AdvisorConfig::default();
        config.thresholds.scale_out = 120.0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("thresholds.scale_out"));
    }

    #[test]
    fn test_burst_threshold_may_exceed_hundred() {
        let mut config = AdvisorConfig::default();
        config.thresholds.pod_burst_critical = 150.0;
        assert!(config.validate().is_ok());

        config.thresholds.pod_burst_critical = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_top_pods_rejected() {
        let mut config = AdvisorConfig::default();
        config.report.top_pods = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: AdvisorConfig =
            serde_json::from_str(r#"{"thresholds": {"scale_out": 70}}"#).unwrap();
        assert_eq!(config.thresholds.scale_out, 70.0);
        assert_eq!(config.thresholds.mem_upgrade, 80.0);
        assert_eq!(config.labels.pool, DEFAULT_POOL_LABEL);
    }
}
