//! Machine-type upgrade suggestions
//!
//! GKE machine types follow `family-series-cores` (e.g. `n2-standard-4`).
//! An upgrade keeps family and core count and swaps the series.

use serde::{Deserialize, Serialize};

use crate::models::UNKNOWN_MACHINE_TYPE;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UpgradeDirection {
    UpgradeMem,
    UpgradeCpu,
}

/// Suggest a replacement machine type, formatted as `" → family-series-cores"`.
///
/// Returns an empty string when the current type is unknown or does not
/// follow the naming convention.
pub fn suggest_upgrade(current: &str, direction: UpgradeDirection) -> String {
    if current.is_empty() || current.contains(UNKNOWN_MACHINE_TYPE) {
        return String::new();
    }

    let parts: Vec<&str> = current.split('-').collect();
    let [family, series, cores, ..] = parts.as_slice() else {
        return String::new();
    };

    let new_series = match direction {
        UpgradeDirection::UpgradeMem if *series == "standard" => "highmem",
        UpgradeDirection::UpgradeCpu if *series == "standard" => "highcpu",
        _ => "standard",
    };

    format!(" → {}-{}-{}", family, new_series, cores)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_to_highmem() {
        assert_eq!(
            suggest_upgrade("n2-standard-4", UpgradeDirection::UpgradeMem),
            " → n2-highmem-4"
        );
    }

    #[test]
    fn test_standard_to_highcpu() {
        assert_eq!(
            suggest_upgrade("e2-standard-8", UpgradeDirection::UpgradeCpu),
            " → e2-highcpu-8"
        );
    }

    #[test]
    fn test_skewed_series_returns_to_standard() {
        assert_eq!(
            suggest_upgrade("n2-highmem-4", UpgradeDirection::UpgradeCpu),
            " → n2-standard-4"
        );
        assert_eq!(
            suggest_upgrade("n2d-highcpu-16", UpgradeDirection::UpgradeMem),
            " → n2d-standard-16"
        );
    }

    #[test]
    fn test_unknown_or_malformed_types() {
        assert_eq!(suggest_upgrade("unknown", UpgradeDirection::UpgradeMem), "");
        assert_eq!(suggest_upgrade("", UpgradeDirection::UpgradeCpu), "");
        assert_eq!(suggest_upgrade("custom-8", UpgradeDirection::UpgradeMem), "");
        assert_eq!(
            suggest_upgrade("n2-unknown-4", UpgradeDirection::UpgradeMem),
            ""
        );
    }

    #[test]
    fn test_extra_segments_ignored() {
        assert_eq!(
            suggest_upgrade("n2-standard-4-spot", UpgradeDirection::UpgradeMem),
            " → n2-highmem-4"
        );
    }
}
