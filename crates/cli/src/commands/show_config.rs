//! Print the effective configuration

use advisor_lib::AdvisorConfig;
use anyhow::Result;
use tabled::Tabled;

use crate::output::{print_json, OutputFormat};

#[derive(Tabled)]
struct SettingRow {
    #[tabled(rename = "Setting")]
    key: String,
    #[tabled(rename = "Value")]
    value: String,
}

fn rows(config: &AdvisorConfig) -> Vec<SettingRow> {
    let mut rows: Vec<SettingRow> = config
        .thresholds
        .entries()
        .iter()
        .map(|(name, value)| SettingRow {
            key: format!("thresholds.{}", name),
            value: format!("{}", value),
        })
        .collect();

    let mut push = |key: &str, value: String| {
        rows.push(SettingRow {
            key: key.to_string(),
            value,
        })
    };
    push("excluded_namespaces", config.excluded_namespaces.join(", "));
    push("labels.pool", config.labels.pool.clone());
    push("labels.machine_type", config.labels.machine_type.clone());
    push("report.top_pods", config.report.top_pods.to_string());
    push(
        "source.request_timeout_secs",
        config.source.request_timeout_secs.to_string(),
    );
    rows
}

pub fn run(config: &AdvisorConfig, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(config)?,
        OutputFormat::Table => {
            let table = tabled::Table::new(rows(config))
                .with(tabled::settings::Style::rounded())
                .to_string();
            println!("{}", table);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_cover_every_setting() {
        let rows = rows(&AdvisorConfig::default());
        assert_eq!(rows.len(), 15);
        assert_eq!(rows[0].key, "thresholds.mem_upgrade");
        assert_eq!(rows[0].value, "80");
        assert!(rows
            .iter()
            .any(|r| r.key == "excluded_namespaces" && r.value.contains("kube-system")));
    }
}
