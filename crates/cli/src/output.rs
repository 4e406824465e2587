//! Output formatting utilities

use advisor_lib::{NodeHealth, PoolAction, RiskKind};
use clap::ValueEnum;
use colored::Colorize;
use serde::Serialize;

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Table format (default)
    #[default]
    Table,
    /// JSON format
    Json,
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow().bold(), message);
}

/// Print an info message
pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}

/// Print a section heading above a table
pub fn print_heading(title: &str) {
    println!("\n{}", title.bold());
}

/// Whole-number percentage
pub fn format_pct(value: f64) -> String {
    format!("{:.0}%", value)
}

/// Memory in MiB, or "-" when not declared
pub fn format_mi(value: f64) -> String {
    if value > 0.0 {
        format!("{:.0}Mi", value)
    } else {
        "-".to_string()
    }
}

/// Rows that need a new machine shape or more nodes are shown in red
pub fn highlight_action(action: PoolAction, text: &str) -> String {
    match action {
        PoolAction::UpgradeMem | PoolAction::UpgradeCpu | PoolAction::ScaleOut => {
            text.red().to_string()
        }
        PoolAction::ScaleIn => text.cyan().to_string(),
        PoolAction::None => text.to_string(),
    }
}

pub fn color_health(status: NodeHealth) -> String {
    match status {
        NodeHealth::OomDanger => status.as_str().red().bold().to_string(),
        NodeHealth::HighLoad => status.as_str().yellow().to_string(),
        NodeHealth::Nominal => status.as_str().green().to_string(),
    }
}

pub fn color_risk(kind: RiskKind) -> String {
    match kind {
        RiskKind::LimitCritical => kind.as_str().red().to_string(),
        RiskKind::BurstOvercommit => kind.as_str().yellow().to_string(),
    }
}

/// Namespaces of 20 chars or more keep their first 17 chars
pub fn truncate_namespace(namespace: &str) -> String {
    if namespace.chars().count() < 20 {
        namespace.to_string()
    } else {
        let head: String = namespace.chars().take(17).collect();
        format!("{}...", head)
    }
}

/// Pod names of 30 chars or more keep their last 27 chars
pub fn truncate_pod_name(name: &str) -> String {
    let len = name.chars().count();
    if len < 30 {
        name.to_string()
    } else {
        let tail: String = name.chars().skip(len - 27).collect();
        format!("...{}", tail)
    }
}

/// Keep the distinguishing suffix of a GKE node name
/// (`gke-prod-apps-pool-3f2a1b9c-x7k2` becomes `...3f2a1b9c-x7k2`)
pub fn short_node_name(name: &str) -> String {
    let segments: Vec<&str> = name.split('-').collect();
    let last = segments.last().copied().unwrap_or(name);
    let short = if last.chars().count() < 5 && segments.len() >= 2 {
        segments[segments.len() - 2..].join("-")
    } else {
        last.to_string()
    };
    if short == name {
        short
    } else {
        format!("...{}", short)
    }
}
