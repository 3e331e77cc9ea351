//! Shared output helpers for one-shot commands

use anyhow::Result;
use owo_colors::OwoColorize;
use serde::Serialize;

pub const THIN_SEP: &str = "------------------------------------------------------------";

/// Bold title plus separator
pub fn print_title(title: &str) {
    println!();
    println!("  {}", title.bold());
    println!("{}", THIN_SEP);
}

/// `[SECTION]` header in cyan
pub fn print_section(name: &str) {
    println!("{}", format!("[{}]", name).cyan());
}

/// Aligned `  Label:  value` row
pub fn print_kv(label: &str, value: impl std::fmt::Display) {
    println!("  {:<16}{}", format!("{}:", label), value);
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Green `true` / red `false`
pub fn verdict(ok: bool) -> String {
    if ok {
        "true".green().to_string()
    } else {
        "false".red().to_string()
    }
}

/// Absent values print as `none`
pub fn or_none<T: std::fmt::Display>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "none".to_string())
}
