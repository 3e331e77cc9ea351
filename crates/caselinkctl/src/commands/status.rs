//! `caselinkctl status`

use anyhow::{Context, Result};
use caselink_common::ScanClient;
use owo_colors::OwoColorize;

use super::utils::{print_json, print_kv, print_section, print_title, THIN_SEP};

pub async fn run(client: &ScanClient, json: bool) -> Result<()> {
    let status = client
        .status()
        .await
        .context("Failed to fetch scan status")?;

    if json {
        return print_json(&status);
    }

    print_title("CaseLinker Scan Status");
    print_section("SCAN");
    let stage = if status.is_idle() {
        status.to_string().green().to_string()
    } else {
        status.to_string().yellow().to_string()
    };
    print_kv("Stage", stage);
    print_kv("Service", client.base_url());
    println!("{}", THIN_SEP);
    Ok(())
}
