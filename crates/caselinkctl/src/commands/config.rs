//! `caselinkctl config show|set`

use anyhow::{Context, Result};
use caselink_common::{CaseLinkError, ConfigUpdate, ScanClient, ScanConfig};
use tracing::info;

use super::utils::{or_none, print_json, print_kv, print_section, print_title, THIN_SEP};

/// Flags for `config set`
#[derive(Debug, Default)]
pub struct SetArgs {
    pub csv: Option<String>,
    pub threshold: Option<f64>,
    pub year_window: Option<u32>,
    pub geo_window: Option<String>,
    pub sample_limit: Option<u32>,
}

pub async fn show(client: &ScanClient, json: bool) -> Result<()> {
    let config = client
        .get_config()
        .await
        .context("Failed to fetch scan config")?;
    if json {
        return print_json(&config);
    }
    print_config("CaseLinker Scan Config", &config);
    Ok(())
}

pub async fn set(client: &ScanClient, args: SetArgs) -> Result<()> {
    let update = build_update(args)?;
    let stored = client
        .set_config(&update)
        .await
        .context("Failed to update scan config")?;
    info!("scan config updated");
    print_config("CaseLinker Scan Config (saved)", &stored);
    Ok(())
}

/// `--geo-window none` parses but cannot clear the stored window: the
/// service treats null as "unchanged".
pub fn build_update(args: SetArgs) -> Result<ConfigUpdate, CaseLinkError> {
    if let Some(t) = args.threshold {
        if !(0.0..=1.0).contains(&t) {
            return Err(CaseLinkError::InvalidField {
                field: "similarity_threshold",
                value: t.to_string(),
            });
        }
    }

    let geo_window = match args.geo_window.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(g) if g.eq_ignore_ascii_case("none") => None,
        Some(g) => Some(g.parse().map_err(|_| CaseLinkError::InvalidField {
            field: "geo_window",
            value: g.to_string(),
        })?),
    };

    Ok(ConfigUpdate {
        csv_path: args.csv,
        similarity_threshold: args.threshold,
        year_window: args.year_window,
        geo_window,
        sample_limit: args.sample_limit,
    })
}

fn print_config(title: &str, config: &ScanConfig) {
    print_title(title);
    print_section("SCAN");
    print_kv("CSV", or_none(config.csv_path.as_deref()));
    print_kv("Similarity", or_none(config.similarity_threshold));
    print_kv("Year window", or_none(config.year_window));
    print_kv("Geo window", or_none(config.geo_window));
    if let Some(limit) = config.sample_limit {
        print_kv("Sample limit", limit);
    }
    println!("{}", THIN_SEP);
    println!();
}
