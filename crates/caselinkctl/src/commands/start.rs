//! `caselinkctl start`

use anyhow::{Context, Result};
use caselink_common::{CaseLinkError, ScanClient, StartScanRequest};
use owo_colors::OwoColorize;
use tracing::info;

use super::utils::{or_none, print_kv, print_section, print_title, THIN_SEP};
use crate::cli::StartArgs;

/// Unset flags go out as null so the service uses its stored config
pub fn build_request(
    args: &StartArgs,
    default_duration: f64,
) -> Result<StartScanRequest, CaseLinkError> {
    if let Some(t) = args.threshold {
        if !(0.0..=1.0).contains(&t) {
            return Err(CaseLinkError::InvalidField {
                field: "similarity_threshold",
                value: t.to_string(),
            });
        }
    }
    let duration = args.duration_hours.unwrap_or(default_duration);
    if duration.is_nan() || duration <= 0.0 {
        return Err(CaseLinkError::InvalidField {
            field: "duration_hours",
            value: duration.to_string(),
        });
    }

    Ok(StartScanRequest {
        csv_path: args.csv.clone(),
        duration_hours: Some(duration),
        similarity_threshold: args.threshold,
        year_window: args.year_window,
        geo_window: args.geo_window,
    })
}

pub async fn run(client: &ScanClient, args: &StartArgs, default_duration: f64) -> Result<()> {
    let request = build_request(args, default_duration)?;
    let ack = client
        .start_scan(&request)
        .await
        .context("Failed to start scan")?;
    let status = ack.status.unwrap_or_else(|| "started".to_string());
    info!("scan {}", status);

    print_title("CaseLinker Scan");
    print_section("REQUEST");
    print_kv("CSV", or_none(request.csv_path.as_deref()));
    print_kv("Duration (h)", or_none(request.duration_hours));
    print_kv("Similarity", or_none(request.similarity_threshold));
    print_kv("Year window", or_none(request.year_window));
    print_kv("Geo window", or_none(request.geo_window));
    println!();
    print_kv("Status", status.green());
    println!("{}", THIN_SEP);
    println!("  Use 'caselinkctl watch --until-idle' to follow progress.");
    println!();
    Ok(())
}
