//! `caselinkctl results`

use anyhow::{Context, Result};
use caselink_common::{ClusterList, Heatmap, ScanClient, ScanResults};
use std::path::Path;
use tracing::info;

use super::utils::{print_json, print_kv, print_section, print_title, THIN_SEP};
use crate::cli::ViewArg;

pub async fn run(
    client: &ScanClient,
    json: bool,
    view: ViewArg,
    svg: Option<&Path>,
    backend_view: Option<&str>,
) -> Result<()> {
    let results = client
        .results(backend_view)
        .await
        .context("Failed to fetch scan results")?;

    if let Some(path) = svg {
        write_svg(&results, path)?;
    }

    if json {
        return print_json(&results);
    }

    print_title("CaseLinker Results");
    print_section("PARAMETERS");
    print_kv("Threshold", fmt_opt(results.threshold));
    print_kv("Year window", fmt_opt(results.year_window));
    print_kv(
        "Geo window",
        results
            .geo_window
            .map(|g| g.to_string())
            .unwrap_or_else(|| "none".to_string()),
    );
    if let Some(counts) = results.counts {
        print_kv("Cases", counts.cases);
        print_kv("Matches", counts.matches);
    }
    println!();

    match view {
        ViewArg::Heatmap => print_heatmap(&results),
        ViewArg::Graph => print_clusters(&results),
    }

    println!("{}", THIN_SEP);
    if let Some(path) = svg {
        println!("  Heatmap written to {}", path.display());
    }
    println!();
    Ok(())
}

fn fmt_opt<T: std::fmt::Display>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}

fn write_svg(results: &ScanResults, path: &Path) -> Result<()> {
    let heatmap = Heatmap::from_matrix(results.matrix(), results.labels());
    std::fs::write(path, heatmap.render_svg())
        .with_context(|| format!("Failed to write {}", path.display()))?;
    info!("heatmap svg written to {}", path.display());
    Ok(())
}

fn print_heatmap(results: &ScanResults) {
    print_section("HEATMAP");
    let heatmap = Heatmap::from_matrix(results.matrix(), results.labels());
    if heatmap.is_empty() {
        println!("  {}", caselink_common::heatmap::NO_DATA);
        return;
    }
    let n = heatmap.dimension();
    print_kv("Size", format!("{}x{}", n, n));
    print_kv(
        "Cell",
        format!("{} units", caselink_common::heatmap::cell_size(n)),
    );
    let (min, max) = heatmap
        .cells()
        .iter()
        .filter(|c| c.row != c.col && c.value.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), c| {
            (lo.min(c.value), hi.max(c.value))
        });
    if min <= max {
        print_kv("Off-diagonal", format!("{:.3} .. {:.3}", min, max));
    }
    println!("  Use --svg FILE to save the full heatmap.");
}

fn print_clusters(results: &ScanResults) {
    let clusters = ClusterList::from_clusters(results.clusters());
    print_section("CLUSTERS");
    println!("  {}", clusters.header());
    for (line, entry) in clusters.lines().iter().zip(&clusters.entries) {
        let preview: Vec<&str> = entry.nodes.iter().take(5).map(String::as_str).collect();
        if preview.is_empty() {
            println!("  {}", line);
        } else {
            println!("  {:<16}{}", line, preview.join(", "));
        }
    }
    if !results.edges.is_empty() {
        println!();
        print_kv("Top links", results.edges.len());
    }
}
