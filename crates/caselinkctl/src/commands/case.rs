//! `caselinkctl case ID` - one indexed case record

use anyhow::{Context, Result};
use caselink_common::types::display_value;
use caselink_common::ScanClient;

use super::utils::{print_json, print_kv, print_section, print_title, THIN_SEP};

pub async fn run(client: &ScanClient, id: &str, json: bool) -> Result<()> {
    let record = client
        .case(id)
        .await
        .with_context(|| format!("Failed to fetch case {}", id))?;

    if json {
        return print_json(&record);
    }

    print_title(&format!("Case {}", id));
    print_section("RECORD");
    for (field, value) in &record {
        print_kv(field, display_value(value));
    }
    println!("{}", THIN_SEP);
    println!();
    Ok(())
}
