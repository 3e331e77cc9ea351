//! `caselinkctl watch` - poll the stage with a spinner
//!
//! Uses the same poller as the panel, so a slow response never overwrites a
//! newer one and failed polls keep the last stage on screen.

use anyhow::Result;
use caselink_common::{ClientConfig, PanelState, ScanClient};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::debug;

use crate::actions::{apply_event, shared_tracker};
use crate::poller::StatusPoller;

pub async fn run(
    client: &ScanClient,
    config: &ClientConfig,
    interval_ms: Option<u64>,
    until_idle: bool,
) -> Result<()> {
    let interval = interval_ms
        .map(Duration::from_millis)
        .unwrap_or_else(|| config.poll_interval());

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.enable_steady_tick(Duration::from_millis(120));
    spinner.set_message(format!("Waiting for {}", client.base_url()));

    let tracker = shared_tracker();
    let (tx, mut rx) = mpsc::channel(8);
    let mut poller = StatusPoller::spawn(client.clone(), interval, tracker.clone(), tx);
    let mut state = PanelState::default();

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                debug!("watch interrupted");
                break;
            }
            event = rx.recv() => {
                let Some(event) = event else { break };
                if !apply_event(&tracker, &mut state, event) {
                    continue;
                }
                if state.status_stale {
                    spinner.set_message(format!("{} (stale: service unreachable)", state.status));
                    continue;
                }
                spinner.set_message(state.status.to_string());
                if until_idle && state.status.is_idle() {
                    break;
                }
            }
        }
    }

    poller.stop();
    spinner.finish_with_message(format!("Stage: {}", state.status));
    Ok(())
}
