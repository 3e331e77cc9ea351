//! Panel actions - spawned requests that report back through a channel.
//!
//! Each action takes a ticket from the shared [`RequestTracker`] before it
//! fires. Responses come back as [`PanelEvent`]s and only touch the panel
//! state if their ticket is still the newest on its channel.

use caselink_common::{
    Channel, PanelState, ProcedureTestResult, RequestTracker, ScanClient, ScanConfig,
    ScanResults, ScanStatus, StartAck, Ticket,
};
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

type Outcome<T> = caselink_common::Result<T>;

/// Response from a spawned request
#[derive(Debug)]
pub enum PanelEvent {
    Status {
        ticket: Ticket,
        result: Outcome<ScanStatus>,
    },
    ConfigLoaded {
        ticket: Ticket,
        result: Outcome<ScanConfig>,
    },
    ConfigSaved {
        ticket: Ticket,
        result: Outcome<ScanConfig>,
    },
    ScanStarted {
        ticket: Ticket,
        result: Outcome<StartAck>,
    },
    Results {
        ticket: Ticket,
        result: Outcome<ScanResults>,
    },
    Procedure {
        ticket: Ticket,
        result: Outcome<ProcedureTestResult>,
    },
}

impl PanelEvent {
    pub fn ticket(&self) -> Ticket {
        match self {
            PanelEvent::Status { ticket, .. }
            | PanelEvent::ConfigLoaded { ticket, .. }
            | PanelEvent::ConfigSaved { ticket, .. }
            | PanelEvent::ScanStarted { ticket, .. }
            | PanelEvent::Results { ticket, .. }
            | PanelEvent::Procedure { ticket, .. } => *ticket,
        }
    }
}

pub type SharedTracker = Arc<Mutex<RequestTracker>>;

pub fn shared_tracker() -> SharedTracker {
    Arc::new(Mutex::new(RequestTracker::new()))
}

/// A panicked holder cannot leave the tracker half-updated
pub(crate) fn lock(tracker: &SharedTracker) -> MutexGuard<'_, RequestTracker> {
    tracker.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Fires panel requests and applies their responses
pub struct Controller {
    client: ScanClient,
    tracker: SharedTracker,
    tx: mpsc::Sender<PanelEvent>,
    duration_hours: f64,
    tasks: Vec<JoinHandle<()>>,
}

impl Controller {
    pub fn new(
        client: ScanClient,
        tracker: SharedTracker,
        tx: mpsc::Sender<PanelEvent>,
        duration_hours: f64,
    ) -> Self {
        Self {
            client,
            tracker,
            tx,
            duration_hours,
            tasks: Vec::new(),
        }
    }

    /// Fetch the stored config to seed the form
    pub fn load_config(&mut self) {
        let client = self.client.clone();
        self.spawn(Channel::Config, |ticket| async move {
            PanelEvent::ConfigLoaded {
                ticket,
                result: client.get_config().await,
            }
        });
    }

    pub fn save_config(&mut self, state: &mut PanelState) {
        let update = match state.config_update() {
            Ok(update) => update,
            Err(e) => {
                state.record_error("Save config", &e);
                return;
            }
        };
        let client = self.client.clone();
        self.spawn(Channel::Config, |ticket| async move {
            PanelEvent::ConfigSaved {
                ticket,
                result: client.set_config(&update).await,
            }
        });
    }

    pub fn start_scan(&mut self, state: &mut PanelState) {
        let request = match state.start_request(self.duration_hours) {
            Ok(request) => request,
            Err(e) => {
                state.record_error("Start scan", &e);
                return;
            }
        };
        let client = self.client.clone();
        self.spawn(Channel::Start, |ticket| async move {
            PanelEvent::ScanStarted {
                ticket,
                result: client.start_scan(&request).await,
            }
        });
    }

    pub fn fetch_results(&mut self) {
        let client = self.client.clone();
        self.spawn(Channel::Results, |ticket| async move {
            PanelEvent::Results {
                ticket,
                result: client.results(None).await,
            }
        });
    }

    /// Checks the CSV in the form, or the stored one when the field is empty
    pub fn run_procedure_test(&mut self, state: &PanelState) {
        let csv_path = Some(state.csv_path.trim().to_string()).filter(|p| !p.is_empty());
        let client = self.client.clone();
        self.spawn(Channel::Procedure, |ticket| async move {
            PanelEvent::Procedure {
                ticket,
                result: client.test_procedure(csv_path.as_deref(), None).await,
            }
        });
    }

    /// One status fetch outside the poller's schedule
    pub fn refresh_status(&mut self) {
        let client = self.client.clone();
        self.spawn(Channel::Status, |ticket| async move {
            PanelEvent::Status {
                ticket,
                result: client.status().await,
            }
        });
    }

    /// Number of spawned requests not yet finished
    pub fn pending(&mut self) -> usize {
        self.tasks.retain(|task| !task.is_finished());
        self.tasks.len()
    }

    fn spawn<F, Fut>(&mut self, channel: Channel, request: F)
    where
        F: FnOnce(Ticket) -> Fut,
        Fut: Future<Output = PanelEvent> + Send + 'static,
    {
        let ticket = lock(&self.tracker).issue(channel);
        debug!("issued {:?} ticket {}", channel, ticket.seq);

        let fut = request(ticket);
        let tx = self.tx.clone();
        self.tasks.retain(|task| !task.is_finished());
        self.tasks.push(tokio::spawn(async move {
            // Receiver gone means the panel is shutting down
            let _ = tx.send(fut.await).await;
        }));
    }

    /// Apply a response; returns false when it was superseded and dropped.
    pub fn apply(&self, state: &mut PanelState, event: PanelEvent) -> bool {
        apply_event(&self.tracker, state, event)
    }
}

impl Drop for Controller {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
    }
}

/// Tracker check plus state update, shared by the controller and poller users
pub fn apply_event(tracker: &SharedTracker, state: &mut PanelState, event: PanelEvent) -> bool {
    let ticket = event.ticket();
    if !lock(tracker).accept(ticket) {
        debug!("dropped stale {:?} response {}", ticket.channel, ticket.seq);
        return false;
    }

    match event {
        PanelEvent::Status { result, .. } => match result {
            Ok(status) => state.set_status(status),
            Err(e) => {
                debug!("status poll failed: {}", e);
                state.status_failed();
            }
        },
        PanelEvent::ConfigLoaded { result, .. } => match result {
            Ok(config) => {
                state.apply_loaded_config(&config);
                state.clear_error();
            }
            Err(e) => {
                warn!("config load failed: {}", e);
                state.record_error("Load config", &e);
            }
        },
        PanelEvent::ConfigSaved { result, .. } => match result {
            Ok(config) => {
                state.apply_saved_config(&config);
                state.clear_error();
                state.notice = Some("Config saved".to_string());
                info!("config saved");
            }
            Err(e) => {
                warn!("config save failed: {}", e);
                state.record_error("Save config", &e);
            }
        },
        PanelEvent::ScanStarted { result, .. } => match result {
            Ok(ack) => {
                // Results requested before this start describe the old scan
                lock(tracker).supersede(Channel::Results);
                state.scan_started();
                state.clear_error();
                let status = ack.status.unwrap_or_else(|| "started".to_string());
                info!("scan start acknowledged: {}", status);
                state.notice = Some(format!("Scan {}", status));
            }
            Err(e) => {
                warn!("scan start failed: {}", e);
                state.record_error("Start scan", &e);
            }
        },
        PanelEvent::Results { result, .. } => match result {
            Ok(results) => {
                state.set_results(results);
                state.clear_error();
            }
            Err(e) => {
                warn!("results fetch failed: {}", e);
                state.record_error("Get results", &e);
            }
        },
        PanelEvent::Procedure { result, .. } => match result {
            Ok(report) => {
                state.set_procedure(report);
                state.clear_error();
            }
            Err(e) => {
                warn!("procedure test failed: {}", e);
                state.record_error("Procedure test", &e);
            }
        },
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use caselink_common::CaseLinkError;

    #[test]
    fn stale_status_does_not_overwrite_newer() {
        let tracker = shared_tracker();
        let mut state = PanelState::default();

        let old = lock(&tracker).issue(Channel::Status);
        let new = lock(&tracker).issue(Channel::Status);

        let running = ScanStatus {
            stage: "Scanning (2000 cases)".into(),
            ..Default::default()
        };
        assert!(apply_event(
            &tracker,
            &mut state,
            PanelEvent::Status {
                ticket: new,
                result: Ok(running)
            }
        ));
        assert!(!apply_event(
            &tracker,
            &mut state,
            PanelEvent::Status {
                ticket: old,
                result: Ok(ScanStatus::default())
            }
        ));
        assert_eq!(state.status.stage, "Scanning (2000 cases)");
    }

    #[test]
    fn failed_poll_marks_status_stale() {
        let tracker = shared_tracker();
        let mut state = PanelState::default();
        let ticket = lock(&tracker).issue(Channel::Status);

        apply_event(
            &tracker,
            &mut state,
            PanelEvent::Status {
                ticket,
                result: Err(CaseLinkError::Transport {
                    url: "http://127.0.0.1:8000/scan/status".into(),
                    message: "connection refused".into(),
                }),
            },
        );
        assert!(state.status_stale);
        assert_eq!(state.status.stage, "Idle");
        assert!(state.last_error.is_none());
    }

    #[test]
    fn acknowledged_start_abandons_pending_results() {
        let tracker = shared_tracker();
        let mut state = PanelState::default();
        state.set_results(ScanResults {
            matrix: Some(vec![vec![1.0]]),
            ..Default::default()
        });

        let results = lock(&tracker).issue(Channel::Results);
        let start = lock(&tracker).issue(Channel::Start);
        apply_event(
            &tracker,
            &mut state,
            PanelEvent::ScanStarted {
                ticket: start,
                result: Ok(serde_json::from_value(serde_json::json!({"status": "started"})).unwrap()),
            },
        );
        assert!(state.results.is_none());
        assert_eq!(state.notice.as_deref(), Some("Scan started"));

        let late = PanelEvent::Results {
            ticket: results,
            result: Ok(ScanResults {
                matrix: Some(vec![vec![0.5]]),
                ..Default::default()
            }),
        };
        assert!(!apply_event(&tracker, &mut state, late));
        assert!(state.results.is_none());
    }

    #[test]
    fn busy_start_keeps_results_and_reports() {
        let tracker = shared_tracker();
        let mut state = PanelState::default();
        state.set_results(ScanResults::default());
        let start = lock(&tracker).issue(Channel::Start);

        apply_event(
            &tracker,
            &mut state,
            PanelEvent::ScanStarted {
                ticket: start,
                result: Err(CaseLinkError::Busy("Scan already running".into())),
            },
        );
        assert!(state.results.is_some());
        assert!(state
            .last_error
            .as_deref()
            .is_some_and(|e| e.starts_with("Start scan failed")));
    }
}
