//! Status poller
//!
//! Fetches `/scan/status` on a fixed interval for as long as it is alive.
//! Each fetch takes a `Status` ticket, so a slow response that lands after a
//! newer one is dropped by the tracker.

use crate::actions::{lock, PanelEvent, SharedTracker};
use caselink_common::{Channel, ScanClient};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::debug;

pub struct StatusPoller {
    task: Option<JoinHandle<()>>,
}

impl StatusPoller {
    /// Start polling; the first fetch happens immediately.
    pub fn spawn(
        client: ScanClient,
        interval: Duration,
        tracker: SharedTracker,
        tx: mpsc::Sender<PanelEvent>,
    ) -> Self {
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                ticker.tick().await;
                let ticket = lock(&tracker).issue(Channel::Status);
                let result = client.status().await;
                if tx.send(PanelEvent::Status { ticket, result }).await.is_err() {
                    debug!("status receiver closed, poller exiting");
                    break;
                }
            }
        });

        Self { task: Some(task) }
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Abort the loop and any request it has in flight
    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for StatusPoller {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::shared_tracker;

    fn unreachable_client() -> ScanClient {
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        ScanClient::new(&format!("http://127.0.0.1:{}", port), Duration::from_secs(1)).unwrap()
    }

    #[tokio::test]
    async fn failed_fetches_still_report() {
        let (tx, mut rx) = mpsc::channel(4);
        let _poller = StatusPoller::spawn(
            unreachable_client(),
            Duration::from_millis(50),
            shared_tracker(),
            tx,
        );

        let event = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .unwrap()
            .unwrap();
        match event {
            PanelEvent::Status { result, .. } => assert!(result.is_err()),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn stop_ends_the_loop() {
        let (tx, mut rx) = mpsc::channel(4);
        let mut poller = StatusPoller::spawn(
            unreachable_client(),
            Duration::from_secs(3600),
            shared_tracker(),
            tx,
        );
        poller.stop();
        assert!(!poller.is_running());

        // The sender is dropped with the aborted task
        let next = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .unwrap();
        if let Some(PanelEvent::Status { .. }) = next {
            // A fetch may have completed before the abort landed
            assert!(rx.recv().await.is_none());
        }
    }
}
