//! Event Loop - TUI entry point
//!
//! Keys are read with a 100ms poll so responses from spawned requests are
//! drained and drawn between keystrokes.

use crate::actions::{apply_event, shared_tracker, Controller, PanelEvent};
use crate::poller::StatusPoller;
use anyhow::Result;
use caselink_common::{ClientConfig, PanelState, ScanClient};
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::info;

use super::input::{handle_key, KeyCommand};
use super::render::draw_ui;

const EVENT_POLL: Duration = Duration::from_millis(100);

/// Run the panel until the operator quits
pub async fn run(config: &ClientConfig) -> Result<()> {
    let client = ScanClient::from_config(config)?;

    enable_raw_mode().map_err(|e| {
        anyhow::anyhow!(
            "Failed to enable raw mode: {}. Ensure you're running in a real terminal (TTY).",
            e
        )
    })?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).map_err(|e| {
        let _ = disable_raw_mode();
        anyhow::anyhow!("Failed to initialize terminal: {}", e)
    })?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = match Terminal::new(backend) {
        Ok(terminal) => terminal,
        Err(e) => {
            let _ = disable_raw_mode();
            let _ = execute!(io::stdout(), LeaveAlternateScreen);
            return Err(e.into());
        }
    };

    let result = run_event_loop(&mut terminal, config, client).await;

    // Restore terminal (always attempt cleanup)
    let cleanup_result = restore_terminal(&mut terminal);

    result.and(cleanup_result)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

async fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    config: &ClientConfig,
    client: ScanClient,
) -> Result<()> {
    let mut state = PanelState::with_defaults(&config.scan);
    let tracker = shared_tracker();
    let (tx, mut rx) = mpsc::channel::<PanelEvent>(32);

    let backend_url = client.base_url().to_string();
    let mut controller = Controller::new(
        client.clone(),
        tracker.clone(),
        tx.clone(),
        config.scan.duration_hours,
    );
    let mut poller = StatusPoller::spawn(client, config.poll_interval(), tracker.clone(), tx);

    info!("panel started against {}", backend_url);
    controller.load_config();

    loop {
        while let Ok(event) = rx.try_recv() {
            apply_event(&tracker, &mut state, event);
        }

        terminal.draw(|f| draw_ui(f, &state, &backend_url))?;

        // crossterm's poll blocks the thread; keep it off the runtime workers
        let ready = tokio::task::block_in_place(|| event::poll(EVENT_POLL))?;
        if !ready {
            continue;
        }

        let Event::Key(key) = event::read()? else {
            continue;
        };

        match handle_key(&mut state, key) {
            KeyCommand::None => {}
            KeyCommand::Quit => break,
            KeyCommand::SaveConfig => {
                state.notice = None;
                controller.save_config(&mut state);
            }
            KeyCommand::StartScan => {
                state.notice = None;
                controller.start_scan(&mut state);
            }
            KeyCommand::FetchResults => controller.fetch_results(),
            KeyCommand::ProcedureTest => controller.run_procedure_test(&state),
        }
    }

    info!("panel closing, {} requests abandoned", controller.pending());
    poller.stop();
    Ok(())
}
