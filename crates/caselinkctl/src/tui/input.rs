//! Key bindings for the panel
//!
//! Editing keys change the form directly. Keys that need the scan service are
//! returned as a [`KeyCommand`] for the event loop to dispatch.

use caselink_common::{PanelState, View};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// What the event loop should do after a key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCommand {
    None,
    Quit,
    SaveConfig,
    StartScan,
    FetchResults,
    ProcedureTest,
}

pub fn handle_key(state: &mut PanelState, key: KeyEvent) -> KeyCommand {
    if key.kind == KeyEventKind::Release {
        return KeyCommand::None;
    }

    // Help overlay swallows everything except its own toggles
    if state.show_help {
        match key.code {
            KeyCode::F(1) | KeyCode::Esc => state.show_help = false,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                return KeyCommand::Quit
            }
            _ => {}
        }
        return KeyCommand::None;
    }

    match (key.code, key.modifiers) {
        (KeyCode::Esc, _) => KeyCommand::Quit,
        (KeyCode::Char('c'), m) if m.contains(KeyModifiers::CONTROL) => KeyCommand::Quit,
        (KeyCode::Char('u'), m) if m.contains(KeyModifiers::CONTROL) => {
            state.clear_field();
            KeyCommand::None
        }
        (KeyCode::Tab, _) => {
            state.focus_next();
            KeyCommand::None
        }
        (KeyCode::BackTab, _) => {
            state.focus_prev();
            KeyCommand::None
        }
        (KeyCode::Backspace, _) => {
            state.pop_char();
            KeyCommand::None
        }
        (KeyCode::F(1), _) => {
            state.show_help = true;
            KeyCommand::None
        }
        (KeyCode::F(2), _) => KeyCommand::SaveConfig,
        (KeyCode::F(3), _) => {
            state.view = View::Heatmap;
            KeyCommand::None
        }
        (KeyCode::F(4), _) => {
            state.view = View::Graph;
            KeyCommand::None
        }
        (KeyCode::F(5), _) => KeyCommand::StartScan,
        (KeyCode::F(6), _) => KeyCommand::FetchResults,
        (KeyCode::F(7), _) => KeyCommand::ProcedureTest,
        (KeyCode::Char(ch), m) if !m.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) => {
            state.push_char(ch);
            KeyCommand::None
        }
        _ => KeyCommand::None,
    }
}
