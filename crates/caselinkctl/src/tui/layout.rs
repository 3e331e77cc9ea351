//! Layout - panel rectangles
//!
//! Top to bottom: header, form, stage line, main view, procedure panel,
//! status bar. On short terminals the procedure panel goes first.

use ratatui::layout::{Constraint, Direction, Layout, Rect};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelLayout {
    pub header: Rect,
    /// Four form fields side by side
    pub form: Rect,
    pub stage: Rect,
    /// Heatmap or cluster list, plus the parameter footer
    pub main: Rect,
    /// Zero height when there is no room
    pub procedure: Rect,
    pub status_bar: Rect,
}

const HEADER_HEIGHT: u16 = 1;
const FORM_HEIGHT: u16 = 3;
const STAGE_HEIGHT: u16 = 1;
const STATUS_BAR_HEIGHT: u16 = 1;
const MIN_MAIN_HEIGHT: u16 = 6;
const PROCEDURE_HEIGHT: u16 = 7;

pub fn compute_layout(area: Rect) -> PanelLayout {
    let fixed = HEADER_HEIGHT + FORM_HEIGHT + STAGE_HEIGHT + STATUS_BAR_HEIGHT;
    let remaining = area.height.saturating_sub(fixed);
    let procedure_height = if remaining >= MIN_MAIN_HEIGHT + PROCEDURE_HEIGHT {
        PROCEDURE_HEIGHT
    } else {
        0
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(HEADER_HEIGHT),
            Constraint::Length(FORM_HEIGHT),
            Constraint::Length(STAGE_HEIGHT),
            Constraint::Min(0),
            Constraint::Length(procedure_height),
            Constraint::Length(STATUS_BAR_HEIGHT),
        ])
        .split(area);

    PanelLayout {
        header: chunks[0],
        form: chunks[1],
        stage: chunks[2],
        main: chunks[3],
        procedure: chunks[4],
        status_bar: chunks[5],
    }
}

/// Split the form row into one box per field
pub fn form_fields(area: Rect) -> Vec<Rect> {
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(40),
            Constraint::Percentage(15),
            Constraint::Percentage(15),
            Constraint::Percentage(30),
        ])
        .split(area)
        .to_vec()
}
