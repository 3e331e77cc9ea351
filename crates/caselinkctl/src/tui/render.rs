//! Rendering - draws the panel from `PanelState`

use caselink_common::{Field, PanelState, View};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Tabs, Wrap},
    Frame,
};

use super::heatmap::{heatmap_lines, legend_line};
use super::layout::{compute_layout, form_fields};
use super::utils::{draw_help_overlay, truncate};

const ACCENT: Color = Color::Rgb(150, 200, 255);

/// Draw the whole panel
pub fn draw_ui(f: &mut Frame, state: &PanelState, backend: &str) {
    let size = f.size();
    let grid = compute_layout(size);

    draw_header(f, grid.header, backend);
    draw_form(f, grid.form, state);
    draw_stage(f, grid.stage, state);
    draw_main(f, grid.main, state);
    if grid.procedure.height > 0 {
        draw_procedure(f, grid.procedure, state);
    }
    draw_status_bar(f, grid.status_bar, state);

    if state.show_help {
        draw_help_overlay(f, size);
    }
}

/// `CaseLinker v0.3.0 | http://127.0.0.1:8000/ | 15:42:08`
fn draw_header(f: &mut Frame, area: Rect, backend: &str) {
    let time = chrono::Local::now().format("%H:%M:%S");
    let text = format!(
        "CaseLinker v{} | {} | {}",
        env!("CASELINKER_VERSION"),
        backend,
        time
    );
    let header = Paragraph::new(Line::from(vec![
        Span::raw(" "),
        Span::styled(
            truncate(&text, usize::from(area.width).saturating_sub(1)),
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        ),
    ]))
    .style(Style::default().bg(Color::Black));
    f.render_widget(header, area);
}

fn draw_form(f: &mut Frame, area: Rect, state: &PanelState) {
    for (field, rect) in Field::ALL.into_iter().zip(form_fields(area)) {
        let focused = state.focus == field;
        let border = if focused {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        let inner_width = usize::from(rect.width.saturating_sub(3));
        let mut value = state.field(field).to_string();
        if value.is_empty() && !focused && field == Field::GeoWindow {
            value = "none".to_string();
        }
        let mut spans = vec![Span::raw(tail(&value, inner_width))];
        if focused {
            spans.push(Span::styled("_", Style::default().fg(Color::Yellow)));
        }

        let widget = Paragraph::new(Line::from(spans)).block(
            Block::default()
                .title(field.label())
                .borders(Borders::ALL)
                .border_style(border),
        );
        f.render_widget(widget, rect);
    }
}

/// Keep the end of a long value visible while typing
fn tail(value: &str, max: usize) -> String {
    let count = value.chars().count();
    if count <= max {
        value.to_string()
    } else {
        value.chars().skip(count - max).collect()
    }
}

fn draw_stage(f: &mut Frame, area: Rect, state: &PanelState) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(28)])
        .split(area);

    let stage_color = if state.status.is_idle() {
        Color::Green
    } else {
        Color::Yellow
    };
    let mut spans = vec![
        Span::styled(" Stage: ", Style::default().fg(Color::Gray)),
        Span::styled(
            state.status.to_string(),
            Style::default().fg(stage_color).add_modifier(Modifier::BOLD),
        ),
    ];
    if state.status_stale {
        spans.push(Span::styled(
            "  (stale: service unreachable)",
            Style::default().fg(Color::Red),
        ));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), chunks[0]);

    let selected = match state.view {
        View::Heatmap => 0,
        View::Graph => 1,
    };
    let tabs = Tabs::new(vec!["F3 Heatmap", "F4 Graph"])
        .select(selected)
        .style(Style::default().fg(Color::Gray))
        .highlight_style(Style::default().fg(ACCENT).add_modifier(Modifier::REVERSED));
    f.render_widget(tabs, chunks[1]);
}

fn draw_main(f: &mut Frame, area: Rect, state: &PanelState) {
    let title = match state.view {
        View::Heatmap => "Similarity heatmap",
        View::Graph => "Clusters",
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(ACCENT));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(inner);

    match state.view {
        View::Heatmap => draw_heatmap(f, chunks[0], state),
        View::Graph => draw_clusters(f, chunks[0], state),
    }
    draw_params_footer(f, chunks[1], state);
}

fn draw_heatmap(f: &mut Frame, area: Rect, state: &PanelState) {
    let heatmap = state.heatmap();
    let lines = heatmap_lines(&heatmap, area.width, area.height);
    f.render_widget(Paragraph::new(lines), area);
}

fn draw_clusters(f: &mut Frame, area: Rect, state: &PanelState) {
    let clusters = state.cluster_list();
    let mut lines = vec![Line::from(Span::styled(
        clusters.header(),
        Style::default().add_modifier(Modifier::BOLD),
    ))];
    lines.extend(clusters.lines().into_iter().map(Line::from));

    if let Some(results) = &state.results {
        if !results.edges.is_empty() {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                format!("Links in top cluster: {}", results.edges.len()),
                Style::default().fg(Color::Gray),
            )));
        }
    }
    f.render_widget(Paragraph::new(lines), area);
}

/// Parameters the results were computed with, plus counts when sent
fn draw_params_footer(f: &mut Frame, area: Rect, state: &PanelState) {
    let mut spans = vec![Span::styled(
        state.params_line(),
        Style::default().fg(Color::Gray),
    )];
    if let Some(counts) = state.results.as_ref().and_then(|r| r.counts) {
        spans.push(Span::styled(
            format!(
                " | cases={} matches={} clusters={}",
                counts.cases, counts.matches, counts.clusters
            ),
            Style::default().fg(Color::Gray),
        ));
    }
    if state.view == View::Heatmap && !state.heatmap().is_empty() {
        spans.push(Span::raw("  "));
        spans.extend(legend_line().spans);
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_procedure(f: &mut Frame, area: Rect, state: &PanelState) {
    let lines: Vec<Line> = match state.procedure_summary() {
        Some(summary) => {
            let verdict_color = if summary.ok { Color::Green } else { Color::Red };
            summary
                .lines()
                .into_iter()
                .enumerate()
                .map(|(i, line)| {
                    if i == 0 {
                        Line::from(Span::styled(line, Style::default().fg(verdict_color)))
                    } else {
                        Line::from(line)
                    }
                })
                .collect()
        }
        None => vec![Line::from(Span::styled(
            "Press F7 to check the CSV against the procedure",
            Style::default().fg(Color::DarkGray),
        ))],
    };

    let widget = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(Block::default().title("Procedure test").borders(Borders::ALL));
    f.render_widget(widget, area);
}

fn draw_status_bar(f: &mut Frame, area: Rect, state: &PanelState) {
    let line = if let Some(error) = &state.last_error {
        Line::from(Span::styled(
            format!(" {}", error),
            Style::default().fg(Color::Red),
        ))
    } else if let Some(notice) = &state.notice {
        Line::from(Span::styled(
            format!(" {}", notice),
            Style::default().fg(Color::Green),
        ))
    } else {
        Line::from(Span::styled(
            " F1 help | F2 save | F5 start | F6 results | F7 test | Esc quit",
            Style::default().fg(Color::DarkGray),
        ))
    };
    f.render_widget(
        Paragraph::new(line).style(Style::default().bg(Color::Black)),
        area,
    );
}
