//! Heatmap in the terminal
//!
//! Each character cell holds two vertical pixels drawn with `▀`: the upper
//! pixel is the foreground color, the lower one the background. The matrix is
//! scaled to the largest square that fits.

use caselink_common::heatmap::NO_DATA;
use caselink_common::Heatmap;
use ratatui::{
    style::{Color, Style},
    text::{Line, Span},
};

const UPPER_HALF: &str = "▀";

/// Color of a shaded cell; missing cells of ragged rows stay white
fn pixel_color(shade: Option<u8>) -> Color {
    match shade {
        Some(c) => Color::Rgb(c, c, 255),
        None => Color::Rgb(255, 255, 255),
    }
}

/// Lines for a `width` x `height` area
pub fn heatmap_lines(heatmap: &Heatmap, width: u16, height: u16) -> Vec<Line<'static>> {
    let n = heatmap.dimension();
    if n == 0 || width == 0 || height == 0 {
        return vec![Line::from(NO_DATA)];
    }

    // Square side in pixels; two pixel rows per terminal row
    let side = usize::from(width).min(usize::from(height) * 2);
    let cell_of = |pixel: usize| pixel * n / side;

    (0..side.div_ceil(2))
        .map(|row| {
            let top = row * 2;
            let bottom = top + 1;
            let spans: Vec<Span<'static>> = (0..side)
                .map(|x| {
                    let col = cell_of(x);
                    let fg = pixel_color(heatmap.shade_at(cell_of(top), col));
                    let bg = if bottom < side {
                        pixel_color(heatmap.shade_at(cell_of(bottom), col))
                    } else {
                        Color::Reset
                    };
                    Span::styled(UPPER_HALF, Style::default().fg(fg).bg(bg))
                })
                .collect();
            Line::from(spans)
        })
        .collect()
}

/// Legend strip from 0 (white) to 1 (blue)
pub fn legend_line() -> Line<'static> {
    let mut spans = vec![Span::raw("0 ")];
    for step in 0..=4u8 {
        let c = 255 - step * 63;
        spans.push(Span::styled(
            "  ",
            Style::default().bg(Color::Rgb(c, c, 255)),
        ));
    }
    spans.push(Span::raw(" 1"));
    Line::from(spans)
}
