//! Similarity heatmap model
//!
//! Each matrix cell maps linearly to a shade of blue: 0 is white, 1 is pure
//! blue. The grid is scaled to a fixed square canvas; terminal and SVG
//! renderers both draw from the same cells.

use serde_json::Value;
use std::fmt::Write as _;

use crate::types::display_value;

/// Canvas edge length in SVG user units
pub const CANVAS_SIZE: u32 = 400;

/// Smallest cell edge; large matrices overflow the canvas rather than vanish
pub const MIN_CELL: u32 = 2;

/// Placeholder shown when there is no matrix to draw
pub const NO_DATA: &str = "No data";

/// Red/green channel for a similarity value; blue is always 255.
///
/// `floor(255 - v * 255)` clamped to [0, 255]. Non-finite values shade as 0.
pub fn intensity(value: f64) -> u8 {
    let v = if value.is_finite() { value } else { 0.0 };
    (255.0 - v * 255.0).floor().clamp(0.0, 255.0) as u8
}

/// CSS color for a similarity value
pub fn fill(value: f64) -> String {
    let c = intensity(value);
    format!("rgb({},{},255)", c, c)
}

/// Cell edge for an n-row matrix on the fixed canvas
pub fn cell_size(n: usize) -> u32 {
    if n == 0 {
        return CANVAS_SIZE;
    }
    let n = u32::try_from(n).unwrap_or(u32::MAX);
    (CANVAS_SIZE / n).max(MIN_CELL)
}

/// One drawn cell
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeatCell {
    pub row: usize,
    pub col: usize,
    pub x: u32,
    pub y: u32,
    pub value: f64,
    pub shade: u8,
}

/// Renderable heatmap
#[derive(Debug, Clone, PartialEq)]
pub enum Heatmap {
    NoData,
    Grid {
        /// Number of rows in the source matrix
        n: usize,
        cell: u32,
        cells: Vec<HeatCell>,
        /// Index into `cells` where each matrix row starts
        row_starts: Vec<usize>,
        labels: Vec<String>,
    },
}

impl Heatmap {
    /// Build from a matrix as the service sent it.
    ///
    /// Rows are not padded: a ragged row draws only the cells it has.
    pub fn from_matrix(matrix: &[Vec<f64>], labels: &[Value]) -> Self {
        if matrix.is_empty() {
            return Heatmap::NoData;
        }

        let n = matrix.len();
        let cell = cell_size(n);
        let mut row_starts = Vec::with_capacity(n);
        let mut start = 0;
        for row in matrix {
            row_starts.push(start);
            start += row.len();
        }
        let cells = matrix
            .iter()
            .enumerate()
            .flat_map(|(i, row)| {
                row.iter().enumerate().map(move |(j, &value)| HeatCell {
                    row: i,
                    col: j,
                    x: j as u32 * cell,
                    y: i as u32 * cell,
                    value,
                    shade: intensity(value),
                })
            })
            .collect();

        Heatmap::Grid {
            n,
            cell,
            cells,
            row_starts,
            labels: labels.iter().map(display_value).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Heatmap::NoData)
    }

    pub fn cells(&self) -> &[HeatCell] {
        match self {
            Heatmap::NoData => &[],
            Heatmap::Grid { cells, .. } => cells,
        }
    }

    /// Matrix dimension, 0 for no data
    pub fn dimension(&self) -> usize {
        match self {
            Heatmap::NoData => 0,
            Heatmap::Grid { n, .. } => *n,
        }
    }

    /// Shade at (row, col), if that cell exists
    pub fn shade_at(&self, row: usize, col: usize) -> Option<u8> {
        let Heatmap::Grid {
            cells, row_starts, ..
        } = self
        else {
            return None;
        };
        let start = *row_starts.get(row)?;
        let end = row_starts.get(row + 1).copied().unwrap_or(cells.len());
        if col >= end - start {
            return None;
        }
        cells.get(start + col).map(|c| c.shade)
    }

    /// Label for row/column `i`, falling back to the index
    pub fn label(&self, i: usize) -> String {
        match self {
            Heatmap::Grid { labels, .. } => labels
                .get(i)
                .filter(|l| !l.is_empty())
                .cloned()
                .unwrap_or_else(|| i.to_string()),
            Heatmap::NoData => i.to_string(),
        }
    }

    /// Standalone SVG document; an empty map gets a "No data" strip
    pub fn render_svg(&self) -> String {
        let Heatmap::Grid {
            cell, cells, labels, ..
        } = self
        else {
            return format!(
                r#"<svg xmlns="http://www.w3.org/2000/svg" width="{size}" height="40"><text x="8" y="24">{}</text></svg>"#,
                NO_DATA,
                size = CANVAS_SIZE
            );
        };

        let mut out = String::with_capacity(64 * cells.len() + 256);
        let _ = writeln!(
            out,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{size}" height="{size}" style="border: 1px solid #ddd; background: #fff">"#,
            size = CANVAS_SIZE
        );
        for c in cells {
            let title = match (labels.get(c.row), labels.get(c.col)) {
                (Some(a), Some(b)) => format!("{} / {}: {:.3}", xml_escape(a), xml_escape(b), c.value),
                _ => format!("{:.3}", c.value),
            };
            let _ = writeln!(
                out,
                r#"  <rect x="{}" y="{}" width="{}" height="{}" fill="rgb({s},{s},255)"><title>{}</title></rect>"#,
                c.x,
                c.y,
                cell,
                cell,
                title,
                s = c.shade
            );
        }
        out.push_str("</svg>\n");
        out
    }
}

fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn square(n: usize, v: f64) -> Vec<Vec<f64>> {
        vec![vec![v; n]; n]
    }

    #[test]
    fn empty_matrix_is_no_data() {
        let map = Heatmap::from_matrix(&[], &[]);
        assert!(map.is_empty());
        assert!(map.render_svg().contains("No data"));
        assert!(!map.render_svg().contains("<svg"));
    }

    #[test]
    fn n_by_n_matrix_draws_n_squared_cells_on_grid() {
        for n in [1usize, 3, 48, 250] {
            let map = Heatmap::from_matrix(&square(n, 0.5), &[]);
            let cell = cell_size(n);
            assert_eq!(map.cells().len(), n * n);
            for c in map.cells() {
                assert_eq!(c.x, c.col as u32 * cell);
                assert_eq!(c.y, c.row as u32 * cell);
            }
        }
    }

    #[test]
    fn cell_size_scales_to_canvas_with_floor() {
        assert_eq!(cell_size(1), 400);
        assert_eq!(cell_size(48), 8);
        assert_eq!(cell_size(400), MIN_CELL);
        assert_eq!(cell_size(1000), 2);
    }

    #[test]
    fn zero_is_white_and_one_is_blue() {
        assert_eq!(intensity(0.0), 255);
        assert_eq!(intensity(1.0), 0);
        assert_eq!(fill(0.0), "rgb(255,255,255)");
        assert_eq!(fill(1.0), "rgb(0,0,255)");
        assert_eq!(intensity(0.5), 127);
    }

    #[test]
    fn out_of_range_values_clamp() {
        assert_eq!(intensity(-0.4), 255);
        assert_eq!(intensity(3.0), 0);
        assert_eq!(intensity(f64::NAN), 255);
    }

    #[test]
    fn intensity_is_monotonic() {
        let mut last = u8::MAX;
        for step in 0..=1000 {
            let shade = intensity(step as f64 / 1000.0);
            assert!(shade <= last);
            last = shade;
        }
    }

    #[test]
    fn svg_has_one_rect_per_cell_and_labels_in_titles() {
        let matrix = vec![vec![1.0, 0.8], vec![0.8, 1.0]];
        let labels = vec![json!("A&1"), json!(2)];
        let map = Heatmap::from_matrix(&matrix, &labels);
        let svg = map.render_svg();

        assert_eq!(svg.matches("<rect").count(), 4);
        assert!(svg.contains(r#"<rect x="200" y="0" width="200" height="200" fill="rgb(51,51,255)">"#));
        assert!(svg.contains("A&amp;1 / 2: 0.800"));
        assert_eq!(map.label(1), "2");
        assert_eq!(map.label(7), "7");
    }

    #[test]
    fn ragged_rows_draw_what_they_have() {
        let matrix = vec![vec![1.0, 0.2, 0.1], vec![0.2]];
        let map = Heatmap::from_matrix(&matrix, &[]);
        assert_eq!(map.cells().len(), 4);
        assert_eq!(map.shade_at(0, 2), Some(intensity(0.1)));
        assert_eq!(map.shade_at(1, 1), None);
    }
}
