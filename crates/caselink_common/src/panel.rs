//! Panel state - everything the control panel renders comes from here.
//!
//! Form fields are kept as the text the operator typed and only parsed when a
//! request is built. Service payloads replace the previous ones wholesale.

use crate::clusters::ClusterList;
use crate::config::ScanDefaults;
use crate::error::CaseLinkError;
use crate::heatmap::Heatmap;
use crate::procedure::ProcedureSummary;
use crate::types::{
    ConfigUpdate, ProcedureTestResult, ScanConfig, ScanResults, ScanStatus, StartScanRequest,
};
use crate::Result;

/// Which result panel is showing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Heatmap,
    Graph,
}

/// Editable form fields, in tab order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    CsvPath,
    Threshold,
    YearWindow,
    GeoWindow,
}

impl Field {
    pub const ALL: [Field; 4] = [
        Field::CsvPath,
        Field::Threshold,
        Field::YearWindow,
        Field::GeoWindow,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Field::CsvPath => "CSV",
            Field::Threshold => "Similarity",
            Field::YearWindow => "Year window",
            Field::GeoWindow => "Geo window (CNTYFIPS diff)",
        }
    }

    pub fn next(self) -> Field {
        match self {
            Field::CsvPath => Field::Threshold,
            Field::Threshold => Field::YearWindow,
            Field::YearWindow => Field::GeoWindow,
            Field::GeoWindow => Field::CsvPath,
        }
    }

    pub fn prev(self) -> Field {
        match self {
            Field::CsvPath => Field::GeoWindow,
            Field::Threshold => Field::CsvPath,
            Field::YearWindow => Field::Threshold,
            Field::GeoWindow => Field::YearWindow,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PanelState {
    pub csv_path: String,
    pub threshold: String,
    pub year_window: String,
    /// Empty means no geo window
    pub geo_window: String,

    pub focus: Field,
    pub view: View,
    pub status: ScanStatus,
    /// Set when the latest status poll failed and `status` is old
    pub status_stale: bool,
    pub results: Option<ScanResults>,
    pub procedure: Option<ProcedureTestResult>,

    /// Last failed request, shown until the next success on any action
    pub last_error: Option<String>,
    /// Last acknowledgement or action notice
    pub notice: Option<String>,
    pub show_help: bool,
}

impl Default for PanelState {
    fn default() -> Self {
        Self::with_defaults(&ScanDefaults::default())
    }
}

impl PanelState {
    pub fn with_defaults(defaults: &ScanDefaults) -> Self {
        Self {
            csv_path: String::new(),
            threshold: defaults.similarity_threshold.to_string(),
            year_window: defaults.year_window.to_string(),
            geo_window: String::new(),
            focus: Field::CsvPath,
            view: View::Heatmap,
            status: ScanStatus::default(),
            status_stale: false,
            results: None,
            procedure: None,
            last_error: None,
            notice: None,
            show_help: false,
        }
    }

    pub fn field(&self, field: Field) -> &str {
        match field {
            Field::CsvPath => &self.csv_path,
            Field::Threshold => &self.threshold,
            Field::YearWindow => &self.year_window,
            Field::GeoWindow => &self.geo_window,
        }
    }

    pub fn field_mut(&mut self, field: Field) -> &mut String {
        match field {
            Field::CsvPath => &mut self.csv_path,
            Field::Threshold => &mut self.threshold,
            Field::YearWindow => &mut self.year_window,
            Field::GeoWindow => &mut self.geo_window,
        }
    }

    /// Type into the focused field.
    ///
    /// Numeric fields only take characters that can form their number.
    pub fn push_char(&mut self, ch: char) {
        let accept = match self.focus {
            Field::CsvPath => !ch.is_control(),
            Field::Threshold => ch.is_ascii_digit() || ch == '.',
            Field::YearWindow | Field::GeoWindow => ch.is_ascii_digit(),
        };
        if accept {
            let focus = self.focus;
            self.field_mut(focus).push(ch);
        }
    }

    pub fn pop_char(&mut self) {
        let focus = self.focus;
        self.field_mut(focus).pop();
    }

    pub fn clear_field(&mut self) {
        let focus = self.focus;
        self.field_mut(focus).clear();
    }

    pub fn focus_next(&mut self) {
        self.focus = self.focus.next();
    }

    pub fn focus_prev(&mut self) {
        self.focus = self.focus.prev();
    }

    /// Fill the form from the service config fetched at startup.
    ///
    /// Absent values fall back to "", 0.7, 5 and no geo window.
    pub fn apply_loaded_config(&mut self, config: &ScanConfig) {
        self.csv_path = config.csv_path.clone().unwrap_or_default();
        self.threshold = config.similarity_threshold.unwrap_or(0.7).to_string();
        self.year_window = config.year_window.unwrap_or(5).to_string();
        self.geo_window = config.geo_window.map(|g| g.to_string()).unwrap_or_default();
    }

    /// Write back what the service stored after a save.
    ///
    /// The CSV path is left as typed; the other three take the echoed values.
    pub fn apply_saved_config(&mut self, config: &ScanConfig) {
        if let Some(threshold) = config.similarity_threshold {
            self.threshold = threshold.to_string();
        }
        if let Some(year) = config.year_window {
            self.year_window = year.to_string();
        }
        self.geo_window = config.geo_window.map(|g| g.to_string()).unwrap_or_default();
    }

    pub fn parsed_threshold(&self) -> Result<f64> {
        let value: f64 = self
            .threshold
            .trim()
            .parse()
            .map_err(|_| invalid("similarity_threshold", &self.threshold))?;
        if !(0.0..=1.0).contains(&value) {
            return Err(invalid("similarity_threshold", &self.threshold));
        }
        Ok(value)
    }

    pub fn parsed_year_window(&self) -> Result<u32> {
        self.year_window
            .trim()
            .parse()
            .map_err(|_| invalid("year_window", &self.year_window))
    }

    /// Empty field means `None`
    pub fn parsed_geo_window(&self) -> Result<Option<u32>> {
        let geo = self.geo_window.trim();
        if geo.is_empty() {
            return Ok(None);
        }
        geo.parse()
            .map(Some)
            .map_err(|_| invalid("geo_window", &self.geo_window))
    }

    /// Body for `POST /scan/start`
    pub fn start_request(&self, duration_hours: f64) -> Result<StartScanRequest> {
        Ok(StartScanRequest {
            csv_path: Some(self.csv_path.clone()),
            duration_hours: Some(duration_hours),
            similarity_threshold: Some(self.parsed_threshold()?),
            year_window: Some(self.parsed_year_window()?),
            geo_window: self.parsed_geo_window()?,
        })
    }

    /// Body for `POST /config`
    pub fn config_update(&self) -> Result<ConfigUpdate> {
        Ok(ConfigUpdate {
            csv_path: Some(self.csv_path.clone()),
            similarity_threshold: Some(self.parsed_threshold()?),
            year_window: Some(self.parsed_year_window()?),
            geo_window: self.parsed_geo_window()?,
            sample_limit: None,
        })
    }

    /// A new scan makes the old results meaningless
    pub fn scan_started(&mut self) {
        self.results = None;
    }

    pub fn set_results(&mut self, results: ScanResults) {
        self.results = Some(results);
    }

    pub fn set_procedure(&mut self, result: ProcedureTestResult) {
        self.procedure = Some(result);
    }

    pub fn set_status(&mut self, status: ScanStatus) {
        self.status = status;
        self.status_stale = false;
    }

    /// Keep showing the last stage, marked stale
    pub fn status_failed(&mut self) {
        self.status_stale = true;
    }

    pub fn record_error(&mut self, action: &str, err: &CaseLinkError) {
        self.last_error = Some(format!("{} failed: {}", action, err));
    }

    pub fn clear_error(&mut self) {
        self.last_error = None;
    }

    pub fn heatmap(&self) -> Heatmap {
        match &self.results {
            Some(results) => Heatmap::from_matrix(results.matrix(), results.labels()),
            None => Heatmap::NoData,
        }
    }

    pub fn cluster_list(&self) -> ClusterList {
        match &self.results {
            Some(results) => ClusterList::from_clusters(results.clusters()),
            None => ClusterList::default(),
        }
    }

    pub fn procedure_summary(&self) -> Option<ProcedureSummary> {
        self.procedure.as_ref().map(ProcedureSummary::from_result)
    }

    /// `threshold=.., year_window=.., geo_window=..`
    ///
    /// Values echoed by the last results win over what is in the form.
    pub fn params_line(&self) -> String {
        let results = self.results.as_ref();

        let threshold = results
            .and_then(|r| r.threshold)
            .map(|t| t.to_string())
            .unwrap_or_else(|| self.threshold.clone());
        let year = results
            .and_then(|r| r.year_window)
            .map(|y| y.to_string())
            .unwrap_or_else(|| self.year_window.clone());
        let geo = results
            .and_then(|r| r.geo_window)
            .map(|g| g.to_string())
            .unwrap_or_else(|| {
                if self.geo_window.is_empty() {
                    "none".to_string()
                } else {
                    self.geo_window.clone()
                }
            });

        format!(
            "threshold={}, year_window={}, geo_window={}",
            threshold, year, geo
        )
    }
}

fn invalid(field: &'static str, value: &str) -> CaseLinkError {
    CaseLinkError::InvalidField {
        field,
        value: value.to_string(),
    }
}
