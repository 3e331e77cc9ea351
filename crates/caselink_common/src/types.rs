//! Wire types for the scan service.
//!
//! The service owns these schemas. Every field is optional or defaulted so a
//! partial payload still decodes, and fields this client does not know about
//! are carried in `extra` so `--json` output shows exactly what came back.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Stage label the service reports when no scan is running
pub const IDLE_STAGE: &str = "Idle";

/// Scan parameters as stored by the service (`GET /config`, `POST /config`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScanConfig {
    #[serde(default)]
    pub csv_path: Option<String>,
    #[serde(default)]
    pub similarity_threshold: Option<f64>,
    #[serde(default)]
    pub year_window: Option<u32>,
    #[serde(default)]
    pub geo_window: Option<u32>,
    /// Heatmap sample size used by the service
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_limit: Option<u32>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `GET /scan/status`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanStatus {
    #[serde(default = "idle_stage")]
    pub stage: String,
    /// Cases processed so far, only reported while scanning
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<u64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn idle_stage() -> String {
    IDLE_STAGE.to_string()
}

impl Default for ScanStatus {
    fn default() -> Self {
        Self {
            stage: idle_stage(),
            progress: None,
            extra: Map::new(),
        }
    }
}

impl ScanStatus {
    pub fn is_idle(&self) -> bool {
        self.stage == IDLE_STAGE
    }
}

impl fmt::Display for ScanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.progress {
            Some(n) => write!(f, "{} ({} cases)", self.stage, n),
            None => write!(f, "{}", self.stage),
        }
    }
}

/// Headline counts of a finished scan
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanCounts {
    #[serde(default)]
    pub cases: u64,
    #[serde(default)]
    pub matches: u64,
    #[serde(default)]
    pub clusters: u64,
}

/// One connected group of linked cases
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cluster {
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub nodes: Vec<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Link inside the top cluster, sent as a `[a, b, weight]` triple
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge(pub Value, pub Value, pub f64);

/// `GET /scan/results`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScanResults {
    #[serde(default)]
    pub matrix: Option<Vec<Vec<f64>>>,
    #[serde(default)]
    pub labels: Option<Vec<Value>>,
    #[serde(default)]
    pub top_clusters: Option<Vec<Cluster>>,
    #[serde(default)]
    pub threshold: Option<f64>,
    #[serde(default)]
    pub year_window: Option<u32>,
    #[serde(default)]
    pub geo_window: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub counts: Option<ScanCounts>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub edges: Vec<Edge>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ScanResults {
    pub fn matrix(&self) -> &[Vec<f64>] {
        self.matrix.as_deref().unwrap_or_default()
    }

    pub fn labels(&self) -> &[Value] {
        self.labels.as_deref().unwrap_or_default()
    }

    pub fn clusters(&self) -> &[Cluster] {
        self.top_clusters.as_deref().unwrap_or_default()
    }
}

/// `GET /test/procedure`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcedureTestResult {
    #[serde(default)]
    pub ok: bool,
    /// Label -> `[achieved, total]`, in the order the service sent them
    #[serde(default)]
    pub coverage: Option<Map<String, Value>>,
    #[serde(default)]
    pub notes: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub missing: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_sampled: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_mapping: Option<Map<String, Value>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ProcedureTestResult {
    /// Coverage entries as `(label, achieved, total)`.
    ///
    /// Entries that are not a two-number array are skipped.
    pub fn coverage_entries(&self) -> Vec<(String, u64, u64)> {
        let Some(coverage) = &self.coverage else {
            return Vec::new();
        };

        coverage
            .iter()
            .filter_map(|(label, pair)| {
                let pair = pair.as_array()?;
                if pair.len() != 2 {
                    return None;
                }
                let achieved = as_count(&pair[0])?;
                let total = as_count(&pair[1])?;
                Some((label.clone(), achieved, total))
            })
            .collect()
    }
}

fn as_count(v: &Value) -> Option<u64> {
    v.as_u64().or_else(|| v.as_f64().map(|f| f.max(0.0) as u64))
}

/// Body of `POST /scan/start`.
///
/// Unset fields go out as `null`; the service falls back to its stored config
/// for those.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StartScanRequest {
    pub csv_path: Option<String>,
    pub duration_hours: Option<f64>,
    pub similarity_threshold: Option<f64>,
    pub year_window: Option<u32>,
    pub geo_window: Option<u32>,
}

/// Acknowledgement of `POST /scan/start`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StartAck {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Body of `POST /config`.
///
/// `null` means "leave unchanged" to the service, so a cleared geo window
/// does not reset the stored one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigUpdate {
    pub csv_path: Option<String>,
    pub similarity_threshold: Option<f64>,
    pub year_window: Option<u32>,
    pub geo_window: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_limit: Option<u32>,
}

/// Render a loosely typed label or node id without JSON quoting
pub fn display_value(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
