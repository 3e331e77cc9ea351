//! Shared types and logic for the CaseLinker control panel.
//!
//! Everything here is independent of the terminal: wire types for the scan
//! service, the HTTP client, config loading, the heatmap and cluster view
//! models, and the panel state the TUI renders from.

pub mod client;
pub mod clusters;
pub mod config;
pub mod error;
pub mod heatmap;
pub mod lifecycle;
pub mod panel;
pub mod procedure;
pub mod types;

pub use client::ScanClient;
pub use clusters::{ClusterEntry, ClusterList};
pub use config::ClientConfig;
pub use error::CaseLinkError;
pub use heatmap::{HeatCell, Heatmap};
pub use lifecycle::{Channel, RequestTracker, Ticket};
pub use panel::{Field, PanelState, View};
pub use procedure::ProcedureSummary;
pub use types::{
    Cluster, ConfigUpdate, ProcedureTestResult, ScanConfig, ScanCounts, ScanResults, ScanStatus,
    StartAck, StartScanRequest,
};

/// Default address of the scan service
pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:8000";

/// Result alias used across the library
pub type Result<T> = std::result::Result<T, CaseLinkError>;
