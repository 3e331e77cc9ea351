//! HTTP client for the scan service.
//!
//! Plain JSON over HTTP. No retries: a failed call returns an error and the
//! caller decides what to keep showing.

use crate::config::ClientConfig;
use crate::error::CaseLinkError;
use crate::types::{
    ConfigUpdate, ProcedureTestResult, ScanConfig, ScanResults, ScanStatus, StartAck,
    StartScanRequest,
};
use crate::Result;
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::debug;

/// Client for one scan service instance
#[derive(Debug, Clone)]
pub struct ScanClient {
    http: reqwest::Client,
    base: Url,
}

impl ScanClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        // Url::join replaces the last segment unless the base ends in '/'
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{}/", base_url)
        };
        let base = Url::parse(&normalized).map_err(|e| {
            CaseLinkError::Config(format!("invalid backend url {:?}: {}", base_url, e))
        })?;

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CaseLinkError::Config(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self { http, base })
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        Self::new(&config.backend.url, config.request_timeout())
    }

    pub fn base_url(&self) -> &str {
        self.base.as_str()
    }

    /// `POST /scan/start`
    pub async fn start_scan(&self, request: &StartScanRequest) -> Result<StartAck> {
        self.post_json("scan/start", request).await
    }

    /// `GET /scan/status`
    pub async fn status(&self) -> Result<ScanStatus> {
        self.get_json("scan/status", &[]).await
    }

    /// `GET /scan/results`, optionally with the `view` query the service accepts
    pub async fn results(&self, view: Option<&str>) -> Result<ScanResults> {
        let query: Vec<(&str, String)> = view.map(|v| ("view", v.to_string())).into_iter().collect();
        self.get_json("scan/results", &query).await
    }

    /// `GET /config`
    pub async fn get_config(&self) -> Result<ScanConfig> {
        self.get_json("config", &[]).await
    }

    /// `POST /config`; returns the config as stored after the update
    pub async fn set_config(&self, update: &ConfigUpdate) -> Result<ScanConfig> {
        self.post_json("config", update).await
    }

    /// `GET /test/procedure`
    pub async fn test_procedure(
        &self,
        csv_path: Option<&str>,
        sample_limit: Option<u32>,
    ) -> Result<ProcedureTestResult> {
        let mut query = Vec::new();
        if let Some(path) = csv_path {
            query.push(("csv_path", path.to_string()));
        }
        if let Some(limit) = sample_limit {
            query.push(("sample_limit", limit.to_string()));
        }
        self.get_json("test/procedure", &query).await
    }

    /// `GET /case/{id}`: the raw case record the scan indexed
    pub async fn case(&self, id: &str) -> Result<Map<String, Value>> {
        let mut url = self.endpoint("case")?;
        url.path_segments_mut()
            .map_err(|_| CaseLinkError::Config(format!("backend url cannot take a path: {}", self.base)))?
            .push(id);
        debug!("GET {}", url);
        let response = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(|e| transport(&url, e))?;
        read_json(&url, response).await
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base
            .join(path)
            .map_err(|e| CaseLinkError::Config(format!("invalid endpoint {}: {}", path, e)))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        let url = self.endpoint(path)?;
        debug!("GET {}", url);
        let response = self
            .http
            .get(url.clone())
            .query(query)
            .send()
            .await
            .map_err(|e| transport(&url, e))?;
        read_json(&url, response).await
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        let url = self.endpoint(path)?;
        debug!("POST {}", url);
        // .json() sets Content-Type: application/json
        let response = self
            .http
            .post(url.clone())
            .json(body)
            .send()
            .await
            .map_err(|e| transport(&url, e))?;
        read_json(&url, response).await
    }
}

fn transport(url: &Url, err: reqwest::Error) -> CaseLinkError {
    let message = if err.is_timeout() {
        "request timed out".to_string()
    } else {
        err.to_string()
    };
    CaseLinkError::Transport {
        url: url.to_string(),
        message,
    }
}

async fn read_json<T: DeserializeOwned>(url: &Url, response: reqwest::Response) -> Result<T> {
    let status = response.status();
    let body = response.text().await.map_err(|e| transport(url, e))?;

    if !status.is_success() {
        debug!("{} -> HTTP {}", url, status.as_u16());
        return Err(CaseLinkError::from_status(status.as_u16(), &body));
    }

    serde_json::from_str(&body)
        .map_err(|e| CaseLinkError::Decode(format!("{} ({})", e, url.path())))
}
