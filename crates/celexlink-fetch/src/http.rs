//! HTTP client for the configuration host.

use celexlink_core::{ConfigError, EngineConfig, LookupTable, RuleSet};
use thiserror::Error;
use tracing::info;

/// Lookup table document name, relative to the base URL.
pub const LOOKUP_DOCUMENT: &str = "celex-map.json";
/// Rule set document name, relative to the base URL.
pub const RULES_DOCUMENT: &str = "patterns.json";

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned {status}: {body}")]
    Server { status: u16, body: String },
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

/// Client for a host serving `celex-map.json` and optionally `patterns.json`.
pub struct ConfigClient {
    client: reqwest::Client,
    base_url: String,
}

impl ConfigClient {
    /// Create a client for the given base URL, e.g. `https://config.example.org/celexlink`.
    pub fn new(base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn document_url(&self, document: &str) -> String {
        format!("{}/{}", self.base_url, document)
    }

    /// GET a document. `Ok(None)` on 404.
    async fn get_text(&self, url: &str) -> Result<Option<String>, FetchError> {
        let resp = self.client.get(url).send().await?;
        let status = resp.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(FetchError::Server {
                status: status.as_u16(),
                body,
            });
        }
        Ok(Some(resp.text().await?))
    }

    /// Fetch the CELEX lookup table. A missing document is a server error.
    pub async fn fetch_lookup(&self) -> Result<LookupTable, FetchError> {
        let url = self.document_url(LOOKUP_DOCUMENT);
        info!(url = %url, "fetching CELEX lookup table");
        let body = self
            .get_text(&url)
            .await?
            .ok_or_else(|| FetchError::Server {
                status: 404,
                body: format!("{LOOKUP_DOCUMENT} not found"),
            })?;
        let table = parse_lookup(&body)?;
        info!(entries = table.len(), "loaded CELEX lookup table");
        Ok(table)
    }

    /// Fetch the remote rule set, if the host publishes one.
    pub async fn fetch_rules(&self) -> Result<Option<RuleSet>, FetchError> {
        let url = self.document_url(RULES_DOCUMENT);
        info!(url = %url, "fetching pattern rules");
        let Some(body) = self.get_text(&url).await? else {
            info!("no remote pattern rules published");
            return Ok(None);
        };
        let rules = parse_rules(&body)?;
        info!(rules = rules.len(), "loaded pattern rules");
        Ok(Some(rules))
    }

    /// Fetch both documents into an [`EngineConfig`].
    ///
    /// Remote rules run after the built-in ones when `include_builtin` is set.
    pub async fn fetch_config(&self, include_builtin: bool) -> Result<EngineConfig, FetchError> {
        let lookup = self.fetch_lookup().await?;
        let remote = self.fetch_rules().await?;
        Ok(merge_config(lookup, remote, include_builtin))
    }
}

fn parse_lookup(body: &str) -> Result<LookupTable, FetchError> {
    Ok(LookupTable::from_json_str(body)?)
}

fn parse_rules(body: &str) -> Result<RuleSet, FetchError> {
    Ok(RuleSet::from_json_str(body)?)
}

fn merge_config(lookup: LookupTable, remote: Option<RuleSet>, include_builtin: bool) -> EngineConfig {
    let mut rules = if include_builtin {
        RuleSet::builtin()
    } else {
        RuleSet::default()
    };
    if let Some(remote) = remote {
        rules.extend(remote);
    }
    EngineConfig { lookup, rules }
}
