//! SurrealDB HTTP backend
//!
//! Statements are posted as plain text to the server's `/sql` endpoint,
//! one request per submission, so a `BEGIN ... COMMIT` batch reaches the
//! server intact. Variables travel as URL query parameters.

use crate::connection::{Connection, Vars};
use crate::error::{DbError, DbResult};
use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::{Client, Url};
use serde::Deserialize;
use serde_json::Value;
use sm_core::{Authentication, Config};
use std::sync::atomic::{AtomicBool, Ordering};

/// Message SurrealDB attaches to every statement of a transaction that was
/// cancelled because another statement failed
const CANCELLED_BY_TRANSACTION: &str = "not executed due to a failed transaction";

/// Per-statement entry of a `/sql` response
#[derive(Debug, Deserialize)]
struct StatementResult {
    status: String,
    #[serde(default)]
    result: Value,
}

/// SurrealDB connection over HTTP
pub struct HttpConnection {
    client: Client,
    endpoint: String,
    sql_url: Url,
    auth: Option<Authentication>,
    closed: AtomicBool,
}

impl HttpConnection {
    /// Connect to `url` and verify the server answers its health check
    ///
    /// `ws://` and `wss://` URLs are accepted and mapped onto `http://` and
    /// `https://`; a trailing `/rpc` path is dropped.
    pub async fn connect(url: &str, auth: Option<Authentication>) -> DbResult<Self> {
        let base = http_base_url(url)?;
        let sql_url = base
            .join("sql")
            .map_err(|e| DbError::ConnectionError(format!("{url}: {e}")))?;
        let health_url = base
            .join("health")
            .map_err(|e| DbError::ConnectionError(format!("{url}: {e}")))?;

        let client = Client::builder()
            .build()
            .map_err(|e| DbError::ConnectionError(e.to_string()))?;

        let response = client.get(health_url).send().await.map_err(|e| {
            DbError::ConnectionError(format!("{url}: {e}"))
        })?;
        if !response.status().is_success() {
            return Err(DbError::ConnectionError(format!(
                "{url}: health check returned {}",
                response.status()
            )));
        }

        log::debug!("Connected to {}", base);
        Ok(Self {
            client,
            endpoint: url.to_string(),
            sql_url,
            auth,
            closed: AtomicBool::new(false),
        })
    }

    /// Connect using the URL and credentials from a loaded configuration
    pub async fn from_config(config: &Config) -> DbResult<Self> {
        Self::connect(&config.url, config.resolve_authentication()).await
    }
}

#[async_trait]
impl Connection for HttpConnection {
    async fn query(&self, sql: &str, vars: &Vars) -> DbResult<Vec<Value>> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(DbError::Closed(self.endpoint.clone()));
        }

        let mut request = self
            .client
            .post(self.sql_url.clone())
            .header(ACCEPT, "application/json")
            .query(&query_params(vars))
            .body(sql.to_string());
        if let Some(auth) = &self.auth {
            request = request.basic_auth(&auth.username, Some(&auth.password));
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(DbError::ExecutionError(format!(
                "HTTP {status}: {}",
                error_description(&body)
            )));
        }

        let results: Vec<StatementResult> = serde_json::from_str(&body)
            .map_err(|e| DbError::ResultShape(format!("malformed /sql response: {e}")))?;
        collect_results(results)
    }

    async fn close(&self) -> DbResult<()> {
        if !self.closed.swap(true, Ordering::SeqCst) {
            log::debug!("Closed connection to {}", self.endpoint);
        }
        Ok(())
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

/// Normalize a configured connection URL to the HTTP base the server listens on
fn http_base_url(url: &str) -> DbResult<Url> {
    let mut parsed =
        Url::parse(url).map_err(|e| DbError::ConnectionError(format!("{url}: {e}")))?;

    let scheme = match parsed.scheme() {
        "ws" | "http" => "http",
        "wss" | "https" => "https",
        other => {
            return Err(DbError::ConnectionError(format!(
                "{url}: unsupported scheme '{other}'"
            )))
        }
    };
    parsed
        .set_scheme(scheme)
        .map_err(|()| DbError::ConnectionError(format!("{url}: cannot use scheme {scheme}")))?;

    let path = parsed.path().trim_end_matches('/');
    let path = path.strip_suffix("/rpc").unwrap_or(path).to_string();
    parsed.set_path(&format!("{path}/"));
    parsed.set_query(None);
    Ok(parsed)
}

/// Render bound variables as URL parameters; strings go verbatim, everything
/// else as JSON
fn query_params(vars: &Vars) -> Vec<(String, String)> {
    vars.iter()
        .map(|(key, value)| {
            let rendered = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            (key.clone(), rendered)
        })
        .collect()
}

/// Turn per-statement results into values, failing on the first rejected
/// statement that is not merely collateral of a cancelled transaction
fn collect_results(results: Vec<StatementResult>) -> DbResult<Vec<Value>> {
    let mut failures = Vec::new();
    let mut values = Vec::with_capacity(results.len());

    for (index, entry) in results.into_iter().enumerate() {
        if entry.status == "OK" {
            values.push(entry.result);
        } else {
            let message = match entry.result {
                Value::String(s) => s,
                other => other.to_string(),
            };
            failures.push((index, message));
        }
    }

    let root_cause = failures
        .iter()
        .position(|(_, message)| !message.contains(CANCELLED_BY_TRANSACTION))
        .unwrap_or(0);
    match failures.into_iter().nth(root_cause) {
        Some((index, message)) => Err(DbError::StatementFailed { index, message }),
        None => Ok(values),
    }
}

/// Pull a readable message out of an error body, falling back to the raw text
fn error_description(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            v.get("information")
                .or_else(|| v.get("description"))
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.trim().to_string())
}

#[cfg(test)]
#[path = "http_test.rs"]
mod tests;
