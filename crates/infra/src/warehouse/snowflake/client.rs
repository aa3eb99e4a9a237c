//! Snowflake SQL API gateway.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use metricdeck_core::WarehouseGateway;
use metricdeck_domain::constants::{QUERY_LOG_PREVIEW_CHARS, QUERY_TAG};
use metricdeck_domain::{DashboardError, QueryText, Result, Row, SnowflakeConfig};
use reqwest::header::ACCEPT;
use reqwest::{Client, RequestBuilder, StatusCode};
use tracing::{debug, info, warn};

use super::auth::KeyPairAuth;
use super::types::{decode_rows, ApiErrorBody, StatementRequest, StatementResponse};
use crate::errors::to_domain;

/// Extra HTTP time on top of the server-side statement timeout.
const HTTP_GRACE_SECS: u64 = 10;
const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Runs queries through the Snowflake SQL API (`/api/v2/statements`).
#[derive(Clone)]
pub struct SnowflakeGateway {
    client: Client,
    base_url: String,
    config: SnowflakeConfig,
    auth: Arc<KeyPairAuth>,
}

impl SnowflakeGateway {
    /// Create a gateway, loading the private key named in `config`.
    ///
    /// # Errors
    /// Returns `DashboardError::Config` if the key cannot be loaded, or a
    /// network error if the HTTP client cannot be built.
    pub fn new(config: &SnowflakeConfig) -> Result<Self> {
        let auth = KeyPairAuth::from_config(config)?;
        Self::with_auth(config, auth)
    }

    /// Create a gateway with an already-loaded key.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn with_auth(config: &SnowflakeConfig, auth: KeyPairAuth) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs + HTTP_GRACE_SECS))
            .user_agent(concat!("metricdeck/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(to_domain)?;

        let base_url = config.api_base_url();
        info!(
            base_url = %base_url,
            warehouse = %config.warehouse,
            database = %config.database,
            schema = %config.schema,
            "Snowflake gateway configured"
        );

        Ok(Self { client, base_url, config: config.clone(), auth: Arc::new(auth) })
    }

    fn statements_url(&self) -> String {
        format!("{}/api/v2/statements", self.base_url)
    }

    async fn run(&self, query: &QueryText) -> Result<Vec<Row>> {
        let request = StatementRequest {
            statement: query.as_str(),
            timeout: self.config.timeout_secs,
            database: &self.config.database,
            schema: &self.config.schema,
            warehouse: &self.config.warehouse,
            role: &self.config.role,
            parameters: BTreeMap::from([("QUERY_TAG", QUERY_TAG)]),
        };

        let (mut status, mut response) =
            self.send(self.client.post(self.statements_url()).json(&request)).await?;

        let deadline = Instant::now() + Duration::from_secs(self.config.timeout_secs);
        while status == StatusCode::ACCEPTED {
            let handle = statement_handle(&response)?;
            if Instant::now() >= deadline {
                return Err(DashboardError::Query(format!(
                    "Statement {handle} did not finish within {}s",
                    self.config.timeout_secs
                )));
            }
            debug!(handle = %handle, "Statement still running, polling");
            tokio::time::sleep(POLL_INTERVAL).await;
            (status, response) =
                self.send(self.client.get(format!("{}/{handle}", self.statements_url()))).await?;
        }

        let meta = response.result_set_meta_data.take().ok_or_else(|| {
            DashboardError::Query("Snowflake response is missing resultSetMetaData".into())
        })?;
        let mut rows = decode_rows(&meta.row_type, std::mem::take(&mut response.data));

        if meta.partition_info.len() > 1 {
            let handle = statement_handle(&response)?;
            for partition in 1..meta.partition_info.len() {
                let url = format!("{}/{handle}", self.statements_url());
                let (_, page) =
                    self.send(self.client.get(url).query(&[("partition", partition)])).await?;
                rows.extend(decode_rows(&meta.row_type, page.data));
            }
            debug!(partitions = meta.partition_info.len(), "Fetched all result partitions");
        }

        Ok(rows)
    }

    async fn send(&self, request: RequestBuilder) -> Result<(StatusCode, StatementResponse)> {
        let token = self.auth.token()?;
        let response = request
            .bearer_auth(token)
            .header("X-Snowflake-Authorization-Token-Type", "KEYPAIR_JWT")
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(to_domain)?;

        let status = response.status();
        if status.is_success() {
            let body = response.json::<StatementResponse>().await.map_err(to_domain)?;
            return Ok((status, body));
        }

        let body = response.text().await.unwrap_or_default();
        Err(api_error(status, &body))
    }
}

#[async_trait]
impl WarehouseGateway for SnowflakeGateway {
    async fn execute(&self, query: &QueryText) -> Result<Vec<Row>> {
        let started = Instant::now();
        info!(query = %query.preview(QUERY_LOG_PREVIEW_CHARS), "Executing query");

        let result = self.run(query).await;

        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        match &result {
            Ok(rows) => info!(rows = rows.len(), elapsed_ms, "Query executed successfully"),
            Err(err) => warn!(error = %err, elapsed_ms, "Query execution failed"),
        }
        result
    }

    fn backend(&self) -> &'static str {
        "snowflake"
    }
}

fn statement_handle(response: &StatementResponse) -> Result<String> {
    response.statement_handle.clone().ok_or_else(|| {
        DashboardError::Query("Snowflake response is missing a statement handle".into())
    })
}

/// Map a non-2xx SQL API response to a domain error.
fn api_error(status: StatusCode, body: &str) -> DashboardError {
    let parsed: ApiErrorBody = serde_json::from_str(body).unwrap_or_default();
    let detail = parsed
        .message
        .filter(|message| !message.is_empty())
        .or_else(|| (!body.trim().is_empty()).then(|| body.trim().to_string()))
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown status").to_string());
    let detail = match (parsed.code, parsed.sql_state) {
        (Some(code), Some(state)) => format!("{detail} (code {code}, SQL state {state})"),
        (Some(code), None) => format!("{detail} (code {code})"),
        _ => detail,
    };

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => DashboardError::Auth(format!(
            "Snowflake rejected credentials (HTTP {}): {detail}",
            status.as_u16()
        )),
        _ => DashboardError::Query(format!(
            "Snowflake returned HTTP {}: {detail}",
            status.as_u16()
        )),
    }
}
