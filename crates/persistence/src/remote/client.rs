//! HTTP client for the hosted store's REST endpoint.

use std::time::Duration;

use domain::models::RecordId;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::config::StoreConfig;
use crate::error::StoreError;
use crate::record::RecordKind;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Thin wrapper over the hosted store's table endpoints.
#[derive(Debug)]
pub struct RemoteClient {
    http: Client,
    /// No overall timeout: the change stream stays open indefinitely.
    stream_http: Client,
    base_url: String,
    key: String,
    owner_id: Option<String>,
}

impl RemoteClient {
    pub fn new(config: &StoreConfig) -> Result<Self, StoreError> {
        let base_url = config.remote_url.trim().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(StoreError::InvalidConfig(
                "remote_url must not be empty".to_string(),
            ));
        }

        let http = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(CONNECT_TIMEOUT)
            .build()?;
        let stream_http = Client::builder().connect_timeout(CONNECT_TIMEOUT).build()?;

        Ok(Self {
            http,
            stream_http,
            base_url,
            key: config.remote_key.trim().to_string(),
            owner_id: config.owner().map(str::to_string),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn owner(&self) -> Option<&str> {
        self.owner_id.as_deref()
    }

    fn table_url(&self, kind: RecordKind) -> String {
        format!("{}/rest/v1/{}", self.base_url, kind.table())
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        request.header("apikey", &self.key).bearer_auth(&self.key)
    }

    /// Fetches rows of `kind` matching `query`.
    pub async fn select<R: DeserializeOwned>(
        &self,
        kind: RecordKind,
        query: &[(&str, String)],
    ) -> Result<Vec<R>, StoreError> {
        debug!(table = kind.table(), ?query, "Remote select");
        let response = self
            .authorize(self.http.get(self.table_url(kind)))
            .query(&[("select", "*")])
            .query(query)
            .send()
            .await?;
        rows(response).await
    }

    /// Inserts one row and returns the stored representation.
    pub async fn insert<R: DeserializeOwned>(
        &self,
        kind: RecordKind,
        body: &Value,
    ) -> Result<R, StoreError> {
        let response = self
            .authorize(self.http.post(self.table_url(kind)))
            .header("Prefer", "return=representation")
            .json(body)
            .send()
            .await?;
        rows(response)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| {
                StoreError::InvalidResponse(format!("insert into {} returned no row", kind.table()))
            })
    }

    /// Updates the row with `id`; `None` when no row matched.
    pub async fn update<R: DeserializeOwned>(
        &self,
        kind: RecordKind,
        id: &RecordId,
        body: &Value,
    ) -> Result<Option<R>, StoreError> {
        let response = self
            .authorize(self.http.patch(self.table_url(kind)))
            .query(&[("id", eq(id.as_str()))])
            .header("Prefer", "return=representation")
            .json(body)
            .send()
            .await?;
        Ok(rows(response).await?.into_iter().next())
    }

    pub async fn delete(&self, kind: RecordKind, id: &RecordId) -> Result<(), StoreError> {
        let response = self
            .authorize(self.http.delete(self.table_url(kind)))
            .query(&[("id", eq(id.as_str()))])
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    /// Opens the server-sent change stream.
    pub async fn open_change_stream(&self) -> Result<Response, StoreError> {
        let response = self
            .authorize(
                self.stream_http
                    .get(format!("{}/realtime/v1/changes", self.base_url)),
            )
            .header("Accept", "text/event-stream")
            .send()
            .await?;
        check(response).await
    }
}

/// Equality filter value.
pub fn eq(value: &str) -> String {
    format!("eq.{}", value)
}

async fn check(response: Response) -> Result<Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().await.unwrap_or_default();
    Err(StoreError::Remote {
        status: status.as_u16(),
        message,
    })
}

async fn rows<R: DeserializeOwned>(response: Response) -> Result<Vec<R>, StoreError> {
    let response = check(response).await?;
    let bytes = response.bytes().await?;
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }
    serde_json::from_slice(&bytes)
        .map_err(|e| StoreError::InvalidResponse(format!("unexpected row payload: {}", e)))
}
