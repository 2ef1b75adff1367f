//! Record store speaking the PostgREST dialect over HTTP.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, RequestBuilder, Response};
use serde::Serialize;

use super::{RecordStore, StoreError, StoreResult};
use crate::session::{Session, SessionClose, SessionId};

/// Connection settings for [`RestRecordStore`].
#[derive(Debug, Clone)]
pub struct RestConfig {
    /// Service base URL, e.g. `https://xyz.supabase.co`.
    pub base_url: String,
    /// Access key sent as both `apikey` and bearer token.
    pub api_key: String,
    /// Table holding session rows.
    pub table: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl RestConfig {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            table: "sessions".to_string(),
            timeout: Duration::from_secs(15),
        }
    }

    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = table.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn table_url(&self) -> String {
        format!(
            "{}/rest/v1/{}",
            self.base_url.trim_end_matches('/'),
            self.table
        )
    }
}

#[derive(Debug, Serialize)]
struct NewRow<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    user_id: Option<&'a str>,
    start_time: chrono::DateTime<Utc>,
}

/// Session records held in a remote PostgREST table.
#[derive(Debug, Clone)]
pub struct RestRecordStore {
    client: Client,
    config: RestConfig,
}

impl RestRecordStore {
    pub fn new(config: RestConfig) -> StoreResult<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.config.api_key)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
    }

    async fn check(response: Response) -> StoreResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response.text().await.unwrap_or_default();
        Err(StoreError::Rejected {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl RecordStore for RestRecordStore {
    async fn create(&self, user_id: Option<&str>) -> StoreResult<SessionId> {
        let row = NewRow {
            user_id,
            start_time: Utc::now(),
        };

        let response = self
            .authorize(self.client.post(self.config.table_url()))
            .header("Prefer", "return=representation")
            .json(&[row])
            .send()
            .await?;
        let created: Vec<Session> = Self::check(response).await?.json().await?;

        created
            .into_iter()
            .next()
            .map(|session| session.id)
            .ok_or_else(|| StoreError::Malformed("insert returned no rows".into()))
    }

    async fn update(&self, id: &SessionId, close: &SessionClose) -> StoreResult<()> {
        let response = self
            .authorize(self.client.patch(self.config.table_url()))
            .query(&[
                ("id", format!("eq.{}", id)),
                ("end_time", "is.null".to_string()),
            ])
            .header("Prefer", "return=representation")
            .json(close)
            .send()
            .await?;
        let updated: Vec<Session> = Self::check(response).await?.json().await?;

        // Missing and already-closed rows both filter to nothing
        if updated.is_empty() {
            return Err(StoreError::NotFound(id.to_string()));
        }
        Ok(())
    }

    async fn list(&self) -> StoreResult<Vec<Session>> {
        let response = self
            .authorize(self.client.get(self.config.table_url()))
            .query(&[("select", "*"), ("order", "start_time.desc")])
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }
}
