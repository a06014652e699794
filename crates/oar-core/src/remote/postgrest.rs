//! Supabase PostgREST binding for `RemoteStore`.

use std::time::Duration;

use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::Deserialize;

use super::{RemoteError, RemoteResult, RemoteStore};
use crate::config::ClientConfig;
use crate::sync::{Payload, SyncTable};
use crate::util::{body_excerpt, has_http_scheme, non_blank};

const REMOTE_HTTP_TIMEOUT_SECS: u64 = 15;

/// Remote store talking to `{supabase_url}/rest/v1/{table}`
#[derive(Clone)]
pub struct PostgrestRemoteStore {
    rest_url: String,
    anon_key: String,
    bearer: String,
    client: reqwest::Client,
}

impl std::fmt::Debug for PostgrestRemoteStore {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("PostgrestRemoteStore")
            .field("rest_url", &self.rest_url)
            .field("anon_key", &"[REDACTED]")
            .field("bearer", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl PostgrestRemoteStore {
    pub fn new(supabase_url: &str, anon_key: &str) -> RemoteResult<Self> {
        let base = normalize_base_url(supabase_url)?;
        let anon_key = non_blank(anon_key).ok_or_else(|| {
            RemoteError::InvalidConfiguration("anon key must not be empty".to_string())
        })?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REMOTE_HTTP_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            rest_url: format!("{base}/rest/v1"),
            bearer: anon_key.clone(),
            anon_key,
            client,
        })
    }

    /// Build a store from resolved client configuration.
    pub fn from_config(config: &ClientConfig) -> RemoteResult<Self> {
        let (Some(url), Some(anon_key)) = (
            config.supabase_url.as_deref(),
            config.supabase_anon_key.as_deref(),
        ) else {
            return Err(RemoteError::InvalidConfiguration(
                "supabase_url and supabase_anon_key are required".to_string(),
            ));
        };
        let store = Self::new(url, anon_key)?;
        Ok(match config.access_token.as_deref() {
            Some(token) => store.with_access_token(token),
            None => store,
        })
    }

    /// Authenticate as a signed-in user instead of the anonymous role.
    #[must_use]
    pub fn with_access_token(mut self, access_token: &str) -> Self {
        if let Some(token) = non_blank(access_token) {
            self.bearer = token;
        }
        self
    }

    fn table_url(&self, table: SyncTable) -> String {
        format!("{}/{}", self.rest_url, table.as_str())
    }

    fn id_filter_url(&self, table: SyncTable, id: &str) -> String {
        format!(
            "{}?id=eq.{}",
            self.table_url(table),
            urlencoding::encode(id)
        )
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.client
            .request(method, url)
            .header("apikey", &self.anon_key)
            .bearer_auth(&self.bearer)
            .header(reqwest::header::ACCEPT, "application/json")
    }
}

impl RemoteStore for PostgrestRemoteStore {
    async fn upsert(&self, table: SyncTable, row: &Payload) -> RemoteResult<()> {
        let response = self
            .request(Method::POST, &self.table_url(table))
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(row)
            .send()
            .await?;
        ensure_success(response).await?;
        Ok(())
    }

    async fn update(&self, table: SyncTable, id: &str, fields: &Payload) -> RemoteResult<()> {
        let response = self
            .request(Method::PATCH, &self.id_filter_url(table, id))
            .header("Prefer", "return=minimal")
            .json(fields)
            .send()
            .await?;
        ensure_success(response).await?;
        Ok(())
    }

    async fn delete(&self, table: SyncTable, id: &str) -> RemoteResult<()> {
        let response = self
            .request(Method::DELETE, &self.id_filter_url(table, id))
            .send()
            .await?;
        ensure_success(response).await?;
        Ok(())
    }

    async fn select_eq(
        &self,
        table: SyncTable,
        column: &str,
        value: &str,
    ) -> RemoteResult<Vec<Payload>> {
        let url = format!(
            "{}?{}=eq.{}&select=*",
            self.table_url(table),
            urlencoding::encode(column),
            urlencoding::encode(value)
        );
        let response = self.request(Method::GET, &url).send().await?;
        let response = ensure_success(response).await?;
        Ok(response.json::<Vec<Payload>>().await?)
    }
}

async fn ensure_success(response: Response) -> RemoteResult<Response> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    Err(RemoteError::Api {
        status: status.as_u16(),
        message: parse_api_error(status, &body),
    })
}

#[derive(Debug, Deserialize)]
struct PostgrestErrorBody {
    message: Option<String>,
    error: Option<String>,
    details: Option<String>,
}

fn parse_api_error(status: StatusCode, body: &str) -> String {
    if let Ok(payload) = serde_json::from_str::<PostgrestErrorBody>(body) {
        if let Some(message) = payload.message.or(payload.error) {
            return match payload.details.as_deref().and_then(non_blank) {
                Some(details) => format!("{}: {}", message.trim(), body_excerpt(&details)),
                None => message.trim().to_string(),
            };
        }
    }

    let trimmed = body_excerpt(body);
    if trimmed.is_empty() {
        status
            .canonical_reason()
            .map_or_else(|| format!("HTTP {}", status.as_u16()), str::to_string)
    } else {
        trimmed
    }
}

fn normalize_base_url(raw: &str) -> RemoteResult<String> {
    let url = non_blank(raw).ok_or_else(|| {
        RemoteError::InvalidConfiguration("supabase url must not be empty".to_string())
    })?;
    if has_http_scheme(&url) {
        Ok(url.trim_end_matches('/').to_string())
    } else {
        Err(RemoteError::InvalidConfiguration(
            "supabase url must include http:// or https://".to_string(),
        ))
    }
}
