use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::Url;

use super::error::StoreError;
use super::query::RowQuery;

/// Client for the hosted relational store. Speaks the store's row API
/// (`/rest/v1/<table>` with query-string filters) and its auth API
/// (`/auth/v1/user` token introspection).
///
/// Constructed once at startup and shared read-only through application
/// state; holds no mutable state of its own.
pub struct StoreClient {
    http: reqwest::Client,
    rest_base: Url,
    auth_base: Url,
    service_key: String,
}

/// Subject returned by token introspection.
#[derive(Debug, Clone, Deserialize)]
pub struct IntrospectedSubject {
    pub id: String,
    pub email: Option<String>,
}

impl StoreClient {
    pub fn new(
        base_url: &str,
        service_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, StoreError> {
        let service_key = service_key.into();
        if base_url.is_empty() {
            return Err(StoreError::ConfigMissing("STORE_URL"));
        }
        if service_key.is_empty() {
            return Err(StoreError::ConfigMissing("STORE_SERVICE_KEY"));
        }

        let base = Url::parse(base_url).map_err(|_| StoreError::InvalidBaseUrl)?;
        let rest_base = base
            .join("rest/v1/")
            .map_err(|_| StoreError::InvalidBaseUrl)?;
        let auth_base = base
            .join("auth/v1/")
            .map_err(|_| StoreError::InvalidBaseUrl)?;

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(StoreError::Transport)?;

        Ok(Self {
            http,
            rest_base,
            auth_base,
            service_key,
        })
    }

    /// Start a row query against a table.
    pub fn from(&self, table: &str) -> RowQuery<'_> {
        RowQuery::new(self, table)
    }

    /// Pings the store's auth API to ensure connectivity
    pub async fn health(&self) -> Result<(), StoreError> {
        let url = self
            .auth_base
            .join("health")
            .map_err(|_| StoreError::InvalidBaseUrl)?;
        let response = self
            .http
            .get(url)
            .headers(self.service_headers())
            .send()
            .await?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(unexpected_status(response).await)
        }
    }

    /// Exchange an opaque token for the subject it represents. `Ok(None)`
    /// means the store rejected the token; transport and unexpected responses
    /// surface as errors so they stay distinguishable from rejection.
    pub async fn introspect_token(
        &self,
        token: &str,
    ) -> Result<Option<IntrospectedSubject>, StoreError> {
        let url = self
            .auth_base
            .join("user")
            .map_err(|_| StoreError::InvalidBaseUrl)?;

        let mut headers = HeaderMap::new();
        headers.insert("apikey", self.key_header());
        if let Ok(value) = HeaderValue::from_str(&format!("Bearer {}", token)) {
            headers.insert(AUTHORIZATION, value);
        }

        let response = self.http.get(url).headers(headers).send().await?;
        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                let subject = decode_body(response).await?;
                Ok(Some(subject))
            }
            _ => Err(unexpected_status(response).await),
        }
    }

    pub(crate) async fn get_rows<T: DeserializeOwned>(
        &self,
        table: &str,
        params: Vec<(String, String)>,
    ) -> Result<Vec<T>, StoreError> {
        let url = self.table_url(table)?;
        let response = self
            .http
            .get(url)
            .headers(self.service_headers())
            .query(&params)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(unexpected_status(response).await);
        }
        decode_body(response).await
    }

    pub(crate) async fn insert_rows<B: Serialize, T: DeserializeOwned>(
        &self,
        table: &str,
        body: &B,
    ) -> Result<Vec<T>, StoreError> {
        let url = self.table_url(table)?;
        let response = self
            .http
            .post(url)
            .headers(self.service_headers())
            .header("Prefer", "return=representation")
            .json(body)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(unexpected_status(response).await);
        }
        decode_body(response).await
    }

    pub(crate) async fn update_rows<B: Serialize>(
        &self,
        table: &str,
        params: Vec<(String, String)>,
        body: &B,
    ) -> Result<(), StoreError> {
        let url = self.table_url(table)?;
        let response = self
            .http
            .patch(url)
            .headers(self.service_headers())
            .header("Prefer", "return=minimal")
            .query(&params)
            .json(body)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(unexpected_status(response).await);
        }
        Ok(())
    }

    pub(crate) async fn delete_rows(
        &self,
        table: &str,
        params: Vec<(String, String)>,
    ) -> Result<(), StoreError> {
        let url = self.table_url(table)?;
        let response = self
            .http
            .delete(url)
            .headers(self.service_headers())
            .query(&params)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(unexpected_status(response).await);
        }
        Ok(())
    }

    fn table_url(&self, table: &str) -> Result<Url, StoreError> {
        let valid = !table.is_empty()
            && table
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_');
        if !valid {
            return Err(StoreError::InvalidTableName(table.to_string()));
        }
        self.rest_base
            .join(table)
            .map_err(|_| StoreError::InvalidTableName(table.to_string()))
    }

    fn service_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("apikey", self.key_header());
        if let Ok(value) = HeaderValue::from_str(&format!("Bearer {}", self.service_key)) {
            headers.insert(AUTHORIZATION, value);
        }
        headers
    }

    fn key_header(&self) -> HeaderValue {
        HeaderValue::from_str(&self.service_key)
            .unwrap_or_else(|_| HeaderValue::from_static("invalid-key"))
    }
}

async fn decode_body<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, StoreError> {
    let text = response.text().await?;
    serde_json::from_str(&text).map_err(|e| StoreError::Decode(e.to_string()))
}

async fn unexpected_status(response: reqwest::Response) -> StoreError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    StoreError::UnexpectedStatus { status, body }
}
