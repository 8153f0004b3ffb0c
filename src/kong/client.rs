//! HTTP client for the Kong admin API.
//!
//! One method per admin operation, grouped by resource kind. Plugin objects
//! live nested under their API. Failures surface as [`KongError`] without
//! any retry — callers that want retries wrap their own.

use std::time::Duration;

use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use super::error::KongError;
use super::objects::{
    ApiPayload, ConsumerPayload, KongApi, KongConsumer, KongPlugin, PluginPayload,
};

#[derive(Debug, Clone)]
pub struct KongClient {
    base_url: String,
    http: Client,
}

impl KongClient {
    /// Build a client for the admin API at `base_url`
    /// (e.g. "http://127.0.0.1:8001").
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, KongError> {
        let http = Client::builder()
            .use_rustls_tls()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(5))
            .user_agent(concat!("kongbridge/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| KongError::InvalidConfig(format!("failed to build HTTP client: {e}")))?;

        Ok(Self::with_http_client(base_url, http))
    }

    /// Build a client around a pre-configured `reqwest::Client` (tests).
    pub fn with_http_client(base_url: &str, http: Client) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // -- APIs --

    pub async fn create_api(&self, payload: &ApiPayload) -> Result<KongApi, KongError> {
        self.send_json(Method::POST, "/apis", payload).await
    }

    pub async fn retrieve_api(&self, kong_id: Uuid) -> Result<KongApi, KongError> {
        self.fetch_json(&format!("/apis/{kong_id}")).await
    }

    pub async fn update_api(
        &self,
        kong_id: Uuid,
        payload: &ApiPayload,
    ) -> Result<KongApi, KongError> {
        self.send_json(Method::PATCH, &format!("/apis/{kong_id}"), payload)
            .await
    }

    pub async fn delete_api(&self, kong_id: Uuid) -> Result<(), KongError> {
        self.delete(&format!("/apis/{kong_id}")).await
    }

    // -- Consumers --

    pub async fn create_consumer(
        &self,
        payload: &ConsumerPayload,
    ) -> Result<KongConsumer, KongError> {
        self.send_json(Method::POST, "/consumers", payload).await
    }

    pub async fn retrieve_consumer(&self, kong_id: Uuid) -> Result<KongConsumer, KongError> {
        self.fetch_json(&format!("/consumers/{kong_id}")).await
    }

    pub async fn update_consumer(
        &self,
        kong_id: Uuid,
        payload: &ConsumerPayload,
    ) -> Result<KongConsumer, KongError> {
        self.send_json(Method::PATCH, &format!("/consumers/{kong_id}"), payload)
            .await
    }

    pub async fn delete_consumer(&self, kong_id: Uuid) -> Result<(), KongError> {
        self.delete(&format!("/consumers/{kong_id}")).await
    }

    // -- Plugin configurations (nested under an API) --

    pub async fn create_plugin(
        &self,
        api_kong_id: Uuid,
        payload: &PluginPayload,
    ) -> Result<KongPlugin, KongError> {
        self.send_json(Method::POST, &format!("/apis/{api_kong_id}/plugins"), payload)
            .await
    }

    pub async fn retrieve_plugin(
        &self,
        api_kong_id: Uuid,
        kong_id: Uuid,
    ) -> Result<KongPlugin, KongError> {
        self.fetch_json(&format!("/apis/{api_kong_id}/plugins/{kong_id}"))
            .await
    }

    pub async fn update_plugin(
        &self,
        api_kong_id: Uuid,
        kong_id: Uuid,
        payload: &PluginPayload,
    ) -> Result<KongPlugin, KongError> {
        self.send_json(
            Method::PATCH,
            &format!("/apis/{api_kong_id}/plugins/{kong_id}"),
            payload,
        )
        .await
    }

    pub async fn delete_plugin(&self, api_kong_id: Uuid, kong_id: Uuid) -> Result<(), KongError> {
        self.delete(&format!("/apis/{api_kong_id}/plugins/{kong_id}"))
            .await
    }

    // -- Request plumbing --

    async fn send_json<B: Serialize, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<T, KongError> {
        debug!(%method, path, "kong admin request");
        let response = self
            .http
            .request(method, format!("{}{}", self.base_url, path))
            .json(body)
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn fetch_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, KongError> {
        debug!(path, "kong admin retrieve");
        let response = self
            .http
            .get(format!("{}{}", self.base_url, path))
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn delete(&self, path: &str) -> Result<(), KongError> {
        debug!(path, "kong admin delete");
        let response = self
            .http
            .delete(format!("{}{}", self.base_url, path))
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(Self::map_error(status, body))
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, KongError> {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if !status.is_success() {
            return Err(Self::map_error(status, body));
        }
        serde_json::from_str(&body).map_err(|e| KongError::Decode(e.to_string()))
    }

    fn map_error(status: StatusCode, body: String) -> KongError {
        match status {
            StatusCode::NOT_FOUND => KongError::NotFound(body),
            StatusCode::CONFLICT => KongError::Conflict(body),
            _ => KongError::Remote {
                status: status.as_u16(),
                body,
            },
        }
    }
}
