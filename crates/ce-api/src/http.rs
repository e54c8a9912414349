//! HTTP adapter for the challenge API

use async_trait::async_trait;
use ce_challenge::{PersistableChallenge, Resource, ResourcePayload};
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;

use crate::client::{ChallengeApi, ChallengeRecord};
use crate::config::ApiConfig;
use crate::error::{ApiError, Result};

/// Talks to the challenge REST API over HTTP.
///
/// Endpoints:
/// - `POST   {base}/challenges`
/// - `PUT    {base}/challenges/{id}`
/// - `POST   {base}/resources`
/// - `DELETE {base}/resources` (body identifies the assignment)
pub struct HttpChallengeApi {
    base_url: String,
    client: reqwest::Client,
    config: ApiConfig,
}

impl HttpChallengeApi {
    pub fn new(config: ApiConfig) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
            config,
        }
    }

    /// Use a preconfigured HTTP client (proxies, custom TLS, ...).
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.client.request(method, url);
        if let Some(timeout) = self.config.timeout() {
            request = request.timeout(timeout);
        }
        if let Some(token) = &self.config.token {
            request = request.bearer_auth(token);
        }
        request
    }

    async fn send(&self, request: RequestBuilder) -> Result<String> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        if status.is_success() {
            Ok(body)
        } else {
            Err(ApiError::from_status(status.as_u16(), &body))
        }
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let body = self.send(request).await?;
        serde_json::from_str(&body).map_err(|e| ApiError::Deserialization(e.to_string()))
    }
}

#[async_trait]
impl ChallengeApi for HttpChallengeApi {
    async fn create_challenge(&self, payload: &PersistableChallenge) -> Result<ChallengeRecord> {
        tracing::debug!("HttpChallengeApi: POST /challenges");
        self.send_json(self.request(Method::POST, "/challenges").json(payload))
            .await
    }

    async fn update_challenge(
        &self,
        payload: &PersistableChallenge,
        challenge_id: &str,
    ) -> Result<ChallengeRecord> {
        tracing::debug!("HttpChallengeApi: PUT /challenges/{}", challenge_id);
        let path = format!("/challenges/{}", challenge_id);
        self.send_json(self.request(Method::PUT, &path).json(payload))
            .await
    }

    async fn create_resource(&self, payload: &ResourcePayload) -> Result<Resource> {
        tracing::debug!("HttpChallengeApi: POST /resources");
        self.send_json(self.request(Method::POST, "/resources").json(payload))
            .await
    }

    async fn delete_resource(&self, payload: &ResourcePayload) -> Result<()> {
        tracing::debug!("HttpChallengeApi: DELETE /resources");
        self.send(self.request(Method::DELETE, "/resources").json(payload))
            .await
            .map(|_| ())
    }

    fn name(&self) -> &str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let api = HttpChallengeApi::new(ApiConfig {
            base_url: "https://api.example.com/v5/".to_string(),
            ..ApiConfig::default()
        });
        assert_eq!(api.base_url, "https://api.example.com/v5");
        assert_eq!(api.name(), "http");
    }

    #[test]
    fn request_targets_joined_url() {
        let api = HttpChallengeApi::new(ApiConfig {
            base_url: "https://api.example.com/v5".to_string(),
            token: Some("secret".to_string()),
            timeout_secs: Some(5),
        });
        let request = api.request(Method::PUT, "/challenges/c-1").build().unwrap();
        assert_eq!(request.url().as_str(), "https://api.example.com/v5/challenges/c-1");
        assert_eq!(request.method(), Method::PUT);
        assert_eq!(
            request.headers()["authorization"].to_str().unwrap(),
            "Bearer secret"
        );
        assert_eq!(request.timeout(), Some(&std::time::Duration::from_secs(5)));
    }
}
