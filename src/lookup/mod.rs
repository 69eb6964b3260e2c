//! imeicheck.net API client
//!
//! Two endpoints are used: `POST /v1/checks` runs a check for one device and
//! `GET /v1/services` lists the services available to the account. Responses
//! are not modelled; the check result is reformatted as text for the chat.

use async_trait::async_trait;
use reqwest::header::{ACCEPT_LANGUAGE, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use thiserror::Error;
use url::Url;

use crate::core::config::LookupConfig;
use crate::core::validation::Imei;

/// imeicheck.net errors
#[derive(Debug, Error)]
pub enum LookupError {
    /// Transport failure or undecodable body
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx answer
    #[error("imeicheck.net answered {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("Invalid endpoint URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Device lookup as seen by the conversation flow.
#[async_trait]
pub trait LookupClient: Send + Sync {
    /// Runs one check and returns the display text of the result.
    async fn check(&self, imei: &Imei) -> Result<String, LookupError>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CheckRequest<'a> {
    device_id: &'a str,
    service_id: u32,
}

/// Client for the imeicheck.net REST API
#[derive(Clone)]
pub struct ImeiCheckClient {
    http: Client,
    base_url: Url,
    api_token: SecretString,
    service_id: u32,
}

impl ImeiCheckClient {
    pub fn new(config: &LookupConfig) -> Result<Self, LookupError> {
        let http = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            http,
            base_url: config.base_url.clone(),
            api_token: config.api_token.clone(),
            service_id: config.service_id,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, LookupError> {
        Ok(self.base_url.join(path)?)
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .bearer_auth(self.api_token.expose_secret())
            .header(ACCEPT_LANGUAGE, "en")
            .header(CONTENT_TYPE, "application/json")
    }

    /// Lists the services available to the account.
    ///
    /// Diagnostic only; the bot itself always uses the configured service.
    pub async fn list_services(&self) -> Result<serde_json::Value, LookupError> {
        let url = self.endpoint("v1/services")?;
        let response = self.authorized(self.http.get(url)).send().await?;
        let response = ensure_success(response).await?;
        Ok(response.json().await?)
    }

    /// Runs a check and returns the raw response body.
    pub async fn create_check(&self, imei: &Imei) -> Result<String, LookupError> {
        let url = self.endpoint("v1/checks")?;
        let payload = CheckRequest {
            device_id: imei.as_str(),
            service_id: self.service_id,
        };

        log::debug!("Requesting check for {} (service {})", imei, self.service_id);
        let response = self.authorized(self.http.post(url)).json(&payload).send().await?;
        let response = ensure_success(response).await?;
        Ok(response.text().await?)
    }
}

#[async_trait]
impl LookupClient for ImeiCheckClient {
    async fn check(&self, imei: &Imei) -> Result<String, LookupError> {
        let body = self.create_check(imei).await?;
        Ok(format_check_result(&body))
    }
}

async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, LookupError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    log::warn!("imeicheck.net returned status {}: {}", status, body);
    Err(LookupError::Status { status, body })
}

/// Formats a check response for the chat: one JSON fragment per line.
///
/// Fields keep the order imeicheck.net sent them in. Bodies that are not JSON
/// are returned unchanged.
pub fn format_check_result(body: &str) -> String {
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(value) => value.to_string().split(',').collect::<Vec<_>>().join("\n"),
        Err(_) => body.to_string(),
    }
}
