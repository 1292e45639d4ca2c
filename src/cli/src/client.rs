//! HTTP client for communicating with the Cheato API server.

use anyhow::{Context, Result};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Header carrying the caller's user id.
const USER_ID_HEADER: &str = "x-user-id";

/// Success envelope returned by the server.
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
}

/// Error envelope returned by the server.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    code: String,
    message: String,
    #[serde(default)]
    internal: Option<String>,
}

/// Failures reported by the server.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{message} ({code}, HTTP {status})")]
    Server {
        status: StatusCode,
        code: String,
        message: String,
        internal: Option<String>,
    },

    #[error("HTTP {status}: {body}")]
    Unexpected { status: StatusCode, body: String },

    #[error("a user id is required; pass --user-id or set CHEATO_USER_ID")]
    MissingUserId,

    #[error("server reported success but returned no data")]
    MissingData,
}

/// HTTP client for the Cheato API.
pub struct ApiClient {
    client: Client,
    base_url: String,
    user_id: Option<String>,
}

impl ApiClient {
    /// Create a new API client pointing at the given base URL.
    pub fn new(base_url: &str, user_id: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            user_id: user_id.filter(|id| !id.trim().is_empty()),
        })
    }

    /// Return the configured base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authenticated(&self, builder: RequestBuilder) -> Result<RequestBuilder> {
        let user_id = self.user_id.as_deref().ok_or(ApiError::MissingUserId)?;
        Ok(builder.header(USER_ID_HEADER, user_id))
    }

    /// Perform a GET request and return the envelope's data.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.url(path);
        self.data(self.client.get(&url), &url).await
    }

    /// Perform a GET request as the configured user.
    pub async fn get_as_user<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.url(path);
        let builder = self.authenticated(self.client.get(&url))?;
        self.data(builder, &url).await
    }

    /// Perform a POST request with a JSON body and return the envelope's data.
    pub async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let url = self.url(path);
        self.data(self.client.post(&url).json(body), &url).await
    }

    /// POST as the configured user, expecting only `{"success": true}`.
    pub async fn post_as_user<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<()> {
        let url = self.url(path);
        let builder = self.authenticated(self.client.post(&url).json(body))?;
        let envelope: ApiResponse<serde_json::Value> = self.envelope(builder, &url).await?;
        if envelope.success {
            Ok(())
        } else {
            anyhow::bail!("Server did not confirm {}", path)
        }
    }

    /// Perform a raw GET request and return the full JSON value (for unversioned endpoints).
    pub async fn get_raw(&self, path: &str) -> Result<serde_json::Value> {
        let url = self.url(path);
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("GET {} failed", url))?;
        let resp = check_status(resp).await?;

        resp.json()
            .await
            .with_context(|| format!("Failed to parse response from {}", url))
    }

    async fn data<T: DeserializeOwned>(&self, builder: RequestBuilder, url: &str) -> Result<T> {
        let envelope: ApiResponse<T> = self.envelope(builder, url).await?;
        envelope.data.ok_or_else(|| ApiError::MissingData.into())
    }

    async fn envelope<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
        url: &str,
    ) -> Result<ApiResponse<T>> {
        let resp = builder
            .send()
            .await
            .with_context(|| format!("Request to {} failed", url))?;
        let resp = check_status(resp).await?;

        resp.json()
            .await
            .with_context(|| format!("Failed to parse response from {}", url))
    }
}

/// Convert a non-2xx response into an [`ApiError`].
async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let body = resp.text().await.unwrap_or_default();
    Err(parse_error(status, body).into())
}

fn parse_error(status: StatusCode, body: String) -> ApiError {
    match serde_json::from_str::<ErrorEnvelope>(&body) {
        Ok(envelope) => ApiError::Server {
            status,
            code: envelope.error.code,
            message: envelope.error.message,
            internal: envelope.error.internal,
        },
        Err(_) => ApiError::Unexpected { status, body },
    }
}
