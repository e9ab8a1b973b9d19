//! Remote connection client
//!
//! The two backend calls the wizard depends on: fetch an authorization URL,
//! and exchange a code for a stored connection. Single-shot and
//! non-retrying; retry policy belongs to the backend or a shared HTTP
//! layer, not here.

use serde::{Deserialize, Serialize};
use url::Url;

use crosspost_core::prelude::*;
use crosspost_core::{PlatformConnection, PlatformId};

/// Backend-issued authorization target for one attempt.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizationUrl {
    pub auth_url: Url,
    /// Anti-forgery nonce; echoed back by the popup and validated by the
    /// backend during the exchange.
    pub state: String,
}

/// Parameters for the code exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExchangeRequest {
    pub platform: PlatformId,
    pub code: String,
    pub state: String,
}

/// Backend collaborator interface consumed by the wizard.
#[trait_variant::make(ConnectionClient: Send)]
pub trait LocalConnectionClient {
    /// `POST /oauth/{platform}/url`
    ///
    /// Fails with [`Error::Network`] or [`Error::UnsupportedPlatform`].
    async fn authorization_url(&self, platform: PlatformId) -> Result<AuthorizationUrl>;

    /// `POST /oauth/{platform}/callback`
    ///
    /// Fails with [`Error::Network`], [`Error::InvalidGrant`] (code/state
    /// mismatch or expiry), or [`Error::AlreadyConnected`].
    async fn exchange_code(&self, request: ExchangeRequest) -> Result<PlatformConnection>;
}

// ─────────────────────────────────────────────────────────────────────────
// HTTP implementation
// ─────────────────────────────────────────────────────────────────────────

const HTTP_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Serialize)]
struct CallbackRequest<'a> {
    code: &'a str,
    state: &'a str,
}

#[derive(Debug, Deserialize)]
struct ExchangeResponse {
    connection: PlatformConnection,
}

/// Error body shape the backend uses for 4xx responses.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: String,
}

/// `ConnectionClient` over the Crosspost REST backend.
#[derive(Debug, Clone)]
pub struct HttpConnectionClient {
    http: reqwest::Client,
    base: Url,
}

impl HttpConnectionClient {
    pub fn new(base: Url) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()
            .map_err(|e| Error::network(e.to_string()))?;
        Ok(Self { http, base })
    }

    fn endpoint(&self, platform: PlatformId, leaf: &str) -> Result<Url> {
        self.base
            .join(&format!("oauth/{}/{leaf}", platform.as_str()))
            .map_err(|e| Error::invalid_url(e.to_string()))
    }

    async fn read_error_body(response: reqwest::Response) -> String {
        let fallback = "request failed".to_string();
        match response.json::<ErrorBody>().await {
            Ok(body) if !body.error.is_empty() => body.error,
            _ => fallback,
        }
    }
}

impl ConnectionClient for HttpConnectionClient {
    async fn authorization_url(&self, platform: PlatformId) -> Result<AuthorizationUrl> {
        let url = self.endpoint(platform, "url")?;
        debug!(%platform, %url, "requesting authorization URL");

        let response = self
            .http
            .post(url)
            .send()
            .await
            .map_err(|e| Error::network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = Self::read_error_body(response).await;
            return Err(classify_url_failure(platform, status, message));
        }

        response
            .json::<AuthorizationUrl>()
            .await
            .map_err(|e| Error::network(e.to_string()))
    }

    async fn exchange_code(&self, request: ExchangeRequest) -> Result<PlatformConnection> {
        let url = self.endpoint(request.platform, "callback")?;
        debug!(platform = %request.platform, "exchanging authorization code");

        let response = self
            .http
            .post(url)
            .json(&CallbackRequest {
                code: &request.code,
                state: &request.state,
            })
            .send()
            .await
            .map_err(|e| Error::network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = Self::read_error_body(response).await;
            return Err(classify_exchange_failure(request.platform, status, message));
        }

        let body = response
            .json::<ExchangeResponse>()
            .await
            .map_err(|e| Error::network(e.to_string()))?;
        Ok(body.connection)
    }
}

/// Map a failed authorization-URL response onto the error taxonomy.
fn classify_url_failure(platform: PlatformId, status: reqwest::StatusCode, message: String) -> Error {
    use reqwest::StatusCode;
    match status {
        StatusCode::NOT_FOUND | StatusCode::UNPROCESSABLE_ENTITY => {
            Error::unsupported_platform(platform.as_str())
        }
        _ => Error::network(format!("{status}: {message}")),
    }
}

/// Map a failed exchange response onto the error taxonomy.
fn classify_exchange_failure(
    platform: PlatformId,
    status: reqwest::StatusCode,
    message: String,
) -> Error {
    use reqwest::StatusCode;
    match status {
        StatusCode::CONFLICT => Error::AlreadyConnected { platform },
        StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED => Error::invalid_grant(message),
        StatusCode::NOT_FOUND | StatusCode::UNPROCESSABLE_ENTITY => {
            Error::unsupported_platform(platform.as_str())
        }
        _ => Error::network(format!("{status}: {message}")),
    }
}
