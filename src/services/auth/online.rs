//! Online verification: hand the caller's `Authorization` header to a remote
//! OpenID endpoint and trust its status code.
//!
//! The HTTP call sits behind [`IdentityEndpoint`] so the gate can be exercised
//! without a network. [`HttpIdentityEndpoint`] is the reqwest-backed
//! implementation used in production.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use axum::http::{HeaderValue, StatusCode, header};
use thiserror::Error;
use tracing::warn;
use url::Url;

use crate::config::{ConfigError, GateConfig};
use crate::services::auth::mode::is_placeholder;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Error)]
pub enum EndpointError {
    #[error("identity endpoint request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

#[derive(Debug, Error)]
pub enum OnlineError {
    #[error(transparent)]
    Endpoint(#[from] EndpointError),
    #[error("identity endpoint answered {0}")]
    Rejected(StatusCode),
}

/// A remote party that decides whether an `Authorization` header is valid.
///
/// Implementations must be cheap to share (`Arc<dyn IdentityEndpoint>`).
#[async_trait]
pub trait IdentityEndpoint: Send + Sync + 'static {
    // Endpoint URL (for logging).
    fn url(&self) -> &str;

    // Forward the header and return the endpoint's status code.
    async fn authenticate(&self, authorization: &HeaderValue)
    -> Result<StatusCode, EndpointError>;
}

/// POSTs an empty form with the original `Authorization` header. Redirects are
/// not followed; a 3xx is just another non-200 answer.
#[derive(Debug, Clone)]
pub struct HttpIdentityEndpoint {
    url: Url,
    client: reqwest::Client,
}

impl HttpIdentityEndpoint {
    pub fn new(
        url: Url,
        timeout: Duration,
        insecure_skip_tls_verify: bool,
    ) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::none())
            .danger_accept_invalid_certs(insecure_skip_tls_verify)
            .build()?;

        Ok(Self { url, client })
    }
}

#[async_trait]
impl IdentityEndpoint for HttpIdentityEndpoint {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn authenticate(
        &self,
        authorization: &HeaderValue,
    ) -> Result<StatusCode, EndpointError> {
        let empty_form: [(&str, &str); 0] = [];

        // .form() sets Content-Type: application/x-www-form-urlencoded
        let response = self
            .client
            .post(self.url.clone())
            .header(header::AUTHORIZATION, authorization.clone())
            .form(&empty_form)
            .send()
            .await?;

        Ok(response.status())
    }
}

#[derive(Clone)]
pub struct OnlineVerifier {
    endpoint: Arc<dyn IdentityEndpoint>,
}

impl std::fmt::Debug for OnlineVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnlineVerifier")
            .field("endpoint", &self.endpoint.url())
            .finish()
    }
}

impl OnlineVerifier {
    pub fn new(endpoint: Arc<dyn IdentityEndpoint>) -> Self {
        Self { endpoint }
    }

    /// Build the reqwest-backed verifier. Strict TLS unless
    /// `insecureSkipTlsVerify` is set.
    pub fn from_config(endpoint: &str, config: &GateConfig) -> Result<Self, ConfigError> {
        if is_placeholder(endpoint) {
            return Err(ConfigError::MissingEndpoint);
        }

        let url = Url::parse(endpoint.trim())
            .map_err(|e| ConfigError::InvalidEndpoint(format!("{}: {}", endpoint, e)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidEndpoint(format!(
                "{}: unsupported scheme",
                endpoint
            )));
        }

        if config.insecure_skip_tls_verify {
            warn!(endpoint = %url, "TLS certificate validation disabled for identity endpoint");
        }

        let endpoint = HttpIdentityEndpoint::new(
            url,
            Duration::from_secs(config.endpoint_timeout_seconds),
            config.insecure_skip_tls_verify,
        )?;

        Ok(Self::new(Arc::new(endpoint)))
    }

    pub fn endpoint_url(&self) -> &str {
        self.endpoint.url()
    }

    /// Exactly 200 admits. Any other status, or no status at all, does not.
    pub async fn verify(&self, authorization: &HeaderValue) -> Result<(), OnlineError> {
        let status = self.endpoint.authenticate(authorization).await?;

        if status == StatusCode::OK {
            Ok(())
        } else {
            Err(OnlineError::Rejected(status))
        }
    }
}
