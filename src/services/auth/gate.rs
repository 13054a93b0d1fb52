use std::sync::Arc;

use axum::http::{HeaderMap, HeaderValue, header};
use tracing::{debug, info, warn};

use crate::config::{ConfigError, ConfigFaults, GateConfig};
use crate::error::GateRejection;
use crate::services::auth::mode::{AuthMethod, AuthMode, is_placeholder};
use crate::services::auth::offline::OfflineVerifier;
use crate::services::auth::online::{IdentityEndpoint, OnlineVerifier};

/// Outcome of a request that passed the gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Admission {
    pub method: AuthMethod,
    // Only the offline strategy knows who the caller is.
    pub username: Option<String>,
}

enum Policy {
    PassThrough,
    Offline(OfflineVerifier),
    Online(OnlineVerifier),
    // Configuration fault reported on every request (per-request fault mode).
    Fault(GateRejection),
}

/// Request gate built once from a [`GateConfig`].
///
/// Immutable after construction; share it behind an `Arc`.
pub struct AuthGate {
    policy: Policy,
}

impl std::fmt::Debug for AuthGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthGate")
            .field("mode", &self.mode_name())
            .finish()
    }
}

impl AuthGate {
    pub fn from_json(payload: &str) -> Result<Self, ConfigError> {
        Self::from_config(&GateConfig::from_json(payload)?)
    }

    /// Select the strategy once.
    ///
    /// Semantic faults (unknown `authLevel`, unusable key or endpoint) fail
    /// construction unless `configFaults` is `perRequest`, in which case the
    /// gate rejects every request instead.
    pub fn from_config(config: &GateConfig) -> Result<Self, ConfigError> {
        let gate = match build_policy(config) {
            Ok(policy) => Self { policy },
            Err(err) => match (config.config_faults, deferred_rejection(&err)) {
                (ConfigFaults::PerRequest, Some(rejection)) => {
                    warn!(error = %err, "gate misconfigured; rejecting every request");
                    Self {
                        policy: Policy::Fault(rejection),
                    }
                }
                _ => return Err(err),
            },
        };

        info!(mode = gate.mode_name(), "auth gate ready");
        Ok(gate)
    }

    pub fn disabled() -> Self {
        Self {
            policy: Policy::PassThrough,
        }
    }

    pub fn offline(verifier: OfflineVerifier) -> Self {
        Self {
            policy: Policy::Offline(verifier),
        }
    }

    pub fn online(verifier: OnlineVerifier) -> Self {
        Self {
            policy: Policy::Online(verifier),
        }
    }

    pub fn with_identity_endpoint(endpoint: Arc<dyn IdentityEndpoint>) -> Self {
        Self::online(OnlineVerifier::new(endpoint))
    }

    pub fn mode_name(&self) -> &'static str {
        match &self.policy {
            Policy::PassThrough => AuthMethod::Disabled.as_str(),
            Policy::Offline(_) => AuthMethod::OfflineSignature.as_str(),
            Policy::Online(_) => AuthMethod::OnlineEndpoint.as_str(),
            Policy::Fault(_) => "misconfigured",
        }
    }

    /// Decide one request. Every branch returns as soon as the outcome is
    /// known; the caller responds or calls the next handler exactly once.
    pub async fn evaluate(&self, headers: &HeaderMap) -> Result<Admission, GateRejection> {
        match &self.policy {
            Policy::PassThrough => Ok(Admission {
                method: AuthMethod::Disabled,
                username: None,
            }),
            Policy::Fault(rejection) => Err(*rejection),
            Policy::Offline(verifier) => {
                let token = bearer_token(authorization(headers)?)?;

                let identity = verifier.verify_identity(token).map_err(|err| {
                    warn!(error = %err, "access token verification failed");
                    GateRejection::Unauthorized
                })?;

                debug!(
                    username = %identity.username,
                    expires_at = identity.expires_at,
                    "admitted by offline signature"
                );
                Ok(Admission {
                    method: AuthMethod::OfflineSignature,
                    username: Some(identity.username),
                })
            }
            Policy::Online(verifier) => {
                let authorization = authorization(headers)?;

                verifier.verify(authorization).await.map_err(|err| {
                    warn!(
                        error = %err,
                        endpoint = verifier.endpoint_url(),
                        "identity endpoint verification failed"
                    );
                    GateRejection::Unauthorized
                })?;

                debug!("admitted by identity endpoint");
                Ok(Admission {
                    method: AuthMethod::OnlineEndpoint,
                    username: None,
                })
            }
        }
    }
}

fn build_policy(config: &GateConfig) -> Result<Policy, ConfigError> {
    match AuthMode::resolve(config)? {
        AuthMode::Disabled => Ok(Policy::PassThrough),
        AuthMode::OfflineSignature { public_key } => {
            Ok(Policy::Offline(OfflineVerifier::new(&public_key, config)?))
        }
        AuthMode::OnlineEndpoint { endpoint } => {
            Ok(Policy::Online(OnlineVerifier::from_config(&endpoint, config)?))
        }
    }
}

// Legacy responses for faults that may be deferred to request time.
fn deferred_rejection(err: &ConfigError) -> Option<GateRejection> {
    match err {
        ConfigError::UnknownAuthLevel(_) => Some(GateRejection::Internal),
        ConfigError::MissingPublicKey
        | ConfigError::InvalidPublicKey(_)
        | ConfigError::MissingEndpoint
        | ConfigError::InvalidEndpoint(_) => Some(GateRejection::InvalidConfiguration),
        _ => None,
    }
}

// Absent and empty headers are treated alike.
fn authorization(headers: &HeaderMap) -> Result<&HeaderValue, GateRejection> {
    headers
        .get(header::AUTHORIZATION)
        .filter(|value| !value.is_empty())
        .ok_or(GateRejection::BadRequest)
}

/// Second space-separated element of `<scheme> <token>`. The scheme itself is
/// not checked.
fn bearer_token(value: &HeaderValue) -> Result<&str, GateRejection> {
    let value = value.to_str().map_err(|_| GateRejection::BadRequest)?;

    match value.split(' ').nth(1) {
        Some(token) if !is_placeholder(token) => Ok(token),
        _ => Err(GateRejection::BadRequest),
    }
}
