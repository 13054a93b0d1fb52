use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use std::fmt;

use crate::config::{ConfigError, GateConfig};
use crate::services::auth::mode::is_placeholder;

const PEM_HEADER: &str = "-----BEGIN PUBLIC KEY-----";
const PEM_FOOTER: &str = "-----END PUBLIC KEY-----";

// Errors returned by offline verification + claim checks.
#[derive(Debug, thiserror::Error)]
pub enum OfflineError {
    #[error("jwt verification failed: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
    #[error("missing or empty '{0}' claim")]
    EmptyClaim(&'static str),
    #[error("token expired at {exp}")]
    Expired { exp: i64 },
}

/// Kind of public key the gate was configured with. It decides which JWT
/// algorithms are accepted; HMAC is never accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyFamily {
    Rsa,
    Ec,
    Ed,
}

impl KeyFamily {
    pub fn algorithms(self) -> Vec<Algorithm> {
        match self {
            KeyFamily::Rsa => vec![
                Algorithm::RS256,
                Algorithm::RS384,
                Algorithm::RS512,
                Algorithm::PS256,
                Algorithm::PS384,
                Algorithm::PS512,
            ],
            KeyFamily::Ec => vec![Algorithm::ES256, Algorithm::ES384],
            KeyFamily::Ed => vec![Algorithm::EdDSA],
        }
    }
}

/// OpenID access token claims the gate looks at.
///
/// NOTE:
/// - `exp` is also enforced by `jsonwebtoken`; it is kept here for the
///   millisecond comparison against the wall clock.
/// - Everything else in the token is ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct OpenIdClaims {
    #[serde(default)]
    pub preferred_username: Option<String>,
    #[serde(default)]
    pub exp: Option<i64>,
    #[serde(default)]
    pub sub: Option<String>,
}

/// Identity extracted from a token that passed every check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedIdentity {
    pub username: String,
    pub subject: Option<String>,
    pub expires_at: i64,
}

/// Verifies bearer JWTs against one statically configured public key.
///
/// - Key material is intentionally not printable via Debug.
#[derive(Clone)]
pub struct OfflineVerifier {
    decoding_key: DecodingKey,
    family: KeyFamily,
    validation: Validation,
    leeway_seconds: u64,
}

impl fmt::Debug for OfflineVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Do not print key material
        f.debug_struct("OfflineVerifier")
            .field("family", &self.family)
            .field("validation", &self.validation)
            .finish()
    }
}

impl OfflineVerifier {
    pub fn new(public_key: &str, config: &GateConfig) -> Result<Self, ConfigError> {
        if is_placeholder(public_key) {
            return Err(ConfigError::MissingPublicKey);
        }

        let pem = wrap_public_key(public_key);
        let (decoding_key, family) = parse_public_key(&pem)?;

        let mut validation = Validation::new(family.algorithms()[0]);
        validation.algorithms = family.algorithms();
        validation.leeway = config.leeway_seconds;
        validation.validate_nbf = true;
        validation.validate_aud = false;

        let mut required = vec!["exp"];
        if let Some(issuer) = config.issuer.as_deref().filter(|v| !is_placeholder(v)) {
            validation.set_issuer(&[issuer]);
            required.push("iss");
        }
        if let Some(audience) = config.audience.as_deref().filter(|v| !is_placeholder(v)) {
            validation.set_audience(&[audience]);
            validation.validate_aud = true;
            required.push("aud");
        }
        validation.set_required_spec_claims(&required);

        Ok(Self {
            decoding_key,
            family,
            validation,
            leeway_seconds: config.leeway_seconds,
        })
    }

    pub fn family(&self) -> KeyFamily {
        self.family
    }

    // Signature, algorithm, exp, nbf (and iss/aud when configured).
    pub fn verify(&self, token: &str) -> Result<OpenIdClaims, jsonwebtoken::errors::Error> {
        let data = jsonwebtoken::decode::<OpenIdClaims>(token, &self.decoding_key, &self.validation)?;

        Ok(data.claims)
    }

    /// Verify, then require a non-empty `preferred_username` and an `exp` that
    /// is not behind the wall clock by more than the configured leeway.
    ///
    /// This is the entry-point used by the gate.
    pub fn verify_identity(&self, token: &str) -> Result<VerifiedIdentity, OfflineError> {
        let claims = self.verify(token)?;
        check_claims(
            claims,
            chrono::Utc::now().timestamp_millis(),
            self.leeway_seconds,
        )
    }
}

fn check_claims(
    claims: OpenIdClaims,
    now_millis: i64,
    leeway_seconds: u64,
) -> Result<VerifiedIdentity, OfflineError> {
    let username = claims
        .preferred_username
        .filter(|name| !name.is_empty())
        .ok_or(OfflineError::EmptyClaim("preferred_username"))?;

    let exp = claims.exp.ok_or(OfflineError::EmptyClaim("exp"))?;
    let leeway_millis = i64::try_from(leeway_seconds)
        .unwrap_or(i64::MAX)
        .saturating_mul(1000);
    let exp_millis = exp.saturating_mul(1000).saturating_add(leeway_millis);
    if exp_millis < now_millis {
        return Err(OfflineError::Expired { exp });
    }

    Ok(VerifiedIdentity {
        username,
        subject: claims.sub,
        expires_at: exp,
    })
}

/// Put raw key material into PEM armor. Keys that already carry armor are
/// kept, with literal `\n` escapes unfolded (as they arrive from env files).
pub fn wrap_public_key(raw: &str) -> String {
    let raw = raw.trim();
    if raw.starts_with("-----BEGIN") {
        return raw.replace("\\n", "\n");
    }

    format!("{}\n{}\n{}", PEM_HEADER, raw, PEM_FOOTER)
}

fn parse_public_key(pem: &str) -> Result<(DecodingKey, KeyFamily), ConfigError> {
    let bytes = pem.as_bytes();

    if let Ok(key) = DecodingKey::from_rsa_pem(bytes) {
        return Ok((key, KeyFamily::Rsa));
    }
    if let Ok(key) = DecodingKey::from_ec_pem(bytes) {
        return Ok((key, KeyFamily::Ec));
    }

    DecodingKey::from_ed_pem(bytes)
        .map(|key| (key, KeyFamily::Ed))
        .map_err(|e| ConfigError::InvalidPublicKey(format!("not an RSA, EC or Ed25519 key: {}", e)))
}
