//! Session token issuance and validation.
//!
//! Tokens are HMAC-signed JWTs carrying the phone number (`sub`) and the
//! session id assigned at OTP verification. Validation is stateless.

use std::str::FromStr;

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use tracing::debug;
use travela_types::auth::{SessionIdentity, TokenClaims};
use travela_types::error::AuthError;

pub struct AuthService {
    algorithm: Algorithm,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl AuthService {
    /// Build the service from a shared secret and an HMAC algorithm name
    /// (`HS256`, `HS384` or `HS512`).
    pub fn new(secret: &str, algorithm: &str, ttl: Duration) -> Result<Self, AuthError> {
        let algorithm = Algorithm::from_str(algorithm.trim())
            .map_err(|_| AuthError::UnsupportedAlgorithm(algorithm.to_string()))?;
        if !matches!(
            algorithm,
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512
        ) {
            return Err(AuthError::UnsupportedAlgorithm(format!("{algorithm:?}")));
        }

        Ok(Self {
            algorithm,
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        })
    }

    /// Token lifetime.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn issue_token(&self, phone: &str, session_id: &str) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = TokenClaims {
            sub: phone.to_string(),
            session_id: session_id.to_string(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        encode(&Header::new(self.algorithm), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Signing(e.to_string()))
    }

    /// Verify signature and expiry and return the identity the token carries.
    pub fn resolve_token(&self, token: &str) -> Result<SessionIdentity, AuthError> {
        let mut validation = Validation::new(self.algorithm);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let data = decode::<TokenClaims>(token, &self.decoding_key, &validation).map_err(|e| {
            debug!(error = %e, "Token rejected");
            AuthError::InvalidToken
        })?;

        if data.claims.sub.is_empty() {
            return Err(AuthError::InvalidToken);
        }
        Ok(data.claims.into())
    }
}
