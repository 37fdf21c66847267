use serde::{Deserialize, Serialize};

/// Claims embedded in a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject: the user's normalized phone number.
    pub sub: String,
    /// Session identifier assigned at OTP verification.
    pub session_id: String,
    /// Issued at (unix seconds).
    pub iat: i64,
    /// Expiry (unix seconds).
    pub exp: i64,
}

/// The identity carried by a valid session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionIdentity {
    pub phone: String,
    pub session_id: String,
}

impl From<TokenClaims> for SessionIdentity {
    fn from(claims: TokenClaims) -> Self {
        Self {
            phone: claims.sub,
            session_id: claims.session_id,
        }
    }
}
