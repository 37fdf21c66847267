use thiserror::Error;

/// Errors from the OTP request/verify lifecycle.
#[derive(Debug, Error)]
pub enum OtpError {
    #[error("too many OTP requests; at most {max_attempts} allowed per window")]
    RateLimited { max_attempts: u32 },

    #[error("failed to send OTP: {0}")]
    DeliveryFailed(String),

    #[error("invalid OTP")]
    InvalidOtp,

    #[error("user with phone {0} not found")]
    UserNotFound(String),

    #[error("invalid phone number: {0}")]
    InvalidPhone(String),

    #[error(transparent)]
    Storage(#[from] RepositoryError),
}

/// Errors from session token handling.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid token")]
    InvalidToken,

    #[error("unsupported signing algorithm: '{0}'")]
    UnsupportedAlgorithm(String),

    #[error("token signing failed: {0}")]
    Signing(String),
}

/// Errors related to conversation operations.
#[derive(Debug, Error)]
pub enum ConversationError {
    #[error("conversation not found")]
    NotFound,

    #[error("no conversations found")]
    NoConversations,

    #[error("invalid title: {0}")]
    InvalidTitle(String),

    #[error(transparent)]
    Storage(#[from] RepositoryError),
}

/// Errors from the hosted agent provider.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("provider error: {message}")]
    Provider { message: String },

    #[error("deserialization error: {0}")]
    Deserialization(String),

    #[error("rate limited by provider")]
    RateLimited,

    #[error("authentication failed")]
    AuthenticationFailed,

    #[error("agent produced no response")]
    NoResponse,
}

/// Errors from an SMS delivery attempt.
#[derive(Debug, Error)]
pub enum SmsError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("gateway returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("delivery status '{0}'")]
    Rejected(String),

    #[error("unexpected gateway response: {0}")]
    Malformed(String),
}

/// Errors from repository operations (used by trait definitions in travela-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),
}

/// Errors loading the settings file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {message}")]
    Parse { path: String, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_otp_error_display() {
        let err = OtpError::RateLimited { max_attempts: 3 };
        assert_eq!(
            err.to_string(),
            "too many OTP requests; at most 3 allowed per window"
        );
        assert_eq!(OtpError::InvalidOtp.to_string(), "invalid OTP");
    }

    #[test]
    fn test_storage_error_is_transparent() {
        let err: ConversationError = RepositoryError::Query("syntax error".to_string()).into();
        assert_eq!(err.to_string(), "query error: syntax error");
    }

    #[test]
    fn test_sms_error_display() {
        let err = SmsError::Http {
            status: 401,
            body: "bad key".to_string(),
        };
        assert!(err.to_string().contains("401"));
        assert!(err.to_string().contains("bad key"));
    }
}
