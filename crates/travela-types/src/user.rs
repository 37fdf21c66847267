use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A phone-authenticated user.
///
/// Created on the first OTP request and never deleted. `session_id` is
/// regenerated every time an OTP is verified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Normalized phone number; unique key.
    pub phone: String,
    pub authenticated: bool,
    /// Empty until the first successful verification.
    pub session_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// A fresh, unauthenticated user.
    pub fn new(phone: String) -> Self {
        let now = Utc::now();
        Self {
            phone,
            authenticated: false,
            session_id: String::new(),
            created_at: now,
            updated_at: now,
        }
    }
}
