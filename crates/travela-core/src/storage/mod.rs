//! Ephemeral keyed storage with expiry.
//!
//! Implementations live in travela-infra.

pub mod otp_store;
