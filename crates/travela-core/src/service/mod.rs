//! Business logic services (use cases).
//!
//! Services orchestrate repository and gateway calls and enforce the
//! business rules. They depend on traits (ports), never on concrete
//! infrastructure implementations.

pub mod auth;
pub mod otp;
