//! Business logic and port trait definitions for the Travela API.
//!
//! This crate defines the "ports" (repository, store, SMS and agent traits)
//! that the infrastructure layer implements, and the services built on
//! them. It depends only on `travela-types` and pure libraries, never on
//! `travela-infra` or any database/IO crate.

pub mod agent;
pub mod chat;
pub mod repository;
pub mod service;
pub mod sms;
pub mod storage;
