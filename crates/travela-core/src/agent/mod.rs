//! Hosted agent access.
//!
//! - `AgentProvider`: port for a single request/response exchange with a model
//! - `BoxAgentProvider`: type-erased provider for wiring
//! - `ChatGateway`: per-session context and answer relay

pub mod box_provider;
pub mod gateway;
pub mod provider;
