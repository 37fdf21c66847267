//! Observability setup for the Travela API: structured logging through
//! `tracing-subscriber` and optional OpenTelemetry trace export.

pub mod tracing_setup;
