//! Observability for Talentchat: tracing subscriber setup and optional
//! OpenTelemetry export.

pub mod tracing_setup;
