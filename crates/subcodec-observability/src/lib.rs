//! # subcodec-observability
//!
//! Structured logging for SubCodec binaries and services.
//!
//! Library crates only emit `tracing` events; this crate installs the
//! subscriber. Log levels are configurable per component, and output can be
//! plain text or JSON (ELK, Loki, CloudWatch).

pub mod tracing_setup;

pub use tracing_setup::{build_directives, init_tracing, try_init_tracing, LogConfig};
