//! Toolweave - Tool-invocation orchestration for LLM chat backends.
//!
//! This crate decides, per request, how specialized prompt fragments ("tools")
//! reach a model that has no native tool calling: two-stage gating, full
//! concatenation, or inline markers resolved mid-stream by nested calls.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod telemetry;
