//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, timestamps, errors)
//! - `tooling` - Tool prompts, selection parsing, prompt composition, mode
//!   selection, and the streaming marker scanner. Pure logic, no I/O.

pub mod foundation;
pub mod tooling;
