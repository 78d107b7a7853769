//! Testing utilities for model pipelines.
//!
//! This module provides:
//! - Scripted and echoing transports that never touch the network
//! - Well-formed reply bodies for each model family

mod fixtures;
mod mocks;

pub use fixtures::{claude_reply, nova_reply, reply_for, titan_reply};
pub use mocks::{EchoTransport, RecordedCall, ScriptedTransport};
