//! ScafPy: convert runnable Python examples embedded in instructional
//! markdown into scaffolded exercises.
//!
//! The engine is a sequential pipeline over fenced code fragments:
//! structural analysis on the ruff AST, pattern-specific conversion,
//! tier-banded hint generation, weighted quality verification, and a
//! guarded per-unit progress state machine, orchestrated batch-wide with
//! per-unit failure isolation. Documents are rebuilt byte-for-byte
//! outside the replaced fragments.

use std::sync::atomic::AtomicBool;

pub mod analyzer;
pub mod batch;
pub mod cli;
pub mod commands;
pub mod config;
pub mod constants;
pub mod convert;
pub mod document;
pub mod hints;
pub mod output;
pub mod progress;
pub mod unit;
pub mod utils;
pub mod verify;

/// Global cancellation flag, set by the binary's Ctrl-C handler and
/// polled between units by the batch runner.
pub static CANCELLED: AtomicBool = AtomicBool::new(false);
