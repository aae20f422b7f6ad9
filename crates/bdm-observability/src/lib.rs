// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # bdm-observability
//!
//! Logging setup shared by the BDM crates and tools, with per-crate debug
//! flag support.
//!
//! ## Features
//! - `file-logging`: per-run log folders written through `tracing-appender`

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod cli;
pub mod init;

pub use cli::*;
pub use init::*;

/// Tracing targets used across the workspace, addressable by debug flags
pub const KNOWN_CRATES: &[&str] = &["bdm-engine", "bdm-report"];
