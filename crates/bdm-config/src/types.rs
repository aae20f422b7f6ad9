// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration type definitions
//!
//! This module defines all configuration structs that map to sections in
//! `bdm_configuration.toml`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct BdmConfig {
    pub engine: EngineConfig,
    pub report: ReportConfig,
    pub logging: LoggingConfig,
}

/// Scoring engine configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Score keys in parallel (only honored when built with the `parallel` feature)
    pub parallel: bool,
    /// Upper bound on root-to-concept paths for a single concept (None = unlimited)
    pub max_paths_per_concept: Option<usize>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            parallel: false,
            max_paths_per_concept: None,
        }
    }
}

/// Report output configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Destination file; standard output when unset
    pub output_path: Option<PathBuf>,
    /// Decimal places for scores and normalizers
    pub precision: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_path: None,
            precision: 4,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Write per-run log files in addition to the console
    pub file_logging: bool,
    pub log_dir: PathBuf,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file_logging: false,
            log_dir: PathBuf::from("./logs"),
        }
    }
}

impl LoggingConfig {
    /// Levels accepted by `tracing-subscriber`'s `EnvFilter`
    pub const VALID_LEVELS: &'static [&'static str] = &["trace", "debug", "info", "warn", "error"];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: BdmConfig = toml::from_str("[engine]\nparallel = true\n").unwrap();
        assert!(config.engine.parallel);
        assert_eq!(config.engine.max_paths_per_concept, None);
        assert_eq!(config.report, ReportConfig::default());
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_json_roundtrip_of_defaults() {
        let config = BdmConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: BdmConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
    }
}
