// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration file loading with override support
//!
//! Three tiers, later tiers win:
//! 1. TOML file (base defaults)
//! 2. Environment variables (runtime overrides)
//! 3. CLI arguments (explicit user overrides)

use crate::{BdmConfig, ConfigError, ConfigResult};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILE_NAME: &str = "bdm_configuration.toml";

/// Find the BDM configuration file
///
/// Search order:
/// 1. `BDM_CONFIG_PATH` environment variable
/// 2. Current working directory: `./bdm_configuration.toml`
/// 3. Up to 5 parent directories
///
/// # Errors
///
/// Returns `ConfigError::FileNotFound` if no config file is found in any location
pub fn find_config_file() -> ConfigResult<PathBuf> {
    if let Ok(env_path) = env::var("BDM_CONFIG_PATH") {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return Ok(path);
        } else {
            return Err(ConfigError::FileNotFound(format!(
                "Config file specified by BDM_CONFIG_PATH not found: {}",
                path.display()
            )));
        }
    }

    let mut search_paths = Vec::new();

    if let Ok(cwd) = env::current_dir() {
        search_paths.push(cwd.join(CONFIG_FILE_NAME));

        let mut current = cwd.clone();
        for _ in 0..5 {
            if let Some(parent) = current.parent() {
                search_paths.push(parent.join(CONFIG_FILE_NAME));
                current = parent.to_path_buf();
            }
        }
    }

    for path in &search_paths {
        if path.exists() {
            return Ok(path.clone());
        }
    }

    let search_list = search_paths
        .iter()
        .map(|p| format!("  - {}", p.display()))
        .collect::<Vec<_>>()
        .join("\n");

    Err(ConfigError::FileNotFound(format!(
        "BDM configuration file '{}' not found in any of these locations:\n{}\n\nSet BDM_CONFIG_PATH environment variable to specify custom location.",
        CONFIG_FILE_NAME, search_list
    )))
}

/// Load configuration from TOML file
///
/// # Arguments
///
/// * `config_path` - Optional path to config file. If `None`, the file is searched for
///   and built-in defaults are used when none exists.
/// * `cli_args` - Optional CLI argument overrides
///
/// # Errors
///
/// Returns error if an explicit config file cannot be read or contains invalid TOML
pub fn load_config(
    config_path: Option<&Path>,
    cli_args: Option<&HashMap<String, String>>,
) -> ConfigResult<BdmConfig> {
    let config_file = match config_path {
        Some(path) => Some(path.to_path_buf()),
        None => match find_config_file() {
            Ok(path) => Some(path),
            // BDM_CONFIG_PATH pointing nowhere is a user error; a missing default file is not
            Err(err) if env::var("BDM_CONFIG_PATH").is_ok() => return Err(err),
            Err(_) => None,
        },
    };

    let mut config = match config_file {
        Some(path) => {
            let content = fs::read_to_string(&path)?;
            toml::from_str(&content)?
        }
        None => BdmConfig::default(),
    };

    apply_environment_overrides(&mut config);

    if let Some(cli) = cli_args {
        apply_cli_overrides(&mut config, cli);
    }

    Ok(config)
}

fn parse_flag(value: &str) -> bool {
    let value = value.to_lowercase();
    value == "true" || value == "1" || value == "yes"
}

/// Apply environment variable overrides to configuration
///
/// Supported environment variables:
/// - `BDM_PARALLEL` -> `engine.parallel`
/// - `BDM_MAX_PATHS_PER_CONCEPT` -> `engine.max_paths_per_concept` (`0` clears the limit)
/// - `BDM_REPORT_OUTPUT` -> `report.output_path`
/// - `BDM_REPORT_PRECISION` -> `report.precision`
/// - `BDM_LOG_LEVEL` -> `logging.level`
pub fn apply_environment_overrides(config: &mut BdmConfig) {
    if let Ok(value) = env::var("BDM_PARALLEL") {
        config.engine.parallel = parse_flag(&value);
    }
    if let Ok(value) = env::var("BDM_MAX_PATHS_PER_CONCEPT") {
        if let Ok(limit) = value.parse::<usize>() {
            config.engine.max_paths_per_concept = (limit > 0).then_some(limit);
        }
    }

    if let Ok(value) = env::var("BDM_REPORT_OUTPUT") {
        config.report.output_path = Some(PathBuf::from(value));
    }
    if let Ok(value) = env::var("BDM_REPORT_PRECISION") {
        if let Ok(precision) = value.parse::<usize>() {
            config.report.precision = precision;
        }
    }

    if let Ok(value) = env::var("BDM_LOG_LEVEL") {
        config.logging.level = value;
    }
}

/// Apply CLI argument overrides to configuration
///
/// # Arguments
///
/// * `config` - Configuration to modify
/// * `cli_args` - Map of CLI arguments (e.g., `{"parallel": "true", "output": "scores.txt"}`)
pub fn apply_cli_overrides(config: &mut BdmConfig, cli_args: &HashMap<String, String>) {
    if let Some(value) = cli_args.get("parallel") {
        config.engine.parallel = parse_flag(value);
    }
    if let Some(value) = cli_args.get("max_paths_per_concept") {
        if let Ok(limit) = value.parse::<usize>() {
            config.engine.max_paths_per_concept = (limit > 0).then_some(limit);
        }
    }

    if let Some(value) = cli_args.get("output") {
        config.report.output_path = Some(PathBuf::from(value));
    }
    if let Some(value) = cli_args.get("precision") {
        if let Ok(precision) = value.parse::<usize>() {
            config.report.precision = precision;
        }
    }

    if let Some(value) = cli_args.get("log_level") {
        config.logging.level = value.clone();
    }
}
