//! Configuration validation
//!
//! Ensures configuration values are within valid ranges before a run starts.

use crate::{BdmConfig, ConfigError, ConfigResult, LoggingConfig};

/// Largest number of decimal places the report writer accepts
pub const MAX_REPORT_PRECISION: usize = 9;

/// Validation errors that can occur during config validation
#[derive(Debug, Clone)]
pub enum ConfigValidationError {
    MissingRequired { field: String },
    InvalidValue { field: String, reason: String },
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingRequired { field } => {
                write!(f, "Missing required configuration: {}", field)
            }
            Self::InvalidValue { field, reason } => {
                write!(f, "Invalid configuration value for {}: {}", field, reason)
            }
        }
    }
}

/// Validate the complete configuration
///
/// All problems are collected and reported together.
///
/// # Errors
///
/// Returns `ConfigError::ValidationError` with details if validation fails
pub fn validate_config(config: &BdmConfig) -> ConfigResult<()> {
    let mut errors = Vec::new();

    validate_engine(config, &mut errors);
    validate_report(config, &mut errors);
    validate_logging(config, &mut errors);

    if !errors.is_empty() {
        let error_messages = errors
            .iter()
            .map(|e| format!("  - {}", e))
            .collect::<Vec<_>>()
            .join("\n");

        return Err(ConfigError::ValidationError(format!(
            "Configuration validation failed:\n{}",
            error_messages
        )));
    }

    Ok(())
}

fn validate_engine(config: &BdmConfig, errors: &mut Vec<ConfigValidationError>) {
    if config.engine.max_paths_per_concept == Some(0) {
        errors.push(ConfigValidationError::InvalidValue {
            field: "engine.max_paths_per_concept".to_string(),
            reason: "must be positive (omit it for no limit)".to_string(),
        });
    }
}

fn validate_report(config: &BdmConfig, errors: &mut Vec<ConfigValidationError>) {
    if config.report.precision > MAX_REPORT_PRECISION {
        errors.push(ConfigValidationError::InvalidValue {
            field: "report.precision".to_string(),
            reason: format!("must be at most {}", MAX_REPORT_PRECISION),
        });
    }

    if let Some(path) = &config.report.output_path {
        if path.as_os_str().is_empty() {
            errors.push(ConfigValidationError::MissingRequired {
                field: "report.output_path".to_string(),
            });
        }
    }
}

fn validate_logging(config: &BdmConfig, errors: &mut Vec<ConfigValidationError>) {
    let level = config.logging.level.to_lowercase();
    if !LoggingConfig::VALID_LEVELS.contains(&level.as_str()) {
        errors.push(ConfigValidationError::InvalidValue {
            field: "logging.level".to_string(),
            reason: format!("must be one of {}", LoggingConfig::VALID_LEVELS.join(", ")),
        });
    }

    if config.logging.file_logging && config.logging.log_dir.as_os_str().is_empty() {
        errors.push(ConfigValidationError::MissingRequired {
            field: "logging.log_dir".to_string(),
        });
    }
}
