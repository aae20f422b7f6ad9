// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
BDM Report Tool

Scores every pair of concepts of a hierarchy stored as JSON and writes the
text report.

Usage:
  cargo run --bin bdm_report -- <hierarchy.json> [options]

Options:
  --output <path>        Write the report to a file instead of stdout
  --config <path>        Configuration file (default: discovered bdm_configuration.toml)
  --precision <digits>   Decimal places of reals in the report
  --max-paths <n>        Abort if a concept has more root paths (0 = unlimited)
  --parallel             Score on all cores
  --log-level <level>    trace, debug, info, warn or error
  --debug-<crate>        Debug logging for one crate (see --help)

Example:
  cargo run --bin bdm_report -- animals.json --output animals_bdm.txt --debug-bdm-engine

Copyright 2025 Neuraville Inc.
Licensed under the Apache License, Version 2.0
*/

use std::collections::HashMap;
use std::env;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use bdm::config::{load_config, validate_config, LoggingConfig};
use bdm::engine::{BdmCalculator, ConceptGraph, RunError, ScoreSet};
use bdm::observability::{
    debug_flags_help, init_console_logging, parse_debug_flags, CrateDebugFlags, LoggingGuard,
};
use tracing::{error, info};

struct Arguments {
    hierarchy_path: PathBuf,
    config_path: Option<PathBuf>,
    overrides: HashMap<String, String>,
}

fn print_usage(program: &str) {
    eprintln!("Usage: {} <hierarchy.json> [options]", program);
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --output <path>        Write the report to a file instead of stdout");
    eprintln!("  --config <path>        Configuration file");
    eprintln!("  --precision <digits>   Decimal places of reals in the report");
    eprintln!("  --max-paths <n>        Abort if a concept has more root paths (0 = unlimited)");
    eprintln!("  --parallel             Score on all cores");
    eprintln!("  --log-level <level>    trace, debug, info, warn or error");
    eprintln!();
    eprintln!("{}", debug_flags_help());
}

fn parse_arguments(args: &[String]) -> Result<Arguments, String> {
    let mut hierarchy_path = None;
    let mut config_path = None;
    let mut overrides = HashMap::new();

    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        let mut value_of = |flag: &str| {
            iter.next()
                .cloned()
                .ok_or_else(|| format!("Missing value for {}", flag))
        };

        match arg.as_str() {
            "--output" => {
                overrides.insert("output".to_string(), value_of("--output")?);
            }
            "--config" => {
                config_path = Some(PathBuf::from(value_of("--config")?));
            }
            "--precision" => {
                overrides.insert("precision".to_string(), value_of("--precision")?);
            }
            "--max-paths" => {
                overrides.insert("max_paths_per_concept".to_string(), value_of("--max-paths")?);
            }
            "--log-level" => {
                overrides.insert("log_level".to_string(), value_of("--log-level")?);
            }
            "--parallel" => {
                overrides.insert("parallel".to_string(), "true".to_string());
            }
            // Consumed by parse_debug_flags()
            flag if flag.starts_with("--debug-") => {}
            flag if flag.starts_with("--") => return Err(format!("Unknown option: {}", flag)),
            path => {
                if hierarchy_path.is_some() {
                    return Err(format!("Unexpected argument: {}", path));
                }
                hierarchy_path = Some(PathBuf::from(path));
            }
        }
    }

    Ok(Arguments {
        hierarchy_path: hierarchy_path.ok_or("Missing hierarchy file")?,
        config_path,
        overrides,
    })
}

/// Compute and write the report; the sink is closed before this returns,
/// whether or not writing succeeded
fn write_scores(
    calculator: &BdmCalculator,
    graph: &ConceptGraph,
    mut output: Box<dyn Write>,
) -> Result<ScoreSet<String>, RunError<String>> {
    let result = calculator.compute_with_report(Some(graph), &mut output);
    drop(output);
    result
}

fn open_output(path: Option<&Path>) -> io::Result<Box<dyn Write>> {
    match path {
        Some(path) => Ok(Box::new(BufWriter::new(File::create(path)?))),
        None => Ok(Box::new(BufWriter::new(io::stdout().lock()))),
    }
}

/// Console logging, plus a per-run log file when `logging.file_logging` is set
#[cfg(feature = "file-logging")]
fn init_tool_logging(
    debug_flags: &CrateDebugFlags,
    logging: &LoggingConfig,
) -> Result<LoggingGuard, Box<dyn std::error::Error>> {
    if !logging.file_logging {
        return Ok(init_console_logging(debug_flags, &logging.level)?);
    }

    let guard = bdm::observability::init_logging(debug_flags, &logging.level, &logging.log_dir)?;
    if let Some(run_folder) = guard.log_dir() {
        info!(target: "bdm-report", "Logging to {}", run_folder.display());
    }
    Ok(guard)
}

#[cfg(not(feature = "file-logging"))]
fn init_tool_logging(
    debug_flags: &CrateDebugFlags,
    logging: &LoggingConfig,
) -> Result<LoggingGuard, Box<dyn std::error::Error>> {
    let guard = init_console_logging(debug_flags, &logging.level)?;
    if logging.file_logging {
        tracing::warn!(target: "bdm-report",
            "logging.file_logging is set but bdm_report was built without the file-logging feature, logging to the console only");
    }
    Ok(guard)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("bdm_report");

    if args.iter().any(|arg| arg == "--help" || arg == "-h") {
        print_usage(program);
        return Ok(());
    }

    let arguments = match parse_arguments(&args) {
        Ok(arguments) => arguments,
        Err(message) => {
            eprintln!("Error: {}", message);
            eprintln!();
            print_usage(program);
            std::process::exit(1);
        }
    };

    let config = load_config(arguments.config_path.as_deref(), Some(&arguments.overrides))?;
    validate_config(&config)?;

    let _logging = init_tool_logging(&parse_debug_flags(), &config.logging)?;

    if !arguments.hierarchy_path.exists() {
        let message = format!("Hierarchy file '{}' not found", arguments.hierarchy_path.display());
        error!(target: "bdm-report", "{}", message);
        return Err(message.into());
    }

    let json = fs::read_to_string(&arguments.hierarchy_path)?;
    let graph = ConceptGraph::from_json(&json)?;
    info!(target: "bdm-report",
        "Loaded hierarchy '{}' with {} concepts from {}",
        graph.name(), graph.concept_count(), arguments.hierarchy_path.display());

    let output = open_output(config.report.output_path.as_deref())?;
    let calculator = BdmCalculator::from_config(&config);

    match write_scores(&calculator, &graph, output) {
        Ok(scores) => {
            info!(target: "bdm-report",
                "Wrote {} scores (n0={:.4}, average branching={:.4})",
                scores.len(), scores.n0(), scores.average_branching());
            if let Some(path) = &config.report.output_path {
                info!(target: "bdm-report", "Report saved to {}", path.display());
            }
            Ok(())
        }
        Err(err) => {
            if let RunError::Report { scores, .. } = &err {
                error!(target: "bdm-report", "Report incomplete, {} scores were computed", scores.len());
            }
            Err(err.into())
        }
    }
}
