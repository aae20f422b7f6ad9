//! # BDM - concept similarity over class hierarchies
//!
//! BDM scores every pair of concepts in a multiple-inheritance hierarchy with a
//! value in `[0, 1]`, based on how much of their root paths they share, how deep
//! each one sits below the shared ancestor and how bushy the hierarchy is
//! around them. This crate re-exports the workspace members and ships the
//! `bdm_report` tool.
//!
//! ## Quick Start
//!
//! ```toml
//! [dependencies]
//! bdm = "0.1"  # Default: parallel scoring
//! ```
//!
//! ## Feature Flags
//!
//! - **`parallel`** (default): score keys on the rayon pool
//! - **`file-logging`**: per-run log files for the report tool
//!
//! ## Usage
//!
//! ```rust
//! use bdm::prelude::*;
//!
//! let mut graph = ConceptGraph::new("animals");
//! graph.add_concept("Root", &[])?;
//! graph.add_concept("Animal", &["Root"])?;
//! graph.add_concept("Plant", &["Root"])?;
//! graph.add_concept("Dog", &["Animal"])?;
//!
//! let mut report = Vec::new();
//! let scores = BdmCalculator::default()
//!     .compute_with_report(Some(&graph), &mut report)?;
//!
//! assert_eq!(scores.len(), 10);
//! assert_eq!(scores.score(&"Dog".to_string(), &"Dog".to_string()), Some(1.0));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  Foundation: bdm-config, bdm-observability              │
//! │  (TOML config + overrides, tracing setup)               │
//! └─────────────────────────────────────────────────────────┘
//!                         ↓
//! ┌─────────────────────────────────────────────────────────┐
//! │  Algorithms: bdm-engine                                 │
//! │  (paths, leaf/branch tables, pair scoring, report)      │
//! └─────────────────────────────────────────────────────────┘
//!                         ↓
//! ┌─────────────────────────────────────────────────────────┐
//! │  Tools: bdm_report                                      │
//! │  (JSON hierarchy in, text report out)                   │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## License
//!
//! Apache-2.0

// Re-export algorithms
pub use bdm_engine as engine;

// Re-export foundation
pub use bdm_config as config;
pub use bdm_observability as observability;

/// Prelude - commonly used types and traits
pub mod prelude {
    pub use crate::config::{load_config, validate_config, BdmConfig};
    pub use crate::engine::{
        compute_bdm, BdmCalculator, BdmError, BdmResult, CancellationToken, ConceptGraph,
        ConceptHierarchy, ConceptId, ReportWriter, RunError, ScoreRecord, ScoreSet,
        ScoringOptions,
    };
}
