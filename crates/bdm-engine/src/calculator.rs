// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
BdmCalculator - runs the whole pipeline for one hierarchy snapshot.

1. Index concepts
2. Enumerate root paths
3. Build branch and leaf statistics
4. Score every unordered pair
5. Optionally write the report

All tables are complete before the first pair is scored.
*/

use std::fmt;
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use bdm_config::BdmConfig;
use tracing::{debug, info};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::aggregates::{BranchStats, LeafStats};
use crate::hierarchy::ConceptHierarchy;
use crate::index::ConceptIndex;
use crate::paths::PathSet;
use crate::report::ReportWriter;
use crate::scoring::{PairScorer, ScoreRecord, ScoreSet};
use crate::types::{BdmError, BdmResult, ConceptId};

/// Cooperative cancellation flag, checked once per key concept
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

/// Tunables of one computation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoringOptions {
    /// Score keys on the rayon pool (requires the `parallel` feature)
    pub parallel: bool,
    pub max_paths_per_concept: Option<usize>,
    pub report_precision: usize,
}

impl Default for ScoringOptions {
    fn default() -> Self {
        Self::from(&BdmConfig::default())
    }
}

impl From<&BdmConfig> for ScoringOptions {
    fn from(config: &BdmConfig) -> Self {
        Self {
            parallel: config.engine.parallel,
            max_paths_per_concept: config.engine.max_paths_per_concept,
            report_precision: config.report.precision,
        }
    }
}

/// Failure of [`BdmCalculator::compute_with_report`]
///
/// A report failure still hands back the computed scores.
pub enum RunError<C> {
    Compute(BdmError),
    Report { scores: ScoreSet<C>, source: BdmError },
}

impl<C> RunError<C> {
    pub fn error(&self) -> &BdmError {
        match self {
            RunError::Compute(err) => err,
            RunError::Report { source, .. } => source,
        }
    }

    /// Scores that were computed before the failure, if any
    pub fn into_scores(self) -> Option<ScoreSet<C>> {
        match self {
            RunError::Compute(_) => None,
            RunError::Report { scores, .. } => Some(scores),
        }
    }
}

impl<C> fmt::Debug for RunError<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunError::Compute(err) => f.debug_tuple("Compute").field(err).finish(),
            RunError::Report { scores, source } => f
                .debug_struct("Report")
                .field("records", &scores.len())
                .field("source", source)
                .finish(),
        }
    }
}

impl<C> fmt::Display for RunError<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunError::Compute(err) => write!(f, "BDM computation failed: {}", err),
            RunError::Report { scores, source } => write!(
                f,
                "BDM report failed after computing {} scores: {}",
                scores.len(),
                source
            ),
        }
    }
}

impl<C> std::error::Error for RunError<C> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.error())
    }
}

impl<C> From<BdmError> for RunError<C> {
    fn from(err: BdmError) -> Self {
        RunError::Compute(err)
    }
}

/// Computes BDM scores for every pair of concepts of a hierarchy
#[derive(Debug, Clone, Default)]
pub struct BdmCalculator {
    options: ScoringOptions,
    cancellation: CancellationToken,
}

impl BdmCalculator {
    pub fn new(options: ScoringOptions) -> Self {
        Self {
            options,
            cancellation: CancellationToken::new(),
        }
    }

    pub fn from_config(config: &BdmConfig) -> Self {
        Self::new(ScoringOptions::from(config))
    }

    /// Use an externally owned cancellation token
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    pub fn options(&self) -> &ScoringOptions {
        &self.options
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancellation
    }

    /// Compute the score set of `hierarchy`
    ///
    /// # Errors
    ///
    /// - `InvalidInput` if no hierarchy is given
    /// - `CyclicHierarchy` / `PathLimitExceeded` from path enumeration
    /// - `Cancelled` if the token fires during scoring
    pub fn compute<H: ConceptHierarchy>(&self, hierarchy: Option<&H>) -> BdmResult<ScoreSet<H::Concept>> {
        let hierarchy = hierarchy.ok_or_else(|| {
            BdmError::InvalidInput("No hierarchy provided for BDM computation".to_string())
        })?;
        let started = Instant::now();
        let hierarchy_name = hierarchy.hierarchy_name();

        let index = ConceptIndex::build(hierarchy);
        info!(target: "bdm-engine", "Computing BDM scores for {} ({} concepts)", hierarchy_name, index.len());

        let top_classes = hierarchy.top_concepts().len();
        if top_classes > 1 {
            debug!(target: "bdm-engine", "Hierarchy {} has {} top classes", hierarchy_name, top_classes);
        }

        let paths = PathSet::enumerate(hierarchy, &index, self.options.max_paths_per_concept)?;
        let branches = BranchStats::compute(hierarchy, &index);
        let leaves = LeafStats::compute(&paths, &branches);
        debug!(target: "bdm-engine",
            "n0={:.4} over {} leaf paths, average branching={:.4}",
            leaves.n0(), leaves.leaf_path_count(), branches.average());

        let scorer = PairScorer::new(&paths, &leaves, &branches);
        let records = self.score_all(&scorer, index.len())?;

        info!(target: "bdm-engine",
            "Scored {} concept pairs over {} paths in {:?}",
            records.len(), paths.total_paths(), started.elapsed());

        Ok(ScoreSet::new(
            hierarchy_name,
            index,
            records,
            leaves.n0(),
            branches.average(),
        ))
    }

    /// Compute the score set and write its report to `sink`
    ///
    /// Nothing is written if the computation fails. If writing fails the
    /// computed scores are returned inside [`RunError::Report`].
    pub fn compute_with_report<H, W>(
        &self,
        hierarchy: Option<&H>,
        sink: &mut W,
    ) -> Result<ScoreSet<H::Concept>, RunError<H::Concept>>
    where
        H: ConceptHierarchy,
        W: Write + ?Sized,
    {
        let scores = self.compute(hierarchy)?;
        let writer = ReportWriter::new(self.options.report_precision);

        match writer.write_report(&scores, sink) {
            Ok(()) => Ok(scores),
            Err(source) => Err(RunError::Report { scores, source }),
        }
    }

    /// Records of one key against every response id up to itself
    fn score_row(&self, scorer: &PairScorer<'_>, key: ConceptId) -> BdmResult<Vec<ScoreRecord>> {
        if self.cancellation.is_cancelled() {
            return Err(BdmError::Cancelled);
        }
        Ok((0..=key.index())
            .map(|r| scorer.score_pair(key, ConceptId::from_index(r)))
            .collect())
    }

    fn score_all(&self, scorer: &PairScorer<'_>, concepts: usize) -> BdmResult<Vec<ScoreRecord>> {
        #[cfg(feature = "parallel")]
        if self.options.parallel {
            let rows = (0..concepts)
                .into_par_iter()
                .map(|k| self.score_row(scorer, ConceptId::from_index(k)))
                .collect::<BdmResult<Vec<_>>>()?;
            return Ok(rows.into_iter().flatten().collect());
        }

        let mut records = Vec::with_capacity(concepts * (concepts + 1) / 2);
        for k in 0..concepts {
            records.extend(self.score_row(scorer, ConceptId::from_index(k))?);
        }
        Ok(records)
    }
}

/// Compute scores with default options, writing the report to `output` if given
///
/// Without an output the report is discarded through [`std::io::sink`].
pub fn compute_bdm<H: ConceptHierarchy>(
    hierarchy: Option<&H>,
    output: Option<&mut dyn Write>,
) -> Result<ScoreSet<H::Concept>, RunError<H::Concept>> {
    let calculator = BdmCalculator::default();
    match output {
        Some(sink) => calculator.compute_with_report(hierarchy, sink),
        None => calculator.compute_with_report(hierarchy, &mut std::io::sink()),
    }
}
