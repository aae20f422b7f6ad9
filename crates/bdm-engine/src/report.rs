// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Report emitter - writes a [`ScoreSet`] as text.

```text
##The following are the BDM scores for each pair of concepts in the ontology named animals.
key=Dog, response=Animal, bdm=0.4706, msca=Animal, cp=1, dpk=1, dpr=0, n0=1.5000, n1=2.0000, n2=2.0000, bran=0.6667
```
*/

use std::io::Write;

use bdm_config::ReportConfig;
use tracing::debug;

use crate::scoring::{ScoreRecord, ScoreSet};
use crate::types::BdmResult;

/// Marker printed in place of the ancestor of disconnected pairs
pub const NO_ANCESTOR: &str = "none";

/// Text layout settings for score reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportWriter {
    precision: usize,
}

impl Default for ReportWriter {
    fn default() -> Self {
        Self::from_config(&ReportConfig::default())
    }
}

impl ReportWriter {
    pub fn new(precision: usize) -> Self {
        Self { precision }
    }

    pub fn from_config(config: &ReportConfig) -> Self {
        Self::new(config.precision)
    }

    pub fn header(hierarchy_name: &str) -> String {
        format!(
            "##The following are the BDM scores for each pair of concepts in the ontology named {}.",
            hierarchy_name
        )
    }

    /// One report line, without the trailing newline
    pub fn format_record<C>(&self, scores: &ScoreSet<C>, record: &ScoreRecord) -> String {
        let index = scores.index();
        let p = self.precision;
        format!(
            "key={}, response={}, bdm={:.p$}, msca={}, cp={}, dpk={}, dpr={}, n0={:.p$}, n1={:.p$}, n2={:.p$}, bran={:.p$}",
            index.name(record.key),
            index.name(record.response),
            record.score,
            scores.ancestor_name(record).unwrap_or(NO_ANCESTOR),
            record.common_path_edges,
            record.depth_key,
            record.depth_response,
            record.n0,
            record.avg_len_key,
            record.avg_len_response,
            record.branch_factor,
            p = p,
        )
    }

    /// Write the header and every record, then flush the sink
    ///
    /// # Errors
    ///
    /// Returns `SinkWriteFailure` if the sink rejects a write or the flush.
    pub fn write_report<C, W>(&self, scores: &ScoreSet<C>, sink: &mut W) -> BdmResult<()>
    where
        W: Write + ?Sized,
    {
        writeln!(sink, "{}", Self::header(scores.hierarchy_name()))?;
        for record in scores {
            writeln!(sink, "{}", self.format_record(scores, record))?;
        }
        sink.flush()?;

        debug!(target: "bdm-engine", "Wrote {} score lines for {}", scores.len(), scores.hierarchy_name());
        Ok(())
    }
}
