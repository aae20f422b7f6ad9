// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
# BDM Engine

Pairwise concept similarity for multiple-inheritance class hierarchies.

Every unordered pair of concepts gets a score in `[0, 1]` derived from the
structure of the hierarchy:
- Root-to-concept path enumeration (one path per distinct chain of superclasses)
- Global statistics over leaf paths (`n0`, per-concept average chain length)
- Branching statistics (average number of direct subclasses)
- Per-pair scoring over every path combination

## Pipeline

1. [`ConceptIndex`] - stable ids for every concept
2. [`PathSet`] - all root paths per concept
3. [`BranchStats`] / [`LeafStats`] - global tables
4. [`PairScorer`] - scores a single pair against the finished tables
5. [`ReportWriter`] - optional text report

[`BdmCalculator`] runs the whole pipeline. With the `parallel` feature
(default) keys can be scored on the rayon pool; the result is identical to
a sequential run.

## Example

```rust
use bdm_engine::{compute_bdm, ConceptGraph};

let graph = ConceptGraph::from_entries(
    "animals",
    [("Root", &[][..]), ("Animal", &["Root"][..]), ("Dog", &["Animal"][..])],
)
.unwrap();

let scores = compute_bdm(Some(&graph), None).unwrap();
let score = scores.score(&"Dog".to_string(), &"Animal".to_string()).unwrap();
assert!(score > 0.0 && score < 1.0);
```

Copyright 2025 Neuraville Inc.
Licensed under the Apache License, Version 2.0
*/

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod aggregates;
pub mod calculator;
pub mod hierarchy;
pub mod index;
pub mod models;
pub mod paths;
pub mod report;
pub mod scoring;
pub mod types;

pub use aggregates::{BranchStats, ChainStat, LeafStats};
pub use calculator::{compute_bdm, BdmCalculator, CancellationToken, RunError, ScoringOptions};
pub use hierarchy::ConceptHierarchy;
pub use index::ConceptIndex;
pub use models::{ConceptEntry, ConceptGraph, GraphDocument};
pub use paths::{Path, PathSet};
pub use report::{ReportWriter, NO_ANCESTOR};
pub use scoring::{PairScorer, ScoreRecord, ScoreSet};
pub use types::{BdmError, BdmResult, ConceptId};
