// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Pairwise scorer - the BDM score of every unordered concept pair.

For two distinct concepts every combination of one path of each is aligned
from the root. A shared prefix of `cp` concepts ends at a common ancestor;
with `cpE = cp - 1` shared edges and depths `dk`, `dr` below that ancestor:

```text
shared = bran * cpE / n0
score  = shared / (shared + dk / avgKey + dr / avgResponse)
```

where `bran` is the mean subclass count over the ancestor and the interior
concepts of both paths below it, divided by the global average branching
factor. The best combination wins. Combinations without a shared root only
fill the record when no connected combination exists.
*/

use std::hash::Hash;

use serde::{Deserialize, Serialize};

use crate::aggregates::{BranchStats, ChainStat, LeafStats};
use crate::index::ConceptIndex;
use crate::paths::{Path, PathSet};
use crate::types::ConceptId;

/// Score of one unordered concept pair
///
/// `key` always carries the larger id. `common_path_edges` is -1 when the two
/// concepts share no root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub key: ConceptId,
    pub response: ConceptId,
    pub score: f64,
    pub common_path_edges: i32,
    pub depth_key: u32,
    pub depth_response: u32,
    pub n0: f64,
    pub avg_len_key: f64,
    pub avg_len_response: f64,
    pub branch_factor: f64,
    /// Ancestor of the last connected path combination examined.
    /// This is not necessarily the combination that produced `score`.
    pub most_specific_common_ancestor: Option<ConceptId>,
}

impl ScoreRecord {
    /// Whether any path combination shared a root
    pub fn is_connected(&self) -> bool {
        self.common_path_edges >= 0
    }
}

/// Outcome of comparing one path of each concept
#[derive(Debug, Clone, Copy, PartialEq)]
enum Candidate {
    Disconnected {
        depth_key: u32,
        depth_response: u32,
    },
    Connected {
        ancestor: ConceptId,
        common_edges: u32,
        depth_key: u32,
        depth_response: u32,
        branch_factor: f64,
        score: f64,
    },
}

/// Read-only view over the prebuilt tables
///
/// Holds only shared references, so one scorer can be used from many
/// threads once the tables are complete.
#[derive(Debug, Clone, Copy)]
pub struct PairScorer<'a> {
    paths: &'a PathSet,
    leaves: &'a LeafStats,
    branches: &'a BranchStats,
}

impl<'a> PairScorer<'a> {
    pub fn new(paths: &'a PathSet, leaves: &'a LeafStats, branches: &'a BranchStats) -> Self {
        Self {
            paths,
            leaves,
            branches,
        }
    }

    /// Score a pair; the arguments may be given in either order
    pub fn score_pair(&self, a: ConceptId, b: ConceptId) -> ScoreRecord {
        let (key, response) = if a >= b { (a, b) } else { (b, a) };
        if key == response {
            return self.score_identical(key);
        }

        let n0 = self.leaves.n0();
        let chain_key = self.leaves.chain(key);
        let chain_response = self.leaves.chain(response);

        let mut record = ScoreRecord {
            key,
            response,
            score: 0.0,
            common_path_edges: -1,
            depth_key: 0,
            depth_response: 0,
            n0,
            avg_len_key: chain_key.average_edges,
            avg_len_response: chain_response.average_edges,
            branch_factor: 1.0,
            most_specific_common_ancestor: None,
        };
        let mut populated = false;
        let mut connected = false;

        for path_key in self.paths.paths(key) {
            for path_response in self.paths.paths(response) {
                match self.compare(path_key, path_response, chain_key, chain_response) {
                    Candidate::Disconnected {
                        depth_key,
                        depth_response,
                    } => {
                        if !populated {
                            record.depth_key = depth_key;
                            record.depth_response = depth_response;
                            populated = true;
                        }
                    }
                    Candidate::Connected {
                        ancestor,
                        common_edges,
                        depth_key,
                        depth_response,
                        branch_factor,
                        score,
                    } => {
                        if !connected || score > record.score {
                            record.score = score;
                            record.common_path_edges = common_edges as i32;
                            record.depth_key = depth_key;
                            record.depth_response = depth_response;
                            record.branch_factor = branch_factor;
                        }
                        record.most_specific_common_ancestor = Some(ancestor);
                        connected = true;
                        populated = true;
                    }
                }
            }
        }

        record
    }

    fn score_identical(&self, id: ConceptId) -> ScoreRecord {
        let shortest = self.paths.shortest_len(id);
        ScoreRecord {
            key: id,
            response: id,
            score: 1.0,
            common_path_edges: shortest.saturating_sub(1) as i32,
            depth_key: 0,
            depth_response: 0,
            n0: self.leaves.n0(),
            avg_len_key: 1.0,
            avg_len_response: 1.0,
            branch_factor: 1.0,
            most_specific_common_ancestor: Some(id),
        }
    }

    fn compare(
        &self,
        path_key: Path<'_>,
        path_response: Path<'_>,
        chain_key: ChainStat,
        chain_response: ChainStat,
    ) -> Candidate {
        let cp = path_key.common_prefix_len(&path_response);
        if cp == 0 {
            return Candidate::Disconnected {
                depth_key: path_key.edge_len() as u32,
                depth_response: path_response.edge_len() as u32,
            };
        }

        let ancestor = path_key.ids()[cp - 1];
        let common_edges = cp - 1;
        let depth_key = path_key.len() - cp;
        let depth_response = path_response.len() - cp;

        let considered = std::iter::once(ancestor)
            .chain(path_key.interior_after(cp).iter().copied())
            .chain(path_response.interior_after(cp).iter().copied());
        let (sum, n) = considered.fold((0u64, 0usize), |(sum, n), id| {
            (sum + self.branches.branch_count(id).unwrap_or(0) as u64, n + 1)
        });
        let average_branching = self.branches.average();
        let branch_factor = if average_branching > 0.0 {
            (sum as f64 / n as f64) / average_branching
        } else {
            0.0
        };

        let score = bdm_score(
            branch_factor,
            common_edges as f64,
            self.leaves.n0(),
            depth_key as f64,
            chain_key,
            depth_response as f64,
            chain_response,
        );

        Candidate::Connected {
            ancestor,
            common_edges: common_edges as u32,
            depth_key: depth_key as u32,
            depth_response: depth_response as u32,
            branch_factor,
            score,
        }
    }
}

/// The normalized BDM formula; any zero divisor yields 0
fn bdm_score(
    branch_factor: f64,
    common_edges: f64,
    n0: f64,
    depth_key: f64,
    chain_key: ChainStat,
    depth_response: f64,
    chain_response: ChainStat,
) -> f64 {
    if branch_factor <= 0.0 || n0 <= 0.0 || !chain_key.is_usable() || !chain_response.is_usable() {
        return 0.0;
    }
    let (avg_key, avg_response) = (chain_key.average_edges, chain_response.average_edges);

    let shared = branch_factor * common_edges / n0;
    let denominator = shared + depth_key / avg_key + depth_response / avg_response;
    if denominator <= 0.0 {
        return 0.0;
    }

    (shared / denominator).clamp(0.0, 1.0)
}

/// Position of the pair (key, response) in triangular order
fn triangular_position(key: usize, response: usize) -> usize {
    key * (key + 1) / 2 + response
}

/// All score records of one run, with the concept index that resolves them
///
/// Records are ordered by key id, then response id (`response <= key`).
#[derive(Debug, Clone)]
pub struct ScoreSet<C> {
    hierarchy_name: String,
    index: ConceptIndex<C>,
    records: Vec<ScoreRecord>,
    n0: f64,
    average_branching: f64,
}

impl<C> ScoreSet<C> {
    pub(crate) fn new(
        hierarchy_name: String,
        index: ConceptIndex<C>,
        records: Vec<ScoreRecord>,
        n0: f64,
        average_branching: f64,
    ) -> Self {
        debug_assert_eq!(records.len(), index.len() * (index.len() + 1) / 2);
        Self {
            hierarchy_name,
            index,
            records,
            n0,
            average_branching,
        }
    }

    pub fn hierarchy_name(&self) -> &str {
        &self.hierarchy_name
    }

    pub fn index(&self) -> &ConceptIndex<C> {
        &self.index
    }

    pub fn records(&self) -> &[ScoreRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ScoreRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Global average leaf path edge length used by this run
    pub fn n0(&self) -> f64 {
        self.n0
    }

    /// Global average branching factor used by this run
    pub fn average_branching(&self) -> f64 {
        self.average_branching
    }

    /// Record of the pair, regardless of argument order
    pub fn get(&self, a: ConceptId, b: ConceptId) -> Option<&ScoreRecord> {
        let (key, response) = if a >= b { (a, b) } else { (b, a) };
        let (k, r) = (key.checked_index()?, response.checked_index()?);
        if k >= self.index.len() {
            return None;
        }
        self.records.get(triangular_position(k, r))
    }

    /// Name of the pair's recorded common ancestor, if any
    pub fn ancestor_name(&self, record: &ScoreRecord) -> Option<&str> {
        let id = record.most_specific_common_ancestor?;
        (id.checked_index()? < self.index.len()).then(|| self.index.name(id))
    }
}

impl<C: Clone + Eq + Hash> ScoreSet<C> {
    /// Record of the pair of concepts, regardless of argument order
    pub fn get_by_concept(&self, a: &C, b: &C) -> Option<&ScoreRecord> {
        self.get(self.index.id_of(a)?, self.index.id_of(b)?)
    }

    /// BDM score of the pair of concepts, regardless of argument order
    pub fn score(&self, a: &C, b: &C) -> Option<f64> {
        self.get_by_concept(a, b).map(|record| record.score)
    }
}

impl<'s, C> IntoIterator for &'s ScoreSet<C> {
    type Item = &'s ScoreRecord;
    type IntoIter = std::slice::Iter<'s, ScoreRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ConceptGraph;

    struct Fixture {
        index: ConceptIndex<String>,
        paths: PathSet,
        leaves: LeafStats,
        branches: BranchStats,
    }

    impl Fixture {
        fn new(graph: &ConceptGraph) -> Self {
            let index = ConceptIndex::build(graph);
            let paths = PathSet::enumerate(graph, &index, None).unwrap();
            let branches = BranchStats::compute(graph, &index);
            let leaves = LeafStats::compute(&paths, &branches);
            Self {
                index,
                paths,
                leaves,
                branches,
            }
        }

        fn id(&self, name: &str) -> ConceptId {
            self.index.id_of(&name.to_string()).unwrap()
        }

        fn score(&self, a: &str, b: &str) -> ScoreRecord {
            PairScorer::new(&self.paths, &self.leaves, &self.branches)
                .score_pair(self.id(a), self.id(b))
        }
    }

    fn animals() -> ConceptGraph {
        let mut graph = ConceptGraph::new("animals");
        graph.add_concept("Root", &[]).unwrap();
        graph.add_concept("Animal", &["Root"]).unwrap();
        graph.add_concept("Plant", &["Root"]).unwrap();
        graph.add_concept("Dog", &["Animal"]).unwrap();
        graph
    }

    #[test]
    fn test_identical_pair() {
        let fixture = Fixture::new(&animals());
        let record = fixture.score("Dog", "Dog");

        assert_eq!(record.score, 1.0);
        assert_eq!(record.common_path_edges, 2);
        assert_eq!(record.depth_key, 0);
        assert_eq!(record.depth_response, 0);
        assert_eq!(record.n0, 1.5);
        assert_eq!(record.most_specific_common_ancestor, Some(fixture.id("Dog")));
    }

    #[test]
    fn test_parent_child_pair() {
        let fixture = Fixture::new(&animals());
        let record = fixture.score("Animal", "Dog");

        // Key is the larger id whatever the argument order
        assert_eq!(record.key, fixture.id("Dog"));
        assert_eq!(record.response, fixture.id("Animal"));
        assert_eq!(record.common_path_edges, 1);
        assert_eq!(record.depth_key, 1);
        assert_eq!(record.depth_response, 0);
        // bran = (1 / 1) / 1.5; shared = bran * 1 / 1.5 = 4/9; score = (4/9) / (4/9 + 1/2)
        assert!((record.branch_factor - 2.0 / 3.0).abs() < 1e-12);
        assert!((record.score - 8.0 / 17.0).abs() < 1e-12);
        assert_eq!(record.most_specific_common_ancestor, Some(fixture.id("Animal")));
    }

    #[test]
    fn test_root_only_ancestor_scores_zero() {
        let fixture = Fixture::new(&animals());
        let record = fixture.score("Dog", "Plant");

        assert_eq!(record.score, 0.0);
        assert_eq!(record.common_path_edges, 0);
        assert_eq!(record.depth_key, 2);
        assert_eq!(record.depth_response, 1);
        // (Root 2 + Animal 1) / 2 concepts, normalized by 1.5
        assert_eq!(record.branch_factor, 1.0);
        assert_eq!(record.most_specific_common_ancestor, Some(fixture.id("Root")));
        assert_eq!(record, fixture.score("Plant", "Dog"));
    }

    #[test]
    fn test_siblings_score_between_zero_and_one() {
        let mut graph = animals();
        graph.add_concept("Cat", &["Animal"]).unwrap();
        let fixture = Fixture::new(&graph);
        let record = fixture.score("Dog", "Cat");

        // n0 = 5/3, averBran = 2, bran = 2 / 2 = 1, shared = 0.6
        assert!((record.score - 0.375).abs() < 1e-12);
        assert!(record.score > 0.0 && record.score < 1.0);
        assert_eq!(record.most_specific_common_ancestor, Some(fixture.id("Animal")));
    }

    #[test]
    fn test_disconnected_pair() {
        let mut graph = ConceptGraph::new("forest");
        graph.add_concept("R1", &[]).unwrap();
        graph.add_concept("R2", &[]).unwrap();
        graph.add_concept("A", &["R1"]).unwrap();
        graph.add_concept("B", &["R2"]).unwrap();
        let fixture = Fixture::new(&graph);
        let record = fixture.score("A", "B");

        assert_eq!(record.score, 0.0);
        assert_eq!(record.common_path_edges, -1);
        assert!(!record.is_connected());
        assert_eq!(record.depth_key, 1);
        assert_eq!(record.depth_response, 1);
        assert_eq!(record.most_specific_common_ancestor, None);
    }

    #[test]
    fn test_disconnected_combination_does_not_overwrite() {
        // C sits under both roots; X only under R1
        let mut graph = ConceptGraph::new("two-roots");
        graph.add_concept("R1", &[]).unwrap();
        graph.add_concept("R2", &[]).unwrap();
        graph.add_concept("X", &["R1"]).unwrap();
        graph.add_concept("C", &["R1", "R2"]).unwrap();
        let fixture = Fixture::new(&graph);
        let record = fixture.score("X", "C");

        assert!(record.is_connected());
        assert_eq!(record.common_path_edges, 0);
        assert_eq!(record.most_specific_common_ancestor, Some(fixture.id("R1")));
    }

    #[test]
    fn test_ancestor_comes_from_last_connected_combination() {
        // D inherits from P (deep) and Q (shallow); E sits under P only.
        let mut graph = ConceptGraph::new("quirk");
        graph.add_concept("Root", &[]).unwrap();
        graph.add_concept("Q", &["Root"]).unwrap();
        graph.add_concept("M", &["Root"]).unwrap();
        graph.add_concept("P", &["M"]).unwrap();
        graph.add_concept("E", &["P"]).unwrap();
        graph.add_concept("D", &["P", "Q"]).unwrap();
        let fixture = Fixture::new(&graph);
        let record = fixture.score("D", "E");

        // The best combination meets at P (2 shared edges)...
        assert_eq!(record.common_path_edges, 2);
        assert!(record.score > 0.0);
        // ...but the recorded ancestor is the one of the last combination, via Q
        assert_eq!(record.most_specific_common_ancestor, Some(fixture.id("Root")));
    }

    #[test]
    fn test_bdm_score_guards() {
        let chain = |average_edges: f64, contributors: u32| ChainStat {
            average_edges,
            contributors,
        };
        let one = chain(1.0, 1);

        assert_eq!(bdm_score(1.0, 1.0, 0.0, 1.0, one, 1.0, one), 0.0);
        assert_eq!(bdm_score(1.0, 1.0, 1.0, 1.0, chain(0.0, 1), 1.0, one), 0.0);
        // A concept on no leaf path has no usable average
        assert_eq!(bdm_score(1.0, 1.0, 1.0, 1.0, one, 1.0, chain(0.0, 0)), 0.0);
        assert_eq!(bdm_score(0.0, 1.0, 1.0, 1.0, one, 1.0, one), 0.0);
        assert_eq!(bdm_score(1.0, 0.0, 1.0, 0.0, one, 0.0, one), 0.0);
        assert_eq!(bdm_score(1.0, 2.0, 1.0, 0.0, one, 0.0, one), 1.0);
    }

    #[test]
    fn test_triangular_positions_are_dense() {
        let positions: Vec<usize> = (0..4)
            .flat_map(|k| (0..=k).map(move |r| (k, r)))
            .map(|(k, r)| triangular_position(k, r))
            .collect();
        assert_eq!(positions, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn test_get_unknown_ids() {
        let graph = animals();
        let scores = crate::calculator::BdmCalculator::default()
            .compute(Some(&graph))
            .unwrap();
        let dog = scores.index().id_of(&"Dog".to_string()).unwrap();

        let zero = ConceptId(0);
        assert_eq!(zero.checked_index(), None);
        assert!(scores.get(zero, zero).is_none());
        assert!(scores.get(dog, zero).is_none());

        let past_end = ConceptId::from_index(scores.index().len());
        assert!(scores.get(past_end, past_end).is_none());
        assert!(scores.get(past_end, dog).is_none());
        assert!(scores.get(dog, past_end).is_none());
        assert!(scores.get(dog, dog).is_some());
    }
}
