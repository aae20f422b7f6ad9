// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Structural statistics computed once before scoring.

- [`BranchStats`]: direct-subclass counts and the global average branching
  factor (`averBran`) over concepts that have subclasses.
- [`LeafStats`]: the global average leaf path edge length (`n0BDM`) and, per
  concept, the average edge length of the leaf paths passing through it.

Both tables are immutable once built. Zero divisors yield 0 rather than an
error; the scorer treats such aggregates as unusable.
*/

use crate::hierarchy::ConceptHierarchy;
use crate::index::ConceptIndex;
use crate::paths::PathSet;
use crate::types::ConceptId;

/// Direct-subclass counts per concept
#[derive(Debug, Clone, Default)]
pub struct BranchStats {
    counts: Vec<u32>,
    average: f64,
}

impl BranchStats {
    /// Count the indexed direct subclasses of every concept
    pub fn compute<H: ConceptHierarchy>(hierarchy: &H, index: &ConceptIndex<H::Concept>) -> Self {
        let counts: Vec<u32> = index
            .ids()
            .map(|id| {
                hierarchy
                    .direct_subclasses(index.concept(id))
                    .iter()
                    .filter(|sub| index.id_of(sub).is_some())
                    .count() as u32
            })
            .collect();

        Self::from_counts(counts)
    }

    /// Build from raw counts, indexed by `ConceptId::index`
    pub fn from_counts(counts: Vec<u32>) -> Self {
        let (sum, branching) = counts
            .iter()
            .filter(|&&c| c > 0)
            .fold((0u64, 0usize), |(sum, n), &c| (sum + c as u64, n + 1));

        let average = if branching > 0 {
            sum as f64 / branching as f64
        } else {
            0.0
        };

        Self { counts, average }
    }

    /// Subclass count, or `None` for concepts without subclasses
    pub fn branch_count(&self, id: ConceptId) -> Option<u32> {
        match self.counts[id.index()] {
            0 => None,
            n => Some(n),
        }
    }

    pub fn is_leaf(&self, id: ConceptId) -> bool {
        self.counts[id.index()] == 0
    }

    /// Mean subclass count over concepts with at least one subclass (`averBran`)
    pub fn average(&self) -> f64 {
        self.average
    }
}

/// Average edge length of the leaf paths passing through one concept
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ChainStat {
    pub average_edges: f64,
    pub contributors: u32,
}

impl ChainStat {
    /// Whether the average can be used as a divisor
    pub fn is_usable(&self) -> bool {
        self.contributors > 0 && self.average_edges > 0.0
    }
}

/// Leaf path statistics
#[derive(Debug, Clone, Default)]
pub struct LeafStats {
    n0: f64,
    leaf_paths: usize,
    chains: Vec<ChainStat>,
}

impl LeafStats {
    /// Aggregate over every path ending at a leaf concept
    ///
    /// Each leaf path adds its edge length to the global total and to every
    /// concept it passes through, endpoints included.
    pub fn compute(paths: &PathSet, branches: &BranchStats) -> Self {
        let count = paths.concept_count();
        let mut edge_totals = vec![0u64; count];
        let mut contributors = vec![0u32; count];
        let mut total_edges = 0u64;
        let mut leaf_paths = 0usize;

        for leaf in (0..count).map(ConceptId::from_index) {
            if !branches.is_leaf(leaf) {
                continue;
            }
            for path in paths.paths(leaf) {
                let edges = path.edge_len() as u64;
                total_edges += edges;
                leaf_paths += 1;

                for &id in path.ids() {
                    edge_totals[id.index()] += edges;
                    contributors[id.index()] += 1;
                }
            }
        }

        let n0 = if leaf_paths > 0 {
            total_edges as f64 / leaf_paths as f64
        } else {
            0.0
        };

        let chains = edge_totals
            .into_iter()
            .zip(contributors)
            .map(|(edges, n)| ChainStat {
                average_edges: if n > 0 { edges as f64 / n as f64 } else { 0.0 },
                contributors: n,
            })
            .collect();

        Self {
            n0,
            leaf_paths,
            chains,
        }
    }

    /// Average leaf path edge length over all leaf paths (`n0BDM`)
    pub fn n0(&self) -> f64 {
        self.n0
    }

    pub fn leaf_path_count(&self) -> usize {
        self.leaf_paths
    }

    pub fn chain(&self, id: ConceptId) -> ChainStat {
        self.chains[id.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ConceptGraph;

    fn stats(graph: &ConceptGraph) -> (ConceptIndex<String>, BranchStats, LeafStats) {
        let index = ConceptIndex::build(graph);
        let paths = PathSet::enumerate(graph, &index, None).unwrap();
        let branches = BranchStats::compute(graph, &index);
        let leaves = LeafStats::compute(&paths, &branches);
        (index, branches, leaves)
    }

    #[test]
    fn test_root_animal_plant_dog() {
        let mut graph = ConceptGraph::new("g");
        graph.add_concept("Root", &[]).unwrap();
        graph.add_concept("Animal", &["Root"]).unwrap();
        graph.add_concept("Plant", &["Root"]).unwrap();
        graph.add_concept("Dog", &["Animal"]).unwrap();
        let (index, branches, leaves) = stats(&graph);
        let id = |name: &str| index.id_of(&name.to_string()).unwrap();

        // Leaf paths: Root-Animal-Dog (2 edges), Root-Plant (1 edge)
        assert_eq!(leaves.leaf_path_count(), 2);
        assert_eq!(leaves.n0(), 1.5);
        assert_eq!(leaves.chain(id("Root")).average_edges, 1.5);
        assert_eq!(leaves.chain(id("Root")).contributors, 2);
        assert_eq!(leaves.chain(id("Animal")).average_edges, 2.0);
        assert_eq!(leaves.chain(id("Plant")).average_edges, 1.0);

        assert_eq!(branches.branch_count(id("Root")), Some(2));
        assert_eq!(branches.branch_count(id("Animal")), Some(1));
        assert_eq!(branches.branch_count(id("Dog")), None);
        assert_eq!(branches.average(), 1.5);
    }

    #[test]
    fn test_diamond_counts_each_leaf_path() {
        let mut graph = ConceptGraph::new("diamond");
        graph.add_concept("Root", &[]).unwrap();
        graph.add_concept("Left", &["Root"]).unwrap();
        graph.add_concept("Right", &["Root"]).unwrap();
        graph.add_concept("Bottom", &["Left", "Right"]).unwrap();
        let (index, _, leaves) = stats(&graph);

        let bottom = leaves.chain(index.id_of(&"Bottom".to_string()).unwrap());
        assert_eq!(bottom.contributors, 2);
        assert_eq!(bottom.average_edges, 2.0);
        assert_eq!(leaves.n0(), 2.0);
    }

    #[test]
    fn test_isolated_concept_is_degenerate() {
        let mut graph = ConceptGraph::new("single");
        graph.add_concept("Alone", &[]).unwrap();
        let (index, branches, leaves) = stats(&graph);
        let alone = index.id_of(&"Alone".to_string()).unwrap();

        assert_eq!(leaves.n0(), 0.0);
        assert_eq!(leaves.chain(alone).contributors, 1);
        assert!(!leaves.chain(alone).is_usable());
        assert_eq!(branches.average(), 0.0);
    }

    #[test]
    fn test_from_counts_ignores_leaves() {
        let branches = BranchStats::from_counts(vec![3, 0, 1, 0]);
        assert_eq!(branches.average(), 2.0);
        assert!(branches.is_leaf(ConceptId::from_index(1)));
    }
}
