// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Path enumerator - every root-to-concept chain of direct superclass edges.

All paths live in one flat arena. Each concept owns a contiguous range of
path spans, so a concept's paths are built once and reused by every
descendant instead of being recomputed per descendant.
*/

use std::ops::Range;
use tracing::{debug, warn};

use crate::hierarchy::ConceptHierarchy;
use crate::index::ConceptIndex;
use crate::types::{BdmError, BdmResult, ConceptId};

/// One root-first chain of concept ids ending at its own concept
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Path<'a> {
    ids: &'a [ConceptId],
}

impl<'a> Path<'a> {
    pub fn ids(&self) -> &'a [ConceptId] {
        self.ids
    }

    /// Number of concepts on the path
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Number of edges on the path
    pub fn edge_len(&self) -> usize {
        self.ids.len().saturating_sub(1)
    }

    /// The concept the path ends at
    pub fn concept(&self) -> ConceptId {
        self.ids[self.ids.len() - 1]
    }

    /// Length of the longest shared root-aligned prefix, in concepts
    pub fn common_prefix_len(&self, other: &Path<'_>) -> usize {
        self.ids
            .iter()
            .zip(other.ids)
            .take_while(|(a, b)| a == b)
            .count()
    }

    /// Concepts strictly between position `prefix_len - 1` and the path's end
    pub fn interior_after(&self, prefix_len: usize) -> &'a [ConceptId] {
        if self.ids.len() > prefix_len + 1 {
            &self.ids[prefix_len..self.ids.len() - 1]
        } else {
            &[]
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VisitState {
    New,
    InProgress,
    Done,
}

/// Immutable mapping ConceptId -> all root-to-concept paths
#[derive(Debug, Clone, Default)]
pub struct PathSet {
    /// Concatenated path contents
    nodes: Vec<ConceptId>,
    /// Per path: range into `nodes`
    spans: Vec<Range<usize>>,
    /// Per concept: range into `spans`
    by_concept: Vec<Range<usize>>,
}

impl PathSet {
    /// Enumerate the paths of every indexed concept
    ///
    /// Top classes own the single path `[C]`. Every other concept owns one
    /// path per path of each direct superclass, extended by itself.
    /// Superclasses missing from the index are skipped; a non-top concept
    /// left without superclasses is treated as a root.
    ///
    /// # Errors
    ///
    /// - `CyclicHierarchy` if the superclass relation contains a cycle
    /// - `PathLimitExceeded` if a concept would own more than `max_paths` paths
    pub fn enumerate<H>(
        hierarchy: &H,
        index: &ConceptIndex<H::Concept>,
        max_paths: Option<usize>,
    ) -> BdmResult<Self>
    where
        H: ConceptHierarchy,
    {
        let parents = collect_parents(hierarchy, index);
        let count = index.len();

        let mut set = PathSet {
            nodes: Vec::new(),
            spans: Vec::new(),
            by_concept: vec![0..0; count],
        };
        let mut state = vec![VisitState::New; count];

        // Post-order worklist: a concept is expanded once all superclasses are done
        for start in index.ids() {
            if state[start.index()] == VisitState::Done {
                continue;
            }
            let mut stack = vec![(start, false)];

            while let Some((id, expanded)) = stack.pop() {
                if state[id.index()] == VisitState::Done {
                    continue;
                }

                if expanded {
                    set.extend_concept(id, &parents[id.index()], max_paths)
                        .map_err(|limit| BdmError::PathLimitExceeded {
                            concept: index.name(id).to_string(),
                            limit,
                        })?;
                    state[id.index()] = VisitState::Done;
                    continue;
                }

                state[id.index()] = VisitState::InProgress;
                stack.push((id, true));
                for &parent in &parents[id.index()] {
                    match state[parent.index()] {
                        VisitState::New => stack.push((parent, false)),
                        VisitState::InProgress => {
                            return Err(BdmError::CyclicHierarchy(index.name(parent).to_string()));
                        }
                        VisitState::Done => {}
                    }
                }
            }
        }

        debug!(target: "bdm-engine",
            "Enumerated {} paths ({} path nodes) for {} concepts",
            set.spans.len(), set.nodes.len(), count);

        Ok(set)
    }

    /// Append the paths of `id`, built from its superclasses' finished paths
    fn extend_concept(
        &mut self,
        id: ConceptId,
        parents: &[ConceptId],
        max_paths: Option<usize>,
    ) -> Result<(), usize> {
        let first_span = self.spans.len();

        if parents.is_empty() {
            let start = self.nodes.len();
            self.nodes.push(id);
            self.spans.push(start..self.nodes.len());
        } else {
            let total: usize = parents.iter().map(|p| self.by_concept[p.index()].len()).sum();
            if let Some(limit) = max_paths {
                if total > limit {
                    return Err(limit);
                }
            }

            for parent in parents {
                for span_idx in self.by_concept[parent.index()].clone() {
                    let span = self.spans[span_idx].clone();
                    let start = self.nodes.len();
                    self.nodes.extend_from_within(span);
                    self.nodes.push(id);
                    self.spans.push(start..self.nodes.len());
                }
            }
        }

        self.by_concept[id.index()] = first_span..self.spans.len();
        Ok(())
    }

    /// Paths ending at `id`, in enumeration order
    pub fn paths(&self, id: ConceptId) -> impl ExactSizeIterator<Item = Path<'_>> + '_ {
        self.spans[self.by_concept[id.index()].clone()]
            .iter()
            .map(move |span| Path {
                ids: &self.nodes[span.clone()],
            })
    }

    /// Number of concepts on the shortest path ending at `id`
    pub fn shortest_len(&self, id: ConceptId) -> usize {
        self.paths(id).map(|p| p.len()).min().unwrap_or(0)
    }

    pub fn total_paths(&self) -> usize {
        self.spans.len()
    }

    pub fn concept_count(&self) -> usize {
        self.by_concept.len()
    }
}

/// Direct superclass ids per concept; empty for roots
fn collect_parents<H>(hierarchy: &H, index: &ConceptIndex<H::Concept>) -> Vec<Vec<ConceptId>>
where
    H: ConceptHierarchy,
{
    index
        .ids()
        .map(|id| {
            let concept = index.concept(id);
            if hierarchy.is_top_class(concept) {
                return Vec::new();
            }

            let mut parents: Vec<ConceptId> = Vec::new();
            for superclass in hierarchy.direct_superclasses(concept) {
                match index.id_of(&superclass) {
                    Some(parent) if !parents.contains(&parent) => parents.push(parent),
                    Some(_) => {}
                    None => warn!(target: "bdm-engine",
                        "Superclass {} of {} is not part of the hierarchy, skipping",
                        hierarchy.concept_name(&superclass), index.name(id)),
                }
            }

            if parents.is_empty() {
                warn!(target: "bdm-engine",
                    "Concept {} is not a top class but has no superclasses, treating it as a root",
                    index.name(id));
            }
            parents
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ConceptGraph;

    fn names(index: &ConceptIndex<String>, path: Path<'_>) -> Vec<String> {
        path.ids().iter().map(|&id| index.name(id).to_string()).collect()
    }

    fn id(index: &ConceptIndex<String>, name: &str) -> ConceptId {
        index.id_of(&name.to_string()).unwrap()
    }

    #[test]
    fn test_single_inheritance_paths() {
        let mut graph = ConceptGraph::new("g");
        graph.add_concept("Root", &[]).unwrap();
        graph.add_concept("Animal", &["Root"]).unwrap();
        graph.add_concept("Dog", &["Animal"]).unwrap();
        let index = ConceptIndex::build(&graph);

        let paths = PathSet::enumerate(&graph, &index, None).unwrap();

        let dog: Vec<_> = paths.paths(id(&index, "Dog")).collect();
        assert_eq!(dog.len(), 1);
        assert_eq!(names(&index, dog[0]), ["Root", "Animal", "Dog"]);
        assert_eq!(dog[0].edge_len(), 2);
        assert_eq!(dog[0].concept(), id(&index, "Dog"));
        assert_eq!(paths.paths(id(&index, "Root")).count(), 1);
        assert_eq!(paths.total_paths(), 3);
    }

    #[test]
    fn test_diamond_yields_distinct_paths() {
        // Root -> {Left, Right} -> Bottom -> Tail
        let mut graph = ConceptGraph::new("diamond");
        graph.add_concept("Root", &[]).unwrap();
        graph.add_concept("Left", &["Root"]).unwrap();
        graph.add_concept("Right", &["Root"]).unwrap();
        graph.add_concept("Bottom", &["Left", "Right"]).unwrap();
        graph.add_concept("Tail", &["Bottom"]).unwrap();
        let index = ConceptIndex::build(&graph);

        let paths = PathSet::enumerate(&graph, &index, None).unwrap();

        let tail: Vec<_> = paths
            .paths(id(&index, "Tail"))
            .map(|p| names(&index, p))
            .collect();
        assert_eq!(
            tail,
            vec![
                vec!["Root", "Left", "Bottom", "Tail"],
                vec!["Root", "Right", "Bottom", "Tail"],
            ]
        );
        assert_eq!(paths.shortest_len(id(&index, "Bottom")), 3);
    }

    #[test]
    fn test_children_listed_before_parents() {
        let graph = ConceptGraph::from_entries(
            "reversed",
            [
                ("C", &["B"][..]),
                ("B", &["A"][..]),
                ("A", &[][..]),
            ],
        )
        .unwrap();
        let index = ConceptIndex::build(&graph);

        let paths = PathSet::enumerate(&graph, &index, None).unwrap();

        let c: Vec<_> = paths.paths(id(&index, "C")).collect();
        assert_eq!(names(&index, c[0]), ["A", "B", "C"]);
    }

    #[test]
    fn test_path_limit() {
        let mut graph = ConceptGraph::new("wide");
        graph.add_concept("Root", &[]).unwrap();
        graph.add_concept("A", &["Root"]).unwrap();
        graph.add_concept("B", &["Root"]).unwrap();
        graph.add_concept("C", &["Root"]).unwrap();
        graph.add_concept("Multi", &["A", "B", "C"]).unwrap();
        let index = ConceptIndex::build(&graph);

        assert!(PathSet::enumerate(&graph, &index, Some(3)).is_ok());
        match PathSet::enumerate(&graph, &index, Some(2)) {
            Err(BdmError::PathLimitExceeded { concept, limit }) => {
                assert_eq!(concept, "Multi");
                assert_eq!(limit, 2);
            }
            other => panic!("expected path limit error, got {:?}", other),
        }
    }

    /// A -> B -> C -> B, which `ConceptGraph` itself refuses to build
    struct CyclicFixture;

    impl ConceptHierarchy for CyclicFixture {
        type Concept = &'static str;

        fn hierarchy_name(&self) -> String {
            "cyclic".to_string()
        }
        fn all_concepts(&self) -> Vec<&'static str> {
            vec!["A", "B", "C"]
        }
        fn top_concepts(&self) -> Vec<&'static str> {
            vec!["A"]
        }
        fn direct_superclasses(&self, concept: &&'static str) -> Vec<&'static str> {
            match *concept {
                "B" => vec!["A", "C"],
                "C" => vec!["B"],
                _ => vec![],
            }
        }
        fn direct_subclasses(&self, concept: &&'static str) -> Vec<&'static str> {
            match *concept {
                "A" => vec!["B"],
                "B" => vec!["C"],
                "C" => vec!["B"],
                _ => vec![],
            }
        }
        fn is_top_class(&self, concept: &&'static str) -> bool {
            *concept == "A"
        }
        fn concept_name(&self, concept: &&'static str) -> String {
            concept.to_string()
        }
    }

    #[test]
    fn test_cycle_detected() {
        let index = ConceptIndex::build(&CyclicFixture);
        let result = PathSet::enumerate(&CyclicFixture, &index, None);
        assert!(matches!(result, Err(BdmError::CyclicHierarchy(_))));
    }

    #[test]
    fn test_common_prefix_and_interior() {
        let ids: Vec<ConceptId> = (0..4).map(ConceptId::from_index).collect();
        let a = Path { ids: &ids[..] };
        let other = [ids[0], ids[1], ConceptId::from_index(9)];
        let b = Path { ids: &other };

        assert_eq!(a.common_prefix_len(&b), 2);
        assert_eq!(a.interior_after(2), &ids[2..3]);
        assert!(b.interior_after(2).is_empty());
        assert!(b.interior_after(3).is_empty());
    }
}
