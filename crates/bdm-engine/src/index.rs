// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Concept indexer - assigns every concept a dense [`ConceptId`] for one run.
*/

use ahash::AHashMap;
use std::hash::Hash;

use crate::hierarchy::ConceptHierarchy;
use crate::types::ConceptId;

/// Bidirectional Concept <-> ConceptId mapping
///
/// Ids follow the hierarchy's `all_concepts` order. The index is built once
/// and shared read-only by every later stage.
#[derive(Debug, Clone)]
pub struct ConceptIndex<C> {
    concepts: Vec<C>,
    names: Vec<String>,
    ids: AHashMap<C, ConceptId>,
}

impl<C: Clone + Eq + Hash> ConceptIndex<C> {
    /// Index every concept of `hierarchy`; repeated concepts keep their first id
    pub fn build<H>(hierarchy: &H) -> Self
    where
        H: ConceptHierarchy<Concept = C>,
    {
        let all = hierarchy.all_concepts();
        let mut index = Self {
            concepts: Vec::with_capacity(all.len()),
            names: Vec::with_capacity(all.len()),
            ids: AHashMap::with_capacity(all.len()),
        };

        for concept in all {
            if index.ids.contains_key(&concept) {
                continue;
            }
            let id = ConceptId::from_index(index.concepts.len());
            index.names.push(hierarchy.concept_name(&concept));
            index.ids.insert(concept.clone(), id);
            index.concepts.push(concept);
        }

        index
    }

    pub fn id_of(&self, concept: &C) -> Option<ConceptId> {
        self.ids.get(concept).copied()
    }
}

impl<C> ConceptIndex<C> {
    pub fn len(&self) -> usize {
        self.concepts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.concepts.is_empty()
    }

    /// Concept owning `id`
    ///
    /// # Panics
    ///
    /// Panics if `id` was not issued by this index.
    pub fn concept(&self, id: ConceptId) -> &C {
        &self.concepts[id.index()]
    }

    /// Name of the concept owning `id`, as reported by the hierarchy
    pub fn name(&self, id: ConceptId) -> &str {
        &self.names[id.index()]
    }

    /// All issued ids in ascending order
    pub fn ids(&self) -> impl ExactSizeIterator<Item = ConceptId> + '_ {
        (0..self.concepts.len()).map(ConceptId::from_index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ConceptGraph;

    #[test]
    fn test_ids_follow_enumeration_order() {
        let mut graph = ConceptGraph::new("g");
        graph.add_concept("Root", &[]).unwrap();
        graph.add_concept("Leaf", &["Root"]).unwrap();

        let index = ConceptIndex::build(&graph);

        assert_eq!(index.len(), 2);
        let root = index.id_of(&"Root".to_string()).unwrap();
        let leaf = index.id_of(&"Leaf".to_string()).unwrap();
        assert_eq!(root.get(), 1);
        assert_eq!(leaf.get(), 2);
        assert_eq!(index.name(leaf), "Leaf");
        assert_eq!(index.concept(root), "Root");
        assert_eq!(index.ids().collect::<Vec<_>>(), vec![root, leaf]);
        assert_eq!(index.id_of(&"Missing".to_string()), None);
    }

    #[test]
    fn test_empty_hierarchy() {
        let graph = ConceptGraph::new("empty");
        let index = ConceptIndex::build(&graph);
        assert!(index.is_empty());
        assert_eq!(index.ids().count(), 0);
    }
}
