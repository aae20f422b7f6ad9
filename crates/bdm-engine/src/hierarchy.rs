// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
The read-only hierarchy capability consumed by the engine.
*/

use std::fmt::Debug;
use std::hash::Hash;

/// Minimal view of a class hierarchy (a DAG of subclass/superclass edges)
///
/// Implementations must describe an acyclic superclass relation. The engine
/// never mutates concepts; it only calls these queries while building its
/// tables, before any scoring starts.
pub trait ConceptHierarchy {
    /// Opaque concept handle
    type Concept: Clone + Eq + Hash + Debug;

    /// Name used in the report header
    fn hierarchy_name(&self) -> String;

    /// Every concept, regardless of depth
    fn all_concepts(&self) -> Vec<Self::Concept>;

    /// Concepts without superclasses
    fn top_concepts(&self) -> Vec<Self::Concept>;

    fn direct_superclasses(&self, concept: &Self::Concept) -> Vec<Self::Concept>;

    fn direct_subclasses(&self, concept: &Self::Concept) -> Vec<Self::Concept>;

    fn is_top_class(&self, concept: &Self::Concept) -> bool;

    fn concept_name(&self, concept: &Self::Concept) -> String;
}
