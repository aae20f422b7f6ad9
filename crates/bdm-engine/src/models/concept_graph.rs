// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
ConceptGraph - in-memory class hierarchy with multiple inheritance.

Named concepts linked by direct subclass/superclass edges. Serves as the
reference `ConceptHierarchy` implementation and as the JSON input format of
the `bdm_report` tool.
*/

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::hierarchy::ConceptHierarchy;
use crate::types::{BdmError, BdmResult};

/// Directed acyclic class hierarchy keyed by concept name
///
/// # Design Notes
///
/// - Top classes have no superclasses; there may be several
/// - A concept may have any number of superclasses
/// - Cycles are rejected when edges are added
/// - Concepts are reported in insertion order, edges in the order they were added
///
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(try_from = "GraphDocument", into = "GraphDocument")]
pub struct ConceptGraph {
    name: String,

    /// Concept names in insertion order
    concepts: Vec<String>,

    /// Map of concept -> direct superclasses (every concept has an entry)
    parent_map: AHashMap<String, Vec<String>>,

    /// Map of concept -> direct subclasses
    children_map: AHashMap<String, Vec<String>>,
}

impl ConceptGraph {
    /// Create a new empty hierarchy
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Build a hierarchy from `(concept, superclasses)` entries
    ///
    /// Entries may appear in any order; superclasses only need to be declared
    /// somewhere in the list.
    pub fn from_entries<'a, I>(name: impl Into<String>, entries: I) -> BdmResult<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a [&'a str])>,
    {
        let entries: Vec<(&str, &[&str])> = entries.into_iter().collect();
        let mut graph = Self::new(name);

        for (concept, _) in &entries {
            graph.add_concept(*concept, &[])?;
        }
        for (concept, superclasses) in &entries {
            for superclass in superclasses.iter() {
                graph.add_subclass_of(concept, superclass)?;
            }
        }

        Ok(graph)
    }

    /// Add a concept below already existing superclasses
    ///
    /// An empty `superclasses` slice makes the concept a top class.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Concept already exists
    /// - A superclass doesn't exist
    ///
    pub fn add_concept(&mut self, concept: impl Into<String>, superclasses: &[&str]) -> BdmResult<()> {
        let concept = concept.into();

        if self.contains(&concept) {
            return Err(BdmError::InvalidHierarchy(format!(
                "Concept {} already exists",
                concept
            )));
        }

        for superclass in superclasses {
            if !self.contains(superclass) {
                return Err(BdmError::InvalidHierarchy(format!(
                    "Superclass {} of {} does not exist",
                    superclass, concept
                )));
            }
        }

        self.concepts.push(concept.clone());
        self.parent_map.insert(concept.clone(), Vec::new());
        for superclass in superclasses {
            if !self.get_superclasses(&concept).iter().any(|s| s == superclass) {
                self.link(&concept, superclass);
            }
        }

        Ok(())
    }

    /// Declare `concept` a direct subclass of `superclass`
    ///
    /// Adding an edge that already exists is a no-op.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Either concept doesn't exist
    /// - The edge would create a cycle
    ///
    pub fn add_subclass_of(&mut self, concept: &str, superclass: &str) -> BdmResult<()> {
        for name in [concept, superclass] {
            if !self.contains(name) {
                return Err(BdmError::InvalidHierarchy(format!(
                    "Concept {} does not exist",
                    name
                )));
            }
        }

        // The new superclass cannot be the concept itself or one of its descendants
        if concept == superclass || self.is_descendant(superclass, concept) {
            return Err(BdmError::CyclicHierarchy(format!(
                "{} -> {}",
                concept, superclass
            )));
        }

        if self.get_superclasses(concept).iter().any(|s| s == superclass) {
            return Ok(());
        }

        self.link(concept, superclass);
        Ok(())
    }

    fn link(&mut self, concept: &str, superclass: &str) {
        self.parent_map
            .entry(concept.to_string())
            .or_default()
            .push(superclass.to_string());
        self.children_map
            .entry(superclass.to_string())
            .or_default()
            .push(concept.to_string());
    }

    /// Check if one concept is a (transitive) subclass of another
    fn is_descendant(&self, potential_descendant: &str, ancestor: &str) -> bool {
        let mut to_visit = vec![potential_descendant];
        let mut seen = ahash::AHashSet::new();

        while let Some(current) = to_visit.pop() {
            if !seen.insert(current) {
                continue;
            }
            for parent in self.get_superclasses(current) {
                if parent == ancestor {
                    return true;
                }
                to_visit.push(parent);
            }
        }

        false
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn contains(&self, concept: &str) -> bool {
        self.parent_map.contains_key(concept)
    }

    /// Direct superclasses of a concept (empty for top classes and unknown names)
    pub fn get_superclasses(&self, concept: &str) -> &[String] {
        self.parent_map
            .get(concept)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Direct subclasses of a concept (empty for leaves and unknown names)
    pub fn get_subclasses(&self, concept: &str) -> &[String] {
        self.children_map
            .get(concept)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// All concept names in insertion order
    pub fn concept_names(&self) -> &[String] {
        &self.concepts
    }

    /// Get the total number of concepts
    pub fn concept_count(&self) -> usize {
        self.concepts.len()
    }

    /// Parse a hierarchy from its JSON document form
    pub fn from_json(json: &str) -> BdmResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize the hierarchy to pretty-printed JSON
    pub fn to_json(&self) -> BdmResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl ConceptHierarchy for ConceptGraph {
    type Concept = String;

    fn hierarchy_name(&self) -> String {
        self.name.clone()
    }

    fn all_concepts(&self) -> Vec<String> {
        self.concepts.clone()
    }

    fn top_concepts(&self) -> Vec<String> {
        self.concepts
            .iter()
            .filter(|c| self.get_superclasses(c).is_empty())
            .cloned()
            .collect()
    }

    fn direct_superclasses(&self, concept: &String) -> Vec<String> {
        self.get_superclasses(concept).to_vec()
    }

    fn direct_subclasses(&self, concept: &String) -> Vec<String> {
        self.get_subclasses(concept).to_vec()
    }

    fn is_top_class(&self, concept: &String) -> bool {
        self.get_superclasses(concept).is_empty()
    }

    fn concept_name(&self, concept: &String) -> String {
        concept.clone()
    }
}

/// Serialized form of a [`ConceptGraph`]
///
/// ```json
/// {
///   "name": "animals",
///   "concepts": [
///     { "name": "Root" },
///     { "name": "Dog", "superclasses": ["Root"] }
///   ]
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphDocument {
    pub name: String,
    pub concepts: Vec<ConceptEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConceptEntry {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub superclasses: Vec<String>,
}

impl TryFrom<GraphDocument> for ConceptGraph {
    type Error = BdmError;

    fn try_from(document: GraphDocument) -> BdmResult<Self> {
        let entries: Vec<(&str, Vec<&str>)> = document
            .concepts
            .iter()
            .map(|entry| {
                (
                    entry.name.as_str(),
                    entry.superclasses.iter().map(String::as_str).collect(),
                )
            })
            .collect();

        ConceptGraph::from_entries(
            document.name.clone(),
            entries.iter().map(|(name, supers)| (*name, supers.as_slice())),
        )
    }
}

impl From<ConceptGraph> for GraphDocument {
    fn from(graph: ConceptGraph) -> Self {
        let concepts = graph
            .concepts
            .iter()
            .map(|name| ConceptEntry {
                name: name.clone(),
                superclasses: graph.get_superclasses(name).to_vec(),
            })
            .collect();

        GraphDocument {
            name: graph.name,
            concepts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn animals() -> ConceptGraph {
        let mut graph = ConceptGraph::new("animals");
        graph.add_concept("Root", &[]).unwrap();
        graph.add_concept("Animal", &["Root"]).unwrap();
        graph.add_concept("Plant", &["Root"]).unwrap();
        graph.add_concept("Dog", &["Animal"]).unwrap();
        graph
    }

    #[test]
    fn test_graph_creation() {
        let graph = animals();

        assert_eq!(graph.concept_count(), 4);
        assert_eq!(graph.top_concepts(), vec!["Root".to_string()]);
        assert_eq!(graph.get_subclasses("Root"), ["Animal", "Plant"]);
        assert_eq!(graph.get_superclasses("Dog"), ["Animal"]);
        assert!(graph.is_top_class(&"Root".to_string()));
        assert!(!graph.is_top_class(&"Dog".to_string()));
    }

    #[test]
    fn test_duplicate_and_unknown_rejected() {
        let mut graph = animals();

        assert!(matches!(
            graph.add_concept("Dog", &["Root"]),
            Err(BdmError::InvalidHierarchy(_))
        ));
        assert!(matches!(
            graph.add_concept("Cat", &["Feline"]),
            Err(BdmError::InvalidHierarchy(_))
        ));
        assert_eq!(graph.concept_count(), 4);
    }

    #[test]
    fn test_multiple_inheritance() {
        let mut graph = animals();
        graph.add_concept("Pet", &["Root"]).unwrap();
        graph.add_subclass_of("Dog", "Pet").unwrap();
        // Repeated edge is ignored
        graph.add_subclass_of("Dog", "Pet").unwrap();

        assert_eq!(graph.get_superclasses("Dog"), ["Animal", "Pet"]);
        assert_eq!(graph.get_subclasses("Pet"), ["Dog"]);
    }

    #[test]
    fn test_cycle_prevention() {
        let mut graph = animals();

        // Root would become a subclass of its own descendant
        let result = graph.add_subclass_of("Root", "Dog");
        assert!(matches!(result, Err(BdmError::CyclicHierarchy(_))));

        let result = graph.add_subclass_of("Dog", "Dog");
        assert!(matches!(result, Err(BdmError::CyclicHierarchy(_))));
    }

    #[test]
    fn test_from_entries_any_order() {
        let graph = ConceptGraph::from_entries(
            "shuffled",
            [
                ("Dog", &["Animal"][..]),
                ("Animal", &["Root"][..]),
                ("Root", &[][..]),
            ],
        )
        .unwrap();

        assert_eq!(graph.concept_names(), ["Dog", "Animal", "Root"]);
        assert_eq!(graph.get_superclasses("Animal"), ["Root"]);
    }

    #[test]
    fn test_json_document() {
        let graph = animals();
        let json = graph.to_json().unwrap();
        let parsed = ConceptGraph::from_json(&json).unwrap();

        assert_eq!(parsed.name(), "animals");
        assert_eq!(parsed.concept_names(), graph.concept_names());
        assert_eq!(parsed.get_subclasses("Root"), ["Animal", "Plant"]);
    }

    #[test]
    fn test_json_with_unknown_superclass_fails() {
        let json = r#"{"name": "bad", "concepts": [{"name": "A", "superclasses": ["B"]}]}"#;
        assert!(ConceptGraph::from_json(json).is_err());
    }
}
