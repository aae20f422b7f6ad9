// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

pub mod concept_graph;

pub use concept_graph::{ConceptEntry, ConceptGraph, GraphDocument};
