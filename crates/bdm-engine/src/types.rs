// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Core types shared by the BDM engine components.
*/

use serde::{Deserialize, Serialize};
use std::fmt;

/// Dense concept identity, assigned 1..=N for the duration of one run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct ConceptId(pub(crate) u32);

impl ConceptId {
    /// Identity of the concept at zero-based enumeration position `index`
    pub(crate) fn from_index(index: usize) -> Self {
        ConceptId(index as u32 + 1)
    }

    /// Zero-based position used to address the per-concept tables
    pub fn index(self) -> usize {
        self.0 as usize - 1
    }

    /// Zero-based position, or `None` for the invalid id 0
    pub fn checked_index(self) -> Option<usize> {
        (self.0 as usize).checked_sub(1)
    }

    /// The 1-based numeric id
    pub fn get(self) -> u32 {
        self.0
    }
}

impl TryFrom<u32> for ConceptId {
    type Error = String;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        if value == 0 {
            return Err("concept ids start at 1".to_string());
        }
        Ok(ConceptId(value))
    }
}

impl From<ConceptId> for u32 {
    fn from(id: ConceptId) -> Self {
        id.0
    }
}

impl fmt::Display for ConceptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Result type for BDM operations
pub type BdmResult<T> = Result<T, BdmError>;

/// Errors that can occur during BDM operations
#[derive(Debug, thiserror::Error)]
pub enum BdmError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid hierarchy: {0}")]
    InvalidHierarchy(String),

    #[error("Cycle in superclass relation at concept {0}")]
    CyclicHierarchy(String),

    #[error("Concept {concept} has more than {limit} root paths")]
    PathLimitExceeded { concept: String, limit: usize },

    #[error("Computation cancelled")]
    Cancelled,

    #[error("Failed to write report: {0}")]
    SinkWriteFailure(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
