//! Error types for the annotation store
//!
//! Every failure names the entity and the operation involved so the UI layer
//! can show a precise message. A failed operation leaves the store unchanged.

use crate::annotation::AnnotationId;
use crate::geo::GeoCoordinate;

/// Errors returned by geo math and store operations
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AnnotationError {
    /// Latitude/longitude out of range, non-finite, or unparseable text
    #[error("invalid coordinate '{input}': {reason}")]
    InvalidCoordinate { input: String, reason: String },

    /// A point id referenced by a connect operation does not exist
    #[error("{operation}: unknown point {id}")]
    UnknownPoint {
        id: AnnotationId,
        operation: &'static str,
    },

    /// An id referenced by a remove/rename/recolor operation does not exist
    #[error("{operation}: unknown entity {id}")]
    UnknownEntity {
        id: AnnotationId,
        operation: &'static str,
    },

    /// Attempted to connect a point to itself
    #[error("cannot connect point {id} to itself")]
    SelfConnection { id: AnnotationId },

    /// A path needs at least two vertices
    #[error("a path needs at least 2 vertices, got {count}")]
    InsufficientVertices { count: usize },

    /// Region corners do not span a positive-area box
    #[error("degenerate region: southwest {sw} is not strictly below and left of northeast {ne}")]
    DegenerateRegion { sw: GeoCoordinate, ne: GeoCoordinate },

    /// An action script referenced `#n` before n entities were created
    #[error("unresolved reference '{reference}'")]
    UnresolvedReference { reference: String },
}

impl AnnotationError {
    pub(crate) fn invalid_coordinate(input: impl Into<String>, reason: impl Into<String>) -> Self {
        AnnotationError::InvalidCoordinate {
            input: input.into(),
            reason: reason.into(),
        }
    }
}

/// Result alias used across the crate
pub type AnnotationResult<T> = Result<T, AnnotationError>;
