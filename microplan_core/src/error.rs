//! Error types for the microplan_core library.

use crate::Phase;
use std::io;
use uuid::Uuid;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// What kind of entity a lookup failed to find
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Entity {
    Item,
    Day,
    Exercise,
}

impl std::fmt::Display for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Entity::Item => f.write_str("scheduled item"),
            Entity::Day => f.write_str("training day"),
            Entity::Exercise => f.write_str("library exercise"),
        }
    }
}

/// Core error type for microplan_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A referenced item, day or exercise no longer exists
    #[error("{entity} not found: {id}")]
    NotFound { entity: Entity, id: String },

    /// A reorder supplied ids that are not a permutation of the bucket
    #[error("Order for {phase} of day {day_id} does not match its contents: {reason}")]
    PermutationMismatch {
        day_id: Uuid,
        phase: Phase,
        reason: String,
    },

    /// An insertion index outside the valid range
    #[error("Index {index} is out of range (0..={len})")]
    InvalidIndex { index: i64, len: usize },

    /// A drop target that cannot be classified
    #[error("Drop target cannot be resolved: {0}")]
    Unresolvable(String),

    /// Exercises cannot be scheduled on a rest day
    #[error("Day {0} is a rest day")]
    RestDay(Uuid),

    /// The microcycle already holds the maximum number of days
    #[error("Microcycle cannot hold more than {limit} days")]
    CapacityExceeded { limit: u32 },

    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Exercise library validation error
    #[error("Library validation error: {0}")]
    LibraryValidation(String),

    /// Board state error
    #[error("State error: {0}")]
    State(String),
}

impl Error {
    pub(crate) fn item_not_found(id: Uuid) -> Self {
        Error::NotFound {
            entity: Entity::Item,
            id: id.to_string(),
        }
    }

    pub(crate) fn day_not_found(id: Uuid) -> Self {
        Error::NotFound {
            entity: Entity::Day,
            id: id.to_string(),
        }
    }

    /// Errors the UI should treat as "the drag did nothing"
    pub fn is_silent(&self) -> bool {
        matches!(self, Error::NotFound { .. } | Error::Unresolvable(_))
    }
}
