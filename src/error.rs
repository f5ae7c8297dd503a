use thiserror::Error;

use crate::model::EntryId;

/// A config that breaks one of the radar data model invariants.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigValidationError {
    #[error("invalid config shape at line {line}, column {column}: {reason}")]
    Shape {
        reason: String,
        line: usize,
        column: usize,
    },

    #[error("expected exactly 4 quadrants, found {found}")]
    QuadrantCount { found: usize },

    #[error("quadrant display orders must be a permutation of 0..=3, got {orders:?}")]
    QuadrantOrder { orders: Vec<usize> },

    #[error("ring display orders must be a permutation of 0..{count}, got {orders:?}")]
    RingOrder { count: usize, orders: Vec<usize> },

    #[error("entry {id} references quadrant {index}, but only {count} quadrants exist")]
    QuadrantIndexOutOfRange {
        id: EntryId,
        index: usize,
        count: usize,
    },

    #[error("entry {id} references ring {index}, but only {count} rings exist")]
    RingIndexOutOfRange {
        id: EntryId,
        index: usize,
        count: usize,
    },

    #[error("entry id {id} appears more than once")]
    DuplicateEntryId { id: EntryId },

    #[error("ring {ring} has an invalid color {color:?}")]
    InvalidColor { ring: usize, color: String },

    #[error("ring band {band} has zero width")]
    ZeroWidthRing { band: usize },

    #[error("ringRadii lists {found} radii for {expected} rings")]
    RingRadiiCount { expected: usize, found: usize },

    #[error("extra field {key:?} shadows a radar field")]
    ReservedExtraField { key: String },

    #[error("invalid display option {field}: {reason}")]
    InvalidDisplayOption {
        field: &'static str,
        reason: String,
    },
}

/// Exchange text that is not well-formed JSON.
///
/// The original text is kept so a host can show it back to the user.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("malformed config text at line {line}, column {column}: {reason}")]
pub struct ParseError {
    pub reason: String,
    pub line: usize,
    pub column: usize,
    pub text: String,
}

impl ParseError {
    pub fn source_text(&self) -> &str {
        &self.text
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    #[error("a radar needs at least one ring")]
    NoRings,

    #[error(transparent)]
    InvalidConfig(#[from] ConfigValidationError),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RadarError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Validation(#[from] ConfigValidationError),

    #[error(transparent)]
    Layout(#[from] LayoutError),

    #[error("failed to serialize config: {0}")]
    Export(String),
}
