//! Error types for ALPACA analysis
//!
//! All fallible operations return `Result<T, Error>`.
//! Lookup failures carry the requested kind and identifier so a compiler
//! front end can report a precise undefined-reference diagnostic.

use thiserror::Error;

use crate::ast::NodeKind;

/// ALPACA analysis error types
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// No definition of the given kind carries the given identifier
    #[error("No such {kind} '{id}'")]
    NotFound { kind: NodeKind, id: String },

    /// Playfield data references a glyph no state declares
    #[error("Undeclared glyph '{glyph}' in playfield at ({x}, {y})")]
    UnknownGlyph { glyph: char, x: i64, y: i64 },

    /// Tree shape does not match what the parser guarantees
    #[error("Malformed AST: expected {expected}, found {found}")]
    Structure { expected: String, found: String },

    /// Two states share a display glyph (strict glyph policy only)
    #[error("Glyph '{glyph}' is declared by both '{first}' and '{second}'")]
    GlyphCollision {
        glyph: char,
        first: String,
        second: String,
    },

    /// Input could not be decoded into an AST
    #[error("Input error: {0}")]
    Input(String),
}

impl Error {
    pub(crate) fn structure(expected: impl Into<String>, found: impl Into<String>) -> Self {
        Error::Structure {
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// True for lookup-shaped failures (missing definition or glyph)
    pub fn is_lookup(&self) -> bool {
        matches!(self, Error::NotFound { .. } | Error::UnknownGlyph { .. })
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Input(err.to_string())
    }
}

/// Result type alias for ALPACA operations
pub type Result<T> = std::result::Result<T, Error>;
