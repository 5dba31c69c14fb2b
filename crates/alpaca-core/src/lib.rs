//! ALPACA Core - static analysis of cellular-automaton descriptions
//!
//! Works over the AST an external parser produces for an ALPACA
//! description (states, classes, neighbourhoods and an optional playfield)
//! and answers what later compiler stages need to know.
//!
//! # Architecture
//!
//! ```text
//! Parser → AST → Accessor → Membership Resolver → Class Map
//!                   ↓
//!                Representation Map → Playfield Materializer
//!                   ↓
//!                Bounding-Box Inference
//! ```
//!
//! # Guarantees
//!
//! - **Read-only**: the AST is never mutated; every call owns its results
//! - **Terminating**: cyclic class declarations are cut by a visited set
//! - **Deterministic**: ordered sets and maps throughout

pub mod accessor;
pub mod analysis;
pub mod ast;
pub mod bbox;
pub mod config;
pub mod error;
pub mod membership;
pub mod playfield;

pub use accessor::{find_class_defn, find_defn, find_nbhd_defn, find_state_defn, get_defns};
pub use analysis::{analyze, Analysis};
pub use ast::{Node, NodeKind, Value};
pub use bbox::{fit_bounding_box, BoundingBox};
pub use config::{AnalysisConfig, GlyphPolicy};
pub use error::{Error, Result};
pub use membership::{
    class_defn_is_a, get_class_map, get_class_membership, get_membership, get_state_membership,
    state_defn_is_a, ClassMap, ClassSet,
};
pub use playfield::{
    construct_representation_map, get_default_state, get_defined_playfield, Playfield,
    RepresentationMap, SparsePlayfield,
};

/// Decode an AST from the JSON form an external parser emits
pub fn from_json(text: &str) -> Result<Node> {
    Ok(serde_json::from_str(text)?)
}
