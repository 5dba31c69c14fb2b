//! Whole-description analysis report
//!
//! Runs every analysis once over a description and gathers the results into
//! one serializable value for later compiler stages and tooling.
//!
//! # Guarantees
//!
//! - **Deterministic**: every collection is ordered, so the same AST always
//!   serializes to the same bytes and the same fingerprint.
//! - **Fresh**: nothing is cached between calls.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::accessor::{defn_id, defns_of_kind, membership_decls};
use crate::ast::{Node, NodeKind};
use crate::bbox::{fit_bounding_box, rules_bounding_box, BoundingBox};
use crate::config::AnalysisConfig;
use crate::membership::{get_class_map, get_membership, ClassMap, ClassSet};
use crate::playfield::{
    construct_representation_map_with, get_default_state, get_defined_playfield_with, Limits,
    SparsePlayfield,
};
use crate::Result;

/// Everything the analysis knows about one description
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Analysis {
    pub default_state: Option<String>,
    /// Glyph (as a one-character string) → state id
    pub representation: BTreeMap<String, String>,
    /// State id → membership closure
    pub states: BTreeMap<String, ClassSet>,
    pub classes: ClassMap,
    /// Neighbourhood id → footprint
    pub neighbourhoods: BTreeMap<String, BoundingBox>,
    /// Footprint of every relative reference in the definitions
    pub bounding_box: BoundingBox,
    pub playfield: Option<PlayfieldSummary>,
}

/// Materialized playfield contents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayfieldSummary {
    pub default_state: Option<String>,
    pub cells: Vec<PlacedCell>,
    pub limits: Option<Limits>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacedCell {
    pub x: i64,
    pub y: i64,
    pub state: String,
}

impl From<&SparsePlayfield> for PlayfieldSummary {
    fn from(pf: &SparsePlayfield) -> Self {
        Self {
            default_state: pf.default_state().map(str::to_string),
            cells: pf
                .cells()
                .map(|(x, y, state)| PlacedCell {
                    x,
                    y,
                    state: state.to_string(),
                })
                .collect(),
            limits: pf.limits(),
        }
    }
}

impl Analysis {
    /// SHA-256 hex digest of the report's JSON form
    pub fn fingerprint(&self) -> Result<String> {
        let bytes = serde_json::to_vec(self)?;
        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        Ok(format!("{:x}", hasher.finalize()))
    }
}

/// Analyze a whole description.
///
/// # Errors
/// The first lookup, glyph or structure failure aborts the analysis.
pub fn analyze(alpaca: &Node, config: &AnalysisConfig) -> Result<Analysis> {
    let representation = construct_representation_map_with(alpaca, config.glyph_policy)?
        .into_iter()
        .map(|(glyph, state)| (glyph.to_string(), state))
        .collect();

    let mut states = BTreeMap::new();
    for state_ast in defns_of_kind(alpaca, NodeKind::StateDefn)? {
        let closure = get_membership(alpaca, membership_decls(state_ast)?)?;
        states
            .entry(defn_id(state_ast)?.to_string())
            .or_insert(closure);
    }

    let mut neighbourhoods = BTreeMap::new();
    for nbhd_ast in defns_of_kind(alpaca, NodeKind::NbhdDefn)? {
        let mut bb = BoundingBox::default();
        fit_bounding_box(nbhd_ast, &mut bb);
        neighbourhoods
            .entry(defn_id(nbhd_ast)?.to_string())
            .or_insert(bb);
    }

    let playfield = if config.include_playfield {
        get_defined_playfield_with::<SparsePlayfield>(alpaca, config.glyph_policy)?
            .as_ref()
            .map(PlayfieldSummary::from)
    } else {
        None
    };

    let analysis = Analysis {
        default_state: get_default_state(alpaca)?.map(str::to_string),
        representation,
        states,
        classes: get_class_map(alpaca)?,
        neighbourhoods,
        bounding_box: rules_bounding_box(alpaca)?,
        playfield,
    };

    debug!(
        states = analysis.states.len(),
        classes = analysis.classes.len(),
        neighbourhoods = analysis.neighbourhoods.len(),
        "analysis complete"
    );
    Ok(analysis)
}
