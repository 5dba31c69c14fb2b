//! Representation map and playfield materialization
//!
//! A description may carry a literal playfield: sparse (x, y, glyph)
//! triples. Materializing it translates each glyph to its state through the
//! representation map and places it into a [`Playfield`] seeded with the
//! default state (the first state declared).
//!
//! The grid storage itself belongs to the caller. This module only needs
//! the capability described by the [`Playfield`] trait; [`SparsePlayfield`]
//! is a map-backed implementation for tools and tests.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::accessor::{defn_id, defns_of_kind, get_playfield_node};
use crate::ast::{Node, NodeKind};
use crate::config::GlyphPolicy;
use crate::{Error, Result};

/// Display glyph → state id
pub type RepresentationMap = BTreeMap<char, String>;

// ── Representation map ───────────────────────────────────

/// Map each state's glyph to its id. On a shared glyph the state declared
/// last wins.
pub fn construct_representation_map(alpaca: &Node) -> Result<RepresentationMap> {
    construct_representation_map_with(alpaca, GlyphPolicy::LastWins)
}

/// Map each state's glyph to its id under the given collision policy.
///
/// # Errors
/// `GlyphCollision` under `GlyphPolicy::Reject` when two states share a glyph;
/// `Structure` when a state has no `CharRepr` glyph.
pub fn construct_representation_map_with(
    alpaca: &Node,
    policy: GlyphPolicy,
) -> Result<RepresentationMap> {
    let mut map = RepresentationMap::new();
    for defn in defns_of_kind(alpaca, NodeKind::StateDefn)? {
        let state_id = defn_id(defn)?;
        let glyph = state_glyph(defn)?;
        match map.entry(glyph) {
            Entry::Vacant(slot) => {
                slot.insert(state_id.to_string());
            }
            Entry::Occupied(mut slot) => {
                if policy == GlyphPolicy::Reject {
                    return Err(Error::GlyphCollision {
                        glyph,
                        first: slot.get().clone(),
                        second: state_id.to_string(),
                    });
                }
                warn!(%glyph, previous = %slot.get(), state = state_id, "glyph reassigned");
                slot.insert(state_id.to_string());
            }
        }
    }
    Ok(map)
}

fn state_glyph(state_ast: &Node) -> Result<char> {
    state_ast
        .child(NodeKind::CharRepr)
        .and_then(Node::glyph)
        .ok_or_else(|| Error::structure("CharRepr glyph under StateDefn", "none"))
}

/// Identifier of the first declared state, the implicit background value.
/// `None` when the description declares no states.
pub fn get_default_state(alpaca: &Node) -> Result<Option<&str>> {
    defns_of_kind(alpaca, NodeKind::StateDefn)?
        .next()
        .map(defn_id)
        .transpose()
}

// ── Playfield capability ─────────────────────────────────

/// Grid storage the materializer writes into
pub trait Playfield: Sized {
    /// Create an empty playfield whose unset cells read as `default_state`
    fn seeded(default_state: Option<&str>, repr: &RepresentationMap) -> Self;

    fn place(&mut self, x: i64, y: i64, state_id: &str);

    /// Recompute occupied bounds after a batch of `place` calls
    fn recompute_bounds(&mut self);
}

/// Build the description's literal playfield.
///
/// Returns `Ok(None)` when the `Playfield` node carries no grid.
///
/// # Errors
/// `UnknownGlyph` at the first glyph with no declared state.
pub fn get_defined_playfield<P: Playfield>(alpaca: &Node) -> Result<Option<P>> {
    get_defined_playfield_with(alpaca, GlyphPolicy::LastWins)
}

pub fn get_defined_playfield_with<P: Playfield>(
    alpaca: &Node,
    policy: GlyphPolicy,
) -> Result<Option<P>> {
    let grid = match get_playfield_node(alpaca)?.grid() {
        Some(grid) => grid,
        None => return Ok(None),
    };

    let repr_map = construct_representation_map_with(alpaca, policy)?;
    let mut playfield = P::seeded(get_default_state(alpaca)?, &repr_map);
    for &(x, y, glyph) in grid {
        let state_id = repr_map
            .get(&glyph)
            .ok_or(Error::UnknownGlyph { glyph, x, y })?;
        playfield.place(x, y, state_id);
    }
    playfield.recompute_bounds();

    debug!(cells = grid.len(), "materialized playfield");
    Ok(Some(playfield))
}

// ── Sparse playfield ─────────────────────────────────────

/// Occupied-area bounds, inclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Limits {
    pub min_x: i64,
    pub min_y: i64,
    pub max_x: i64,
    pub max_y: i64,
}

impl Limits {
    pub fn contains(&self, x: i64, y: i64) -> bool {
        (self.min_x..=self.max_x).contains(&x) && (self.min_y..=self.max_y).contains(&y)
    }
}

/// Map-backed playfield storing only cells that differ from the default
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SparsePlayfield {
    default_state: Option<String>,
    // keyed (y, x) so iteration runs row by row
    cells: BTreeMap<(i64, i64), String>,
    limits: Option<Limits>,
}

impl SparsePlayfield {
    pub fn default_state(&self) -> Option<&str> {
        self.default_state.as_deref()
    }

    /// State at (x, y): the placed state, or the default
    pub fn get(&self, x: i64, y: i64) -> Option<&str> {
        self.cells
            .get(&(y, x))
            .map(String::as_str)
            .or(self.default_state())
    }

    /// Bounds as of the last `recompute_bounds`; `None` when nothing is placed
    pub fn limits(&self) -> Option<Limits> {
        self.limits
    }

    /// Placed cells as (x, y, state), row by row
    pub fn cells(&self) -> impl Iterator<Item = (i64, i64, &str)> + '_ {
        self.cells
            .iter()
            .map(|(&(y, x), state)| (x, y, state.as_str()))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl Playfield for SparsePlayfield {
    fn seeded(default_state: Option<&str>, _repr: &RepresentationMap) -> Self {
        Self {
            default_state: default_state.map(str::to_string),
            cells: BTreeMap::new(),
            limits: None,
        }
    }

    fn place(&mut self, x: i64, y: i64, state_id: &str) {
        if self.default_state() == Some(state_id) {
            self.cells.remove(&(y, x));
        } else {
            self.cells.insert((y, x), state_id.to_string());
        }
    }

    fn recompute_bounds(&mut self) {
        self.limits = self.cells.keys().fold(None, |acc, &(y, x)| {
            Some(match acc {
                None => Limits {
                    min_x: x,
                    min_y: y,
                    max_x: x,
                    max_y: y,
                },
                Some(l) => Limits {
                    min_x: l.min_x.min(x),
                    min_y: l.min_y.min(y),
                    max_x: l.max_x.max(x),
                    max_y: l.max_y.max(y),
                },
            })
        });
    }
}
