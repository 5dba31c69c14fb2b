//! Offset bounding-box inference
//!
//! Rule bodies and neighbourhoods refer to neighbouring cells by relative
//! (dx, dy) offsets. The bounding box of every offset referenced tells the
//! code generator how large a neighbourhood window to read.

use serde::{Deserialize, Serialize};

use crate::accessor::{find_nbhd_defn, get_defns};
use crate::ast::{Node, NodeKind};
use crate::Result;

/// Axis-aligned rectangle of relative offsets, inclusive.
///
/// Only grows: `min <= max` holds on construction from a point and is
/// preserved by [`BoundingBox::expand_to_contain`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_dx: i64,
    pub min_dy: i64,
    pub max_dx: i64,
    pub max_dy: i64,
}

impl BoundingBox {
    pub fn new(min_dx: i64, min_dy: i64, max_dx: i64, max_dy: i64) -> Self {
        Self {
            min_dx,
            min_dy,
            max_dx,
            max_dy,
        }
    }

    /// Widen each bound the point falls outside of
    pub fn expand_to_contain(&mut self, dx: i64, dy: i64) {
        if dx < self.min_dx {
            self.min_dx = dx;
        }
        if dx > self.max_dx {
            self.max_dx = dx;
        }
        if dy < self.min_dy {
            self.min_dy = dy;
        }
        if dy > self.max_dy {
            self.max_dy = dy;
        }
    }

    pub fn contains(&self, dx: i64, dy: i64) -> bool {
        (self.min_dx..=self.max_dx).contains(&dx) && (self.min_dy..=self.max_dy).contains(&dy)
    }

    pub fn width(&self) -> i64 {
        self.max_dx - self.min_dx + 1
    }

    pub fn height(&self) -> i64 {
        self.max_dy - self.min_dy + 1
    }
}

impl std::fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "BoundingBox({}, {}, {}, {})",
            self.min_dx, self.min_dy, self.max_dx, self.max_dy
        )
    }
}

/// Expand `bb` to contain every `StateRefRel` offset in the subtree.
///
/// Pre-order over every node, whatever its kind; nothing is pruned.
pub fn fit_bounding_box(ast: &Node, bb: &mut BoundingBox) {
    if ast.kind == NodeKind::StateRefRel {
        if let Some((dx, dy)) = ast.offset() {
            bb.expand_to_contain(dx, dy);
        }
    }
    for child in &ast.children {
        fit_bounding_box(child, bb);
    }
}

/// Footprint of a named neighbourhood, starting from the origin
pub fn nbhd_bounding_box(alpaca: &Node, nbhd_id: &str) -> Result<BoundingBox> {
    let mut bb = BoundingBox::default();
    fit_bounding_box(find_nbhd_defn(alpaca, nbhd_id)?, &mut bb);
    Ok(bb)
}

/// Footprint of every relative reference in the description's definitions
pub fn rules_bounding_box(alpaca: &Node) -> Result<BoundingBox> {
    let mut bb = BoundingBox::default();
    fit_bounding_box(get_defns(alpaca)?, &mut bb);
    Ok(bb)
}
