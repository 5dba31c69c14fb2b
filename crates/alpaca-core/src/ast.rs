//! ALPACA AST Types — tagged tree handed over by the parser
//!
//! Every node carries a kind tag, an optional kind-specific payload and an
//! ordered list of children. Trees are immutable once produced; everything
//! in this crate reads them through shared references.
//!
//! The serde form is what an external parser emits as JSON:
//!
//! ```text
//! { "kind": "StateDefn", "value": { "id": "wall" }, "children": [ ... ] }
//! ```

use serde::{Deserialize, Serialize};

/// Closed set of node kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    // Structure
    Alpaca,
    Defns,
    Playfield,

    // Definitions
    StateDefn,
    ClassDefn,
    NbhdDefn,
    CharRepr,
    MembershipDecls,
    ClassDecl,

    // Rules and expressions
    Rules,
    Rule,
    Neighbourhood,
    BoolOp,
    Not,
    BoolLit,
    Adjacency,
    RelationalEq,
    RelationalClass,
    StateRefRel,
    StateRefName,
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Kind-specific payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Value {
    /// Identifier of a state, class or neighbourhood
    Id(String),
    /// Single display glyph
    Char(char),
    /// Relative (dx, dy) offset
    Offset(i64, i64),
    Int(i64),
    /// Literal playfield data as (x, y, glyph) triples
    Grid(Vec<(i64, i64, char)>),
}

/// A single AST node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub kind: NodeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Node>,
}

impl Node {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            value: None,
            children: Vec::new(),
        }
    }

    pub fn with_value(mut self, value: Value) -> Self {
        self.value = Some(value);
        self
    }

    pub fn with_children(mut self, children: Vec<Node>) -> Self {
        self.children = children;
        self
    }

    // ── Payload accessors ────────────────────────────────

    /// Identifier payload, if this node carries one
    pub fn id(&self) -> Option<&str> {
        match &self.value {
            Some(Value::Id(id)) => Some(id),
            _ => None,
        }
    }

    pub fn glyph(&self) -> Option<char> {
        match self.value {
            Some(Value::Char(c)) => Some(c),
            _ => None,
        }
    }

    pub fn offset(&self) -> Option<(i64, i64)> {
        match self.value {
            Some(Value::Offset(dx, dy)) => Some((dx, dy)),
            _ => None,
        }
    }

    pub fn grid(&self) -> Option<&[(i64, i64, char)]> {
        match &self.value {
            Some(Value::Grid(cells)) => Some(cells),
            _ => None,
        }
    }

    /// First direct child of the given kind
    pub fn child(&self, kind: NodeKind) -> Option<&Node> {
        self.children.iter().find(|c| c.kind == kind)
    }

    // ── Shape constructors ───────────────────────────────

    /// Root node: definitions followed by the playfield
    pub fn alpaca(defns: Node, playfield: Node) -> Self {
        Node::new(NodeKind::Alpaca).with_children(vec![defns, playfield])
    }

    pub fn defns(definitions: Vec<Node>) -> Self {
        Node::new(NodeKind::Defns).with_children(definitions)
    }

    /// `state <id> "<glyph>" is <parents...>` with an empty rule list
    pub fn state_defn(id: &str, glyph: char, parents: &[&str]) -> Self {
        Node::new(NodeKind::StateDefn)
            .with_value(Value::Id(id.to_string()))
            .with_children(vec![
                Node::new(NodeKind::CharRepr).with_value(Value::Char(glyph)),
                Node::new(NodeKind::Rules),
                Node::membership_decls(parents),
            ])
    }

    /// `class <id> is <parents...>` with an empty rule list
    pub fn class_defn(id: &str, parents: &[&str]) -> Self {
        Node::new(NodeKind::ClassDefn)
            .with_value(Value::Id(id.to_string()))
            .with_children(vec![
                Node::new(NodeKind::Rules),
                Node::membership_decls(parents),
            ])
    }

    pub fn nbhd_defn(id: &str, offsets: &[(i64, i64)]) -> Self {
        let refs = offsets
            .iter()
            .map(|&(dx, dy)| Node::state_ref_rel(dx, dy))
            .collect();
        Node::new(NodeKind::NbhdDefn)
            .with_value(Value::Id(id.to_string()))
            .with_children(vec![Node::new(NodeKind::Neighbourhood).with_children(refs)])
    }

    pub fn membership_decls(parents: &[&str]) -> Self {
        let decls = parents
            .iter()
            .map(|p| Node::new(NodeKind::ClassDecl).with_value(Value::Id(p.to_string())))
            .collect();
        Node::new(NodeKind::MembershipDecls).with_children(decls)
    }

    /// Playfield node; `None` means the description defines no playfield
    pub fn playfield(grid: Option<Vec<(i64, i64, char)>>) -> Self {
        let node = Node::new(NodeKind::Playfield);
        match grid {
            Some(cells) => node.with_value(Value::Grid(cells)),
            None => node,
        }
    }

    pub fn state_ref_rel(dx: i64, dy: i64) -> Self {
        Node::new(NodeKind::StateRefRel).with_value(Value::Offset(dx, dy))
    }
}
