//! Structural getters over a parsed description
//!
//! Lookups are linear scans over the direct children of `Defns`.
//! Descriptions hold tens of definitions, so no index is kept.

use crate::ast::{Node, NodeKind};
use crate::{Error, Result};

/// Return the `Defns` child of the `Alpaca` root.
///
/// # Errors
/// `Structure` if the root is not `Alpaca` or its first child is not `Defns`.
pub fn get_defns(alpaca: &Node) -> Result<&Node> {
    expect_kind(alpaca, NodeKind::Alpaca)?;
    let defns = alpaca
        .children
        .first()
        .ok_or_else(|| Error::structure("Defns", "no children"))?;
    expect_kind(defns, NodeKind::Defns)?;
    Ok(defns)
}

/// Return the `Playfield` child of the `Alpaca` root.
pub fn get_playfield_node(alpaca: &Node) -> Result<&Node> {
    expect_kind(alpaca, NodeKind::Alpaca)?;
    let playfield = alpaca
        .children
        .get(1)
        .ok_or_else(|| Error::structure("Playfield", "missing second child"))?;
    expect_kind(playfield, NodeKind::Playfield)?;
    Ok(playfield)
}

/// Find the first definition of `kind` whose identifier is `id`.
///
/// # Errors
/// `NotFound` carrying `kind` and `id` when nothing matches.
pub fn find_defn<'a>(alpaca: &'a Node, kind: NodeKind, id: &str) -> Result<&'a Node> {
    get_defns(alpaca)?
        .children
        .iter()
        .find(|defn| defn.kind == kind && defn.id() == Some(id))
        .ok_or_else(|| Error::NotFound {
            kind,
            id: id.to_string(),
        })
}

pub fn find_state_defn<'a>(alpaca: &'a Node, state_id: &str) -> Result<&'a Node> {
    find_defn(alpaca, NodeKind::StateDefn, state_id)
}

pub fn find_class_defn<'a>(alpaca: &'a Node, class_id: &str) -> Result<&'a Node> {
    find_defn(alpaca, NodeKind::ClassDefn, class_id)
}

pub fn find_nbhd_defn<'a>(alpaca: &'a Node, nbhd_id: &str) -> Result<&'a Node> {
    find_defn(alpaca, NodeKind::NbhdDefn, nbhd_id)
}

/// All definitions of one kind, in declaration order
pub fn defns_of_kind<'a>(
    alpaca: &'a Node,
    kind: NodeKind,
) -> Result<impl Iterator<Item = &'a Node> + 'a> {
    Ok(get_defns(alpaca)?
        .children
        .iter()
        .filter(move |defn| defn.kind == kind))
}

/// Identifier of a definition node
pub(crate) fn defn_id(defn: &Node) -> Result<&str> {
    defn.id()
        .ok_or_else(|| Error::structure(format!("identifier on {}", defn.kind), "no identifier"))
}

/// The `MembershipDecls` child of a state or class definition
pub(crate) fn membership_decls(defn: &Node) -> Result<&Node> {
    defn.child(NodeKind::MembershipDecls).ok_or_else(|| {
        Error::structure(
            format!("MembershipDecls under {}", defn.kind),
            "no such child",
        )
    })
}

/// Declared parent class ids, in declaration order
pub(crate) fn declared_parents(decls: &Node) -> Result<Vec<&str>> {
    expect_kind(decls, NodeKind::MembershipDecls)?;
    decls
        .children
        .iter()
        .map(|decl| {
            expect_kind(decl, NodeKind::ClassDecl)?;
            defn_id(decl)
        })
        .collect()
}

pub(crate) fn expect_kind(node: &Node, kind: NodeKind) -> Result<()> {
    if node.kind == kind {
        Ok(())
    } else {
        Err(Error::structure(kind.to_string(), node.kind.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Node {
        Node::alpaca(
            Node::defns(vec![
                Node::state_defn("floor", '.', &[]),
                Node::class_defn("solid", &[]),
                Node::state_defn("wall", '#', &["solid"]),
                Node::nbhd_defn("solid", &[(0, 1)]),
            ]),
            Node::playfield(None),
        )
    }

    #[test]
    fn test_get_defns() {
        let ast = sample();
        assert_eq!(get_defns(&ast).unwrap().children.len(), 4);
    }

    #[test]
    fn test_get_defns_rejects_wrong_root() {
        let ast = Node::defns(vec![]);
        let err = get_defns(&ast).unwrap_err();
        assert!(matches!(err, Error::Structure { .. }));
    }

    #[test]
    fn test_get_defns_rejects_wrong_first_child() {
        let ast = Node::alpaca(Node::playfield(None), Node::defns(vec![]));
        assert!(matches!(get_defns(&ast), Err(Error::Structure { .. })));
    }

    #[test]
    fn test_find_defn_matches_kind_and_id() {
        let ast = sample();
        let class = find_class_defn(&ast, "solid").unwrap();
        assert_eq!(class.kind, NodeKind::ClassDefn);
        let nbhd = find_nbhd_defn(&ast, "solid").unwrap();
        assert_eq!(nbhd.kind, NodeKind::NbhdDefn);
        assert_eq!(find_state_defn(&ast, "wall").unwrap().id(), Some("wall"));
    }

    #[test]
    fn test_find_defn_not_found() {
        let ast = sample();
        let err = find_state_defn(&ast, "solid").unwrap_err();
        assert_eq!(
            err,
            Error::NotFound {
                kind: NodeKind::StateDefn,
                id: "solid".into()
            }
        );
    }

    #[test]
    fn test_find_defn_returns_first_duplicate() {
        let mut ast = sample();
        ast.children[0]
            .children
            .push(Node::state_defn("wall", 'W', &[]));
        let wall = find_state_defn(&ast, "wall").unwrap();
        assert_eq!(wall.child(NodeKind::CharRepr).unwrap().glyph(), Some('#'));
    }

    #[test]
    fn test_defns_of_kind_keeps_order() {
        let ast = sample();
        let ids: Vec<_> = defns_of_kind(&ast, NodeKind::StateDefn)
            .unwrap()
            .filter_map(Node::id)
            .collect();
        assert_eq!(ids, vec!["floor", "wall"]);
    }

    #[test]
    fn test_playfield_node_missing() {
        let ast = Node::new(NodeKind::Alpaca).with_children(vec![Node::defns(vec![])]);
        assert!(matches!(
            get_playfield_node(&ast),
            Err(Error::Structure { .. })
        ));
    }
}
