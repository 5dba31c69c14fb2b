//! Membership resolver — transitive "is-a" over declared class edges
//!
//! States and classes declare parent classes in a `MembershipDecls` block.
//! A state or class may declare several parents; its membership is the union
//! of every parent and every parent's own membership.
//!
//! # Cycles
//!
//! The declared graph is not guaranteed to be acyclic. Every closure and
//! predicate carries a visited set: an id that has already been included is
//! not descended into again. The closure of a subject is therefore exactly
//! the set of class ids reachable from its declared parents. A class that is
//! its own ancestor (directly or through a cycle) appears in its own closure;
//! a class that is not never does.
//!
//! Closures are recomputed on every call. Nothing is cached.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, trace, warn};

use crate::accessor::{
    declared_parents, defn_id, defns_of_kind, find_class_defn, find_state_defn, membership_decls,
};
use crate::ast::{Node, NodeKind};
use crate::Result;

/// Set of class ids
pub type ClassSet = BTreeSet<String>;

/// Class id → ids of member states
pub type ClassMap = BTreeMap<String, BTreeSet<String>>;

// ── Predicates ───────────────────────────────────────────

/// True iff the state declares `class_id` as a parent, or any declared
/// parent class is (transitively) a `class_id`.
///
/// # Errors
/// `NotFound` if a class reached during the search is not defined.
pub fn state_defn_is_a(alpaca: &Node, state_ast: &Node, class_id: &str) -> Result<bool> {
    let mut visited = BTreeSet::new();
    for parent in declared_parents(membership_decls(state_ast)?)? {
        if parent == class_id {
            return Ok(true);
        }
        let class_ast = find_class_defn(alpaca, parent)?;
        if class_is_a(alpaca, class_ast, class_id, &mut visited)? {
            return Ok(true);
        }
    }
    Ok(false)
}

/// True iff the class is `class_id` itself or has `class_id` as an ancestor.
pub fn class_defn_is_a(alpaca: &Node, class_ast: &Node, class_id: &str) -> Result<bool> {
    class_is_a(alpaca, class_ast, class_id, &mut BTreeSet::new())
}

fn class_is_a<'a>(
    alpaca: &'a Node,
    class_ast: &'a Node,
    class_id: &str,
    visited: &mut BTreeSet<&'a str>,
) -> Result<bool> {
    let own_id = defn_id(class_ast)?;
    if own_id == class_id {
        return Ok(true);
    }
    if !visited.insert(own_id) {
        trace!(class = own_id, "already searched");
        return Ok(false);
    }
    for parent in declared_parents(membership_decls(class_ast)?)? {
        if parent == class_id {
            return Ok(true);
        }
        let parent_ast = find_class_defn(alpaca, parent)?;
        if class_is_a(alpaca, parent_ast, class_id, visited)? {
            return Ok(true);
        }
    }
    Ok(false)
}

// ── Closures ─────────────────────────────────────────────

/// Every class id reachable from the declared parents in `class_decls`.
///
/// Depth-first in declaration order; revisited ids are skipped.
pub fn get_membership<'a>(alpaca: &'a Node, class_decls: &'a Node) -> Result<ClassSet> {
    let mut membership = ClassSet::new();
    let mut pending: Vec<&str> = declared_parents(class_decls)?;
    pending.reverse();

    while let Some(class_id) = pending.pop() {
        if !membership.insert(class_id.to_string()) {
            trace!(class = class_id, "already included");
            continue;
        }
        let class_ast = find_class_defn(alpaca, class_id)?;
        let mut parents = declared_parents(membership_decls(class_ast)?)?;
        parents.reverse();
        pending.extend(parents);
    }

    Ok(membership)
}

/// All classes the given state belongs to.
///
/// # Errors
/// `NotFound` for an undefined state or any undefined ancestor class.
pub fn get_state_membership(alpaca: &Node, state_id: &str) -> Result<ClassSet> {
    let state_ast = find_state_defn(alpaca, state_id)?;
    get_membership(alpaca, membership_decls(state_ast)?)
}

/// All classes the given class belongs to. The class itself is included
/// only if it is its own ancestor.
pub fn get_class_membership(alpaca: &Node, class_id: &str) -> Result<ClassSet> {
    let class_ast = find_class_defn(alpaca, class_id)?;
    let membership = get_membership(alpaca, membership_decls(class_ast)?)?;
    if membership.contains(class_id) {
        warn!(class = class_id, "class is its own ancestor");
    }
    Ok(membership)
}

// ── Class map ────────────────────────────────────────────

/// Invert per-state membership into class id → member state ids.
///
/// A class with no member states is absent, not mapped to an empty set.
pub fn get_class_map(alpaca: &Node) -> Result<ClassMap> {
    let mut class_map = ClassMap::new();
    let mut states = 0usize;

    for state_ast in defns_of_kind(alpaca, NodeKind::StateDefn)? {
        let state_id = defn_id(state_ast)?;
        for class_id in get_membership(alpaca, membership_decls(state_ast)?)? {
            class_map
                .entry(class_id)
                .or_default()
                .insert(state_id.to_string());
        }
        states += 1;
    }

    debug!(states, classes = class_map.len(), "built class map");
    Ok(class_map)
}

/// States belonging to `class_id`; empty when the class has no members.
pub fn class_members(alpaca: &Node, class_id: &str) -> Result<BTreeSet<String>> {
    Ok(get_class_map(alpaca)?
        .remove(class_id)
        .unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    fn set(ids: &[&str]) -> ClassSet {
        ids.iter().map(|s| s.to_string()).collect()
    }

    fn description(defns: Vec<Node>) -> Node {
        Node::alpaca(Node::defns(defns), Node::playfield(None))
    }

    fn zoo() -> Node {
        description(vec![
            Node::class_defn("x", &[]),
            Node::class_defn("a", &["x"]),
            Node::class_defn("b", &[]),
            Node::state_defn("s", 's', &["a", "b"]),
            Node::state_defn("t", 't', &["b"]),
            Node::state_defn("u", 'u', &[]),
        ])
    }

    // ── Closures ─────────────────────────────────────────

    #[test]
    fn test_class_without_parents_has_empty_membership() {
        let ast = zoo();
        assert_eq!(get_class_membership(&ast, "b").unwrap(), ClassSet::new());
        assert_eq!(get_class_membership(&ast, "x").unwrap(), ClassSet::new());
    }

    #[test]
    fn test_state_membership_unions_all_parents() {
        let ast = zoo();
        assert_eq!(get_state_membership(&ast, "s").unwrap(), set(&["a", "b", "x"]));
        assert_eq!(get_state_membership(&ast, "u").unwrap(), ClassSet::new());
    }

    #[test]
    fn test_class_membership_excludes_self() {
        let ast = zoo();
        assert_eq!(get_class_membership(&ast, "a").unwrap(), set(&["x"]));
    }

    #[test]
    fn test_diamond_inheritance() {
        let ast = description(vec![
            Node::class_defn("top", &[]),
            Node::class_defn("left", &["top"]),
            Node::class_defn("right", &["top"]),
            Node::class_defn("bottom", &["left", "right"]),
            Node::state_defn("cell", 'c', &["bottom"]),
        ]);
        assert_eq!(
            get_state_membership(&ast, "cell").unwrap(),
            set(&["bottom", "left", "right", "top"])
        );
    }

    #[test]
    fn test_cycle_terminates_with_reachable_set() {
        let ast = description(vec![
            Node::class_defn("a", &["b"]),
            Node::class_defn("b", &["c"]),
            Node::class_defn("c", &["a"]),
            Node::state_defn("s", 's', &["a"]),
        ]);
        assert_eq!(get_class_membership(&ast, "a").unwrap(), set(&["a", "b", "c"]));
        assert_eq!(get_state_membership(&ast, "s").unwrap(), set(&["a", "b", "c"]));
    }

    #[test]
    fn test_self_declared_parent_is_included() {
        let ast = description(vec![Node::class_defn("loop", &["loop"])]);
        assert_eq!(get_class_membership(&ast, "loop").unwrap(), set(&["loop"]));
    }

    #[test]
    fn test_undefined_parent_is_lookup_error() {
        let ast = description(vec![Node::state_defn("s", 's', &["ghost"])]);
        let err = get_state_membership(&ast, "s").unwrap_err();
        assert_eq!(
            err,
            Error::NotFound {
                kind: NodeKind::ClassDefn,
                id: "ghost".into()
            }
        );
    }

    #[test]
    fn test_undefined_state_is_lookup_error() {
        let ast = zoo();
        assert!(matches!(
            get_state_membership(&ast, "nope"),
            Err(Error::NotFound {
                kind: NodeKind::StateDefn,
                ..
            })
        ));
    }

    #[test]
    fn test_membership_is_idempotent() {
        let ast = zoo();
        let first = get_state_membership(&ast, "s").unwrap();
        let second = get_state_membership(&ast, "s").unwrap();
        assert_eq!(first, second);
        assert_eq!(get_class_map(&ast).unwrap(), get_class_map(&ast).unwrap());
    }

    // ── Predicates ───────────────────────────────────────

    #[test]
    fn test_state_is_a_direct_and_inherited() {
        let ast = zoo();
        let s = find_state_defn(&ast, "s").unwrap();
        assert!(state_defn_is_a(&ast, s, "a").unwrap());
        assert!(state_defn_is_a(&ast, s, "x").unwrap());
        assert!(!state_defn_is_a(&ast, s, "s").unwrap());
        let t = find_state_defn(&ast, "t").unwrap();
        assert!(!state_defn_is_a(&ast, t, "x").unwrap());
    }

    #[test]
    fn test_class_is_a_includes_self() {
        let ast = zoo();
        let a = find_class_defn(&ast, "a").unwrap();
        assert!(class_defn_is_a(&ast, a, "a").unwrap());
        assert!(class_defn_is_a(&ast, a, "x").unwrap());
        assert!(!class_defn_is_a(&ast, a, "b").unwrap());
    }

    #[test]
    fn test_class_is_a_descends_through_parent_definitions() {
        let ast = description(vec![
            Node::class_defn("root", &[]),
            Node::class_defn("mid", &["root"]),
            Node::class_defn("leaf", &["mid"]),
        ]);
        let leaf = find_class_defn(&ast, "leaf").unwrap();
        assert!(class_defn_is_a(&ast, leaf, "root").unwrap());
    }

    #[test]
    fn test_predicates_terminate_on_cycles() {
        let ast = description(vec![
            Node::class_defn("a", &["b"]),
            Node::class_defn("b", &["a"]),
            Node::state_defn("s", 's', &["a"]),
        ]);
        let a = find_class_defn(&ast, "a").unwrap();
        assert!(!class_defn_is_a(&ast, a, "zzz").unwrap());
        let s = find_state_defn(&ast, "s").unwrap();
        assert!(!state_defn_is_a(&ast, s, "zzz").unwrap());
        assert!(state_defn_is_a(&ast, s, "b").unwrap());
    }

    #[test]
    fn test_predicates_agree_with_closure() {
        let ast = zoo();
        for state in ["s", "t", "u"] {
            let closure = get_state_membership(&ast, state).unwrap();
            let state_ast = find_state_defn(&ast, state).unwrap();
            for class in ["a", "b", "x"] {
                assert_eq!(
                    state_defn_is_a(&ast, state_ast, class).unwrap(),
                    closure.contains(class),
                    "{} is_a {}",
                    state,
                    class
                );
            }
        }
    }

    // ── Class map ────────────────────────────────────────

    #[test]
    fn test_class_map_inverts_state_membership() {
        let ast = zoo();
        let map = get_class_map(&ast).unwrap();
        assert_eq!(map.len(), 3);
        assert_eq!(map["a"], set(&["s"]));
        assert_eq!(map["b"], set(&["s", "t"]));
        assert_eq!(map["x"], set(&["s"]));

        for (class_id, members) in &map {
            let expected: BTreeSet<String> = ["s", "t", "u"]
                .iter()
                .filter(|s| get_state_membership(&ast, s).unwrap().contains(class_id))
                .map(|s| s.to_string())
                .collect();
            assert_eq!(members, &expected);
        }
    }

    #[test]
    fn test_class_map_omits_memberless_classes() {
        let ast = description(vec![
            Node::class_defn("lonely", &[]),
            Node::state_defn("s", 's', &[]),
        ]);
        let map = get_class_map(&ast).unwrap();
        assert!(map.is_empty());
        assert!(class_members(&ast, "lonely").unwrap().is_empty());
    }

    #[test]
    fn test_class_members() {
        let ast = zoo();
        assert_eq!(class_members(&ast, "b").unwrap(), set(&["s", "t"]));
    }
}
