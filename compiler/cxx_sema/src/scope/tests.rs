use super::*;
use cxx_ir::{NameId, StringInterner};
use pretty_assertions::assert_eq;

fn sym(i: u32) -> SymbolId {
    SymbolId::new(i)
}

#[test]
fn nearest_scope_wins() {
    let interner = StringInterner::new();
    let x = interner.intern("x");
    let mut tree = ScopeTree::new();
    let ns = tree.push(ScopeKind::Namespace, ScopeTree::GLOBAL, None, 0);
    let block = tree.push(ScopeKind::Block, ns, None, 0);

    tree.declare(ScopeTree::GLOBAL, x, sym(1), 1);
    assert_eq!(tree.lookup(block, x, Some(100)).as_slice(), &[sym(1)]);

    tree.declare(ns, x, sym(2), 5);
    assert_eq!(tree.lookup(block, x, Some(100)).as_slice(), &[sym(2)]);
    assert_eq!(tree.lookup(ScopeTree::GLOBAL, x, None).as_slice(), &[sym(1)]);
}

#[test]
fn same_scope_overloads_merge_in_order() {
    let interner = StringInterner::new();
    let f = interner.intern("f");
    let mut tree = ScopeTree::new();
    tree.declare(ScopeTree::GLOBAL, f, sym(3), 1);
    tree.declare(ScopeTree::GLOBAL, f, sym(1), 2);
    tree.declare(ScopeTree::GLOBAL, f, sym(3), 3);

    let inner = tree.push(ScopeKind::Function, ScopeTree::GLOBAL, None, 0);
    assert_eq!(tree.lookup(inner, f, None).as_slice(), &[sym(3), sym(1)]);
    assert_eq!(tree.get(ScopeTree::GLOBAL).symbols(), &[sym(3), sym(1)]);
}

#[test]
fn block_scope_respects_point_of_declaration() {
    let interner = StringInterner::new();
    let x = interner.intern("x");
    let mut tree = ScopeTree::new();
    tree.declare(ScopeTree::GLOBAL, x, sym(1), 1);
    let block = tree.push(ScopeKind::Block, ScopeTree::GLOBAL, None, 0);
    tree.declare(block, x, sym(2), 50);

    assert_eq!(tree.lookup(block, x, Some(10)).as_slice(), &[sym(1)]);
    assert_eq!(tree.lookup(block, x, Some(60)).as_slice(), &[sym(2)]);
}

#[test]
fn namespace_scope_ignores_order() {
    let interner = StringInterner::new();
    let f = interner.intern("f");
    let mut tree = ScopeTree::new();
    tree.declare(ScopeTree::GLOBAL, f, sym(1), 90);
    assert_eq!(tree.lookup(ScopeTree::GLOBAL, f, Some(10)).as_slice(), &[sym(1)]);
}

#[test]
fn undeclared_name_is_empty() {
    let interner = StringInterner::new();
    let tree = ScopeTree::new();
    assert!(tree.lookup(ScopeTree::GLOBAL, interner.intern("nope"), None).is_empty());
}

#[test]
fn enclosing_finds_kind() {
    let mut tree = ScopeTree::new();
    let class = tree.push(ScopeKind::Class, ScopeTree::GLOBAL, Some(sym(7)), 0);
    let function = tree.push(ScopeKind::Function, class, None, 0);
    let block = tree.push(ScopeKind::Block, function, None, 0);

    let found = tree.enclosing(block, |scope| scope.kind == ScopeKind::Class);
    assert_eq!(found, Some(class));
    assert_eq!(tree.get(class).owner, Some(sym(7)));
    assert_eq!(tree.chain(block).count(), 4);
}

#[test]
fn block_usings_follow_point_of_declaration() {
    let interner = StringInterner::new();
    let swap = interner.intern("swap");
    let mut tree = ScopeTree::new();
    let block = tree.push(ScopeKind::Block, ScopeTree::GLOBAL, None, 0);

    tree.add_using(block, swap, NameId::new(4), 10);
    tree.add_directive(block, NameId::new(7), 20);
    assert!(tree.get(block).usings(swap, Some(5)).is_empty());
    assert_eq!(tree.get(block).usings(swap, Some(15)).as_slice(), &[NameId::new(4)]);
    assert!(tree.get(block).directives(Some(15)).is_empty());
    assert_eq!(tree.get(block).directives(Some(25)).as_slice(), &[NameId::new(7)]);

    // Namespace scopes see every using regardless of position.
    tree.add_directive(ScopeTree::GLOBAL, NameId::new(9), 50);
    assert_eq!(tree.get(ScopeTree::GLOBAL).directives(Some(1)).as_slice(), &[NameId::new(9)]);
    // Nothing is declared by a using.
    assert!(tree.get(block).is_empty());
}
