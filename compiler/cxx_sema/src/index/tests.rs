use super::*;
use pretty_assertions::assert_eq;

#[test]
fn publish_and_lookup() {
    let interner = StringInterner::new();
    let ns = interner.intern("ns");
    let f = interner.intern("f");
    let index = InMemoryIndex::new();
    let name = QualifiedName::new([ns]).child(f);

    assert!(index.lookup_in_index(&name).is_empty());
    index.publish_declaration(name.clone(), SymbolId::new(4));
    index.publish_declaration(name.clone(), SymbolId::new(2));
    index.publish_declaration(name.clone(), SymbolId::new(4));

    assert_eq!(index.lookup_in_index(&name), vec![SymbolId::new(4), SymbolId::new(2)]);
    assert_eq!(index.len(), 1);
    assert_eq!(name.display(&interner), "ns::f");
}

#[test]
fn names_differ_by_path() {
    let interner = StringInterner::new();
    let f = interner.intern("f");
    let index = InMemoryIndex::new();
    index.publish_declaration(QualifiedName::new([f]), SymbolId::new(1));

    let nested = QualifiedName::new([interner.intern("a"), f]);
    assert!(index.lookup_in_index(&nested).is_empty());
}

#[test]
fn concurrent_publication() {
    let interner = StringInterner::new();
    let name = QualifiedName::new([interner.intern("shared")]);
    let index = InMemoryIndex::new();
    std::thread::scope(|scope| {
        for t in 0..4u32 {
            let index = &index;
            let name = name.clone();
            scope.spawn(move || {
                for i in 0..16u32 {
                    index.publish_declaration(name.clone(), SymbolId::new(t * 100 + i));
                }
            });
        }
    });
    assert_eq!(index.lookup_in_index(&name).len(), 64);
}
