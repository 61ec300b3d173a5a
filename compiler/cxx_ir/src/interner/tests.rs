use super::*;

#[test]
fn test_intern_and_lookup() {
    let interner = StringInterner::new();

    let vector = interner.intern("vector");
    let map = interner.intern("map");
    let vector2 = interner.intern("vector");

    assert_eq!(vector, vector2);
    assert_ne!(vector, map);

    assert_eq!(interner.lookup(vector), "vector");
    assert_eq!(interner.lookup(map), "map");
}

#[test]
fn test_empty_string() {
    let interner = StringInterner::new();
    let empty = interner.intern("");
    assert_eq!(empty, Name::EMPTY);
    assert_eq!(interner.lookup(Name::EMPTY), "");
}

#[test]
fn test_operator_names_pre_interned() {
    let interner = StringInterner::new();
    let before = interner.len();

    let call = interner.intern("operator()");
    assert_eq!(interner.lookup(call), "operator()");
    assert_eq!(interner.len(), before);
}

#[test]
fn test_shared_interner_across_threads() {
    let interner = SharedInterner::new();
    let other = interner.clone();

    let handle = std::thread::spawn(move || other.intern("from_thread"));
    let from_thread = handle.join().unwrap_or_else(|_| panic!("thread panicked"));

    assert_eq!(interner.intern("from_thread"), from_thread);
}

#[test]
fn test_len_counts_new_strings_once() {
    let interner = StringInterner::new();
    let before = interner.len();
    interner.intern("fresh_identifier");
    interner.intern("fresh_identifier");
    assert_eq!(interner.len(), before + 1);
}
