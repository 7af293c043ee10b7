use super::*;

#[test]
fn test_intern_deduplicates() {
    let interner = Interner::new();

    let a = interner.intern("hello");
    let b = interner.intern("hello");
    let c = interner.intern("world");

    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_eq!(interner.len(), 2);
}

#[test]
fn test_resolve_round_trip() {
    let interner = Interner::new();

    let atom = interner.intern("fact");
    assert_eq!(interner.resolve(atom), "fact");
}

#[test]
fn test_get_does_not_intern() {
    let interner = Interner::new();

    assert!(interner.get("missing").is_none());
    assert!(interner.is_empty());

    let atom = interner.intern("present");
    assert_eq!(interner.get("present"), Some(atom));
}

#[test]
fn test_none_sentinel() {
    assert!(Atom::NONE.is_none());
    assert!(!Atom(0).is_none());
}
