use crate::def::{DefKind, TypeDef, TypeId};
use crate::registry::TypeRegistry;
use buzz_common::Interner;
use std::rc::Rc;

fn registry() -> TypeRegistry {
    TypeRegistry::new(Rc::new(Interner::new()))
}

#[test]
fn test_composite_canonical_strings() {
    let registry = registry();

    let list = registry.get_or_intern(TypeDef::new(DefKind::List {
        item: TypeId::STRING,
    }));
    assert_eq!(registry.canonical(list), "[str]");

    let nested = registry.get_or_intern(TypeDef::new(DefKind::List { item: list }));
    assert_eq!(registry.canonical(nested), "[[str]]");

    let map = registry.get_or_intern(TypeDef::new(DefKind::Map {
        key: TypeId::STRING,
        value: nested,
    }));
    assert_eq!(registry.canonical(map), "{str,[[str]]}");
}

#[test]
fn test_function_canonical_string() {
    let registry = registry();
    let strings = Rc::clone(registry.strings());

    let function = registry.get_or_intern(TypeDef::new(DefKind::Function(
        crate::def::FunctionDef {
            name: strings.intern("fact"),
            return_type: TypeId::NUMBER,
            parameters: [(strings.intern("n"), TypeId::NUMBER)].into_iter().collect(),
            has_defaults: Default::default(),
            kind: crate::def::FunctionKind::Function,
            lambda: false,
            native: false,
        },
    )));

    assert_eq!(registry.canonical(function), "Function fact(num) > num");
}

#[test]
fn test_canonical_round_trip() {
    let registry = registry();

    for text in ["bool", "num", "str?", "[num]", "[{str,num}]", "{str,[bool]}?", "{str,num?}"] {
        let id = registry
            .parse_canonical(text)
            .unwrap_or_else(|| panic!("`{text}` should parse"));
        assert_eq!(registry.canonical(id), text);
    }
}

#[test]
fn test_parse_canonical_rejects_malformed() {
    let registry = registry();

    assert!(registry.parse_canonical("").is_none());
    assert!(registry.parse_canonical("[num").is_none());
    assert!(registry.parse_canonical("{str num}").is_none());
    assert!(registry.parse_canonical("Point").is_none());
    assert!(registry.parse_canonical("num extra").is_none());
}
