use crate::def::{DefKind, PlaceholderDef, TypeDef, TypeId};
use crate::registry::TypeRegistry;
use buzz_common::Interner;
use buzz_scanner::{Token, TokenKind};
use std::rc::Rc;

fn registry() -> TypeRegistry {
    TypeRegistry::new(Rc::new(Interner::new()))
}

fn token(registry: &TypeRegistry, lexeme: &str) -> Token {
    Token::new(TokenKind::Identifier, registry.strings().intern(lexeme), 1, 1)
}

#[test]
fn test_primitives_are_pre_registered() {
    let registry = registry();

    assert_eq!(registry.canonical(TypeId::BOOL), "bool");
    assert_eq!(registry.canonical(TypeId::NUMBER), "num");
    assert_eq!(registry.canonical(TypeId::STRING), "str");
    assert_eq!(registry.canonical(TypeId::TYPE), "type");
    assert_eq!(registry.canonical(TypeId::VOID), "void");
}

#[test]
fn test_interning_deduplicates_by_canonical_string() {
    let registry = registry();

    let a = registry.get_or_intern(TypeDef::new(DefKind::List {
        item: TypeId::NUMBER,
    }));
    let b = registry.get_or_intern(TypeDef::new(DefKind::List {
        item: TypeId::NUMBER,
    }));
    let c = registry.get_or_intern(TypeDef::new(DefKind::List {
        item: TypeId::STRING,
    }));

    assert_eq!(a, b);
    assert_ne!(a, c);
}

#[test]
fn test_placeholders_are_never_deduplicated() {
    let registry = registry();
    let at = token(&registry, "x");

    let a = registry.placeholder(PlaceholderDef::new(None, at));
    let b = registry.placeholder(PlaceholderDef::new(None, at));

    assert_ne!(a, b);
}

#[test]
fn test_optional_interns_separately() {
    let registry = registry();

    let plain = registry.get_or_intern(TypeDef::new(DefKind::Map {
        key: TypeId::STRING,
        value: TypeId::NUMBER,
    }));
    let optional = registry.with_optional(plain, true);

    assert_ne!(plain, optional);
    assert_eq!(registry.canonical(optional), "{str,num}?");
    // Stripping the flag round-trips to the interned plain type.
    assert_eq!(registry.with_optional(optional, false), plain);
}

#[test]
fn test_instance_of_object_and_enum() {
    let registry = registry();
    let name = registry.strings().intern("Point");

    let object = registry.get_or_intern(TypeDef::new(DefKind::Object(
        crate::def::ObjectDef::new(name, false),
    )));
    let instance = registry.instance_of(object);

    assert_eq!(registry.canonical(object), "object Point");
    assert_eq!(registry.canonical(instance), "Point");
    // Instances intern too.
    assert_eq!(registry.instance_of(object), instance);
    // Primitives are their own instance form.
    assert_eq!(registry.instance_of(TypeId::NUMBER), TypeId::NUMBER);
}
