use crate::def::{
    DefKind, EnumDef, FunctionDef, FunctionKind, ObjectDef, PlaceholderDef, PlaceholderRelation,
    TypeDef, TypeId,
};
use crate::registry::TypeRegistry;
use buzz_common::Interner;
use buzz_scanner::{Token, TokenKind};
use std::rc::Rc;

fn registry() -> TypeRegistry {
    TypeRegistry::new(Rc::new(Interner::new()))
}

fn token(registry: &TypeRegistry, lexeme: &str, line: u32, column: u32) -> Token {
    Token::new(
        TokenKind::Identifier,
        registry.strings().intern(lexeme),
        line,
        column,
    )
}

fn placeholder(registry: &TypeRegistry, name: Option<&str>, at: Token) -> TypeId {
    let name = name.map(|n| registry.strings().intern(n));
    registry.placeholder(PlaceholderDef::new(name, at))
}

fn function_type(registry: &TypeRegistry, name: &str, ret: TypeId) -> TypeId {
    registry.get_or_intern(TypeDef::new(DefKind::Function(FunctionDef {
        name: registry.strings().intern(name),
        return_type: ret,
        parameters: [(registry.strings().intern("n"), TypeId::NUMBER)]
            .into_iter()
            .collect(),
        has_defaults: Default::default(),
        kind: FunctionKind::Function,
        lambda: false,
        native: false,
    })))
}

#[test]
fn test_call_relation_resolves_to_return_type() {
    let registry = registry();
    let at = token(&registry, "fact", 1, 1);

    let callee = placeholder(&registry, Some("fact"), at);
    let result = placeholder(&registry, None, at);
    registry.link(callee, result, PlaceholderRelation::Call);

    let fact = function_type(&registry, "fact", TypeId::NUMBER);
    let errors = registry.resolve_placeholder(callee, fact, true);

    assert!(errors.is_empty());
    assert_eq!(registry.canonical(result), "num");
    // The callee slot itself now behaves as the function type.
    assert_eq!(registry.canonical(callee), "Function fact(num) > num");
}

#[test]
fn test_call_relation_on_object_produces_instance() {
    let registry = registry();
    let at = token(&registry, "Point", 1, 1);

    let callee = placeholder(&registry, Some("Point"), at);
    let result = placeholder(&registry, None, at);
    registry.link(callee, result, PlaceholderRelation::Call);

    let object = registry.get_or_intern(TypeDef::new(DefKind::Object(ObjectDef::new(
        registry.strings().intern("Point"),
        false,
    ))));
    let errors = registry.resolve_placeholder(callee, object, true);

    assert!(errors.is_empty());
    assert_eq!(registry.canonical(result), "Point");
}

#[test]
fn test_call_relation_rejects_uncallable() {
    let registry = registry();
    let at = token(&registry, "n", 3, 7);

    let callee = placeholder(&registry, Some("n"), at);
    let result = placeholder(&registry, None, token(&registry, "n", 3, 9));
    registry.link(callee, result, PlaceholderRelation::Call);

    let errors = registry.resolve_placeholder(callee, TypeId::NUMBER, false);

    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].message, "Can't call `num`.");
    // Diagnostic localization: the child's own use site.
    assert_eq!((errors[0].at.line, errors[0].at.column), (3, 9));
}

#[test]
fn test_subscript_relation_on_list_and_map() {
    let registry = registry();
    let at = token(&registry, "xs", 1, 1);

    let list_ph = placeholder(&registry, Some("xs"), at);
    let element = placeholder(&registry, None, at);
    registry.link(list_ph, element, PlaceholderRelation::Subscript);

    let list = registry.get_or_intern(TypeDef::new(DefKind::List {
        item: TypeId::NUMBER,
    }));
    assert!(registry.resolve_placeholder(list_ph, list, false).is_empty());
    assert_eq!(registry.canonical(element), "num");

    // Map subscripts are optional (lookups can miss).
    let map_ph = placeholder(&registry, Some("m"), at);
    let value = placeholder(&registry, None, at);
    let key = placeholder(&registry, None, at);
    registry.link(map_ph, value, PlaceholderRelation::Subscript);
    registry.link(map_ph, key, PlaceholderRelation::Key);

    let map = registry.get_or_intern(TypeDef::new(DefKind::Map {
        key: TypeId::STRING,
        value: TypeId::NUMBER,
    }));
    assert!(registry.resolve_placeholder(map_ph, map, false).is_empty());
    assert_eq!(registry.canonical(value), "num?");
    assert_eq!(registry.canonical(key), "str");
}

#[test]
fn test_subscript_relation_rejects_scalar() {
    let registry = registry();
    let at = token(&registry, "b", 2, 4);

    let ph = placeholder(&registry, Some("b"), at);
    let element = placeholder(&registry, None, at);
    registry.link(ph, element, PlaceholderRelation::Subscript);

    let errors = registry.resolve_placeholder(ph, TypeId::BOOL, false);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].message, "Can't subscript `bool`.");
}

#[test]
fn test_field_access_looks_up_fields_then_methods() {
    let registry = registry();
    let strings = Rc::clone(registry.strings());
    let at = token(&registry, "u", 1, 1);

    let mut object = ObjectDef::new(strings.intern("Unknown"), false);
    object.fields.insert(strings.intern("field"), TypeId::STRING);
    object
        .methods
        .insert(strings.intern("method"), function_type(&registry, "method", TypeId::VOID));
    let object = registry.get_or_intern(TypeDef::new(DefKind::Object(object)));
    let instance = registry.instance_of(object);

    let ph = placeholder(&registry, Some("u"), at);
    let field = registry.placeholder(PlaceholderDef::new(
        Some(strings.intern("field")),
        token(&registry, "field", 1, 3),
    ));
    registry.link(ph, field, PlaceholderRelation::FieldAccess);

    assert!(registry.resolve_placeholder(ph, instance, false).is_empty());
    assert_eq!(registry.canonical(field), "str");
}

#[test]
fn test_field_access_missing_member_is_error() {
    let registry = registry();
    let strings = Rc::clone(registry.strings());
    let at = token(&registry, "u", 4, 11);

    let object = registry.get_or_intern(TypeDef::new(DefKind::Object(ObjectDef::new(
        strings.intern("Unknown"),
        false,
    ))));
    let instance = registry.instance_of(object);

    let ph = placeholder(&registry, Some("u"), token(&registry, "u", 4, 9));
    let member = registry
        .placeholder(PlaceholderDef::new(Some(strings.intern("missing")), at));
    registry.link(ph, member, PlaceholderRelation::FieldAccess);

    let errors = registry.resolve_placeholder(ph, instance, false);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].message, "Object `Unknown` has no member `missing`.");
    assert_eq!((errors[0].at.line, errors[0].at.column), (4, 11));
}

#[test]
fn test_enum_field_access_produces_instance_and_missing_case_errors() {
    let registry = registry();
    let strings = Rc::clone(registry.strings());

    let enumeration = registry.get_or_intern(TypeDef::new(DefKind::Enum(EnumDef {
        name: strings.intern("Direction"),
        case_type: TypeId::NUMBER,
        cases: vec![strings.intern("North"), strings.intern("South")],
    })));

    let ph = placeholder(&registry, Some("Direction"), token(&registry, "Direction", 1, 1));
    let case = registry.placeholder(PlaceholderDef::new(
        Some(strings.intern("North")),
        token(&registry, "North", 1, 11),
    ));
    registry.link(ph, case, PlaceholderRelation::FieldAccess);
    assert!(registry.resolve_placeholder(ph, enumeration, true).is_empty());
    assert_eq!(registry.canonical(case), "Direction");

    let ph2 = placeholder(&registry, Some("Direction"), token(&registry, "Direction", 2, 1));
    let missing = registry.placeholder(PlaceholderDef::new(
        Some(strings.intern("East")),
        token(&registry, "East", 2, 11),
    ));
    registry.link(ph2, missing, PlaceholderRelation::FieldAccess);
    let errors = registry.resolve_placeholder(ph2, enumeration, true);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].message, "Enum `Direction` has no case `East`.");
}

#[test]
fn test_assignment_relation_rejects_constant_target() {
    let registry = registry();
    let at = token(&registry, "fact", 5, 1);

    let target = placeholder(&registry, Some("fact"), at);
    let value = placeholder(&registry, None, token(&registry, "fact", 5, 8));
    registry.link(target, value, PlaceholderRelation::Assignment);

    let fact = function_type(&registry, "fact", TypeId::NUMBER);
    let errors = registry.resolve_placeholder(target, fact, true);

    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].message, "Can't assign to constant.");
}

#[test]
fn test_resolution_is_idempotent() {
    let registry = registry();
    let at = token(&registry, "x", 1, 1);

    let ph = placeholder(&registry, Some("x"), at);
    let list = registry.get_or_intern(TypeDef::new(DefKind::List {
        item: TypeId::NUMBER,
    }));

    assert!(registry.resolve_placeholder(ph, list, false).is_empty());
    let canonical = registry.canonical(ph);

    // Second resolution is a no-op, even against a different type.
    assert!(registry.resolve_placeholder(ph, TypeId::BOOL, false).is_empty());
    assert_eq!(registry.canonical(ph), canonical);
}

#[test]
fn test_resolving_against_placeholder_defers() {
    let registry = registry();
    let at = token(&registry, "x", 1, 1);

    let ph = placeholder(&registry, Some("x"), at);
    let other = placeholder(&registry, Some("y"), at);

    assert!(registry.resolve_placeholder(ph, other, false).is_empty());
    assert!(registry.def(ph).is_placeholder());
}

#[test]
fn test_chained_resolution_through_relations() {
    // xs is unknown; `xs[0] + 1` makes the subscript result a child.
    // Resolving xs to [num] must resolve the child to num transitively,
    // and further children of that child too.
    let registry = registry();
    let at = token(&registry, "xs", 1, 1);

    let xs = placeholder(&registry, Some("xs"), at);
    let element = placeholder(&registry, None, at);
    let called = placeholder(&registry, None, at);
    registry.link(xs, element, PlaceholderRelation::Subscript);
    registry.link(element, called, PlaceholderRelation::Call);

    let list_of_functions = {
        let f = function_type(&registry, "", TypeId::STRING);
        registry.get_or_intern(TypeDef::new(DefKind::List { item: f }))
    };
    let errors = registry.resolve_placeholder(xs, list_of_functions, false);

    assert!(errors.is_empty());
    assert_eq!(registry.canonical(called), "str");
}

#[test]
fn test_coherence_checks() {
    let registry = registry();
    let at = token(&registry, "x", 1, 1);

    let ph = placeholder(&registry, Some("x"), at);
    let call_child = placeholder(&registry, None, at);
    registry.link(ph, call_child, PlaceholderRelation::Call);
    assert!(registry.is_coherent(ph));

    let subscript_child = placeholder(&registry, None, at);
    registry.link(ph, subscript_child, PlaceholderRelation::Subscript);
    assert!(!registry.is_coherent(ph));

    // Concrete types are always coherent.
    assert!(registry.is_coherent(TypeId::NUMBER));
}
