//! End-to-end scenarios exercising the placeholder engine through real
//! source: recursion, forward references, type mismatch chains, and the
//! JSON dump contract.

use super::{assert_clean, node_ids, parse_source};
use crate::ast::NodeKind;
use crate::ast::json::JsonDumper;
use serde_json::Value;

#[test]
fn recursive_function_resolves_through_its_own_placeholder() {
    let unit = parse_source(
        "fun fact(num n) > num { if (n == 0) { return 1; } return n * fact(n - 1); }",
    );
    assert_clean(&unit);

    let call_types: Vec<String> = node_ids(&unit)
        .filter(|&id| matches!(unit.ast.get(id).kind, NodeKind::Call { .. }))
        .map(|id| {
            let ty = unit.ast.get(id).type_def.expect("call without type");
            unit.registry.canonical(ty)
        })
        .collect();
    assert_eq!(call_types, vec!["num"]);

    let fact = unit
        .globals
        .iter()
        .find(|g| unit.registry.strings().resolve(g.name) == "fact")
        .expect("fact global");
    assert_eq!(
        unit.registry.canonical(fact.type_def),
        "Function fact(num) > num"
    );
    assert!(fact.constant);
}

#[test]
fn forward_referenced_object_resolves_at_declaration() {
    let unit = parse_source(
        "fun make() > Point { return Point{ x = 0, y = 0 }; } object Point { num x, num y, }",
    );
    assert_clean(&unit);

    let make = unit
        .globals
        .iter()
        .find(|g| unit.registry.strings().resolve(g.name) == "make")
        .expect("make global");
    assert_eq!(unit.registry.canonical(make.type_def), "Function make() > Point");

    let init_type = node_ids(&unit)
        .find(|&id| matches!(unit.ast.get(id).kind, NodeKind::ObjectInit { .. }))
        .and_then(|id| unit.ast.get(id).type_def)
        .expect("object init type");
    assert_eq!(unit.registry.canonical(init_type), "Point");
}

#[test]
fn type_mismatch_through_placeholder_chain_reports_at_use_site() {
    let unit =
        parse_source("fun use(Unknown u) > void { u.field + 1; } object Unknown { str field, }");

    assert_eq!(unit.diagnostics.len(), 1, "{:#?}", unit.diagnostics);
    let diagnostic = &unit.diagnostics[0];
    assert_eq!(diagnostic.message, "expected `num`, got `str`");
    // Reported at the `+` token, not at the declaration of `Unknown`.
    assert_eq!((diagnostic.line, diagnostic.column), (1, 37));
    assert!(unit.root.is_none());
}

#[test]
fn subscript_on_placeholder_resolves_when_type_arrives() {
    let unit = parse_source("fun f(X xs) > void { xs[0] + 1; } [num] X;");
    assert_clean(&unit);

    let subscript_type = node_ids(&unit)
        .find(|&id| matches!(unit.ast.get(id).kind, NodeKind::Subscript { .. }))
        .and_then(|id| unit.ast.get(id).type_def)
        .expect("subscript type");
    assert_eq!(unit.registry.canonical(subscript_type), "num");

    let x = unit
        .globals
        .iter()
        .find(|g| unit.registry.strings().resolve(g.name) == "X")
        .expect("X global");
    assert_eq!(unit.registry.canonical(x.type_def), "[num]");
}

#[test]
fn enum_field_access_produces_instances_and_rejects_missing_cases() {
    let unit = parse_source(
        "enum Direction { North, South } fun f() > Direction { return Direction.North; }",
    );
    assert_clean(&unit);

    let bad = parse_source("enum Direction { North } fun f() > void { Direction.East; }");
    assert_eq!(bad.diagnostics.len(), 1, "{:#?}", bad.diagnostics);
    assert_eq!(bad.diagnostics[0].message, "Enum `Direction` has no case `East`.");
}

#[test]
fn assignment_to_forward_declared_constant_is_rejected() {
    let unit = parse_source("fun f() > void { Point = 1; } object Point { num x, }");
    assert_eq!(unit.diagnostics.len(), 1, "{:#?}", unit.diagnostics);
    assert_eq!(unit.diagnostics[0].message, "Can't assign to constant.");
}

#[test]
fn json_dump_contract() {
    let unit =
        parse_source("str yo = \"hello\"; fun main([str] args) > num { return 1; }");
    assert_clean(&unit);

    let dumper = JsonDumper::new(&unit.ast, &unit.registry);
    let root = dumper.dump(unit.root.unwrap());

    assert_eq!(root["node"], "Function");
    assert_eq!(root["function_kind"], "ScriptEntryPoint");
    assert_eq!(root["body"]["node"], "Block");

    let statements = root["body"]["body"].as_array().expect("block body");
    assert_eq!(statements.len(), 2);

    let var = &statements[0];
    assert_eq!(var["node"], "VarDeclaration");
    assert_eq!(var["identifier"], "yo");
    assert_eq!(var["constant"], false);
    assert!(var["type_def"].as_str().unwrap().starts_with("str"));
    assert_eq!(var["value"]["node"], "StringLiteral");
    assert_eq!(var["value"]["constant"], "hello");

    let fun = &statements[1];
    assert_eq!(fun["node"], "FunDeclaration");
    let function = &fun["function"];
    assert_eq!(function["node"], "Function");
    assert_eq!(function["function_kind"], "EntryPoint");
    assert_eq!(function["identifier"], "main");
    assert_eq!(function["type_def"], "Function main([str]) > num");

    // Every dumped node carries the discriminator and a type_def field.
    fn walk(value: &Value, seen: &mut usize) {
        match value {
            Value::Object(object) => {
                if object.contains_key("node") {
                    assert!(object.contains_key("type_def"));
                    *seen += 1;
                }
                for child in object.values() {
                    walk(child, seen);
                }
            }
            Value::Array(items) => {
                for item in items {
                    walk(item, seen);
                }
            }
            _ => {}
        }
    }
    let mut seen = 0;
    walk(&root, &mut seen);
    assert!(seen >= 6, "expected a tree of dumped nodes, saw {seen}");
}
