//! Scope rules, error recovery, and structural limits.

use super::{assert_clean, node_ids, parse_source};
use crate::ast::NodeKind;
use crate::scope::SlotKind;

#[test]
fn local_shadowing_in_same_scope_is_rejected() {
    let unit = parse_source("fun f() > void { num a = 1; num a = 2; }");
    assert_eq!(unit.diagnostics.len(), 1, "{:#?}", unit.diagnostics);
    assert!(
        unit.diagnostics[0]
            .message
            .contains("`a` already exists in this scope")
    );
}

#[test]
fn shadowing_in_inner_scope_is_allowed() {
    let unit = parse_source("fun f() > void { num a = 1; if (a == 1) { num a = 2; a + 1; } }");
    assert_clean(&unit);
}

#[test]
fn local_read_in_own_initializer_is_rejected() {
    let unit = parse_source("fun f() > void { num a = a; }");
    assert!(
        unit.diagnostics
            .iter()
            .any(|d| d.message.contains("own initializer")),
        "{:#?}",
        unit.diagnostics
    );
}

#[test]
fn global_read_in_own_initializer_is_rejected() {
    let unit = parse_source("fun f() > num { return a; } num a = f();");
    assert!(
        unit.diagnostics.is_empty(),
        "forward use through a function body is fine: {:#?}",
        unit.diagnostics
    );

    let unit = parse_source("num a = a;");
    assert!(
        unit.diagnostics
            .iter()
            .any(|d| d.message.contains("own initializer")),
        "{:#?}",
        unit.diagnostics
    );
}

#[test]
fn duplicate_global_is_rejected() {
    let unit = parse_source("num a = 1; num a = 2;");
    assert!(
        unit.diagnostics
            .iter()
            .any(|d| d.message.contains("`a` already exists")),
        "{:#?}",
        unit.diagnostics
    );
}

#[test]
fn closures_capture_locals_as_upvalues() {
    let unit = parse_source(
        "fun outer() > fun() > num { num x = 1; return fun () > num { return x; }; }",
    );
    assert_clean(&unit);

    let captured = node_ids(&unit).any(|id| {
        matches!(
            unit.ast.get(id).kind,
            NodeKind::NamedVariable {
                slot_kind: SlotKind::UpValue,
                ..
            }
        )
    });
    assert!(captured, "expected an upvalue reference to `x`");
}

#[test]
fn unknown_symbol_is_reported_at_use_site() {
    let unit = parse_source("fun f() > void { foo(); }");
    assert_eq!(unit.diagnostics.len(), 1, "{:#?}", unit.diagnostics);
    assert_eq!(unit.diagnostics[0].message, "Unknown symbol `foo`.");
    assert_eq!(
        (unit.diagnostics[0].line, unit.diagnostics[0].column),
        (1, 18)
    );
}

#[test]
fn assignment_to_constant_local_is_rejected() {
    let unit = parse_source("fun f() > void { const num x = 1; x = 2; }");
    assert!(
        unit.diagnostics
            .iter()
            .any(|d| d.message == "Can't assign to constant `x`."),
        "{:#?}",
        unit.diagnostics
    );
}

#[test]
fn break_and_continue_require_a_loop() {
    let unit = parse_source("fun f() > void { break; }");
    assert!(
        unit.diagnostics
            .iter()
            .any(|d| d.message.contains("`break` outside of a loop")),
        "{:#?}",
        unit.diagnostics
    );

    let unit = parse_source("fun f() > void { while (true) { continue; } }");
    assert_clean(&unit);
}

#[test]
fn panic_mode_recovers_at_statement_boundary() {
    let unit = parse_source("num a = ;\nnum b = 2;\nfun f() > num { return b; }");
    // One error for the hole; the following declarations still parse.
    assert_eq!(unit.diagnostics.len(), 1, "{:#?}", unit.diagnostics);
    assert_eq!(unit.diagnostics[0].message, "Expected expression.");
    assert!(unit.root.is_none(), "errors yield no AST root");
    assert!(
        unit.globals
            .iter()
            .any(|g| unit.registry.strings().resolve(g.name) == "f"),
        "parsing continued after the error"
    );
}

#[test]
fn local_slots_are_capped_at_255() {
    let mut body = String::new();
    for i in 0..=256 {
        body.push_str(&format!("num v{i} = {i}; "));
    }
    let unit = parse_source(&format!("fun f() > void {{ {body} }}"));
    assert!(
        unit.diagnostics
            .iter()
            .any(|d| d.message.contains("more than 255 local variables")),
        "{:#?}",
        unit.diagnostics
    );
}

#[test]
fn loops_parse_and_type_check() {
    let unit = parse_source(
        "fun f([num] xs) > num {\
           num total = 0;\
           foreach (num i, num x in xs) { total = total + x + i; }\
           for (num i = 0; i < 10; i = i + 1) { total = total + i; }\
           while (total > 100) { total = total - 1; }\
           do { total = total + 1; } until (total > 3);\
           return total;\
         }",
    );
    assert_clean(&unit);
}

#[test]
fn string_interpolation_parses_into_string_node() {
    let unit = parse_source("fun greet(str name) > str { return \"hello {name}!\"; }");
    assert_clean(&unit);

    let interpolated = node_ids(&unit).find(|&id| {
        matches!(unit.ast.get(id).kind, NodeKind::String { .. })
    });
    let Some(id) = interpolated else {
        panic!("expected a String node");
    };
    let NodeKind::String { ref elements } = unit.ast.get(id).kind else {
        unreachable!();
    };
    // fragment, expression, tail
    assert_eq!(elements.len(), 3);
    let ty = unit.ast.get(id).type_def.unwrap();
    assert_eq!(unit.registry.canonical(ty), "str");
}

#[test]
fn optionals_unwrap_and_coalesce() {
    let unit = parse_source(
        "fun f(num? maybe) > num { if (maybe? == 1) { return maybe!; } return maybe ?? 0; }",
    );
    assert_clean(&unit);
}

#[test]
fn inline_catch_clauses_attach_to_calls() {
    let unit = parse_source(
        "fun risky() > num { return 1; } fun f() > num { return risky() catch 0; }",
    );
    assert_clean(&unit);

    let with_catch = node_ids(&unit).any(|id| {
        matches!(
            unit.ast.get(id).kind,
            NodeKind::Call { ref catches, .. } if !catches.is_empty()
        )
    });
    assert!(with_catch, "expected a call with catch clauses");
}

#[test]
fn class_inheritance_and_super_methods() {
    let unit = parse_source(
        "class Animal { fun speak() > str { return \"...\"; } } \
         class Dog < Animal { fun bark() > str { return super.speak(); } }",
    );
    assert_clean(&unit);

    let super_call = node_ids(&unit)
        .any(|id| matches!(unit.ast.get(id).kind, NodeKind::SuperCall { .. }));
    assert!(super_call, "expected a SuperCall node");

    let plain_object_inherit = parse_source("object A {} class B < A {}");
    assert!(
        plain_object_inherit
            .diagnostics
            .iter()
            .any(|d| d.message.contains("Can't inherit")),
        "objects are not inheritable: {:#?}",
        plain_object_inherit.diagnostics
    );
}

#[test]
fn library_semantics_do_not_promote_main() {
    use crate::parser::{ParseOptions, Parser};
    use buzz_types::{DefKind, FunctionKind};

    let unit = Parser::new(
        "fun main([str] args) > num { return 0; }",
        "lib.buzz",
        ParseOptions {
            imported: true,
            ..ParseOptions::default()
        },
    )
    .parse();
    assert_clean(&unit);

    let root_type = unit.ast.get(unit.root.unwrap()).type_def.unwrap();
    let DefKind::Function(root) = unit.registry.def(root_type).kind else {
        panic!("root is not a function");
    };
    assert_eq!(root.kind, FunctionKind::Script);

    let main = unit
        .globals
        .iter()
        .find(|g| unit.registry.strings().resolve(g.name) == "main")
        .expect("main global");
    let DefKind::Function(main) = unit.registry.def(main.type_def).kind else {
        panic!("main is not a function");
    };
    assert_eq!(main.kind, FunctionKind::Function);
}

#[test]
fn test_declarations_get_synthetic_names() {
    let unit = parse_source("test \"it adds\" { 1 + 1; } test \"it subtracts\" { 2 - 1; }");
    assert_clean(&unit);

    let names: Vec<String> = unit
        .globals
        .iter()
        .map(|g| unit.registry.strings().resolve(g.name))
        .collect();
    assert!(names.contains(&"$test#0".to_string()), "{names:?}");
    assert!(names.contains(&"$test#1".to_string()), "{names:?}");
}
