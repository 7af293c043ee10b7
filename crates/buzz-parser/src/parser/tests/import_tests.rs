//! Import loader tests: prefixing, visibility, selective imports, aliases,
//! and failure modes. Script trees are materialized with `tempfile`.

use crate::ast::NodeKind;
use crate::parser::{CompilationUnit, ParseOptions, Parser};
use std::path::Path;

fn write_script(dir: &Path, name: &str, source: &str) {
    std::fs::write(dir.join(format!("{name}.buzz")), source).expect("write script");
}

fn parse_with_path(source: &str, dir: &Path) -> CompilationUnit {
    Parser::new(
        source,
        "main.buzz",
        ParseOptions {
            search_path: Some(dir.to_path_buf()),
            ..ParseOptions::default()
        },
    )
    .parse()
}

#[test]
fn prefixed_import_merges_exported_globals() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_script(dir.path(), "a", "export fun hello() > void {}");

    let unit = parse_with_path("import \"a\" as A; fun f() > void { A.hello(); }", dir.path());
    assert!(unit.diagnostics.is_empty(), "{:#?}", unit.diagnostics);

    let visible: Vec<_> = unit
        .globals
        .iter()
        .filter(|g| !g.hidden && g.prefix.is_some())
        .collect();
    assert_eq!(visible.len(), 1);
    let hello = visible[0];
    assert_eq!(
        unit.registry.strings().resolve(hello.prefix.unwrap()),
        "A"
    );
    assert_eq!(unit.registry.strings().resolve(hello.name), "hello");

    // The call resolved against the prefixed global.
    let called = (0..unit.ast.len() as u32)
        .map(crate::ast::NodeId)
        .any(|id| matches!(unit.ast.get(id).kind, NodeKind::Call { .. }));
    assert!(called);
}

#[test]
fn unexported_globals_merge_hidden() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_script(
        dir.path(),
        "lib",
        "fun helper() > num { return 1; } export fun api() > num { return helper(); }",
    );

    let unit = parse_with_path("import \"lib\"; fun f() > num { return api(); }", dir.path());
    assert!(unit.diagnostics.is_empty(), "{:#?}", unit.diagnostics);

    let hidden: Vec<String> = unit
        .globals
        .iter()
        .filter(|g| g.hidden)
        .map(|g| unit.registry.strings().resolve(g.name))
        .collect();
    assert!(hidden.contains(&"helper".to_string()), "{hidden:?}");

    // Hidden globals are never resolvable from the importing unit.
    let unresolvable = parse_with_path(
        "import \"lib\"; fun f() > num { return helper(); }",
        dir.path(),
    );
    assert!(
        unresolvable
            .diagnostics
            .iter()
            .any(|d| d.message == "Unknown symbol `helper`."),
        "{:#?}",
        unresolvable.diagnostics
    );
}

#[test]
fn selective_import_hides_unselected_and_rejects_unknown() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_script(
        dir.path(),
        "lib",
        "export fun one() > num { return 1; } export fun two() > num { return 2; }",
    );

    let unit = parse_with_path(
        "import { one } from \"lib\"; fun f() > num { return one(); }",
        dir.path(),
    );
    assert!(unit.diagnostics.is_empty(), "{:#?}", unit.diagnostics);
    let two_hidden = unit.globals.iter().any(|g| {
        g.hidden && unit.registry.strings().resolve(g.name) == "two"
    });
    assert!(two_hidden);

    let unknown = parse_with_path("import { three } from \"lib\";", dir.path());
    assert!(
        unknown
            .diagnostics
            .iter()
            .any(|d| d.message == "Unknown import `three`."),
        "{:#?}",
        unknown.diagnostics
    );
}

#[test]
fn export_aliases_rename_merged_globals() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_script(
        dir.path(),
        "lib",
        "fun greet() > void {} export greet as hello;",
    );

    let unit = parse_with_path("import \"lib\"; fun f() > void { hello(); }", dir.path());
    assert!(unit.diagnostics.is_empty(), "{:#?}", unit.diagnostics);
}

#[test]
fn missing_import_file_is_reported() {
    let dir = tempfile::tempdir().expect("tempdir");
    let unit = parse_with_path("import \"nope\";", dir.path());
    assert!(
        unit.diagnostics
            .iter()
            .any(|d| d.message == "Could not find import `nope`."),
        "{:#?}",
        unit.diagnostics
    );
}

#[test]
fn circular_imports_are_reported() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_script(dir.path(), "a", "import \"b\";");
    write_script(dir.path(), "b", "import \"a\";");

    let unit = parse_with_path("import \"a\";", dir.path());
    assert!(
        unit.diagnostics
            .iter()
            .any(|d| d.message.starts_with("Circular import")),
        "{:#?}",
        unit.diagnostics
    );
}

#[test]
fn imports_are_cached_per_compilation_root() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_script(dir.path(), "shared", "export fun thing() > num { return 1; }");
    write_script(dir.path(), "a", "import \"shared\" as S; export fun a() > num { return S.thing(); }");
    write_script(dir.path(), "b", "import \"shared\" as S; export fun b() > num { return S.thing(); }");

    // Diamond: main -> a -> shared, main -> b -> shared. The second load of
    // `shared` comes from the cache, not a re-parse, so there is exactly one
    // `thing` definition in the registry and no duplicate diagnostics.
    let unit = parse_with_path(
        "import \"a\"; import \"b\"; fun f() > num { return a() + b(); }",
        dir.path(),
    );
    assert!(unit.diagnostics.is_empty(), "{:#?}", unit.diagnostics);
}
