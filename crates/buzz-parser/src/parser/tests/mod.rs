mod import_tests;
mod parser_tests;
mod scenario_tests;

use crate::ast::NodeId;
use crate::parser::{CompilationUnit, ParseOptions, Parser};

pub(crate) fn parse_source(source: &str) -> CompilationUnit {
    Parser::new(source, "test.buzz", ParseOptions::default()).parse()
}

pub(crate) fn assert_clean(unit: &CompilationUnit) {
    assert!(
        unit.diagnostics.is_empty(),
        "unexpected diagnostics: {:#?}",
        unit.diagnostics
    );
    assert!(unit.root.is_some(), "no AST root");
}

pub(crate) fn node_ids(unit: &CompilationUnit) -> impl Iterator<Item = NodeId> + '_ {
    (0..unit.ast.len() as u32).map(NodeId)
}
