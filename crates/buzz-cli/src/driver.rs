//! Parse driver: runs the front end over a file and renders the results.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use crate::args::{CliArgs, Command};
use anyhow::{Context, Result};
use buzz_common::Diagnostic;
use buzz_common::limits::DIAGNOSTIC_CONTEXT_LINES;
use buzz_parser::{JsonDumper, ParseOptions, Parser};
use colored::Colorize;
use std::path::{Path, PathBuf};

pub fn run(args: CliArgs) -> Result<i32> {
    match args.command {
        Command::Check { file, buzz_path } => check(&file, buzz_path, false),
        Command::Ast { file, buzz_path } => check(&file, buzz_path, true),
    }
}

fn check(file: &Path, buzz_path: Option<PathBuf>, dump_ast: bool) -> Result<i32> {
    let source = std::fs::read_to_string(file)
        .with_context(|| format!("could not read `{}`", file.display()))?;
    let file_name = file.display().to_string();

    let parser = Parser::new(
        &source,
        &file_name,
        ParseOptions {
            search_path: buzz_path,
            ..ParseOptions::default()
        },
    );
    let unit = parser.parse();

    for diagnostic in &unit.diagnostics {
        eprint!("{}", render(diagnostic));
    }

    match unit.root {
        Some(root) => {
            if dump_ast {
                let dumper = JsonDumper::new(&unit.ast, &unit.registry);
                println!("{}", serde_json::to_string_pretty(&dumper.dump(root))?);
            }
            Ok(0)
        }
        None => {
            eprintln!(
                "{}",
                format!("{} error(s) in `{}`", unit.diagnostics.len(), file_name).red()
            );
            Ok(1)
        }
    }
}

/// Render one diagnostic with its source snippet (up to three lines ending
/// at the offending one, caret under the column).
fn render(diagnostic: &Diagnostic) -> String {
    let snippet_source = std::fs::read_to_string(&diagnostic.file).unwrap_or_default();
    let lines: Vec<&str> = snippet_source.lines().collect();
    let last = diagnostic.line as usize;
    let first = last.saturating_sub(DIAGNOSTIC_CONTEXT_LINES as usize);
    let snippet: Vec<&str> = lines
        .get(first..last)
        .map(<[&str]>::to_vec)
        .unwrap_or_default();
    diagnostic.render(&snippet)
}
