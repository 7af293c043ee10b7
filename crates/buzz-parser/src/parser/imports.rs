//! The import loader: script path resolution, recursive parsing of imported
//! units, and global-table merging.
//!
//! `import "path"` opens `<search-path>/<path>.buzz`, falling back to
//! `./<path>.buzz`. The imported unit parses with a nested parser that
//! shares the arena, registry, interner, reporter, and imports cache; its
//! globals are then appended to the importing unit's list in order — hidden
//! unless exported (and selected) — so indices stay stable for the
//! byte-code layer.

use crate::ast::{NodeId, NodeKind};
use crate::scope::Global;
use buzz_common::Atom;
use buzz_scanner::{Token, TokenKind};
use buzz_types::DefKind;
use std::path::PathBuf;
use std::rc::Rc;
use tracing::debug;

use super::{CachedImport, Parser};

impl Parser {
    /// `import "path" [as Prefix];` or
    /// `import { a, b [as c], } from "path" [as Prefix];`
    pub(crate) fn import_statement(&mut self) -> Option<NodeId> {
        self.advance();
        let start = self.previous;
        if !self.at_root() {
            self.error_at(start, "Imports must be at the top level.");
            return None;
        }

        let mut symbols: Vec<(Atom, Option<Atom>)> = Vec::new();
        let selective = self.match_token(TokenKind::LeftBrace);
        if selective {
            while !self.check(TokenKind::RightBrace) && !self.check(TokenKind::Eof) {
                self.consume(TokenKind::Identifier, "Expected imported symbol name.")?;
                let name = self.previous.lexeme;
                let alias = if self.match_token(TokenKind::As) {
                    self.consume(TokenKind::Identifier, "Expected import alias.")?;
                    Some(self.previous.lexeme)
                } else {
                    None
                };
                symbols.push((name, alias));
                if !self.match_token(TokenKind::Comma) {
                    break;
                }
            }
            self.consume(TokenKind::RightBrace, "Expected `}` after import list.")?;
            self.consume(TokenKind::From, "Expected `from` after import list.")?;
        }

        self.consume(TokenKind::String, "Expected import path string.")?;
        let path_token = self.previous;
        let path_atom = path_token.string().expect("string token without literal");
        let path = self.strings.resolve(path_atom);

        let prefix = if self.match_token(TokenKind::As) {
            self.consume(TokenKind::Identifier, "Expected import prefix.")?;
            Some(self.previous.lexeme)
        } else {
            None
        };
        self.consume(TokenKind::Semicolon, "Expected `;` after import.")?;

        let Some(file) = self.locate_script(&path) else {
            self.error_at(path_token, &format!("Could not find import `{path}`."));
            return None;
        };
        let canonical = std::fs::canonicalize(&file).unwrap_or_else(|_| file.clone());

        if self.import_stack.borrow().contains(&canonical) {
            self.error_at(path_token, &format!("Circular import of `{path}`."));
            return None;
        }

        if !self.imports.borrow().contains_key(&canonical) {
            let source = match std::fs::read_to_string(&file) {
                Ok(source) => source,
                Err(error) => {
                    self.error_at(
                        path_token,
                        &format!("Could not read import `{path}`: {error}."),
                    );
                    return None;
                }
            };
            debug!(path, file = %file.display(), "parsing import");
            self.import_stack.borrow_mut().push(canonical.clone());
            let mut nested = Parser::new_unit(
                &source,
                &file.display().to_string(),
                Rc::clone(&self.ast),
                Rc::clone(&self.registry),
                Rc::clone(&self.strings),
                Rc::clone(&self.reporter),
                Rc::clone(&self.imports),
                Rc::clone(&self.import_stack),
                true,
                Rc::clone(&self.resolver),
                self.search_path.clone(),
            );
            let root = nested.parse_unit();
            let globals = std::mem::take(&mut nested.globals);
            self.import_stack.borrow_mut().pop();
            // A nested unit can end mid-panic; don't let that suppress the
            // importing unit's own diagnostics.
            self.reporter.borrow_mut().exit_panic_mode();

            let root = root?;
            self.imports
                .borrow_mut()
                .insert(canonical.clone(), CachedImport { root, globals });
        }

        let merged = {
            let cache = self.imports.borrow();
            cache[&canonical].globals.clone()
        };
        self.merge_globals(merged, &symbols, prefix, path_token);

        Some(self.node(
            NodeKind::Import {
                imported_symbols: symbols.iter().map(|(name, _)| *name).collect(),
                prefix,
                path: path_atom,
            },
            start,
            None,
        ))
    }

    fn locate_script(&self, path: &str) -> Option<PathBuf> {
        let candidates = [
            self.search_path.join(format!("{path}.buzz")),
            PathBuf::from(format!("./{path}.buzz")),
        ];
        candidates.into_iter().find(|candidate| candidate.exists())
    }

    /// Append every imported global in order. Exported (and selected)
    /// globals become visible — renamed by their export alias or selective
    /// import alias — everything else is appended hidden.
    fn merge_globals(
        &mut self,
        imported: Vec<Global>,
        symbols: &[(Atom, Option<Atom>)],
        prefix: Option<Atom>,
        path_token: Token,
    ) {
        // Unknown names in the selective list are definite errors.
        for &(symbol, _) in symbols {
            let known = imported.iter().any(|g| {
                g.exported && g.export_alias.unwrap_or(g.name) == symbol
            });
            if !known {
                self.error_at(
                    path_token,
                    &format!(
                        "Unknown import `{}`.",
                        self.strings.resolve(symbol)
                    ),
                );
            }
        }

        for global in imported {
            let visible_name = global.export_alias.unwrap_or(global.name);
            let selected = symbols.is_empty()
                || symbols.iter().any(|&(symbol, _)| symbol == visible_name);
            let renamed = symbols
                .iter()
                .find(|&&(symbol, _)| symbol == visible_name)
                .and_then(|&(_, alias)| alias)
                .unwrap_or(visible_name);
            let hidden = !(global.exported && selected);

            if !hidden {
                self.resolve_import_collision(renamed, prefix, &global, path_token);
            }

            self.globals.push(Global {
                prefix: prefix.or(global.prefix),
                name: renamed,
                type_def: global.type_def,
                initialized: true,
                exported: false,
                export_alias: None,
                hidden,
                constant: global.constant,
            });
        }
    }

    /// A newly visible import may collide with an existing global: a
    /// placeholder awaiting resolution is resolved with the imported type,
    /// anything else is an error.
    fn resolve_import_collision(
        &mut self,
        name: Atom,
        prefix: Option<Atom>,
        imported: &Global,
        path_token: Token,
    ) {
        let existing = self
            .globals
            .iter()
            .position(|g| !g.hidden && g.prefix == prefix && g.name == name);
        let Some(index) = existing else {
            return;
        };
        let existing_type = self.globals[index].type_def;
        if matches!(
            self.registry.def(existing_type).kind,
            DefKind::Placeholder(_)
        ) {
            let errors = self.registry.resolve_placeholder(
                existing_type,
                imported.type_def,
                imported.constant,
            );
            self.report_type_errors(errors);
            self.globals[index].type_def = imported.type_def;
            return;
        }
        self.error_at(
            path_token,
            &format!(
                "A global named `{}` already exists.",
                self.strings.resolve(name)
            ),
        );
    }
}
