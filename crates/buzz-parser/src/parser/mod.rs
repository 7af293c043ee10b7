//! Parser state and entry points.
//!
//! One `Parser` per compilation unit; imports recursively instantiate nested
//! parsers that share the AST arena, type registry, string interner,
//! diagnostic reporter, and imports cache with the root. Recursion is
//! strictly nested (the parent parse is suspended while an imported unit
//! parses), so plain `Rc<RefCell<_>>` sharing is enough.

mod declarations;
mod expressions;
mod imports;
mod rules;
mod statements;
#[cfg(test)]
mod tests;
mod type_refs;

pub use rules::Precedence;

use crate::ast::{Ast, Node, NodeId, NodeKind};
use crate::native::{NativeResolver, PathResolver};
use crate::scope::{Frame, Global, SlotKind};
use buzz_common::limits::MAX_LOOKAHEAD;
use buzz_common::{Atom, Diagnostic, DiagnosticReporter, Interner};
use buzz_scanner::{Scanner, Token, TokenKind};
use buzz_types::{DefKind, FunctionDef, FunctionKind, PlaceholderDef, TypeError, TypeId, TypeRegistry};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tracing::{Level, debug, span};

/// Result of parsing one compilation root: the arena (including all imported
/// units' nodes), the root `Function` node, the merged global list, and every
/// diagnostic collected along the way. `root` is `None` when any error was
/// reported.
pub struct CompilationUnit {
    pub ast: Ast,
    pub root: Option<NodeId>,
    pub globals: Vec<Global>,
    pub diagnostics: Vec<Diagnostic>,
    /// The type registry backing every `TypeId` in the AST and globals.
    pub registry: Rc<TypeRegistry>,
}

/// Knobs for the parser driver.
#[derive(Default)]
pub struct ParseOptions {
    /// Script/library search path; defaults to `BUZZ_PATH` or `.`.
    pub search_path: Option<PathBuf>,
    /// Native symbol resolver for `extern` functions; defaults to
    /// [`PathResolver`] over the search path.
    pub resolver: Option<Rc<dyn NativeResolver>>,
    /// Parse with library semantics: the unit's top-level function is
    /// `Script` rather than `ScriptEntryPoint` and `main` is not promoted
    /// to an entry point.
    pub imported: bool,
}

/// A cached, already-parsed import.
pub(crate) struct CachedImport {
    pub root: NodeId,
    pub globals: Vec<Global>,
}

/// A type comparison that could not be decided at parse time because one
/// side was a placeholder; re-checked once the whole unit has been parsed
/// and every declaration has had its chance to resolve it.
pub(crate) struct PendingCheck {
    pub target: TypeId,
    pub value: TypeId,
    pub at: Token,
}

pub struct Parser {
    pub(crate) scanner: Scanner,
    pub(crate) file_name: String,
    /// File stem; names the unit's top-level function and the shared library
    /// `extern` symbols resolve against.
    pub(crate) script_name: Atom,

    pub(crate) previous: Token,
    pub(crate) current: Token,
    pub(crate) lookahead: SmallVec<[Token; MAX_LOOKAHEAD]>,

    pub(crate) ast: Rc<RefCell<Ast>>,
    pub(crate) registry: Rc<TypeRegistry>,
    pub(crate) strings: Rc<Interner>,
    pub(crate) reporter: Rc<RefCell<DiagnosticReporter>>,
    pub(crate) imports: Rc<RefCell<FxHashMap<PathBuf, CachedImport>>>,
    pub(crate) import_stack: Rc<RefCell<Vec<PathBuf>>>,

    pub(crate) globals: Vec<Global>,
    pub(crate) frame: Option<Box<Frame>>,
    pub(crate) imported: bool,
    pub(crate) resolver: Rc<dyn NativeResolver>,
    pub(crate) search_path: PathBuf,

    pub(crate) loop_depth: u32,
    pub(crate) test_count: u32,
    /// The object whose declaration is currently being parsed; member access
    /// on it may create member placeholders instead of erroring.
    pub(crate) current_object: Option<TypeId>,
    /// Superclass of the method being parsed, for `super` expressions.
    pub(crate) current_super: Option<TypeId>,
    /// Slot of the most recently declared global; `export <declaration>`
    /// uses it to flip the right entry.
    pub(crate) last_declared_global: Option<u32>,
    pub(crate) pending_checks: Vec<PendingCheck>,
}

impl Parser {
    #[must_use]
    pub fn new(source: &str, file_name: &str, options: ParseOptions) -> Self {
        let strings = Rc::new(Interner::new());
        let registry = Rc::new(TypeRegistry::new(Rc::clone(&strings)));
        let search_path = options.search_path.unwrap_or_else(|| {
            std::env::var("BUZZ_PATH")
                .map_or_else(|_| PathBuf::from("."), PathBuf::from)
        });
        let resolver = options
            .resolver
            .unwrap_or_else(|| Rc::new(PathResolver::new(search_path.clone())));

        Self::new_unit(
            source,
            file_name,
            Rc::new(RefCell::new(Ast::new())),
            registry,
            strings,
            Rc::new(RefCell::new(DiagnosticReporter::new())),
            Rc::new(RefCell::new(FxHashMap::default())),
            Rc::new(RefCell::new(Vec::new())),
            options.imported,
            resolver,
            search_path,
        )
    }

    pub(crate) fn new_unit(
        source: &str,
        file_name: &str,
        ast: Rc<RefCell<Ast>>,
        registry: Rc<TypeRegistry>,
        strings: Rc<Interner>,
        reporter: Rc<RefCell<DiagnosticReporter>>,
        imports: Rc<RefCell<FxHashMap<PathBuf, CachedImport>>>,
        import_stack: Rc<RefCell<Vec<PathBuf>>>,
        imported: bool,
        resolver: Rc<dyn NativeResolver>,
        search_path: PathBuf,
    ) -> Self {
        let scanner = Scanner::new(source, Rc::clone(&strings));
        let script_name = strings.intern(
            Path::new(file_name)
                .file_stem()
                .and_then(|stem| stem.to_str())
                .unwrap_or("script"),
        );
        let eof = Token::new(TokenKind::Eof, strings.intern(""), 1, 1);
        Self {
            scanner,
            file_name: file_name.to_string(),
            script_name,
            previous: eof,
            current: eof,
            lookahead: SmallVec::new(),
            ast,
            registry,
            strings,
            reporter,
            imports,
            import_stack,
            globals: Vec::new(),
            frame: None,
            imported,
            resolver,
            search_path,
            loop_depth: 0,
            test_count: 0,
            current_object: None,
            current_super: None,
            last_declared_global: None,
            pending_checks: Vec::new(),
        }
    }

    /// Parse the whole unit and hand back everything the next phase needs.
    pub fn parse(mut self) -> CompilationUnit {
        let root = self.parse_unit();
        let had_error = self.reporter.borrow().had_error;
        let diagnostics = self.reporter.borrow().diagnostics().to_vec();
        let ast = Rc::try_unwrap(self.ast)
            .map(RefCell::into_inner)
            .unwrap_or_default();
        CompilationUnit {
            ast,
            root: if had_error { None } else { root },
            globals: self.globals,
            diagnostics,
            registry: self.registry,
        }
    }

    /// Parse this unit into the shared arena. Used directly for imported
    /// units; [`Self::parse`] wraps it for the root.
    pub(crate) fn parse_unit(&mut self) -> Option<NodeId> {
        let _span = span!(Level::DEBUG, "parse_unit", file = %self.file_name).entered();

        let root_kind = if self.imported {
            FunctionKind::Script
        } else {
            FunctionKind::ScriptEntryPoint
        };
        let root_type = self.registry.get_or_intern(buzz_types::TypeDef::new(
            DefKind::Function(FunctionDef {
                name: self.script_name,
                return_type: TypeId::VOID,
                parameters: indexmap::IndexMap::new(),
                has_defaults: FxHashMap::default(),
                kind: root_kind,
                lambda: false,
                native: false,
            }),
        ));
        let root_token = Token::synthetic(self.script_name);
        let root = self.node(
            NodeKind::Function {
                name: self.script_name,
                body: None,
                native: None,
            },
            root_token,
            Some(root_type),
        );

        self.begin_frame(root, root_type);
        self.advance();

        let mut statements = Vec::new();
        while !self.check(TokenKind::Eof) {
            if let Some(statement) = self.declaration_or_statement() {
                statements.push(statement);
            }
            if self.reporter.borrow().panic_mode {
                self.synchronize();
            }
        }

        let body = self.node(NodeKind::Block { statements }, root_token, None);
        if let NodeKind::Function { body: slot, .. } = &mut self.ast.borrow_mut().get_mut(root).kind
        {
            *slot = Some(body);
        }
        self.end_frame();
        self.finish_unit();

        debug!(
            globals = self.globals.len(),
            nodes = self.ast.borrow().len(),
            "unit parsed"
        );
        Some(root)
    }

    /// End-of-unit semantic sweep: report globals whose placeholders never
    /// resolved, then re-run the type comparisons that were deferred while
    /// one side was a placeholder.
    fn finish_unit(&mut self) {
        for global in &self.globals {
            if global.hidden {
                continue;
            }
            if let DefKind::Placeholder(def) = &self.registry.def(global.type_def).kind {
                let at = def.where_token;
                let name = self.strings.resolve(global.name);
                self.reporter.borrow_mut().report_no_panic(Diagnostic::error(
                    &self.file_name,
                    at.line,
                    at.column,
                    format!("Unknown symbol `{name}`."),
                ));
            }
        }

        let checks = std::mem::take(&mut self.pending_checks);
        for check in checks {
            if self.registry.def(check.target).is_placeholder()
                || self.registry.def(check.value).is_placeholder()
            {
                // The unknown-symbol report above already covers it.
                continue;
            }
            self.check_types(check.target, check.value, check.at);
        }
    }

    // =========================================================================
    // Token plumbing
    // =========================================================================

    pub(crate) fn advance(&mut self) {
        self.previous = self.current;
        loop {
            let token = if self.lookahead.is_empty() {
                self.scanner.scan_token()
            } else {
                self.lookahead.remove(0)
            };
            if token.kind == TokenKind::Error {
                let message = self.strings.resolve(token.lexeme);
                self.error_at(token, &message);
                continue;
            }
            self.current = token;
            break;
        }
    }

    /// Peek `n` tokens past `current` (1-based), filling the bounded
    /// look-ahead queue from the scanner as needed.
    pub(crate) fn peek(&mut self, n: usize) -> Token {
        debug_assert!((1..=MAX_LOOKAHEAD).contains(&n));
        while self.lookahead.len() < n {
            let token = self.scanner.scan_token();
            self.lookahead.push(token);
        }
        self.lookahead[n - 1]
    }

    pub(crate) fn check(&self, kind: TokenKind) -> bool {
        self.current.kind == kind
    }

    pub(crate) fn match_token(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn consume(&mut self, kind: TokenKind, message: &str) -> Option<()> {
        if self.check(kind) {
            self.advance();
            Some(())
        } else {
            self.error_at_current(message);
            None
        }
    }

    /// Skip tokens until a statement boundary or declaration starter, then
    /// leave panic mode.
    pub(crate) fn synchronize(&mut self) {
        self.reporter.borrow_mut().exit_panic_mode();
        while !self.check(TokenKind::Eof) {
            if self.previous.kind == TokenKind::Semicolon {
                return;
            }
            if self.current.kind.starts_declaration() {
                return;
            }
            self.advance();
        }
    }

    // =========================================================================
    // Diagnostics
    // =========================================================================

    pub(crate) fn error_at(&self, token: Token, message: &str) {
        self.reporter.borrow_mut().report(Diagnostic::error(
            &self.file_name,
            token.line,
            token.column,
            message,
        ));
    }

    pub(crate) fn error(&self, message: &str) {
        self.error_at(self.previous, message);
    }

    pub(crate) fn error_at_current(&self, message: &str) {
        self.error_at(self.current, message);
    }

    /// Report placeholder-resolution errors. These never enter panic mode:
    /// every resolution walk is independent.
    pub(crate) fn report_type_errors(&self, errors: Vec<TypeError>) {
        let mut reporter = self.reporter.borrow_mut();
        for error in errors {
            reporter.report_no_panic(Diagnostic::error(
                &self.file_name,
                error.at.line,
                error.at.column,
                error.message,
            ));
        }
    }

    pub(crate) fn type_error_at(&self, token: Token, message: String) {
        self.reporter
            .borrow_mut()
            .report_no_panic(Diagnostic::error(
                &self.file_name,
                token.line,
                token.column,
                message,
            ));
    }

    // =========================================================================
    // Nodes
    // =========================================================================

    pub(crate) fn node(
        &self,
        kind: NodeKind,
        location: Token,
        type_def: Option<TypeId>,
    ) -> NodeId {
        self.ast.borrow_mut().push(Node {
            kind,
            location,
            type_def,
        })
    }

    pub(crate) fn node_type(&self, id: NodeId) -> Option<TypeId> {
        self.ast.borrow().get(id).type_def
    }

    // =========================================================================
    // Frames and scopes
    // =========================================================================

    pub(crate) fn begin_frame(&mut self, function_node: NodeId, function_type: TypeId) {
        let mut frame = Frame::new(function_node, function_type);
        frame.enclosing = self.frame.take();
        // Slot 0 is reserved for the function itself.
        let _ = frame.add_local(Atom::NONE, function_type, true);
        frame.locals[0].depth = 0;
        self.frame = Some(Box::new(frame));
    }

    pub(crate) fn end_frame(&mut self) -> Frame {
        let mut frame = self.frame.take().expect("no frame to end");
        self.frame = frame.enclosing.take();
        *frame
    }

    pub(crate) fn frame(&self) -> &Frame {
        self.frame.as_ref().expect("no active frame")
    }

    pub(crate) fn frame_mut(&mut self) -> &mut Frame {
        self.frame.as_mut().expect("no active frame")
    }

    pub(crate) fn at_root(&self) -> bool {
        let frame = self.frame();
        frame.enclosing.is_none() && frame.scope_depth == 0
    }

    pub(crate) fn begin_scope(&mut self) {
        self.frame_mut().scope_depth += 1;
    }

    pub(crate) fn end_scope(&mut self) {
        let frame = self.frame_mut();
        frame.scope_depth -= 1;
        let depth = frame.scope_depth;
        while frame
            .locals
            .last()
            .is_some_and(|local| local.depth > depth)
        {
            frame.locals.pop();
        }
    }

    // =========================================================================
    // Symbol tables
    // =========================================================================

    /// Declare a variable with the given type at the current scope.
    ///
    /// At local depth this allocates the next slot in uninitialized state
    /// after checking shadowing; at global depth it either resolves an
    /// awaiting placeholder global of the same name or appends a new global.
    pub(crate) fn declare_variable(
        &mut self,
        type_def: TypeId,
        name_token: Token,
        constant: bool,
    ) -> Option<(u32, SlotKind)> {
        let name = name_token.lexeme;
        if self.frame().scope_depth > 0 {
            let scope_depth = self.frame().scope_depth;
            let shadowed = self
                .frame()
                .locals
                .iter()
                .rev()
                .take_while(|local| local.depth == -1 || local.depth >= scope_depth)
                .any(|local| local.name == name);
            if shadowed {
                self.error_at(
                    name_token,
                    &format!(
                        "A variable named `{}` already exists in this scope.",
                        self.strings.resolve(name)
                    ),
                );
                return None;
            }
            match self.frame_mut().add_local(name, type_def, constant) {
                Ok(slot) => Some((u32::from(slot), SlotKind::Local)),
                Err(message) => {
                    self.error_at(name_token, message);
                    None
                }
            }
        } else {
            self.declare_global(type_def, name_token, constant)
        }
    }

    fn declare_global(
        &mut self,
        type_def: TypeId,
        name_token: Token,
        constant: bool,
    ) -> Option<(u32, SlotKind)> {
        let name = name_token.lexeme;
        if let Some(index) = self
            .globals
            .iter()
            .position(|g| g.prefix.is_none() && !g.hidden && g.name == name)
        {
            let existing = self.globals[index].type_def;
            if self.registry.def(existing).is_placeholder() {
                // Forward reference awaiting this declaration.
                let errors = self.registry.resolve_placeholder(existing, type_def, constant);
                self.report_type_errors(errors);
                self.globals[index].type_def = type_def;
                self.globals[index].constant = constant;
                self.globals[index].initialized = false;
                self.last_declared_global = Some(index as u32);
                return Some((index as u32, SlotKind::Global));
            }
            self.error_at(
                name_token,
                &format!(
                    "A global named `{}` already exists.",
                    self.strings.resolve(name)
                ),
            );
            return None;
        }
        self.globals.push(Global {
            prefix: None,
            name,
            type_def,
            initialized: false,
            exported: false,
            export_alias: None,
            hidden: false,
            constant,
        });
        self.last_declared_global = Some((self.globals.len() - 1) as u32);
        Some(((self.globals.len() - 1) as u32, SlotKind::Global))
    }

    /// Like [`Self::declare_variable`] at global depth, but keeps an existing
    /// forward placeholder un-resolved and returns it so the caller can
    /// resolve it once the declaration's type is complete (objects and enums
    /// resolve after their members are parsed).
    pub(crate) fn declare_global_deferred(
        &mut self,
        type_def: TypeId,
        name_token: Token,
        constant: bool,
    ) -> Option<(u32, Option<TypeId>)> {
        let name = name_token.lexeme;
        if let Some(index) = self
            .globals
            .iter()
            .position(|g| g.prefix.is_none() && !g.hidden && g.name == name)
        {
            let existing = self.globals[index].type_def;
            if self.registry.def(existing).is_placeholder() {
                self.globals[index].type_def = type_def;
                self.globals[index].constant = constant;
                self.globals[index].initialized = true;
                self.last_declared_global = Some(index as u32);
                return Some((index as u32, Some(existing)));
            }
            self.error_at(
                name_token,
                &format!(
                    "A global named `{}` already exists.",
                    self.strings.resolve(name)
                ),
            );
            return None;
        }
        self.globals.push(Global {
            prefix: None,
            name,
            type_def,
            initialized: true,
            exported: false,
            export_alias: None,
            hidden: false,
            constant,
        });
        self.last_declared_global = Some((self.globals.len() - 1) as u32);
        Some(((self.globals.len() - 1) as u32, None))
    }

    pub(crate) fn mark_initialized(&mut self, slot: u32, slot_kind: SlotKind) {
        match slot_kind {
            SlotKind::Local => {
                let depth = self.frame().scope_depth;
                self.frame_mut().locals[slot as usize].depth = depth;
            }
            SlotKind::Global => {
                self.globals[slot as usize].initialized = true;
            }
            SlotKind::UpValue => unreachable!("upvalues are never declared directly"),
        }
    }

    /// Resolve `name` against the current frame's locals, innermost first.
    /// Reading a local inside its own initializer is an error.
    pub(crate) fn resolve_local(&mut self, name_token: Token) -> Option<(u8, TypeId, bool)> {
        let name = name_token.lexeme;
        let found = self
            .frame()
            .locals
            .iter()
            .enumerate()
            .rev()
            .find(|(_, local)| !local.name.is_none() && local.name == name)
            .map(|(slot, local)| (slot as u8, local.type_def, local.constant, local.depth));
        let (slot, type_def, constant, depth) = found?;
        if depth == -1 {
            self.error_at(
                name_token,
                &format!(
                    "Can't read local variable `{}` in its own initializer.",
                    self.strings.resolve(name)
                ),
            );
        }
        Some((slot, type_def, constant))
    }

    /// Resolve `name` as an upvalue by recursing through enclosing frames,
    /// marking captured locals along the way.
    pub(crate) fn resolve_upvalue(&mut self, name_token: Token) -> Option<(u8, TypeId, bool)> {
        fn resolve_in(frame: &mut Frame, name: Atom) -> Result<Option<(u8, TypeId, bool)>, &'static str> {
            let Some(enclosing) = frame.enclosing.as_deref_mut() else {
                return Ok(None);
            };
            let local = enclosing
                .locals
                .iter()
                .enumerate()
                .rev()
                .find(|(_, local)| !local.name.is_none() && local.name == name)
                .map(|(slot, local)| (slot, local.type_def, local.constant));
            if let Some((slot, type_def, constant)) = local {
                enclosing.locals[slot].captured = true;
                let index = frame.add_upvalue(slot as u8, true)?;
                return Ok(Some((index, type_def, constant)));
            }
            if let Some((upvalue, type_def, constant)) = resolve_in(enclosing, name)? {
                let index = frame.add_upvalue(upvalue, false)?;
                return Ok(Some((index, type_def, constant)));
            }
            Ok(None)
        }

        let frame = self.frame.as_deref_mut()?;
        match resolve_in(frame, name_token.lexeme) {
            Ok(result) => result,
            Err(message) => {
                self.error_at(name_token, message);
                None
            }
        }
    }

    /// Resolve `(prefix, name)` against the visible globals. Hidden globals
    /// are never returned; reading an uninitialized global (inside its own
    /// initializer) is an error.
    pub(crate) fn resolve_global(
        &mut self,
        prefix: Option<Atom>,
        name_token: Token,
    ) -> Option<u32> {
        let name = name_token.lexeme;
        let index = self
            .globals
            .iter()
            .position(|g| !g.hidden && g.prefix == prefix && g.name == name)?;
        if !self.globals[index].initialized {
            self.error_at(
                name_token,
                &format!(
                    "Can't read global `{}` in its own initializer.",
                    self.strings.resolve(name)
                ),
            );
        }
        Some(index as u32)
    }

    pub(crate) fn has_prefix(&self, prefix: Atom) -> bool {
        self.globals
            .iter()
            .any(|g| !g.hidden && g.prefix == Some(prefix))
    }

    /// Create a placeholder global for a name referenced before declaration.
    /// It is marked initialized so later uses link to it instead of erroring.
    pub(crate) fn declare_placeholder(&mut self, name_token: Token) -> u32 {
        let type_def = self.registry.placeholder(PlaceholderDef::new(
            Some(name_token.lexeme),
            name_token,
        ));
        debug!(
            name = self.strings.resolve(name_token.lexeme),
            line = name_token.line,
            "declared placeholder global"
        );
        self.globals.push(Global {
            prefix: None,
            name: name_token.lexeme,
            type_def,
            initialized: true,
            exported: false,
            export_alias: None,
            hidden: false,
            constant: false,
        });
        (self.globals.len() - 1) as u32
    }

    // =========================================================================
    // Type checks
    // =========================================================================

    /// Check that `value` can be stored where `target` is expected, linking
    /// placeholder relations or deferring the comparison as needed.
    pub(crate) fn check_assignment(&mut self, target: TypeId, value: TypeId, at: Token) {
        let target_is_placeholder = self.registry.def(target).is_placeholder();
        let value_is_placeholder = self.registry.def(value).is_placeholder();
        match (target_is_placeholder, value_is_placeholder) {
            (true, true) => {
                self.registry
                    .link(target, value, buzz_types::PlaceholderRelation::Assignment);
            }
            (true, false) => {
                // Materialize the eventual target type as a child, then
                // compare it against the concrete value once known.
                let child = self.registry.placeholder(PlaceholderDef::new(None, at));
                self.registry
                    .link(target, child, buzz_types::PlaceholderRelation::Assignment);
                self.pending_checks.push(PendingCheck {
                    target: child,
                    value,
                    at,
                });
            }
            (false, true) => {
                self.pending_checks.push(PendingCheck { target, value, at });
            }
            (false, false) => {
                self.check_types(target, value, at);
            }
        }
    }

    /// Immediate compatibility check between two concrete types.
    pub(crate) fn check_types(&mut self, target: TypeId, value: TypeId, at: Token) {
        if !self.types_compatible(target, value) {
            let expected = self.registry.canonical(target);
            let actual = self.registry.canonical(value);
            self.type_error_at(at, format!("expected `{expected}`, got `{actual}`"));
        }
    }

    pub(crate) fn types_compatible(&self, target: TypeId, value: TypeId) -> bool {
        if target == value {
            return true;
        }
        let target_def = self.registry.def(target);
        let value_def = self.registry.def(value);
        if target_def.is_placeholder() || value_def.is_placeholder() {
            return true;
        }
        let target_canonical = self.registry.canonical(target);
        let value_canonical = self.registry.canonical(value);
        if target_canonical == value_canonical {
            return true;
        }
        if target_def.optional {
            // `T?` accepts `T` and `null`.
            if value_canonical == "void?" {
                return true;
            }
            if let Some(stripped) = target_canonical.strip_suffix('?') {
                if stripped == value_canonical {
                    return true;
                }
            }
        }
        // Empty list/map literals are compatible with any list/map target.
        if value_canonical == "[void]" && matches!(target_def.kind, DefKind::List { .. }) {
            return true;
        }
        if value_canonical == "{void,void}" && matches!(target_def.kind, DefKind::Map { .. }) {
            return true;
        }
        false
    }

    /// Expect an operand of a concrete `expected` type, deferring when the
    /// operand is still a placeholder.
    pub(crate) fn check_operand(&mut self, expected: TypeId, operand: TypeId, at: Token) {
        if self.registry.def(operand).is_placeholder() {
            self.pending_checks.push(PendingCheck {
                target: expected,
                value: operand,
                at,
            });
        } else {
            self.check_types(expected, operand, at);
        }
    }
}
