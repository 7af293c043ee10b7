//! Declarations: variables, functions, objects/classes, enums, tests, and
//! exports.

use crate::ast::{NodeId, NodeKind, ObjectMember};
use crate::scope::SlotKind;
use buzz_common::limits::MAX_PARAMETERS;
use buzz_scanner::{Token, TokenKind};
use buzz_types::{
    DefKind, EnumDef, FunctionDef, FunctionKind, ObjectDef, PlaceholderDef, TypeDef, TypeId,
};
use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use tracing::debug;

use super::Parser;

impl Parser {
    /// `Type name [= value];` — the declared type flips to its instance
    /// form, the initializer type-checks (or links) against it.
    pub(crate) fn var_declaration(&mut self, constant: bool) -> Option<NodeId> {
        let declared = self.parse_type_ref()?;
        self.consume(TokenKind::Identifier, "Expected variable name.")?;
        let name_token = self.previous;
        let (slot, slot_kind) = self.declare_variable(declared, name_token, constant)?;

        let value = if self.match_token(TokenKind::Equal) {
            let equal = self.previous;
            let value = self.expression()?;
            if let Some(value_type) = self.node_type(value) {
                self.check_assignment(declared, value_type, equal);
            }
            Some(value)
        } else {
            None
        };
        if constant && value.is_none() {
            self.error_at(name_token, "Constant must be initialized.");
        }
        self.mark_initialized(slot, slot_kind);
        self.consume(TokenKind::Semicolon, "Expected `;` after variable declaration.")?;

        let name = name_token.lexeme;
        let kind = match self.registry.def(declared).kind {
            DefKind::List { .. } => NodeKind::ListDeclaration {
                name,
                constant,
                slot,
                slot_kind,
                value,
            },
            DefKind::Map { .. } => NodeKind::MapDeclaration {
                name,
                constant,
                slot,
                slot_kind,
                value,
            },
            _ => NodeKind::VarDeclaration {
                name,
                constant,
                slot,
                slot_kind,
                value,
            },
        };
        Some(self.node(kind, name_token, Some(declared)))
    }

    /// `fun name(params) > ret { body }` at the top level. The global is
    /// pre-registered (resolving any forward placeholder) as soon as the
    /// signature is known, so the body can call the function recursively.
    pub(crate) fn fun_declaration(&mut self) -> Option<NodeId> {
        self.advance();
        self.consume(TokenKind::Identifier, "Expected function name.")?;
        let name_token = self.previous;
        if !self.at_root() {
            self.error_at(name_token, "Functions must be declared at the top level.");
            return None;
        }

        let kind = if !self.imported && self.strings.resolve(name_token.lexeme) == "main" {
            FunctionKind::EntryPoint
        } else {
            FunctionKind::Function
        };

        let pending = self.pre_register_function(name_token, kind)?;
        let (function, _) = self.function(name_token, kind, None, Some(pending))?;
        Some(self.node(
            NodeKind::FunDeclaration {
                function,
                slot: pending.0,
                slot_kind: SlotKind::Global,
            },
            name_token,
            None,
        ))
    }

    /// `extern fun name(params) > ret;` — no body; the native symbol is
    /// resolved against the current script's library name.
    pub(crate) fn extern_declaration(&mut self) -> Option<NodeId> {
        self.advance();
        self.consume(TokenKind::Fun, "Expected `fun` after `extern`.")?;
        self.consume(TokenKind::Identifier, "Expected function name.")?;
        let name_token = self.previous;
        if !self.at_root() {
            self.error_at(name_token, "Functions must be declared at the top level.");
            return None;
        }

        let pending = self.pre_register_function(name_token, FunctionKind::Extern)?;
        let (function, _) = self.function(name_token, FunctionKind::Extern, None, Some(pending))?;
        self.consume(TokenKind::Semicolon, "Expected `;` after extern declaration.")?;

        let library = self.strings.resolve(self.script_name);
        let symbol = self.strings.resolve(name_token.lexeme);
        match self.resolver.resolve(&library, &symbol) {
            Ok(handle) => {
                if let NodeKind::Function { native, .. } =
                    &mut self.ast.borrow_mut().get_mut(function).kind
                {
                    *native = Some(handle);
                }
            }
            Err(message) => self.error_at(name_token, &message),
        }

        Some(self.node(
            NodeKind::FunDeclaration {
                function,
                slot: pending.0,
                slot_kind: SlotKind::Global,
            },
            name_token,
            None,
        ))
    }

    /// Declare the function's global ahead of its signature. Returns the
    /// slot and the placeholder to resolve once the signature is complete
    /// (either a pre-existing forward reference or a fresh one).
    fn pre_register_function(
        &mut self,
        name_token: Token,
        kind: FunctionKind,
    ) -> Option<(u32, Option<TypeId>)> {
        let mut placeholder = PlaceholderDef::new(Some(name_token.lexeme), name_token);
        placeholder.resolved_kind = Some(kind);
        let fresh = self.registry.placeholder(placeholder);
        let (slot, prior) = self.declare_global_deferred(fresh, name_token, true)?;
        Some((slot, prior.or(Some(fresh))))
    }

    /// Parse a function from its parameter list on: signature, then body.
    ///
    /// `default_return` supplies the return type when the `> ret` clause is
    /// omitted (inline catch closures default to the call's result type).
    /// `pending_global` is resolved and stamped as soon as the signature is
    /// known, before the body parses.
    pub(crate) fn function(
        &mut self,
        name_token: Token,
        kind: FunctionKind,
        default_return: Option<TypeId>,
        pending_global: Option<(u32, Option<TypeId>)>,
    ) -> Option<(NodeId, TypeId)> {
        let function_node = self.node(
            NodeKind::Function {
                name: name_token.lexeme,
                body: None,
                native: None,
            },
            name_token,
            None,
        );
        self.begin_frame(function_node, TypeId::VOID);
        self.begin_scope();

        let mut parameters: IndexMap<buzz_common::Atom, TypeId> = IndexMap::new();
        let mut has_defaults: FxHashMap<buzz_common::Atom, bool> = FxHashMap::default();
        if kind != FunctionKind::Test {
            self.consume(TokenKind::LeftParen, "Expected `(` after function name.")?;
            while !self.check(TokenKind::RightParen) && !self.check(TokenKind::Eof) {
                if parameters.len() >= MAX_PARAMETERS {
                    self.error_at_current("Can't have more than 255 parameters.");
                    return None;
                }
                let parameter_type = self.parse_type_ref()?;
                self.consume(TokenKind::Identifier, "Expected parameter name.")?;
                let parameter_token = self.previous;
                if parameters.contains_key(&parameter_token.lexeme) {
                    self.error_at(
                        parameter_token,
                        &format!(
                            "Duplicate parameter `{}`.",
                            self.strings.resolve(parameter_token.lexeme)
                        ),
                    );
                }
                let has_default = if self.match_token(TokenKind::Equal) {
                    let equal = self.previous;
                    let default = self.expression()?;
                    if let Some(default_type) = self.node_type(default) {
                        self.check_assignment(parameter_type, default_type, equal);
                    }
                    true
                } else {
                    false
                };
                parameters.insert(parameter_token.lexeme, parameter_type);
                has_defaults.insert(parameter_token.lexeme, has_default);

                if let Some((slot, slot_kind)) =
                    self.declare_variable(parameter_type, parameter_token, false)
                {
                    self.mark_initialized(slot, slot_kind);
                }
                if !self.match_token(TokenKind::Comma) {
                    break;
                }
            }
            self.consume(TokenKind::RightParen, "Expected `)` after parameters.")?;
        }

        let return_type = if self.match_token(TokenKind::Greater) {
            self.parse_type_ref()?
        } else {
            default_return.unwrap_or(TypeId::VOID)
        };

        let function_type = self.registry.get_or_intern(TypeDef::new(DefKind::Function(
            FunctionDef {
                name: name_token.lexeme,
                return_type,
                parameters,
                has_defaults,
                kind,
                lambda: false,
                native: kind == FunctionKind::Extern,
            },
        )));
        self.frame_mut().function_type = function_type;

        if let Some((slot, prior)) = pending_global {
            if let Some(placeholder) = prior {
                let errors = self
                    .registry
                    .resolve_placeholder(placeholder, function_type, true);
                self.report_type_errors(errors);
            }
            self.globals[slot as usize].type_def = function_type;
            self.globals[slot as usize].initialized = true;
            debug!(
                name = self.strings.resolve(name_token.lexeme),
                signature = self.registry.canonical(function_type),
                "registered function global"
            );
        }

        let body = if kind == FunctionKind::Extern {
            None
        } else {
            // Parse before unwinding the frame either way, so an unclosed
            // body can't leave the frame stack misaligned.
            Some(self.block())
        };
        self.end_scope();
        self.end_frame();
        self.ast.borrow_mut().get_mut(function_node).type_def = Some(function_type);

        if let Some(body) = body {
            let body = body?;
            if let NodeKind::Function { body: slot, .. } =
                &mut self.ast.borrow_mut().get_mut(function_node).kind
            {
                *slot = Some(body);
            }
        }
        Some((function_node, function_type))
    }

    /// `object Name { … }` / `class Name < Super { … }` at the top level.
    ///
    /// The global is stamped with the (still empty) object type before the
    /// body parses so methods can reference it; any forward placeholder is
    /// resolved only once the members are complete.
    pub(crate) fn object_declaration(&mut self, inheritable: bool) -> Option<NodeId> {
        self.advance();
        self.consume(TokenKind::Identifier, "Expected object name.")?;
        let name_token = self.previous;
        if !self.at_root() {
            self.error_at(name_token, "Object declarations must be at the top level.");
            return None;
        }

        let super_type = if inheritable && self.match_token(TokenKind::Less) {
            self.consume(TokenKind::Identifier, "Expected superclass name.")?;
            let super_token = self.previous;
            self.resolve_super(super_token)
        } else {
            None
        };

        // Duplicate check before interning: re-interning the same canonical
        // name would hand back the first declaration's definition.
        if self
            .globals
            .iter()
            .any(|g| {
                g.prefix.is_none()
                    && !g.hidden
                    && g.name == name_token.lexeme
                    && !self.registry.def(g.type_def).is_placeholder()
            })
        {
            self.error_at(
                name_token,
                &format!(
                    "A global named `{}` already exists.",
                    self.strings.resolve(name_token.lexeme)
                ),
            );
            return None;
        }

        let mut object = ObjectDef::new(name_token.lexeme, inheritable);
        object.super_type = super_type;
        let object_type = self
            .registry
            .get_or_intern(TypeDef::new(DefKind::Object(object)));
        let (_, prior) = self.declare_global_deferred(object_type, name_token, true)?;

        let enclosing_object = self.current_object.replace(object_type);
        let enclosing_super = self.current_super;
        self.current_super = super_type;

        self.consume(TokenKind::LeftBrace, "Expected `{` after object name.")?;
        let mut members = Vec::new();
        while !self.check(TokenKind::RightBrace) && !self.check(TokenKind::Eof) {
            if let Some(member) = self.object_member(object_type) {
                members.push(member);
            }
            if self.reporter.borrow().panic_mode {
                self.synchronize();
            }
        }
        self.consume(TokenKind::RightBrace, "Expected `}` after object body.")?;

        self.report_unresolved_members(object_type);
        if let Some(placeholder) = prior {
            let errors = self.registry.resolve_placeholder(placeholder, object_type, true);
            self.report_type_errors(errors);
        }

        self.current_object = enclosing_object;
        self.current_super = enclosing_super;

        Some(self.node(
            NodeKind::ObjectDeclaration {
                name: name_token.lexeme,
                members,
            },
            name_token,
            Some(object_type),
        ))
    }

    fn resolve_super(&mut self, super_token: Token) -> Option<TypeId> {
        let Some(index) = self.resolve_global(None, super_token) else {
            self.error_at(
                super_token,
                "Superclass must be declared before it is inherited.",
            );
            return None;
        };
        let super_type = self.globals[index as usize].type_def;
        match &self.registry.def(super_type).kind {
            DefKind::Object(object) if object.inheritable => Some(super_type),
            _ => {
                self.error_at(
                    super_token,
                    &format!(
                        "Can't inherit from `{}`.",
                        self.strings.resolve(super_token.lexeme)
                    ),
                );
                None
            }
        }
    }

    /// One member: `fun name(…) > T { … }`, `Type name [= default],` or a
    /// static `Type name [= default];`.
    fn object_member(&mut self, object_type: TypeId) -> Option<ObjectMember> {
        if self.match_token(TokenKind::Fun) {
            self.consume(TokenKind::Identifier, "Expected method name.")?;
            let name_token = self.previous;
            self.check_duplicate_member(object_type, name_token);
            let (function, method_type) =
                self.function(name_token, FunctionKind::Method, None, None)?;
            self.registry.with_object_mut(object_type, |object| {
                object.methods.insert(name_token.lexeme, method_type);
            });
            self.resolve_member_placeholders(object_type, name_token.lexeme, method_type);
            return Some(ObjectMember::Method {
                name: name_token.lexeme,
                function,
            });
        }

        let field_type = self.parse_type_ref()?;
        self.consume(TokenKind::Identifier, "Expected field name.")?;
        let name_token = self.previous;
        self.check_duplicate_member(object_type, name_token);

        let default = if self.match_token(TokenKind::Equal) {
            let equal = self.previous;
            let default = self.expression()?;
            if let Some(default_type) = self.node_type(default) {
                self.check_assignment(field_type, default_type, equal);
            }
            Some(default)
        } else {
            None
        };

        // `;` makes the field static, `,` keeps it on instances.
        let is_static = self.match_token(TokenKind::Semicolon);
        if !is_static && !self.check(TokenKind::RightBrace) {
            self.consume(TokenKind::Comma, "Expected `,` after field.")?;
        }

        self.registry.with_object_mut(object_type, |object| {
            if is_static {
                object.static_fields.insert(name_token.lexeme, field_type);
            } else {
                object.fields.insert(name_token.lexeme, field_type);
            }
        });
        self.resolve_member_placeholders(object_type, name_token.lexeme, field_type);

        Some(ObjectMember::Field {
            name: name_token.lexeme,
            type_def: field_type,
            default,
            is_static,
        })
    }

    fn check_duplicate_member(&mut self, object_type: TypeId, name_token: Token) {
        let duplicate = match &self.registry.def(object_type).kind {
            DefKind::Object(object) => {
                object.fields.contains_key(&name_token.lexeme)
                    || object.methods.contains_key(&name_token.lexeme)
                    || object.static_fields.contains_key(&name_token.lexeme)
            }
            _ => false,
        };
        if duplicate {
            self.error_at(
                name_token,
                &format!(
                    "A member named `{}` already exists.",
                    self.strings.resolve(name_token.lexeme)
                ),
            );
        }
    }

    /// Resolve member placeholders created by earlier forward access
    /// (`Self.x` style) now that the member's type is known.
    fn resolve_member_placeholders(
        &mut self,
        object_type: TypeId,
        member: buzz_common::Atom,
        member_type: TypeId,
    ) {
        let pending = self
            .registry
            .with_object_mut(object_type, |object| {
                let mut pending = Vec::new();
                if let Some(placeholder) = object.placeholders.remove(&member) {
                    pending.push(placeholder);
                }
                if let Some(placeholder) = object.static_placeholders.remove(&member) {
                    pending.push(placeholder);
                }
                pending
            })
            .unwrap_or_default();
        for placeholder in pending {
            let errors = self.registry.resolve_placeholder(placeholder, member_type, false);
            self.report_type_errors(errors);
        }
    }

    /// Any member placeholder still unresolved when the declaration closes
    /// names a member the object never declared.
    fn report_unresolved_members(&mut self, object_type: TypeId) {
        let (name, leftover) = match self.registry.def(object_type).kind {
            DefKind::Object(object) => {
                let mut leftover: Vec<_> = object.placeholders.values().copied().collect();
                leftover.extend(object.static_placeholders.values().copied());
                (object.name, leftover)
            }
            _ => return,
        };
        self.registry.with_object_mut(object_type, |object| {
            object.placeholders.clear();
            object.static_placeholders.clear();
        });
        for placeholder in leftover {
            if let DefKind::Placeholder(def) = &self.registry.def(placeholder).kind {
                let member = def
                    .name
                    .map(|atom| self.strings.resolve(atom))
                    .unwrap_or_default();
                self.type_error_at(
                    def.where_token,
                    format!(
                        "Object `{}` has no member `{member}`.",
                        self.strings.resolve(name)
                    ),
                );
            }
        }
    }

    /// `enum[(BaseType)] Name { Case [= value], … }` — default base is
    /// `num` with auto-incremented case values.
    pub(crate) fn enum_declaration(&mut self) -> Option<NodeId> {
        self.advance();
        let start = self.previous;
        if !self.at_root() {
            self.error_at(start, "Enum declarations must be at the top level.");
            return None;
        }

        let case_type = if self.match_token(TokenKind::LeftParen) {
            let case_type = self.parse_type_ref()?;
            self.consume(TokenKind::RightParen, "Expected `)` after enum case type.")?;
            if case_type != TypeId::NUMBER && case_type != TypeId::STRING {
                self.error("Enum case type must be `num` or `str`.");
            }
            case_type
        } else {
            TypeId::NUMBER
        };

        self.consume(TokenKind::Identifier, "Expected enum name.")?;
        let name_token = self.previous;

        self.consume(TokenKind::LeftBrace, "Expected `{` after enum name.")?;
        let mut cases: Vec<(buzz_common::Atom, Option<NodeId>)> = Vec::new();
        while !self.check(TokenKind::RightBrace) && !self.check(TokenKind::Eof) {
            self.consume(TokenKind::Identifier, "Expected case name.")?;
            let case_token = self.previous;
            if cases.iter().any(|(existing, _)| *existing == case_token.lexeme) {
                self.error_at(
                    case_token,
                    &format!(
                        "A case named `{}` already exists.",
                        self.strings.resolve(case_token.lexeme)
                    ),
                );
            }
            let value = if self.match_token(TokenKind::Equal) {
                let equal = self.previous;
                let value = self.expression()?;
                if let Some(value_type) = self.node_type(value) {
                    self.check_types(case_type, value_type, equal);
                }
                Some(value)
            } else {
                None
            };
            cases.push((case_token.lexeme, value));
            if !self.match_token(TokenKind::Comma) {
                break;
            }
        }
        self.consume(TokenKind::RightBrace, "Expected `}` after enum cases.")?;
        if cases.is_empty() {
            self.error_at(name_token, "Enum must have at least one case.");
        }

        let enum_type = self.registry.get_or_intern(TypeDef::new(DefKind::Enum(EnumDef {
            name: name_token.lexeme,
            case_type,
            cases: cases.iter().map(|(name, _)| *name).collect(),
        })));
        let (_, prior) = self.declare_global_deferred(enum_type, name_token, true)?;
        if let Some(placeholder) = prior {
            let errors = self.registry.resolve_placeholder(placeholder, enum_type, true);
            self.report_type_errors(errors);
        }

        Some(self.node(
            NodeKind::Enum {
                name: name_token.lexeme,
                cases,
            },
            name_token,
            Some(enum_type),
        ))
    }

    /// `test "message" { … }` — a bodyless signature of kind `Test` with a
    /// unique synthetic name.
    pub(crate) fn test_declaration(&mut self) -> Option<NodeId> {
        self.advance();
        let start = self.previous;
        if !self.at_root() {
            self.error_at(start, "Tests must be declared at the top level.");
            return None;
        }
        self.consume(TokenKind::String, "Expected test name string.")?;
        let message = self.previous;

        let name = self
            .strings
            .intern(&format!("$test#{}", self.test_count));
        self.test_count += 1;
        let name_token = Token::new(message.kind, name, message.line, message.column);

        let pending = self.pre_register_function(name_token, FunctionKind::Test)?;
        let (function, _) = self.function(name_token, FunctionKind::Test, None, Some(pending))?;
        Some(self.node(
            NodeKind::FunDeclaration {
                function,
                slot: pending.0,
                slot_kind: SlotKind::Global,
            },
            start,
            None,
        ))
    }

    /// `export <declaration>` or `export name [as alias];` (a prefixed
    /// global must be re-exported under an alias).
    pub(crate) fn export_statement(&mut self) -> Option<NodeId> {
        self.advance();
        let start = self.previous;
        if !self.at_root() {
            self.error_at(start, "Exports must be at the top level.");
            return None;
        }

        let standalone = self.check(TokenKind::Identifier)
            && !matches!(
                self.peek(1).kind,
                TokenKind::Identifier | TokenKind::Question
            );
        if !standalone {
            self.last_declared_global = None;
            let declaration = self.declaration_or_statement()?;
            // The declaration either appended a global or resolved a
            // forward placeholder in place; either way it recorded its slot.
            if let Some(index) = self.last_declared_global {
                self.globals[index as usize].exported = true;
            }
            return Some(declaration);
        }

        self.advance();
        let name_token = self.previous;
        let (index, qualified) = if self.match_token(TokenKind::Dot) {
            self.consume(TokenKind::Identifier, "Expected symbol name after prefix.")?;
            let symbol = self.previous;
            let index = self.resolve_global(Some(name_token.lexeme), symbol);
            (index, true)
        } else {
            (self.resolve_global(None, name_token), false)
        };
        let Some(index) = index else {
            self.error_at(
                name_token,
                &format!(
                    "Unknown symbol `{}`.",
                    self.strings.resolve(name_token.lexeme)
                ),
            );
            return None;
        };

        let alias = if self.match_token(TokenKind::As) {
            self.consume(TokenKind::Identifier, "Expected export alias.")?;
            Some(self.previous.lexeme)
        } else {
            if qualified {
                self.error_at_current("Expected `as` when exporting a prefixed symbol.");
            }
            None
        };
        self.consume(TokenKind::Semicolon, "Expected `;` after export.")?;

        self.globals[index as usize].exported = true;
        self.globals[index as usize].export_alias = alias;
        Some(self.node(
            NodeKind::Export {
                name: self.globals[index as usize].name,
                alias,
            },
            start,
            None,
        ))
    }
}
