//! Expression parsing: the precedence-climbing driver and every prefix and
//! infix rule. Rules build typed nodes; whenever an input type is still a
//! placeholder, the rule links a relation (or defers a comparison) instead of
//! checking immediately.

use crate::ast::{CallArgument, NodeId, NodeKind};
use crate::parser::rules::{Precedence, get_rule};
use crate::parser::Parser;
use crate::scope::SlotKind;
use buzz_common::limits::{MAX_CATCH_CLAUSES, MAX_PARAMETERS};
use buzz_scanner::{Literal, Token, TokenKind};
use buzz_types::{DefKind, FunctionKind, PlaceholderDef, PlaceholderRelation, TypeId};

impl Parser {
    pub(crate) fn expression(&mut self) -> Option<NodeId> {
        self.parse_precedence(Precedence::Assignment, false)
    }

    /// The Pratt driver. When `hanging`, the leading token has already been
    /// advanced past by the caller.
    pub(crate) fn parse_precedence(
        &mut self,
        precedence: Precedence,
        hanging: bool,
    ) -> Option<NodeId> {
        if !hanging {
            self.advance();
        }
        let Some(prefix) = get_rule(self.previous.kind).prefix else {
            self.error("Expected expression.");
            return None;
        };
        let can_assign = precedence <= Precedence::Assignment;
        let mut node = prefix(self, can_assign)?;

        while precedence <= get_rule(self.current.kind).precedence {
            self.advance();
            let Some(infix) = get_rule(self.previous.kind).infix else {
                break;
            };
            node = infix(self, node, can_assign)?;
        }

        if can_assign && self.match_token(TokenKind::Equal) {
            self.error("Invalid assignment target.");
        }
        Some(node)
    }

    // =========================================================================
    // Prefix rules
    // =========================================================================

    pub(crate) fn number(&mut self, _can_assign: bool) -> Option<NodeId> {
        let token = self.previous;
        let value = token.number().unwrap_or(f64::NAN);
        if self.frame.is_some() {
            self.frame_mut().add_constant(Literal::Number(value));
        }
        Some(self.node(NodeKind::Number { value }, token, Some(TypeId::NUMBER)))
    }

    pub(crate) fn string_literal(&mut self, _can_assign: bool) -> Option<NodeId> {
        let token = self.previous;
        let value = token.string().expect("string token without literal");
        if self.frame.is_some() {
            self.frame_mut().add_constant(Literal::String(value));
        }
        Some(self.node(
            NodeKind::StringLiteral { value },
            token,
            Some(TypeId::STRING),
        ))
    }

    /// An interpolated string: the scanner has split it into fragments, the
    /// expressions in between arrive as ordinary tokens.
    pub(crate) fn string_interpolation(&mut self, _can_assign: bool) -> Option<NodeId> {
        let start = self.previous;
        let mut elements = Vec::new();
        elements.push(self.node(
            NodeKind::StringLiteral {
                value: self.previous.string().expect("fragment without literal"),
            },
            self.previous,
            Some(TypeId::STRING),
        ));
        loop {
            elements.push(self.expression()?);
            if self.match_token(TokenKind::StringFragment) {
                elements.push(self.node(
                    NodeKind::StringLiteral {
                        value: self.previous.string().expect("fragment without literal"),
                    },
                    self.previous,
                    Some(TypeId::STRING),
                ));
                continue;
            }
            self.consume(TokenKind::String, "Unterminated string interpolation.")?;
            elements.push(self.node(
                NodeKind::StringLiteral {
                    value: self.previous.string().expect("string without literal"),
                },
                self.previous,
                Some(TypeId::STRING),
            ));
            break;
        }
        Some(self.node(NodeKind::String { elements }, start, Some(TypeId::STRING)))
    }

    pub(crate) fn boolean(&mut self, _can_assign: bool) -> Option<NodeId> {
        let token = self.previous;
        Some(self.node(
            NodeKind::Boolean {
                value: token.kind == TokenKind::True,
            },
            token,
            Some(TypeId::BOOL),
        ))
    }

    pub(crate) fn null_literal(&mut self, _can_assign: bool) -> Option<NodeId> {
        let token = self.previous;
        let null_type = self.registry.with_optional(TypeId::VOID, true);
        Some(self.node(NodeKind::Null, token, Some(null_type)))
    }

    pub(crate) fn grouping(&mut self, _can_assign: bool) -> Option<NodeId> {
        let node = self.expression()?;
        self.consume(TokenKind::RightParen, "Expected `)` after expression.")?;
        Some(node)
    }

    pub(crate) fn unary(&mut self, _can_assign: bool) -> Option<NodeId> {
        let operator = self.previous;
        let operand = self.parse_precedence(Precedence::Unary, false)?;
        let operand_type = self.node_type(operand);
        let result = match operator.kind {
            TokenKind::Minus => {
                if let Some(ty) = operand_type {
                    self.check_operand(TypeId::NUMBER, ty, operator);
                }
                TypeId::NUMBER
            }
            TokenKind::Bang => {
                if let Some(ty) = operand_type {
                    self.check_operand(TypeId::BOOL, ty, operator);
                }
                TypeId::BOOL
            }
            _ => unreachable!("unary rule on non-unary operator"),
        };
        Some(self.node(
            NodeKind::Unary {
                operand,
                operator: operator.kind,
            },
            operator,
            Some(result),
        ))
    }

    pub(crate) fn list_literal(&mut self, _can_assign: bool) -> Option<NodeId> {
        let start = self.previous;
        let mut items = Vec::new();
        let mut item_type: Option<TypeId> = None;
        while !self.check(TokenKind::RightBracket) && !self.check(TokenKind::Eof) {
            let item = self.expression()?;
            if let Some(ty) = self.node_type(item) {
                match item_type {
                    None => item_type = Some(ty),
                    Some(first) => self.check_assignment(first, ty, self.ast_location(item)),
                }
            }
            items.push(item);
            if !self.match_token(TokenKind::Comma) {
                break;
            }
        }
        self.consume(TokenKind::RightBracket, "Expected `]` after list items.")?;
        let item = item_type.unwrap_or(TypeId::VOID);
        let list_type = self
            .registry
            .get_or_intern(buzz_types::TypeDef::new(DefKind::List { item }));
        Some(self.node(NodeKind::List { items }, start, Some(list_type)))
    }

    pub(crate) fn map_literal(&mut self, _can_assign: bool) -> Option<NodeId> {
        let start = self.previous;
        let mut keys = Vec::new();
        let mut values = Vec::new();
        let mut key_type: Option<TypeId> = None;
        let mut value_type: Option<TypeId> = None;
        while !self.check(TokenKind::RightBrace) && !self.check(TokenKind::Eof) {
            let key = self.expression()?;
            self.consume(TokenKind::Colon, "Expected `:` after map key.")?;
            let value = self.expression()?;
            if let Some(ty) = self.node_type(key) {
                match key_type {
                    None => key_type = Some(ty),
                    Some(first) => self.check_assignment(first, ty, self.ast_location(key)),
                }
            }
            if let Some(ty) = self.node_type(value) {
                match value_type {
                    None => value_type = Some(ty),
                    Some(first) => self.check_assignment(first, ty, self.ast_location(value)),
                }
            }
            keys.push(key);
            values.push(value);
            if !self.match_token(TokenKind::Comma) {
                break;
            }
        }
        self.consume(TokenKind::RightBrace, "Expected `}` after map entries.")?;
        let map_type = self.registry.get_or_intern(buzz_types::TypeDef::new(DefKind::Map {
            key: key_type.unwrap_or(TypeId::VOID),
            value: value_type.unwrap_or(TypeId::VOID),
        }));
        Some(self.node(NodeKind::Map { keys, values }, start, Some(map_type)))
    }

    pub(crate) fn variable(&mut self, can_assign: bool) -> Option<NodeId> {
        let token = self.previous;
        self.named_variable(token, can_assign)
    }

    /// Resolve an identifier reference: locals, then upvalues, then globals
    /// (following an import prefix through `.` when the bare name only
    /// matches a prefix), falling back to a fresh placeholder global.
    pub(crate) fn named_variable(&mut self, token: Token, can_assign: bool) -> Option<NodeId> {
        let (slot, slot_kind, type_def, constant) =
            if let Some((slot, ty, constant)) = self.resolve_local(token) {
                (u32::from(slot), SlotKind::Local, ty, constant)
            } else if let Some((slot, ty, constant)) = self.resolve_upvalue(token) {
                (u32::from(slot), SlotKind::UpValue, ty, constant)
            } else if let Some(index) = self.resolve_global(None, token) {
                let global = &self.globals[index as usize];
                (index, SlotKind::Global, global.type_def, global.constant)
            } else if self.has_prefix(token.lexeme) && self.check(TokenKind::Dot) {
                // `Prefix.symbol`: retry against the prefixed globals.
                self.advance();
                self.consume(TokenKind::Identifier, "Expected symbol name after prefix.")?;
                let symbol = self.previous;
                let Some(index) = self.resolve_global(Some(token.lexeme), symbol) else {
                    self.error_at(
                        symbol,
                        &format!(
                            "Unknown symbol `{}.{}`.",
                            self.strings.resolve(token.lexeme),
                            self.strings.resolve(symbol.lexeme)
                        ),
                    );
                    return None;
                };
                let global = &self.globals[index as usize];
                (index, SlotKind::Global, global.type_def, global.constant)
            } else {
                let index = self.declare_placeholder(token);
                let global = &self.globals[index as usize];
                (index, SlotKind::Global, global.type_def, global.constant)
            };

        let value = if can_assign && self.match_token(TokenKind::Equal) {
            let equal = self.previous;
            if constant {
                self.error_at(
                    equal,
                    &format!(
                        "Can't assign to constant `{}`.",
                        self.strings.resolve(token.lexeme)
                    ),
                );
            }
            let value = self.expression()?;
            if let Some(value_type) = self.node_type(value) {
                self.check_assignment(type_def, value_type, equal);
            }
            Some(value)
        } else {
            None
        };

        Some(self.node(
            NodeKind::NamedVariable {
                name: token.lexeme,
                slot,
                slot_kind,
                value,
            },
            token,
            Some(type_def),
        ))
    }

    pub(crate) fn anonymous_function(&mut self, _can_assign: bool) -> Option<NodeId> {
        let token = self.previous;
        let name = Token::new(token.kind, self.strings.intern(""), token.line, token.column);
        let (node, _) = self.function(name, FunctionKind::Anonymous, None, None)?;
        Some(node)
    }

    pub(crate) fn super_(&mut self, _can_assign: bool) -> Option<NodeId> {
        let token = self.previous;
        self.consume(TokenKind::Dot, "Expected `.` after `super`.")?;
        self.consume(TokenKind::Identifier, "Expected superclass method name.")?;
        let member = self.previous;

        let Some(super_type) = self.current_super else {
            self.error_at(token, "Can't use `super` outside of a method with a superclass.");
            return None;
        };
        let method_type = match &self.registry.def(super_type).kind {
            DefKind::Object(object) => object.methods.get(&member.lexeme).copied(),
            _ => None,
        };
        let Some(method_type) = method_type else {
            self.error_at(
                member,
                &format!(
                    "Superclass has no method `{}`.",
                    self.strings.resolve(member.lexeme)
                ),
            );
            return None;
        };

        if self.match_token(TokenKind::LeftParen) {
            let arguments = self.argument_list()?;
            self.check_arguments(method_type, &arguments, member);
            let result = match &self.registry.def(method_type).kind {
                DefKind::Function(function) => function.return_type,
                _ => TypeId::VOID,
            };
            let catches = self.catch_clauses(result)?;
            return Some(self.node(
                NodeKind::SuperCall {
                    member: member.lexeme,
                    arguments,
                    catches,
                },
                token,
                Some(result),
            ));
        }
        Some(self.node(
            NodeKind::Super {
                member: member.lexeme,
            },
            token,
            Some(method_type),
        ))
    }

    // =========================================================================
    // Infix rules
    // =========================================================================

    pub(crate) fn binary(&mut self, left: NodeId, _can_assign: bool) -> Option<NodeId> {
        let operator = self.previous;
        let precedence = get_rule(operator.kind).precedence;
        let right = self.parse_precedence(precedence.next(), false)?;

        let left_type = self.node_type(left);
        let right_type = self.node_type(right);
        let result = self.binary_result(operator, left_type, right_type);

        Some(self.node(
            NodeKind::Binary {
                left,
                right,
                operator: operator.kind,
            },
            operator,
            Some(result),
        ))
    }

    fn binary_result(
        &mut self,
        operator: Token,
        left: Option<TypeId>,
        right: Option<TypeId>,
    ) -> TypeId {
        match operator.kind {
            TokenKind::Plus => {
                // `+` works on two numbers or two strings.
                let both_strings = left == Some(TypeId::STRING) && right == Some(TypeId::STRING);
                if both_strings {
                    return TypeId::STRING;
                }
                if let Some(ty) = left {
                    self.check_operand(TypeId::NUMBER, ty, operator);
                }
                if let Some(ty) = right {
                    self.check_operand(TypeId::NUMBER, ty, operator);
                }
                TypeId::NUMBER
            }
            TokenKind::Minus
            | TokenKind::Star
            | TokenKind::Slash
            | TokenKind::Percent
            | TokenKind::ShiftLeft
            | TokenKind::ShiftRight => {
                if let Some(ty) = left {
                    self.check_operand(TypeId::NUMBER, ty, operator);
                }
                if let Some(ty) = right {
                    self.check_operand(TypeId::NUMBER, ty, operator);
                }
                TypeId::NUMBER
            }
            TokenKind::Greater
            | TokenKind::GreaterEqual
            | TokenKind::Less
            | TokenKind::LessEqual => {
                if let Some(ty) = left {
                    self.check_operand(TypeId::NUMBER, ty, operator);
                }
                if let Some(ty) = right {
                    self.check_operand(TypeId::NUMBER, ty, operator);
                }
                TypeId::BOOL
            }
            TokenKind::EqualEqual | TokenKind::BangEqual => {
                if let (Some(l), Some(r)) = (left, right) {
                    if !self.registry.def(l).is_placeholder()
                        && !self.registry.def(r).is_placeholder()
                        && !self.types_compatible(l, r)
                        && !self.types_compatible(r, l)
                    {
                        let left_name = self.registry.canonical(l);
                        let right_name = self.registry.canonical(r);
                        self.type_error_at(
                            operator,
                            format!("Can't compare `{left_name}` and `{right_name}`."),
                        );
                    }
                }
                TypeId::BOOL
            }
            TokenKind::Xor => {
                if let Some(ty) = left {
                    self.check_operand(TypeId::BOOL, ty, operator);
                }
                if let Some(ty) = right {
                    self.check_operand(TypeId::BOOL, ty, operator);
                }
                TypeId::BOOL
            }
            TokenKind::QuestionQuestion => {
                // The coalesced value can no longer be null.
                let concrete = |id: Option<TypeId>| {
                    id.filter(|&id| !self.registry.def(id).is_placeholder())
                };
                if let Some(id) = concrete(right).or_else(|| concrete(left)) {
                    self.registry.with_optional(id, false)
                } else {
                    left.or(right).unwrap_or(TypeId::VOID)
                }
            }
            _ => unreachable!("binary rule on non-binary operator"),
        }
    }

    pub(crate) fn and_(&mut self, left: NodeId, _can_assign: bool) -> Option<NodeId> {
        let operator = self.previous;
        if let Some(ty) = self.node_type(left) {
            self.check_operand(TypeId::BOOL, ty, operator);
        }
        let right = self.parse_precedence(Precedence::And, false)?;
        if let Some(ty) = self.node_type(right) {
            self.check_operand(TypeId::BOOL, ty, operator);
        }
        Some(self.node(NodeKind::And { left, right }, operator, Some(TypeId::BOOL)))
    }

    pub(crate) fn or_(&mut self, left: NodeId, _can_assign: bool) -> Option<NodeId> {
        let operator = self.previous;
        if let Some(ty) = self.node_type(left) {
            self.check_operand(TypeId::BOOL, ty, operator);
        }
        let right = self.parse_precedence(Precedence::Or, false)?;
        if let Some(ty) = self.node_type(right) {
            self.check_operand(TypeId::BOOL, ty, operator);
        }
        Some(self.node(NodeKind::Or { left, right }, operator, Some(TypeId::BOOL)))
    }

    pub(crate) fn is_(&mut self, left: NodeId, _can_assign: bool) -> Option<NodeId> {
        let operator = self.previous;
        let of = self.parse_type_ref()?;
        Some(self.node(NodeKind::Is { left, of }, operator, Some(TypeId::BOOL)))
    }

    pub(crate) fn unwrap(&mut self, left: NodeId, _can_assign: bool) -> Option<NodeId> {
        let operator = self.previous;
        let result = self.unwrapped_type(left, operator);
        Some(self.node(
            NodeKind::Unwrap { unwrapped: left },
            operator,
            Some(result),
        ))
    }

    pub(crate) fn force_unwrap(&mut self, left: NodeId, _can_assign: bool) -> Option<NodeId> {
        let operator = self.previous;
        let result = self.unwrapped_type(left, operator);
        Some(self.node(
            NodeKind::ForceUnwrap { unwrapped: left },
            operator,
            Some(result),
        ))
    }

    fn unwrapped_type(&mut self, operand: NodeId, operator: Token) -> TypeId {
        let Some(ty) = self.node_type(operand) else {
            return TypeId::VOID;
        };
        let def = self.registry.def(ty);
        if def.is_placeholder() {
            return ty;
        }
        if !def.optional {
            let name = self.registry.canonical(ty);
            self.type_error_at(operator, format!("Can't unwrap non-optional `{name}`."));
            return ty;
        }
        self.registry.with_optional(ty, false)
    }

    pub(crate) fn subscript(&mut self, left: NodeId, can_assign: bool) -> Option<NodeId> {
        let bracket = self.previous;
        let index = self.expression()?;
        self.consume(TokenKind::RightBracket, "Expected `]` after subscript.")?;
        let index_type = self.node_type(index);

        let left_type = self.node_type(left).unwrap_or(TypeId::VOID);
        let result = match self.registry.def(left_type).kind {
            DefKind::List { item } => {
                if let Some(ty) = index_type {
                    self.check_operand(TypeId::NUMBER, ty, bracket);
                }
                item
            }
            DefKind::Map { key, value } => {
                if let Some(ty) = index_type {
                    self.check_assignment(key, ty, bracket);
                }
                self.registry.with_optional(value, true)
            }
            DefKind::String => {
                if let Some(ty) = index_type {
                    self.check_operand(TypeId::NUMBER, ty, bracket);
                }
                TypeId::STRING
            }
            DefKind::Placeholder(_) => {
                let element = self
                    .registry
                    .placeholder(PlaceholderDef::new(None, bracket));
                self.registry
                    .link(left_type, element, PlaceholderRelation::Subscript);
                if let Some(index_type) = index_type {
                    if self.registry.def(index_type).is_placeholder() {
                        self.registry
                            .link(left_type, index_type, PlaceholderRelation::Key);
                    }
                }
                element
            }
            _ => {
                let name = self.registry.canonical(left_type);
                self.type_error_at(bracket, format!("Can't subscript `{name}`."));
                TypeId::VOID
            }
        };

        let value = if can_assign && self.match_token(TokenKind::Equal) {
            let equal = self.previous;
            let value = self.expression()?;
            if let Some(value_type) = self.node_type(value) {
                // Subscript assignment stores the non-optional element type.
                let target = self.registry.with_optional(result, false);
                self.check_assignment(target, value_type, equal);
            }
            Some(value)
        } else {
            None
        };

        Some(self.node(
            NodeKind::Subscript {
                subscripted: left,
                index,
                value,
            },
            bracket,
            Some(result),
        ))
    }

    pub(crate) fn dot(&mut self, left: NodeId, can_assign: bool) -> Option<NodeId> {
        self.consume(TokenKind::Identifier, "Expected member name after `.`.")?;
        let member = self.previous;
        let left_type = self.node_type(left).unwrap_or(TypeId::VOID);

        let (member_type, assignable) = self.member_type(left_type, member)?;

        let value = if can_assign && self.match_token(TokenKind::Equal) {
            let equal = self.previous;
            if !assignable {
                self.error_at(equal, "Can't assign to a method.");
            }
            let value = self.expression()?;
            if let Some(value_type) = self.node_type(value) {
                self.check_assignment(member_type, value_type, equal);
            }
            Some(value)
        } else {
            None
        };

        Some(self.node(
            NodeKind::Dot {
                callee: left,
                member: member.lexeme,
                value,
            },
            member,
            Some(member_type),
        ))
    }

    /// Resolve a `.member` access against the callee's type category.
    /// Returns the member type and whether it is assignable.
    fn member_type(&mut self, left_type: TypeId, member: Token) -> Option<(TypeId, bool)> {
        let member_name = member.lexeme;
        match self.registry.def(left_type).kind {
            DefKind::Placeholder(_) => {
                let child = self
                    .registry
                    .placeholder(PlaceholderDef::new(Some(member_name), member));
                self.registry
                    .link(left_type, child, PlaceholderRelation::FieldAccess);
                Some((child, true))
            }
            DefKind::ObjectInstance { of } => {
                if let Some(found) = self.lookup_instance_member(of, member_name) {
                    return Some(found);
                }
                if Some(of) == self.current_object {
                    // Forward reference to a member not parsed yet.
                    let child = self
                        .registry
                        .placeholder(PlaceholderDef::new(Some(member_name), member));
                    self.registry
                        .with_object_mut(of, |object| {
                            object.placeholders.insert(member_name, child);
                        });
                    return Some((child, true));
                }
                self.member_error(of, member);
                None
            }
            DefKind::Object(_) => {
                let found = self
                    .registry
                    .with_object_mut(left_type, |object| {
                        object
                            .static_fields
                            .get(&member_name)
                            .copied()
                            .map(|ty| (ty, true))
                            .or_else(|| {
                                object.methods.get(&member_name).copied().map(|ty| (ty, false))
                            })
                            .or_else(|| {
                                object
                                    .static_placeholders
                                    .get(&member_name)
                                    .copied()
                                    .map(|ty| (ty, true))
                            })
                    })
                    .flatten();
                if let Some(found) = found {
                    return Some(found);
                }
                if Some(left_type) == self.current_object {
                    let child = self
                        .registry
                        .placeholder(PlaceholderDef::new(Some(member_name), member));
                    self.registry.with_object_mut(left_type, |object| {
                        object.static_placeholders.insert(member_name, child);
                    });
                    return Some((child, true));
                }
                self.member_error(left_type, member);
                None
            }
            DefKind::Enum(ref enumeration) => {
                if enumeration.cases.contains(&member_name) {
                    let instance = self.registry.instance_of(left_type);
                    Some((instance, false))
                } else {
                    let enum_name = self.strings.resolve(enumeration.name);
                    self.type_error_at(
                        member,
                        format!(
                            "Enum `{enum_name}` has no case `{}`.",
                            self.strings.resolve(member_name)
                        ),
                    );
                    None
                }
            }
            DefKind::EnumInstance { of } => {
                // `.value` yields the case's backing value.
                if self.strings.resolve(member_name) == "value" {
                    let case_type = match &self.registry.def(of).kind {
                        DefKind::Enum(enumeration) => enumeration.case_type,
                        _ => TypeId::VOID,
                    };
                    Some((case_type, false))
                } else {
                    let name = self.registry.canonical(left_type);
                    self.type_error_at(
                        member,
                        format!(
                            "`{name}` has no member `{}`.",
                            self.strings.resolve(member_name)
                        ),
                    );
                    None
                }
            }
            _ => {
                let name = self.registry.canonical(left_type);
                self.type_error_at(
                    member,
                    format!(
                        "`{name}` has no member `{}`.",
                        self.strings.resolve(member_name)
                    ),
                );
                None
            }
        }
    }

    /// Instance member lookup, walking the inheritance chain: fields shadow
    /// methods, subclasses shadow superclasses.
    fn lookup_instance_member(
        &self,
        object_type: TypeId,
        member: buzz_common::Atom,
    ) -> Option<(TypeId, bool)> {
        let mut current = Some(object_type);
        while let Some(object_id) = current {
            let DefKind::Object(object) = self.registry.def(object_id).kind else {
                return None;
            };
            if let Some(&field) = object.fields.get(&member) {
                return Some((field, true));
            }
            if let Some(&method) = object.methods.get(&member) {
                return Some((method, false));
            }
            if let Some(&placeholder) = object.placeholders.get(&member) {
                return Some((placeholder, true));
            }
            current = object.super_type;
        }
        None
    }

    fn member_error(&mut self, object_type: TypeId, member: Token) {
        let object_name = match &self.registry.def(object_type).kind {
            DefKind::Object(object) => self.strings.resolve(object.name),
            _ => self.registry.canonical(object_type),
        };
        self.type_error_at(
            member,
            format!(
                "Object `{object_name}` has no member `{}`.",
                self.strings.resolve(member.lexeme)
            ),
        );
    }

    pub(crate) fn call(&mut self, left: NodeId, _can_assign: bool) -> Option<NodeId> {
        let paren = self.previous;
        let arguments = self.argument_list()?;
        let callee_type = self.node_type(left).unwrap_or(TypeId::VOID);

        let result = match self.registry.def(callee_type).kind {
            DefKind::Function(ref function) => {
                self.check_arguments(callee_type, &arguments, paren);
                function.return_type
            }
            DefKind::Placeholder(_) => {
                let child = self.registry.placeholder(PlaceholderDef::new(None, paren));
                self.registry
                    .link(callee_type, child, PlaceholderRelation::Call);
                child
            }
            _ => {
                let name = self.registry.canonical(callee_type);
                self.type_error_at(paren, format!("Can't call `{name}`."));
                TypeId::VOID
            }
        };

        let catches = self.catch_clauses(result)?;
        Some(self.node(
            NodeKind::Call {
                callee: left,
                arguments,
                catches,
            },
            paren,
            Some(result),
        ))
    }

    pub(crate) fn argument_list(&mut self) -> Option<Vec<CallArgument>> {
        let mut arguments = Vec::new();
        while !self.check(TokenKind::RightParen) && !self.check(TokenKind::Eof) {
            if arguments.len() >= MAX_PARAMETERS {
                self.error_at_current("Can't have more than 255 arguments.");
                return None;
            }
            let name = if self.check(TokenKind::Identifier)
                && self.peek(1).kind == TokenKind::Colon
            {
                self.advance();
                let name = self.previous.lexeme;
                self.advance();
                Some(name)
            } else {
                None
            };
            let value = self.expression()?;
            arguments.push(CallArgument { name, value });
            if !self.match_token(TokenKind::Comma) {
                break;
            }
        }
        self.consume(TokenKind::RightParen, "Expected `)` after arguments.")?;
        Some(arguments)
    }

    /// Check provided arguments against a concrete function signature:
    /// positional in order, named by name, defaults may be omitted.
    pub(crate) fn check_arguments(
        &mut self,
        function_type: TypeId,
        arguments: &[CallArgument],
        at: Token,
    ) {
        let DefKind::Function(function) = self.registry.def(function_type).kind else {
            return;
        };
        let mut covered: Vec<buzz_common::Atom> = Vec::new();
        for (position, argument) in arguments.iter().enumerate() {
            let parameter = match argument.name {
                Some(name) => function.parameters.get(&name).map(|&ty| (name, ty)),
                None => function
                    .parameters
                    .get_index(position)
                    .map(|(&name, &ty)| (name, ty)),
            };
            let Some((name, expected)) = parameter else {
                self.type_error_at(at, "Too many arguments.".to_string());
                continue;
            };
            covered.push(name);
            if let Some(value_type) = self.node_type(argument.value) {
                let location = self.ast_location(argument.value);
                self.check_assignment(expected, value_type, location);
            }
        }
        for (&name, _) in &function.parameters {
            if covered.contains(&name) {
                continue;
            }
            if function.has_defaults.get(&name).copied().unwrap_or(false) {
                continue;
            }
            self.type_error_at(
                at,
                format!("Missing argument `{}`.", self.strings.resolve(name)),
            );
        }
    }

    /// Inline `catch` after a call: `catch <expr>` or `catch { clause, … }`
    /// where each clause is a default value or a closure of kind `Catch`.
    pub(crate) fn catch_clauses(&mut self, result_type: TypeId) -> Option<Vec<NodeId>> {
        if !self.match_token(TokenKind::Catch) {
            return Some(Vec::new());
        }
        let mut catches = Vec::new();
        if self.match_token(TokenKind::LeftBrace) {
            while !self.check(TokenKind::RightBrace) && !self.check(TokenKind::Eof) {
                if catches.len() >= MAX_CATCH_CLAUSES {
                    self.error_at_current("Can't have more than 255 catch clauses.");
                    return None;
                }
                catches.push(self.catch_clause(result_type)?);
                if !self.match_token(TokenKind::Comma) {
                    break;
                }
            }
            self.consume(TokenKind::RightBrace, "Expected `}` after catch clauses.")?;
        } else {
            catches.push(self.catch_clause(result_type)?);
        }
        Some(catches)
    }

    fn catch_clause(&mut self, result_type: TypeId) -> Option<NodeId> {
        let start = self.current;
        let clause = if self.match_token(TokenKind::Fun) {
            let token = self.previous;
            let name = Token::new(token.kind, self.strings.intern(""), token.line, token.column);
            // Closure return type defaults to the call's own result type.
            let (node, _) = self.function(name, FunctionKind::Catch, Some(result_type), None)?;
            node
        } else {
            let clause = self.expression()?;
            if let Some(clause_type) = self.node_type(clause) {
                let location = self.ast_location(clause);
                self.check_assignment(result_type, clause_type, location);
            }
            clause
        };
        let clause_type = self.node_type(clause);
        Some(self.node(NodeKind::Catch { clause }, start, clause_type))
    }

    pub(crate) fn object_init(&mut self, left: NodeId, _can_assign: bool) -> Option<NodeId> {
        let brace = self.previous;
        let left_type = self.node_type(left).unwrap_or(TypeId::VOID);

        let result = match self.registry.def(left_type).kind {
            DefKind::Object(_) => self.registry.instance_of(left_type),
            DefKind::Placeholder(_) => {
                let child = self.registry.placeholder(PlaceholderDef::new(None, brace));
                self.registry
                    .link(left_type, child, PlaceholderRelation::Call);
                child
            }
            _ => {
                let name = self.registry.canonical(left_type);
                self.type_error_at(brace, format!("`{name}` is not an object type."));
                TypeId::VOID
            }
        };

        let mut properties = Vec::new();
        while !self.check(TokenKind::RightBrace) && !self.check(TokenKind::Eof) {
            self.consume(TokenKind::Identifier, "Expected field name.")?;
            let field = self.previous;
            self.consume(TokenKind::Equal, "Expected `=` after field name.")?;
            let value = self.expression()?;

            if let DefKind::Object(ref object) = self.registry.def(left_type).kind {
                match object.fields.get(&field.lexeme) {
                    Some(&expected) => {
                        if let Some(value_type) = self.node_type(value) {
                            self.check_assignment(expected, value_type, field);
                        }
                    }
                    None => {
                        let object_name = self.strings.resolve(object.name);
                        self.type_error_at(
                            field,
                            format!(
                                "Object `{object_name}` has no field `{}`.",
                                self.strings.resolve(field.lexeme)
                            ),
                        );
                    }
                }
            }
            properties.push((field.lexeme, value));
            if !self.match_token(TokenKind::Comma) {
                break;
            }
        }
        self.consume(TokenKind::RightBrace, "Expected `}` after object fields.")?;

        Some(self.node(
            NodeKind::ObjectInit {
                object: left,
                properties,
            },
            brace,
            Some(result),
        ))
    }

    pub(crate) fn ast_location(&self, id: NodeId) -> Token {
        self.ast.borrow().get(id).location
    }
}
