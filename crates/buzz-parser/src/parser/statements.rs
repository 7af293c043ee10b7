//! Statement dispatch and control flow.
//!
//! Statement-level `[` and `{` start list- and map-typed variable
//! declarations (bare blocks only appear after control keywords). An
//! identifier starts a user-typed declaration when the bounded look-ahead
//! sees `Type name`, `Type? name`, or `Prefix.Type name`.

use crate::ast::{NodeId, NodeKind};
use buzz_scanner::TokenKind;
use buzz_types::{DefKind, TypeId};

use super::Parser;

impl Parser {
    pub(crate) fn declaration_or_statement(&mut self) -> Option<NodeId> {
        let current_kind = self.current.kind;
        match current_kind {
            TokenKind::Fun => self.fun_declaration(),
            TokenKind::Extern => self.extern_declaration(),
            TokenKind::Object => self.object_declaration(false),
            TokenKind::Class => self.object_declaration(true),
            TokenKind::Enum => self.enum_declaration(),
            TokenKind::Import => self.import_statement(),
            TokenKind::Export => self.export_statement(),
            TokenKind::Test => self.test_declaration(),
            TokenKind::Const => {
                self.advance();
                self.var_declaration(true)
            }
            TokenKind::Bool
            | TokenKind::NumType
            | TokenKind::StrType
            | TokenKind::TypeType
            | TokenKind::LeftBracket
            | TokenKind::LeftBrace => self.var_declaration(false),
            TokenKind::Identifier if self.is_user_typed_declaration() => {
                self.var_declaration(false)
            }
            _ => self.statement(),
        }
    }

    /// Up to three tokens of look-ahead decide whether an identifier starts
    /// a user-typed declaration rather than an expression statement.
    fn is_user_typed_declaration(&mut self) -> bool {
        match self.peek(1).kind {
            TokenKind::Identifier => true,
            TokenKind::Question => self.peek(2).kind == TokenKind::Identifier,
            TokenKind::Dot => {
                self.peek(2).kind == TokenKind::Identifier
                    && self.peek(3).kind == TokenKind::Identifier
            }
            _ => false,
        }
    }

    pub(crate) fn statement(&mut self) -> Option<NodeId> {
        match self.current.kind {
            TokenKind::If => self.if_statement(),
            TokenKind::While => self.while_statement(),
            TokenKind::For => self.for_statement(),
            TokenKind::ForEach => self.foreach_statement(),
            TokenKind::Do => self.do_until_statement(),
            TokenKind::Return => self.return_statement(),
            TokenKind::Break => self.break_statement(),
            TokenKind::Continue => self.continue_statement(),
            TokenKind::Throw => self.throw_statement(),
            _ => self.expression_statement(),
        }
    }

    /// A braced statement list with its own scope.
    pub(crate) fn block(&mut self) -> Option<NodeId> {
        self.consume(TokenKind::LeftBrace, "Expected `{`.")?;
        let start = self.previous;
        self.begin_scope();
        let mut statements = Vec::new();
        while !self.check(TokenKind::RightBrace) && !self.check(TokenKind::Eof) {
            if let Some(statement) = self.declaration_or_statement() {
                statements.push(statement);
            }
            if self.reporter.borrow().panic_mode {
                self.synchronize();
            }
        }
        self.end_scope();
        self.consume(TokenKind::RightBrace, "Expected `}` after block.")?;
        Some(self.node(NodeKind::Block { statements }, start, None))
    }

    fn if_statement(&mut self) -> Option<NodeId> {
        self.advance();
        let start = self.previous;
        self.consume(TokenKind::LeftParen, "Expected `(` after `if`.")?;
        let condition = self.expression()?;
        if let Some(ty) = self.node_type(condition) {
            self.check_operand(TypeId::BOOL, ty, start);
        }
        self.consume(TokenKind::RightParen, "Expected `)` after condition.")?;
        let body = self.block()?;
        let else_branch = if self.match_token(TokenKind::Else) {
            if self.check(TokenKind::If) {
                Some(self.if_statement()?)
            } else {
                Some(self.block()?)
            }
        } else {
            None
        };
        Some(self.node(
            NodeKind::If {
                condition,
                body,
                else_branch,
            },
            start,
            None,
        ))
    }

    fn while_statement(&mut self) -> Option<NodeId> {
        self.advance();
        let start = self.previous;
        self.consume(TokenKind::LeftParen, "Expected `(` after `while`.")?;
        let condition = self.expression()?;
        if let Some(ty) = self.node_type(condition) {
            self.check_operand(TypeId::BOOL, ty, start);
        }
        self.consume(TokenKind::RightParen, "Expected `)` after condition.")?;
        self.loop_depth += 1;
        let block = self.block();
        self.loop_depth -= 1;
        Some(self.node(
            NodeKind::While {
                condition,
                block: block?,
            },
            start,
            None,
        ))
    }

    fn do_until_statement(&mut self) -> Option<NodeId> {
        self.advance();
        let start = self.previous;
        self.loop_depth += 1;
        let block = self.block();
        self.loop_depth -= 1;
        let block = block?;
        self.consume(TokenKind::Until, "Expected `until` after `do` block.")?;
        self.consume(TokenKind::LeftParen, "Expected `(` after `until`.")?;
        let condition = self.expression()?;
        if let Some(ty) = self.node_type(condition) {
            self.check_operand(TypeId::BOOL, ty, start);
        }
        self.consume(TokenKind::RightParen, "Expected `)` after condition.")?;
        self.consume(TokenKind::Semicolon, "Expected `;` after `until` clause.")?;
        Some(self.node(NodeKind::DoUntil { condition, block }, start, None))
    }

    fn for_statement(&mut self) -> Option<NodeId> {
        self.advance();
        let start = self.previous;
        self.begin_scope();
        self.consume(TokenKind::LeftParen, "Expected `(` after `for`.")?;

        let init_expression = if self.match_token(TokenKind::Semicolon) {
            None
        } else if self.starts_type() {
            // The declaration consumes its own `;`.
            Some(self.var_declaration(false)?)
        } else {
            let init = self.expression()?;
            self.consume(TokenKind::Semicolon, "Expected `;` after loop initializer.")?;
            Some(init)
        };

        let condition = self.expression()?;
        if let Some(ty) = self.node_type(condition) {
            self.check_operand(TypeId::BOOL, ty, start);
        }
        self.consume(TokenKind::Semicolon, "Expected `;` after loop condition.")?;

        let mut post_loop = Vec::new();
        while !self.check(TokenKind::RightParen) && !self.check(TokenKind::Eof) {
            post_loop.push(self.expression()?);
            if !self.match_token(TokenKind::Comma) {
                break;
            }
        }
        self.consume(TokenKind::RightParen, "Expected `)` after loop clauses.")?;

        self.loop_depth += 1;
        let body = self.block();
        self.loop_depth -= 1;
        self.end_scope();
        Some(self.node(
            NodeKind::For {
                init_expression,
                condition,
                post_loop,
                body: body?,
            },
            start,
            None,
        ))
    }

    fn starts_type(&mut self) -> bool {
        match self.current.kind {
            TokenKind::Bool
            | TokenKind::NumType
            | TokenKind::StrType
            | TokenKind::TypeType
            | TokenKind::LeftBracket
            | TokenKind::LeftBrace => true,
            TokenKind::Identifier => self.is_user_typed_declaration(),
            _ => false,
        }
    }

    fn foreach_statement(&mut self) -> Option<NodeId> {
        self.advance();
        let start = self.previous;
        self.begin_scope();
        self.consume(TokenKind::LeftParen, "Expected `(` after `foreach`.")?;

        let first = self.foreach_binding()?;
        let second = if self.match_token(TokenKind::Comma) {
            Some(self.foreach_binding()?)
        } else {
            None
        };
        self.consume(TokenKind::In, "Expected `in` after loop bindings.")?;
        let iterable = self.expression()?;
        self.consume(TokenKind::RightParen, "Expected `)` after iterable.")?;

        // With two bindings the first is the key; alone it is the value.
        let (key, value) = match second {
            Some(value) => (Some(first), value),
            None => (None, first),
        };
        self.check_foreach_bindings(key, value, iterable, start);

        self.loop_depth += 1;
        let block = self.block();
        self.loop_depth -= 1;
        self.end_scope();
        Some(self.node(
            NodeKind::ForEach {
                key,
                value,
                iterable,
                block: block?,
            },
            start,
            None,
        ))
    }

    /// One `Type name` loop binding, declared as an initialized local.
    fn foreach_binding(&mut self) -> Option<NodeId> {
        let declared = self.parse_type_ref()?;
        self.consume(TokenKind::Identifier, "Expected binding name.")?;
        let name_token = self.previous;
        let (slot, slot_kind) = self.declare_variable(declared, name_token, false)?;
        self.mark_initialized(slot, slot_kind);
        Some(self.node(
            NodeKind::VarDeclaration {
                name: name_token.lexeme,
                constant: false,
                slot,
                slot_kind,
                value: None,
            },
            name_token,
            Some(declared),
        ))
    }

    fn check_foreach_bindings(
        &mut self,
        key: Option<NodeId>,
        value: NodeId,
        iterable: NodeId,
        at: buzz_scanner::Token,
    ) {
        let Some(iterable_type) = self.node_type(iterable) else {
            return;
        };
        let (expected_key, expected_value) = match self.registry.def(iterable_type).kind {
            DefKind::List { item } => (Some(TypeId::NUMBER), item),
            DefKind::Map {
                key: key_type,
                value: value_type,
            } => (Some(key_type), value_type),
            DefKind::String => (Some(TypeId::NUMBER), TypeId::STRING),
            DefKind::Placeholder(_) => return,
            _ => {
                let name = self.registry.canonical(iterable_type);
                self.type_error_at(at, format!("Can't iterate over `{name}`."));
                return;
            }
        };
        if let (Some(key), Some(expected)) = (key, expected_key) {
            if let Some(declared) = self.node_type(key) {
                let location = self.ast_location(key);
                self.check_operand(expected, declared, location);
            }
        }
        if let Some(declared) = self.node_type(value) {
            let location = self.ast_location(value);
            self.check_operand(expected_value, declared, location);
        }
    }

    fn return_statement(&mut self) -> Option<NodeId> {
        self.advance();
        let start = self.previous;
        let return_type = match self.registry.def(self.frame().function_type).kind {
            DefKind::Function(function) => function.return_type,
            _ => TypeId::VOID,
        };
        let value = if self.check(TokenKind::Semicolon) {
            if return_type != TypeId::VOID
                && !self.registry.def(return_type).is_placeholder()
            {
                let expected = self.registry.canonical(return_type);
                self.type_error_at(start, format!("expected `{expected}`, got `void`"));
            }
            None
        } else {
            let value = self.expression()?;
            if let Some(value_type) = self.node_type(value) {
                self.check_assignment(return_type, value_type, start);
            }
            Some(value)
        };
        self.consume(TokenKind::Semicolon, "Expected `;` after return value.")?;
        Some(self.node(NodeKind::Return { value }, start, None))
    }

    fn break_statement(&mut self) -> Option<NodeId> {
        self.advance();
        let start = self.previous;
        if self.loop_depth == 0 {
            self.error_at(start, "Can't use `break` outside of a loop.");
        }
        self.consume(TokenKind::Semicolon, "Expected `;` after `break`.")?;
        Some(self.node(NodeKind::Break, start, None))
    }

    fn continue_statement(&mut self) -> Option<NodeId> {
        self.advance();
        let start = self.previous;
        if self.loop_depth == 0 {
            self.error_at(start, "Can't use `continue` outside of a loop.");
        }
        self.consume(TokenKind::Semicolon, "Expected `;` after `continue`.")?;
        Some(self.node(NodeKind::Continue, start, None))
    }

    fn throw_statement(&mut self) -> Option<NodeId> {
        self.advance();
        let start = self.previous;
        let value = self.expression()?;
        self.consume(TokenKind::Semicolon, "Expected `;` after thrown value.")?;
        Some(self.node(NodeKind::Throw { value }, start, None))
    }

    fn expression_statement(&mut self) -> Option<NodeId> {
        let node = self.expression()?;
        self.consume(TokenKind::Semicolon, "Expected `;` after expression.")?;
        Some(node)
    }
}
