//! Type references in source position: `num`, `[str]`, `{str,num}`,
//! `fun(num) > str`, user types by (optionally prefixed) name, `?` suffix.
//!
//! A reference to a user type resolves to the *instance* form of its
//! definition. When the name is not declared yet, a placeholder global is
//! created (or reused) and the reference becomes an `Instance` child of it,
//! so the eventual declaration resolves every declaration-position use.

use buzz_scanner::TokenKind;
use buzz_types::{
    DefKind, FunctionDef, FunctionKind, PlaceholderDef, PlaceholderRelation, TypeDef, TypeId,
};
use indexmap::IndexMap;
use rustc_hash::FxHashMap;

use super::Parser;

impl Parser {
    pub(crate) fn parse_type_ref(&mut self) -> Option<TypeId> {
        let base = match self.current.kind {
            TokenKind::Bool => {
                self.advance();
                TypeId::BOOL
            }
            TokenKind::NumType => {
                self.advance();
                TypeId::NUMBER
            }
            TokenKind::StrType => {
                self.advance();
                TypeId::STRING
            }
            TokenKind::TypeType => {
                self.advance();
                TypeId::TYPE
            }
            TokenKind::Void => {
                self.advance();
                TypeId::VOID
            }
            TokenKind::LeftBracket => {
                self.advance();
                let item = self.parse_type_ref()?;
                self.consume(TokenKind::RightBracket, "Expected `]` after list item type.")?;
                self.registry
                    .get_or_intern(TypeDef::new(DefKind::List { item }))
            }
            TokenKind::LeftBrace => {
                self.advance();
                let key = self.parse_type_ref()?;
                self.consume(TokenKind::Comma, "Expected `,` between map key and value types.")?;
                let value = self.parse_type_ref()?;
                self.consume(TokenKind::RightBrace, "Expected `}` after map value type.")?;
                self.registry
                    .get_or_intern(TypeDef::new(DefKind::Map { key, value }))
            }
            TokenKind::Fun => {
                self.advance();
                self.function_type_ref()?
            }
            TokenKind::Identifier => {
                self.advance();
                self.user_type_ref()?
            }
            _ => {
                self.error_at_current("Expected type.");
                return None;
            }
        };

        if self.match_token(TokenKind::Question) {
            return Some(self.registry.with_optional(base, true));
        }
        Some(base)
    }

    /// `fun(<types>) > <ret>` in type position; parameters are unnamed so
    /// they get positional names.
    fn function_type_ref(&mut self) -> Option<TypeId> {
        self.consume(TokenKind::LeftParen, "Expected `(` in function type.")?;
        let mut parameters: IndexMap<buzz_common::Atom, TypeId> = IndexMap::new();
        while !self.check(TokenKind::RightParen) && !self.check(TokenKind::Eof) {
            let parameter = self.parse_type_ref()?;
            let name = self.strings.intern(&format!("${}", parameters.len()));
            parameters.insert(name, parameter);
            if !self.match_token(TokenKind::Comma) {
                break;
            }
        }
        self.consume(TokenKind::RightParen, "Expected `)` in function type.")?;
        self.consume(TokenKind::Greater, "Expected `>` before return type.")?;
        let return_type = self.parse_type_ref()?;
        Some(
            self.registry
                .get_or_intern(TypeDef::new(DefKind::Function(FunctionDef {
                    name: self.strings.intern(""),
                    return_type,
                    parameters,
                    has_defaults: FxHashMap::default(),
                    kind: FunctionKind::Anonymous,
                    lambda: false,
                    native: false,
                }))),
        )
    }

    fn user_type_ref(&mut self) -> Option<TypeId> {
        let first = self.previous;
        let (prefix, name_token) = if self.check(TokenKind::Dot)
            && self.peek(1).kind == TokenKind::Identifier
            && self.has_prefix(first.lexeme)
        {
            self.advance();
            self.advance();
            (Some(first.lexeme), self.previous)
        } else {
            (None, first)
        };

        if let Some(index) = self.resolve_global(prefix, name_token) {
            let type_def = self.globals[index as usize].type_def;
            if self.registry.def(type_def).is_placeholder() {
                return Some(self.instance_child(type_def, name_token));
            }
            return Some(self.registry.instance_of(type_def));
        }

        if prefix.is_some() {
            self.error_at(
                name_token,
                &format!(
                    "Unknown symbol `{}`.",
                    self.strings.resolve(name_token.lexeme)
                ),
            );
            return None;
        }

        // Forward type reference: placeholder global plus an instance view.
        let index = self.declare_placeholder(name_token);
        let type_def = self.globals[index as usize].type_def;
        Some(self.instance_child(type_def, name_token))
    }

    fn instance_child(&mut self, placeholder: TypeId, at: buzz_scanner::Token) -> TypeId {
        let child = self.registry.placeholder(PlaceholderDef::new(None, at));
        self.registry
            .link(placeholder, child, PlaceholderRelation::Instance);
        child
    }
}
