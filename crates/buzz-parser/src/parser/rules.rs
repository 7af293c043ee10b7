//! Pratt rule table: one prefix rule, optional infix rule, and a precedence
//! per token kind, indexed by the token's discriminant.

use crate::ast::NodeId;
use crate::parser::Parser;
use buzz_scanner::TokenKind;

/// Precedence ladder, low to high. Comparing variants drives the
/// precedence-climbing loop in `parse_precedence`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum Precedence {
    None,
    Assignment,
    Is,
    Or,
    And,
    Xor,
    Equality,
    Comparison,
    NullCoalescing,
    Term,
    Shift,
    Factor,
    Unary,
    Call,
    Primary,
}

impl Precedence {
    /// One level tighter; used for left-associative infix operands.
    pub(crate) const fn next(self) -> Precedence {
        match self {
            Precedence::None => Precedence::Assignment,
            Precedence::Assignment => Precedence::Is,
            Precedence::Is => Precedence::Or,
            Precedence::Or => Precedence::And,
            Precedence::And => Precedence::Xor,
            Precedence::Xor => Precedence::Equality,
            Precedence::Equality => Precedence::Comparison,
            Precedence::Comparison => Precedence::NullCoalescing,
            Precedence::NullCoalescing => Precedence::Term,
            Precedence::Term => Precedence::Shift,
            Precedence::Shift => Precedence::Factor,
            Precedence::Factor => Precedence::Unary,
            Precedence::Unary => Precedence::Call,
            Precedence::Call | Precedence::Primary => Precedence::Primary,
        }
    }
}

pub(crate) type PrefixFn = fn(&mut Parser, bool) -> Option<NodeId>;
pub(crate) type InfixFn = fn(&mut Parser, NodeId, bool) -> Option<NodeId>;

pub(crate) struct ParseRule {
    pub prefix: Option<PrefixFn>,
    pub infix: Option<InfixFn>,
    pub precedence: Precedence,
}

const fn rule(
    prefix: Option<PrefixFn>,
    infix: Option<InfixFn>,
    precedence: Precedence,
) -> ParseRule {
    ParseRule {
        prefix,
        infix,
        precedence,
    }
}

const NONE: ParseRule = rule(None, None, Precedence::None);

pub(crate) fn get_rule(kind: TokenKind) -> &'static ParseRule {
    &RULES[kind as usize]
}

/// Indexed by `TokenKind` discriminant; must stay in declaration order.
static RULES: [ParseRule; TokenKind::COUNT] = [
    // LeftParen
    rule(Some(Parser::grouping), Some(Parser::call), Precedence::Call),
    // RightParen
    NONE,
    // LeftBrace
    rule(
        Some(Parser::map_literal),
        Some(Parser::object_init),
        Precedence::Call,
    ),
    // RightBrace
    NONE,
    // LeftBracket
    rule(
        Some(Parser::list_literal),
        Some(Parser::subscript),
        Precedence::Call,
    ),
    // RightBracket
    NONE,
    // Comma
    NONE,
    // Dot
    rule(None, Some(Parser::dot), Precedence::Call),
    // Semicolon
    NONE,
    // Colon
    NONE,
    // Plus
    rule(None, Some(Parser::binary), Precedence::Term),
    // Minus
    rule(Some(Parser::unary), Some(Parser::binary), Precedence::Term),
    // Star
    rule(None, Some(Parser::binary), Precedence::Factor),
    // Slash
    rule(None, Some(Parser::binary), Precedence::Factor),
    // Percent
    rule(None, Some(Parser::binary), Precedence::Factor),
    // Bang
    rule(
        Some(Parser::unary),
        Some(Parser::force_unwrap),
        Precedence::Call,
    ),
    // BangEqual
    rule(None, Some(Parser::binary), Precedence::Equality),
    // Equal
    NONE,
    // EqualEqual
    rule(None, Some(Parser::binary), Precedence::Equality),
    // Greater
    rule(None, Some(Parser::binary), Precedence::Comparison),
    // GreaterEqual
    rule(None, Some(Parser::binary), Precedence::Comparison),
    // Less
    rule(None, Some(Parser::binary), Precedence::Comparison),
    // LessEqual
    rule(None, Some(Parser::binary), Precedence::Comparison),
    // Question
    rule(None, Some(Parser::unwrap), Precedence::Call),
    // QuestionQuestion
    rule(None, Some(Parser::binary), Precedence::NullCoalescing),
    // ShiftLeft
    rule(None, Some(Parser::binary), Precedence::Shift),
    // ShiftRight
    rule(None, Some(Parser::binary), Precedence::Shift),
    // Identifier
    rule(Some(Parser::variable), None, Precedence::None),
    // String
    rule(Some(Parser::string_literal), None, Precedence::None),
    // StringFragment
    rule(Some(Parser::string_interpolation), None, Precedence::None),
    // Number
    rule(Some(Parser::number), None, Precedence::None),
    // And
    rule(None, Some(Parser::and_), Precedence::And),
    // Or
    rule(None, Some(Parser::or_), Precedence::Or),
    // Xor
    rule(None, Some(Parser::binary), Precedence::Xor),
    // Is
    rule(None, Some(Parser::is_), Precedence::Is),
    // As
    NONE,
    // True
    rule(Some(Parser::boolean), None, Precedence::None),
    // False
    rule(Some(Parser::boolean), None, Precedence::None),
    // Null
    rule(Some(Parser::null_literal), None, Precedence::None),
    // Bool
    NONE,
    // NumType
    NONE,
    // StrType
    NONE,
    // TypeType
    NONE,
    // Void
    NONE,
    // Fun
    rule(Some(Parser::anonymous_function), None, Precedence::None),
    // Extern
    NONE,
    // Object
    NONE,
    // Class
    NONE,
    // Enum
    NONE,
    // Import
    NONE,
    // Export
    NONE,
    // From
    NONE,
    // Const
    NONE,
    // If
    NONE,
    // Else
    NONE,
    // While
    NONE,
    // For
    NONE,
    // ForEach
    NONE,
    // In
    NONE,
    // Do
    NONE,
    // Until
    NONE,
    // Return
    NONE,
    // Break
    NONE,
    // Continue
    NONE,
    // Throw
    NONE,
    // Catch
    NONE,
    // Test
    NONE,
    // Super
    rule(Some(Parser::super_), None, Precedence::None),
    // Error
    NONE,
    // Eof
    NONE,
];
