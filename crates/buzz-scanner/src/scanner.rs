//! The scanner proper.
//!
//! One token per [`Scanner::scan_token`] call; the parser drives the scanner,
//! there is no up-front token vector. Lexical errors are returned as
//! `TokenKind::Error` tokens whose lexeme is the message, so the parser can
//! report them with its usual diagnostic machinery.

use crate::token::{Literal, Token, TokenKind};
use buzz_common::Interner;
use std::rc::Rc;

pub struct Scanner {
    chars: Vec<char>,
    lines: Vec<String>,
    interner: Rc<Interner>,
    current: usize,
    line: u32,
    column: u32,
    start_line: u32,
    start_column: u32,
    /// Brace-nesting depth for each string interpolation we are inside of.
    /// Empty when not interpolating. The top entry counts `{`/`}` pairs seen
    /// inside the current interpolated expression; when it would go below
    /// zero the `}` closes the interpolation and string mode resumes.
    interpolation_depths: Vec<u32>,
}

impl Scanner {
    #[must_use]
    pub fn new(source: &str, interner: Rc<Interner>) -> Self {
        Self {
            chars: source.chars().collect(),
            lines: source.lines().map(str::to_string).collect(),
            interner,
            current: 0,
            line: 1,
            column: 1,
            start_line: 1,
            start_column: 1,
            interpolation_depths: Vec::new(),
        }
    }

    /// Fetch `count` source lines starting at 1-based line `start`, clamped
    /// to the file. Used for diagnostic snippets.
    #[must_use]
    pub fn get_lines(&self, start: u32, count: u32) -> Vec<&str> {
        let first = (start.max(1) - 1) as usize;
        self.lines
            .iter()
            .skip(first)
            .take(count as usize)
            .map(String::as_str)
            .collect()
    }

    pub fn scan_token(&mut self) -> Token {
        self.skip_whitespace();
        self.start_line = self.line;
        self.start_column = self.column;

        let Some(c) = self.advance() else {
            return self.make(TokenKind::Eof, "");
        };

        match c {
            '(' => self.make(TokenKind::LeftParen, "("),
            ')' => self.make(TokenKind::RightParen, ")"),
            '[' => self.make(TokenKind::LeftBracket, "["),
            ']' => self.make(TokenKind::RightBracket, "]"),
            ',' => self.make(TokenKind::Comma, ","),
            '.' => self.make(TokenKind::Dot, "."),
            ';' => self.make(TokenKind::Semicolon, ";"),
            ':' => self.make(TokenKind::Colon, ":"),
            '+' => self.make(TokenKind::Plus, "+"),
            '-' => self.make(TokenKind::Minus, "-"),
            '*' => self.make(TokenKind::Star, "*"),
            '/' => self.make(TokenKind::Slash, "/"),
            '%' => self.make(TokenKind::Percent, "%"),
            '{' => {
                if let Some(depth) = self.interpolation_depths.last_mut() {
                    *depth += 1;
                }
                self.make(TokenKind::LeftBrace, "{")
            }
            '}' => {
                match self.interpolation_depths.last_mut() {
                    Some(0) => {
                        // Closes the interpolation hole; resume string mode.
                        self.interpolation_depths.pop();
                        self.scan_string()
                    }
                    Some(depth) => {
                        *depth -= 1;
                        self.make(TokenKind::RightBrace, "}")
                    }
                    None => self.make(TokenKind::RightBrace, "}"),
                }
            }
            '!' => {
                if self.match_char('=') {
                    self.make(TokenKind::BangEqual, "!=")
                } else {
                    self.make(TokenKind::Bang, "!")
                }
            }
            '=' => {
                if self.match_char('=') {
                    self.make(TokenKind::EqualEqual, "==")
                } else {
                    self.make(TokenKind::Equal, "=")
                }
            }
            '>' => {
                if self.match_char('=') {
                    self.make(TokenKind::GreaterEqual, ">=")
                } else if self.match_char('>') {
                    self.make(TokenKind::ShiftRight, ">>")
                } else {
                    self.make(TokenKind::Greater, ">")
                }
            }
            '<' => {
                if self.match_char('=') {
                    self.make(TokenKind::LessEqual, "<=")
                } else if self.match_char('<') {
                    self.make(TokenKind::ShiftLeft, "<<")
                } else {
                    self.make(TokenKind::Less, "<")
                }
            }
            '?' => {
                if self.match_char('?') {
                    self.make(TokenKind::QuestionQuestion, "??")
                } else {
                    self.make(TokenKind::Question, "?")
                }
            }
            '"' => self.scan_string(),
            c if c.is_ascii_digit() => self.scan_number(c),
            c if c.is_ascii_alphabetic() || c == '_' => self.scan_identifier(c),
            c => self.error(format!("Unexpected character `{c}`.")),
        }
    }

    // =========================================================================
    // Scanning helpers
    // =========================================================================

    fn skip_whitespace(&mut self) {
        loop {
            match self.peek() {
                Some(' ' | '\r' | '\t' | '\n') => {
                    self.advance();
                }
                Some('/') if self.peek_next() == Some('/') => {
                    while let Some(c) = self.peek() {
                        if c == '\n' {
                            break;
                        }
                        self.advance();
                    }
                }
                _ => return,
            }
        }
    }

    /// Scan string content up to the closing quote or an interpolation hole.
    /// Called both at the opening `"` and when an interpolation closes.
    fn scan_string(&mut self) -> Token {
        let mut content = String::new();
        loop {
            match self.advance() {
                None => return self.error("Unterminated string.".to_string()),
                Some('"') => {
                    let atom = self.interner.intern(&content);
                    let mut token = self.make(TokenKind::String, &content);
                    token.literal = Some(Literal::String(atom));
                    return token;
                }
                Some('{') => {
                    self.interpolation_depths.push(0);
                    let atom = self.interner.intern(&content);
                    let mut token = self.make(TokenKind::StringFragment, &content);
                    token.literal = Some(Literal::String(atom));
                    return token;
                }
                Some('\\') => match self.advance() {
                    Some('n') => content.push('\n'),
                    Some('t') => content.push('\t'),
                    Some('"') => content.push('"'),
                    Some('\\') => content.push('\\'),
                    Some('{') => content.push('{'),
                    Some(c) => {
                        return self.error(format!("Unknown escape sequence `\\{c}`."));
                    }
                    None => return self.error("Unterminated string.".to_string()),
                },
                Some('\n') => return self.error("Unterminated string.".to_string()),
                Some(c) => content.push(c),
            }
        }
    }

    fn scan_number(&mut self, first: char) -> Token {
        let mut text = String::from(first);

        if first == '0' && matches!(self.peek(), Some('x' | 'X')) {
            self.advance();
            let mut digits = String::new();
            while let Some(c) = self.peek() {
                if c.is_ascii_hexdigit() {
                    digits.push(c);
                    self.advance();
                } else {
                    break;
                }
            }
            return match u64::from_str_radix(&digits, 16) {
                Ok(value) => self.number_token(&format!("0x{digits}"), value as f64),
                Err(_) => self.error("Malformed hexadecimal literal.".to_string()),
            };
        }
        if first == '0' && matches!(self.peek(), Some('b' | 'B')) {
            self.advance();
            let mut digits = String::new();
            while let Some(c) = self.peek() {
                if c == '0' || c == '1' {
                    digits.push(c);
                    self.advance();
                } else {
                    break;
                }
            }
            return match u64::from_str_radix(&digits, 2) {
                Ok(value) => self.number_token(&format!("0b{digits}"), value as f64),
                Err(_) => self.error("Malformed binary literal.".to_string()),
            };
        }

        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                text.push(c);
                self.advance();
            } else {
                break;
            }
        }
        if self.peek() == Some('.') && self.peek_next().is_some_and(|c| c.is_ascii_digit()) {
            text.push('.');
            self.advance();
            while let Some(c) = self.peek() {
                if c.is_ascii_digit() {
                    text.push(c);
                    self.advance();
                } else {
                    break;
                }
            }
        }

        let value: f64 = text.parse().unwrap_or(f64::NAN);
        self.number_token(&text, value)
    }

    fn number_token(&mut self, text: &str, value: f64) -> Token {
        let mut token = self.make(TokenKind::Number, text);
        token.literal = Some(Literal::Number(value));
        token
    }

    fn scan_identifier(&mut self, first: char) -> Token {
        let mut text = String::from(first);
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || c == '_' {
                text.push(c);
                self.advance();
            } else {
                break;
            }
        }
        self.make(keyword_kind(&text).unwrap_or(TokenKind::Identifier), &text)
    }

    // =========================================================================
    // Character primitives
    // =========================================================================

    fn advance(&mut self) -> Option<char> {
        let c = self.chars.get(self.current).copied()?;
        self.current += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.current).copied()
    }

    fn peek_next(&self) -> Option<char> {
        self.chars.get(self.current + 1).copied()
    }

    fn match_char(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn make(&self, kind: TokenKind, lexeme: &str) -> Token {
        Token::new(
            kind,
            self.interner.intern(lexeme),
            self.start_line,
            self.start_column,
        )
    }

    fn error(&self, message: String) -> Token {
        Token::new(
            TokenKind::Error,
            self.interner.intern(&message),
            self.start_line,
            self.start_column,
        )
    }
}

fn keyword_kind(text: &str) -> Option<TokenKind> {
    Some(match text {
        "and" => TokenKind::And,
        "or" => TokenKind::Or,
        "xor" => TokenKind::Xor,
        "is" => TokenKind::Is,
        "as" => TokenKind::As,
        "true" => TokenKind::True,
        "false" => TokenKind::False,
        "null" => TokenKind::Null,
        "bool" => TokenKind::Bool,
        "num" => TokenKind::NumType,
        "str" => TokenKind::StrType,
        "type" => TokenKind::TypeType,
        "void" => TokenKind::Void,
        "fun" => TokenKind::Fun,
        "extern" => TokenKind::Extern,
        "object" => TokenKind::Object,
        "class" => TokenKind::Class,
        "enum" => TokenKind::Enum,
        "import" => TokenKind::Import,
        "export" => TokenKind::Export,
        "from" => TokenKind::From,
        "const" => TokenKind::Const,
        "if" => TokenKind::If,
        "else" => TokenKind::Else,
        "while" => TokenKind::While,
        "for" => TokenKind::For,
        "foreach" => TokenKind::ForEach,
        "in" => TokenKind::In,
        "do" => TokenKind::Do,
        "until" => TokenKind::Until,
        "return" => TokenKind::Return,
        "break" => TokenKind::Break,
        "continue" => TokenKind::Continue,
        "throw" => TokenKind::Throw,
        "catch" => TokenKind::Catch,
        "test" => TokenKind::Test,
        "super" => TokenKind::Super,
        _ => return None,
    })
}

#[cfg(test)]
#[path = "../tests/scanner_impl_tests.rs"]
mod tests;
