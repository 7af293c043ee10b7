//! Scanner/tokenizer for the buzz compiler front end.
//!
//! Produces the [`Token`] stream the parser consumes, one token per
//! [`Scanner::scan_token`] call. String literals with `{expr}` interpolation
//! are split at the lexer level: the scanner emits `StringFragment` tokens for
//! the pieces before each interpolated expression, switches back to normal
//! tokenization for the expression itself, and resumes string mode at the
//! matching `}`.

pub mod scanner;
pub mod token;

pub use scanner::Scanner;
pub use token::{Literal, Token, TokenKind};
