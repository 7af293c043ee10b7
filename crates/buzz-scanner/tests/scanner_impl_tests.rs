use super::*;
use std::rc::Rc;

fn scan_all(source: &str) -> (Vec<Token>, Rc<Interner>) {
    let interner = Rc::new(Interner::new());
    let mut scanner = Scanner::new(source, Rc::clone(&interner));
    let mut tokens = Vec::new();
    loop {
        let token = scanner.scan_token();
        let done = token.kind == TokenKind::Eof;
        tokens.push(token);
        if done {
            break;
        }
    }
    (tokens, interner)
}

fn kinds(source: &str) -> Vec<TokenKind> {
    scan_all(source).0.iter().map(|t| t.kind).collect()
}

#[test]
fn punctuation_and_operators() {
    assert_eq!(
        kinds("( ) [ ] , . ; : + - * / % ?? ? ! != == = >= > >> <= < <<"),
        vec![
            TokenKind::LeftParen,
            TokenKind::RightParen,
            TokenKind::LeftBracket,
            TokenKind::RightBracket,
            TokenKind::Comma,
            TokenKind::Dot,
            TokenKind::Semicolon,
            TokenKind::Colon,
            TokenKind::Plus,
            TokenKind::Minus,
            TokenKind::Star,
            TokenKind::Slash,
            TokenKind::Percent,
            TokenKind::QuestionQuestion,
            TokenKind::Question,
            TokenKind::Bang,
            TokenKind::BangEqual,
            TokenKind::EqualEqual,
            TokenKind::Equal,
            TokenKind::GreaterEqual,
            TokenKind::Greater,
            TokenKind::ShiftRight,
            TokenKind::LessEqual,
            TokenKind::Less,
            TokenKind::ShiftLeft,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn keywords_and_identifiers() {
    let (tokens, interner) = scan_all("fun fact num n");
    assert_eq!(tokens[0].kind, TokenKind::Fun);
    assert_eq!(tokens[1].kind, TokenKind::Identifier);
    assert_eq!(interner.resolve(tokens[1].lexeme), "fact");
    assert_eq!(tokens[2].kind, TokenKind::NumType);
    assert_eq!(tokens[3].kind, TokenKind::Identifier);
}

#[test]
fn number_literals() {
    let (tokens, _) = scan_all("42 3.25 0x1F 0b101");
    assert_eq!(tokens[0].number(), Some(42.0));
    assert_eq!(tokens[1].number(), Some(3.25));
    assert_eq!(tokens[2].number(), Some(31.0));
    assert_eq!(tokens[3].number(), Some(5.0));
}

#[test]
fn plain_string_literal() {
    let (tokens, interner) = scan_all("\"hello world\"");
    assert_eq!(tokens[0].kind, TokenKind::String);
    assert_eq!(interner.resolve(tokens[0].string().unwrap()), "hello world");
}

#[test]
fn string_escapes() {
    let (tokens, interner) = scan_all("\"a\\nb\\t\\\"\\\\\\{\"");
    assert_eq!(tokens[0].kind, TokenKind::String);
    assert_eq!(interner.resolve(tokens[0].string().unwrap()), "a\nb\t\"\\{");
}

#[test]
fn interpolated_string_splits_into_fragments() {
    let (tokens, interner) = scan_all("\"hello {name} and {other}!\"");
    let expected = vec![
        TokenKind::StringFragment,
        TokenKind::Identifier,
        TokenKind::StringFragment,
        TokenKind::Identifier,
        TokenKind::String,
        TokenKind::Eof,
    ];
    assert_eq!(tokens.iter().map(|t| t.kind).collect::<Vec<_>>(), expected);
    assert_eq!(interner.resolve(tokens[0].string().unwrap()), "hello ");
    assert_eq!(interner.resolve(tokens[2].string().unwrap()), " and ");
    assert_eq!(interner.resolve(tokens[4].string().unwrap()), "!");
}

#[test]
fn interpolation_tracks_nested_braces() {
    // The map literal's braces must not close the interpolation hole.
    let found = kinds("\"x: {{\"a\": 1}[\"a\"]}\"");
    assert_eq!(
        found,
        vec![
            TokenKind::StringFragment,
            TokenKind::LeftBrace,
            TokenKind::String,
            TokenKind::Colon,
            TokenKind::Number,
            TokenKind::RightBrace,
            TokenKind::LeftBracket,
            TokenKind::String,
            TokenKind::RightBracket,
            TokenKind::String,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn unterminated_string_is_error_token() {
    let (tokens, interner) = scan_all("\"oops");
    assert_eq!(tokens[0].kind, TokenKind::Error);
    assert_eq!(interner.resolve(tokens[0].lexeme), "Unterminated string.");
}

#[test]
fn line_and_column_tracking() {
    let (tokens, _) = scan_all("num a;\n  num b;");
    // `num` on line 1 column 1, `b`'s `num` on line 2 column 3
    assert_eq!((tokens[0].line, tokens[0].column), (1, 1));
    assert_eq!((tokens[3].line, tokens[3].column), (2, 3));
    assert_eq!((tokens[4].line, tokens[4].column), (2, 7));
}

#[test]
fn line_comments_are_skipped() {
    assert_eq!(
        kinds("num a; // the rest is ignored\nnum b;"),
        vec![
            TokenKind::NumType,
            TokenKind::Identifier,
            TokenKind::Semicolon,
            TokenKind::NumType,
            TokenKind::Identifier,
            TokenKind::Semicolon,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn get_lines_snippets() {
    let interner = Rc::new(Interner::new());
    let scanner = Scanner::new("one\ntwo\nthree\nfour", interner);
    assert_eq!(scanner.get_lines(2, 2), vec!["two", "three"]);
    assert_eq!(scanner.get_lines(1, 10).len(), 4);
    assert_eq!(scanner.get_lines(9, 2), Vec::<&str>::new());
}
