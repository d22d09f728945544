//! Lexer for JavaScript sources using logos
//!
//! The whole file is tokenized, but only to the depth the extractor needs:
//! string and template literals are kept whole (so braces inside them never
//! look like object literals), regular expressions are told apart from
//! division by the previous token, and every operator other than `+` is a
//! single opaque `Operator` token.

use logos::{Lexer, Logos};

use super::ast::TemplateLit;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

/// Keywords after which an expression (and so a regex or object literal) may start
const EXPRESSION_KEYWORDS: &[&str] = &[
    "return",
    "typeof",
    "instanceof",
    "in",
    "of",
    "new",
    "delete",
    "void",
    "throw",
    "case",
    "do",
    "else",
    "yield",
    "await",
    "default",
];

/// Keywords whose parenthesized head is followed by a statement, not an operand
const CONTROL_KEYWORDS: &[&str] = &["if", "while", "for", "with"];

/// Lexer state carried between tokens
#[derive(Debug, Clone, Copy)]
pub struct LexState {
    /// Whether a `/` at the current position starts a regular expression
    pub regex_allowed: bool,
}

impl Default for LexState {
    fn default() -> Self {
        Self {
            regex_allowed: true,
        }
    }
}

/// What a `/` turned out to be
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlashKind {
    Divide,
    DivideAssign,
    /// A full regular expression literal, flags included
    Regex(String),
}

#[derive(Logos, Debug, Clone, PartialEq, Eq)]
#[logos(extras = LexState)]
#[logos(skip r"[ \t\n\r\x0B\x0C]+")]
pub enum Token {
    // Delimiters
    #[token("{")]
    BraceOpen,
    #[token("}")]
    BraceClose,
    #[token("(")]
    ParenOpen,
    #[token(")")]
    ParenClose,
    #[token("[")]
    BracketOpen,
    #[token("]")]
    BracketClose,
    #[token(",")]
    Comma,
    #[token(":")]
    Colon,
    #[token(";")]
    Semicolon,
    #[token(".")]
    Dot,
    #[token("...")]
    Spread,
    #[token("?")]
    Question,
    #[token("=>")]
    Arrow,

    // `+` is the only operator the extractor looks at
    #[token("+")]
    Plus,

    #[token("/", lex_slash)]
    #[token("/=", lex_slash)]
    Slash(SlashKind),

    // Every other operator, kept as written
    #[regex(r"\?\?=?|\?\.|[-*%&|^!~<>=]+|\+[-+*%&|^!~<>=]+", |lex| lex.slice().to_string())]
    Operator(String),

    // Literals
    #[regex(r"[a-zA-Z_$][a-zA-Z0-9_$]*", |lex| lex.slice().to_string())]
    Ident(String),

    #[regex(r"#[a-zA-Z_$][a-zA-Z0-9_$]*", |lex| lex.slice().to_string())]
    PrivateName(String),

    #[regex(
        r"(0[xXoObB][0-9a-fA-F_]+|([0-9][0-9_]*(\.[0-9_]*)?|\.[0-9][0-9_]*)([eE][+-]?[0-9_]+)?)n?",
        |lex| lex.slice().to_string()
    )]
    Number(String),

    /// String literal; carries the raw text between the quotes
    #[regex(r#"'([^'\\\n\r]|\\(.|\r?\n))*'"#, string_body)]
    #[regex(r#""([^"\\\n\r]|\\(.|\r?\n))*""#, string_body)]
    Str(String),

    #[token("`", lex_template)]
    Template(TemplateLit),

    // Comments (skip)
    #[regex(r"//[^\n\r]*", logos::skip)]
    LineComment,

    #[regex(r"/\*([^*]|\*+[^*/])*\*+/", logos::skip)]
    BlockComment,

    #[regex(r"#![^\n]*", logos::skip)]
    Hashbang,
}

impl Token {
    /// Whether a `/` right after this token starts a regular expression
    pub fn allows_regex_after(&self) -> bool {
        match self {
            Token::Ident(word) => EXPRESSION_KEYWORDS.contains(&word.as_str()),
            Token::Number(_)
            | Token::Str(_)
            | Token::Template(_)
            | Token::PrivateName(_)
            | Token::Slash(SlashKind::Regex(_))
            | Token::BraceClose
            | Token::ParenClose
            | Token::BracketClose => false,
            _ => true,
        }
    }

    /// Whether a `{` right after this token opens an object literal rather than a block
    pub fn precedes_object_literal(&self) -> bool {
        match self {
            Token::ParenOpen
            | Token::BracketOpen
            | Token::Comma
            | Token::Colon
            | Token::Question
            | Token::Spread
            | Token::Plus
            | Token::Operator(_) => true,
            Token::Ident(word) => {
                EXPRESSION_KEYWORDS.contains(&word.as_str()) && word != "do" && word != "else"
            }
            _ => false,
        }
    }

    pub fn is_open_bracket(&self) -> bool {
        matches!(
            self,
            Token::BraceOpen | Token::ParenOpen | Token::BracketOpen
        )
    }

    /// The opening bracket a closing bracket pairs with
    pub fn matching_open(&self) -> Option<Token> {
        match self {
            Token::BraceClose => Some(Token::BraceOpen),
            Token::ParenClose => Some(Token::ParenOpen),
            Token::BracketClose => Some(Token::BracketOpen),
            _ => None,
        }
    }

    /// Human-readable name for error messages
    pub fn describe(&self) -> String {
        match self {
            Token::Ident(s) => format!("identifier '{}'", s),
            Token::PrivateName(s) => format!("private name '{}'", s),
            Token::Str(s) => format!("string '{}'", s),
            Token::Number(n) => format!("number {}", n),
            Token::Template(_) => "template literal".to_string(),
            Token::Operator(op) => format!("'{}'", op),
            Token::Slash(SlashKind::Regex(re)) => format!("regular expression {}", re),
            Token::Slash(SlashKind::Divide) => "'/'".to_string(),
            Token::Slash(SlashKind::DivideAssign) => "'/='".to_string(),
            Token::BraceOpen => "'{'".to_string(),
            Token::BraceClose => "'}'".to_string(),
            Token::ParenOpen => "'('".to_string(),
            Token::ParenClose => "')'".to_string(),
            Token::BracketOpen => "'['".to_string(),
            Token::BracketClose => "']'".to_string(),
            Token::Comma => "','".to_string(),
            Token::Colon => "':'".to_string(),
            Token::Semicolon => "';'".to_string(),
            Token::Dot => "'.'".to_string(),
            Token::Spread => "'...'".to_string(),
            Token::Question => "'?'".to_string(),
            Token::Arrow => "'=>'".to_string(),
            Token::Plus => "'+'".to_string(),
            _ => format!("{:?}", self),
        }
    }
}

fn string_body(lex: &mut Lexer<Token>) -> String {
    let s = lex.slice();
    s[1..s.len() - 1].to_string()
}

fn lex_template(lex: &mut Lexer<Token>) -> Option<TemplateLit> {
    let (template, consumed) = scan_template(lex.remainder())?;
    lex.bump(consumed);
    Some(template)
}

fn lex_slash(lex: &mut Lexer<Token>) -> Option<SlashKind> {
    if !lex.extras.regex_allowed {
        return Some(if lex.slice() == "/=" {
            SlashKind::DivideAssign
        } else {
            SlashKind::Divide
        });
    }

    let source: &str = lex.source();
    let start = lex.span().start;
    let len = scan_regex(&source[start..])?;
    lex.bump(len.saturating_sub(lex.slice().len()));
    Some(SlashKind::Regex(source[start..start + len].to_string()))
}

/// Scan a template literal body; `rest` starts right after the opening backtick.
///
/// Returns the literal and the number of bytes consumed, closing backtick included.
fn scan_template(rest: &str) -> Option<(TemplateLit, usize)> {
    let bytes = rest.as_bytes();
    let mut quasis = Vec::new();
    let mut expressions = Vec::new();
    let mut start = 0;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'`' => {
                quasis.push(rest[start..i].to_string());
                return Some((
                    TemplateLit {
                        quasis,
                        expressions,
                    },
                    i + 1,
                ));
            }
            b'$' if bytes.get(i + 1) == Some(&b'{') => {
                quasis.push(rest[start..i].to_string());
                let body_start = i + 2;
                let body_len = scan_substitution(&rest[body_start..])?;
                expressions.push(rest[body_start..body_start + body_len].to_string());
                i = body_start + body_len + 1;
                start = i;
            }
            _ => i += 1,
        }
    }

    None
}

/// Length of a `${...}` body up to (not including) its closing brace
fn scan_substitution(src: &str) -> Option<usize> {
    let bytes = src.as_bytes();
    let mut depth = 0usize;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'{' => depth += 1,
            b'}' if depth == 0 => return Some(i),
            b'}' => depth -= 1,
            quote @ (b'\'' | b'"') => {
                i += 1;
                while i < bytes.len() && bytes[i] != quote {
                    if bytes[i] == b'\\' {
                        i += 1;
                    }
                    i += 1;
                }
            }
            b'`' => {
                let (_, consumed) = scan_template(&src[i + 1..])?;
                i += consumed;
            }
            _ => {}
        }
        i += 1;
    }

    None
}

/// Length of a regular expression literal; `src` starts at its opening slash
fn scan_regex(src: &str) -> Option<usize> {
    let bytes = src.as_bytes();
    let mut in_class = false;
    let mut i = 1;

    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 1,
            b'\n' | b'\r' => return None,
            b'[' => in_class = true,
            b']' => in_class = false,
            b'/' if !in_class => {
                i += 1;
                while i < bytes.len() && bytes[i].is_ascii_alphabetic() {
                    i += 1;
                }
                return Some(i);
            }
            _ => {}
        }
        i += 1;
    }

    None
}

/// Lex input string into tokens with spans
///
/// Unrecognized input (stray characters, unterminated literals) is skipped.
pub fn lex(input: &str) -> Vec<(Token, Span)> {
    let mut lexer = Token::lexer(input);
    let mut tokens: Vec<(Token, Span)> = Vec::new();
    // For each open `(`: whether it is the head of `if (...)` and the like
    let mut paren_heads: Vec<bool> = Vec::new();

    while let Some(result) = lexer.next() {
        match result {
            Ok(token) => {
                lexer.extras.regex_allowed = match &token {
                    Token::ParenOpen => {
                        let after_control = matches!(
                            tokens.last(),
                            Some((Token::Ident(word), _)) if CONTROL_KEYWORDS.contains(&word.as_str())
                        );
                        paren_heads.push(after_control);
                        true
                    }
                    Token::ParenClose => paren_heads.pop().unwrap_or(false),
                    other => other.allows_regex_after(),
                };
                tokens.push((token, lexer.span()));
            }
            Err(()) => {
                tracing::trace!(span = ?lexer.span(), "skipping unrecognized input");
            }
        }
    }

    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<Token> {
        lex(input).into_iter().map(|(t, _)| t).collect()
    }

    #[test]
    fn test_delimiters() {
        assert_eq!(
            kinds("{ } ( ) [ ] , : ; ..."),
            vec![
                Token::BraceOpen,
                Token::BraceClose,
                Token::ParenOpen,
                Token::ParenClose,
                Token::BracketOpen,
                Token::BracketClose,
                Token::Comma,
                Token::Colon,
                Token::Semicolon,
                Token::Spread,
            ]
        );
    }

    #[test]
    fn test_strings_keep_raw_body() {
        assert_eq!(
            kinds(r#"'{' "}" 'it\'s'"#),
            vec![
                Token::Str("{".to_string()),
                Token::Str("}".to_string()),
                Token::Str(r"it\'s".to_string()),
            ]
        );
    }

    #[test]
    fn test_plus_and_operators() {
        assert_eq!(
            kinds("a + b += c === d"),
            vec![
                Token::Ident("a".to_string()),
                Token::Plus,
                Token::Ident("b".to_string()),
                Token::Operator("+=".to_string()),
                Token::Ident("c".to_string()),
                Token::Operator("===".to_string()),
                Token::Ident("d".to_string()),
            ]
        );
    }

    #[test]
    fn test_arrow_is_not_an_operator() {
        assert_eq!(
            kinds("x => x"),
            vec![
                Token::Ident("x".to_string()),
                Token::Arrow,
                Token::Ident("x".to_string()),
            ]
        );
    }

    #[test]
    fn test_template_without_substitutions() {
        let tokens = kinds("`<div>{{ name }}</div>`");
        assert_eq!(
            tokens,
            vec![Token::Template(TemplateLit {
                quasis: vec!["<div>{{ name }}</div>".to_string()],
                expressions: vec![],
            })]
        );
    }

    #[test]
    fn test_template_with_nested_braces_in_substitution() {
        let tokens = kinds("`a${ {b: '}'} }c` + 1");
        assert_eq!(
            tokens,
            vec![
                Token::Template(TemplateLit {
                    quasis: vec!["a".to_string(), "c".to_string()],
                    expressions: vec![" {b: '}'} ".to_string()],
                }),
                Token::Plus,
                Token::Number("1".to_string()),
            ]
        );
    }

    #[test]
    fn test_template_span_covers_backticks() {
        let tokens = lex("x = `a${b}c`;");
        assert_eq!(tokens[2].1, 4..12);
    }

    #[test]
    fn test_division_after_identifier() {
        assert_eq!(
            kinds("a / b /= c"),
            vec![
                Token::Ident("a".to_string()),
                Token::Slash(SlashKind::Divide),
                Token::Ident("b".to_string()),
                Token::Slash(SlashKind::DivideAssign),
                Token::Ident("c".to_string()),
            ]
        );
    }

    #[test]
    fn test_regex_after_operator() {
        assert_eq!(
            kinds("x = /{['/]+/g;"),
            vec![
                Token::Ident("x".to_string()),
                Token::Operator("=".to_string()),
                Token::Slash(SlashKind::Regex("/{['/]+/g".to_string())),
                Token::Semicolon,
            ]
        );
    }

    #[test]
    fn test_regex_after_return() {
        let tokens = kinds("return /}/.test(s)");
        assert_eq!(tokens[1], Token::Slash(SlashKind::Regex("/}/".to_string())));
    }

    #[test]
    fn test_regex_after_control_head() {
        let tokens = kinds("if (a) /}/.test(b);");
        assert_eq!(tokens[4], Token::Slash(SlashKind::Regex("/}/".to_string())));
    }

    #[test]
    fn test_division_after_call() {
        let tokens = kinds("f(a) / 2; if (g(b) / 2) {}");
        assert_eq!(tokens[4], Token::Slash(SlashKind::Divide));
        assert_eq!(tokens[13], Token::Slash(SlashKind::Divide));
    }

    #[test]
    fn test_comments_skipped() {
        assert_eq!(
            kinds("a // { not a brace\n/* } */ b"),
            vec![Token::Ident("a".to_string()), Token::Ident("b".to_string())]
        );
    }

    #[test]
    fn test_numbers() {
        assert_eq!(
            kinds("42 3.14 .5 0xff 1e10"),
            vec![
                Token::Number("42".to_string()),
                Token::Number("3.14".to_string()),
                Token::Number(".5".to_string()),
                Token::Number("0xff".to_string()),
                Token::Number("1e10".to_string()),
            ]
        );
    }

    #[test]
    fn test_object_literal_context() {
        assert!(Token::ParenOpen.precedes_object_literal());
        assert!(Token::Comma.precedes_object_literal());
        assert!(Token::Operator("=".to_string()).precedes_object_literal());
        assert!(Token::Ident("return".to_string()).precedes_object_literal());
        assert!(!Token::ParenClose.precedes_object_literal());
        assert!(!Token::Arrow.precedes_object_literal());
        assert!(!Token::Ident("else".to_string()).precedes_object_literal());
        assert!(!Token::Ident("foo".to_string()).precedes_object_literal());
    }
}
