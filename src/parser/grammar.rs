//! Object-literal parser implementation using chumsky
//!
//! The file is lexed once, brackets are matched, and every `{` in expression
//! position is parsed as an object literal on its own token slice. Expressions
//! the extractor never inspects are consumed as balanced token runs.

use chumsky::input::{Stream, ValueInput};
use chumsky::prelude::*;

use crate::error::ParseError;
use crate::parser::ast::*;
use crate::parser::lexer::{lex, SlashKind, Token};

/// Helper enum for folding postfix operations onto a primary expression
#[derive(Debug, Clone)]
enum Postfix {
    Member(Spanned<Identifier>),
    Call {
        arguments: Vec<Spanned<Expr>>,
        end: usize,
    },
    Index {
        index: Spanned<Expr>,
        end: usize,
    },
}

/// Map bare identifiers that are really literals
fn keyword_or_identifier(name: String) -> Expr {
    match name.as_str() {
        "true" => Expr::Bool(true),
        "false" => Expr::Bool(false),
        "null" => Expr::Null,
        _ => Expr::Ident(Identifier::new(name)),
    }
}

/// Name the kind of an unmodelled expression from its top-level tokens
fn classify_opaque(tokens: &[Option<Token>]) -> OpaqueKind {
    let leaves: Vec<&Token> = tokens.iter().flatten().collect();
    if leaves.iter().any(|t| matches!(t, Token::Arrow)) {
        return OpaqueKind::ArrowFunction;
    }

    match tokens.first() {
        Some(Some(Token::Ident(word))) if word == "function" || word == "async" => {
            OpaqueKind::Function
        }
        Some(Some(Token::Ident(word))) if word == "class" => OpaqueKind::Class,
        Some(Some(Token::Ident(word))) if word == "new" => OpaqueKind::New,
        _ if leaves.iter().any(|t| matches!(t, Token::Question)) => OpaqueKind::Conditional,
        Some(Some(Token::Operator(_) | Token::Plus)) => OpaqueKind::Unary,
        Some(Some(Token::Ident(word)))
            if matches!(word.as_str(), "typeof" | "void" | "delete" | "await") =>
        {
            OpaqueKind::Unary
        }
        _ => OpaqueKind::Other,
    }
}

/// Parse every object literal in a JavaScript source, in document order
///
/// Outer literals come before the literals nested inside them. A `{` that
/// does not parse as an object literal is taken to be a block and skipped.
pub fn parse_object_literals(input: &str) -> Result<Vec<Spanned<ObjectLit>>, Vec<ParseError>> {
    let tokens = lex(input);
    let closers = match_brackets(&tokens).map_err(|e| vec![e])?;

    let mut objects = Vec::new();
    for (index, (token, span)) in tokens.iter().enumerate() {
        if *token != Token::BraceOpen {
            continue;
        }
        let previous = index.checked_sub(1).map(|i| &tokens[i].0);
        if !previous.is_some_and(Token::precedes_object_literal) {
            continue;
        }
        let Some(close) = closers[index] else {
            continue;
        };

        match parse_object(&tokens[index..=close]) {
            Ok(object) => objects.push(object),
            Err(errors) => {
                for error in errors {
                    tracing::debug!("brace at {:?} is not an object literal: {}", span, error);
                }
            }
        }
    }

    Ok(objects)
}

/// Pair every opening bracket with its closing bracket
fn match_brackets(tokens: &[(Token, Span)]) -> Result<Vec<Option<usize>>, ParseError> {
    let mut closers = vec![None; tokens.len()];
    let mut stack: Vec<usize> = Vec::new();

    for (index, (token, span)) in tokens.iter().enumerate() {
        if token.is_open_bracket() {
            stack.push(index);
            continue;
        }
        let Some(open) = token.matching_open() else {
            continue;
        };
        match stack.pop() {
            Some(start) if tokens[start].0 == open => closers[start] = Some(index),
            Some(start) => {
                return Err(ParseError::Syntax {
                    span: span.clone(),
                    message: format!(
                        "Unexpected {} closing {}",
                        token.describe(),
                        tokens[start].0.describe()
                    ),
                    expected: vec![],
                })
            }
            None => {
                return Err(ParseError::Syntax {
                    span: span.clone(),
                    message: format!("Unexpected {}", token.describe()),
                    expected: vec![],
                })
            }
        }
    }

    if let Some(&start) = stack.last() {
        let (token, span) = &tokens[start];
        return Err(ParseError::Syntax {
            span: span.clone(),
            message: format!("Unclosed {}", token.describe()),
            expected: vec![],
        });
    }

    Ok(closers)
}

/// Parse one balanced `{ ... }` token slice as an object literal
fn parse_object(tokens: &[(Token, Span)]) -> Result<Spanned<ObjectLit>, Vec<ParseError>> {
    let eoi = tokens.last().map(|(_, span)| span.end).unwrap_or(0);

    let token_iter = tokens
        .iter()
        .cloned()
        .map(|(tok, span)| (tok, span.into()));

    let token_stream = Stream::from_iter(token_iter)
        // Split (Token, SimpleSpan) into token and span parts
        .map((eoi..eoi).into(), |(t, s): (_, _)| (t, s));

    let value = value_parser()
        .then_ignore(end())
        .parse(token_stream)
        .into_result()
        .map_err(|errs| errs.into_iter().map(ParseError::from).collect::<Vec<_>>())?;

    match value.node {
        Expr::Object(object) => Ok(Spanned::new(object, value.span)),
        other => Err(vec![ParseError::Syntax {
            span: value.span,
            message: format!("Expected an object literal, found {}", other.kind_name()),
            expected: vec![],
        }]),
    }
}

/// Helper to extract span range from chumsky's MapExtra
fn span_range(e: &impl chumsky::span::Span<Offset = usize>) -> std::ops::Range<usize> {
    e.start()..e.end()
}

/// A balanced token tree: one leaf token, or a bracketed group
///
/// Leaves yield their token so callers can inspect the top level; groups yield `None`.
/// Commas and closing brackets only appear inside groups.
fn token_tree<'a, I>() -> impl Parser<'a, I, Option<Token>, extra::Err<Rich<'a, Token>>> + Clone
where
    I: ValueInput<'a, Token = Token, Span = SimpleSpan>,
{
    recursive(|tree| {
        let inner = choice((tree, just(Token::Comma).to(None)))
            .repeated()
            .collect::<Vec<_>>();

        choice((
            inner
                .clone()
                .delimited_by(just(Token::BraceOpen), just(Token::BraceClose))
                .to(None),
            inner
                .clone()
                .delimited_by(just(Token::ParenOpen), just(Token::ParenClose))
                .to(None),
            inner
                .delimited_by(just(Token::BracketOpen), just(Token::BracketClose))
                .to(None),
            none_of([
                Token::Comma,
                Token::BraceOpen,
                Token::BraceClose,
                Token::ParenOpen,
                Token::ParenClose,
                Token::BracketOpen,
                Token::BracketClose,
            ])
            .map(Some),
        ))
        .boxed()
    })
}

/// Parser for a single value: an expression up to the next `,` or closing bracket
fn value_parser<'a, I>() -> impl Parser<'a, I, Spanned<Expr>, extra::Err<Rich<'a, Token>>> + Clone
where
    I: ValueInput<'a, Token = Token, Span = SimpleSpan>,
{
    recursive(|value| {
        // A modelled expression only counts if nothing follows it
        let terminator = choice((
            one_of([
                Token::Comma,
                Token::BraceClose,
                Token::ParenClose,
                Token::BracketClose,
            ])
            .ignored(),
            end(),
        ));

        let identifier = select! {
            Token::Ident(name) => Identifier::new(name),
        }
        .map_with(|id, e| Spanned::new(id, span_range(&e.span())));

        let literal = select! {
            Token::Str(raw) => Expr::Str(StringLit::new(raw)),
            Token::Template(template) => Expr::Template(template),
            Token::Number(n) => Expr::Number(n),
            Token::Slash(SlashKind::Regex(re)) => Expr::Regex(re),
            Token::Ident(name) => keyword_or_identifier(name),
        };

        // Array literal: `[a, , ...b]`
        let array_element = choice((
            just(Token::Spread)
                .ignore_then(value.clone())
                .map(ArrayElement::Spread),
            value.clone().map(ArrayElement::Expr),
        ));

        let array = array_element
            .or_not()
            .separated_by(just(Token::Comma))
            .collect::<Vec<_>>()
            .delimited_by(just(Token::BracketOpen), just(Token::BracketClose))
            .map(|mut elements: Vec<Option<ArrayElement>>| {
                // `[a,]` has one element, not a trailing hole
                if matches!(elements.last(), Some(None)) {
                    elements.pop();
                }
                Expr::Array(
                    elements
                        .into_iter()
                        .map(|el| el.unwrap_or(ArrayElement::Hole))
                        .collect(),
                )
            });

        // Object literal: `{ key: value, name, ...rest, method() {} }`
        let key = choice((
            select! {
                Token::Ident(name) => PropKey::Ident(Identifier::new(name)),
                Token::Str(raw) => PropKey::Str(raw),
                Token::Number(n) => PropKey::Number(n),
            },
            value
                .clone()
                .delimited_by(just(Token::BracketOpen), just(Token::BracketClose))
                .map(|computed| PropKey::Computed(Box::new(computed))),
        ))
        .map_with(|key, e| Spanned::new(key, span_range(&e.span())));

        let property = choice((
            key.then_ignore(just(Token::Colon))
                .then(value.clone())
                .map(|(key, value)| Property::KeyValue { key, value }),
            just(Token::Spread)
                .ignore_then(value.clone())
                .map(Property::Spread),
            identifier
                .clone()
                .then_ignore(one_of([Token::Comma, Token::BraceClose]).rewind())
                .map(Property::Shorthand),
            token_tree()
                .repeated()
                .at_least(1)
                .collect::<Vec<_>>()
                .to(Property::Other),
        ))
        .map_with(|prop, e| Spanned::new(prop, span_range(&e.span())));

        let object = property
            .separated_by(just(Token::Comma))
            .allow_trailing()
            .collect::<Vec<_>>()
            .delimited_by(just(Token::BraceOpen), just(Token::BraceClose))
            .map(|properties| Expr::Object(ObjectLit { properties }));

        let atom = choice((literal, array, object))
            .map_with(|expr, e| Spanned::new(expr, span_range(&e.span())));

        // Parentheses only group; the inner node keeps its own span
        let parenthesized = value
            .clone()
            .delimited_by(just(Token::ParenOpen), just(Token::ParenClose));

        let primary = choice((atom, parenthesized));

        // Member access, calls and indexing: `[...].join('')`
        let postfix_op = choice((
            just(Token::Dot)
                .ignore_then(identifier)
                .map(Postfix::Member),
            value
                .clone()
                .separated_by(just(Token::Comma))
                .allow_trailing()
                .collect::<Vec<_>>()
                .delimited_by(just(Token::ParenOpen), just(Token::ParenClose))
                .map_with(|arguments, e| Postfix::Call {
                    arguments,
                    end: span_range(&e.span()).end,
                }),
            value
                .clone()
                .delimited_by(just(Token::BracketOpen), just(Token::BracketClose))
                .map_with(|index, e| Postfix::Index {
                    index,
                    end: span_range(&e.span()).end,
                }),
        ));

        let postfix = primary.foldl(postfix_op.repeated(), |target: Spanned<Expr>, op| {
            let start = target.span.start;
            match op {
                Postfix::Member(property) => {
                    let end = property.span.end;
                    Spanned::new(
                        Expr::Member {
                            object: Box::new(target),
                            property,
                        },
                        start..end,
                    )
                }
                Postfix::Call { arguments, end } => Spanned::new(
                    Expr::Call {
                        callee: Box::new(target),
                        arguments,
                    },
                    start..end,
                ),
                Postfix::Index { index, end } => Spanned::new(
                    Expr::Index {
                        object: Box::new(target),
                        index: Box::new(index),
                    },
                    start..end,
                ),
            }
        });

        // String concatenation: `'<a>' + '</a>'`
        let sum = postfix.clone().foldl(
            just(Token::Plus).ignore_then(postfix).repeated(),
            |left: Spanned<Expr>, right: Spanned<Expr>| {
                let span = left.span.start..right.span.end;
                Spanned::new(
                    Expr::Add {
                        left: Box::new(left),
                        right: Box::new(right),
                    },
                    span,
                )
            },
        );

        let structured = sum.then_ignore(terminator.rewind());

        // Anything else: functions, ternaries, `new`, other operators...
        let opaque = token_tree()
            .repeated()
            .at_least(1)
            .collect::<Vec<_>>()
            .map_with(|tokens, e| {
                Spanned::new(
                    Expr::Opaque(classify_opaque(&tokens)),
                    span_range(&e.span()),
                )
            });

        choice((structured, opaque)).boxed()
    })
}
