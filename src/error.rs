//! Error types for parsing and extraction

use std::path::PathBuf;

use ariadne::{Color, Label, Report, ReportKind, Source};
use thiserror::Error;

use crate::parser::lexer::Token;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Parse error at {span:?}: {message}")]
    Syntax {
        span: Span,
        message: String,
        expected: Vec<String>,
    },
}

impl ParseError {
    /// Format the error with source context using ariadne
    pub fn format(&self, source: &str, filename: &str) -> String {
        match self {
            ParseError::Syntax {
                span,
                message,
                expected,
            } => {
                let expected_str = if expected.is_empty() {
                    String::new()
                } else {
                    format!("\nExpected: {}", expected.join(", "))
                };
                render_report(
                    source,
                    filename,
                    span,
                    message,
                    &format!("{}{}", message, expected_str),
                )
            }
        }
    }
}

impl<'a> From<chumsky::error::Rich<'a, Token>> for ParseError {
    fn from(err: chumsky::error::Rich<'a, Token>) -> Self {
        use chumsky::error::RichReason;

        let message = match err.reason() {
            RichReason::ExpectedFound { found, .. } => {
                let found_str = match found {
                    Some(tok) => format_token(tok),
                    None => "end of input".to_string(),
                };
                format!("Unexpected {}", found_str)
            }
            RichReason::Custom(msg) => msg.to_string(),
        };

        // Format expected tokens nicely
        let expected: Vec<String> = err
            .expected()
            .filter_map(|e| match e {
                chumsky::error::RichPattern::Token(tok) => Some(format_token(tok)),
                chumsky::error::RichPattern::Label(label) => Some(label.to_string()),
                chumsky::error::RichPattern::EndOfInput => Some("end of input".to_string()),
                chumsky::error::RichPattern::Identifier(s) => Some(format!("identifier '{}'", s)),
                chumsky::error::RichPattern::Any => Some("any token".to_string()),
                chumsky::error::RichPattern::SomethingElse => None,
            })
            .collect();

        ParseError::Syntax {
            span: err.span().into_range(),
            message,
            expected,
        }
    }
}

/// Format a token for human-readable error messages
fn format_token(tok: &Token) -> String {
    tok.describe()
}

/// Errors that abort the transformation of one source file
///
/// Templates written before the error are left on disk.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The source could not be scanned for object literals
    #[error("parse errors: {}", format_parse_errors(.0))]
    Parse(Vec<ParseError>),

    /// A `template` value of a shape no rule covers
    #[error("don't know how to transform template of type {kind} yet")]
    UnknownShape { kind: String, span: Span },

    /// An element of a joined template array that is not a string literal
    #[error("cannot transform template (as array) with element of type {kind}")]
    UnsupportedArrayElement { kind: String, span: Span },

    /// The extracted template could not be written
    #[error("failed to write template {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl From<Vec<ParseError>> for ExtractError {
    fn from(errors: Vec<ParseError>) -> Self {
        ExtractError::Parse(errors)
    }
}

fn format_parse_errors(errors: &[ParseError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

impl ExtractError {
    /// Create an unknown shape error
    pub fn unknown_shape(kind: impl Into<String>, span: Span) -> Self {
        Self::UnknownShape {
            kind: kind.into(),
            span,
        }
    }

    /// Create an unsupported array element error
    pub fn unsupported_element(kind: impl Into<String>, span: Span) -> Self {
        Self::UnsupportedArrayElement {
            kind: kind.into(),
            span,
        }
    }

    /// Source location of the offending node, when there is one
    pub fn span(&self) -> Option<&Span> {
        match self {
            ExtractError::UnknownShape { span, .. }
            | ExtractError::UnsupportedArrayElement { span, .. } => Some(span),
            ExtractError::Parse(_) | ExtractError::Write { .. } => None,
        }
    }

    /// Format the error with source context using ariadne
    pub fn format(&self, source: &str, filename: &str) -> String {
        match self {
            ExtractError::Parse(errors) => errors
                .iter()
                .map(|e| e.format(source, filename))
                .collect::<Vec<_>>()
                .join("\n"),
            ExtractError::UnknownShape { span, .. }
            | ExtractError::UnsupportedArrayElement { span, .. } => render_report(
                source,
                filename,
                span,
                &self.to_string(),
                "this template needs to be migrated by hand",
            ),
            ExtractError::Write { .. } => format!("{}: {}", filename, self),
        }
    }
}

fn render_report(source: &str, filename: &str, span: &Span, message: &str, label: &str) -> String {
    let mut buf = Vec::new();
    let written = Report::build(ReportKind::Error, filename, span.start)
        .with_message(message)
        .with_label(
            Label::new((filename, span.clone()))
                .with_message(label)
                .with_color(Color::Red),
        )
        .finish()
        .write((filename, Source::from(source)), &mut buf);

    match written {
        Ok(()) => String::from_utf8_lossy(&buf).into_owned(),
        Err(_) => format!("{}: {}", filename, message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_shape_message() {
        let err = ExtractError::unknown_shape("numeric literal", 10..12);
        assert_eq!(
            err.to_string(),
            "don't know how to transform template of type numeric literal yet"
        );
        assert_eq!(err.span(), Some(&(10..12)));
    }

    #[test]
    fn test_format_includes_source_context() {
        let source = "f({ template: 42 });";
        let err = ExtractError::unknown_shape("numeric literal", 14..16);
        let report = err.format(source, "app.js");
        assert!(report.contains("numeric literal"));
        assert!(report.contains("app.js"));
        assert!(report.contains("migrated by hand"));
    }

    #[test]
    fn test_parse_errors_joined() {
        let err = ExtractError::from(vec![
            ParseError::Syntax {
                span: 0..1,
                message: "Unclosed '{'".to_string(),
                expected: vec![],
            },
            ParseError::Syntax {
                span: 4..5,
                message: "Unexpected ')'".to_string(),
                expected: vec![],
            },
        ]);
        let text = err.to_string();
        assert!(text.starts_with("parse errors: "));
        assert!(text.contains("Unclosed '{'"));
        assert!(text.contains("Unexpected ')'"));
    }
}
