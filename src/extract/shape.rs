//! Classification of `template` values and extraction of their markup

use std::fmt;

use crate::error::ExtractError;
use crate::parser::ast::{ArrayElement, Expr, Span, Spanned, StringLit, TemplateLit};

/// What a `template` value turned out to be
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateShape {
    /// A string that already names a file; left alone
    AlreadyPath(String),
    /// Markup in a string literal
    PlainLiteral(String),
    /// Markup in a template literal without substitutions
    TemplateLiteral(String),
    /// Markup in `[...].join(...)`, elements joined by newlines
    JoinedArray(String),
    /// A recognized shape that is deliberately not migrated
    Unsupported(String),
}

/// Source form of an extracted template
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    StringLiteral,
    TemplateLiteral,
    JoinedArray,
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ShapeKind::StringLiteral => "literal",
            ShapeKind::TemplateLiteral => "template string",
            ShapeKind::JoinedArray => "array",
        };
        write!(f, "{}", name)
    }
}

/// Glob syntax; a string using it is a pattern, not a path
const GLOB_CHARS: &[char] = &['*', '!', '?', '{', '}', '(', '|', ')', '[', ']'];

/// Characters never found in the paths this tool writes or recognizes
const INVALID_PATH_CHARS: &[char] = &[
    '\u{2018}', '\u{201C}', '!', '#', '$', '%', '&', '+', '^', '<', '=', '>', '`',
];

/// Whether a string already denotes a file path rather than markup
///
/// Anything with glob syntax, markup or entity characters, or a line break
/// is markup.
pub fn is_path_like(value: &str) -> bool {
    !value.is_empty()
        && !value.chars().any(|c| {
            c.is_control() || GLOB_CHARS.contains(&c) || INVALID_PATH_CHARS.contains(&c)
        })
}

/// Classify a `template` property value
///
/// Returns an error for shapes no rule covers; those need a human to look at them.
pub fn classify(value: &Spanned<Expr>) -> Result<TemplateShape, ExtractError> {
    match &value.node {
        Expr::Str(literal) => Ok(classify_string(literal)),
        Expr::Template(template) => Ok(classify_template(template)),
        Expr::Call { callee, .. } => classify_call(callee, &value.span),
        other => Err(ExtractError::unknown_shape(
            other.kind_name(),
            value.span.clone(),
        )),
    }
}

fn classify_string(literal: &StringLit) -> TemplateShape {
    match literal.value() {
        Ok(text) if is_path_like(&text) => TemplateShape::AlreadyPath(text),
        Ok(text) => non_empty(text, TemplateShape::PlainLiteral),
        Err(err) => TemplateShape::Unsupported(format!("string literal has a {}", err)),
    }
}

fn classify_template(template: &TemplateLit) -> TemplateShape {
    match template.cooked() {
        Some(Ok(text)) => non_empty(text, TemplateShape::TemplateLiteral),
        Some(Err(err)) => TemplateShape::Unsupported(format!("template string has a {}", err)),
        None => TemplateShape::Unsupported(format!(
            "template string with {} interpolated expression(s)",
            template.expressions.len()
        )),
    }
}

/// Only `[...].join(...)` is a template; any other call is left for a human.
fn classify_call(callee: &Spanned<Expr>, span: &Span) -> Result<TemplateShape, ExtractError> {
    let Expr::Member { object, property } = &callee.node else {
        return Err(ExtractError::unknown_shape("call expression", span.clone()));
    };
    let Expr::Array(elements) = &object.node else {
        return Err(ExtractError::unknown_shape(
            format!("call expression on {}", object.node.kind_name()),
            span.clone(),
        ));
    };
    if property.node.as_str() != "join" {
        return Err(ExtractError::unknown_shape(
            format!("call to `.{}()` on an array literal", property.node),
            span.clone(),
        ));
    }

    let content = join_elements(elements, &object.span)?;
    Ok(non_empty(content, TemplateShape::JoinedArray))
}

/// Join array elements with newlines
///
/// A `'a' + 'b' + ...` element of string literals only yields one fragment per
/// literal. A `+` element with any other operand is skipped with a warning;
/// any other element is an error.
fn join_elements(elements: &[ArrayElement], array_span: &Span) -> Result<String, ExtractError> {
    let mut fragments = Vec::with_capacity(elements.len());

    for element in elements {
        match element {
            ArrayElement::Expr(expr) => match &expr.node {
                Expr::Str(literal) => fragments.push(element_text(literal, &expr.span)?),
                Expr::Add { .. } => {
                    let mut operands = Vec::new();
                    collect_operands(expr, &mut operands);
                    match operands.iter().find(|op| !matches!(op.node, Expr::Str(_))) {
                        Some(other) => tracing::warn!(
                            "Skipping array element at {:?}: concatenation with {}",
                            expr.span,
                            other.node.kind_name()
                        ),
                        None => {
                            for operand in operands {
                                if let Expr::Str(literal) = &operand.node {
                                    fragments.push(element_text(literal, &operand.span)?);
                                }
                            }
                        }
                    }
                }
                other => {
                    return Err(ExtractError::unsupported_element(
                        other.kind_name(),
                        expr.span.clone(),
                    ))
                }
            },
            ArrayElement::Spread(expr) => {
                return Err(ExtractError::unsupported_element(
                    "spread element",
                    expr.span.clone(),
                ))
            }
            ArrayElement::Hole => {
                return Err(ExtractError::unsupported_element(
                    "array hole",
                    array_span.clone(),
                ))
            }
        }
    }

    Ok(fragments.join("\n"))
}

/// Operands of a `+` chain, left to right
fn collect_operands<'a>(expr: &'a Spanned<Expr>, operands: &mut Vec<&'a Spanned<Expr>>) {
    match &expr.node {
        Expr::Add { left, right } => {
            collect_operands(left, operands);
            collect_operands(right, operands);
        }
        _ => operands.push(expr),
    }
}

fn element_text(literal: &StringLit, span: &Span) -> Result<String, ExtractError> {
    literal.value().map_err(|err| {
        ExtractError::unsupported_element(format!("string literal with a {}", err), span.clone())
    })
}

fn non_empty(text: String, shape: fn(String) -> TemplateShape) -> TemplateShape {
    if text.is_empty() {
        TemplateShape::Unsupported("template is empty".to_string())
    } else {
        shape(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_object_literals;

    fn classify_source(input: &str) -> Result<TemplateShape, ExtractError> {
        let objects = parse_object_literals(input).expect("Should parse");
        let (_, value) = objects[0]
            .node
            .find_key_value("template")
            .expect("Should have a template property");
        classify(value)
    }

    #[test]
    fn test_path_like() {
        assert!(is_path_like("app/views/home.html"));
        assert!(is_path_like(r"C:\app\home.html"));
        assert!(is_path_like("home"));
        assert!(!is_path_like("<div></div>"));
        assert!(is_path_like("views/home-page_2.tpl.html"));
        assert!(!is_path_like("line\nbreak"));
        assert!(!is_path_like(""));
    }

    #[test]
    fn test_markup_without_tags_is_not_path_like() {
        assert!(!is_path_like("{{ $ctrl.title }}"));
        assert!(!is_path_like("Hello & welcome"));
        assert!(!is_path_like("Total (incl. tax)"));
        assert!(!is_path_like("items[0]"));
        assert!(!is_path_like("Done!"));
        assert!(!is_path_like("50% off"));
        assert!(!is_path_like("\u{201C}quoted\u{201D}"));
    }

    #[test]
    fn test_interpolation_only_string_is_extracted() {
        let shape = classify_source("x = { template: '{{ $ctrl.title }}' };").unwrap();
        assert_eq!(
            shape,
            TemplateShape::PlainLiteral("{{ $ctrl.title }}".to_string())
        );
    }

    #[test]
    fn test_string_literal_markup() {
        let shape = classify_source(r#"x = { template: '<p class="a">it\'s</p>' };"#).unwrap();
        assert_eq!(
            shape,
            TemplateShape::PlainLiteral(r#"<p class="a">it's</p>"#.to_string())
        );
    }

    #[test]
    fn test_string_literal_already_path() {
        let shape = classify_source("x = { template: 'views/home.html' };").unwrap();
        assert_eq!(shape, TemplateShape::AlreadyPath("views/home.html".to_string()));
    }

    #[test]
    fn test_empty_string_unsupported() {
        let shape = classify_source("x = { template: '' };").unwrap();
        assert!(matches!(shape, TemplateShape::Unsupported(_)));
    }

    #[test]
    fn test_template_literal_cooked() {
        let shape = classify_source("x = { template: `<p>\\`hi\\`</p>\n<br>` };").unwrap();
        assert_eq!(
            shape,
            TemplateShape::TemplateLiteral("<p>`hi`</p>\n<br>".to_string())
        );
    }

    #[test]
    fn test_interpolated_template_unsupported() {
        let shape = classify_source("x = { template: `<p>${a}</p>${b}` };").unwrap();
        assert_eq!(
            shape,
            TemplateShape::Unsupported(
                "template string with 2 interpolated expression(s)".to_string()
            )
        );
    }

    #[test]
    fn test_joined_array() {
        let shape = classify_source("x = { template: ['<a>', '<b>'].join('') };").unwrap();
        assert_eq!(shape, TemplateShape::JoinedArray("<a>\n<b>".to_string()));
    }

    #[test]
    fn test_joined_array_with_concatenation() {
        let shape =
            classify_source("x = { template: ['<a>' + '</a>', '<b>'].join('\\n') };").unwrap();
        assert_eq!(
            shape,
            TemplateShape::JoinedArray("<a>\n</a>\n<b>".to_string())
        );
    }

    #[test]
    fn test_joined_array_with_chained_concatenation() {
        let shape = classify_source(
            "x = { template: ['<div>' + '<span>' + '</span>', '</div>'].join('') };",
        )
        .unwrap();
        assert_eq!(
            shape,
            TemplateShape::JoinedArray("<div>\n<span>\n</span>\n</div>".to_string())
        );
    }

    #[test]
    fn test_joined_array_skips_other_concatenation() {
        let shape =
            classify_source("x = { template: ['<a>', '<b>' + name, '<c>'].join('') };").unwrap();
        assert_eq!(shape, TemplateShape::JoinedArray("<a>\n<c>".to_string()));
    }

    #[test]
    fn test_joined_array_identifier_element_is_fatal() {
        let input = "x = { template: ['<a>', name].join('') };";
        let err = classify_source(input).unwrap_err();
        match err {
            ExtractError::UnsupportedArrayElement { kind, span } => {
                assert_eq!(kind, "identifier");
                assert_eq!(&input[span], "name");
            }
            other => panic!("Expected unsupported element, got {:?}", other),
        }
    }

    #[test]
    fn test_joined_array_template_element_is_fatal() {
        let err = classify_source("x = { template: [`<a>`].join('') };").unwrap_err();
        assert!(matches!(
            err,
            ExtractError::UnsupportedArrayElement { ref kind, .. } if kind == "template literal"
        ));
    }

    #[test]
    fn test_call_on_non_array_is_fatal() {
        let err = classify_source("x = { template: build('<a>') };").unwrap_err();
        assert!(matches!(err, ExtractError::UnknownShape { .. }));
    }

    #[test]
    fn test_other_array_method_is_fatal() {
        let err = classify_source("x = { template: ['<a>'].concat('') };").unwrap_err();
        assert!(err.to_string().contains("concat"));
    }

    #[test]
    fn test_numeric_literal_is_fatal() {
        let input = "x = { template: 42 };";
        let err = classify_source(input).unwrap_err();
        match err {
            ExtractError::UnknownShape { kind, span } => {
                assert_eq!(kind, "numeric literal");
                assert_eq!(&input[span], "42");
            }
            other => panic!("Expected unknown shape, got {:?}", other),
        }
    }

    #[test]
    fn test_top_level_concatenation_is_fatal() {
        let err = classify_source("x = { template: '<a>' + '</a>' };").unwrap_err();
        assert!(matches!(
            err,
            ExtractError::UnknownShape { ref kind, .. } if kind == "binary expression"
        ));
    }
}
