//! Text-splice rewriting of object literals
//!
//! Edits are recorded against byte spans of the original source and applied
//! in one pass, so every byte outside an edited span is kept as written.

use crate::config::ExtractConfig;
use crate::parser::ast::{Expr, ObjectLit, PropKey, Property, Span, Spanned};

/// Replacement of one span of the source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    pub span: Span,
    pub replacement: String,
}

/// Pending edits against one source text
#[derive(Debug, Clone, Default)]
pub struct SourceEdits {
    edits: Vec<TextEdit>,
}

impl SourceEdits {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the text at `span`
    pub fn replace(&mut self, span: Span, replacement: impl Into<String>) {
        self.edits.push(TextEdit {
            span,
            replacement: replacement.into(),
        });
    }

    /// Delete the text at `span`
    pub fn remove(&mut self, span: Span) {
        self.replace(span, String::new());
    }

    /// Whether any recorded edit overlaps `span`
    pub fn touches(&self, span: &Span) -> bool {
        self.edits
            .iter()
            .any(|edit| edit.span.start < span.end && span.start < edit.span.end)
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    pub fn len(&self) -> usize {
        self.edits.len()
    }

    /// Splice all edits into `source`
    ///
    /// An edit overlapping an earlier one is dropped with a warning.
    pub fn apply(mut self, source: &str) -> String {
        self.edits.sort_by_key(|edit| (edit.span.start, edit.span.end));

        let mut out = String::with_capacity(source.len());
        let mut cursor = 0;
        for edit in self.edits {
            if edit.span.start < cursor || edit.span.end > source.len() {
                tracing::warn!("Dropping overlapping edit at {:?}", edit.span);
                continue;
            }
            out.push_str(&source[cursor..edit.span.start]);
            out.push_str(&edit.replacement);
            cursor = edit.span.end;
        }
        out.push_str(&source[cursor..]);
        out
    }
}

/// How the object literal was changed besides replacing the template value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RewriteAction {
    /// `template` became `templateUrl`
    RenamedKey,
    /// The `plain` flag was removed and the key kept
    RemovedFlag,
}

/// Record the edits that turn an extracted `template` property into a reference
///
/// `reference` is the quoted path that replaces the value.
pub fn rewrite_object(
    object: &Spanned<ObjectLit>,
    key: &Spanned<PropKey>,
    value: &Spanned<Expr>,
    reference: &str,
    config: &ExtractConfig,
    edits: &mut SourceEdits,
) -> RewriteAction {
    edits.replace(value.span.clone(), reference);

    match object.node.find_property(&config.flag_key) {
        Some((index, flag)) if flag_is_set(&flag.node) => {
            edits.remove(removal_span(&object.node.properties, index));
            RewriteAction::RemovedFlag
        }
        _ => {
            edits.replace(key.span.clone(), config.reference_key.as_str());
            RewriteAction::RenamedKey
        }
    }
}

/// `plain: false` switches the flag off; any other value or a shorthand counts as set
fn flag_is_set(flag: &Property) -> bool {
    !matches!(
        flag,
        Property::KeyValue {
            value: Spanned {
                node: Expr::Bool(false),
                ..
            },
            ..
        }
    )
}

/// Span covering a property together with one separating comma
///
/// Runs up to the start of the next property when there is one, otherwise
/// back to the end of the previous property. A trailing comma is kept.
fn removal_span(properties: &[Spanned<Property>], index: usize) -> Span {
    let span = &properties[index].span;
    if let Some(next) = properties.get(index + 1) {
        span.start..next.span.start
    } else if let Some(previous) = index.checked_sub(1).map(|i| &properties[i]) {
        previous.span.end..span.end
    } else {
        span.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_object_literals;

    fn rewrite(input: &str, reference: &str) -> (String, RewriteAction) {
        let config = ExtractConfig::default();
        let objects = parse_object_literals(input).expect("Should parse");
        let object = &objects[0];
        let (key, value) = object
            .node
            .find_key_value("template")
            .expect("Should have a template property");
        let mut edits = SourceEdits::new();
        let action = rewrite_object(object, key, value, reference, &config, &mut edits);
        (edits.apply(input), action)
    }

    #[test]
    fn test_apply_keeps_untouched_text() {
        let mut edits = SourceEdits::new();
        edits.replace(4..7, "XYZ");
        edits.remove(0..1);
        assert_eq!(edits.len(), 2);
        assert_eq!(edits.apply("abcdefgh"), "bcdXYZh");
    }

    #[test]
    fn test_apply_drops_overlap() {
        let mut edits = SourceEdits::new();
        edits.replace(2..5, "X");
        edits.replace(3..6, "Y");
        assert_eq!(edits.apply("abcdefgh"), "abXfgh");
    }

    #[test]
    fn test_touches() {
        let mut edits = SourceEdits::new();
        assert!(edits.is_empty());
        edits.replace(10..20, "");
        assert!(edits.touches(&(15..30)));
        assert!(edits.touches(&(0..11)));
        assert!(!edits.touches(&(20..25)));
        assert!(!edits.touches(&(0..10)));
    }

    #[test]
    fn test_rename_key() {
        let (out, action) = rewrite("x = { a: 1, template: '<p></p>' };", "'x.html'");
        assert_eq!(out, "x = { a: 1, templateUrl: 'x.html' };");
        assert_eq!(action, RewriteAction::RenamedKey);
    }

    #[test]
    fn test_remove_trailing_flag() {
        let (out, action) =
            rewrite("x = { template: '<p></p>', plain: true };", "'x.html'");
        assert_eq!(out, "x = { template: 'x.html' };");
        assert_eq!(action, RewriteAction::RemovedFlag);
    }

    #[test]
    fn test_false_flag_kept_and_key_renamed() {
        let (out, action) =
            rewrite("x = { template: '<p></p>', plain: false };", "'x.html'");
        assert_eq!(out, "x = { templateUrl: 'x.html', plain: false };");
        assert_eq!(action, RewriteAction::RenamedKey);
    }

    #[test]
    fn test_remove_leading_flag() {
        let (out, _) = rewrite("x = {\n  plain: true,\n  template: '<p></p>'\n};", "'x.html'");
        assert_eq!(out, "x = {\n  template: 'x.html'\n};");
    }

    #[test]
    fn test_remove_shorthand_flag_keeps_trailing_comma() {
        let (out, _) = rewrite("x = { template: '<p></p>', plain, };", "'x.html'");
        assert_eq!(out, "x = { template: 'x.html', };");
    }

    #[test]
    fn test_multiline_value_replaced_whole() {
        let input = "x = {\n  template: [\n    '<a>',\n    '<b>'\n  ].join('')\n};";
        let (out, _) = rewrite(input, "'x.html'");
        assert_eq!(out, "x = {\n  templateUrl: 'x.html'\n};");
    }
}
