//! Template Extractor - moves inline markup out of JavaScript object literals
//!
//! Object literals with a `template` property holding markup get that markup
//! written to a file next to the source, and the property rewritten to point at it.
//!
//! # Example
//!
//! ```rust
//! use std::path::Path;
//! use template_extractor::{extract_templates, ExtractConfig, OccurrenceCounter};
//!
//! let source = "app.component('hello', { template: '<p>Hello</p>' });";
//! let mut counter = OccurrenceCounter::new();
//! let extraction = extract_templates(
//!     source,
//!     Path::new("src/hello.js"),
//!     &mut counter,
//!     &ExtractConfig::default(),
//! )
//! .unwrap();
//!
//! assert_eq!(
//!     extraction.source,
//!     "app.component('hello', { templateUrl: 'src/hello.html' });"
//! );
//! assert_eq!(extraction.templates[0].contents, "<p>Hello</p>");
//! ```

pub mod config;
pub mod error;
pub mod extract;
pub mod parser;

pub use config::{ConfigError, ExtractConfig, QuoteStyle};
pub use error::{ExtractError, ParseError};
pub use extract::{
    FsSink, MemorySink, OccurrenceCounter, RewriteAction, ShapeKind, TemplateShape, TemplateSink,
};
pub use parser::{parse_object_literals, ObjectLit, Span, Spanned};

use std::path::{Path, PathBuf};

use extract::{classify, reference_path, rewrite_object, template_path, SourceEdits};
use parser::Property;

/// A template moved out of the source
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedTemplate {
    /// Where the markup was written
    pub path: PathBuf,
    /// Path written into the source, before quoting
    pub reference: String,
    pub contents: String,
    pub kind: ShapeKind,
    pub action: RewriteAction,
    /// Span of the replaced value in the original source
    pub span: Span,
}

/// A `template` property left as it was
#[derive(Debug, Clone, PartialEq)]
pub struct Skipped {
    pub span: Span,
    pub reason: String,
}

/// Result of transforming one source file
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    /// The rewritten source; identical to the input when nothing was extracted
    pub source: String,
    pub templates: Vec<ExtractedTemplate>,
    pub skipped: Vec<Skipped>,
}

impl Extraction {
    pub fn is_changed(&self) -> bool {
        !self.templates.is_empty()
    }
}

/// Extract templates from `source`, keeping them in memory
///
/// The markup of each template is available in [`Extraction::templates`].
pub fn extract_templates(
    source: &str,
    path: &Path,
    counter: &mut OccurrenceCounter,
    config: &ExtractConfig,
) -> Result<Extraction, ExtractError> {
    let mut sink = MemorySink::new();
    extract_templates_with_sink(source, path, counter, config, &mut sink)
}

/// Extract templates from `source`, handing each one to `sink` as it is found
///
/// On error the source is not rewritten, but templates already handed to the
/// sink stay there.
pub fn extract_templates_with_sink<S: TemplateSink + ?Sized>(
    source: &str,
    path: &Path,
    counter: &mut OccurrenceCounter,
    config: &ExtractConfig,
    sink: &mut S,
) -> Result<Extraction, ExtractError> {
    let objects = parse_object_literals(source)?;

    let mut edits = SourceEdits::new();
    let mut templates = Vec::new();
    let mut skipped = Vec::new();

    for object in &objects {
        let Some((_, property)) = object.node.find_property(&config.template_key) else {
            continue;
        };
        if edits.touches(&object.span) {
            tracing::debug!(
                "Object at {:?} lies inside an already rewritten region",
                object.span
            );
            continue;
        }

        let (key, value) = match &property.node {
            Property::KeyValue { key, value } => (key, value),
            Property::Shorthand(name) => {
                return Err(ExtractError::unknown_shape(
                    "identifier",
                    name.span.clone(),
                ))
            }
            Property::Spread(_) | Property::Other => continue,
        };

        let (kind, contents) = match classify(value)? {
            TemplateShape::AlreadyPath(existing) => {
                tracing::info!(
                    "{}: template is already a path ({}), skipping",
                    path.display(),
                    existing
                );
                skipped.push(Skipped {
                    span: value.span.clone(),
                    reason: format!("template is already a path: {}", existing),
                });
                continue;
            }
            TemplateShape::Unsupported(reason) => {
                tracing::warn!(
                    "{}: skipping template at {:?}: {}",
                    path.display(),
                    value.span,
                    reason
                );
                skipped.push(Skipped {
                    span: value.span.clone(),
                    reason,
                });
                continue;
            }
            TemplateShape::PlainLiteral(text) => (ShapeKind::StringLiteral, text),
            TemplateShape::TemplateLiteral(text) => (ShapeKind::TemplateLiteral, text),
            TemplateShape::JoinedArray(text) => (ShapeKind::JoinedArray, text),
        };

        let index = counter.next_index(path);
        let output = template_path(path, index, &config.extension);
        sink.write_template(&output, &contents)
            .map_err(|source| ExtractError::Write {
                path: output.clone(),
                source,
            })?;
        counter.record(path);

        let reference = reference_path(&output, config.template_base.as_deref());
        let action = rewrite_object(
            object,
            key,
            value,
            &config.quote.quote(&reference),
            config,
            &mut edits,
        );
        tracing::info!(
            "{}: transformed {} template into {}",
            path.display(),
            kind,
            output.display()
        );

        templates.push(ExtractedTemplate {
            path: output,
            reference,
            contents,
            kind,
            action,
            span: value.span.clone(),
        });
    }

    let source = if edits.is_empty() {
        source.to_string()
    } else {
        edits.apply(source)
    };

    Ok(Extraction {
        source,
        templates,
        skipped,
    })
}
