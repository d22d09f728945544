//! Template extraction: classifying values, naming files, rewriting objects

pub mod naming;
pub mod rewrite;
pub mod shape;
pub mod sink;

pub use naming::{reference_path, template_path, OccurrenceCounter};
pub use rewrite::{rewrite_object, RewriteAction, SourceEdits, TextEdit};
pub use shape::{classify, is_path_like, ShapeKind, TemplateShape};
pub use sink::{FsSink, MemorySink, TemplateSink};
