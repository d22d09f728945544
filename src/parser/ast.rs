//! Syntax tree for the parts of JavaScript the extractor inspects
//!
//! Only object literals and the expression shapes a `template` value can take
//! are modelled. Everything else is an [`Expr::Opaque`] node that keeps its
//! span so it can be reported, but is never rewritten.

use std::fmt;

use super::unescape::{cook_template, decode_string, EscapeError};

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

/// AST node with source location
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned<T> {
    pub node: T,
    pub span: Span,
}

impl<T> Spanned<T> {
    pub fn new(node: T, span: Span) -> Self {
        Self { node, span }
    }
}

/// JavaScript identifier name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identifier(pub String);

impl Identifier {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An object literal: `{ key: value, ... }`
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectLit {
    pub properties: Vec<Spanned<Property>>,
}

impl ObjectLit {
    /// Find the first property named `name`, either `name: value` or shorthand `name`
    pub fn find_property(&self, name: &str) -> Option<(usize, &Spanned<Property>)> {
        self.properties
            .iter()
            .enumerate()
            .find(|(_, prop)| prop.node.key_name() == Some(name))
    }

    /// Find the first `name: value` property and return its key and value
    pub fn find_key_value(&self, name: &str) -> Option<(&Spanned<PropKey>, &Spanned<Expr>)> {
        self.properties.iter().find_map(|prop| match &prop.node {
            Property::KeyValue { key, value } if key.node.name() == Some(name) => {
                Some((key, value))
            }
            _ => None,
        })
    }
}

/// A single entry of an object literal
#[derive(Debug, Clone, PartialEq)]
pub enum Property {
    /// `key: value`
    KeyValue {
        key: Spanned<PropKey>,
        value: Spanned<Expr>,
    },
    /// `name`
    Shorthand(Spanned<Identifier>),
    /// `...expr`
    Spread(Spanned<Expr>),
    /// Methods, accessors and anything else, kept as source text
    Other,
}

impl Property {
    /// The identifier naming this property, if it has one
    pub fn key_name(&self) -> Option<&str> {
        match self {
            Property::KeyValue { key, .. } => key.node.name(),
            Property::Shorthand(name) => Some(name.node.as_str()),
            Property::Spread(_) | Property::Other => None,
        }
    }
}

/// Property key
#[derive(Debug, Clone, PartialEq)]
pub enum PropKey {
    Ident(Identifier),
    /// Quoted key; raw text between the quotes
    Str(String),
    Number(String),
    /// `[expr]`
    Computed(Box<Spanned<Expr>>),
}

impl PropKey {
    /// Only identifier keys have a name; quoted and computed keys are never matched
    pub fn name(&self) -> Option<&str> {
        match self {
            PropKey::Ident(id) => Some(id.as_str()),
            _ => None,
        }
    }
}

/// String literal as written in the source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringLit {
    /// Raw text between the quotes, escapes not decoded
    pub raw: String,
}

impl StringLit {
    pub fn new(raw: impl Into<String>) -> Self {
        Self { raw: raw.into() }
    }

    /// The literal's value with escape sequences decoded
    pub fn value(&self) -> Result<String, EscapeError> {
        decode_string(&self.raw)
    }
}

/// Template literal: static segments interleaved with `${...}` substitutions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateLit {
    /// Raw text of each static segment; one more than `expressions`
    pub quasis: Vec<String>,
    /// Raw source of each substitution
    pub expressions: Vec<String>,
}

impl TemplateLit {
    /// Cooked text of the literal when it has no substitutions
    pub fn cooked(&self) -> Option<Result<String, EscapeError>> {
        match self.quasis.as_slice() {
            [only] => Some(cook_template(only)),
            _ => None,
        }
    }
}

/// Element of an array literal
#[derive(Debug, Clone, PartialEq)]
pub enum ArrayElement {
    Expr(Spanned<Expr>),
    /// `...expr`
    Spread(Spanned<Expr>),
    /// Elision: `[a, , b]`
    Hole,
}

/// Expression kinds the scanner does not model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpaqueKind {
    Function,
    ArrowFunction,
    Class,
    New,
    Conditional,
    Unary,
    Other,
}

impl OpaqueKind {
    pub fn name(self) -> &'static str {
        match self {
            OpaqueKind::Function => "function expression",
            OpaqueKind::ArrowFunction => "arrow function",
            OpaqueKind::Class => "class expression",
            OpaqueKind::New => "new expression",
            OpaqueKind::Conditional => "conditional expression",
            OpaqueKind::Unary => "unary expression",
            OpaqueKind::Other => "expression",
        }
    }
}

/// Expression tree
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Str(StringLit),
    Template(TemplateLit),
    Number(String),
    Bool(bool),
    Null,
    Regex(String),
    Ident(Identifier),
    Array(Vec<ArrayElement>),
    Object(ObjectLit),
    /// `object.property`
    Member {
        object: Box<Spanned<Expr>>,
        property: Spanned<Identifier>,
    },
    /// `object[index]`
    Index {
        object: Box<Spanned<Expr>>,
        index: Box<Spanned<Expr>>,
    },
    Call {
        callee: Box<Spanned<Expr>>,
        arguments: Vec<Spanned<Expr>>,
    },
    /// `left + right`
    Add {
        left: Box<Spanned<Expr>>,
        right: Box<Spanned<Expr>>,
    },
    Opaque(OpaqueKind),
}

impl Expr {
    /// Name of this node's kind, used in diagnostics
    pub fn kind_name(&self) -> &'static str {
        match self {
            Expr::Str(_) => "string literal",
            Expr::Template(_) => "template literal",
            Expr::Number(_) => "numeric literal",
            Expr::Bool(_) => "boolean literal",
            Expr::Null => "null literal",
            Expr::Regex(_) => "regular expression literal",
            Expr::Ident(_) => "identifier",
            Expr::Array(_) => "array literal",
            Expr::Object(_) => "object literal",
            Expr::Member { .. } | Expr::Index { .. } => "member expression",
            Expr::Call { .. } => "call expression",
            Expr::Add { .. } => "binary expression",
            Expr::Opaque(kind) => kind.name(),
        }
    }
}
