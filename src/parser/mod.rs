//! Scanner for the object literals of a JavaScript source

pub mod ast;
mod grammar;
pub mod lexer;
pub mod unescape;

pub use ast::*;
pub use grammar::parse_object_literals;
