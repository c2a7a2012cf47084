//! cppmeta input layer.
//!
//! This crate provides:
//! - the input AST model handed over by a C++ front end ([`ast`])
//! - the type-expression parser ([`parse_type`], [`TypeDescriptor`])
//! - a small text [`Cursor`] shared with the constant evaluator
//!
//! # Example
//!
//! ```
//! use cppmeta_parser::parse_type;
//!
//! let desc = parse_type("const QList<QString> &");
//! assert_eq!(desc.name(), "QList");
//! assert_eq!(desc.arguments[0].name(), "QString");
//! assert!(desc.is_constant);
//! ```

pub mod ast;
pub mod cursor;
pub mod type_expr;

pub use ast::*;
pub use cursor::{Cursor, is_ident_continue, is_ident_start};
pub use type_expr::{TypeDescriptor, parse_type};
