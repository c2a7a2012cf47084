//! Type-expression parsing.
//!
//! [`parse_type`] turns strings such as `const Foo<Bar,int>::Iterator&` into
//! a [`TypeDescriptor`]. It is pure and stateless.

mod descriptor;
mod parser;

pub use descriptor::TypeDescriptor;
pub use parser::parse_type;
