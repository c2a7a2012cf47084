//! Metamodel records produced by the builder.
//!
//! - [`MetaClass`] - classes, namespace classes and template instances
//! - [`MetaFunction`], [`MetaArgument`] - functions and their arguments
//! - [`MetaField`], [`MetaProperty`], [`MetaFunctional`] - other members
//! - [`MetaEnum`], [`MetaEnumValue`] - enums with lazily resolved values
//! - attribute bitsets and operator classification

mod attributes;
mod class;
mod enums;
mod function;
mod members;
mod operator;

pub use attributes::{ClassAttributes, FieldAttributes, FunctionAttributes};
pub use class::{BaseClassName, ClassCapabilities, ClassId, ComparisonStrategy, MetaClass};
pub use enums::{EnumValue, IntegerWidth, MetaEnum, MetaEnumValue};
pub use function::{DefaultValue, FunctionKind, MetaArgument, MetaFunction};
pub use members::{MetaField, MetaFunctional, MetaProperty, MetaTemplateParameter};
pub use operator::OperatorKind;
