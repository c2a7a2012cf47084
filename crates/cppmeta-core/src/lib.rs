//! Core vocabulary for cppmeta.
//!
//! This crate holds the types every other cppmeta crate speaks:
//!
//! - [`TypeEntry`] - the mapping database's singleton description of a C++ type
//! - [`MetaType`] - one resolved use of an entry, with its [`UsagePattern`]
//! - metamodel records ([`MetaClass`], [`MetaFunction`], [`MetaEnum`], ...)
//! - [`TypeHash`] - deterministic identities for template instances
//! - [`RejectReason`] and the error types in [`error`]
//!
//! It has no knowledge of the AST or of how the metamodel is built.

pub mod access;
pub mod entries;
pub mod error;
pub mod meta_type;
pub mod model;
pub mod qualified_name;
pub mod reject;
pub mod type_hash;
pub mod usage;

pub use access::Access;
pub use entries::{
    CodeGeneration, ContainerKind, PointerContainerKind, TypeEntry, TypeEntryKind,
};
pub use error::{BuildWarning, RegistrationError, TranslateError};
pub use meta_type::{Indirection, MetaType, ReferenceType};
pub use model::{
    BaseClassName, ClassAttributes, ClassCapabilities, ClassId, ComparisonStrategy,
    DefaultValue, EnumValue, FieldAttributes, FunctionAttributes, FunctionKind, IntegerWidth,
    MetaArgument, MetaClass, MetaEnum, MetaEnumValue, MetaField, MetaFunction, MetaFunctional,
    MetaProperty, MetaTemplateParameter, OperatorKind,
};
pub use qualified_name::{QualifiedName, join_scope, split_scopes};
pub use reject::{RejectCategory, RejectReason};
pub use type_hash::TypeHash;
pub use usage::{UsagePattern, decide_usage_pattern};
