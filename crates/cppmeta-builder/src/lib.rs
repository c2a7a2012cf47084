//! cppmeta builder.
//!
//! Turns parsed C++ declarations into a [`MetaModel`] using the rules of a
//! [`MappingDatabase`](cppmeta_registry::MappingDatabase).
//!
//! ## Architecture
//!
//! All state of a build lives in one [`BuildContext`]. Passes borrow it in
//! turn, see [`passes`] for the order. [`MetaBuilder::build`] freezes the
//! context into the read-only model.
//!
//! ## Modules
//!
//! - [`scope`]: name lookup through scopes, bases and the fallback namespace
//! - [`type_translator`]: type expressions to [`MetaType`](cppmeta_core::MetaType)s
//! - [`constant`]: integer constant folding for enum values and defaults
//! - [`template`]: class and function template instantiation
//! - [`passes`]: the build passes
//! - [`reject_log`]: categorized record of everything left out
//! - [`order`]: base-first ordering of the finished class graph

pub mod builder;
pub mod config;
pub mod constant;
pub mod context;
pub mod model;
pub mod order;
pub mod passes;
pub mod reject_log;
pub mod scope;
pub mod template;
pub mod type_translator;

pub use builder::MetaBuilder;
pub use config::BuilderConfig;
pub use constant::{ConstantEvaluator, EnumConstantTable, EvalError};
pub use context::{BuildContext, TypeContext};
pub use model::MetaModel;
pub use reject_log::{RejectLog, RejectedItem};
pub use scope::{Resolution, ScopeResolver};
pub use type_translator::TypeTranslator;
