//! Template instantiation.
//!
//! - [`cache`]: instance cache keyed by template and argument hashes
//! - [`substitution`]: replacing template parameters inside types and members
//! - [`instantiation`]: building concrete classes from class templates,
//!   flattening hidden template bases and synthesizing iterator classes

mod cache;
mod instantiation;
mod substitution;

pub use cache::{TemplateInstanceCache, argument_hashes};
pub use instantiation::{
    inherit_template_members, instantiate_class_template, instantiate_requested_templates,
    link_instance_types,
};
pub use substitution::{
    EntryRewrites, SubstitutionMap, build_substitution_map, parameter_hash, substitute_field,
    substitute_function, substitute_type,
};

/// A typedef naming a class template instance, e.g.
/// `typedef Box<Int32> IntBox;` with a database entry for `IntBox`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassTemplateRequest {
    /// Qualified typedef name; becomes the instance class name.
    pub name: String,
    /// Template-id as written.
    pub target: String,
    /// Scope the typedef was declared in.
    pub scope: String,
    pub source_file: String,
}
