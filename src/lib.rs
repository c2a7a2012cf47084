//! cppmeta builds a language-neutral metamodel of a C++ class library.
//!
//! The input is a tree of parsed declarations ([`parser`]) and a mapping
//! database ([`registry`]) saying which types exist and how to treat them.
//! The output is a frozen [`MetaModel`] of classes, functions, fields and
//! enums with every type resolved, ready for a binding generator.
//!
//! ```
//! use cppmeta::prelude::*;
//!
//! let mut db = TypeDatabase::with_builtin_primitives();
//! db.add_entry(TypeEntry::value("QPoint")).unwrap();
//!
//! let unit = NamespaceDecl::global().with_class(
//!     ClassDecl::new("QPoint").with_function(FunctionDecl::new("x", "int")),
//! );
//! let model = MetaBuilder::new(&db).with_translation_unit(unit).build();
//!
//! let point = model.find_class("QPoint").unwrap();
//! assert_eq!(point.find_function("x").unwrap().minimal_signature(), "x()");
//! ```

pub use cppmeta_builder as builder;
pub use cppmeta_core as core;
pub use cppmeta_parser as parser;
pub use cppmeta_registry as registry;

pub use cppmeta_builder::{BuilderConfig, MetaBuilder, MetaModel};

pub mod prelude {
    pub use cppmeta_builder::{BuilderConfig, MetaBuilder, MetaModel, RejectLog};
    pub use cppmeta_core::{
        BuildWarning, ClassId, MetaClass, MetaEnum, MetaFunction, MetaType, RejectReason,
        TypeEntry, UsagePattern,
    };
    pub use cppmeta_parser::{
        ArgumentDecl, BaseSpec, ClassDecl, EnumDecl, EnumeratorDecl, FieldDecl, FunctionDecl,
        NamespaceDecl, TypedefDecl,
    };
    pub use cppmeta_registry::{MappingDatabase, TypeDatabase};
}
