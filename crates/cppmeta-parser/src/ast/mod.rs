//! Input AST model.

mod decl;

pub use decl::{
    ArgumentDecl, BaseSpec, ClassDecl, EnumDecl, EnumeratorDecl, FieldDecl, FunctionDecl,
    FunctionQualifiers, FunctionRole, NamespaceDecl, PropertyDecl, TemplateParamDecl,
    TypedefDecl,
};
