//! Type substitution for template instantiation.
//!
//! Provides functions to substitute template parameters with concrete types.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use cppmeta_core::{
    Indirection, MetaField, MetaFunction, MetaTemplateParameter, MetaType, ReferenceType, TranslateError,
    TypeEntry, TypeHash,
};

/// Map from template parameter hash to concrete type.
pub type SubstitutionMap = FxHashMap<TypeHash, MetaType>;

/// Entries to retarget while substituting, by qualified name. Used to point
/// a template's iterator at the iterator synthesized for an instance.
pub type EntryRewrites = FxHashMap<String, Arc<TypeEntry>>;

/// Build a substitution map from template parameters and type arguments.
///
/// # Errors
/// Returns an error if the number of arguments doesn't match parameters.
pub fn build_substitution_map(
    template: &str,
    params: &[MetaTemplateParameter],
    args: &[MetaType],
) -> Result<SubstitutionMap, TranslateError> {
    if params.len() != args.len() {
        return Err(TranslateError::ArgumentCount {
            ty: template.to_string(),
            expected: params.len(),
            found: args.len(),
        });
    }

    let mut map = FxHashMap::default();
    for (param, arg) in params.iter().zip(args) {
        map.insert(parameter_hash(param), arg.clone());
    }
    Ok(map)
}

/// Key of a template parameter in a [`SubstitutionMap`].
pub fn parameter_hash(param: &MetaTemplateParameter) -> TypeHash {
    TypeHash::from_name(&param.entry.qualified_name)
}

/// Substitute template parameters in a type.
///
/// A bound parameter takes the argument's entry and instantiations. Pointer
/// levels stack: the argument's own indirections come first, then the ones
/// written at the use site, so `T*` with `T = Int32*` gives `Int32**`.
/// `const T` makes the argument itself const: the pointed-to type when it
/// is not a pointer, its outermost pointer otherwise, so `const T&` with
/// `T = Int32*` gives `Int32*const&`. A reference written at the use site
/// wins.
pub fn substitute_type(ty: &MetaType, map: &SubstitutionMap, rewrites: &EntryRewrites) -> MetaType {
    if ty.is_template_argument() {
        let Some(replacement) = map.get(&TypeHash::from_name(&ty.entry().qualified_name)) else {
            return ty.clone();
        };
        let mut indirections = replacement.indirections().to_vec();
        let mut is_constant = replacement.is_constant();
        if ty.is_constant() {
            match indirections.last_mut() {
                Some(outermost) => *outermost = Indirection::ConstPointer,
                None => is_constant = true,
            }
        }
        indirections.extend_from_slice(ty.indirections());
        let reference = if ty.reference() == ReferenceType::NoReference {
            replacement.reference()
        } else {
            ty.reference()
        };
        return replacement
            .clone()
            .with_constant(is_constant)
            .with_volatile(ty.is_volatile() || replacement.is_volatile())
            .with_reference(reference)
            .with_indirections(indirections);
    }

    let mut out = ty.clone();
    if let Some(entry) = rewrites.get(&ty.entry().qualified_name) {
        out.set_entry(entry.clone());
    }
    if !out.instantiations().is_empty() {
        out.edit_instantiations(|args| {
            for arg in args.iter_mut() {
                *arg = substitute_type(arg, map, rewrites);
            }
        });
    }
    out
}

/// Substitute a whole function. Fails when an argument would become `void`
/// by value.
pub fn substitute_function(
    function: &MetaFunction,
    map: &SubstitutionMap,
    rewrites: &EntryRewrites,
) -> Result<MetaFunction, TranslateError> {
    let mut out = function.clone();
    if let Some(ret) = function.return_type() {
        out.set_return_type(Some(substitute_type(ret, map, rewrites)));
    }
    for arg in &mut out.arguments {
        arg.ty = substitute_type(&arg.ty, map, rewrites);
        if arg.ty.is_void() {
            return Err(TranslateError::Unsupported {
                ty: "void".to_string(),
                reason: format!("argument '{}' of '{}' is void", arg.name, function.name),
            });
        }
    }
    Ok(out)
}

/// Substitute a field's type. Fails when it would become `void`.
pub fn substitute_field(
    field: &MetaField,
    map: &SubstitutionMap,
    rewrites: &EntryRewrites,
) -> Result<MetaField, TranslateError> {
    let mut out = field.clone();
    out.ty = substitute_type(&field.ty, map, rewrites);
    if out.ty.is_void() {
        return Err(TranslateError::Unsupported {
            ty: "void".to_string(),
            reason: format!("field '{}' is void", field.name),
        });
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cppmeta_core::{ContainerKind, FunctionKind, Indirection, MetaArgument, UsagePattern};

    fn param() -> MetaTemplateParameter {
        MetaTemplateParameter::new("T", 0)
    }

    fn t() -> MetaType {
        MetaType::new(param().entry)
    }

    fn int32() -> MetaType {
        MetaType::new(Arc::new(TypeEntry::value("Int32")))
    }

    fn map_to(arg: MetaType) -> SubstitutionMap {
        build_substitution_map("Box", &[param()], &[arg]).unwrap()
    }

    #[test]
    fn argument_count_must_match() {
        let err = build_substitution_map("Box", &[param()], &[]).unwrap_err();
        assert!(matches!(
            err,
            TranslateError::ArgumentCount {
                expected: 1,
                found: 0,
                ..
            }
        ));
    }

    #[test]
    fn pointer_to_parameter_gains_one_level() {
        let ty = t().with_indirections(vec![Indirection::Pointer]);
        let out = substitute_type(&ty, &map_to(int32()), &EntryRewrites::default());
        assert_eq!(out.to_string(), "Int32*");
        assert_eq!(out.usage_pattern(), UsagePattern::ValuePointer);
    }

    #[test]
    fn pointer_levels_stack() {
        let ty = t().with_indirections(vec![Indirection::Pointer]);
        let arg = int32().with_indirections(vec![Indirection::Pointer]);
        let out = substitute_type(&ty, &map_to(arg), &EntryRewrites::default());
        assert_eq!(out.indirections().len(), 2);
        assert_eq!(out.to_string(), "Int32**");
    }

    #[test]
    fn const_reference_is_kept() {
        let ty = t()
            .with_constant(true)
            .with_reference(ReferenceType::LValue);
        let out = substitute_type(&ty, &map_to(int32()), &EntryRewrites::default());
        assert_eq!(out.to_string(), "const Int32&");
    }

    #[test]
    fn const_pointer_argument_makes_the_pointer_const() {
        let ty = t()
            .with_constant(true)
            .with_reference(ReferenceType::LValue);
        let arg = int32().with_indirections(vec![Indirection::Pointer]);
        let out = substitute_type(&ty, &map_to(arg), &EntryRewrites::default());
        assert!(!out.is_constant());
        assert_eq!(out.indirections(), &[Indirection::ConstPointer]);
        assert_eq!(out.to_string(), "Int32*const&");
    }

    #[test]
    fn substitutes_inside_instantiations() {
        let list = Arc::new(TypeEntry::container("QList", ContainerKind::List));
        let ty = MetaType::new(list).with_instantiations(vec![t()]);
        assert!(ty.contains_template_arguments());

        let out = substitute_type(&ty, &map_to(int32()), &EntryRewrites::default());
        assert_eq!(out.to_string(), "QList<Int32>");
        assert!(!out.contains_template_arguments());
    }

    #[test]
    fn unbound_parameter_is_left_alone() {
        let u = MetaType::new(MetaTemplateParameter::new("U", 1).entry);
        let out = substitute_type(&u, &map_to(int32()), &EntryRewrites::default());
        assert!(out.is_template_argument());
    }

    #[test]
    fn rewrites_retarget_entries() {
        let old = Arc::new(TypeEntry::iterator("Box", false));
        let new = Arc::new(TypeEntry::iterator("IntBox", false));
        let mut rewrites = EntryRewrites::default();
        rewrites.insert(old.qualified_name.clone(), new);

        let out = substitute_type(&MetaType::new(old), &SubstitutionMap::default(), &rewrites);
        assert_eq!(out.to_string(), "IntBox::iterator");
    }

    #[test]
    fn void_argument_fails_function() {
        let void = MetaType::new(Arc::new(TypeEntry::primitive("void")));
        let f = MetaFunction::new("set", FunctionKind::Normal).with_argument(MetaArgument::new("value", t()));
        assert!(substitute_function(&f, &map_to(void.clone()), &EntryRewrites::default()).is_err());

        let g = MetaFunction::new("get", FunctionKind::Normal).with_return_type(t());
        let out = substitute_function(&g, &map_to(void), &EntryRewrites::default()).unwrap();
        assert!(out.return_type().is_none());
    }
}
