//! Class template instantiation.
//!
//! Two ways produce concrete members from a class template:
//!
//! - [`instantiate_class_template`] builds a new instance class
//!   (`typedef Box<Int32> IntBox;`), cached by template and arguments
//! - [`inherit_template_members`] flattens a template base into a concrete
//!   subclass (`class IntBox : public Box<Int32>`), the "hidden base"
//!
//! Both substitute every template parameter through nested instantiations.
//! A member whose substitution fails is dropped on its own; the rest of the
//! class survives. Iterator classes of the template are cloned once per
//! concrete container and the container's member types are retargeted at
//! the clones.

use std::sync::Arc;

use tracing::{debug, warn};

use cppmeta_core::{
    ClassAttributes, ClassId, FieldAttributes, FunctionAttributes, FunctionKind, MetaClass, MetaField,
    MetaFunction, MetaType, TranslateError, TypeEntry, TypeEntryKind, TypeHash, join_scope,
};
use cppmeta_parser::parse_type;

use super::cache::argument_hashes;
use super::substitution::{
    EntryRewrites, SubstitutionMap, build_substitution_map, substitute_field, substitute_function,
};
use crate::context::{BuildContext, TypeContext};
use crate::type_translator::TypeTranslator;

/// Build the instance classes queued by typedefs. Returns how many new
/// classes were created.
pub fn instantiate_requested_templates(ctx: &mut BuildContext<'_>) -> usize {
    let before = ctx.template_cache.class_instance_count();
    let requests = std::mem::take(&mut ctx.class_template_requests);

    for request in &requests {
        // 1. Locate the template
        let desc = parse_type(&request.target);
        let template_id = ctx
            .find_class_in_scope(&desc.name(), &request.scope)
            .filter(|id| ctx.class(*id).is_template());
        let Some(template_id) = template_id else {
            debug!(typedef = %request.name, target = %request.target, "typedef does not name a class template");
            continue;
        };

        // 2. Translate the arguments where the typedef was written
        let tc = TypeContext::in_scope(request.scope.clone());
        let args: Result<Vec<MetaType>, TranslateError> = {
            let mut translator = TypeTranslator::new(ctx);
            desc.arguments
                .iter()
                .map(|arg| translator.translate(arg, &tc))
                .collect()
        };
        let args = match args {
            Ok(args) => args,
            Err(err) => {
                warn!(typedef = %request.name, file = %request.source_file, error = %err, "cannot instantiate class template");
                continue;
            }
        };

        // 3. The instance takes the typedef's entry
        let Some(entry) = ctx.db.find_complex_type(&request.name) else {
            continue;
        };
        if let Err(err) = instantiate_class_template(ctx, template_id, &args, entry) {
            warn!(typedef = %request.name, file = %request.source_file, error = %err, "cannot instantiate class template");
        }
    }

    ctx.template_cache.class_instance_count() - before
}

/// Instantiate the class template `template_id` with `args` as a new class
/// described by `entry`.
///
/// The instance is registered under its entry's name and under the spelled
/// template-id (`Box<Int32>`), so later lookups of either find it. Asking for
/// the same template and arguments again returns the cached class.
///
/// # Errors
/// Fails when the argument count does not match the template's parameters.
pub fn instantiate_class_template(
    ctx: &mut BuildContext<'_>,
    template_id: ClassId,
    args: &[MetaType],
    entry: Arc<TypeEntry>,
) -> Result<ClassId, TranslateError> {
    // 1. Cache
    let template_hash = TypeHash::from_name(&ctx.class(template_id).qualified_name);
    let arg_hashes = argument_hashes(args);
    if let Some(cached) = ctx.template_cache.get_class_instance(template_hash, &arg_hashes) {
        return Ok(cached);
    }

    // 2. Substitution map
    let template = ctx.class(template_id).clone();
    let map = build_substitution_map(&template.qualified_name, &template.template_parameters, args)?;

    // 3. Instance class
    let mut instance = MetaClass::new(entry);
    instance.attributes = template
        .attributes
        .difference(ClassAttributes::TEMPLATE)
        .union(ClassAttributes::TEMPLATE_INSTANTIATION);
    instance.base_class_names = template.base_class_names.clone();
    instance.enclosing_class = template.enclosing_class;
    instance.template_base_class = Some(template_id);
    instance.template_base_instantiations = args.to_vec();
    instance.properties = template.properties.clone();
    instance.source_file = template.source_file.clone();
    let id = ctx.add_class(instance);

    let spelled: Vec<String> = args.iter().map(MetaType::cpp_signature).collect();
    ctx.alias_class(format!("{}<{}>", template.qualified_name, spelled.join(",")), id);
    ctx.template_cache
        .cache_class_instance(template_hash, &arg_hashes, id);

    // 4. Iterators first, so member types can be retargeted
    let rewrites = synthesize_iterators(ctx, id, template_id, &map);

    // 5. Members
    let instance_name = ctx.class(id).qualified_name.clone();
    let simple_name = ctx.class(id).name().to_string();

    let functions = substitute_members(&template.functions, &map, &rewrites, &instance_name)
        .map(|mut function| {
            rename_special_member(&mut function, &simple_name);
            function.declaring_class = Some(id);
            function.implementing_class = Some(id);
            function
        })
        .collect();
    let template_functions = substitute_members(&template.template_functions, &map, &rewrites, &instance_name)
        .map(|mut function| {
            function.declaring_class = Some(id);
            function.implementing_class = Some(id);
            function
        })
        .collect();
    let fields = substitute_fields(&template.fields, &map, &rewrites, &instance_name)
        .map(|mut field| {
            field.declaring_class = Some(id);
            field
        })
        .collect();
    let enums = template
        .enums
        .iter()
        .map(|meta_enum| {
            let mut copy = meta_enum.clone();
            copy.qualified_name = join_scope(&instance_name, meta_enum.name());
            copy.enclosing_class = Some(id);
            for value in &mut copy.values {
                value.enum_name = copy.qualified_name.clone();
            }
            copy
        })
        .collect();

    let class = ctx.class_mut(id);
    class.functions = functions;
    class.template_functions = template_functions;
    class.fields = fields;
    class.enums = enums;

    debug!(
        template = %template.qualified_name,
        instance = %instance_name,
        functions = class.functions.len(),
        "instantiated class template"
    );
    Ok(id)
}

/// Flatten the members of template `template_id`, instantiated with `args`,
/// into `class_id`. Constructors, destructors and members the subclass
/// already declares are not copied. Returns the number of members added.
///
/// # Errors
/// Fails when the argument count does not match the template's parameters.
pub fn inherit_template_members(
    ctx: &mut BuildContext<'_>,
    class_id: ClassId,
    template_id: ClassId,
    args: &[MetaType],
) -> Result<usize, TranslateError> {
    let template = ctx.class(template_id).clone();
    let map = build_substitution_map(&template.qualified_name, &template.template_parameters, args)?;
    let rewrites = synthesize_iterators(ctx, class_id, template_id, &map);

    let class_name = ctx.class(class_id).qualified_name.clone();
    let mut functions: Vec<MetaFunction> = Vec::new();
    for mut function in substitute_members(&template.functions, &map, &rewrites, &class_name) {
        if function.kind.is_constructor_or_destructor() {
            continue;
        }
        let signature = function.minimal_signature();
        let shadowed = ctx.class(class_id).has_function_signature(&signature)
            || functions.iter().any(|f| f.minimal_signature() == signature);
        if shadowed {
            debug!(class = %class_name, function = %signature, "template member shadowed by subclass");
            continue;
        }
        function.attributes |= FunctionAttributes::INHERITED_FROM_TEMPLATE;
        function.declaring_class = Some(template_id);
        function.implementing_class = Some(class_id);
        functions.push(function);
    }

    let mut fields: Vec<MetaField> = Vec::new();
    for mut field in substitute_fields(&template.fields, &map, &rewrites, &class_name) {
        if ctx.class(class_id).find_field(&field.name).is_some() {
            continue;
        }
        field.attributes |= FieldAttributes::INHERITED_FROM_TEMPLATE;
        field.declaring_class = Some(template_id);
        fields.push(field);
    }

    let added = functions.len() + fields.len();
    let class = ctx.class_mut(class_id);
    class.attributes |= ClassAttributes::HAS_HIDDEN_BASE;
    class.template_base_class = Some(template_id);
    class.template_base_instantiations = args.to_vec();
    class.functions.extend(functions);
    class.fields.extend(fields);
    Ok(added)
}

// === Internals ===

fn substitute_members<'f>(
    functions: &'f [MetaFunction],
    map: &'f SubstitutionMap,
    rewrites: &'f EntryRewrites,
    class_name: &'f str,
) -> impl Iterator<Item = MetaFunction> + 'f {
    functions
        .iter()
        .filter(|function| !function.is_invalid())
        .filter_map(move |function| match substitute_function(function, map, rewrites) {
            Ok(function) => Some(function),
            Err(err) => {
                debug!(class = %class_name, function = %function.minimal_signature(), error = %err, "dropping template member");
                None
            }
        })
}

fn substitute_fields<'f>(
    fields: &'f [MetaField],
    map: &'f SubstitutionMap,
    rewrites: &'f EntryRewrites,
    class_name: &'f str,
) -> impl Iterator<Item = MetaField> + 'f {
    fields
        .iter()
        .filter_map(move |field| match substitute_field(field, map, rewrites) {
            Ok(field) => Some(field),
            Err(err) => {
                debug!(class = %class_name, field = %field.name, error = %err, "dropping template field");
                None
            }
        })
}

/// Constructors and destructors carry the instance's name.
fn rename_special_member(function: &mut MetaFunction, simple_name: &str) {
    let name = match function.kind {
        FunctionKind::Constructor => simple_name.to_string(),
        FunctionKind::Destructor => format!("~{simple_name}"),
        _ => return,
    };
    function.original_name = name.clone();
    function.name = name;
}

/// Clone the template's iterator classes for `container_id`. Returns the
/// entry rewrites pointing the template's iterators at the clones.
fn synthesize_iterators(
    ctx: &mut BuildContext<'_>,
    container_id: ClassId,
    template_id: ClassId,
    map: &SubstitutionMap,
) -> EntryRewrites {
    let mut rewrites = EntryRewrites::default();
    if !ctx.config.synthesize_iterators {
        return rewrites;
    }

    let container_name = ctx.class(container_id).qualified_name.clone();
    let iterator_templates: Vec<ClassId> = ctx
        .class(template_id)
        .inner_classes
        .iter()
        .copied()
        .filter(|id| ctx.class(*id).entry.is_iterator())
        .collect();

    let mut pending = Vec::new();
    for iterator_id in iterator_templates {
        let template_iterator = ctx.class(iterator_id).clone();
        let is_const = match &template_iterator.entry.kind {
            TypeEntryKind::Iterator { is_const, .. } => *is_const,
            _ => continue,
        };
        let entry = ctx.intern(TypeEntry::iterator(container_name.clone(), is_const));
        rewrites.insert(template_iterator.entry.qualified_name.clone(), entry.clone());
        if ctx.find_class(&entry.qualified_name).is_some() {
            continue;
        }

        let mut iterator = MetaClass::new(entry);
        iterator.attributes |= ClassAttributes::SYNTHESIZED_ITERATOR;
        iterator.enclosing_class = Some(container_id);
        iterator.iterator_container = Some(container_id);
        iterator.template_base_class = Some(iterator_id);
        iterator.source_file = template_iterator.source_file.clone();
        let id = ctx.add_class(iterator);
        ctx.class_mut(container_id).inner_classes.push(id);
        pending.push((id, template_iterator));
    }

    // Members last: `iterator` may mention `const_iterator` and vice versa.
    for (id, template_iterator) in pending {
        let name = ctx.class(id).qualified_name.clone();
        let functions: Vec<MetaFunction> = substitute_members(&template_iterator.functions, map, &rewrites, &name)
            .map(|mut function| {
                function.declaring_class = Some(id);
                function.implementing_class = Some(id);
                function
            })
            .collect();
        debug!(iterator = %name, functions = functions.len(), "synthesized iterator class");
        ctx.class_mut(id).functions = functions;
    }
    rewrites
}

/// Point member types spelled as a template-id (`Box<Int32>`) at the
/// instance class built for it. Members are translated before instances
/// exist, so this runs once the requested instances are in place. Returns
/// how many types were retargeted.
pub fn link_instance_types(ctx: &mut BuildContext<'_>) -> usize {
    let mut linked = 0;
    for id in ctx.class_ids() {
        if ctx.class(id).is_template() {
            continue;
        }
        let class = ctx.class_mut(id);
        let mut functions = std::mem::take(&mut class.functions);
        let mut template_functions = std::mem::take(&mut class.template_functions);
        let mut fields = std::mem::take(&mut class.fields);

        for function in functions.iter_mut().chain(template_functions.iter_mut()) {
            if let Some(ty) = function.return_type_mut() {
                linked += link_type(ctx, ty);
            }
            for argument in &mut function.arguments {
                linked += link_type(ctx, &mut argument.ty);
            }
        }
        for field in &mut fields {
            linked += link_type(ctx, &mut field.ty);
        }

        let class = ctx.class_mut(id);
        class.functions = functions;
        class.template_functions = template_functions;
        class.fields = fields;
    }
    linked
}

fn link_type(ctx: &BuildContext<'_>, ty: &mut MetaType) -> usize {
    let mut linked = ty.edit_instantiations(|args| args.iter_mut().map(|arg| link_type(ctx, arg)).sum::<usize>());
    if ty.instantiations().is_empty() {
        return linked;
    }
    let spelled: Vec<String> = ty.instantiations().iter().map(MetaType::cpp_signature).collect();
    let instance_name = format!("{}<{}>", ty.entry().qualified_name, spelled.join(","));
    if let Some(id) = ctx.find_class(&instance_name) {
        let entry = ctx.class(id).entry.clone();
        ty.set_instantiations(Vec::new());
        ty.set_entry(entry);
        linked += 1;
    }
    linked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BuilderConfig;
    use cppmeta_core::{
        FunctionKind, Indirection, MetaArgument, MetaTemplateParameter, ReferenceType,
    };
    use cppmeta_registry::TypeDatabase;

    fn database() -> TypeDatabase {
        let mut db = TypeDatabase::with_builtin_primitives();
        db.add_entry(TypeEntry::value("Box")).unwrap();
        db.add_entry(TypeEntry::value("IntBox")).unwrap();
        db.add_entry(TypeEntry::value("Int32")).unwrap();
        db
    }

    fn int32(ctx: &BuildContext<'_>) -> MetaType {
        MetaType::new(ctx.lookup_entry("Int32").unwrap())
    }

    /// `template<typename T> class Box { Box(); T get() const; T* ptr(); T value; iterator begin(); };`
    fn box_template(ctx: &mut BuildContext<'_>) -> ClassId {
        let param = MetaTemplateParameter::new("T", 0);
        let t = MetaType::new(param.entry.clone());
        let mut class = MetaClass::new(ctx.lookup_entry("Box").unwrap())
            .with_attributes(ClassAttributes::TEMPLATE);
        class.template_parameters = vec![param];
        class.functions = vec![
            MetaFunction::new("Box", FunctionKind::Constructor),
            MetaFunction::new("get", FunctionKind::Normal)
                .with_attributes(FunctionAttributes::CONST)
                .with_return_type(t.clone()),
            MetaFunction::new("ptr", FunctionKind::Normal)
                .with_return_type(t.clone().with_indirections(vec![Indirection::Pointer])),
            MetaFunction::new("set", FunctionKind::Normal).with_argument(MetaArgument::new(
                "value",
                t.clone().with_constant(true).with_reference(ReferenceType::LValue),
            )),
        ];
        class.fields = vec![MetaField::new("value", t)];
        let id = ctx.add_class(class);

        let iterator_entry = ctx.intern(TypeEntry::iterator("Box", false));
        let mut iterator = MetaClass::new(iterator_entry.clone());
        iterator.enclosing_class = Some(id);
        iterator.template_parameters = ctx.class(id).template_parameters.clone();
        iterator.functions = vec![MetaFunction::new("next", FunctionKind::Normal)
            .with_return_type(MetaType::new(iterator_entry.clone()))];
        let iterator_id = ctx.add_class(iterator);
        ctx.class_mut(id).inner_classes.push(iterator_id);
        ctx.class_mut(id)
            .functions
            .push(MetaFunction::new("begin", FunctionKind::Normal).with_return_type(MetaType::new(iterator_entry)));
        id
    }

    #[test]
    fn instance_substitutes_members() {
        let db = database();
        let mut ctx = BuildContext::new(&db, BuilderConfig::default());
        let template = box_template(&mut ctx);
        let args = vec![int32(&ctx)];
        let entry = ctx.lookup_entry("IntBox").unwrap();

        let id = instantiate_class_template(&mut ctx, template, &args, entry).unwrap();
        let instance = ctx.class(id);
        assert!(!instance.is_template());
        assert!(instance.attributes.contains(ClassAttributes::TEMPLATE_INSTANTIATION));
        assert_eq!(instance.template_base_class, Some(template));

        let get = instance.find_function("get").unwrap();
        assert_eq!(get.return_type().unwrap().to_string(), "Int32");
        assert!(get.is_const());
        assert!(!get.contains_template_arguments());
        assert_eq!(
            instance.find_function("ptr").unwrap().return_type().unwrap().to_string(),
            "Int32*"
        );
        assert!(instance.find_function("IntBox").unwrap().is_constructor());
        assert_eq!(instance.find_field("value").unwrap().ty.to_string(), "Int32");
        assert_eq!(ctx.find_class("Box<Int32>"), Some(id));
    }

    #[test]
    fn instance_is_cached() {
        let db = database();
        let mut ctx = BuildContext::new(&db, BuilderConfig::default());
        let template = box_template(&mut ctx);
        let args = vec![int32(&ctx)];
        let entry = ctx.lookup_entry("IntBox").unwrap();

        let first = instantiate_class_template(&mut ctx, template, &args, entry.clone()).unwrap();
        let count = ctx.classes.len();
        let second = instantiate_class_template(&mut ctx, template, &args, entry).unwrap();
        assert_eq!(first, second);
        assert_eq!(ctx.classes.len(), count);
        assert_eq!(ctx.template_cache.class_instance_count(), 1);
    }

    #[test]
    fn instance_gets_its_own_iterator() {
        let db = database();
        let mut ctx = BuildContext::new(&db, BuilderConfig::default());
        let template = box_template(&mut ctx);
        let args = vec![int32(&ctx)];
        let entry = ctx.lookup_entry("IntBox").unwrap();

        let id = instantiate_class_template(&mut ctx, template, &args, entry).unwrap();
        let begin = ctx.class(id).find_function("begin").unwrap();
        assert_eq!(begin.return_type().unwrap().to_string(), "IntBox::iterator");

        let iterator = ctx.find_class("IntBox::iterator").unwrap();
        let iterator_class = ctx.class(iterator);
        assert!(iterator_class.attributes.contains(ClassAttributes::SYNTHESIZED_ITERATOR));
        assert_eq!(iterator_class.iterator_container, Some(id));
        assert_eq!(
            iterator_class.find_function("next").unwrap().return_type().unwrap().to_string(),
            "IntBox::iterator"
        );
        assert!(ctx.class(id).inner_classes.contains(&iterator));
    }

    #[test]
    fn void_instance_drops_only_affected_members() {
        let db = database();
        let mut ctx = BuildContext::new(&db, BuilderConfig::default());
        let template = box_template(&mut ctx);
        let void = MetaType::new(ctx.lookup_entry("void").unwrap());
        let entry = ctx.lookup_entry("IntBox").unwrap();

        let id = instantiate_class_template(&mut ctx, template, &[void], entry).unwrap();
        let instance = ctx.class(id);
        assert!(instance.find_function("set").is_none());
        assert!(instance.find_field("value").is_none());
        let get = instance.find_function("get").unwrap();
        assert!(get.return_type().is_none());
    }

    #[test]
    fn argument_count_mismatch_is_an_error() {
        let db = database();
        let mut ctx = BuildContext::new(&db, BuilderConfig::default());
        let template = box_template(&mut ctx);
        let entry = ctx.lookup_entry("IntBox").unwrap();
        let err = instantiate_class_template(&mut ctx, template, &[], entry).unwrap_err();
        assert!(matches!(err, TranslateError::ArgumentCount { expected: 1, found: 0, .. }));
    }

    #[test]
    fn hidden_base_skips_shadowed_members() {
        let db = database();
        let mut ctx = BuildContext::new(&db, BuilderConfig::default());
        let template = box_template(&mut ctx);
        let int = int32(&ctx);

        let mut subclass = MetaClass::new(ctx.lookup_entry("IntBox").unwrap());
        subclass.functions.push(
            MetaFunction::new("get", FunctionKind::Normal)
                .with_attributes(FunctionAttributes::CONST)
                .with_return_type(int.clone()),
        );
        let id = ctx.add_class(subclass);

        let added = inherit_template_members(&mut ctx, id, template, &[int]).unwrap();
        let class = ctx.class(id);
        assert!(class.attributes.contains(ClassAttributes::HAS_HIDDEN_BASE));
        assert_eq!(class.functions_named("get").count(), 1);
        assert!(class.find_function("Box").is_none());

        let set = class.find_function("set").unwrap();
        assert!(set.attributes.contains(FunctionAttributes::INHERITED_FROM_TEMPLATE));
        assert_eq!(set.implementing_class, Some(id));
        assert_eq!(set.declaring_class, Some(template));
        assert_eq!(set.arguments[0].ty.to_string(), "const Int32&");
        // ptr, set, begin and the field
        assert_eq!(added, 4);
    }

    #[test]
    fn requested_typedef_builds_instance() {
        let db = database();
        let mut ctx = BuildContext::new(&db, BuilderConfig::default());
        box_template(&mut ctx);
        ctx.class_template_requests.push(crate::template::ClassTemplateRequest {
            name: "IntBox".into(),
            target: "Box<Int32>".into(),
            scope: String::new(),
            source_file: "box.h".into(),
        });

        assert_eq!(instantiate_requested_templates(&mut ctx), 1);
        let id = ctx.find_class("IntBox").unwrap();
        assert!(ctx.class(id).find_function("get").is_some());
        assert!(ctx.class_template_requests.is_empty());
    }

    #[test]
    fn member_types_link_to_instances() {
        let db = database();
        let mut ctx = BuildContext::new(&db, BuilderConfig::default());
        let template = box_template(&mut ctx);
        let args = vec![int32(&ctx)];
        let entry = ctx.lookup_entry("IntBox").unwrap();
        instantiate_class_template(&mut ctx, template, &args, entry).unwrap();

        let spelled = MetaType::new(ctx.lookup_entry("Box").unwrap())
            .with_constant(true)
            .with_reference(ReferenceType::LValue)
            .with_instantiations(args);
        let mut holder = MetaClass::new(ctx.lookup_entry("Int32").unwrap());
        holder.functions = vec![
            MetaFunction::new("make", FunctionKind::Normal).with_return_type(spelled.clone()),
            MetaFunction::new("take", FunctionKind::Normal).with_argument(MetaArgument::new("b", spelled)),
        ];
        let holder = ctx.add_class(holder);

        assert_eq!(link_instance_types(&mut ctx), 2);
        let make = ctx.class(holder).find_function("make").unwrap();
        let ty = make.return_type().unwrap();
        assert_eq!(ty.entry().qualified_name, "IntBox");
        assert!(ty.instantiations().is_empty());
        assert_eq!(ty.to_string(), "const IntBox&");
        // Already linked types are left alone
        assert_eq!(link_instance_types(&mut ctx), 0);
    }
}
