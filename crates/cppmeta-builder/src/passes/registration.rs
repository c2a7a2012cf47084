//! Registration Pass - build the class graph from the input AST.
//!
//! This pass walks every translation unit and registers namespace classes,
//! classes, enums, typedefs, fields, functions and properties into the build
//! context. Nothing is instantiated here; class templates are registered like
//! any other class and flagged [`ClassAttributes::TEMPLATE`].
//!
//! ## Phases
//!
//! ```text
//! collect   namespaces, classes, enums, typedefs   (structure only)
//!    │
//!    ▼
//! populate  fields, functions, properties          (types translated)
//!    │
//!    ▼
//! functionals from function-pointer typedefs
//! ```
//!
//! Every class exists before any member type is translated, so members may
//! refer to classes declared later in the input.
//!
//! ## Rejections
//!
//! Private declarations, declarations the database rejects and declarations
//! without a type entry are written to the reject log and skipped together
//! with everything nested in them. A function or field whose type fails to
//! translate is logged too; functions are kept on the class's invalid list
//! for diagnostics. No rejection affects sibling declarations.

use tracing::{debug, warn};

use cppmeta_core::{
    BaseClassName, ClassAttributes, ClassId, FieldAttributes, FunctionAttributes, FunctionKind,
    IntegerWidth, MetaArgument, MetaClass, MetaEnum, MetaEnumValue, MetaField, MetaFunction,
    MetaFunctional, MetaProperty, MetaTemplateParameter, MetaType, OperatorKind, ReferenceType,
    RejectCategory, RejectReason, TranslateError, TypeEntry, join_scope,
};
use cppmeta_parser::{
    ArgumentDecl, ClassDecl, EnumDecl, FieldDecl, FunctionDecl, FunctionQualifiers, FunctionRole,
    NamespaceDecl, PropertyDecl, TemplateParamDecl, TypedefDecl, parse_type,
};
use cppmeta_registry::ModificationKind;

use crate::context::{BuildContext, TypeContext};
use crate::template::ClassTemplateRequest;
use crate::type_translator::TypeTranslator;

/// Output of the registration pass.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RegistrationOutput {
    pub classes_registered: usize,
    pub functions_registered: usize,
    /// Functions kept for diagnostics only.
    pub invalid_functions: usize,
    pub fields_registered: usize,
    pub enums_registered: usize,
    pub typedefs_registered: usize,
    /// Declarations written to the reject log.
    pub rejected: usize,
}

/// Function-pointer typedef with a functional entry, translated after
/// population.
struct PendingFunctional {
    name: String,
    target: String,
    scope: String,
    owner: Option<ClassId>,
}

/// Builds the class graph.
pub struct RegistrationPass<'a, 'db> {
    ctx: &'a mut BuildContext<'db>,
    output: RegistrationOutput,
    /// Class per collected `ClassDecl`, in walk order; `None` when skipped.
    class_slots: Vec<Option<ClassId>>,
    next_slot: usize,
    pending_functionals: Vec<PendingFunctional>,
    anonymous_enums: usize,
}

impl<'a, 'db> RegistrationPass<'a, 'db> {
    pub fn new(ctx: &'a mut BuildContext<'db>) -> Self {
        Self {
            ctx,
            output: RegistrationOutput::default(),
            class_slots: Vec::new(),
            next_slot: 0,
            pending_functionals: Vec::new(),
            anonymous_enums: 0,
        }
    }

    /// Run the pass over all translation units.
    pub fn run(mut self, units: &[NamespaceDecl]) -> RegistrationOutput {
        for unit in units {
            self.collect_namespace(unit, "");
        }
        for unit in units {
            self.populate_namespace(unit, "");
        }
        self.register_functionals();
        self.output
    }

    // ==========================================================================
    // Collect
    // ==========================================================================

    fn collect_namespace(&mut self, ns: &NamespaceDecl, scope: &str) {
        let qualified = if ns.is_global() {
            scope.to_string()
        } else {
            join_scope(scope, &ns.name)
        };
        let owner = if ns.is_global() {
            None
        } else {
            self.namespace_class(&qualified)
        };

        for typedef in &ns.typedefs {
            self.register_typedef(typedef, &qualified, owner);
        }
        for decl in &ns.enums {
            self.register_enum(decl, &qualified, owner);
        }
        for class in &ns.classes {
            self.collect_class(class, &qualified, None);
        }
        for nested in &ns.namespaces {
            self.collect_namespace(nested, &qualified);
        }
    }

    /// Synthetic class for a namespace mapped to a namespace entry. Reopened
    /// namespaces share one class.
    fn namespace_class(&mut self, qualified: &str) -> Option<ClassId> {
        if let Some(id) = self
            .ctx
            .find_class(qualified)
            .filter(|id| self.ctx.class(*id).is_namespace())
        {
            return Some(id);
        }
        let entry = self.ctx.db.find_type(qualified).filter(|e| e.is_namespace())?;
        if self.ctx.db.is_class_rejected(qualified) {
            return None;
        }
        let id = self
            .ctx
            .add_class(MetaClass::new(entry).with_attributes(ClassAttributes::FAKE));
        self.output.classes_registered += 1;
        debug!(namespace = %qualified, "registered namespace class");
        Some(id)
    }

    /// The class receiving accepted global functions and global enums,
    /// created on first use.
    fn global_class(&mut self) -> ClassId {
        if let Some(id) = self.ctx.global_class {
            return id;
        }
        let name = self.ctx.config.global_class_name.clone();
        let entry = match self.ctx.db.find_complex_type(&name) {
            Some(entry) => entry,
            None => self.ctx.intern(TypeEntry::global(name)),
        };
        let id = self
            .ctx
            .add_class(MetaClass::new(entry).with_attributes(ClassAttributes::FAKE));
        self.ctx.global_class = Some(id);
        id
    }

    fn collect_class(&mut self, decl: &ClassDecl, scope: &str, enclosing: Option<ClassId>) {
        let qualified = join_scope(scope, &decl.name);
        let Some(id) = self.register_class(decl, &qualified, scope, enclosing) else {
            self.class_slots.push(None);
            return;
        };
        self.class_slots.push(Some(id));

        for typedef in &decl.typedefs {
            self.register_typedef(typedef, &qualified, Some(id));
        }
        for inner in &decl.enums {
            self.register_enum(inner, &qualified, Some(id));
        }
        for inner in &decl.classes {
            self.collect_class(inner, &qualified, Some(id));
        }
    }

    fn register_class(
        &mut self,
        decl: &ClassDecl,
        qualified: &str,
        scope: &str,
        enclosing: Option<ClassId>,
    ) -> Option<ClassId> {
        if decl.is_declaration_only {
            return None;
        }
        let file = decl.source_file.as_str();

        // 1. Rejections
        if decl.access.is_private() {
            self.reject(RejectCategory::Class, qualified, file, RejectReason::IsPrivate);
            return None;
        }
        if self.ctx.db.is_class_rejected(qualified) {
            self.reject(RejectCategory::Class, qualified, file, RejectReason::GenerationDisabled);
            return None;
        }

        // 2. Entry; iterators nested in containers need none
        let entry = match self.ctx.lookup_entry(qualified) {
            Some(entry) => entry,
            None => match iterator_kind(&decl.name) {
                Some(is_const) if enclosing.is_some() => {
                    self.ctx.intern(TypeEntry::iterator(scope, is_const))
                }
                _ => {
                    self.reject(RejectCategory::Class, qualified, file, RejectReason::NotInTypeSystem);
                    return None;
                }
            },
        };
        let is_class_like = (entry.is_complex() && !entry.is_namespace())
            || entry.is_iterator()
            || (entry.is_container() && decl.is_template());
        if !is_class_like {
            self.reject(RejectCategory::Class, qualified, file, RejectReason::RedefinedToNotClass);
            return None;
        }

        // 3. Template parameters; inner classes of templates share them
        let mut template_parameters: Vec<MetaTemplateParameter> = decl
            .template_parameters
            .iter()
            .enumerate()
            .map(|(ordinal, param)| template_parameter(param, ordinal))
            .collect();
        if template_parameters.is_empty() {
            if let Some(outer) = enclosing {
                template_parameters = self.ctx.class(outer).template_parameters.clone();
            }
        }

        // 4. Attributes
        let mut attributes = ClassAttributes::from_access(decl.access);
        if decl.is_final {
            attributes |= ClassAttributes::FINAL;
        }
        if decl.has_meta_object || entry.is_qobject() {
            attributes |= ClassAttributes::QOBJECT;
        }
        if decl.is_deprecated {
            attributes |= ClassAttributes::DEPRECATED;
        }
        if !template_parameters.is_empty() {
            attributes |= ClassAttributes::TEMPLATE;
        }

        let mut class = MetaClass::new(entry);
        class.attributes = attributes;
        class.base_class_names = decl
            .bases
            .iter()
            .map(|base| BaseClassName::new(base.name.clone(), base.access))
            .collect();
        class.enclosing_class = enclosing;
        class.template_parameters = template_parameters;
        class.source_file = decl.source_file.clone();

        let id = self.ctx.add_class(class);
        if let Some(outer) = enclosing {
            self.ctx.class_mut(outer).inner_classes.push(id);
        }
        self.output.classes_registered += 1;
        debug!(class = %qualified, "registered class");
        Some(id)
    }

    fn register_typedef(&mut self, decl: &TypedefDecl, scope: &str, owner: Option<ClassId>) {
        let qualified = join_scope(scope, &decl.name);
        self.ctx
            .typedefs
            .entry(qualified.clone())
            .or_insert_with(|| decl.type_expression.clone());
        self.output.typedefs_registered += 1;

        let Some(entry) = self.ctx.db.find_type(&qualified) else {
            return;
        };
        if entry.is_complex() && parse_type(&decl.type_expression).has_template_arguments() {
            let source_file = owner
                .map(|id| self.ctx.class(id).source_file.clone())
                .unwrap_or_default();
            self.ctx.class_template_requests.push(ClassTemplateRequest {
                name: qualified,
                target: decl.type_expression.clone(),
                scope: scope.to_string(),
                source_file,
            });
        } else if entry.is_functional() {
            self.pending_functionals.push(PendingFunctional {
                name: qualified,
                target: decl.type_expression.clone(),
                scope: scope.to_string(),
                owner,
            });
        }
    }

    fn register_enum(&mut self, decl: &EnumDecl, scope: &str, owner: Option<ClassId>) {
        let is_anonymous = decl.name.is_empty();
        let qualified = if is_anonymous {
            self.anonymous_enums += 1;
            join_scope(scope, &format!("anonymous_{}", self.anonymous_enums))
        } else {
            join_scope(scope, &decl.name)
        };
        let file = decl.source_file.as_str();

        if decl.access.is_private() {
            self.reject(RejectCategory::Enum, &qualified, file, RejectReason::IsPrivate);
            return;
        }
        if !is_anonymous && self.ctx.db.is_enum_rejected(scope, &decl.name) {
            self.reject(RejectCategory::Enum, &qualified, file, RejectReason::GenerationDisabled);
            return;
        }
        let entry = if is_anonymous {
            self.ctx.intern(TypeEntry::enumeration(qualified.clone()))
        } else {
            match self.ctx.lookup_entry(&qualified).filter(|e| e.is_enum()) {
                Some(entry) => entry,
                None => {
                    self.reject(RejectCategory::Enum, &qualified, file, RejectReason::NotInTypeSystem);
                    return;
                }
            }
        };

        let width = decl
            .underlying_type
            .as_deref()
            .and_then(IntegerWidth::from_type_name)
            .unwrap_or_default();
        let mut meta_enum = MetaEnum::new(qualified.clone(), entry, width);
        meta_enum.is_scoped = decl.is_scoped;
        meta_enum.is_anonymous = is_anonymous;
        meta_enum.access = decl.access;
        meta_enum.source_file = decl.source_file.clone();
        meta_enum.values = decl
            .enumerators
            .iter()
            .map(|enumerator| {
                let mut value = MetaEnumValue::new(
                    enumerator.name.clone(),
                    enumerator.expression.clone().unwrap_or_default(),
                    qualified.clone(),
                );
                value.deprecated = enumerator.is_deprecated;
                value
            })
            .collect();

        let owner = match owner {
            Some(id) => id,
            None => self.global_class(),
        };
        meta_enum.enclosing_class = Some(owner);
        self.ctx.class_mut(owner).enums.push(meta_enum);
        self.output.enums_registered += 1;
    }

    // ==========================================================================
    // Populate
    // ==========================================================================

    fn populate_namespace(&mut self, ns: &NamespaceDecl, scope: &str) {
        let qualified = if ns.is_global() {
            scope.to_string()
        } else {
            join_scope(scope, &ns.name)
        };

        for class in &ns.classes {
            self.populate_class(class);
        }
        let tc = TypeContext::in_scope(qualified.clone());
        for function in &ns.functions {
            self.register_free_function(function, &qualified, &tc);
        }
        for field in &ns.fields {
            self.register_free_field(field, &qualified, &tc);
        }
        for nested in &ns.namespaces {
            self.populate_namespace(nested, &qualified);
        }
    }

    fn populate_class(&mut self, decl: &ClassDecl) {
        let slot = self.class_slots.get(self.next_slot).copied().flatten();
        self.next_slot += 1;
        let Some(id) = slot else {
            return;
        };

        let tc = TypeContext::for_class(id, self.ctx.class(id));
        for field in &decl.fields {
            self.register_field(field, id, &tc, FieldAttributes::empty());
        }
        for function in &decl.functions {
            self.register_member_function(function, id, &tc);
        }
        for property in &decl.properties {
            self.register_property(property, id, &tc);
        }
        if decl
            .functions
            .iter()
            .any(|f| f.qualifiers.contains(FunctionQualifiers::PURE_VIRTUAL))
        {
            self.ctx.class_mut(id).attributes |= ClassAttributes::ABSTRACT;
        }

        for inner in &decl.classes {
            self.populate_class(inner);
        }
    }

    fn register_field(
        &mut self,
        decl: &FieldDecl,
        class_id: ClassId,
        tc: &TypeContext,
        extra: FieldAttributes,
    ) {
        let class_name = self.ctx.class(class_id).qualified_name.clone();
        let file = self.ctx.class(class_id).source_file.clone();
        let signature = join_scope(&class_name, &decl.name);

        if decl.access.is_private() {
            self.reject(RejectCategory::Field, signature, &file, RejectReason::IsPrivate);
            return;
        }
        if self.ctx.db.is_field_rejected(&class_name, &decl.name) {
            self.reject(RejectCategory::Field, signature, &file, RejectReason::GenerationDisabled);
            return;
        }
        let ty = match self.translate(&decl.type_expression, tc) {
            Ok(ty) => ty,
            Err(err) => {
                warn!(field = %signature, error = %err, "cannot translate field type");
                self.reject(RejectCategory::Field, signature, &file, RejectReason::UnmatchedReturnType);
                return;
            }
        };

        let mut attributes = FieldAttributes::from_access(decl.access) | extra;
        if decl.is_static {
            attributes |= FieldAttributes::STATIC;
        }
        if decl.is_mutable {
            attributes |= FieldAttributes::MUTABLE;
        }
        if ty.is_constant() {
            attributes |= FieldAttributes::CONST;
        }
        let mut field = MetaField::new(decl.name.clone(), ty);
        field.attributes = attributes;
        field.declaring_class = Some(class_id);
        field.source_file = file;

        self.ctx.class_mut(class_id).fields.push(field);
        self.output.fields_registered += 1;
    }

    fn register_member_function(&mut self, decl: &FunctionDecl, class_id: ClassId, tc: &TypeContext) {
        let class = self.ctx.class(class_id);
        let class_name = class.qualified_name.clone();
        let simple_name = class.name().to_string();
        let file = if decl.source_file.is_empty() {
            class.source_file.clone()
        } else {
            decl.source_file.clone()
        };

        if let Some(function) = self.build_function(decl, &class_name, Some(&simple_name), &file, tc) {
            self.place_function(class_id, function);
        }
    }

    fn register_property(&mut self, decl: &PropertyDecl, class_id: ClassId, tc: &TypeContext) {
        let ty = match self.translate(&decl.type_expression, tc) {
            Ok(ty) => Some(ty),
            Err(err) => {
                debug!(property = %decl.name, error = %err, "property type not translated");
                None
            }
        };
        let property = MetaProperty {
            name: decl.name.clone(),
            type_expression: decl.type_expression.clone(),
            ty,
            read: decl.read.clone(),
            write: decl.write.clone(),
            reset: decl.reset.clone(),
            notify: decl.notify.clone(),
            member: decl.member.clone(),
        };

        let class = self.ctx.class_mut(class_id);
        let roles = [
            (&property.read, FunctionAttributes::PROPERTY_READER),
            (&property.write, FunctionAttributes::PROPERTY_WRITER),
            (&property.reset, FunctionAttributes::PROPERTY_RESETTER),
            (&property.notify, FunctionAttributes::PROPERTY_NOTIFY),
        ];
        for function in &mut class.functions {
            for (accessor, flag) in &roles {
                if accessor.as_deref() == Some(function.name.as_str()) {
                    function.attributes |= *flag;
                }
            }
        }
        class.properties.push(property);
    }

    /// Free functions go to the class of their first argument (operators),
    /// their namespace class, or the global class, in that order.
    fn register_free_function(&mut self, decl: &FunctionDecl, scope: &str, tc: &TypeContext) {
        let Some(mut function) = self.build_function(decl, scope, None, &decl.source_file, tc) else {
            return;
        };

        if self.ctx.config.promote_global_operators {
            if let Some(owner) = self.promotion_target(&function) {
                function.set_kind(FunctionKind::GlobalScopeFunction);
                if function.arguments.first().is_some_and(|a| binds_const_this(&a.ty)) {
                    function.attributes |= FunctionAttributes::CONST;
                }
                self.place_function(owner, function);
                return;
            }
        }

        function.attributes |= FunctionAttributes::STATIC;
        let namespace_class = self
            .ctx
            .find_class(scope)
            .filter(|id| self.ctx.class(*id).is_namespace());
        if let Some(id) = namespace_class {
            self.place_function(id, function);
        } else if self.ctx.db.accepts_global_function(&decl.name) {
            let id = self.global_class();
            self.place_function(id, function);
        } else if !function.is_invalid() {
            self.reject(
                RejectCategory::Function,
                raw_signature(scope, decl),
                &decl.source_file,
                RejectReason::IsGlobal,
            );
        }
    }

    fn register_free_field(&mut self, decl: &FieldDecl, scope: &str, tc: &TypeContext) {
        let namespace_class = self
            .ctx
            .find_class(scope)
            .filter(|id| self.ctx.class(*id).is_namespace());
        match namespace_class {
            Some(id) => self.register_field(decl, id, tc, FieldAttributes::STATIC),
            None => self.reject(
                RejectCategory::Field,
                join_scope(scope, &decl.name),
                "",
                RejectReason::IsGlobal,
            ),
        }
    }

    fn register_functionals(&mut self) {
        for item in std::mem::take(&mut self.pending_functionals) {
            let desc = parse_type(&item.target);
            if !desc.is_function_type() {
                debug!(typedef = %item.name, "functional typedef is not a function type");
                continue;
            }
            let Some(entry) = self.ctx.db.find_functional_type(&item.name) else {
                continue;
            };
            let tc = match item.owner {
                Some(id) => TypeContext::for_class(id, self.ctx.class(id)),
                None => TypeContext::in_scope(item.scope.clone()),
            };

            let translated: Result<(Option<MetaType>, Vec<MetaArgument>), TranslateError> = {
                let mut translator = TypeTranslator::new(&mut *self.ctx);
                let return_type: Result<Option<MetaType>, TranslateError> = match desc.function_return.as_deref() {
                    Some(ret) => translator
                        .translate(ret, &tc)
                        .map(|ty| Some(ty).filter(|ty| !ty.is_void())),
                    None => Ok(None),
                };
                return_type.and_then(|return_type| {
                    desc.arguments
                        .iter()
                        .enumerate()
                        .map(|(index, arg)| {
                            translator
                                .translate(arg, &tc)
                                .map(|ty| MetaArgument::new(format!("arg__{}", index + 1), ty))
                        })
                        .collect::<Result<Vec<_>, _>>()
                        .map(|arguments| (return_type, arguments))
                })
            };
            let (return_type, arguments) = match translated {
                Ok(parts) => parts,
                Err(err) => {
                    warn!(typedef = %item.name, error = %err, "cannot translate functional typedef");
                    continue;
                }
            };

            let owner = match item.owner {
                Some(id) => id,
                None => self.global_class(),
            };
            self.ctx.class_mut(owner).functionals.push(MetaFunctional {
                qualified_name: item.name,
                entry,
                return_type,
                arguments,
                enclosing_class: item.owner,
            });
        }
    }

    // ==========================================================================
    // Functions
    // ==========================================================================

    /// Build a function from its declaration. `None` when rejected; a
    /// function whose types fail to translate comes back flagged
    /// [`FunctionAttributes::INVALID`].
    fn build_function(
        &mut self,
        decl: &FunctionDecl,
        class_name: &str,
        class_simple_name: Option<&str>,
        file: &str,
        tc: &TypeContext,
    ) -> Option<MetaFunction> {
        // 1. Rejections by declaration
        let raw = raw_signature(class_name, decl);
        if decl.access.is_private() {
            self.reject(RejectCategory::Function, raw, file, RejectReason::IsPrivate);
            return None;
        }
        if self.ctx.db.is_function_rejected(class_name, &decl.name) {
            self.reject(RejectCategory::Function, raw, file, RejectReason::GenerationDisabled);
            return None;
        }

        // 2. Kind and attributes
        let mut function = MetaFunction::new(decl.name.clone(), function_kind(decl, class_simple_name));
        function.attributes = function_attributes(decl);
        function.source_file = file.to_string();
        function.template_parameters = decl
            .template_parameters
            .iter()
            .enumerate()
            .map(|(ordinal, param)| template_parameter(param, ordinal))
            .collect();
        let tc = tc
            .clone()
            .with_function_template_parameters(function.template_parameters.clone());

        // 3. Argument list shape
        let mut arguments: &[ArgumentDecl] = &decl.arguments;
        if let [only] = arguments {
            if only.name.is_empty() && only.type_expression.trim() == "void" {
                arguments = &[];
            }
        }
        if function.kind == FunctionKind::Signal {
            if let Some((last, rest)) = arguments.split_last() {
                if last.type_expression.trim().ends_with("QPrivateSignal") {
                    function.set_kind(FunctionKind::PrivateSignal);
                    arguments = rest;
                }
            }
        }

        // 4. Types
        let mut failure: Option<(RejectReason, TranslateError)> = None;
        let return_expression = return_expression(decl);
        if !function.kind.is_constructor_or_destructor() && !return_expression.trim().is_empty() {
            match self.translate(&return_expression, &tc) {
                Ok(ty) => function.set_return_type(Some(ty)),
                Err(err) => failure = Some((RejectReason::UnmatchedReturnType, err)),
            }
        }
        for (index, argument) in arguments.iter().enumerate() {
            match self.translate(&argument.type_expression, &tc) {
                Ok(ty) => {
                    let name = if argument.name.is_empty() {
                        format!("arg__{}", index + 1)
                    } else {
                        argument.name.clone()
                    };
                    let mut meta_argument = MetaArgument::new(name, ty);
                    meta_argument.original_default = argument.default_expression.clone();
                    function.arguments.push(meta_argument);
                }
                Err(err) => {
                    failure.get_or_insert((RejectReason::UnmatchedArgumentType, err));
                }
            }
        }
        if let Some((reason, err)) = failure {
            warn!(function = %raw, error = %err, "cannot translate function type");
            self.reject(RejectCategory::Function, raw, file, reason);
            function.attributes |= FunctionAttributes::INVALID;
            return Some(function);
        }

        // 5. Rejections by signature
        let signature = function.minimal_signature();
        if self.ctx.db.is_function_rejected(class_name, &signature) {
            self.reject(
                RejectCategory::Function,
                join_scope(class_name, &signature),
                file,
                RejectReason::GenerationDisabled,
            );
            return None;
        }
        if function.is_copy_constructor_of(class_name) {
            function.attributes |= FunctionAttributes::COPY_CONSTRUCTOR;
        }

        // 6. Modifications
        self.apply_modifications(&mut function, class_name, &signature, &tc);
        Some(function)
    }

    fn apply_modifications(
        &mut self,
        function: &mut MetaFunction,
        class_name: &str,
        signature: &str,
        tc: &TypeContext,
    ) {
        for modification in self.ctx.db.function_modifications(class_name, signature) {
            match modification.kind {
                ModificationKind::Rename(name) => function.name = name,
                ModificationKind::Remove => function.attributes |= FunctionAttributes::REMOVED,
                ModificationKind::Access(access) => function.attributes.set_access(access),
                ModificationKind::ReplaceArgumentType {
                    index,
                    type_expression,
                } => match self.translate(&type_expression, tc) {
                    Ok(ty) => {
                        if let Some(argument) = function.arguments.get_mut(index) {
                            argument.ty = ty;
                        }
                    }
                    Err(err) => {
                        warn!(function = %signature, index, error = %err, "cannot translate replacement argument type");
                    }
                },
                ModificationKind::ReplaceDefault { index, expression } => {
                    if let Some(argument) = function.arguments.get_mut(index) {
                        argument.original_default = Some(expression);
                    }
                }
                ModificationKind::RemoveDefault { index } => {
                    if let Some(argument) = function.arguments.get_mut(index) {
                        argument.original_default = None;
                    }
                }
            }
        }
    }

    fn place_function(&mut self, class_id: ClassId, mut function: MetaFunction) {
        function.declaring_class.get_or_insert(class_id);
        function.implementing_class = Some(class_id);
        let class = self.ctx.class_mut(class_id);
        if function.is_invalid() {
            class.invalid_functions.push(function);
            self.output.invalid_functions += 1;
        } else if function.is_template() {
            class.template_functions.push(function);
            self.output.functions_registered += 1;
        } else {
            class.functions.push(function);
            self.output.functions_registered += 1;
        }
    }

    /// Class a free operator is promoted to: the class of its first argument.
    fn promotion_target(&self, function: &MetaFunction) -> Option<ClassId> {
        if !function.operator.is_some_and(OperatorKind::is_promotable) {
            return None;
        }
        let first = function.arguments.first()?;
        if !first.ty.indirections().is_empty() {
            return None;
        }
        self.ctx
            .find_class(&first.ty.entry().qualified_name)
            .filter(|id| !self.ctx.class(*id).is_fake())
    }

    // === Helpers ===

    fn translate(&mut self, text: &str, tc: &TypeContext) -> Result<MetaType, TranslateError> {
        TypeTranslator::new(&mut *self.ctx).translate_str(text, tc)
    }

    fn reject(
        &mut self,
        category: RejectCategory,
        signature: impl Into<String>,
        file: &str,
        reason: RejectReason,
    ) {
        self.ctx.reject(category, signature, file, reason);
        self.output.rejected += 1;
    }
}

fn template_parameter(decl: &TemplateParamDecl, ordinal: usize) -> MetaTemplateParameter {
    let mut param = MetaTemplateParameter::new(decl.name.clone(), ordinal);
    param.default = decl.default.clone();
    param.is_type = decl.is_type;
    param
}

fn iterator_kind(name: &str) -> Option<bool> {
    match name {
        "iterator" => Some(false),
        "const_iterator" => Some(true),
        _ => None,
    }
}

fn function_kind(decl: &FunctionDecl, class_simple_name: Option<&str>) -> FunctionKind {
    if decl.name.starts_with('~') {
        FunctionKind::Destructor
    } else if class_simple_name == Some(decl.name.as_str()) {
        FunctionKind::Constructor
    } else {
        match decl.role {
            FunctionRole::Signal => FunctionKind::Signal,
            FunctionRole::Slot => FunctionKind::Slot,
            FunctionRole::Normal | FunctionRole::Invokable => FunctionKind::Normal,
        }
    }
}

fn function_attributes(decl: &FunctionDecl) -> FunctionAttributes {
    const MAPPED: [(FunctionQualifiers, FunctionAttributes); 9] = [
        (FunctionQualifiers::VIRTUAL, FunctionAttributes::VIRTUAL),
        (FunctionQualifiers::STATIC, FunctionAttributes::STATIC),
        (FunctionQualifiers::CONST, FunctionAttributes::CONST),
        (FunctionQualifiers::FINAL, FunctionAttributes::FINAL),
        (FunctionQualifiers::OVERRIDE, FunctionAttributes::OVERRIDE),
        (FunctionQualifiers::EXPLICIT, FunctionAttributes::EXPLICIT),
        (FunctionQualifiers::DELETED, FunctionAttributes::DELETED),
        (FunctionQualifiers::NOEXCEPT, FunctionAttributes::NOEXCEPT),
        (FunctionQualifiers::DEPRECATED, FunctionAttributes::DEPRECATED),
    ];

    let mut attributes = FunctionAttributes::from_access(decl.access);
    for (qualifier, attribute) in MAPPED {
        if decl.qualifiers.contains(qualifier) {
            attributes |= attribute;
        }
    }
    if decl.qualifiers.contains(FunctionQualifiers::PURE_VIRTUAL) {
        attributes |= FunctionAttributes::ABSTRACT | FunctionAttributes::VIRTUAL;
    }
    if OperatorKind::from_function_name(&decl.name) == Some(OperatorKind::Conversion) {
        attributes |= FunctionAttributes::CONVERSION_OPERATOR;
    }
    attributes
}

/// Declared return type; conversion operators return their target type.
fn return_expression(decl: &FunctionDecl) -> String {
    if decl.return_type.trim().is_empty() {
        if let Some(target) = decl.name.strip_prefix("operator") {
            if OperatorKind::from_function_name(&decl.name) == Some(OperatorKind::Conversion) {
                return target.trim().to_string();
            }
        }
    }
    decl.return_type.clone()
}

/// `Class::name(type,type)` as declared, for the reject log.
fn raw_signature(class_name: &str, decl: &FunctionDecl) -> String {
    let arguments: Vec<&str> = decl
        .arguments
        .iter()
        .map(|a| a.type_expression.trim())
        .collect();
    format!("{}({})", join_scope(class_name, &decl.name), arguments.join(","))
}

/// A promoted operator is `const` when its first argument cannot be modified.
fn binds_const_this(ty: &MetaType) -> bool {
    ty.is_constant() || (ty.reference() == ReferenceType::NoReference && ty.indirections().is_empty())
}
