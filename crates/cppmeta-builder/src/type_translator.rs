//! Translation of parsed type expressions into [`MetaType`]s.
//!
//! ## Lookup order
//!
//! For a descriptor `D` translated in a [`TypeContext`]:
//!
//! 1. function types become functional entries
//! 2. sized arrays become array entries over the translated element;
//!    unsized arrays decay to a pointer
//! 3. `C::iterator` / `C::const_iterator` of a container become iterator
//!    entries over the translated container
//! 4. `QFlags<E>` is looked up with `E` resolved first
//! 5. the name exactly as written
//! 6. template parameters of the function, the class and its enclosing
//!    classes
//! 7. the [`ScopeResolver`] chain (enclosing scopes, base classes, fallback
//!    namespace); typedefs and aliases found here are expanded and
//!    translated again
//!
//! A failing template argument fails the whole type. Translation is pure
//! apart from interning builder entries, so translating the same
//! descriptor twice gives structurally equal results.

use std::sync::Arc;

use cppmeta_core::{
    Indirection, MetaType, ReferenceType, TranslateError, TypeEntry, TypeEntryKind,
};
use cppmeta_parser::{TypeDescriptor, parse_type};

use crate::context::{BuildContext, TypeContext};
use crate::scope::{Resolution, ScopeResolver, parent_scope};

/// Guards against typedef cycles.
const MAX_EXPANSION_DEPTH: usize = 16;

/// Outcome of a name lookup.
enum Lookup {
    Entry(Arc<TypeEntry>),
    /// Typedef or alias; translate `target` as seen from `scope`.
    Expand {
        target: String,
        scope: Option<String>,
    },
}

/// Translates type expressions against a build context.
pub struct TypeTranslator<'a, 'db> {
    ctx: &'a mut BuildContext<'db>,
    depth: usize,
}

impl<'a, 'db> TypeTranslator<'a, 'db> {
    pub fn new(ctx: &'a mut BuildContext<'db>) -> Self {
        Self { ctx, depth: 0 }
    }

    /// Parse and translate a type expression.
    pub fn translate_str(&mut self, text: &str, tc: &TypeContext) -> Result<MetaType, TranslateError> {
        let desc = parse_type(text);
        if desc.is_busted() {
            return Err(TranslateError::BustedExpression(text.to_string()));
        }
        self.translate(&desc, tc)
    }

    /// Translate a parsed type expression.
    pub fn translate(&mut self, desc: &TypeDescriptor, tc: &TypeContext) -> Result<MetaType, TranslateError> {
        if desc.is_busted() {
            return Err(TranslateError::BustedExpression(desc.to_string()));
        }
        if desc.is_function_type() {
            return self.translate_function_type(desc, tc);
        }
        if !desc.arrays.is_empty() {
            return self.translate_array(desc, tc);
        }
        if let Some(ty) = self.translate_iterator(desc, tc)? {
            return Ok(decorate(ty, desc));
        }
        if let Some(entry) = self.find_flags(desc, tc) {
            return Ok(decorate(MetaType::new(entry), desc));
        }

        let name = desc.name();
        match self.lookup(&name, tc) {
            Some(Lookup::Entry(entry)) => {
                let ty = self.instantiate(entry, desc, tc)?;
                Ok(decorate(ty, desc))
            }
            Some(Lookup::Expand { target, scope }) => self.expand(desc, &target, scope, tc),
            None => Err(TranslateError::UnknownType(desc.name_with_arguments())),
        }
    }

    // === Lookup ===

    fn lookup(&self, name: &str, tc: &TypeContext) -> Option<Lookup> {
        if let Some(entry) = self.ctx.lookup_entry(name) {
            return Some(entry_or_alias(entry));
        }
        if let Some(entry) = self.template_parameter(name, tc) {
            return Some(Lookup::Entry(entry));
        }
        match ScopeResolver::new(&*self.ctx).resolve(name, &tc.scope, tc.class)? {
            Resolution::Type(qualified) => self.ctx.lookup_entry(&qualified).map(entry_or_alias),
            Resolution::Typedef { name, target } => Some(Lookup::Expand {
                target,
                scope: Some(parent_scope(&name)),
            }),
        }
    }

    fn template_parameter(&self, name: &str, tc: &TypeContext) -> Option<Arc<TypeEntry>> {
        if name.contains("::") {
            return None;
        }
        if let Some(param) = tc.function_template_parameters.iter().find(|p| p.name == name) {
            return Some(param.entry.clone());
        }
        let mut current = tc.class;
        while let Some(id) = current {
            let class = self.ctx.class(id);
            if let Some(param) = class.template_parameters.iter().find(|p| p.name == name) {
                return Some(param.entry.clone());
            }
            current = class.enclosing_class;
        }
        None
    }

    /// Translate a typedef or alias target, carrying over the decorations
    /// written at the use site.
    fn expand(
        &mut self,
        desc: &TypeDescriptor,
        target: &str,
        scope: Option<String>,
        tc: &TypeContext,
    ) -> Result<MetaType, TranslateError> {
        if self.depth >= MAX_EXPANSION_DEPTH {
            return Err(TranslateError::Unsupported {
                ty: desc.name(),
                reason: "typedef expansion does not terminate".to_string(),
            });
        }
        let mut expanded = parse_type(target);
        if expanded.is_busted() {
            return Err(TranslateError::BustedExpression(target.to_string()));
        }
        expanded.is_constant |= desc.is_constant;
        expanded.is_volatile |= desc.is_volatile;
        expanded.indirections.extend_from_slice(&desc.indirections);
        if desc.reference != ReferenceType::NoReference {
            expanded.reference = desc.reference;
        }

        let expanded_tc = match scope {
            Some(scope) if scope != tc.scope => TypeContext {
                class: self.ctx.find_class(&scope),
                scope,
                function_template_parameters: tc.function_template_parameters.clone(),
            },
            _ => tc.clone(),
        };

        self.depth += 1;
        let result = self.translate(&expanded, &expanded_tc);
        self.depth -= 1;
        result
    }

    // === Entry kinds ===

    fn instantiate(
        &mut self,
        entry: Arc<TypeEntry>,
        desc: &TypeDescriptor,
        tc: &TypeContext,
    ) -> Result<MetaType, TranslateError> {
        match &entry.kind {
            TypeEntryKind::Namespace | TypeEntryKind::Global => Err(TranslateError::Unsupported {
                ty: desc.name(),
                reason: "namespace used as a type".to_string(),
            }),
            TypeEntryKind::Container { kind } => {
                let expected = kind.arity();
                if desc.arguments.len() != expected {
                    return Err(TranslateError::ArgumentCount {
                        ty: desc.name(),
                        expected,
                        found: desc.arguments.len(),
                    });
                }
                let args = self.translate_arguments(desc, tc)?;
                Ok(MetaType::new(entry).with_instantiations(args))
            }
            TypeEntryKind::PointerContainer { .. } => {
                if desc.arguments.len() != 1 {
                    return Err(TranslateError::ArgumentCount {
                        ty: desc.name(),
                        expected: 1,
                        found: desc.arguments.len(),
                    });
                }
                let args = self.translate_arguments(desc, tc)?;
                Ok(MetaType::new(entry).with_instantiations(args))
            }
            TypeEntryKind::Value { .. } | TypeEntryKind::Object { .. }
                if desc.has_template_arguments() =>
            {
                self.instantiate_generic(entry, desc, tc)
            }
            _ => Ok(MetaType::new(entry)),
        }
    }

    /// `Name<Args...>` of a value or object template: specializations, the
    /// void specialization and registered instance classes are preferred over
    /// a plain instantiated use.
    fn instantiate_generic(
        &mut self,
        entry: Arc<TypeEntry>,
        desc: &TypeDescriptor,
        tc: &TypeContext,
    ) -> Result<MetaType, TranslateError> {
        if let Some(void_name) = &entry.void_specialization {
            let has_void = desc
                .arguments
                .iter()
                .any(|a| a.name() == "void" && a.indirections.is_empty());
            if has_void {
                if let Some(target) = self.ctx.lookup_entry(void_name) {
                    return Ok(MetaType::new(target));
                }
            }
        }

        let args = self.translate_arguments(desc, tc)?;
        let spelled: Vec<String> = args.iter().map(MetaType::cpp_signature).collect();

        if let Some(target) = entry
            .specialization_for(&spelled)
            .and_then(|name| self.ctx.lookup_entry(name))
        {
            return Ok(MetaType::new(target));
        }

        let instance_name = format!("{}<{}>", entry.qualified_name, spelled.join(","));
        if let Some(id) = self.ctx.find_class(&instance_name) {
            return Ok(MetaType::new(self.ctx.class(id).entry.clone()));
        }

        Ok(MetaType::new(entry).with_instantiations(args))
    }

    fn translate_arguments(
        &mut self,
        desc: &TypeDescriptor,
        tc: &TypeContext,
    ) -> Result<Vec<MetaType>, TranslateError> {
        desc.arguments
            .iter()
            .enumerate()
            .map(|(index, arg)| {
                self.translate_argument(arg, index, tc)
                    .map_err(|source| TranslateError::TemplateArgument {
                        ty: desc.name_with_arguments(),
                        index,
                        source: Box::new(source),
                    })
            })
            .collect()
    }

    fn translate_argument(
        &mut self,
        arg: &TypeDescriptor,
        index: usize,
        tc: &TypeContext,
    ) -> Result<MetaType, TranslateError> {
        // Non-type arguments (`QVarLengthArray<int, 256>`).
        let name = arg.name();
        if name.starts_with(|c: char| c.is_ascii_digit() || c == '-') {
            let entry = TypeEntry::instantiated_template_argument(name.clone(), index, name);
            return Ok(MetaType::new(self.ctx.intern(entry)));
        }
        self.translate(arg, tc)
    }

    fn find_flags(&self, desc: &TypeDescriptor, tc: &TypeContext) -> Option<Arc<TypeEntry>> {
        if desc.simple_name() != "QFlags" || desc.arguments.len() != 1 {
            return None;
        }
        let enum_entry = match self.lookup(&desc.arguments[0].name(), tc)? {
            Lookup::Entry(entry) if entry.is_enum() => entry,
            _ => return None,
        };
        if let TypeEntryKind::Enum { flags: Some(flags) } = &enum_entry.kind {
            if let Some(entry) = self.ctx.db.find_flags_type(flags) {
                return Some(entry);
            }
        }
        self.ctx
            .db
            .find_flags_type(&format!("QFlags<{}>", enum_entry.qualified_name))
    }

    fn translate_iterator(
        &mut self,
        desc: &TypeDescriptor,
        tc: &TypeContext,
    ) -> Result<Option<MetaType>, TranslateError> {
        let is_const = match desc.simple_name() {
            "iterator" => false,
            "const_iterator" => true,
            _ => return Ok(None),
        };
        let last = desc.qualified_name.len() - 1;
        if last == 0 || (desc.arguments_segment == last && desc.has_template_arguments()) {
            return Ok(None);
        }
        if self.ctx.lookup_entry(&desc.name()).is_some() && !desc.has_template_arguments() {
            return Ok(None);
        }

        let mut container = desc.undecorated();
        container.qualified_name.truncate(last);
        container.arguments_segment = container.arguments_segment.min(last - 1);
        let Ok(container_ty) = self.translate(&container, tc) else {
            return Ok(None);
        };
        if !container_ty.entry().is_container() {
            return Ok(None);
        }

        let entry = self
            .ctx
            .intern(TypeEntry::iterator(container_ty.entry().qualified_name.clone(), is_const));
        Ok(Some(
            MetaType::new(entry).with_instantiations(container_ty.instantiations().to_vec()),
        ))
    }

    fn translate_array(&mut self, desc: &TypeDescriptor, tc: &TypeContext) -> Result<MetaType, TranslateError> {
        let element_desc = desc.without_outer_array();
        if !desc.is_sized_array() {
            let mut decayed = element_desc;
            decayed.indirections.push(false);
            return self.translate(&decayed, tc);
        }

        let element = self.translate(&element_desc, tc)?;
        let length = desc.arrays[0].clone();
        let entry = self
            .ctx
            .intern(TypeEntry::array(element.cpp_signature(), Some(length)));
        Ok(MetaType::new(entry).with_instantiations(vec![element]))
    }

    fn translate_function_type(
        &mut self,
        desc: &TypeDescriptor,
        tc: &TypeContext,
    ) -> Result<MetaType, TranslateError> {
        let key = desc.undecorated().to_string();
        let entry = match self.ctx.db.find_functional_type(&key) {
            Some(entry) => entry,
            None => {
                let mut signature = String::new();
                if let Some(ret) = &desc.function_return {
                    signature.push_str(&self.translate(ret, tc)?.cpp_signature());
                }
                signature.push('(');
                for (i, arg) in desc.arguments.iter().enumerate() {
                    if i > 0 {
                        signature.push(',');
                    }
                    signature.push_str(&self.translate(arg, tc)?.cpp_signature());
                }
                signature.push(')');
                self.ctx.intern(TypeEntry::functional(key, Some(signature)))
            }
        };
        let mut plain = desc.clone();
        plain.arrays.clear();
        Ok(decorate(MetaType::new(entry), &plain))
    }
}

fn entry_or_alias(entry: Arc<TypeEntry>) -> Lookup {
    match &entry.kind {
        TypeEntryKind::Alias { target } => Lookup::Expand {
            target: target.clone(),
            scope: None,
        },
        _ => Lookup::Entry(entry),
    }
}

fn decorate(ty: MetaType, desc: &TypeDescriptor) -> MetaType {
    let indirections = desc
        .indirections
        .iter()
        .map(|is_const| {
            if *is_const {
                Indirection::ConstPointer
            } else {
                Indirection::Pointer
            }
        })
        .collect();
    ty.with_constant(desc.is_constant)
        .with_volatile(desc.is_volatile)
        .with_reference(desc.reference)
        .with_indirections(indirections)
}
