//! Function Templates Pass - instantiate member function templates.
//!
//! ## Responsibilities
//!
//! - Look up the instantiation requests the mapping database records for
//!   each function template
//! - Fall back to the declared defaults when there are no requests and every
//!   parameter has one
//! - Bind parameters, substitute argument and return types, and add the
//!   instance to the class
//! - Warn about requests that leave a parameter unbound
//!
//! Instances are keyed by the template's qualified signature and the
//! argument hashes, so each one is built once.

use tracing::{debug, warn};

use cppmeta_core::{
    BuildWarning, ClassId, FunctionAttributes, MetaFunction, MetaTemplateParameter, MetaType,
    TranslateError, TypeHash, join_scope,
};

use crate::context::{BuildContext, TypeContext};
use crate::template::{EntryRewrites, argument_hashes, build_substitution_map, substitute_function};
use crate::type_translator::TypeTranslator;

/// Output of the function templates pass.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FunctionTemplatesOutput {
    pub instantiated: usize,
    /// Requests skipped because a parameter stayed unbound.
    pub unbound: usize,
    /// Requests whose arguments or substitution failed.
    pub failed: usize,
}

pub struct FunctionTemplatesPass<'a, 'db> {
    ctx: &'a mut BuildContext<'db>,
    output: FunctionTemplatesOutput,
}

impl<'a, 'db> FunctionTemplatesPass<'a, 'db> {
    pub fn new(ctx: &'a mut BuildContext<'db>) -> Self {
        Self {
            ctx,
            output: FunctionTemplatesOutput::default(),
        }
    }

    pub fn run(mut self) -> FunctionTemplatesOutput {
        for id in self.ctx.class_ids() {
            let class = self.ctx.class(id);
            if class.is_template() || class.template_functions.is_empty() {
                continue;
            }
            let class_name = class.qualified_name.clone();
            let templates = class.template_functions.clone();
            for template in &templates {
                self.instantiate_requested(id, &class_name, template);
            }
        }
        self.output
    }

    fn instantiate_requested(&mut self, id: ClassId, class_name: &str, template: &MetaFunction) {
        let mut requests = self.ctx.db.function_instantiations(class_name, &template.name);
        if requests.is_empty() {
            let params = &template.template_parameters;
            if !params.iter().all(MetaTemplateParameter::is_implicit) {
                debug!(class = %class_name, function = %template.name, "no instantiation requested");
                return;
            }
            requests.push(params.iter().filter_map(|p| p.default.clone()).collect());
        }
        for request in &requests {
            self.instantiate(id, class_name, template, request);
        }
    }

    fn instantiate(&mut self, id: ClassId, class_name: &str, template: &MetaFunction, request: &[String]) {
        let qualified_signature = join_scope(class_name, &template.minimal_signature());

        // 1. Bind every parameter, falling back to its default
        let mut spelled = Vec::with_capacity(template.template_parameters.len());
        for (index, param) in template.template_parameters.iter().enumerate() {
            match request.get(index).or(param.default.as_ref()) {
                Some(arg) => spelled.push(arg.clone()),
                None => {
                    self.ctx.warn(BuildWarning::UnboundTemplateParameter {
                        function: qualified_signature,
                        parameter: param.name.clone(),
                    });
                    self.output.unbound += 1;
                    return;
                }
            }
        }

        // 2. Translate where the class is declared
        let args = match self.translate_arguments(id, &spelled) {
            Ok(args) => args,
            Err(err) => {
                warn!(function = %qualified_signature, error = %err, "cannot translate function template arguments");
                self.output.failed += 1;
                return;
            }
        };

        // 3. Cache
        let key = TypeHash::from_name(&qualified_signature);
        let hashes = argument_hashes(&args);
        if self.ctx.template_cache.has_function_instance(key, &hashes) {
            return;
        }

        // 4. Substitute
        let instance = build_substitution_map(&template.name, &template.template_parameters, &args)
            .and_then(|map| substitute_function(template, &map, &EntryRewrites::default()));
        let mut instance = match instance {
            Ok(instance) => instance,
            Err(err) => {
                warn!(function = %qualified_signature, error = %err, "cannot instantiate function template");
                self.output.failed += 1;
                return;
            }
        };
        instance.template_parameters.clear();
        instance.template_origin = Some(template.minimal_signature());
        instance.attributes |= FunctionAttributes::TEMPLATE_INSTANTIATION;

        let signature = instance.minimal_signature();
        self.ctx
            .template_cache
            .cache_function_instance(key, &hashes, TypeHash::from_name(&signature));

        // 5. Register unless the class already declares the same signature
        let class = self.ctx.class_mut(id);
        if class.has_function_signature(&signature) {
            debug!(class = %class_name, signature = %signature, "instance shadowed by declared function");
            return;
        }
        debug!(class = %class_name, signature = %signature, "instantiated function template");
        class.functions.push(instance);
        self.output.instantiated += 1;
    }

    fn translate_arguments(&mut self, id: ClassId, spelled: &[String]) -> Result<Vec<MetaType>, TranslateError> {
        let tc = TypeContext::for_class(id, self.ctx.class(id));
        let mut translator = TypeTranslator::new(&mut *self.ctx);
        spelled
            .iter()
            .map(|arg| translator.translate_str(arg, &tc))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BuilderConfig;
    use crate::passes::RegistrationPass;
    use cppmeta_core::TypeEntry;
    use cppmeta_parser::{ArgumentDecl, ClassDecl, FunctionDecl, NamespaceDecl, TemplateParamDecl};
    use cppmeta_registry::TypeDatabase;

    fn variant() -> ClassDecl {
        ClassDecl::new("QVariant")
            .with_function(
                FunctionDecl::new("setValue", "void")
                    .with_template_parameter(TemplateParamDecl::new("T"))
                    .with_argument(ArgumentDecl::new("value", "const T &")),
            )
            .with_function(
                FunctionDecl::new("fill", "T *")
                    .with_template_parameter(TemplateParamDecl::new("T").with_default("int"))
                    .with_argument(ArgumentDecl::new("value", "T")),
            )
    }

    fn database() -> TypeDatabase {
        let mut db = TypeDatabase::with_builtin_primitives();
        db.add_entries([TypeEntry::value("QVariant"), TypeEntry::string("QString")])
            .unwrap();
        db
    }

    fn run(ctx: &mut BuildContext<'_>) -> FunctionTemplatesOutput {
        RegistrationPass::new(ctx).run(&[NamespaceDecl::global().with_class(variant())]);
        FunctionTemplatesPass::new(ctx).run()
    }

    #[test]
    fn instantiates_requested_arguments() {
        let mut db = database();
        db.add_function_instantiation("QVariant", "setValue", ["int"]);
        db.add_function_instantiation("QVariant", "setValue", ["QString"]);
        let mut ctx = BuildContext::new(&db, BuilderConfig::default());
        let output = run(&mut ctx);

        let class = ctx.class(ctx.find_class("QVariant").unwrap());
        let signatures: Vec<String> = class
            .functions_named("setValue")
            .map(MetaFunction::minimal_signature)
            .collect();
        assert_eq!(signatures, vec!["setValue(int)", "setValue(QString)"]);

        let instance = class.find_function("setValue").unwrap();
        assert!(instance.template_parameters.is_empty());
        assert!(!instance.contains_template_arguments());
        assert_eq!(instance.template_origin.as_deref(), Some("setValue(T)"));
        assert!(instance.attributes.contains(FunctionAttributes::TEMPLATE_INSTANTIATION));
        // 2 requested + 1 from defaults
        assert_eq!(output.instantiated, 3);
    }

    #[test]
    fn defaults_instantiate_once() {
        let db = database();
        let mut ctx = BuildContext::new(&db, BuilderConfig::default());
        run(&mut ctx);
        let again = FunctionTemplatesPass::new(&mut ctx).run();

        let class = ctx.class(ctx.find_class("QVariant").unwrap());
        let fill = class.find_function("fill").unwrap();
        assert_eq!(fill.minimal_signature(), "fill(int)");
        assert_eq!(fill.return_type().unwrap().to_string(), "int*");
        assert!(class.find_function("setValue").is_none());
        assert_eq!(again.instantiated, 0);
    }

    #[test]
    fn unbound_parameter_warns() {
        let mut db = database();
        db.add_function_instantiation("QVariant", "setValue", Vec::<String>::new());
        let mut ctx = BuildContext::new(&db, BuilderConfig::default());
        let output = run(&mut ctx);

        assert_eq!(output.unbound, 1);
        assert!(ctx.warnings.iter().any(|w| matches!(
            w,
            BuildWarning::UnboundTemplateParameter { parameter, .. } if parameter == "T"
        )));
    }

    #[test]
    fn untranslatable_argument_is_skipped() {
        let mut db = database();
        db.add_function_instantiation("QVariant", "setValue", ["QMissing"]);
        let mut ctx = BuildContext::new(&db, BuilderConfig::default());
        let output = run(&mut ctx);

        assert_eq!(output.failed, 1);
        let class = ctx.class(ctx.find_class("QVariant").unwrap());
        assert!(class.find_function("setValue").is_none());
    }
}
