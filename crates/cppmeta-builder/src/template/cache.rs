//! Template instance cache.
//!
//! Each instance is keyed by [`TypeHash::from_template_instance`] over the
//! template and its argument spellings. A second request for the same key
//! gets the first result back.

use cppmeta_core::{ClassId, MetaType, TypeHash};
use rustc_hash::FxHashMap;

/// Hashes of instantiation arguments, by canonical spelling.
pub fn argument_hashes(args: &[MetaType]) -> Vec<TypeHash> {
    args.iter()
        .map(|arg| TypeHash::from_name(&arg.cpp_signature()))
        .collect()
}

#[derive(Debug, Default, Clone)]
pub struct TemplateInstanceCache {
    /// Instance key -> instance class
    class_instances: FxHashMap<TypeHash, ClassId>,
    /// Instance key -> signature hash of the instantiated function
    function_instances: FxHashMap<TypeHash, TypeHash>,
}

impl TemplateInstanceCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cache_class_instance(&mut self, template: TypeHash, args: &[TypeHash], instance: ClassId) {
        self.class_instances
            .insert(TypeHash::from_template_instance(template, args), instance);
    }

    pub fn get_class_instance(&self, template: TypeHash, args: &[TypeHash]) -> Option<ClassId> {
        self.class_instances
            .get(&TypeHash::from_template_instance(template, args))
            .copied()
    }

    pub fn cache_function_instance(&mut self, template: TypeHash, args: &[TypeHash], signature: TypeHash) {
        self.function_instances
            .insert(TypeHash::from_template_instance(template, args), signature);
    }

    pub fn has_function_instance(&self, template: TypeHash, args: &[TypeHash]) -> bool {
        self.function_instances
            .contains_key(&TypeHash::from_template_instance(template, args))
    }

    pub fn class_instance_count(&self) -> usize {
        self.class_instances.len()
    }

    pub fn function_instance_count(&self) -> usize {
        self.function_instances.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cppmeta_core::TypeEntry;
    use std::sync::Arc;

    #[test]
    fn class_instances_keyed_by_argument_spelling() {
        let mut cache = TemplateInstanceCache::new();
        let template = TypeHash::from_name("Box");
        let int32 = MetaType::new(Arc::new(TypeEntry::primitive("Int32")));
        let args = argument_hashes(&[int32.clone()]);

        assert_eq!(cache.get_class_instance(template, &args), None);
        cache.cache_class_instance(template, &args, ClassId(7));
        assert_eq!(
            cache.get_class_instance(template, &argument_hashes(&[int32])),
            Some(ClassId(7))
        );
        assert_eq!(cache.class_instance_count(), 1);
    }

    #[test]
    fn function_instances_are_distinct_per_arguments() {
        let mut cache = TemplateInstanceCache::new();
        let template = TypeHash::from_name("Foo::convert(T)");
        let int = TypeHash::from_name("int");
        let double = TypeHash::from_name("double");

        cache.cache_function_instance(template, &[int], TypeHash::from_name("convert(int)"));
        assert!(cache.has_function_instance(template, &[int]));
        assert!(!cache.has_function_instance(template, &[double]));
        assert_eq!(cache.function_instance_count(), 1);
    }
}
