//! Builder configuration.

/// Knobs for one build.
///
/// ```
/// use cppmeta_builder::BuilderConfig;
///
/// let config = BuilderConfig::default()
///     .with_fallback_namespace(None)
///     .with_enum_retry_rounds(5);
/// assert_eq!(config.enum_retry_rounds, 5);
/// assert_eq!(config.global_class_name, "Global");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuilderConfig {
    /// Scope prefix tried last when a name resolves nowhere else.
    pub fallback_namespace: Option<String>,
    /// Extra enum-value fixpoint rounds after the first full pass.
    pub enum_retry_rounds: usize,
    /// Name of the synthetic class receiving accepted global functions.
    pub global_class_name: String,
    /// Synthesize iterator classes for concrete containers.
    pub synthesize_iterators: bool,
    /// Attach free operators to the class of their first argument.
    pub promote_global_operators: bool,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            fallback_namespace: Some("Qt".to_string()),
            enum_retry_rounds: 3,
            global_class_name: "Global".to_string(),
            synthesize_iterators: true,
            promote_global_operators: true,
        }
    }
}

impl BuilderConfig {
    pub fn with_fallback_namespace(mut self, namespace: Option<String>) -> Self {
        self.fallback_namespace = namespace;
        self
    }

    pub fn with_enum_retry_rounds(mut self, rounds: usize) -> Self {
        self.enum_retry_rounds = rounds;
        self
    }

    pub fn with_global_class_name(mut self, name: impl Into<String>) -> Self {
        self.global_class_name = name.into();
        self
    }

    pub fn with_synthesize_iterators(mut self, enabled: bool) -> Self {
        self.synthesize_iterators = enabled;
        self
    }

    pub fn with_promote_global_operators(mut self, enabled: bool) -> Self {
        self.promote_global_operators = enabled;
        self
    }
}
