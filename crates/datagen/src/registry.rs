//! Resolution of a configured task name to a generation step constructor.

use crate::error::GenerationError;
use crate::generator::SchemaDataGenerator;
use crate::task::DataGenerationTask;
use staging_core::{SubtaskOptions, TaskContext};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Name the built-in schema generator is registered under.
pub const SCHEMA_GENERATOR: &str = "schema";

/// Builds a generation step for one batch.
pub type GeneratorConstructor =
    Arc<dyn Fn(TaskContext, SubtaskOptions) -> Box<dyn DataGenerationTask> + Send + Sync>;

/// Registry of generation step constructors keyed by task name.
#[derive(Clone, Default)]
pub struct GeneratorRegistry {
    constructors: HashMap<String, GeneratorConstructor>,
}

fn schema_generator(context: TaskContext, options: SubtaskOptions) -> Box<dyn DataGenerationTask> {
    Box::new(SchemaDataGenerator::new(context, options))
}

impl GeneratorRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the built-in generators.
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.register(SCHEMA_GENERATOR, schema_generator);
        registry.register("datagen::SchemaDataGenerator", schema_generator);
        registry
    }

    /// Register a constructor under `name`, replacing any previous one.
    pub fn register<F>(&mut self, name: impl Into<String>, constructor: F)
    where
        F: Fn(TaskContext, SubtaskOptions) -> Box<dyn DataGenerationTask> + Send + Sync + 'static,
    {
        self.constructors.insert(name.into(), Arc::new(constructor));
    }

    /// Look up the constructor registered under `name`.
    pub fn resolve(&self, name: &str) -> Result<GeneratorConstructor, GenerationError> {
        self.constructors
            .get(name)
            .cloned()
            .ok_or_else(|| GenerationError::UnknownTask {
                name: name.to_string(),
                known: self.names().join(", "),
            })
    }

    /// Registered task names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.constructors.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for GeneratorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeneratorRegistry")
            .field("names", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::GenerationMetrics;
    use async_trait::async_trait;

    struct NoopGenerator;

    #[async_trait]
    impl DataGenerationTask for NoopGenerator {
        async fn run(&mut self) -> Result<GenerationMetrics, GenerationError> {
            Ok(GenerationMetrics::default())
        }
    }

    #[test]
    fn test_builtin_names() {
        let registry = GeneratorRegistry::with_builtin();
        assert_eq!(
            registry.names(),
            vec!["datagen::SchemaDataGenerator", SCHEMA_GENERATOR]
        );
        assert!(registry.resolve(SCHEMA_GENERATOR).is_ok());
    }

    #[test]
    fn test_unknown_task() {
        let registry = GeneratorRegistry::with_builtin();
        let result = registry.resolve("snowfakery");
        match result {
            Err(GenerationError::UnknownTask { name, known }) => {
                assert_eq!(name, "snowfakery");
                assert!(known.contains(SCHEMA_GENERATOR));
            }
            _ => panic!("Expected UnknownTask"),
        }
    }

    #[test]
    fn test_register_custom() {
        let mut registry = GeneratorRegistry::new();
        registry.register("noop", |_, _| Box::new(NoopGenerator));

        assert_eq!(registry.names(), vec!["noop"]);
        assert!(registry.resolve("noop").is_ok());
    }
}
