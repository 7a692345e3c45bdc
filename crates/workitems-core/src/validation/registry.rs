//! Validator registry
//!
//! Maps validator descriptor kinds to factories. Built-in kinds:
//! - `mandatory`
//! - `string_length` (also accepted as a custom kind with `min`/`max`
//!   settings)

use super::builtin::{MandatoryValidator, StringLengthValidator};
use super::Validator;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use workitems_model::descriptor::MANDATORY_KIND;
use workitems_model::ValidatorDescriptor;

/// Builds a validator from its descriptor, `None` if the descriptor is unusable
pub type ValidatorFactory =
    Arc<dyn Fn(&ValidatorDescriptor) -> Option<Arc<dyn Validator>> + Send + Sync>;

/// Registry of validator factories keyed by descriptor kind
#[derive(Clone, Default)]
pub struct ValidatorRegistry {
    factories: HashMap<String, ValidatorFactory>,
}

impl ValidatorRegistry {
    /// Create empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Create registry with built-in validators
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();

        let mandatory: Arc<dyn Validator> = Arc::new(MandatoryValidator);
        registry.register(MANDATORY_KIND, move |_| Some(Arc::clone(&mandatory)));
        registry.register("string_length", string_length);
        registry
    }

    /// Register (or replace) the factory of a kind
    pub fn register<F>(&mut self, kind: impl Into<String>, factory: F)
    where
        F: Fn(&ValidatorDescriptor) -> Option<Arc<dyn Validator>> + Send + Sync + 'static,
    {
        self.factories.insert(kind.into(), Arc::new(factory));
    }

    /// Check if a kind is registered
    #[inline]
    #[must_use]
    pub fn contains(&self, kind: &str) -> bool {
        self.factories.contains_key(kind)
    }

    /// Build the validator for a descriptor
    ///
    /// `None` if the kind is unknown or its factory rejects the descriptor.
    #[must_use]
    pub fn resolve(&self, descriptor: &ValidatorDescriptor) -> Option<Arc<dyn Validator>> {
        let factory = self.factories.get(descriptor.kind())?;
        factory(descriptor)
    }

    /// Registered kinds, sorted
    #[must_use]
    pub fn kinds(&self) -> Vec<&str> {
        let mut kinds: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        kinds.sort_unstable();
        kinds
    }
}

impl fmt::Debug for ValidatorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidatorRegistry")
            .field("kinds", &self.kinds())
            .finish()
    }
}

fn string_length(descriptor: &ValidatorDescriptor) -> Option<Arc<dyn Validator>> {
    let (min, max) = match descriptor {
        ValidatorDescriptor::StringLength { min, max } => (*min, *max),
        ValidatorDescriptor::Custom { settings, .. } => {
            let min = match settings.get("min") {
                Some(raw) => raw.trim().parse().ok()?,
                None => 0,
            };
            let max = match settings.get("max") {
                Some(raw) => raw.trim().parse().ok()?,
                None => usize::MAX,
            };
            (min, max)
        }
        ValidatorDescriptor::Mandatory => return None,
    };

    if min > max {
        tracing::warn!("Rejecting string length validator with min {} > max {}", min, max);
        return None;
    }
    Some(Arc::new(StringLengthValidator::new(min, max)))
}
