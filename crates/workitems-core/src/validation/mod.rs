//! Validation pipeline
//!
//! Provides:
//! - [`Validator`]: one pluggable rule over a snapshot and its change set
//! - Built-in validators (completeness, immutability, value providers,
//!   mandatory, string length)
//! - [`ValidatorRegistry`]: validator descriptor kind → implementation
//! - [`ValidationManager`]: resolves and runs validators deterministically

use async_trait::async_trait;
use std::fmt::Debug;
use workitems_model::{ErrorMessage, PropertyChange, PropertyDescriptor, WorkItem};

mod builtin;
mod manager;
mod registry;

pub use builtin::{
    CompletenessValidator, ImmutableValidator, MandatoryValidator, StringLengthValidator,
    ValueProviderValidator,
};
pub use manager::ValidationManager;
pub use registry::{ValidatorFactory, ValidatorRegistry};

/// Kind of mutation being validated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// First save of a new item
    Create,
    /// Property update of a persisted item
    Update,
    /// Workflow command applied to a persisted item
    Command,
}

/// Input of a validation pass
#[derive(Debug, Clone, Copy)]
pub struct ValidationContext<'a> {
    /// Snapshot being validated (post-change)
    pub work_item: &'a WorkItem,
    /// Changes leading to the snapshot
    pub changes: &'a [PropertyChange],
    /// Kind of mutation
    pub operation: Operation,
}

impl<'a> ValidationContext<'a> {
    /// Create context
    #[inline]
    #[must_use]
    pub fn new(
        work_item: &'a WorkItem,
        changes: &'a [PropertyChange],
        operation: Operation,
    ) -> Self {
        Self {
            work_item,
            changes,
            operation,
        }
    }

    /// Change recorded for a property, if any
    #[inline]
    #[must_use]
    pub fn change_for(&self, property: &str) -> Option<&'a PropertyChange> {
        self.changes.iter().find(|c| c.name == property)
    }

    /// Error message scoped to a property of the validated item
    #[must_use]
    pub fn error(
        &self,
        source: &str,
        error_code: &str,
        message: impl Into<String>,
        property: &str,
    ) -> ErrorMessage {
        ErrorMessage::new(
            source,
            error_code,
            message,
            self.work_item.project_code(),
            self.work_item.id(),
            property,
        )
    }
}

/// One validation rule
///
/// A validator inspects one property of the snapshot and returns every
/// problem it finds; an empty list means the property passes this rule.
#[async_trait]
pub trait Validator: Send + Sync + Debug {
    /// Name reported as the error message source
    fn name(&self) -> &str;

    /// Validate `property` of the snapshot in `ctx`
    async fn validate(
        &self,
        property: &PropertyDescriptor,
        ctx: &ValidationContext<'_>,
    ) -> Vec<ErrorMessage>;
}
