//! Built-in validators
//!
//! Type-wide (run for every declared property):
//! - [`CompletenessValidator`]
//! - [`ImmutableValidator`]
//! - [`ValueProviderValidator`]
//!
//! Descriptor-attached (resolved through the registry):
//! - [`MandatoryValidator`]
//! - [`StringLengthValidator`]

use super::{Operation, ValidationContext, Validator};
use crate::provider::ValueResolver;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use workitems_model::{
    is_blank, split_values, ErrorMessage, PropertyDescriptor, ValueProviderDescriptor,
};

/// Error code of a value list that could not be resolved
pub(crate) const VALUE_PROVIDER_UNAVAILABLE: &str = "value-provider-unavailable";

/// Every declared property must be present; required ones must be non-blank
///
/// Properties carrying an explicit mandatory validator are left to it.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompletenessValidator;

#[async_trait]
impl Validator for CompletenessValidator {
    fn name(&self) -> &str {
        "CompletenessValidator"
    }

    async fn validate(
        &self,
        property: &PropertyDescriptor,
        ctx: &ValidationContext<'_>,
    ) -> Vec<ErrorMessage> {
        if property.has_mandatory_validator() {
            return Vec::new();
        }

        match ctx.work_item.value(&property.name) {
            None => vec![ctx.error(
                self.name(),
                "",
                format!("The property '{}' is missing on the work item.", property.name),
                &property.name,
            )],
            Some(value) if property.is_required && is_blank(value) => vec![ctx.error(
                self.name(),
                "",
                format!("The property '{}' must be set.", property.name),
                &property.name,
            )],
            Some(_) => Vec::new(),
        }
    }
}

/// Non-editable properties must not change
///
/// On create every change starts from nothing and is exempt, as is the
/// mutation performed by a workflow command.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImmutableValidator;

#[async_trait]
impl Validator for ImmutableValidator {
    fn name(&self) -> &str {
        "ImmutableValidator"
    }

    async fn validate(
        &self,
        property: &PropertyDescriptor,
        ctx: &ValidationContext<'_>,
    ) -> Vec<ErrorMessage> {
        if property.is_editable {
            return Vec::new();
        }

        let Some(change) = ctx.change_for(&property.name).filter(|c| c.is_effective()) else {
            return Vec::new();
        };

        let exempt = match ctx.operation {
            Operation::Create => change.old_value.is_empty(),
            Operation::Command => true,
            Operation::Update => false,
        };
        if exempt {
            return Vec::new();
        }

        vec![ctx.error(
            self.name(),
            "",
            format!("The property '{}' cannot be changed.", property.name),
            &property.name,
        )]
    }
}

/// Changed values must belong to the property's legal value set
///
/// Inline enumerations are checked directly; other value providers are
/// resolved through the [`ValueResolver`] collaborator. Blank values are
/// not checked.
#[derive(Clone)]
pub struct ValueProviderValidator {
    resolver: Arc<dyn ValueResolver>,
    timeout: Option<Duration>,
}

impl ValueProviderValidator {
    /// Create validator over a resolver
    #[inline]
    #[must_use]
    pub fn new(resolver: Arc<dyn ValueResolver>) -> Self {
        Self {
            resolver,
            timeout: None,
        }
    }

    /// Limit each resolver call
    #[inline]
    #[must_use]
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    async fn legal_values(
        &self,
        project_code: &str,
        provider: &ValueProviderDescriptor,
    ) -> Result<Vec<String>, String> {
        if let ValueProviderDescriptor::Enum { values } = provider {
            return Ok(values.iter().map(|v| v.value.clone()).collect());
        }

        let call = self.resolver.resolve(project_code, provider);
        let result = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .map_err(|_| format!("timed out after {}ms", limit.as_millis()))?,
            None => call.await,
        };
        result.map_err(|e| e.to_string())
    }
}

impl fmt::Debug for ValueProviderValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValueProviderValidator")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Validator for ValueProviderValidator {
    fn name(&self) -> &str {
        "ValueProviderValidator"
    }

    async fn validate(
        &self,
        property: &PropertyDescriptor,
        ctx: &ValidationContext<'_>,
    ) -> Vec<ErrorMessage> {
        let Some(provider) = &property.value_provider else {
            return Vec::new();
        };
        let Some(change) = ctx.change_for(&property.name) else {
            return Vec::new();
        };
        if is_blank(&change.new_value) {
            return Vec::new();
        }

        let legal = match self
            .legal_values(ctx.work_item.project_code(), provider)
            .await
        {
            Ok(values) => values,
            Err(reason) => {
                tracing::warn!(
                    "Could not resolve legal values of '{}': {}",
                    property.name,
                    reason
                );
                return vec![ctx.error(
                    self.name(),
                    VALUE_PROVIDER_UNAVAILABLE,
                    format!(
                        "The legal values of property '{}' could not be resolved: {}",
                        property.name, reason
                    ),
                    &property.name,
                )];
            }
        };

        let candidates: Vec<&str> = if property.is_multiple() {
            split_values(&change.new_value).collect()
        } else {
            vec![change.new_value.as_str()]
        };

        candidates
            .into_iter()
            .filter(|candidate| !legal.iter().any(|v| v == candidate))
            .map(|candidate| {
                ctx.error(
                    self.name(),
                    "",
                    format!(
                        "The value '{}' is not allowed for property '{}'.",
                        candidate, property.name
                    ),
                    &property.name,
                )
            })
            .collect()
    }
}

/// The final value must not be blank
#[derive(Debug, Clone, Copy, Default)]
pub struct MandatoryValidator;

#[async_trait]
impl Validator for MandatoryValidator {
    fn name(&self) -> &str {
        "MandatoryValidator"
    }

    async fn validate(
        &self,
        property: &PropertyDescriptor,
        ctx: &ValidationContext<'_>,
    ) -> Vec<ErrorMessage> {
        if ctx.work_item.value(&property.name).is_some_and(|v| !is_blank(v)) {
            return Vec::new();
        }

        vec![ctx.error(
            self.name(),
            "",
            format!("The property '{}' is mandatory.", property.name),
            &property.name,
        )]
    }
}

/// The final value has between `min` and `max` characters (inclusive)
///
/// Blank values pass; requiring a value is the mandatory validator's job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StringLengthValidator {
    min: usize,
    max: usize,
}

impl StringLengthValidator {
    /// Create validator for `min..=max`
    #[inline]
    #[must_use]
    pub fn new(min: usize, max: usize) -> Self {
        Self { min, max }
    }

    /// Inclusive lower bound
    #[inline]
    #[must_use]
    pub fn min(&self) -> usize {
        self.min
    }

    /// Inclusive upper bound
    #[inline]
    #[must_use]
    pub fn max(&self) -> usize {
        self.max
    }
}

#[async_trait]
impl Validator for StringLengthValidator {
    fn name(&self) -> &str {
        "StringLengthValidator"
    }

    async fn validate(
        &self,
        property: &PropertyDescriptor,
        ctx: &ValidationContext<'_>,
    ) -> Vec<ErrorMessage> {
        let Some(value) = ctx.work_item.value(&property.name).filter(|v| !is_blank(v)) else {
            return Vec::new();
        };

        let length = value.chars().count();
        if (self.min..=self.max).contains(&length) {
            return Vec::new();
        }

        vec![ctx.error(
            self.name(),
            "",
            format!(
                "The value of property '{}' must be between {} and {} characters long (was {}).",
                property.name, self.min, self.max, length
            ),
            &property.name,
        )]
    }
}
