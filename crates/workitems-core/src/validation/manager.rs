//! Validation orchestration
//!
//! For every effective property of the snapshot, in declaration order:
//! 1. type-wide validators (completeness, immutability, value providers)
//! 2. descriptor validators, base first then stage-added
//!
//! All findings are collected; nothing short-circuits.

use super::builtin::{CompletenessValidator, ImmutableValidator, ValueProviderValidator};
use super::registry::ValidatorRegistry;
use super::{Operation, ValidationContext, Validator};
use crate::descriptor_manager::DescriptorManager;
use std::sync::Arc;
use workitems_model::{ErrorMessage, PropertyChange, WorkItem};

const SOURCE: &str = "ValidationManager";
const UNKNOWN_VALIDATOR: &str = "unknown-validator";

/// Resolves and runs the validators of a work item type
#[derive(Debug)]
pub struct ValidationManager {
    descriptors: Arc<DescriptorManager>,
    registry: ValidatorRegistry,
    type_validators: Vec<Arc<dyn Validator>>,
}

impl ValidationManager {
    /// Create manager with the built-in type-wide validators
    #[must_use]
    pub fn new(
        descriptors: Arc<DescriptorManager>,
        registry: ValidatorRegistry,
        value_provider: ValueProviderValidator,
    ) -> Self {
        Self {
            descriptors,
            registry,
            type_validators: vec![
                Arc::new(CompletenessValidator),
                Arc::new(ImmutableValidator),
                Arc::new(value_provider),
            ],
        }
    }

    /// Validator registry in use
    #[inline]
    #[must_use]
    pub fn registry(&self) -> &ValidatorRegistry {
        &self.registry
    }

    /// Validate a snapshot and the changes leading to it
    ///
    /// Unknown types have no rules and validate clean.
    pub async fn validate(
        &self,
        work_item: &WorkItem,
        changes: &[PropertyChange],
        operation: Operation,
    ) -> Vec<ErrorMessage> {
        let Some(descriptor) = self.descriptors.get_descriptor(work_item.work_item_type()) else {
            tracing::debug!(
                "No descriptor for type '{}', skipping validation",
                work_item.work_item_type()
            );
            return Vec::new();
        };

        let ctx = ValidationContext::new(work_item, changes, operation);
        let mut errors = Vec::new();

        for property in descriptor.effective_properties(work_item) {
            for validator in &self.type_validators {
                errors.extend(validator.validate(&property, &ctx).await);
            }

            for validator_descriptor in &property.validators {
                match self.registry.resolve(validator_descriptor) {
                    Some(validator) => errors.extend(validator.validate(&property, &ctx).await),
                    None => {
                        tracing::warn!(
                            "Unresolvable validator '{}' on property '{}'",
                            validator_descriptor.kind(),
                            property.name
                        );
                        errors.push(ctx.error(
                            SOURCE,
                            UNKNOWN_VALIDATOR,
                            format!(
                                "The validator '{}' of property '{}' cannot be resolved.",
                                validator_descriptor.kind(),
                                property.name
                            ),
                            &property.name,
                        ));
                    }
                }
            }
        }

        if !errors.is_empty() {
            tracing::debug!(
                "Validation of {}/{} found {} problems",
                work_item.project_code(),
                work_item.id(),
                errors.len()
            );
        }
        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{InMemoryDescriptorProvider, NoExternalValues};
    use pretty_assertions::assert_eq;
    use std::collections::BTreeMap;
    use workitems_model::{
        ConditionDescriptor, LogDescriptor, Property, PropertyDescriptor, StageDescriptor,
        StagePropertyDescriptor, ValidatorDescriptor, WorkItemDescriptor,
    };

    async fn manager(descriptors: Vec<WorkItemDescriptor>) -> ValidationManager {
        let descriptors = Arc::new(DescriptorManager::new(Arc::new(
            InMemoryDescriptorProvider::new(descriptors),
        )));
        descriptors.load_all().await.unwrap();
        ValidationManager::new(
            descriptors,
            ValidatorRegistry::with_defaults(),
            ValueProviderValidator::new(Arc::new(NoExternalValues)),
        )
    }

    fn sources(errors: &[ErrorMessage]) -> Vec<(&str, &str)> {
        errors
            .iter()
            .map(|e| (e.source.as_str(), e.property.as_str()))
            .collect()
    }

    #[tokio::test]
    async fn unknown_type_validates_clean() {
        let manager = manager(vec![]).await;
        let wi = WorkItem::new("FOO", "1", "BAR", Vec::new(), Vec::new());

        assert!(manager.validate(&wi, &[], Operation::Create).await.is_empty());
    }

    #[tokio::test]
    async fn errors_in_property_then_validator_order() {
        let descriptor = WorkItemDescriptor::with_properties(
            "BAR",
            vec![
                PropertyDescriptor::new("A", "String")
                    .with_validator(ValidatorDescriptor::StringLength { min: 5, max: 10 }),
                PropertyDescriptor::new("B", "String").editable(false),
                PropertyDescriptor::new("C", "String"),
            ],
        );
        let manager = manager(vec![descriptor]).await;

        let wi = WorkItem::new(
            "FOO",
            "1",
            "BAR",
            vec![Property::new("A", "String", "ab"), Property::new("B", "String", "new")],
            Vec::new(),
        );
        let changes = vec![PropertyChange::new("B", "old", "new")];

        let errors = manager.validate(&wi, &changes, Operation::Update).await;
        assert_eq!(
            sources(&errors),
            vec![
                ("StringLengthValidator", "A"),
                ("ImmutableValidator", "B"),
                ("CompletenessValidator", "C"),
            ]
        );
    }

    #[tokio::test]
    async fn unknown_validator_kind_is_reported() {
        let descriptor = WorkItemDescriptor::with_properties(
            "BAR",
            vec![PropertyDescriptor::new("A", "String").with_validator(
                ValidatorDescriptor::Custom {
                    kind: "regex".to_string(),
                    settings: BTreeMap::new(),
                },
            )],
        );
        let manager = manager(vec![descriptor]).await;
        let wi =
            WorkItem::new("FOO", "1", "BAR", vec![Property::new("A", "String", "x")], Vec::new());

        let errors = manager.validate(&wi, &[], Operation::Create).await;
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].source, "ValidationManager");
        assert_eq!(errors[0].error_code, "unknown-validator");
    }

    #[tokio::test]
    async fn custom_mandatory_kind_reports_once() {
        let descriptor = WorkItemDescriptor::with_properties(
            "BAR",
            vec![PropertyDescriptor::new("A", "String")
                .required()
                .with_validator(ValidatorDescriptor::Custom {
                    kind: "mandatory".to_string(),
                    settings: BTreeMap::new(),
                })],
        );
        let manager = manager(vec![descriptor]).await;
        let wi =
            WorkItem::new("FOO", "1", "BAR", vec![Property::new("A", "String", "")], Vec::new());

        let errors = manager.validate(&wi, &[], Operation::Create).await;
        assert_eq!(sources(&errors), vec![("MandatoryValidator", "A")]);
    }

    #[tokio::test]
    async fn stage_validators_and_editability_apply() {
        let descriptor = WorkItemDescriptor::new(
            "BAR",
            LogDescriptor::default(),
            vec![
                PropertyDescriptor::new("State", "String"),
                PropertyDescriptor::new("Owner", "String"),
            ],
            vec![StageDescriptor::new(
                "stage-Done",
                ConditionDescriptor::property_value("State", "Done"),
                vec![
                    StagePropertyDescriptor::new("Owner")
                        .with_validator(ValidatorDescriptor::Mandatory),
                    StagePropertyDescriptor::new("State").editable(false),
                ],
                vec![],
            )],
        );
        let manager = manager(vec![descriptor]).await;

        let wi = WorkItem::new(
            "FOO",
            "1",
            "BAR",
            vec![Property::new("State", "String", "Done"), Property::new("Owner", "String", "")],
            Vec::new(),
        );
        let changes = vec![PropertyChange::new("State", "Open", "Done")];

        let errors = manager.validate(&wi, &changes, Operation::Update).await;
        assert_eq!(
            sources(&errors),
            vec![("ImmutableValidator", "State"), ("MandatoryValidator", "Owner")]
        );

        let open = WorkItem::new(
            "FOO",
            "1",
            "BAR",
            vec![Property::new("State", "String", "Open"), Property::new("Owner", "String", "")],
            Vec::new(),
        );
        let changes = vec![PropertyChange::new("State", "Done", "Open")];
        assert!(manager.validate(&open, &changes, Operation::Update).await.is_empty());
    }
}
