//! Descriptor model
//!
//! Describes the shape of a work item type at runtime:
//! - [`PropertyDescriptor`]: one declared property and its rules
//! - [`StageDescriptor`]: a workflow stage, its overrides and commands
//! - [`WorkItemDescriptor`]: everything known about one type
//!
//! Descriptors are loaded once and never mutated afterwards.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

fn default_true() -> bool {
    true
}

/// Arity of a property value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyType {
    /// Exactly one value
    #[default]
    SingleValue,
    /// Separator-delimited list of values
    MultipleValue,
}

/// Declared property of a work item type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyDescriptor {
    /// Property name, unique within a type
    pub name: String,
    /// Data type tag (a label, e.g. `"String"`)
    pub data_type: String,
    /// Single or multiple value
    #[serde(default)]
    pub property_type: PropertyType,
    /// Whether the value may change after creation
    #[serde(default = "default_true")]
    pub is_editable: bool,
    /// Whether a blank value makes the item incomplete
    #[serde(default)]
    pub is_required: bool,
    /// Value used when building a template
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_value: Option<String>,
    /// Source of legal values
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_provider: Option<ValueProviderDescriptor>,
    /// Validators attached to this property, in order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub validators: Vec<ValidatorDescriptor>,
}

impl PropertyDescriptor {
    /// Create an editable, optional, single value property
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            property_type: PropertyType::SingleValue,
            is_editable: true,
            is_required: false,
            initial_value: None,
            value_provider: None,
            validators: Vec::new(),
        }
    }

    /// With property arity
    #[inline]
    #[must_use]
    pub fn with_property_type(mut self, property_type: PropertyType) -> Self {
        self.property_type = property_type;
        self
    }

    /// With editability flag
    #[inline]
    #[must_use]
    pub fn editable(mut self, is_editable: bool) -> Self {
        self.is_editable = is_editable;
        self
    }

    /// Mark as required for completeness
    #[inline]
    #[must_use]
    pub fn required(mut self) -> Self {
        self.is_required = true;
        self
    }

    /// With template value
    #[inline]
    #[must_use]
    pub fn with_initial_value(mut self, value: impl Into<String>) -> Self {
        self.initial_value = Some(value.into());
        self
    }

    /// With value provider
    #[inline]
    #[must_use]
    pub fn with_value_provider(mut self, provider: ValueProviderDescriptor) -> Self {
        self.value_provider = Some(provider);
        self
    }

    /// Append a validator
    #[inline]
    #[must_use]
    pub fn with_validator(mut self, validator: ValidatorDescriptor) -> Self {
        self.validators.push(validator);
        self
    }

    /// Whether an explicit mandatory validator is attached
    #[must_use]
    pub fn has_mandatory_validator(&self) -> bool {
        self.validators
            .iter()
            .any(|v| v.kind() == MANDATORY_KIND)
    }

    /// Whether the property holds a list of values
    #[inline]
    #[must_use]
    pub fn is_multiple(&self) -> bool {
        self.property_type == PropertyType::MultipleValue
    }
}

/// Registry kind of [`ValidatorDescriptor::Mandatory`]
pub const MANDATORY_KIND: &str = "mandatory";

/// Validator attached to a property
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ValidatorDescriptor {
    /// Value must not be blank
    Mandatory,
    /// Value length (in characters) within `min..=max`
    StringLength {
        /// Inclusive lower bound
        min: usize,
        /// Inclusive upper bound
        max: usize,
    },
    /// Validator resolved by kind through the registry
    Custom {
        /// Registry key
        kind: String,
        /// Free-form settings handed to the factory
        #[serde(default)]
        settings: BTreeMap<String, String>,
    },
}

impl ValidatorDescriptor {
    /// Registry key for this descriptor
    #[must_use]
    pub fn kind(&self) -> &str {
        match self {
            Self::Mandatory => MANDATORY_KIND,
            Self::StringLength { .. } => "string_length",
            Self::Custom { kind, .. } => kind,
        }
    }
}

/// One legal value of an enumeration
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnumValue {
    /// Stored value
    pub value: String,
    /// Human-facing label
    pub display_text: String,
}

impl EnumValue {
    /// Create enum value
    #[inline]
    #[must_use]
    pub fn new(value: impl Into<String>, display_text: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            display_text: display_text.into(),
        }
    }
}

/// Source of legal values for a property
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ValueProviderDescriptor {
    /// Fixed list declared inline
    Enum {
        /// Legal values
        values: Vec<EnumValue>,
    },
    /// Named collection of the owning project (labels, milestones, ...)
    ProjectCollection {
        /// Collection name
        collection: String,
    },
    /// Users of the owning project, optionally narrowed by role
    ProjectUsers {
        /// Role filter, empty for all users
        #[serde(default)]
        role: String,
    },
}

impl ValueProviderDescriptor {
    /// Fixed enumeration from `(value, display_text)` pairs
    #[must_use]
    pub fn enumeration<I, V, D>(values: I) -> Self
    where
        I: IntoIterator<Item = (V, D)>,
        V: Into<String>,
        D: Into<String>,
    {
        Self::Enum {
            values: values
                .into_iter()
                .map(|(v, d)| EnumValue::new(v, d))
                .collect(),
        }
    }

    /// Whether resolution needs an external collaborator
    #[inline]
    #[must_use]
    pub fn is_external(&self) -> bool {
        !matches!(self, Self::Enum { .. })
    }
}

/// Declared log entry type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntryTypeDescriptor {
    /// Entry type name
    pub name: String,
}

impl LogEntryTypeDescriptor {
    /// Create entry type
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Logging rules of a work item type
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LogDescriptor {
    /// Whether every change must be logged
    #[serde(default)]
    pub is_mandatory: bool,
    /// Allowed log entry types
    #[serde(default)]
    pub entry_types: Vec<LogEntryTypeDescriptor>,
}

impl LogDescriptor {
    /// Create log descriptor
    #[inline]
    #[must_use]
    pub fn new(is_mandatory: bool, entry_types: Vec<LogEntryTypeDescriptor>) -> Self {
        Self {
            is_mandatory,
            entry_types,
        }
    }
}

/// Predicate over the property values of a work item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConditionDescriptor {
    /// Property equals the given value
    PropertyValue {
        /// Property name
        property: String,
        /// Expected value
        value: String,
    },
    /// Every nested condition holds
    All {
        /// Nested conditions
        conditions: Vec<ConditionDescriptor>,
    },
    /// At least one nested condition holds
    Any {
        /// Nested conditions
        conditions: Vec<ConditionDescriptor>,
    },
    /// Nested condition does not hold
    Not {
        /// Negated condition
        condition: Box<ConditionDescriptor>,
    },
}

impl ConditionDescriptor {
    /// `property == value`
    #[inline]
    #[must_use]
    pub fn property_value(property: impl Into<String>, value: impl Into<String>) -> Self {
        Self::PropertyValue {
            property: property.into(),
            value: value.into(),
        }
    }
}

/// Per-stage narrowing of a property descriptor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StagePropertyDescriptor {
    /// Name of the overridden property
    pub name: String,
    /// Editability while in the stage; can only narrow the base flag
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_editable: Option<bool>,
    /// Validators added while in the stage
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub validators: Vec<ValidatorDescriptor>,
}

impl StagePropertyDescriptor {
    /// Override with no effect yet
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_editable: None,
            validators: Vec::new(),
        }
    }

    /// With editability override
    #[inline]
    #[must_use]
    pub fn editable(mut self, is_editable: bool) -> Self {
        self.is_editable = Some(is_editable);
        self
    }

    /// Append a stage validator
    #[inline]
    #[must_use]
    pub fn with_validator(mut self, validator: ValidatorDescriptor) -> Self {
        self.validators.push(validator);
        self
    }
}

/// Named operation available while in a stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CommandDescriptor {
    /// Set a property to a fixed value
    ChangePropertyValue {
        /// Command name
        name: String,
        /// Human-facing label
        label: String,
        /// Target property
        property: String,
        /// Value assigned by the command
        value: String,
    },
}

impl CommandDescriptor {
    /// Command setting `property` to `value`
    #[must_use]
    pub fn change_property_value(
        name: impl Into<String>,
        label: impl Into<String>,
        property: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self::ChangePropertyValue {
            name: name.into(),
            label: label.into(),
            property: property.into(),
            value: value.into(),
        }
    }

    /// Command name
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::ChangePropertyValue { name, .. } => name,
        }
    }

    /// Human-facing label
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::ChangePropertyValue { label, .. } => label,
        }
    }
}

/// Workflow stage of a work item type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageDescriptor {
    /// Stage identifier
    pub id: String,
    /// Whether an item is currently in this stage
    pub condition: ConditionDescriptor,
    /// Property overrides while in the stage
    #[serde(default)]
    pub properties: Vec<StagePropertyDescriptor>,
    /// Commands offered while in the stage
    #[serde(default)]
    pub commands: Vec<CommandDescriptor>,
}

impl StageDescriptor {
    /// Create stage
    #[inline]
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        condition: ConditionDescriptor,
        properties: Vec<StagePropertyDescriptor>,
        commands: Vec<CommandDescriptor>,
    ) -> Self {
        Self {
            id: id.into(),
            condition,
            properties,
            commands,
        }
    }
}

/// Complete schema of one work item type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkItemDescriptor {
    /// Work item type name
    pub name: String,
    /// Logging rules
    #[serde(default)]
    pub log: LogDescriptor,
    /// Declared properties, in order
    #[serde(default)]
    pub properties: Vec<PropertyDescriptor>,
    /// Workflow stages, in order
    #[serde(default)]
    pub stages: Vec<StageDescriptor>,
}

impl WorkItemDescriptor {
    /// Create descriptor
    #[inline]
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        log: LogDescriptor,
        properties: Vec<PropertyDescriptor>,
        stages: Vec<StageDescriptor>,
    ) -> Self {
        Self {
            name: name.into(),
            log,
            properties,
            stages,
        }
    }

    /// Descriptor with properties only
    #[inline]
    #[must_use]
    pub fn with_properties(name: impl Into<String>, properties: Vec<PropertyDescriptor>) -> Self {
        Self::new(name, LogDescriptor::default(), properties, Vec::new())
    }

    /// Look up a property descriptor by name
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&PropertyDescriptor> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// Look up a stage by id
    #[must_use]
    pub fn stage(&self, id: &str) -> Option<&StageDescriptor> {
        self.stages.iter().find(|s| s.id == id)
    }

    /// First property name declared more than once
    #[must_use]
    pub fn duplicate_property(&self) -> Option<&str> {
        self.properties.iter().enumerate().find_map(|(i, p)| {
            self.properties[..i]
                .iter()
                .any(|earlier| earlier.name == p.name)
                .then_some(p.name.as_str())
        })
    }
}
