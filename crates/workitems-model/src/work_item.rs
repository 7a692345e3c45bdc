//! Work item records
//!
//! A [`WorkItem`] is an immutable snapshot. Every mutation builds a new
//! value; nothing is patched in place.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Value of an unset property
pub const EMPTY_VALUE: &str = "";

/// Separator between the values of a multiple value property
pub const MULTI_VALUE_SEPARATOR: char = ',';

/// Split a multiple value property into its non-empty, trimmed parts
pub fn split_values(value: &str) -> impl Iterator<Item = &str> {
    value
        .split(MULTI_VALUE_SEPARATOR)
        .map(str::trim)
        .filter(|part| !part.is_empty())
}

/// Whether a value counts as unset
#[inline]
#[must_use]
pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Named, typed property value
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Property {
    /// Property name
    pub name: String,
    /// Data type tag
    pub data_type: String,
    /// String encoded value
    pub value: String,
}

impl Property {
    /// Create property
    #[inline]
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        data_type: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            value: value.into(),
        }
    }

    /// Same property carrying another value
    #[inline]
    #[must_use]
    pub fn with_value(&self, value: impl Into<String>) -> Self {
        Self {
            name: self.name.clone(),
            data_type: self.data_type.clone(),
            value: value.into(),
        }
    }
}

/// Delta of a single property
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PropertyChange {
    /// Property name
    pub name: String,
    /// Value before the change
    pub old_value: String,
    /// Value after the change
    pub new_value: String,
}

impl PropertyChange {
    /// Create change
    #[inline]
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        old_value: impl Into<String>,
        new_value: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            old_value: old_value.into(),
            new_value: new_value.into(),
        }
    }

    /// Whether the values actually differ
    #[inline]
    #[must_use]
    pub fn is_effective(&self) -> bool {
        self.old_value != self.new_value
    }
}

/// Append-only record of one mutation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// When the mutation happened
    pub timestamp: DateTime<Utc>,
    /// Who performed it
    pub actor: String,
    /// Entry type name
    pub entry_type: String,
    /// Changes carried by the mutation
    pub changes: Vec<PropertyChange>,
}

impl LogEntry {
    /// Create entry
    #[inline]
    #[must_use]
    pub fn new(
        timestamp: DateTime<Utc>,
        actor: impl Into<String>,
        entry_type: impl Into<String>,
        changes: Vec<PropertyChange>,
    ) -> Self {
        Self {
            timestamp,
            actor: actor.into(),
            entry_type: entry_type.into(),
            changes,
        }
    }
}

/// Snapshot of a work item
///
/// Property names are unique; insertion order is preserved. When built
/// from a list carrying a name twice, the later value wins and keeps the
/// position of the first occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkItem {
    project_code: String,
    id: String,
    work_item_type: String,
    properties: IndexMap<String, Property>,
    log: Vec<LogEntry>,
}

impl WorkItem {
    /// Create snapshot
    #[must_use]
    pub fn new(
        project_code: impl Into<String>,
        id: impl Into<String>,
        work_item_type: impl Into<String>,
        properties: impl IntoIterator<Item = Property>,
        log: Vec<LogEntry>,
    ) -> Self {
        Self {
            project_code: project_code.into(),
            id: id.into(),
            work_item_type: work_item_type.into(),
            properties: properties
                .into_iter()
                .map(|p| (p.name.clone(), p))
                .collect(),
            log,
        }
    }

    /// Owning project
    #[inline]
    #[must_use]
    pub fn project_code(&self) -> &str {
        &self.project_code
    }

    /// Identifier (sentinel until persisted)
    #[inline]
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Work item type name
    #[inline]
    #[must_use]
    pub fn work_item_type(&self) -> &str {
        &self.work_item_type
    }

    /// Properties in order
    pub fn properties(&self) -> impl ExactSizeIterator<Item = &Property> {
        self.properties.values()
    }

    /// Property by name
    #[inline]
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.get(name)
    }

    /// Value of a property, `None` when absent
    #[inline]
    #[must_use]
    pub fn value(&self, name: &str) -> Option<&str> {
        self.properties.get(name).map(|p| p.value.as_str())
    }

    /// Whether the property exists
    #[inline]
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.properties.contains_key(name)
    }

    /// Change log, oldest first
    #[inline]
    #[must_use]
    pub fn log(&self) -> &[LogEntry] {
        &self.log
    }

    /// Apply incoming values to existing properties
    ///
    /// Only properties already on the item are considered; unmentioned
    /// properties keep their value, unknown incoming names are ignored.
    /// Returns the new snapshot and the effective changes in property order.
    /// The log is carried over untouched.
    #[must_use]
    pub fn apply(&self, incoming: &[Property]) -> (Self, Vec<PropertyChange>) {
        let mut changes = Vec::new();

        let properties = self
            .properties
            .values()
            .map(|current| {
                match incoming
                    .iter()
                    .find(|p| p.name == current.name && p.value != current.value)
                {
                    Some(changed) => {
                        changes.push(PropertyChange::new(
                            current.name.clone(),
                            current.value.clone(),
                            changed.value.clone(),
                        ));
                        current.with_value(changed.value.clone())
                    }
                    None => current.clone(),
                }
            })
            .collect::<Vec<_>>();

        let next = Self::new(
            self.project_code.clone(),
            self.id.clone(),
            self.work_item_type.clone(),
            properties,
            self.log.clone(),
        );

        (next, changes)
    }

    /// Snapshot with one more log entry
    #[must_use]
    pub fn with_log_entry(&self, entry: LogEntry) -> Self {
        let mut next = self.clone();
        next.log.push(entry);
        next
    }

    /// Snapshot carrying another identifier
    #[must_use]
    pub fn with_id(&self, id: impl Into<String>) -> Self {
        let mut next = self.clone();
        next.id = id.into();
        next
    }
}
