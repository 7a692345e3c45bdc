//! Work Items Model
//!
//! Plain data for descriptor-driven work items.
//!
//! # Overview
//!
//! - **Descriptors**: per-type schema (properties, value providers, log
//!   entry types, stages and commands), loaded at runtime
//! - **WorkItem**: immutable snapshot with ordered properties and an
//!   append-only change log
//! - **ErrorMessage**: structured validation output
//!
//! # Example
//!
//! ```rust
//! use workitems_model::{Property, PropertyDescriptor, WorkItem, WorkItemDescriptor};
//!
//! let descriptor = WorkItemDescriptor::with_properties(
//!     "Task",
//!     vec![PropertyDescriptor::new("Title", "String").required()],
//! );
//!
//! let title = Property::new("Title", "String", "a");
//! let item = WorkItem::new("FOO", "1", "Task", vec![title], vec![]);
//! let (next, changes) = item.apply(&[Property::new("Title", "String", "b")]);
//!
//! assert_eq!(next.value("Title"), Some("b"));
//! assert_eq!(changes.len(), 1);
//! assert!(descriptor.matching_stages(&next).is_empty());
//! ```

#![warn(missing_docs)]

pub mod descriptor;
pub mod error_message;
pub mod presets;
pub mod work_item;
pub mod workflow;

// Re-exports
pub use descriptor::{
    CommandDescriptor, ConditionDescriptor, EnumValue, LogDescriptor, LogEntryTypeDescriptor,
    PropertyDescriptor, PropertyType, StageDescriptor, StagePropertyDescriptor, ValidatorDescriptor,
    ValueProviderDescriptor, WorkItemDescriptor,
};
pub use error_message::ErrorMessage;
pub use work_item::{
    is_blank, split_values, LogEntry, Property, PropertyChange, WorkItem, EMPTY_VALUE,
    MULTI_VALUE_SEPARATOR,
};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with work item data
    pub use crate::{
        CommandDescriptor, ConditionDescriptor, ErrorMessage, LogEntry, Property, PropertyChange,
        PropertyDescriptor, StageDescriptor, ValidatorDescriptor, ValueProviderDescriptor, WorkItem,
        WorkItemDescriptor,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
