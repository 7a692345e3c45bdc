//! Work Items Core
//!
//! Descriptor-driven work item management: schema cache, validation
//! pipeline and the create/read/update lifecycle.
//!
//! # Architecture
//!
//! ```text
//! WorkItemManager
//!  ├─ DescriptorManager ── DescriptorProvider (memory, files, custom)
//!  ├─ ValidationManager
//!  │   ├─ type-wide validators (completeness, immutable, value provider)
//!  │   └─ ValidatorRegistry (mandatory, string_length, custom kinds)
//!  │        ValueProviderValidator ── ValueResolver (+ moka cache)
//!  └─ DataProvider (memory, custom)
//! ```
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use workitems_core::prelude::*;
//! use workitems_core::provider::{InMemoryDataProvider, InMemoryDescriptorProvider};
//! use workitems_model::presets;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), WorkItemError> {
//! let manager = WorkItemManager::new(
//!     Arc::new(InMemoryDataProvider::new()),
//!     Arc::new(InMemoryDescriptorProvider::new(vec![presets::sdlc_issue()])),
//! );
//!
//! let template = manager.create_template("FOO", presets::ISSUE_TYPE).await?;
//! let properties: Vec<Property> = template
//!     .properties()
//!     .map(|p| match p.name.as_str() {
//!         presets::TITLE => p.with_value("Crash on startup"),
//!         _ => p.clone(),
//!     })
//!     .collect();
//!
//! let created = manager.create("FOO", presets::ISSUE_TYPE, &properties).await?;
//! assert!(created.success);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod descriptor_manager;
pub mod error;
pub mod provider;
pub mod validation;
pub mod work_item_manager;

// Re-exports
pub use config::{ValueCacheConfig, WorkItemsConfig};
pub use descriptor_manager::DescriptorManager;
pub use error::{ConfigError, DescriptorError, ProviderError, WorkItemError, WorkItemResult};
pub use validation::{Operation, ValidationContext, ValidationManager, Validator, ValidatorRegistry};
pub use work_item_manager::{
    WorkItemCreatedResult, WorkItemManager, WorkItemManagerBuilder, WorkItemUpdatedResult,
};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for work item management
    pub use crate::provider::{DataProvider, DescriptorProvider, ValueResolver};
    pub use crate::{
        DescriptorManager, WorkItemCreatedResult, WorkItemError, WorkItemManager,
        WorkItemResult, WorkItemUpdatedResult, WorkItemsConfig,
    };
    pub use workitems_model::prelude::*;
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
