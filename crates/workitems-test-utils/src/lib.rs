//! Testing utilities for the work items workspace
//!
//! Shared fixtures, pre-wired managers and tracing setup.

#![allow(missing_docs)]

use std::sync::{Arc, Once};
use tracing_subscriber::EnvFilter;
use workitems_core::provider::{
    InMemoryDataProvider, InMemoryDescriptorProvider, InMemoryValueResolver,
};
use workitems_core::{WorkItemManager, WorkItemsConfig};
use workitems_model::{Property, PropertyDescriptor, WorkItemDescriptor};

static TRACING: Once = Once::new();

/// Install a fmt subscriber honouring `RUST_LOG`, once per process
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
            )
            .with_test_writer()
            .try_init();
    });
}

pub fn string(name: &str, value: &str) -> Property {
    Property::new(name, "String", value)
}

/// Type `BAR` with plain string properties `A` and `B`
pub fn bar_plain() -> WorkItemDescriptor {
    WorkItemDescriptor::with_properties(
        "BAR",
        vec![
            PropertyDescriptor::new("A", "String"),
            PropertyDescriptor::new("B", "String"),
        ],
    )
}

/// Type `BAR` where `A` must be non-blank
pub fn bar_required_a() -> WorkItemDescriptor {
    WorkItemDescriptor::with_properties(
        "BAR",
        vec![
            PropertyDescriptor::new("A", "String").required(),
            PropertyDescriptor::new("B", "String"),
        ],
    )
}

/// Type `BAR` where `B` is not editable
pub fn bar_immutable_b() -> WorkItemDescriptor {
    WorkItemDescriptor::with_properties(
        "BAR",
        vec![
            PropertyDescriptor::new("A", "String"),
            PropertyDescriptor::new("B", "String").editable(false),
        ],
    )
}

/// Manager and its in-memory collaborators
pub struct TestHarness {
    pub manager: WorkItemManager,
    pub data: Arc<InMemoryDataProvider>,
    pub descriptors: InMemoryDescriptorProvider,
    pub values: Arc<InMemoryValueResolver>,
}

impl TestHarness {
    pub fn new(descriptors: Vec<WorkItemDescriptor>) -> Self {
        Self::with_config(descriptors, WorkItemsConfig::new())
    }

    pub fn with_config(descriptors: Vec<WorkItemDescriptor>, config: WorkItemsConfig) -> Self {
        Self::with_data(descriptors, config, InMemoryDataProvider::new())
    }

    pub fn with_data(
        descriptors: Vec<WorkItemDescriptor>,
        config: WorkItemsConfig,
        data: InMemoryDataProvider,
    ) -> Self {
        init_tracing();

        let data = Arc::new(data);
        let descriptors = InMemoryDescriptorProvider::new(descriptors);
        let values = Arc::new(InMemoryValueResolver::new());

        let manager = WorkItemManager::builder(data.clone(), Arc::new(descriptors.clone()))
            .config(config)
            .value_resolver(values.clone())
            .build();

        Self {
            manager,
            data,
            descriptors,
            values,
        }
    }
}
