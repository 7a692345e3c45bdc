//! Collaborator contracts and bundled providers
//!
//! - [`DataProvider`]: persistence and identifier allocation
//! - [`DescriptorProvider`]: source of work item descriptors
//! - [`ValueResolver`]: legal values of externally sourced value providers
//!
//! Implement these traits to plug in a real backend. The in-memory and
//! file-backed implementations here cover tests and small deployments.

use crate::error::{DescriptorError, ProviderError};
use async_trait::async_trait;
use workitems_model::{ValueProviderDescriptor, WorkItem, WorkItemDescriptor};

mod cache;
mod file;
mod memory;

pub use cache::{CachingValueResolver, ResolverCacheStats};
pub use file::FileDescriptorProvider;
pub use memory::{InMemoryDataProvider, InMemoryDescriptorProvider, InMemoryValueResolver};

/// Persistence backend for work items
///
/// Capability flags are checked by the manager before any call; a `false`
/// flag is a hard precondition failure.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DataProvider: Send + Sync {
    /// Whether reads are allowed
    fn can_read(&self) -> bool;

    /// Whether writes are allowed
    fn can_write(&self) -> bool;

    /// Allocate the next identifier of a project
    async fn next_number(&self, project_code: &str) -> Result<u64, ProviderError>;

    /// Fetch a work item, `None` when absent
    async fn get(&self, project_code: &str, id: &str) -> Result<Option<WorkItem>, ProviderError>;

    /// Persist a newly created work item
    async fn save_new(&self, work_item: &WorkItem) -> Result<(), ProviderError>;

    /// Persist a new snapshot of an existing work item
    async fn save_updated(&self, work_item: &WorkItem) -> Result<(), ProviderError>;
}

/// Source of every descriptor known to the environment
#[async_trait]
pub trait DescriptorProvider: Send + Sync {
    /// Enumerate all descriptors
    async fn load_all(&self) -> Result<Vec<WorkItemDescriptor>, DescriptorError>;
}

/// Resolution of externally sourced value lists
#[async_trait]
pub trait ValueResolver: Send + Sync {
    /// Current legal values of `provider` within `project_code`
    async fn resolve(
        &self,
        project_code: &str,
        provider: &ValueProviderDescriptor,
    ) -> Result<Vec<String>, ProviderError>;
}

/// Resolver for deployments without external value sources
///
/// Inline enumerations resolve; everything else is unsupported.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoExternalValues;

#[async_trait]
impl ValueResolver for NoExternalValues {
    async fn resolve(
        &self,
        _project_code: &str,
        provider: &ValueProviderDescriptor,
    ) -> Result<Vec<String>, ProviderError> {
        match provider {
            ValueProviderDescriptor::Enum { values } => {
                Ok(values.iter().map(|v| v.value.clone()).collect())
            }
            other => Err(ProviderError::Unsupported(format!(
                "no resolver configured for {other:?}"
            ))),
        }
    }
}
