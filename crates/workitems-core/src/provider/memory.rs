//! In-memory providers

use super::{DataProvider, DescriptorProvider, ValueResolver};
use crate::error::{DescriptorError, ProviderError};
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use workitems_model::{ValueProviderDescriptor, WorkItem, WorkItemDescriptor};

/// Work item store backed by concurrent maps
///
/// Identifiers are allocated per project, starting at 1.
#[derive(Debug)]
pub struct InMemoryDataProvider {
    read: bool,
    write: bool,
    items: DashMap<(String, String), WorkItem>,
    counters: DashMap<String, u64>,
    saved_new: AtomicUsize,
    saved_updated: AtomicUsize,
}

impl InMemoryDataProvider {
    /// Create a readable and writable store
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::with_capabilities(true, true)
    }

    /// Create store with explicit capability flags
    #[must_use]
    pub fn with_capabilities(read: bool, write: bool) -> Self {
        Self {
            read,
            write,
            items: DashMap::new(),
            counters: DashMap::new(),
            saved_new: AtomicUsize::new(0),
            saved_updated: AtomicUsize::new(0),
        }
    }

    /// Seed the store, bypassing capability flags
    ///
    /// The project counter is raised so allocated ids stay unique.
    pub fn insert(&self, work_item: WorkItem) {
        if let Ok(number) = work_item.id().parse::<u64>() {
            let mut counter = self
                .counters
                .entry(work_item.project_code().to_string())
                .or_insert(0);
            *counter = (*counter).max(number);
        }
        self.items.insert(key(&work_item), work_item);
    }

    /// Number of stored work items
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the store is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Successful `save_new` calls
    #[inline]
    #[must_use]
    pub fn saved_new_count(&self) -> usize {
        self.saved_new.load(Ordering::SeqCst)
    }

    /// Successful `save_updated` calls
    #[inline]
    #[must_use]
    pub fn saved_updated_count(&self) -> usize {
        self.saved_updated.load(Ordering::SeqCst)
    }
}

impl Default for InMemoryDataProvider {
    fn default() -> Self {
        Self::new()
    }
}

fn key(work_item: &WorkItem) -> (String, String) {
    (work_item.project_code().to_string(), work_item.id().to_string())
}

#[async_trait]
impl DataProvider for InMemoryDataProvider {
    fn can_read(&self) -> bool {
        self.read
    }

    fn can_write(&self) -> bool {
        self.write
    }

    async fn next_number(&self, project_code: &str) -> Result<u64, ProviderError> {
        let mut counter = self.counters.entry(project_code.to_string()).or_insert(0);
        *counter += 1;
        Ok(*counter)
    }

    async fn get(&self, project_code: &str, id: &str) -> Result<Option<WorkItem>, ProviderError> {
        Ok(self
            .items
            .get(&(project_code.to_string(), id.to_string()))
            .map(|entry| entry.value().clone()))
    }

    async fn save_new(&self, work_item: &WorkItem) -> Result<(), ProviderError> {
        let key = key(work_item);
        if self.items.contains_key(&key) {
            return Err(ProviderError::Conflict(format!(
                "work item {}/{} already exists",
                key.0, key.1
            )));
        }
        self.items.insert(key, work_item.clone());
        self.saved_new.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn save_updated(&self, work_item: &WorkItem) -> Result<(), ProviderError> {
        let key = key(work_item);
        match self.items.get_mut(&key) {
            Some(mut stored) => {
                *stored = work_item.clone();
                self.saved_updated.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
            None => Err(ProviderError::NotFound(format!(
                "work item {}/{}",
                key.0, key.1
            ))),
        }
    }
}

/// Descriptor source holding a fixed list
#[derive(Debug, Clone, Default)]
pub struct InMemoryDescriptorProvider {
    descriptors: Vec<WorkItemDescriptor>,
    loads: std::sync::Arc<AtomicUsize>,
}

impl InMemoryDescriptorProvider {
    /// Create provider
    #[inline]
    #[must_use]
    pub fn new(descriptors: Vec<WorkItemDescriptor>) -> Self {
        Self {
            descriptors,
            loads: std::sync::Arc::default(),
        }
    }

    /// Number of `load_all` calls served
    #[inline]
    #[must_use]
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DescriptorProvider for InMemoryDescriptorProvider {
    async fn load_all(&self) -> Result<Vec<WorkItemDescriptor>, DescriptorError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        Ok(self.descriptors.clone())
    }
}

/// Value lists registered per project
#[derive(Debug, Default)]
pub struct InMemoryValueResolver {
    collections: DashMap<(String, String), Vec<String>>,
    users: DashMap<(String, String), Vec<String>>,
    calls: AtomicUsize,
}

impl InMemoryValueResolver {
    /// Create empty resolver
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the values of a project collection
    pub fn set_collection<I, S>(&self, project_code: &str, collection: &str, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.collections.insert(
            (project_code.to_string(), collection.to_string()),
            values.into_iter().map(Into::into).collect(),
        );
    }

    /// Register the users of a project for a role (empty role = everyone)
    pub fn set_users<I, S>(&self, project_code: &str, role: &str, users: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.users.insert(
            (project_code.to_string(), role.to_string()),
            users.into_iter().map(Into::into).collect(),
        );
    }

    /// Number of `resolve` calls served
    #[inline]
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ValueResolver for InMemoryValueResolver {
    async fn resolve(
        &self,
        project_code: &str,
        provider: &ValueProviderDescriptor,
    ) -> Result<Vec<String>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let (map, name) = match provider {
            ValueProviderDescriptor::Enum { values } => {
                return Ok(values.iter().map(|v| v.value.clone()).collect());
            }
            ValueProviderDescriptor::ProjectCollection { collection } => {
                (&self.collections, collection)
            }
            ValueProviderDescriptor::ProjectUsers { role } => (&self.users, role),
        };

        map.get(&(project_code.to_string(), name.clone()))
            .map(|values| values.value().clone())
            .ok_or_else(|| {
                ProviderError::NotFound(format!("{provider:?} in project '{project_code}'"))
            })
    }
}
