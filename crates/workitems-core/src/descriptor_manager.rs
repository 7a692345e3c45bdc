//! Descriptor cache
//!
//! Loads every descriptor once from the [`DescriptorProvider`] and answers
//! schema questions by work item type name.

use crate::error::DescriptorError;
use crate::provider::DescriptorProvider;
use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;
use tokio::sync::OnceCell;
use workitems_model::{
    CommandDescriptor, PropertyDescriptor, StageDescriptor, WorkItem, WorkItemDescriptor,
};

/// Process-wide schema cache
///
/// Initialisation is guarded: concurrent first callers share one provider
/// call. A failed load leaves the cache empty and is retried on the next
/// call. Lookups before a successful load behave as if no type is known.
pub struct DescriptorManager {
    provider: Arc<dyn DescriptorProvider>,
    descriptors: OnceCell<IndexMap<String, WorkItemDescriptor>>,
}

impl DescriptorManager {
    /// Create manager over a descriptor source
    #[inline]
    #[must_use]
    pub fn new(provider: Arc<dyn DescriptorProvider>) -> Self {
        Self {
            provider,
            descriptors: OnceCell::new(),
        }
    }

    /// Load all descriptors (idempotent)
    ///
    /// # Errors
    /// - `DescriptorError::DuplicateType` if two descriptors share a name
    /// - `DescriptorError::DuplicateProperty` if a type repeats a property
    /// - any error of the underlying provider
    pub async fn load_all(&self) -> Result<(), DescriptorError> {
        self.descriptors
            .get_or_try_init(|| async {
                let loaded = self.provider.load_all().await?;
                let index = Self::index(loaded)?;
                tracing::info!("Loaded {} work item descriptors", index.len());
                Ok::<_, DescriptorError>(index)
            })
            .await?;
        Ok(())
    }

    fn index(
        descriptors: Vec<WorkItemDescriptor>,
    ) -> Result<IndexMap<String, WorkItemDescriptor>, DescriptorError> {
        let mut index = IndexMap::with_capacity(descriptors.len());

        for descriptor in descriptors {
            if let Some(property) = descriptor.duplicate_property() {
                return Err(DescriptorError::DuplicateProperty {
                    work_item_type: descriptor.name.clone(),
                    property: property.to_string(),
                });
            }
            if index.contains_key(&descriptor.name) {
                return Err(DescriptorError::DuplicateType(descriptor.name));
            }
            index.insert(descriptor.name.clone(), descriptor);
        }

        Ok(index)
    }

    /// Whether descriptors have been loaded
    #[inline]
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.descriptors.initialized()
    }

    /// Descriptor of a type
    #[inline]
    #[must_use]
    pub fn get_descriptor(&self, work_item_type: &str) -> Option<&WorkItemDescriptor> {
        self.descriptors.get()?.get(work_item_type)
    }

    /// Declared properties of a type
    ///
    /// `None` for unknown types; callers treat that as a legitimate outcome.
    #[inline]
    #[must_use]
    pub fn get_all_property_descriptors(
        &self,
        work_item_type: &str,
    ) -> Option<&[PropertyDescriptor]> {
        self.get_descriptor(work_item_type)
            .map(|d| d.properties.as_slice())
    }

    /// Stages of a type
    #[inline]
    #[must_use]
    pub fn get_stages(&self, work_item_type: &str) -> Option<&[StageDescriptor]> {
        self.get_descriptor(work_item_type).map(|d| d.stages.as_slice())
    }

    /// Every command declared by any stage of a type
    #[must_use]
    pub fn get_commands(&self, work_item_type: &str) -> Vec<&CommandDescriptor> {
        self.get_stages(work_item_type)
            .unwrap_or_default()
            .iter()
            .flat_map(|s| s.commands.iter())
            .collect()
    }

    /// Stages the work item is currently in
    #[must_use]
    pub fn current_stages(&self, work_item: &WorkItem) -> Vec<&StageDescriptor> {
        self.get_descriptor(work_item.work_item_type())
            .map(|d| d.matching_stages(work_item))
            .unwrap_or_default()
    }

    /// Commands offered to the work item in its current stages
    #[must_use]
    pub fn available_commands(&self, work_item: &WorkItem) -> Vec<&CommandDescriptor> {
        self.get_descriptor(work_item.work_item_type())
            .map(|d| d.available_commands(work_item))
            .unwrap_or_default()
    }

    /// Known type names, in load order
    #[must_use]
    pub fn work_item_types(&self) -> Vec<&str> {
        self.descriptors
            .get()
            .map(|index| index.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }
}

impl fmt::Debug for DescriptorManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DescriptorManager")
            .field("loaded", &self.is_loaded())
            .field("types", &self.work_item_types())
            .finish_non_exhaustive()
    }
}
