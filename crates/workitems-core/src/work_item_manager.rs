//! Work item lifecycle
//!
//! Template creation, create, get, update and workflow commands on top of
//! the descriptor cache, the validation pipeline and a [`DataProvider`].
//!
//! Precondition failures are returned as [`WorkItemError`]; validation
//! failures are data inside the result types and never reach persistence.

use crate::config::WorkItemsConfig;
use crate::descriptor_manager::DescriptorManager;
use crate::error::{WorkItemError, WorkItemResult};
use crate::provider::{
    CachingValueResolver, DataProvider, DescriptorProvider, NoExternalValues, ValueResolver,
};
use crate::validation::{Operation, ValidationManager, ValidatorRegistry, ValueProviderValidator};
use chrono::Utc;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use workitems_model::{
    is_blank, CommandDescriptor, ErrorMessage, LogEntry, Property, PropertyChange, WorkItem,
    EMPTY_VALUE,
};

const SOURCE: &str = "WorkItemManager";
const COMMAND_UNAVAILABLE: &str = "command-unavailable";

/// Outcome of [`WorkItemManager::create`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItemCreatedResult {
    /// Whether the item was persisted
    pub success: bool,
    /// Persisted item, or the rejected candidate; `None` for an empty request
    pub created_work_item: Option<WorkItem>,
    /// Validation errors
    pub errors: Vec<ErrorMessage>,
}

/// Outcome of [`WorkItemManager::update`] and [`WorkItemManager::execute_command`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItemUpdatedResult {
    /// Whether the new snapshot was persisted
    pub success: bool,
    /// Persisted snapshot, or the rejected one; `None` when nothing was found
    pub updated_work_item: Option<WorkItem>,
    /// Validation errors
    pub errors: Vec<ErrorMessage>,
}

impl WorkItemUpdatedResult {
    fn rejected(error: ErrorMessage) -> Self {
        Self {
            success: false,
            updated_work_item: None,
            errors: vec![error],
        }
    }
}

/// Entry point for work item operations
///
/// Every operation loads descriptors once before doing its real work.
pub struct WorkItemManager {
    data_provider: Arc<dyn DataProvider>,
    descriptors: Arc<DescriptorManager>,
    validation: ValidationManager,
    config: WorkItemsConfig,
}

impl WorkItemManager {
    /// Create manager with default configuration and no external value sources
    #[must_use]
    pub fn new(
        data_provider: Arc<dyn DataProvider>,
        descriptor_provider: Arc<dyn DescriptorProvider>,
    ) -> Self {
        Self::builder(data_provider, descriptor_provider).build()
    }

    /// Start building a manager
    #[must_use]
    pub fn builder(
        data_provider: Arc<dyn DataProvider>,
        descriptor_provider: Arc<dyn DescriptorProvider>,
    ) -> WorkItemManagerBuilder {
        WorkItemManagerBuilder {
            data_provider,
            descriptor_provider,
            config: WorkItemsConfig::default(),
            value_resolver: None,
            registry: ValidatorRegistry::with_defaults(),
        }
    }

    /// Descriptor cache
    #[inline]
    #[must_use]
    pub fn descriptor_manager(&self) -> &DescriptorManager {
        &self.descriptors
    }

    /// Validation pipeline
    #[inline]
    #[must_use]
    pub fn validation_manager(&self) -> &ValidationManager {
        &self.validation
    }

    /// Active configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &WorkItemsConfig {
        &self.config
    }

    /// Unpersisted work item filled with initial values
    ///
    /// Unknown types yield an item without properties.
    ///
    /// # Errors
    /// - `WorkItemError::InvalidArgument` if an argument is blank
    /// - `WorkItemError::Descriptor` if descriptors cannot be loaded
    pub async fn create_template(
        &self,
        project_code: &str,
        work_item_type: &str,
    ) -> WorkItemResult<WorkItem> {
        require("project_code", project_code)?;
        require("work_item_type", work_item_type)?;

        self.init().await?;

        let properties: Vec<Property> = self
            .descriptors
            .get_all_property_descriptors(work_item_type)
            .unwrap_or_default()
            .iter()
            .map(|pd| {
                Property::new(
                    pd.name.clone(),
                    pd.data_type.clone(),
                    pd.initial_value.clone().unwrap_or_default(),
                )
            })
            .collect();

        Ok(WorkItem::new(
            project_code,
            self.config.new_item_id.clone(),
            work_item_type,
            properties,
            Vec::new(),
        ))
    }

    /// Validate and persist a new work item
    ///
    /// An empty property list is an unsuccessful no-op: nothing is
    /// allocated or saved and no errors are reported.
    ///
    /// # Errors
    /// - `WorkItemError::InvalidArgument` if an argument is blank
    /// - `WorkItemError::NotPermitted` if the data provider disallows writes
    /// - `WorkItemError::Provider` / `WorkItemError::Timeout` on collaborator failure
    pub async fn create(
        &self,
        project_code: &str,
        work_item_type: &str,
        properties: &[Property],
    ) -> WorkItemResult<WorkItemCreatedResult> {
        require("project_code", project_code)?;
        require("work_item_type", work_item_type)?;
        self.require_write()?;

        self.init().await?;

        if properties.is_empty() {
            return Ok(WorkItemCreatedResult {
                success: false,
                created_work_item: None,
                errors: Vec::new(),
            });
        }

        let id = self
            .call("next_number", self.data_provider.next_number(project_code))
            .await?
            .to_string();

        let work_item = WorkItem::new(
            project_code,
            id,
            work_item_type,
            properties.iter().cloned(),
            Vec::new(),
        );

        let changes: Vec<PropertyChange> = work_item
            .properties()
            .filter(|p| p.value != EMPTY_VALUE)
            .map(|p| PropertyChange::new(p.name.clone(), EMPTY_VALUE, p.value.clone()))
            .collect();
        tracing::debug!(
            "Create {}/{} with {} changes",
            project_code,
            work_item.id(),
            changes.len()
        );

        let errors = self.validation.validate(&work_item, &changes, Operation::Create).await;
        if !errors.is_empty() {
            tracing::warn!(
                "Rejected create of {}/{}: {} validation errors",
                project_code,
                work_item.id(),
                errors.len()
            );
            return Ok(WorkItemCreatedResult {
                success: false,
                created_work_item: Some(work_item),
                errors,
            });
        }

        self.call("save_new", self.data_provider.save_new(&work_item)).await?;
        tracing::info!(
            "Created work item {}/{} of type {}",
            project_code,
            work_item.id(),
            work_item_type
        );

        Ok(WorkItemCreatedResult {
            success: true,
            created_work_item: Some(work_item),
            errors: Vec::new(),
        })
    }

    /// Fetch a work item, `None` when absent
    ///
    /// # Errors
    /// - `WorkItemError::InvalidArgument` if an argument is blank
    /// - `WorkItemError::NotPermitted` if the data provider disallows reads
    /// - `WorkItemError::Provider` / `WorkItemError::Timeout` on collaborator failure
    pub async fn get(&self, project_code: &str, id: &str) -> WorkItemResult<Option<WorkItem>> {
        require("project_code", project_code)?;
        require("id", id)?;
        self.require_read()?;

        self.init().await?;

        self.call("get", self.data_provider.get(project_code, id)).await
    }

    /// Apply property values to an existing work item
    ///
    /// Only properties already on the item change. One log entry is
    /// appended even when nothing changed.
    ///
    /// # Errors
    /// - `WorkItemError::InvalidArgument` if an argument is blank
    /// - `WorkItemError::NotPermitted` if the data provider disallows writes or reads
    /// - `WorkItemError::Provider` / `WorkItemError::Timeout` on collaborator failure
    pub async fn update(
        &self,
        project_code: &str,
        id: &str,
        properties: &[Property],
    ) -> WorkItemResult<WorkItemUpdatedResult> {
        require("project_code", project_code)?;
        require("id", id)?;
        self.require_write()?;

        let Some(current) = self.get(project_code, id).await? else {
            return Ok(WorkItemUpdatedResult::rejected(not_found(project_code, id)));
        };

        let (next, changes) = current.apply(properties);
        tracing::debug!("Update {}/{} with {} changes", project_code, id, changes.len());

        let entry = LogEntry::new(
            Utc::now(),
            self.config.actor.clone(),
            self.config.update_log_entry_type.clone(),
            changes.clone(),
        );
        let next = next.with_log_entry(entry);

        self.persist_update(next, &changes, Operation::Update).await
    }

    /// Run a workflow command on an existing work item
    ///
    /// The command must be offered by a stage the item is currently in.
    ///
    /// # Errors
    /// - `WorkItemError::InvalidArgument` if an argument is blank
    /// - `WorkItemError::NotPermitted` if the data provider disallows writes or reads
    /// - `WorkItemError::Provider` / `WorkItemError::Timeout` on collaborator failure
    pub async fn execute_command(
        &self,
        project_code: &str,
        id: &str,
        command_name: &str,
    ) -> WorkItemResult<WorkItemUpdatedResult> {
        require("project_code", project_code)?;
        require("id", id)?;
        require("command_name", command_name)?;
        self.require_write()?;

        let Some(current) = self.get(project_code, id).await? else {
            return Ok(WorkItemUpdatedResult::rejected(not_found(project_code, id)));
        };

        let command = self
            .descriptors
            .available_commands(&current)
            .into_iter()
            .find(|c| c.name() == command_name)
            .cloned();

        let Some(command) = command else {
            tracing::warn!("Command '{}' not available for {}/{}", command_name, project_code, id);
            return Ok(WorkItemUpdatedResult::rejected(ErrorMessage::new(
                SOURCE,
                COMMAND_UNAVAILABLE,
                format!(
                    "The command '{command_name}' is not available for the work item \
                     with id '{id}' in project '{project_code}'."
                ),
                project_code,
                id,
                "",
            )));
        };

        let (next, changes) = match &command {
            CommandDescriptor::ChangePropertyValue { property, value, .. } => {
                let data_type = current
                    .property(property)
                    .map(|p| p.data_type.clone())
                    .unwrap_or_default();
                current.apply(&[Property::new(property.clone(), data_type, value.clone())])
            }
        };

        let entry = LogEntry::new(
            Utc::now(),
            self.config.actor.clone(),
            command.name(),
            changes.clone(),
        );
        let next = next.with_log_entry(entry);

        self.persist_update(next, &changes, Operation::Command).await
    }

    /// Commands currently offered to a work item, empty when it is absent
    ///
    /// # Errors
    /// - `WorkItemError::InvalidArgument` if an argument is blank
    /// - `WorkItemError::NotPermitted` if the data provider disallows reads
    /// - `WorkItemError::Provider` / `WorkItemError::Timeout` on collaborator failure
    pub async fn available_commands(
        &self,
        project_code: &str,
        id: &str,
    ) -> WorkItemResult<Vec<CommandDescriptor>> {
        Ok(self
            .get(project_code, id)
            .await?
            .map(|item| {
                self.descriptors
                    .available_commands(&item)
                    .into_iter()
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn persist_update(
        &self,
        next: WorkItem,
        changes: &[PropertyChange],
        operation: Operation,
    ) -> WorkItemResult<WorkItemUpdatedResult> {
        let errors = self.validation.validate(&next, changes, operation).await;
        if !errors.is_empty() {
            tracing::warn!(
                "Rejected {:?} of {}/{}: {} validation errors",
                operation,
                next.project_code(),
                next.id(),
                errors.len()
            );
            return Ok(WorkItemUpdatedResult {
                success: false,
                updated_work_item: Some(next),
                errors,
            });
        }

        self.call("save_updated", self.data_provider.save_updated(&next)).await?;
        tracing::info!(
            "Updated work item {}/{} ({} changes)",
            next.project_code(),
            next.id(),
            changes.len()
        );

        Ok(WorkItemUpdatedResult {
            success: true,
            updated_work_item: Some(next),
            errors: Vec::new(),
        })
    }

    async fn init(&self) -> WorkItemResult<()> {
        if self.descriptors.is_loaded() {
            return Ok(());
        }
        self.call("load_descriptors", self.descriptors.load_all()).await
    }

    fn require_read(&self) -> WorkItemResult<()> {
        if self.data_provider.can_read() {
            Ok(())
        } else {
            Err(WorkItemError::NotPermitted { operation: "read" })
        }
    }

    fn require_write(&self) -> WorkItemResult<()> {
        if self.data_provider.can_write() {
            Ok(())
        } else {
            Err(WorkItemError::NotPermitted { operation: "write" })
        }
    }

    /// Await a collaborator call under the configured timeout
    async fn call<T, E>(
        &self,
        operation: &'static str,
        call: impl Future<Output = Result<T, E>>,
    ) -> WorkItemResult<T>
    where
        E: Into<WorkItemError>,
    {
        let Some(limit) = self.config.provider_timeout() else {
            return call.await.map_err(Into::into);
        };

        match tokio::time::timeout(limit, call).await {
            Ok(result) => result.map_err(Into::into),
            Err(_) => {
                tracing::warn!("{} timed out after {:?}", operation, limit);
                Err(WorkItemError::Timeout {
                    operation,
                    timeout_ms: self.config.provider_timeout_ms.unwrap_or_default(),
                })
            }
        }
    }
}

impl fmt::Debug for WorkItemManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkItemManager")
            .field("descriptors", &self.descriptors)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Builder for [`WorkItemManager`]
pub struct WorkItemManagerBuilder {
    data_provider: Arc<dyn DataProvider>,
    descriptor_provider: Arc<dyn DescriptorProvider>,
    config: WorkItemsConfig,
    value_resolver: Option<Arc<dyn ValueResolver>>,
    registry: ValidatorRegistry,
}

impl WorkItemManagerBuilder {
    /// With configuration
    #[must_use]
    pub fn config(mut self, config: WorkItemsConfig) -> Self {
        self.config = config;
        self
    }

    /// With resolver for externally sourced value lists
    #[must_use]
    pub fn value_resolver(mut self, resolver: Arc<dyn ValueResolver>) -> Self {
        self.value_resolver = Some(resolver);
        self
    }

    /// With validator registry
    #[must_use]
    pub fn registry(mut self, registry: ValidatorRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Build the manager
    ///
    /// A configured resolver is wrapped in a cache unless caching is disabled.
    #[must_use]
    pub fn build(self) -> WorkItemManager {
        let resolver: Arc<dyn ValueResolver> = match self.value_resolver {
            Some(inner) if self.config.value_cache.enabled => {
                Arc::new(CachingValueResolver::new(inner, &self.config.value_cache))
            }
            Some(inner) => inner,
            None => Arc::new(NoExternalValues),
        };

        let descriptors = Arc::new(DescriptorManager::new(self.descriptor_provider));
        let value_provider =
            ValueProviderValidator::new(resolver).with_timeout(self.config.provider_timeout());
        let validation =
            ValidationManager::new(Arc::clone(&descriptors), self.registry, value_provider);

        WorkItemManager {
            data_provider: self.data_provider,
            descriptors,
            validation,
            config: self.config,
        }
    }
}

impl fmt::Debug for WorkItemManagerBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkItemManagerBuilder")
            .field("config", &self.config)
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

fn require(name: &'static str, value: &str) -> WorkItemResult<()> {
    if is_blank(value) {
        Err(WorkItemError::invalid_argument(name))
    } else {
        Ok(())
    }
}

fn not_found(project_code: &str, id: &str) -> ErrorMessage {
    ErrorMessage::new(
        SOURCE,
        "",
        format!("The work item with id '{id}' in project '{project_code}' cannot be found."),
        project_code,
        id,
        "",
    )
}
