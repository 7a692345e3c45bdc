//! Descriptors loaded from disk

use std::sync::Arc;
use tempfile::TempDir;
use workitems_core::provider::{FileDescriptorProvider, InMemoryDataProvider};
use workitems_core::{DescriptorError, WorkItemError, WorkItemManager};
use workitems_model::{PropertyType, ValidatorDescriptor, ValueProviderDescriptor};
use workitems_test_utils::{init_tracing, string};

const BAR_JSON: &str = r#"{
    "name": "BAR",
    "properties": [
        { "name": "A", "data_type": "String", "is_required": true },
        { "name": "B", "data_type": "String", "is_editable": false }
    ]
}"#;

const TASKS_YAML: &str = r"
- name: TASK
  properties:
    - name: Title
      data_type: String
      validators:
        - type: mandatory
        - type: string_length
          min: 3
          max: 80
    - name: Tags
      data_type: String
      property_type: multiple_value
      value_provider:
        type: project_collection
        collection: tags
  stages:
    - id: stage-Todo
      condition:
        type: property_value
        property: Title
        value: todo
      commands:
        - type: change_property_value
          name: Start
          label: Start work
          property: Title
          value: doing
";

const EPIC_TOML: &str = r#"
[[descriptors]]
name = "EPIC"

[[descriptors.properties]]
name = "Size"
data_type = "String"
initial_value = "M"

[descriptors.properties.value_provider]
type = "enum"
values = [
    { value = "S", display_text = "Small" },
    { value = "M", display_text = "Medium" },
    { value = "L", display_text = "Large" },
]
"#;

fn write_all(dir: &TempDir, files: &[(&str, &str)]) -> anyhow::Result<()> {
    for (name, content) in files {
        std::fs::write(dir.path().join(name), content)?;
    }
    Ok(())
}

#[tokio::test]
async fn directory_of_mixed_formats() -> anyhow::Result<()> {
    init_tracing();
    let dir = tempfile::tempdir()?;
    write_all(
        &dir,
        &[
            ("01-bar.json", BAR_JSON),
            ("02-tasks.yaml", TASKS_YAML),
            ("03-epic.toml", EPIC_TOML),
            ("README.md", "not a descriptor"),
        ],
    )?;

    let manager = WorkItemManager::new(
        Arc::new(InMemoryDataProvider::new()),
        Arc::new(FileDescriptorProvider::new(dir.path())),
    );
    manager.create_template("FOO", "BAR").await?;

    let descriptors = manager.descriptor_manager();
    assert_eq!(descriptors.work_item_types(), vec!["BAR", "TASK", "EPIC"]);

    let bar = descriptors.get_descriptor("BAR").expect("BAR descriptor");
    assert!(bar.properties[0].is_required);
    assert!(!bar.properties[1].is_editable);

    let task = descriptors.get_descriptor("TASK").expect("TASK descriptor");
    assert_eq!(
        task.properties[0].validators,
        vec![
            ValidatorDescriptor::Mandatory,
            ValidatorDescriptor::StringLength { min: 3, max: 80 },
        ]
    );
    assert_eq!(task.properties[1].property_type, PropertyType::MultipleValue);
    assert_eq!(descriptors.get_commands("TASK")[0].name(), "Start");

    let epic = descriptors.get_descriptor("EPIC").expect("EPIC descriptor");
    assert!(matches!(
        &epic.properties[0].value_provider,
        Some(ValueProviderDescriptor::Enum { values }) if values.len() == 3
    ));
    Ok(())
}

#[tokio::test]
async fn loaded_rules_are_enforced() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    write_all(&dir, &[("epic.toml", EPIC_TOML)])?;

    let manager = WorkItemManager::new(
        Arc::new(InMemoryDataProvider::new()),
        Arc::new(FileDescriptorProvider::new(dir.path().join("epic.toml"))),
    );

    let template = manager.create_template("FOO", "EPIC").await?;
    assert_eq!(template.value("Size"), Some("M"));

    let result = manager.create("FOO", "EPIC", &[string("Size", "XL")]).await?;
    assert!(!result.success);
    assert_eq!(result.errors[0].source, "ValueProviderValidator");
    Ok(())
}

#[tokio::test]
async fn malformed_file_fails_the_operation() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    write_all(&dir, &[("broken.json", "{ \"name\": ")])?;

    let manager = WorkItemManager::new(
        Arc::new(InMemoryDataProvider::new()),
        Arc::new(FileDescriptorProvider::new(dir.path())),
    );

    let err = manager.create_template("FOO", "BAR").await.unwrap_err();
    assert!(matches!(
        err,
        WorkItemError::Descriptor(DescriptorError::Malformed { .. })
    ));
    assert!(!manager.descriptor_manager().is_loaded());
    Ok(())
}

#[tokio::test]
async fn duplicate_types_across_files_are_rejected() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    write_all(&dir, &[("a.json", BAR_JSON), ("b.json", BAR_JSON)])?;

    let manager = WorkItemManager::new(
        Arc::new(InMemoryDataProvider::new()),
        Arc::new(FileDescriptorProvider::new(dir.path())),
    );

    let err = manager.get("FOO", "1").await.unwrap_err();
    assert!(matches!(
        err,
        WorkItemError::Descriptor(DescriptorError::DuplicateType(name)) if name == "BAR"
    ));
    Ok(())
}

#[tokio::test]
async fn missing_root_is_an_io_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    let provider = FileDescriptorProvider::new(dir.path().join("absent"));

    let manager = WorkItemManager::new(Arc::new(InMemoryDataProvider::new()), Arc::new(provider));
    let err = manager.create_template("FOO", "BAR").await.unwrap_err();

    assert!(matches!(err, WorkItemError::Descriptor(DescriptorError::Io { .. })));
}
