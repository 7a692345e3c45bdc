//! Create / get / update lifecycle against in-memory collaborators

use futures::future::join_all;
use pretty_assertions::assert_eq;
use workitems_core::provider::InMemoryDataProvider;
use workitems_core::{WorkItemError, WorkItemsConfig};
use workitems_model::{PropertyChange, PropertyDescriptor, ValidatorDescriptor, WorkItemDescriptor};
use workitems_test_utils::{bar_immutable_b, bar_plain, bar_required_a, string, TestHarness};

#[tokio::test]
async fn create_with_nothing_required_succeeds() -> anyhow::Result<()> {
    let harness = TestHarness::new(vec![bar_plain()]);

    let result = harness
        .manager
        .create("FOO", "BAR", &[string("A", "aa"), string("B", "")])
        .await?;

    assert!(result.success);
    assert!(result.errors.is_empty());

    let created = result.created_work_item.expect("created item");
    assert_eq!(created.id(), "1");
    assert_eq!(created.project_code(), "FOO");
    assert!(created.log().is_empty());

    let stored = harness.manager.get("FOO", "1").await?;
    assert_eq!(stored, Some(created));
    Ok(())
}

#[tokio::test]
async fn create_with_blank_required_property_reports_completeness() -> anyhow::Result<()> {
    let harness = TestHarness::new(vec![bar_required_a()]);

    let result = harness
        .manager
        .create("FOO", "BAR", &[string("A", ""), string("B", "bb")])
        .await?;

    assert!(!result.success);
    assert_eq!(result.errors.len(), 1);

    let error = &result.errors[0];
    assert_eq!(error.source, "CompletenessValidator");
    assert_eq!(error.property, "A");
    assert_eq!(error.project_code, "FOO");
    assert_eq!(error.id, "1");

    assert!(result.created_work_item.is_some());
    assert!(harness.data.is_empty());
    Ok(())
}

#[tokio::test]
async fn create_missing_declared_property_reports_completeness() -> anyhow::Result<()> {
    let harness = TestHarness::new(vec![bar_plain()]);

    let result = harness.manager.create("FOO", "BAR", &[string("B", "bb")]).await?;

    assert!(!result.success);
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].source, "CompletenessValidator");
    assert_eq!(result.errors[0].property, "A");
    Ok(())
}

#[tokio::test]
async fn mandatory_property_yields_exactly_one_error() -> anyhow::Result<()> {
    let descriptor = WorkItemDescriptor::with_properties(
        "TASK",
        vec![
            PropertyDescriptor::new("Title", "String")
                .required()
                .with_validator(ValidatorDescriptor::Mandatory),
            PropertyDescriptor::new("Note", "String"),
        ],
    );
    let harness = TestHarness::new(vec![descriptor]);

    for properties in [
        vec![string("Note", "x")],
        vec![string("Title", ""), string("Note", "x")],
        vec![string("Title", "   "), string("Note", "")],
    ] {
        let result = harness.manager.create("FOO", "TASK", &properties).await?;
        assert!(!result.success);
        assert!(result.created_work_item.is_some());
        assert_eq!(result.errors.len(), 1, "{properties:?}");
        assert_eq!(result.errors[0].source, "MandatoryValidator");
        assert_eq!(result.errors[0].property, "Title");
    }

    assert_eq!(harness.data.saved_new_count(), 0);
    Ok(())
}

#[tokio::test]
async fn non_editable_property_is_settable_on_create_only() -> anyhow::Result<()> {
    let harness = TestHarness::new(vec![bar_immutable_b()]);

    let created = harness
        .manager
        .create("FOO", "BAR", &[string("A", "aa"), string("B", "")])
        .await?;
    assert!(created.success);

    let with_b = harness
        .manager
        .create("FOO", "BAR", &[string("A", "aa"), string("B", "bb")])
        .await?;
    assert!(with_b.success);

    let updated = harness.manager.update("FOO", "1", &[string("B", "bb")]).await?;
    assert!(!updated.success);
    assert_eq!(updated.errors.len(), 1);
    assert_eq!(updated.errors[0].source, "ImmutableValidator");
    assert_eq!(updated.errors[0].property, "B");
    assert_eq!(harness.data.saved_updated_count(), 0);

    let stored = harness.manager.get("FOO", "1").await?.expect("stored item");
    assert_eq!(stored.value("B"), Some(""));
    Ok(())
}

#[tokio::test]
async fn empty_create_is_a_distinct_no_op() -> anyhow::Result<()> {
    let harness = TestHarness::new(vec![bar_plain()]);

    let result = harness.manager.create("FOO", "BAR", &[]).await?;
    assert!(!result.success);
    assert!(result.created_work_item.is_none());
    assert!(result.errors.is_empty());

    let next = harness
        .manager
        .create("FOO", "BAR", &[string("A", "aa"), string("B", "")])
        .await?;
    assert_eq!(next.created_work_item.expect("created item").id(), "1");
    Ok(())
}

#[tokio::test]
async fn update_applies_only_existing_changed_properties() -> anyhow::Result<()> {
    let harness = TestHarness::new(vec![bar_plain()]);
    harness
        .manager
        .create("FOO", "BAR", &[string("A", "aa"), string("B", "bb")])
        .await?;

    let result = harness
        .manager
        .update("FOO", "1", &[string("A", "aa"), string("B", "cc"), string("Z", "zz")])
        .await?;

    assert!(result.success);
    let updated = result.updated_work_item.expect("updated item");
    assert_eq!(updated.value("A"), Some("aa"));
    assert_eq!(updated.value("B"), Some("cc"));
    assert!(!updated.contains("Z"));
    assert_eq!(updated.log().len(), 1);
    assert_eq!(updated.log()[0].changes, vec![PropertyChange::new("B", "bb", "cc")]);

    assert_eq!(harness.manager.get("FOO", "1").await?, Some(updated));
    Ok(())
}

#[tokio::test]
async fn update_without_changes_still_appends_log_entry() -> anyhow::Result<()> {
    let harness = TestHarness::new(vec![bar_plain()]);
    harness
        .manager
        .create("FOO", "BAR", &[string("A", "aa"), string("B", "")])
        .await?;

    let first = harness.manager.update("FOO", "1", &[]).await?;
    assert!(first.success);
    let first = first.updated_work_item.expect("updated item");
    assert_eq!(first.log().len(), 1);
    assert_eq!(first.log()[0].entry_type, "Comment");
    assert!(first.log()[0].changes.is_empty());

    let second = harness.manager.update("FOO", "1", &[string("A", "aa")]).await?;
    let second = second.updated_work_item.expect("updated item");
    assert_eq!(second.log().len(), 2);
    assert_eq!(second.log()[0], first.log()[0]);
    Ok(())
}

#[tokio::test]
async fn update_of_unknown_id_reports_not_found() -> anyhow::Result<()> {
    let harness = TestHarness::new(vec![bar_plain()]);

    let result = harness.manager.update("FOO", "99", &[string("A", "x")]).await?;

    assert!(!result.success);
    assert!(result.updated_work_item.is_none());
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].id, "99");
    assert_eq!(result.errors[0].source, "WorkItemManager");
    assert!(result.errors[0].is_item_scoped());
    Ok(())
}

#[tokio::test]
async fn unknown_type_creates_without_rules() -> anyhow::Result<()> {
    let harness = TestHarness::new(vec![bar_plain()]);

    let template = harness.manager.create_template("FOO", "OTHER").await?;
    assert_eq!(template.properties().len(), 0);

    let result = harness.manager.create("FOO", "OTHER", &[string("X", "x")]).await?;
    assert!(result.success);
    Ok(())
}

#[tokio::test]
async fn read_only_provider_rejects_writes() {
    let harness = TestHarness::with_data(
        vec![bar_plain()],
        WorkItemsConfig::new(),
        InMemoryDataProvider::with_capabilities(true, false),
    );

    let err = harness
        .manager
        .create("FOO", "BAR", &[string("A", "aa")])
        .await
        .unwrap_err();
    assert!(matches!(err, WorkItemError::NotPermitted { operation: "write" }));

    let err = harness.manager.update("FOO", "1", &[]).await.unwrap_err();
    assert!(matches!(err, WorkItemError::NotPermitted { operation: "write" }));
}

#[tokio::test]
async fn descriptors_load_once_across_operations() -> anyhow::Result<()> {
    let harness = TestHarness::new(vec![bar_plain()]);

    harness.manager.create_template("FOO", "BAR").await?;
    harness
        .manager
        .create("FOO", "BAR", &[string("A", "aa"), string("B", "")])
        .await?;
    harness.manager.get("FOO", "1").await?;
    harness.manager.update("FOO", "1", &[string("A", "ab")]).await?;

    assert_eq!(harness.descriptors.load_count(), 1);
    Ok(())
}

#[tokio::test]
async fn concurrent_creates_get_distinct_ids() -> anyhow::Result<()> {
    let harness = TestHarness::new(vec![bar_plain()]);
    let properties = [string("A", "aa"), string("B", "")];

    let results =
        join_all((0..10).map(|_| harness.manager.create("FOO", "BAR", &properties))).await;

    let mut ids = Vec::new();
    for result in results {
        let result = result?;
        assert!(result.success);
        ids.push(result.created_work_item.expect("created item").id().parse::<u64>()?);
    }
    ids.sort_unstable();

    assert_eq!(ids, (1..=10).collect::<Vec<_>>());
    assert_eq!(harness.descriptors.load_count(), 1);
    Ok(())
}
