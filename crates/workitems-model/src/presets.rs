//! Built-in descriptors

use crate::descriptor::{
    CommandDescriptor, ConditionDescriptor, LogDescriptor, LogEntryTypeDescriptor,
    PropertyDescriptor, PropertyType, StageDescriptor, ValidatorDescriptor,
    ValueProviderDescriptor, WorkItemDescriptor,
};

/// Type name of [`sdlc_issue`]
pub const ISSUE_TYPE: &str = "Issue";

/// State property of [`sdlc_issue`]
pub const STATE: &str = "State";
/// Title property of [`sdlc_issue`]
pub const TITLE: &str = "Title";
/// Description property of [`sdlc_issue`]
pub const DESCRIPTION: &str = "Description";
/// Label property of [`sdlc_issue`]
pub const LABEL: &str = "Label";
/// Milestone property of [`sdlc_issue`]
pub const MILESTONE: &str = "Milestone";
/// Assignee property of [`sdlc_issue`]
pub const ASSIGNEE: &str = "Assignee";

/// Issue tracker style work item type
///
/// `State` is only changed through the `Close` command of stage
/// `stage-Open`; labels, milestones and assignees are resolved per project.
#[must_use]
pub fn sdlc_issue() -> WorkItemDescriptor {
    WorkItemDescriptor::new(
        ISSUE_TYPE,
        LogDescriptor::new(
            false,
            vec![
                LogEntryTypeDescriptor::new("assignmentChange"),
                LogEntryTypeDescriptor::new("milestoneChange"),
                LogEntryTypeDescriptor::new("labelChange"),
                LogEntryTypeDescriptor::new("stateChange"),
            ],
        ),
        vec![
            PropertyDescriptor::new(STATE, "String")
                .editable(false)
                .with_initial_value("Open")
                .with_value_provider(ValueProviderDescriptor::enumeration([
                    ("Open", "Open"),
                    ("Closed", "Closed"),
                ])),
            PropertyDescriptor::new(TITLE, "String")
                .with_validator(ValidatorDescriptor::StringLength { min: 3, max: 1000 })
                .with_validator(ValidatorDescriptor::Mandatory),
            PropertyDescriptor::new(DESCRIPTION, "String")
                .with_validator(ValidatorDescriptor::StringLength { min: 0, max: 4000 }),
            PropertyDescriptor::new(LABEL, "String")
                .with_property_type(PropertyType::MultipleValue)
                .with_value_provider(ValueProviderDescriptor::ProjectCollection {
                    collection: "labels".to_string(),
                }),
            PropertyDescriptor::new(MILESTONE, "String")
                .with_property_type(PropertyType::MultipleValue)
                .with_value_provider(ValueProviderDescriptor::ProjectCollection {
                    collection: "milestones".to_string(),
                }),
            PropertyDescriptor::new(ASSIGNEE, "String")
                .with_property_type(PropertyType::MultipleValue)
                .with_value_provider(ValueProviderDescriptor::ProjectUsers {
                    role: String::new(),
                }),
        ],
        vec![StageDescriptor::new(
            "stage-Open",
            ConditionDescriptor::property_value(STATE, "Open"),
            Vec::new(),
            vec![CommandDescriptor::change_property_value("Close", "Close", STATE, "Closed")],
        )],
    )
}
