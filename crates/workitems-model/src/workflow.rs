//! Stage evaluation
//!
//! Decides which stages a snapshot is in and what the effective property
//! descriptors are while in them.

use crate::descriptor::{
    CommandDescriptor, ConditionDescriptor, PropertyDescriptor, StageDescriptor, WorkItemDescriptor,
};
use crate::work_item::WorkItem;

impl ConditionDescriptor {
    /// Evaluate against the property values of `work_item`
    ///
    /// An absent property never equals anything.
    #[must_use]
    pub fn is_satisfied_by(&self, work_item: &WorkItem) -> bool {
        match self {
            Self::PropertyValue { property, value } => {
                work_item.value(property) == Some(value.as_str())
            }
            Self::All { conditions } => conditions.iter().all(|c| c.is_satisfied_by(work_item)),
            Self::Any { conditions } => conditions.iter().any(|c| c.is_satisfied_by(work_item)),
            Self::Not { condition } => !condition.is_satisfied_by(work_item),
        }
    }
}

impl WorkItemDescriptor {
    /// Stages whose condition holds for `work_item`, in declaration order
    #[must_use]
    pub fn matching_stages(&self, work_item: &WorkItem) -> Vec<&StageDescriptor> {
        self.stages
            .iter()
            .filter(|stage| stage.condition.is_satisfied_by(work_item))
            .collect()
    }

    /// Commands offered by the stages `work_item` is in
    #[must_use]
    pub fn available_commands(&self, work_item: &WorkItem) -> Vec<&CommandDescriptor> {
        self.matching_stages(work_item)
            .into_iter()
            .flat_map(|stage| stage.commands.iter())
            .collect()
    }

    /// Property descriptors with the overrides of every matching stage applied
    ///
    /// Editability can only be narrowed. Stage validators are appended
    /// after the base validators, stage by stage.
    #[must_use]
    pub fn effective_properties(&self, work_item: &WorkItem) -> Vec<PropertyDescriptor> {
        let stages = self.matching_stages(work_item);

        self.properties
            .iter()
            .map(|base| {
                let mut effective = base.clone();
                for stage in &stages {
                    for over in stage.properties.iter().filter(|o| o.name == base.name) {
                        if let Some(is_editable) = over.is_editable {
                            effective.is_editable &= is_editable;
                        }
                        effective.validators.extend(over.validators.iter().cloned());
                    }
                }
                effective
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{LogDescriptor, StagePropertyDescriptor, ValidatorDescriptor};
    use crate::work_item::Property;

    fn item(state: &str) -> WorkItem {
        WorkItem::new(
            "FOO",
            "1",
            "BAR",
            vec![
                Property::new("State", "String", state),
                Property::new("Title", "String", "t"),
            ],
            Vec::new(),
        )
    }

    fn descriptor() -> WorkItemDescriptor {
        WorkItemDescriptor::new(
            "BAR",
            LogDescriptor::default(),
            vec![
                PropertyDescriptor::new("State", "String"),
                PropertyDescriptor::new("Title", "String"),
            ],
            vec![
                StageDescriptor::new(
                    "open",
                    ConditionDescriptor::property_value("State", "Open"),
                    vec![StagePropertyDescriptor::new("Title")
                        .with_validator(ValidatorDescriptor::Mandatory)],
                    vec![CommandDescriptor::change_property_value(
                        "Close", "Close", "State", "Closed",
                    )],
                ),
                StageDescriptor::new(
                    "closed",
                    ConditionDescriptor::property_value("State", "Closed"),
                    vec![StagePropertyDescriptor::new("Title").editable(false)],
                    vec![CommandDescriptor::change_property_value(
                        "Reopen", "Reopen", "State", "Open",
                    )],
                ),
            ],
        )
    }

    #[test]
    fn property_value_condition() {
        let cond = ConditionDescriptor::property_value("State", "Open");
        assert!(cond.is_satisfied_by(&item("Open")));
        assert!(!cond.is_satisfied_by(&item("Closed")));

        let missing = ConditionDescriptor::property_value("Missing", "");
        assert!(!missing.is_satisfied_by(&item("Open")));
    }

    #[test]
    fn composite_conditions() {
        let open = ConditionDescriptor::property_value("State", "Open");
        let titled = ConditionDescriptor::property_value("Title", "t");

        let all = ConditionDescriptor::All {
            conditions: vec![open.clone(), titled.clone()],
        };
        let any = ConditionDescriptor::Any {
            conditions: vec![open.clone(), titled],
        };
        let not = ConditionDescriptor::Not {
            condition: Box::new(open),
        };

        assert!(all.is_satisfied_by(&item("Open")));
        assert!(!all.is_satisfied_by(&item("Closed")));
        assert!(any.is_satisfied_by(&item("Closed")));
        assert!(not.is_satisfied_by(&item("Closed")));
        assert!(!not.is_satisfied_by(&item("Open")));
    }

    #[test]
    fn available_commands_follow_stage() {
        let wid = descriptor();
        let names: Vec<_> = wid
            .available_commands(&item("Open"))
            .into_iter()
            .map(CommandDescriptor::name)
            .collect();
        assert_eq!(names, vec!["Close"]);

        assert!(wid.available_commands(&item("Unknown")).is_empty());
    }

    #[test]
    fn stage_borrows_outlive_the_work_item() {
        let wid = descriptor();

        let commands = {
            let open = item("Open");
            wid.available_commands(&open)
        };
        assert_eq!(commands[0].name(), "Close");

        let stages = {
            let closed = item("Closed");
            wid.matching_stages(&closed)
        };
        assert_eq!(stages.len(), 1);
        assert_eq!(stages[0].id, "closed");
    }

    #[test]
    fn effective_properties_apply_stage_overrides() {
        let wid = descriptor();

        let open = wid.effective_properties(&item("Open"));
        assert_eq!(open[1].validators, vec![ValidatorDescriptor::Mandatory]);
        assert!(open[1].is_editable);

        let closed = wid.effective_properties(&item("Closed"));
        assert!(closed[1].validators.is_empty());
        assert!(!closed[1].is_editable);
    }

    #[test]
    fn stage_override_cannot_widen_editability() {
        let mut wid = descriptor();
        wid.properties[1].is_editable = false;
        wid.stages[0].properties = vec![StagePropertyDescriptor::new("Title").editable(true)];

        let open = wid.effective_properties(&item("Open"));
        assert!(!open[1].is_editable);
    }
}
