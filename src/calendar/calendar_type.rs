use serde::{Deserialize, Serialize};

use super::permission::{Permission, PermissionItem};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Calendar {
    pub id: i64,
    pub name: String,
    pub author_key: String,
    pub color: String,
    pub source: String,
    pub event_start: String,
    pub event_end: Option<String>,
    pub displayed_fields: String,
    pub permissions: Vec<Permission>,
}

impl Calendar {
    pub fn displayed_field_list(&self) -> Vec<String> {
        if self.displayed_fields.is_empty() {
            return Vec::new();
        }
        self.displayed_fields.split(',').map(str::to_string).collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CalendarSettings {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub event_start: String,
    #[serde(default)]
    pub event_end: Option<String>,
    #[serde(default)]
    pub displayed_fields: Vec<String>,
    #[serde(default)]
    pub permissions: Vec<PermissionItem>,
}

impl CalendarSettings {
    pub fn joined_displayed_fields(&self) -> String {
        self.displayed_fields.join(",")
    }

    pub fn grants(&self) -> Vec<Permission> {
        self.permissions.iter().map(Permission::from_item).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::SubjectType;

    fn create_test_calendar(displayed_fields: &str) -> Calendar {
        Calendar {
            id: 1,
            name: "Releases".to_string(),
            author_key: "alice".to_string(),
            color: "#1a73e8".to_string(),
            source: "project_10000".to_string(),
            event_start: "duedate".to_string(),
            event_end: None,
            displayed_fields: displayed_fields.to_string(),
            permissions: vec![],
        }
    }

    #[test]
    fn empty_displayed_fields_yield_empty_list() {
        let calendar = create_test_calendar("");

        assert!(calendar.displayed_field_list().is_empty());
    }

    #[test]
    fn displayed_fields_are_split_on_commas() {
        let calendar = create_test_calendar("status,assignee,customfield_10100");

        assert_eq!(
            calendar.displayed_field_list(),
            vec!["status", "assignee", "customfield_10100"]
        );
    }

    #[test]
    fn settings_join_displayed_fields() {
        let settings = CalendarSettings {
            displayed_fields: vec!["status".to_string(), "labels".to_string()],
            ..CalendarSettings::default()
        };

        assert_eq!(settings.joined_displayed_fields(), "status,labels");
    }

    #[test]
    fn settings_parse_from_json_with_missing_fields() {
        let json = r##"{
            "name": "Team",
            "color": "#abc",
            "source": "filter_42",
            "event_start": "created",
            "permissions": [
                { "subject_type": "GROUP", "subject": "developers", "access": "use" }
            ]
        }"##;

        let settings: CalendarSettings = serde_json::from_str(json).unwrap();

        assert_eq!(settings.id, None);
        assert_eq!(settings.event_end, None);
        assert!(settings.displayed_fields.is_empty());
        assert_eq!(settings.permissions[0].subject_type, SubjectType::Group);
        let grants = settings.grants();
        assert!(grants[0].use_);
        assert!(!grants[0].admin);
    }
}
