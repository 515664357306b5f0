use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::calendar::{CalendarSettings, Source, SourceParseError};
use crate::directory::{FieldDirectory, FilterDirectory, ProjectDirectory, User};
use crate::i18n::{self, Localizer};

static COLOR_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new("^#([A-Fa-f0-9]{6}|[A-Fa-f0-9]{3})$").expect("color pattern is a valid regex")
});

pub const CUSTOM_FIELD_PREFIX: &str = "customfield_";

pub const STANDARD_FIELDS: [&str; 13] = [
    "description",
    "status",
    "assignee",
    "reporter",
    "priority",
    "created",
    "updated",
    "duedate",
    "components",
    "environment",
    "labels",
    "resolution",
    "versions",
];

pub const FIELD_NAME: &str = "name";
pub const FIELD_SOURCE: &str = "source";
pub const FIELD_COLOR: &str = "color";
pub const FIELD_EVENT_START: &str = "event-start";
pub const FIELD_FIELDS: &str = "fields";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("User doesn't exist")]
    Unauthenticated,
    #[error("{message}")]
    Field { field: &'static str, message: String },
    #[error("{0}")]
    Structural(String),
}

impl ValidationError {
    fn field(field: &'static str, message: impl Into<String>) -> Self {
        ValidationError::Field {
            field,
            message: message.into(),
        }
    }

    pub fn field_name(&self) -> Option<&'static str> {
        match self {
            ValidationError::Field { field, .. } => Some(*field),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    Create,
    Update,
}

pub struct CalendarConfigValidator<'a> {
    projects: &'a dyn ProjectDirectory,
    filters: &'a dyn FilterDirectory,
    fields: &'a dyn FieldDirectory,
    localizer: &'a dyn Localizer,
}

impl<'a> CalendarConfigValidator<'a> {
    pub fn new(
        projects: &'a dyn ProjectDirectory,
        filters: &'a dyn FilterDirectory,
        fields: &'a dyn FieldDirectory,
        localizer: &'a dyn Localizer,
    ) -> Self {
        Self {
            projects,
            filters,
            fields,
            localizer,
        }
    }

    /// Returns the parsed source on success. Source references are only
    /// checked against the directories on create; an existing calendar may
    /// keep a source that has since become unavailable.
    pub fn validate(
        &self,
        user: Option<&User>,
        settings: &CalendarSettings,
        mode: WriteMode,
    ) -> Result<Source, ValidationError> {
        let user = user.ok_or(ValidationError::Unauthenticated)?;

        self.require(&settings.name, FIELD_NAME, i18n::FIELD_NAME)?;
        self.require(&settings.source, FIELD_SOURCE, i18n::FIELD_SOURCE)?;
        self.require(&settings.color, FIELD_COLOR, i18n::FIELD_COLOR)?;
        self.require(&settings.event_start, FIELD_EVENT_START, i18n::FIELD_EVENT_START)?;

        if !COLOR_PATTERN.is_match(&settings.color) {
            return Err(ValidationError::Structural(format!(
                "Bad color => {}",
                settings.color
            )));
        }

        let source = Source::parse(&settings.source).map_err(|e| match e {
            SourceParseError::UnknownKind(reference) | SourceParseError::BadId(reference) => {
                ValidationError::Structural(format!("Bad source => {}", reference))
            }
        })?;

        if mode == WriteMode::Create {
            self.check_source_reachable(source, user)?;
        }

        for field in &settings.displayed_fields {
            self.check_displayed_field(field)?;
        }

        Ok(source)
    }

    fn require(
        &self,
        value: &str,
        field: &'static str,
        label_key: &str,
    ) -> Result<(), ValidationError> {
        if value.trim().is_empty() {
            let label = self.localizer.text(label_key, &[]);
            return Err(ValidationError::field(
                field,
                self.localizer.text(i18n::FIELD_REQUIRED, &[&label]),
            ));
        }
        Ok(())
    }

    fn check_source_reachable(&self, source: Source, user: &User) -> Result<(), ValidationError> {
        match source {
            Source::Project { id } => {
                let project = self.projects.find_project_by_id(id).ok_or_else(|| {
                    ValidationError::field(
                        FIELD_SOURCE,
                        format!("Can not find project with id => {}", id),
                    )
                })?;
                if !self.projects.has_browse_permission(user, &project) {
                    return Err(ValidationError::field(
                        FIELD_SOURCE,
                        format!("No Permission to browse project {}", project.name),
                    ));
                }
            }
            Source::Filter { id } => {
                if self.filters.find_filter_by_id(id).is_none() {
                    return Err(ValidationError::field(
                        FIELD_SOURCE,
                        format!("Can not find filter with id {}", id),
                    ));
                }
                let lookup = self.filters.find_saved_filter_by_id(id, user);
                if lookup.has_errors() {
                    return Err(ValidationError::field(FIELD_SOURCE, lookup.formatted_errors()));
                }
            }
        }
        Ok(())
    }

    fn check_displayed_field(&self, field: &str) -> Result<(), ValidationError> {
        if field.starts_with(CUSTOM_FIELD_PREFIX) {
            if self.fields.find_custom_field_by_id(field).is_none() {
                return Err(ValidationError::field(
                    FIELD_FIELDS,
                    format!("Can not find custom field with id => {}", field),
                ));
            }
        } else if !STANDARD_FIELDS.contains(&field) {
            return Err(ValidationError::field(
                FIELD_FIELDS,
                format!("Can not find field {} among standard fields", field),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::{MockFilterDirectory, MockProjectDirectory, StaticDirectory, UserDirectory};
    use crate::i18n::MessageBundle;

    fn test_directory() -> StaticDirectory {
        StaticDirectory::new()
            .with_user("alice", &[])
            .with_user("bob", &[])
            .with_project(10000, "CAL", "Calendar", &["alice"])
            .with_filter(42, "My open issues", "alice", &[])
            .with_custom_field("customfield_10100", "Sprint")
    }

    fn valid_settings() -> CalendarSettings {
        CalendarSettings {
            name: "Releases".to_string(),
            color: "#1a2b3c".to_string(),
            source: "project_10000".to_string(),
            event_start: "duedate".to_string(),
            displayed_fields: vec!["status".to_string()],
            ..CalendarSettings::default()
        }
    }

    fn validate(
        directory: &StaticDirectory,
        user_key: &str,
        settings: &CalendarSettings,
        mode: WriteMode,
    ) -> Result<Source, ValidationError> {
        let bundle = MessageBundle::new();
        let validator = CalendarConfigValidator::new(directory, directory, directory, &bundle);
        let user = directory.find_user_by_key(user_key);
        validator.validate(user.as_ref(), settings, mode)
    }

    #[test]
    fn valid_settings_return_parsed_source() {
        let directory = test_directory();

        let source = validate(&directory, "alice", &valid_settings(), WriteMode::Create);

        assert_eq!(source, Ok(Source::Project { id: 10000 }));
    }

    #[test]
    fn missing_user_is_rejected() {
        let directory = test_directory();

        let result = validate(&directory, "nobody", &valid_settings(), WriteMode::Create);

        assert_eq!(result, Err(ValidationError::Unauthenticated));
    }

    #[test]
    fn blank_fields_are_reported_in_order() {
        let directory = test_directory();
        let blank = CalendarSettings {
            name: "  ".to_string(),
            ..CalendarSettings::default()
        };

        let error = validate(&directory, "alice", &blank, WriteMode::Create).unwrap_err();
        assert_eq!(error.field_name(), Some(FIELD_NAME));
        assert_eq!(error.to_string(), "Name is required.");

        let no_source = CalendarSettings {
            source: String::new(),
            ..valid_settings()
        };
        let error = validate(&directory, "alice", &no_source, WriteMode::Create).unwrap_err();
        assert_eq!(error.field_name(), Some(FIELD_SOURCE));

        let no_color = CalendarSettings {
            color: String::new(),
            ..valid_settings()
        };
        let error = validate(&directory, "alice", &no_color, WriteMode::Create).unwrap_err();
        assert_eq!(error.field_name(), Some(FIELD_COLOR));

        let no_start = CalendarSettings {
            event_start: String::new(),
            ..valid_settings()
        };
        let error = validate(&directory, "alice", &no_start, WriteMode::Create).unwrap_err();
        assert_eq!(error.field_name(), Some(FIELD_EVENT_START));
    }

    #[test]
    fn five_digit_color_is_structural_error() {
        let directory = test_directory();
        let settings = CalendarSettings {
            color: "#12345".to_string(),
            ..valid_settings()
        };

        let result = validate(&directory, "alice", &settings, WriteMode::Create);

        assert_eq!(
            result,
            Err(ValidationError::Structural("Bad color => #12345".to_string()))
        );
    }

    #[test]
    fn six_and_three_digit_colors_are_accepted() {
        let directory = test_directory();
        for color in ["#1a2b3c", "#abc", "#ABCDEF"] {
            let settings = CalendarSettings {
                color: color.to_string(),
                ..valid_settings()
            };
            assert!(validate(&directory, "alice", &settings, WriteMode::Create).is_ok());
        }
    }

    #[test]
    fn unknown_source_prefix_is_structural_error() {
        let directory = test_directory();
        let settings = CalendarSettings {
            source: "board_1".to_string(),
            ..valid_settings()
        };

        let result = validate(&directory, "alice", &settings, WriteMode::Update);

        assert_eq!(
            result,
            Err(ValidationError::Structural("Bad source => board_1".to_string()))
        );
    }

    #[test]
    fn non_numeric_source_id_is_structural_even_on_update() {
        let directory = test_directory();
        let settings = CalendarSettings {
            source: "filter_abc".to_string(),
            ..valid_settings()
        };

        let result = validate(&directory, "alice", &settings, WriteMode::Update);

        assert!(matches!(result, Err(ValidationError::Structural(_))));
    }

    #[test]
    fn missing_project_on_create_is_source_error() {
        let directory = test_directory();
        let settings = CalendarSettings {
            source: "project_999".to_string(),
            ..valid_settings()
        };

        let error = validate(&directory, "alice", &settings, WriteMode::Create).unwrap_err();

        assert_eq!(error.field_name(), Some(FIELD_SOURCE));
        assert_eq!(error.to_string(), "Can not find project with id => 999");
    }

    #[test]
    fn missing_project_on_update_is_accepted() {
        let directory = test_directory();
        let settings = CalendarSettings {
            source: "project_999".to_string(),
            ..valid_settings()
        };

        let result = validate(&directory, "alice", &settings, WriteMode::Update);

        assert_eq!(result, Ok(Source::Project { id: 999 }));
    }

    #[test]
    fn update_never_consults_source_directories() {
        let directory = test_directory();
        let bundle = MessageBundle::new();
        let mut projects = MockProjectDirectory::new();
        projects.expect_find_project_by_id().never();
        projects.expect_has_browse_permission().never();
        let mut filters = MockFilterDirectory::new();
        filters.expect_find_filter_by_id().never();
        filters.expect_find_saved_filter_by_id().never();
        let validator = CalendarConfigValidator::new(&projects, &filters, &directory, &bundle);
        let alice = directory.find_user_by_key("alice").unwrap();

        for source in ["project_1", "filter_2"] {
            let settings = CalendarSettings {
                source: source.to_string(),
                ..valid_settings()
            };
            assert!(validator.validate(Some(&alice), &settings, WriteMode::Update).is_ok());
        }
    }

    #[test]
    fn project_without_browse_permission_is_rejected_on_create() {
        let directory = test_directory();

        let error = validate(&directory, "bob", &valid_settings(), WriteMode::Create).unwrap_err();

        assert_eq!(error.field_name(), Some(FIELD_SOURCE));
        assert_eq!(error.to_string(), "No Permission to browse project Calendar");
    }

    #[test]
    fn missing_filter_on_create_is_source_error() {
        let directory = test_directory();
        let settings = CalendarSettings {
            source: "filter_77".to_string(),
            ..valid_settings()
        };

        let error = validate(&directory, "alice", &settings, WriteMode::Create).unwrap_err();

        assert_eq!(error.to_string(), "Can not find filter with id 77");
    }

    #[test]
    fn filter_not_shared_with_user_is_rejected_on_create() {
        let directory = test_directory();
        let settings = CalendarSettings {
            source: "filter_42".to_string(),
            ..valid_settings()
        };

        let error = validate(&directory, "bob", &settings, WriteMode::Create).unwrap_err();

        assert_eq!(error.field_name(), Some(FIELD_SOURCE));
        assert!(validate(&directory, "alice", &settings, WriteMode::Create).is_ok());
    }

    #[test]
    fn displayed_fields_accept_known_custom_and_standard_fields() {
        let directory = test_directory();
        let settings = CalendarSettings {
            displayed_fields: vec!["customfield_10100".to_string(), "status".to_string()],
            ..valid_settings()
        };

        assert!(validate(&directory, "alice", &settings, WriteMode::Update).is_ok());
    }

    #[test]
    fn displayed_fields_reject_unknown_fields() {
        let directory = test_directory();
        for field in ["bogus_field", "customfield_99999"] {
            let settings = CalendarSettings {
                displayed_fields: vec![field.to_string()],
                ..valid_settings()
            };

            let error = validate(&directory, "alice", &settings, WriteMode::Update).unwrap_err();

            assert_eq!(error.field_name(), Some(FIELD_FIELDS));
        }
    }
}
