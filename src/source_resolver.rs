use serde::Serialize;

use crate::calendar::source::FILTER_PREFIX;
use crate::calendar::{Source, SourceParseError};
use crate::directory::{FilterDirectory, ProjectDirectory, User};
use crate::i18n::{self, Localizer};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceDescriptor {
    pub display_name: String,
    pub is_unavailable: bool,
    pub avatar_id: Option<i64>,
}

impl SourceDescriptor {
    fn available(display_name: String, avatar_id: Option<i64>) -> Self {
        Self {
            display_name,
            is_unavailable: false,
            avatar_id,
        }
    }
}

pub struct SourceResolver<'a> {
    projects: &'a dyn ProjectDirectory,
    filters: &'a dyn FilterDirectory,
    localizer: &'a dyn Localizer,
}

impl<'a> SourceResolver<'a> {
    pub fn new(
        projects: &'a dyn ProjectDirectory,
        filters: &'a dyn FilterDirectory,
        localizer: &'a dyn Localizer,
    ) -> Self {
        Self {
            projects,
            filters,
            localizer,
        }
    }

    pub fn resolve(&self, source_ref: &str, user: &User) -> SourceDescriptor {
        match Source::parse(source_ref) {
            Ok(Source::Project { id }) => self.resolve_project(id, user),
            Ok(Source::Filter { id }) => self.resolve_filter(id, user),
            Err(SourceParseError::BadId(_)) => {
                tracing::warn!("Calendar source '{}' has a malformed id", source_ref);
                self.unavailable()
            }
            Err(SourceParseError::UnknownKind(_)) => {
                tracing::warn!("Calendar source '{}' has an unknown kind", source_ref);
                SourceDescriptor::available(self.localizer.text(i18n::UNKNOWN_SOURCE, &[]), None)
            }
        }
    }

    /// Cheap check for already saved calendars. Only filter sources are
    /// looked at; project sources are always treated as resolvable here.
    pub fn check_availability_error(&self, source_ref: &str, user: &User) -> Option<String> {
        match Source::parse(source_ref) {
            Ok(Source::Filter { id }) => {
                let lookup = self.filters.find_saved_filter_by_id(id, user);
                if lookup.has_errors() {
                    tracing::debug!("Filter {} is not available to {}", id, user.key);
                    Some(lookup.formatted_errors())
                } else {
                    None
                }
            }
            Err(SourceParseError::BadId(reference)) if reference.starts_with(FILTER_PREFIX) => {
                Some(self.localizer.text(i18n::UNAVAILABLE_SOURCE, &[]))
            }
            Ok(Source::Project { .. }) | Err(_) => None,
        }
    }

    fn resolve_project(&self, project_id: i64, user: &User) -> SourceDescriptor {
        match self.projects.find_project_by_id(project_id) {
            Some(project) if self.projects.has_browse_permission(user, &project) => {
                SourceDescriptor::available(
                    format!("{} ({})", project.name, project.key),
                    project.avatar_id,
                )
            }
            Some(_) => {
                tracing::debug!("{} cannot browse project {}", user.key, project_id);
                self.unavailable()
            }
            None => {
                tracing::debug!("Project {} no longer exists", project_id);
                self.unavailable()
            }
        }
    }

    fn resolve_filter(&self, filter_id: i64, user: &User) -> SourceDescriptor {
        let lookup = self.filters.find_saved_filter_by_id(filter_id, user);
        match lookup.filter {
            Some(filter) if lookup.errors.is_empty() => SourceDescriptor::available(filter.name, None),
            _ => {
                tracing::debug!("Filter {} is not available to {}", filter_id, user.key);
                self.unavailable()
            }
        }
    }

    fn unavailable(&self) -> SourceDescriptor {
        SourceDescriptor {
            display_name: self.localizer.text(i18n::UNAVAILABLE_SOURCE, &[]),
            is_unavailable: true,
            avatar_id: None,
        }
    }
}
