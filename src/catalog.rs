use std::collections::BTreeSet;

use serde::Serialize;

use crate::access::{Access, AccessEvaluator, ResolvedSubject, SubjectResolver};
use crate::calendar::{AccessLevel, Calendar, Permission, SubjectType, UserCalendar};
use crate::directory::{Directories, User};
use crate::i18n::{self, Localizer};
use crate::source_resolver::SourceResolver;
use crate::storage::{CalendarStore, StoreError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarView {
    pub id: i64,
    pub name: Option<String>,
    pub color: Option<String>,
    pub source: Option<String>,
    pub event_start: Option<String>,
    pub event_end: Option<String>,
    pub displayed_fields: Vec<String>,
    pub viewable: bool,
    pub can_admin: bool,
    pub visible: bool,
    pub favorite: bool,
    pub users_count: usize,
    pub has_error: bool,
    pub error: Option<String>,
}

impl CalendarView {
    fn new(calendar_id: i64, calendar: Option<&Calendar>) -> Self {
        Self {
            id: calendar.map(|c| c.id).unwrap_or(calendar_id),
            name: calendar.map(|c| c.name.clone()),
            color: calendar.map(|c| c.color.clone()),
            source: calendar.map(|c| c.source.clone()),
            event_start: calendar.map(|c| c.event_start.clone()),
            event_end: calendar.and_then(|c| c.event_end.clone()),
            displayed_fields: calendar.map(Calendar::displayed_field_list).unwrap_or_default(),
            viewable: false,
            can_admin: false,
            visible: false,
            favorite: false,
            users_count: 0,
            has_error: false,
            error: None,
        }
    }

    fn flag_error(&mut self, message: String) {
        self.has_error = true;
        self.error = Some(message);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum AvatarRef {
    Url(String),
    Project(i64),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PermissionItemView {
    pub id: String,
    pub subject_type: SubjectType,
    pub name: Option<String>,
    pub email: Option<String>,
    pub login: Option<String>,
    pub project_name: Option<String>,
    pub role_name: Option<String>,
    pub avatar: Option<AvatarRef>,
    pub access: AccessLevel,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarSettingsView {
    pub id: i64,
    pub name: String,
    pub color: String,
    pub source: String,
    pub source_name: String,
    pub source_unavailable: bool,
    pub source_avatar_id: Option<i64>,
    pub event_start: String,
    pub event_end: Option<String>,
    pub displayed_fields: Vec<String>,
    pub can_admin: bool,
    pub permissions: Option<Vec<PermissionItemView>>,
}

pub struct CalendarCatalogBuilder<'a> {
    store: &'a dyn CalendarStore,
    directories: &'a Directories,
    localizer: &'a dyn Localizer,
}

impl<'a> CalendarCatalogBuilder<'a> {
    pub fn new(
        store: &'a dyn CalendarStore,
        directories: &'a Directories,
        localizer: &'a dyn Localizer,
    ) -> Self {
        Self {
            store,
            directories,
            localizer,
        }
    }

    fn evaluator(&self) -> AccessEvaluator<'a> {
        AccessEvaluator::new(
            self.directories.users.as_ref(),
            self.directories.projects.as_ref(),
        )
    }

    fn source_resolver(&self) -> SourceResolver<'a> {
        SourceResolver::new(
            self.directories.projects.as_ref(),
            self.directories.filters.as_ref(),
            self.localizer,
        )
    }

    pub fn build_catalog(&self, user: &User) -> Result<Vec<CalendarView>, StoreError> {
        let evaluator = self.evaluator();
        let mut result = Vec::new();
        let mut emitted = BTreeSet::new();

        for calendar in self.store.list_calendars()? {
            let access = evaluator.evaluate(&calendar, user);
            let subscription = self.store.find_subscription(calendar.id, &user.key)?;
            if !access.has_any() && subscription.is_none() {
                continue;
            }
            let users_count = self.store.count_subscribers(calendar.id)?;
            let mut view = self.calendar_view(&calendar, subscription.as_ref(), access, users_count);
            if access.has_any() {
                self.check_source(&mut view, user, &calendar);
            } else {
                view.flag_error(self.localizer.text(i18n::UNAVAILABLE, &[]));
            }
            emitted.insert(calendar.id);
            result.push(view);
        }

        for subscription in self.store.subscriptions_for_user(&user.key)? {
            if emitted.contains(&subscription.calendar_id) {
                continue;
            }
            tracing::debug!(
                "Calendar {} subscribed by {} no longer exists",
                subscription.calendar_id,
                user.key
            );
            result.push(self.orphan_view(&subscription));
        }

        Ok(result)
    }

    pub fn calendar_view(
        &self,
        calendar: &Calendar,
        subscription: Option<&UserCalendar>,
        access: Access,
        users_count: usize,
    ) -> CalendarView {
        let mut view = CalendarView::new(calendar.id, Some(calendar));
        view.viewable = access.can_use;
        view.can_admin = access.can_admin;
        view.visible = subscription.map(|s| s.enabled).unwrap_or(false);
        view.favorite = subscription.is_some();
        view.users_count = users_count;
        view
    }

    pub fn check_source(&self, view: &mut CalendarView, user: &User, calendar: &Calendar) {
        if let Some(error) = self
            .source_resolver()
            .check_availability_error(&calendar.source, user)
        {
            view.flag_error(error);
        }
    }

    fn orphan_view(&self, subscription: &UserCalendar) -> CalendarView {
        let mut view = CalendarView::new(subscription.calendar_id, None);
        view.favorite = true;
        view.flag_error(self.localizer.text(i18n::UNAVAILABLE, &[]));
        view
    }

    pub fn build_settings(&self, user: &User, calendar: &Calendar) -> CalendarSettingsView {
        let source = self.source_resolver().resolve(&calendar.source, user);
        let can_admin = self.evaluator().has_admin_permission(calendar, user);

        let permissions: Vec<PermissionItemView> = calendar
            .permissions
            .iter()
            .filter_map(|permission| self.permission_item(user, permission))
            .collect();

        CalendarSettingsView {
            id: calendar.id,
            name: calendar.name.clone(),
            color: calendar.color.clone(),
            source: calendar.source.clone(),
            source_name: source.display_name,
            source_unavailable: source.is_unavailable,
            source_avatar_id: source.avatar_id,
            event_start: calendar.event_start.clone(),
            event_end: calendar.event_end.clone(),
            displayed_fields: calendar.displayed_field_list(),
            can_admin,
            permissions: if permissions.is_empty() {
                None
            } else {
                Some(permissions)
            },
        }
    }

    fn permission_item(&self, user: &User, permission: &Permission) -> Option<PermissionItemView> {
        let resolver = SubjectResolver::new(self.directories.users.as_ref());
        let Some(subject) = resolver.resolve(permission) else {
            tracing::warn!(
                "Dropping {} grant '{}': subject no longer resolves",
                permission.subject_type,
                permission.subject
            );
            return None;
        };

        let mut item = PermissionItemView {
            id: permission.subject.clone(),
            subject_type: permission.subject_type,
            name: None,
            email: None,
            login: None,
            project_name: None,
            role_name: None,
            avatar: None,
            access: permission.access_level(),
        };
        match subject {
            ResolvedSubject::User(subject_user) => {
                item.id = subject_user.key;
                item.name = Some(subject_user.display_name);
                item.email = Some(subject_user.email);
                item.login = Some(subject_user.name);
                item.avatar = subject_user.avatar_url.map(AvatarRef::Url);
            }
            ResolvedSubject::Group(group) => {
                item.name = Some(group.name);
            }
            ResolvedSubject::ProjectRole {
                project_id,
                role_id,
            } => {
                let projects = self.directories.projects.as_ref();
                let visible_project = projects
                    .find_project_by_id(project_id)
                    .filter(|project| projects.has_browse_permission(user, project));
                if let Some(project) = visible_project {
                    item.avatar = project.avatar_id.map(AvatarRef::Project);
                    item.project_name = Some(project.name);
                }
                item.role_name = projects.find_project_role_by_id(role_id).map(|role| role.name);
            }
        }
        Some(item)
    }
}
