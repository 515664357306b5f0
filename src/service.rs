use thiserror::Error;

use crate::access::AccessEvaluator;
use crate::calendar::{Calendar, CalendarSettings};
use crate::catalog::{CalendarCatalogBuilder, CalendarSettingsView, CalendarView};
use crate::directory::{Directories, User};
use crate::i18n::Localizer;
use crate::storage::{CalendarStore, StoreError};
use crate::validation::{CalendarConfigValidator, ValidationError, WriteMode};

#[derive(Debug, Error)]
pub enum CalendarError {
    #[error("No Calendar with id={0}")]
    NotFound(i64),
    #[error("No permission to edit calendar {0}")]
    Forbidden(i64),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Storage error: {0}")]
    Store(StoreError),
}

impl From<StoreError> for CalendarError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::CalendarNotFound(id) => CalendarError::NotFound(id),
            other => CalendarError::Store(other),
        }
    }
}

pub struct CalendarService<S: CalendarStore> {
    store: S,
    directories: Directories,
    localizer: Box<dyn Localizer>,
}

impl<S: CalendarStore> CalendarService<S> {
    pub fn new(store: S, directories: Directories, localizer: Box<dyn Localizer>) -> Self {
        Self {
            store,
            directories,
            localizer,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn evaluator(&self) -> AccessEvaluator<'_> {
        AccessEvaluator::new(
            self.directories.users.as_ref(),
            self.directories.projects.as_ref(),
        )
    }

    fn validator(&self) -> CalendarConfigValidator<'_> {
        CalendarConfigValidator::new(
            self.directories.projects.as_ref(),
            self.directories.filters.as_ref(),
            self.directories.fields.as_ref(),
            self.localizer.as_ref(),
        )
    }

    fn catalog(&self) -> CalendarCatalogBuilder<'_> {
        CalendarCatalogBuilder::new(&self.store, &self.directories, self.localizer.as_ref())
    }

    pub fn get_calendar(&self, id: i64) -> Result<Calendar, CalendarError> {
        self.store.get_calendar(id)?.ok_or(CalendarError::NotFound(id))
    }

    pub fn get_calendar_settings(&self, user: &User, id: i64) -> Result<CalendarSettingsView, CalendarError> {
        let calendar = self.get_calendar(id)?;
        Ok(self.catalog().build_settings(user, &calendar))
    }

    pub fn get_all_calendars(&self, user: &User) -> Result<Vec<CalendarView>, CalendarError> {
        Ok(self.catalog().build_catalog(user)?)
    }

    pub fn create_calendar(&self, user: Option<&User>, settings: &CalendarSettings) -> Result<CalendarView, CalendarError> {
        let source = self.validator().validate(user, settings, WriteMode::Create)?;
        let user = user.ok_or(ValidationError::Unauthenticated)?;

        let calendar = self.store.create_calendar(&user.key, settings)?;
        let subscription = self.store.add_subscription(calendar.id, &user.key, true)?;
        tracing::info!("{} created calendar {} on {}", user.key, calendar.id, source);

        let access = self.evaluator().evaluate(&calendar, user);
        let mut view = self.catalog().calendar_view(&calendar, Some(&subscription), access, 1);
        view.favorite = true;
        view.visible = true;
        Ok(view)
    }

    pub fn update_calendar(&self, user: &User, settings: &CalendarSettings) -> Result<CalendarView, CalendarError> {
        let id = settings
            .id
            .ok_or_else(|| ValidationError::Structural("Calendar id is required for update".to_string()))?;
        let calendar = self.get_calendar(id)?;
        self.require_admin(&calendar, user)?;

        self.validator().validate(Some(user), settings, WriteMode::Update)?;
        let calendar = self.store.update_calendar(id, settings)?;
        tracing::info!("{} updated calendar {}", user.key, id);

        let subscription = self.store.find_subscription(id, &user.key)?;
        let access = self.evaluator().evaluate(&calendar, user);
        let users_count = self.store.count_subscribers(id)?;
        let catalog = self.catalog();
        let mut view = catalog.calendar_view(&calendar, subscription.as_ref(), access, users_count);
        catalog.check_source(&mut view, user, &calendar);
        Ok(view)
    }

    pub fn delete_calendar(&self, user: &User, id: i64) -> Result<(), CalendarError> {
        let calendar = self.get_calendar(id)?;
        self.require_admin(&calendar, user)?;

        self.store.delete_calendar(id)?;
        tracing::info!("{} deleted calendar {}", user.key, id);
        Ok(())
    }

    pub fn update_calendar_visibility(&self, id: i64, user: &User, visible: bool) -> Result<(), CalendarError> {
        self.store.set_visibility(id, &user.key, visible).map_err(|e| {
            tracing::error!("Can't get UserCalendar for calendar={} and user={}", id, user.key);
            CalendarError::from(e)
        })
    }

    fn require_admin(&self, calendar: &Calendar, user: &User) -> Result<(), CalendarError> {
        if self.evaluator().has_admin_permission(calendar, user) {
            Ok(())
        } else {
            tracing::warn!("{} has no admin rights on calendar {}", user.key, calendar.id);
            Err(CalendarError::Forbidden(calendar.id))
        }
    }
}
