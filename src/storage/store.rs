use thiserror::Error;

use crate::calendar::{Calendar, CalendarSettings, UserCalendar};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),
    #[error("Failed to prepare database location: {0}")]
    IoError(#[from] std::io::Error),
    #[error("No Calendar with id={0}")]
    CalendarNotFound(i64),
    #[error("No UserCalendar for calendar={calendar_id} and user={user_key}")]
    SubscriptionNotFound { calendar_id: i64, user_key: String },
    #[error("Corrupt row: {0}")]
    Corrupt(String),
}

/// Grants are always replaced as a whole: after `create_calendar` or
/// `update_calendar` returns, the stored set is exactly the one in the
/// payload, never a mix of old and new rows.
pub trait CalendarStore {
    fn get_calendar(&self, id: i64) -> Result<Option<Calendar>, StoreError>;

    fn list_calendars(&self) -> Result<Vec<Calendar>, StoreError>;

    fn create_calendar(&self, author_key: &str, settings: &CalendarSettings) -> Result<Calendar, StoreError>;

    fn update_calendar(&self, id: i64, settings: &CalendarSettings) -> Result<Calendar, StoreError>;

    fn delete_calendar(&self, id: i64) -> Result<(), StoreError>;

    fn find_subscription(&self, calendar_id: i64, user_key: &str) -> Result<Option<UserCalendar>, StoreError>;

    fn subscriptions_for_user(&self, user_key: &str) -> Result<Vec<UserCalendar>, StoreError>;

    fn add_subscription(&self, calendar_id: i64, user_key: &str, enabled: bool) -> Result<UserCalendar, StoreError>;

    fn set_visibility(&self, calendar_id: i64, user_key: &str, enabled: bool) -> Result<(), StoreError>;

    fn count_subscribers(&self, calendar_id: i64) -> Result<usize, StoreError>;
}
