pub mod calendar_type;
pub mod permission;
pub mod source;
pub mod user_calendar;

pub use calendar_type::{Calendar, CalendarSettings};
pub use permission::{AccessLevel, Permission, PermissionItem, Subject, SubjectType};
pub use source::{Source, SourceParseError};
pub use user_calendar::UserCalendar;
