pub mod access;
pub mod calendar;
pub mod catalog;
pub mod directory;
pub mod i18n;
pub mod service;
pub mod source_resolver;
pub mod storage;
pub mod validation;

pub use access::{Access, AccessEvaluator};
pub use calendar::{Calendar, CalendarSettings, Permission, Source, Subject, SubjectType, UserCalendar};
pub use catalog::{CalendarCatalogBuilder, CalendarSettingsView, CalendarView};
pub use service::{CalendarError, CalendarService};
pub use source_resolver::{SourceDescriptor, SourceResolver};
pub use validation::{CalendarConfigValidator, ValidationError, WriteMode};
