pub mod config;
pub mod sqlite;
pub mod store;

pub use config::{Config, ConfigError};
pub use sqlite::SqliteStore;
pub use store::{CalendarStore, StoreError};
