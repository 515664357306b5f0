use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};

use crate::calendar::{Calendar, CalendarSettings, Permission, UserCalendar};

use super::store::{CalendarStore, StoreError};

const CALENDAR_COLUMNS: &str =
    "id, name, author_key, color, source, event_start, event_end, displayed_fields";

pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let store = Self::new(Connection::open(path)?);
        store.initialize()?;
        Ok(store)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        let store = Self::new(Connection::open_in_memory()?);
        store.initialize()?;
        Ok(store)
    }

    pub fn initialize(&self) -> Result<(), StoreError> {
        self.conn.execute_batch(
            "PRAGMA foreign_keys = ON;

            CREATE TABLE IF NOT EXISTS calendars (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                author_key TEXT NOT NULL,
                color TEXT NOT NULL,
                source TEXT NOT NULL,
                event_start TEXT NOT NULL,
                event_end TEXT,
                displayed_fields TEXT NOT NULL DEFAULT ''
            );

            CREATE TABLE IF NOT EXISTS permissions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                calendar_id INTEGER NOT NULL REFERENCES calendars(id) ON DELETE CASCADE,
                subject_type TEXT NOT NULL,
                subject TEXT NOT NULL,
                is_admin INTEGER NOT NULL,
                is_use INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS user_calendars (
                calendar_id INTEGER NOT NULL,
                user_key TEXT NOT NULL,
                enabled INTEGER NOT NULL,
                favorite INTEGER NOT NULL,
                PRIMARY KEY (calendar_id, user_key)
            );",
        )?;
        Ok(())
    }

    pub fn table_exists(&self, table_name: &str) -> bool {
        let result: SqliteResult<i32> = self.conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?1",
            [table_name],
            |row| row.get(0),
        );
        result.unwrap_or(0) > 0
    }

    fn load_calendar(&self, conn: &Connection, id: i64) -> Result<Option<Calendar>, StoreError> {
        let calendar = conn
            .query_row(
                &format!("SELECT {} FROM calendars WHERE id = ?1", CALENDAR_COLUMNS),
                [id],
                calendar_from_row,
            )
            .optional()?;
        match calendar {
            Some(mut calendar) => {
                calendar.permissions = load_permissions(conn, calendar.id)?;
                Ok(Some(calendar))
            }
            None => Ok(None),
        }
    }
}

fn calendar_from_row(row: &Row<'_>) -> SqliteResult<Calendar> {
    Ok(Calendar {
        id: row.get(0)?,
        name: row.get(1)?,
        author_key: row.get(2)?,
        color: row.get(3)?,
        source: row.get(4)?,
        event_start: row.get(5)?,
        event_end: row.get(6)?,
        displayed_fields: row.get(7)?,
        permissions: Vec::new(),
    })
}

fn subscription_from_row(row: &Row<'_>) -> SqliteResult<UserCalendar> {
    Ok(UserCalendar {
        calendar_id: row.get(0)?,
        user_key: row.get(1)?,
        enabled: row.get(2)?,
        favorite: row.get(3)?,
    })
}

fn load_permissions(conn: &Connection, calendar_id: i64) -> Result<Vec<Permission>, StoreError> {
    let mut stmt = conn.prepare(
        "SELECT subject_type, subject, is_admin, is_use FROM permissions
         WHERE calendar_id = ?1 ORDER BY id",
    )?;
    let rows = stmt.query_map([calendar_id], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, bool>(2)?,
            row.get::<_, bool>(3)?,
        ))
    })?;

    let mut permissions = Vec::new();
    for row in rows {
        let (subject_type, subject, admin, use_) = row?;
        permissions.push(Permission {
            subject_type: subject_type.parse().map_err(StoreError::Corrupt)?,
            subject,
            admin,
            use_,
        });
    }
    Ok(permissions)
}

fn replace_permissions(conn: &Connection, calendar_id: i64, permissions: &[Permission]) -> Result<(), StoreError> {
    conn.execute("DELETE FROM permissions WHERE calendar_id = ?1", [calendar_id])?;
    let mut stmt = conn.prepare(
        "INSERT INTO permissions (calendar_id, subject_type, subject, is_admin, is_use)
         VALUES (?1, ?2, ?3, ?4, ?5)",
    )?;
    for permission in permissions {
        stmt.execute(params![
            calendar_id,
            permission.subject_type.as_str(),
            &permission.subject,
            permission.admin,
            permission.use_,
        ])?;
    }
    Ok(())
}

impl CalendarStore for SqliteStore {
    fn get_calendar(&self, id: i64) -> Result<Option<Calendar>, StoreError> {
        self.load_calendar(&self.conn, id)
    }

    fn list_calendars(&self) -> Result<Vec<Calendar>, StoreError> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {} FROM calendars ORDER BY id", CALENDAR_COLUMNS))?;
        let calendars = stmt
            .query_map([], calendar_from_row)?
            .collect::<SqliteResult<Vec<_>>>()?;

        let mut result = Vec::with_capacity(calendars.len());
        for mut calendar in calendars {
            calendar.permissions = load_permissions(&self.conn, calendar.id)?;
            result.push(calendar);
        }
        Ok(result)
    }

    fn create_calendar(&self, author_key: &str, settings: &CalendarSettings) -> Result<Calendar, StoreError> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO calendars (name, author_key, color, source, event_start, event_end, displayed_fields)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                &settings.name,
                author_key,
                &settings.color,
                &settings.source,
                &settings.event_start,
                &settings.event_end,
                settings.joined_displayed_fields(),
            ],
        )?;
        let id = tx.last_insert_rowid();
        replace_permissions(&tx, id, &settings.grants())?;
        let calendar = self.load_calendar(&tx, id)?;
        tx.commit()?;

        tracing::info!("Created calendar {} for {}", id, author_key);
        calendar.ok_or(StoreError::CalendarNotFound(id))
    }

    fn update_calendar(&self, id: i64, settings: &CalendarSettings) -> Result<Calendar, StoreError> {
        let tx = self.conn.unchecked_transaction()?;
        let updated = tx.execute(
            "UPDATE calendars SET name = ?1, color = ?2, source = ?3, event_start = ?4,
             event_end = ?5, displayed_fields = ?6 WHERE id = ?7",
            params![
                &settings.name,
                &settings.color,
                &settings.source,
                &settings.event_start,
                &settings.event_end,
                settings.joined_displayed_fields(),
                id,
            ],
        )?;
        if updated == 0 {
            return Err(StoreError::CalendarNotFound(id));
        }
        replace_permissions(&tx, id, &settings.grants())?;
        let calendar = self.load_calendar(&tx, id)?;
        tx.commit()?;

        tracing::info!("Updated calendar {}", id);
        calendar.ok_or(StoreError::CalendarNotFound(id))
    }

    fn delete_calendar(&self, id: i64) -> Result<(), StoreError> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM permissions WHERE calendar_id = ?1", [id])?;
        tx.execute("DELETE FROM user_calendars WHERE calendar_id = ?1", [id])?;
        let deleted = tx.execute("DELETE FROM calendars WHERE id = ?1", [id])?;
        if deleted == 0 {
            return Err(StoreError::CalendarNotFound(id));
        }
        tx.commit()?;

        tracing::info!("Deleted calendar {}", id);
        Ok(())
    }

    fn find_subscription(&self, calendar_id: i64, user_key: &str) -> Result<Option<UserCalendar>, StoreError> {
        let subscription = self
            .conn
            .query_row(
                "SELECT calendar_id, user_key, enabled, favorite FROM user_calendars
                 WHERE calendar_id = ?1 AND user_key = ?2",
                params![calendar_id, user_key],
                subscription_from_row,
            )
            .optional()?;
        Ok(subscription)
    }

    fn subscriptions_for_user(&self, user_key: &str) -> Result<Vec<UserCalendar>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT calendar_id, user_key, enabled, favorite FROM user_calendars
             WHERE user_key = ?1 ORDER BY calendar_id",
        )?;
        let subscriptions = stmt
            .query_map([user_key], subscription_from_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(subscriptions)
    }

    fn add_subscription(&self, calendar_id: i64, user_key: &str, enabled: bool) -> Result<UserCalendar, StoreError> {
        self.conn.execute(
            "INSERT INTO user_calendars (calendar_id, user_key, enabled, favorite)
             VALUES (?1, ?2, ?3, 1)
             ON CONFLICT(calendar_id, user_key) DO UPDATE SET enabled = excluded.enabled, favorite = 1",
            params![calendar_id, user_key, enabled],
        )?;
        Ok(UserCalendar::new(calendar_id, user_key, enabled))
    }

    fn set_visibility(&self, calendar_id: i64, user_key: &str, enabled: bool) -> Result<(), StoreError> {
        let updated = self.conn.execute(
            "UPDATE user_calendars SET enabled = ?1 WHERE calendar_id = ?2 AND user_key = ?3",
            params![enabled, calendar_id, user_key],
        )?;
        if updated == 0 {
            return Err(StoreError::SubscriptionNotFound {
                calendar_id,
                user_key: user_key.to_string(),
            });
        }
        Ok(())
    }

    fn count_subscribers(&self, calendar_id: i64) -> Result<usize, StoreError> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM user_calendars WHERE calendar_id = ?1",
            [calendar_id],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}
