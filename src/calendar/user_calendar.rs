use serde::{Deserialize, Serialize};

/// A user's subscription to a calendar. The calendar it points at may no
/// longer exist, and the user may no longer have access to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserCalendar {
    pub calendar_id: i64,
    pub user_key: String,
    pub enabled: bool,
    pub favorite: bool,
}

impl UserCalendar {
    pub fn new(calendar_id: i64, user_key: &str, enabled: bool) -> Self {
        Self {
            calendar_id,
            user_key: user_key.to_string(),
            enabled,
            favorite: true,
        }
    }
}
