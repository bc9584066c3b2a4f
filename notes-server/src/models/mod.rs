use chrono::{DateTime, Utc};

/// A stored note row. `mod_date` is nullable in the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub mod_date: Option<DateTime<Utc>>,
}
