use rusqlite::types::Value;

pub const MONITORED_USERS_TABLE: &str = "monitored_users";

/// Declared type of a target column, used to check that source fields can
/// be carried over without changing meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    Integer,
    Boolean,
}

impl ColumnKind {
    pub fn sql_type(&self) -> &'static str {
        match self {
            ColumnKind::Text => "TEXT",
            ColumnKind::Integer => "INTEGER",
            ColumnKind::Boolean => "BOOLEAN",
        }
    }

    /// Whether a stored value fits this column. SQLite affinity is lenient,
    /// so only blobs, reals in text or flag columns, and text in flag columns
    /// are refused.
    pub fn accepts(&self, value: &Value) -> bool {
        match (self, value) {
            (_, Value::Null) => true,
            (_, Value::Blob(_)) => false,
            (ColumnKind::Text, Value::Text(_) | Value::Integer(_)) => true,
            (ColumnKind::Integer, Value::Integer(_) | Value::Text(_) | Value::Real(_)) => true,
            (ColumnKind::Boolean, Value::Integer(_)) => true,
            _ => false,
        }
    }
}

/// Target column catalogue in positional order. The first two columns form
/// the primary key.
pub const TARGET_COLUMNS: [(&str, ColumnKind); 12] = [
    ("guild_id", ColumnKind::Text),
    ("user_id", ColumnKind::Text),
    ("username", ColumnKind::Text),
    ("notification_channel", ColumnKind::Text),
    ("last_post_id", ColumnKind::Text),
    ("last_stream_start", ColumnKind::Integer),
    ("mention_role", ColumnKind::Text),
    ("avatar_location", ColumnKind::Text),
    ("avatar_location_updated_at", ColumnKind::Integer),
    ("live_image_url", ColumnKind::Text),
    ("posts_enabled", ColumnKind::Boolean),
    ("live_enabled", ColumnKind::Boolean),
];

pub const CREATE_SCHEMA_SQL: &str = r#"
--
-- Current monitored_users schema (12 columns)
--
-- Creating the table is a no-op when it already exists. An existing table
-- is never altered.
--

CREATE TABLE IF NOT EXISTS monitored_users (
    guild_id TEXT,
    user_id TEXT,
    username TEXT,
    notification_channel TEXT,
    last_post_id TEXT,
    last_stream_start INTEGER,
    mention_role TEXT,
    avatar_location TEXT,
    avatar_location_updated_at INTEGER,
    live_image_url TEXT,
    posts_enabled BOOLEAN DEFAULT 1,
    live_enabled BOOLEAN DEFAULT 1,
    PRIMARY KEY (guild_id, user_id)
);

-- Lookup indexes used by the bot when resolving users
CREATE INDEX IF NOT EXISTS idx_monitored_users_user_id ON monitored_users (user_id);
CREATE INDEX IF NOT EXISTS idx_monitored_users_username ON monitored_users (guild_id, username);
"#;

pub const INSERT_RECORD_SQL: &str = r#"
INSERT INTO monitored_users
    (guild_id, user_id, username, notification_channel, last_post_id, last_stream_start,
     mention_role, avatar_location, avatar_location_updated_at, live_image_url,
     posts_enabled, live_enabled)
VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
"#;

pub const SELECT_SOURCE_SQL: &str = "SELECT * FROM monitored_users";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_sql_binds_every_target_column() {
        assert_eq!(INSERT_RECORD_SQL.matches('?').count(), TARGET_COLUMNS.len());
        for (name, _) in TARGET_COLUMNS {
            assert!(INSERT_RECORD_SQL.contains(name), "missing column {}", name);
            assert!(CREATE_SCHEMA_SQL.contains(name), "missing column {}", name);
        }
    }

    #[test]
    fn test_column_kind_accepts() {
        assert!(ColumnKind::Text.accepts(&Value::Text("g1".into())));
        assert!(ColumnKind::Text.accepts(&Value::Integer(1234567890)));
        assert!(ColumnKind::Text.accepts(&Value::Null));
        assert!(!ColumnKind::Text.accepts(&Value::Real(1.5)));
        assert!(!ColumnKind::Text.accepts(&Value::Blob(vec![0x01])));

        assert!(ColumnKind::Integer.accepts(&Value::Integer(1000)));
        assert!(ColumnKind::Integer.accepts(&Value::Text("T0".into())));
        assert!(!ColumnKind::Integer.accepts(&Value::Blob(vec![])));

        assert!(ColumnKind::Boolean.accepts(&Value::Integer(1)));
        assert!(!ColumnKind::Boolean.accepts(&Value::Text("yes".into())));
    }
}
