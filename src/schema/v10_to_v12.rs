use rusqlite::types::Value;

/// Schema Upgrade: 10 columns → 12 columns
///
/// Adds the per-user `posts_enabled` and `live_enabled` switches. Existing
/// users keep receiving both kinds of notification, so both flags are set.
pub const SOURCE_WIDTH_10: usize = 10;

pub fn fill_10_to_12(_captured_at: i64) -> Vec<Value> {
    vec![
        Value::Integer(1), // posts_enabled
        Value::Integer(1), // live_enabled
    ]
}
