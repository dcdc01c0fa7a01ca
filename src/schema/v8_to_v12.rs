use rusqlite::types::Value;

/// Schema Upgrade: 8 columns → 12 columns
///
/// The 8-column table predates avatar refresh tracking. Every migrated record
/// receives the run's captured timestamp as `avatar_location_updated_at`,
/// so the bot treats all avatars as freshly fetched. `live_image_url` and the
/// two notification flags are written as NULL.
pub const SOURCE_WIDTH_8: usize = 8;

pub fn fill_8_to_12(captured_at: i64) -> Vec<Value> {
    vec![
        Value::Integer(captured_at), // avatar_location_updated_at
        Value::Null,                 // live_image_url
        Value::Null,                 // posts_enabled
        Value::Null,                 // live_enabled
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::TARGET_COLUMNS;

    #[test]
    fn test_fill_completes_target_width() {
        let fill = fill_8_to_12(1_700_000_000);
        assert_eq!(SOURCE_WIDTH_8 + fill.len(), TARGET_COLUMNS.len());
        assert_eq!(fill[0], Value::Integer(1_700_000_000));
        assert!(fill[1..].iter().all(|v| *v == Value::Null));
    }
}
