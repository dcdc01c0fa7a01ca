mod base;
mod v10_to_v12;
mod v8_to_v12;

use rusqlite::types::Value;
use strum::{Display, EnumIter, EnumString};

/// Function type for the code that supplies the columns a source schema lacks.
/// Receives the run's captured timestamp (seconds since the Unix epoch).
pub type FillFn = fn(i64) -> Vec<Value>;

pub use base::{
    CREATE_SCHEMA_SQL, INSERT_RECORD_SQL, MONITORED_USERS_TABLE, SELECT_SOURCE_SQL, TARGET_COLUMNS,
};
use v10_to_v12::{fill_10_to_12, SOURCE_WIDTH_10};
use v8_to_v12::{fill_8_to_12, SOURCE_WIDTH_8};

/// Migration descriptor for one source schema:
/// - source_width: leading positional fields copied verbatim
/// - fill_fn: produces the remaining target fields
pub struct Migration {
    pub source_width: usize,
    pub fill_fn: FillFn,
}

pub const MIGRATION_8_TO_12: Migration = Migration {
    source_width: SOURCE_WIDTH_8,
    fill_fn: fill_8_to_12,
};

pub const MIGRATION_10_TO_12: Migration = Migration {
    source_width: SOURCE_WIDTH_10,
    fill_fn: fill_10_to_12,
};

/// Which historical `monitored_users` layout the source store holds. Always
/// chosen by the caller; [`SourceSchemaVariant::detect`] is only used for
/// reporting.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, EnumIter, EnumString)]
pub enum SourceSchemaVariant {
    #[strum(to_string = "eight-column", serialize = "8")]
    EightColumn,
    #[strum(to_string = "ten-column", serialize = "10")]
    TenColumn,
}

impl SourceSchemaVariant {
    pub fn migration(&self) -> &'static Migration {
        match self {
            SourceSchemaVariant::EightColumn => &MIGRATION_8_TO_12,
            SourceSchemaVariant::TenColumn => &MIGRATION_10_TO_12,
        }
    }

    pub fn source_width(&self) -> usize {
        self.migration().source_width
    }

    pub fn fill(&self, captured_at: i64) -> Vec<Value> {
        (self.migration().fill_fn)(captured_at)
    }

    pub fn detect(column_count: usize) -> Option<Self> {
        match column_count {
            SOURCE_WIDTH_8 => Some(SourceSchemaVariant::EightColumn),
            SOURCE_WIDTH_10 => Some(SourceSchemaVariant::TenColumn),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn test_variant_parse_and_display() {
        assert_eq!(
            SourceSchemaVariant::from_str("eight-column").unwrap(),
            SourceSchemaVariant::EightColumn
        );
        assert_eq!(
            SourceSchemaVariant::from_str("10").unwrap(),
            SourceSchemaVariant::TenColumn
        );
        assert!(SourceSchemaVariant::from_str("nine-column").is_err());
        assert_eq!(SourceSchemaVariant::TenColumn.to_string(), "ten-column");
    }

    #[test]
    fn test_every_variant_fills_to_target_width() {
        for variant in SourceSchemaVariant::iter() {
            assert_eq!(
                variant.source_width() + variant.fill(0).len(),
                TARGET_COLUMNS.len(),
                "variant {}",
                variant
            );
        }
    }

    #[test]
    fn test_detect() {
        assert_eq!(SourceSchemaVariant::detect(8), Some(SourceSchemaVariant::EightColumn));
        assert_eq!(SourceSchemaVariant::detect(10), Some(SourceSchemaVariant::TenColumn));
        assert_eq!(SourceSchemaVariant::detect(12), None);
    }
}
