use chrono::Utc;
use log::{info, Level};
use logging_timer::timer;
use rusqlite::types::Value;
use rusqlite::{ffi, params_from_iter};

use crate::error::MigrateError;
use crate::schema::{
    SourceSchemaVariant, INSERT_RECORD_SQL, SELECT_SOURCE_SQL, TARGET_COLUMNS,
};
use crate::store::{DestinationStore, SourceStore};

/// Outcome of a successful migration run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationReport {
    pub variant: SourceSchemaVariant,
    pub rows_read: usize,
    pub rows_inserted: usize,
    pub captured_at: i64,
}

/// Copies every `monitored_users` record from a source store into the
/// 12-column table of a destination store. The caller owns both stores and
/// closes them after the run.
pub struct Migrator<'a> {
    source: &'a SourceStore,
    destination: &'a mut DestinationStore,
    variant: SourceSchemaVariant,
    captured_at: i64,
}

impl<'a> Migrator<'a> {
    pub fn new(
        source: &'a SourceStore,
        destination: &'a mut DestinationStore,
        variant: SourceSchemaVariant,
    ) -> Self {
        Self {
            source,
            destination,
            variant,
            captured_at: Utc::now().timestamp(),
        }
    }

    /// Overrides the timestamp written by the timestamp-deriving strategy.
    pub fn with_captured_at(mut self, captured_at: i64) -> Self {
        self.captured_at = captured_at;
        self
    }

    pub fn ensure_schema(&self) -> Result<(), MigrateError> {
        self.destination.ensure_schema()
    }

    /// Ensures the destination schema and then migrates every record.
    pub fn run(&mut self) -> Result<MigrationReport, MigrateError> {
        self.ensure_schema()?;
        self.migrate_all()
    }

    pub fn migrate_all(&mut self) -> Result<MigrationReport, MigrateError> {
        let _tmr = timer!(Level::Info; "Migrator::migrate_all", "{}", self.variant);

        info!(
            "Migrating monitored_users ({}) from {} to {}",
            self.variant,
            self.source.path().display(),
            self.destination.path().display()
        );

        let records = self.read_source_records()?;
        let rows_read = records.len();
        info!("Read {} source records", rows_read);

        let tx = self.destination.conn_mut().transaction()?;
        let before = count_rows(&tx)?;

        let mut rows_inserted = 0;
        {
            let mut stmt = tx.prepare_cached(INSERT_RECORD_SQL)?;
            for record in &records {
                rows_inserted += stmt
                    .execute(params_from_iter(record.iter()))
                    .map_err(|e| map_insert_error(e, record))?;
            }
        }

        // Every source record must have produced exactly one new row. Triggers on
        // an existing destination table can also shrink it.
        let after = count_rows(&tx)?;
        let added = after as i64 - before as i64;
        if rows_inserted != rows_read || added != rows_read as i64 {
            return Err(MigrateError::ValidationFailed {
                expected: rows_read,
                actual: added,
            });
        }

        tx.commit()?;
        info!("Committed {} migrated records", rows_inserted);

        Ok(MigrationReport {
            variant: self.variant,
            rows_read,
            rows_inserted,
            captured_at: self.captured_at,
        })
    }

    fn read_source_records(&self) -> Result<Vec<Vec<Value>>, MigrateError> {
        if !self.source.has_monitored_users()? {
            return Err(MigrateError::SchemaMismatch(format!(
                "source store {} has no monitored_users table",
                self.source.path().display()
            )));
        }

        let width = self.variant.source_width();
        let mut stmt = self.source.conn().prepare(SELECT_SOURCE_SQL)?;
        let column_count = stmt.column_count();
        if column_count < width {
            return Err(MigrateError::SchemaMismatch(format!(
                "source monitored_users has {} columns, {} requires at least {}",
                column_count, self.variant, width
            )));
        }

        let fill = self.variant.fill(self.captured_at);
        let mut records = Vec::new();
        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            let mut record = Vec::with_capacity(TARGET_COLUMNS.len());
            for i in 0..width {
                record.push(row.get::<_, Value>(i)?);
            }
            record.extend(fill.iter().cloned());
            check_record(&record)?;
            records.push(record);
        }

        Ok(records)
    }
}

fn count_rows(conn: &rusqlite::Connection) -> Result<usize, MigrateError> {
    let count: i64 = conn.query_row("SELECT count(*) FROM monitored_users", [], |row| row.get(0))?;
    Ok(count as usize)
}

fn check_record(record: &[Value]) -> Result<(), MigrateError> {
    // SQLite accepts NULLs in a non-INTEGER primary key
    for (index, (name, _)) in TARGET_COLUMNS[..2].iter().enumerate() {
        if record[index] == Value::Null {
            return Err(MigrateError::SchemaMismatch(format!(
                "{} is NULL (guild_id={}, user_id={}); both key columns are required",
                name,
                key_part(&record[0]),
                key_part(&record[1])
            )));
        }
    }

    for ((name, kind), value) in TARGET_COLUMNS.iter().zip(record) {
        if !kind.accepts(value) {
            return Err(MigrateError::SchemaMismatch(format!(
                "value {:?} for column {} (guild_id={}, user_id={}) is not compatible with {}",
                value,
                name,
                key_part(&record[0]),
                key_part(&record[1]),
                kind.sql_type()
            )));
        }
    }
    Ok(())
}

fn key_part(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_owned(),
        Value::Integer(i) => i.to_string(),
        Value::Real(r) => r.to_string(),
        Value::Text(s) => s.clone(),
        Value::Blob(b) => format!("<{} byte blob>", b.len()),
    }
}

fn map_insert_error(err: rusqlite::Error, record: &[Value]) -> MigrateError {
    match &err {
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == ffi::SQLITE_CONSTRAINT_PRIMARYKEY =>
        {
            MigrateError::ConstraintViolation {
                guild_id: key_part(&record[0]),
                user_id: key_part(&record[1]),
            }
        }
        _ => MigrateError::DatabaseError(err),
    }
}
