//! SQLite relational sink

use super::schema::{ColumnDef, ColumnType, TableDef};
use super::traits::{OpenSink, RelationalSink, RowKey, SinkError, SinkResult};
use crate::projection::{ColumnValue, RowRecord, SYNC_TIME_COLUMN};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::{Null, ToSqlOutput, ValueRef};
use rusqlite::{params_from_iter, Connection, OptionalExtension, ToSql};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// Fixed-width RFC 3339 so text ordering matches time ordering
fn format_timestamp(t: &DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

impl ToSql for ColumnValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Self::Text(s) => ToSqlOutput::from(s.as_str()),
            Self::Integer(i) => ToSqlOutput::from(*i),
            Self::Boolean(b) => ToSqlOutput::from(*b),
            Self::Timestamp(t) => ToSqlOutput::from(format_timestamp(t)),
            Self::Null => ToSqlOutput::from(Null),
        })
    }
}

fn decode_value(table: &TableDef, column: &ColumnDef, value: ValueRef<'_>) -> SinkResult<ColumnValue> {
    let decode_error = |message: String| SinkError::Decode {
        table: table.name.to_string(),
        column: column.name.to_string(),
        message,
    };

    Ok(match (value, column.ty) {
        (ValueRef::Null, _) => ColumnValue::Null,
        (ValueRef::Integer(i), ColumnType::Boolean) => ColumnValue::Boolean(i != 0),
        (ValueRef::Integer(i), _) => ColumnValue::Integer(i),
        (ValueRef::Real(f), _) => ColumnValue::Text(f.to_string()),
        (ValueRef::Text(bytes), ty) => {
            let text = std::str::from_utf8(bytes).map_err(|e| decode_error(e.to_string()))?;
            if ty == ColumnType::Timestamp {
                let parsed = DateTime::parse_from_rfc3339(text).map_err(|e| decode_error(e.to_string()))?;
                ColumnValue::Timestamp(parsed.with_timezone(&Utc))
            } else {
                ColumnValue::Text(text.to_string())
            }
        }
        (ValueRef::Blob(_), _) => return Err(decode_error("unexpected blob".into())),
    })
}

/// SQLite-backed history tables
///
/// Each target table gets a surrogate `row_id` so that rows inserted within
/// the same instant still have a defined "latest". Thread-safe via internal
/// mutex on the connection; transactions are explicit `BEGIN`/`COMMIT`
/// statements on that connection.
pub struct SqliteSink {
    conn: Mutex<Connection>,
}

impl SqliteSink {
    fn from_connection(conn: Connection) -> SinkResult<Self> {
        conn.execute_batch("PRAGMA journal_mode = WAL;")?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> SinkResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| SinkError::Unavailable("connection lock poisoned".into()))
    }

    fn create_table(conn: &Connection, table: &TableDef) -> SinkResult<()> {
        let columns: Vec<String> = table
            .all_columns()
            .map(|c| format!("\"{}\" {}", c.name, c.ty.sql()))
            .collect();
        conn.execute_batch(&format!(
            "CREATE TABLE IF NOT EXISTS \"{}\" (row_id INTEGER PRIMARY KEY AUTOINCREMENT, {});",
            table.name,
            columns.join(", ")
        ))?;
        Ok(())
    }

    /// Add columns introduced since the table was first created
    ///
    /// SQLite doesn't support ALTER TABLE ADD COLUMN IF NOT EXISTS,
    /// so we check the existing columns with the table_info pragma.
    fn migrate_add_columns(conn: &Connection, table: &TableDef) -> SinkResult<()> {
        let mut stmt = conn.prepare("SELECT name FROM pragma_table_info(?1)")?;
        let existing = stmt
            .query_map([table.name], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        if existing.is_empty() {
            return Err(SinkError::Schema {
                table: table.name.to_string(),
                message: "table missing after create".into(),
            });
        }

        for column in table.all_columns() {
            if !existing.iter().any(|name| name == column.name) {
                conn.execute_batch(&format!(
                    "ALTER TABLE \"{}\" ADD COLUMN \"{}\" {};",
                    table.name,
                    column.name,
                    column.ty.sql()
                ))?;
                tracing::info!(table = table.name, column = column.name, "added column");
            }
        }
        Ok(())
    }

    fn create_key_index(conn: &Connection, table: &TableDef) -> SinkResult<()> {
        let mut columns: Vec<String> = table.key_columns.iter().map(|k| format!("\"{k}\"")).collect();
        columns.push(format!("\"{SYNC_TIME_COLUMN}\""));
        conn.execute_batch(&format!(
            "CREATE INDEX IF NOT EXISTS \"idx_{0}_key\" ON \"{0}\" ({1});",
            table.name,
            columns.join(", ")
        ))?;
        Ok(())
    }

    fn read_row(table: &TableDef, row: &rusqlite::Row<'_>) -> SinkResult<RowRecord> {
        let mut record = RowRecord::new();
        for (index, column) in table.all_columns().enumerate() {
            let value = decode_value(table, column, row.get_ref(index)?)?;
            record.set(column.name, value);
        }
        Ok(record)
    }

    fn select_list(table: &TableDef) -> String {
        table
            .all_columns()
            .map(|c| format!("\"{}\"", c.name))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn key_filter(key: &RowKey) -> String {
        key.iter()
            .enumerate()
            .map(|(i, (column, _))| format!("\"{}\" = ?{}", column, i + 1))
            .collect::<Vec<_>>()
            .join(" AND ")
    }

    /// Every stored row for `key`, oldest first
    pub fn history(&self, table: &TableDef, key: &RowKey) -> SinkResult<Vec<RowRecord>> {
        let conn = self.conn()?;
        let sql = format!(
            "SELECT {} FROM \"{}\" WHERE {} ORDER BY \"{}\", row_id",
            Self::select_list(table),
            table.name,
            Self::key_filter(key),
            SYNC_TIME_COLUMN
        );
        let mut stmt = conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(key.iter().map(|(_, v)| v)))?;

        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            records.push(Self::read_row(table, row)?);
        }
        Ok(records)
    }

    /// Total number of rows in a table (zero if the table does not exist yet)
    pub fn row_count(&self, table: &TableDef) -> SinkResult<usize> {
        let conn = self.conn()?;
        let exists: bool = conn.query_row(
            "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type = 'table' AND name = ?1",
            [table.name],
            |row| row.get(0),
        )?;
        if !exists {
            return Ok(0);
        }
        let count: i64 = conn.query_row(&format!("SELECT COUNT(*) FROM \"{}\"", table.name), [], |row| {
            row.get(0)
        })?;
        Ok(count as usize)
    }
}

impl OpenSink for SqliteSink {
    fn open(path: impl AsRef<Path>) -> SinkResult<Self> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }
        Self::from_connection(Connection::open(path)?)
    }

    fn open_in_memory() -> SinkResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }
}

impl RelationalSink for SqliteSink {
    fn ensure_schema(&self, tables: &[&TableDef]) -> SinkResult<()> {
        let conn = self.conn()?;
        for table in tables {
            Self::create_table(&conn, table)?;
            Self::migrate_add_columns(&conn, table)?;
            Self::create_key_index(&conn, table)?;
        }
        Ok(())
    }

    fn begin(&self) -> SinkResult<()> {
        let conn = self.conn()?;
        if !conn.is_autocommit() {
            return Err(SinkError::Transaction("a transaction is already active".into()));
        }
        conn.execute_batch("BEGIN IMMEDIATE")?;
        Ok(())
    }

    fn commit(&self) -> SinkResult<()> {
        let conn = self.conn()?;
        if conn.is_autocommit() {
            return Err(SinkError::Transaction("commit without an active transaction".into()));
        }
        conn.execute_batch("COMMIT")?;
        Ok(())
    }

    fn rollback(&self) -> SinkResult<()> {
        let conn = self.conn()?;
        if conn.is_autocommit() {
            return Err(SinkError::Transaction("rollback without an active transaction".into()));
        }
        conn.execute_batch("ROLLBACK")?;
        Ok(())
    }

    fn latest_row(&self, table: &TableDef, key: &RowKey) -> SinkResult<Option<RowRecord>> {
        let conn = self.conn()?;
        let sql = format!(
            "SELECT {} FROM \"{}\" WHERE {} ORDER BY \"{}\" DESC, row_id DESC LIMIT 1",
            Self::select_list(table),
            table.name,
            Self::key_filter(key),
            SYNC_TIME_COLUMN
        );
        let mut stmt = conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(key.iter().map(|(_, v)| v)))?;
        match rows.next()? {
            Some(row) => Ok(Some(Self::read_row(table, row)?)),
            None => Ok(None),
        }
    }

    fn insert_row(&self, table: &TableDef, row: &RowRecord) -> SinkResult<()> {
        for column in row.columns() {
            if !table.has_column(column) {
                return Err(SinkError::UnknownColumn {
                    table: table.name.to_string(),
                    column: column.to_string(),
                });
            }
        }

        let conn = self.conn()?;
        let names: Vec<String> = row.columns().map(|c| format!("\"{c}\"")).collect();
        let placeholders: Vec<String> = (1..=names.len()).map(|i| format!("?{i}")).collect();
        let sql = format!(
            "INSERT INTO \"{}\" ({}) VALUES ({})",
            table.name,
            names.join(", "),
            placeholders.join(", ")
        );
        conn.execute(&sql, params_from_iter(row.iter().map(|(_, v)| v)))?;
        Ok(())
    }
}
