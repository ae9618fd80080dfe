//! SQLite sink
//!
//! The merged table is written with replace semantics: the previous table of
//! the same name is dropped and recreated inside one transaction, so a failed
//! write leaves the destination as it was.

use rusqlite::types::{ToSql, ToSqlOutput, Value, ValueRef};
use rusqlite::{params_from_iter, Connection};
use std::path::Path;

use crate::error::EtlError;
use crate::frame::{Cell, Frame};

impl ToSql for Cell {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Cell::Null => ToSqlOutput::Owned(Value::Null),
            Cell::Int(v) => ToSqlOutput::Owned(Value::Integer(*v)),
            Cell::Bool(b) => ToSqlOutput::Owned(Value::Integer(i64::from(*b))),
            Cell::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
        })
    }
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Declared SQLite type of a saved column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlType {
    Integer,
    Text,
}

impl SqlType {
    fn as_sql(self) -> &'static str {
        match self {
            SqlType::Integer => "INTEGER",
            SqlType::Text => "TEXT",
        }
    }
}

/// Column types inferred from the first non-null value of each column.
/// Columns with no values at all are declared `TEXT`.
pub fn infer_column_types(frame: &Frame) -> Vec<SqlType> {
    (0..frame.columns().len())
        .map(|idx| {
            let first = frame
                .rows()
                .iter()
                .map(|row| &row[idx])
                .find(|cell| !cell.is_null());
            match first {
                Some(Cell::Int(_)) | Some(Cell::Bool(_)) => SqlType::Integer,
                _ => SqlType::Text,
            }
        })
        .collect()
}

/// Write `frame` as table `table` in the SQLite database at `destination`,
/// replacing any existing table of that name. Column types are inferred from
/// the data; use [`save_with_types`] when the caller knows them.
pub fn save(frame: &Frame, destination: &Path, table: &str) -> Result<(), EtlError> {
    save_with_types(frame, &infer_column_types(frame), destination, table)
}

/// Like [`save`], with one declared type per column.
pub fn save_with_types(
    frame: &Frame,
    types: &[SqlType],
    destination: &Path,
    table: &str,
) -> Result<(), EtlError> {
    if types.len() != frame.columns().len() {
        return Err(EtlError::Schema {
            message: format!(
                "{} column types given for {} columns",
                types.len(),
                frame.columns().len()
            ),
        });
    }

    let write_err = |source: rusqlite::Error| EtlError::DestinationWrite {
        path: destination.to_path_buf(),
        table: table.to_string(),
        source,
    };

    let mut conn = Connection::open(destination).map_err(write_err)?;
    let tx = conn.transaction().map_err(write_err)?;

    let quoted = quote_ident(table);
    tx.execute(&format!("DROP TABLE IF EXISTS {quoted}"), [])
        .map_err(write_err)?;

    let column_defs: Vec<String> = frame
        .columns()
        .iter()
        .zip(types)
        .map(|(name, ty)| format!("{} {}", quote_ident(name), ty.as_sql()))
        .collect();
    tx.execute(
        &format!("CREATE TABLE {quoted} ({})", column_defs.join(", ")),
        [],
    )
    .map_err(write_err)?;

    {
        let placeholders = vec!["?"; frame.columns().len()].join(", ");
        let mut stmt = tx
            .prepare(&format!("INSERT INTO {quoted} VALUES ({placeholders})"))
            .map_err(write_err)?;
        for row in frame.rows() {
            stmt.execute(params_from_iter(row.iter()))
                .map_err(write_err)?;
        }
    }

    tx.commit().map_err(write_err)?;
    tracing::info!(
        rows = frame.len(),
        table,
        path = %destination.display(),
        "saved merged table"
    );
    Ok(())
}

/// Read a table back into a frame. Booleans come back as integers.
pub fn read_table(destination: &Path, table: &str) -> Result<Frame, EtlError> {
    let read_err = |e: rusqlite::Error| EtlError::SourceRead {
        path: destination.to_path_buf(),
        message: e.to_string(),
    };

    let conn = Connection::open(destination).map_err(read_err)?;
    let mut stmt = conn
        .prepare(&format!("SELECT * FROM {}", quote_ident(table)))
        .map_err(read_err)?;
    let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();
    let width = columns.len();

    let mut frame = Frame::new(columns);
    let mut rows = stmt.query([]).map_err(read_err)?;
    while let Some(row) = rows.next().map_err(read_err)? {
        let mut cells = Vec::with_capacity(width);
        for i in 0..width {
            let cell = match row.get_ref(i).map_err(read_err)? {
                ValueRef::Null => Cell::Null,
                ValueRef::Integer(v) => Cell::Int(v),
                ValueRef::Real(f) => Cell::Text(f.to_string()),
                ValueRef::Text(t) | ValueRef::Blob(t) => {
                    Cell::Text(String::from_utf8_lossy(t).into_owned())
                }
            };
            cells.push(cell);
        }
        frame.push_row(cells)?;
    }
    Ok(frame)
}
