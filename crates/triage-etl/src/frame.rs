//! Minimal in-memory table
//!
//! A `Frame` is an ordered list of column names plus row-major cells. It only
//! supports what the merge pipeline needs: column lookup, row filtering,
//! column removal and building a table out of per-row key→value lists.

use std::collections::HashMap;
use std::fmt;

use crate::error::EtlError;

/// A single table value. `Null` stands in for a missing field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Cell {
    Null,
    Int(i64),
    Bool(bool),
    Text(String),
}

impl Cell {
    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Cell::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Text cell from a raw CSV field; empty fields become `Null`.
    pub fn from_field(field: &str) -> Self {
        if field.is_empty() {
            Cell::Null
        } else {
            Cell::Text(field.to_string())
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Null => Ok(()),
            Cell::Int(v) => write!(f, "{v}"),
            Cell::Bool(b) => write!(f, "{b}"),
            Cell::Text(s) => f.write_str(s),
        }
    }
}

/// One decoded row expressed as an ordered key→value list.
pub type RowMap = Vec<(String, Cell)>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frame {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Frame {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Build a frame whose columns are the union of keys across `rows`, in
    /// first-seen order. Keys absent from a row are filled with `Null`.
    pub fn from_row_maps(rows: Vec<RowMap>) -> Self {
        let mut columns: Vec<String> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();
        for row in &rows {
            for (key, _) in row {
                if !index.contains_key(key) {
                    index.insert(key.clone(), columns.len());
                    columns.push(key.clone());
                }
            }
        }

        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|row| {
                let mut cells = vec![Cell::Null; width];
                for (key, value) in row {
                    cells[index[&key]] = value;
                }
                cells
            })
            .collect();

        Self { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Like `column_index`, but a missing column is a schema error.
    pub fn require_column(&self, name: &str) -> Result<usize, EtlError> {
        self.column_index(name).ok_or_else(|| EtlError::Schema {
            message: format!("missing required column `{name}`"),
        })
    }

    /// Iterate one column top to bottom.
    pub fn column(&self, name: &str) -> Option<impl Iterator<Item = &Cell> + '_> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(move |row| &row[idx]))
    }

    pub fn get(&self, row: usize, column: &str) -> Option<&Cell> {
        let idx = self.column_index(column)?;
        self.rows.get(row).map(|r| &r[idx])
    }

    pub fn push_row(&mut self, row: Vec<Cell>) -> Result<(), EtlError> {
        if row.len() != self.columns.len() {
            return Err(EtlError::Schema {
                message: format!(
                    "row has {} cells but frame has {} columns",
                    row.len(),
                    self.columns.len()
                ),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    /// Append a column, one value per existing row.
    pub fn push_column(&mut self, name: String, values: Vec<Cell>) -> Result<(), EtlError> {
        if values.len() != self.rows.len() {
            return Err(EtlError::Schema {
                message: format!(
                    "column `{name}` has {} values but frame has {} rows",
                    values.len(),
                    self.rows.len()
                ),
            });
        }
        self.columns.push(name);
        for (row, value) in self.rows.iter_mut().zip(values) {
            row.push(value);
        }
        Ok(())
    }

    pub fn drop_columns(&mut self, names: &[&str]) {
        let keep: Vec<bool> = self
            .columns
            .iter()
            .map(|c| !names.contains(&c.as_str()))
            .collect();
        let mut i = 0;
        self.columns.retain(|_| {
            i += 1;
            keep[i - 1]
        });
        for row in &mut self.rows {
            let mut j = 0;
            row.retain(|_| {
                j += 1;
                keep[j - 1]
            });
        }
    }

    pub fn retain_rows<F>(&mut self, mut keep: F)
    where
        F: FnMut(&[Cell]) -> bool,
    {
        self.rows.retain(|row| keep(row));
    }

    pub fn rows_mut(&mut self) -> &mut [Vec<Cell>] {
        &mut self.rows
    }

    pub fn has_nulls(&self) -> bool {
        self.rows.iter().any(|row| row.iter().any(Cell::is_null))
    }
}
