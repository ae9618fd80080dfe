//! CSV loading for the message and category sources

use csv::ReaderBuilder;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::EtlError;
use crate::frame::{Cell, Frame};

pub const ID_COLUMN: &str = "id";
pub const MESSAGE_COLUMN: &str = "message";
pub const GENRE_COLUMN: &str = "genre";
pub const CATEGORIES_COLUMN: &str = "categories";

/// Load both source tables from disk.
pub fn load(messages_path: &Path, categories_path: &Path) -> Result<(Frame, Frame), EtlError> {
    let messages = load_messages_from_reader(open(messages_path)?, messages_path)?;
    let categories = load_categories_from_reader(open(categories_path)?, categories_path)?;
    tracing::info!(
        messages = messages.len(),
        categories = categories.len(),
        "loaded source tables"
    );
    Ok((messages, categories))
}

fn open(path: &Path) -> Result<File, EtlError> {
    File::open(path).map_err(|e| EtlError::SourceRead {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Messages need `id`, `message` and `genre`; any other column is carried along.
pub fn load_messages_from_reader<R: Read>(reader: R, origin: &Path) -> Result<Frame, EtlError> {
    read_table(reader, origin, &[ID_COLUMN, MESSAGE_COLUMN, GENRE_COLUMN])
}

pub fn load_categories_from_reader<R: Read>(reader: R, origin: &Path) -> Result<Frame, EtlError> {
    read_table(reader, origin, &[ID_COLUMN, CATEGORIES_COLUMN])
}

fn read_table<R: Read>(reader: R, origin: &Path, required: &[&str]) -> Result<Frame, EtlError> {
    let source_err = |message: String| EtlError::SourceRead {
        path: origin.to_path_buf(),
        message,
    };

    let mut rdr = ReaderBuilder::new().has_headers(true).from_reader(reader);
    let headers: Vec<String> = rdr
        .headers()
        .map_err(|e| source_err(e.to_string()))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    for name in required {
        if !headers.iter().any(|h| h == name) {
            return Err(source_err(format!("missing required column `{name}`")));
        }
    }
    let id_idx = headers
        .iter()
        .position(|h| h == ID_COLUMN)
        .ok_or_else(|| source_err(format!("missing required column `{ID_COLUMN}`")))?;

    let mut frame = Frame::new(headers);
    for (n, record) in rdr.records().enumerate() {
        let record = record.map_err(|e| source_err(e.to_string()))?;
        let mut row = Vec::with_capacity(record.len());
        for (i, field) in record.iter().enumerate() {
            if i == id_idx {
                row.push(parse_id(field).map_err(|m| source_err(format!("record {}: {m}", n + 1)))?);
            } else {
                row.push(Cell::from_field(field));
            }
        }
        frame.push_row(row)?;
    }
    Ok(frame)
}

fn parse_id(field: &str) -> Result<Cell, String> {
    let field = field.trim();
    if field.is_empty() {
        return Ok(Cell::Null);
    }
    field
        .parse::<i64>()
        .map(Cell::Int)
        .map_err(|_| format!("id `{field}` is not an integer"))
}
