//! Packed category decoding
//!
//! The categories source carries one string per message, e.g.
//! `related-1;request-0;offer-0`. Each `;`-separated token is split
//! positionally: the last character is the value, the character before it is
//! the separator and everything before that is the category name.

use std::collections::HashSet;

use crate::config::CategoryPolicy;
use crate::error::{EtlError, MalformedToken};
use crate::frame::{Cell, Frame, RowMap};
use crate::load::{CATEGORIES_COLUMN, ID_COLUMN};

pub const TOKEN_DELIMITER: char = ';';
pub const NAME_VALUE_SEPARATOR: char = '-';

/// Category rows decoded into one column per category name, plus `id`.
#[derive(Debug, Clone, Default)]
pub struct DecodedCategories {
    pub frame: Frame,
    /// Rows skipped under `CategoryPolicy::Lenient`
    pub malformed: Vec<MalformedToken>,
    /// Rows skipped because the packed string itself was missing
    pub missing: usize,
}

/// Split one token into `(name, value)`.
pub fn split_token(token: &str) -> Result<(String, char), &'static str> {
    let chars: Vec<char> = token.chars().collect();
    if chars.is_empty() {
        return Err("empty token");
    }
    if chars.len() < 3 {
        return Err("empty category name");
    }
    let (name, tail) = chars.split_at(chars.len() - 2);
    if tail[0] != NAME_VALUE_SEPARATOR {
        return Err("missing `-` separator");
    }
    if !tail[1].is_ascii_digit() {
        return Err("value is not a digit");
    }
    Ok((name.iter().collect(), tail[1]))
}

/// Decode a packed string into a name→value row. Values stay single-character
/// text cells; coercion to integers happens after the join.
pub fn decode_packed(packed: &str) -> Result<RowMap, (String, &'static str)> {
    let mut row = RowMap::new();
    let mut seen: HashSet<String> = HashSet::new();
    for token in packed.split(TOKEN_DELIMITER) {
        let (name, value) = split_token(token).map_err(|reason| (token.to_string(), reason))?;
        if name == ID_COLUMN {
            return Err((token.to_string(), "category name `id` is reserved"));
        }
        if !seen.insert(name.clone()) {
            return Err((token.to_string(), "duplicate category name"));
        }
        row.push((name, Cell::Text(value.to_string())));
    }
    Ok(row)
}

/// Decode every row of the categories table. The row's `id` is reattached as
/// the last key once its tokens are decoded.
///
/// A row whose packed string is missing is skipped, which leaves its message
/// without a match. A category named like one of the `reserved` columns (the
/// message columns it will be joined onto) is treated as a malformed token.
pub fn decode_categories(
    categories: &Frame,
    policy: CategoryPolicy,
    reserved: &[String],
) -> Result<DecodedCategories, EtlError> {
    let id_idx = categories.require_column(ID_COLUMN)?;
    let packed_idx = categories.require_column(CATEGORIES_COLUMN)?;

    let mut rows: Vec<RowMap> = Vec::with_capacity(categories.len());
    let mut malformed = Vec::new();
    let mut missing = 0;

    for row in categories.rows() {
        let id = row[id_idx].clone();
        let Cell::Text(packed) = &row[packed_idx] else {
            tracing::debug!(id = %id, "skipping category row without a packed string");
            missing += 1;
            continue;
        };

        let decoded = decode_packed(packed).and_then(|map| {
            match map.iter().find(|(name, _)| reserved.contains(name)) {
                Some((name, value)) => Err((
                    format!("{name}{NAME_VALUE_SEPARATOR}{value}"),
                    "category name collides with a message column",
                )),
                None => Ok(map),
            }
        });

        match decoded {
            Ok(mut map) => {
                map.push((ID_COLUMN.to_string(), id));
                rows.push(map);
            }
            Err((token, reason)) => {
                let diagnostic = MalformedToken {
                    id: id.as_int(),
                    token,
                    reason,
                };
                match policy {
                    CategoryPolicy::Strict => {
                        return Err(EtlError::MalformedCategoryToken(diagnostic))
                    }
                    CategoryPolicy::Lenient => {
                        tracing::warn!(%diagnostic, "skipping category row");
                        malformed.push(diagnostic);
                    }
                }
            }
        }
    }

    let mut frame = Frame::from_row_maps(rows);
    if frame.column_index(ID_COLUMN).is_none() {
        // No decodable rows; keep the join key so the join still lines up.
        frame.push_column(ID_COLUMN.to_string(), Vec::new())?;
    }

    Ok(DecodedCategories {
        frame,
        malformed,
        missing,
    })
}
