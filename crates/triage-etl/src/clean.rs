//! Cleaning and merging
//!
//! The steps below run in a fixed order; each is public so it can be tested
//! (and reused) on its own:
//!
//! 1. [`drop_duplicate_ids`] on both tables
//! 2. [`one_hot_genre`] on the messages
//! 3. [`decode_categories`] on the categories
//! 4. [`left_join_on_id`]
//! 5. [`drop_incomplete_rows`]
//! 6. [`coerce_category_columns`]
//! 7. [`remap_related`]

use std::collections::{BTreeSet, HashMap, HashSet};

use crate::categories::decode_categories;
use crate::config::PipelineConfig;
use crate::error::{EtlError, MalformedToken};
use crate::frame::{Cell, Frame};
use crate::load::{GENRE_COLUMN, ID_COLUMN};
use crate::sink::SqlType;

const MATCH_MARKER: &str = "__category_match";

/// Counters collected while cleaning, logged by the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanStats {
    pub duplicate_message_rows: usize,
    pub duplicate_category_rows: usize,
    pub malformed_category_rows: usize,
    /// Category rows whose packed string was missing
    pub missing_category_rows: usize,
    /// Messages dropped for a missing genre, a missing match or a missing value
    pub incomplete_rows: usize,
    pub related_remapped: usize,
    /// Category values outside {0, 1} left untouched
    pub non_binary_values: usize,
}

#[derive(Debug, Clone)]
pub struct CleanReport {
    pub frame: Frame,
    pub genre_columns: Vec<String>,
    pub category_columns: Vec<String>,
    pub stats: CleanStats,
    pub malformed: Vec<MalformedToken>,
}

impl CleanReport {
    /// Declared SQLite type of each output column, from the column's role
    /// rather than its values, so an empty result keeps the same schema.
    pub fn column_types(&self) -> Vec<SqlType> {
        self.frame
            .columns()
            .iter()
            .map(|name| {
                let integer = name == ID_COLUMN
                    || self.genre_columns.contains(name)
                    || self.category_columns.contains(name);
                if integer {
                    SqlType::Integer
                } else {
                    SqlType::Text
                }
            })
            .collect()
    }
}

/// Remove every row whose `id` occurs more than once, including the first
/// occurrence. Returns the number of rows removed.
pub fn drop_duplicate_ids(frame: &mut Frame) -> Result<usize, EtlError> {
    let id_idx = frame.require_column(ID_COLUMN)?;

    let mut counts: HashMap<&Cell, usize> = HashMap::new();
    for row in frame.rows() {
        *counts.entry(&row[id_idx]).or_default() += 1;
    }
    let duplicated: HashSet<Cell> = counts
        .into_iter()
        .filter(|(_, n)| *n > 1)
        .map(|(id, _)| id.clone())
        .collect();

    let before = frame.len();
    frame.retain_rows(|row| !duplicated.contains(&row[id_idx]));
    Ok(before - frame.len())
}

/// Replace the genre column with one boolean column per distinct genre,
/// named `<prefix>_<value>`, in sorted order of the values.
///
/// Rows without a genre are removed first, since no indicator could be set
/// for them. Returns the indicator names and the number of rows removed.
pub fn one_hot_genre(
    frame: &mut Frame,
    prefix: &str,
) -> Result<(Vec<String>, usize), EtlError> {
    let genre_idx = frame.require_column(GENRE_COLUMN)?;
    let before = frame.len();
    frame.retain_rows(|row| row[genre_idx].as_text().is_some());
    let missing = before - frame.len();

    let genres: Vec<String> = frame
        .rows()
        .iter()
        .filter_map(|row| row[genre_idx].as_text().map(str::to_string))
        .collect();
    let distinct: BTreeSet<&str> = genres.iter().map(String::as_str).collect();

    let mut indicators: Vec<(String, Vec<Cell>)> = distinct
        .iter()
        .map(|value| {
            let cells = genres.iter().map(|g| Cell::Bool(g == value)).collect();
            (format!("{prefix}_{value}"), cells)
        })
        .collect();

    frame.drop_columns(&[GENRE_COLUMN]);
    let mut names = Vec::with_capacity(indicators.len());
    for (name, cells) in indicators.drain(..) {
        if frame.column_index(&name).is_some() {
            return Err(EtlError::Schema {
                message: format!("genre indicator `{name}` collides with an existing column"),
            });
        }
        names.push(name.clone());
        frame.push_column(name, cells)?;
    }
    Ok((names, missing))
}

/// Left join `right` onto `left` by `id`. Every left row is kept; right
/// columns are `Null` where no id matches. `Null` ids never match.
pub fn left_join_on_id(left: &Frame, right: &Frame) -> Result<Frame, EtlError> {
    let left_id = left.require_column(ID_COLUMN)?;
    let right_id = right.require_column(ID_COLUMN)?;

    let right_cols: Vec<usize> = (0..right.columns().len())
        .filter(|&i| i != right_id)
        .collect();

    let mut columns: Vec<String> = left.columns().to_vec();
    for &i in &right_cols {
        let name = &right.columns()[i];
        if columns.contains(name) {
            return Err(EtlError::Schema {
                message: format!("column `{name}` exists on both sides of the join"),
            });
        }
        columns.push(name.clone());
    }

    let mut index: HashMap<i64, Vec<usize>> = HashMap::new();
    for (pos, row) in right.rows().iter().enumerate() {
        if let Some(id) = row[right_id].as_int() {
            index.entry(id).or_default().push(pos);
        }
    }

    let mut joined = Frame::new(columns);
    for row in left.rows() {
        let matches = row[left_id].as_int().and_then(|id| index.get(&id));
        match matches {
            Some(positions) => {
                for &pos in positions {
                    let mut out = row.clone();
                    out.extend(right_cols.iter().map(|&i| right.rows()[pos][i].clone()));
                    joined.push_row(out)?;
                }
            }
            None => {
                let mut out = row.clone();
                out.extend(std::iter::repeat(Cell::Null).take(right_cols.len()));
                joined.push_row(out)?;
            }
        }
    }
    Ok(joined)
}

/// Drop rows with a missing value in any column. Returns the number dropped.
pub fn drop_incomplete_rows(frame: &mut Frame) -> usize {
    let before = frame.len();
    frame.retain_rows(|row| !row.iter().any(Cell::is_null));
    before - frame.len()
}

/// Convert the named columns from text to integers.
pub fn coerce_category_columns(frame: &mut Frame, columns: &[String]) -> Result<(), EtlError> {
    let targets: Vec<(usize, &String)> = columns
        .iter()
        .map(|name| frame.require_column(name).map(|i| (i, name)))
        .collect::<Result<_, _>>()?;

    for row in frame.rows_mut() {
        for &(idx, name) in &targets {
            let cell = &mut row[idx];
            let coerced = match &*cell {
                Cell::Int(v) => *v,
                Cell::Text(s) => s.trim().parse::<i64>().map_err(|_| EtlError::Coercion {
                    column: name.clone(),
                    value: s.clone(),
                })?,
                other => {
                    return Err(EtlError::Coercion {
                        column: name.clone(),
                        value: other.to_string(),
                    })
                }
            };
            *cell = Cell::Int(coerced);
        }
    }
    Ok(())
}

/// Fold the erroneous source value `2` into `1` for a single column.
/// A table without that column is left unchanged.
pub fn remap_related(frame: &mut Frame, column: &str) -> usize {
    let Some(idx) = frame.column_index(column) else {
        tracing::debug!(column, "no related column to remap");
        return 0;
    };
    let mut remapped = 0;
    for row in frame.rows_mut() {
        if row[idx] == Cell::Int(2) {
            row[idx] = Cell::Int(1);
            remapped += 1;
        }
    }
    remapped
}

fn count_non_binary(frame: &Frame, columns: &[String]) -> usize {
    columns
        .iter()
        .filter_map(|name| frame.column(name))
        .map(|cells| {
            cells
                .filter(|c| !matches!(c, Cell::Int(0) | Cell::Int(1)))
                .count()
        })
        .sum()
}

/// Run every cleaning step and produce the merged table.
pub fn clean(
    mut messages: Frame,
    mut categories: Frame,
    config: &PipelineConfig,
) -> Result<CleanReport, EtlError> {
    let mut stats = CleanStats {
        duplicate_message_rows: drop_duplicate_ids(&mut messages)?,
        duplicate_category_rows: drop_duplicate_ids(&mut categories)?,
        ..CleanStats::default()
    };

    let (genre_columns, missing_genre) = one_hot_genre(&mut messages, &config.genre_prefix)?;

    let mut reserved = messages.columns().to_vec();
    reserved.push(MATCH_MARKER.to_string());
    let decoded = decode_categories(&categories, config.category_policy, &reserved)?;
    stats.malformed_category_rows = decoded.malformed.len();
    stats.missing_category_rows = decoded.missing;
    let category_columns: Vec<String> = decoded
        .frame
        .columns()
        .iter()
        .filter(|c| c.as_str() != ID_COLUMN)
        .cloned()
        .collect();
    let malformed = decoded.malformed;

    // Messages without a category row must not survive even when there are no
    // category columns to come back empty, so the join carries a marker column.
    let mut right = decoded.frame;
    let matched = vec![Cell::Bool(true); right.len()];
    right.push_column(MATCH_MARKER.to_string(), matched)?;

    let mut frame = left_join_on_id(&messages, &right)?;
    stats.incomplete_rows = missing_genre + drop_incomplete_rows(&mut frame);
    frame.drop_columns(&[MATCH_MARKER]);
    coerce_category_columns(&mut frame, &category_columns)?;
    stats.related_remapped = remap_related(&mut frame, &config.related_column);

    stats.non_binary_values = count_non_binary(&frame, &category_columns);
    if stats.non_binary_values > 0 {
        tracing::warn!(
            count = stats.non_binary_values,
            "category values outside {{0, 1}} remain after remapping"
        );
    }

    tracing::info!(
        rows = frame.len(),
        duplicate_message_rows = stats.duplicate_message_rows,
        duplicate_category_rows = stats.duplicate_category_rows,
        malformed_category_rows = stats.malformed_category_rows,
        missing_category_rows = stats.missing_category_rows,
        incomplete_rows = stats.incomplete_rows,
        related_remapped = stats.related_remapped,
        "cleaned merged table"
    );

    Ok(CleanReport {
        frame,
        genre_columns,
        category_columns,
        stats,
        malformed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CategoryPolicy;
    use crate::load::{CATEGORIES_COLUMN, MESSAGE_COLUMN};

    fn messages(rows: &[(i64, &str, &str)]) -> Frame {
        let mut frame = Frame::new(vec![
            ID_COLUMN.into(),
            MESSAGE_COLUMN.into(),
            GENRE_COLUMN.into(),
        ]);
        for (id, message, genre) in rows {
            frame
                .push_row(vec![
                    Cell::Int(*id),
                    Cell::from_field(message),
                    Cell::from_field(genre),
                ])
                .unwrap();
        }
        frame
    }

    fn categories(rows: &[(i64, &str)]) -> Frame {
        let mut frame = Frame::new(vec![ID_COLUMN.into(), CATEGORIES_COLUMN.into()]);
        for (id, packed) in rows {
            frame
                .push_row(vec![Cell::Int(*id), Cell::from_field(packed)])
                .unwrap();
        }
        frame
    }

    #[test]
    fn test_drop_duplicate_ids_removes_every_copy() {
        let mut frame = messages(&[(1, "a", "news"), (2, "b", "news"), (1, "c", "news")]);
        assert_eq!(drop_duplicate_ids(&mut frame).unwrap(), 2);
        assert_eq!(frame.len(), 1);
        assert_eq!(frame.get(0, "id"), Some(&Cell::Int(2)));
    }

    #[test]
    fn test_one_hot_genre_sorted_columns() {
        let mut frame = messages(&[(1, "a", "social"), (2, "b", "direct"), (3, "c", "news")]);
        let (names, missing) = one_hot_genre(&mut frame, "genre").unwrap();
        assert_eq!(names, ["genre_direct", "genre_news", "genre_social"]);
        assert_eq!(missing, 0);
        assert_eq!(
            frame.columns(),
            ["id", "message", "genre_direct", "genre_news", "genre_social"]
        );
        assert_eq!(
            frame.rows()[1][2..],
            [Cell::Bool(true), Cell::Bool(false), Cell::Bool(false)]
        );
    }

    #[test]
    fn test_one_hot_drops_rows_without_genre() {
        let mut frame = messages(&[(1, "a", "news"), (2, "b", "")]);
        let (names, missing) = one_hot_genre(&mut frame, "genre").unwrap();
        assert_eq!(names, ["genre_news"]);
        assert_eq!(missing, 1);
        assert_eq!(frame.len(), 1);
        assert_eq!(frame.get(0, "id"), Some(&Cell::Int(1)));
    }

    #[test]
    fn test_one_hot_every_genre_missing() {
        let mut frame = messages(&[(1, "a", ""), (2, "b", "")]);
        let (names, missing) = one_hot_genre(&mut frame, "genre").unwrap();
        assert!(names.is_empty());
        assert_eq!(missing, 2);
        assert!(frame.is_empty());
        assert_eq!(frame.columns(), ["id", "message"]);
    }

    #[test]
    fn test_left_join_keeps_unmatched_left_rows() {
        let left = messages(&[(1, "a", "news"), (2, "b", "news")]);
        let mut right = Frame::new(vec!["related".into(), ID_COLUMN.into()]);
        right
            .push_row(vec![Cell::Text("1".into()), Cell::Int(2)])
            .unwrap();
        let joined = left_join_on_id(&left, &right).unwrap();
        assert_eq!(joined.columns(), ["id", "message", "genre", "related"]);
        assert_eq!(joined.len(), 2);
        assert_eq!(joined.get(0, "related"), Some(&Cell::Null));
        assert_eq!(joined.get(1, "related"), Some(&Cell::Text("1".into())));
    }

    #[test]
    fn test_left_join_rejects_column_collision() {
        let left = messages(&[(1, "a", "news")]);
        let mut right = Frame::new(vec![MESSAGE_COLUMN.into(), ID_COLUMN.into()]);
        right.push_row(vec![Cell::Text("1".into()), Cell::Int(1)]).unwrap();
        assert!(matches!(
            left_join_on_id(&left, &right),
            Err(EtlError::Schema { .. })
        ));
    }

    #[test]
    fn test_coerce_rejects_non_numeric() {
        let mut frame = Frame::new(vec!["related".into()]);
        frame.push_row(vec![Cell::Text("x".into())]).unwrap();
        let err = coerce_category_columns(&mut frame, &["related".to_string()]).unwrap_err();
        assert!(matches!(err, EtlError::Coercion { .. }));
    }

    #[test]
    fn test_remap_touches_only_related() {
        let mut frame = Frame::new(vec!["related".into(), "request".into()]);
        frame.push_row(vec![Cell::Int(2), Cell::Int(2)]).unwrap();
        frame.push_row(vec![Cell::Int(0), Cell::Int(1)]).unwrap();
        assert_eq!(remap_related(&mut frame, "related"), 1);
        assert_eq!(frame.rows()[0], vec![Cell::Int(1), Cell::Int(2)]);
        assert_eq!(remap_related(&mut frame, "absent"), 0);
    }

    #[test]
    fn test_clean_single_message_scenario() {
        let report = clean(
            messages(&[(1, "Help", "direct")]),
            categories(&[(1, "related-1;request-0")]),
            &PipelineConfig::default(),
        )
        .unwrap();
        let frame = &report.frame;
        assert_eq!(
            frame.columns(),
            ["id", "message", "genre_direct", "related", "request"]
        );
        assert_eq!(
            frame.rows()[0],
            vec![
                Cell::Int(1),
                Cell::Text("Help".into()),
                Cell::Bool(true),
                Cell::Int(1),
                Cell::Int(0),
            ]
        );
        assert_eq!(report.category_columns, ["related", "request"]);
    }

    #[test]
    fn test_clean_duplicate_message_id_is_absent() {
        let report = clean(
            messages(&[(1, "Help", "direct"), (1, "Help again", "direct"), (2, "Water", "news")]),
            categories(&[(1, "related-1"), (2, "related-0")]),
            &PipelineConfig::default(),
        )
        .unwrap();
        let ids: Vec<_> = report.frame.column("id").unwrap().cloned().collect();
        assert_eq!(ids, vec![Cell::Int(2)]);
        assert_eq!(report.stats.duplicate_message_rows, 2);
    }

    #[test]
    fn test_clean_remaps_related_two() {
        let report = clean(
            messages(&[(3, "Food", "news")]),
            categories(&[(3, "related-2;request-1")]),
            &PipelineConfig::default(),
        )
        .unwrap();
        assert_eq!(report.frame.get(0, "related"), Some(&Cell::Int(1)));
        assert_eq!(report.stats.related_remapped, 1);
        assert_eq!(report.stats.non_binary_values, 0);
    }

    #[test]
    fn test_clean_disjoint_ids_is_empty_not_error() {
        let report = clean(
            messages(&[(1, "Help", "direct")]),
            categories(&[(2, "related-1")]),
            &PipelineConfig::default(),
        )
        .unwrap();
        assert!(report.frame.is_empty());
        assert_eq!(report.stats.incomplete_rows, 1);
    }

    #[test]
    fn test_column_types_follow_roles_when_empty() {
        let report = clean(
            messages(&[(1, "Help", "direct")]),
            categories(&[(2, "related-1;request-0")]),
            &PipelineConfig::default(),
        )
        .unwrap();
        assert!(report.frame.is_empty());
        assert_eq!(
            report.frame.columns(),
            ["id", "message", "genre_direct", "related", "request"]
        );
        assert_eq!(
            report.column_types(),
            vec![
                SqlType::Integer,
                SqlType::Text,
                SqlType::Integer,
                SqlType::Integer,
                SqlType::Integer,
            ]
        );
    }

    #[test]
    fn test_clean_without_any_category_rows_is_empty() {
        let report = clean(
            messages(&[(1, "Help", "direct")]),
            categories(&[]),
            &PipelineConfig::default(),
        )
        .unwrap();
        assert!(report.frame.is_empty());
        assert!(!report.frame.columns().iter().any(|c| c == MATCH_MARKER));
    }

    #[test]
    fn test_clean_lenient_drops_malformed_row_only() {
        let report = clean(
            messages(&[(1, "a", "news"), (2, "b", "news")]),
            categories(&[(1, "related-1"), (2, "related1")]),
            &PipelineConfig::default(),
        )
        .unwrap();
        assert_eq!(report.frame.len(), 1);
        assert_eq!(report.malformed.len(), 1);
        assert_eq!(report.stats.malformed_category_rows, 1);
    }

    #[test]
    fn test_clean_without_any_genre_is_empty() {
        let report = clean(
            messages(&[(1, "Help", "")]),
            categories(&[(1, "related-1")]),
            &PipelineConfig::default(),
        )
        .unwrap();
        assert!(report.frame.is_empty());
        assert!(report.genre_columns.is_empty());
        assert_eq!(report.stats.incomplete_rows, 1);
    }

    #[test]
    fn test_clean_without_any_packed_string_is_empty() {
        let report = clean(
            messages(&[(1, "Help", "direct")]),
            categories(&[(1, "")]),
            &PipelineConfig::default(),
        )
        .unwrap();
        assert!(report.frame.is_empty());
        assert!(report.category_columns.is_empty());
        assert_eq!(report.stats.missing_category_rows, 1);
        assert_eq!(report.stats.incomplete_rows, 1);
    }

    #[test]
    fn test_clean_lenient_skips_category_named_like_message_column() {
        let report = clean(
            messages(&[(5, "Help", "direct"), (6, "Water", "direct")]),
            categories(&[(5, "message-1"), (6, "related-0")]),
            &PipelineConfig::default(),
        )
        .unwrap();
        let ids: Vec<_> = report.frame.column("id").unwrap().cloned().collect();
        assert_eq!(ids, vec![Cell::Int(6)]);
        assert_eq!(report.frame.get(0, "message"), Some(&Cell::Text("Water".into())));
        assert_eq!(report.malformed.len(), 1);
        assert_eq!(report.malformed[0].id, Some(5));

        let strict = PipelineConfig {
            category_policy: CategoryPolicy::Strict,
            ..PipelineConfig::default()
        };
        let result = clean(
            messages(&[(5, "Help", "direct")]),
            categories(&[(5, "genre_direct-1")]),
            &strict,
        );
        assert!(matches!(result, Err(EtlError::MalformedCategoryToken(_))));
    }

    #[test]
    fn test_clean_strict_aborts() {
        let config = PipelineConfig {
            category_policy: CategoryPolicy::Strict,
            ..PipelineConfig::default()
        };
        let result = clean(
            messages(&[(1, "a", "news")]),
            categories(&[(1, "related1")]),
            &config,
        );
        assert!(matches!(result, Err(EtlError::MalformedCategoryToken(_))));
    }

    #[test]
    fn test_clean_is_deterministic() {
        let m = messages(&[(1, "a", "news"), (2, "b", "direct"), (3, "c", "social")]);
        let c = categories(&[(1, "related-1;offer-0"), (2, "related-2;offer-1"), (3, "related-0;offer-0")]);
        let first = clean(m.clone(), c.clone(), &PipelineConfig::default()).unwrap();
        let second = clean(m, c, &PipelineConfig::default()).unwrap();
        assert_eq!(first.frame, second.frame);
        assert_eq!(first.frame.len(), 3);
    }
}
