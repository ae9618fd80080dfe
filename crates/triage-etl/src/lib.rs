//! Message/category merge pipeline for Triage
//!
//! Loads a messages table and a categories table, cleans and merges them,
//! and writes one flat table to SQLite:
//!
//! ```text
//!  messages.csv ──┐
//!                 ├─► load ─► clean ─► save ─► destination.db (table `merged`)
//!  categories.csv ┘
//! ```
//!
//! Cleaning drops every copy of a duplicated `id`, one-hot encodes `genre`,
//! decodes the packed `name-digit;...` category string into integer columns,
//! left-joins on `id`, drops incomplete rows and folds `related = 2` into `1`.

pub mod categories;
pub mod clean;
pub mod config;
pub mod error;
pub mod frame;
pub mod load;
pub mod sink;

pub use categories::{decode_categories, decode_packed, split_token, DecodedCategories};
pub use clean::{
    clean, coerce_category_columns, drop_duplicate_ids, drop_incomplete_rows, left_join_on_id,
    one_hot_genre, remap_related, CleanReport, CleanStats,
};
pub use config::{CategoryPolicy, PipelineConfig};
pub use error::{EtlError, MalformedToken};
pub use frame::{Cell, Frame, RowMap};
pub use load::{load, load_categories_from_reader, load_messages_from_reader};
pub use sink::{infer_column_types, read_table, save, save_with_types, SqlType};
