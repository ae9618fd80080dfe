use std::path::PathBuf;
use thiserror::Error;

/// A packed category token that cannot be decoded into `name-digit`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedToken {
    /// Id of the category row, when it had one.
    pub id: Option<i64>,
    pub token: String,
    pub reason: &'static str,
}

impl std::fmt::Display for MalformedToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.id {
            Some(id) => write!(f, "id {id}: token `{}` ({})", self.token, self.reason),
            None => write!(f, "token `{}` ({})", self.token, self.reason),
        }
    }
}

#[derive(Debug, Error)]
pub enum EtlError {
    #[error("failed to read source table {path}: {message}")]
    SourceRead { path: PathBuf, message: String },

    #[error("malformed category token: {0}")]
    MalformedCategoryToken(MalformedToken),

    #[error("failed to write table `{table}` to {path}: {source}")]
    DestinationWrite {
        path: PathBuf,
        table: String,
        #[source]
        source: rusqlite::Error,
    },

    #[error("cannot coerce column `{column}` value `{value}` to an integer")]
    Coercion { column: String, value: String },

    #[error("schema error: {message}")]
    Schema { message: String },
}
