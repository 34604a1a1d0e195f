//! error types for iouvault-types

use thiserror::Error;

use crate::ColumnType;

/// errors that can occur while decoding rows or handling configuration
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// the row has a different number of columns than the schema declares
    #[error("expected {expected} columns, got {actual}")]
    ColumnCount {
        /// columns declared by the schema
        expected: usize,
        /// columns present in the row
        actual: usize,
    },

    /// a column holds a value of the wrong type
    #[error("column `{column}` expected {expected}")]
    ColumnType {
        /// column name
        column: &'static str,
        /// declared type
        expected: ColumnType,
    },

    /// a non-nullable column holds null
    #[error("column `{column}` is not nullable")]
    NullColumn {
        /// column name
        column: &'static str,
    },

    /// no schema is registered under this version number
    #[error("unknown schema version: {0}")]
    UnknownSchemaVersion(u32),

    /// invalid linear id
    #[error("invalid linear id: {0}")]
    InvalidLinearId(String),

    /// configuration error
    #[error("configuration error: {0}")]
    Config(String),
}
