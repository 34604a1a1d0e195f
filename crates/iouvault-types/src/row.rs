//! column tuple used to move records in and out of a table.

use uuid::Uuid;

use crate::ColumnType;

/// a single column value in a row tuple.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnValue {
    /// sql null
    Null,
    /// text value
    Text(String),
    /// 32-bit integer value
    Int32(i32),
    /// uuid value
    Uuid(Uuid),
    /// byte sequence
    Bytes(Vec<u8>),
}

impl ColumnValue {
    /// the column type this value can be stored in, or `None` for null.
    pub fn column_type(&self) -> Option<ColumnType> {
        match self {
            ColumnValue::Null => None,
            ColumnValue::Text(_) => Some(ColumnType::Text),
            ColumnValue::Int32(_) => Some(ColumnType::Integer32),
            ColumnValue::Uuid(_) => Some(ColumnType::Uuid),
            ColumnValue::Bytes(_) => Some(ColumnType::Bytes),
        }
    }

    /// whether this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, ColumnValue::Null)
    }
}

impl<T> From<Option<T>> for ColumnValue
where
    T: Into<ColumnValue>,
{
    fn from(value: Option<T>) -> Self {
        value.map_or(ColumnValue::Null, Into::into)
    }
}

impl From<String> for ColumnValue {
    fn from(value: String) -> Self {
        ColumnValue::Text(value)
    }
}

impl From<i32> for ColumnValue {
    fn from(value: i32) -> Self {
        ColumnValue::Int32(value)
    }
}

impl From<Uuid> for ColumnValue {
    fn from(value: Uuid) -> Self {
        ColumnValue::Uuid(value)
    }
}

impl From<Vec<u8>> for ColumnValue {
    fn from(value: Vec<u8>) -> Self {
        ColumnValue::Bytes(value)
    }
}
