//! core types for iouvault - durable storage of iou obligation records.
//!
//! this crate provides the data structures shared by the storage layer and the cli:
//! - [`IouRecord`]: one stored version of an obligation
//! - [`MappedSchema`] and [`SchemaVersion`]: the versioned column layout of `iou_states`
//! - [`ColumnValue`]: the column tuple used to encode and decode records
//! - [`Config`]: application configuration

mod config;
mod error;
mod keys;
mod linear_id;
mod record;
mod row;
mod schema;

pub use config::{Config, DatabaseConfig};
pub use error::Error;
pub use keys::{PublicKey, SignedMessage};
pub use linear_id::LinearId;
pub use record::IouRecord;
pub use row::ColumnValue;
pub use schema::{
    ColumnDescriptor, ColumnType, EntityDescriptor, IOU_SCHEMA_V1, MappedSchema, PERSISTENT_IOU_V1,
    SchemaVersion,
};

/// result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;
