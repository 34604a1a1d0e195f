//! database entity models for sea-orm.
//!
//! these entities map to database tables and convert rows to and from
//! the record types in iouvault-types.

pub mod iou_state;
