//! database migrations for iouvault.
//!
//! each obligation schema version gets its own migration. a migration that has
//! shipped is never edited; a new schema version adds a new one.

pub use sea_orm_migration::prelude::*;

mod m20261017_000001_create_iou_states;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(m20261017_000001_create_iou_states::Migration)]
    }
}
