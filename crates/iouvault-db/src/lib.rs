//! database layer for iouvault.
//!
//! this crate maps the obligation schema from iouvault-types onto a relational
//! store with sea-orm. storage is append-only: every committed version of an
//! obligation is a new row in `iou_states`, and versions of the same obligation
//! share a linear id.

#![warn(missing_docs)]

mod entity;
mod error;
mod migration;

pub use error::Error;

use std::future::Future;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, Database as SeaOrmDatabase,
    DatabaseBackend, DatabaseConnection, EntityTrait, FromQueryResult, QueryFilter, QueryOrder,
    Statement,
};
use sea_orm_migration::MigratorTrait;
use tracing::{debug, info, warn};

use iouvault_types::{Config, DatabaseConfig, EntityDescriptor, IouRecord, LinearId, SchemaVersion};

/// column that holds the per-version row id. storage bookkeeping, not part of
/// the obligation schema.
pub const ROW_ID_COLUMN: &str = "id";

/// result type for database operations.
pub type Result<T> = std::result::Result<T, Error>;

/// an obligation record together with the row id it was stored under.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredIou {
    /// per-version row id, assigned by the store
    pub id: u64,
    /// the stored record
    pub record: IouRecord,
}

/// differences between the live table and a schema version's column descriptors.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SchemaDrift {
    /// declared columns the table lacks
    pub missing: Vec<String>,
    /// table columns the schema does not declare
    pub unexpected: Vec<String>,
    /// columns whose nullability differs from the declaration
    pub nullability: Vec<String>,
}

impl SchemaDrift {
    /// whether the table matches the declaration exactly.
    pub fn is_clean(&self) -> bool {
        self.missing.is_empty() && self.unexpected.is_empty() && self.nullability.is_empty()
    }

    /// compare live `(column, not_null)` pairs against an entity's declared columns.
    pub fn compare(entity: &EntityDescriptor, live: &[(String, bool)]) -> Self {
        let mut drift = SchemaDrift::default();

        for declared in entity.columns {
            match live.iter().find(|(name, _)| name == declared.column) {
                None => drift.missing.push(declared.column.to_string()),
                Some((_, not_null)) if *not_null == declared.nullable => {
                    drift.nullability.push(declared.column.to_string())
                }
                Some(_) => {}
            }
        }

        for (name, _) in live {
            if name != ROW_ID_COLUMN && entity.column(name).is_none() {
                drift.unexpected.push(name.clone());
            }
        }

        drift
    }
}

/// storage operations for obligation records.
///
/// there is no update or delete: a new version of an obligation is recorded as a
/// new row carrying the same linear id.
pub trait IouStore: Send + Sync {
    /// ping the database to verify connectivity.
    fn ping(&self) -> impl Future<Output = Result<()>> + Send;

    /// append a record. returns it with its assigned row id.
    ///
    /// the all-null placeholder record is refused.
    fn record(&self, record: &IouRecord) -> impl Future<Output = Result<StoredIou>> + Send;

    /// get a stored version by its row id.
    fn get(&self, id: u64) -> impl Future<Output = Result<Option<StoredIou>>> + Send;

    /// list every stored version, oldest first.
    fn list(&self) -> impl Future<Output = Result<Vec<StoredIou>>> + Send;

    /// all versions of one obligation, oldest first.
    fn history(
        &self,
        linear_id: LinearId,
    ) -> impl Future<Output = Result<Vec<StoredIou>>> + Send;

    /// the newest version of one obligation.
    fn latest(
        &self,
        linear_id: LinearId,
    ) -> impl Future<Output = Result<Option<StoredIou>>> + Send;

    /// all versions where `lender` is the creditor, oldest first.
    fn list_by_lender(
        &self,
        lender: &str,
    ) -> impl Future<Output = Result<Vec<StoredIou>>> + Send;

    /// all versions where `borrower` is the debtor, oldest first.
    fn list_by_borrower(
        &self,
        borrower: &str,
    ) -> impl Future<Output = Result<Vec<StoredIou>>> + Send;
}

/// the main database implementation using sea-orm.
#[derive(Clone)]
pub struct IouVaultDb {
    conn: DatabaseConnection,
}

impl IouVaultDb {
    /// open the store described by `config` and bring `iou_states` up to the
    /// latest schema version.
    pub async fn new(config: &Config) -> Result<Self> {
        let url = Self::build_connection_url(&config.database)?;
        let db = Self::open(&url).await?;

        if config.database.db_type == "sqlite" && config.database.write_ahead_log {
            db.enable_wal_mode().await?;
        }

        db.migrate().await?;
        Ok(db)
    }

    /// migrated in-memory sqlite store, used by tests.
    pub async fn new_in_memory() -> Result<Self> {
        let db = Self::open("sqlite::memory:").await?;
        db.migrate().await?;
        Ok(db)
    }

    async fn open(url: &str) -> Result<Self> {
        let conn = SeaOrmDatabase::connect(url)
            .await
            .map_err(|e| Error::Connection(e.to_string()))?;
        debug!(backend = ?conn.get_database_backend(), "opened obligation store");
        Ok(Self { conn })
    }

    async fn enable_wal_mode(&self) -> Result<()> {
        self.conn
            .execute_unprepared("PRAGMA journal_mode=WAL")
            .await
            .map_err(|e| Error::Connection(format!("cannot switch iou store to WAL: {}", e)))?;
        debug!("iou store journal mode set to WAL");
        Ok(())
    }

    /// turn a [`DatabaseConfig`] into a url sea-orm can connect to. sqlite files
    /// are created on first open.
    fn build_connection_url(config: &DatabaseConfig) -> Result<String> {
        let target = config.connection_string.as_str();
        match config.db_type.as_str() {
            "sqlite" => {
                let url = if target.starts_with("sqlite:") {
                    target.to_string()
                } else {
                    format!("sqlite:{}", target)
                };
                Ok(if url.contains('?') {
                    url
                } else {
                    url + "?mode=rwc"
                })
            }
            "postgres" | "postgresql" => Ok(target.to_string()),
            other => Err(Error::InvalidData(format!(
                "iou store cannot use database type {}",
                other
            ))),
        }
    }

    /// run database migrations.
    pub async fn migrate(&self) -> Result<()> {
        migration::Migrator::up(&self.conn, None)
            .await
            .map_err(|e| Error::Migration(e.to_string()))?;
        info!(
            schema = SchemaVersion::LATEST.schema().family,
            version = SchemaVersion::LATEST.number(),
            "migrations applied"
        );
        Ok(())
    }

    /// compare the live `iou_states` table against a schema version's columns.
    pub async fn check_schema(&self, version: SchemaVersion) -> Result<SchemaDrift> {
        #[derive(FromQueryResult)]
        struct LiveColumn {
            name: String,
            notnull: i64,
        }

        let entity = version.iou_entity();
        let backend = self.conn.get_database_backend();
        let statement = match backend {
            DatabaseBackend::Sqlite => Statement::from_string(
                backend,
                format!("SELECT name, \"notnull\" FROM pragma_table_info('{}')", entity.table),
            ),
            DatabaseBackend::Postgres => Statement::from_sql_and_values(
                backend,
                "SELECT column_name AS name, \
                 CAST(CASE WHEN is_nullable = 'NO' THEN 1 ELSE 0 END AS BIGINT) AS notnull \
                 FROM information_schema.columns WHERE table_name = $1",
                [entity.table.into()],
            ),
            other => {
                return Err(Error::InvalidData(format!(
                    "schema check not supported for {:?}",
                    other
                )));
            }
        };

        let live: Vec<(String, bool)> = LiveColumn::find_by_statement(statement)
            .all(&self.conn)
            .await?
            .into_iter()
            .map(|c| (c.name, c.notnull != 0))
            .collect();

        let drift = SchemaDrift::compare(entity, &live);
        if !drift.is_clean() {
            warn!(
                table = entity.table,
                missing = ?drift.missing,
                unexpected = ?drift.unexpected,
                nullability = ?drift.nullability,
                "schema drift detected"
            );
        }
        Ok(drift)
    }

    /// close the database connection.
    pub async fn close(self) -> Result<()> {
        self.conn.close().await?;
        debug!("database connection closed");
        Ok(())
    }
}

fn into_stored(models: Vec<entity::iou_state::Model>) -> Result<Vec<StoredIou>> {
    models.into_iter().map(StoredIou::try_from).collect()
}

impl IouStore for IouVaultDb {
    async fn ping(&self) -> Result<()> {
        self.conn
            .execute_unprepared("SELECT 1")
            .await
            .map_err(|e| Error::Connection(e.to_string()))?;
        Ok(())
    }

    async fn record(&self, record: &IouRecord) -> Result<StoredIou> {
        if record.is_placeholder() {
            return Err(Error::InvalidData(
                "refusing to store placeholder record".to_string(),
            ));
        }

        let model: entity::iou_state::ActiveModel = record.into();
        let result = model.insert(&self.conn).await?;
        let stored = StoredIou::try_from(result)?;

        debug!(
            id = stored.id,
            linear_id = ?stored.record.linear_id().map(|id| id.to_string()),
            value = stored.record.value(),
            public_key = ?stored.record.public_key().map(|k| k.short_string()),
            "recorded iou"
        );
        Ok(stored)
    }

    async fn get(&self, id: u64) -> Result<Option<StoredIou>> {
        // ids past i64::MAX can never have been assigned
        let Ok(id) = i64::try_from(id) else {
            return Ok(None);
        };
        let result = entity::iou_state::Entity::find_by_id(id)
            .one(&self.conn)
            .await?;
        result.map(StoredIou::try_from).transpose()
    }

    async fn list(&self) -> Result<Vec<StoredIou>> {
        let results = entity::iou_state::Entity::find()
            .order_by_asc(entity::iou_state::Column::Id)
            .all(&self.conn)
            .await?;
        into_stored(results)
    }

    async fn history(&self, linear_id: LinearId) -> Result<Vec<StoredIou>> {
        let results = entity::iou_state::Entity::find()
            .filter(entity::iou_state::Column::LinearId.eq(linear_id.as_uuid()))
            .order_by_asc(entity::iou_state::Column::Id)
            .all(&self.conn)
            .await?;
        debug!(%linear_id, versions = results.len(), "loaded iou history");
        into_stored(results)
    }

    async fn latest(&self, linear_id: LinearId) -> Result<Option<StoredIou>> {
        let result = entity::iou_state::Entity::find()
            .filter(entity::iou_state::Column::LinearId.eq(linear_id.as_uuid()))
            .order_by_desc(entity::iou_state::Column::Id)
            .one(&self.conn)
            .await?;
        result.map(StoredIou::try_from).transpose()
    }

    async fn list_by_lender(&self, lender: &str) -> Result<Vec<StoredIou>> {
        let results = entity::iou_state::Entity::find()
            .filter(entity::iou_state::Column::Lender.eq(lender))
            .order_by_asc(entity::iou_state::Column::Id)
            .all(&self.conn)
            .await?;
        into_stored(results)
    }

    async fn list_by_borrower(&self, borrower: &str) -> Result<Vec<StoredIou>> {
        let results = entity::iou_state::Entity::find()
            .filter(entity::iou_state::Column::Borrower.eq(borrower))
            .order_by_asc(entity::iou_state::Column::Id)
            .all(&self.conn)
            .await?;
        into_stored(results)
    }
}
