//! the `migrate` subcommand - create or upgrade the database schema.

use clap::Args;
use color_eyre::eyre::Result;
use iouvault_types::SchemaVersion;

use super::DbArgs;

/// create or upgrade the database schema
#[derive(Args, Debug)]
pub struct MigrateCommand {
    #[command(flatten)]
    db: DbArgs,
}

impl MigrateCommand {
    /// run the migrate command
    pub async fn run(self) -> Result<()> {
        // connecting runs every pending migration
        let db = self.db.connect().await?;
        db.close().await?;

        let latest = SchemaVersion::LATEST.schema();
        println!("Database is at {} v{}", latest.family, latest.version);
        Ok(())
    }
}
