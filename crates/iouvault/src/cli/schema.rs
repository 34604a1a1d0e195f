//! the `schema` subcommand - inspect obligation schema versions

use clap::{Args, Subcommand};
use color_eyre::eyre::{Context, Result, bail};
use iouvault_types::{MappedSchema, SchemaVersion};

use super::{DbArgs, OutputFormat};

/// inspect obligation schema versions
#[derive(Subcommand, Debug)]
pub enum SchemaCommand {
    /// print the column layout of a schema version
    Show(ShowSchemaArgs),

    /// compare the live database table with a schema version
    Check(CheckSchemaArgs),
}

/// print a schema version
#[derive(Args, Debug)]
pub struct ShowSchemaArgs {
    /// schema version number (defaults to the latest)
    #[arg(long)]
    version: Option<u32>,

    /// output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    output: OutputFormat,
}

/// check the live table against a schema version
#[derive(Args, Debug)]
pub struct CheckSchemaArgs {
    #[command(flatten)]
    db: DbArgs,

    /// schema version number (defaults to the latest)
    #[arg(long)]
    version: Option<u32>,
}

impl SchemaCommand {
    /// run the schema command
    pub async fn run(self) -> Result<()> {
        match self {
            SchemaCommand::Show(args) => show_schema(args),
            SchemaCommand::Check(args) => check_schema(args).await,
        }
    }
}

fn resolve_version(version: Option<u32>) -> Result<SchemaVersion> {
    match version {
        Some(n) => SchemaVersion::from_number(n).context("unknown schema version"),
        None => Ok(SchemaVersion::LATEST),
    }
}

fn show_schema(args: ShowSchemaArgs) -> Result<()> {
    let schema = resolve_version(args.version)?.schema();

    if args.output == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(schema)?);
        return Ok(());
    }

    print!("{}", render_schema(schema));
    Ok(())
}

/// render a schema as an aligned text table.
pub fn render_schema(schema: &MappedSchema) -> String {
    let mut out = format!("{} v{}\n", schema.family, schema.version);
    for entity in schema.entities {
        out.push_str(&format!("\n{} (table {})\n", entity.name, entity.table));
        out.push_str(&format!(
            "{:<16} {:<16} {:<10} {:<8}\n",
            "FIELD", "COLUMN", "TYPE", "NULLABLE"
        ));
        out.push_str(&format!("{}\n", "-".repeat(53)));
        for column in entity.columns {
            out.push_str(&format!(
                "{:<16} {:<16} {:<10} {:<8}\n",
                column.field,
                column.column,
                column.column_type.as_str(),
                if column.nullable { "yes" } else { "no" },
            ));
        }
    }
    out
}

async fn check_schema(args: CheckSchemaArgs) -> Result<()> {
    let version = resolve_version(args.version)?;
    let db = args.db.connect().await?;

    let drift = db
        .check_schema(version)
        .await
        .context("failed to inspect database schema")?;

    if drift.is_clean() {
        println!(
            "iou_states matches {} v{}",
            version.schema().family,
            version.number()
        );
        return Ok(());
    }

    for column in &drift.missing {
        println!("missing column:     {}", column);
    }
    for column in &drift.unexpected {
        println!("unexpected column:  {}", column);
    }
    for column in &drift.nullability {
        println!("nullability differs: {}", column);
    }
    bail!("iou_states does not match schema v{}", version.number());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_schema_lists_every_column() {
        let rendered = render_schema(SchemaVersion::V1.schema());
        assert!(rendered.starts_with("IOUSchema v1\n"));
        assert!(rendered.contains("PersistentIOU (table iou_states)"));
        for column in SchemaVersion::V1.iou_entity().columns {
            assert!(rendered.contains(column.column));
        }
        assert!(rendered.contains("integer32"));
    }

    #[test]
    fn test_resolve_version() {
        assert_eq!(resolve_version(None).unwrap(), SchemaVersion::LATEST);
        assert_eq!(resolve_version(Some(1)).unwrap(), SchemaVersion::V1);
        assert!(resolve_version(Some(99)).is_err());
    }
}
