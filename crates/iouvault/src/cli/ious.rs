//! the `ious` subcommand - record and query obligations

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use clap::{Args, Subcommand};
use color_eyre::eyre::{Context, Result, bail, ensure};
use iouvault_db::{IouStore, StoredIou};
use iouvault_types::{IouRecord, LinearId, PublicKey, SignedMessage};
use serde::Serialize;
use tracing::info;

use super::{DbArgs, OutputFormat};

/// record and query obligations
#[derive(Subcommand, Debug)]
pub enum IousCommand {
    /// record a new obligation, or a new version of an existing one
    Create(CreateIouArgs),

    /// list stored obligation versions
    List(ListIousArgs),

    /// show every version of one obligation
    History(HistoryArgs),

    /// show a single stored version by row id
    Show(ShowIouArgs),
}

/// record an obligation
#[derive(Args, Debug)]
pub struct CreateIouArgs {
    #[command(flatten)]
    db: DbArgs,

    /// creditor party
    #[arg(long)]
    lender: String,

    /// debtor party
    #[arg(long)]
    borrower: String,

    /// amount owed
    #[arg(long, allow_negative_numbers = true)]
    value: i32,

    /// linear id of an existing obligation to record a new version of
    #[arg(long)]
    linear_id: Option<LinearId>,

    /// public key (base64)
    #[arg(long)]
    public_key: Option<String>,

    /// detached signature (base64)
    #[arg(long)]
    signed_message: Option<String>,
}

/// list obligations
#[derive(Args, Debug)]
pub struct ListIousArgs {
    #[command(flatten)]
    db: DbArgs,

    /// only obligations where this party is the lender
    #[arg(long, conflicts_with = "borrower")]
    lender: Option<String>,

    /// only obligations where this party is the borrower
    #[arg(long)]
    borrower: Option<String>,

    /// output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    output: OutputFormat,
}

/// show the history of one obligation
#[derive(Args, Debug)]
pub struct HistoryArgs {
    #[command(flatten)]
    db: DbArgs,

    /// linear id of the obligation
    linear_id: LinearId,

    /// output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    output: OutputFormat,
}

/// show one stored version
#[derive(Args, Debug)]
pub struct ShowIouArgs {
    #[command(flatten)]
    db: DbArgs,

    /// row id of the stored version
    id: u64,

    /// output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    output: OutputFormat,
}

impl IousCommand {
    /// run the ious command
    pub async fn run(self) -> Result<()> {
        match self {
            IousCommand::Create(args) => create_iou(args).await,
            IousCommand::List(args) => list_ious(args).await,
            IousCommand::History(args) => show_history(args).await,
            IousCommand::Show(args) => show_iou(args).await,
        }
    }
}

/// checks the obligation layer applies before a record is built.
///
/// the record type itself accepts anything; these rules live with the caller.
pub fn validate_new_iou(lender: &str, borrower: &str, value: i32) -> Result<()> {
    ensure!(!lender.trim().is_empty(), "lender must not be empty");
    ensure!(!borrower.trim().is_empty(), "borrower must not be empty");
    ensure!(value > 0, "value must be positive, got {}", value);
    Ok(())
}

fn decode_base64(flag: &str, value: Option<&str>) -> Result<Option<Vec<u8>>> {
    value
        .map(|v| {
            BASE64
                .decode(v.trim())
                .with_context(|| format!("--{} is not valid base64", flag))
        })
        .transpose()
}

async fn create_iou(args: CreateIouArgs) -> Result<()> {
    validate_new_iou(&args.lender, &args.borrower, args.value)?;

    let public_key = decode_base64("public-key", args.public_key.as_deref())?;
    let signed_message = decode_base64("signed-message", args.signed_message.as_deref())?;

    let db = args.db.connect().await?;

    let linear_id = match args.linear_id {
        Some(id) => {
            // a supplied linear id must name an obligation that already exists
            if db
                .latest(id)
                .await
                .context("failed to look up obligation")?
                .is_none()
            {
                bail!(
                    "no obligation with linear id {}; omit --linear-id to create a new one",
                    id
                );
            }
            id
        }
        None => LinearId::new_random(),
    };

    let record = IouRecord::new(
        args.lender,
        args.borrower,
        args.value,
        linear_id,
        public_key.map(PublicKey::from_bytes),
        signed_message.map(SignedMessage::from_bytes),
    );

    let stored = db
        .record(&record)
        .await
        .context("failed to record obligation")?;
    info!(id = stored.id, %linear_id, "obligation recorded");

    println!("Recorded obligation:");
    print_detail(&IouView::from(&stored));
    Ok(())
}

async fn list_ious(args: ListIousArgs) -> Result<()> {
    let db = args.db.connect().await?;

    let ious = match (&args.lender, &args.borrower) {
        (Some(lender), _) => db.list_by_lender(lender).await,
        (None, Some(borrower)) => db.list_by_borrower(borrower).await,
        (None, None) => db.list().await,
    }
    .context("failed to list obligations")?;

    print_list(&ious, args.output)
}

async fn show_history(args: HistoryArgs) -> Result<()> {
    let db = args.db.connect().await?;

    let versions = db
        .history(args.linear_id)
        .await
        .context("failed to load obligation history")?;
    if versions.is_empty() {
        bail!("no obligation with linear id {}", args.linear_id);
    }

    print_list(&versions, args.output)
}

async fn show_iou(args: ShowIouArgs) -> Result<()> {
    let db = args.db.connect().await?;

    let Some(stored) = db.get(args.id).await.context("failed to query obligation")? else {
        bail!("obligation version {} not found", args.id);
    };

    let view = IouView::from(&stored);
    if args.output == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        print_detail(&view);
    }
    Ok(())
}

/// printable form of a stored obligation; key material is base64-encoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IouView {
    /// row id
    pub id: u64,
    /// creditor
    pub lender: Option<String>,
    /// debtor
    pub borrower: Option<String>,
    /// amount
    pub value: i32,
    /// linear id
    pub linear_id: Option<String>,
    /// base64 public key
    pub public_key: Option<String>,
    /// base64 signature
    pub signed_message: Option<String>,
}

impl From<&StoredIou> for IouView {
    fn from(stored: &StoredIou) -> Self {
        let record = &stored.record;
        Self {
            id: stored.id,
            lender: record.lender().map(str::to_string),
            borrower: record.borrower().map(str::to_string),
            value: record.value(),
            linear_id: record.linear_id().map(|id| id.to_string()),
            public_key: record.public_key().map(|k| BASE64.encode(k.as_bytes())),
            signed_message: record.signed_message().map(|s| BASE64.encode(s.as_bytes())),
        }
    }
}

fn print_detail(view: &IouView) {
    println!("  ID:             {}", view.id);
    println!("  Linear ID:      {}", view.linear_id.as_deref().unwrap_or("-"));
    println!("  Lender:         {}", view.lender.as_deref().unwrap_or("-"));
    println!("  Borrower:       {}", view.borrower.as_deref().unwrap_or("-"));
    println!("  Value:          {}", view.value);
    println!("  Public Key:     {}", view.public_key.as_deref().unwrap_or("-"));
    println!("  Signed Message: {}", view.signed_message.as_deref().unwrap_or("-"));
}

fn print_list(ious: &[StoredIou], output: OutputFormat) -> Result<()> {
    let views: Vec<IouView> = ious.iter().map(IouView::from).collect();

    if output == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&views)?);
        return Ok(());
    }

    if views.is_empty() {
        println!("No obligations found.");
        return Ok(());
    }

    println!(
        "{:<6} {:<38} {:<20} {:<20} {:>10}",
        "ID", "LINEAR ID", "LENDER", "BORROWER", "VALUE"
    );
    println!("{}", "-".repeat(98));

    for view in views {
        println!(
            "{:<6} {:<38} {:<20} {:<20} {:>10}",
            view.id,
            view.linear_id.as_deref().unwrap_or("-"),
            view.lender.as_deref().unwrap_or("-"),
            view.borrower.as_deref().unwrap_or("-"),
            view.value,
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_accepts_positive_value() {
        validate_new_iou("Alice", "Bob", 100).unwrap();
    }

    #[test]
    fn test_validate_rejects_non_positive_value() {
        let err = validate_new_iou("Alice", "Bob", 0).unwrap_err();
        assert!(err.to_string().contains("value must be positive"));
        assert!(validate_new_iou("Alice", "Bob", -5).is_err());
    }

    #[test]
    fn test_validate_rejects_empty_parties() {
        let err = validate_new_iou("  ", "Bob", 10).unwrap_err();
        assert!(err.to_string().contains("lender"));
        let err = validate_new_iou("Alice", "", 10).unwrap_err();
        assert!(err.to_string().contains("borrower"));
    }

    #[test]
    fn test_decode_base64() {
        assert_eq!(decode_base64("public-key", None).unwrap(), None);
        assert_eq!(
            decode_base64("public-key", Some("AQI=")).unwrap(),
            Some(vec![0x01, 0x02])
        );
        assert!(decode_base64("public-key", Some("not base64!")).is_err());
    }

    #[test]
    fn test_view_encodes_key_material() {
        let stored = StoredIou {
            id: 3,
            record: IouRecord::new(
                "Alice",
                "Bob",
                100,
                LinearId::new_random(),
                Some(PublicKey::from_bytes(vec![0x01, 0x02])),
                Some(SignedMessage::from_bytes(vec![0xaa, 0xbb])),
            ),
        };
        let view = IouView::from(&stored);
        assert_eq!(view.id, 3);
        assert_eq!(view.public_key.as_deref(), Some("AQI="));
        assert_eq!(view.signed_message.as_deref(), Some("qrs="));
    }
}
