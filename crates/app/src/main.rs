use std::error::Error;

use api_types::{disbursement, payment, receiver};
use clap::{Args, Parser, Subcommand, ValueEnum};
use engine::{
    EntityKind, RawRecord, WalletAddress,
    access::can_assign_role,
    transitions::is_transition_allowed,
};
use serde::Serialize;
use serde_json::{Value, json};

mod settings;

type AppResult<T> = Result<T, Box<dyn Error + Send + Sync>>;

#[derive(Parser, Debug)]
#[command(name = "disbursal")]
#[command(about = "Normalize, validate and aggregate disbursement records")]
struct Cli {
    /// Settings file (TOML). Defaults to `settings.toml` when present.
    #[arg(long, env = "DISBURSAL_CONFIG")]
    config: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sum one column of a CSV file.
    Aggregate(AggregateArgs),
    /// Turn raw JSON records into domain records.
    Normalize(RecordArgs),
    /// Report errors and warnings of raw JSON records.
    Validate(RecordArgs),
    /// Check whether a role may assign another role.
    CanAssign {
        #[arg(long)]
        acting: String,
        #[arg(long)]
        target: String,
    },
    /// Check a status transition.
    Transition {
        #[arg(long, value_enum)]
        kind: Kind,
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
    },
    /// Validate a Stellar account address.
    CheckAddress { address: String },
}

#[derive(Args, Debug)]
struct AggregateArgs {
    #[arg(long)]
    file: String,
    /// Column to sum; defaults to `engine.amount_column`.
    #[arg(long)]
    column: Option<String>,
    /// Fraction digits above which a value is reported.
    #[arg(long)]
    max_decimals: Option<u32>,
}

#[derive(Args, Debug)]
struct RecordArgs {
    #[arg(long, value_enum)]
    kind: Kind,
    /// JSON file holding one record or an array of records.
    #[arg(long)]
    file: String,
    /// Receiver wallet whose fields are used (receivers only).
    #[arg(long)]
    wallet_id: Option<String>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Kind {
    Disbursement,
    Payment,
    Receiver,
}

impl From<Kind> for EntityKind {
    fn from(kind: Kind) -> Self {
        match kind {
            Kind::Disbursement => EntityKind::Disbursement,
            Kind::Payment => EntityKind::Payment,
            Kind::Receiver => EntityKind::Receiver,
        }
    }
}

fn raw_record(kind: Kind, value: Value, wallet_id: Option<&str>) -> AppResult<RawRecord> {
    let record = match kind {
        Kind::Disbursement => {
            RawRecord::Disbursement(serde_json::from_value::<disbursement::Disbursement>(value)?)
        }
        Kind::Payment => RawRecord::Payment(serde_json::from_value::<payment::Payment>(value)?),
        Kind::Receiver => RawRecord::Receiver {
            receiver: serde_json::from_value::<receiver::Receiver>(value)?,
            wallet_id: wallet_id.map(ToString::to_string),
        },
    };
    Ok(record)
}

/// Reads `args.file`; returns the records and whether the file held an array.
async fn read_records(args: &RecordArgs) -> AppResult<(Vec<RawRecord>, bool)> {
    let text = tokio::fs::read_to_string(&args.file).await?;
    let wallet_id = args.wallet_id.as_deref();
    match serde_json::from_str::<Value>(&text)? {
        Value::Array(values) => {
            let records = values
                .into_iter()
                .map(|value| raw_record(args.kind, value, wallet_id))
                .collect::<AppResult<Vec<_>>>()?;
            Ok((records, true))
        }
        value => Ok((vec![raw_record(args.kind, value, wallet_id)?], false)),
    }
}

fn print<T: Serialize>(value: &T) -> AppResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> AppResult<()> {
    let cli = Cli::parse();
    let settings = settings::Settings::new(cli.config.as_deref())?;

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(format!(
            "disbursal={level},engine={level}",
            level = settings.app.level
        ))
        .init();

    let engine = settings.engine();
    tracing::debug!(?settings, "settings loaded");

    match cli.command {
        Command::Aggregate(args) => {
            let input = tokio::fs::read_to_string(&args.file).await?;
            let column = args.column.as_deref().unwrap_or(engine.amount_column());
            let max_decimals = args.max_decimals.unwrap_or(engine.max_decimal_places());
            let stats = engine::aggregator::aggregate(&input, column, max_decimals);
            tracing::info!(
                valid = stats.valid_row_count,
                invalid = stats.invalid_row_count,
                "aggregated {}",
                args.file
            );
            print(&stats)?;
        }
        Command::Normalize(args) => {
            let (records, is_batch) = read_records(&args).await?;
            if is_batch {
                print(&engine.normalize_batch(&records))?;
            } else {
                for record in &records {
                    print(&engine.normalize(record)?)?;
                }
            }
        }
        Command::Validate(args) => {
            let (records, is_batch) = read_records(&args).await?;
            let summaries: Vec<_> = records
                .iter()
                .map(|record| engine.validate(record).summary())
                .collect();
            if is_batch {
                print(&summaries)?;
            } else {
                for summary in &summaries {
                    print(summary)?;
                }
            }
        }
        Command::CanAssign { acting, target } => {
            print(&can_assign_role(acting.as_str(), target.as_str()))?;
        }
        Command::Transition { kind, from, to } => {
            let allowed = is_transition_allowed(kind.into(), &from, &to);
            print(&json!({ "allowed": allowed }))?;
        }
        Command::CheckAddress { address } => {
            let output = match address.trim().parse::<WalletAddress>() {
                Ok(_) => json!({ "valid": true, "error": null }),
                Err(err) => json!({ "valid": false, "error": err.reason() }),
            };
            print(&output)?;
        }
    }

    Ok(())
}
