use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use sqlvec::{ColumnTyping, Location, OpenOptions, TransactionMode, Value};
use tracing::{Level, info};

#[derive(Parser, Debug)]
#[command(author, version, about = "Run SQL against a SQLite database with sqlite-vec loaded")]
struct Args {
    /// Database path or `file:` URI.
    #[arg(required_unless_present = "memory", conflicts_with = "memory")]
    database: Option<PathBuf>,
    /// Use a private in-memory database.
    #[arg(long)]
    memory: bool,
    /// Open the database read-only.
    #[arg(long)]
    readonly: bool,
    /// Milliseconds to wait on a locked database.
    #[arg(long)]
    busy_timeout_ms: Option<u64>,
    /// Re-read column types on every row instead of pinning them from the first.
    #[arg(long)]
    every_row: bool,
    /// Run all statements inside one transaction with this mode.
    #[arg(long, value_enum)]
    transaction: Option<TransactionMode>,
    /// JSON array of positional parameters for each statement.
    #[arg(long, default_value = "[]")]
    params: String,
    /// Log verbosity.
    #[arg(long, default_value_t = Level::WARN)]
    log_level: Level,
    /// Statements to run, in order.
    #[arg(required = true)]
    sql: Vec<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_max_level(args.log_level)
        .init();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("sqlvec: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let params: Vec<Value> = serde_json::from_str(&args.params)?;
    let location = match &args.database {
        Some(path) if !args.memory => Location::path(path),
        _ => Location::InMemory,
    };

    let mut builder = OpenOptions::builder(location)
        .readonly(args.readonly)
        .column_typing(if args.every_row {
            ColumnTyping::EveryRow
        } else {
            ColumnTyping::FirstRow
        });
    if let Some(ms) = args.busy_timeout_ms {
        builder = builder.busy_timeout(Duration::from_millis(ms));
    }

    sqlvec::initialize()?;
    let conn = builder.open().await?;
    info!(version = ?conn.version().await?, "connected");

    let outputs = match args.transaction {
        Some(mode) => {
            let statements = args.sql.clone();
            conn.transaction(mode, move |tx| {
                statements
                    .iter()
                    .map(|sql| tx.query(sql, &params))
                    .collect::<sqlvec::Result<Vec<_>>>()
            })
            .await?
        }
        None => {
            let mut outputs = Vec::with_capacity(args.sql.len());
            for sql in &args.sql {
                outputs.push(conn.query(sql, &params).await?);
            }
            outputs
        }
    };

    for (sql, rows) in args.sql.iter().zip(outputs) {
        info!(sql = sql.as_str(), rows = rows.len(), "statement finished");
        for row in rows {
            println!("{}", serde_json::to_string(&row)?);
        }
    }
    info!(
        modified = conn.modified_row_count().await?,
        last_insert_rowid = conn.last_inserted_id().await?,
        "done"
    );
    conn.close().await?;
    Ok(())
}
