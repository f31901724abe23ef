//! CLI tool to import test results from a CSV file.
//!
//! Usage:
//!   cargo run --bin statx-import -- results.csv
//!   cargo run --bin statx-import -- results.csv --no-header --order 1032 --skip-invalid
//!
//! When `--header`/`--no-header` or `--order` are omitted the tool prints the
//! first line of the file and asks for them.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use clap::Parser;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use statx_lib::config::Config;
use statx_lib::db::DbPool;
use statx_lib::services::{
    ColumnMapping, CsvSource, ImportMapper, InvalidRowPolicy, import_records,
};
use statx_lib::validation::Field;

#[derive(Parser)]
#[command(name = "statx-import", version, about = "Import test results from a CSV file")]
struct Args {
    /// File to import
    file: PathBuf,

    /// Column index for each of dev_type, operator, dt, success (e.g. "0123" or "3,0,1,2")
    #[arg(long)]
    order: Option<String>,

    /// The first line is a header and is not imported
    #[arg(long, conflicts_with = "no_header")]
    header: bool,

    /// The first line is data
    #[arg(long)]
    no_header: bool,

    /// Skip rows that fail validation instead of aborting the import
    #[arg(long)]
    skip_invalid: bool,

    /// Database URL (overrides STATX_DATABASE_URL)
    #[arg(long)]
    database_url: Option<String>,
}

/// Ask a question on stdout and read one trimmed line from stdin.
fn prompt(question: &str) -> io::Result<String> {
    print!("{} >>: ", question);
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(answer.trim().to_string())
}

/// Only an empty answer or `y` means the first line is a header.
fn is_header_answer(answer: &str) -> bool {
    matches!(answer.to_lowercase().as_str(), "" | "y")
}

fn abort(message: impl std::fmt::Display) -> ! {
    eprintln!("Abort! {}", message);
    std::process::exit(1);
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);

    let args = Args::parse();

    if !args.file.is_file() {
        abort(format!("File not found: {}", args.file.display()));
    }

    let source = CsvSource::open(&args.file).unwrap_or_else(|e| abort(e));

    let Some(first_row) = source.first_row() else {
        println!("> File is empty, nothing to import");
        return;
    };

    let columns = first_row.join(", ");
    println!("File first line: {}", columns);

    let has_header = if args.header {
        true
    } else if args.no_header {
        false
    } else {
        let answer = prompt("Is header? y/n (default 'y')")
            .unwrap_or_else(|e| abort(format!("Failed to read answer: {}", e)));
        is_header_answer(&answer)
    };

    let order = match args.order {
        Some(order) => order,
        None => {
            println!("> Please enter columns order in file");
            let allowed: Vec<String> = Field::ALL
                .iter()
                .enumerate()
                .map(|(idx, field)| format!("{}) {}", idx, field))
                .collect();
            println!("Allowed: {}", allowed.join(", "));
            println!("In file: {}", columns);
            let answer = prompt("(default '0123')")
                .unwrap_or_else(|e| abort(format!("Failed to read answer: {}", e)));
            if answer.is_empty() {
                "0123".to_string()
            } else {
                answer
            }
        }
    };

    let mapper = ColumnMapping::parse(&order)
        .and_then(|mapping| ImportMapper::new(first_row, mapping))
        .unwrap_or_else(|e| abort(e));

    let mut config = Config::from_env()
        .unwrap_or_else(|e| abort(format!("Error loading config: {}", e)));
    if let Some(url) = args.database_url {
        config.database.url = url;
    }

    let pool = DbPool::new(&config)
        .await
        .unwrap_or_else(|e| abort(format!("Error connecting to database: {}", e)));
    if let Err(e) = pool.run_migrations().await {
        abort(format!("Error preparing database: {}", e));
    }

    let policy = if args.skip_invalid {
        InvalidRowPolicy::SkipInvalid
    } else {
        InvalidRowPolicy::StopOnFirstError
    };

    println!("> Importing...");
    let records = mapper.try_map_rows(source, has_header);
    let outcome = import_records(&pool, records, policy).await;

    if let Err(e) = pool.close().await {
        eprintln!("Warning: failed to close database: {}", e);
    }

    match outcome {
        Ok(summary) => {
            for skipped in &summary.skipped {
                println!("  skipped {}", skipped);
            }
            println!(
                "> Done: {} imported, {} skipped",
                summary.inserted,
                summary.skipped.len()
            );
        }
        Err(e) => abort(format!("{} (nothing was imported)", e)),
    }
}
