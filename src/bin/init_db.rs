//! CLI tool to create the statx database.
//!
//! Usage:
//!   cargo run --bin statx-init-db
//!   cargo run --bin statx-init-db -- --force

use std::io::{self, BufRead, Write};
use std::path::Path;

use clap::Parser;

use statx_lib::config::Config;
use statx_lib::db::DbPool;

#[derive(Parser)]
#[command(name = "statx-init-db", version, about = "Create the test results database")]
struct Args {
    /// Remove an existing database file without asking
    #[arg(long)]
    force: bool,

    /// Database URL (overrides STATX_DATABASE_URL)
    #[arg(long)]
    database_url: Option<String>,
}

fn confirm(question: &str) -> io::Result<bool> {
    print!("{} (y/n) >>: ", question);
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(answer.trim().eq_ignore_ascii_case("y"))
}

/// Remove the database file and its WAL sidecars.
fn remove_database(path: &Path) -> io::Result<()> {
    std::fs::remove_file(path)?;
    for suffix in ["-wal", "-shm"] {
        let mut sidecar = path.as_os_str().to_owned();
        sidecar.push(suffix);
        match std::fs::remove_file(&sidecar) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e),
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let mut config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            std::process::exit(1);
        }
    };
    if let Some(url) = args.database_url {
        config.database.url = url;
    }

    if let Some(path) = config.database.file_path()
        && path.exists()
    {
        let remove = args.force
            || confirm("> Old db file exists, remove?").unwrap_or_else(|e| {
                eprintln!("Error reading answer: {}", e);
                false
            });

        if !remove {
            println!("Abort!");
            return;
        }

        if let Err(e) = remove_database(&path) {
            eprintln!("Error removing {}: {}", path.display(), e);
            std::process::exit(1);
        }
        println!("> Removed {}", path.display());
    }

    println!("> Tables initialization...");
    let pool = match DbPool::new(&config).await {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error connecting to database: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = pool.run_migrations().await {
        eprintln!("Error creating tables: {}", e);
        std::process::exit(1);
    }

    if let Err(e) = pool.close().await {
        eprintln!("Warning: failed to close database: {}", e);
    }
    println!("> Done...");
}
