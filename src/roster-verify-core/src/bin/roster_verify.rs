//! roster-verify CLI - fetch user records, verify their signatures, export CSV.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::Utc;
use clap::{Parser, Subcommand};
use roster_verify_core::{
    fetch_and_verify, write_export, Batch, DirectoryConfig, PayloadShape, Provenance,
    VerificationOutcome, VerificationReport, VerifyError, DEFAULT_BASE_URL,
};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// roster-verify - signature verification and export for user directory records.
///
/// Each record carries an email hash, a signature over it and the signer's
/// public key. Records are classified as Valid, Invalid (proof failed) or
/// Unknown (no usable proof), and exported with a derived SignatureValid column.
#[derive(Parser)]
#[command(name = "roster-verify")]
#[command(version = VERSION)]
#[command(about = "Verify user record signatures and export them as CSV")]
#[command(long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format (text, json)
    #[arg(short, long, default_value = "text", global = true)]
    format: String,

    /// Directory service endpoint root
    #[arg(long, env = "ROSTER_VERIFY_BASE_URL", default_value = DEFAULT_BASE_URL, global = true)]
    base_url: String,

    /// Request timeout in seconds
    #[arg(long, default_value = "30", global = true)]
    timeout: u64,

    /// Skip the binary export channel
    #[arg(long, global = true)]
    no_binary: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch and verify users, then print the results
    Fetch,

    /// Fetch and verify users, then write users_export_<timestamp>.csv
    Export {
        /// Directory to write the CSV into
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
    },

    /// Verify users from a local JSON file ({"users": [...]} or [...])
    Check {
        /// JSON file to read
        file: PathBuf,

        /// Also write a CSV export into this directory
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
}

fn load_file_batch(path: &Path) -> Result<Batch, VerifyError> {
    let body = std::fs::read(path).map_err(|e| VerifyError::MalformedPayload {
        reason: format!("cannot read {}: {}", path.display(), e),
    })?;
    let payload = PayloadShape::decode(&body)?;
    Ok(Batch::new(
        payload.records,
        Provenance::Fallback,
        payload.serialized_len,
        Utc::now(),
    ))
}

fn print_report(report: &VerificationReport, json: bool) {
    let info = report.batch().export_info();
    let counts = report.counts();

    if json {
        let users: Vec<_> = report
            .entries()
            .map(|(r, outcome)| {
                serde_json::json!({
                    "id": r.id,
                    "email": r.email,
                    "role": r.role,
                    "status": r.status,
                    "createdAt": r.created_at,
                    "outcome": outcome,
                })
            })
            .collect();
        let output = serde_json::json!({
            "provenance": report.provenance(),
            "export_info": info,
            "counts": counts,
            "users": users,
        });
        match serde_json::to_string_pretty(&output) {
            Ok(text) => println!("{}", text),
            Err(e) => eprintln!("Failed to render JSON: {}", e),
        }
        return;
    }

    let banner_color = if info.fallback { "\x1b[33m" } else { "\x1b[36m" };
    println!("{}{}\x1b[0m", banner_color, info);
    if info.fallback {
        println!("  Create the /export endpoint to use the binary channel");
    } else {
        println!("  Exported at: {}", info.timestamp.to_rfc3339());
    }
    println!();

    println!("Statistics:");
    println!("  Total Users:          {}", report.records().len());
    println!("  Verified Signatures:  \x1b[32m{}\x1b[0m", counts.valid);
    println!("  Failed Signatures:    \x1b[31m{}\x1b[0m", counts.invalid);
    println!("  Unverifiable:         \x1b[90m{}\x1b[0m", counts.indeterminate);
    println!();

    if report.records().is_empty() {
        println!("No users found");
        return;
    }

    println!(
        "{:<26} {:<32} {:<8} {:<9} {:<21} SIGNATURE",
        "ID", "EMAIL", "ROLE", "STATUS", "CREATED AT"
    );
    for (r, outcome) in report.entries() {
        let color = match outcome {
            VerificationOutcome::Valid => "\x1b[32m",
            VerificationOutcome::Invalid => "\x1b[31m",
            VerificationOutcome::Indeterminate => "\x1b[90m",
        };
        let created = r
            .created_at
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_default();
        println!(
            "{:<26} {:<32} {:<8} {:<9} {:<21} {}{}\x1b[0m",
            r.id,
            r.email,
            r.role.as_str(),
            r.status.as_str(),
            created,
            color,
            outcome.label()
        );
    }
}

async fn run(cli: Cli) -> Result<(), VerifyError> {
    let json = cli.format == "json";
    let config = DirectoryConfig::new(cli.base_url)
        .with_timeout(Duration::from_secs(cli.timeout))
        .with_binary(!cli.no_binary);

    match cli.command {
        Commands::Fetch => {
            let report = fetch_and_verify(&config).await?;
            print_report(&report, json);
        },
        Commands::Export { out_dir } => {
            let report = fetch_and_verify(&config).await?;
            let path = write_export(&out_dir, &report, Utc::now())?;
            if json {
                println!(
                    "{}",
                    serde_json::json!({ "path": path, "rows": report.records().len() })
                );
            } else {
                print_report(&report, false);
                println!();
                println!("Export written: {}", path.display());
            }
        },
        Commands::Check { file, out_dir } => {
            let batch = load_file_batch(&file)?;
            let report = VerificationReport::build(&batch).await;
            print_report(&report, json);
            if let Some(dir) = out_dir {
                let path = write_export(&dir, &report, Utc::now())?;
                if !json {
                    println!();
                    println!("Export written: {}", path.display());
                }
            }
        },
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging (suppress for JSON output)
    let level = if cli.format == "json" {
        tracing::Level::ERROR
    } else if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli).await {
        eprintln!("\x1b[31mError:\x1b[0m {}", e);
        std::process::exit(1);
    }
}
