use anyhow::{bail, Context, Result};
use billsheet_export::{export_report, type_stats};
use billsheet_ingest::{load_statement, ParseOutcome, StatementParser};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

mod config;
mod server;
mod state;

const LONG_VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("BILLSHEET_BUILD_SHA"), ")");

#[derive(Parser, Debug)]
#[command(
    name = "billsheet",
    version,
    long_version = LONG_VERSION,
    about = "Credit-card statement parser and spreadsheet exporter"
)]
struct Cli {
    /// Config file (default: ~/.billsheet/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse a statement (.pdf, or a JSON extraction dump) and print the report as JSON
    Parse {
        input: PathBuf,

        #[arg(long)]
        pretty: bool,
    },

    /// Parse a statement and write the transactions and bill-info CSV sheets
    Export {
        input: PathBuf,

        /// Output directory (default: next to the input)
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },

    /// Print bill info, totals and per-type counts for a statement
    Stats { input: PathBuf },

    /// Run the HTTP upload server
    Serve {
        #[arg(long)]
        host: Option<String>,

        #[arg(long)]
        port: Option<u16>,
    },

    /// Write a default config file
    InitConfig,
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "billsheet=info,billsheet_ingest=info,tower_http=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let config_override = cli.config.as_deref();

    match cli.command {
        Command::InitConfig => {
            config::init_config(config_override)?;
        }

        Command::Parse { input, pretty } => {
            let parser = config::load_config(config_override)?.parser()?;
            let outcome = parse_file(&parser, &input)?;
            let json = if pretty {
                serde_json::to_string_pretty(&outcome.report)?
            } else {
                serde_json::to_string(&outcome.report)?
            };
            println!("{}", json);
        }

        Command::Export { input, out_dir } => {
            let parser = config::load_config(config_override)?.parser()?;
            let outcome = parse_file(&parser, &input)?;
            if outcome.report.is_empty() {
                bail!("no transactions found in {}", input.display());
            }

            let out_dir = out_dir.unwrap_or_else(|| input_dir(&input));
            let stem = input
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("statement");
            let paths = export_report(&outcome.report, &out_dir, stem)?;

            println!(
                "Exported {} transactions to {}",
                outcome.report.transactions.len(),
                paths.transactions.display()
            );
            if let Some(p) = paths.bill_info {
                println!("Bill info: {}", p.display());
            }
        }

        Command::Stats { input } => {
            let parser = config::load_config(config_override)?.parser()?;
            let outcome = parse_file(&parser, &input)?;
            print_stats(&input, &outcome);
        }

        Command::Serve { host, port } => {
            let cfg = config::load_config(config_override)?;
            let parser = cfg.parser()?;
            let mut server = cfg.server;
            if let Some(h) = host {
                server.host = h;
            }
            if let Some(p) = port {
                server.port = p;
            }
            info!(format = %parser.format().name, "starting bill parser service");
            server::serve(&server, parser).await?;
        }
    }

    Ok(())
}

fn input_dir(input: &Path) -> PathBuf {
    match input.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn parse_file(parser: &StatementParser, input: &Path) -> Result<ParseOutcome> {
    if !input.exists() {
        bail!("statement not found: {}", input.display());
    }
    let statement = load_statement(input).with_context(|| format!("reading {}", input.display()))?;
    let outcome = parser.parse(&statement);

    for r in &outcome.stats.rejections {
        warn!(source = ?r.source, reason = %r.reason, "skipped: {}", r.raw);
    }
    Ok(outcome)
}

fn print_stats(input: &Path, outcome: &ParseOutcome) {
    let report = &outcome.report;
    let stats = type_stats(&report.transactions);

    println!("Parsed {} transactions from {}", report.transactions.len(), input.display());
    println!(
        "  tables: {} ({} with header) | table rows: {} | text lines: {} (+{} recovered)\n",
        outcome.stats.tables_seen,
        outcome.stats.header_tables,
        outcome.stats.table_records,
        outcome.stats.text_matches,
        outcome.stats.text_added
    );

    for (field, value) in report.bill_info.iter() {
        println!("{}: {}", field.label(), value);
    }
    if !report.bill_info.is_empty() {
        println!();
    }

    for (kind, count) in &stats.by_type {
        println!("[{}] {}", kind.label(), count);
    }
    for (flow, count) in &stats.by_flow {
        println!("[{}] {}", flow.label(), count);
    }

    let s = &report.summary;
    println!(
        "\n总支出 {:.2} | 总收入 {:.2} | 还款 {:.2} | 净额 {:.2}",
        s.total_expense, s.total_income, s.total_repayment, s.net_amount
    );
}
