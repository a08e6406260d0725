use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use bookkeep_ingest::{BatchProcessor, DocumentKind};
use bookkeep_report::ReceiptQuery;

mod config;
mod doc_ai;
mod responses;
mod server;

use responses::CategorizeRequest;

#[derive(Parser, Debug)]
#[command(name = "bookkeep", version, about = "Bookkeeping statement loader and reports")]
struct Cli {
    /// Config file (default: ./bookkeep.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print loaded bank statements with monthly and balance aggregates
    Statements,

    /// Print receipts grouped by merchant
    Receipts {
        /// Case-insensitive substring of the merchant name
        #[arg(long, default_value = "")]
        merchant: String,
        #[arg(long, default_value = "")]
        start_date: String,
        #[arg(long, default_value = "")]
        end_date: String,
        #[arg(long, default_value = "")]
        min_total: String,
        #[arg(long, default_value = "")]
        max_total: String,
    },

    /// Print invoices with per-vendor totals
    Invoices,

    /// Counts and samples for sanity checks
    Debug {
        #[command(subcommand)]
        command: DebugCommand,
    },

    /// Categorize transactions from a JSON file
    Categorize {
        /// A list of transactions, or `{"transactions": [...], "categories": [...]}`
        #[arg(long)]
        input: PathBuf,
    },

    /// Send scanned documents to document-AI and write structured JSON
    Batch {
        /// Only this kind (default: all)
        #[arg(long, value_enum)]
        kind: Option<KindArg>,
    },

    /// Run the HTTP server
    Serve {
        /// Address to bind (overrides [server].bind)
        #[arg(long)]
        bind: Option<String>,
    },

    /// Config file commands
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum DebugCommand {
    Statements,
    Receipts,
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write the default config file
    Init,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum KindArg {
    BankStatements,
    Receipts,
    Invoices,
}

impl From<KindArg> for DocumentKind {
    fn from(k: KindArg) -> Self {
        match k {
            KindArg::BankStatements => DocumentKind::BankStatement,
            KindArg::Receipts => DocumentKind::Receipt,
            KindArg::Invoices => DocumentKind::Invoice,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // stdout carries JSON; logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config_arg = cli.config.as_deref();

    if let Command::Config { command: ConfigCommand::Init } = &cli.command {
        return config::init_config(config_arg);
    }

    let cfg = config::load_config(config_arg)?;
    let layout = cfg.layout();

    match cli.command {
        Command::Statements => print_json(&responses::bank_statements(&layout))?,

        Command::Receipts {
            merchant,
            start_date,
            end_date,
            min_total,
            max_total,
        } => {
            let query = ReceiptQuery {
                merchant,
                start_date,
                end_date,
                min_total,
                max_total,
            };
            print_json(&responses::receipts(&layout, &query))?;
        }

        Command::Invoices => print_json(&responses::invoices(&layout))?,

        Command::Debug { command } => match command {
            DebugCommand::Statements => print_json(&responses::debug_statements(&layout))?,
            DebugCommand::Receipts => print_json(&responses::debug_receipts(&layout))?,
        },

        Command::Categorize { input } => {
            let request = read_categorize_input(&input)?;
            print_json(&responses::categorize_request(&request, &cfg.categorizer.categories))?;
        }

        Command::Batch { kind } => {
            let client = doc_ai::AzureDocumentClient::new(cfg.document_ai.clone())?;
            let processor = BatchProcessor::new(&client, &cfg.paths.input_dir, layout);
            let kinds: Vec<DocumentKind> = match kind {
                Some(k) => vec![k.into()],
                None => DocumentKind::ALL.to_vec(),
            };

            let mut failed = 0;
            for kind in kinds {
                let summary = processor
                    .process(kind)
                    .with_context(|| format!("batch {}", kind.dir_name()))?;
                println!(
                    "{}: {} processed, {} failed",
                    kind.dir_name(),
                    summary.processed.len(),
                    summary.failed.len()
                );
                failed += summary.failed.len();
            }
            if failed > 0 {
                bail!("{} file(s) failed; see batch_summary_*.json", failed);
            }
        }

        Command::Serve { bind } => {
            let bind = bind.unwrap_or_else(|| cfg.server.bind.clone());
            let state = server::AppState {
                layout,
                categories: cfg.categorizer.categories.clone(),
            };
            server::serve(&bind, state).await?;
        }

        // handled before the config is loaded
        Command::Config { .. } => {}
    }

    Ok(())
}

fn print_json(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value).context("serialize output")?);
    Ok(())
}

fn read_categorize_input(path: &Path) -> Result<CategorizeRequest> {
    let s = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let value: Value =
        serde_json::from_str(&s).with_context(|| format!("parse {}", path.display()))?;
    let request = match value {
        Value::Array(_) => CategorizeRequest {
            transactions: serde_json::from_value(value).context("transactions list")?,
            ..Default::default()
        },
        other => serde_json::from_value(other).context("categorize request")?,
    };
    Ok(request)
}
