//! # Balcão Console
//!
//! Operator command line for the order builder.
//!
//! ## Module Organization
//! ```text
//! balcao_console/
//! ├── lib.rs          ◄─── You are here (argument parsing & dispatch)
//! ├── commands/
//! │   ├── mod.rs      ◄─── Command exports
//! │   ├── reference.rs◄─── Catalog, checklist, warranty terms
//! │   ├── payment.rs  ◄─── Methods, fee simulation, installments
//! │   └── order.rs    ◄─── Draft totals and submission
//! └── error.rs        ◄─── Error type for commands
//! ```
//!
//! ## Commands
//! ```text
//! balcao catalog <query>
//! balcao methods [--all]
//! balcao method <id>
//! balcao simulate --method 1 --amount 150,00 [--installments 3] [--remote]
//! balcao installments --amount 150,00 --count 3 --first-due 2024-02-10
//! balcao checklist
//! balcao warranty
//! balcao order totals <draft.json>
//! balcao order submit <draft.json> [--finalize]
//! ```
//!
//! Results go to stdout as JSON; logs go to stderr.

pub mod commands;
pub mod error;

use balcao_api::{ApiConfig, HttpBackend, ReferenceCache};
use balcao_core::Destination;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use commands::order::DraftFile;
use commands::{order, payment, reference};
use error::ConsoleError;

#[derive(Debug, Parser)]
#[command(name = "balcao", version, about = "Balcão order builder console")]
pub struct Cli {
    /// Path to balcao.toml (defaults to the platform config directory)
    #[arg(long, global = true, env = "BALCAO_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Search products and services
    Catalog { query: String },

    /// List payment methods
    Methods {
        /// Include inactive methods
        #[arg(long)]
        all: bool,
    },

    /// Show one payment method
    Method { id: i64 },

    /// Fee breakdown for an amount
    Simulate {
        #[arg(long)]
        method: i64,
        #[arg(long)]
        amount: String,
        #[arg(long, default_value_t = 1)]
        installments: u32,
        /// Ask the backend instead of calculating locally
        #[arg(long)]
        remote: bool,
    },

    /// Monthly installment plan
    Installments {
        #[arg(long)]
        amount: String,
        #[arg(long)]
        count: u32,
        #[arg(long)]
        first_due: NaiveDate,
    },

    /// Service-order intake checklist
    Checklist,

    /// Warranty terms
    Warranty,

    #[command(subcommand)]
    Order(OrderCommand),
}

#[derive(Debug, Subcommand)]
pub enum OrderCommand {
    /// Compute totals of a draft without saving it
    Totals { draft: PathBuf },

    /// Save a draft on the backend
    Submit {
        draft: PathBuf,
        /// Record the payment and apply the finalize step
        #[arg(long)]
        finalize: bool,
    },
}

/// Parses the command line and runs one command.
pub async fn run() -> ExitCode {
    init_tracing();

    let cli = Cli::parse();
    match execute(cli).await {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!(code = ?err.code, "Command failed");
            eprintln!("{}", err);
            ExitCode::FAILURE
        }
    }
}

/// Initializes the tracing subscriber on stderr.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=balcao_api=trace` - Trace the backend client only
/// - Default: INFO, DEBUG for balcao crates
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,balcao=debug,reqwest=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn execute(cli: Cli) -> Result<String, ConsoleError> {
    // Local-only commands never load the config
    match &cli.command {
        Command::Installments {
            amount,
            count,
            first_due,
        } => return render(&payment::installment_plan(amount, *count, *first_due)?),
        Command::Order(OrderCommand::Totals { draft }) => {
            return render(&order::totals(&DraftFile::read(draft)?)?)
        }
        _ => {}
    }

    let cache = connect(cli.config)?;
    match cli.command {
        Command::Catalog { query } => render(&reference::search_catalog(&cache, &query).await?),
        Command::Methods { all } => render(&payment::list_methods(&cache, all).await?),
        Command::Method { id } => render(&payment::show_method(&cache, id).await?),
        Command::Simulate {
            method,
            amount,
            installments,
            remote,
        } => render(&payment::simulate(&cache, method, &amount, installments, remote).await?),
        Command::Checklist => render(&reference::checklist(&cache).await?),
        Command::Warranty => render(&reference::warranty_terms(&cache).await?),
        Command::Order(OrderCommand::Submit { draft, finalize }) => {
            let destination = if finalize {
                Destination::Finalize
            } else {
                Destination::Save
            };
            let draft = DraftFile::read(&draft)?;
            render(&order::submit(cache, &draft, destination).await?)
        }
        Command::Installments { .. } | Command::Order(OrderCommand::Totals { .. }) => {
            Err(ConsoleError::internal("local command reached the backend path"))
        }
    }
}

fn connect(config_path: Option<PathBuf>) -> Result<Arc<ReferenceCache<HttpBackend>>, ConsoleError> {
    let config = ApiConfig::load(config_path)?;
    info!(base_url = %config.base_url, "Connecting to ERP backend");

    let backend = HttpBackend::new(config)?;
    Ok(Arc::new(ReferenceCache::new(Arc::new(backend))))
}

fn render<T: Serialize>(value: &T) -> Result<String, ConsoleError> {
    serde_json::to_string_pretty(value).map_err(|e| ConsoleError::internal(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_simulate() {
        let cli = Cli::try_parse_from([
            "balcao",
            "simulate",
            "--method",
            "1",
            "--amount",
            "150,00",
            "--installments",
            "3",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Command::Simulate {
                method: 1,
                installments: 3,
                remote: false,
                ..
            }
        ));
    }

    #[test]
    fn test_parse_order_submit() {
        let cli = Cli::try_parse_from(["balcao", "order", "submit", "draft.json", "--finalize"])
            .unwrap();
        assert!(matches!(
            cli.command,
            Command::Order(OrderCommand::Submit { finalize: true, .. })
        ));
    }

    #[tokio::test]
    async fn test_installments_run_without_config() {
        let cli = Cli::try_parse_from([
            "balcao",
            "installments",
            "--amount",
            "90",
            "--count",
            "3",
            "--first-due",
            "2024-03-05",
        ])
        .unwrap();
        let output = execute(cli).await.unwrap();
        let plan: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(plan[2]["amount_cents"], 3000);
        assert_eq!(plan[2]["due_date"], "2024-05-05");
    }
}
