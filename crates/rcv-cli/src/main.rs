use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "rcv")]
#[command(about = "Purchase-order receiving reconciler", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Move received quantities to notes on every configured tab
    Reconcile {
        /// Layered config paths in merge order (defaults apply when omitted)
        #[arg(long = "config")]
        config_paths: Vec<String>,

        /// Directory holding one <tab>.csv per tab (falls back to RCV_WORKBOOK_DIR)
        #[arg(long)]
        workbook: Option<String>,

        /// JSON file with the observed status and line items per order
        #[arg(long)]
        observations: String,

        /// Write the JSON run report here
        #[arg(long)]
        report: Option<String>,

        /// Fail on config keys nothing reads
        #[arg(long, default_value_t = false)]
        strict_config: bool,

        /// Reconcile in memory without saving any tab
        #[arg(long, default_value_t = false)]
        dry_run: bool,
    },

    /// Compute layered config hash + print canonical JSON
    ConfigHash {
        /// Paths in merge order (base -> site overrides...)
        #[arg(required = true)]
        paths: Vec<String>,
    },

    /// Validate config and list unused keys
    CheckConfig {
        /// Layered config paths in merge order
        #[arg(long = "config")]
        config_paths: Vec<String>,

        /// Exit non-zero when unused keys exist
        #[arg(long, default_value_t = false)]
        strict: bool,
    },
}

fn main() -> Result<()> {
    // Dev convenience; a missing file is fine.
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::dotenv();
    init_tracing();

    let cli = Cli::parse();

    match cli.cmd {
        Commands::Reconcile {
            config_paths,
            workbook,
            observations,
            report,
            strict_config,
            dry_run,
        } => {
            commands::reconcile::run(commands::reconcile::ReconcileArgs {
                config_paths,
                workbook,
                observations,
                report,
                strict_config,
                dry_run,
            })?;
        }

        Commands::ConfigHash { paths } => {
            let loaded = commands::load_config(&paths)?;
            println!("config_hash={}", loaded.config_hash);
            println!("{}", loaded.canonical_json);
        }

        Commands::CheckConfig {
            config_paths,
            strict,
        } => {
            commands::check_config(&config_paths, strict)?;
        }
    }

    Ok(())
}

/// Logs go to stderr so stdout stays a clean `key=value` stream.
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();
}
