use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use rare_router_cli::commands::{self, AppContext, GlobalOptions};
use rare_router_lib::{AnalyzeRequest, PpSystemType, ScanRequest};

#[derive(Parser, Debug)]
#[command(author, version, about = "Rare goods route planning for Elite Dangerous")]
struct Cli {
    #[command(flatten)]
    global: GlobalOptions,

    /// Increase log verbosity (-v info, -vv debug).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Evaluate every rare good from the current system.
    Scan {
        /// Current system name.
        current: String,
        /// PowerPlay type of the system where goods will be sold.
        #[arg(long, default_value_t = PpSystemType::None)]
        system_type: PpSystemType,
        /// The commander's power has the finance ethos.
        #[arg(long)]
        finance_ethos: bool,
    },
    /// Evaluate every rare good carried to a target system.
    Analyze {
        /// Current system name.
        current: String,
        /// Target (selling) system name.
        target: String,
        /// PowerPlay type of the target system.
        #[arg(long, default_value_t = PpSystemType::None)]
        system_type: PpSystemType,
        /// The commander's power has the finance ethos.
        #[arg(long)]
        finance_ethos: bool,
    },
    /// Resolve a system by exact name.
    Lookup {
        /// System name.
        name: String,
    },
    /// Search systems by name prefix.
    Search {
        /// Name prefix (at least two characters).
        query: String,
        /// Maximum number of results.
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// List the rare goods catalog.
    Rares {
        /// Fuzzy filter on rare good names.
        #[arg(long)]
        query: Option<String>,
    },
    /// Show system cache status.
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let ctx = AppContext::open(&cli.global).await?;
    let result = run(&ctx, cli.command).await;
    ctx.close().await;
    result
}

async fn run(ctx: &AppContext, command: Command) -> Result<()> {
    match command {
        Command::Scan {
            current,
            system_type,
            finance_ethos,
        } => {
            let request = ScanRequest {
                current,
                system_type,
                has_finance_ethos: finance_ethos,
            };
            commands::plan::handle_scan(ctx, &request).await
        }
        Command::Analyze {
            current,
            target,
            system_type,
            finance_ethos,
        } => {
            let request = AnalyzeRequest {
                current,
                target,
                system_type,
                has_finance_ethos: finance_ethos,
            };
            commands::plan::handle_analyze(ctx, &request).await
        }
        Command::Lookup { name } => commands::systems::handle_lookup(ctx, &name).await,
        Command::Search { query, limit } => {
            commands::systems::handle_search(ctx, &query, limit).await
        }
        Command::Rares { query } => commands::rares::handle_rares(ctx, query.as_deref()),
        Command::Status => commands::status::handle_status(ctx),
    }
}

fn init_tracing(verbose: u8) {
    let env_filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        _ => EnvFilter::new("debug"),
    };
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}
