use clap::{Parser, Subcommand};
use db_infra::TableInitConfig;
use table_init::error::CliError;
use table_init::event_input::{read_event, STDIN_SOURCE};
use table_init::{telemetry, wiring};

#[derive(Parser)]
#[command(name = "table-init")]
#[command(about = "Bootstrap the binlog capture database")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Handle one lifecycle event and print the response
    Handle {
        /// Path to the event JSON, or `-` for stdin
        #[arg(short, long, default_value = STDIN_SOURCE)]
        event: String,
    },
    /// Acquire a pool and report how many attempts it took
    Probe {
        /// Connect to this database instead of the configured one
        #[arg(short, long)]
        database: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    telemetry::init_tracing();

    let args = Args::parse();

    let config = match TableInitConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(2);
        }
    };

    if let Err(e) = run(args.command, config).await {
        eprintln!("table-init failed: {e}");
        std::process::exit(1);
    }
}

async fn run(command: Command, config: TableInitConfig) -> Result<(), CliError> {
    let sdk = wiring::load_sdk_config(config.region.as_deref()).await;

    match command {
        Command::Handle { event } => {
            let raw = read_event(&event)?;
            let response = wiring::workflow(&config, &sdk).handle(raw).await;
            println!("{}", serde_json::to_string_pretty(&response)?);

            if response.is_success() {
                Ok(())
            } else {
                Err(CliError::LifecycleFailed {
                    reason: response.reason.unwrap_or_default(),
                })
            }
        }
        Command::Probe { database } => {
            let database = database.or_else(|| config.database_override.clone());
            let handle = wiring::pool_manager(&config, &sdk)
                .acquire(database.as_deref())
                .await?;
            println!(
                "connected to {} after {} attempt(s)",
                handle.database(),
                handle.attempts()
            );
            Ok(())
        }
    }
}
