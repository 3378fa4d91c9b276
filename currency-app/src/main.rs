//! # Currency Application
//!
//! Binary that wires together all the components:
//! - Load configuration from environment
//! - Open the SQLite cache and preference store
//! - Create the HTTP rate client and the sync controller
//! - Run one command against them

mod config;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use currency_client::CurrencyApiClient;
use currency_repo::{SqliteRepo, build_repo};
use currency_sync::{RateSyncController, SyncConfig, SyncEvent};
use currency_types::domain::display_current_date;
use currency_types::freshness::format_timestamp;
use currency_types::{CurrencyCode, CurrencySelection, PreferenceStore, RequestState};

type Controller = RateSyncController<SqliteRepo, SqliteRepo, CurrencyApiClient>;

#[derive(Parser)]
#[command(name = "currency")]
#[command(author, version, about = "Exchange rates with a daily local cache", long_about = None)]
struct Cli {
    /// Overrides DATABASE_URL
    #[arg(long)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sync if needed, then show freshness and the selected pair
    Status,
    /// Fetch rates now, even if today's are cached
    Refresh,
    /// List every known currency
    List,
    /// List the supported currency codes
    Codes,
    /// Convert an amount from the source to the target currency
    Convert {
        amount: f64,
    },
    /// Set the source currency (e.g. USD)
    Source {
        code: CurrencyCode,
    },
    /// Set the target currency (e.g. EUR)
    Target {
        code: CurrencyCode,
    },
    /// Swap the source and target currencies
    Switch,
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,currency_sync=debug,currency_repo=debug".into());

    let text = (!json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));
    let structured =
        json.then(|| tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(filter)
        .with(text)
        .with(structured)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let mut config = config::Config::from_env()?;
    if let Some(url) = cli.database_url {
        config.database_url = url;
    }

    init_tracing(config.log_json);
    tracing::debug!("Using database: {}", config.database_url);

    // Build repository (creates the file and schema if missing)
    let repo = Arc::new(build_repo(&config.database_url).await?);

    let client = CurrencyApiClient::new(&config.api_url)
        .with_api_key(&config.api_key)
        .with_timeout(config.fetch_timeout);

    let controller = RateSyncController::new(repo.clone(), repo.clone(), Arc::new(client))
        .with_config(SyncConfig {
            fetch_timeout: config.fetch_timeout,
        });

    match cli.command {
        Commands::Status => {
            let _resolver = controller.start().await;
            let selection = settled_selection(&controller).await?;
            let status = controller.rate_status();

            println!("{}", display_current_date());
            println!("{status}");
            match repo.last_updated().await?.and_then(format_timestamp) {
                Some(at) => println!("Last updated: {at}"),
                None => println!("Last updated: never"),
            }
            print_selection(&selection);
            if let Some(rate) = controller.exchange_rate() {
                println!("Rate:   {rate:.6}");
            }
            if status.needs_refresh() {
                println!("Run `currency refresh` to try again.");
            }
        }

        Commands::Refresh => match controller.force_refresh().await {
            Ok(count) => println!("✓ Refreshed {count} rates ({})", controller.rate_status()),
            Err(e) => {
                println!("✗ {e}");
                std::process::exit(1);
            }
        },

        Commands::List => {
            controller.fetch_new_rates().await;
            println!(
                "{}",
                serde_json::to_string_pretty(&controller.all_currencies())?
            );
        }

        Commands::Codes => {
            for code in CurrencyCode::all() {
                println!("{code}  {}", code.display_name());
            }
        }

        Commands::Convert { amount } => {
            let _resolver = controller.start().await;
            let selection = settled_selection(&controller).await?;

            match (selection.resolved(), controller.convert(amount)) {
                (Some((source, target)), Some(converted)) => {
                    println!("{amount:.2} {} = {converted:.2} {}", source.code, target.code);
                }
                _ => {
                    print_selection(&selection);
                    std::process::exit(1);
                }
            }
        }

        Commands::Source { code } => {
            controller
                .send_event(SyncEvent::SaveSourceCurrencyCode(code))
                .await?;
            println!("✓ Source currency set to {code}");
        }

        Commands::Target { code } => {
            controller
                .send_event(SyncEvent::SaveTargetCurrencyCode(code))
                .await?;
            println!("✓ Target currency set to {code}");
        }

        Commands::Switch => {
            let source = *repo.read_source_currency_code().borrow();
            let target = *repo.read_target_currency_code().borrow();

            controller
                .send_event(SyncEvent::SaveSourceCurrencyCode(target))
                .await?;
            controller
                .send_event(SyncEvent::SaveTargetCurrencyCode(source))
                .await?;
            println!("✓ Now converting {target} -> {source}");
        }
    }

    repo.pool().close().await;
    Ok(())
}

/// Waits until neither slot is still waiting for its first lookup.
async fn settled_selection(controller: &Controller) -> Result<CurrencySelection> {
    let mut rx = controller.subscribe_selection();
    let selection = tokio::time::timeout(
        Duration::from_secs(2),
        rx.wait_for(CurrencySelection::is_settled),
    )
    .await
    .map_err(|_| anyhow::anyhow!("Timed out resolving the selected currencies"))??;

    Ok(selection.clone())
}

fn print_selection(selection: &CurrencySelection) {
    for (label, slot) in [("Source", &selection.source), ("Target", &selection.target)] {
        match slot {
            RequestState::Success(currency) => {
                println!("{label}: {} ({}) {}", currency.code, currency.name, currency.rate)
            }
            RequestState::Error(message) => println!("{label}: {message}"),
            RequestState::Idle | RequestState::Loading => println!("{label}: ..."),
        }
    }
}
