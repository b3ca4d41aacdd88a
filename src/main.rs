//! Please - ask the Stellar ledger to do things
//!
//! ```text
//! please send 20 XLM --from master --to jennifer
//! please buy 100 USDC --using XLM
//! please buy 50 XLM --using USDC --spend
//! please sell 100 USDC --for XLM --price 0.25
//! please share master bob carol
//! please set-data --account master name=alfred avatar=@avatar.png
//! ```
//!
//! Every request is resolved against the local wallet store and the asset
//! catalog, summarized, confirmed and submitted to Horizon.

#![deny(unused_imports)]
#![deny(unused_mut)]
#![deny(unused_variables)]
#![warn(unused_must_use)]

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use please::assets::AssetCatalog;
use please::config::Config;
use please::engine::Engine;
use please::errors::RequestError;
use please::ledger::HorizonClient;
use please::selector::{PolicySelector, Selector, TerminalSelector};
use please::types::{
    AmountKind, DataEntry, DataValue, OfferKind, OfferRequest, SendRequest, SetDataRequest,
    ShareAccountRequest, Statement,
};
use please::wallet::WalletStore;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command line arguments
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "please.toml", env = "PLEASE_CONFIG")]
    config: String,

    /// Use the test network
    #[arg(long)]
    testnet: bool,

    /// Submit without asking for confirmation
    #[arg(short, long)]
    yes: bool,

    /// Path to the wallet store
    #[arg(long)]
    wallet: Option<PathBuf>,

    /// Horizon server URL
    #[arg(long)]
    horizon_url: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Send an amount of an asset to an address, wallet or contact
    Send {
        amount: String,
        currency: String,
        /// Source wallet name or address
        #[arg(long)]
        from: Option<String>,
        /// Destination address, wallet or contact
        #[arg(long)]
        to: Option<String>,
    },
    /// Add co-signers to an account; every signer must approve afterwards
    Share {
        account: String,
        #[arg(required = true)]
        signers: Vec<String>,
    },
    /// Set account data entries: KEY=VALUE, KEY=@FILE, or KEY= to delete
    SetData {
        #[arg(long)]
        account: Option<String>,
        #[arg(required = true, value_parser = parse_data_entry)]
        entries: Vec<DataEntry>,
    },
    /// Buy an asset with another one
    Buy {
        amount: String,
        asset: String,
        /// Asset to pay with
        #[arg(long)]
        using: String,
        /// The amount is what to spend, not what to receive
        #[arg(long)]
        spend: bool,
        /// Price in units of the bought asset per unit of the spent asset
        #[arg(long)]
        price: Option<String>,
        #[arg(long)]
        account: Option<String>,
    },
    /// Sell an asset for another one
    Sell {
        amount: String,
        asset: String,
        /// Asset to receive
        #[arg(long = "for")]
        for_asset: String,
        /// Price in units of the received asset per unit sold
        #[arg(long)]
        price: Option<String>,
        #[arg(long)]
        account: Option<String>,
    },
}

fn parse_data_entry(raw: &str) -> Result<DataEntry, String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{}'", raw))?;
    if key.is_empty() {
        return Err(format!("empty key in '{}'", raw));
    }
    let value = match value.strip_prefix('@') {
        Some(path) => DataValue::File(PathBuf::from(path)),
        None => DataValue::Literal(value.to_string()),
    };
    Ok(DataEntry {
        key: key.to_string(),
        value,
    })
}

impl Command {
    fn into_statement(self) -> Statement {
        match self {
            Command::Send {
                amount,
                currency,
                from,
                to,
            } => Statement::Send(SendRequest {
                amount,
                currency,
                from,
                to,
            }),
            Command::Share { account, signers } => Statement::ShareAccount(ShareAccountRequest {
                account,
                additional_signers: signers,
            }),
            Command::SetData { account, entries } => {
                Statement::SetData(SetDataRequest { account, entries })
            }
            Command::Buy {
                amount,
                asset,
                using,
                spend,
                price,
                account,
            } => Statement::Offer(OfferRequest {
                kind: OfferKind::Buy,
                account,
                buying: asset,
                selling: using,
                amount,
                amount_kind: if spend {
                    AmountKind::Selling
                } else {
                    AmountKind::Buying
                },
                price,
            }),
            Command::Sell {
                amount,
                asset,
                for_asset,
                price,
                account,
            } => Statement::Offer(OfferRequest {
                kind: OfferKind::Sell,
                account,
                buying: for_asset,
                selling: asset,
                amount,
                amount_kind: AmountKind::Selling,
                price,
            }),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging
    init_logging(args.verbose)?;
    debug!("Version: {}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let mut config = load_config(&args.config)?;
    if args.testnet {
        config.ledger.testnet = true;
    }
    if args.yes {
        config.confirm.auto_confirm = true;
    }
    if let Some(path) = &args.wallet {
        config.wallet.path = path.display().to_string();
    }
    if let Some(url) = &args.horizon_url {
        config.ledger.horizon_url = Some(url.clone());
    }
    config.validate().context("Invalid configuration")?;
    info!("🌐 Network: {} via {}", config.network().label(), config.horizon_url());

    let wallets = WalletStore::from_file(&config.wallet_path()).context("Failed to load wallet")?;
    info!("🔑 Loaded {} wallets", wallets.wallets().len());

    let mut catalog = AssetCatalog::embedded()?;
    if let Some(path) = &config.assets.catalog_path {
        catalog.extend_from_file(Path::new(path))?;
    }

    let ledger = HorizonClient::new(&config.horizon_url(), config.timeout())
        .context("Failed to create Horizon client")?;

    let selector: Box<dyn Selector> = if std::io::stdin().is_terminal() {
        Box::new(TerminalSelector)
    } else {
        warn!("No terminal attached, choices must be unambiguous");
        Box::new(PolicySelector::new(config.confirm.auto_confirm))
    };

    let engine = Engine::new(
        Arc::new(ledger),
        &wallets,
        &catalog,
        selector.as_ref(),
        config.engine_config(),
    );

    match engine.execute(&args.command.into_statement()).await {
        Ok(result) => {
            println!("{}", result.hash);
            Ok(())
        }
        Err(RequestError::UserDeclined) => {
            println!("Aborted");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

/// Initialize logging subsystem
fn init_logging(verbose: bool) -> Result<()> {
    let env_filter = if verbose {
        "please=debug,info"
    } else {
        "please=warn,error"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr),
        )
        .init();

    Ok(())
}

/// Load configuration from file with fallback to defaults
fn load_config(path: &str) -> Result<Config> {
    if Path::new(path).exists() {
        Config::from_file_with_env(path)
            .with_context(|| format!("Failed to load config from {}", path))
    } else {
        warn!("Config file '{}' not found, using defaults", path);
        dotenvy::dotenv().ok();
        let mut config = Config::default();
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }
}
