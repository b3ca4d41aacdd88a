//! Configuration module
//!
//! This module handles configuration loading from TOML files, `.env` files
//! and `PLEASE_*` environment variables, and provides structured
//! configuration types.

use crate::engine::EngineConfig;
use crate::types::Network;
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Ledger network access
    #[serde(default)]
    pub ledger: LedgerConfig,

    /// Wallet store location
    #[serde(default)]
    pub wallet: WalletConfig,

    /// Extra asset catalog
    #[serde(default)]
    pub assets: AssetsConfig,

    /// Confirmation behaviour
    #[serde(default)]
    pub confirm: ConfirmConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Use the test network instead of the public one
    #[serde(default)]
    pub testnet: bool,

    /// Horizon endpoint; defaults to the selected network's public instance
    #[serde(default)]
    pub horizon_url: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Fee per operation, in stroops
    #[serde(default = "default_base_fee")]
    pub base_fee: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletConfig {
    /// Path to the wallet store JSON file
    #[serde(default = "default_wallet_path")]
    pub path: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssetsConfig {
    /// TOML catalog merged into the built-in one
    #[serde(default)]
    pub catalog_path: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfirmConfig {
    /// Submit without asking
    #[serde(default)]
    pub auto_confirm: bool,
}

fn default_timeout() -> u64 { 30 }
fn default_base_fee() -> u32 { 100 }
fn default_wallet_path() -> String { "wallet.json".to_string() }

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            testnet: false,
            horizon_url: None,
            timeout_secs: default_timeout(),
            base_fee: default_base_fee(),
        }
    }
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            path: default_wallet_path(),
        }
    }
}

fn parse_bool(key: &str, value: &str) -> anyhow::Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => bail!("{} must be a boolean, got '{}'", key, other),
    }
}

impl Config {
    /// Load configuration from TOML file
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path))?;
        Ok(config)
    }

    /// Load configuration with `.env` and environment variable overrides
    pub fn from_file_with_env(path: &str) -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let mut config = Self::from_file(path)?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply `PLEASE_*` overrides from `lookup`
    pub fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> anyhow::Result<()> {
        if let Some(v) = lookup("PLEASE_TESTNET") {
            self.ledger.testnet = parse_bool("PLEASE_TESTNET", &v)?;
        }
        if let Some(v) = lookup("PLEASE_HORIZON_URL") {
            self.ledger.horizon_url = Some(v);
        }
        if let Some(v) = lookup("PLEASE_TIMEOUT_SECS") {
            self.ledger.timeout_secs = v
                .trim()
                .parse()
                .with_context(|| format!("PLEASE_TIMEOUT_SECS must be an integer, got '{}'", v))?;
        }
        if let Some(v) = lookup("PLEASE_BASE_FEE") {
            self.ledger.base_fee = v
                .trim()
                .parse()
                .with_context(|| format!("PLEASE_BASE_FEE must be an integer, got '{}'", v))?;
        }
        if let Some(v) = lookup("PLEASE_WALLET") {
            self.wallet.path = v;
        }
        if let Some(v) = lookup("PLEASE_ASSETS") {
            self.assets.catalog_path = Some(v);
        }
        if let Some(v) = lookup("PLEASE_YES") {
            self.confirm.auto_confirm = parse_bool("PLEASE_YES", &v)?;
        }
        Ok(())
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.ledger.base_fee == 0 {
            bail!("ledger.base_fee must be positive");
        }
        if self.ledger.timeout_secs == 0 {
            bail!("ledger.timeout_secs must be positive");
        }
        if let Some(url) = &self.ledger.horizon_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                bail!("ledger.horizon_url must be an http(s) URL, got '{}'", url);
            }
        }
        if self.wallet.path.trim().is_empty() {
            bail!("wallet.path must not be empty");
        }
        Ok(())
    }

    pub fn network(&self) -> Network {
        Network::from_testnet_flag(self.ledger.testnet)
    }

    pub fn horizon_url(&self) -> String {
        self.ledger
            .horizon_url
            .clone()
            .unwrap_or_else(|| self.network().default_horizon_url().to_string())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.ledger.timeout_secs)
    }

    pub fn wallet_path(&self) -> PathBuf {
        PathBuf::from(&self.wallet.path)
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            network: self.network(),
            skip_confirmation: self.confirm.auto_confirm,
            base_fee: self.ledger.base_fee,
        }
    }
}
