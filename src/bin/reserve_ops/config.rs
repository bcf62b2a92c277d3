//! Configuration for the reserve operations tool.
//!
//! Configuration comes from two sources:
//! - Environment variables (via .env file or shell): connection details, keys, addresses
//! - CLI arguments: the operation to perform and its parameters

use alloy::primitives::Address;
use clap::{Parser, Subcommand};
use fastnum::{D256, UD256, decimal::Context};
use reserve_sdk::Addresses;

/// Environment configuration (connection details, credentials, contracts).
#[derive(Debug, serde::Deserialize)]
pub struct EnvConfig {
    /// RPC URL for the node
    pub node_rpc_url: String,

    /// Private key of the admin/operator account signing transactions
    pub private_key: String,

    /// Reserve contract address
    pub reserve_address: String,

    /// Pricing (conversion rates) contract address
    pub conversion_rates_address: String,

    /// Sanity rates contract address
    pub sanity_rates_address: String,

    /// Optional number of tokens fetched concurrently while setting rates
    pub workers: Option<usize>,
}

impl EnvConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, envy::Error> {
        envy::from_env()
    }

    /// Number of tokens fetched concurrently, `None` for the default.
    pub fn workers(&self) -> Result<Option<usize>, ConfigError> {
        match self.workers {
            Some(0) => Err(ConfigError::ZeroWorkers),
            workers => Ok(workers),
        }
    }

    /// Parse the contract addresses.
    pub fn addresses(&self) -> Result<Addresses, alloy::primitives::hex::FromHexError> {
        Ok(Addresses::new(
            self.reserve_address.parse()?,
            self.conversion_rates_address.parse()?,
            self.sanity_rates_address.parse()?,
        ))
    }
}

#[derive(Debug, Parser)]
#[command(name = "reserve-ops")]
#[command(about = "Operate an exchange reserve: rates, trading and funds")]
pub struct CliConfig {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print roles, linked contracts and trading state
    Status,

    /// Print recorded rates and compact data of a token
    Rates {
        /// Token address
        #[arg(long)]
        token: String,
    },

    /// Set buy/sell rates of tokens with a single transaction
    SetRates {
        /// Token addresses (comma-separated)
        #[arg(long, value_delimiter = ',', required = true)]
        tokens: Vec<String>,

        /// Buy rates, tokens per ETH (comma-separated, e.g. "500,1200.5")
        #[arg(long, value_delimiter = ',', required = true)]
        buy: Vec<String>,

        /// Sell rates, ETH per token (comma-separated, e.g. "0.00182,0.0008")
        #[arg(long, value_delimiter = ',', required = true)]
        sell: Vec<String>,
    },

    /// Enable trading of the reserve
    EnableTrade,

    /// Disable trading of the reserve
    DisableTrade,

    /// Withdraw tokens from the reserve to an approved address
    Withdraw {
        /// Token address
        #[arg(long)]
        token: String,

        /// Amount in token units (e.g. "12.5")
        #[arg(long)]
        amount: String,

        /// Token decimals
        #[arg(long, default_value = "18")]
        decimals: u8,

        /// Destination address
        #[arg(long)]
        dest: String,
    },
}

/// Validated rates to set.
#[derive(Debug, PartialEq)]
pub struct RatesRequest {
    pub tokens: Vec<Address>,
    pub buy: Vec<D256>,
    pub sell: Vec<D256>,
}

/// Parses rate setting arguments.
pub fn rates_request(
    tokens: &[String],
    buy: &[String],
    sell: &[String],
) -> Result<RatesRequest, ConfigError> {
    if tokens.len() != buy.len() || tokens.len() != sell.len() {
        return Err(ConfigError::RateCountMismatch);
    }
    Ok(RatesRequest {
        tokens: tokens
            .iter()
            .map(|t| parse_address(t))
            .collect::<Result<_, _>>()?,
        buy: buy
            .iter()
            .map(|r| parse_rate(r))
            .collect::<Result<_, _>>()?,
        sell: sell
            .iter()
            .map(|r| parse_rate(r))
            .collect::<Result<_, _>>()?,
    })
}

pub fn parse_address(value: &str) -> Result<Address, ConfigError> {
    value
        .parse()
        .map_err(|_| ConfigError::InvalidAddress(value.to_string()))
}

pub fn parse_amount(value: &str) -> Result<UD256, ConfigError> {
    UD256::from_str(value, Context::default())
        .map_err(|_| ConfigError::InvalidAmount(value.to_string()))
}

fn parse_rate(value: &str) -> Result<D256, ConfigError> {
    D256::from_str(value, Context::default())
        .map_err(|_| ConfigError::InvalidRate(value.to_string()))
}

/// Configuration errors.
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Invalid rate: {0}")]
    InvalidRate(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("tokens, buy and sell rates must have the same number of values")]
    RateCountMismatch,

    #[error("WORKERS must be at least 1")]
    ZeroWorkers,
}
