//! Error types for the reserve operations tool.

use reserve_sdk::error::{ChainError, RatesError};

use crate::config::ConfigError;

/// Main error type for the reserve operations tool.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Environment configuration error: {0}")]
    EnvConfig(#[from] envy::Error),

    #[error("Alloy signer error: {0}")]
    AlloySigner(#[from] alloy::signers::local::LocalSignerError),

    #[error("Invalid RPC URL: {0}")]
    InvalidRpcUrl(#[from] url::ParseError),

    #[error("Invalid address: {0}")]
    InvalidAddress(#[from] alloy::primitives::hex::FromHexError),

    #[error("Chain error: {0}")]
    Chain(#[from] ChainError),

    #[error("Rate update error: {0}")]
    Rates(#[from] RatesError),
}

pub type Result<T> = std::result::Result<T, Error>;
