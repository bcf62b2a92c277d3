//! Reserve operations tool.
//!
//! Inspects an exchange reserve and performs operator/admin actions on it:
//! setting token rates, toggling trade and withdrawing funds.

mod config;
mod error;

use std::process::exit;

use alloy::{
    network::EthereumWallet,
    providers::{DynProvider, ProviderBuilder},
    rpc::client::RpcClient,
    signers::local::PrivateKeySigner,
};
use clap::Parser;
use reserve_sdk::{
    Reserve, compact::decode_compact, num::Converter, pricing::PricingBackend, types::Direction,
};
use tracing::{error, info};
use url::Url;

use config::{CliConfig, Command, EnvConfig};

#[tokio::main]
async fn main() {
    // Load .env file
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("Warning: Failed to load .env file: {}", e);
    }

    // Parse environment configuration
    let env_config = match EnvConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to parse environment configuration: {}", e);
            exit(1);
        }
    };

    // Parse CLI arguments
    let cli_config = CliConfig::parse();

    // Set up logging
    if std::env::var("RUST_LOG").is_err() {
        unsafe {
            std::env::set_var("RUST_LOG", "info");
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let reserve = match connect(&env_config) {
        Ok(reserve) => reserve,
        Err(e) => {
            eprintln!("Invalid configuration: {}", e);
            exit(1);
        }
    };

    if let Err(e) = run(&reserve, cli_config.command).await {
        error!(%e, "Reserve operation failed");
        exit(1);
    }
}

fn connect(env_config: &EnvConfig) -> error::Result<Reserve<DynProvider>> {
    let workers = env_config.workers()?;
    let addresses = env_config.addresses()?;
    let private_key: PrivateKeySigner = env_config.private_key.parse()?;
    let wallet = EthereumWallet::new(private_key);
    let node_url = Url::parse(&env_config.node_rpc_url)?;

    let provider = ProviderBuilder::new()
        .wallet(wallet)
        .connect_client(RpcClient::new_http(node_url));
    let reserve = Reserve::new(&addresses, DynProvider::new(provider));

    Ok(match workers {
        Some(workers) => reserve.with_workers(workers),
        None => reserve,
    })
}

async fn run(reserve: &Reserve<DynProvider>, command: Command) -> error::Result<()> {
    match command {
        Command::Status => status(reserve).await,
        Command::Rates { token } => rates(reserve, &token).await,
        Command::SetRates { tokens, buy, sell } => {
            let request = config::rates_request(&tokens, &buy, &sell)?;
            let tx_hash = reserve
                .pricing
                .set_rates(&request.tokens, &request.buy, &request.sell)
                .await?;
            info!(%tx_hash, tokens = request.tokens.len(), "Rates submitted");
            Ok(())
        }
        Command::EnableTrade => {
            let tx_hash = reserve.fund.enable_trade().await?;
            info!(%tx_hash, "Trade enabling submitted");
            Ok(())
        }
        Command::DisableTrade => {
            let tx_hash = reserve.fund.disable_trade().await?;
            info!(%tx_hash, "Trade disabling submitted");
            Ok(())
        }
        Command::Withdraw {
            token,
            amount,
            decimals,
            dest,
        } => {
            let token = config::parse_address(&token)?;
            let dest = config::parse_address(&dest)?;
            let amount = Converter::new(decimals).to_unsigned(config::parse_amount(&amount)?);
            let tx_hash = reserve.fund.withdraw(token, amount, dest).await?;
            info!(%tx_hash, %token, %amount, %dest, "Withdrawal submitted");
            Ok(())
        }
    }
}

async fn status(reserve: &Reserve<DynProvider>) -> error::Result<()> {
    let addresses = reserve.addresses();
    let block_number = reserve.pricing.rate_setter().backend().block_number().await?;
    println!("block:            {block_number}");
    println!("reserve:          {}", addresses.reserve());
    println!("  admin:          {}", reserve.fund.permissions().admin().await?);
    println!("  operators:      {:?}", reserve.fund.permissions().operators().await?);
    println!("  alerters:       {:?}", reserve.fund.permissions().alerters().await?);
    println!("  trade enabled:  {}", reserve.fund.trade_enabled().await?);
    println!("  network:        {}", reserve.fund.network_address().await?);
    println!("  pricing:        {}", reserve.fund.conversion_rates_address().await?);
    println!("  sanity rates:   {}", reserve.fund.sanity_rates_address().await?);
    println!("pricing:          {}", addresses.conversion_rates());
    println!("  admin:          {}", reserve.pricing.permissions().admin().await?);
    println!("  operators:      {:?}", reserve.pricing.permissions().operators().await?);
    println!("  reserve:        {}", reserve.pricing.reserve_address().await?);
    println!("sanity rates:     {}", addresses.sanity_rates());
    Ok(())
}

async fn rates(reserve: &Reserve<DynProvider>, token: &str) -> error::Result<()> {
    let token = config::parse_address(token)?;
    let converter = Converter::rates();

    let index = reserve.pricing.token_index(token).await?;
    let base_buy = reserve.pricing.basic_rate(token, Direction::Buy).await?;
    let base_sell = reserve.pricing.basic_rate(token, Direction::Sell).await?;
    let compact = reserve.pricing.compact_data(token).await?;

    println!("token:            {token}");
    println!(
        "  index:          array {} field {}",
        index.array_index(),
        index.field_index()
    );
    println!("  base buy:       {}", converter.from_unsigned::<4>(base_buy));
    println!("  base sell:      {}", converter.from_unsigned::<4>(base_sell));
    println!(
        "  compact buy:    {} (per mille)",
        decode_compact(compact.buy.0[0])
    );
    println!(
        "  compact sell:   {} (per mille)",
        decode_compact(compact.sell.0[0])
    );
    Ok(())
}
