//! Pricing contract client.
//!
//! Rates are stored by the pricing contract per token as a base rate plus a
//! one byte delta packed with the deltas of up to 13 other tokens. Use
//! [`ConversionRatesContract::set_rates`] to update rates of a set of tokens
//! with a single transaction; it picks between updating the packed deltas only
//! and resetting base rates, see [`crate::compact`] for the encoding.
//!
//! Step functions, imbalance limits and token listing are passed to the
//! contract as is.

mod backend;
mod rates;

pub use backend::PricingBackend;
pub use rates::{DEFAULT_WORKERS, RateSetter};

use alloy::{
    primitives::{Address, I256, TxHash, U256},
    providers::Provider,
};
use fastnum::D256;

use crate::{
    abi::pricing::ConversionRates::{self, ConversionRatesInstance, getCompactDataReturn},
    batch::CompactBatch,
    call,
    error::{ChainError, RatesError},
    permissions::Permissions,
    types::{Direction, TokenIndex},
};

/// Client of the pricing (conversion rates) contract.
#[derive(Debug)]
pub struct ConversionRatesContract<P> {
    rates: RateSetter<ConversionRatesInstance<P>>,
    permissions: Permissions<P>,
}

impl<P: Provider + Clone> ConversionRatesContract<P> {
    pub fn new(address: Address, provider: P) -> Self {
        Self {
            rates: RateSetter::new(ConversionRates::new(address, provider.clone())),
            permissions: Permissions::new(address, provider),
        }
    }
}

impl<P: Provider> ConversionRatesContract<P> {
    /// Sets the number of tokens whose chain state is fetched concurrently
    /// while setting rates (default: 4).
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.rates = self.rates.with_workers(workers);
        self
    }

    pub fn address(&self) -> Address {
        *self.instance().address()
    }

    pub fn permissions(&self) -> &Permissions<P> {
        &self.permissions
    }

    pub fn rate_setter(&self) -> &RateSetter<ConversionRatesInstance<P>> {
        &self.rates
    }

    fn instance(&self) -> &ConversionRatesInstance<P> {
        self.rates.backend()
    }

    /// See [`RateSetter::set_rates`].
    pub async fn set_rates(
        &self,
        tokens: &[Address],
        buy_rates: &[D256],
        sell_rates: &[D256],
    ) -> Result<TxHash, RatesError> {
        self.rates.set_rates(tokens, buy_rates, sell_rates).await
    }

    /// See [`RateSetter::set_rates_wei`].
    pub async fn set_rates_wei(
        &self,
        tokens: &[Address],
        buy_rates: &[U256],
        sell_rates: &[U256],
    ) -> Result<TxHash, RatesError> {
        self.rates
            .set_rates_wei(tokens, buy_rates, sell_rates)
            .await
    }

    /// Rate of buying `qty` tokens with ETH at the current block.
    pub async fn buy_rate(&self, token: Address, qty: U256) -> Result<U256, ChainError> {
        self.rate(token, Direction::Buy, qty).await
    }

    /// Rate of selling `qty` tokens for ETH at the current block.
    pub async fn sell_rate(&self, token: Address, qty: U256) -> Result<U256, ChainError> {
        self.rate(token, Direction::Sell, qty).await
    }

    async fn rate(&self, token: Address, direction: Direction, qty: U256) -> Result<U256, ChainError> {
        let block_number = self.rates.backend().block_number().await?;
        Ok(self
            .instance()
            .getRate(token, U256::from(block_number), direction.is_buy(), qty)
            .call()
            .await?)
    }

    /// Cached position of the token in the compact data arrays.
    pub async fn token_index(&self, token: Address) -> Result<TokenIndex, ChainError> {
        self.rates.token_index(token).await
    }

    pub async fn basic_rate(&self, token: Address, direction: Direction) -> Result<U256, ChainError> {
        self.rates.backend().basic_rate(token, direction).await
    }

    /// Raw compact data of the token: array index, field index and the
    /// current buy and sell deltas.
    pub async fn compact_data(&self, token: Address) -> Result<getCompactDataReturn, ChainError> {
        Ok(self.instance().getCompactData(token).call().await?)
    }

    /// Updates compact deltas of a prepared batch, fenced at the current block.
    pub async fn set_compact_data(&self, batch: CompactBatch) -> Result<TxHash, ChainError> {
        self.rates.set_compact_data(batch).await
    }

    pub async fn add_token(&self, token: Address) -> Result<TxHash, ChainError> {
        call::submit(self.instance().addToken(token)).await
    }

    pub async fn enable_token_trade(&self, token: Address) -> Result<TxHash, ChainError> {
        call::submit(self.instance().enableTokenTrade(token)).await
    }

    pub async fn disable_token_trade(&self, token: Address) -> Result<TxHash, ChainError> {
        call::submit(self.instance().disableTokenTrade(token)).await
    }

    /// Sets the number of blocks rates stay valid after an update.
    pub async fn set_valid_rate_duration_in_blocks(
        &self,
        duration: u64,
    ) -> Result<TxHash, ChainError> {
        call::submit(
            self.instance()
                .setValidRateDurationInBlocks(U256::from(duration)),
        )
        .await
    }

    /// Sets imbalance limits of the token.
    ///
    /// * `minimal_record_resolution` - token wei amount imbalances are recorded
    ///   with, recommended to be the token equivalent of $0.0001.
    /// * `max_per_block_imbalance` - max net absolute change of the token
    ///   balance within a block, in token wei.
    /// * `max_total_imbalance` - max net change of the token balance between
    ///   two rate updates, in token wei.
    pub async fn set_token_control_info(
        &self,
        token: Address,
        minimal_record_resolution: U256,
        max_per_block_imbalance: U256,
        max_total_imbalance: U256,
    ) -> Result<TxHash, ChainError> {
        call::submit(self.instance().setTokenControlInfo(
            token,
            minimal_record_resolution,
            max_per_block_imbalance,
            max_total_imbalance,
        ))
        .await
    }

    /// Sets rate adjustments by traded quantity, `y` in bps for quantities
    /// up to the corresponding `x`.
    pub async fn set_qty_step_function(
        &self,
        token: Address,
        x_buy: &[I256],
        y_buy: &[I256],
        x_sell: &[I256],
        y_sell: &[I256],
    ) -> Result<TxHash, ChainError> {
        call::submit(self.instance().setQtyStepFunction(
            token,
            x_buy.to_vec(),
            y_buy.to_vec(),
            x_sell.to_vec(),
            y_sell.to_vec(),
        ))
        .await
    }

    /// Sets rate adjustments by token imbalance, `y` in bps for imbalances
    /// up to the corresponding `x`.
    pub async fn set_imbalance_step_function(
        &self,
        token: Address,
        x_buy: &[I256],
        y_buy: &[I256],
        x_sell: &[I256],
        y_sell: &[I256],
    ) -> Result<TxHash, ChainError> {
        call::submit(self.instance().setImbalanceStepFunction(
            token,
            x_buy.to_vec(),
            y_buy.to_vec(),
            x_sell.to_vec(),
            y_sell.to_vec(),
        ))
        .await
    }

    pub async fn set_reserve_address(&self, reserve: Address) -> Result<TxHash, ChainError> {
        call::submit(self.instance().setReserveAddress(reserve)).await
    }

    pub async fn reserve_address(&self) -> Result<Address, ChainError> {
        Ok(self.instance().reserveContract().call().await?)
    }

    pub async fn step_function_data(
        &self,
        token: Address,
        command: U256,
        param: U256,
    ) -> Result<I256, ChainError> {
        Ok(self
            .instance()
            .getStepFunctionData(token, command, param)
            .call()
            .await?)
    }

    /// Lists a new token: adds it, sets its imbalance limits (see
    /// [`Self::set_token_control_info`]) and enables its trade.
    ///
    /// Returns hashes of the three transactions, in submission order.
    pub async fn add_new_token(
        &self,
        token: Address,
        minimal_record_resolution: U256,
        max_per_block_imbalance: U256,
        max_total_imbalance: U256,
    ) -> Result<[TxHash; 3], ChainError> {
        let added = self.add_token(token).await?;
        let control = self
            .set_token_control_info(
                token,
                minimal_record_resolution,
                max_per_block_imbalance,
                max_total_imbalance,
            )
            .await?;
        let enabled = self.enable_token_trade(token).await?;
        Ok([added, control, enabled])
    }
}
