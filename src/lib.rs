//! Reserve SDK.
//!
//! # Overview
//!
//! Client of an exchange reserve: a set of deployed smart contracts holding
//! the reserve funds ([`fund::ReserveContract`]), quoting token rates
//! ([`pricing::ConversionRatesContract`]) and bounding those rates
//! ([`sanity::SanityRatesContract`]). [`Reserve`] bundles the three.
//!
//! Rates are stored on chain as base rates plus compact one byte deltas.
//! [`pricing::ConversionRatesContract::set_rates`] encodes new rates into
//! the cheapest update expressing them, see [`compact`] and [`batch`] for
//! the encoding itself.
//!
//! Transactions are broadcast through the [`alloy::providers::Provider`] the
//! clients are created with, so it has to be set up with a wallet of an
//! account holding the required role (admin or operator). Calls return as
//! soon as a transaction is accepted by the node, without waiting for it to
//! be included.
//!
//! It is recommended to setup provider with
//! [`alloy::transports::layers::RetryBackoffLayer`], the SDK does not retry
//! failed calls.
//!
//! # Testing
//!
//! [`testing`] module provides an in-memory pricing backend to exercise rate
//! setting without a node.

pub mod abi;
pub mod batch;
mod call;
pub mod compact;
pub mod error;
pub mod fund;
pub mod num;
pub mod permissions;
pub mod pricing;
pub mod sanity;
pub mod testing;
pub mod types;

use alloy::{primitives::Address, providers::Provider};

/// Addresses of the deployed reserve contracts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Addresses {
    reserve: Address,
    conversion_rates: Address,
    sanity_rates: Address,
}

impl Addresses {
    pub fn new(reserve: Address, conversion_rates: Address, sanity_rates: Address) -> Self {
        Self {
            reserve,
            conversion_rates,
            sanity_rates,
        }
    }

    pub fn reserve(&self) -> Address {
        self.reserve
    }

    pub fn conversion_rates(&self) -> Address {
        self.conversion_rates
    }

    pub fn sanity_rates(&self) -> Address {
        self.sanity_rates
    }
}

/// Clients of all contracts of a reserve, sharing a single provider.
#[derive(Debug)]
pub struct Reserve<P> {
    pub fund: fund::ReserveContract<P>,
    pub pricing: pricing::ConversionRatesContract<P>,
    pub sanity: sanity::SanityRatesContract<P>,
}

impl<P: Provider + Clone> Reserve<P> {
    pub fn new(addresses: &Addresses, provider: P) -> Self {
        Self {
            fund: fund::ReserveContract::new(addresses.reserve, provider.clone()),
            pricing: pricing::ConversionRatesContract::new(
                addresses.conversion_rates,
                provider.clone(),
            ),
            sanity: sanity::SanityRatesContract::new(addresses.sanity_rates, provider),
        }
    }

    /// Sets the number of tokens whose chain state is fetched concurrently
    /// while setting rates (default: [`pricing::DEFAULT_WORKERS`]).
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.pricing = self.pricing.with_workers(workers);
        self
    }

    pub fn addresses(&self) -> Addresses {
        Addresses::new(
            self.fund.address(),
            self.pricing.address(),
            self.sanity.address(),
        )
    }
}
