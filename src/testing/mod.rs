//! In-memory pricing backend and test utilities.
//!
//! [`MockPricing`] stands in for the pricing contract behind a
//! [`crate::pricing::RateSetter`]: it serves registered token indices and base
//! rates, records submitted rate updates instead of broadcasting them, and
//! can be told to fail lookups or submissions.
//!

use std::sync::{
    Mutex,
    atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering},
};

use alloy::primitives::{Address, TxHash, U256, keccak256};
use dashmap::{DashMap, DashSet};

use crate::{
    abi::pricing::ConversionRates::{setBaseRateCall, setCompactDataCall},
    error::ChainError,
    pricing::PricingBackend,
    types::{Direction, TokenIndex},
};

/// Rate update submitted to a [`MockPricing`].
#[derive(Clone, Debug)]
pub enum Submission {
    BaseRate(setBaseRateCall),
    CompactData(setCompactDataCall),
}

impl Submission {
    pub fn as_base_rate(&self) -> Option<&setBaseRateCall> {
        match self {
            Submission::BaseRate(call) => Some(call),
            Submission::CompactData(_) => None,
        }
    }

    pub fn as_compact_data(&self) -> Option<&setCompactDataCall> {
        match self {
            Submission::BaseRate(_) => None,
            Submission::CompactData(call) => Some(call),
        }
    }
}

#[derive(Debug, Default)]
pub struct MockPricing {
    block_number: AtomicU64,
    indices: DashMap<Address, TokenIndex>,
    base_rates: DashMap<(Address, Direction), U256>,
    failing_tokens: DashSet<Address>,
    fail_submissions: AtomicBool,
    submissions: Mutex<Vec<Submission>>,
    index_lookups: AtomicUsize,
    rate_lookups: AtomicUsize,
    index_reads: InFlight,
    rate_reads: InFlight,
}

/// Number of reads in progress and its observed peak.
#[derive(Debug, Default)]
struct InFlight {
    current: AtomicUsize,
    max: AtomicUsize,
}

impl InFlight {
    /// Counts a read in progress across one scheduler yield.
    async fn track(&self) {
        let current = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.max.fetch_max(current, Ordering::SeqCst);
        tokio::task::yield_now().await;
        self.current.fetch_sub(1, Ordering::SeqCst);
    }

    fn max(&self) -> usize {
        self.max.load(Ordering::SeqCst)
    }
}

impl MockPricing {
    pub fn new(block_number: u64) -> Self {
        Self {
            block_number: AtomicU64::new(block_number),
            ..Default::default()
        }
    }

    /// Registers a token with its compact data index and recorded base rates.
    pub fn register(&self, token: Address, index: TokenIndex, base_buy: U256, base_sell: U256) {
        self.indices.insert(token, index);
        self.set_base_rates(token, base_buy, base_sell);
    }

    pub fn set_base_rates(&self, token: Address, base_buy: U256, base_sell: U256) {
        self.base_rates.insert((token, Direction::Buy), base_buy);
        self.base_rates.insert((token, Direction::Sell), base_sell);
    }

    pub fn set_block_number(&self, block_number: u64) {
        self.block_number.store(block_number, Ordering::SeqCst);
    }

    /// Makes every read concerning the token fail with a transport error.
    pub fn fail_lookups_of(&self, token: Address) {
        self.failing_tokens.insert(token);
    }

    /// Makes every submission fail with a revert.
    pub fn fail_submissions(&self) {
        self.fail_submissions.store(true, Ordering::SeqCst);
    }

    /// Submitted rate updates, oldest first.
    pub fn submissions(&self) -> Vec<Submission> {
        self.submissions.lock().expect("submissions lock").clone()
    }

    pub fn index_lookups(&self) -> usize {
        self.index_lookups.load(Ordering::SeqCst)
    }

    pub fn rate_lookups(&self) -> usize {
        self.rate_lookups.load(Ordering::SeqCst)
    }

    /// Largest number of token index lookups observed in progress at once.
    pub fn max_index_lookups_in_flight(&self) -> usize {
        self.index_reads.max()
    }

    /// Largest number of base rate lookups observed in progress at once.
    pub fn max_rate_lookups_in_flight(&self) -> usize {
        self.rate_reads.max()
    }

    fn check_token(&self, token: Address) -> Result<(), ChainError> {
        if self.failing_tokens.contains(&token) {
            return Err(ChainError::Transport(format!("connection reset reading {token}")));
        }
        Ok(())
    }

    fn record(&self, submission: Submission) -> Result<TxHash, ChainError> {
        if self.fail_submissions.load(Ordering::SeqCst) {
            return Err(ChainError::Reverted("execution reverted".to_string()));
        }
        let mut submissions = self.submissions.lock().expect("submissions lock");
        submissions.push(submission);
        Ok(keccak256(submissions.len().to_be_bytes()))
    }
}

impl PricingBackend for MockPricing {
    async fn token_index(&self, token: Address) -> Result<TokenIndex, ChainError> {
        self.index_lookups.fetch_add(1, Ordering::SeqCst);
        self.index_reads.track().await;

        self.check_token(token)?;
        self.indices
            .get(&token)
            .map(|index| *index)
            .ok_or_else(|| ChainError::Reverted(format!("token {token} is not listed")))
    }

    async fn basic_rate(&self, token: Address, direction: Direction) -> Result<U256, ChainError> {
        self.rate_lookups.fetch_add(1, Ordering::SeqCst);
        self.rate_reads.track().await;
        self.check_token(token)?;
        Ok(self
            .base_rates
            .get(&(token, direction))
            .map(|rate| *rate)
            .unwrap_or_default())
    }

    async fn block_number(&self) -> Result<u64, ChainError> {
        Ok(self.block_number.load(Ordering::SeqCst))
    }

    async fn set_base_rate(&self, args: setBaseRateCall) -> Result<TxHash, ChainError> {
        self.record(Submission::BaseRate(args))
    }

    async fn set_compact_data(&self, args: setCompactDataCall) -> Result<TxHash, ChainError> {
        self.record(Submission::CompactData(args))
    }
}
