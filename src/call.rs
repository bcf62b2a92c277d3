use alloy::{contract::SolCallBuilder, primitives::TxHash, providers::Provider};
use alloy_sol_types::SolCall;
use tracing::debug;

use crate::error::ChainError;

/// Broadcasts the call as a transaction, returning its hash without waiting
/// for inclusion.
pub(crate) async fn submit<P: Provider, C: SolCall>(
    call: SolCallBuilder<P, C>,
) -> Result<TxHash, ChainError> {
    let pending = call.send().await?;
    debug!(function = C::SIGNATURE, tx_hash = %pending.tx_hash(), "transaction submitted");
    Ok(*pending.tx_hash())
}
