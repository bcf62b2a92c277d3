use alloy::{contract, primitives::Address, providers::PendingTransactionError, transports};
use std::fmt::Display;

use crate::types::Direction;

/// Error returned by the RPC provider as a result of call or
/// transaction execution.
#[derive(Debug, thiserror::Error)]
pub enum ChainError {
    #[error("fatal error: {0}")]
    Fatal(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("unexpected empty RPC response")]
    NullResp,

    #[error("transaction ran out of gas")]
    OutOfGas,

    #[error("transaction reverted: {0}")]
    Reverted(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("transaction timed out")]
    Timeout,
}

/// Input rejected before any chain interaction.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InputError {
    #[error("length mismatch: {tokens} tokens, {buy} buy rates, {sell} sell rates")]
    LengthMismatch {
        tokens: usize,
        buy: usize,
        sell: usize,
    },

    #[error("length mismatch: {tokens} tokens, {values} values")]
    ValueCountMismatch { tokens: usize, values: usize },

    #[error("no tokens to update")]
    Empty,

    #[error("token {0} listed more than once")]
    DuplicateToken(Address),

    #[error("invalid {direction} rate for {token}: {rate}")]
    InvalidRate {
        token: Address,
        direction: Direction,
        rate: String,
    },

    #[error("token {0} has no compact data index")]
    UnindexedToken(Address),
}

/// Error of a rate-setting call.
///
/// Nothing is submitted unless the error is [`RatesError::Submission`].
#[derive(Debug, thiserror::Error)]
pub enum RatesError {
    #[error("malformed input: {0}")]
    MalformedInput(#[from] InputError),

    #[error("{context} lookup failed: {source}")]
    Lookup {
        context: String,
        #[source]
        source: ChainError,
    },

    #[error("submission failed: {0}")]
    Submission(#[source] ChainError),
}

impl RatesError {
    pub(crate) fn lookup(context: impl Into<String>) -> impl FnOnce(ChainError) -> Self {
        let context = context.into();
        move |source| Self::Lookup { context, source }
    }
}

impl From<InputError> for ChainError {
    fn from(value: InputError) -> Self {
        Self::InvalidRequest(value.to_string())
    }
}

impl From<contract::Error> for ChainError {
    fn from(value: contract::Error) -> Self {
        match value {
            contract::Error::UnknownFunction(_) => Self::Fatal(value.to_string()),
            contract::Error::UnknownSelector(_) => Self::Fatal(value.to_string()),
            contract::Error::NotADeploymentTransaction => Self::Fatal(value.to_string()),
            contract::Error::ContractNotDeployed => Self::Fatal(value.to_string()),
            contract::Error::ZeroData(_, _) => Self::Fatal(value.to_string()),
            contract::Error::AbiError(_) => Self::Fatal(value.to_string()),
            contract::Error::TransportError(rpc_err) => Self::from(rpc_err),
            contract::Error::PendingTransactionError(err) => err.into(),
        }
    }
}

impl From<PendingTransactionError> for ChainError {
    fn from(value: PendingTransactionError) -> Self {
        match value {
            PendingTransactionError::FailedToRegister => Self::Fatal(value.to_string()),
            PendingTransactionError::TransportError(rpc_err) => Self::from(rpc_err),
            PendingTransactionError::Recv(_) => Self::Transport(value.to_string()),
            PendingTransactionError::TxWatcher(err) => match err {
                alloy::providers::WatchTxError::Timeout => Self::Timeout,
            },
        }
    }
}

impl<E: Display> From<transports::RpcError<E>> for ChainError {
    fn from(value: transports::RpcError<E>) -> Self {
        match value {
            transports::RpcError::ErrorResp(ref resp) => {
                // Heuristic to determine if eth_call failed due to OutOfGas or
                // if transaction was reverted during the gas estimation
                let msg = resp.message.to_ascii_lowercase();
                if (resp.code == -32603) && (msg.contains("gas") || msg.contains("oog")) {
                    Self::OutOfGas
                } else if ((resp.code == -32600 || resp.code == -32601 || resp.code == -32602)
                    && (msg.contains("invalid") || msg.contains("not found")))
                    || (resp.code == -32603
                        && (msg.contains("block by number") || msg.contains("getting block")))
                {
                    Self::InvalidRequest(msg)
                } else if resp.code == 3 && msg.contains("reverted") {
                    Self::Reverted(msg)
                } else {
                    Self::Transport(value.to_string())
                }
            }
            transports::RpcError::NullResp => Self::NullResp,
            _ => Self::Transport(value.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_error_is_invalid_request() {
        let err = ChainError::from(InputError::ValueCountMismatch {
            tokens: 2,
            values: 1,
        });
        assert!(matches!(
            err,
            ChainError::InvalidRequest(ref msg) if msg == "length mismatch: 2 tokens, 1 values"
        ));
    }

    #[test]
    fn test_null_response() {
        let err = ChainError::from(transports::RpcError::<transports::TransportErrorKind>::NullResp);
        assert!(matches!(err, ChainError::NullResp));
    }
}
