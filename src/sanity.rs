//! Sanity rates contract client.
//!
//! The sanity contract keeps a reference rate per token along with a tolerated
//! deviation; rates from the pricing contract outside of that range are not
//! used for trades.

use alloy::{
    primitives::{Address, TxHash, U256},
    providers::Provider,
};

use crate::{
    abi::sanity::SanityRates,
    call,
    error::{ChainError, InputError},
    permissions::Permissions,
};

#[derive(Clone, Debug)]
pub struct SanityRatesContract<P> {
    instance: SanityRates::SanityRatesInstance<P>,
    permissions: Permissions<P>,
}

impl<P: Provider + Clone> SanityRatesContract<P> {
    pub fn new(address: Address, provider: P) -> Self {
        Self {
            instance: SanityRates::new(address, provider.clone()),
            permissions: Permissions::new(address, provider),
        }
    }
}

impl<P: Provider> SanityRatesContract<P> {
    pub fn address(&self) -> Address {
        *self.instance.address()
    }

    pub fn permissions(&self) -> &Permissions<P> {
        &self.permissions
    }

    /// Sets reference rates of the tokens against ETH, in 18 decimals
    /// (1 KNC = 0.002 ETH is `2 * 10^15`).
    pub async fn set_sanity_rates(
        &self,
        tokens: &[Address],
        rates: &[U256],
    ) -> Result<TxHash, ChainError> {
        check_lengths(tokens, rates)?;
        call::submit(self.instance.setSanityRates(tokens.to_vec(), rates.to_vec())).await
    }

    pub async fn sanity_rate(&self, src: Address, dest: Address) -> Result<U256, ChainError> {
        Ok(self.instance.getSanityRate(src, dest).call().await?)
    }

    /// Sets tolerated deviations from the sanity rates, in basis points.
    pub async fn set_reasonable_diff(
        &self,
        tokens: &[Address],
        diffs_bps: &[U256],
    ) -> Result<TxHash, ChainError> {
        check_lengths(tokens, diffs_bps)?;
        call::submit(
            self.instance
                .setReasonableDiff(tokens.to_vec(), diffs_bps.to_vec()),
        )
        .await
    }

    pub async fn reasonable_diff_in_bps(&self, token: Address) -> Result<U256, ChainError> {
        Ok(self.instance.reasonableDiffInBps(token).call().await?)
    }
}

fn check_lengths(tokens: &[Address], values: &[U256]) -> Result<(), InputError> {
    if tokens.len() != values.len() {
        return Err(InputError::ValueCountMismatch {
            tokens: tokens.len(),
            values: values.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use alloy::providers::ProviderBuilder;

    use super::*;

    fn tokens(n: u8) -> Vec<Address> {
        (0..n).map(Address::with_last_byte).collect()
    }

    #[test]
    fn test_check_lengths() {
        assert_eq!(check_lengths(&tokens(2), &[U256::from(1), U256::from(2)]), Ok(()));
        assert_eq!(check_lengths(&[], &[]), Ok(()));
        assert_eq!(
            check_lengths(&tokens(2), &[U256::from(1)]),
            Err(InputError::ValueCountMismatch {
                tokens: 2,
                values: 1
            })
        );
        assert_eq!(
            check_lengths(&tokens(1), &[U256::ZERO; 3]),
            Err(InputError::ValueCountMismatch {
                tokens: 1,
                values: 3
            })
        );
    }

    /// Mismatched lists fail before reaching the (unreachable) node.
    #[tokio::test]
    async fn test_mismatched_lists_not_submitted() {
        let provider = ProviderBuilder::new().connect_http("http://127.0.0.1:1".parse().unwrap());
        let sanity = SanityRatesContract::new(Address::with_last_byte(0xaa), provider);

        let err = sanity
            .set_sanity_rates(&tokens(3), &[U256::from(10)])
            .await
            .unwrap_err();
        assert!(matches!(err, ChainError::InvalidRequest(_)));

        let err = sanity
            .set_reasonable_diff(&tokens(1), &[U256::from(100), U256::from(200)])
            .await
            .unwrap_err();
        assert!(matches!(err, ChainError::InvalidRequest(_)));
    }
}
