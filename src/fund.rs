//! Reserve contract client: trading switch, balances and withdrawals.

use alloy::{
    primitives::{Address, TxHash, U256, keccak256},
    providers::Provider,
};

use crate::{abi::reserve::KyberReserve, call, error::ChainError, permissions::Permissions};

/// Client of the reserve contract holding the traded funds.
#[derive(Clone, Debug)]
pub struct ReserveContract<P> {
    instance: KyberReserve::KyberReserveInstance<P>,
    permissions: Permissions<P>,
}

impl<P: Provider + Clone> ReserveContract<P> {
    pub fn new(address: Address, provider: P) -> Self {
        Self {
            instance: KyberReserve::new(address, provider.clone()),
            permissions: Permissions::new(address, provider),
        }
    }
}

impl<P: Provider> ReserveContract<P> {
    pub fn address(&self) -> Address {
        *self.instance.address()
    }

    pub fn permissions(&self) -> &Permissions<P> {
        &self.permissions
    }

    pub async fn trade_enabled(&self) -> Result<bool, ChainError> {
        Ok(self.instance.tradeEnabled().call().await?)
    }

    /// Whether `address` may receive withdrawals of `token`.
    pub async fn approved_withdraw_address(
        &self,
        address: Address,
        token: Address,
    ) -> Result<bool, ChainError> {
        Ok(self
            .instance
            .approvedWithdrawAddresses(withdraw_approval_key(token, address))
            .call()
            .await?)
    }

    /// Balance of `token` held by the reserve, in token wei.
    pub async fn balance(&self, token: Address) -> Result<U256, ChainError> {
        Ok(self.instance.getBalance(token).call().await?)
    }

    pub async fn enable_trade(&self) -> Result<TxHash, ChainError> {
        call::submit(self.instance.enableTrade()).await
    }

    pub async fn disable_trade(&self) -> Result<TxHash, ChainError> {
        call::submit(self.instance.disableTrade()).await
    }

    pub async fn approve_withdraw_address(
        &self,
        address: Address,
        token: Address,
    ) -> Result<TxHash, ChainError> {
        call::submit(self.instance.approveWithdrawAddress(token, address, true)).await
    }

    pub async fn disapprove_withdraw_address(
        &self,
        address: Address,
        token: Address,
    ) -> Result<TxHash, ChainError> {
        call::submit(self.instance.approveWithdrawAddress(token, address, false)).await
    }

    /// Withdraws `amount` token wei to `dest`, which has to be approved for
    /// the token first.
    pub async fn withdraw(
        &self,
        token: Address,
        amount: U256,
        dest: Address,
    ) -> Result<TxHash, ChainError> {
        call::submit(self.instance.withdraw(token, amount, dest)).await
    }

    /// Links the reserve to the network, pricing and sanity contracts.
    pub async fn set_contracts(
        &self,
        network: Address,
        conversion_rates: Address,
        sanity_rates: Address,
    ) -> Result<TxHash, ChainError> {
        call::submit(
            self.instance
                .setContracts(network, conversion_rates, sanity_rates),
        )
        .await
    }

    pub async fn network_address(&self) -> Result<Address, ChainError> {
        Ok(self.instance.kyberNetwork().call().await?)
    }

    pub async fn conversion_rates_address(&self) -> Result<Address, ChainError> {
        Ok(self.instance.conversionRatesContract().call().await?)
    }

    pub async fn sanity_rates_address(&self) -> Result<Address, ChainError> {
        Ok(self.instance.sanityRatesContract().call().await?)
    }
}

/// Key of the withdrawal approval mapping, `keccak256(token ‖ address)`.
fn withdraw_approval_key(token: Address, address: Address) -> alloy::primitives::B256 {
    keccak256([token.as_slice(), address.as_slice()].concat())
}
