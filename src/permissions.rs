//! Role management shared by the reserve, pricing and sanity contracts.
//!
//! Each contract has a single admin (transferred in two steps, see
//! [`Permissions::transfer_admin`] and [`Permissions::claim_admin`]),
//! a set of operators allowed to update rates and a set of alerters allowed
//! to halt trading.

use alloy::{
    primitives::{Address, TxHash},
    providers::Provider,
};

use crate::{abi::permissions::PermissionGroups, call, error::ChainError};

/// Permission groups of a single reserve contract.
#[derive(Clone, Debug)]
pub struct Permissions<P> {
    instance: PermissionGroups::PermissionGroupsInstance<P>,
}

impl<P: Provider> Permissions<P> {
    pub fn new(address: Address, provider: P) -> Self {
        Self {
            instance: PermissionGroups::new(address, provider),
        }
    }

    pub fn address(&self) -> Address {
        *self.instance.address()
    }

    pub async fn admin(&self) -> Result<Address, ChainError> {
        Ok(self.instance.admin().call().await?)
    }

    /// Admin the role was transferred to but not yet claimed by.
    pub async fn pending_admin(&self) -> Result<Address, ChainError> {
        Ok(self.instance.pendingAdmin().call().await?)
    }

    pub async fn operators(&self) -> Result<Vec<Address>, ChainError> {
        Ok(self.instance.getOperators().call().await?)
    }

    pub async fn alerters(&self) -> Result<Vec<Address>, ChainError> {
        Ok(self.instance.getAlerters().call().await?)
    }

    /// Places `address` as pending admin, it takes over once it calls
    /// [`Self::claim_admin`].
    pub async fn transfer_admin(&self, address: Address) -> Result<TxHash, ChainError> {
        call::submit(self.instance.transferAdmin(address)).await
    }

    pub async fn claim_admin(&self) -> Result<TxHash, ChainError> {
        call::submit(self.instance.claimAdmin()).await
    }

    pub async fn add_operator(&self, address: Address) -> Result<TxHash, ChainError> {
        call::submit(self.instance.addOperator(address)).await
    }

    pub async fn remove_operator(&self, address: Address) -> Result<TxHash, ChainError> {
        call::submit(self.instance.removeOperator(address)).await
    }

    pub async fn add_alerter(&self, address: Address) -> Result<TxHash, ChainError> {
        call::submit(self.instance.addAlerter(address)).await
    }

    pub async fn remove_alerter(&self, address: Address) -> Result<TxHash, ChainError> {
        call::submit(self.instance.removeAlerter(address)).await
    }
}
