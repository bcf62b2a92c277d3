//! Contract interfaces of a reserve deployment.
//!
//! Only the functions the SDK touches are declared.

#[allow(clippy::too_many_arguments)]
pub mod permissions {
    alloy::sol!(
        /// Admin/operator/alerter management shared by every reserve contract.
        #[derive(Debug)]
        #[sol(rpc)]
        interface PermissionGroups {
            function admin() external view returns (address);
            function pendingAdmin() external view returns (address);
            function getOperators() external view returns (address[] memory);
            function getAlerters() external view returns (address[] memory);
            function transferAdmin(address newAdmin) external;
            function claimAdmin() external;
            function addOperator(address newOperator) external;
            function removeOperator(address operator) external;
            function addAlerter(address newAlerter) external;
            function removeAlerter(address alerter) external;
        }
    );
}

#[allow(clippy::too_many_arguments)]
pub mod reserve {
    alloy::sol!(
        /// Reserve contract holding the funds the reserve trades with.
        #[derive(Debug)]
        #[sol(rpc)]
        interface KyberReserve {
            function tradeEnabled() external view returns (bool);
            function approvedWithdrawAddresses(bytes32 key) external view returns (bool);
            function getBalance(address token) external view returns (uint256);
            function enableTrade() external returns (bool);
            function disableTrade() external returns (bool);
            function approveWithdrawAddress(address token, address addr, bool approve) external;
            function withdraw(address token, uint256 amount, address destination) external returns (bool);
            function setContracts(address network, address conversionRates, address sanityRates) external;
            function kyberNetwork() external view returns (address);
            function conversionRatesContract() external view returns (address);
            function sanityRatesContract() external view returns (address);
        }
    );
}

#[allow(clippy::too_many_arguments)]
pub mod pricing {
    alloy::sol!(
        /// Pricing contract storing base rates and packed compact deltas.
        #[derive(Debug)]
        #[sol(rpc)]
        interface ConversionRates {
            function getRate(address token, uint256 currentBlockNumber, bool buy, uint256 qty) external view returns (uint256);
            function getBasicRate(address token, bool buy) external view returns (uint256);
            function getCompactData(address token) external view returns (uint256 arrayIndex, uint256 fieldOffset, bytes1 buy, bytes1 sell);
            function getStepFunctionData(address token, uint256 command, uint256 param) external view returns (int256);
            function reserveContract() external view returns (address);
            function setBaseRate(
                address[] tokens,
                uint256[] baseBuy,
                uint256[] baseSell,
                bytes14[] buy,
                bytes14[] sell,
                uint256 blockNumber,
                uint256[] indices
            ) external;
            function setCompactData(bytes14[] buy, bytes14[] sell, uint256 blockNumber, uint256[] indices) external;
            function addToken(address token) external;
            function enableTokenTrade(address token) external;
            function disableTokenTrade(address token) external;
            function setValidRateDurationInBlocks(uint256 duration) external;
            function setTokenControlInfo(
                address token,
                uint256 minimalRecordResolution,
                uint256 maxPerBlockImbalance,
                uint256 maxTotalImbalance
            ) external;
            function setQtyStepFunction(address token, int256[] xBuy, int256[] yBuy, int256[] xSell, int256[] ySell) external;
            function setImbalanceStepFunction(address token, int256[] xBuy, int256[] yBuy, int256[] xSell, int256[] ySell) external;
            function setReserveAddress(address reserve) external;
        }
    );
}

#[allow(clippy::too_many_arguments)]
pub mod sanity {
    alloy::sol!(
        /// Sanity rates contract bounding the rates the reserve may quote.
        #[derive(Debug)]
        #[sol(rpc)]
        interface SanityRates {
            function setSanityRates(address[] srcs, uint256[] rates) external;
            function getSanityRate(address src, address dest) external view returns (uint256);
            function setReasonableDiff(address[] srcs, uint256[] diff) external;
            function reasonableDiffInBps(address token) external view returns (uint256);
        }
    );
}

#[cfg(test)]
mod tests {
    use alloy_sol_types::SolCall;

    use super::*;

    #[test]
    fn test_rate_update_signatures() {
        assert_eq!(
            pricing::ConversionRates::setBaseRateCall::SIGNATURE,
            "setBaseRate(address[],uint256[],uint256[],bytes14[],bytes14[],uint256,uint256[])"
        );
        assert_eq!(
            pricing::ConversionRates::setCompactDataCall::SIGNATURE,
            "setCompactData(bytes14[],bytes14[],uint256,uint256[])"
        );
        assert_eq!(
            pricing::ConversionRates::getCompactDataCall::SIGNATURE,
            "getCompactData(address)"
        );
    }

    #[test]
    fn test_withdraw_signature() {
        assert_eq!(
            reserve::KyberReserve::withdrawCall::SIGNATURE,
            "withdraw(address,uint256,address)"
        );
        assert_eq!(
            permissions::PermissionGroups::transferAdminCall::SIGNATURE,
            "transferAdmin(address)"
        );
    }
}
