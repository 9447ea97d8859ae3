use alloy::primitives::{address, Address};
use alloy::sol;

use super::{DataSource, Subgraph};
use crate::models::CuratedProtocol;

/// Liquity V1 ActivePool, which holds the ETH collateral and LUSD debt of all active troves.
pub const ACTIVE_POOL: Address = address!("df9eb223bafbe5c5271415c75aecd68c21fe3d7f");

sol! {
    #[derive(Debug, PartialEq, Eq)]
    interface IActivePool {
        event ActivePoolAddressChanged(address _newActivePoolAddress);
        event ActivePoolETHBalanceUpdated(uint256 _ETH);
        event ActivePoolLUSDDebtUpdated(uint256 _LUSDDebt);
        event BorrowerOperationsAddressChanged(address _newBorrowerOperationsAddress);
        event DefaultPoolAddressChanged(address _newDefaultPoolAddress);
        event ETHBalanceUpdated(uint256 _newBalance);
        event EtherSent(address _to, uint256 _amount);
        event LUSDBalanceUpdated(uint256 _newBalance);
        event OwnershipTransferred(address indexed previousOwner, address indexed newOwner);
        event StabilityPoolAddressChanged(address _newStabilityPoolAddress);
        event TroveManagerAddressChanged(address _newTroveManagerAddress);
    }
}

entity_fields! {
    IActivePool::ActivePoolAddressChanged { _newActivePoolAddress }
    IActivePool::ActivePoolETHBalanceUpdated { _ETH }
    IActivePool::ActivePoolLUSDDebtUpdated { _LUSDDebt }
    IActivePool::BorrowerOperationsAddressChanged { _newBorrowerOperationsAddress }
    IActivePool::DefaultPoolAddressChanged { _newDefaultPoolAddress }
    IActivePool::ETHBalanceUpdated { _newBalance }
    IActivePool::EtherSent { _to, _amount }
    IActivePool::LUSDBalanceUpdated { _newBalance }
    IActivePool::OwnershipTransferred { previousOwner, newOwner }
    IActivePool::StabilityPoolAddressChanged { _newStabilityPoolAddress }
    IActivePool::TroveManagerAddressChanged { _newTroveManagerAddress }
}

pub fn subgraph() -> Subgraph {
    Subgraph::new(CuratedProtocol::LiquityV1).with_data_source(
        DataSource::new("ActivePool", ACTIVE_POOL)
            .on::<IActivePool::ActivePoolAddressChanged>()
            .on::<IActivePool::ActivePoolETHBalanceUpdated>()
            .on::<IActivePool::ActivePoolLUSDDebtUpdated>()
            .on::<IActivePool::BorrowerOperationsAddressChanged>()
            .on::<IActivePool::DefaultPoolAddressChanged>()
            .on::<IActivePool::ETHBalanceUpdated>()
            .on::<IActivePool::EtherSent>()
            .on::<IActivePool::LUSDBalanceUpdated>()
            .on::<IActivePool::OwnershipTransferred>()
            .on::<IActivePool::StabilityPoolAddressChanged>()
            .on::<IActivePool::TroveManagerAddressChanged>(),
    )
}
