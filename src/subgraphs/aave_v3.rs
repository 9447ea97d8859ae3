use alloy::primitives::{address, Address};
use alloy::sol;

use super::proxy::IUpgradeableProxy;
use super::{DataSource, Subgraph};
use crate::models::CuratedProtocol;

/// Aave V3 Ethereum Pool (proxy).
pub const POOL: Address = address!("87870bca3f3fd6335c3f4ce8392d69350b4fa4e2");

sol! {
    #[derive(Debug, PartialEq, Eq)]
    interface IPool {
        event BackUnbacked(address indexed reserve, address indexed backer, uint256 amount, uint256 fee);
        event Borrow(
            address indexed reserve,
            address user,
            address indexed onBehalfOf,
            uint256 amount,
            uint8 interestRateMode,
            uint256 borrowRate,
            uint16 indexed referralCode
        );
        event DeficitCovered(address indexed reserve, address caller, uint256 amountCovered);
        event DeficitCreated(address indexed user, address indexed debtAsset, uint256 amountCreated);
        event FlashLoan(
            address indexed target,
            address initiator,
            address indexed asset,
            uint256 amount,
            uint8 interestRateMode,
            uint256 premium,
            uint16 indexed referralCode
        );
        event IsolationModeTotalDebtUpdated(address indexed asset, uint256 totalDebt);
        event LiquidationCall(
            address indexed collateralAsset,
            address indexed debtAsset,
            address indexed user,
            uint256 debtToCover,
            uint256 liquidatedCollateralAmount,
            address liquidator,
            bool receiveAToken
        );
        event MintUnbacked(
            address indexed reserve,
            address user,
            address indexed onBehalfOf,
            uint256 amount,
            uint16 indexed referralCode
        );
        event MintedToTreasury(address indexed reserve, uint256 amountMinted);
        event Repay(
            address indexed reserve,
            address indexed user,
            address indexed repayer,
            uint256 amount,
            bool useATokens
        );
        event ReserveDataUpdated(
            address indexed reserve,
            uint256 liquidityRate,
            uint256 stableBorrowRate,
            uint256 variableBorrowRate,
            uint256 liquidityIndex,
            uint256 variableBorrowIndex
        );
        event ReserveUsedAsCollateralDisabled(address indexed reserve, address indexed user);
        event ReserveUsedAsCollateralEnabled(address indexed reserve, address indexed user);
        event Supply(
            address indexed reserve,
            address user,
            address indexed onBehalfOf,
            uint256 amount,
            uint16 indexed referralCode
        );
        event UserEModeSet(address indexed user, uint8 categoryId);
        event Withdraw(address indexed reserve, address indexed user, address indexed to, uint256 amount);
    }
}

entity_fields! {
    IPool::BackUnbacked { reserve, backer, amount, fee }
    IPool::Borrow { reserve, user, onBehalfOf, amount, interestRateMode, borrowRate, referralCode }
    IPool::DeficitCovered { reserve, caller, amountCovered }
    IPool::DeficitCreated { user, debtAsset, amountCreated }
    IPool::FlashLoan { target, initiator, asset, amount, interestRateMode, premium, referralCode }
    IPool::IsolationModeTotalDebtUpdated { asset, totalDebt }
    IPool::LiquidationCall {
        collateralAsset,
        debtAsset,
        user,
        debtToCover,
        liquidatedCollateralAmount,
        liquidator,
        receiveAToken,
    }
    IPool::MintUnbacked { reserve, user, onBehalfOf, amount, referralCode }
    IPool::MintedToTreasury { reserve, amountMinted }
    IPool::Repay { reserve, user, repayer, amount, useATokens }
    IPool::ReserveDataUpdated {
        reserve,
        liquidityRate,
        stableBorrowRate,
        variableBorrowRate,
        liquidityIndex,
        variableBorrowIndex,
    }
    IPool::ReserveUsedAsCollateralDisabled { reserve, user }
    IPool::ReserveUsedAsCollateralEnabled { reserve, user }
    IPool::Supply { reserve, user, onBehalfOf, amount, referralCode }
    IPool::UserEModeSet { user, categoryId }
    IPool::Withdraw { reserve, user, to, amount }
}

pub fn subgraph() -> Subgraph {
    Subgraph::new(CuratedProtocol::AaveV3).with_data_source(
        DataSource::new("PoolInstance", POOL)
            .on::<IPool::BackUnbacked>()
            .on::<IPool::Borrow>()
            .on::<IPool::DeficitCovered>()
            .on::<IPool::DeficitCreated>()
            .on::<IPool::FlashLoan>()
            .on::<IPool::IsolationModeTotalDebtUpdated>()
            .on::<IPool::LiquidationCall>()
            .on::<IPool::MintUnbacked>()
            .on::<IPool::MintedToTreasury>()
            .on::<IPool::Repay>()
            .on::<IPool::ReserveDataUpdated>()
            .on::<IPool::ReserveUsedAsCollateralDisabled>()
            .on::<IPool::ReserveUsedAsCollateralEnabled>()
            .on::<IPool::Supply>()
            .on::<IPool::UserEModeSet>()
            .on::<IPool::Withdraw>()
            .on::<IUpgradeableProxy::Upgraded>(),
    )
}
