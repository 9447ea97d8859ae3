use alloy::primitives::{address, Address};
use alloy::sol;

use super::proxy::IUpgradeableProxy;
use super::{DataSource, Subgraph};
use crate::models::CuratedProtocol;

pub const COMET_REWARDS: Address = address!("1b0e765f6224c21223aea2af16c1c46e38885a40");

/// cUSDCv3 market proxy.
pub const COMET_USDC: Address = address!("c3d688b66703497daa19211eedff47f25384cdc3");

sol! {
    #[derive(Debug, PartialEq, Eq)]
    interface ICometRewards {
        event GovernorTransferred(address indexed oldGovernor, address indexed newGovernor);
        event RewardClaimed(address indexed src, address indexed recipient, address indexed token, uint256 amount);
    }
}

entity_fields! {
    ICometRewards::GovernorTransferred { oldGovernor, newGovernor }
    ICometRewards::RewardClaimed { src, recipient, token, amount }
}

pub fn subgraph() -> Subgraph {
    Subgraph::new(CuratedProtocol::CompoundV3)
        .with_data_source(
            DataSource::new("CometRewards", COMET_REWARDS)
                .on::<ICometRewards::GovernorTransferred>()
                .on::<ICometRewards::RewardClaimed>(),
        )
        .with_data_source(
            DataSource::new("Comet", COMET_USDC)
                .on::<IUpgradeableProxy::AdminChanged>()
                .on::<IUpgradeableProxy::BeaconUpgraded>()
                .on::<IUpgradeableProxy::Upgraded>(),
        )
}
