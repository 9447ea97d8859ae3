//! Events emitted by OpenZeppelin upgradeable proxies (ERC-1967).

use alloy::sol;

sol! {
    #[derive(Debug, PartialEq, Eq)]
    interface IUpgradeableProxy {
        event AdminChanged(address previousAdmin, address newAdmin);
        event BeaconUpgraded(address indexed beacon);
        event Upgraded(address indexed implementation);
    }
}

entity_fields! {
    IUpgradeableProxy::AdminChanged { previousAdmin, newAdmin }
    IUpgradeableProxy::BeaconUpgraded { beacon }
    IUpgradeableProxy::Upgraded { implementation }
}
