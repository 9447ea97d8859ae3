use alloy::primitives::{address, Address};

use super::proxy::IUpgradeableProxy;
use super::{DataSource, Subgraph};
use crate::models::CuratedProtocol;

/// MORPHO governance token; its implementation can be swapped through the proxy.
pub const MORPHO_TOKEN: Address = address!("58d97b57bb95320f9a05dc918aef65434969c2b2");

pub fn subgraph() -> Subgraph {
    Subgraph::new(CuratedProtocol::MorphoBlue).with_data_source(
        DataSource::new("MorphoToken", MORPHO_TOKEN).on::<IUpgradeableProxy::Upgraded>(),
    )
}
