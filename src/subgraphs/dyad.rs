use alloy::primitives::{address, Address};
use alloy::sol;

use super::{DataSource, Subgraph};
use crate::models::CuratedProtocol;

pub const DYAD: Address = address!("fd03723a9a3abe0562451496a9a394d2c4bad4ab");

sol! {
    #[derive(Debug, PartialEq, Eq)]
    interface IDyad {
        event Approval(address indexed owner, address indexed spender, uint256 amount);
        event Transfer(address indexed from, address indexed to, uint256 amount);
    }
}

entity_fields! {
    IDyad::Approval { owner, spender, amount }
    IDyad::Transfer { from, to, amount }
}

pub fn subgraph() -> Subgraph {
    Subgraph::new(CuratedProtocol::Dyad).with_data_source(
        DataSource::new("Dyad", DYAD)
            .on::<IDyad::Approval>()
            .on::<IDyad::Transfer>(),
    )
}
