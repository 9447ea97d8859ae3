use alloy::primitives::{address, Address};
use alloy::sol;

use super::{DataSource, Subgraph};
use crate::models::CuratedProtocol;

pub const DAI: Address = address!("6b175474e89094c44da98b954eedeac495271d0f");

sol! {
    #[derive(Debug, PartialEq, Eq)]
    interface IDai {
        event Approval(address indexed src, address indexed guy, uint256 wad);
        event Transfer(address indexed src, address indexed dst, uint256 wad);
        event LogNote(
            bytes4 indexed sig,
            address indexed usr,
            bytes32 indexed arg1,
            bytes32 indexed arg2,
            bytes data
        ) anonymous;
    }
}

entity_fields! {
    IDai::Approval { src, guy, wad }
    IDai::Transfer { src, dst, wad }
    IDai::LogNote { sig, usr, arg1, arg2, data }
}

pub fn subgraph() -> Subgraph {
    Subgraph::new(CuratedProtocol::SkyLending).with_data_source(
        DataSource::new("Dai", DAI)
            .on::<IDai::Approval>()
            .on::<IDai::Transfer>()
            .on::<IDai::LogNote>(),
    )
}
