#![allow(dead_code)]

use alloy::primitives::{b256, hex, Address, LogData, B256};
use alloy::rpc::types::Log;
use alloy::sol_types::SolEvent;
use defipunk::{config::Settings, database::InMemoryEntityStore, AppState};
use std::sync::Arc;

pub const TX_HASH: B256 = b256!("a16081f360e3847006db660bae1c6d1b2e17ec2aa16081f360e3847006db660b");
pub const LOG_INDEX: u64 = 1;
pub const BLOCK_NUMBER: u64 = 1;
pub const BLOCK_TIMESTAMP: u64 = 1;

pub fn entity_id() -> String {
    format!("{}-{}", hex::encode_prefixed(TX_HASH), LOG_INDEX)
}

/// A delivered log carrying `data`, with fixed block metadata.
pub fn raw_log(address: Address, data: LogData) -> Log {
    Log {
        inner: alloy::primitives::Log { address, data },
        block_hash: Some(B256::repeat_byte(0xbb)),
        block_number: Some(BLOCK_NUMBER),
        block_timestamp: Some(BLOCK_TIMESTAMP),
        transaction_hash: Some(TX_HASH),
        transaction_index: Some(0),
        log_index: Some(LOG_INDEX),
        removed: false,
    }
}

pub fn mock_log<E: SolEvent>(address: Address, event: &E) -> Log {
    raw_log(address, event.encode_log_data())
}

/// Lowercase `0x` form the entities store addresses in.
pub fn hex_of(bytes: impl AsRef<[u8]>) -> String {
    hex::encode_prefixed(bytes)
}

pub fn mock_log_at<E: SolEvent>(address: Address, event: &E, tx: u8, log_index: u64, timestamp: u64) -> Log {
    let mut log = mock_log(address, event);
    log.transaction_hash = Some(B256::repeat_byte(tx));
    log.log_index = Some(log_index);
    log.block_number = Some(timestamp / 12);
    log.block_timestamp = Some(timestamp);
    log
}

pub fn test_state(settings: Settings) -> (AppState, Arc<InMemoryEntityStore>) {
    let store = Arc::new(InMemoryEntityStore::new());
    let state = AppState::new(settings, store.clone()).expect("state builds");
    (state, store)
}
