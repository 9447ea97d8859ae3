pub mod connection;
pub mod entity_store;

pub use connection::*;
pub use entity_store::*;
