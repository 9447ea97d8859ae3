pub mod curated;
pub mod entity;
pub mod protocol;
pub mod subgraph_data;

pub use curated::*;
pub use entity::*;
pub use protocol::*;
pub use subgraph_data::*;
