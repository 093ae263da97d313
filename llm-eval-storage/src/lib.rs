pub mod postgres;
pub mod repositories;
pub mod store;
pub mod memory;

pub use repositories::*;
pub use store::*;
pub use memory::*;
