pub mod ids;
pub mod config;
pub mod data_item;
pub mod score;
pub mod project;
pub mod run;
pub mod result;

pub use ids::*;
pub use config::*;
pub use data_item::*;
pub use score::*;
pub use project::*;
pub use run::*;
pub use result::*;
