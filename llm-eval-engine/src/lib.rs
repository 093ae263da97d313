pub mod builtin;
pub mod engine;
pub mod error;
pub mod limiter;
pub mod output;
pub mod progress;
pub mod tasks;

pub use builtin::*;
pub use engine::*;
pub use error::*;
pub use limiter::*;
pub use output::*;
pub use progress::*;
pub use tasks::*;
