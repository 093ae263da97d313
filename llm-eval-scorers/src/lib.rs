pub mod string;
pub mod json;
pub mod aggregators;

pub use string::*;
pub use json::*;
pub use aggregators::*;
