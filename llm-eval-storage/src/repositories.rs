pub mod project;
pub mod eval_name;
pub mod run;
pub mod result;

pub use project::*;
pub use eval_name::*;
pub use run::*;
pub use result::*;
