pub mod command;
pub mod error;
pub mod types;

pub use error::{ReadyError, Result};
pub use types::{CheckResult, Category, Details};
