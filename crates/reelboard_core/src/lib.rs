pub mod board;
pub mod command;
pub mod edit;
pub mod error;
pub mod ordering;
pub mod types;

pub use error::{CoreError, Result};
