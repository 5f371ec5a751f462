pub mod config;
pub mod coordinator;
pub mod error;
pub mod http;
pub mod remote;
pub mod session;
pub mod synced;

#[cfg(test)]
pub(crate) mod testing;

pub use coordinator::SyncCoordinator;
pub use error::{Result, SyncError};
pub use session::SessionContext;
pub use synced::SyncedBoard;
