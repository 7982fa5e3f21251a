pub mod batcher;
pub mod cache;
pub mod config;
pub mod decoder;
pub mod error;
pub mod gate;
pub mod requirements;
pub mod retry;
pub mod rpc;
pub mod server;
pub mod snapshot;

pub use error::GateError;
pub use gate::{BountyPermissions, EventManagementPermissions, TokenGate};
pub use snapshot::EntitlementSnapshot;
