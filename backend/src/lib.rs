pub mod config;
pub mod dispatcher;
pub mod error;
pub mod hub;
pub mod memory;
pub mod registry;
pub mod store;
pub mod ws;

pub use config::{ConfigError, ServerConfig};
pub use dispatcher::Dispatcher;
pub use error::{SessionError, SessionResult, StoreError, StoreResult};
pub use hub::{MatchSession, SessionHub};
pub use memory::MemoryStore;
pub use registry::{Connection, ConnectionId, SessionRegistry};
pub use store::{GameStore, Identity, IdentityResolver, MatchRecord, MatchStore, Role};
