//! Single-process simulator of a chord ring: consistent hashing of keys
//! onto a circular identifier space, finger-table routing, and dynamic
//! membership with key migration. All members live in one process and are
//! addressed by id through a shared directory.

pub mod constants;
pub mod directory;
pub mod error;
pub mod export;
pub mod network;
pub mod node;
pub mod space;
pub mod stabilizer;

pub use directory::Directory;
pub use error::NetworkError;
pub use export::{FingerEntry, KeyEntry, NodeExport};
pub use network::{DataLocation, Network, NetworkSummary};
pub use node::{Node, NodeState};
pub use space::IdentifierSpace;
pub use stabilizer::Stabilizer;
