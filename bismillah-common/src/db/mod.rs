//! Database initialization and key/value access

pub mod init;
pub mod kv;

pub use init::*;
pub use kv::KvStore;
