//! SQLite persistence of a measurement store

pub mod init;
pub mod persist;

pub use init::*;
pub use persist::*;
