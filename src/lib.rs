//! Book catalog application library
//!
//! Application modules mounted by the HTTP server; the binary wires them to PostgreSQL.

pub mod modules;

/// Re-export commonly used types
pub use modules::*;
