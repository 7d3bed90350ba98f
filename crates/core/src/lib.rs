//! # waystone-core: Migration Engine
//!
//! Applies versioned SQL schema-migration files to a SQLite database exactly
//! once, tracking what has been applied in a ledger table.
//!
//! The engine is deliberately small: list candidate files, diff them against
//! the ledger, execute what remains in version order, record each success.
//! Every operation takes its database handle explicitly and returns
//! [`MigrateResult`]; nothing in this crate terminates the process.

pub mod database;
pub mod definitions;
pub mod diff;
pub mod error;
pub mod ledger;
pub mod runner;
pub mod source;

// Re-export core types and entry points
pub use database::*;
pub use definitions::*;
pub use diff::*;
pub use error::*;
pub use ledger::*;
pub use runner::*;
pub use source::*;
