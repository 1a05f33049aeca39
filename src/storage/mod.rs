//! Storage for trust records and the audit log.
//!
//! The traits define the abstract interface for storage backends; the
//! in-memory implementations back the default engine.

mod memory;
mod traits;

pub use memory::{InMemoryAuditLog, InMemoryRecordStore};
pub use traits::{AuditLog, AuditQuery, StorageError, TrustRecordStore};
