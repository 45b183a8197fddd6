//! File I/O operations for document persistence.
//!
//! This module handles:
//! - Writing representations with atomic replace and optional backups
//! - Reading representations back in the form a document type declares

mod read;
mod write;

pub use read::read_representation;
pub use write::{AtomicWriter, BackupPolicy, WriteReport, WriterOptions};
