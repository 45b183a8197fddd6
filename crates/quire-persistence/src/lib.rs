//! Persistence layer for Quire documents.
//!
//! This crate turns document models into on-disk representations and back,
//! and writes them without ever leaving a half-written file behind.
//!
//! # Features
//!
//! - **Two representation forms**: flat byte blobs and directory packages
//! - **Atomic writes**: stage to a sibling temporary, then rename into place
//! - **Backup retention**: optionally keep the replaced file as `<name>~`
//! - **Pluggable file system**: real disk or an in-memory tree with fault injection
//!
//! # Example
//!
//! ```ignore
//! use std::rc::Rc;
//! use quire_persistence::{AtomicWriter, BackupPolicy, StdFileSystem, encode};
//!
//! let representation = encode(&model, &descriptor, "quire.text")?;
//! let writer = AtomicWriter::new(Rc::new(StdFileSystem));
//! writer.write(&representation, Path::new("notes.txt"), BackupPolicy::keep())?;
//! ```
//!
//! # Architecture
//!
//! - `codec.rs` - `PersistenceCodec` trait and type-checked encode/decode
//! - `fs/` - File-system collaborator trait and implementations
//! - `io/` - Atomic writer and representation reader
//! - `error.rs` - Error types with user-friendly messages

mod codec;
mod error;
mod fs;
mod io;

pub use codec::{PersistenceCodec, decode, encode};
pub use error::{PersistenceError, Result};
pub use fs::{DirEntry, Fault, FileSystem, MemoryFileSystem, StdFileSystem};
pub use io::{AtomicWriter, BackupPolicy, WriteReport, WriterOptions, read_representation};
