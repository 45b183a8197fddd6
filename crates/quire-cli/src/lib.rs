//! Library half of the `quire` command line.
//!
//! - `logging` - subscriber setup for the binary
//! - `session` - headless presenter and document dispatch
//! - `commands` - one function per subcommand

pub mod commands;
pub mod logging;
pub mod session;
