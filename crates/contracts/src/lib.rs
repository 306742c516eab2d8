//! # Contracts
//!
//! Frozen interface contracts shared by every crate in the workspace.
//! Business crates depend only on this crate, never on each other's internals.
//!
//! ## Data Model
//! - `HeroRecord` is identified by its server-assigned `id`
//! - Transport, search and log-sink capabilities are traits so that real and
//!   in-memory implementations can be swapped freely

mod config;
mod error;
mod hero;
mod message;
mod search;
mod transport;

pub use config::*;
pub use error::*;
pub use hero::*;
pub use message::{MessageSink, SharedMessageSink};
pub use search::*;
pub use transport::*;
