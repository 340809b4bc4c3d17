//! Backing-store command surface for the botbrain adapter.
//!
//! The adapter consumes a Redis-style key-value store through two traits:
//!
//! - [`StoreCommands`]: one async method per store command (strings,
//!   lists, sets, hashes, plus `keys` and `type`), byte-oriented
//! - [`Transport`]: adds the connection lifecycle (`connect`, `auth`,
//!   `close`) the readiness gate drives
//!
//! The wire protocol is deliberately absent: the host hands the adapter a
//! `Transport` implementation wrapping whatever client it already uses.
//! [`MemoryStore`] is the bundled in-memory implementation for tests and
//! embedding.

pub mod error;
pub mod memory;
pub mod traits;
pub mod types;

pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use traits::{StoreCommands, Transport};
pub use types::{Placement, ValueKind};
