//! Namespaced persistent storage ("brain") for chat bots, backed by a
//! Redis-style key-value store.
//!
//! A [`Brain`] partitions one shared keyspace into an application-data
//! tree (`app:data:<key>`) and a reserved user directory (`app:users`),
//! offers typed collection operations over the store's scalar, list, set
//! and hash primitives, and resolves known users by id or by exact/fuzzy
//! display name.
//!
//! Values are [`serde_json::Value`] trees, encoded by [`botbrain_codec`]
//! as MessagePack (compact mode, default) or JSON text. The backing store
//! is reached through the [`botbrain_store::Transport`] trait; no sockets
//! are opened here. A connection readiness gate sequences every operation
//! behind connect-then-authenticate:
//!
//! ```no_run
//! use std::sync::Arc;
//! use botbrain::{Brain, BrainConfig};
//! use botbrain_store::MemoryStore;
//!
//! # async fn demo() -> botbrain::BrainResult<()> {
//! let config = BrainConfig::from_env_lookup(|var| std::env::var(var).ok())?;
//! let brain = Brain::new(config, Arc::new(MemoryStore::new()))?;
//! brain.set("greeting", &serde_json::json!("hello")).await?;
//! # Ok(())
//! # }
//! ```

pub mod brain;
pub mod config;
pub mod error;
pub mod gate;
pub mod namespace;
pub mod users;

pub use brain::Brain;
pub use config::{BrainConfig, StoreUrl, DATA_PREFIX_ENV_VAR, DEFAULT_URL, URL_ENV_VARS};
pub use error::{BrainError, BrainResult};
pub use gate::{ConnectionState, ReadyGate};
pub use namespace::{KeyNamespace, KEY_SEPARATOR};
pub use users::{User, UserContext};

// The value union stored values decode into.
pub use serde_json::Value;
