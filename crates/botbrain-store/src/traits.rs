use async_trait::async_trait;

use crate::error::StoreResult;
use crate::types::{Placement, ValueKind};

/// Command surface of the backing key-value store.
///
/// One method per store command, with standard Redis-style semantics.
/// Payloads are opaque byte strings; interpretation (serialization,
/// namespacing) happens in the layers above.
///
/// Implementations must satisfy:
/// - Commands against the same key from the same caller, awaited in
///   sequence, are observed in that sequence.
/// - A command addressed at a key of the wrong collection kind fails
///   with `StoreError::WrongKind`, never silently coerces.
/// - All backend errors are propagated, never swallowed.
#[async_trait]
pub trait StoreCommands: Send + Sync {
    // ---- strings ----

    /// Fetch a value. `Ok(None)` when the key is missing.
    async fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>>;

    /// Store a value, replacing any existing one.
    async fn set(&self, key: &str, value: &[u8]) -> StoreResult<()>;

    /// Delete a key of any kind. Returns `true` when a key was removed.
    async fn del(&self, key: &str) -> StoreResult<bool>;

    /// Whether the key exists, regardless of kind.
    async fn exists(&self, key: &str) -> StoreResult<bool>;

    /// Add `delta` to the integer stored at `key` and return the result.
    ///
    /// An absent key counts as 0. Content that is not an integer string
    /// fails with `StoreError::NotAnInteger`.
    async fn incr_by(&self, key: &str, delta: i64) -> StoreResult<i64>;

    // ---- lists ----

    /// Prepend a value; returns the new list length.
    async fn lpush(&self, key: &str, value: &[u8]) -> StoreResult<u64>;

    /// Append a value; returns the new list length.
    async fn rpush(&self, key: &str, value: &[u8]) -> StoreResult<u64>;

    /// Remove and return the first element.
    async fn lpop(&self, key: &str) -> StoreResult<Option<Vec<u8>>>;

    /// Remove and return the last element.
    async fn rpop(&self, key: &str) -> StoreResult<Option<Vec<u8>>>;

    /// Element at `index`; negative indices count from the end.
    async fn lindex(&self, key: &str, index: i64) -> StoreResult<Option<Vec<u8>>>;

    /// Elements from `start` through `end`, both inclusive; `-1` addresses
    /// the last element.
    async fn lrange(&self, key: &str, start: i64, end: i64) -> StoreResult<Vec<Vec<u8>>>;

    /// List length; 0 for a missing key.
    async fn llen(&self, key: &str) -> StoreResult<u64>;

    /// Insert `value` before or after the first element equal to `pivot`.
    ///
    /// Returns the new length, or -1 when the pivot was not found.
    async fn linsert(
        &self,
        key: &str,
        placement: Placement,
        pivot: &[u8],
        value: &[u8],
    ) -> StoreResult<i64>;

    /// Overwrite the element at `index`; out-of-range indices fail with
    /// `StoreError::IndexOutOfRange`.
    async fn lset(&self, key: &str, index: i64, value: &[u8]) -> StoreResult<()>;

    /// Remove elements equal to `value`. `count` 0 removes every match;
    /// positive removes from the head, negative from the tail. Returns the
    /// number removed.
    async fn lrem(&self, key: &str, count: i64, value: &[u8]) -> StoreResult<u64>;

    // ---- sets ----

    /// Add a member; returns `true` when it was not already present.
    async fn sadd(&self, key: &str, member: &[u8]) -> StoreResult<bool>;

    /// Remove a member; returns `true` when it was present.
    async fn srem(&self, key: &str, member: &[u8]) -> StoreResult<bool>;

    /// Whether the member is in the set.
    async fn sismember(&self, key: &str, member: &[u8]) -> StoreResult<bool>;

    /// Set cardinality; 0 for a missing key.
    async fn scard(&self, key: &str) -> StoreResult<u64>;

    /// Remove and return an arbitrary member.
    async fn spop(&self, key: &str) -> StoreResult<Option<Vec<u8>>>;

    /// Return an arbitrary member without removing it.
    async fn srandmember(&self, key: &str) -> StoreResult<Option<Vec<u8>>>;

    /// All members, in no particular order.
    async fn smembers(&self, key: &str) -> StoreResult<Vec<Vec<u8>>>;

    // ---- hashes ----

    /// Set a field; returns `true` when the field was newly created.
    async fn hset(&self, key: &str, field: &str, value: &[u8]) -> StoreResult<bool>;

    /// Fetch a field. `Ok(None)` when the key or field is missing.
    async fn hget(&self, key: &str, field: &str) -> StoreResult<Option<Vec<u8>>>;

    /// Delete a field; returns `true` when it existed.
    async fn hdel(&self, key: &str, field: &str) -> StoreResult<bool>;

    /// All field names.
    async fn hkeys(&self, key: &str) -> StoreResult<Vec<String>>;

    /// All field values.
    async fn hvals(&self, key: &str) -> StoreResult<Vec<Vec<u8>>>;

    /// Number of fields; 0 for a missing key.
    async fn hlen(&self, key: &str) -> StoreResult<u64>;

    /// All field/value pairs.
    async fn hgetall(&self, key: &str) -> StoreResult<Vec<(String, Vec<u8>)>>;

    /// Like `incr_by`, scoped to one hash field.
    async fn hincr_by(&self, key: &str, field: &str, delta: i64) -> StoreResult<i64>;

    // ---- generic ----

    /// Keys matching `pattern`. Only the trailing-`*` glob form is
    /// required; everything else is an exact match.
    async fn keys(&self, pattern: &str) -> StoreResult<Vec<String>>;

    /// Collection kind of the key; `ValueKind::None` when missing.
    async fn value_type(&self, key: &str) -> StoreResult<ValueKind>;
}

/// A store handle with a connection lifecycle.
///
/// The readiness gate drives `connect` and (when a credential is
/// configured) `auth` exactly once before any command is issued; `close`
/// is terminal. The wire protocol behind these calls is the host's
/// concern; this crate never opens sockets itself.
#[async_trait]
pub trait Transport: StoreCommands {
    /// Establish the connection to the store.
    async fn connect(&self) -> StoreResult<()>;

    /// Authenticate with the given password.
    async fn auth(&self, password: &str) -> StoreResult<()>;

    /// Tear the connection down. No commands may follow.
    async fn close(&self) -> StoreResult<()>;
}
