use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use botbrain_codec::Codec;
use botbrain_store::{Placement, StoreError, Transport, ValueKind};

use crate::config::BrainConfig;
use crate::error::{BrainError, BrainResult};
use crate::gate::{ConnectionState, ReadyGate};
use crate::namespace::KeyNamespace;

/// Namespaced persistent storage over a Redis-style key-value store.
///
/// Every operation follows the same template: await the readiness gate,
/// qualify the logical key, encode inputs, issue exactly one store
/// command, decode outputs. Operations awaited in sequence against the
/// same key reach the store in that sequence; concurrently fired
/// operations have no mutual ordering beyond the store's own.
///
/// Nothing is retried internally. Store and decode failures surface to
/// the caller of the individual operation; retry and timeout policy
/// belong to the host.
pub struct Brain {
    pub(crate) transport: Arc<dyn Transport>,
    pub(crate) gate: ReadyGate,
    pub(crate) ns: KeyNamespace,
    pub(crate) codec: Codec,
}

impl Brain {
    /// Build a brain over an externally supplied transport handle and
    /// start the connection handshake. Must be called from within a
    /// Tokio runtime.
    pub fn new(config: BrainConfig, transport: Arc<dyn Transport>) -> BrainResult<Self> {
        let ns = KeyNamespace::new(config.url.app_prefix.clone(), config.data_prefix.clone())?;
        let gate = ReadyGate::establish(Arc::clone(&transport), config.url.password.clone());
        Ok(Self {
            transport,
            gate,
            ns,
            codec: Codec::new(config.compact),
        })
    }

    /// Current state of the connection handshake.
    pub fn connection_state(&self) -> ConnectionState {
        self.gate.state()
    }

    /// The namespace this brain qualifies keys with.
    pub fn namespace(&self) -> &KeyNamespace {
        &self.ns
    }

    fn decode(&self, bytes: Option<Vec<u8>>) -> BrainResult<Value> {
        Ok(self.codec.decode(bytes.as_deref())?)
    }

    fn decode_all(&self, items: Vec<Vec<u8>>) -> BrainResult<Vec<Value>> {
        items
            .into_iter()
            .map(|bytes| self.decode(Some(bytes)))
            .collect()
    }

    // ---- scalars ----

    /// Fetch the value at `key`; `Value::Null` when absent.
    pub async fn get(&self, key: &str) -> BrainResult<Value> {
        self.gate.ready().await;
        let bytes = self.transport.get(&self.ns.key(key)).await?;
        self.decode(bytes)
    }

    /// Store a value at `key`.
    pub async fn set(&self, key: &str, value: &Value) -> BrainResult<()> {
        self.gate.ready().await;
        let bytes = self.codec.encode(value)?;
        Ok(self.transport.set(&self.ns.key(key), &bytes).await?)
    }

    /// Delete `key`; `true` when it existed.
    pub async fn remove(&self, key: &str) -> BrainResult<bool> {
        self.gate.ready().await;
        Ok(self.transport.del(&self.ns.key(key)).await?)
    }

    /// Whether `key` exists.
    pub async fn exists(&self, key: &str) -> BrainResult<bool> {
        self.gate.ready().await;
        Ok(self.transport.exists(&self.ns.key(key)).await?)
    }

    /// Add `delta` to the integer at `key` (absent counts as 0) and
    /// return the result. Non-integer content and 64-bit overflow fail
    /// with [`BrainError::NumericConversion`].
    pub async fn incr_by(&self, key: &str, delta: i64) -> BrainResult<i64> {
        self.gate.ready().await;
        match self.transport.incr_by(&self.ns.key(key), delta).await {
            Err(StoreError::NotAnInteger(_) | StoreError::Overflow(_)) => {
                Err(BrainError::NumericConversion {
                    key: key.to_string(),
                })
            }
            other => Ok(other?),
        }
    }

    // ---- lists ----

    /// Prepend a value; returns the new length.
    pub async fn lpush(&self, key: &str, value: &Value) -> BrainResult<u64> {
        self.gate.ready().await;
        let bytes = self.codec.encode(value)?;
        Ok(self.transport.lpush(&self.ns.key(key), &bytes).await?)
    }

    /// Append a value; returns the new length.
    pub async fn rpush(&self, key: &str, value: &Value) -> BrainResult<u64> {
        self.gate.ready().await;
        let bytes = self.codec.encode(value)?;
        Ok(self.transport.rpush(&self.ns.key(key), &bytes).await?)
    }

    /// Remove and return the first element; `Value::Null` when empty.
    pub async fn lpop(&self, key: &str) -> BrainResult<Value> {
        self.gate.ready().await;
        let bytes = self.transport.lpop(&self.ns.key(key)).await?;
        self.decode(bytes)
    }

    /// Remove and return the last element; `Value::Null` when empty.
    pub async fn rpop(&self, key: &str) -> BrainResult<Value> {
        self.gate.ready().await;
        let bytes = self.transport.rpop(&self.ns.key(key)).await?;
        self.decode(bytes)
    }

    /// Element at `index`; negative indices count from the end.
    pub async fn lindex(&self, key: &str, index: i64) -> BrainResult<Value> {
        self.gate.ready().await;
        let bytes = self.transport.lindex(&self.ns.key(key), index).await?;
        self.decode(bytes)
    }

    /// Elements from `start` through `end` inclusive; `-1` addresses the
    /// last element.
    pub async fn lrange(&self, key: &str, start: i64, end: i64) -> BrainResult<Vec<Value>> {
        self.gate.ready().await;
        let items = self.transport.lrange(&self.ns.key(key), start, end).await?;
        self.decode_all(items)
    }

    /// The whole list.
    pub async fn lgetall(&self, key: &str) -> BrainResult<Vec<Value>> {
        self.lrange(key, 0, -1).await
    }

    /// List length.
    pub async fn llen(&self, key: &str) -> BrainResult<u64> {
        self.gate.ready().await;
        Ok(self.transport.llen(&self.ns.key(key)).await?)
    }

    /// Insert `value` before or after the first element whose encoding
    /// equals `pivot`'s. Returns the new length, or -1 when the pivot is
    /// absent.
    pub async fn linsert(
        &self,
        key: &str,
        placement: Placement,
        pivot: &Value,
        value: &Value,
    ) -> BrainResult<i64> {
        self.gate.ready().await;
        let pivot = self.codec.encode(pivot)?;
        let value = self.codec.encode(value)?;
        Ok(self
            .transport
            .linsert(&self.ns.key(key), placement, &pivot, &value)
            .await?)
    }

    /// Overwrite the element at `index`.
    pub async fn lset(&self, key: &str, index: i64, value: &Value) -> BrainResult<()> {
        self.gate.ready().await;
        let bytes = self.codec.encode(value)?;
        Ok(self.transport.lset(&self.ns.key(key), index, &bytes).await?)
    }

    /// Remove every element whose encoding equals `value`'s; returns the
    /// number removed.
    pub async fn lrem(&self, key: &str, value: &Value) -> BrainResult<u64> {
        self.gate.ready().await;
        let bytes = self.codec.encode(value)?;
        Ok(self.transport.lrem(&self.ns.key(key), 0, &bytes).await?)
    }

    // ---- sets ----

    /// Add a member to the set.
    pub async fn sadd(&self, key: &str, value: &Value) -> BrainResult<()> {
        self.gate.ready().await;
        let bytes = self.codec.encode(value)?;
        self.transport.sadd(&self.ns.key(key), &bytes).await?;
        Ok(())
    }

    /// Remove a member; `true` when it was present.
    pub async fn srem(&self, key: &str, value: &Value) -> BrainResult<bool> {
        self.gate.ready().await;
        let bytes = self.codec.encode(value)?;
        Ok(self.transport.srem(&self.ns.key(key), &bytes).await?)
    }

    /// Whether the member is in the set.
    pub async fn sismember(&self, key: &str, value: &Value) -> BrainResult<bool> {
        self.gate.ready().await;
        let bytes = self.codec.encode(value)?;
        Ok(self.transport.sismember(&self.ns.key(key), &bytes).await?)
    }

    /// Set cardinality.
    pub async fn scard(&self, key: &str) -> BrainResult<u64> {
        self.gate.ready().await;
        Ok(self.transport.scard(&self.ns.key(key)).await?)
    }

    /// Remove and return a random member; `Value::Null` when empty.
    pub async fn spop(&self, key: &str) -> BrainResult<Value> {
        self.gate.ready().await;
        let bytes = self.transport.spop(&self.ns.key(key)).await?;
        self.decode(bytes)
    }

    /// Return a random member without removing it.
    pub async fn srandmember(&self, key: &str) -> BrainResult<Value> {
        self.gate.ready().await;
        let bytes = self.transport.srandmember(&self.ns.key(key)).await?;
        self.decode(bytes)
    }

    /// All members, unordered.
    pub async fn smembers(&self, key: &str) -> BrainResult<Vec<Value>> {
        self.gate.ready().await;
        let items = self.transport.smembers(&self.ns.key(key)).await?;
        self.decode_all(items)
    }

    // ---- hashes ----

    /// Field names of the hash at `table`.
    pub async fn hkeys(&self, table: &str) -> BrainResult<Vec<String>> {
        self.gate.ready().await;
        Ok(self.transport.hkeys(&self.ns.key(table)).await?)
    }

    /// Field values of the hash at `table`.
    pub async fn hvals(&self, table: &str) -> BrainResult<Vec<Value>> {
        self.gate.ready().await;
        let items = self.transport.hvals(&self.ns.key(table)).await?;
        self.decode_all(items)
    }

    /// Number of fields.
    pub async fn hlen(&self, table: &str) -> BrainResult<u64> {
        self.gate.ready().await;
        Ok(self.transport.hlen(&self.ns.key(table)).await?)
    }

    /// Set one field.
    pub async fn hset(&self, table: &str, field: &str, value: &Value) -> BrainResult<()> {
        self.gate.ready().await;
        let bytes = self.codec.encode(value)?;
        self.transport.hset(&self.ns.key(table), field, &bytes).await?;
        Ok(())
    }

    /// Fetch one field; `Value::Null` when absent.
    pub async fn hget(&self, table: &str, field: &str) -> BrainResult<Value> {
        self.gate.ready().await;
        let bytes = self.transport.hget(&self.ns.key(table), field).await?;
        self.decode(bytes)
    }

    /// Delete one field; `true` when it existed.
    pub async fn hdel(&self, table: &str, field: &str) -> BrainResult<bool> {
        self.gate.ready().await;
        Ok(self.transport.hdel(&self.ns.key(table), field).await?)
    }

    /// The whole hash as a field-to-value mapping.
    pub async fn hgetall(&self, table: &str) -> BrainResult<BTreeMap<String, Value>> {
        self.gate.ready().await;
        let pairs = self.transport.hgetall(&self.ns.key(table)).await?;
        pairs
            .into_iter()
            .map(|(field, bytes)| Ok((field, self.decode(Some(bytes))?)))
            .collect()
    }

    /// Add `delta` to the integer at one hash field; semantics as
    /// [`incr_by`](Self::incr_by).
    pub async fn hincr_by(&self, table: &str, field: &str, delta: i64) -> BrainResult<i64> {
        self.gate.ready().await;
        match self
            .transport
            .hincr_by(&self.ns.key(table), field, delta)
            .await
        {
            Err(StoreError::NotAnInteger(_) | StoreError::Overflow(_)) => {
                Err(BrainError::NumericConversion {
                    key: format!("{table}.{field}"),
                })
            }
            other => Ok(other?),
        }
    }

    // ---- keyspace ----

    /// Logical data keys starting with `search`, namespace stripped.
    pub async fn keys(&self, search: &str) -> BrainResult<Vec<String>> {
        self.gate.ready().await;
        let pattern = format!("{}*", self.ns.key(search));
        let found = self.transport.keys(&pattern).await?;
        Ok(found.iter().map(|k| self.ns.unkey(k)).collect())
    }

    /// Store-native type name of a data key. Scalar string entries hold
    /// any encoded structure, so they are reported as `"object"`.
    pub async fn value_type(&self, key: &str) -> BrainResult<String> {
        self.gate.ready().await;
        let kind = self.transport.value_type(&self.ns.key(key)).await?;
        Ok(match kind {
            ValueKind::String => "object".to_string(),
            other => other.as_str().to_string(),
        })
    }

    /// Type names for several keys, queried sequentially.
    pub async fn value_types(&self, keys: &[&str]) -> BrainResult<Vec<String>> {
        let mut out = Vec::with_capacity(keys.len());
        for key in keys {
            out.push(self.value_type(key).await?);
        }
        Ok(out)
    }

    /// Delete every data key, one delete per key.
    ///
    /// Not atomic: a concurrent writer can reintroduce a key between the
    /// enumeration and its delete. The user directory lives outside the
    /// data tree and is never touched.
    pub async fn reset(&self) -> BrainResult<()> {
        let keys = self.keys("").await?;
        debug!(count = keys.len(), "resetting data keys");
        for key in &keys {
            self.remove(key).await?;
        }
        Ok(())
    }

    /// Tear down the transport. Terminal; subsequent operations pend on
    /// the gate forever.
    pub async fn close(&self) -> BrainResult<()> {
        self.transport.close().await?;
        self.gate.publish_closed();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use serde_json::json;
    use tokio::time::timeout;

    use botbrain_store::{MemoryStore, StoreCommands};

    use crate::config::StoreUrl;

    fn test_config() -> BrainConfig {
        BrainConfig {
            url: StoreUrl::parse("redis://localhost:6379/app").unwrap(),
            data_prefix: "data".to_string(),
            compact: true,
        }
    }

    fn test_brain() -> (Brain, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let brain = Brain::new(test_config(), store.clone()).unwrap();
        (brain, store)
    }

    // -----------------------------------------------------------------------
    // Scalars
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn set_get_round_trip() {
        let (brain, _) = test_brain();
        let value = json!({"quote": "ship it", "by": "alice"});
        brain.set("quotes", &value).await.unwrap();
        assert_eq!(brain.get("quotes").await.unwrap(), value);
    }

    #[tokio::test]
    async fn get_missing_is_null() {
        let (brain, _) = test_brain();
        assert_eq!(brain.get("nope").await.unwrap(), Value::Null);
    }

    #[tokio::test]
    async fn keys_are_namespaced() {
        let (brain, store) = test_brain();
        brain.set("quotes", &json!(1)).await.unwrap();
        // The store sees the fully-qualified key, not the logical one.
        assert!(store.exists("app:data:quotes").await.unwrap());
        assert!(!store.exists("quotes").await.unwrap());
    }

    #[tokio::test]
    async fn remove_and_exists() {
        let (brain, _) = test_brain();
        brain.set("k", &json!("v")).await.unwrap();
        assert!(brain.exists("k").await.unwrap());
        assert!(brain.remove("k").await.unwrap());
        assert!(!brain.exists("k").await.unwrap());
        assert!(!brain.remove("k").await.unwrap());
    }

    #[tokio::test]
    async fn incr_by_initializes_and_counts() {
        let (brain, _) = test_brain();
        assert_eq!(brain.incr_by("counter", 5).await.unwrap(), 5);
        assert_eq!(brain.incr_by("counter", 5).await.unwrap(), 10);
    }

    #[tokio::test]
    async fn incr_by_non_numeric_fails() {
        let (brain, _) = test_brain();
        brain.set("counter", &json!("words")).await.unwrap();
        assert!(matches!(
            brain.incr_by("counter", 1).await,
            Err(BrainError::NumericConversion { .. })
        ));
    }

    #[tokio::test]
    async fn incr_by_overflow_fails() {
        let (brain, _) = test_brain();
        assert_eq!(brain.incr_by("counter", i64::MAX).await.unwrap(), i64::MAX);
        assert!(matches!(
            brain.incr_by("counter", 1).await,
            Err(BrainError::NumericConversion { .. })
        ));
        assert!(matches!(
            brain.hincr_by("scores", "x", i64::MIN).await,
            Ok(v) if v == i64::MIN
        ));
        assert!(matches!(
            brain.hincr_by("scores", "x", -1).await,
            Err(BrainError::NumericConversion { .. })
        ));
    }

    #[tokio::test]
    async fn text_mode_surfaces_decode_errors() {
        let store = Arc::new(MemoryStore::new());
        let config = BrainConfig {
            compact: false,
            ..test_config()
        };
        let brain = Brain::new(config, store.clone()).unwrap();
        store.set("app:data:k", b"{not json").await.unwrap();
        assert!(matches!(
            brain.get("k").await,
            Err(BrainError::Deserialization(_))
        ));
    }

    // -----------------------------------------------------------------------
    // Lists
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn rpush_lpop_is_fifo() {
        let (brain, _) = test_brain();
        brain.rpush("q", &json!("a")).await.unwrap();
        brain.rpush("q", &json!("b")).await.unwrap();
        assert_eq!(brain.lpop("q").await.unwrap(), json!("a"));
        assert_eq!(brain.lpop("q").await.unwrap(), json!("b"));
        assert_eq!(brain.lpop("q").await.unwrap(), Value::Null);
    }

    #[tokio::test]
    async fn lpush_lpop_is_lifo() {
        let (brain, _) = test_brain();
        brain.lpush("s", &json!("a")).await.unwrap();
        brain.lpush("s", &json!("b")).await.unwrap();
        assert_eq!(brain.lpop("s").await.unwrap(), json!("b"));
        assert_eq!(brain.lpop("s").await.unwrap(), json!("a"));
    }

    #[tokio::test]
    async fn list_access_and_mutation() {
        let (brain, _) = test_brain();
        for v in ["a", "b", "c"] {
            brain.rpush("l", &json!(v)).await.unwrap();
        }
        assert_eq!(brain.llen("l").await.unwrap(), 3);
        assert_eq!(brain.lindex("l", 1).await.unwrap(), json!("b"));
        assert_eq!(
            brain.lgetall("l").await.unwrap(),
            vec![json!("a"), json!("b"), json!("c")]
        );
        assert_eq!(
            brain.lrange("l", 1, -1).await.unwrap(),
            vec![json!("b"), json!("c")]
        );

        brain.lset("l", 0, &json!("z")).await.unwrap();
        assert_eq!(brain.lindex("l", 0).await.unwrap(), json!("z"));
    }

    #[tokio::test]
    async fn linsert_matches_by_encoding() {
        let (brain, _) = test_brain();
        brain.rpush("l", &json!({"id": 1})).await.unwrap();
        brain.rpush("l", &json!({"id": 3})).await.unwrap();
        // Pivot equality is over the serialized form of the value.
        let len = brain
            .linsert("l", Placement::Before, &json!({"id": 3}), &json!({"id": 2}))
            .await
            .unwrap();
        assert_eq!(len, 3);
        assert_eq!(brain.lindex("l", 1).await.unwrap(), json!({"id": 2}));
    }

    #[tokio::test]
    async fn lrem_removes_all_matches() {
        let (brain, _) = test_brain();
        for v in ["x", "a", "x"] {
            brain.rpush("l", &json!(v)).await.unwrap();
        }
        assert_eq!(brain.lrem("l", &json!("x")).await.unwrap(), 2);
        assert_eq!(brain.lgetall("l").await.unwrap(), vec![json!("a")]);
    }

    // -----------------------------------------------------------------------
    // Sets
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn set_operations() {
        let (brain, _) = test_brain();
        brain.sadd("tags", &json!("rust")).await.unwrap();
        brain.sadd("tags", &json!("bots")).await.unwrap();
        brain.sadd("tags", &json!("rust")).await.unwrap();

        assert_eq!(brain.scard("tags").await.unwrap(), 2);
        assert!(brain.sismember("tags", &json!("rust")).await.unwrap());
        assert!(!brain.sismember("tags", &json!("java")).await.unwrap());

        let peeked = brain.srandmember("tags").await.unwrap();
        assert!(brain.sismember("tags", &peeked).await.unwrap());

        assert!(brain.srem("tags", &json!("rust")).await.unwrap());
        assert_eq!(brain.scard("tags").await.unwrap(), 1);

        let popped = brain.spop("tags").await.unwrap();
        assert_eq!(popped, json!("bots"));
        assert_eq!(brain.spop("tags").await.unwrap(), Value::Null);
    }

    #[tokio::test]
    async fn smembers_decodes_structures() {
        let (brain, _) = test_brain();
        brain.sadd("s", &json!({"n": 1})).await.unwrap();
        brain.sadd("s", &json!({"n": 2})).await.unwrap();
        let mut members = brain.smembers("s").await.unwrap();
        members.sort_by_key(|v| v["n"].as_i64());
        assert_eq!(members, vec![json!({"n": 1}), json!({"n": 2})]);
    }

    // -----------------------------------------------------------------------
    // Hashes
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn hash_operations() {
        let (brain, _) = test_brain();
        brain.hset("prefs", "color", &json!("green")).await.unwrap();
        brain.hset("prefs", "volume", &json!([1, 2])).await.unwrap();

        assert_eq!(brain.hget("prefs", "color").await.unwrap(), json!("green"));
        assert_eq!(brain.hget("prefs", "nope").await.unwrap(), Value::Null);
        assert_eq!(brain.hlen("prefs").await.unwrap(), 2);
        assert_eq!(brain.hkeys("prefs").await.unwrap(), vec!["color", "volume"]);
        assert_eq!(brain.hvals("prefs").await.unwrap().len(), 2);

        let all = brain.hgetall("prefs").await.unwrap();
        assert_eq!(all["color"], json!("green"));
        assert_eq!(all["volume"], json!([1, 2]));

        assert!(brain.hdel("prefs", "color").await.unwrap());
        assert!(!brain.hdel("prefs", "color").await.unwrap());
    }

    #[tokio::test]
    async fn hincr_by_semantics() {
        let (brain, _) = test_brain();
        assert_eq!(brain.hincr_by("scores", "alice", 3).await.unwrap(), 3);
        assert_eq!(brain.hincr_by("scores", "alice", 4).await.unwrap(), 7);

        brain.hset("scores", "bob", &json!("n/a")).await.unwrap();
        assert!(matches!(
            brain.hincr_by("scores", "bob", 1).await,
            Err(BrainError::NumericConversion { .. })
        ));
    }

    // -----------------------------------------------------------------------
    // Keyspace
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn keys_strips_namespace() {
        let (brain, _) = test_brain();
        brain.set("quotes", &json!(1)).await.unwrap();
        brain.set("quips", &json!(2)).await.unwrap();
        brain.set("other", &json!(3)).await.unwrap();

        let mut all = brain.keys("").await.unwrap();
        all.sort();
        assert_eq!(all, vec!["other", "quips", "quotes"]);

        let qu = brain.keys("qu").await.unwrap();
        assert_eq!(qu, vec!["quips", "quotes"]);
    }

    #[tokio::test]
    async fn value_type_reports_object_for_strings() {
        let (brain, _) = test_brain();
        brain.set("scalar", &json!({"any": "shape"})).await.unwrap();
        brain.rpush("list", &json!(1)).await.unwrap();
        brain.sadd("set", &json!(1)).await.unwrap();
        brain.hset("hash", "f", &json!(1)).await.unwrap();

        assert_eq!(brain.value_type("scalar").await.unwrap(), "object");
        assert_eq!(brain.value_type("missing").await.unwrap(), "none");
        assert_eq!(
            brain
                .value_types(&["scalar", "list", "set", "hash"])
                .await
                .unwrap(),
            vec!["object", "list", "set", "hash"]
        );
    }

    #[tokio::test]
    async fn reset_clears_data_only() {
        let (brain, store) = test_brain();
        brain.set("a", &json!(1)).await.unwrap();
        brain.rpush("b", &json!(2)).await.unwrap();
        // Simulate the user directory living outside the data tree.
        store.hset("app:users", "u1", b"{}").await.unwrap();

        brain.reset().await.unwrap();

        assert!(brain.keys("").await.unwrap().is_empty());
        assert!(store.exists("app:users").await.unwrap());
    }

    // -----------------------------------------------------------------------
    // Readiness
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn no_command_before_ready() {
        // A transport that refuses connections answers any issued command
        // with an immediate error. The operation staying pending therefore
        // proves no command was sent before the gate resolved.
        let store = Arc::new(MemoryStore::refusing_connections());
        let brain = Brain::new(test_config(), store).unwrap();
        let result = timeout(Duration::from_millis(50), brain.get("k")).await;
        assert!(result.is_err(), "operation must stay pending, not error");
    }

    #[tokio::test]
    async fn operations_wait_for_auth() {
        let store = Arc::new(MemoryStore::with_password("sekrit"));
        let config = BrainConfig {
            url: StoreUrl::parse("redis://:sekrit@localhost:6379/app").unwrap(),
            ..test_config()
        };
        let brain = Brain::new(config, store).unwrap();
        brain.set("k", &json!({"n": 1})).await.unwrap();
        assert_eq!(brain.get("k").await.unwrap(), json!({"n": 1}));
    }

    #[tokio::test]
    async fn close_is_terminal() {
        let (brain, _) = test_brain();
        brain.set("k", &json!(1)).await.unwrap();
        brain.close().await.unwrap();
        assert_eq!(brain.connection_state(), ConnectionState::Closed);
        // Operations after close pend on the gate forever.
        let result = timeout(Duration::from_millis(50), brain.get("k")).await;
        assert!(result.is_err());
    }
}
