use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;

use crate::error::{StoreError, StoreResult};
use crate::traits::{StoreCommands, Transport};
use crate::types::{Placement, ValueKind};

/// One keyed entry, tagged by collection kind.
#[derive(Clone, Debug)]
enum Entry {
    Str(Vec<u8>),
    List(VecDeque<Vec<u8>>),
    Set(HashSet<Vec<u8>>),
    Hash(BTreeMap<String, Vec<u8>>),
}

impl Entry {
    fn kind(&self) -> ValueKind {
        match self {
            Entry::Str(_) => ValueKind::String,
            Entry::List(_) => ValueKind::List,
            Entry::Set(_) => ValueKind::Set,
            Entry::Hash(_) => ValueKind::Hash,
        }
    }
}

fn wrong_kind(key: &str, expected: ValueKind, found: ValueKind) -> StoreError {
    StoreError::WrongKind {
        key: key.to_string(),
        expected,
        found,
    }
}

fn parse_int(key: &str, bytes: &[u8]) -> StoreResult<i64> {
    std::str::from_utf8(bytes)
        .ok()
        .and_then(|s| s.parse::<i64>().ok())
        .ok_or_else(|| StoreError::NotAnInteger(key.to_string()))
}

/// Clamp an inclusive `(start, end)` range with negative-from-the-end
/// indices to concrete bounds. Returns `None` when the range is empty.
fn resolve_range(len: usize, start: i64, end: i64) -> Option<(usize, usize)> {
    let len = len as i64;
    let start = if start < 0 { (len + start).max(0) } else { start };
    let end = if end < 0 { len + end } else { end.min(len - 1) };
    if start > end || start >= len || end < 0 {
        return None;
    }
    Some((start as usize, end as usize))
}

fn resolve_index(len: usize, index: i64) -> Option<usize> {
    let len = len as i64;
    let index = if index < 0 { len + index } else { index };
    (0..len).contains(&index).then_some(index as usize)
}

/// In-memory, HashMap-based store implementing the full [`Transport`]
/// surface.
///
/// Intended for tests and embedding: the entire adapter can run against
/// it hermetically. All entries live behind a `RwLock`; values are cloned
/// on read and write. Empty collections are dropped from the keyspace,
/// matching Redis.
///
/// The constructors select a connection posture. [`MemoryStore::new`]
/// starts ready; the others let tests exercise the readiness protocol:
/// every command fails with `NotConnected` until `connect()` has run, and
/// with `AuthRequired` until `auth()` succeeded when a password is set.
pub struct MemoryStore {
    entries: RwLock<HashMap<String, Entry>>,
    password: Option<String>,
    refuse_connect: bool,
    connected: AtomicBool,
    authed: AtomicBool,
}

impl MemoryStore {
    /// A store that is already connected and needs no authentication.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            password: None,
            refuse_connect: false,
            connected: AtomicBool::new(true),
            authed: AtomicBool::new(true),
        }
    }

    /// A store that refuses commands until `connect()` has run.
    pub fn disconnected() -> Self {
        Self {
            connected: AtomicBool::new(false),
            ..Self::new()
        }
    }

    /// A store that additionally requires `auth()` with this password.
    pub fn with_password(password: impl Into<String>) -> Self {
        Self {
            password: Some(password.into()),
            connected: AtomicBool::new(false),
            authed: AtomicBool::new(false),
            ..Self::new()
        }
    }

    /// A store whose `connect()` always fails.
    pub fn refusing_connections() -> Self {
        Self {
            refuse_connect: true,
            ..Self::disconnected()
        }
    }

    /// Number of keys currently stored.
    pub fn len(&self) -> usize {
        self.entries.read().expect("lock poisoned").len()
    }

    /// Returns `true` if the keyspace is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.read().expect("lock poisoned").is_empty()
    }

    fn guard(&self) -> StoreResult<()> {
        if !self.connected.load(Ordering::SeqCst) {
            return Err(StoreError::NotConnected);
        }
        if self.password.is_some() && !self.authed.load(Ordering::SeqCst) {
            return Err(StoreError::AuthRequired);
        }
        Ok(())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore")
            .field("key_count", &self.len())
            .field("connected", &self.connected.load(Ordering::SeqCst))
            .finish()
    }
}

#[async_trait]
impl StoreCommands for MemoryStore {
    // ---- strings ----

    async fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        self.guard()?;
        let map = self.entries.read().expect("lock poisoned");
        match map.get(key) {
            None => Ok(None),
            Some(Entry::Str(bytes)) => Ok(Some(bytes.clone())),
            Some(other) => Err(wrong_kind(key, ValueKind::String, other.kind())),
        }
    }

    async fn set(&self, key: &str, value: &[u8]) -> StoreResult<()> {
        self.guard()?;
        let mut map = self.entries.write().expect("lock poisoned");
        // SET replaces the key whatever kind it held before.
        map.insert(key.to_string(), Entry::Str(value.to_vec()));
        Ok(())
    }

    async fn del(&self, key: &str) -> StoreResult<bool> {
        self.guard()?;
        let mut map = self.entries.write().expect("lock poisoned");
        Ok(map.remove(key).is_some())
    }

    async fn exists(&self, key: &str) -> StoreResult<bool> {
        self.guard()?;
        let map = self.entries.read().expect("lock poisoned");
        Ok(map.contains_key(key))
    }

    async fn incr_by(&self, key: &str, delta: i64) -> StoreResult<i64> {
        self.guard()?;
        let mut map = self.entries.write().expect("lock poisoned");
        let current = match map.get(key) {
            None => 0,
            Some(Entry::Str(bytes)) => parse_int(key, bytes)?,
            Some(other) => return Err(wrong_kind(key, ValueKind::String, other.kind())),
        };
        let next = current
            .checked_add(delta)
            .ok_or_else(|| StoreError::Overflow(key.to_string()))?;
        map.insert(key.to_string(), Entry::Str(next.to_string().into_bytes()));
        Ok(next)
    }

    // ---- lists ----

    async fn lpush(&self, key: &str, value: &[u8]) -> StoreResult<u64> {
        self.guard()?;
        let mut map = self.entries.write().expect("lock poisoned");
        match map
            .entry(key.to_string())
            .or_insert_with(|| Entry::List(VecDeque::new()))
        {
            Entry::List(list) => {
                list.push_front(value.to_vec());
                Ok(list.len() as u64)
            }
            other => Err(wrong_kind(key, ValueKind::List, other.kind())),
        }
    }

    async fn rpush(&self, key: &str, value: &[u8]) -> StoreResult<u64> {
        self.guard()?;
        let mut map = self.entries.write().expect("lock poisoned");
        match map
            .entry(key.to_string())
            .or_insert_with(|| Entry::List(VecDeque::new()))
        {
            Entry::List(list) => {
                list.push_back(value.to_vec());
                Ok(list.len() as u64)
            }
            other => Err(wrong_kind(key, ValueKind::List, other.kind())),
        }
    }

    async fn lpop(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        self.guard()?;
        let mut map = self.entries.write().expect("lock poisoned");
        let popped = match map.get_mut(key) {
            None => return Ok(None),
            Some(Entry::List(list)) => list.pop_front(),
            Some(other) => return Err(wrong_kind(key, ValueKind::List, other.kind())),
        };
        if matches!(map.get(key), Some(Entry::List(list)) if list.is_empty()) {
            map.remove(key);
        }
        Ok(popped)
    }

    async fn rpop(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        self.guard()?;
        let mut map = self.entries.write().expect("lock poisoned");
        let popped = match map.get_mut(key) {
            None => return Ok(None),
            Some(Entry::List(list)) => list.pop_back(),
            Some(other) => return Err(wrong_kind(key, ValueKind::List, other.kind())),
        };
        if matches!(map.get(key), Some(Entry::List(list)) if list.is_empty()) {
            map.remove(key);
        }
        Ok(popped)
    }

    async fn lindex(&self, key: &str, index: i64) -> StoreResult<Option<Vec<u8>>> {
        self.guard()?;
        let map = self.entries.read().expect("lock poisoned");
        match map.get(key) {
            None => Ok(None),
            Some(Entry::List(list)) => Ok(resolve_index(list.len(), index)
                .and_then(|i| list.get(i))
                .cloned()),
            Some(other) => Err(wrong_kind(key, ValueKind::List, other.kind())),
        }
    }

    async fn lrange(&self, key: &str, start: i64, end: i64) -> StoreResult<Vec<Vec<u8>>> {
        self.guard()?;
        let map = self.entries.read().expect("lock poisoned");
        match map.get(key) {
            None => Ok(Vec::new()),
            Some(Entry::List(list)) => Ok(match resolve_range(list.len(), start, end) {
                None => Vec::new(),
                Some((lo, hi)) => list.iter().skip(lo).take(hi - lo + 1).cloned().collect(),
            }),
            Some(other) => Err(wrong_kind(key, ValueKind::List, other.kind())),
        }
    }

    async fn llen(&self, key: &str) -> StoreResult<u64> {
        self.guard()?;
        let map = self.entries.read().expect("lock poisoned");
        match map.get(key) {
            None => Ok(0),
            Some(Entry::List(list)) => Ok(list.len() as u64),
            Some(other) => Err(wrong_kind(key, ValueKind::List, other.kind())),
        }
    }

    async fn linsert(
        &self,
        key: &str,
        placement: Placement,
        pivot: &[u8],
        value: &[u8],
    ) -> StoreResult<i64> {
        self.guard()?;
        let mut map = self.entries.write().expect("lock poisoned");
        match map.get_mut(key) {
            None => Ok(0),
            Some(Entry::List(list)) => match list.iter().position(|v| v == pivot) {
                None => Ok(-1),
                Some(at) => {
                    let at = match placement {
                        Placement::Before => at,
                        Placement::After => at + 1,
                    };
                    list.insert(at, value.to_vec());
                    Ok(list.len() as i64)
                }
            },
            Some(other) => Err(wrong_kind(key, ValueKind::List, other.kind())),
        }
    }

    async fn lset(&self, key: &str, index: i64, value: &[u8]) -> StoreResult<()> {
        self.guard()?;
        let mut map = self.entries.write().expect("lock poisoned");
        let out_of_range = || StoreError::IndexOutOfRange {
            key: key.to_string(),
            index,
        };
        match map.get_mut(key) {
            None => Err(out_of_range()),
            Some(Entry::List(list)) => {
                let at = resolve_index(list.len(), index).ok_or_else(out_of_range)?;
                list[at] = value.to_vec();
                Ok(())
            }
            Some(other) => Err(wrong_kind(key, ValueKind::List, other.kind())),
        }
    }

    async fn lrem(&self, key: &str, count: i64, value: &[u8]) -> StoreResult<u64> {
        self.guard()?;
        let mut map = self.entries.write().expect("lock poisoned");
        let removed = match map.get_mut(key) {
            None => return Ok(0),
            Some(Entry::List(list)) => {
                let limit = if count == 0 {
                    usize::MAX
                } else {
                    count.unsigned_abs() as usize
                };
                let mut removed = 0usize;
                if count >= 0 {
                    list.retain(|v| {
                        if removed < limit && v == value {
                            removed += 1;
                            false
                        } else {
                            true
                        }
                    });
                } else {
                    // Negative count removes from the tail.
                    let mut kept: VecDeque<Vec<u8>> = VecDeque::with_capacity(list.len());
                    while let Some(v) = list.pop_back() {
                        if removed < limit && v == value {
                            removed += 1;
                        } else {
                            kept.push_front(v);
                        }
                    }
                    *list = kept;
                }
                removed as u64
            }
            Some(other) => return Err(wrong_kind(key, ValueKind::List, other.kind())),
        };
        if matches!(map.get(key), Some(Entry::List(list)) if list.is_empty()) {
            map.remove(key);
        }
        Ok(removed)
    }

    // ---- sets ----

    async fn sadd(&self, key: &str, member: &[u8]) -> StoreResult<bool> {
        self.guard()?;
        let mut map = self.entries.write().expect("lock poisoned");
        match map
            .entry(key.to_string())
            .or_insert_with(|| Entry::Set(HashSet::new()))
        {
            Entry::Set(set) => Ok(set.insert(member.to_vec())),
            other => Err(wrong_kind(key, ValueKind::Set, other.kind())),
        }
    }

    async fn srem(&self, key: &str, member: &[u8]) -> StoreResult<bool> {
        self.guard()?;
        let mut map = self.entries.write().expect("lock poisoned");
        let removed = match map.get_mut(key) {
            None => return Ok(false),
            Some(Entry::Set(set)) => set.remove(member),
            Some(other) => return Err(wrong_kind(key, ValueKind::Set, other.kind())),
        };
        if matches!(map.get(key), Some(Entry::Set(set)) if set.is_empty()) {
            map.remove(key);
        }
        Ok(removed)
    }

    async fn sismember(&self, key: &str, member: &[u8]) -> StoreResult<bool> {
        self.guard()?;
        let map = self.entries.read().expect("lock poisoned");
        match map.get(key) {
            None => Ok(false),
            Some(Entry::Set(set)) => Ok(set.contains(member)),
            Some(other) => Err(wrong_kind(key, ValueKind::Set, other.kind())),
        }
    }

    async fn scard(&self, key: &str) -> StoreResult<u64> {
        self.guard()?;
        let map = self.entries.read().expect("lock poisoned");
        match map.get(key) {
            None => Ok(0),
            Some(Entry::Set(set)) => Ok(set.len() as u64),
            Some(other) => Err(wrong_kind(key, ValueKind::Set, other.kind())),
        }
    }

    async fn spop(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        self.guard()?;
        let mut map = self.entries.write().expect("lock poisoned");
        let popped = match map.get_mut(key) {
            None => return Ok(None),
            Some(Entry::Set(set)) => {
                // HashSet iteration order is unspecified, which is all
                // "random member" promises to callers.
                let member = set.iter().next().cloned();
                if let Some(ref m) = member {
                    set.remove(m);
                }
                member
            }
            Some(other) => return Err(wrong_kind(key, ValueKind::Set, other.kind())),
        };
        if matches!(map.get(key), Some(Entry::Set(set)) if set.is_empty()) {
            map.remove(key);
        }
        Ok(popped)
    }

    async fn srandmember(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        self.guard()?;
        let map = self.entries.read().expect("lock poisoned");
        match map.get(key) {
            None => Ok(None),
            Some(Entry::Set(set)) => Ok(set.iter().next().cloned()),
            Some(other) => Err(wrong_kind(key, ValueKind::Set, other.kind())),
        }
    }

    async fn smembers(&self, key: &str) -> StoreResult<Vec<Vec<u8>>> {
        self.guard()?;
        let map = self.entries.read().expect("lock poisoned");
        match map.get(key) {
            None => Ok(Vec::new()),
            Some(Entry::Set(set)) => Ok(set.iter().cloned().collect()),
            Some(other) => Err(wrong_kind(key, ValueKind::Set, other.kind())),
        }
    }

    // ---- hashes ----

    async fn hset(&self, key: &str, field: &str, value: &[u8]) -> StoreResult<bool> {
        self.guard()?;
        let mut map = self.entries.write().expect("lock poisoned");
        match map
            .entry(key.to_string())
            .or_insert_with(|| Entry::Hash(BTreeMap::new()))
        {
            Entry::Hash(hash) => Ok(hash.insert(field.to_string(), value.to_vec()).is_none()),
            other => Err(wrong_kind(key, ValueKind::Hash, other.kind())),
        }
    }

    async fn hget(&self, key: &str, field: &str) -> StoreResult<Option<Vec<u8>>> {
        self.guard()?;
        let map = self.entries.read().expect("lock poisoned");
        match map.get(key) {
            None => Ok(None),
            Some(Entry::Hash(hash)) => Ok(hash.get(field).cloned()),
            Some(other) => Err(wrong_kind(key, ValueKind::Hash, other.kind())),
        }
    }

    async fn hdel(&self, key: &str, field: &str) -> StoreResult<bool> {
        self.guard()?;
        let mut map = self.entries.write().expect("lock poisoned");
        let removed = match map.get_mut(key) {
            None => return Ok(false),
            Some(Entry::Hash(hash)) => hash.remove(field).is_some(),
            Some(other) => return Err(wrong_kind(key, ValueKind::Hash, other.kind())),
        };
        if matches!(map.get(key), Some(Entry::Hash(hash)) if hash.is_empty()) {
            map.remove(key);
        }
        Ok(removed)
    }

    async fn hkeys(&self, key: &str) -> StoreResult<Vec<String>> {
        self.guard()?;
        let map = self.entries.read().expect("lock poisoned");
        match map.get(key) {
            None => Ok(Vec::new()),
            Some(Entry::Hash(hash)) => Ok(hash.keys().cloned().collect()),
            Some(other) => Err(wrong_kind(key, ValueKind::Hash, other.kind())),
        }
    }

    async fn hvals(&self, key: &str) -> StoreResult<Vec<Vec<u8>>> {
        self.guard()?;
        let map = self.entries.read().expect("lock poisoned");
        match map.get(key) {
            None => Ok(Vec::new()),
            Some(Entry::Hash(hash)) => Ok(hash.values().cloned().collect()),
            Some(other) => Err(wrong_kind(key, ValueKind::Hash, other.kind())),
        }
    }

    async fn hlen(&self, key: &str) -> StoreResult<u64> {
        self.guard()?;
        let map = self.entries.read().expect("lock poisoned");
        match map.get(key) {
            None => Ok(0),
            Some(Entry::Hash(hash)) => Ok(hash.len() as u64),
            Some(other) => Err(wrong_kind(key, ValueKind::Hash, other.kind())),
        }
    }

    async fn hgetall(&self, key: &str) -> StoreResult<Vec<(String, Vec<u8>)>> {
        self.guard()?;
        let map = self.entries.read().expect("lock poisoned");
        match map.get(key) {
            None => Ok(Vec::new()),
            Some(Entry::Hash(hash)) => {
                Ok(hash.iter().map(|(f, v)| (f.clone(), v.clone())).collect())
            }
            Some(other) => Err(wrong_kind(key, ValueKind::Hash, other.kind())),
        }
    }

    async fn hincr_by(&self, key: &str, field: &str, delta: i64) -> StoreResult<i64> {
        self.guard()?;
        let mut map = self.entries.write().expect("lock poisoned");
        match map
            .entry(key.to_string())
            .or_insert_with(|| Entry::Hash(BTreeMap::new()))
        {
            Entry::Hash(hash) => {
                let current = match hash.get(field) {
                    None => 0,
                    Some(bytes) => parse_int(key, bytes)?,
                };
                let next = current
                    .checked_add(delta)
                    .ok_or_else(|| StoreError::Overflow(key.to_string()))?;
                hash.insert(field.to_string(), next.to_string().into_bytes());
                Ok(next)
            }
            other => Err(wrong_kind(key, ValueKind::Hash, other.kind())),
        }
    }

    // ---- generic ----

    async fn keys(&self, pattern: &str) -> StoreResult<Vec<String>> {
        self.guard()?;
        let map = self.entries.read().expect("lock poisoned");
        let mut matched: Vec<String> = match pattern.strip_suffix('*') {
            Some(prefix) => map.keys().filter(|k| k.starts_with(prefix)).cloned().collect(),
            None => map.keys().filter(|k| k.as_str() == pattern).cloned().collect(),
        };
        matched.sort();
        Ok(matched)
    }

    async fn value_type(&self, key: &str) -> StoreResult<ValueKind> {
        self.guard()?;
        let map = self.entries.read().expect("lock poisoned");
        Ok(map.get(key).map_or(ValueKind::None, Entry::kind))
    }
}

#[async_trait]
impl Transport for MemoryStore {
    async fn connect(&self) -> StoreResult<()> {
        if self.refuse_connect {
            return Err(StoreError::ConnectFailed("connection refused".to_string()));
        }
        self.connected.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn auth(&self, password: &str) -> StoreResult<()> {
        match self.password.as_deref() {
            Some(expected) if expected == password => {
                self.authed.store(true, Ordering::SeqCst);
                Ok(())
            }
            Some(_) => Err(StoreError::AuthRejected),
            // No password configured: authentication is a no-op.
            None => Ok(()),
        }
    }

    async fn close(&self) -> StoreResult<()> {
        self.connected.store(false, Ordering::SeqCst);
        self.authed.store(false, Ordering::SeqCst);
        Ok(())
    }
}
