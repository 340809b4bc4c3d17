use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use botbrain_codec::CodecError;

use crate::brain::Brain;
use crate::error::BrainResult;

/// A known chat user, stored in the directory hash keyed by id.
///
/// `extra` carries whatever adapter-specific metadata the host attaches
/// (avatar URLs, mention handles, ...); it is flattened into the stored
/// record alongside the named fields.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl User {
    /// Build a user record from an id and optional context. Without a
    /// context name, the id doubles as the display name.
    pub fn new(id: impl Into<String>, context: Option<&UserContext>) -> Self {
        let id = id.into();
        match context {
            Some(ctx) => Self {
                name: ctx.name.clone().unwrap_or_else(|| id.clone()),
                room: ctx.room.clone(),
                extra: ctx.extra.clone(),
                id,
            },
            None => Self {
                name: id.clone(),
                room: None,
                extra: BTreeMap::new(),
                id,
            },
        }
    }
}

/// Context accompanying a user reference, typically derived from the
/// message that mentioned them.
#[derive(Clone, Debug, Default)]
pub struct UserContext {
    pub name: Option<String>,
    pub room: Option<String>,
    pub extra: BTreeMap<String, Value>,
}

impl UserContext {
    /// Context carrying only a room.
    pub fn in_room(room: impl Into<String>) -> Self {
        Self {
            room: Some(room.into()),
            ..Self::default()
        }
    }
}

impl Brain {
    fn encode_user(&self, user: &User) -> BrainResult<Vec<u8>> {
        let value =
            serde_json::to_value(user).map_err(|e| CodecError::Encode(e.to_string()))?;
        Ok(self.codec.encode(&value)?)
    }

    /// Decode a directory record. Payloads that are not objects carrying
    /// an id yield `None` rather than an error.
    fn decode_user(&self, bytes: &[u8]) -> Option<User> {
        let value = self.codec.decode(Some(bytes)).ok()?;
        match &value {
            Value::Object(map) if map.get("id").is_some_and(Value::is_string) => {
                serde_json::from_value(value).ok()
            }
            _ => None,
        }
    }

    /// The whole directory, id to record. Records that fail to decode map
    /// to `None` so one bad entry cannot hide the rest.
    pub async fn users(&self) -> BrainResult<BTreeMap<String, Option<User>>> {
        self.gate.ready().await;
        let pairs = self.transport.hgetall(self.ns.users_key()).await?;
        Ok(pairs
            .into_iter()
            .map(|(id, bytes)| {
                let user = self.decode_user(&bytes);
                (id, user)
            })
            .collect())
    }

    /// Persist a user record, overwriting any existing one for that id.
    pub async fn add_user(&self, user: &User) -> BrainResult<User> {
        self.gate.ready().await;
        let bytes = self.encode_user(user)?;
        self.transport
            .hset(self.ns.users_key(), &user.id, &bytes)
            .await?;
        Ok(user.clone())
    }

    /// Resolve a user by id, creating or refreshing the record as needed.
    ///
    /// A missing record is created from the id and context. A context
    /// room differing from the stored one is treated as identity-context
    /// refresh: a fresh record is built from the context and overwrites
    /// the stored record.
    pub async fn user_for_id(&self, id: &str, context: Option<&UserContext>) -> BrainResult<User> {
        self.gate.ready().await;
        let stored = self
            .transport
            .hget(self.ns.users_key(), id)
            .await?
            .and_then(|bytes| self.decode_user(&bytes));

        let room_changed = |user: &User| match context.and_then(|ctx| ctx.room.as_deref()) {
            Some(room) => user.room.as_deref() != Some(room),
            None => false,
        };

        match stored {
            Some(user) if !room_changed(&user) => Ok(user),
            _ => self.add_user(&User::new(id, context)).await,
        }
    }

    /// Case-insensitive exact name lookup. Iteration order over the
    /// directory is whatever the store yields, so the first match under
    /// duplicate names is not deterministic.
    pub async fn user_for_name(&self, name: &str) -> BrainResult<Option<User>> {
        let wanted = name.to_lowercase();
        let users = self.users().await?;
        Ok(users
            .into_values()
            .flatten()
            .find(|user| user.name.to_lowercase() == wanted))
    }

    /// Case-insensitive prefix match over display names.
    pub async fn users_for_raw_fuzzy_name(&self, fuzzy: &str) -> BrainResult<Vec<User>> {
        let prefix = fuzzy.to_lowercase();
        let users = self.users().await?;
        Ok(users
            .into_values()
            .flatten()
            .filter(|user| user.name.to_lowercase().starts_with(&prefix))
            .collect())
    }

    /// Prefix match with exact-match preference: when one of the prefix
    /// matches equals the query (case-insensitively, full string), only
    /// that user is returned.
    pub async fn users_for_fuzzy_name(&self, fuzzy: &str) -> BrainResult<Vec<User>> {
        let wanted = fuzzy.to_lowercase();
        let matches = self.users_for_raw_fuzzy_name(fuzzy).await?;
        if let Some(exact) = matches
            .iter()
            .find(|user| user.name.to_lowercase() == wanted)
        {
            return Ok(vec![exact.clone()]);
        }
        Ok(matches)
    }
}
