use serde_json::Value;

use crate::error::{CodecError, CodecResult};

/// Two-mode value codec for store payloads.
///
/// In compact mode (the default), structured values (arrays and objects)
/// are encoded as MessagePack and scalars as their plain text
/// representation. In text mode everything is encoded as JSON, which
/// round-trips every value exactly at the cost of larger payloads.
///
/// Decoding is deliberately lenient in compact mode: bytes that do not
/// decode to a structured value are returned as the raw text. Keyspaces
/// shared with legacy writers may hold plain-text payloads, and those must
/// read back as strings rather than fail. The price is that a string which
/// happens to look like MessagePack cannot be told apart from one that was
/// never encoded.
#[derive(Clone, Copy, Debug)]
pub struct Codec {
    compact: bool,
}

impl Default for Codec {
    fn default() -> Self {
        Self::compact()
    }
}

impl Codec {
    /// Codec with the given mode; `compact = false` selects text mode.
    pub fn new(compact: bool) -> Self {
        Self { compact }
    }

    /// Compact-mode codec: MessagePack for structures, text for scalars.
    pub fn compact() -> Self {
        Self { compact: true }
    }

    /// Text-mode codec: JSON for everything, strict decoding.
    pub fn text() -> Self {
        Self { compact: false }
    }

    /// Returns `true` when this codec is in compact mode.
    pub fn is_compact(&self) -> bool {
        self.compact
    }

    /// Encode a value into store bytes.
    pub fn encode(&self, value: &Value) -> CodecResult<Vec<u8>> {
        if !self.compact {
            return serde_json::to_vec(value).map_err(|e| CodecError::Encode(e.to_string()));
        }
        match value {
            Value::Array(_) | Value::Object(_) => {
                rmp_serde::to_vec(value).map_err(|e| CodecError::Encode(e.to_string()))
            }
            // Scalars are stored as bare text: strings unquoted, the rest
            // via their JSON rendering ("null", "true", "42").
            Value::String(text) => Ok(text.clone().into_bytes()),
            scalar => Ok(scalar.to_string().into_bytes()),
        }
    }

    /// Decode store bytes back into a value.
    ///
    /// Absent or empty input decodes to `Value::Null`.
    pub fn decode(&self, bytes: Option<&[u8]>) -> CodecResult<Value> {
        let bytes = match bytes {
            None => return Ok(Value::Null),
            Some(b) if b.is_empty() => return Ok(Value::Null),
            Some(b) => b,
        };

        if !self.compact {
            return serde_json::from_slice(bytes).map_err(|e| CodecError::Decode(e.to_string()));
        }

        match rmp_serde::from_slice::<Value>(bytes) {
            Ok(value @ (Value::Array(_) | Value::Object(_))) => Ok(value),
            // Not structured (or not MessagePack at all): hand back the text.
            _ => Ok(Value::String(String::from_utf8_lossy(bytes).into_owned())),
        }
    }
}
