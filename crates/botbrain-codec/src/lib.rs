//! Value serialization for the botbrain storage adapter.
//!
//! Values are [`serde_json::Value`] trees (null, booleans, numbers,
//! strings, arrays, objects). The [`Codec`] turns them into the byte
//! strings the backing store holds and back again, in one of two modes:
//!
//! - **compact** (default): structured values as MessagePack, scalars as
//!   bare text, with a lenient text fallback on decode
//! - **text**: everything as JSON, strict on decode
//!
//! See [`Codec`] for the exact fallback and round-trip guarantees.

pub mod codec;
pub mod error;

pub use codec::Codec;
pub use error::{CodecError, CodecResult};
