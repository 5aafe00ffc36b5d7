//! Payload encoding for cached values.

use serde::{de::DeserializeOwned, Serialize};

use crate::error::CacheResult;

/// Turns typed values into the strings a [`KeyValueStore`](super::KeyValueStore) holds.
pub trait Codec: Send + Sync + 'static {
    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> CacheResult<String>;

    fn decode<T: DeserializeOwned>(&self, raw: &str) -> CacheResult<T>;
}

/// JSON via serde_json, the format shared with other readers of the store.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> CacheResult<String> {
        Ok(serde_json::to_string(value)?)
    }

    fn decode<T: DeserializeOwned>(&self, raw: &str) -> CacheResult<T> {
        Ok(serde_json::from_str(raw)?)
    }
}
