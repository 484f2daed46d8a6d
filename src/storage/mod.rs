pub mod codec;
pub mod json_file;
pub mod memory;

use async_trait::async_trait;

use crate::errors::StoreError;

pub type Result<T> = std::result::Result<T, StoreError>;

/// Key under which the serialized expense list is stored.
pub const EXPENSES_KEY: &str = "expenses";

/// Asynchronous string key-value storage with a single namespace.
///
/// Reading a key that was never written yields `Ok(None)`.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;
    async fn set(&self, key: &str, value: String) -> Result<()>;
}

/// Rejects keys that cannot be mapped onto a single file name.
pub(crate) fn validate_key(key: &str) -> Result<()> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_'));
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidKey(key.to_string()))
    }
}

pub use codec::{decode_expenses, encode_expenses};
pub use json_file::JsonFileStore;
pub use memory::MemoryStore;
