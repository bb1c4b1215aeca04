//! Object store trait
//!
//! Binary uploads (proofs, posters, letters, evidence, signatures) live
//! outside the relational store and are referenced from rows by
//! [`ObjectRef`] strings.

use async_trait::async_trait;

use crate::error_handling::types::ObjectStoreError;
use crate::object_store::types::ObjectRef;

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Writes `data` under `object`, replacing any previous content.
    async fn put(&self, object: &ObjectRef, data: &[u8]) -> Result<(), ObjectStoreError>;

    async fn get(&self, object: &ObjectRef) -> Result<Vec<u8>, ObjectStoreError>;

    /// Returns `false` when nothing was stored under `object`.
    async fn delete(&self, object: &ObjectRef) -> Result<bool, ObjectStoreError>;

    /// URL under which the web interface serves the object.
    fn public_url(&self, object: &ObjectRef) -> String;
}
