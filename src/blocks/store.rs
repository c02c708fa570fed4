//! Block persistence.
//!
//! The service talks to storage only through [`BlockStore`]. Block names are
//! unique per instance: an upsert replaces any block with the same name.
//! Each call is atomic per name.

use async_trait::async_trait;
use dashmap::DashMap;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::blocks::error::StoreError;
use crate::blocks::types::ConfigurationBlock;

/// Keyed block persistence per instance.
#[async_trait]
pub trait BlockStore: Send + Sync {
    /// All blocks of an instance.
    async fn list_blocks(&self, instance: &str) -> Result<Vec<ConfigurationBlock>, StoreError>;

    /// Create or replace the block with the same name, whatever its server scope.
    async fn update_block(&self, instance: &str, block: ConfigurationBlock) -> Result<(), StoreError>;

    /// Remove a block. The stored server scope must equal `server_name`; an
    /// empty `server_name` targets instance-wide blocks.
    async fn delete_block(&self, instance: &str, server_name: &str, name: &str) -> Result<(), StoreError>;
}

/// Stored attributes of a block; the name is the map key.
#[derive(Debug, Clone)]
struct StoredBlock {
    /// "" for instance-wide blocks.
    server_name: String,
    content: String,
}

/// Process-local store for provisioned instances.
#[derive(Clone, Default)]
pub struct InMemoryBlockStore {
    instances: Arc<DashMap<String, BTreeMap<String, StoredBlock>>>,
}

impl InMemoryBlockStore {
    /// Create an empty store with no instances.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store with the given instances provisioned.
    pub fn with_instances<I, S>(instances: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let store = Self::new();
        for instance in instances {
            store.create_instance(instance);
        }
        store
    }

    /// Provision an instance. Existing blocks are kept if it already exists.
    pub fn create_instance(&self, instance: impl Into<String>) {
        self.instances.entry(instance.into()).or_default();
    }

    /// Number of provisioned instances.
    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }
}

#[async_trait]
impl BlockStore for InMemoryBlockStore {
    async fn list_blocks(&self, instance: &str) -> Result<Vec<ConfigurationBlock>, StoreError> {
        let blocks = self
            .instances
            .get(instance)
            .ok_or_else(|| StoreError::InstanceNotFound(instance.to_string()))?;

        Ok(blocks
            .iter()
            .map(|(name, stored)| ConfigurationBlock {
                name: name.clone(),
                content: stored.content.clone(),
                server_name: (!stored.server_name.is_empty()).then(|| stored.server_name.clone()),
            })
            .collect())
    }

    async fn update_block(&self, instance: &str, block: ConfigurationBlock) -> Result<(), StoreError> {
        if block.name.is_empty() {
            return Err(StoreError::InvalidBlock("block name can't be empty".to_string()));
        }

        let mut blocks = self
            .instances
            .get_mut(instance)
            .ok_or_else(|| StoreError::InstanceNotFound(instance.to_string()))?;

        let stored = StoredBlock {
            server_name: block.scope().to_string(),
            content: block.content,
        };
        blocks.insert(block.name, stored);
        Ok(())
    }

    async fn delete_block(&self, instance: &str, server_name: &str, name: &str) -> Result<(), StoreError> {
        let mut blocks = self
            .instances
            .get_mut(instance)
            .ok_or_else(|| StoreError::InstanceNotFound(instance.to_string()))?;

        if !blocks.get(name).is_some_and(|stored| stored.server_name == server_name) {
            return Err(StoreError::BlockNotFound { name: name.to_string() });
        }
        blocks.remove(name);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unknown_instance() {
        let store = InMemoryBlockStore::new();
        let err = store.list_blocks("missing").await.unwrap_err();
        assert_eq!(err, StoreError::InstanceNotFound("missing".into()));

        let err = store
            .update_block("missing", ConfigurationBlock::new("http", "gzip on;"))
            .await
            .unwrap_err();
        assert_eq!(err, StoreError::InstanceNotFound("missing".into()));
    }

    #[tokio::test]
    async fn test_upsert_replaces_in_place() {
        let store = InMemoryBlockStore::with_instances(["my-instance"]);
        assert!(store.list_blocks("my-instance").await.unwrap().is_empty());

        store
            .update_block("my-instance", ConfigurationBlock::new("http", "gzip on;"))
            .await
            .unwrap();
        store
            .update_block("my-instance", ConfigurationBlock::new("http", "gzip off;"))
            .await
            .unwrap();

        let blocks = store.list_blocks("my-instance").await.unwrap();
        assert_eq!(blocks, vec![ConfigurationBlock::new("http", "gzip off;")]);
    }

    #[tokio::test]
    async fn test_names_unique_across_scopes() {
        let store = InMemoryBlockStore::with_instances(["inst"]);
        store
            .update_block("inst", ConfigurationBlock::new("lua-x", "return 1;"))
            .await
            .unwrap();
        store
            .update_block("inst", ConfigurationBlock::new("lua-x", "return 2;").with_server_name("s"))
            .await
            .unwrap();

        let blocks = store.list_blocks("inst").await.unwrap();
        assert_eq!(
            blocks,
            vec![ConfigurationBlock::new("lua-x", "return 2;").with_server_name("s")]
        );
    }

    #[tokio::test]
    async fn test_delete_matches_server_scope() {
        let store = InMemoryBlockStore::with_instances(["inst"]);
        store
            .update_block("inst", ConfigurationBlock::new("server", "b;").with_server_name("example.org"))
            .await
            .unwrap();

        let err = store.delete_block("inst", "", "server").await.unwrap_err();
        assert_eq!(err, StoreError::BlockNotFound { name: "server".into() });
        let err = store.delete_block("inst", "other.org", "server").await.unwrap_err();
        assert_eq!(err, StoreError::BlockNotFound { name: "server".into() });

        store.delete_block("inst", "example.org", "server").await.unwrap();
        assert!(store.list_blocks("inst").await.unwrap().is_empty());

        let err = store.delete_block("inst", "example.org", "server").await.unwrap_err();
        assert_eq!(err, StoreError::BlockNotFound { name: "server".into() });
    }

    #[tokio::test]
    async fn test_rejects_empty_name() {
        let store = InMemoryBlockStore::with_instances(["inst"]);
        let err = store
            .update_block("inst", ConfigurationBlock::new("", "gzip on;"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidBlock(_)));
    }

    #[test]
    fn test_create_instance_keeps_blocks() {
        let store = InMemoryBlockStore::with_instances(["a", "b"]);
        store.create_instance("a");
        assert_eq!(store.instance_count(), 2);
    }
}
