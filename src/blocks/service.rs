//! Block service: list, update and delete operations over a block store.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::blocks::error::{BlockError, BlockResult, StoreError};
use crate::blocks::naming;
use crate::blocks::store::BlockStore;
use crate::blocks::types::{ConfigurationBlock, LuaBlock};
use crate::blocks::validator::{ExpandOptions, SyntaxValidator};
use crate::observability::metrics;

/// Orchestrates block operations for instances.
///
/// Holds no state of its own; every operation maps to at most one store call.
#[derive(Clone)]
pub struct BlockService {
    store: Arc<dyn BlockStore>,
    validator: Arc<dyn SyntaxValidator>,
    store_timeout: Duration,
}

impl BlockService {
    pub fn new(
        store: Arc<dyn BlockStore>,
        validator: Arc<dyn SyntaxValidator>,
        store_timeout: Duration,
    ) -> Self {
        Self {
            store,
            validator,
            store_timeout,
        }
    }

    /// All blocks of an instance. Empty when the instance has none.
    pub async fn list_blocks(&self, instance: &str) -> BlockResult<Vec<ConfigurationBlock>> {
        let start = Instant::now();
        let result = self.with_deadline(self.store.list_blocks(instance)).await;
        metrics::record_block_operation("list", &result, start);
        result
    }

    /// Blocks of an instance holding Lua modules.
    pub async fn list_lua_blocks(&self, instance: &str) -> BlockResult<Vec<LuaBlock>> {
        let start = Instant::now();
        let result = self
            .with_deadline(self.store.list_blocks(instance))
            .await
            .map(|blocks| blocks.into_iter().filter_map(LuaBlock::from_block).collect());
        metrics::record_block_operation("list_lua", &result, start);
        result
    }

    /// Validate the content and create or replace the block.
    pub async fn update_block(&self, instance: &str, block: ConfigurationBlock) -> BlockResult<()> {
        let start = Instant::now();
        let result = self.validate_and_store(instance, block).await;
        metrics::record_block_operation("update", &result, start);
        result
    }

    async fn validate_and_store(&self, instance: &str, block: ConfigurationBlock) -> BlockResult<()> {
        // Lua blocks are deleted with the empty scope only.
        if block.server_name.is_some() && naming::is_lua_block(&block.name) {
            return Err(BlockError::MalformedRequest(format!(
                "lua block \"{}\" can't be scoped to a server",
                block.name
            )));
        }

        if let Err(errors) = self.validator.check(&block.content, ExpandOptions::STRICT) {
            tracing::info!(
                instance = %instance,
                block = %block.name,
                errors = errors.0.len(),
                "Rejected block with invalid syntax"
            );
            return Err(errors.into());
        }

        tracing::info!(
            instance = %instance,
            block = %block.name,
            server_name = block.scope(),
            "Updating block"
        );
        self.with_deadline(self.store.update_block(instance, block)).await
    }

    /// Create or replace the Lua block for a module type.
    ///
    /// Lua content is not run through the syntax validator: the validator
    /// understands nginx configuration, not Lua source.
    pub async fn update_lua_block(&self, instance: &str, module_type: &str, content: String) -> BlockResult<()> {
        let start = Instant::now();
        let block = ConfigurationBlock::lua(module_type, content);
        tracing::info!(instance = %instance, block = %block.name, "Updating lua block");
        let result = self.with_deadline(self.store.update_block(instance, block)).await;
        metrics::record_block_operation("update_lua", &result, start);
        result
    }

    /// Remove a block. An empty `server_name` targets the instance-wide scope.
    pub async fn delete_block(&self, instance: &str, server_name: &str, name: &str) -> BlockResult<()> {
        let start = Instant::now();
        tracing::info!(instance = %instance, block = %name, server_name = %server_name, "Deleting block");
        let result = self
            .with_deadline(self.store.delete_block(instance, server_name, name))
            .await;
        metrics::record_block_operation("delete", &result, start);
        result
    }

    /// Remove the Lua block for a module type. Lua blocks are never server scoped.
    pub async fn delete_lua_block(&self, instance: &str, module_type: &str) -> BlockResult<()> {
        let start = Instant::now();
        let name = naming::lua_block_name(module_type);
        tracing::info!(instance = %instance, block = %name, "Deleting lua block");
        let result = self.with_deadline(self.store.delete_block(instance, "", &name)).await;
        metrics::record_block_operation("delete_lua", &result, start);
        result
    }

    /// Run a store call under the operation deadline. On expiry the call is
    /// dropped before it completes.
    async fn with_deadline<T, F>(&self, call: F) -> BlockResult<T>
    where
        F: Future<Output = Result<T, StoreError>>,
    {
        match tokio::time::timeout(self.store_timeout, call).await {
            Ok(result) => result.map_err(BlockError::from),
            Err(_) => {
                tracing::warn!(timeout = ?self.store_timeout, "Block store call timed out");
                Err(BlockError::Timeout(self.store_timeout))
            }
        }
    }
}
