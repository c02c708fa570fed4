//! Configuration block types.

use serde::{Deserialize, Serialize};

use crate::blocks::naming;

/// A named configuration fragment attached to an instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigurationBlock {
    /// Storage key, unique within the instance.
    pub name: String,
    /// Raw configuration text.
    pub content: String,
    /// Named server context the block belongs to (instance-wide when absent).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_name: Option<String>,
}

impl ConfigurationBlock {
    /// Create an instance-wide block.
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
            server_name: None,
        }
    }

    /// Create the block holding a Lua module of the given type.
    pub fn lua(module_type: &str, content: impl Into<String>) -> Self {
        Self::new(naming::lua_block_name(module_type), content)
    }

    /// Scope the block to a named server.
    pub fn with_server_name(mut self, server_name: impl Into<String>) -> Self {
        self.server_name = Some(server_name.into());
        self
    }

    /// Server scope matched on delete ("" for instance-wide).
    pub fn scope(&self) -> &str {
        self.server_name.as_deref().unwrap_or_default()
    }
}

/// Lua view of a stored block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LuaBlock {
    /// Full stored block name, prefix included.
    pub lua_name: String,
    pub content: String,
}

impl LuaBlock {
    /// Reshape a stored block, or `None` when it is not a Lua block.
    pub fn from_block(block: ConfigurationBlock) -> Option<Self> {
        if !naming::is_lua_block(&block.name) {
            return None;
        }
        Some(Self {
            lua_name: block.name,
            content: block.content,
        })
    }

    /// Module type encoded in the block name.
    pub fn module_type(&self) -> &str {
        naming::lua_module_type(&self.lua_name).unwrap_or_default()
    }
}

/// Body of the block listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BlockList {
    pub blocks: Vec<ConfigurationBlock>,
}

/// Body of the Lua module listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LuaBlockList {
    pub modules: Vec<LuaBlock>,
}
