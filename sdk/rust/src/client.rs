use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub name: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LuaModule {
    pub lua_name: String,
    pub content: String,
}

#[derive(Debug, Deserialize)]
struct BlockList {
    blocks: Vec<Block>,
}

#[derive(Debug, Deserialize)]
struct LuaModuleList {
    modules: Vec<LuaModule>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("block API returned {status}: {message}")]
    Api { status: StatusCode, message: String },
}

impl ClientError {
    /// Status code of an API error.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::Http(e) => e.status(),
        }
    }
}

pub struct BlocksClient {
    client: Client,
    base_url: String,
}

impl BlocksClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn blocks_url(&self, instance: &str) -> String {
        format!("{}/resources/{}/block", self.base_url, instance)
    }

    fn lua_url(&self, instance: &str) -> String {
        format!("{}/resources/{}/lua", self.base_url, instance)
    }

    pub async fn list_blocks(&self, instance: &str) -> Result<Vec<Block>, ClientError> {
        let resp = self.client.get(self.blocks_url(instance)).send().await?;
        let list: BlockList = check(resp).await?.json().await?;
        Ok(list.blocks)
    }

    pub async fn update_block(&self, instance: &str, block: &Block) -> Result<(), ClientError> {
        let resp = self.client.post(self.blocks_url(instance)).json(block).send().await?;
        check(resp).await?;
        Ok(())
    }

    /// Delete a block; `server_name` selects a server-scoped block.
    pub async fn delete_block(
        &self,
        instance: &str,
        name: &str,
        server_name: Option<&str>,
    ) -> Result<(), ClientError> {
        let mut req = self
            .client
            .delete(format!("{}/{}", self.blocks_url(instance), name));
        if let Some(server_name) = server_name {
            req = req.query(&[("server_name", server_name)]);
        }
        check(req.send().await?).await?;
        Ok(())
    }

    pub async fn list_lua_modules(&self, instance: &str) -> Result<Vec<LuaModule>, ClientError> {
        let resp = self.client.get(self.lua_url(instance)).send().await?;
        let list: LuaModuleList = check(resp).await?.json().await?;
        Ok(list.modules)
    }

    pub async fn update_lua_module(
        &self,
        instance: &str,
        module_type: &str,
        content: &str,
    ) -> Result<(), ClientError> {
        let resp = self
            .client
            .post(self.lua_url(instance))
            .form(&[("lua_module_type", module_type), ("content", content)])
            .send()
            .await?;
        check(resp).await?;
        Ok(())
    }

    pub async fn delete_lua_module(&self, instance: &str, module_type: &str) -> Result<(), ClientError> {
        let resp = self
            .client
            .delete(self.lua_url(instance))
            .form(&[("lua_module_type", module_type)])
            .send()
            .await?;
        check(resp).await?;
        Ok(())
    }
}

async fn check(resp: Response) -> Result<Response, ClientError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let text = resp.text().await?;
    let message = serde_json::from_str::<ErrorBody>(&text)
        .map(|body| body.message)
        .unwrap_or(text);
    Err(ClientError::Api { status, message })
}
