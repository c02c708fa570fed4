//! Block endpoints.
//!
//! GET    /resources/{instance}/block          — list blocks
//! POST   /resources/{instance}/block          — create or replace a block (JSON)
//! DELETE /resources/{instance}/block/{block}  — delete a block (`?server_name=`)
//! GET    /resources/{instance}/lua            — list Lua modules
//! POST   /resources/{instance}/lua            — create or replace a Lua module (form)
//! DELETE /resources/{instance}/lua            — delete a Lua module (form)

use axum::{
    body::Bytes,
    extract::{rejection::FormRejection, Form, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use crate::blocks::error::BlockError;
use crate::blocks::types::{BlockList, ConfigurationBlock, LuaBlockList};
use crate::http::server::AppState;

#[derive(Debug, Deserialize)]
pub struct DeleteBlockParams {
    #[serde(default)]
    pub server_name: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateLuaBlockForm {
    #[serde(default)]
    pub lua_module_type: String,
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct DeleteLuaBlockForm {
    pub lua_module_type: Option<String>,
}

pub async fn healthcheck() -> &'static str {
    "WORKING"
}

pub async fn list_blocks(
    State(state): State<AppState>,
    Path(instance): Path<String>,
) -> Result<Json<BlockList>, BlockError> {
    let blocks = state.blocks.list_blocks(&instance).await?;
    Ok(Json(BlockList { blocks }))
}

pub async fn update_block(
    State(state): State<AppState>,
    Path(instance): Path<String>,
    body: Bytes,
) -> Result<StatusCode, BlockError> {
    if body.is_empty() {
        return Err(BlockError::EmptyBody);
    }

    let block: ConfigurationBlock =
        serde_json::from_slice(&body).map_err(|e| BlockError::MalformedRequest(e.to_string()))?;

    state.blocks.update_block(&instance, block).await?;
    Ok(StatusCode::OK)
}

pub async fn delete_block(
    State(state): State<AppState>,
    Path((instance, block)): Path<(String, String)>,
    Query(params): Query<DeleteBlockParams>,
) -> Result<StatusCode, BlockError> {
    state
        .blocks
        .delete_block(&instance, &params.server_name, &block)
        .await?;
    Ok(StatusCode::OK)
}

pub async fn list_lua_blocks(
    State(state): State<AppState>,
    Path(instance): Path<String>,
) -> Result<Json<LuaBlockList>, BlockError> {
    let modules = state.blocks.list_lua_blocks(&instance).await?;
    Ok(Json(LuaBlockList { modules }))
}

pub async fn update_lua_block(
    State(state): State<AppState>,
    Path(instance): Path<String>,
    form: Result<Form<UpdateLuaBlockForm>, FormRejection>,
) -> Result<StatusCode, BlockError> {
    let Form(form) = form.map_err(|e| BlockError::MalformedRequest(e.body_text()))?;

    state
        .blocks
        .update_lua_block(&instance, &form.lua_module_type, form.content)
        .await?;
    Ok(StatusCode::OK)
}

pub async fn delete_lua_block(
    State(state): State<AppState>,
    Path(instance): Path<String>,
    form: Result<Form<DeleteLuaBlockForm>, FormRejection>,
) -> Result<StatusCode, BlockError> {
    let module_type = match form {
        Ok(Form(DeleteLuaBlockForm { lua_module_type: Some(module_type) })) => module_type,
        Ok(_) => return Err(BlockError::MissingField("lua_module_type")),
        Err(e) => return Err(BlockError::MalformedRequest(e.body_text())),
    };

    state.blocks.delete_lua_block(&instance, &module_type).await?;
    Ok(StatusCode::OK)
}
