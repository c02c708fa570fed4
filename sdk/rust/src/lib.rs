//! Client for the rpaas-blocks HTTP API.

pub mod client;

pub use client::{Block, BlocksClient, ClientError, LuaModule};
