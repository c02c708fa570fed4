//! Configuration block subsystem.
//!
//! # Data Flow
//! ```text
//! HTTP handler
//!     → service.rs (orchestrates one operation)
//!         → validator.rs (generic blocks only, strict mode)
//!         → naming.rs (Lua module type → block name)
//!         → store.rs (list / upsert / delete by key)
//! ```
//!
//! # Design Decisions
//! - Lua blocks are plain blocks with a prefixed name, not a separate entity
//! - Store and validator are traits injected into the service
//! - Content that fails validation never reaches the store

pub mod error;
pub mod naming;
pub mod service;
pub mod store;
pub mod types;
pub mod validator;

pub use error::{BlockError, BlockResult, StoreError};
pub use service::BlockService;
pub use store::{BlockStore, InMemoryBlockStore};
pub use types::{BlockList, ConfigurationBlock, LuaBlock, LuaBlockList};
pub use validator::{ExpandOptions, NginxSyntaxValidator, SyntaxValidator};
