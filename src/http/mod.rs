//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (request ID)
//!     → handlers.rs (decode input, call BlockService)
//!     → error.rs (map failures to status + message)
//!     → Send to client
//! ```

pub mod error;
pub mod handlers;
pub mod request;
pub mod server;

pub use request::{MakeRequestUuid, X_REQUEST_ID};
pub use server::{AppState, HttpServer};
