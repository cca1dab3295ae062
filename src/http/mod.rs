//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, shutdown)
//!     → request.rs (request ID)
//!     → handlers.rs (/health, /contact)
//!     → [relay pipeline decides the outcome]
//!     → response.rs (status + { ok, error } body)
//!     → Send to client
//! ```

pub mod handlers;
pub mod request;
pub mod response;
pub mod server;

pub use request::{RequestIdExt, X_REQUEST_ID};
pub use response::ApiResponse;
pub use server::{AppState, HttpServer};
