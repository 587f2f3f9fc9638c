//! HTTP transport.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  HTTP Layer (axum handlers)                              │
//! │  - Multipart parsing, file count and MIME validation     │
//! │  - JSON / zip / XML error responses                      │
//! └───────────────────┬──────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼──────────────────────────────────────┐
//! │  Service Layer (crate::service)                          │
//! │  - Temp-file staging and cleanup                         │
//! └───────────────────┬──────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼──────────────────────────────────────┐
//! │  Resources (crate::zip, crate::mail, crate::io)          │
//! └──────────────────────────────────────────────────────────┘
//! ```

pub mod error;
pub mod handlers;
pub mod router;
pub mod state;
pub mod upload;

pub use error::{AppError, ErrorBody};
pub use router::create_router;
pub use state::AppState;
