//! HTTP boundary layer.
//!
//! Exposes the booking core as REST endpoints. Routes are nested under
//! `/api/`; protected groups sit behind a bearer-token middleware. The
//! router is composable — `booking_api_router()` returns a `Router` that
//! can be mounted on any axum server instance.

pub mod endpoints;
pub mod error;
pub mod middleware;
pub mod router;
pub mod types;

pub use router::booking_api_router;
pub use types::ApiContext;
