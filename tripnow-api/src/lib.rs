//! TripNow API Server
//!
//! REST surface over the reservation store plus operational endpoints.
//!
//! ## Endpoints
//!
//! ### Reservations
//! - POST /api/reservations/create - Create a pending reservation
//! - GET /api/reservations/by-idempotency-key/:key - List by idempotency key
//! - GET /api/reservations/:id - Get reservation
//!
//! ### Operations
//! - GET /health - Service status and circuit state
//! - GET /metrics - Prometheus metrics

pub mod dto;
pub mod error;
pub mod routes;
pub mod server;
pub mod state;

pub use dto::*;
pub use error::*;
pub use routes::*;
pub use server::*;
pub use state::*;
