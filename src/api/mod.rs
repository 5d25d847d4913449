//! API Module
//!
//! HTTP handlers and routing for the cache server REST API.
//!
//! # Endpoints
//! - `GET /cache/:key` - Read a value
//! - `PUT /cache/:key` - Store a value with optional TTL
//! - `DELETE /cache/:key` - Forget a key
//! - `POST /cache/:key/add` - Store only if absent
//! - `POST /cache/:key/pull` - Read and forget
//! - `POST /cache/:key/increment`, `POST /cache/:key/decrement` - Counters
//! - `POST /batch/get`, `PUT /batch`, `POST /batch/forget` - Batch operations
//! - `DELETE /cache` - Flush everything
//! - `GET /stats`, `GET /health`

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
