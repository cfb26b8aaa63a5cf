//! HTTP/JSON boundary.
//!
//! Routes are nested under `/api/`. Protected routes carry a bearer-token
//! middleware that resolves the caller to a request-scoped
//! [`AuthContext`](crate::auth::AuthContext);
//! administrative routes additionally require the admin role. The router is
//! composable — `api_router()` returns a `Router` that can be mounted on any
//! axum server instance.

pub mod endpoints;
pub mod error;
pub mod middleware;
pub mod router;
pub mod server;
pub mod types;

pub use router::api_router;
pub use server::ApiServer;
pub use types::ApiContext;
