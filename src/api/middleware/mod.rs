//! API middleware stack. A single layer: bearer-token auth, which resolves
//! the caller and injects the request-scoped identity for handlers.

pub mod auth;
