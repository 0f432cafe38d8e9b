//! End-to-end tests of the typed API surface: auth flows, cached reads,
//! and mutation-driven invalidation.

mod auth;
mod cache;
