//! Pluggable request-authentication gate for axum services.
//!
//! Build an [`AuthGate`](services::auth::AuthGate) once from a JSON
//! configuration and put it in front of a router with
//! [`middleware::auth::gate::apply`]. Each request is either passed on to the
//! next handler or answered with a JSON error body.

pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod services;
