//! Authentication/authorization gate for axum services.
//!
//! Every gated request has its bearer token structurally decoded, is authorized by an
//! external gatekeeper, and reaches its handler with a [`GateCtx`]. Usage is reported to
//! the gatekeeper in the background once the handler has produced its response.
//!
//! [`GateCtx`]: api::v1::extractors::GateCtx

pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod services;
pub mod state;
