//! # rentiva-api
//!
//! HTTP API server for the Rentiva rental marketplace.
//!
//! Exposes the cart and order operations over axum, validates bearer
//! tokens from the external identity provider, and maps domain errors to
//! stable HTTP error bodies. All business logic lives in `rentiva-core`
//! and `rentiva-db`; this crate only orchestrates.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;
