//! Whiteout - strip near-white backgrounds to transparency
//!
//! HTTP server and CLI around the `near-white` pixel crate.
//! This library exposes modules for integration testing.

pub mod api;
pub mod error;
pub mod models;
pub mod rendering;
pub mod server;
pub mod services;
