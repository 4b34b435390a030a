//! Core library for the `surfcast` CLI.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - Abstraction over point-forecast clients
//! - The StormGlass client with its response normalization pipeline
//! - Shared domain models (normalized forecast points)
//!
//! It is used by `surfcast-cli`, but can also be reused by other binaries or services.

pub mod client;
pub mod config;
pub mod model;

pub use client::{ForecastClient, client_from_config, stormglass::StormGlassError};
pub use config::Config;
pub use model::ForecastPoint;
