//! Core types, schedule resolution, and service wiring for the mirra
//! smart-mirror dashboard.

/// Configuration loading and validation.
pub mod config;
/// Domain models shared by the resolver, providers, and display.
pub mod model;
/// Traits describing the provider interfaces.
pub mod ports;
/// Bundle of wired-up provider implementations.
pub mod provider;
/// Resolver for upcoming bin-collection dates.
pub mod schedule;
/// High-level service facade used by the display.
pub mod service;

pub use config::*;
pub use model::*;
pub use ports::*;
pub use provider::*;
pub use schedule::*;
pub use service::*;
