//! prism-common — Shared domain types, reference data, config and errors
//! used across the PRISM scoring crates.

pub mod error;
pub mod entities;
pub mod prototypes;
pub mod config;

// Re-export commonly used types
pub use config::EngineConfig;
pub use entities::{CognitiveFunction, Quadrant, Role, TypeCode};
pub use error::{PrismError, Result};
pub use prototypes::PrototypeTable;
