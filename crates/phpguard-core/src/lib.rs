//! # phpguard-core
//!
//! Foundation crate for the phpguard rule engine.
//! Defines the violation model, rule metadata, errors, config, and tracing setup.
//! Every other crate in the workspace depends on this.

pub mod config;
pub mod errors;
pub mod tracing;
pub mod types;

// Re-export the most commonly used types at the crate root.
pub use config::EngineConfig;
pub use errors::error_code::PhpGuardErrorCode;
pub use errors::{ConfigError, ParseError, RuleError};
pub use types::metadata::{ConfigOption, OptionType, RuleMetadata};
pub use types::violation::{Severity, Violation, ViolationBuilder};
