//! Tempo Core - Foundational types for the Tempo frame dispatcher
//!
//! This crate provides the pieces every other Tempo crate depends on:
//! - `TempoError` - Error type and Result alias
//! - `TempoConfig` - Layered TOML configuration for the dispatcher and clock

mod config;
mod error;

pub use config::{ClockConfig, DispatcherConfig, TempoConfig, CONFIG_FILE_NAME, FIXED_HZ_ENV};
pub use error::{Result, TempoError};
