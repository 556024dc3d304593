//! Parsing and validation of `weft.toml` configuration files.
//!
//! The configuration carries elaboration options, export options and the
//! selected PDK together with its opaque installation data. It is threaded
//! explicitly through elaboration and compilation; there is no global state.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_from_str};
pub use types::*;
