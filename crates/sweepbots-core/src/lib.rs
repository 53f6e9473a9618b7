//! Core types, configuration and wire-protocol tables for the sweepbots
//! visualization client.

pub mod config;
pub mod error;
pub mod protocol;
pub mod types;

pub use config::*;
pub use error::{Error, Result};
pub use protocol::*;
pub use types::*;
