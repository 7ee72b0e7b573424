//! Common utilities for spectrousb
//!
//! This crate provides the shared error type of the driver surface and the
//! logging setup used by the binaries.

pub mod error;
pub mod logging;

pub use error::{Error, Result};
pub use logging::setup_logging;
