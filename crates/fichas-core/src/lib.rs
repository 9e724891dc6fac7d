//! Core types and trait definitions for the fichas maintenance tracker.
//!
//! This crate is deliberately free of HTTP and filesystem dependencies.
//! All other crates depend on it; it depends on nothing proprietary.

pub mod error;
pub mod ficha;
pub mod record;
pub mod resolve;
pub mod status;
pub mod store;

pub use error::{Error, Result};
