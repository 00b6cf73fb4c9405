//! Foundation types for XS Terminal.
//!
//! This crate contains the types shared by every XS Terminal crate: the
//! error taxonomy and the runtime configuration.

pub mod config;
pub mod error;
