//! Core types for storegraph.
//!
//! This module provides type-safe wrappers for identifiers and status codes.

pub mod id;
pub mod status;

pub use id::*;
pub use status::*;
