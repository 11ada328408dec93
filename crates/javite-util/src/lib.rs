#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! Shared utilities for javite.
//!
//! Pure filesystem helpers with no logging/tracing dependencies.
//! Logging is handled by the core and CLI crates.

pub mod fs;
