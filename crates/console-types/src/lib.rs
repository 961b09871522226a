//! Foundation types for the console.
//!
//! This crate contains the types shared by every console crate: the error
//! enum, the TOML-backed configuration, and the keystroke decoding table.

pub mod config;
pub mod error;
pub mod keys;
