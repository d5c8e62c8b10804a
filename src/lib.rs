//! Prerollforge - preroll leader generator
//!
//! This library crate exposes the CLI's configuration handling for
//! integration testing.

pub mod config;
