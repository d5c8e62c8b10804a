//! Prerollforge-Common: shared error type and configuration.
//!
//! This crate provides the pieces every other prerollforge crate depends on:
//!
//! - **Error Handling**: the unified [`Error`] enum and [`Result`] alias
//! - **Configuration**: [`config::Config`] and its sections, deserialized from TOML
//!   by the binary
//! - **Codec Profiles**: [`ProResProfile`] for the mastering operation
//!
//! # Examples
//!
//! ```
//! use prerollforge_common::{Error, ProResProfile, Result};
//!
//! fn check(rate: f64) -> Result<f64> {
//!     if rate > 0.0 {
//!         Ok(rate)
//!     } else {
//!         Err(Error::InvalidFrameRate(rate.to_string()))
//!     }
//! }
//!
//! assert!(check(24.0).is_ok());
//! assert_eq!(ProResProfile::default().ffmpeg_value(), "3");
//! ```

pub mod config;
pub mod error;
pub mod profile;

pub use error::{Error, Result};
pub use profile::ProResProfile;
