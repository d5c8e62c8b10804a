//! # prerollforge-av
//!
//! The encoding engine boundary for prerollforge.
//!
//! This crate provides:
//!
//! - **Engine seam** ([`EncodingEngine`]) -- the black-box service that stores
//!   input files, runs argument lists and hands back output files.
//! - **ffmpeg engine** ([`FfmpegEngine`]) -- runs each operation as an ffmpeg
//!   subprocess inside a private temp directory.
//! - **Memory engine** ([`MemoryEngine`]) -- records argument lists without
//!   running anything; used for dry runs and tests.
//! - **Command execution** ([`ToolCommand`]) -- async builder with timeout
//!   support for running external processes.
//! - **Tool discovery** ([`ToolRegistry`]) -- find and cache the ffmpeg path.
//! - **Working storage** ([`Workspace`]) -- temp directory with validated
//!   plain-file-name access.

pub mod command;
pub mod engine;
pub mod tools;
pub mod workspace;

// ---- Re-exports for convenience ----

pub use command::{ToolCommand, ToolOutput};
pub use engine::{EncodingEngine, FfmpegEngine, MemoryEngine};
pub use tools::{ToolInfo, ToolRegistry};
pub use workspace::Workspace;
