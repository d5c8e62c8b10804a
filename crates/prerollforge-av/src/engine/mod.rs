//! The [`EncodingEngine`] trait: the black-box encoder every preroll is
//! rendered through.
//!
//! An engine owns a flat working storage. Callers write input files into it,
//! run operations (argument lists in ffmpeg command-line convention) that
//! read and write files there, and finally read the produced file back.
//! Engines are not required to support concurrent operations sharing the
//! same storage; callers submit one operation at a time.

mod ffmpeg;
mod memory;

pub use ffmpeg::FfmpegEngine;
pub use memory::MemoryEngine;

use async_trait::async_trait;
use bytes::Bytes;
use prerollforge_common::Result;

/// An encoding engine with its own working storage.
#[async_trait]
pub trait EncodingEngine: Send + Sync {
    /// A short, human-readable name for this engine (e.g. "ffmpeg").
    fn name(&self) -> &'static str;

    /// Whether [`initialize`](EncodingEngine::initialize) has completed.
    fn is_ready(&self) -> bool;

    /// Prepare the engine. Calling it again on a ready engine is a no-op.
    async fn initialize(&self) -> Result<()>;

    /// Store `bytes` under `name` in working storage.
    async fn write_input_file(&self, name: &str, bytes: &[u8]) -> Result<()>;

    /// Execute one operation and wait for it to finish.
    async fn run_operation(&self, args: &[String]) -> Result<()>;

    /// Read a file produced by a previous operation.
    ///
    /// Returns [`prerollforge_common::Error::FileNotFound`] when absent.
    async fn read_output_file(&self, name: &str) -> Result<Bytes>;

    /// Delete a file from working storage. Missing files are ignored.
    async fn remove_file(&self, name: &str) -> Result<()>;
}
