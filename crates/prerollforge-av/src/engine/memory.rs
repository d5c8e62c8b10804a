//! In-process engine that records operations instead of running them.
//!
//! [`MemoryEngine`] keeps working storage in a map and, for every operation,
//! checks that each file input (`-i <name>` not preceded by `-f lavfi`) is
//! present, then materializes an empty file under the operation's output name
//! (its last argument). The CLI uses it for `--dry-run`.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use prerollforge_common::{Error, Result};

use super::EncodingEngine;
use crate::workspace::validate_name;

/// Recording engine with map-backed working storage.
#[derive(Debug, Default)]
pub struct MemoryEngine {
    ready: AtomicBool,
    files: Mutex<HashMap<String, Bytes>>,
    operations: Mutex<Vec<Vec<String>>>,
    fail_at: Option<usize>,
    dropped_suffix: Option<String>,
}

impl MemoryEngine {
    /// Create an uninitialized engine.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: make the `index`-th (zero-based) `run_operation` call fail.
    pub fn failing_at(mut self, index: usize) -> Self {
        self.fail_at = Some(index);
        self
    }

    /// Builder: run operations whose output name ends with `suffix` without
    /// producing that output.
    pub fn dropping_outputs(mut self, suffix: impl Into<String>) -> Self {
        self.dropped_suffix = Some(suffix.into());
        self
    }

    /// Argument lists of every `run_operation` call so far, in order.
    pub fn operations(&self) -> Vec<Vec<String>> {
        self.operations.lock().clone()
    }

    /// Names currently present in working storage, sorted.
    pub fn file_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.files.lock().keys().cloned().collect();
        names.sort();
        names
    }

    fn ensure_ready(&self) -> Result<()> {
        if self.is_ready() {
            Ok(())
        } else {
            Err(Error::EngineNotReady)
        }
    }
}

/// File inputs of an argument list: values of `-i` not preceded by `-f lavfi`.
fn file_inputs(args: &[String]) -> Vec<&str> {
    let mut inputs = Vec::new();
    let mut lavfi = false;
    let mut iter = args.iter().peekable();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-f" => lavfi = iter.next().map(|f| f == "lavfi").unwrap_or(false),
            "-i" => {
                if let Some(input) = iter.next() {
                    if !lavfi {
                        inputs.push(input.as_str());
                    }
                }
                lavfi = false;
            }
            _ => {}
        }
    }
    inputs
}

#[async_trait]
impl EncodingEngine for MemoryEngine {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    async fn initialize(&self) -> Result<()> {
        self.ready.store(true, Ordering::Release);
        Ok(())
    }

    async fn write_input_file(&self, name: &str, bytes: &[u8]) -> Result<()> {
        self.ensure_ready()?;
        validate_name(name)?;
        self.files
            .lock()
            .insert(name.to_string(), Bytes::copy_from_slice(bytes));
        Ok(())
    }

    async fn run_operation(&self, args: &[String]) -> Result<()> {
        self.ensure_ready()?;

        let index = {
            let mut ops = self.operations.lock();
            ops.push(args.to_vec());
            ops.len() - 1
        };

        if self.fail_at == Some(index) {
            return Err(Error::tool("memory", format!("simulated failure of operation {index}")));
        }

        {
            let files = self.files.lock();
            if let Some(missing) = file_inputs(args).into_iter().find(|i| !files.contains_key(*i)) {
                return Err(Error::file_not_found(missing));
            }
        }

        let output = args
            .last()
            .ok_or_else(|| Error::tool("memory", "empty argument list"))?;
        validate_name(output)?;

        let dropped = self
            .dropped_suffix
            .as_deref()
            .is_some_and(|suffix| output.ends_with(suffix));
        if !dropped {
            self.files.lock().insert(output.clone(), Bytes::new());
        }
        Ok(())
    }

    async fn read_output_file(&self, name: &str) -> Result<Bytes> {
        self.ensure_ready()?;
        self.files
            .lock()
            .get(name)
            .cloned()
            .ok_or_else(|| Error::file_not_found(name))
    }

    async fn remove_file(&self, name: &str) -> Result<()> {
        self.ensure_ready()?;
        self.files.lock().remove(name);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn not_ready_until_initialized() {
        let engine = MemoryEngine::new();
        let err = engine.write_input_file("a", b"x").await.unwrap_err();
        assert!(matches!(err, Error::EngineNotReady));
        engine.initialize().await.unwrap();
        engine.write_input_file("a", b"x").await.unwrap();
    }

    #[tokio::test]
    async fn operation_materializes_output() {
        let engine = MemoryEngine::new();
        engine.initialize().await.unwrap();
        engine
            .run_operation(&args(&["-f", "lavfi", "-i", "anullsrc", "-t", "8", "silence.wav"]))
            .await
            .unwrap();
        assert_eq!(engine.file_names(), vec!["silence.wav"]);
        assert_eq!(engine.operations().len(), 1);
    }

    #[tokio::test]
    async fn missing_file_input_is_rejected() {
        let engine = MemoryEngine::new();
        engine.initialize().await.unwrap();
        let err = engine
            .run_operation(&args(&["-i", "video.mkv", "out.mov"]))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::FileNotFound { ref name } if name == "video.mkv"));
    }

    #[tokio::test]
    async fn failing_at_fails_that_call_only() {
        let engine = MemoryEngine::new().failing_at(1);
        engine.initialize().await.unwrap();
        engine.run_operation(&args(&["a.wav"])).await.unwrap();
        assert!(engine.run_operation(&args(&["b.wav"])).await.is_err());
        engine.run_operation(&args(&["c.wav"])).await.unwrap();
    }

    #[tokio::test]
    async fn dropped_outputs_are_not_stored() {
        let engine = MemoryEngine::new().dropping_outputs(".mov");
        engine.initialize().await.unwrap();
        engine.run_operation(&args(&["video.mkv"])).await.unwrap();
        engine.run_operation(&args(&["-i", "video.mkv", "out.mov"])).await.unwrap();
        assert_eq!(engine.file_names(), vec!["video.mkv"]);
    }

    #[test]
    fn file_inputs_skip_lavfi_sources() {
        let list = args(&[
            "-f", "lavfi", "-i", "color=c=black", "-i", "audio.wav", "-f", "lavfi", "-i", "sine",
            "out.mov",
        ]);
        assert_eq!(file_inputs(&list), vec!["audio.wav"]);
    }
}
