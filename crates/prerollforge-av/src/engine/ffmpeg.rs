//! Engine backed by the ffmpeg CLI, one subprocess per operation.

use std::path::PathBuf;
use std::sync::OnceLock;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use prerollforge_common::config::ToolsConfig;
use prerollforge_common::{Error, Result};

use super::EncodingEngine;
use crate::command::ToolCommand;
use crate::tools::ToolRegistry;
use crate::workspace::Workspace;

/// Flags prepended to every operation.
const GLOBAL_ARGS: &[&str] = &["-hide_banner", "-nostdin", "-y", "-loglevel", "error"];

struct Ready {
    ffmpeg: PathBuf,
    workspace: Workspace,
    timeout: Duration,
}

/// Runs operations as `ffmpeg` subprocesses with a private temp directory as
/// the working directory, so operation arguments address files by plain name.
pub struct FfmpegEngine {
    config: ToolsConfig,
    ready: OnceLock<Ready>,
    init_lock: tokio::sync::Mutex<()>,
}

impl FfmpegEngine {
    /// Create an uninitialized engine.
    pub fn new(config: ToolsConfig) -> Self {
        Self {
            config,
            ready: OnceLock::new(),
            init_lock: tokio::sync::Mutex::new(()),
        }
    }

    fn ready(&self) -> Result<&Ready> {
        self.ready.get().ok_or(Error::EngineNotReady)
    }

    /// Full argument list submitted to ffmpeg for `args`.
    pub fn command_line(args: &[String]) -> Vec<String> {
        GLOBAL_ARGS
            .iter()
            .map(|s| s.to_string())
            .chain(args.iter().cloned())
            .collect()
    }
}

impl std::fmt::Debug for FfmpegEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FfmpegEngine")
            .field("ready", &self.is_ready())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl EncodingEngine for FfmpegEngine {
    fn name(&self) -> &'static str {
        "ffmpeg"
    }

    fn is_ready(&self) -> bool {
        self.ready.get().is_some()
    }

    async fn initialize(&self) -> Result<()> {
        let _guard = self.init_lock.lock().await;
        if self.is_ready() {
            return Ok(());
        }

        let registry = ToolRegistry::discover(&self.config);
        let ffmpeg = registry.require("ffmpeg")?.to_path_buf();
        let timeout = registry.timeout();
        let workspace = Workspace::new()?;

        tracing::info!(
            "ffmpeg engine ready: {} (workspace {})",
            ffmpeg.display(),
            workspace.temp_dir().display()
        );

        self.ready
            .set(Ready {
                ffmpeg,
                workspace,
                timeout,
            })
            .map_err(|_| Error::Internal("ffmpeg engine initialized twice".into()))
    }

    async fn write_input_file(&self, name: &str, bytes: &[u8]) -> Result<()> {
        let ready = self.ready()?;
        tracing::debug!("write {name} ({} bytes)", bytes.len());
        ready.workspace.write(name, bytes).await
    }

    async fn run_operation(&self, args: &[String]) -> Result<()> {
        let ready = self.ready()?;
        let mut cmd = ToolCommand::new(ready.ffmpeg.clone());
        cmd.args(Self::command_line(args))
            .current_dir(ready.workspace.temp_dir())
            .timeout(ready.timeout);
        tracing::debug!("ffmpeg {}", cmd.get_args().join(" "));
        cmd.execute().await?;
        Ok(())
    }

    async fn read_output_file(&self, name: &str) -> Result<Bytes> {
        self.ready()?.workspace.read(name).await
    }

    async fn remove_file(&self, name: &str) -> Result<()> {
        self.ready()?.workspace.remove(name).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn missing_ffmpeg_config() -> ToolsConfig {
        ToolsConfig {
            ffmpeg_path: None,
            timeout_secs: 5,
        }
    }

    #[tokio::test]
    async fn operations_before_initialize_fail() {
        let engine = FfmpegEngine::new(missing_ffmpeg_config());
        assert!(!engine.is_ready());

        let err = engine.write_input_file("font.ttf", b"x").await.unwrap_err();
        assert!(matches!(err, Error::EngineNotReady));

        let err = engine.run_operation(&["-version".to_string()]).await.unwrap_err();
        assert!(matches!(err, Error::EngineNotReady));

        let err = engine.read_output_file("out.mov").await.unwrap_err();
        assert!(matches!(err, Error::EngineNotReady));
    }

    #[test]
    fn command_line_prepends_global_flags() {
        let line = FfmpegEngine::command_line(&["-i".into(), "in.wav".into()]);
        assert_eq!(
            line,
            vec!["-hide_banner", "-nostdin", "-y", "-loglevel", "error", "-i", "in.wav"]
        );
    }

    #[tokio::test]
    async fn initialize_then_storage_roundtrip() {
        let engine = FfmpegEngine::new(missing_ffmpeg_config());
        if engine.initialize().await.is_err() {
            // ffmpeg not installed; nothing more to check here.
            return;
        }
        assert!(engine.is_ready());
        // Second initialize is a no-op.
        engine.initialize().await.unwrap();

        engine.write_input_file("a.txt", b"abc").await.unwrap();
        assert_eq!(engine.read_output_file("a.txt").await.unwrap(), Bytes::from_static(b"abc"));
        engine.remove_file("a.txt").await.unwrap();
        assert!(matches!(
            engine.read_output_file("a.txt").await.unwrap_err(),
            Error::FileNotFound { .. }
        ));
    }
}
