//! Application configuration types.
//!
//! The top-level [`Config`] struct is deserialized from TOML by the binary and
//! carries the tool, render, output and default-parameter sections. Every
//! section defaults sensibly so an empty file is valid.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::ProResProfile;

/// Default ffmpeg timeout per operation, in seconds.
pub const DEFAULT_TOOL_TIMEOUT_SECS: u64 = 300;

// ---------------------------------------------------------------------------
// Top-level Config
// ---------------------------------------------------------------------------

/// Root application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub tools: ToolsConfig,
    pub render: RenderConfig,
    pub output: OutputConfig,
    pub defaults: DefaultsConfig,
}

impl Config {
    /// Return a list of validation warnings (non-fatal issues).
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if let Some(ref path) = self.tools.ffmpeg_path {
            if !path.exists() {
                warnings.push(format!(
                    "tools.ffmpeg_path {} does not exist; PATH lookup will be used",
                    path.display()
                ));
            }
        }

        if self.tools.timeout_secs == 0 {
            warnings.push("tools.timeout_secs is 0; every operation will time out".into());
        }

        if let Some(ref path) = self.render.font_path {
            if !path.exists() {
                warnings.push(format!(
                    "render.font_path {} does not exist; system fonts will be searched",
                    path.display()
                ));
            }
        }

        if self.defaults.frame_rate.trim().is_empty() {
            warnings.push("defaults.frame_rate is empty".into());
        }

        if self.defaults.resolution.trim().is_empty() {
            warnings.push("defaults.resolution is empty".into());
        }

        if self.defaults.timecode.trim().is_empty() {
            warnings.push("defaults.timecode is empty".into());
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Sub-configs
// ---------------------------------------------------------------------------

/// External tool configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    /// Explicit ffmpeg binary; falls back to `PATH` when unset or missing.
    pub ffmpeg_path: Option<PathBuf>,
    /// Maximum run time of a single engine operation.
    pub timeout_secs: u64,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: None,
            timeout_secs: DEFAULT_TOOL_TIMEOUT_SECS,
        }
    }
}

/// Rendering options applied to every generated preroll.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// TrueType font used for overlay text.
    pub font_path: Option<PathBuf>,
    /// Render the silence/tone/silence audio track.
    pub include_audio: bool,
    /// ProRes profile of the mastered file.
    pub profile: ProResProfile,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            font_path: None,
            include_audio: true,
            profile: ProResProfile::default(),
        }
    }
}

/// Where finished artifacts are written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub directory: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
        }
    }
}

/// Parameter values used when the CLI flag is omitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultsConfig {
    pub frame_rate: String,
    pub resolution: String,
    /// Start timecode; the default places the sync pop at 00:59:58:00.
    pub timecode: String,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            frame_rate: "23.976".into(),
            resolution: "1920x1080".into(),
            timecode: "00:59:50:00".into(),
        }
    }
}
