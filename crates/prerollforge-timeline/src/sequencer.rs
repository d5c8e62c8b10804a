//! Operation sequencing: validated parameters in, an ordered [`Plan`] out.
//!
//! Step order is fixed:
//!
//! 1. write the font into engine storage (when a font is supplied and the
//!    timeline draws text),
//! 2. with audio: synthesize each audio segment, then concatenate them,
//! 3. compose the video segments into one intermediate,
//! 4. master the final `.mov`.
//!
//! Every working name carries a per-request [`RequestTag`] prefix.

use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use bytes::Bytes;
use prerollforge_common::{Error, ProResProfile, Result};
use serde::Serialize;

use crate::operation::{EncodeOperation, VideoSegment};
use crate::params::PrerollParameters;
use crate::segment::{AudioFormat, Timeline};

/// Font file supplied by the caller for drawtext overlays.
#[derive(Debug, Clone)]
pub struct FontResource {
    /// Original file name; only its extension is kept.
    pub file_name: String,
    pub data: Bytes,
}

impl FontResource {
    pub fn new(file_name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            data: data.into(),
        }
    }

    /// Read a font from disk.
    pub async fn load(path: &Path) -> Result<Self> {
        let data = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "font.ttf".to_string());
        Ok(Self::new(file_name, data))
    }

    fn extension(&self) -> &str {
        Path::new(&self.file_name)
            .extension()
            .and_then(|e| e.to_str())
            .filter(|e| !e.is_empty() && e.chars().all(|c| c.is_ascii_alphanumeric()))
            .unwrap_or("ttf")
    }
}

/// Per-request prefix for working names, `pf-<8 hex>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RequestTag(String);

impl RequestTag {
    /// A fresh random tag.
    pub fn new() -> Self {
        let id = uuid::Uuid::new_v4().simple().to_string();
        Self(format!("pf-{}", &id[..8]))
    }

    /// A fixed tag, for reproducible plans.
    pub fn fixed(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    /// Working name `<tag>-<suffix>`.
    pub fn name(&self, suffix: &str) -> String {
        format!("{}-{}", self.0, suffix)
    }
}

impl Default for RequestTag {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One engine interaction.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum EngineStep {
    WriteInput {
        name: String,
        #[serde(skip)]
        data: Bytes,
    },
    Run(EncodeOperation),
}

impl EngineStep {
    pub fn label(&self) -> String {
        match self {
            EngineStep::WriteInput { name, .. } => format!("write-input:{name}"),
            EngineStep::Run(op) => op.label(),
        }
    }
}

/// Knobs that shape a plan beyond the validated parameters.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlanOptions<'a> {
    pub font: Option<&'a FontResource>,
    pub include_audio: bool,
    pub profile: ProResProfile,
}

/// Ordered engine steps for one preroll.
#[derive(Debug, Clone, Serialize)]
pub struct Plan {
    pub tag: RequestTag,
    pub steps: Vec<EngineStep>,
    /// Name of the final `.mov` in engine storage.
    pub output_name: String,
    /// Intermediate names, removed once the run ends.
    pub scratch: Vec<String>,
}

impl Plan {
    /// Build the plan for `params`.
    pub fn build(params: &PrerollParameters, options: &PlanOptions<'_>, tag: RequestTag) -> Self {
        let timeline = Timeline::compose(params, options.include_audio);
        let mut steps = Vec::new();
        let mut scratch = Vec::new();

        let font_file = match options.font {
            Some(font) if timeline.has_overlays() => {
                let name = tag.name(&format!("font.{}", font.extension()));
                steps.push(EngineStep::WriteInput {
                    name: name.clone(),
                    data: font.data.clone(),
                });
                scratch.push(name.clone());
                Some(name)
            }
            _ => None,
        };

        let audio = if timeline.has_audio() {
            let mut parts = Vec::with_capacity(timeline.audio.len());
            for segment in &timeline.audio {
                let name = tag.name(&format!("audio-{}.wav", segment.role.as_str()));
                if let Some(op) = EncodeOperation::synthesize_audio(segment, name.clone()) {
                    steps.push(EngineStep::Run(op));
                    scratch.push(name.clone());
                    parts.push(name);
                }
            }
            let mixed = tag.name("audio.wav");
            steps.push(EngineStep::Run(EncodeOperation::ConcatAudio {
                inputs: parts,
                format: AudioFormat::default(),
                output: mixed.clone(),
            }));
            scratch.push(mixed.clone());
            Some(mixed)
        } else {
            None
        };

        let video = tag.name("video.mkv");
        steps.push(EngineStep::Run(EncodeOperation::ComposeVideo {
            segments: timeline.video.iter().filter_map(VideoSegment::from_spec).collect(),
            font_file,
            output: video.clone(),
        }));
        scratch.push(video.clone());

        let output_name = tag.name("preroll.mov");
        steps.push(EngineStep::Run(EncodeOperation::Master {
            video,
            audio,
            audio_format: AudioFormat::default(),
            title: params.film_title.clone(),
            timecode: params.timecode.clone(),
            profile: options.profile,
            output: output_name.clone(),
        }));

        Self {
            tag,
            steps,
            output_name,
            scratch,
        }
    }

    /// Check that every operation input is written or produced by an earlier
    /// step, and that the final output is produced.
    pub fn check_dependencies(&self) -> Result<()> {
        let mut available: HashSet<&str> = HashSet::new();
        for step in &self.steps {
            match step {
                EngineStep::WriteInput { name, .. } => {
                    available.insert(name);
                }
                EngineStep::Run(op) => {
                    if let Some(missing) = op.inputs().into_iter().find(|i| !available.contains(i)) {
                        return Err(Error::Internal(format!(
                            "{} reads {} before it is produced",
                            op.label(),
                            missing
                        )));
                    }
                    available.insert(op.output());
                }
            }
        }
        if !available.contains(self.output_name.as_str()) {
            return Err(Error::Internal(format!(
                "no step produces {}",
                self.output_name
            )));
        }
        Ok(())
    }

    /// The encode operations, in order.
    pub fn operations(&self) -> impl Iterator<Item = &EncodeOperation> {
        self.steps.iter().filter_map(|s| match s {
            EngineStep::Run(op) => Some(op),
            EngineStep::WriteInput { .. } => None,
        })
    }

    /// ffmpeg argument lists of every operation.
    pub fn command_lines(&self) -> Vec<Vec<String>> {
        self.operations().map(EncodeOperation::to_args).collect()
    }

    /// Every name this plan leaves in engine storage.
    pub fn cleanup_names(&self) -> impl Iterator<Item = &str> {
        self.scratch
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(self.output_name.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::RawPrerollInput;

    fn params(title: &str) -> PrerollParameters {
        PrerollParameters::validate(RawPrerollInput {
            frame_rate: "24".into(),
            resolution: "1920x1080".into(),
            film_title: title.into(),
            version: Some("2".into()),
            timecode: "00:59:50:00".into(),
        })
        .unwrap()
    }

    fn font() -> FontResource {
        FontResource::new("DejaVuSans.ttf", &b"font-bytes"[..])
    }

    #[test]
    fn full_plan_order() {
        let font = font();
        let options = PlanOptions {
            font: Some(&font),
            include_audio: true,
            profile: ProResProfile::Hq,
        };
        let plan = Plan::build(&params("Test"), &options, RequestTag::fixed("pf-test"));
        let labels: Vec<String> = plan.steps.iter().map(EngineStep::label).collect();
        assert_eq!(
            labels,
            vec![
                "write-input:pf-test-font.ttf",
                "synthesize-audio:intro",
                "synthesize-audio:pop",
                "synthesize-audio:tail",
                "concat-audio",
                "compose-video",
                "master",
            ]
        );
        assert_eq!(plan.output_name, "pf-test-preroll.mov");
        plan.check_dependencies().unwrap();
    }

    #[test]
    fn no_audio_skips_audio_steps() {
        let options = PlanOptions {
            font: None,
            include_audio: false,
            profile: ProResProfile::default(),
        };
        let plan = Plan::build(&params("Test"), &options, RequestTag::fixed("pf-x"));
        assert_eq!(plan.steps.len(), 2);
        match plan.steps.last().unwrap() {
            EngineStep::Run(EncodeOperation::Master { audio, .. }) => assert!(audio.is_none()),
            other => panic!("unexpected last step {other:?}"),
        }
        plan.check_dependencies().unwrap();
    }

    #[test]
    fn every_name_is_tagged() {
        let font = font();
        let options = PlanOptions {
            font: Some(&font),
            include_audio: true,
            profile: ProResProfile::Hq,
        };
        let plan = Plan::build(&params("Test"), &options, RequestTag::new());
        let prefix = format!("{}-", plan.tag);
        assert!(plan.tag.to_string().starts_with("pf-"));
        assert_eq!(plan.tag.to_string().len(), 11);
        for name in plan.cleanup_names() {
            assert!(name.starts_with(&prefix), "{name}");
        }
        assert_eq!(plan.cleanup_names().count(), plan.scratch.len() + 1);
    }

    #[test]
    fn fresh_tags_differ() {
        assert_ne!(RequestTag::new(), RequestTag::new());
    }

    #[test]
    fn title_is_escaped_in_overlay_args() {
        let options = PlanOptions {
            font: None,
            include_audio: false,
            profile: ProResProfile::Hq,
        };
        let plan = Plan::build(&params("O'Brien"), &options, RequestTag::fixed("pf-q"));
        let lines = plan.command_lines();
        let graph = lines[0]
            .iter()
            .skip_while(|a| *a != "-filter_complex")
            .nth(1)
            .unwrap();
        assert!(graph.contains(r"'O\'\''Brien'"));
        assert!(!graph.contains("O'B"));
    }

    #[test]
    fn detects_missing_dependency() {
        let options = PlanOptions {
            font: None,
            include_audio: true,
            profile: ProResProfile::Hq,
        };
        let mut plan = Plan::build(&params("Test"), &options, RequestTag::fixed("pf-d"));
        plan.steps.remove(0);
        let err = plan.check_dependencies().unwrap_err();
        assert!(err.to_string().contains("concat-audio"), "{err}");
    }

    #[test]
    fn unusual_font_extension_falls_back_to_ttf() {
        let font = FontResource::new("weird.t t f", &b""[..]);
        assert_eq!(font.extension(), "ttf");
        assert_eq!(FontResource::new("Font.OTF", &b""[..]).extension(), "OTF");
    }

    #[test]
    fn plan_serializes_without_font_bytes() {
        let font = font();
        let options = PlanOptions {
            font: Some(&font),
            include_audio: false,
            profile: ProResProfile::Hq,
        };
        let plan = Plan::build(&params("Test"), &options, RequestTag::fixed("pf-j"));
        let json = serde_json::to_value(&plan).unwrap();
        assert_eq!(json["tag"], "pf-j");
        assert_eq!(json["steps"][0]["step"], "write_input");
        assert!(json["steps"][0].get("data").is_none());
    }
}
