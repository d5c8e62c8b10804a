//! Typed encoder operations.
//!
//! Each [`EncodeOperation`] is one unit of work for the encoding engine. The
//! variants carry typed fields; the ffmpeg argument list is produced only by
//! [`EncodeOperation::to_args`], so escaping lives in one place.

use prerollforge_common::ProResProfile;
use serde::Serialize;

use crate::filter::overlay_chain;
use crate::params::{format_number, FrameRate, Timecode, TOTAL_DURATION};
use crate::segment::{AudioFormat, MediaSegmentSpec, SegmentKind, SegmentRole, TextOverlay};

/// Filter-graph label of the composed video stream.
pub const VIDEO_LABEL: &str = "vout";

/// Filter-graph label of the concatenated audio stream.
pub const AUDIO_LABEL: &str = "aout";

/// Lossless codec for the composed-video intermediate.
const INTERMEDIATE_VIDEO_CODEC: &str = "ffv1";

/// A synthetic audio source.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AudioSource {
    Silence,
    Tone { frequency_hz: u32 },
}

/// One colour-filled video segment with its overlays.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VideoSegment {
    pub role: SegmentRole,
    pub color: &'static str,
    pub width: u32,
    pub height: u32,
    pub frame_rate: FrameRate,
    pub duration: f64,
    pub overlays: Vec<TextOverlay>,
}

impl VideoSegment {
    /// Convert a colour-fill segment; `None` for audio segments.
    pub fn from_spec(spec: &MediaSegmentSpec) -> Option<Self> {
        match spec.kind {
            SegmentKind::ColorFill {
                color,
                width,
                height,
                frame_rate,
            } => Some(Self {
                role: spec.role,
                color,
                width,
                height,
                frame_rate,
                duration: spec.duration,
                overlays: spec.overlays.clone(),
            }),
            _ => None,
        }
    }

    fn lavfi_source(&self) -> String {
        format!(
            "color=c={}:s={}x{}:r={}:d={}",
            self.color,
            self.width,
            self.height,
            self.frame_rate.ffmpeg_rate(),
            format_number(self.duration)
        )
    }
}

/// One unit of work for the encoding engine.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum EncodeOperation {
    /// Render one audio segment to a PCM file.
    SynthesizeAudio {
        role: SegmentRole,
        source: AudioSource,
        duration: f64,
        format: AudioFormat,
        output: String,
    },
    /// Join audio files in the given order.
    ConcatAudio {
        inputs: Vec<String>,
        format: AudioFormat,
        output: String,
    },
    /// Generate the video segments, draw overlays and concatenate them into a
    /// lossless intermediate.
    ComposeVideo {
        segments: Vec<VideoSegment>,
        font_file: Option<String>,
        output: String,
    },
    /// Encode the final QuickTime file with ProRes video, optional PCM audio
    /// and a start timecode.
    Master {
        video: String,
        audio: Option<String>,
        audio_format: AudioFormat,
        title: String,
        timecode: Timecode,
        profile: ProResProfile,
        output: String,
    },
}

impl EncodeOperation {
    /// Build a [`EncodeOperation::SynthesizeAudio`]; `None` for video segments.
    pub fn synthesize_audio(spec: &MediaSegmentSpec, output: impl Into<String>) -> Option<Self> {
        let (source, format) = match spec.kind {
            SegmentKind::Silence { format } => (AudioSource::Silence, format),
            SegmentKind::Tone {
                frequency_hz,
                format,
            } => (AudioSource::Tone { frequency_hz }, format),
            SegmentKind::ColorFill { .. } => return None,
        };
        Some(EncodeOperation::SynthesizeAudio {
            role: spec.role,
            source,
            duration: spec.duration,
            format,
            output: output.into(),
        })
    }

    /// Short label for logs and errors, e.g. `synthesize-audio:pop`.
    pub fn label(&self) -> String {
        match self {
            EncodeOperation::SynthesizeAudio { role, .. } => {
                format!("synthesize-audio:{}", role.as_str())
            }
            EncodeOperation::ConcatAudio { .. } => "concat-audio".to_string(),
            EncodeOperation::ComposeVideo { .. } => "compose-video".to_string(),
            EncodeOperation::Master { .. } => "master".to_string(),
        }
    }

    /// Working-storage files this operation reads.
    pub fn inputs(&self) -> Vec<&str> {
        match self {
            EncodeOperation::SynthesizeAudio { .. } => Vec::new(),
            EncodeOperation::ConcatAudio { inputs, .. } => {
                inputs.iter().map(String::as_str).collect()
            }
            EncodeOperation::ComposeVideo { font_file, .. } => {
                font_file.iter().map(String::as_str).collect()
            }
            EncodeOperation::Master { video, audio, .. } => std::iter::once(video.as_str())
                .chain(audio.as_deref())
                .collect(),
        }
    }

    /// Working-storage file this operation writes.
    pub fn output(&self) -> &str {
        match self {
            EncodeOperation::SynthesizeAudio { output, .. }
            | EncodeOperation::ConcatAudio { output, .. }
            | EncodeOperation::ComposeVideo { output, .. }
            | EncodeOperation::Master { output, .. } => output,
        }
    }

    /// ffmpeg argument list. The output file is always the last argument.
    pub fn to_args(&self) -> Vec<String> {
        let mut args: Vec<String> = Vec::new();

        match self {
            EncodeOperation::SynthesizeAudio {
                source,
                duration,
                format,
                output,
                ..
            } => {
                let lavfi = match source {
                    AudioSource::Silence => format!(
                        "anullsrc=r={}:cl={}",
                        format.sample_rate,
                        channel_layout(format.channels)
                    ),
                    AudioSource::Tone { frequency_hz } => format!(
                        "sine=frequency={}:sample_rate={}",
                        frequency_hz, format.sample_rate
                    ),
                };
                push(&mut args, &["-f", "lavfi", "-i", &lavfi]);
                push(&mut args, &["-t", &format_number(*duration)]);
                args.extend(audio_codec_args(format));
                push(&mut args, &[output.as_str()]);
            }
            EncodeOperation::ConcatAudio {
                inputs,
                format,
                output,
            } => {
                for input in inputs {
                    push(&mut args, &["-i", input.as_str()]);
                }
                let pads: String = (0..inputs.len()).map(|i| format!("[{i}:a]")).collect();
                let graph = format!(
                    "{pads}concat=n={}:v=0:a=1[{AUDIO_LABEL}]",
                    inputs.len()
                );
                push(&mut args, &["-filter_complex", &graph]);
                push(&mut args, &["-map", &format!("[{AUDIO_LABEL}]")]);
                args.extend(audio_codec_args(format));
                push(&mut args, &[output.as_str()]);
            }
            EncodeOperation::ComposeVideo {
                segments,
                font_file,
                output,
            } => {
                for segment in segments {
                    push(&mut args, &["-f", "lavfi", "-i", &segment.lavfi_source()]);
                }
                let mut chains: Vec<String> = segments
                    .iter()
                    .enumerate()
                    .map(|(i, s)| {
                        format!(
                            "[{i}:v]{}[v{i}]",
                            overlay_chain(font_file.as_deref(), &s.overlays)
                        )
                    })
                    .collect();
                let pads: String = (0..segments.len()).map(|i| format!("[v{i}]")).collect();
                chains.push(format!(
                    "{pads}concat=n={}:v=1:a=0[{VIDEO_LABEL}]",
                    segments.len()
                ));
                push(&mut args, &["-filter_complex", &chains.join(";")]);
                push(&mut args, &["-map", &format!("[{VIDEO_LABEL}]")]);
                push(&mut args, &["-c:v", INTERMEDIATE_VIDEO_CODEC, "-level", "3"]);
                push(&mut args, &[output.as_str()]);
            }
            EncodeOperation::Master {
                video,
                audio,
                audio_format,
                title,
                timecode,
                profile,
                output,
            } => {
                push(&mut args, &["-i", video.as_str()]);
                if let Some(audio) = audio {
                    push(&mut args, &["-i", audio.as_str()]);
                }
                push(&mut args, &["-map", "0:v:0"]);
                if audio.is_some() {
                    push(&mut args, &["-map", "1:a:0"]);
                }
                push(&mut args, &[
                    "-c:v",
                    "prores_ks",
                    "-profile:v",
                    profile.ffmpeg_value(),
                    "-vendor",
                    "apl0",
                    "-pix_fmt",
                    profile.pixel_format(),
                ]);
                if audio.is_some() {
                    push(&mut args, &["-c:a", audio_format.codec]);
                }
                push(&mut args, &["-timecode", timecode.as_str()]);
                push(&mut args, &["-metadata", &format!("title={title}")]);
                push(&mut args, &["-t", &format_number(TOTAL_DURATION)]);
                push(&mut args, &[output.as_str()]);
            }
        }

        args
    }
}

fn channel_layout(channels: u8) -> &'static str {
    match channels {
        1 => "mono",
        _ => "stereo",
    }
}

fn push(args: &mut Vec<String>, items: &[&str]) {
    args.extend(items.iter().map(|s| s.to_string()));
}

fn audio_codec_args(format: &AudioFormat) -> [String; 6] {
    [
        "-ac".to_string(),
        format.channels.to_string(),
        "-ar".to_string(),
        format.sample_rate.to_string(),
        "-c:a".to_string(),
        format.codec.to_string(),
    ]
}
