//! Timeline composition: the fixed intro / pop / tail segment sequence.
//!
//! The visible "2" and the 1 kHz tone both start at second 8, two seconds
//! before program start, which is where a sync pop sits on a leader.

use serde::Serialize;

use crate::params::{FrameRate, PrerollParameters};

/// Frame width at which the title is rendered at [`BASE_FONT_SIZE`].
pub const REFERENCE_WIDTH: f64 = 1920.0;

/// Title font size at [`REFERENCE_WIDTH`].
pub const BASE_FONT_SIZE: f64 = 72.0;

/// Digit shown on the pop frame.
pub const POP_DIGIT: &str = "2";

/// Pop digit size relative to the title size.
pub const POP_DIGIT_SCALE: f64 = 2.0;

/// Sync tone frequency.
pub const TONE_FREQUENCY_HZ: u32 = 1000;

/// Background colour of every video segment.
pub const BACKGROUND_COLOR: &str = "black";

/// Position of a segment within the timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentRole {
    Intro,
    Pop,
    Tail,
}

impl SegmentRole {
    pub fn as_str(self) -> &'static str {
        match self {
            SegmentRole::Intro => "intro",
            SegmentRole::Pop => "pop",
            SegmentRole::Tail => "tail",
        }
    }
}

/// PCM format shared by every audio segment and the final mix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AudioFormat {
    pub sample_rate: u32,
    pub channels: u8,
    pub codec: &'static str,
}

impl Default for AudioFormat {
    fn default() -> Self {
        Self {
            sample_rate: 48_000,
            channels: 2,
            codec: "pcm_s24le",
        }
    }
}

/// Where an overlay sits vertically.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlayPlacement {
    Centered,
    /// Centred, then moved down by `offset` pixels.
    BelowCenter { offset: f64 },
}

/// Text drawn on a video segment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextOverlay {
    pub text: String,
    pub font_size: f64,
    pub placement: OverlayPlacement,
}

/// What a segment is made of.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SegmentKind {
    ColorFill {
        color: &'static str,
        width: u32,
        height: u32,
        frame_rate: FrameRate,
    },
    Tone {
        frequency_hz: u32,
        format: AudioFormat,
    },
    Silence {
        format: AudioFormat,
    },
}

/// One synthetic media segment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MediaSegmentSpec {
    pub role: SegmentRole,
    pub kind: SegmentKind,
    /// Seconds.
    pub duration: f64,
    pub overlays: Vec<TextOverlay>,
}

impl MediaSegmentSpec {
    pub fn is_audio(&self) -> bool {
        matches!(self.kind, SegmentKind::Tone { .. } | SegmentKind::Silence { .. })
    }
}

/// The composed preroll: video segments and, optionally, audio segments,
/// both in `[Intro, Pop, Tail]` order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Timeline {
    pub video: Vec<MediaSegmentSpec>,
    pub audio: Vec<MediaSegmentSpec>,
}

impl Timeline {
    /// Compose the segment sequence for validated parameters.
    pub fn compose(params: &PrerollParameters, include_audio: bool) -> Self {
        let video = compose_video(params);
        let audio = if include_audio {
            compose_audio(params, AudioFormat::default())
        } else {
            Vec::new()
        };
        Self { video, audio }
    }

    pub fn has_audio(&self) -> bool {
        !self.audio.is_empty()
    }

    pub fn has_overlays(&self) -> bool {
        self.video.iter().any(|s| !s.overlays.is_empty())
    }
}

/// Title font size for a frame width.
pub fn title_font_size(width: u32) -> f64 {
    f64::from(width) / REFERENCE_WIDTH * BASE_FONT_SIZE
}

fn compose_video(params: &PrerollParameters) -> Vec<MediaSegmentSpec> {
    let fill = SegmentKind::ColorFill {
        color: BACKGROUND_COLOR,
        width: params.resolution.width,
        height: params.resolution.height,
        frame_rate: params.frame_rate,
    };
    let title_size = title_font_size(params.resolution.width);

    let mut intro_overlays = vec![TextOverlay {
        text: params.film_title.clone(),
        font_size: title_size,
        placement: OverlayPlacement::Centered,
    }];
    if let Some(ref version) = params.version {
        intro_overlays.push(TextOverlay {
            text: format!("Version {version}"),
            font_size: title_size / 2.0,
            placement: OverlayPlacement::BelowCenter { offset: title_size },
        });
    }

    let d = params.durations;
    vec![
        MediaSegmentSpec {
            role: SegmentRole::Intro,
            kind: fill.clone(),
            duration: d.intro,
            overlays: intro_overlays,
        },
        MediaSegmentSpec {
            role: SegmentRole::Pop,
            kind: fill.clone(),
            duration: d.pop,
            overlays: vec![TextOverlay {
                text: POP_DIGIT.to_string(),
                font_size: title_size * POP_DIGIT_SCALE,
                placement: OverlayPlacement::Centered,
            }],
        },
        MediaSegmentSpec {
            role: SegmentRole::Tail,
            kind: fill,
            duration: d.tail,
            overlays: Vec::new(),
        },
    ]
}

fn compose_audio(params: &PrerollParameters, format: AudioFormat) -> Vec<MediaSegmentSpec> {
    let d = params.durations;
    vec![
        MediaSegmentSpec {
            role: SegmentRole::Intro,
            kind: SegmentKind::Silence { format },
            duration: d.intro,
            overlays: Vec::new(),
        },
        MediaSegmentSpec {
            role: SegmentRole::Pop,
            kind: SegmentKind::Tone {
                frequency_hz: TONE_FREQUENCY_HZ,
                format,
            },
            duration: d.pop,
            overlays: Vec::new(),
        },
        MediaSegmentSpec {
            role: SegmentRole::Tail,
            kind: SegmentKind::Silence { format },
            duration: d.tail,
            overlays: Vec::new(),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::RawPrerollInput;

    fn params(fps: &str, res: &str, title: &str, version: Option<&str>) -> PrerollParameters {
        PrerollParameters::validate(RawPrerollInput {
            frame_rate: fps.into(),
            resolution: res.into(),
            film_title: title.into(),
            version: version.map(Into::into),
            timecode: "00:59:50:00".into(),
        })
        .unwrap()
    }

    fn roles(segments: &[MediaSegmentSpec]) -> Vec<SegmentRole> {
        segments.iter().map(|s| s.role).collect()
    }

    #[test]
    fn font_size_scales_with_width() {
        assert_eq!(title_font_size(1920), 72.0);
        assert_eq!(title_font_size(1280), 48.0);
        assert_eq!(title_font_size(640), 24.0);
        assert_eq!(title_font_size(3840), 144.0);
    }

    #[test]
    fn order_is_always_intro_pop_tail() {
        for (fps, res) in [("24", "1920x1080"), ("0.5", "16x16"), ("59.94", "3840x2160")] {
            let timeline = Timeline::compose(&params(fps, res, "T", Some("1")), true);
            let expected = vec![SegmentRole::Intro, SegmentRole::Pop, SegmentRole::Tail];
            assert_eq!(roles(&timeline.video), expected);
            assert_eq!(roles(&timeline.audio), expected);
        }
    }

    #[test]
    fn test_title_at_24fps_1080p() {
        let timeline = Timeline::compose(&params("24", "1920x1080", "Test", None), true);
        let intro = &timeline.video[0];
        assert_eq!(intro.duration, 8.0);
        assert_eq!(intro.overlays.len(), 1);
        assert_eq!(intro.overlays[0].text, "Test");
        assert_eq!(intro.overlays[0].font_size, 72.0);

        let pop = &timeline.video[1];
        assert!((pop.duration - 1.0 / 24.0).abs() < 1e-12);
        assert_eq!(pop.overlays[0].text, "2");
        assert_eq!(pop.overlays[0].font_size, 144.0);

        assert!(timeline.video[2].overlays.is_empty());
    }

    #[test]
    fn version_overlay_sits_below_title_at_half_size() {
        let timeline = Timeline::compose(&params("25", "1280x720", "Film", Some("3b")), false);
        let overlays = &timeline.video[0].overlays;
        assert_eq!(overlays.len(), 2);
        assert_eq!(overlays[1].text, "Version 3b");
        assert_eq!(overlays[1].font_size, 24.0);
        assert_eq!(
            overlays[1].placement,
            OverlayPlacement::BelowCenter { offset: 48.0 }
        );
    }

    #[test]
    fn audio_aligns_tone_with_pop_frame() {
        let p = params("29.97", "1920x1080", "T", None);
        let timeline = Timeline::compose(&p, true);
        assert!(timeline.has_audio());
        assert!(matches!(timeline.audio[0].kind, SegmentKind::Silence { .. }));
        assert!(matches!(
            timeline.audio[1].kind,
            SegmentKind::Tone { frequency_hz: 1000, .. }
        ));
        assert!(matches!(timeline.audio[2].kind, SegmentKind::Silence { .. }));
        for (v, a) in timeline.video.iter().zip(&timeline.audio) {
            assert_eq!(v.duration, a.duration);
        }
        assert!(timeline.audio.iter().all(MediaSegmentSpec::is_audio));
    }

    #[test]
    fn audio_can_be_omitted() {
        let timeline = Timeline::compose(&params("24", "1920x1080", "T", None), false);
        assert!(!timeline.has_audio());
        assert!(timeline.has_overlays());
    }
}
