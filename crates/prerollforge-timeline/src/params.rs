//! Parameter validation.
//!
//! Raw user-entered strings become a [`PrerollParameters`] value or fail with
//! a validation error before any encoder operation is issued.

use std::fmt;

use prerollforge_common::{Error, Result};
use serde::{Deserialize, Serialize};

/// Total length of every preroll, in seconds.
pub const TOTAL_DURATION: f64 = 10.0;

/// Length of the title segment, in seconds. The sync pop starts here.
pub const INTRO_DURATION: f64 = 8.0;

/// NTSC base rates rendered as `N*1000/1001` rationals.
const NTSC_BASES: &[u32] = &[24, 30, 48, 60, 120];

/// Unvalidated form input.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawPrerollInput {
    pub frame_rate: String,
    pub resolution: String,
    pub film_title: String,
    pub version: Option<String>,
    pub timecode: String,
}

/// Positive, finite frames per second.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FrameRate(f64);

impl FrameRate {
    /// Parse a user-entered frame rate such as `"23.976"` or `"25"`.
    pub fn parse(input: &str) -> Result<Self> {
        let fps: f64 = input
            .trim()
            .parse()
            .map_err(|_| Error::InvalidFrameRate(input.to_string()))?;
        Self::new(fps).map_err(|_| Error::InvalidFrameRate(input.to_string()))
    }

    /// Wrap an already-numeric rate.
    pub fn new(fps: f64) -> Result<Self> {
        if fps.is_finite() && fps > 0.0 {
            Ok(Self(fps))
        } else {
            Err(Error::InvalidFrameRate(fps.to_string()))
        }
    }

    pub fn fps(self) -> f64 {
        self.0
    }

    /// Duration of one frame in seconds.
    pub fn frame_duration(self) -> f64 {
        1.0 / self.0
    }

    /// Rate as given to ffmpeg: NTSC rates as exact rationals
    /// (`23.976` → `24000/1001`), anything else verbatim.
    pub fn ffmpeg_rate(self) -> String {
        if self.0.fract() != 0.0 {
            for &base in NTSC_BASES {
                let ntsc = f64::from(base) * 1000.0 / 1001.0;
                if (self.0 - ntsc).abs() < 0.001 {
                    return format!("{}/1001", base * 1000);
                }
            }
        }
        format_number(self.0)
    }
}

impl fmt::Display for FrameRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Frame size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    /// Parse `"<width>x<height>"`, e.g. `"1920x1080"`.
    pub fn parse(input: &str) -> Result<Self> {
        let invalid = || Error::InvalidResolution(input.to_string());
        let (w, h) = input
            .trim()
            .split_once(['x', 'X'])
            .ok_or_else(invalid)?;
        let width: u32 = w.trim().parse().map_err(|_| invalid())?;
        let height: u32 = h.trim().parse().map_err(|_| invalid())?;
        if width == 0 || height == 0 {
            return Err(invalid());
        }
        Ok(Self { width, height })
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Starting timecode, forwarded verbatim to the mastering operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timecode(String);

impl Timecode {
    pub fn parse(input: &str) -> Result<Self> {
        let tc = input.trim();
        if tc.is_empty() {
            return Err(Error::Validation("starting timecode is empty".into()));
        }
        Ok(Self(tc.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Timecode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Segment lengths derived from the frame rate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimelineDurations {
    pub intro: f64,
    pub pop: f64,
    pub tail: f64,
}

impl TimelineDurations {
    /// Derive the three segment lengths.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidFrameRate`] when one frame is too short to survive
    ///   rendering at microsecond precision (rate above ~2 MHz).
    /// - [`Error::InvalidTiming`] when the tail would be negative (rate < 0.5).
    pub fn for_rate(frame_rate: FrameRate) -> Result<Self> {
        let pop = frame_rate.frame_duration();
        if format_number(pop) == "0" {
            return Err(Error::InvalidFrameRate(frame_rate.to_string()));
        }
        let tail = TOTAL_DURATION - INTRO_DURATION - pop;
        if tail < 0.0 {
            return Err(Error::InvalidTiming {
                frame_rate: frame_rate.fps(),
                tail,
            });
        }
        Ok(Self {
            intro: INTRO_DURATION,
            pop,
            tail,
        })
    }

    pub fn total(&self) -> f64 {
        self.intro + self.pop + self.tail
    }
}

/// Validated preroll request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrerollParameters {
    pub frame_rate: FrameRate,
    pub resolution: Resolution,
    pub film_title: String,
    pub version: Option<String>,
    pub timecode: Timecode,
    pub durations: TimelineDurations,
}

impl PrerollParameters {
    /// Validate raw input, returning the first error found.
    ///
    /// Checks run in order: frame rate, resolution, timecode, timing.
    pub fn validate(raw: RawPrerollInput) -> Result<Self> {
        let frame_rate = FrameRate::parse(&raw.frame_rate)?;
        let resolution = Resolution::parse(&raw.resolution)?;
        let timecode = Timecode::parse(&raw.timecode)?;
        let durations = TimelineDurations::for_rate(frame_rate)?;

        let version = raw
            .version
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());

        Ok(Self {
            frame_rate,
            resolution,
            film_title: raw.film_title,
            version,
            timecode,
            durations,
        })
    }
}

/// Seconds/sizes as ffmpeg arguments: at most six decimals, no trailing zeros.
pub fn format_number(value: f64) -> String {
    let s = format!("{value:.6}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" {
        "0".to_string()
    } else {
        s.to_string()
    }
}
