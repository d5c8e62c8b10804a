//! Apple ProRes profiles used by the mastering operation.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::Error;

/// ProRes profile variants understood by ffmpeg's `prores_ks` encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProResProfile {
    Proxy,
    Lt,
    Standard,
    #[default]
    Hq,
    #[serde(rename = "4444")]
    FourFourFourFour,
    #[serde(rename = "4444xq")]
    FourFourFourFourXq,
}

impl ProResProfile {
    /// All profiles, lowest bitrate first.
    pub fn all() -> &'static [ProResProfile] {
        &[
            ProResProfile::Proxy,
            ProResProfile::Lt,
            ProResProfile::Standard,
            ProResProfile::Hq,
            ProResProfile::FourFourFourFour,
            ProResProfile::FourFourFourFourXq,
        ]
    }

    /// Value passed to `-profile:v`.
    pub fn ffmpeg_value(self) -> &'static str {
        match self {
            ProResProfile::Proxy => "0",
            ProResProfile::Lt => "1",
            ProResProfile::Standard => "2",
            ProResProfile::Hq => "3",
            ProResProfile::FourFourFourFour => "4",
            ProResProfile::FourFourFourFourXq => "5",
        }
    }

    /// Pixel format matching the profile's chroma subsampling.
    pub fn pixel_format(self) -> &'static str {
        match self {
            ProResProfile::FourFourFourFour | ProResProfile::FourFourFourFourXq => "yuv444p10le",
            _ => "yuv422p10le",
        }
    }

    /// Short config/CLI name.
    pub fn name(self) -> &'static str {
        match self {
            ProResProfile::Proxy => "proxy",
            ProResProfile::Lt => "lt",
            ProResProfile::Standard => "standard",
            ProResProfile::Hq => "hq",
            ProResProfile::FourFourFourFour => "4444",
            ProResProfile::FourFourFourFourXq => "4444xq",
        }
    }
}

impl fmt::Display for ProResProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProResProfile::Proxy => write!(f, "Proxy"),
            ProResProfile::Lt => write!(f, "LT"),
            ProResProfile::Standard => write!(f, "422 (Standard)"),
            ProResProfile::Hq => write!(f, "422 HQ"),
            ProResProfile::FourFourFourFour => write!(f, "4444"),
            ProResProfile::FourFourFourFourXq => write!(f, "4444 XQ"),
        }
    }
}

impl FromStr for ProResProfile {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        ProResProfile::all()
            .iter()
            .copied()
            .find(|p| p.name() == wanted)
            .ok_or_else(|| {
                let valid: Vec<&str> = ProResProfile::all().iter().map(|p| p.name()).collect();
                Error::Validation(format!(
                    "unknown ProRes profile '{}' (valid: {})",
                    s,
                    valid.join(", ")
                ))
            })
    }
}
