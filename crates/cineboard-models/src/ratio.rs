//! Aspect ratios and backend output sizes.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Supported frame aspect ratios.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum AspectRatio {
    /// 16:9 cinema
    #[serde(rename = "16:9")]
    Widescreen,
    /// 9:16 vertical
    #[serde(rename = "9:16")]
    Vertical,
    /// 1:1 social
    #[serde(rename = "1:1")]
    Square,
    /// 4:3 TV
    #[serde(rename = "4:3")]
    Classic,
    /// 3:4 portrait
    #[serde(rename = "3:4")]
    ClassicPortrait,
    /// 2.39:1 anamorphic
    #[serde(rename = "2.39:1")]
    Anamorphic,
}

/// Pixel dimensions sent to the generation backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct OutputSize {
    pub width: u32,
    pub height: u32,
}

impl OutputSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl fmt::Display for OutputSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl AspectRatio {
    pub const ALL: &'static [AspectRatio] = &[
        AspectRatio::Widescreen,
        AspectRatio::Vertical,
        AspectRatio::Square,
        AspectRatio::Classic,
        AspectRatio::ClassicPortrait,
        AspectRatio::Anamorphic,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AspectRatio::Widescreen => "16:9",
            AspectRatio::Vertical => "9:16",
            AspectRatio::Square => "1:1",
            AspectRatio::Classic => "4:3",
            AspectRatio::ClassicPortrait => "3:4",
            AspectRatio::Anamorphic => "2.39:1",
        }
    }

    /// Backend output resolution for this ratio.
    ///
    /// The generation endpoint requires at least ~3.7M pixels, so these sit
    /// comfortably above that floor.
    pub fn output_size(&self) -> OutputSize {
        match self {
            AspectRatio::Widescreen => OutputSize::new(2560, 1440),
            AspectRatio::Vertical => OutputSize::new(1440, 2560),
            AspectRatio::Square => OutputSize::new(2048, 2048),
            AspectRatio::Classic => OutputSize::new(2304, 1728),
            AspectRatio::ClassicPortrait => OutputSize::new(1728, 2304),
            AspectRatio::Anamorphic => OutputSize::new(3072, 1280),
        }
    }
}

impl Default for AspectRatio {
    fn default() -> Self {
        AspectRatio::Widescreen
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AspectRatio {
    type Err = AspectRatioParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "16:9" => Ok(AspectRatio::Widescreen),
            "9:16" => Ok(AspectRatio::Vertical),
            "1:1" => Ok(AspectRatio::Square),
            "4:3" => Ok(AspectRatio::Classic),
            "3:4" => Ok(AspectRatio::ClassicPortrait),
            "2.39:1" => Ok(AspectRatio::Anamorphic),
            other => Err(AspectRatioParseError(other.to_string())),
        }
    }
}

#[derive(Debug, Error)]
#[error("Unknown aspect ratio: {0}")]
pub struct AspectRatioParseError(String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        assert_eq!("16:9".parse::<AspectRatio>().unwrap(), AspectRatio::Widescreen);
        assert_eq!("2.39:1".parse::<AspectRatio>().unwrap(), AspectRatio::Anamorphic);
        assert!("21:9".parse::<AspectRatio>().is_err());
        for r in AspectRatio::ALL {
            assert_eq!(r.as_str().parse::<AspectRatio>().unwrap(), *r);
        }
    }

    #[test]
    fn test_serializes_as_ratio_string() {
        assert_eq!(
            serde_json::to_string(&AspectRatio::Anamorphic).unwrap(),
            "\"2.39:1\""
        );
        assert_eq!(
            serde_json::from_str::<AspectRatio>("\"9:16\"").unwrap(),
            AspectRatio::Vertical
        );
    }

    #[test]
    fn test_output_sizes() {
        assert_eq!(AspectRatio::Widescreen.output_size().to_string(), "2560x1440");
        assert_eq!(AspectRatio::Vertical.output_size().to_string(), "1440x2560");
        assert_eq!(AspectRatio::Anamorphic.output_size().to_string(), "3072x1280");
    }
}
