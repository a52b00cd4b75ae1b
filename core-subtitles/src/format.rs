//! Supported subtitle formats.

use crate::cue::SubtitleCue;
use crate::error::Result;
use crate::{srt, vtt};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubtitleFormat {
    Srt,
    Vtt,
}

impl SubtitleFormat {
    /// Format for a file extension, with or without the leading dot.
    pub fn from_extension(extension: &str) -> Option<Self> {
        let extension = extension.trim_start_matches('.');
        if extension.eq_ignore_ascii_case("srt") {
            Some(SubtitleFormat::Srt)
        } else if extension.eq_ignore_ascii_case("vtt") || extension.eq_ignore_ascii_case("webvtt")
        {
            Some(SubtitleFormat::Vtt)
        } else {
            None
        }
    }

    /// Guess the format from content: WebVTT when the first non-blank line
    /// starts with `WEBVTT`, SubRip otherwise.
    pub fn sniff(input: &str) -> Self {
        let input = input.strip_prefix('\u{feff}').unwrap_or(input);
        match input.lines().map(str::trim).find(|line| !line.is_empty()) {
            Some(line) if line.starts_with("WEBVTT") => SubtitleFormat::Vtt,
            _ => SubtitleFormat::Srt,
        }
    }

    /// Parse `input` as this format.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError`](crate::FormatError) for a malformed timing line
    /// or a cue that ends before it starts; no partial result is produced.
    pub fn parse(&self, input: &str) -> Result<Vec<SubtitleCue>> {
        match self {
            SubtitleFormat::Srt => srt::parse(input),
            SubtitleFormat::Vtt => vtt::parse(input),
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            SubtitleFormat::Srt => "srt",
            SubtitleFormat::Vtt => "vtt",
        }
    }
}

impl fmt::Display for SubtitleFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubtitleFormat::Srt => write!(f, "SRT"),
            SubtitleFormat::Vtt => write!(f, "WebVTT"),
        }
    }
}

impl FromStr for SubtitleFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::from_extension(s).ok_or_else(|| format!("unknown subtitle format `{s}`"))
    }
}
