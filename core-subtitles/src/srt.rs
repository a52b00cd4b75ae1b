//! SubRip (`.srt`) reader.
//!
//! ```text
//! 1
//! 00:00:01,000 --> 00:00:04,000
//! First caption text
//!
//! 2
//! 00:00:05,500 --> 00:00:08,000
//! Second caption text
//! with multiple lines
//! ```
//!
//! Sequence numbers are skipped wherever they appear, so a text line holding
//! nothing but an integer is dropped too. A `.` millisecond separator is
//! accepted alongside the canonical `,`. Anything after the end timestamp
//! (legacy `X1:` coordinates) is ignored.

use std::sync::LazyLock;

use regex::Regex;

use crate::cue::SubtitleCue;
use crate::error::Result;
use crate::parser::{self, clock, Dialect, Timing};

static TIMING_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(\d+):([0-5]\d):([0-5]\d)[,.](\d{3})\s*-->\s*(\d+):([0-5]\d):([0-5]\d)[,.](\d{3})(?:\s.*)?$",
    )
    .expect("SRT timing regex should compile")
});

struct Srt;

impl Dialect for Srt {
    fn timing<'a>(&self, line: &'a str) -> Option<Timing<'a>> {
        let caps = TIMING_LINE.captures(line)?;
        let start = clock(Some(&caps[1]), &caps[2], &caps[3], &caps[4])?;
        let end = clock(Some(&caps[5]), &caps[6], &caps[7], &caps[8])?;
        Some(Timing {
            start,
            end,
            settings: None,
        })
    }

    fn skip_line(&self, line: &str) -> bool {
        line.bytes().all(|b| b.is_ascii_digit())
    }
}

/// Parse a SubRip document.
///
/// # Errors
///
/// [`FormatError`](crate::FormatError) on a malformed timing line or a cue
/// that ends before it starts. No cues are returned in that case.
pub fn parse(input: &str) -> Result<Vec<SubtitleCue>> {
    parser::parse(input, &Srt)
}
