//! Line-oriented cue extraction shared by the SRT and WebVTT readers.
//!
//! Every line containing `-->` opens a new cue and must parse as a timing
//! line. Free text accumulates into the open cue until the next timing line
//! or the end of input. Blank lines separate blocks but do not close a cue.
//! A block whose first line sits directly above a timing line is a cue
//! identifier and is dropped.

use crate::cue::{StyleNode, SubtitleCue};
use crate::error::{FormatError, Result};
use std::time::Duration;
use tracing::trace;

/// Parsed timing line.
pub(crate) struct Timing<'a> {
    pub start: Duration,
    pub end: Duration,
    pub settings: Option<&'a str>,
}

/// Format-specific hooks for [`parse`].
pub(crate) trait Dialect {
    /// Parse a line that contains `-->`. `None` means malformed.
    fn timing<'a>(&self, line: &'a str) -> Option<Timing<'a>>;

    /// Lines dropped wherever they appear.
    fn skip_line(&self, _line: &str) -> bool {
        false
    }

    /// Whether a line opening a block starts a comment block, skipped up to
    /// the next blank line.
    fn starts_comment_block(&self, _line: &str) -> bool {
        false
    }

    /// Normalize one line of cue text.
    fn text<'a>(&self, line: &'a str) -> &'a str {
        line
    }

    fn style(&self, _settings: &str) -> Option<StyleNode> {
        None
    }
}

struct OpenCue {
    start: Duration,
    end: Duration,
    style: Option<StyleNode>,
    lines: Vec<String>,
}

impl OpenCue {
    fn close(self) -> SubtitleCue {
        SubtitleCue {
            start: Some(self.start),
            end: Some(self.end),
            text: self.lines.join("\n"),
            style: self.style,
        }
    }
}

pub(crate) fn parse<D: Dialect>(input: &str, dialect: &D) -> Result<Vec<SubtitleCue>> {
    let input = input.strip_prefix('\u{feff}').unwrap_or(input);
    let lines: Vec<&str> = input.lines().collect();

    let mut cues = Vec::new();
    let mut open: Option<OpenCue> = None;
    let mut block_start = true;
    let mut in_comment = false;

    for (index, raw) in lines.iter().enumerate() {
        let line = raw.trim();
        if line.is_empty() {
            block_start = true;
            in_comment = false;
            continue;
        }
        if in_comment {
            continue;
        }

        if line.contains("-->") {
            let timing = dialect
                .timing(line)
                .ok_or_else(|| FormatError::MalformedTimestamp {
                    line: index + 1,
                    text: line.to_string(),
                })?;
            if timing.end < timing.start {
                return Err(FormatError::EndBeforeStart {
                    line: index + 1,
                    start: timing.start,
                    end: timing.end,
                });
            }

            if let Some(cue) = open.take() {
                cues.push(cue.close());
            }
            open = Some(OpenCue {
                start: timing.start,
                end: timing.end,
                style: timing.settings.and_then(|s| dialect.style(s)),
                lines: Vec::new(),
            });
            block_start = false;
            continue;
        }

        let opens_block = std::mem::replace(&mut block_start, false);
        if opens_block && dialect.starts_comment_block(line) {
            in_comment = true;
            continue;
        }
        if dialect.skip_line(line) {
            continue;
        }
        if opens_block && lines.get(index + 1).is_some_and(|next| next.contains("-->")) {
            trace!(line = index + 1, "Dropping cue identifier");
            continue;
        }

        match open.as_mut() {
            Some(cue) => cue.lines.push(dialect.text(line).to_string()),
            None => trace!(line = index + 1, "Ignoring text before first cue"),
        }
    }

    if let Some(cue) = open.take() {
        cues.push(cue.close());
    }
    Ok(cues)
}

/// Assemble a clock value. `None` on numeric overflow.
pub(crate) fn clock(
    hours: Option<&str>,
    minutes: &str,
    seconds: &str,
    millis: &str,
) -> Option<Duration> {
    let hours: u64 = match hours {
        Some(h) => h.parse().ok()?,
        None => 0,
    };
    let minutes: u64 = minutes.parse().ok()?;
    let seconds: u64 = seconds.parse().ok()?;
    let millis: u64 = millis.parse().ok()?;

    let total_secs = hours
        .checked_mul(3600)?
        .checked_add(minutes * 60)?
        .checked_add(seconds)?;
    Some(Duration::from_secs(total_secs) + Duration::from_millis(millis))
}
