//! WebVTT (`.vtt`) reader.
//!
//! Cue extraction only. Everything before the first timing line (the
//! `WEBVTT` signature, header metadata, `STYLE` and `REGION` blocks) is
//! ignored, as are `NOTE` blocks anywhere. Hours are optional in timestamps.
//! Cue settings after the end timestamp are kept as a `settings`
//! [`StyleNode`]. A leading `-` bullet is stripped from each text line.

use std::sync::LazyLock;

use regex::Regex;

use crate::cue::{StyleNode, SubtitleCue};
use crate::error::Result;
use crate::parser::{self, clock, Dialect, Timing};

static TIMING_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:(\d+):)?([0-5]\d):([0-5]\d)\.(\d{3})\s*-->\s*(?:(\d+):)?([0-5]\d):([0-5]\d)\.(\d{3})(?:\s+(.*))?$",
    )
    .expect("WebVTT timing regex should compile")
});

const COMMENT_BLOCKS: [&str; 3] = ["NOTE", "STYLE", "REGION"];

struct Vtt;

impl Dialect for Vtt {
    fn timing<'a>(&self, line: &'a str) -> Option<Timing<'a>> {
        let caps = TIMING_LINE.captures(line)?;
        let start = clock(caps.get(1).map(|m| m.as_str()), &caps[2], &caps[3], &caps[4])?;
        let end = clock(caps.get(5).map(|m| m.as_str()), &caps[6], &caps[7], &caps[8])?;
        let settings = caps
            .get(9)
            .map(|m| m.as_str().trim())
            .filter(|s| !s.is_empty());
        Some(Timing {
            start,
            end,
            settings,
        })
    }

    fn starts_comment_block(&self, line: &str) -> bool {
        COMMENT_BLOCKS.iter().any(|keyword| {
            line.strip_prefix(keyword)
                .is_some_and(|rest| rest.is_empty() || rest.starts_with(char::is_whitespace))
        })
    }

    fn text<'a>(&self, line: &'a str) -> &'a str {
        line.strip_prefix('-').map(str::trim_start).unwrap_or(line)
    }

    fn style(&self, settings: &str) -> Option<StyleNode> {
        let node = settings
            .split_whitespace()
            .filter_map(|token| token.split_once(':'))
            .fold(StyleNode::new("settings"), |node, (key, value)| {
                node.with_attribute(key, value)
            });
        (!node.attributes.is_empty()).then_some(node)
    }
}

/// Parse a WebVTT document.
///
/// # Errors
///
/// [`FormatError`](crate::FormatError) on a malformed timing line or a cue
/// that ends before it starts. No cues are returned in that case.
pub fn parse(input: &str) -> Result<Vec<SubtitleCue>> {
    parser::parse(input, &Vtt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FormatError;
    use std::time::Duration;

    #[test]
    fn header_and_identifiers_are_skipped() {
        let input = "WEBVTT - Episode 1\nKind: captions\n\nNOTE written by hand\nspans two lines\n\nintro\n00:01.000 --> 00:04.000\nHello\n\n00:00:05.000 --> 00:00:06.500 align:start line:0\nWorld\n";
        let cues = parse(input).unwrap();

        assert_eq!(cues.len(), 2);
        assert_eq!(
            cues[0],
            SubtitleCue::new(Duration::from_secs(1), Duration::from_secs(4), "Hello")
        );
        assert_eq!(cues[1].end, Some(Duration::from_millis(6_500)));
        let style = cues[1].style.as_ref().unwrap();
        assert_eq!(style.name, "settings");
        assert_eq!(style.attribute("align"), Some("start"));
        assert_eq!(style.attribute("line"), Some("0"));
    }

    #[test]
    fn leading_dashes_are_stripped() {
        let cues = parse("WEBVTT\n\n00:01.000 --> 00:02.000\n- Who's there?\n-Me.\n").unwrap();
        assert_eq!(cues[0].text, "Who's there?\nMe.");
    }

    #[test]
    fn notes_between_cues_are_ignored() {
        let input = "WEBVTT\n\n00:01.000 --> 00:02.000\nA\n\nNOTE skip me\n\n00:03.000 --> 00:04.000\nB\n";
        let cues = parse(input).unwrap();
        assert_eq!(cues[0].text, "A");
        assert_eq!(cues[1].text, "B");
    }

    #[test]
    fn numeric_text_is_kept() {
        let cues = parse("WEBVTT\n\n00:01.000 --> 00:02.000\n42\n").unwrap();
        assert_eq!(cues[0].text, "42");
    }

    #[test]
    fn end_before_start_rejects_document() {
        let err = parse("00:00:05.000 --> 00:00:03.000\nBad").unwrap_err();
        assert!(matches!(err, FormatError::EndBeforeStart { line: 1, .. }));
    }

    #[test]
    fn comma_separator_is_malformed() {
        let err = parse("WEBVTT\n\n00:00:01,000 --> 00:00:02,000\nHi").unwrap_err();
        assert_eq!(err.line(), Some(3));
    }

    #[test]
    fn header_only_document_has_no_cues() {
        assert!(parse("WEBVTT\n\nNOTE nothing yet\n").unwrap().is_empty());
    }
}
