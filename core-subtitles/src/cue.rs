//! Cue model shared by every subtitle format.

use core_runtime::events::CueSnapshot;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One timed piece of subtitle text.
///
/// `start <= end` whenever both are present; parsers reject documents that
/// say otherwise. A cue missing either bound never becomes active.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubtitleCue {
    pub start: Option<Duration>,
    pub end: Option<Duration>,
    /// Lines joined with `\n`, markup untouched.
    pub text: String,
    pub style: Option<StyleNode>,
}

impl SubtitleCue {
    pub fn new(start: Duration, end: Duration, text: impl Into<String>) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
            text: text.into(),
            style: None,
        }
    }

    pub fn with_style(mut self, style: StyleNode) -> Self {
        self.style = Some(style);
        self
    }

    /// Inclusive containment: `start <= position <= end`.
    pub fn contains(&self, position: Duration) -> bool {
        match (self.start, self.end) {
            (Some(start), Some(end)) => start <= position && position <= end,
            _ => false,
        }
    }

    /// Whether the bounds respect `start <= end`. Missing bounds are valid.
    pub fn is_well_ordered(&self) -> bool {
        match (self.start, self.end) {
            (Some(start), Some(end)) => start <= end,
            _ => true,
        }
    }

    /// Renderer-facing copy. Missing bounds are reported as zero.
    pub fn snapshot(&self) -> CueSnapshot {
        CueSnapshot {
            text: self.text.clone(),
            start_ms: self.start.map(millis).unwrap_or_default(),
            end_ms: self.end.map(millis).unwrap_or_default(),
        }
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Opaque style tree attached to a cue.
///
/// The parsers only fill this with WebVTT cue settings (`align:start`,
/// `line:0`, ...) under a node named `settings`; interpretation is left to
/// the renderer.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StyleNode {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<StyleNode>,
}

impl StyleNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((key.into(), value.into()));
        self
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(s: f64) -> Duration {
        Duration::from_secs_f64(s)
    }

    #[test]
    fn containment_is_inclusive() {
        let cue = SubtitleCue::new(secs(2.0), secs(4.0), "B");
        assert!(!cue.contains(secs(1.999)));
        assert!(cue.contains(secs(2.0)));
        assert!(cue.contains(secs(4.0)));
        assert!(!cue.contains(secs(4.001)));
    }

    #[test]
    fn zero_length_cue_matches_its_instant() {
        let cue = SubtitleCue::new(secs(3.0), secs(3.0), "flash");
        assert!(cue.contains(secs(3.0)));
    }

    #[test]
    fn missing_bounds_never_match() {
        let open_ended = SubtitleCue {
            start: Some(Duration::ZERO),
            end: None,
            text: "x".into(),
            style: None,
        };
        assert!(!open_ended.contains(Duration::ZERO));
        assert!(open_ended.is_well_ordered());
        assert_eq!(open_ended.snapshot().end_ms, 0);
    }

    #[test]
    fn snapshot_carries_millis() {
        let snapshot = SubtitleCue::new(secs(1.5), secs(2.25), "Hi").snapshot();
        assert_eq!(
            snapshot,
            CueSnapshot {
                text: "Hi".into(),
                start_ms: 1500,
                end_ms: 2250
            }
        );
    }

    #[test]
    fn style_attribute_lookup() {
        let style = StyleNode::new("settings").with_attribute("align", "start");
        assert_eq!(style.attribute("align"), Some("start"));
        assert_eq!(style.attribute("line"), None);
    }
}
