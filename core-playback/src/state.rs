//! Native-to-public state mapping.
//!
//! Engines report a handful of [`NativeState`] codes, often redundantly and
//! out of order. [`next_state`] folds them into the public [`PlaybackState`]
//! with a fixed table so that repeated or reordered `Ready`/`Buffering`
//! signals for the same logical event settle on the same result.

use bridge_traits::{NativeState, PlaybackState};

/// Inputs the transition table needs besides the two states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TransitionFlags {
    /// Whether playback should start once the engine is ready. Initialised
    /// from `should_auto_play` when a source is set, then driven by
    /// `play()`/`pause()`/`stop()`.
    pub play_when_ready: bool,
}

/// Returns the state to move to, or `None` if `native` does not change the
/// public state.
///
/// | current                      | native              | next                          |
/// |------------------------------|---------------------|-------------------------------|
/// | `None`, `Failed`             | any                 | unchanged                     |
/// | `Stopped`                    | `Playing`           | `Playing`                     |
/// | `Stopped`                    | other               | unchanged                     |
/// | `Opening`                    | `NotReady`          | `Buffering`                   |
/// | `Opening`/`Playing`/`Paused` | `Buffering`         | `Buffering`                   |
/// | `Opening`/`Buffering`        | `Ready`             | `Playing` if play-when-ready, else `Paused` |
/// | `Playing`/`Paused`           | `Ready`             | unchanged                     |
/// | any other                    | `Playing`/`Paused`  | same                          |
pub fn next_state(
    current: PlaybackState,
    native: NativeState,
    flags: TransitionFlags,
) -> Option<PlaybackState> {
    use PlaybackState as S;

    let next = match (current, native) {
        (S::None | S::Failed, _) => return None,
        (S::Stopped, NativeState::Playing) => S::Playing,
        (S::Stopped, _) => return None,
        (S::Opening, NativeState::NotReady) => S::Buffering,
        (_, NativeState::NotReady) => return None,
        (_, NativeState::Buffering) => S::Buffering,
        (S::Opening | S::Buffering, NativeState::Ready) => {
            if flags.play_when_ready {
                S::Playing
            } else {
                S::Paused
            }
        }
        (_, NativeState::Ready) => return None,
        (_, NativeState::Playing) => S::Playing,
        (_, NativeState::Paused) => S::Paused,
    };

    (next != current).then_some(next)
}
