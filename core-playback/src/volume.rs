//! Volume/mute shadow state.
//!
//! Muting is implemented by pushing zero to the engine, so the engine alone
//! cannot tell us what to restore on unmute. [`VolumeShadow`] keeps that
//! value, and keeps it stable across repeated mute requests.

/// Clamp a requested volume into `0.0..=1.0`. NaN becomes silence.
pub fn clamp_volume(volume: f32) -> f32 {
    if volume.is_nan() {
        0.0
    } else {
        volume.clamp(0.0, 1.0)
    }
}

/// Shadow of the user-facing volume and the engine's actual output level.
#[derive(Debug, Clone, PartialEq)]
pub struct VolumeShadow {
    volume: f32,
    muted: bool,
    volume_before_mute: f32,
    /// Last level the engine reported (or that we pushed, until it echoes).
    engine_volume: f32,
}

impl VolumeShadow {
    pub fn new(volume: f32) -> Self {
        let volume = clamp_volume(volume);
        Self {
            volume,
            muted: false,
            volume_before_mute: volume,
            engine_volume: volume,
        }
    }

    /// User-facing volume, independent of mute.
    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Level restored by the next unmute.
    pub fn volume_before_mute(&self) -> f32 {
        self.volume_before_mute
    }

    /// Level the listener actually hears.
    pub fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.volume
        }
    }

    /// Record a user volume change.
    ///
    /// Returns the level to push to the engine, or `None` while muted: the
    /// value is remembered for unmute but the output stays silent.
    pub fn set_volume(&mut self, volume: f32) -> Option<f32> {
        let volume = clamp_volume(volume);
        self.volume = volume;
        self.volume_before_mute = volume;

        if self.muted {
            return None;
        }

        self.engine_volume = volume;
        Some(volume)
    }

    /// Toggle mute. Returns the level to push to the engine.
    ///
    /// Muting captures the engine's current level only when it is non-zero,
    /// so muting twice never replaces the restore level with zero.
    pub fn set_muted(&mut self, muted: bool) -> Option<f32> {
        if muted {
            if self.engine_volume > 0.0 {
                self.volume_before_mute = self.engine_volume;
            }
            self.muted = true;
            self.engine_volume = 0.0;
            Some(0.0)
        } else {
            if !self.muted {
                return None;
            }
            self.muted = false;
            self.volume = self.volume_before_mute;
            self.engine_volume = self.volume_before_mute;
            Some(self.volume_before_mute)
        }
    }

    /// Apply a level reported by the engine.
    ///
    /// Returns `true` if the user-facing volume changed. Echoes never touch
    /// the restore level; only user-driven changes do.
    pub fn on_engine_volume(&mut self, reported: f32) -> bool {
        let reported = clamp_volume(reported);
        self.engine_volume = reported;

        if self.muted || (self.volume - reported).abs() < f32::EPSILON {
            return false;
        }
        self.volume = reported;
        true
    }
}

impl Default for VolumeShadow {
    fn default() -> Self {
        Self::new(1.0)
    }
}
