//! Volume Compositor
//!
//! Stereo amplitude for one note from the channel controllers and the note
//! velocity:
//!
//! ```text
//! gain  = volume * velocity * expression / (127 * 127)
//! left  = gain * (128 - pan) / 64
//! right = gain * pan / 64
//! ```
//!
//! Velocity and expression at full scale leave the channel volume as the
//! gain; a centered pan (64) passes it unchanged to both sides. All products
//! are formed in `i32` and saturated into the signed 16-bit register range.

use crate::channel::ControllerState;
use crate::constants::MIDI_VALUE_MAX;

/// Pan value giving full left output
const PAN_MAX: i32 = 128;

/// Divisor applied after the pan multiply (pan center)
const PAN_SCALE: i32 = 64;

/// Left/right amplitude pair as written to the amplitude register
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StereoGain {
    /// Left channel amplitude
    pub left: i16,
    /// Right channel amplitude
    pub right: i16,
}

/// Compute the stereo gain for a note on a channel
pub fn compute_gain(controllers: &ControllerState, velocity: u8) -> StereoGain {
    let volume = controllers.volume as i32;
    let expression = controllers.expression as i32;
    let velocity = (velocity as i32).min(MIDI_VALUE_MAX);
    let pan = (controllers.pan as i32).min(PAN_MAX);

    let gain = volume * velocity * expression / (MIDI_VALUE_MAX * MIDI_VALUE_MAX);

    StereoGain {
        left: saturate(gain * (PAN_MAX - pan) / PAN_SCALE),
        right: saturate(gain * pan / PAN_SCALE),
    }
}

#[inline]
fn saturate(value: i32) -> i16 {
    value.clamp(i16::MIN as i32, i16::MAX as i32) as i16
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controllers(volume: u8, expression: u8, pan: u8) -> ControllerState {
        ControllerState {
            volume,
            expression,
            pan,
            modulation: 0,
        }
    }

    #[test]
    fn test_default_channel_gain() {
        // 100 * 100 * 127 / 16129 = 78, centered
        let gain = compute_gain(&ControllerState::default(), 100);
        assert_eq!(gain, StereoGain { left: 78, right: 78 });
    }

    #[test]
    fn test_full_scale_passes_volume() {
        let gain = compute_gain(&controllers(100, 127, 64), 127);
        assert_eq!(gain, StereoGain { left: 100, right: 100 });
    }

    #[test]
    fn test_hard_left_pan() {
        let gain = compute_gain(&controllers(100, 127, 0), 127);
        assert_eq!(gain.right, 0);
        assert_eq!(gain.left, 200);
    }

    #[test]
    fn test_hard_right_pan_clamped() {
        let at_max = compute_gain(&controllers(100, 127, 128), 127);
        let beyond = compute_gain(&controllers(100, 127, 255), 127);
        assert_eq!(at_max.left, 0);
        assert_eq!(at_max, beyond, "pan above 128 must not go negative");
    }

    #[test]
    fn test_zero_factors_silence() {
        assert_eq!(compute_gain(&controllers(0, 127, 64), 127), StereoGain::default());
        assert_eq!(compute_gain(&controllers(100, 0, 64), 127), StereoGain::default());
        assert_eq!(compute_gain(&controllers(100, 127, 64), 0), StereoGain::default());
    }

    #[test]
    fn test_extreme_values_stay_in_range() {
        // 255 * 127 * 255 / 16129 = 512, hard left doubles it
        let gain = compute_gain(&controllers(255, 255, 0), 255);
        assert_eq!(gain.left, 1024);
        assert!(gain.left > 0 && gain.right >= 0);
    }
}
