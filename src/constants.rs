//! Engine limits, channel defaults and the note frequency table
//!
//! Shared constants used across the allocator, the volume compositor and the
//! register packer.

use crate::registers::{Envelope, WaveType};

/// Number of addressable notes (0-127)
pub const NOTE_COUNT: usize = 128;

/// Highest controller value for a 7-bit MIDI quantity (velocity, CC data)
pub const MIDI_VALUE_MAX: i32 = 127;

/// Maximum number of logical channels
pub const MAX_CHANNELS: usize = 16;

/// Maximum number of voice units (the busy mask is a single 32-bit register)
pub const MAX_UNITS: usize = 32;

/// Default number of hardware voice units
pub const DEFAULT_UNIT_COUNT: usize = 32;

/// Default number of logical channels
pub const DEFAULT_CHANNEL_COUNT: usize = 16;

/// GM percussion channel (channel 10, zero-based)
pub const DEFAULT_DRUM_CHANNEL: u8 = 9;

/// Channel volume after open/reset
pub const DEFAULT_VOLUME: u8 = 100;

/// Channel expression after open/reset
pub const DEFAULT_EXPRESSION: u8 = 127;

/// Pan position after open/reset (center)
pub const DEFAULT_PAN: u8 = 64;

/// Modulation depth after open/reset
pub const DEFAULT_MODULATION: u8 = 0;

/// Wave type loaded into every channel template after open/reset
pub const DEFAULT_WAVE_TYPE: WaveType = WaveType::Saw;

/// Envelope loaded into every channel template after open/reset
pub const DEFAULT_ENVELOPE: Envelope = Envelope {
    attack: 0x40,
    decay: 0x20,
    sustain: 0x40,
    release: 0x08,
};

/// Oscillator frequency codes indexed by note number
///
/// Codes are the note frequency in Hz rounded to the nearest integer; the
/// hardware oscillator takes them as-is.
pub const NOTE_FREQUENCY_TABLE: [u16; NOTE_COUNT] = [
    8, 9, 9, 10, 10, 11, 12, 12, 13, 14, 15, 15, 16, 17, 18, 19, // 0-15
    21, 22, 23, 24, 26, 28, 29, 31, 33, 35, 37, 39, 41, 44, 46, 49, // 16-31
    52, 55, 58, 62, 65, 69, 73, 78, 82, 87, 92, 98, 104, 110, 117, 123, // 32-47
    131, 139, 147, 156, 165, 175, 185, 196, 208, 220, 233, 247, 262, 277, 294, 311, // 48-63
    330, 349, 370, 392, 415, 440, 466, 494, 523, 554, 587, 622, 659, 698, 740, 784, // 64-79
    831, 880, 932, 988, 1047, 1109, 1175, 1245, 1319, 1397, 1480, 1568, 1661, 1760, 1865,
    1976, // 80-95
    2093, 2217, 2349, 2489, 2637, 2794, 2960, 3136, 3322, 3520, 3729, 3951, 4186, 4435, 4699,
    4978, // 96-111
    5274, 5588, 5920, 6272, 6645, 7040, 7459, 7902, 8372, 8870, 9397, 9956, 10548, 11175,
    11840, 12544, // 112-127
];

/// Look up the frequency code for a note
///
/// Returns `None` for notes outside 0-127.
#[inline]
pub fn note_frequency(note: u8) -> Option<u16> {
    NOTE_FREQUENCY_TABLE.get(note as usize).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frequency_table_reference_pitches() {
        assert_eq!(note_frequency(69), Some(440)); // A4
        assert_eq!(note_frequency(60), Some(262)); // C4
        assert_eq!(note_frequency(0), Some(8));
        assert_eq!(note_frequency(127), Some(12544));
    }

    #[test]
    fn test_frequency_table_out_of_range() {
        assert_eq!(note_frequency(128), None);
        assert_eq!(note_frequency(255), None);
    }

    #[test]
    fn test_frequency_table_monotonic() {
        for pair in NOTE_FREQUENCY_TABLE.windows(2) {
            assert!(pair[1] >= pair[0], "table not monotonic at {pair:?}");
        }
    }

    #[test]
    fn test_octaves_double() {
        // Rounding keeps every octave within one code of exact doubling
        for note in 24..(NOTE_COUNT - 12) {
            let lo = NOTE_FREQUENCY_TABLE[note] as i32;
            let hi = NOTE_FREQUENCY_TABLE[note + 12] as i32;
            assert!((hi - 2 * lo).abs() <= 1, "note {note}: {lo} -> {hi}");
        }
    }
}
