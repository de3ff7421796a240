//! Instrument Preset Table
//!
//! Maps the 128 GM program numbers onto a wave type and an amplitude
//! envelope. A preset only seeds a channel's register template; notes already
//! sounding keep the envelope they were started with.

use crate::registers::{Envelope, WaveType};

/// Number of program slots
pub const PROGRAM_COUNT: usize = 128;

/// Wave shape and envelope for one program
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preset {
    /// Oscillator wave shape
    pub wave_type: WaveType,
    /// Amplitude envelope
    pub envelope: Envelope,
}

const fn preset(wave_type: WaveType, attack: u8, decay: u8, sustain: u8, release: u8) -> Preset {
    Preset {
        wave_type,
        envelope: Envelope::new(attack, decay, sustain, release),
    }
}

/// Preset table indexed by zero-based program number
///
/// Comments carry the one-based GM program number and name.
#[rustfmt::skip]
pub static PRESETS: [Preset; PROGRAM_COUNT] = [
    preset(WaveType::Square, 0x80, 0x02, 0x08, 0x02), // 001: Acoustic Grand Piano
    preset(WaveType::Saw, 0x80, 0x02, 0x08, 0x02), // 002: Bright Acoustic Piano
    preset(WaveType::Triangle, 0x80, 0x02, 0x40, 0x02), // 003: Electric Grand Piano
    preset(WaveType::Saw, 0x40, 0x02, 0x40, 0x02), // 004: Honky-tonk Piano
    preset(WaveType::Triangle, 0x20, 0x02, 0x30, 0x02), // 005: Electric Piano 1
    preset(WaveType::Triangle, 0x10, 0x02, 0x30, 0x02), // 006: Electric Piano 2
    preset(WaveType::Saw, 0x80, 0x10, 0x20, 0x02), // 007: Harpsichord
    preset(WaveType::Saw, 0x80, 0x10, 0x20, 0x02), // 008: Clavinet

    preset(WaveType::Triangle, 0x80, 0x01, 0x20, 0x01), // 009: Celesta
    preset(WaveType::Triangle, 0x80, 0x01, 0x20, 0x01), // 010: Glockenspiel
    preset(WaveType::Triangle, 0x80, 0x01, 0x20, 0x01), // 011: Music Box
    preset(WaveType::Triangle, 0x80, 0x01, 0x20, 0x01), // 012: Vibraphone
    preset(WaveType::Triangle, 0x80, 0x01, 0x20, 0x01), // 013: Marimba
    preset(WaveType::Triangle, 0x80, 0x01, 0x20, 0x01), // 014: Xylophone
    preset(WaveType::Triangle, 0x80, 0x01, 0x20, 0x01), // 015: Tubular Bells
    preset(WaveType::Triangle, 0x80, 0x01, 0x20, 0x01), // 016: Dulcimer

    preset(WaveType::Saw, 0xFF, 0x10, 0x40, 0x01), // 017: Drawbar Organ
    preset(WaveType::Saw, 0xFF, 0x10, 0x40, 0x01), // 018: Percussive Organ
    preset(WaveType::Saw, 0xFF, 0x10, 0x40, 0x01), // 019: Rock Organ
    preset(WaveType::Saw, 0xFF, 0x10, 0x40, 0x01), // 020: Church Organ
    preset(WaveType::Saw, 0xFF, 0x10, 0x40, 0x01), // 021: Reed Organ
    preset(WaveType::Saw, 0xFF, 0x10, 0x40, 0x01), // 022: Accordion
    preset(WaveType::Saw, 0xFF, 0x10, 0x40, 0x01), // 023: Harmonica
    preset(WaveType::Saw, 0xFF, 0x10, 0x40, 0x01), // 024: Tango Accordion

    preset(WaveType::Square, 0x80, 0x04, 0x08, 0x02), // 025: Nylon String Guitar
    preset(WaveType::Square, 0xC0, 0x04, 0x08, 0x02), // 026: Steel String Guitar
    preset(WaveType::Square, 0x80, 0x04, 0x08, 0x02), // 027: Electric Jazz Guitar
    preset(WaveType::Square, 0x80, 0x04, 0x08, 0x02), // 028: Electric Clean Guitar
    preset(WaveType::Square, 0x80, 0x04, 0x04, 0x02), // 029: Electric Muted Guitar
    preset(WaveType::Square, 0x80, 0x40, 0x40, 0x02), // 030: Overdriven Guitar
    preset(WaveType::Square, 0xA0, 0x40, 0x40, 0x02), // 031: Distortion Guitar
    preset(WaveType::Square, 0x80, 0x04, 0x08, 0x02), // 032: Guitar Harmonics

    preset(WaveType::Triangle, 0x40, 0x08, 0x08, 0x02), // 033: Acoustic Bass
    preset(WaveType::Square, 0xC0, 0x08, 0x10, 0x02), // 034: Electric Bass(finger)
    preset(WaveType::Square, 0x80, 0x08, 0x20, 0x02), // 035: Electric Bass(pick)
    preset(WaveType::Square, 0x40, 0x08, 0x20, 0x02), // 036: Fretless Bass
    preset(WaveType::Saw, 0x80, 0x08, 0x30, 0x02), // 037: Slap Bass 1
    preset(WaveType::Saw, 0x80, 0x08, 0x30, 0x02), // 038: Slap Bass 2
    preset(WaveType::Triangle, 0xFF, 0x08, 0x30, 0x02), // 039: Synth Bass 1
    preset(WaveType::Triangle, 0xFF, 0x08, 0x30, 0x02), // 040: Synth Bass 2

    preset(WaveType::Saw, 0x10, 0x02, 0x80, 0x02), // 041: Violin
    preset(WaveType::Saw, 0x10, 0x02, 0x80, 0x02), // 042: Viola
    preset(WaveType::Saw, 0x10, 0x02, 0x80, 0x02), // 043: Cello
    preset(WaveType::Saw, 0x10, 0x02, 0x80, 0x02), // 044: Contrabass
    preset(WaveType::Saw, 0x40, 0x08, 0x04, 0x02), // 045: Tremolo Strings
    preset(WaveType::Saw, 0x40, 0x08, 0x04, 0x02), // 046: Pizzicato Strings
    preset(WaveType::Saw, 0x10, 0x08, 0x80, 0x02), // 047: Orchestral Strings
    preset(WaveType::Triangle, 0x40, 0x08, 0x08, 0x02), // 048: Timpani

    preset(WaveType::Saw, 0x08, 0x01, 0x80, 0x01), // 049: String Ensemble 1
    preset(WaveType::Saw, 0x08, 0x01, 0x80, 0x01), // 050: String Ensemble 2
    preset(WaveType::Saw, 0x04, 0x01, 0x80, 0x01), // 051: SynthStrings 1
    preset(WaveType::Saw, 0x08, 0x01, 0x80, 0x02), // 052: SynthStrings 2
    preset(WaveType::Saw, 0x20, 0x01, 0x70, 0x02), // 053: Choir Aahs
    preset(WaveType::Saw, 0x20, 0x01, 0x70, 0x02), // 054: Voice Oohs
    preset(WaveType::Saw, 0x20, 0x01, 0x70, 0x02), // 055: Synth Voice
    preset(WaveType::Saw, 0xA0, 0x10, 0x08, 0x20), // 056: Orchestra Hit

    preset(WaveType::Saw, 0xA0, 0x20, 0x40, 0x10), // 057: Trumpet
    preset(WaveType::Saw, 0xA0, 0x20, 0x40, 0x10), // 058: Trombone
    preset(WaveType::Saw, 0xA0, 0x20, 0x40, 0x10), // 059: Tuba
    preset(WaveType::Saw, 0xA0, 0x20, 0x08, 0x10), // 060: Muted Trumpet
    preset(WaveType::Saw, 0xA0, 0x20, 0x40, 0x10), // 061: French Horn
    preset(WaveType::Saw, 0xA0, 0x20, 0x40, 0x10), // 062: Brass Section
    preset(WaveType::Saw, 0xA0, 0x20, 0x40, 0x10), // 063: SynthBrass 1
    preset(WaveType::Saw, 0xA0, 0x20, 0x40, 0x10), // 064: SynthBrass 2

    preset(WaveType::Saw, 0xA0, 0x40, 0x20, 0x08), // 065: Soprano Sax
    preset(WaveType::Saw, 0xA0, 0x40, 0x20, 0x08), // 066: Alto Sax
    preset(WaveType::Saw, 0xA0, 0x40, 0x20, 0x08), // 067: Tenor Sax
    preset(WaveType::Saw, 0xA0, 0x40, 0x30, 0x08), // 068: Baritone Sax
    preset(WaveType::Saw, 0x40, 0x20, 0x40, 0x08), // 069: Oboe
    preset(WaveType::Saw, 0x10, 0x40, 0x40, 0x08), // 070: English Horn
    preset(WaveType::Saw, 0x10, 0x40, 0x40, 0x08), // 071: Bassoon
    preset(WaveType::Saw, 0xA0, 0x40, 0x40, 0x08), // 072: Clarinet

    preset(WaveType::Triangle, 0x70, 0x20, 0x80, 0x08), // 073: Piccolo
    preset(WaveType::Triangle, 0x20, 0x10, 0x40, 0x08), // 074: Flute
    preset(WaveType::Triangle, 0x70, 0x20, 0x80, 0x08), // 075: Recorder
    preset(WaveType::Triangle, 0xC0, 0x20, 0x30, 0x08), // 076: Pan Flute
    preset(WaveType::Triangle, 0x30, 0x20, 0x40, 0x08), // 077: Blown Bottle
    preset(WaveType::Triangle, 0x40, 0x20, 0x20, 0x08), // 078: Shakuhachi
    preset(WaveType::Triangle, 0x70, 0x20, 0x40, 0x08), // 079: Whistle
    preset(WaveType::Triangle, 0x40, 0x20, 0x40, 0x08), // 080: Ocarina

    preset(WaveType::Square, 0x80, 0x20, 0x20, 0x08), // 081: Square Wave
    preset(WaveType::Saw, 0x80, 0x10, 0x40, 0x08), // 082: Saw Wave
    preset(WaveType::Triangle, 0x80, 0x04, 0x80, 0x08), // 083: Syn. Calliope
    preset(WaveType::Square, 0x80, 0x20, 0x40, 0x08), // 084: Chiff Lead
    preset(WaveType::Square, 0x80, 0x20, 0x40, 0x08), // 085: Charang
    preset(WaveType::Triangle, 0x80, 0x20, 0x40, 0x08), // 086: Solo Vox
    preset(WaveType::Saw, 0x80, 0x20, 0x40, 0x08), // 087: 5th Saw Wave
    preset(WaveType::Saw, 0x80, 0x20, 0x40, 0x08), // 088: Bass& Lead

    preset(WaveType::Triangle, 0x02, 0x02, 0x40, 0x02), // 089: Fantasia
    preset(WaveType::Saw, 0x02, 0x02, 0x40, 0x02), // 090: Warm Pad
    preset(WaveType::Triangle, 0x02, 0x02, 0x40, 0x02), // 091: Polysynth
    preset(WaveType::Triangle, 0x02, 0x02, 0x40, 0x02), // 092: Space Voice
    preset(WaveType::Triangle, 0x02, 0x02, 0x40, 0x02), // 093: Bowed Glass
    preset(WaveType::Square, 0x02, 0x02, 0x20, 0x02), // 094: Metal Pad
    preset(WaveType::Triangle, 0x02, 0x02, 0x40, 0x02), // 095: Halo Pad
    preset(WaveType::Saw, 0x02, 0x02, 0x40, 0x02), // 096: Sweep Pad

    preset(WaveType::Saw, 0xFF, 0x20, 0x40, 0x02), // 097: Ice Rain
    preset(WaveType::Saw, 0x02, 0x02, 0x40, 0x02), // 098: Soundtrack
    preset(WaveType::Triangle, 0xFF, 0x04, 0x40, 0x04), // 099: Crystal
    preset(WaveType::Saw, 0x02, 0x02, 0x40, 0x02), // 100: Atmosphere
    preset(WaveType::Saw, 0x02, 0x02, 0x40, 0x02), // 101: Brightness
    preset(WaveType::Triangle, 0x02, 0x02, 0x40, 0x02), // 102: Goblin
    preset(WaveType::Saw, 0x02, 0x02, 0x40, 0x02), // 103: Echo Drops
    preset(WaveType::Saw, 0x02, 0x02, 0x40, 0x02), // 104: Star Theme

    preset(WaveType::Saw, 0x80, 0x20, 0x20, 0x08), // 105: Sitar
    preset(WaveType::Square, 0x80, 0x40, 0x40, 0x08), // 106: Banjo
    preset(WaveType::Square, 0xC0, 0x40, 0x04, 0x08), // 107: Shamisen
    preset(WaveType::Triangle, 0xA0, 0x02, 0x10, 0x08), // 108: Koto
    preset(WaveType::Saw, 0x80, 0x02, 0x10, 0x08), // 109: Kalimba
    preset(WaveType::Saw, 0x80, 0x40, 0x40, 0x08), // 110: Bagpipe
    preset(WaveType::Saw, 0x20, 0x10, 0x30, 0x08), // 111: Fiddle
    preset(WaveType::Saw, 0x40, 0x20, 0x40, 0x08), // 112: Shanai

    preset(WaveType::Saw, 0x80, 0x10, 0x40, 0x08), // 113: Tinkle Bell
    preset(WaveType::Saw, 0x80, 0x10, 0x40, 0x08), // 114: Agogo
    preset(WaveType::Saw, 0x80, 0x10, 0x40, 0x08), // 115: Steel Drums
    preset(WaveType::Saw, 0x80, 0x10, 0x40, 0x08), // 116: Woodblock
    preset(WaveType::Saw, 0x80, 0x10, 0x40, 0x08), // 117: Taiko Drum
    preset(WaveType::Saw, 0x80, 0x10, 0x40, 0x08), // 118: Melodic Tom
    preset(WaveType::Saw, 0x80, 0x10, 0x40, 0x08), // 119: Synth Drum
    preset(WaveType::Saw, 0x80, 0x10, 0x40, 0x08), // 120: Reverse Cymbal

    preset(WaveType::Saw, 0x80, 0x10, 0x40, 0x08), // 121: Guitar Fret Noise
    preset(WaveType::Saw, 0x80, 0x10, 0x40, 0x08), // 122: Breath Noise
    preset(WaveType::Saw, 0x80, 0x10, 0x40, 0x08), // 123: Seashore
    preset(WaveType::Saw, 0x80, 0x10, 0x40, 0x08), // 124: Bird Tweet
    preset(WaveType::Saw, 0x80, 0x10, 0x40, 0x08), // 125: Telephone Ring
    preset(WaveType::Saw, 0x80, 0x10, 0x40, 0x08), // 126: Helicopter
    preset(WaveType::Saw, 0x80, 0x10, 0x40, 0x08), // 127: Applause
    preset(WaveType::Saw, 0x80, 0x10, 0x40, 0x08), // 128: Gunshot
];

/// Look up the preset for a zero-based program number
///
/// Returns `None` for programs outside 0-127.
#[inline]
pub fn preset_for(program: u8) -> Option<&'static Preset> {
    PRESETS.get(program as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_lookup_bounds() {
        assert!(preset_for(0).is_some());
        assert!(preset_for(127).is_some());
        assert!(preset_for(128).is_none());
    }

    #[test]
    fn test_known_presets() {
        let piano = preset_for(0).unwrap();
        assert_eq!(piano.wave_type, WaveType::Square);
        assert_eq!(piano.envelope, Envelope::new(0x80, 0x02, 0x08, 0x02));

        let saw_lead = preset_for(81).unwrap();
        assert_eq!(saw_lead.wave_type, WaveType::Saw);
        assert_eq!(saw_lead.envelope, Envelope::new(0x80, 0x10, 0x40, 0x08));

        let flute = preset_for(73).unwrap();
        assert_eq!(flute.wave_type, WaveType::Triangle);
    }

    #[test]
    fn test_no_reserved_wave_types() {
        for (program, preset) in PRESETS.iter().enumerate() {
            assert_ne!(
                preset.wave_type,
                WaveType::Reserved,
                "program {program} uses the reserved wave type"
            );
        }
    }
}
