//! Voice Unit Register Definitions
//!
//! Each voice unit exposes a block of four 32-bit registers. The blocks are
//! laid out back to back in unit-index order and followed by a two-word
//! common block:
//!
//! | Word | Register  | Bits                                                        |
//! |------|-----------|-------------------------------------------------------------|
//! | 0    | Frequency | `[15:0]` frequency code                                     |
//! | 1    | Control   | `[1:0]` wave type, `[2]` trigger                            |
//! | 2    | Envelope  | `[7:0]` attack, `[15:8]` decay, `[23:16]` sustain, `[31:24]` release |
//! | 3    | Amplitude | `[15:0]` left (signed), `[31:16]` right (signed)            |
//!
//! Common block: word 0 audio control (`[0]` clock select), word 1 unit busy
//! mask (bit n = unit n bound).
//!
//! The engine only ever writes these registers; [`UnitRegisterImage`] is the
//! in-process mirror that gets packed into words before each write.

use bitflags::bitflags;
use num_derive::FromPrimitive;
use num_traits::FromPrimitive;
use std::fmt;

/// Number of 32-bit words in one unit register block
pub const UNIT_STRIDE_WORDS: usize = 4;

/// Number of 32-bit words in the common block
pub const COMMON_BLOCK_WORDS: usize = 2;

const WAVE_TYPE_MASK: u32 = 0b11;

/// Oscillator wave shape (2-bit field of the control register)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, FromPrimitive)]
pub enum WaveType {
    /// Square wave
    #[default]
    Square = 0,
    /// Sawtooth wave
    Saw = 1,
    /// Triangle wave
    Triangle = 2,
    /// Not assigned by the hardware yet
    Reserved = 3,
}

impl WaveType {
    /// Decode the wave type from the low two bits of a control word
    pub fn from_bits(value: u32) -> Self {
        WaveType::from_u32(value & WAVE_TYPE_MASK).unwrap_or(WaveType::Reserved)
    }

    /// Raw 2-bit field value
    pub fn bits(self) -> u32 {
        self as u32
    }
}

impl fmt::Display for WaveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WaveType::Square => write!(f, "SQR"),
            WaveType::Saw => write!(f, "SAW"),
            WaveType::Triangle => write!(f, "TRI"),
            WaveType::Reserved => write!(f, "RSV"),
        }
    }
}

bitflags! {
    /// Control register flag bits (above the wave type field)
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ControlFlags: u32 {
        /// Gate: set starts the unit's envelope, clear enters release
        const TRIGGER = 0x04;
    }
}

bitflags! {
    /// Common-block audio control register
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct AudioControl: u32 {
        /// Audio clock select (owned by device bring-up, never touched by the engine)
        const AUDIO_CLK_SEL = 0x01;
    }
}

/// Registers within a unit block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnitRegister {
    /// Frequency code - word 0
    Frequency = 0,
    /// Wave type and trigger - word 1
    Control = 1,
    /// Amplitude envelope - word 2
    Envelope = 2,
    /// Stereo amplitude - word 3
    Amplitude = 3,
}

impl UnitRegister {
    /// Word index within the unit block
    pub fn word(self) -> usize {
        self as usize
    }
}

impl fmt::Display for UnitRegister {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnitRegister::Frequency => write!(f, "W0 (Frequency)"),
            UnitRegister::Control => write!(f, "W1 (Control)"),
            UnitRegister::Envelope => write!(f, "W2 (Envelope)"),
            UnitRegister::Amplitude => write!(f, "W3 (Amplitude)"),
        }
    }
}

/// Registers within the common block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommonRegister {
    /// Audio control - word 0
    AudioControl = 0,
    /// Unit busy mask - word 1
    UnitBusy = 1,
}

impl CommonRegister {
    /// Word index within the common block
    pub fn word(self) -> usize {
        self as usize
    }
}

/// Word offsets for a register file holding `unit_count` units
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterLayout {
    unit_count: usize,
}

impl RegisterLayout {
    /// Layout for `unit_count` unit blocks plus the common block
    pub const fn new(unit_count: usize) -> Self {
        RegisterLayout { unit_count }
    }

    /// Number of unit blocks
    pub fn unit_count(&self) -> usize {
        self.unit_count
    }

    /// First word of a unit's block
    #[inline]
    pub fn unit_base(&self, unit: usize) -> usize {
        unit * UNIT_STRIDE_WORDS
    }

    /// Word offset of a single unit register
    #[inline]
    pub fn unit_register(&self, unit: usize, reg: UnitRegister) -> usize {
        self.unit_base(unit) + reg.word()
    }

    /// First word of the common block
    #[inline]
    pub fn common_base(&self) -> usize {
        self.unit_count * UNIT_STRIDE_WORDS
    }

    /// Word offset of a common register
    #[inline]
    pub fn common_register(&self, reg: CommonRegister) -> usize {
        self.common_base() + reg.word()
    }

    /// Total register file size in words
    pub fn word_count(&self) -> usize {
        self.common_base() + COMMON_BLOCK_WORDS
    }
}

/// Amplitude envelope parameters (one byte each)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Envelope {
    /// Attack rate
    pub attack: u8,
    /// Decay rate
    pub decay: u8,
    /// Sustain level
    pub sustain: u8,
    /// Release rate
    pub release: u8,
}

impl Envelope {
    /// Create an envelope from its four stages
    pub const fn new(attack: u8, decay: u8, sustain: u8, release: u8) -> Self {
        Envelope {
            attack,
            decay,
            sustain,
            release,
        }
    }

    /// Pack into the envelope register word
    pub fn pack(&self) -> u32 {
        (self.attack as u32)
            | ((self.decay as u32) << 8)
            | ((self.sustain as u32) << 16)
            | ((self.release as u32) << 24)
    }

    /// Unpack from the envelope register word
    pub fn unpack(word: u32) -> Self {
        Envelope {
            attack: (word & 0xFF) as u8,
            decay: ((word >> 8) & 0xFF) as u8,
            sustain: ((word >> 16) & 0xFF) as u8,
            release: (word >> 24) as u8,
        }
    }
}

/// Shadow of one unit's register block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UnitRegisterImage {
    /// Oscillator frequency code (0 = silent)
    pub frequency: u16,
    /// Oscillator wave shape
    pub wave_type: WaveType,
    /// Envelope gate
    pub trigger: bool,
    /// Amplitude envelope
    pub envelope: Envelope,
    /// Left channel amplitude
    pub amp_left: i16,
    /// Right channel amplitude
    pub amp_right: i16,
}

impl UnitRegisterImage {
    /// Frequency register word
    pub fn frequency_word(&self) -> u32 {
        self.frequency as u32
    }

    /// Control register word
    pub fn control_word(&self) -> u32 {
        let mut flags = ControlFlags::empty();
        flags.set(ControlFlags::TRIGGER, self.trigger);
        self.wave_type.bits() | flags.bits()
    }

    /// Amplitude register word
    pub fn amplitude_word(&self) -> u32 {
        (self.amp_left as u16 as u32) | ((self.amp_right as u16 as u32) << 16)
    }

    /// Pack the whole block in register order
    pub fn pack(&self) -> [u32; UNIT_STRIDE_WORDS] {
        [
            self.frequency_word(),
            self.control_word(),
            self.envelope.pack(),
            self.amplitude_word(),
        ]
    }

    /// Rebuild an image from a packed register block
    ///
    /// Reserved bits are ignored.
    pub fn unpack(words: &[u32; UNIT_STRIDE_WORDS]) -> Self {
        let control = words[UnitRegister::Control.word()];
        let amplitude = words[UnitRegister::Amplitude.word()];
        UnitRegisterImage {
            frequency: (words[UnitRegister::Frequency.word()] & 0xFFFF) as u16,
            wave_type: WaveType::from_bits(control),
            trigger: ControlFlags::from_bits_truncate(control).contains(ControlFlags::TRIGGER),
            envelope: Envelope::unpack(words[UnitRegister::Envelope.word()]),
            amp_left: (amplitude & 0xFFFF) as u16 as i16,
            amp_right: (amplitude >> 16) as u16 as i16,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_control_word_layout() {
        let image = UnitRegisterImage {
            wave_type: WaveType::Triangle,
            trigger: true,
            ..Default::default()
        };
        assert_eq!(image.control_word(), 0b110);

        let released = UnitRegisterImage {
            trigger: false,
            ..image
        };
        assert_eq!(released.control_word(), 0b010);
    }

    #[test]
    fn test_envelope_byte_order() {
        let env = Envelope::new(0x40, 0x20, 0x40, 0x08);
        assert_eq!(env.pack(), 0x0840_2040);
        assert_eq!(Envelope::unpack(0x0840_2040), env);
    }

    #[test]
    fn test_negative_amplitude_packs_two_complement() {
        let image = UnitRegisterImage {
            amp_left: -1,
            amp_right: 0x1234,
            ..Default::default()
        };
        assert_eq!(image.amplitude_word(), 0x1234_FFFF);
    }

    #[test]
    fn test_unpack_full_block() {
        let image = UnitRegisterImage {
            frequency: 440,
            wave_type: WaveType::Saw,
            trigger: true,
            envelope: Envelope::new(0xA0, 0x20, 0x40, 0x10),
            amp_left: 300,
            amp_right: -300,
        };
        assert_eq!(UnitRegisterImage::unpack(&image.pack()), image);
    }

    #[test]
    fn test_unpack_ignores_reserved_bits() {
        let words = [0xFFFF_0100, 0xFFFF_FFF9, 0, 0];
        let image = UnitRegisterImage::unpack(&words);
        assert_eq!(image.frequency, 0x0100);
        assert_eq!(image.wave_type, WaveType::Saw);
        assert!(!image.trigger);
    }

    #[test]
    fn test_register_layout_offsets() {
        let layout = RegisterLayout::new(32);
        assert_eq!(layout.unit_base(0), 0);
        assert_eq!(layout.unit_register(1, UnitRegister::Amplitude), 7);
        assert_eq!(layout.common_base(), 128);
        assert_eq!(layout.common_register(CommonRegister::UnitBusy), 129);
        assert_eq!(layout.word_count(), 130);
    }

    #[test]
    fn test_wave_type_from_bits_masks() {
        assert_eq!(WaveType::from_bits(0x01), WaveType::Saw);
        assert_eq!(WaveType::from_bits(0x07), WaveType::Reserved);
        assert_eq!(WaveType::from_bits(0x04), WaveType::Square);
    }
}
