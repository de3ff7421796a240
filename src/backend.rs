//! Register transport abstraction
//!
//! The engine never touches hardware directly. Every register store goes
//! through a [`RegisterTransport`], which on a real board wraps the mapped
//! register window and in tests is a plain [`MemoryRegisterFile`].

use crate::registers::{
    CommonRegister, RegisterLayout, UnitRegister, UnitRegisterImage, UNIT_STRIDE_WORDS,
};

/// Word-addressed access to the synthesizer register file
///
/// Offsets are in 32-bit words from the start of the file; see
/// [`RegisterLayout`] for the map. Stores are direct and synchronous.
///
/// # Example
///
/// ```
/// use plsynth::{MemoryRegisterFile, RegisterTransport, UnitRegisterImage};
///
/// fn silence<T: RegisterTransport>(regs: &mut T, unit: usize) {
///     regs.write_unit(unit, &UnitRegisterImage::default());
/// }
///
/// let mut regs = MemoryRegisterFile::new(4);
/// silence(&mut regs, 2);
/// ```
pub trait RegisterTransport: Send {
    /// Store one register word
    ///
    /// Offsets outside the file are ignored.
    fn write_word(&mut self, offset: usize, value: u32);

    /// Load one register word
    ///
    /// Returns 0 for offsets outside the file.
    fn read_word(&self, offset: usize) -> u32;

    /// Register map of this file
    fn layout(&self) -> RegisterLayout;

    /// Store a full unit block in register order
    fn write_unit(&mut self, unit: usize, image: &UnitRegisterImage) {
        let base = self.layout().unit_base(unit);
        for (i, word) in image.pack().iter().enumerate() {
            self.write_word(base + i, *word);
        }
    }

    /// Store only a unit's amplitude register
    fn write_unit_amplitude(&mut self, unit: usize, image: &UnitRegisterImage) {
        let offset = self.layout().unit_register(unit, UnitRegister::Amplitude);
        self.write_word(offset, image.amplitude_word());
    }

    /// Load and decode a full unit block
    fn read_unit(&self, unit: usize) -> UnitRegisterImage {
        let base = self.layout().unit_base(unit);
        let mut words = [0u32; UNIT_STRIDE_WORDS];
        for (i, word) in words.iter_mut().enumerate() {
            *word = self.read_word(base + i);
        }
        UnitRegisterImage::unpack(&words)
    }

    /// Store the unit busy mask in the common block
    fn write_busy_mask(&mut self, mask: u32) {
        let offset = self.layout().common_register(CommonRegister::UnitBusy);
        self.write_word(offset, mask);
    }
}

/// In-memory register file
///
/// Stands in for the mapped hardware window in tests and in the replay tool.
#[derive(Debug, Clone)]
pub struct MemoryRegisterFile {
    layout: RegisterLayout,
    words: Vec<u32>,
    writes: usize,
}

impl MemoryRegisterFile {
    /// Create a zeroed register file for `unit_count` units
    pub fn new(unit_count: usize) -> Self {
        let layout = RegisterLayout::new(unit_count);
        MemoryRegisterFile {
            layout,
            words: vec![0; layout.word_count()],
            writes: 0,
        }
    }

    /// All register words
    pub fn as_slice(&self) -> &[u32] {
        &self.words
    }

    /// Number of word stores performed so far
    pub fn write_count(&self) -> usize {
        self.writes
    }
}

impl RegisterTransport for MemoryRegisterFile {
    fn write_word(&mut self, offset: usize, value: u32) {
        if let Some(word) = self.words.get_mut(offset) {
            *word = value;
            self.writes += 1;
        }
    }

    fn read_word(&self, offset: usize) -> u32 {
        self.words.get(offset).copied().unwrap_or(0)
    }

    fn layout(&self) -> RegisterLayout {
        self.layout
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registers::{Envelope, WaveType};

    #[test]
    fn test_memory_file_size() {
        let regs = MemoryRegisterFile::new(32);
        assert_eq!(regs.as_slice().len(), 130);
        assert!(regs.as_slice().iter().all(|&w| w == 0));
    }

    #[test]
    fn test_write_unit_round_trip() {
        let mut regs = MemoryRegisterFile::new(4);
        let image = UnitRegisterImage {
            frequency: 262,
            wave_type: WaveType::Saw,
            trigger: true,
            envelope: Envelope::new(0x40, 0x20, 0x40, 0x08),
            amp_left: 78,
            amp_right: 78,
        };
        regs.write_unit(3, &image);
        assert_eq!(regs.read_unit(3), image);
        assert_eq!(regs.read_unit(2), UnitRegisterImage::default());
        assert_eq!(regs.write_count(), UNIT_STRIDE_WORDS);
    }

    #[test]
    fn test_amplitude_only_write() {
        let mut regs = MemoryRegisterFile::new(2);
        let image = UnitRegisterImage {
            frequency: 440,
            amp_left: 10,
            amp_right: 20,
            ..Default::default()
        };
        regs.write_unit_amplitude(1, &image);

        let stored = regs.read_unit(1);
        assert_eq!(stored.frequency, 0, "frequency must not be written");
        assert_eq!(stored.amp_left, 10);
        assert_eq!(stored.amp_right, 20);
        assert_eq!(regs.write_count(), 1);
    }

    #[test]
    fn test_busy_mask_lands_in_common_block() {
        let mut regs = MemoryRegisterFile::new(2);
        regs.write_busy_mask(0b10);
        assert_eq!(regs.as_slice()[9], 0b10);
    }

    #[test]
    fn test_out_of_range_offsets_ignored() {
        let mut regs = MemoryRegisterFile::new(1);
        regs.write_word(1000, 0xDEAD_BEEF);
        assert_eq!(regs.read_word(1000), 0);
        assert_eq!(regs.write_count(), 0);
    }
}
