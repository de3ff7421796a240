//! Voice allocator
//!
//! [`VoiceEngine`] owns the channel table, the unit pool, the per-unit
//! register mirror and the register transport. Every state-changing method
//! takes `&mut self`; concurrent callers go through
//! [`SynthDevice`](crate::SynthDevice), which serializes them behind a single
//! lock.
//!
//! Per (channel, note) a note is either idle or sounding on exactly one unit:
//!
//! - note-on: load the program preset if it changed, bind a free unit
//!   (round-robin), compute the gain, write the full unit block with the
//!   trigger set. No free unit means the note is dropped.
//! - note-off: find the unit by a linear scan of the channel's bindings,
//!   write frequency 0 and trigger clear (amplitude untouched so the
//!   hardware release envelope still has a level to decay from), return the
//!   unit to the pool.
//!
//! Out-of-range channels and notes, notes on the drum channel and note-offs
//! for notes that are not sounding are silent no-ops.

use crate::backend::RegisterTransport;
use crate::channel::{ChannelState, Controller, ControllerState};
use crate::config::EngineConfig;
use crate::constants::{note_frequency, MIDI_VALUE_MAX};
use crate::event::{SynthEvent, SysExKind};
use crate::pool::{NoteBinding, UnitId, UnitPool};
use crate::registers::UnitRegisterImage;
use crate::{PlSynthError, Result};
use log::{debug, trace};

/// What a note-on did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteOnOutcome {
    /// A free unit was bound and started
    Started(UnitId),
    /// The note was already sounding; its unit was restarted in place
    Retriggered(UnitId),
    /// Every unit is busy; the note was dropped
    Dropped,
    /// Velocity 0: handled as a note-off
    Released(Option<UnitId>),
    /// Invalid channel or note, or the drum channel
    Ignored,
}

impl NoteOnOutcome {
    /// Unit now sounding for the note, if any
    pub fn unit(&self) -> Option<UnitId> {
        match *self {
            NoteOnOutcome::Started(unit) | NoteOnOutcome::Retriggered(unit) => Some(unit),
            _ => None,
        }
    }
}

/// Polyphonic voice allocation engine
#[derive(Debug)]
pub struct VoiceEngine<T: RegisterTransport> {
    config: EngineConfig,
    channels: Vec<ChannelState>,
    pool: UnitPool,
    mirror: Vec<UnitRegisterImage>,
    transport: T,
}

impl<T: RegisterTransport> VoiceEngine<T> {
    /// Reserve the pool and channel table and put every channel on defaults
    ///
    /// Fails with `ConfigError` for an invalid configuration or a register
    /// file too small for the unit count, and with `PoolAllocation` if the
    /// tracker storage cannot be reserved.
    pub fn open(config: EngineConfig, transport: T) -> Result<Self> {
        config.validate()?;
        let available = transport.layout().unit_count();
        if available < config.unit_count {
            return Err(PlSynthError::ConfigError(format!(
                "register file has {available} units, {} configured",
                config.unit_count
            )));
        }

        let pool = UnitPool::new(config.unit_count)?;

        let mut channels = Vec::new();
        channels
            .try_reserve_exact(config.channel_count)
            .map_err(|e| PlSynthError::PoolAllocation(e.to_string()))?;
        for _ in 0..config.channel_count {
            channels.push(ChannelState::new(config.unit_count)?);
        }

        let mut mirror = Vec::new();
        mirror
            .try_reserve_exact(config.unit_count)
            .map_err(|e| PlSynthError::PoolAllocation(e.to_string()))?;
        mirror.resize(config.unit_count, UnitRegisterImage::default());

        let mut engine = VoiceEngine {
            config,
            channels,
            pool,
            mirror,
            transport,
        };
        engine.publish_busy_mask();
        debug!(
            "voice engine open: {} units, {} channels",
            config.unit_count, config.channel_count
        );
        Ok(engine)
    }

    /// Release every sounding note and hand back the register transport
    pub fn close(mut self) -> T {
        let released = self.release_all();
        debug!("voice engine closed, {released} notes released");
        self.transport
    }

    /// Active configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Number of logical channels
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// State of one channel
    pub fn channel(&self, channel: u8) -> Option<&ChannelState> {
        self.channels.get(channel as usize)
    }

    /// The unit pool
    pub fn pool(&self) -> &UnitPool {
        &self.pool
    }

    /// Number of units not bound to any note
    pub fn free_unit_count(&self) -> usize {
        self.pool.free_count()
    }

    /// Number of notes sounding on a channel (0 for invalid channels)
    pub fn sounding_count(&self, channel: u8) -> usize {
        self.channel(channel).map_or(0, ChannelState::sounding_count)
    }

    /// Number of notes sounding across all channels
    pub fn total_sounding(&self) -> usize {
        self.channels.iter().map(ChannelState::sounding_count).sum()
    }

    /// Binding for a sounding (channel, note)
    pub fn binding(&self, channel: u8, note: u8) -> Option<NoteBinding> {
        let unit = self.find_unit(channel as usize, note)?;
        self.pool.binding(unit).copied()
    }

    /// Mirror of the last image written to a unit
    pub fn unit_image(&self, unit: UnitId) -> Option<&UnitRegisterImage> {
        self.mirror.get(unit)
    }

    /// The register transport
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Dispatch a decoded event
    pub fn apply(&mut self, event: SynthEvent) {
        match event {
            SynthEvent::NoteOn {
                channel,
                note,
                velocity,
                program,
            } => {
                self.note_on(channel, note, velocity, program);
            }
            SynthEvent::NoteOff { channel, note, .. } => {
                self.note_off(channel, note);
            }
            SynthEvent::KeyPressure {
                channel,
                note,
                velocity,
                program,
            } => {
                self.key_pressure(channel, note, velocity, program);
            }
            SynthEvent::NoteTerminate { channel, note } => {
                self.terminate_note(channel, note);
            }
            SynthEvent::ControlChange {
                channel,
                controllers,
            } => {
                self.control_change(channel, controllers);
            }
            SynthEvent::Controller {
                channel,
                controller,
                value,
            } => {
                self.set_controller(channel, controller, value);
            }
            SynthEvent::ProgramChange { channel, program } => {
                self.program_change(channel, program);
            }
            SynthEvent::Nrpn { .. } => {}
            SynthEvent::SysEx(kind) => {
                self.system_reset(kind);
            }
        }
    }

    /// Start a note
    ///
    /// `program` is the channel's currently selected program as reported by
    /// the event source; when it differs from the loaded preset the preset is
    /// switched before the unit is programmed. Velocities above 127 are
    /// clamped to 127.
    pub fn note_on(
        &mut self,
        channel: u8,
        note: u8,
        velocity: u8,
        program: Option<u8>,
    ) -> NoteOnOutcome {
        let Some(ch) = self.note_channel(channel) else {
            return NoteOnOutcome::Ignored;
        };
        let Some(frequency) = note_frequency(note) else {
            return NoteOnOutcome::Ignored;
        };
        if velocity == 0 {
            return NoteOnOutcome::Released(self.note_off(channel, note));
        }
        let velocity = velocity.min(MIDI_VALUE_MAX as u8);

        if let Some(program) = program {
            if self.channels[ch].instrument() != Some(program) {
                self.channels[ch].apply_program(program);
            }
        }

        if let Some(unit) = self.find_unit(ch, note) {
            if let Some(binding) = self.pool.binding_mut(unit) {
                binding.velocity = velocity;
            }
            self.start_unit(ch, unit, frequency, velocity);
            trace!("ch {channel} note {note}: retriggered unit {unit}");
            return NoteOnOutcome::Retriggered(unit);
        }

        let Some(unit) = self.pool.acquire(channel, note, velocity) else {
            debug!("ch {channel} note {note}: no free unit, note dropped");
            return NoteOnOutcome::Dropped;
        };
        self.channels[ch].push_binding(unit);
        self.start_unit(ch, unit, frequency, velocity);
        self.publish_busy_mask();
        trace!("ch {channel} note {note} vel {velocity}: unit {unit}");
        NoteOnOutcome::Started(unit)
    }

    /// Release a note
    ///
    /// Returns the unit that was silenced, `None` if the note was not
    /// sounding.
    pub fn note_off(&mut self, channel: u8, note: u8) -> Option<UnitId> {
        let ch = self.note_channel(channel)?;
        let unit = self.find_unit(ch, note)?;

        self.channels[ch].remove_binding(unit);
        self.pool.release(unit);
        silence_unit(&mut self.mirror, &mut self.transport, unit);
        self.publish_busy_mask();
        trace!("ch {channel} note {note}: released unit {unit}");
        Some(unit)
    }

    /// Polyphonic key pressure, forwarded to note-on
    ///
    /// The pressure value acts as the velocity: a sounding note is
    /// retriggered at the new level, an idle one is started with the
    /// channel's `program`, and pressure 0 releases the note.
    pub fn key_pressure(
        &mut self,
        channel: u8,
        note: u8,
        pressure: u8,
        program: Option<u8>,
    ) -> NoteOnOutcome {
        self.note_on(channel, note, pressure, program)
    }

    /// Note terminate, forwarded to note-off
    pub fn terminate_note(&mut self, channel: u8, note: u8) -> Option<UnitId> {
        self.note_off(channel, note)
    }

    /// Replace a channel's controllers and rewrite the amplitude of every
    /// note sounding on it
    ///
    /// Returns the number of units updated.
    pub fn control_change(&mut self, channel: u8, controllers: ControllerState) -> usize {
        let Some(ch) = self.valid_channel(channel) else {
            return 0;
        };
        self.channels[ch].set_controllers(controllers);
        self.refresh_gains(ch)
    }

    /// Update a single controller, then behave like [`control_change`](Self::control_change)
    pub fn set_controller(&mut self, channel: u8, controller: Controller, value: u8) -> usize {
        let Some(current) = self.channel(channel).map(ChannelState::controllers) else {
            return 0;
        };
        self.control_change(channel, current.with(controller, value))
    }

    /// Load a program preset into a channel's template
    ///
    /// Sounding notes keep their envelope; only later note-ons use the new
    /// preset. Returns `false` for invalid channels or programs.
    pub fn program_change(&mut self, channel: u8, program: u8) -> bool {
        match self.valid_channel(channel) {
            Some(ch) => self.channels[ch].apply_program(program),
            None => false,
        }
    }

    /// Handle a parsed system-exclusive message
    ///
    /// GM/GS/XG resets release everything and restore channel defaults;
    /// other messages are ignored. Returns whether a reset happened.
    pub fn system_reset(&mut self, kind: SysExKind) -> bool {
        if !kind.is_reset() {
            return false;
        }
        self.reset();
        true
    }

    /// Release every note and restore all channels to defaults
    ///
    /// Safe to call at any time, including with nothing sounding.
    pub fn reset(&mut self) {
        let released = self.release_all();
        for channel in &mut self.channels {
            channel.reset_defaults();
        }
        debug!("voice engine reset, {released} notes released");
    }

    /// Silence and unbind every note on one channel
    ///
    /// Returns the number of notes released.
    pub fn release_channel(&mut self, channel: u8) -> usize {
        let Some(ch) = self.valid_channel(channel) else {
            return 0;
        };
        let released = self.release_channel_units(ch);
        if released > 0 {
            self.publish_busy_mask();
        }
        released
    }

    /// Silence and unbind every note on every channel
    pub fn release_all(&mut self) -> usize {
        let released = (0..self.channels.len())
            .map(|ch| self.release_channel_units(ch))
            .sum();
        self.publish_busy_mask();
        released
    }

    /// Cross-check the allocation bookkeeping
    ///
    /// Verifies that the pool and the channel lists agree, that no unit is
    /// bound twice, that no (channel, note) has two units, and that the
    /// trigger bit of every mirrored unit matches its busy state.
    pub fn check_invariants(&self) -> Result<()> {
        let mut seen: u32 = 0;
        for (ch, channel) in self.channels.iter().enumerate() {
            let mut notes = [false; 128];
            for &unit in channel.bindings() {
                if seen & (1 << unit) != 0 {
                    return Err(format!("unit {unit} bound more than once").into());
                }
                seen |= 1 << unit;

                let binding = self
                    .pool
                    .binding(unit)
                    .ok_or_else(|| format!("ch {ch}: unit {unit} listed but free in pool"))?;
                if binding.channel as usize != ch {
                    return Err(format!(
                        "unit {unit} listed on ch {ch} but owned by ch {}",
                        binding.channel
                    )
                    .into());
                }
                let note = binding.note as usize;
                if notes[note] {
                    return Err(format!("ch {ch} note {note} bound twice").into());
                }
                notes[note] = true;
            }
        }

        for binding in self.pool.bindings() {
            let unit = binding.unit;
            let listed = self
                .channels
                .get(binding.channel as usize)
                .is_some_and(|ch| ch.bindings().contains(&unit));
            if !listed {
                return Err(format!(
                    "unit {unit} bound to ch {} note {} but missing from its list",
                    binding.channel, binding.note
                )
                .into());
            }
        }
        if seen != self.pool.busy_mask() {
            return Err(format!(
                "channel lists cover {seen:#010x}, pool busy mask {:#010x}",
                self.pool.busy_mask()
            )
            .into());
        }
        if self.pool.free_count() + self.total_sounding() != self.pool.capacity() {
            return Err("free + sounding does not equal unit count".into());
        }
        for (unit, image) in self.mirror.iter().enumerate() {
            if image.trigger != self.pool.is_busy(unit) {
                return Err(format!("unit {unit}: trigger does not match busy state").into());
            }
        }
        Ok(())
    }

    fn valid_channel(&self, channel: u8) -> Option<usize> {
        let ch = channel as usize;
        (ch < self.channels.len()).then_some(ch)
    }

    /// Channel index if it accepts note events (valid, not the drum channel)
    fn note_channel(&self, channel: u8) -> Option<usize> {
        if self.config.drum_channel == Some(channel) {
            return None;
        }
        self.valid_channel(channel)
    }

    fn find_unit(&self, ch: usize, note: u8) -> Option<UnitId> {
        self.channels
            .get(ch)?
            .bindings()
            .iter()
            .copied()
            .find(|&unit| self.pool.binding(unit).is_some_and(|b| b.note == note))
    }

    fn start_unit(&mut self, ch: usize, unit: UnitId, frequency: u16, velocity: u8) {
        let channel = &mut self.channels[ch];
        channel.update_gain(velocity);

        let image = UnitRegisterImage {
            frequency,
            trigger: true,
            ..*channel.template()
        };
        self.mirror[unit] = image;
        self.transport.write_unit(unit, &image);
    }

    fn refresh_gains(&mut self, ch: usize) -> usize {
        let count = self.channels[ch].sounding_count();
        for i in 0..count {
            let unit = self.channels[ch].bindings()[i];
            let Some(velocity) = self.pool.binding(unit).map(|b| b.velocity) else {
                continue;
            };
            let gain = self.channels[ch].update_gain(velocity);
            let image = &mut self.mirror[unit];
            image.amp_left = gain.left;
            image.amp_right = gain.right;
            self.transport.write_unit_amplitude(unit, image);
        }
        count
    }

    fn release_channel_units(&mut self, ch: usize) -> usize {
        let VoiceEngine {
            channels,
            pool,
            mirror,
            transport,
            ..
        } = self;

        let mut released = 0;
        for unit in channels[ch].take_bindings() {
            pool.release(unit);
            silence_unit(mirror, transport, unit);
            released += 1;
        }
        released
    }

    fn publish_busy_mask(&mut self) {
        if self.config.publish_busy_mask {
            self.transport.write_busy_mask(self.pool.busy_mask());
        }
    }
}

/// Frequency 0 and trigger clear; amplitude is left for the release stage
fn silence_unit<T: RegisterTransport>(
    mirror: &mut [UnitRegisterImage],
    transport: &mut T,
    unit: UnitId,
) {
    let image = &mut mirror[unit];
    image.frequency = 0;
    image.trigger = false;
    transport.write_unit(unit, image);
}
