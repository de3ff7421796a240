//! Decoded performance events
//!
//! The event transport delivers already-parsed messages; this is the shape
//! the engine consumes them in.

use crate::channel::{Controller, ControllerState};

/// System-exclusive message classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SysExKind {
    /// General MIDI system on
    GmOn,
    /// Roland GS reset
    GsReset,
    /// Yamaha XG system on
    XgReset,
    /// Anything else (ignored)
    Other,
}

impl SysExKind {
    /// Whether this message resets the synthesizer
    pub fn is_reset(self) -> bool {
        matches!(self, SysExKind::GmOn | SysExKind::GsReset | SysExKind::XgReset)
    }
}

/// One performance event addressed to the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SynthEvent {
    /// Start a note
    NoteOn {
        /// Channel
        channel: u8,
        /// Note number
        note: u8,
        /// Velocity (0 releases the note)
        velocity: u8,
        /// Program selected on the channel when the note arrived
        program: Option<u8>,
    },
    /// Release a note
    NoteOff {
        /// Channel
        channel: u8,
        /// Note number
        note: u8,
        /// Release velocity (unused)
        velocity: u8,
    },
    /// Polyphonic key pressure, handled as a note-on (pressure 0 releases)
    KeyPressure {
        /// Channel
        channel: u8,
        /// Note number
        note: u8,
        /// Pressure value
        velocity: u8,
        /// Program selected on the channel when the event arrived
        program: Option<u8>,
    },
    /// Terminate a note, handled as a note-off with velocity 0
    NoteTerminate {
        /// Channel
        channel: u8,
        /// Note number
        note: u8,
    },
    /// Full controller snapshot for a channel
    ControlChange {
        /// Channel
        channel: u8,
        /// New controller values
        controllers: ControllerState,
    },
    /// Single controller update
    Controller {
        /// Channel
        channel: u8,
        /// Which controller
        controller: Controller,
        /// New value
        value: u8,
    },
    /// Select a program
    ProgramChange {
        /// Channel
        channel: u8,
        /// Zero-based program number
        program: u8,
    },
    /// Non-registered parameter change (accepted, ignored)
    Nrpn {
        /// Channel
        channel: u8,
    },
    /// Parsed system-exclusive message
    SysEx(SysExKind),
}

impl SynthEvent {
    /// Note-on without program information
    pub fn note_on(channel: u8, note: u8, velocity: u8) -> Self {
        SynthEvent::NoteOn {
            channel,
            note,
            velocity,
            program: None,
        }
    }

    /// Note-off
    pub fn note_off(channel: u8, note: u8, velocity: u8) -> Self {
        SynthEvent::NoteOff {
            channel,
            note,
            velocity,
        }
    }

    /// Full controller snapshot
    pub fn control_change(channel: u8, volume: u8, expression: u8, pan: u8, modulation: u8) -> Self {
        SynthEvent::ControlChange {
            channel,
            controllers: ControllerState {
                volume,
                expression,
                pan,
                modulation,
            },
        }
    }

    /// Channel the event is addressed to, `None` for system messages
    pub fn channel(&self) -> Option<u8> {
        match *self {
            SynthEvent::NoteOn { channel, .. }
            | SynthEvent::NoteOff { channel, .. }
            | SynthEvent::KeyPressure { channel, .. }
            | SynthEvent::NoteTerminate { channel, .. }
            | SynthEvent::ControlChange { channel, .. }
            | SynthEvent::Controller { channel, .. }
            | SynthEvent::ProgramChange { channel, .. }
            | SynthEvent::Nrpn { channel } => Some(channel),
            SynthEvent::SysEx(_) => None,
        }
    }
}
