//! Channel State Table
//!
//! One [`ChannelState`] per logical channel. Besides the controller values it
//! carries a register template (wave type, envelope and the last computed
//! gain) that seeds the unit image on every note-on, and the ordered list of
//! units currently sounding for the channel.

use crate::constants::{
    DEFAULT_ENVELOPE, DEFAULT_EXPRESSION, DEFAULT_MODULATION, DEFAULT_PAN, DEFAULT_VOLUME,
    DEFAULT_WAVE_TYPE,
};
use crate::pool::UnitId;
use crate::presets::preset_for;
use crate::registers::UnitRegisterImage;
use crate::volume::{compute_gain, StereoGain};
use crate::{PlSynthError, Result};

/// Continuous controllers tracked per channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Controller {
    /// Modulation wheel (CC 1)
    Modulation,
    /// Channel volume (CC 7)
    Volume,
    /// Pan (CC 10)
    Pan,
    /// Expression (CC 11)
    Expression,
}

impl Controller {
    /// Map a MIDI control-change number to a tracked controller
    pub fn from_cc(cc: u8) -> Option<Self> {
        match cc {
            1 => Some(Controller::Modulation),
            7 => Some(Controller::Volume),
            10 => Some(Controller::Pan),
            11 => Some(Controller::Expression),
            _ => None,
        }
    }

    /// MIDI control-change number
    pub fn cc(self) -> u8 {
        match self {
            Controller::Modulation => 1,
            Controller::Volume => 7,
            Controller::Pan => 10,
            Controller::Expression => 11,
        }
    }
}

/// Snapshot of a channel's gain-related controllers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerState {
    /// Channel volume
    pub volume: u8,
    /// Expression
    pub expression: u8,
    /// Pan (64 = center)
    pub pan: u8,
    /// Modulation depth (stored, not applied to amplitude)
    pub modulation: u8,
}

impl Default for ControllerState {
    fn default() -> Self {
        ControllerState {
            volume: DEFAULT_VOLUME,
            expression: DEFAULT_EXPRESSION,
            pan: DEFAULT_PAN,
            modulation: DEFAULT_MODULATION,
        }
    }
}

impl ControllerState {
    /// Return a copy with one controller replaced
    pub fn with(mut self, controller: Controller, value: u8) -> Self {
        match controller {
            Controller::Modulation => self.modulation = value,
            Controller::Volume => self.volume = value,
            Controller::Pan => self.pan = value,
            Controller::Expression => self.expression = value,
        }
        self
    }
}

/// Per-channel state
#[derive(Debug, Clone)]
pub struct ChannelState {
    controllers: ControllerState,
    instrument: Option<u8>,
    gain: StereoGain,
    template: UnitRegisterImage,
    bindings: Vec<UnitId>,
}

impl ChannelState {
    /// Create a channel with default state
    ///
    /// The binding list is reserved for `unit_capacity` entries up front so
    /// that note-on never allocates.
    pub fn new(unit_capacity: usize) -> Result<Self> {
        let mut bindings = Vec::new();
        bindings
            .try_reserve_exact(unit_capacity)
            .map_err(|e| PlSynthError::PoolAllocation(e.to_string()))?;

        let mut channel = ChannelState {
            controllers: ControllerState::default(),
            instrument: None,
            gain: StereoGain::default(),
            template: UnitRegisterImage::default(),
            bindings,
        };
        channel.reset_defaults();
        Ok(channel)
    }

    /// Restore controller values and register template to defaults
    ///
    /// The binding list must already be empty; releasing units is the
    /// engine's job.
    pub fn reset_defaults(&mut self) {
        debug_assert!(self.bindings.is_empty(), "reset with sounding notes");
        self.controllers = ControllerState::default();
        self.instrument = None;
        self.gain = StereoGain::default();
        self.template = UnitRegisterImage {
            wave_type: DEFAULT_WAVE_TYPE,
            envelope: DEFAULT_ENVELOPE,
            ..Default::default()
        };
    }

    /// Current controller values
    pub fn controllers(&self) -> ControllerState {
        self.controllers
    }

    /// Replace all controller values
    pub fn set_controllers(&mut self, controllers: ControllerState) {
        self.controllers = controllers;
    }

    /// Channel volume
    pub fn volume(&self) -> u8 {
        self.controllers.volume
    }

    /// Expression
    pub fn expression(&self) -> u8 {
        self.controllers.expression
    }

    /// Pan position
    pub fn pan(&self) -> u8 {
        self.controllers.pan
    }

    /// Modulation depth
    pub fn modulation(&self) -> u8 {
        self.controllers.modulation
    }

    /// Program whose preset is loaded, `None` while on defaults
    pub fn instrument(&self) -> Option<u8> {
        self.instrument
    }

    /// Gain computed for the most recent note-on or controller change
    pub fn last_gain(&self) -> StereoGain {
        self.gain
    }

    /// Register template used for the next note-on
    pub fn template(&self) -> &UnitRegisterImage {
        &self.template
    }

    /// Load a program's preset into the template
    ///
    /// Returns `false` (no change) for programs outside 0-127.
    pub fn apply_program(&mut self, program: u8) -> bool {
        let Some(preset) = preset_for(program) else {
            return false;
        };
        self.template.wave_type = preset.wave_type;
        self.template.envelope = preset.envelope;
        self.template.trigger = false;
        self.instrument = Some(program);
        true
    }

    /// Recompute the stereo gain for a velocity and store it in the template
    pub fn update_gain(&mut self, velocity: u8) -> StereoGain {
        self.gain = compute_gain(&self.controllers, velocity);
        self.template.amp_left = self.gain.left;
        self.template.amp_right = self.gain.right;
        self.gain
    }

    /// Units sounding on this channel, oldest first
    pub fn bindings(&self) -> &[UnitId] {
        &self.bindings
    }

    /// Number of sounding notes
    pub fn sounding_count(&self) -> usize {
        self.bindings.len()
    }

    pub(crate) fn push_binding(&mut self, unit: UnitId) {
        debug_assert!(self.bindings.len() < self.bindings.capacity());
        self.bindings.push(unit);
    }

    pub(crate) fn remove_binding(&mut self, unit: UnitId) -> bool {
        match self.bindings.iter().position(|&u| u == unit) {
            Some(index) => {
                self.bindings.remove(index);
                true
            }
            None => false,
        }
    }

    pub(crate) fn take_bindings(&mut self) -> impl Iterator<Item = UnitId> + '_ {
        self.bindings.drain(..)
    }
}
