//! Polyphonic voice allocation for register-mapped synthesizer units
//!
//! Turns a live stream of decoded performance events (note on/off, controller
//! changes, program changes, GM/GS/XG resets) into register writes for a fixed
//! bank of hardware tone generators ("voice units"). The interesting part is
//! the allocation: a small pool of units is multiplexed across sixteen logical
//! channels, fairly and without ever double-booking a unit.
//!
//! # Features
//! - Round-robin unit allocation over a fixed, pre-allocated tracker arena
//! - Per-channel controller state (volume, expression, pan, modulation)
//! - Stereo gain recomputation for every sounding note on controller changes
//! - 128-entry GM program preset table (wave type + envelope)
//! - Explicit 32-bit register packing, no reliance on bit-field layout
//! - A single exclusive guard around the engine for concurrent event delivery
//!
//! # Crate feature flags
//! - `cli` (default): `plsynth` event-script replay binary (`anyhow`, `env_logger`)
//!
//! # Quick start
//! ```
//! use plsynth::{EngineConfig, MemoryRegisterFile, SynthDevice, SynthEvent};
//!
//! let config = EngineConfig::default();
//! let regs = MemoryRegisterFile::new(config.unit_count);
//! let device = SynthDevice::open(config, regs).unwrap();
//! device.subscribe().unwrap();
//!
//! device.handle_event(SynthEvent::note_on(0, 60, 100));
//! assert_eq!(device.with_engine(|e| e.sounding_count(0)), 1);
//!
//! device.handle_event(SynthEvent::note_off(0, 60, 0));
//! assert_eq!(device.with_engine(|e| e.free_unit_count()), 32);
//! ```

#![warn(missing_docs)]

pub mod backend; // Register transport abstraction
pub mod channel; // Channel State Table
pub mod config; // Engine configuration
pub mod constants; // Limits, defaults and the frequency table
pub mod device; // Exclusive-access guard and port lifecycle
pub mod engine; // Voice allocator
pub mod event; // Decoded performance events
pub mod pool; // Unit allocation pool
pub mod presets; // Instrument preset table
pub mod registers; // Unit register image and register map
pub mod script; // Event script parsing
pub mod volume; // Volume compositor

/// Error types for voice engine operations
///
/// Capacity exhaustion, out-of-range input and stray note-offs are normal
/// operating conditions and never surface here. The only runtime failure is
/// being unable to reserve tracker storage when the engine is opened.
#[derive(thiserror::Error, Debug)]
pub enum PlSynthError {
    /// Tracker or channel storage could not be reserved at open time
    #[error("Unit pool allocation failed: {0}")]
    PoolAllocation(String),

    /// The synth port already has a subscriber
    #[error("Device is busy")]
    DeviceBusy,

    /// Error while parsing an event script
    #[error("Parse error: {0}")]
    ParseError(String),

    /// IO error from filesystem
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed configuration document
    #[error("Configuration format error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl From<String> for PlSynthError {
    /// Converts a String into `PlSynthError::Other`.
    ///
    /// Prefer the specific variants (`ConfigError`, `ParseError`) where the
    /// failure category is known.
    fn from(msg: String) -> Self {
        PlSynthError::Other(msg)
    }
}

impl From<&str> for PlSynthError {
    /// Converts a string slice into `PlSynthError::Other`.
    fn from(msg: &str) -> Self {
        PlSynthError::Other(msg.to_string())
    }
}

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, PlSynthError>;

// Public API exports
pub use backend::{MemoryRegisterFile, RegisterTransport};
pub use channel::{ChannelState, Controller, ControllerState};
pub use config::EngineConfig;
pub use device::SynthDevice;
pub use engine::{NoteOnOutcome, VoiceEngine};
pub use event::{SynthEvent, SysExKind};
pub use pool::{NoteBinding, UnitId, UnitPool};
pub use presets::Preset;
pub use registers::{Envelope, RegisterLayout, UnitRegisterImage, WaveType};
pub use script::{load_script, parse_script};
pub use volume::{compute_gain, StereoGain};
