//! Synth port: exclusive-access guard and subscription lifecycle
//!
//! Event delivery, port subscribe/unsubscribe and teardown may run on
//! different threads. All of them funnel through one `parking_lot::Mutex`
//! around the engine, so a note-on, a controller change and a reset can never
//! interleave. Share the device between threads with `Arc<SynthDevice<T>>`.

use crate::backend::RegisterTransport;
use crate::config::EngineConfig;
use crate::engine::VoiceEngine;
use crate::event::SynthEvent;
use crate::{PlSynthError, Result};
use log::debug;
use parking_lot::Mutex;

#[derive(Debug)]
struct PortState<T: RegisterTransport> {
    engine: VoiceEngine<T>,
    subscribed: bool,
}

/// Voice engine behind a single exclusive lock
#[derive(Debug)]
pub struct SynthDevice<T: RegisterTransport> {
    state: Mutex<PortState<T>>,
}

impl<T: RegisterTransport> SynthDevice<T> {
    /// Open the engine on a register transport
    pub fn open(config: EngineConfig, transport: T) -> Result<Self> {
        let engine = VoiceEngine::open(config, transport)?;
        Ok(SynthDevice {
            state: Mutex::new(PortState {
                engine,
                subscribed: false,
            }),
        })
    }

    /// Attach the single event source
    ///
    /// Every channel is put back on defaults. Fails with `DeviceBusy` if a
    /// source is already attached.
    pub fn subscribe(&self) -> Result<()> {
        let mut state = self.state.lock();
        if state.subscribed {
            return Err(PlSynthError::DeviceBusy);
        }
        state.engine.reset();
        state.subscribed = true;
        debug!("synth port subscribed");
        Ok(())
    }

    /// Detach the event source, releasing every sounding note
    pub fn unsubscribe(&self) {
        let mut state = self.state.lock();
        let released = state.engine.release_all();
        state.subscribed = false;
        debug!("synth port unsubscribed, {released} notes released");
    }

    /// Release every sounding note without detaching
    pub fn free_port(&self) -> usize {
        self.state.lock().engine.release_all()
    }

    /// Whether an event source is attached
    pub fn is_subscribed(&self) -> bool {
        self.state.lock().subscribed
    }

    /// Apply one event under the lock
    pub fn handle_event(&self, event: SynthEvent) {
        self.state.lock().engine.apply(event);
    }

    /// Apply a batch of events, taking the lock once
    pub fn handle_events<I>(&self, events: I)
    where
        I: IntoIterator<Item = SynthEvent>,
    {
        let mut state = self.state.lock();
        for event in events {
            state.engine.apply(event);
        }
    }

    /// Inspect the engine under the lock
    pub fn with_engine<R>(&self, f: impl FnOnce(&VoiceEngine<T>) -> R) -> R {
        f(&self.state.lock().engine)
    }

    /// Mutate the engine under the lock
    pub fn with_engine_mut<R>(&self, f: impl FnOnce(&mut VoiceEngine<T>) -> R) -> R {
        f(&mut self.state.lock().engine)
    }

    /// Release everything and return the register transport
    pub fn close(self) -> T {
        self.state.into_inner().engine.close()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryRegisterFile;
    use std::sync::Arc;
    use std::thread;

    fn device(units: usize) -> SynthDevice<MemoryRegisterFile> {
        SynthDevice::open(
            EngineConfig::with_sizes(units, 16),
            MemoryRegisterFile::new(units),
        )
        .unwrap()
    }

    #[test]
    fn test_double_subscribe_is_busy() {
        let dev = device(4);
        dev.subscribe().unwrap();
        assert!(matches!(dev.subscribe(), Err(PlSynthError::DeviceBusy)));

        dev.unsubscribe();
        assert!(!dev.is_subscribed());
        dev.subscribe().unwrap();
    }

    #[test]
    fn test_unsubscribe_releases_notes() {
        let dev = device(4);
        dev.subscribe().unwrap();
        dev.handle_event(SynthEvent::note_on(0, 60, 100));
        dev.handle_event(SynthEvent::note_on(1, 62, 100));

        dev.unsubscribe();
        assert_eq!(dev.with_engine(|e| e.free_unit_count()), 4);
    }

    #[test]
    fn test_free_port_keeps_subscription() {
        let dev = device(4);
        dev.subscribe().unwrap();
        dev.handle_events([SynthEvent::note_on(0, 60, 100), SynthEvent::note_on(0, 64, 100)]);

        assert_eq!(dev.free_port(), 2);
        assert!(dev.is_subscribed());
        assert_eq!(dev.with_engine(|e| e.sounding_count(0)), 0);
    }

    #[test]
    fn test_subscribe_resets_channels() {
        let dev = device(4);
        dev.handle_event(SynthEvent::ProgramChange {
            channel: 0,
            program: 0,
        });
        dev.subscribe().unwrap();
        assert_eq!(dev.with_engine(|e| e.channel(0).unwrap().instrument()), None);
    }

    #[test]
    fn test_with_engine_mut_runs_under_lock() {
        let dev = device(4);
        dev.subscribe().unwrap();
        let released = dev.with_engine_mut(|e| {
            e.note_on(2, 60, 100, None);
            e.note_on(2, 64, 100, None);
            e.release_channel(2)
        });
        assert_eq!(released, 2);
        assert_eq!(dev.with_engine(|e| e.free_unit_count()), 4);
    }

    #[test]
    fn test_concurrent_delivery_keeps_invariants() {
        let dev = Arc::new(device(8));
        dev.subscribe().unwrap();

        let handles: Vec<_> = (0..4u8)
            .map(|channel| {
                let dev = Arc::clone(&dev);
                thread::spawn(move || {
                    for round in 0..200u8 {
                        let note = 40 + round % 24;
                        dev.handle_event(SynthEvent::note_on(channel, note, 100));
                        if round % 3 == 0 {
                            dev.handle_event(SynthEvent::control_change(channel, 90, 127, round % 128, 0));
                        }
                        dev.handle_event(SynthEvent::note_off(channel, note, 0));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        dev.with_engine(|e| {
            e.check_invariants().unwrap();
            assert_eq!(e.free_unit_count(), 8);
        });
    }
}
