//! Unit Allocation Pool
//!
//! A fixed arena of tracker slots, one per hardware voice unit. A slot is
//! either free or holds the [`NoteBinding`] for the note the unit is playing.
//! Membership is mirrored in a 32-bit busy mask, which is also the value
//! published to the hardware's unit busy register.
//!
//! Selection is round-robin: the scan starts just after the most recently
//! acquired unit and wraps, so a freshly released unit is the last candidate
//! rather than the first.

use crate::{PlSynthError, Result};

/// Index of a hardware voice unit
pub type UnitId = usize;

/// A sounding note and the unit producing it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteBinding {
    /// Owning channel
    pub channel: u8,
    /// Note number (0-127)
    pub note: u8,
    /// Note-on velocity, kept for later gain recomputation
    pub velocity: u8,
    /// Bound unit
    pub unit: UnitId,
}

/// Round-robin pool of voice units
#[derive(Debug, Clone)]
pub struct UnitPool {
    slots: Vec<Option<NoteBinding>>,
    busy: u32,
    cursor: UnitId,
}

impl UnitPool {
    /// Reserve tracker storage for `unit_count` units, all free
    ///
    /// This is the only allocation the pool ever makes. `unit_count` must be
    /// in `1..=32`.
    pub fn new(unit_count: usize) -> Result<Self> {
        if unit_count == 0 || unit_count > u32::BITS as usize {
            return Err(PlSynthError::ConfigError(format!(
                "unit count {unit_count} outside 1..={}",
                u32::BITS
            )));
        }

        let mut slots = Vec::new();
        slots
            .try_reserve_exact(unit_count)
            .map_err(|e| PlSynthError::PoolAllocation(e.to_string()))?;
        slots.resize(unit_count, None);

        Ok(UnitPool {
            slots,
            busy: 0,
            cursor: unit_count - 1,
        })
    }

    /// Total number of units
    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of unbound units
    #[inline]
    pub fn free_count(&self) -> usize {
        self.capacity() - self.busy.count_ones() as usize
    }

    /// Number of bound units
    #[inline]
    pub fn busy_count(&self) -> usize {
        self.busy.count_ones() as usize
    }

    /// Bit n set = unit n bound
    #[inline]
    pub fn busy_mask(&self) -> u32 {
        self.busy
    }

    /// Whether a unit is currently bound
    #[inline]
    pub fn is_busy(&self, unit: UnitId) -> bool {
        unit < self.capacity() && self.busy & (1 << unit) != 0
    }

    /// Most recently acquired unit (the round-robin cursor)
    pub fn last_acquired(&self) -> UnitId {
        self.cursor
    }

    /// Binding held by a unit, if any
    pub fn binding(&self, unit: UnitId) -> Option<&NoteBinding> {
        self.slots.get(unit).and_then(Option::as_ref)
    }

    /// Mutable binding held by a unit, if any
    pub fn binding_mut(&mut self, unit: UnitId) -> Option<&mut NoteBinding> {
        self.slots.get_mut(unit).and_then(Option::as_mut)
    }

    /// Iterate over all current bindings in unit order
    pub fn bindings(&self) -> impl Iterator<Item = &NoteBinding> {
        self.slots.iter().filter_map(Option::as_ref)
    }

    /// Find the next free unit after the cursor and bind it
    ///
    /// Returns `None` when every unit is bound; the caller drops the request.
    pub fn acquire(&mut self, channel: u8, note: u8, velocity: u8) -> Option<UnitId> {
        let count = self.capacity();
        let unit = (1..=count)
            .map(|step| (self.cursor + step) % count)
            .find(|&unit| self.busy & (1 << unit) == 0)?;

        self.cursor = unit;
        self.busy |= 1 << unit;
        self.slots[unit] = Some(NoteBinding {
            channel,
            note,
            velocity,
            unit,
        });
        Some(unit)
    }

    /// Return a bound unit to the free pool
    ///
    /// Returns the binding it held. Releasing a free unit is a no-op that
    /// returns `None`; callers should only release units they hold.
    pub fn release(&mut self, unit: UnitId) -> Option<NoteBinding> {
        let binding = self.slots.get_mut(unit)?.take()?;
        self.busy &= !(1 << unit);
        Some(binding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_pool_all_free() {
        let pool = UnitPool::new(32).unwrap();
        assert_eq!(pool.capacity(), 32);
        assert_eq!(pool.free_count(), 32);
        assert_eq!(pool.busy_mask(), 0);
    }

    #[test]
    fn test_invalid_sizes_rejected() {
        assert!(matches!(
            UnitPool::new(0),
            Err(PlSynthError::ConfigError(_))
        ));
        assert!(matches!(
            UnitPool::new(33),
            Err(PlSynthError::ConfigError(_))
        ));
    }

    #[test]
    fn test_acquire_is_round_robin() {
        let mut pool = UnitPool::new(4).unwrap();
        assert_eq!(pool.last_acquired(), 3);
        assert_eq!(pool.acquire(0, 60, 100), Some(0));
        assert_eq!(pool.last_acquired(), 0);
        assert_eq!(pool.acquire(0, 61, 100), Some(1));
        assert_eq!(pool.last_acquired(), 1);

        // Unit 0 is free again but the cursor moves on
        pool.release(0);
        assert_eq!(pool.acquire(0, 62, 100), Some(2));
        assert_eq!(pool.acquire(0, 63, 100), Some(3));
        assert_eq!(pool.acquire(0, 64, 100), Some(0));
        assert_eq!(pool.last_acquired(), 0);
    }

    #[test]
    fn test_failed_acquire_keeps_cursor() {
        let mut pool = UnitPool::new(2).unwrap();
        pool.acquire(0, 60, 100);
        pool.acquire(0, 61, 100);
        assert_eq!(pool.acquire(0, 62, 100), None);
        assert_eq!(pool.last_acquired(), 1);
    }

    #[test]
    fn test_bindings_in_unit_order() {
        let mut pool = UnitPool::new(4).unwrap();
        pool.acquire(2, 70, 10);
        pool.acquire(0, 50, 20);
        pool.acquire(1, 60, 30);
        pool.release(1);

        let held: Vec<_> = pool.bindings().map(|b| (b.unit, b.channel, b.note)).collect();
        assert_eq!(held, vec![(0, 2, 70), (2, 1, 60)]);
    }

    #[test]
    fn test_released_unit_not_reused_immediately() {
        let mut pool = UnitPool::new(8).unwrap();
        for _ in 0..20 {
            let unit = pool.acquire(1, 60, 90).unwrap();
            pool.release(unit);
            let next = pool.acquire(1, 60, 90).unwrap();
            assert_ne!(next, unit);
            pool.release(next);
        }
    }

    #[test]
    fn test_exhaustion_returns_none() {
        let mut pool = UnitPool::new(3).unwrap();
        for note in 0..3 {
            assert!(pool.acquire(0, note, 100).is_some());
        }
        assert_eq!(pool.acquire(0, 99, 100), None);
        assert_eq!(pool.free_count(), 0);
        assert_eq!(pool.busy_mask(), 0b111);
    }

    #[test]
    fn test_release_returns_binding() {
        let mut pool = UnitPool::new(2).unwrap();
        let unit = pool.acquire(5, 72, 33).unwrap();
        let binding = pool.release(unit).unwrap();
        assert_eq!(
            binding,
            NoteBinding {
                channel: 5,
                note: 72,
                velocity: 33,
                unit
            }
        );
        assert_eq!(pool.release(unit), None);
        assert_eq!(pool.release(99), None);
        assert_eq!(pool.free_count(), 2);
    }

    #[test]
    fn test_full_width_mask() {
        let mut pool = UnitPool::new(32).unwrap();
        for note in 0..32 {
            pool.acquire(0, note, 1).unwrap();
        }
        assert_eq!(pool.busy_mask(), u32::MAX);
        assert!(pool.is_busy(31));
        assert!(!pool.is_busy(32));
    }
}
