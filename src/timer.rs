//! Tick counter — the scheduler's monotonic clock
//!
//! One tick is the smallest time quantum the scheduler knows about. The
//! counter only moves forward, one unit per `advance()`, which the owner calls
//! from its SysTick (Cortex-M) or MTIME (RISC-V) interrupt.
//!
//! 64 bits never wrap in practice: 584 million years at 1 ms/tick.
//!
//! Author: Moroya Sakamoto

/// Absolute tick value
pub type Tick = u64;

/// Monotonic tick counter
///
/// Size: 8 bytes
#[derive(Debug, Clone, Copy, Default)]
pub struct TickCounter {
    ticks: Tick,
}

impl TickCounter {
    /// Counter at tick zero
    pub const fn new() -> Self {
        Self { ticks: 0 }
    }

    /// Advance by one base time unit, returning the new time
    pub fn advance(&mut self) -> Tick {
        self.ticks += 1;
        self.ticks
    }

    /// Current tick
    pub fn now(&self) -> Tick {
        self.ticks
    }

    /// Ticks elapsed since a reference point
    pub fn elapsed_since(&self, reference: Tick) -> Tick {
        self.ticks.saturating_sub(reference)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_at_zero() {
        let counter = TickCounter::new();
        assert_eq!(counter.now(), 0);
    }

    #[test]
    fn test_advance() {
        let mut counter = TickCounter::new();
        assert_eq!(counter.advance(), 1);
        assert_eq!(counter.advance(), 2);
        assert_eq!(counter.now(), 2);
    }

    #[test]
    fn test_elapsed_since() {
        let mut counter = TickCounter::new();
        for _ in 0..10 {
            counter.advance();
        }
        let reference = counter.now();
        for _ in 0..5 {
            counter.advance();
        }
        assert_eq!(counter.elapsed_since(reference), 5);
        assert_eq!(counter.elapsed_since(100), 0);
    }
}
