//! Compile-time configuration — capacity, period limits, named periods
//!
//! All periods are expressed in ticks. The reference tick is 1 ms, so the
//! named periods below assume one `tick()` call per millisecond.
//!
//! Author: Moroya Sakamoto

/// Default number of task slots in a table
pub const MAX_TASKS: usize = 25;

/// Shortest period a task may be registered with
pub const MIN_PERIOD: u32 = 1;

/// Longest period a task may be registered with (24 h at 1 ms/tick)
pub const MAX_PERIOD: u32 = 86_400_000;

/// Returned by a task to request removal after this run
pub const PERIOD_END: u32 = 0;

pub const PERIOD_1MS: u32 = 1;
pub const PERIOD_10MS: u32 = PERIOD_1MS * 10;
pub const PERIOD_100MS: u32 = PERIOD_1MS * 100;
pub const PERIOD_1S: u32 = PERIOD_1MS * 1000;
pub const PERIOD_1M: u32 = PERIOD_1S * 60;
pub const PERIOD_1H: u32 = PERIOD_1M * 60;

/// Is `period` inside `[MIN_PERIOD, MAX_PERIOD]`?
#[inline]
pub const fn period_in_range(period: u32) -> bool {
    period >= MIN_PERIOD && period <= MAX_PERIOD
}
