//! Shift, day, week and month roll-ups of analysis history.
//!
//! Shifts are fixed eight-hour blocks in plant-local time:
//!
//! | Shift     | Local hours          |
//! |-----------|----------------------|
//! | morning   | 06:00 – 14:00        |
//! | afternoon | 14:00 – 22:00        |
//! | night     | 22:00 – 06:00 (next) |
//!
//! A night shift belongs to the date on which it starts, so a reference
//! time of 03:00 resolves to the night shift of the previous date.

mod period;
mod service;
mod summary;

pub use period::{PeriodType, PeriodWindow, Shift, SHIFT_HOURS};
pub use service::{AggregateOutcome, AggregationService, BackfillReport, ShiftComparison, ShiftStats};
pub use summary::{PeriodSummary, SummaryKey};
pub(crate) use summary::average;
