//! Calendar-aware time arithmetic.
//!
//! Everything downstream (schedules, period windows, trend ranges) steps
//! through time with [`step_instant`], so month and year arithmetic follow
//! the calendar rather than fixed multiples of a second.
//!
//! - [`TimeUnit`] — the seven sampling units, `year` through `second`
//! - [`step_instant`] — move an instant by `amount` units
//! - [`PlantCalendar`] — plant-local midnight, week and month boundaries

mod calendar;
mod unit;

pub use calendar::PlantCalendar;
pub use unit::{step_instant, TimeUnit};
