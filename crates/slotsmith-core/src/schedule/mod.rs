//! Schedule candidates and the local slot-finding heuristic
//!
//! This module provides:
//! - [`ScheduleCandidate`], the unit every tier produces
//! - Best-effort parsing of free-text calendars into per-day busy intervals
//! - [`SlotFinder`], the offline heuristic that proposes free slots

mod calendar;
mod heuristic;
mod types;

pub use calendar::{BusyInterval, CalendarScan, parse_calendar};
pub use heuristic::{AnchorSlot, ANCHOR_SLOTS, MAX_CANDIDATES, SlotFinder, find_slots};
pub use types::{ScheduleCandidate, Weekday};
