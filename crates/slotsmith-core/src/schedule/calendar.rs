//! Best-effort parsing of free-text calendars
//!
//! Calendar text is expected to look roughly like:
//!
//! ```text
//! MONDAY
//! 09:00 AM - 10:00 AM: Weekly Team Sync
//! TUESDAY
//! 10:00 AM – 11:00 AM: Client call
//! ```
//!
//! Nothing is enforced. Lines that don't parse are skipped.

use std::collections::HashMap;
use std::sync::OnceLock;

use chrono::{NaiveTime, Timelike};
use regex::Regex;

use super::types::Weekday;

/// A busy block on a single day
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusyInterval {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl BusyInterval {
    /// Start hour on a 24-hour clock
    pub fn start_hour(&self) -> u32 {
        self.start.hour()
    }
}

/// Result of scanning calendar text
#[derive(Debug, Clone, Default)]
pub struct CalendarScan {
    days: Vec<Weekday>,
    busy: HashMap<Weekday, Vec<BusyInterval>>,
}

impl CalendarScan {
    /// Days in the order they were first mentioned
    pub fn days(&self) -> &[Weekday] {
        &self.days
    }

    /// Busy intervals recorded for a day
    pub fn busy(&self, day: Weekday) -> &[BusyInterval] {
        self.busy.get(&day).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_mentioned(&self, day: Weekday) -> bool {
        self.days.contains(&day)
    }

    /// Total number of busy intervals across all days
    pub fn interval_count(&self) -> usize {
        self.busy.values().map(Vec::len).sum()
    }
}

fn time_range_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)(\d{1,2}):(\d{2})\s*([AP]M)\s*[-–]\s*(\d{1,2}):(\d{2})\s*([AP]M)")
            .expect("time range pattern is valid")
    })
}

/// Scan calendar text into per-day busy intervals
pub fn parse_calendar(text: &str) -> CalendarScan {
    let mut scan = CalendarScan::default();
    let mut current_day: Option<Weekday> = None;

    for line in text.lines() {
        let upper = line.trim().to_uppercase();
        if let Some(day) = Weekday::from_header_prefix(&upper) {
            current_day = Some(day);
            if !scan.days.contains(&day) {
                scan.days.push(day);
                scan.busy.insert(day, Vec::new());
            }
        }

        if let Some(day) = current_day
            && let Some(interval) = parse_time_range(line)
        {
            scan.busy.entry(day).or_default().push(interval);
        }
    }

    scan
}

/// Extract the first `HH:MM AM - HH:MM PM` range on a line
pub(crate) fn parse_time_range(line: &str) -> Option<BusyInterval> {
    let caps = time_range_regex().captures(line)?;
    let start = to_24_hour(&caps[1], &caps[2], &caps[3])?;
    let end = to_24_hour(&caps[4], &caps[5], &caps[6])?;
    Some(BusyInterval { start, end })
}

// Hours of 13 and above are already on a 24-hour clock ("13:00 PM").
fn to_24_hour(hour: &str, minute: &str, meridiem: &str) -> Option<NaiveTime> {
    let hour: u32 = hour.parse().ok()?;
    let minute: u32 = minute.parse().ok()?;
    let is_pm = meridiem.eq_ignore_ascii_case("PM");

    let hour = match hour {
        12 if !is_pm => 0,
        h if h < 12 && is_pm => h + 12,
        h => h,
    };

    NaiveTime::from_hms_opt(hour, minute, 0)
}
