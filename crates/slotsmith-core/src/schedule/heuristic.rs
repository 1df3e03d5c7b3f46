//! Offline slot-finding heuristic
//!
//! Hour-level and deliberately conservative: an anchor slot is blocked when a
//! busy interval *starts* within one hour of it. Long meetings only block
//! anchors near their start.

use super::calendar::{BusyInterval, parse_calendar};
use super::types::{ScheduleCandidate, Weekday};

/// Upper bound on proposed candidates
pub const MAX_CANDIDATES: usize = 3;

/// Length of every proposed slot
pub const SLOT_MINUTES: u32 = 30;

const COLLISION_MARGIN_HOURS: u32 = 1;

const OPEN_DAY_SLOT: &str = "10:00 AM - 10:30 AM";

/// A fixed candidate window tested against busy intervals
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnchorSlot {
    /// Start hour on a 24-hour clock
    pub hour: u32,
    pub start: &'static str,
    pub range: &'static str,
}

impl AnchorSlot {
    pub fn collides_with(&self, busy: &BusyInterval) -> bool {
        self.hour.abs_diff(busy.start_hour()) <= COLLISION_MARGIN_HOURS
    }

    fn is_free(&self, busy: &[BusyInterval]) -> bool {
        !busy.iter().any(|interval| self.collides_with(interval))
    }
}

/// Anchors in the order they are tried for each day
pub const ANCHOR_SLOTS: [AnchorSlot; 4] = [
    AnchorSlot {
        hour: 9,
        start: "9:00 AM",
        range: "9:00 AM - 9:30 AM",
    },
    AnchorSlot {
        hour: 11,
        start: "11:00 AM",
        range: "11:00 AM - 11:30 AM",
    },
    AnchorSlot {
        hour: 14,
        start: "2:00 PM",
        range: "2:00 PM - 2:30 PM",
    },
    AnchorSlot {
        hour: 16,
        start: "4:00 PM",
        range: "4:00 PM - 4:30 PM",
    },
];

/// Proposes up to three free slots from calendar text
#[derive(Debug, Clone, Copy, Default)]
pub struct SlotFinder {
    compression_ratio: Option<f64>,
}

impl SlotFinder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mention the achieved compression ratio in generated reasoning
    pub fn with_compression_ratio(mut self, ratio: f64) -> Self {
        self.compression_ratio = Some(ratio);
        self
    }

    /// Scan the text and propose candidates.
    ///
    /// Days mentioned in the text are tried first, in order of appearance,
    /// one slot per day. Remaining places are filled with weekdays the text
    /// never mentions.
    pub fn find(&self, text: &str) -> Vec<ScheduleCandidate> {
        let scan = parse_calendar(text);
        let mut candidates = Vec::with_capacity(MAX_CANDIDATES);

        for &day in scan.days() {
            if candidates.len() >= MAX_CANDIDATES {
                break;
            }
            let busy = scan.busy(day);
            if let Some(anchor) = ANCHOR_SLOTS.iter().find(|anchor| anchor.is_free(busy)) {
                candidates.push(self.gap_candidate(day, anchor));
            }
        }

        for day in Weekday::ALL {
            if candidates.len() >= MAX_CANDIDATES {
                break;
            }
            if !scan.is_mentioned(day) {
                candidates.push(self.open_candidate(day));
            }
        }

        candidates
    }

    fn gap_candidate(&self, day: Weekday, anchor: &AnchorSlot) -> ScheduleCandidate {
        let mut reasoning = format!(
            "Gap found in {}'s schedule around {}.",
            day.to_string().to_lowercase(),
            anchor.start
        );
        if let Some(ratio) = self.compression_ratio {
            reasoning.push_str(&format!(" {:.0}% compression applied.", ratio));
        }
        reasoning.push_str(" Add a generation API key for AI analysis.");

        ScheduleCandidate {
            title: format!("Available: {} {}", day, anchor.start),
            date: day.to_string(),
            time: anchor.range.to_string(),
            duration_minutes: SLOT_MINUTES,
            reasoning,
        }
    }

    fn open_candidate(&self, day: Weekday) -> ScheduleCandidate {
        ScheduleCandidate {
            title: format!("Available: {} (Open)", day),
            date: day.to_string(),
            time: OPEN_DAY_SLOT.to_string(),
            duration_minutes: SLOT_MINUTES,
            reasoning: format!(
                "{} has no events in your calendar. Add a generation API key for smarter suggestions.",
                day
            ),
        }
    }
}

/// Run the heuristic with default settings
pub fn find_slots(text: &str) -> Vec<ScheduleCandidate> {
    SlotFinder::new().find(text)
}
