//! Schedule types shared by every tier

use serde::{Deserialize, Serialize};

/// Working days the heuristic knows about, in scan order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
}

impl Weekday {
    /// All weekdays in fixed order
    pub const ALL: [Weekday; 5] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
    ];

    /// Upper-case header form, as it appears in calendar text
    pub fn header(&self) -> &'static str {
        match self {
            Weekday::Monday => "MONDAY",
            Weekday::Tuesday => "TUESDAY",
            Weekday::Wednesday => "WEDNESDAY",
            Weekday::Thursday => "THURSDAY",
            Weekday::Friday => "FRIDAY",
        }
    }

    /// Match a day header at the start of an already upper-cased line
    pub fn from_header_prefix(upper: &str) -> Option<Weekday> {
        Self::ALL
            .into_iter()
            .find(|day| upper.starts_with(day.header()))
    }
}

impl std::fmt::Display for Weekday {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Weekday::Monday => "Monday",
            Weekday::Tuesday => "Tuesday",
            Weekday::Wednesday => "Wednesday",
            Weekday::Thursday => "Thursday",
            Weekday::Friday => "Friday",
        };
        write!(f, "{}", name)
    }
}

/// A proposed meeting slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleCandidate {
    /// Short title (e.g. "Available: Monday 11:00 AM"); models sometimes omit it
    #[serde(default)]
    pub title: String,
    /// Day name (e.g. "Monday")
    pub date: String,
    /// Time range (e.g. "11:00 AM - 11:30 AM")
    pub time: String,
    /// Duration in minutes
    #[serde(rename = "duration")]
    pub duration_minutes: u32,
    /// Why this slot works
    #[serde(default)]
    pub reasoning: String,
}

impl ScheduleCandidate {
    /// Encode a ranked list of candidates as the JSON schedule payload
    pub fn encode_all(candidates: &[ScheduleCandidate]) -> String {
        serde_json::to_string(candidates).unwrap_or_else(|_| "[]".to_string())
    }

    /// Decode a schedule payload, tolerating Markdown code fences
    pub fn decode_all(payload: &str) -> Option<Vec<ScheduleCandidate>> {
        let cleaned = crate::generation::strip_code_fences(payload);
        serde_json::from_str(&cleaned).ok()
    }
}
