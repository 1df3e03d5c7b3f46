//! Offline mode: local stand-ins for every remote tier

use crate::compression::raw_input_size;
use crate::metrics::{Latencies, compression_ratio, compute_metrics};
use crate::schedule::{ScheduleCandidate, SlotFinder};

use super::types::PipelineResult;

/// Calendar lines kept by the local approximation
pub const MAX_CONTEXT_LINES: usize = 10;

/// Preference characters kept by the local approximation
pub const PREFERENCE_PREVIEW_CHARS: usize = 50;

pub const OFFLINE_SPEEDUP_LABEL: &str = "N/A (Offline)";

const CONTEXT_HEADER: &str = "CONTEXT: SCHEDULE OPTIMIZATION";

/// Approximate compression locally.
///
/// Keeps lines with a digit or a scheduling keyword, at most ten, between a
/// fixed header and a preview of the preferences.
pub fn synthesize_compressed_text(calendar_text: &str, preferences_text: &str) -> String {
    let mut lines: Vec<String> = Vec::with_capacity(MAX_CONTEXT_LINES + 2);
    lines.push(CONTEXT_HEADER.to_string());
    lines.extend(
        calendar_text
            .lines()
            .filter(|line| is_schedule_line(line))
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .take(MAX_CONTEXT_LINES)
            .map(str::to_string),
    );
    let preview: String = preferences_text
        .chars()
        .take(PREFERENCE_PREVIEW_CHARS)
        .collect();
    lines.push(format!("PREFERENCES: {}...", preview));
    lines.join("\n")
}

fn is_schedule_line(line: &str) -> bool {
    let lower = line.to_lowercase();
    line.chars().any(|c| c.is_ascii_digit()) || lower.contains("time") || lower.contains("schedule")
}

/// Build the complete offline result. Cannot fail.
pub fn offline_result(calendar_text: &str, preferences_text: &str) -> PipelineResult {
    let raw_size = raw_input_size(calendar_text, preferences_text);
    let compressed_text = synthesize_compressed_text(calendar_text, preferences_text);
    let compressed_size = compressed_text.chars().count();

    let candidates = SlotFinder::new()
        .with_compression_ratio(compression_ratio(raw_size, compressed_size))
        .find(calendar_text);

    let metrics = compute_metrics(raw_size, compressed_size, Latencies::default())
        .with_speedup_factor(OFFLINE_SPEEDUP_LABEL);

    PipelineResult::success(
        ScheduleCandidate::encode_all(&candidates),
        compressed_text,
        metrics,
    )
}
