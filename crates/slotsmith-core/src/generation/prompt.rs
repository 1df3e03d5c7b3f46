//! Instruction template for schedule generation

/// Number of options the model is asked for
pub const REQUESTED_OPTIONS: usize = 3;

/// Build the schedule prompt around the compressed calendar context
pub fn build_schedule_prompt(compressed_context: &str, preferences: &str) -> String {
    format!(
        r#"You are an expert meeting scheduler.
Based on the following compressed calendar context and user preferences, propose {count} optimal meeting times.

COMPRESSED CALENDAR CONTEXT:
{compressed_context}

USER PREFERENCES:
{preferences}

OUTPUT FORMAT (JSON ONLY):
Return a valid JSON array with exactly {count} meeting options. Each option must have:
- "title": Short title (max 5 words)
- "date": Day name from the calendar (e.g., "Monday", "Tuesday")
- "time": Time range (e.g., "10:00 AM - 11:00 AM")
- "duration": Duration in minutes (number)
- "reasoning": One sentence, max 15 words, explaining why this slot works

Keep the entire response under 500 characters. Return ONLY the JSON array. No markdown, no code fences, no extra text."#,
        count = REQUESTED_OPTIONS,
    )
}
