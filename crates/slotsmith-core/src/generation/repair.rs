//! Salvaging truncated JSON from generative models
//!
//! Models that hit their output limit stop mid-token, usually inside the last
//! string of the last object. This module closes such a tail: it appends a
//! closing quote when a string is still open, then the missing braces, then
//! the missing brackets.
//!
//! It is NOT a general JSON recovery parser. It assumes truncation happened at
//! the tail only and never inserts content inside the structure. Anything it
//! cannot close is handed back unchanged.

/// Outcome of a repair attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Repair {
    /// Input already parsed; returned untouched
    Valid(String),
    /// Tail was closed and now parses
    Repaired(String),
    /// Could not be fixed; the original text, untouched
    Unrecoverable(String),
}

impl Repair {
    /// Whether the text now parses as JSON
    pub fn is_json(&self) -> bool {
        !matches!(self, Repair::Unrecoverable(_))
    }

    pub fn as_str(&self) -> &str {
        match self {
            Repair::Valid(text) | Repair::Repaired(text) | Repair::Unrecoverable(text) => text,
        }
    }

    pub fn into_text(self) -> String {
        match self {
            Repair::Valid(text) | Repair::Repaired(text) | Repair::Unrecoverable(text) => text,
        }
    }
}

/// Remove Markdown code fences (```json or ```) wrapped around a payload
pub fn strip_code_fences(text: &str) -> String {
    let trimmed = text.trim();
    let cleaned = if trimmed.starts_with("```json") {
        trimmed
            .replace("```json\n", "")
            .replace("```json", "")
            .replace("```", "")
    } else if trimmed.starts_with("```") {
        trimmed.replace("```\n", "").replace("```", "")
    } else {
        trimmed.to_string()
    };
    cleaned.trim().to_string()
}

/// Try to make `text` parse as JSON by closing a truncated tail
pub fn repair_json(text: &str) -> Repair {
    if parses(text) {
        return Repair::Valid(text.to_string());
    }

    let tail = TailScan::of(text);
    if !tail.in_string && !ends_on_bare_char(text) {
        return Repair::Unrecoverable(text.to_string());
    }

    let mut fixed = text.to_string();
    if tail.in_string {
        // A partial escape would swallow or corrupt the closing quote
        fixed.truncate(fixed.len() - tail.escape.pending_len());
        fixed.push('"');
    }
    fixed.extend(std::iter::repeat_n('}', tail.open_braces));
    fixed.extend(std::iter::repeat_n(']', tail.open_brackets));

    if parses(&fixed) {
        Repair::Repaired(fixed)
    } else {
        Repair::Unrecoverable(text.to_string())
    }
}

fn parses(text: &str) -> bool {
    serde_json::from_str::<serde_json::Value>(text).is_ok()
}

// Letters, digits, `. , ! ?`, space, or a closing quote.
fn ends_on_bare_char(text: &str) -> bool {
    text.chars().last().is_some_and(|c| {
        c.is_ascii_alphanumeric() || matches!(c, '.' | ',' | '!' | '?' | ' ' | '"')
    })
}

/// Escape sequence cut off at the end of a string
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
enum PendingEscape {
    #[default]
    None,
    /// A lone `\`
    Backslash,
    /// `\u` followed by this many hex digits (0 to 3)
    Unicode(usize),
}

impl PendingEscape {
    /// Bytes of the unfinished sequence, all ASCII
    fn pending_len(&self) -> usize {
        match self {
            PendingEscape::None => 0,
            PendingEscape::Backslash => 1,
            PendingEscape::Unicode(digits) => 2 + digits,
        }
    }
}

/// Bracket balance and string state at the end of the text
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct TailScan {
    in_string: bool,
    escape: PendingEscape,
    open_braces: usize,
    open_brackets: usize,
}

impl TailScan {
    fn of(text: &str) -> Self {
        let mut in_string = false;
        let mut escape = PendingEscape::None;
        let mut braces: i64 = 0;
        let mut brackets: i64 = 0;

        for c in text.chars() {
            if in_string {
                escape = match escape {
                    PendingEscape::Backslash if c == 'u' => PendingEscape::Unicode(0),
                    PendingEscape::Unicode(digits) if digits < 3 && c.is_ascii_hexdigit() => {
                        PendingEscape::Unicode(digits + 1)
                    }
                    PendingEscape::Backslash | PendingEscape::Unicode(_) => PendingEscape::None,
                    PendingEscape::None => {
                        match c {
                            '\\' => PendingEscape::Backslash,
                            '"' => {
                                in_string = false;
                                PendingEscape::None
                            }
                            _ => PendingEscape::None,
                        }
                    }
                };
                continue;
            }
            match c {
                '"' => in_string = true,
                '{' => braces += 1,
                '}' => braces -= 1,
                '[' => brackets += 1,
                ']' => brackets -= 1,
                _ => {}
            }
        }

        Self {
            in_string,
            escape,
            open_braces: braces.max(0) as usize,
            open_brackets: brackets.max(0) as usize,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    const VALID: &str = r#"[{"title":"Design Sync","date":"Monday","time":"11:00 AM - 11:30 AM","duration":30,"reasoning":"Free after the weekly sync."},{"title":"Follow-up","date":"Wednesday","time":"2:00 PM - 2:30 PM","duration":30,"reasoning":"Afternoon is preferred."}]"#;

    #[test]
    fn test_valid_json_untouched() {
        assert_eq!(repair_json(VALID), Repair::Valid(VALID.to_string()));
        assert_eq!(repair_json("{}"), Repair::Valid("{}".to_string()));
    }

    #[test]
    fn test_unfixable_text_returned_unchanged() {
        let prose = "I could not find a slot, sorry:";
        assert_eq!(repair_json(prose), Repair::Unrecoverable(prose.to_string()));

        let broken = r#"[{"title": "A"},"#;
        let repaired = repair_json(broken);
        assert!(!repaired.is_json());
        assert_eq!(repaired.as_str(), broken);

        let mid_key = r#"[{"title": "#;
        assert_eq!(repair_json(mid_key).into_text(), mid_key);
    }

    #[test]
    fn test_truncated_inside_string() {
        let repaired = repair_json(r#"[{"title": "Design Sy"#);
        assert_eq!(
            repaired,
            Repair::Repaired(r#"[{"title": "Design Sy"}]"#.to_string())
        );
    }

    #[test]
    fn test_truncated_after_number() {
        let repaired = repair_json(r#"[{"title": "A", "duration": 30"#);
        assert_eq!(repaired.as_str(), r#"[{"title": "A", "duration": 30}]"#);
    }

    #[test]
    fn test_truncated_after_closed_string() {
        let repaired = repair_json(r#"[{"title": "A""#);
        assert_eq!(repaired.as_str(), r#"[{"title": "A"}]"#);
    }

    #[test]
    fn test_braces_inside_strings_are_not_counted() {
        let repaired = repair_json(r#"[{"reasoning": "use {braces} and [brackets"#);
        assert_eq!(
            repaired.as_str(),
            r#"[{"reasoning": "use {braces} and [brackets"}]"#
        );
    }

    #[test]
    fn test_dangling_escape_dropped() {
        let repaired = repair_json(r#"[{"reasoning": "say \"hi\"#);
        assert!(repaired.is_json());
        let value: Value = serde_json::from_str(repaired.as_str()).unwrap();
        assert_eq!(value[0]["reasoning"], "say \"hi");
    }

    const ESCAPED: &str = r#"[{"title":"Wrap-up","date":"Friday","time":"9:00 AM - 9:30 AM","duration":30,"reasoning":"It\u2019s free and \"quiet\"."}]"#;

    fn assert_every_cut_repairs(valid: &str) {
        let open_quote = valid.rfind(":\"").unwrap() + 1;
        let close_quote = valid.rfind('"').unwrap();
        assert!(open_quote < close_quote);

        for cut in (open_quote + 1)..=close_quote {
            if !valid.is_char_boundary(cut) {
                continue;
            }
            let truncated = &valid[..cut];
            let repaired = repair_json(truncated);
            assert!(repaired.is_json(), "cut at {cut} not repaired: {truncated}");

            let value: Value = serde_json::from_str(repaired.as_str()).unwrap();
            let items = value.as_array().expect("array");
            assert!(!items.is_empty());

            let kept = truncated.len() - TailScan::of(truncated).escape.pending_len();
            assert!(repaired.as_str().starts_with(&truncated[..kept]));
        }
    }

    #[test]
    fn test_truncation_anywhere_in_last_string_field() {
        assert_every_cut_repairs(VALID);
    }

    #[test]
    fn test_truncation_inside_escape_sequences() {
        assert_every_cut_repairs(ESCAPED);
    }

    #[test]
    fn test_partial_unicode_escape_dropped() {
        for truncated in [
            r#"[{"reasoning":"It\u"#,
            r#"[{"reasoning":"It\u2"#,
            r#"[{"reasoning":"It\u20"#,
            r#"[{"reasoning":"It\u201"#,
        ] {
            let repaired = repair_json(truncated);
            assert_eq!(repaired.as_str(), r#"[{"reasoning":"It"}]"#, "from {truncated}");
        }

        let complete = repair_json(r#"[{"reasoning":"It\u2019"#);
        let value: Value = serde_json::from_str(complete.as_str()).unwrap();
        assert_eq!(value[0]["reasoning"], "It\u{2019}");
    }

    #[test]
    fn test_strip_code_fences() {
        assert_eq!(strip_code_fences("```json\n[1, 2]\n```"), "[1, 2]");
        assert_eq!(strip_code_fences("```\n{\"a\": 1}\n```\n"), "{\"a\": 1}");
        assert_eq!(strip_code_fences("  [1]  "), "[1]");
        assert_eq!(strip_code_fences("```json[1]```"), "[1]");
    }
}
