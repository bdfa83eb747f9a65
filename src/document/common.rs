//! Common formatting helpers shared by the document pages, the record store
//! and the submission flow.

use chrono::{DateTime, TimeZone};
use serde::Serialize;
use std::fmt;

/// Maximum characters of a student-detail value printed on the summary page.
pub const STUDENT_VALUE_MAX_CHARS: usize = 50;

/// Application identifier of the form `HA-YYYYMMDDHHMMSS`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ApplicationId(String);

impl ApplicationId {
    pub const PREFIX: &'static str = "HA-";

    /// Build an identifier from a clock reading.
    pub fn from_time<Tz: TimeZone>(now: &DateTime<Tz>) -> Self
    where
        Tz::Offset: fmt::Display,
    {
        Self(format!("{}{}", Self::PREFIX, now.format("%Y%m%d%H%M%S")))
    }

    /// Identifier for the current local time.
    pub fn generate() -> Self {
        Self::from_time(&chrono::Local::now())
    }

    /// Accept an existing identifier if it has the expected shape.
    pub fn parse(value: &str) -> Option<Self> {
        let digits = value.strip_prefix(Self::PREFIX)?;
        if digits.len() == 14 && digits.bytes().all(|b| b.is_ascii_digit()) {
            Some(Self(value.to_string()))
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Title-case a value word by word: the first letter after any non-letter is
/// upper-cased, the rest lower-cased ("o'NEIL" -> "O'Neil").
pub fn title_case(value: &str) -> String {
    let mut result = String::with_capacity(value.len());
    let mut previous_is_letter = false;

    for ch in value.chars() {
        if ch.is_alphabetic() {
            if previous_is_letter {
                result.extend(ch.to_lowercase());
            } else {
                result.extend(ch.to_uppercase());
            }
            previous_is_letter = true;
        } else {
            result.push(ch);
            previous_is_letter = false;
        }
    }

    result
}

/// Keep at most `max_chars` characters. Excess is dropped silently.
pub fn truncate_chars(value: &str, max_chars: usize) -> &str {
    match value.char_indices().nth(max_chars) {
        Some((byte_index, _)) => &value[..byte_index],
        None => value,
    }
}

/// Build the delivered PDF name, e.g.
/// `NavadayaGirlsHostel_Application_Asha_Rao_20250101_093000.pdf`.
pub fn document_filename<Tz: TimeZone>(prefix: &str, student_name: &str, now: &DateTime<Tz>) -> String
where
    Tz::Offset: fmt::Display,
{
    let name = student_name.trim();
    let name = if name.is_empty() { "Student" } else { name };
    let safe_name = sanitize_filename::sanitize(name.replace(' ', "_"));
    let safe_name = if safe_name.is_empty() {
        "Student".to_string()
    } else {
        safe_name
    };

    format!(
        "{}_Application_{}_{}.pdf",
        prefix,
        safe_name,
        now.format("%Y%m%d_%H%M%S")
    )
}

/// Condense a display name into a file-name prefix ("Navadaya Girls Hostel"
/// -> "NavadayaGirlsHostel").
pub fn filename_prefix(display_name: &str) -> String {
    let prefix: String = display_name
        .split_whitespace()
        .map(title_case)
        .collect::<String>()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect();

    if prefix.is_empty() {
        "Hostel".to_string()
    } else {
        prefix
    }
}
