//! HTML captions for Telegram. User-supplied values are escaped.

use crate::document::common::truncate_chars;
use crate::form::FormRecord;

/// Longest value printed in a caption. Telegram limits captions to 1024
/// characters.
const CAPTION_VALUE_MAX_CHARS: usize = 80;

pub fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

fn field(value: &Option<String>) -> String {
    escape_html(truncate_chars(FormRecord::text_or_na(value), CAPTION_VALUE_MAX_CHARS))
}

fn summary_lines(form: &FormRecord, application_id: &str) -> String {
    format!(
        "👤 <b>Student:</b> {}\n\
         📧 <b>Email:</b> {}\n\
         📱 <b>Phone:</b> {}\n\
         🏠 <b>Room:</b> {}\n\
         📅 <b>Admission Date:</b> {}\n\
         ⏰ <b>Duration:</b> {}\n\
         🆔 <b>Application ID:</b> {}",
        field(&form.full_name),
        field(&form.email),
        field(&form.phone),
        field(&form.room_number),
        field(&form.admission_date),
        field(&form.stay_duration),
        escape_html(application_id),
    )
}

/// Caption sent with the application PDF.
pub fn application_caption(form: &FormRecord, application_id: &str) -> String {
    format!(
        "🏠 <b>New Hostel Admission Application</b>\n\n{}\n\n📋 Complete application form attached as PDF.",
        summary_lines(form, application_id)
    )
}

/// Text sent when the PDF could not be produced.
pub fn build_failure_message(form: &FormRecord, application_id: &str, error: &str) -> String {
    format!(
        "⚠️ <b>New Hostel Admission Application (PDF unavailable)</b>\n\n{}\n\n❗ {}",
        summary_lines(form, application_id),
        escape_html(error)
    )
}
