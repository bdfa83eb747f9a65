//! CSV and JSON exports of stored applications.

use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use thiserror::Error;
use utoipa::ToSchema;

use crate::records::properties as columns;
use crate::records::ApplicationRecord;

/// Anything other than `csv` (any case) is read as JSON; a missing or null
/// format means CSV.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Csv,
    Json,
}

impl<'de> Deserialize<'de> for ExportFormat {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<String>::deserialize(deserializer)? {
            None => ExportFormat::Csv,
            Some(value) if value.trim().eq_ignore_ascii_case("csv") => ExportFormat::Csv,
            Some(_) => ExportFormat::Json,
        })
    }
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv",
            ExportFormat::Json => "application/json",
        }
    }
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to flush CSV: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV output is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Column headers, in export order.
pub const EXPORT_COLUMNS: [&str; 15] = [
    columns::APPLICATION_ID,
    columns::STUDENT_NAME,
    columns::EMAIL,
    columns::PHONE,
    columns::DATE_OF_BIRTH,
    columns::ADDRESS,
    columns::GUARDIAN_NAME,
    columns::GUARDIAN_PHONE,
    columns::RELATION,
    columns::ROOM_NUMBER,
    columns::ADMISSION_DATE,
    columns::STAY_DURATION,
    columns::EMERGENCY_CONTACT,
    columns::STATUS,
    columns::SUBMISSION_DATE,
];

fn export_row(record: &ApplicationRecord) -> [&str; 15] {
    [
        record.application_id.as_str(),
        record.student_name.as_str(),
        record.email.as_str(),
        record.phone.as_str(),
        record.date_of_birth.as_str(),
        record.address.as_str(),
        record.guardian_name.as_str(),
        record.guardian_phone.as_str(),
        record.relation.as_str(),
        record.room_number.as_str(),
        record.admission_date.as_str(),
        record.stay_duration.as_str(),
        record.emergency_contact.as_str(),
        record.status.as_str(),
        record.submission_date.as_str(),
    ]
}

/// CSV with a header row. No applications yields an empty string.
pub fn to_csv(records: &[ApplicationRecord]) -> Result<String, ExportError> {
    if records.is_empty() {
        return Ok(String::new());
    }

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(EXPORT_COLUMNS)?;
    for record in records {
        writer.write_record(export_row(record))?;
    }
    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8(bytes)?)
}

/// One JSON object per application, keyed by column header.
pub fn to_json_rows(records: &[ApplicationRecord]) -> Value {
    let rows = records
        .iter()
        .map(|record| {
            let row: Map<String, Value> = EXPORT_COLUMNS
                .iter()
                .zip(export_row(record))
                .map(|(column, value)| (column.to_string(), Value::String(value.to_string())))
                .collect();
            Value::Object(row)
        })
        .collect();
    Value::Array(rows)
}

/// Render `records` in `format`.
pub fn export_data(format: ExportFormat, records: &[ApplicationRecord]) -> Result<Value, ExportError> {
    match format {
        ExportFormat::Csv => Ok(Value::String(to_csv(records)?)),
        ExportFormat::Json => Ok(to_json_rows(records)),
    }
}

pub fn export_filename<Tz: TimeZone>(format: ExportFormat, now: &DateTime<Tz>) -> String
where
    Tz::Offset: fmt::Display,
{
    format!(
        "applications_export_{}.{}",
        now.format("%Y%m%d_%H%M%S"),
        format.extension()
    )
}
