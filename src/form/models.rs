use serde::{Deserialize, Deserializer};
use serde_json::Value;
use utoipa::ToSchema;

/// One admission form submission. Every field is optional; empty strings are
/// treated as absent.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FormRecord {
    #[schema(example = "Asha Rao")]
    #[serde(default, deserialize_with = "lenient_text")]
    pub full_name: Option<String>,
    #[schema(example = "2004-08-17")]
    #[serde(default, deserialize_with = "lenient_text")]
    pub date_of_birth: Option<String>,
    #[schema(example = "female")]
    #[serde(default, deserialize_with = "lenient_text")]
    pub gender: Option<String>,
    #[schema(example = "asha.rao@example.com")]
    #[serde(default, deserialize_with = "lenient_text")]
    pub email: Option<String>,
    #[schema(example = "+91 98450 12345")]
    #[serde(default, deserialize_with = "lenient_text")]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub address: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub guardian_name: Option<String>,
    #[schema(example = "mother")]
    #[serde(default, deserialize_with = "lenient_text")]
    pub relation: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub guardian_phone: Option<String>,
    #[schema(example = "B-204")]
    #[serde(default, deserialize_with = "lenient_text")]
    pub room_number: Option<String>,
    #[schema(example = "2025-07-01")]
    #[serde(default, deserialize_with = "lenient_text")]
    pub admission_date: Option<String>,
    #[schema(example = "12 months")]
    #[serde(default, deserialize_with = "lenient_text")]
    pub stay_duration: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub emergency_contact: Option<String>,
    /// Data URI, e.g. `data:image/jpeg;base64,...`.
    #[serde(default, deserialize_with = "lenient_text")]
    pub student_photo: Option<String>,
    /// One data URI or a list of them.
    #[serde(default, deserialize_with = "one_or_many")]
    pub id_proofs: Option<Vec<String>>,
    /// Older clients send a single `idProof`.
    #[serde(default, deserialize_with = "lenient_text")]
    pub id_proof: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub signature: Option<String>,
}

impl FormRecord {
    /// Field value, or the empty string when absent.
    pub fn text(field: &Option<String>) -> &str {
        field.as_deref().unwrap_or("")
    }

    /// Field value, or `N/A` when absent.
    pub fn text_or_na(field: &Option<String>) -> &str {
        field.as_deref().unwrap_or("N/A")
    }

    pub fn student_photo(&self) -> Option<&str> {
        self.student_photo.as_deref()
    }

    /// ID proofs in submission order. Falls back to the legacy single field.
    pub fn id_proofs(&self) -> Vec<&str> {
        match &self.id_proofs {
            Some(proofs) if !proofs.is_empty() => proofs.iter().map(String::as_str).collect(),
            _ => self.id_proof.as_deref().into_iter().collect(),
        }
    }

    pub fn signature(&self) -> Option<&str> {
        self.signature.as_deref()
    }

    pub fn has_attachments(&self) -> bool {
        self.student_photo().is_some() || !self.id_proofs().is_empty() || self.signature().is_some()
    }
}

fn value_to_text(value: Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Accepts strings, numbers, booleans and null. Anything else reads as absent.
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(value_to_text))
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let items: Vec<String> = match value {
        Some(Value::Array(items)) => items.into_iter().filter_map(value_to_text).collect(),
        Some(other) => value_to_text(other).into_iter().collect(),
        None => Vec::new(),
    };
    Ok((!items.is_empty()).then_some(items))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_camel_case_fields_and_empty_strings() {
        let form: FormRecord = serde_json::from_value(json!({
            "fullName": "Asha Rao",
            "guardianPhone": "",
            "roomNumber": 204,
            "stayDuration": null,
        }))
        .unwrap();

        assert_eq!(form.full_name.as_deref(), Some("Asha Rao"));
        assert_eq!(form.guardian_phone, None);
        assert_eq!(form.room_number.as_deref(), Some("204"));
        assert_eq!(form.stay_duration, None);
        assert_eq!(FormRecord::text(&form.email), "");
        assert_eq!(FormRecord::text_or_na(&form.email), "N/A");
        assert!(!form.has_attachments());
    }

    #[test]
    fn test_id_proofs_accepts_single_string() {
        let form: FormRecord = serde_json::from_value(json!({ "idProofs": "data:image/png;base64,AAA" })).unwrap();
        assert_eq!(form.id_proofs(), vec!["data:image/png;base64,AAA"]);
    }

    #[test]
    fn test_id_proofs_list_keeps_order_and_drops_blanks() {
        let form: FormRecord = serde_json::from_value(json!({ "idProofs": ["a,1", "", "b,2"] })).unwrap();
        assert_eq!(form.id_proofs(), vec!["a,1", "b,2"]);
    }

    #[test]
    fn test_legacy_id_proof_is_normalized() {
        let form: FormRecord = serde_json::from_value(json!({ "idProof": "legacy,AAA" })).unwrap();
        assert_eq!(form.id_proofs(), vec!["legacy,AAA"]);
        assert!(form.has_attachments());

        let both: FormRecord = serde_json::from_value(json!({
            "idProof": "legacy,AAA",
            "idProofs": ["new,BBB"],
        }))
        .unwrap();
        assert_eq!(both.id_proofs(), vec!["new,BBB"]);
    }
}
