//! Notion property payloads for the applications database and the defensive
//! readers that turn pages back into `ApplicationRecord`s.

use chrono::NaiveDateTime;
use serde_json::{json, Map, Value};

use super::{ApplicationRecord, ApplicationUpdate, STATUS_PENDING};
use crate::document::common::title_case;
use crate::document::ApplicationId;
use crate::form::FormRecord;

pub const DATABASE_TITLE: &str = "Hostel Admission Applications";
pub const QUERY_PAGE_SIZE: u32 = 100;

pub const STUDENT_NAME: &str = "Student Name";
pub const APPLICATION_ID: &str = "Application ID";
pub const EMAIL: &str = "Email";
pub const PHONE: &str = "Phone";
pub const DATE_OF_BIRTH: &str = "Date of Birth";
pub const GENDER: &str = "Gender";
pub const ADDRESS: &str = "Address";
pub const GUARDIAN_NAME: &str = "Guardian Name";
pub const GUARDIAN_PHONE: &str = "Guardian Phone";
pub const RELATION: &str = "Relation";
pub const ROOM_NUMBER: &str = "Room Number";
pub const ADMISSION_DATE: &str = "Admission Date";
pub const STAY_DURATION: &str = "Stay Duration";
pub const EMERGENCY_CONTACT: &str = "Emergency Contact";
pub const STATUS: &str = "Status";
pub const SUBMISSION_DATE: &str = "Submission Date";

/// Property schema used when the database is created.
pub fn database_schema() -> Value {
    json!({
        STUDENT_NAME: { "title": {} },
        APPLICATION_ID: { "rich_text": {} },
        EMAIL: { "email": {} },
        PHONE: { "phone_number": {} },
        DATE_OF_BIRTH: { "date": {} },
        GENDER: { "select": { "options": [
            { "name": "Male", "color": "blue" },
            { "name": "Female", "color": "pink" },
            { "name": "Other", "color": "gray" },
        ]}},
        ADDRESS: { "rich_text": {} },
        GUARDIAN_NAME: { "rich_text": {} },
        GUARDIAN_PHONE: { "phone_number": {} },
        RELATION: { "select": { "options": [
            { "name": "Father", "color": "blue" },
            { "name": "Mother", "color": "pink" },
            { "name": "Guardian", "color": "green" },
            { "name": "Other", "color": "gray" },
        ]}},
        ROOM_NUMBER: { "rich_text": {} },
        ADMISSION_DATE: { "date": {} },
        STAY_DURATION: { "rich_text": {} },
        EMERGENCY_CONTACT: { "phone_number": {} },
        STATUS: { "select": { "options": [
            { "name": "Pending Review", "color": "yellow" },
            { "name": "Approved", "color": "green" },
            { "name": "Rejected", "color": "red" },
        ]}},
        SUBMISSION_DATE: { "date": {} },
    })
}

/// Body of a create-database request.
pub fn create_database_body(parent_page_id: &str) -> Value {
    json!({
        "parent": { "type": "page_id", "page_id": parent_page_id },
        "title": [{ "type": "text", "text": { "content": DATABASE_TITLE } }],
        "properties": database_schema(),
    })
}

pub fn title(content: &str) -> Value {
    json!({ "title": [{ "text": { "content": content } }] })
}

pub fn rich_text(content: &str) -> Value {
    json!({ "rich_text": [{ "text": { "content": content } }] })
}

pub fn email(value: &str) -> Value {
    json!({ "email": value })
}

pub fn phone(value: &str) -> Value {
    json!({ "phone_number": value })
}

pub fn date(start: &str) -> Value {
    json!({ "date": { "start": start } })
}

pub fn select(name: &str) -> Value {
    json!({ "select": { "name": name } })
}

/// Properties of a newly submitted application. Only non-empty form fields
/// are written.
pub fn form_properties(
    form: &FormRecord,
    application_id: &ApplicationId,
    submitted_at: NaiveDateTime,
) -> Map<String, Value> {
    let mut props = Map::new();
    props.insert(STUDENT_NAME.into(), title(FormRecord::text_or_na(&form.full_name)));
    props.insert(APPLICATION_ID.into(), rich_text(application_id.as_str()));

    let mut put = |name: &str, value: &Option<String>, build: fn(&str) -> Value| {
        if let Some(value) = value.as_deref() {
            props.insert(name.into(), build(value));
        }
    };
    put(EMAIL, &form.email, email);
    put(PHONE, &form.phone, phone);
    put(DATE_OF_BIRTH, &form.date_of_birth, date);
    put(ADDRESS, &form.address, rich_text);
    put(GUARDIAN_NAME, &form.guardian_name, rich_text);
    put(GUARDIAN_PHONE, &form.guardian_phone, phone);
    put(ROOM_NUMBER, &form.room_number, rich_text);
    put(ADMISSION_DATE, &form.admission_date, date);
    put(STAY_DURATION, &form.stay_duration, rich_text);
    put(EMERGENCY_CONTACT, &form.emergency_contact, phone);

    if let Some(gender) = form.gender.as_deref() {
        props.insert(GENDER.into(), select(&title_case(gender)));
    }
    if let Some(relation) = form.relation.as_deref() {
        props.insert(RELATION.into(), select(&title_case(relation)));
    }

    props.insert(STATUS.into(), select(STATUS_PENDING));
    props.insert(
        SUBMISSION_DATE.into(),
        date(&submitted_at.format("%Y-%m-%dT%H:%M:%S").to_string()),
    );
    props
}

/// Properties touched by an admin edit.
pub fn update_properties(update: &ApplicationUpdate) -> Map<String, Value> {
    let fields: [(&str, &Option<String>, fn(&str) -> Value); 13] = [
        (STUDENT_NAME, &update.student_name, title),
        (EMAIL, &update.email, email),
        (PHONE, &update.phone, phone),
        (DATE_OF_BIRTH, &update.date_of_birth, date),
        (ADDRESS, &update.address, rich_text),
        (GUARDIAN_NAME, &update.guardian_name, rich_text),
        (GUARDIAN_PHONE, &update.guardian_phone, phone),
        (RELATION, &update.relation, select),
        (ROOM_NUMBER, &update.room_number, rich_text),
        (ADMISSION_DATE, &update.admission_date, date),
        (STAY_DURATION, &update.stay_duration, rich_text),
        (EMERGENCY_CONTACT, &update.emergency_contact, phone),
        (STATUS, &update.status, select),
    ];

    fields
        .into_iter()
        .filter_map(|(name, value, build)| {
            let value = value.as_deref().filter(|v| !v.is_empty())?;
            Some((name.to_string(), build(value)))
        })
        .collect()
}

/// Body of a database query, newest submission first.
pub fn query_body(status: Option<&str>, start_cursor: Option<&str>) -> Value {
    let mut body = json!({
        "sorts": [{ "property": SUBMISSION_DATE, "direction": "descending" }],
        "page_size": QUERY_PAGE_SIZE,
    });
    if let Some(status) = status.filter(|s| !s.is_empty()) {
        body["filter"] = json!({ "property": STATUS, "select": { "equals": status } });
    }
    if let Some(cursor) = start_cursor {
        body["start_cursor"] = json!(cursor);
    }
    body
}

fn first_text(items: &Value) -> String {
    let Some(first) = items.get(0) else {
        return String::new();
    };
    first
        .pointer("/text/content")
        .or_else(|| first.get("plain_text"))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// Text of a title or rich-text property.
pub fn text_of(prop: Option<&Value>) -> String {
    let Some(prop) = prop else {
        return String::new();
    };
    match prop.get("type").and_then(Value::as_str) {
        Some("title") => prop.get("title").map(first_text).unwrap_or_default(),
        Some("rich_text") => prop.get("rich_text").map(first_text).unwrap_or_default(),
        _ => String::new(),
    }
}

fn str_at(prop: Option<&Value>, pointer: &str) -> String {
    prop.and_then(|p| p.pointer(pointer))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

pub fn email_of(prop: Option<&Value>) -> String {
    str_at(prop, "/email")
}

pub fn phone_of(prop: Option<&Value>) -> String {
    str_at(prop, "/phone_number")
}

pub fn date_of(prop: Option<&Value>) -> String {
    str_at(prop, "/date/start")
}

pub fn select_of(prop: Option<&Value>) -> String {
    str_at(prop, "/select/name")
}

/// Read an application out of a Notion page object. Returns `None` when the
/// page has no ID.
pub fn record_from_page(page: &Value) -> Option<ApplicationRecord> {
    let id = page.get("id")?.as_str()?.to_string();
    let props = page.get("properties");
    let prop = |name: &str| props.and_then(|p| p.get(name));

    let status = select_of(prop(STATUS));
    Some(ApplicationRecord {
        id,
        student_name: text_of(prop(STUDENT_NAME)),
        email: email_of(prop(EMAIL)),
        phone: phone_of(prop(PHONE)),
        date_of_birth: date_of(prop(DATE_OF_BIRTH)),
        address: text_of(prop(ADDRESS)),
        guardian_name: text_of(prop(GUARDIAN_NAME)),
        guardian_phone: phone_of(prop(GUARDIAN_PHONE)),
        relation: select_of(prop(RELATION)),
        room_number: text_of(prop(ROOM_NUMBER)),
        admission_date: date_of(prop(ADMISSION_DATE)),
        stay_duration: text_of(prop(STAY_DURATION)),
        emergency_contact: phone_of(prop(EMERGENCY_CONTACT)),
        status: if status.is_empty() {
            STATUS_PENDING.to_string()
        } else {
            status
        },
        submission_date: date_of(prop(SUBMISSION_DATE)),
        application_id: text_of(prop(APPLICATION_ID)),
    })
}

/// Title of a database object, `Unknown` when it has none.
pub fn database_title(database: &Value) -> String {
    let title = database.get("title").map(first_text).unwrap_or_default();
    if title.is_empty() {
        "Unknown".to_string()
    } else {
        title
    }
}

/// Title of a page object: the text of its title-typed property.
pub fn page_title(page: &Value) -> String {
    let title = page
        .get("properties")
        .and_then(Value::as_object)
        .and_then(|props| {
            props
                .values()
                .find(|p| p.get("type").and_then(Value::as_str) == Some("title"))
        })
        .map(|p| text_of(Some(p)))
        .unwrap_or_default();
    if title.is_empty() {
        "Unknown".to_string()
    } else {
        title
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn submitted_at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, 15).unwrap().and_hms_opt(14, 30, 0).unwrap()
    }

    #[test]
    fn test_schema_has_every_column() {
        let schema = database_schema();
        let props = schema.as_object().unwrap();
        assert_eq!(props.len(), 16);
        assert!(props[STUDENT_NAME].get("title").is_some());
        assert_eq!(props[STATUS]["select"]["options"][0]["name"], "Pending Review");
    }

    #[test]
    fn test_form_properties_skip_empty_fields() {
        let form = FormRecord {
            full_name: Some("Asha Rao".into()),
            gender: Some("female".into()),
            relation: Some("MOTHER".into()),
            email: Some("asha@example.com".into()),
            ..Default::default()
        };
        let id = ApplicationId::parse("HA-20250115143000").unwrap();
        let props = form_properties(&form, &id, submitted_at());

        assert_eq!(props[STUDENT_NAME]["title"][0]["text"]["content"], "Asha Rao");
        assert_eq!(props[APPLICATION_ID]["rich_text"][0]["text"]["content"], "HA-20250115143000");
        assert_eq!(props[GENDER]["select"]["name"], "Female");
        assert_eq!(props[RELATION]["select"]["name"], "Mother");
        assert_eq!(props[STATUS]["select"]["name"], STATUS_PENDING);
        assert_eq!(props[SUBMISSION_DATE]["date"]["start"], "2025-01-15T14:30:00");
        assert!(!props.contains_key(PHONE));
        assert!(!props.contains_key(ADDRESS));
    }

    #[test]
    fn test_missing_name_is_na() {
        let id = ApplicationId::parse("HA-20250115143000").unwrap();
        let props = form_properties(&FormRecord::default(), &id, submitted_at());
        assert_eq!(props[STUDENT_NAME]["title"][0]["text"]["content"], "N/A");
    }

    #[test]
    fn test_update_properties_ignores_blank_values() {
        let update = ApplicationUpdate {
            room_number: Some("C-12".into()),
            email: Some(String::new()),
            status: Some("Approved".into()),
            ..Default::default()
        };
        let props = update_properties(&update);
        assert_eq!(props.len(), 2);
        assert_eq!(props[ROOM_NUMBER]["rich_text"][0]["text"]["content"], "C-12");
        assert_eq!(props[STATUS]["select"]["name"], "Approved");
    }

    #[test]
    fn test_query_body_filter_and_cursor() {
        let plain = query_body(None, None);
        assert!(plain.get("filter").is_none());
        assert_eq!(plain["sorts"][0]["direction"], "descending");

        let filtered = query_body(Some("Approved"), Some("cursor-1"));
        assert_eq!(filtered["filter"]["select"]["equals"], "Approved");
        assert_eq!(filtered["start_cursor"], "cursor-1");
    }

    #[test]
    fn test_record_from_page_is_defensive() {
        let page = json!({
            "id": "59833787-2cf9-4fdf-8782-e53db20768a5",
            "properties": {
                "Student Name": { "type": "title", "title": [{ "text": { "content": "Asha Rao" } }] },
                "Address": { "type": "rich_text", "rich_text": [] },
                "Email": { "type": "email", "email": null },
                "Phone": { "type": "phone_number", "phone_number": "+91 98450 12345" },
                "Admission Date": { "type": "date", "date": { "start": "2025-07-01" } },
                "Status": { "type": "select", "select": null },
                "Room Number": { "type": "number", "number": 12 },
            }
        });
        let record = record_from_page(&page).unwrap();
        assert_eq!(record.student_name, "Asha Rao");
        assert_eq!(record.address, "");
        assert_eq!(record.email, "");
        assert_eq!(record.phone, "+91 98450 12345");
        assert_eq!(record.admission_date, "2025-07-01");
        assert_eq!(record.status, STATUS_PENDING);
        assert_eq!(record.room_number, "");
        assert_eq!(record.application_id, "");

        assert!(record_from_page(&json!({ "properties": {} })).is_none());
    }

    #[test]
    fn test_titles_fall_back_to_unknown() {
        let database = json!({ "title": [{ "plain_text": "Hostel Admission Applications" }] });
        assert_eq!(database_title(&database), "Hostel Admission Applications");
        assert_eq!(database_title(&json!({ "title": [] })), "Unknown");

        let page = json!({ "properties": { "title": { "type": "title", "title": [{ "text": { "content": "Admissions" } }] } } });
        assert_eq!(page_title(&page), "Admissions");
        assert_eq!(page_title(&json!({})), "Unknown");
    }
}
