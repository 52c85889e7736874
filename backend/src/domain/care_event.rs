//! Scheduled care activities and the form that creates them.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::validation::non_blank;
use super::{FieldError, FieldErrorKind, FieldErrors, PatientId};

/// Accepted naive timestamp layouts, tried in order.
const NAIVE_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"];

/// Identifier of a stored care event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct CareEventId(i32);

impl CareEventId {
    pub const fn new(id: i32) -> Self {
        Self(id)
    }

    pub const fn get(self) -> i32 {
        self.0
    }
}

/// Raw `add_care_event` form submission.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct CareEventForm {
    pub title: Option<String>,
    pub description: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
}

/// Validated care event awaiting insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCareEvent {
    pub patient_id: PatientId,
    pub title: String,
    pub description: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

/// Validated fields of a care event form, before a patient is attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CareEventDraft {
    pub title: String,
    pub description: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

impl CareEventDraft {
    /// Attach the owning patient.
    pub fn for_patient(self, patient_id: PatientId) -> NewCareEvent {
        NewCareEvent {
            patient_id,
            title: self.title,
            description: self.description,
            start_time: self.start_time,
            end_time: self.end_time,
        }
    }
}

impl CareEventForm {
    /// Check every field and return the draft or all field errors.
    ///
    /// # Examples
    /// ```
    /// use carelog::domain::CareEventForm;
    ///
    /// let form = CareEventForm {
    ///     title: Some("Physio".into()),
    ///     description: None,
    ///     start_time: Some("2024-05-01 09:00:00".into()),
    ///     end_time: Some("2024-05-01T10:30".into()),
    /// };
    /// let draft = form.validate().expect("valid form");
    /// assert_eq!(draft.description, "");
    /// ```
    pub fn validate(&self) -> Result<CareEventDraft, FieldErrors> {
        let mut errors = FieldErrors::new();

        let title = non_blank(self.title.as_deref());
        if title.is_none() {
            errors.push(FieldError::required("title"));
        }
        let start_time = timestamp_field(&mut errors, "start_time", self.start_time.as_deref());
        let end_time = timestamp_field(&mut errors, "end_time", self.end_time.as_deref());

        match (title, start_time, end_time) {
            (Some(title), Some(start_time), Some(end_time)) => {
                Ok(CareEventDraft {
                    title: title.to_owned(),
                    description: self
                        .description
                        .as_deref()
                        .map(str::trim)
                        .unwrap_or_default()
                        .to_owned(),
                    start_time,
                    end_time,
                })
            }
            _ => Err(errors),
        }
    }
}

fn timestamp_field(
    errors: &mut FieldErrors,
    field: &'static str,
    raw: Option<&str>,
) -> Option<DateTime<Utc>> {
    let Some(value) = non_blank(raw) else {
        errors.push(FieldError::required(field));
        return None;
    };
    let parsed = parse_timestamp(value);
    if parsed.is_none() {
        errors.push(FieldError::new(
            field,
            FieldErrorKind::Invalid,
            format!("{field} must look like YYYY-MM-DD HH:MM:SS"),
        ));
    }
    parsed
}

/// Parse a submitted timestamp; naive values are read as UTC.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .map(|naive| naive.and_utc())
}

/// Stored care event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CareEvent {
    #[schema(value_type = i32)]
    pub id: CareEventId,
    #[schema(value_type = i32)]
    pub patient_id: PatientId,
    pub title: String,
    pub description: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

impl CareEvent {
    /// Combine a pending record with its storage id.
    pub fn from_new(id: CareEventId, event: NewCareEvent) -> Self {
        Self {
            id,
            patient_id: event.patient_id,
            title: event.title,
            description: event.description,
            start_time: event.start_time,
            end_time: event.end_time,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;

    fn form(title: Option<&str>, start: Option<&str>, end: Option<&str>) -> CareEventForm {
        CareEventForm {
            title: title.map(str::to_owned),
            description: Some("  bring towel ".to_owned()),
            start_time: start.map(str::to_owned),
            end_time: end.map(str::to_owned),
        }
    }

    #[rstest]
    #[case("2024-05-01 09:15:00")]
    #[case("2024-05-01T09:15:00")]
    #[case("2024-05-01T09:15")]
    #[case("2024-05-01T09:15:00Z")]
    #[case("2024-05-01T11:15:00+02:00")]
    fn accepted_timestamp_layouts(#[case] raw: &str) {
        let expected = Utc.with_ymd_and_hms(2024, 5, 1, 9, 15, 0).single();
        assert_eq!(parse_timestamp(raw), expected);
    }

    #[rstest]
    #[case("01/05/2024 09:15")]
    #[case("2024-13-01 09:15:00")]
    #[case("tomorrow")]
    fn rejected_timestamp_layouts(#[case] raw: &str) {
        assert!(parse_timestamp(raw).is_none());
    }

    #[rstest]
    fn valid_form_trims_text() {
        let draft = form(Some(" Bath "), Some("2024-05-01 09:00:00"), Some("2024-05-01 09:30:00"))
            .validate()
            .expect("valid form");
        assert_eq!(draft.title, "Bath");
        assert_eq!(draft.description, "bring towel");
    }

    #[rstest]
    fn missing_fields_are_all_reported() {
        let errors = form(None, None, Some("garbage"))
            .validate()
            .expect_err("invalid form");
        assert!(errors.contains("title"));
        assert!(errors.contains("start_time"));
        assert!(errors.contains("end_time"));
        assert_eq!(errors.as_slice().len(), 3);
    }

    #[rstest]
    fn missing_description_becomes_empty() {
        let mut raw = form(Some("Walk"), Some("2024-05-01 09:00:00"), Some("2024-05-01 10:00:00"));
        raw.description = None;
        let draft = raw.validate().expect("valid form");
        assert_eq!(draft.description, "");
        let event = draft.for_patient(PatientId::PRIMARY);
        assert_eq!(event.patient_id, PatientId::PRIMARY);
    }
}
