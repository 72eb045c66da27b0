use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::ids::EntryId;

/// Risk rating recorded by a health check, serialized as its integer code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum HealthCheckRating {
    Healthy = 0,
    LowRisk = 1,
    HighRisk = 2,
    CriticalRisk = 3,
}

impl TryFrom<u8> for HealthCheckRating {
    type Error = TypeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Healthy),
            1 => Ok(Self::LowRisk),
            2 => Ok(Self::HighRisk),
            3 => Ok(Self::CriticalRisk),
            other => Err(TypeError::InvalidRating(other)),
        }
    }
}

impl From<HealthCheckRating> for u8 {
    fn from(rating: HealthCheckRating) -> Self {
        rating as u8
    }
}

/// Discharge details of a hospital stay.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Discharge {
    pub date: NaiveDate,
    pub criteria: String,
}

/// Sick leave granted during an occupational healthcare visit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SickLeave {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Discriminant of an [`Entry`]. Never changes across versions of one entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntryKind {
    HealthCheck,
    Hospital,
    OccupationalHealthcare,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HealthCheck => write!(f, "HealthCheck"),
            Self::Hospital => write!(f, "Hospital"),
            Self::OccupationalHealthcare => write!(f, "OccupationalHealthcare"),
        }
    }
}

/// Type-specific fields of an entry, tagged on the wire by `type`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum EntryDetails {
    #[serde(rename_all = "camelCase")]
    HealthCheck {
        health_check_rating: HealthCheckRating,
    },
    Hospital {
        discharge: Discharge,
    },
    #[serde(rename_all = "camelCase")]
    OccupationalHealthcare {
        employer_name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        sick_leave: Option<SickLeave>,
    },
}

impl EntryDetails {
    pub fn kind(&self) -> EntryKind {
        match self {
            Self::HealthCheck { .. } => EntryKind::HealthCheck,
            Self::Hospital { .. } => EntryKind::Hospital,
            Self::OccupationalHealthcare { .. } => EntryKind::OccupationalHealthcare,
        }
    }

    fn validate(&self) -> Result<(), TypeError> {
        match self {
            Self::HealthCheck { .. } => Ok(()),
            Self::Hospital { discharge } => {
                require(&discharge.criteria, "discharge.criteria")
            }
            Self::OccupationalHealthcare { employer_name, .. } => {
                require(employer_name, "employerName")
            }
        }
    }
}

/// A medical entry belonging to a patient.
///
/// The live record is what day-to-day reads and writes touch; its history
/// is kept as [`EntryVersion`](crate::EntryVersion) snapshots.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    pub id: EntryId,
    pub description: String,
    pub date: NaiveDate,
    pub specialist: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagnosis_codes: Option<Vec<String>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(flatten)]
    pub details: EntryDetails,
}

impl Entry {
    pub fn kind(&self) -> EntryKind {
        self.details.kind()
    }

    /// Replace the editable content, keeping identity and creation time.
    pub fn with_content(&self, content: NewEntry, now: DateTime<Utc>) -> Self {
        Self {
            id: self.id,
            description: content.description,
            date: content.date,
            specialist: content.specialist,
            diagnosis_codes: content.diagnosis_codes,
            created_at: self.created_at,
            updated_at: now,
            details: content.details,
        }
    }

    /// Take the content of a historical snapshot as the new live state.
    pub fn restored_from(&self, snapshot: &Entry, now: DateTime<Utc>) -> Self {
        Self {
            id: self.id,
            created_at: self.created_at,
            updated_at: now,
            ..snapshot.clone()
        }
    }
}

/// Entry content as submitted by a client, before an id is assigned.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEntry {
    pub description: String,
    pub date: NaiveDate,
    pub specialist: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagnosis_codes: Option<Vec<String>>,
    #[serde(flatten)]
    pub details: EntryDetails,
}

impl NewEntry {
    pub fn kind(&self) -> EntryKind {
        self.details.kind()
    }

    /// Check that required free-text fields are present.
    pub fn validate(&self) -> Result<(), TypeError> {
        require(&self.description, "description")?;
        require(&self.specialist, "specialist")?;
        self.details.validate()
    }

    pub fn into_entry(self, now: DateTime<Utc>) -> Entry {
        Entry {
            id: EntryId::new(),
            description: self.description,
            date: self.date,
            specialist: self.specialist,
            diagnosis_codes: self.diagnosis_codes,
            created_at: now,
            updated_at: now,
            details: self.details,
        }
    }
}

pub(crate) fn require(value: &str, field: &'static str) -> Result<(), TypeError> {
    if value.trim().is_empty() {
        Err(TypeError::MissingField(field))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn health_check() -> NewEntry {
        NewEntry {
            description: "Yearly control visit".into(),
            date: date("2019-10-20"),
            specialist: "MD House".into(),
            diagnosis_codes: None,
            details: EntryDetails::HealthCheck {
                health_check_rating: HealthCheckRating::Healthy,
            },
        }
    }

    #[test]
    fn health_check_wire_format() {
        let entry = health_check().into_entry(Utc::now());
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["type"], json!("HealthCheck"));
        assert_eq!(value["healthCheckRating"], json!(0));
        assert_eq!(value["date"], json!("2019-10-20"));
        assert!(value.get("diagnosisCodes").is_none());
    }

    #[test]
    fn occupational_entry_parses_from_wire() {
        let value = json!({
            "id": EntryId::new().to_string(),
            "description": "Neck pain",
            "date": "2019-08-05",
            "specialist": "MD House",
            "diagnosisCodes": ["Z57.1", "Z74.3"],
            "createdAt": "2019-08-05T10:00:00Z",
            "updatedAt": "2019-08-05T10:00:00Z",
            "type": "OccupationalHealthcare",
            "employerName": "HyPD",
            "sickLeave": { "startDate": "2019-08-05", "endDate": "2019-08-28" }
        });
        let entry: Entry = serde_json::from_value(value).unwrap();
        assert_eq!(entry.kind(), EntryKind::OccupationalHealthcare);
        match entry.details {
            EntryDetails::OccupationalHealthcare { employer_name, sick_leave } => {
                assert_eq!(employer_name, "HyPD");
                assert_eq!(sick_leave.unwrap().end_date, date("2019-08-28"));
            }
            other => panic!("expected occupational entry, got {other:?}"),
        }
    }

    #[test]
    fn out_of_range_rating_is_rejected() {
        assert_eq!(
            HealthCheckRating::try_from(7),
            Err(TypeError::InvalidRating(7))
        );
        let value = json!({
            "description": "x",
            "date": "2020-01-01",
            "specialist": "y",
            "type": "HealthCheck",
            "healthCheckRating": 9
        });
        assert!(serde_json::from_value::<NewEntry>(value).is_err());
    }

    #[test]
    fn validate_requires_text_fields() {
        let mut entry = health_check();
        entry.specialist = "   ".into();
        assert_eq!(entry.validate(), Err(TypeError::MissingField("specialist")));

        let hospital = NewEntry {
            details: EntryDetails::Hospital {
                discharge: Discharge {
                    date: date("2015-01-16"),
                    criteria: String::new(),
                },
            },
            ..health_check()
        };
        assert_eq!(
            hospital.validate(),
            Err(TypeError::MissingField("discharge.criteria"))
        );
    }

    #[test]
    fn with_content_keeps_identity() {
        let created = Utc::now();
        let entry = health_check().into_entry(created);
        let mut update = health_check();
        update.description = "Follow-up".into();

        let later = created + chrono::Duration::seconds(5);
        let updated = entry.with_content(update, later);
        assert_eq!(updated.id, entry.id);
        assert_eq!(updated.created_at, created);
        assert_eq!(updated.updated_at, later);
        assert_eq!(updated.description, "Follow-up");
    }

    #[test]
    fn restored_from_takes_snapshot_content() {
        let created = Utc::now();
        let live = health_check().into_entry(created);
        let mut snapshot = live.clone();
        snapshot.description = "Older wording".into();
        snapshot.updated_at = created - chrono::Duration::days(1);

        let now = created + chrono::Duration::seconds(1);
        let restored = live.restored_from(&snapshot, now);
        assert_eq!(restored.description, "Older wording");
        assert_eq!(restored.updated_at, now);
        assert_eq!(restored.created_at, created);
    }

    #[test]
    fn kind_display() {
        assert_eq!(EntryKind::Hospital.to_string(), "Hospital");
        assert_eq!(health_check().kind(), EntryKind::HealthCheck);
    }
}
