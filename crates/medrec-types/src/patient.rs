use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::entry::{require, Entry};
use crate::error::TypeError;
use crate::ids::PatientId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Male => write!(f, "male"),
            Self::Female => write!(f, "female"),
            Self::Other => write!(f, "other"),
        }
    }
}

impl FromStr for Gender {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "male" => Ok(Self::Male),
            "female" => Ok(Self::Female),
            "other" => Ok(Self::Other),
            _ => Err(TypeError::InvalidGender(s.to_string())),
        }
    }
}

/// A patient with full record, including social security number and entries.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub id: PatientId,
    pub name: String,
    pub ssn: String,
    pub date_of_birth: NaiveDate,
    pub gender: Gender,
    pub occupation: String,
    #[serde(default)]
    pub entries: Vec<Entry>,
}

impl Patient {
    pub fn non_sensitive(&self) -> NonSensitivePatient {
        NonSensitivePatient {
            id: self.id,
            name: self.name.clone(),
            date_of_birth: self.date_of_birth,
            gender: self.gender,
            occupation: self.occupation.clone(),
        }
    }
}

/// Listing projection of a patient without `ssn` or entries.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NonSensitivePatient {
    pub id: PatientId,
    pub name: String,
    pub date_of_birth: NaiveDate,
    pub gender: Gender,
    pub occupation: String,
}

/// Patient data as submitted by a client.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPatient {
    pub name: String,
    pub ssn: String,
    pub date_of_birth: NaiveDate,
    pub gender: Gender,
    pub occupation: String,
}

impl NewPatient {
    pub fn validate(&self) -> Result<(), TypeError> {
        require(&self.name, "name")?;
        require(&self.ssn, "ssn")?;
        require(&self.occupation, "occupation")
    }

    pub fn into_patient(self) -> Patient {
        Patient {
            id: PatientId::new(),
            name: self.name,
            ssn: self.ssn,
            date_of_birth: self.date_of_birth,
            gender: self.gender,
            occupation: self.occupation,
            entries: Vec::new(),
        }
    }
}

/// A diagnosis code referenced by entries.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnosis {
    pub code: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latin: Option<String>,
}
