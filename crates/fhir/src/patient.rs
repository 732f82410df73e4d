//! FHIR Patient resource.
//!
//! The generator emits one Patient per bundle. Death is carried as `deceasedDateTime` when the
//! patient died and as `deceasedBoolean: false` otherwise, so exactly one of the two is present.

use crate::datatypes::{Address, CodeableConcept, ContactPoint, HumanName, Identifier, Reference};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use synth_uuid::ResourceId;

/// Administrative gender.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdministrativeGender {
    Male,
    Female,
}

/// A contact party for the patient (the generator emits a spouse).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PatientContact {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub relationship: Vec<CodeableConcept>,
    pub name: HumanName,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub telecom: Vec<ContactPoint>,
}

/// The Patient resource.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct Patient {
    pub id: ResourceId,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub identifier: Vec<Identifier>,
    pub active: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub name: Vec<HumanName>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub telecom: Vec<ContactPoint>,
    pub gender: AdministrativeGender,
    pub birth_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deceased_boolean: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deceased_date_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub address: Vec<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marital_status: Option<CodeableConcept>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub contact: Vec<PatientContact>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub managing_organization: Option<Reference>,
}

impl Patient {
    /// Returns true if the resource records a death.
    pub fn is_deceased(&self) -> bool {
        self.deceased_date_time.is_some() || self.deceased_boolean == Some(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datatypes::NameUse;

    fn sample() -> Patient {
        Patient {
            id: ResourceId::parse("90a8d1ea318041d9adb070a834d4e0f6").expect("valid id"),
            identifier: vec![],
            active: true,
            name: vec![HumanName {
                use_type: Some(NameUse::Usual),
                family: Some("Williams".into()),
                given: vec!["Sarah".into()],
                suffix: vec![],
            }],
            telecom: vec![],
            gender: AdministrativeGender::Female,
            birth_date: NaiveDate::from_ymd_opt(1948, 3, 20).expect("valid date"),
            deceased_boolean: Some(false),
            deceased_date_time: None,
            address: vec![],
            marital_status: None,
            contact: vec![],
            managing_organization: None,
        }
    }

    #[test]
    fn serializes_camel_case_fields() {
        let json = serde_json::to_string(&sample()).expect("serialize");
        assert!(json.contains("\"birthDate\":\"1948-03-20\""));
        assert!(json.contains("\"deceasedBoolean\":false"));
        assert!(json.contains("\"use\":\"usual\""));
        assert!(!json.contains("deceasedDateTime"));
        assert!(!json.contains("maritalStatus"));
    }

    #[test]
    fn deceased_when_date_present() {
        let mut patient = sample();
        assert!(!patient.is_deceased());
        patient.deceased_boolean = None;
        patient.deceased_date_time = Some("2025-02-01T00:00:00Z".parse().expect("timestamp"));
        assert!(patient.is_deceased());
    }
}
