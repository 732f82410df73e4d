//! FHIR Encounter resource.

use crate::datatypes::{CodeableConcept, Coding, FhirPeriod, Reference};
use serde::{Deserialize, Serialize};
use synth_uuid::ResourceId;

const ACT_CODE_SYSTEM: &str = "http://terminology.hl7.org/CodeSystem/v3-ActCode";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EncounterStatus {
    Planned,
    InProgress,
    Finished,
}

/// Encounter class (setting of care).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EncounterClass {
    Emergency,
    Inpatient,
    Ambulatory,
}

impl EncounterClass {
    pub fn coding(self) -> Coding {
        match self {
            EncounterClass::Emergency => Coding::new(ACT_CODE_SYSTEM, "EMER", "emergency"),
            EncounterClass::Inpatient => {
                Coding::new(ACT_CODE_SYSTEM, "IMP", "inpatient encounter")
            }
            EncounterClass::Ambulatory => Coding::new(ACT_CODE_SYSTEM, "AMB", "ambulatory"),
        }
    }
}

/// Admission details.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct Hospitalization {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub re_admission: Option<CodeableConcept>,
}

/// The Encounter resource.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct Encounter {
    pub id: ResourceId,
    pub status: EncounterStatus,
    pub class: Coding,
    #[serde(rename = "type", default, skip_serializing_if = "Vec::is_empty")]
    pub encounter_type: Vec<CodeableConcept>,
    pub subject: Reference,
    pub period: FhirPeriod,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reason_code: Vec<CodeableConcept>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reason_reference: Vec<Reference>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hospitalization: Option<Hospitalization>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub part_of: Option<Reference>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_provider: Option<Reference>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_uses_kebab_case() {
        let json = serde_json::to_string(&EncounterStatus::InProgress).expect("serialize");
        assert_eq!(json, "\"in-progress\"");
        let back: EncounterStatus = serde_json::from_str("\"finished\"").expect("deserialize");
        assert_eq!(back, EncounterStatus::Finished);
    }

    #[test]
    fn class_codes() {
        assert_eq!(EncounterClass::Emergency.coding().code, "EMER");
        assert_eq!(EncounterClass::Ambulatory.coding().code, "AMB");
    }
}
