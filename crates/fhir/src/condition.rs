//! FHIR Condition resource.

use crate::datatypes::{CodeableConcept, Coding, Reference};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use synth_uuid::ResourceId;

const CLINICAL_STATUS_SYSTEM: &str =
    "http://terminology.hl7.org/CodeSystem/condition-clinical";
const VERIFICATION_STATUS_SYSTEM: &str =
    "http://terminology.hl7.org/CodeSystem/condition-ver-status";

/// Clinical status of a condition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClinicalStatus {
    Active,
    Resolved,
}

impl ClinicalStatus {
    fn code(self) -> &'static str {
        match self {
            ClinicalStatus::Active => "active",
            ClinicalStatus::Resolved => "resolved",
        }
    }

    /// The status as a coded concept.
    pub fn concept(self) -> CodeableConcept {
        let code = self.code();
        CodeableConcept::coded(Coding::new(CLINICAL_STATUS_SYSTEM, code, code))
    }

    /// Reads the status back from a coded concept.
    pub fn from_concept(concept: &CodeableConcept) -> Option<Self> {
        match concept.first_code()? {
            "active" => Some(ClinicalStatus::Active),
            "resolved" => Some(ClinicalStatus::Resolved),
            _ => None,
        }
    }
}

/// The `confirmed` verification status.
pub fn confirmed() -> CodeableConcept {
    CodeableConcept::coded(Coding::new(
        VERIFICATION_STATUS_SYSTEM,
        "confirmed",
        "confirmed",
    ))
}

/// The Condition resource.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct Condition {
    pub id: ResourceId,
    pub clinical_status: CodeableConcept,
    pub verification_status: CodeableConcept,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub category: Vec<CodeableConcept>,
    pub code: CodeableConcept,
    pub subject: Reference,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encounter: Option<Reference>,
    pub onset_date_time: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub abatement_date_time: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clinical_status_round_trips_through_concept() {
        for status in [ClinicalStatus::Active, ClinicalStatus::Resolved] {
            assert_eq!(ClinicalStatus::from_concept(&status.concept()), Some(status));
        }
        assert_eq!(
            ClinicalStatus::from_concept(&CodeableConcept::text("remission")),
            None
        );
    }
}
