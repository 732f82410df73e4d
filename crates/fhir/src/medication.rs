//! FHIR Medication and MedicationStatement resources.
//!
//! A Medication describes the product; a MedicationStatement links it to the patient for the
//! period the course was active, with the dosage rate. As-needed medications carry their rate as
//! a maximum dose per period rather than a scheduled rate.

use crate::datatypes::{CodeableConcept, FhirPeriod, Ratio, Reference};
use serde::{Deserialize, Serialize};
use synth_uuid::ResourceId;

/// The Medication resource.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Medication {
    pub id: ResourceId,
    pub code: CodeableConcept,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MedicationStatementStatus {
    Active,
    Completed,
    Stopped,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct DoseAndRate {
    pub rate_ratio: Ratio,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct Dosage {
    pub text: String,
    pub as_needed_boolean: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dose_and_rate: Vec<DoseAndRate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_dose_per_period: Option<Ratio>,
}

/// The MedicationStatement resource.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct MedicationStatement {
    pub id: ResourceId,
    pub status: MedicationStatementStatus,
    pub medication_reference: Reference,
    pub subject: Reference,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<Reference>,
    pub effective_period: FhirPeriod,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reason_reference: Vec<Reference>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dosage: Vec<Dosage>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datatypes::Quantity;

    #[test]
    fn as_needed_dosage_uses_max_dose() {
        let dosage = Dosage {
            text: "3900 mg / day".into(),
            as_needed_boolean: true,
            dose_and_rate: vec![],
            max_dose_per_period: Some(Ratio {
                numerator: Quantity::plain(3900.0, "mg"),
                denominator: Quantity::plain(1.0, "d"),
            }),
        };
        let json = serde_json::to_string(&dosage).expect("serialize");
        assert!(json.contains("\"asNeededBoolean\":true"));
        assert!(json.contains("maxDosePerPeriod"));
        assert!(!json.contains("doseAndRate"));
    }
}
