//! FHIR Observation resource.

use crate::datatypes::{CodeableConcept, FhirPeriod, Quantity, Reference};
use serde::{Deserialize, Serialize};
use synth_uuid::ResourceId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObservationStatus {
    Preliminary,
    Final,
    Amended,
}

/// The Observation resource.
///
/// Exactly one of the `value*` elements is populated by the generator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct Observation {
    pub id: ResourceId,
    pub status: ObservationStatus,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub category: Vec<CodeableConcept>,
    pub code: CodeableConcept,
    pub subject: Reference,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encounter: Option<Reference>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effective_period: Option<FhirPeriod>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_quantity: Option<Quantity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_codeable_concept: Option<CodeableConcept>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_string: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datatypes::{Coding, SNOMED_CT};
    use synth_uuid::RunNamespace;

    #[test]
    fn renders_quantity_value() {
        let ns = RunNamespace::new("obs").expect("ns");
        let observation = Observation {
            id: ns.derive("1/Observation/0"),
            status: ObservationStatus::Final,
            category: vec![],
            code: CodeableConcept::coded(Coding::new(SNOMED_CT, "33747003", "Glucose")),
            subject: Reference::to("Patient", &ns.derive("1/Patient")),
            encounter: None,
            effective_period: None,
            value_quantity: Some(Quantity::plain(230.0, "mg/dL")),
            value_codeable_concept: None,
            value_string: None,
        };
        let json = serde_json::to_string(&observation).expect("serialize");
        assert!(json.contains("\"valueQuantity\":{\"value\":230.0,\"unit\":\"mg/dL\"}"));
        assert!(json.contains("\"status\":\"final\""));
        assert!(!json.contains("valueString"));
    }
}
