//! FHIR AllergyIntolerance resource.

use crate::datatypes::{CodeableConcept, Reference};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use synth_uuid::ResourceId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AllergyCriticality {
    Low,
    High,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AllergyCategory {
    Food,
    Medication,
    Environment,
    Biologic,
}

/// The AllergyIntolerance resource.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct AllergyIntolerance {
    pub id: ResourceId,
    pub clinical_status: CodeableConcept,
    pub verification_status: CodeableConcept,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub category: Vec<AllergyCategory>,
    pub criticality: AllergyCriticality,
    pub code: CodeableConcept,
    pub patient: Reference,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recorded_date: Option<DateTime<Utc>>,
}
