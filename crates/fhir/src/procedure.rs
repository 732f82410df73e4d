//! FHIR Procedure resource.

use crate::datatypes::{Annotation, CodeableConcept, FhirPeriod, Reference};
use serde::{Deserialize, Serialize};
use synth_uuid::ResourceId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProcedureStatus {
    InProgress,
    Completed,
}

/// The Procedure resource.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct Procedure {
    pub id: ResourceId,
    pub status: ProcedureStatus,
    pub code: CodeableConcept,
    pub subject: Reference,
    pub encounter: Reference,
    pub performed_period: FhirPeriod,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reason_reference: Vec<Reference>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<CodeableConcept>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub note: Vec<Annotation>,
}
