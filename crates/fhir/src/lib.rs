//! FHIR wire support for generated patient records.
//!
//! This crate provides **wire models** and **format helpers** for the resources a generated
//! patient record is projected into:
//! - Patient, Observation, Condition, Encounter, Procedure
//! - Medication and MedicationStatement
//! - AllergyIntolerance
//! - a collection [`Bundle`] holding one patient's resources in upload order
//!
//! This crate focuses on:
//! - FHIR R4 element naming (JSON, camelCase, `resourceType` tagging)
//! - strict parsing that reports the path of the failing element
//!
//! It knows nothing about how records are generated; projection from the generator's domain
//! types lives in `synth-core`.

pub mod allergy;
pub mod bundle;
pub mod condition;
pub mod datatypes;
pub mod encounter;
pub mod medication;
pub mod observation;
pub mod patient;
pub mod procedure;

pub use allergy::{AllergyCategory, AllergyCriticality, AllergyIntolerance};
pub use bundle::{Bundle, Resource};
pub use condition::{ClinicalStatus, Condition};
pub use datatypes::{
    Address, Annotation, CodeableConcept, Coding, ContactPoint, FhirPeriod, HumanName,
    Identifier, NameUse, Quantity, Ratio, Reference,
};
pub use encounter::{Encounter, EncounterClass, EncounterStatus, Hospitalization};
pub use medication::{
    Dosage, DoseAndRate, Medication, MedicationStatement, MedicationStatementStatus,
};
pub use observation::{Observation, ObservationStatus};
pub use patient::{AdministrativeGender, Patient, PatientContact};
pub use procedure::{Procedure, ProcedureStatus};

/// Errors returned by the `fhir` boundary crate.
#[derive(Debug, thiserror::Error)]
pub enum FhirError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("translation error: {0}")]
    Translation(String),

    #[error("invalid identifier: {0}")]
    InvalidId(#[from] synth_uuid::UuidError),
}

/// Type alias for Results that can fail with a [`FhirError`].
pub type FhirResult<T> = Result<T, FhirError>;
