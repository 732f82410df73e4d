//! # Synth Core
//!
//! Core logic for the synthetic geriatric patient record generator.
//!
//! This crate contains the pure generation pipeline and bundle export:
//! - Static condition and medication knowledge tables
//! - Per-patient demographics, physiology and observations
//! - The condition timeline engine, encounter scheduler and mortality filter
//! - Record validation, FHIR bundle assembly and file export
//!
//! **No process concerns**: environment handling, logging setup and batch orchestration belong
//! in the `synth` CLI and the `synth-run` batch runner.

pub mod assembly;
pub mod calendar;
pub mod config;
pub mod constants;
mod context;
pub mod demographics;
pub mod error;
pub mod generator;
pub mod knowledge;
pub mod mortality;
pub mod physiology;
pub mod record;
mod scheduler;
pub mod store;
mod timeline;
pub mod validation;

pub use assembly::assemble_bundle;
pub use config::CoreConfig;
pub use error::{ErrorKind, SynthError, SynthResult};
pub use generator::{generate_patient, patient_seed, GenerationOverrides, PatientGenerator};
pub use knowledge::Knowledge;
pub use mortality::FilterReport;
pub use physiology::BloodPressureClass;
pub use record::PatientRecord;
pub use store::{BundleStore, StoredBundle};
