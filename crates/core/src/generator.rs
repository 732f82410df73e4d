//! Patient generation pipeline.
//!
//! One patient is generated by a strictly sequential pipeline over a single seeded random
//! source: demographics, physiology, condition timeline (with encounter scheduling), derived
//! encounters, mortality filter, observation attribution and validation. The same seed and
//! reference time always produce the same record.

use crate::config::CoreConfig;
use crate::constants::{DEFAULT_NAMESPACE, DEFAULT_OUTPUT_DIR, DEFAULT_PATIENT_BUDGET_SECS};
use crate::context::PatientGenerationContext;
use crate::demographics::draw_patient;
use crate::knowledge::Knowledge;
use crate::physiology::{
    attribute_observations, baseline_observations, draw_allergy, draw_physiology,
    BloodPressureClass,
};
use crate::record::PatientRecord;
use crate::{mortality, scheduler, timeline, validation, SynthResult};
use chrono::Utc;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::path::PathBuf;
use std::sync::Arc;

/// Fixed values that replace random draws, for scenario runs and the `timeline` command.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GenerationOverrides {
    /// Number of random condition slots.
    pub slot_count: Option<usize>,
    /// Blood glucose in mg/dL.
    pub glucose: Option<u32>,
    /// Blood-pressure class; readings are redrawn within the class's ranges.
    pub blood_pressure: Option<BloodPressureClass>,
}

/// Generates patient records against shared knowledge and configuration.
#[derive(Clone, Debug)]
pub struct PatientGenerator {
    config: Arc<CoreConfig>,
    knowledge: Arc<Knowledge>,
}

impl PatientGenerator {
    pub fn new(config: Arc<CoreConfig>, knowledge: Arc<Knowledge>) -> Self {
        Self { config, knowledge }
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    pub fn knowledge(&self) -> &Knowledge {
        &self.knowledge
    }

    /// Generate the patient for `seed`.
    ///
    /// # Errors
    ///
    /// Returns a `Generation` kind error if the timeline cannot be completed or the finished
    /// record breaks an invariant.
    pub fn generate(&self, seed: u64) -> SynthResult<PatientRecord> {
        self.generate_with(seed, &GenerationOverrides::default())
    }

    /// Generate the patient for `seed`, replacing random draws with `overrides`.
    ///
    /// # Errors
    ///
    /// See [`PatientGenerator::generate`].
    pub fn generate_with(
        &self,
        seed: u64,
        overrides: &GenerationOverrides,
    ) -> SynthResult<PatientRecord> {
        let reference_time = self.config.reference_time();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);

        let patient = draw_patient(&mut rng, reference_time)?;
        let mut physiology = draw_physiology(&mut rng, patient.sex);
        if let Some(glucose) = overrides.glucose {
            physiology.glucose_mg_dl = glucose;
        }
        if let Some(class) = overrides.blood_pressure {
            physiology.set_blood_pressure(&mut rng, class);
        }
        let observations = baseline_observations(&physiology, &patient, reference_time);
        let allergy = draw_allergy(&mut rng);
        let slots = match overrides.slot_count {
            Some(slots) => slots,
            None => timeline::draw_slot_count(&mut rng),
        };
        tracing::debug!("Generating seed {} with {} random slots", seed, slots);

        let record = PatientRecord::new(
            seed,
            reference_time,
            patient,
            physiology,
            observations,
            allergy,
        );
        let mut ctx = PatientGenerationContext::new(&self.knowledge, rng, record);
        timeline::build_timeline(&mut ctx, slots)?;
        scheduler::schedule_derived(&mut ctx)?;
        let (mut record, mut rng) = ctx.finish();

        mortality::apply(&mut record);
        attribute_observations(&mut record, &self.knowledge, &mut rng)?;
        validation::validate_record(&record, &self.knowledge)?;

        tracing::debug!(
            "Seed {}: {} conditions, {} encounters, {} procedures, deceased={}",
            seed,
            record.conditions.len(),
            record.encounters.len(),
            record.procedures.len(),
            record.patient.is_deceased()
        );
        Ok(record)
    }
}

/// Generate one patient with the built-in catalogs and the current time as reference.
///
/// # Errors
///
/// Returns an error if the built-in catalogs are invalid or generation fails.
pub fn generate_patient(seed: u64) -> SynthResult<PatientRecord> {
    let config = CoreConfig::new(
        PathBuf::from(DEFAULT_OUTPUT_DIR),
        DEFAULT_NAMESPACE.to_string(),
        Utc::now(),
        std::time::Duration::from_secs(DEFAULT_PATIENT_BUDGET_SECS),
    )?;
    let generator = PatientGenerator::new(Arc::new(config), Arc::new(Knowledge::standard()?));
    generator.generate(seed)
}

/// Per-patient seed for patient `index` of a run seeded with `run_seed` (splitmix64).
pub fn patient_seed(run_seed: u64, index: u64) -> u64 {
    let mut z = run_seed.wrapping_add(index.wrapping_add(1).wrapping_mul(0x9E37_79B9_7F4A_7C15));
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn generator() -> PatientGenerator {
        let reference = Utc
            .with_ymd_and_hms(2025, 3, 14, 12, 0, 0)
            .single()
            .expect("valid timestamp");
        let config = CoreConfig::new(
            PathBuf::from("unused"),
            "synth.test".into(),
            reference,
            std::time::Duration::from_secs(5),
        )
        .expect("valid config");
        PatientGenerator::new(
            Arc::new(config),
            Arc::new(Knowledge::standard().expect("standard knowledge")),
        )
    }

    #[test]
    fn test_same_seed_same_record() {
        let generator = generator();
        let first = generator.generate(42).expect("generate");
        let second = generator.generate(42).expect("generate");
        assert_eq!(first, second);
    }

    #[test]
    fn test_patient_seeds_are_distinct() {
        let seeds: std::collections::BTreeSet<u64> = (0..1_000).map(|i| patient_seed(7, i)).collect();
        assert_eq!(seeds.len(), 1_000);
        assert_ne!(patient_seed(7, 0), patient_seed(8, 0));
    }

    #[test]
    fn test_every_patient_has_a_physical() {
        let generator = generator();
        for seed in 0..50 {
            let record = generator.generate(seed).expect("generate");
            assert!(!record.yearly_physicals().is_empty(), "seed {seed}");
        }
    }

    #[test]
    fn test_zero_slots_without_forcing_yields_no_conditions() {
        let overrides = GenerationOverrides {
            slot_count: Some(0),
            glucose: Some(90),
            blood_pressure: Some(BloodPressureClass::Normal),
        };
        let record = generator().generate_with(3, &overrides).expect("generate");
        assert!(record.conditions.is_empty());
        assert!(record.procedures.is_empty());
        assert!(!record.patient.is_deceased());
    }
}
