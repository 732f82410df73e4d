mod common;

use chrono::Duration;
use common::{config, generator_with, reference_time, standard_generator};
use fhir::Resource;
use std::collections::BTreeSet;
use synth_core::knowledge::conditions::{
    condition, standard_conditions, DIABETES, HYPERTENSION, POST_OPERATIVE_INFECTION,
};
use synth_core::knowledge::medications::standard_medications;
use synth_core::knowledge::{ConditionId, DeathClass};
use synth_core::{
    assemble_bundle, BloodPressureClass, ErrorKind, GenerationOverrides, Knowledge, SynthError,
};

#[test]
fn test_hyperglycaemic_hypertensive_patient_without_slots_has_both_gated_conditions() {
    let generator = standard_generator();
    let overrides = GenerationOverrides {
        slot_count: Some(0),
        glucose: Some(230),
        blood_pressure: Some(BloodPressureClass::Hypertension),
    };

    for seed in 0..10 {
        let record = generator
            .generate_with(seed, &overrides)
            .expect("generation succeeds");
        let ids: BTreeSet<ConditionId> = record.conditions.iter().map(|c| c.condition).collect();
        assert_eq!(ids, BTreeSet::from([HYPERTENSION, DIABETES]), "seed {seed}");
        assert!(!record.patient.is_deceased());
        assert!(record.index_encounter(DIABETES).is_some());
        assert!(record.index_encounter(HYPERTENSION).is_some());
    }
}

#[test]
fn test_sudden_death_condition_kills_within_a_day_of_onset() {
    let knowledge = Knowledge::new(
        vec![condition(1, "999.9", "Sudden Collapse").mortality(100, DeathClass::Day)],
        vec![],
    )
    .expect("valid catalog");
    let generator = generator_with(knowledge);
    let overrides = GenerationOverrides {
        slot_count: Some(1),
        glucose: Some(100),
        blood_pressure: Some(BloodPressureClass::Normal),
    };

    let mut deaths = 0;
    for seed in 0..20 {
        let record = generator
            .generate_with(seed, &overrides)
            .expect("generation succeeds");
        assert_eq!(record.conditions.len(), 1, "seed {seed}");
        let onset = record.conditions[0].onset;

        let Some(death) = record.death() else {
            continue;
        };
        deaths += 1;
        assert_eq!(death.cause, ConditionId(1));
        assert!(death.at >= onset && death.at <= onset + Duration::days(1));
        assert!(!record.patient.active);
        for encounter in &record.encounters {
            assert!(encounter.period.end() <= death.at, "seed {seed}");
        }
    }
    assert!(deaths > 0, "no patient died of a certainly fatal condition");
}

#[test]
fn test_catalog_without_procedure_chances_yields_no_procedures() {
    let conditions = standard_conditions()
        .into_iter()
        .map(|mut entry| {
            entry.procedure_chance = 0;
            entry
        })
        .collect();
    let knowledge =
        Knowledge::new(conditions, standard_medications()).expect("valid catalog");
    let generator = generator_with(knowledge);

    for seed in 0..30 {
        let record = generator.generate(seed).expect("generation succeeds");
        assert!(record.procedures.is_empty(), "seed {seed}");
        assert!(!record.has_condition(POST_OPERATIVE_INFECTION), "seed {seed}");
    }
}

#[test]
fn test_inconsistent_catalogs_are_rejected() {
    let duplicate = Knowledge::new(
        vec![condition(3, "1.0", "First"), condition(3, "2.0", "Second")],
        vec![],
    );
    let missing_medication = Knowledge::new(vec![condition(3, "1.0", "Treated").medication(99)], vec![]);
    let mut no_death_class = condition(3, "1.0", "Fatal");
    no_death_class.mortality_chance = 10;
    let no_death_class = Knowledge::new(vec![no_death_class], vec![]);
    let no_recovery = Knowledge::new(vec![condition(3, "1.0", "Acute").resolves_or_kills()], vec![]);

    for result in [duplicate, missing_medication, no_death_class, no_recovery] {
        let err = result.expect_err("catalog should be rejected");
        assert!(matches!(err, SynthError::InvalidCatalog(_)), "{err:?}");
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }
}

#[test]
fn test_forced_condition_missing_from_catalog_fails_generation() {
    let knowledge = Knowledge::new(vec![condition(3, "290.0", "Dementia")], vec![])
        .expect("valid catalog");
    let overrides = GenerationOverrides {
        slot_count: Some(0),
        glucose: Some(250),
        blood_pressure: Some(BloodPressureClass::Normal),
    };

    let err = generator_with(knowledge)
        .generate_with(1, &overrides)
        .expect_err("diabetes cannot be forced");
    assert!(matches!(err, SynthError::InvalidCatalog(_)));
}

fn tier(resource: &Resource) -> u8 {
    match resource.resource_type() {
        "Patient" => 0,
        "Medication" => 1,
        "Encounter" => 2,
        _ => 3,
    }
}

#[test]
fn test_bundles_list_patient_first_and_respect_upload_tiers() {
    let generator = standard_generator();
    let config = config();

    for seed in 0..20 {
        let record = generator.generate(seed).expect("generation succeeds");
        let bundle =
            assemble_bundle(&record, generator.knowledge(), &config).expect("assemble bundle");
        let entries = bundle.entries();

        assert!(matches!(entries.first(), Some(Resource::Patient(_))));
        assert_eq!(bundle.count_of("Patient"), 1);
        assert!(
            entries.windows(2).all(|pair| tier(&pair[0]) <= tier(&pair[1])),
            "seed {seed} out of order"
        );
        assert_eq!(bundle.count_of("Condition"), record.conditions.len());
        assert_eq!(bundle.count_of("Encounter"), record.encounters.len());
        assert_eq!(bundle.count_of("Procedure"), record.procedures.len());
        assert_eq!(
            bundle.count_of("MedicationStatement"),
            record.medication_courses.len()
        );
        assert_eq!(bundle.timestamp(), reference_time());
    }
}
