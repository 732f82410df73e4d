//! Record assembly.
//!
//! Projects a finished [`PatientRecord`] into a FHIR [`Bundle`] in upload order: the Patient,
//! the Medications, the Encounters, then every resource that references them. Resource ids are
//! UUIDv5 values derived from the run namespace and the patient's seed, so re-assembling the same
//! record under the same namespace yields the same ids.

use crate::config::CoreConfig;
use crate::constants::{CAUSE_OF_DEATH_CODE, MANAGING_ORGANIZATION};
use crate::demographics::{Patient, Sex};
use crate::knowledge::{ConditionId, Knowledge, MedicationId};
use crate::physiology::{Allergy, AllergySubstance, Observation, ObservationValue};
use crate::record::{
    Encounter, EncounterId, EncounterKind, EncounterStatus, MedicationCourse, PatientRecord,
    Procedure,
};
use crate::SynthResult;
use chrono::{DateTime, Utc};
use fhir::datatypes::{CPT, ICD9_CM, RXNORM, SNOMED_CT};
use fhir::{
    Address, AdministrativeGender, AllergyCategory, AllergyIntolerance, Annotation, Bundle,
    ClinicalStatus, CodeableConcept, Coding, ContactPoint, Dosage, DoseAndRate, EncounterClass,
    FhirPeriod, Hospitalization, HumanName, Identifier, NameUse, ObservationStatus,
    PatientContact, ProcedureStatus, Quantity, Ratio, Reference, Resource,
};
use std::collections::BTreeSet;
use synth_uuid::{ResourceId, RunNamespace};

const MARITAL_STATUS_SYSTEM: &str = "http://terminology.hl7.org/CodeSystem/v3-MaritalStatus";
const OBSERVATION_CATEGORY_SYSTEM: &str =
    "http://terminology.hl7.org/CodeSystem/observation-category";
const CONDITION_CATEGORY_SYSTEM: &str = "http://terminology.hl7.org/CodeSystem/condition-category";
const ALLERGY_CLINICAL_SYSTEM: &str =
    "http://terminology.hl7.org/CodeSystem/allergyintolerance-clinical";
const ALLERGY_VERIFICATION_SYSTEM: &str =
    "http://terminology.hl7.org/CodeSystem/allergyintolerance-verification";
const READMISSION_SYSTEM: &str = "http://terminology.hl7.org/CodeSystem/v2-0092";

/// Derives the ids of one patient's resources.
struct IdSource<'a> {
    namespace: &'a RunNamespace,
    seed: u64,
}

impl IdSource<'_> {
    fn id(&self, resource_type: &str, key: impl std::fmt::Display) -> ResourceId {
        self.namespace
            .derive(&format!("{}/{}/{}", self.seed, resource_type, key))
    }

    fn patient(&self) -> ResourceId {
        self.namespace.derive(&format!("{}/Patient", self.seed))
    }

    fn encounter(&self, id: EncounterId) -> ResourceId {
        self.id("Encounter", id.0)
    }

    fn condition(&self, id: ConditionId) -> ResourceId {
        self.id("Condition", id.0)
    }

    fn medication(&self, id: MedicationId) -> ResourceId {
        self.id("Medication", id.0)
    }
}

/// Assemble the upload-ordered bundle for `record`.
///
/// # Arguments
///
/// * `record` - A finished record, as returned by the generator.
/// * `knowledge` - The catalogs the record was generated from.
/// * `config` - Supplies the run namespace resource ids are derived from.
///
/// # Errors
///
/// Returns an error if a condition or medication id is missing from `knowledge`, or if the
/// bundle fails its shape checks.
pub fn assemble_bundle(
    record: &PatientRecord,
    knowledge: &Knowledge,
    config: &CoreConfig,
) -> SynthResult<Bundle> {
    let ids = IdSource {
        namespace: config.run_namespace(),
        seed: record.seed,
    };
    let subject = Reference::to("Patient", &ids.patient());
    let reference_time = record.reference_time;
    let mut entries = vec![Resource::Patient(patient_resource(&record.patient, &ids))];

    let mut seen_medications = BTreeSet::new();
    for course in &record.medication_courses {
        if seen_medications.insert(course.medication) {
            let medication = knowledge.medication(course.medication)?;
            entries.push(Resource::Medication(fhir::Medication {
                id: ids.medication(medication.id),
                code: CodeableConcept {
                    coding: vec![Coding::new(RXNORM, medication.rxnorm, &medication.display())],
                    text: Some(medication.display()),
                },
            }));
        }
    }

    for encounter in &record.encounters {
        entries.push(Resource::Encounter(encounter_resource(
            encounter, &ids, &subject,
        )));
    }

    for (index, observation) in record.observations.iter().enumerate() {
        entries.push(Resource::Observation(observation_resource(
            observation,
            ids.id("Observation", index),
            &ids,
            &subject,
        )));
    }

    for instance in &record.conditions {
        let entry = knowledge.condition(instance.condition)?;
        let status = if instance.is_resolved() {
            ClinicalStatus::Resolved
        } else {
            ClinicalStatus::Active
        };
        entries.push(Resource::Condition(fhir::Condition {
            id: ids.condition(instance.condition),
            clinical_status: status.concept(),
            verification_status: fhir::condition::confirmed(),
            category: vec![CodeableConcept::coded(Coding::new(
                CONDITION_CATEGORY_SYSTEM,
                "encounter-diagnosis",
                "Encounter Diagnosis",
            ))],
            code: CodeableConcept::coded(Coding::new(ICD9_CM, entry.icd9, entry.display)),
            subject: subject.clone(),
            encounter: record
                .index_encounter(instance.condition)
                .map(|e| Reference::to("Encounter", &ids.encounter(e.id))),
            onset_date_time: instance.onset,
            abatement_date_time: instance.abatement,
        }));
    }

    for (index, procedure) in record.procedures.iter().enumerate() {
        entries.push(Resource::Procedure(procedure_resource(
            procedure,
            ids.id("Procedure", index),
            &ids,
            &subject,
            reference_time,
        )));
    }

    let deceased = record.patient.is_deceased();
    for (index, course) in record.medication_courses.iter().enumerate() {
        entries.push(Resource::MedicationStatement(statement_resource(
            course,
            ids.id("MedicationStatement", index),
            &ids,
            &subject,
            deceased,
        )));
    }

    if let Some(allergy) = &record.allergy {
        entries.push(Resource::AllergyIntolerance(allergy_resource(
            allergy,
            ids.id("AllergyIntolerance", 0),
            &subject,
        )));
    }

    if let Some(death) = record.death() {
        let cause = knowledge.condition(death.cause)?.display;
        entries.push(Resource::Observation(fhir::Observation {
            id: ids.id("Observation", "cause-of-death"),
            status: ObservationStatus::Final,
            category: Vec::new(),
            code: CodeableConcept::coded(Coding::new(
                SNOMED_CT,
                CAUSE_OF_DEATH_CODE,
                &format!("Death (Due to {cause})"),
            )),
            subject: subject.clone(),
            encounter: None,
            effective_period: Some(FhirPeriod::closed(death.at, reference_time)),
            value_quantity: None,
            value_codeable_concept: None,
            value_string: Some(format!("Patient Died from {cause}")),
        }));
    }

    let bundle = Bundle::new(
        ids.namespace.derive(&format!("{}/Bundle", record.seed)),
        reference_time,
        entries,
    )?;
    tracing::debug!(
        "Assembled bundle {} with {} resources",
        bundle.id(),
        bundle.entries().len()
    );
    Ok(bundle)
}

fn patient_resource(patient: &Patient, ids: &IdSource<'_>) -> fhir::Patient {
    let name = &patient.name;
    let record_number = &patient.record_number;
    fhir::Patient {
        id: ids.patient(),
        identifier: vec![Identifier {
            use_type: Some("usual".into()),
            system: record_number.system.clone(),
            value: record_number.value.clone(),
            period: Some(FhirPeriod::open(record_number.issued)),
            assigner: Some(Reference::display(record_number.assigner)),
        }],
        active: patient.active,
        name: vec![HumanName {
            use_type: Some(NameUse::Official),
            family: Some(name.family.clone()),
            given: vec![name.given.clone()],
            suffix: name.suffix.iter().cloned().collect(),
        }],
        telecom: vec![
            ContactPoint {
                system: "phone".into(),
                value: patient.phone.clone(),
                use_type: Some("home".into()),
            },
            ContactPoint {
                system: "email".into(),
                value: patient.email.clone(),
                use_type: None,
            },
        ],
        gender: match patient.sex {
            Sex::Male => AdministrativeGender::Male,
            Sex::Female => AdministrativeGender::Female,
        },
        birth_date: patient.birth_date,
        deceased_boolean: patient.death.is_none().then_some(false),
        deceased_date_time: patient.death.map(|death| death.at),
        address: vec![Address {
            line: vec![patient.address.line.clone()],
            city: patient.address.city.clone(),
            state: patient.address.state.clone(),
            postal_code: patient.address.postal_code.clone(),
            country: patient.address.country.clone(),
        }],
        marital_status: Some(CodeableConcept::coded(Coding::new(
            MARITAL_STATUS_SYSTEM,
            patient.marital_status.code(),
            patient.marital_status.display(),
        ))),
        contact: vec![PatientContact {
            relationship: vec![CodeableConcept::text("Spouse")],
            name: HumanName {
                use_type: Some(NameUse::Usual),
                family: Some(patient.spouse.name.family.clone()),
                given: vec![patient.spouse.name.given.clone()],
                suffix: Vec::new(),
            },
            telecom: vec![ContactPoint {
                system: "phone".into(),
                value: patient.spouse.phone.clone(),
                use_type: Some("home".into()),
            }],
        }],
        managing_organization: Some(Reference::display(MANAGING_ORGANIZATION)),
    }
}

fn encounter_resource(
    encounter: &Encounter,
    ids: &IdSource<'_>,
    subject: &Reference,
) -> fhir::Encounter {
    let class = match encounter.kind {
        EncounterKind::Index { .. } if encounter.overnight_stays > 0 => EncounterClass::Inpatient,
        EncounterKind::Index { .. } => EncounterClass::Emergency,
        _ => EncounterClass::Ambulatory,
    };
    let reason = &encounter.reason;
    let (part_of, hospitalization) = match encounter.kind.original() {
        Some(original) => (
            Some(Reference::to("Encounter", &ids.encounter(original))),
            Some(Hospitalization {
                re_admission: Some(CodeableConcept::coded(Coding::new(
                    READMISSION_SYSTEM,
                    "R",
                    "Re-admission",
                ))),
            }),
        ),
        None => (None, None),
    };

    fhir::Encounter {
        id: ids.encounter(encounter.id),
        status: match encounter.status {
            EncounterStatus::Finished => fhir::EncounterStatus::Finished,
            EncounterStatus::InProgress => fhir::EncounterStatus::InProgress,
        },
        class: class.coding(),
        encounter_type: vec![CodeableConcept::coded(Coding::new(
            CPT,
            reason.code,
            reason.display,
        ))],
        subject: subject.clone(),
        period: encounter.period.into(),
        reason_code: vec![CodeableConcept {
            coding: vec![Coding::new(CPT, reason.code, reason.display)],
            text: Some(reason.text.clone()),
        }],
        reason_reference: encounter
            .kind
            .condition()
            .map(|condition| Reference::to("Condition", &ids.condition(condition)))
            .into_iter()
            .collect(),
        hospitalization,
        part_of,
        service_provider: Some(Reference::display(MANAGING_ORGANIZATION)),
    }
}

fn observation_resource(
    observation: &Observation,
    id: ResourceId,
    ids: &IdSource<'_>,
    subject: &Reference,
) -> fhir::Observation {
    let (code, display) = observation.kind.code();
    let category = if observation.kind.is_laboratory() {
        ("laboratory", "Laboratory")
    } else {
        ("vital-signs", "Vital Signs")
    };
    let (value_quantity, value_codeable_concept) = match &observation.value {
        ObservationValue::Quantity { value, unit, ucum } => {
            (Some(Quantity::ucum(*value, unit, ucum)), None)
        }
        ObservationValue::Coded { code, display } => (
            None,
            Some(CodeableConcept::coded(Coding::new(SNOMED_CT, code, display))),
        ),
    };

    fhir::Observation {
        id,
        status: ObservationStatus::Final,
        category: vec![CodeableConcept::coded(Coding::new(
            OBSERVATION_CATEGORY_SYSTEM,
            category.0,
            category.1,
        ))],
        code: CodeableConcept::coded(Coding::new(SNOMED_CT, code, display)),
        subject: subject.clone(),
        encounter: observation
            .recorded_by
            .map(|encounter| Reference::to("Encounter", &ids.encounter(encounter))),
        effective_period: observation.applies.map(FhirPeriod::from),
        value_quantity,
        value_codeable_concept,
        value_string: None,
    }
}

fn procedure_resource(
    procedure: &Procedure,
    id: ResourceId,
    ids: &IdSource<'_>,
    subject: &Reference,
    reference_time: DateTime<Utc>,
) -> fhir::Procedure {
    fhir::Procedure {
        id,
        status: if procedure.period.end() <= reference_time {
            ProcedureStatus::Completed
        } else {
            ProcedureStatus::InProgress
        },
        code: CodeableConcept::coded(Coding::new(CPT, procedure.code, procedure.name)),
        subject: subject.clone(),
        encounter: Reference::to("Encounter", &ids.encounter(procedure.encounter)),
        performed_period: procedure.period.into(),
        reason_reference: vec![Reference::to(
            "Condition",
            &ids.condition(procedure.condition),
        )],
        outcome: Some(CodeableConcept::text(if procedure.successful {
            "Successful"
        } else {
            "Unsuccessful"
        })),
        note: vec![Annotation {
            text: procedure.description.to_string(),
        }],
    }
}

fn statement_resource(
    course: &MedicationCourse,
    id: ResourceId,
    ids: &IdSource<'_>,
    subject: &Reference,
    deceased: bool,
) -> fhir::MedicationStatement {
    let rate = course.rate;
    let ratio = Ratio {
        numerator: Quantity::plain(rate.amount, rate.unit),
        denominator: Quantity::ucum(1.0, rate.per.label(), rate.per.ucum()),
    };
    let dosage = if course.as_needed {
        Dosage {
            text: rate.to_string(),
            as_needed_boolean: true,
            dose_and_rate: Vec::new(),
            max_dose_per_period: Some(ratio),
        }
    } else {
        Dosage {
            text: rate.to_string(),
            as_needed_boolean: false,
            dose_and_rate: vec![DoseAndRate { rate_ratio: ratio }],
            max_dose_per_period: None,
        }
    };
    let status = match (course.end, deceased) {
        (Some(_), _) => fhir::MedicationStatementStatus::Completed,
        (None, true) => fhir::MedicationStatementStatus::Stopped,
        (None, false) => fhir::MedicationStatementStatus::Active,
    };

    fhir::MedicationStatement {
        id,
        status,
        medication_reference: Reference::to("Medication", &ids.medication(course.medication)),
        subject: subject.clone(),
        context: Some(Reference::to("Encounter", &ids.encounter(course.encounter))),
        effective_period: FhirPeriod {
            start: course.start,
            end: course.end,
        },
        reason_reference: vec![Reference::to("Condition", &ids.condition(course.condition))],
        dosage: vec![dosage],
    }
}

fn allergy_resource(allergy: &Allergy, id: ResourceId, subject: &Reference) -> AllergyIntolerance {
    let category = match allergy.substance {
        AllergySubstance::Mold | AllergySubstance::Latex => AllergyCategory::Environment,
        AllergySubstance::Bees => AllergyCategory::Biologic,
        AllergySubstance::Penicillin => AllergyCategory::Medication,
    };
    AllergyIntolerance {
        id,
        clinical_status: CodeableConcept::coded(Coding::new(
            ALLERGY_CLINICAL_SYSTEM,
            "active",
            "Active",
        )),
        verification_status: CodeableConcept::coded(Coding::new(
            ALLERGY_VERIFICATION_SYSTEM,
            "confirmed",
            "Confirmed",
        )),
        category: vec![category],
        criticality: match allergy.criticality {
            crate::physiology::AllergyCriticality::Low => fhir::AllergyCriticality::Low,
            crate::physiology::AllergyCriticality::High => fhir::AllergyCriticality::High,
        },
        code: CodeableConcept::coded(Coding::new(
            SNOMED_CT,
            allergy.substance.code(),
            allergy.substance.display(),
        )),
        patient: subject.clone(),
        recorded_date: allergy.recorded,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::PatientGenerator;
    use chrono::TimeZone;
    use std::path::PathBuf;
    use std::sync::Arc;

    fn setup() -> (PatientGenerator, Arc<CoreConfig>, Arc<Knowledge>) {
        let reference = Utc
            .with_ymd_and_hms(2025, 3, 14, 12, 0, 0)
            .single()
            .expect("valid timestamp");
        let config = Arc::new(
            CoreConfig::new(
                PathBuf::from("unused"),
                "synth.assembly".into(),
                reference,
                std::time::Duration::from_secs(5),
            )
            .expect("valid config"),
        );
        let knowledge = Arc::new(Knowledge::standard().expect("standard knowledge"));
        (
            PatientGenerator::new(config.clone(), knowledge.clone()),
            config,
            knowledge,
        )
    }

    #[test]
    fn test_bundle_counts_match_record() {
        let (generator, config, knowledge) = setup();
        for seed in 0..20 {
            let record = generator.generate(seed).expect("generate");
            let bundle = assemble_bundle(&record, &knowledge, &config).expect("assemble");
            assert_eq!(bundle.count_of("Patient"), 1);
            assert_eq!(bundle.count_of("Encounter"), record.encounters.len());
            assert_eq!(bundle.count_of("Condition"), record.conditions.len());
            assert_eq!(bundle.count_of("Procedure"), record.procedures.len());
            assert_eq!(
                bundle.count_of("MedicationStatement"),
                record.medication_courses.len()
            );
            let death_observations = usize::from(record.patient.is_deceased());
            assert_eq!(
                bundle.count_of("Observation"),
                record.observations.len() + death_observations
            );
            let patient = bundle.patient().expect("patient first");
            assert_eq!(patient.is_deceased(), record.patient.is_deceased());
        }
    }

    #[test]
    fn test_ids_are_stable_across_assemblies() {
        let (generator, config, knowledge) = setup();
        let record = generator.generate(11).expect("generate");
        let first = assemble_bundle(&record, &knowledge, &config).expect("assemble");
        let second = assemble_bundle(&record, &knowledge, &config).expect("assemble");
        assert_eq!(first, second);
    }

    #[test]
    fn test_encounter_references_resolve_within_bundle() {
        let (generator, config, knowledge) = setup();
        for seed in 0..20 {
            let record = generator.generate(seed).expect("generate");
            let bundle = assemble_bundle(&record, &knowledge, &config).expect("assemble");
            let ids: BTreeSet<String> = bundle
                .entries()
                .iter()
                .map(|r| r.id().to_string())
                .collect();
            for resource in bundle.entries() {
                if let Resource::Encounter(encounter) = resource {
                    for reason in &encounter.reason_reference {
                        let (_, target) = reason.target().expect("literal reference");
                        assert!(ids.contains(&target.to_string()));
                    }
                    if let Some(part_of) = &encounter.part_of {
                        let (_, target) = part_of.target().expect("literal reference");
                        assert!(ids.contains(&target.to_string()));
                    }
                }
            }
        }
    }
}
