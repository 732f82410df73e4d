//! Input and record validation.
//!
//! [`validate_namespace_safe_for_uri`] guards configuration input. [`validate_record`] checks a
//! finished [`PatientRecord`] against the invariants every generated record must satisfy before
//! it is handed to callers.

use crate::knowledge::{ConditionId, Gate, Knowledge};
use crate::record::{EncounterId, EncounterKind, PatientRecord};
use crate::{SynthError, SynthResult};
use chrono::Duration;
use std::collections::{BTreeMap, BTreeSet};

/// Validates that a namespace string is safe for embedding in a URI.
///
/// The namespace labels a generation run and seeds every derived resource identifier.
/// Rejected inputs:
/// - empty or whitespace-only strings
/// - strings longer than 253 bytes
/// - anything outside ASCII alphanumerics, `.`, `-` and `_`
///
/// # Arguments
///
/// * `namespace` - The namespace string to validate.
///
/// # Errors
///
/// Returns a `SynthError::InvalidInput` if the namespace is invalid.
pub fn validate_namespace_safe_for_uri(namespace: &str) -> SynthResult<()> {
    const MAX_NAMESPACE_LEN: usize = 253;

    if namespace.trim().is_empty() {
        return Err(SynthError::InvalidInput("namespace cannot be empty".into()));
    }

    if namespace.len() > MAX_NAMESPACE_LEN {
        return Err(SynthError::InvalidInput(format!(
            "namespace exceeds maximum length of {} characters",
            MAX_NAMESPACE_LEN
        )));
    }

    if !namespace.is_ascii() {
        return Err(SynthError::InvalidInput(
            "namespace must contain only ASCII characters".into(),
        ));
    }

    let ok = namespace
        .bytes()
        .all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'z' | b'A'..=b'Z' | b'.' | b'-' | b'_'));

    if !ok {
        return Err(SynthError::InvalidInput(
            "namespace contains invalid characters (only alphanumeric, '.', '-', '_' allowed)"
                .into(),
        ));
    }

    Ok(())
}

fn violation(message: String) -> SynthResult<()> {
    Err(SynthError::InvariantViolation(message))
}

/// Checks a finished record against the generation invariants.
///
/// # Arguments
///
/// * `record` - The record to check, after the mortality filter and observation attribution.
/// * `knowledge` - The catalogs the record was generated from.
///
/// # Errors
///
/// Returns `SynthError::InvariantViolation` naming the first broken invariant.
pub fn validate_record(record: &PatientRecord, knowledge: &Knowledge) -> SynthResult<()> {
    validate_conditions(record, knowledge)?;
    validate_death(record)?;
    validate_encounters(record, knowledge)?;
    validate_care(record)?;
    validate_observations(record)
}

fn validate_conditions(record: &PatientRecord, knowledge: &Knowledge) -> SynthResult<()> {
    let horizon = record.horizon();
    let mut seen = BTreeSet::new();
    for instance in &record.conditions {
        let entry = knowledge.condition(instance.condition)?;
        if !seen.insert(instance.condition) {
            return violation(format!("condition {} diagnosed twice", instance.condition));
        }
        if instance.onset > horizon {
            return violation(format!(
                "condition {} onset {} lies after the horizon {}",
                instance.condition, instance.onset, horizon
            ));
        }
        if let Some(abatement) = instance.abatement {
            if abatement < instance.onset || abatement > horizon {
                return violation(format!(
                    "condition {} abatement {} outside [{}, {}]",
                    instance.condition, abatement, instance.onset, horizon
                ));
            }
        }
        if instance
            .projected_resolution
            .is_some_and(|projected| projected <= horizon)
        {
            return violation(format!(
                "condition {} has a projected resolution within the horizon",
                instance.condition
            ));
        }
        if instance.fatal_at.is_some_and(|at| at < instance.onset) {
            return violation(format!(
                "condition {} kills before its onset",
                instance.condition
            ));
        }
        if entry.resolves_or_kills
            && instance.abatement.is_none()
            && instance.fatal_at.is_none()
            && instance.projected_resolution.is_none()
        {
            return violation(format!(
                "resolves-or-kills condition {} neither resolves nor kills",
                instance.condition
            ));
        }
    }

    let physiology = &record.physiology;
    for (gate, forced) in [
        (Gate::Hyperglycaemia, physiology.is_hyperglycaemic()),
        (Gate::HypertensiveBloodPressure, physiology.is_hypertensive()),
    ] {
        if let Some(entry) = knowledge.gated(gate) {
            if record.has_condition(entry.id) != forced {
                return violation(format!(
                    "condition {} present={} but {:?} is {}",
                    entry.id,
                    record.has_condition(entry.id),
                    gate,
                    forced
                ));
            }
        }
    }
    Ok(())
}

fn validate_death(record: &PatientRecord) -> SynthResult<()> {
    let patient = &record.patient;
    if patient.active == patient.is_deceased() {
        return violation("patient active flag disagrees with death".into());
    }
    let Some(death) = record.death() else {
        return Ok(());
    };
    if death.at > record.reference_time {
        return violation(format!("death {} lies in the future", death.at));
    }
    match record.condition(death.cause) {
        Some(cause) if cause.fatal_at == Some(death.at) => {}
        _ => {
            return violation(format!(
                "cause of death {} is not a fatal condition of the record",
                death.cause
            ))
        }
    }
    if let Some(c) = record
        .conditions
        .iter()
        .find(|c| c.fatal_at.is_some_and(|at| at < death.at))
    {
        return violation(format!("condition {} kills before the recorded death", c.condition));
    }
    Ok(())
}

fn validate_encounters(record: &PatientRecord, knowledge: &Knowledge) -> SynthResult<()> {
    let horizon = record.horizon();
    let death = record.death().map(|d| d.at);
    let mut ids = BTreeSet::new();
    let mut screenings: BTreeMap<ConditionId, usize> = BTreeMap::new();

    for encounter in &record.encounters {
        if !ids.insert(encounter.id) {
            return violation(format!("encounter id {} used twice", encounter.id));
        }
        if encounter.period.start() > horizon {
            return violation(format!(
                "encounter {} starts after the horizon {}",
                encounter.id, horizon
            ));
        }
        if death.is_some_and(|at| encounter.period.end() > at) {
            return violation(format!("encounter {} ends after death", encounter.id));
        }
        if let Some(condition) = encounter.kind.condition() {
            if !record.has_condition(condition) {
                return violation(format!(
                    "encounter {} refers to missing condition {}",
                    encounter.id, condition
                ));
            }
        }
        match encounter.kind {
            EncounterKind::Readmission {
                condition,
                original,
            } => {
                let resolved = record.encounter(original).is_some_and(|o| {
                    o.kind == EncounterKind::Index { condition } && o.readmission_eligible
                });
                if !resolved {
                    return violation(format!(
                        "readmission {} does not follow an eligible index encounter {}",
                        encounter.id, original
                    ));
                }
            }
            EncounterKind::Screening { condition, .. } => {
                *screenings.entry(condition).or_default() += 1;
                let onset = record
                    .condition(condition)
                    .map(|c| c.onset)
                    .unwrap_or(encounter.period.start());
                let lead = onset - encounter.period.start();
                if lead < Duration::days(2) || lead > Duration::days(4) {
                    return violation(format!(
                        "screening {} is not 2 to 4 days before onset of {}",
                        encounter.id, condition
                    ));
                }
            }
            _ => {}
        }
    }

    for instance in &record.conditions {
        let screened = knowledge.condition(instance.condition)?.screening.is_some();
        let count = screenings.get(&instance.condition).copied().unwrap_or(0);
        if count != usize::from(screened) {
            return violation(format!(
                "condition {} has {} screenings",
                instance.condition, count
            ));
        }
        if record.index_encounter(instance.condition).is_none() {
            return violation(format!(
                "condition {} has no index encounter",
                instance.condition
            ));
        }
    }
    Ok(())
}

fn validate_care(record: &PatientRecord) -> SynthResult<()> {
    let horizon = record.horizon();
    for procedure in &record.procedures {
        let Some(encounter) = record.encounter(procedure.encounter) else {
            return violation(format!(
                "procedure {} refers to missing encounter {}",
                procedure.code, procedure.encounter
            ));
        };
        if !encounter.period.contains(&procedure.period) {
            return violation(format!(
                "procedure {} lies outside encounter {}",
                procedure.code, encounter.id
            ));
        }
        if !record.has_condition(procedure.condition) {
            return violation(format!(
                "procedure {} refers to missing condition {}",
                procedure.code, procedure.condition
            ));
        }
    }

    for course in &record.medication_courses {
        if !record.has_condition(course.condition) || record.encounter(course.encounter).is_none() {
            return violation(format!(
                "medication course {} refers to a missing condition or encounter",
                course.medication
            ));
        }
        if course.start > horizon || course.end.is_some_and(|end| end < course.start || end > horizon) {
            return violation(format!(
                "medication course {} lies outside the horizon",
                course.medication
            ));
        }
    }
    Ok(())
}

fn validate_observations(record: &PatientRecord) -> SynthResult<()> {
    let known: BTreeSet<EncounterId> = record.encounters.iter().map(|e| e.id).collect();
    for observation in &record.observations {
        if let Some(encounter) = observation.recorded_by {
            if !known.contains(&encounter) {
                return violation(format!(
                    "observation {:?} recorded by missing encounter {}",
                    observation.kind, encounter
                ));
            }
        }
    }
    Ok(())
}
