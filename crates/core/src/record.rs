//! The generated patient record.
//!
//! A [`PatientRecord`] is the engine's output: one patient with the conditions, encounters,
//! procedures and medication courses of their history. Encounters carry a structural
//! [`EncounterKind`] naming what they derive from, so the mortality filter and validation can
//! follow derivations without parsing free text.

use crate::demographics::{Death, Patient};
use crate::knowledge::{ConditionId, MedicationId, ResolvedRate, Screening};
use crate::physiology::{Allergy, Observation, Physiology};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use synth_types::Period;

/// Per-patient encounter number, assigned in creation order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct EncounterId(pub u32);

impl fmt::Display for EncounterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{}", self.0)
    }
}

/// One diagnosed condition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ConditionInstance {
    pub condition: ConditionId,
    pub onset: DateTime<Utc>,
    pub abatement: Option<DateTime<Utc>>,
    /// The date this condition would kill the patient, when its mortality roll fired.
    pub fatal_at: Option<DateTime<Utc>>,
    /// A resolution date that lies beyond the record's horizon.
    pub projected_resolution: Option<DateTime<Utc>>,
}

impl ConditionInstance {
    pub fn is_resolved(&self) -> bool {
        self.abatement.is_some()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum FollowUpVisit {
    CheckUp,
    Postoperative,
    CastRemoval,
}

/// What an encounter derives from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum EncounterKind {
    /// The visit at which a condition was diagnosed.
    Index { condition: ConditionId },
    FollowUp {
        condition: ConditionId,
        visit: FollowUpVisit,
    },
    Chemotherapy { condition: ConditionId, cycle: u32 },
    Readmission {
        condition: ConditionId,
        original: EncounterId,
    },
    Screening {
        condition: ConditionId,
        screening: Screening,
    },
    YearlyPhysical { year: u32 },
}

impl EncounterKind {
    /// The condition this encounter derives from; `None` for yearly physicals.
    pub fn condition(&self) -> Option<ConditionId> {
        match *self {
            EncounterKind::Index { condition }
            | EncounterKind::FollowUp { condition, .. }
            | EncounterKind::Chemotherapy { condition, .. }
            | EncounterKind::Readmission { condition, .. }
            | EncounterKind::Screening { condition, .. } => Some(condition),
            EncounterKind::YearlyPhysical { .. } => None,
        }
    }

    /// The encounter this one derives from, for readmissions.
    pub fn original(&self) -> Option<EncounterId> {
        match *self {
            EncounterKind::Readmission { original, .. } => Some(original),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum EncounterStatus {
    Finished,
    InProgress,
}

impl EncounterStatus {
    /// Finished once the encounter has ended by the reference time.
    pub fn at(period: &Period, reference_time: DateTime<Utc>) -> Self {
        if period.end() <= reference_time {
            EncounterStatus::Finished
        } else {
            EncounterStatus::InProgress
        }
    }
}

/// Coded reason for an encounter plus a short narrative.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct EncounterReason {
    pub code: &'static str,
    pub display: &'static str,
    pub text: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Encounter {
    pub id: EncounterId,
    pub kind: EncounterKind,
    pub period: Period,
    pub status: EncounterStatus,
    pub reason: EncounterReason,
    pub overnight_stays: u16,
    pub readmission_eligible: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Procedure {
    pub encounter: EncounterId,
    pub condition: ConditionId,
    pub period: Period,
    pub code: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub successful: bool,
}

/// A course of the medication linked to a condition.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MedicationCourse {
    pub medication: MedicationId,
    pub condition: ConditionId,
    pub encounter: EncounterId,
    pub display: String,
    pub rate: ResolvedRate,
    pub as_needed: bool,
    pub start: DateTime<Utc>,
    pub end: Option<DateTime<Utc>>,
}

/// A complete generated history for one patient.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PatientRecord {
    pub seed: u64,
    pub reference_time: DateTime<Utc>,
    pub patient: Patient,
    pub physiology: Physiology,
    pub observations: Vec<Observation>,
    pub conditions: Vec<ConditionInstance>,
    pub encounters: Vec<Encounter>,
    pub procedures: Vec<Procedure>,
    pub medication_courses: Vec<MedicationCourse>,
    pub allergy: Option<Allergy>,
}

impl PatientRecord {
    pub(crate) fn new(
        seed: u64,
        reference_time: DateTime<Utc>,
        patient: Patient,
        physiology: Physiology,
        observations: Vec<Observation>,
        allergy: Option<Allergy>,
    ) -> Self {
        Self {
            seed,
            reference_time,
            patient,
            physiology,
            observations,
            conditions: Vec::new(),
            encounters: Vec::new(),
            procedures: Vec::new(),
            medication_courses: Vec::new(),
            allergy,
        }
    }

    pub fn death(&self) -> Option<&Death> {
        self.patient.death.as_ref()
    }

    /// The latest instant a realised event may occupy: the reference time, or death if earlier.
    pub fn horizon(&self) -> DateTime<Utc> {
        match self.death() {
            Some(death) => death.at.min(self.reference_time),
            None => self.reference_time,
        }
    }

    pub fn condition(&self, id: ConditionId) -> Option<&ConditionInstance> {
        self.conditions.iter().find(|c| c.condition == id)
    }

    pub(crate) fn condition_mut(&mut self, id: ConditionId) -> Option<&mut ConditionInstance> {
        self.conditions.iter_mut().find(|c| c.condition == id)
    }

    pub fn has_condition(&self, id: ConditionId) -> bool {
        self.condition(id).is_some()
    }

    pub fn encounter(&self, id: EncounterId) -> Option<&Encounter> {
        self.encounters.iter().find(|e| e.id == id)
    }

    /// The index encounter of a condition, if it survived.
    pub fn index_encounter(&self, condition: ConditionId) -> Option<&Encounter> {
        self.encounters
            .iter()
            .find(|e| e.kind == EncounterKind::Index { condition })
    }

    /// Yearly physicals in chronological order.
    pub fn yearly_physicals(&self) -> Vec<&Encounter> {
        let mut physicals: Vec<&Encounter> = self
            .encounters
            .iter()
            .filter(|e| matches!(e.kind, EncounterKind::YearlyPhysical { .. }))
            .collect();
        physicals.sort_by_key(|e| e.period.start());
        physicals
    }
}

/// A record with a drawn patient and physiology and no history.
#[cfg(test)]
pub(crate) fn blank_record(seed: u64, reference_time: DateTime<Utc>) -> PatientRecord {
    use rand::SeedableRng;

    let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(seed);
    let patient = crate::demographics::draw_patient(&mut rng, reference_time).expect("patient");
    let physiology = crate::physiology::draw_physiology(&mut rng, patient.sex);
    PatientRecord::new(seed, reference_time, patient, physiology, Vec::new(), None)
}
