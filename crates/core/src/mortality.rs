//! Mortality consistency filter.
//!
//! Conditions are generated one slot at a time, and a later slot may kill the patient before
//! events an earlier slot already scheduled. [`apply`] removes or truncates everything that
//! would otherwise postdate the final death. It is a no-op for surviving patients and
//! idempotent for deceased ones.

use crate::knowledge::ConditionId;
use crate::record::{EncounterId, EncounterStatus, PatientRecord};
use serde::Serialize;
use std::collections::BTreeSet;

/// Counts of what [`apply`] changed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct FilterReport {
    pub conditions_dropped: usize,
    pub abatements_cleared: usize,
    pub encounters_dropped: usize,
    pub encounters_truncated: usize,
    pub procedures_dropped: usize,
    pub courses_dropped: usize,
    pub course_ends_cleared: usize,
}

impl FilterReport {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Enforce that nothing in `record` happens after the patient's death.
pub fn apply(record: &mut PatientRecord) -> FilterReport {
    let mut report = FilterReport::default();
    let Some(death) = record.death().map(|d| d.at) else {
        return report;
    };
    let reference_time = record.reference_time;

    // Conditions
    let before = record.conditions.len();
    record.conditions.retain(|c| c.onset <= death);
    report.conditions_dropped = before - record.conditions.len();
    for condition in &mut record.conditions {
        if let Some(abatement) = condition.abatement.filter(|&a| a > death) {
            condition.abatement = None;
            condition.projected_resolution = Some(abatement);
            report.abatements_cleared += 1;
        }
    }
    let kept_conditions: BTreeSet<ConditionId> =
        record.conditions.iter().map(|c| c.condition).collect();

    // Encounters, then readmissions whose original encounter is gone
    let before = record.encounters.len();
    record.encounters.retain(|e| {
        e.period.start() <= death
            && e.kind
                .condition()
                .map_or(true, |condition| kept_conditions.contains(&condition))
    });
    let mut kept_encounters: BTreeSet<EncounterId> =
        record.encounters.iter().map(|e| e.id).collect();
    record.encounters.retain(|e| {
        e.kind
            .original()
            .map_or(true, |original| kept_encounters.contains(&original))
    });
    kept_encounters = record.encounters.iter().map(|e| e.id).collect();
    report.encounters_dropped = before - record.encounters.len();

    for encounter in &mut record.encounters {
        if encounter.period.end() > death {
            encounter.period = encounter.period.clamp_end(death);
            encounter.status = EncounterStatus::at(&encounter.period, reference_time);
            report.encounters_truncated += 1;
        }
    }

    // Procedures
    let before = record.procedures.len();
    record
        .procedures
        .retain(|p| p.period.start() <= death && kept_encounters.contains(&p.encounter));
    report.procedures_dropped = before - record.procedures.len();
    for procedure in &mut record.procedures {
        procedure.period = procedure.period.clamp_end(death);
    }

    // Medication courses
    let before = record.medication_courses.len();
    record
        .medication_courses
        .retain(|m| m.start <= death && kept_conditions.contains(&m.condition));
    report.courses_dropped = before - record.medication_courses.len();
    for course in &mut record.medication_courses {
        if course.end.is_some_and(|end| end > death) {
            course.end = None;
            report.course_ends_cleared += 1;
        }
    }

    if !report.is_empty() {
        tracing::debug!("Mortality filter for seed {}: {:?}", record.seed, report);
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demographics::Death;
    use crate::knowledge::{MedicationId, RatePeriod, ResolvedRate};
    use crate::record::{
        blank_record, ConditionInstance, Encounter, EncounterKind, EncounterReason, FollowUpVisit,
        MedicationCourse, Procedure,
    };
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use synth_types::Period;

    const FATAL: ConditionId = ConditionId(4);
    const CHRONIC: ConditionId = ConditionId(5);
    const LATE: ConditionId = ConditionId(3);

    fn at(year: i32, month: u32, day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, day, hour, 0, 0)
            .single()
            .expect("valid timestamp")
    }

    fn death_time() -> DateTime<Utc> {
        at(2024, 6, 1, 0)
    }

    fn encounter(id: u32, kind: EncounterKind, start: DateTime<Utc>, hours: i64) -> Encounter {
        let period = Period::starting_at(start, Duration::hours(hours));
        Encounter {
            id: EncounterId(id),
            kind,
            status: EncounterStatus::at(&period, at(2025, 3, 14, 12)),
            period,
            reason: EncounterReason {
                code: "185349003",
                display: "Encounter for check up",
                text: "Hand-built encounter".into(),
            },
            overnight_stays: 0,
            readmission_eligible: false,
        }
    }

    fn procedure(encounter: u32, condition: ConditionId, start: DateTime<Utc>) -> Procedure {
        Procedure {
            encounter: EncounterId(encounter),
            condition,
            period: Period::starting_at(start, Duration::hours(1)),
            code: "0",
            name: "Hand-built procedure",
            description: "Hand-built procedure",
            successful: true,
        }
    }

    fn course(
        condition: ConditionId,
        encounter: u32,
        start: DateTime<Utc>,
        end: Option<DateTime<Utc>>,
    ) -> MedicationCourse {
        MedicationCourse {
            medication: MedicationId(1),
            condition,
            encounter: EncounterId(encounter),
            display: "Hand-built medication".into(),
            rate: ResolvedRate {
                amount: 1.0,
                unit: "tablet",
                per: RatePeriod::Day,
            },
            as_needed: false,
            start,
            end,
        }
    }

    /// A deceased patient whose record still holds events scheduled past the death.
    fn deceased_record() -> PatientRecord {
        let mut record = blank_record(21, at(2025, 3, 14, 12));
        record.patient.death = Some(Death {
            at: death_time(),
            cause: FATAL,
        });
        record.patient.active = false;

        record.conditions = vec![
            ConditionInstance {
                condition: FATAL,
                onset: at(2024, 5, 20, 0),
                abatement: None,
                fatal_at: Some(death_time()),
                projected_resolution: None,
            },
            ConditionInstance {
                condition: CHRONIC,
                onset: at(2024, 1, 1, 0),
                abatement: Some(at(2024, 9, 1, 0)),
                fatal_at: None,
                projected_resolution: None,
            },
            ConditionInstance {
                condition: LATE,
                onset: at(2024, 8, 1, 0),
                abatement: None,
                fatal_at: None,
                projected_resolution: None,
            },
        ];

        record.encounters = vec![
            encounter(1, EncounterKind::Index { condition: FATAL }, at(2024, 5, 20, 9), 48),
            encounter(2, EncounterKind::Index { condition: CHRONIC }, at(2024, 1, 1, 9), 24),
            encounter(3, EncounterKind::Index { condition: LATE }, at(2024, 8, 1, 9), 24),
            encounter(
                4,
                EncounterKind::Readmission {
                    condition: CHRONIC,
                    original: EncounterId(3),
                },
                at(2024, 2, 1, 9),
                24,
            ),
            encounter(
                5,
                EncounterKind::FollowUp {
                    condition: CHRONIC,
                    visit: FollowUpVisit::CheckUp,
                },
                at(2024, 5, 31, 20),
                8,
            ),
        ];

        record.procedures = vec![
            procedure(1, FATAL, at(2024, 5, 20, 10)),
            procedure(3, LATE, at(2024, 8, 1, 10)),
        ];

        record.medication_courses = vec![
            course(FATAL, 1, at(2024, 5, 20, 12), None),
            course(CHRONIC, 2, at(2024, 1, 1, 12), Some(at(2024, 9, 1, 0))),
            course(LATE, 3, at(2024, 8, 1, 12), None),
        ];
        record
    }

    #[test]
    fn test_surviving_patient_is_untouched() {
        let mut record = blank_record(22, at(2025, 3, 14, 12));
        record.conditions.push(ConditionInstance {
            condition: CHRONIC,
            onset: at(2024, 1, 1, 0),
            abatement: None,
            fatal_at: None,
            projected_resolution: None,
        });
        let before = record.clone();

        assert!(apply(&mut record).is_empty());
        assert_eq!(record, before);
    }

    #[test]
    fn test_events_after_death_are_removed_or_truncated() {
        let mut record = deceased_record();

        let report = apply(&mut record);

        assert_eq!(
            report,
            FilterReport {
                conditions_dropped: 1,
                abatements_cleared: 1,
                encounters_dropped: 2,
                encounters_truncated: 1,
                procedures_dropped: 1,
                courses_dropped: 1,
                course_ends_cleared: 1,
            }
        );

        assert!(!record.has_condition(LATE));
        let chronic = record.condition(CHRONIC).expect("chronic condition kept");
        assert_eq!(chronic.abatement, None);
        assert_eq!(chronic.projected_resolution, Some(at(2024, 9, 1, 0)));

        let ids: Vec<EncounterId> = record.encounters.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![EncounterId(1), EncounterId(2), EncounterId(5)]);
        let follow_up = record.encounter(EncounterId(5)).expect("follow-up kept");
        assert_eq!(follow_up.period.end(), death_time());
        assert_eq!(follow_up.status, EncounterStatus::Finished);

        assert_eq!(record.procedures.len(), 1);
        assert_eq!(record.procedures[0].encounter, EncounterId(1));

        assert_eq!(record.medication_courses.len(), 2);
        assert!(record.medication_courses.iter().all(|c| c.end.is_none()));
    }

    #[test]
    fn test_second_pass_changes_nothing() {
        let mut record = deceased_record();
        apply(&mut record);
        let filtered = record.clone();

        assert!(apply(&mut record).is_empty());
        assert_eq!(record, filtered);
    }
}
