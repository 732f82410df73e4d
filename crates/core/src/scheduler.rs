//! Encounter and procedure scheduler.
//!
//! [`schedule_condition`] runs right after a condition is diagnosed: it creates the index
//! encounter, possibly a procedure, the medication course and the follow-up visits the catalog
//! entry asks for. [`schedule_derived`] runs once every slot is filled and adds the encounters
//! that depend on the whole timeline: readmissions, screenings and yearly physicals.
//!
//! Encounters that would start after the reference time are never created. Encounters after
//! the patient's death are left for the mortality filter.

use crate::calendar::{days_before, full_months_between, full_years_between, midnight, Offset};
use crate::constants::{
    CAST_REMOVAL_CODE, CAST_REMOVAL_DISPLAY, CHEMOTHERAPY_CODE, CHEMOTHERAPY_DISPLAY,
    EMERGENCY_VISIT_CODE, EMERGENCY_VISIT_DISPLAY, FOLLOW_UP_CODE, FOLLOW_UP_DISPLAY,
    ONSET_WINDOW_DAYS, POSTOPERATIVE_FOLLOW_UP_CODE, POSTOPERATIVE_FOLLOW_UP_DISPLAY,
    READMISSION_DISPLAY, READMISSION_ONE_IN, YEARLY_PHYSICAL_CODE, YEARLY_PHYSICAL_DISPLAY,
};
use crate::context::PatientGenerationContext;
use crate::knowledge::{ConditionCatalogEntry, ConditionId, FollowUpPolicy, ProcedureFollowUp};
use crate::record::{
    Encounter, EncounterId, EncounterKind, EncounterReason, EncounterStatus, FollowUpVisit,
    MedicationCourse, Procedure,
};
use crate::timeline;
use crate::{SynthError, SynthResult};
use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use synth_types::Period;

// ============================================================================
// Per-condition scheduling
// ============================================================================

/// Schedule the care that follows the diagnosis of `entry`.
///
/// # Errors
///
/// Returns an error if the entry links to an unknown medication or a date leaves chrono's range.
pub(crate) fn schedule_condition(
    ctx: &mut PatientGenerationContext<'_>,
    entry: &ConditionCatalogEntry,
) -> SynthResult<()> {
    let onset = ctx
        .record
        .condition(entry.id)
        .map(|instance| instance.onset)
        .ok_or(SynthError::UnknownCondition(entry.id))?;

    let index = index_encounter(ctx, entry, onset);
    let index_period = index.period;
    let index_id = index.id;
    ctx.record.encounters.push(index);

    let procedure_fired = perform_procedure(ctx, entry, index_id, index_period)?;

    if let Some(course) = medication_course(ctx, entry, index_id)? {
        ctx.record.medication_courses.push(course);
    }

    match entry.follow_up {
        FollowUpPolicy::None => {}
        FollowUpPolicy::WeekLater => week_later_visit(ctx, entry, index_period, FollowUpVisit::CheckUp)?,
        FollowUpPolicy::AfterProcedure(ProcedureFollowUp::WeekLater) if procedure_fired => {
            week_later_visit(ctx, entry, index_period, FollowUpVisit::Postoperative)?
        }
        FollowUpPolicy::AfterProcedure(ProcedureFollowUp::CastRemoval) if procedure_fired => {
            cast_removal(ctx, entry, index_period)?
        }
        FollowUpPolicy::AfterProcedure(_) => {}
        FollowUpPolicy::Chemotherapy => chemotherapy(ctx, entry, onset)?,
    }

    Ok(())
}

fn patient_name(ctx: &PatientGenerationContext<'_>) -> String {
    ctx.record.patient.name.full()
}

fn visit_minutes<R: Rng>(rng: &mut R) -> Duration {
    Duration::minutes(rng.gen_range(60..=240))
}

/// Add an encounter unless it would start after the reference time.
fn push_encounter(
    ctx: &mut PatientGenerationContext<'_>,
    kind: EncounterKind,
    period: Period,
    reason: EncounterReason,
) -> Option<EncounterId> {
    if period.start() > ctx.reference_time {
        tracing::debug!("Skipping {:?} starting after the reference time", kind);
        return None;
    }
    let id = ctx.next_encounter_id();
    ctx.record.encounters.push(Encounter {
        id,
        kind,
        period,
        status: EncounterStatus::at(&period, ctx.reference_time),
        reason,
        overnight_stays: 0,
        readmission_eligible: false,
    });
    Some(id)
}

fn index_encounter(
    ctx: &mut PatientGenerationContext<'_>,
    entry: &ConditionCatalogEntry,
    onset: DateTime<Utc>,
) -> Encounter {
    let nights = ctx.rng.gen_range(entry.stay.min..=entry.stay.max);
    let length = if nights == 0 {
        Duration::minutes(ctx.rng.gen_range(0..=360))
    } else {
        Duration::days(i64::from(nights))
    };
    let period = Period::starting_at(onset, length);
    let name = patient_name(ctx);
    let text = match nights {
        0 => format!(
            "{name} came in for a non-overnight visit and was diagnosed with {}.",
            entry.display
        ),
        1 => format!("{name} stayed for 1 night after being diagnosed with {}.", entry.display),
        n => format!("{name} stayed for {n} nights after being diagnosed with {}.", entry.display),
    };
    let readmission_eligible = ctx.one_in(READMISSION_ONE_IN);

    Encounter {
        id: ctx.next_encounter_id(),
        kind: EncounterKind::Index {
            condition: entry.id,
        },
        period,
        status: EncounterStatus::at(&period, ctx.reference_time),
        reason: EncounterReason {
            code: EMERGENCY_VISIT_CODE,
            display: EMERGENCY_VISIT_DISPLAY,
            text,
        },
        overnight_stays: nights,
        readmission_eligible,
    }
}

/// Roll for the entry's procedure. Returns whether one was performed.
fn perform_procedure(
    ctx: &mut PatientGenerationContext<'_>,
    entry: &ConditionCatalogEntry,
    encounter: EncounterId,
    encounter_period: Period,
) -> SynthResult<bool> {
    let Some(spec) = entry.procedure else {
        return Ok(false);
    };
    if !ctx.chance(entry.procedure_chance) {
        return Ok(false);
    }

    let hours = Duration::hours(ctx.rng.gen_range(3..=9));
    let period =
        Period::starting_at(encounter_period.start(), hours).clamp_end(encounter_period.end());
    let successful = ctx.chance(entry.procedure_success);
    ctx.record.procedures.push(Procedure {
        encounter,
        condition: entry.id,
        period,
        code: spec.code,
        name: spec.name,
        description: spec.description,
        successful,
    });

    if successful {
        let upgradable = ctx
            .record
            .condition(entry.id)
            .is_some_and(|instance| instance.abatement.is_none() && instance.fatal_at.is_none());
        if let (true, Some(class)) = (upgradable, entry.recovery) {
            tracing::debug!("Procedure {} cures condition {}", spec.code, entry.id);
            timeline::resolve(ctx, entry.id, class)?;
        }
    }
    Ok(true)
}

/// The course of the entry's linked medication, if it has one.
fn medication_course(
    ctx: &PatientGenerationContext<'_>,
    entry: &ConditionCatalogEntry,
    encounter: EncounterId,
) -> SynthResult<Option<MedicationCourse>> {
    let Some(medication_id) = entry.medication_id() else {
        return Ok(None);
    };
    let medication = ctx.knowledge.medication(medication_id)?;
    let Some(instance) = ctx.record.condition(entry.id) else {
        return Err(SynthError::UnknownCondition(entry.id));
    };
    Ok(Some(MedicationCourse {
        medication: medication.id,
        condition: entry.id,
        encounter,
        display: medication.display(),
        rate: medication.rate.resolve(ctx.record.physiology.weight_kg()),
        as_needed: medication.as_needed,
        start: instance.onset,
        end: instance.abatement,
    }))
}

fn week_later_visit(
    ctx: &mut PatientGenerationContext<'_>,
    entry: &ConditionCatalogEntry,
    index_period: Period,
    visit: FollowUpVisit,
) -> SynthResult<()> {
    let start = Offset::days(ctx.rng.gen_range(5..=10)).after(index_period.end())?;
    let period = Period::starting_at(start, visit_minutes(&mut ctx.rng));
    let name = patient_name(ctx);
    let reason = match visit {
        FollowUpVisit::Postoperative => EncounterReason {
            code: POSTOPERATIVE_FOLLOW_UP_CODE,
            display: POSTOPERATIVE_FOLLOW_UP_DISPLAY,
            text: format!(
                "{name} came in for a check-up appointment for a past surgery regarding {}.",
                entry.display
            ),
        },
        _ => EncounterReason {
            code: FOLLOW_UP_CODE,
            display: FOLLOW_UP_DISPLAY,
            text: format!("{name} came in for a check-up appointment regarding {}.", entry.display),
        },
    };
    push_encounter(
        ctx,
        EncounterKind::FollowUp {
            condition: entry.id,
            visit,
        },
        period,
        reason,
    );
    Ok(())
}

fn cast_removal(
    ctx: &mut PatientGenerationContext<'_>,
    entry: &ConditionCatalogEntry,
    index_period: Period,
) -> SynthResult<()> {
    let offset = Offset {
        months: ctx.rng.gen_range(1..=2),
        days: ctx.rng.gen_range(0..=30),
        minutes: 0,
    };
    let start = offset.after(index_period.end())?;
    let period = Period::starting_at(start, visit_minutes(&mut ctx.rng));
    let text = format!(
        "{} came in for a routine appointment to remove a cast.",
        patient_name(ctx)
    );
    push_encounter(
        ctx,
        EncounterKind::FollowUp {
            condition: entry.id,
            visit: FollowUpVisit::CastRemoval,
        },
        period,
        EncounterReason {
            code: CAST_REMOVAL_CODE,
            display: CAST_REMOVAL_DISPLAY,
            text,
        },
    );
    Ok(())
}

/// Monthly chemotherapy cycles from the month after onset up to the reference time.
///
/// Cycles after death are removed by the mortality filter.
fn chemotherapy(
    ctx: &mut PatientGenerationContext<'_>,
    entry: &ConditionCatalogEntry,
    onset: DateTime<Utc>,
) -> SynthResult<()> {
    let cycles = full_months_between(onset, ctx.reference_time);
    let name = patient_name(ctx);
    for cycle in 1..=cycles {
        let offset = Offset {
            months: cycle,
            days: ctx.rng.gen_range(-2..=2),
            minutes: 0,
        };
        let start = offset.after(onset)?;
        let period = Period::starting_at(start, visit_minutes(&mut ctx.rng));
        push_encounter(
            ctx,
            EncounterKind::Chemotherapy {
                condition: entry.id,
                cycle,
            },
            period,
            EncounterReason {
                code: CHEMOTHERAPY_CODE,
                display: CHEMOTHERAPY_DISPLAY,
                text: format!(
                    "{name} came in for a routine chemotherapy treatment regarding {}.",
                    entry.display
                ),
            },
        );
    }
    Ok(())
}

// ============================================================================
// Timeline-wide scheduling
// ============================================================================

/// Add readmissions, screenings and yearly physicals once every condition is in place.
pub(crate) fn schedule_derived(ctx: &mut PatientGenerationContext<'_>) -> SynthResult<()> {
    readmissions(ctx)?;
    screenings(ctx)?;
    yearly_physicals(ctx)
}

fn readmissions(ctx: &mut PatientGenerationContext<'_>) -> SynthResult<()> {
    let eligible: Vec<(EncounterId, ConditionId, Period)> = ctx
        .record
        .encounters
        .iter()
        .filter(|e| e.readmission_eligible)
        .filter_map(|e| match e.kind {
            EncounterKind::Index { condition } => Some((e.id, condition, e.period)),
            _ => None,
        })
        .collect();

    let name = patient_name(ctx);
    for (original, condition, period) in eligible {
        let display = ctx.knowledge.condition(condition)?.display;
        let offset = Offset {
            months: 1,
            days: ctx.rng.gen_range(-10..=10),
            minutes: 0,
        };
        let start = offset.after(period.end())?;
        let length = Duration::minutes(ctx.rng.gen_range(0..=360));
        push_encounter(
            ctx,
            EncounterKind::Readmission {
                condition,
                original,
            },
            Period::starting_at(start, length),
            EncounterReason {
                code: POSTOPERATIVE_FOLLOW_UP_CODE,
                display: READMISSION_DISPLAY,
                text: format!("{name} was readmitted regarding {display}."),
            },
        );
    }
    Ok(())
}

fn screenings(ctx: &mut PatientGenerationContext<'_>) -> SynthResult<()> {
    let knowledge = ctx.knowledge;
    let screened: Vec<_> = ctx
        .record
        .conditions
        .iter()
        .filter_map(|instance| {
            let entry = knowledge.condition(instance.condition).ok()?;
            entry.screening.map(|s| (entry.id, s, instance.onset))
        })
        .collect();

    let name = patient_name(ctx);
    for (condition, screening, onset) in screened {
        let start = Offset::days(ctx.rng.gen_range(2..=4)).before(onset)?;
        let length = Duration::minutes(ctx.rng.gen_range(60..=120));
        push_encounter(
            ctx,
            EncounterKind::Screening {
                condition,
                screening,
            },
            Period::starting_at(start, length),
            EncounterReason {
                code: screening.code(),
                display: screening.display(),
                text: format!("{name} came in for a {} screening.", screening.display().to_lowercase()),
            },
        );
    }
    Ok(())
}

fn yearly_physicals(ctx: &mut PatientGenerationContext<'_>) -> SynthResult<()> {
    let earliest_onset = ctx.record.conditions.iter().map(|c| c.onset).min();
    let earliest = match earliest_onset {
        Some(onset) => Offset {
            months: ctx.rng.gen_range(2..=4),
            days: ctx.rng.gen_range(0..=30),
            minutes: 0,
        }
        .before(onset)?,
        None => {
            let back = ctx.rng.gen_range(0..=ONSET_WINDOW_DAYS as u64);
            midnight(days_before(ctx.reference_time.date_naive(), back)?)
        }
    };

    let horizon = ctx.horizon();
    let count = 1 + full_years_between(earliest, horizon);
    let name = patient_name(ctx);
    for year in 0..count {
        let jitter = if year == 0 { 0 } else { ctx.rng.gen_range(-10..=10) };
        let start = Offset {
            months: year * 12,
            days: jitter,
            minutes: 0,
        }
        .after(earliest)?;
        let length = Duration::minutes(ctx.rng.gen_range(30..=120));
        if start > horizon {
            continue;
        }
        push_encounter(
            ctx,
            EncounterKind::YearlyPhysical { year },
            Period::starting_at(start, length),
            EncounterReason {
                code: YEARLY_PHYSICAL_CODE,
                display: YEARLY_PHYSICAL_DISPLAY,
                text: format!("{name} came in for a yearly physical."),
            },
        );
    }
    Ok(())
}
