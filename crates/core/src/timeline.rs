//! Condition timeline engine.
//!
//! Fills a patient's condition slots in three passes:
//!
//! 1. random slots, each proposing a catalog entry biased by the patient's physiology and
//!    re-drawing (a bounded number of times) until an eligible, unused entry comes up,
//! 2. a single chance of a post-operative infection when any procedure was performed,
//! 3. mandatory slots for the entries forced by physiology (Diabetes, Hypertension).
//!
//! Each diagnosed condition receives an onset, may become fatal, may resolve, and is handed to
//! the scheduler for its encounters before the next slot is drawn.

use crate::calendar::{days_before, midnight, Offset};
use crate::constants::{
    COMMON_DRAW_ONE_IN, MAX_DRAW_ATTEMPTS, ONSET_WINDOW_DAYS, POST_OPERATIVE_INFECTION_PERCENT,
    SLOT_COUNT_TABLE,
};
use crate::context::PatientGenerationContext;
use crate::knowledge::conditions::{
    ALCOHOLIC_CIRRHOSIS, CHRONIC_BRONCHITIS, CIRRHOSIS, CONGESTIVE_HEART_FAILURE, EMPHYSEMA,
    LUNG_CANCER, PULMONARY_HEART_DISEASE, UPPER_RESPIRATORY_TRACT_DISEASE,
};
use crate::knowledge::{ConditionCatalogEntry, ConditionId, DeathClass, Gate, RecoveryClass};
use crate::physiology::SmokingStatus;
use crate::record::ConditionInstance;
use crate::scheduler;
use crate::{SynthError, SynthResult};
use chrono::{DateTime, Utc};
use rand::Rng;

/// Draw how many random condition slots a patient gets.
pub(crate) fn draw_slot_count<R: Rng>(rng: &mut R) -> usize {
    SLOT_COUNT_TABLE[rng.gen_range(0..SLOT_COUNT_TABLE.len())]
}

/// Run every timeline pass for the patient in `ctx`.
///
/// # Errors
///
/// Returns `SynthError::RetryBudgetExhausted` if a random slot finds no unused entry within
/// `MAX_DRAW_ATTEMPTS` draws, or `SynthError::InvalidCatalog` if physiology forces a condition
/// the catalog does not contain.
pub(crate) fn build_timeline(ctx: &mut PatientGenerationContext<'_>, slots: usize) -> SynthResult<()> {
    for slot in 0..slots {
        fill_random_slot(ctx, slot)?;
    }
    post_operative_infection(ctx)?;
    mandatory_slots(ctx)?;
    Ok(())
}

// ============================================================================
// Candidate selection
// ============================================================================

fn is_eligible(ctx: &PatientGenerationContext<'_>, entry: &ConditionCatalogEntry) -> bool {
    !entry.gate.is_mandatory()
        && !ctx.used.contains(&entry.id)
        && ctx
            .record
            .physiology
            .satisfies(entry.gate, ctx.record.patient.sex)
}

fn fill_random_slot(ctx: &mut PatientGenerationContext<'_>, slot: usize) -> SynthResult<()> {
    let knowledge = ctx.knowledge;
    if !knowledge.conditions().iter().any(|entry| is_eligible(ctx, entry)) {
        tracing::warn!("No eligible condition left for slot {}, skipping", slot);
        return Ok(());
    }

    for attempt in 1..=MAX_DRAW_ATTEMPTS {
        let Some(candidate) = propose(ctx) else {
            break;
        };
        let entry = knowledge.condition(candidate)?;
        if is_eligible(ctx, entry) {
            tracing::debug!(
                "Slot {} drew condition {} ({}) after {} attempts",
                slot,
                entry.id,
                entry.display,
                attempt
            );
            let onset = draw_onset(ctx)?;
            return diagnose(ctx, entry, onset);
        }
    }

    Err(SynthError::RetryBudgetExhausted {
        slot,
        attempts: MAX_DRAW_ATTEMPTS,
    })
}

fn pick_id<R: Rng>(rng: &mut R, entries: &[&ConditionCatalogEntry]) -> Option<ConditionId> {
    (!entries.is_empty()).then(|| entries[rng.gen_range(0..entries.len())].id)
}

/// Propose a candidate entry, applying the physiology-driven overrides.
fn propose(ctx: &mut PatientGenerationContext<'_>) -> Option<ConditionId> {
    let knowledge = ctx.knowledge;
    let common: Vec<&ConditionCatalogEntry> =
        knowledge.conditions().iter().filter(|e| e.common).collect();
    let general: Vec<&ConditionCatalogEntry> = knowledge
        .conditions()
        .iter()
        .filter(|e| !e.gate.is_mandatory())
        .collect();

    let draw_common = !common.is_empty() && ctx.one_in(COMMON_DRAW_ONE_IN);
    let mut candidate = if draw_common {
        pick_id(&mut ctx.rng, &common)?
    } else {
        pick_id(&mut ctx.rng, &general)?
    };

    let available = |id: ConditionId| knowledge.contains_condition(id);
    let physiology = &ctx.record.physiology;
    let smoker = physiology.smoking == SmokingStatus::Smoker;
    let heavy_drinker = physiology.is_heavy_drinker();
    let hypertensive = physiology.is_hypertensive();

    if smoker && available(EMPHYSEMA) && ctx.one_in(5) {
        candidate = EMPHYSEMA;
    }

    let mut respiratory_override = false;
    if ctx.used.contains(&EMPHYSEMA) {
        if available(LUNG_CANCER) && ctx.one_in(3) {
            candidate = LUNG_CANCER;
            respiratory_override = true;
        } else if available(UPPER_RESPIRATORY_TRACT_DISEASE) && ctx.one_in(4) {
            candidate = UPPER_RESPIRATORY_TRACT_DISEASE;
            respiratory_override = true;
        } else if available(CHRONIC_BRONCHITIS) && ctx.one_in(4) {
            candidate = CHRONIC_BRONCHITIS;
            respiratory_override = true;
        }
    }

    if heavy_drinker && !respiratory_override && candidate != EMPHYSEMA && ctx.rng.gen_bool(0.5) {
        if available(CIRRHOSIS) {
            candidate = CIRRHOSIS;
        } else if available(ALCOHOLIC_CIRRHOSIS) {
            candidate = ALCOHOLIC_CIRRHOSIS;
        }
    }

    if knowledge
        .condition(candidate)
        .map(|entry| entry.is_liver_disease())
        .unwrap_or(false)
    {
        let mapped = if heavy_drinker { ALCOHOLIC_CIRRHOSIS } else { CIRRHOSIS };
        if available(mapped) {
            candidate = mapped;
        }
    }

    if hypertensive {
        match ctx.rng.gen_range(0..5) {
            0 if available(CONGESTIVE_HEART_FAILURE) => candidate = CONGESTIVE_HEART_FAILURE,
            1 if available(PULMONARY_HEART_DISEASE) => candidate = PULMONARY_HEART_DISEASE,
            _ => {}
        }
    }

    Some(candidate)
}

// ============================================================================
// Extra slots
// ============================================================================

fn post_operative_infection(ctx: &mut PatientGenerationContext<'_>) -> SynthResult<()> {
    if ctx.record.procedures.is_empty() || !ctx.chance(POST_OPERATIVE_INFECTION_PERCENT) {
        return Ok(());
    }
    let knowledge = ctx.knowledge;
    let Some(entry) = knowledge.gated(Gate::PostOperative) else {
        tracing::warn!("Catalog has no post-operative infection entry, skipping");
        return Ok(());
    };
    if ctx.used.contains(&entry.id) {
        return Ok(());
    }

    let trigger = ctx.rng.gen_range(0..ctx.record.procedures.len());
    let procedure_end = ctx.record.procedures[trigger].period.end();
    let onset = Offset::days(ctx.rng.gen_range(5..=10)).after(procedure_end)?;
    if onset > ctx.horizon() {
        tracing::debug!("Post-operative infection onset {} lies beyond the horizon", onset);
        return Ok(());
    }
    diagnose(ctx, entry, onset)
}

fn mandatory_slots(ctx: &mut PatientGenerationContext<'_>) -> SynthResult<()> {
    let knowledge = ctx.knowledge;
    for gate in [Gate::Hyperglycaemia, Gate::HypertensiveBloodPressure] {
        if !ctx.record.physiology.satisfies(gate, ctx.record.patient.sex) {
            continue;
        }
        let entry = knowledge.gated(gate).ok_or_else(|| {
            SynthError::InvalidCatalog(format!("no condition is gated on {gate:?}"))
        })?;
        if ctx.used.contains(&entry.id) {
            continue;
        }
        let onset = draw_onset(ctx)?;
        diagnose(ctx, entry, onset)?;
    }
    Ok(())
}

// ============================================================================
// Dates and outcomes
// ============================================================================

/// Uniform midnight in the onset window, capped at the current horizon.
fn draw_onset(ctx: &mut PatientGenerationContext<'_>) -> SynthResult<DateTime<Utc>> {
    let latest = ctx.horizon().date_naive();
    let earliest = days_before(ctx.reference_time.date_naive(), ONSET_WINDOW_DAYS as u64)?;
    let span = (latest - earliest).num_days().max(0) as u64;
    let back = ctx.rng.gen_range(0..=span);
    Ok(midnight(days_before(latest, back)?))
}

pub(crate) fn death_offset<R: Rng>(rng: &mut R, class: DeathClass) -> Offset {
    let long = |rng: &mut R, low: u32, high: u32| Offset {
        months: rng.gen_range(low..=high) + rng.gen_range(0..=11),
        days: rng.gen_range(0..=27),
        minutes: 0,
    };
    match class {
        DeathClass::Day => Offset::minutes(rng.gen_range(0..=24 * 60)),
        DeathClass::ThreeWeeks => Offset::days(rng.gen_range(15..=25)),
        DeathClass::TwoYears => long(rng, 12, 24),
        DeathClass::FourYears => long(rng, 36, 48),
        DeathClass::SevenYears => long(rng, 72, 84),
    }
}

pub(crate) fn recovery_offset<R: Rng>(rng: &mut R, class: RecoveryClass) -> Offset {
    match class {
        RecoveryClass::ThreeYears => Offset {
            months: rng.gen_range(24..=48) + rng.gen_range(0..=11),
            days: rng.gen_range(0..=27),
            minutes: 0,
        },
        RecoveryClass::SixMonths => Offset {
            months: rng.gen_range(5..=7),
            days: rng.gen_range(0..=20),
            minutes: 0,
        },
        RecoveryClass::ThreeMonths => Offset {
            months: rng.gen_range(2..=3),
            days: rng.gen_range(0..=20),
            minutes: 0,
        },
        RecoveryClass::Week => Offset::days(rng.gen_range(6..=10)),
    }
}

/// Resolve a condition `class`-long after its onset.
///
/// A resolution past the horizon is kept as a projected resolution instead.
pub(crate) fn resolve(
    ctx: &mut PatientGenerationContext<'_>,
    condition: ConditionId,
    class: RecoveryClass,
) -> SynthResult<()> {
    let Some(onset) = ctx.record.condition(condition).map(|c| c.onset) else {
        return Err(SynthError::UnknownCondition(condition));
    };
    let resolution = recovery_offset(&mut ctx.rng, class).after(onset)?;
    let horizon = ctx.horizon();
    if let Some(instance) = ctx.record.condition_mut(condition) {
        if resolution <= horizon {
            instance.abatement = Some(resolution);
            instance.projected_resolution = None;
        } else {
            instance.projected_resolution = Some(resolution);
        }
    }
    Ok(())
}

/// Record `entry` with onset `onset`, roll its outcome and schedule its care.
fn diagnose(
    ctx: &mut PatientGenerationContext<'_>,
    entry: &ConditionCatalogEntry,
    onset: DateTime<Utc>,
) -> SynthResult<()> {
    ctx.record.conditions.push(ConditionInstance {
        condition: entry.id,
        onset,
        abatement: None,
        fatal_at: None,
        projected_resolution: None,
    });
    ctx.used.insert(entry.id);

    if let Some(class) = entry.death_class {
        if ctx.chance(entry.mortality_chance) {
            let at = death_offset(&mut ctx.rng, class).after(onset)?;
            if at <= ctx.reference_time {
                if let Some(instance) = ctx.record.condition_mut(entry.id) {
                    instance.fatal_at = Some(at);
                }
                if ctx.record_death(at, entry.id) {
                    tracing::debug!("Condition {} kills the patient at {}", entry.id, at);
                }
            }
        }
    }

    let fatal = ctx
        .record
        .condition(entry.id)
        .is_some_and(|instance| instance.fatal_at.is_some());
    if !fatal && ctx.chance(entry.effective_abatement_chance()) {
        if let Some(class) = entry.recovery {
            resolve(ctx, entry.id, class)?;
        }
    }

    scheduler::schedule_condition(ctx, entry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demographics::Sex;
    use crate::knowledge::conditions::condition;
    use crate::knowledge::Knowledge;
    use crate::physiology::{BloodPressureClass, DrinkingStatus};
    use crate::record::blank_record;
    use chrono::TimeZone;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn context(knowledge: &Knowledge, seed: u64) -> PatientGenerationContext<'_> {
        let reference_time = Utc
            .with_ymd_and_hms(2025, 3, 14, 12, 0, 0)
            .single()
            .expect("valid timestamp");
        let mut record = blank_record(seed, reference_time);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        record
            .physiology
            .set_blood_pressure(&mut rng, BloodPressureClass::Normal);
        record.physiology.drinking = DrinkingStatus::NonDrinker;
        record.physiology.smoking = SmokingStatus::NeverSmoked;
        record.physiology.glucose_mg_dl = 90;
        PatientGenerationContext::new(knowledge, rng, record)
    }

    #[test]
    fn test_slot_with_no_eligible_entry_is_skipped() {
        let knowledge = Knowledge::new(
            vec![condition(80, "174.9", "Breast Cancer").gated(Gate::Female)],
            Vec::new(),
        )
        .expect("valid catalog");
        let mut ctx = context(&knowledge, 5);
        ctx.record.patient.sex = Sex::Male;

        build_timeline(&mut ctx, 3).expect("skipped slots are not an error");

        assert!(ctx.record.conditions.is_empty());
        assert!(ctx.record.encounters.is_empty());
        assert!(ctx.used.is_empty());
    }

    #[test]
    fn test_unreachable_entry_exhausts_the_draw_budget() {
        // Every proposal maps onto the already-used alcoholic cirrhosis for a heavy drinker,
        // while plain cirrhosis stays eligible but can never be proposed.
        let knowledge = Knowledge::new(
            vec![
                condition(47, "571.5", "Cirrhosis"),
                condition(78, "571.2", "Alcoholic Cirrhosis").gated(Gate::HeavyDrinker),
            ],
            Vec::new(),
        )
        .expect("valid catalog");
        let mut ctx = context(&knowledge, 6);
        ctx.record.physiology.drinking = DrinkingStatus::Heavy;
        ctx.used.insert(ALCOHOLIC_CIRRHOSIS);

        let result = fill_random_slot(&mut ctx, 2);

        assert!(matches!(
            result,
            Err(SynthError::RetryBudgetExhausted { slot: 2, attempts }) if attempts == MAX_DRAW_ATTEMPTS
        ));
        assert!(ctx.record.conditions.is_empty());
    }

    #[test]
    fn test_post_operative_entry_is_never_proposed() {
        let knowledge = Knowledge::new(
            vec![
                condition(3, "715.90", "Osteoarthritis"),
                condition(81, "998.59", "Post-operative Infection").gated(Gate::PostOperative),
            ],
            Vec::new(),
        )
        .expect("valid catalog");
        let mut ctx = context(&knowledge, 7);

        for _ in 0..500 {
            assert_eq!(propose(&mut ctx), Some(ConditionId(3)));
        }
    }

    #[test]
    fn test_slot_count_stays_in_table() {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        for _ in 0..1_000 {
            assert!(draw_slot_count(&mut rng) <= 7);
        }
    }

    #[test]
    fn test_day_class_dies_within_a_day() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        for _ in 0..200 {
            let offset = death_offset(&mut rng, DeathClass::Day);
            assert_eq!(offset.months, 0);
            assert!((0..=24 * 60).contains(&offset.minutes));
        }
    }

    #[test]
    fn test_recovery_offsets_are_bounded() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        for _ in 0..200 {
            let week = recovery_offset(&mut rng, RecoveryClass::Week);
            assert!((6..=10).contains(&week.days));
            let years = recovery_offset(&mut rng, RecoveryClass::ThreeYears);
            assert!((24..=59).contains(&years.months));
            let months = recovery_offset(&mut rng, RecoveryClass::ThreeMonths);
            assert!((2..=3).contains(&months.months) && months.days <= 20);
        }
    }

    #[test]
    fn test_seven_year_deaths_are_far_out() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for _ in 0..200 {
            let offset = death_offset(&mut rng, DeathClass::SevenYears);
            assert!((72..=95).contains(&offset.months));
        }
    }
}
