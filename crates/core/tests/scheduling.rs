mod common;

use chrono::{DateTime, Duration, Months, Utc};
use common::standard_generator;
use std::collections::BTreeMap;
use synth_core::calendar::{full_months_between, full_years_between, Offset};
use synth_core::knowledge::{FollowUpPolicy, ProcedureFollowUp};
use synth_core::record::{EncounterId, EncounterKind, FollowUpVisit};
use synth_core::PatientRecord;

const SEEDS: u64 = 300;

fn records() -> Vec<PatientRecord> {
    let generator = standard_generator();
    (0..SEEDS)
        .map(|seed| generator.generate(seed).expect("generation succeeds"))
        .collect()
}

fn months_after(from: DateTime<Utc>, months: u32) -> DateTime<Utc> {
    from.checked_add_months(Months::new(months))
        .expect("date in range")
}

fn within(actual: DateTime<Utc>, expected: DateTime<Utc>, tolerance: Duration) -> bool {
    actual >= expected - tolerance && actual <= expected + tolerance
}

#[test]
fn test_week_later_visits_start_five_to_ten_days_after_the_index_encounter() {
    let mut visits = 0;
    for record in records() {
        for encounter in &record.encounters {
            let EncounterKind::FollowUp { condition, visit } = encounter.kind else {
                continue;
            };
            if visit == FollowUpVisit::CastRemoval {
                continue;
            }
            let index = record
                .index_encounter(condition)
                .expect("follow-up has an index encounter");
            let gap = encounter.period.start() - index.period.end();
            assert!(
                (Duration::days(5)..=Duration::days(10)).contains(&gap),
                "seed {} follow-up {} starts {gap} after its index",
                record.seed,
                encounter.id
            );
            let length = encounter.period.end() - encounter.period.start();
            if !record.patient.is_deceased() {
                assert!((Duration::minutes(60)..=Duration::minutes(240)).contains(&length));
            }
            visits += 1;
        }
    }
    assert!(visits > 0);
}

#[test]
fn test_procedure_follow_ups_exist_only_after_a_procedure() {
    let generator = standard_generator();
    let knowledge = generator.knowledge();
    let mut postoperative = 0;

    for record in records() {
        for encounter in &record.encounters {
            let EncounterKind::FollowUp { condition, visit } = encounter.kind else {
                continue;
            };
            let entry = knowledge.condition(condition).expect("known condition");
            let index = record
                .index_encounter(condition)
                .expect("follow-up has an index encounter");
            let operated = record
                .procedures
                .iter()
                .any(|p| p.condition == condition && p.encounter == index.id);

            match visit {
                FollowUpVisit::CheckUp => {
                    assert_eq!(entry.follow_up, FollowUpPolicy::WeekLater, "seed {}", record.seed);
                }
                FollowUpVisit::Postoperative => {
                    assert_eq!(
                        entry.follow_up,
                        FollowUpPolicy::AfterProcedure(ProcedureFollowUp::WeekLater)
                    );
                    assert!(operated, "seed {} post-operative visit without surgery", record.seed);
                    postoperative += 1;
                }
                FollowUpVisit::CastRemoval => {
                    assert_eq!(
                        entry.follow_up,
                        FollowUpPolicy::AfterProcedure(ProcedureFollowUp::CastRemoval)
                    );
                    assert!(operated, "seed {} cast removal without a cast", record.seed);
                    let start = encounter.period.start();
                    assert!(start >= months_after(index.period.end(), 1));
                    assert!(start <= months_after(index.period.end(), 2) + Duration::days(30));
                }
            }
        }

        // Survivors get the post-operative visit whenever it falls before the reference time.
        if record.patient.is_deceased() {
            continue;
        }
        for procedure in &record.procedures {
            let entry = knowledge.condition(procedure.condition).expect("known condition");
            if entry.follow_up != FollowUpPolicy::AfterProcedure(ProcedureFollowUp::WeekLater) {
                continue;
            }
            let index = record
                .encounter(procedure.encounter)
                .expect("procedure encounter exists");
            if index.period.end() + Duration::days(10) > record.reference_time {
                continue;
            }
            assert!(
                record.encounters.iter().any(|e| e.kind
                    == EncounterKind::FollowUp {
                        condition: procedure.condition,
                        visit: FollowUpVisit::Postoperative,
                    }),
                "seed {} surgery without its follow-up",
                record.seed
            );
        }
    }
    assert!(postoperative > 0);
}

#[test]
fn test_chemotherapy_runs_one_cycle_per_elapsed_month() {
    let mut treated = 0;
    for record in records() {
        let mut cycles: BTreeMap<_, Vec<(u32, DateTime<Utc>)>> = BTreeMap::new();
        for encounter in &record.encounters {
            if let EncounterKind::Chemotherapy { condition, cycle } = encounter.kind {
                cycles
                    .entry(condition)
                    .or_default()
                    .push((cycle, encounter.period.start()));
            }
        }

        for (condition, mut given) in cycles {
            given.sort();
            let onset = record.condition(condition).expect("treated condition").onset;
            let months = full_months_between(onset, record.reference_time);

            let numbers: Vec<u32> = given.iter().map(|(cycle, _)| *cycle).collect();
            let expected: Vec<u32> = (1..=numbers.len() as u32).collect();
            assert_eq!(numbers, expected, "seed {} cycles are not consecutive", record.seed);
            assert!(numbers.len() as u32 <= months);
            if !record.patient.is_deceased() {
                // The last cycle may be jittered past the reference time.
                assert!(numbers.len() as u32 + 1 >= months, "seed {}", record.seed);
            }

            for (cycle, start) in given {
                assert!(
                    within(start, months_after(onset, cycle), Duration::days(2)),
                    "seed {} cycle {cycle} at {start}",
                    record.seed
                );
            }
            treated += 1;
        }
    }
    assert!(treated > 0);
}

#[test]
fn test_readmissions_follow_eligible_index_encounters_about_a_month_later() {
    let mut readmitted = 0;
    for record in records() {
        let mut per_original: BTreeMap<EncounterId, usize> = BTreeMap::new();
        for encounter in &record.encounters {
            let EncounterKind::Readmission {
                condition,
                original,
            } = encounter.kind
            else {
                continue;
            };
            let index = record.encounter(original).expect("original encounter kept");
            assert_eq!(index.kind, EncounterKind::Index { condition });
            assert!(index.readmission_eligible, "seed {}", record.seed);
            assert!(
                within(
                    encounter.period.start(),
                    months_after(index.period.end(), 1),
                    Duration::days(10)
                ),
                "seed {} readmission {} too far from its original",
                record.seed,
                encounter.id
            );
            *per_original.entry(original).or_default() += 1;
            readmitted += 1;
        }
        assert!(per_original.values().all(|&count| count == 1), "seed {}", record.seed);

        if record.patient.is_deceased() {
            continue;
        }
        for index in record.encounters.iter().filter(|e| e.readmission_eligible) {
            let latest = months_after(index.period.end(), 1) + Duration::days(10);
            if latest <= record.reference_time {
                assert!(per_original.contains_key(&index.id), "seed {}", record.seed);
            }
        }
    }
    assert!(readmitted > 0);
}

#[test]
fn test_successful_procedures_resolve_open_conditions() {
    let generator = standard_generator();
    let knowledge = generator.knowledge();
    let mut cured = 0;

    for record in records() {
        for procedure in record.procedures.iter().filter(|p| p.successful) {
            let entry = knowledge.condition(procedure.condition).expect("known condition");
            let instance = record
                .condition(procedure.condition)
                .expect("operated condition kept");
            if entry.recovery.is_none() || instance.fatal_at.is_some() {
                continue;
            }
            assert!(
                instance.abatement.is_some() || instance.projected_resolution.is_some(),
                "seed {} condition {} stays open after a successful procedure",
                record.seed,
                procedure.condition
            );
            if entry.effective_abatement_chance() < 100 {
                cured += 1;
            }
        }
    }
    assert!(cured > 0);
}

#[test]
fn test_yearly_physicals_repeat_every_year_up_to_the_horizon() {
    for record in records() {
        let physicals = record.yearly_physicals();
        let first = physicals.first().expect("at least one yearly physical");
        let earliest = first.period.start();

        if let Some(onset) = record.conditions.iter().map(|c| c.onset).min() {
            let two_months = Offset {
                months: 2,
                days: 0,
                minutes: 0,
            };
            assert!(earliest <= two_months.before(onset).expect("date in range"));
        }

        let years = full_years_between(earliest, record.horizon());
        let count = physicals.len() as u32;
        // The final year's jitter may push it past the horizon.
        assert!(count == years + 1 || count == years, "seed {}", record.seed);

        for (position, physical) in physicals.iter().enumerate() {
            let year = position as u32;
            assert_eq!(physical.kind, EncounterKind::YearlyPhysical { year }, "seed {}", record.seed);
            let tolerance = if year == 0 {
                Duration::zero()
            } else {
                Duration::days(10)
            };
            assert!(within(
                physical.period.start(),
                months_after(earliest, year * 12),
                tolerance
            ));
            assert!(physical.period.start() <= record.horizon());
        }
    }
}
