//! Per-patient generation state.
//!
//! A [`PatientGenerationContext`] is created for each patient and threaded through the timeline
//! engine and the scheduler. It owns the random source and the record under construction, and
//! borrows the shared knowledge tables.

use crate::demographics::Death;
use crate::knowledge::{ConditionId, Knowledge};
use crate::record::{EncounterId, PatientRecord};
use chrono::{DateTime, Utc};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use std::collections::BTreeSet;

pub(crate) struct PatientGenerationContext<'k> {
    pub knowledge: &'k Knowledge,
    pub reference_time: DateTime<Utc>,
    pub rng: ChaCha8Rng,
    pub record: PatientRecord,
    pub used: BTreeSet<ConditionId>,
    next_encounter: u32,
}

impl<'k> PatientGenerationContext<'k> {
    pub fn new(knowledge: &'k Knowledge, rng: ChaCha8Rng, record: PatientRecord) -> Self {
        Self {
            knowledge,
            reference_time: record.reference_time,
            rng,
            record,
            used: BTreeSet::new(),
            next_encounter: 1,
        }
    }

    /// True with probability `percent`/100.
    pub fn chance(&mut self, percent: u8) -> bool {
        self.rng.gen_range(0..100u32) < u32::from(percent)
    }

    /// True with probability 1/`n`.
    pub fn one_in(&mut self, n: u32) -> bool {
        self.rng.gen_ratio(1, n)
    }

    pub fn horizon(&self) -> DateTime<Utc> {
        self.record.horizon()
    }

    /// Record a death caused by `cause` at `at`. The earliest death wins.
    ///
    /// Returns whether the recorded death changed.
    pub fn record_death(&mut self, at: DateTime<Utc>, cause: ConditionId) -> bool {
        let patient = &mut self.record.patient;
        match patient.death {
            Some(existing) if existing.at <= at => false,
            _ => {
                patient.death = Some(Death { at, cause });
                patient.active = false;
                true
            }
        }
    }

    pub fn next_encounter_id(&mut self) -> EncounterId {
        let id = EncounterId(self.next_encounter);
        self.next_encounter += 1;
        id
    }

    pub fn finish(self) -> (PatientRecord, ChaCha8Rng) {
        (self.record, self.rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::blank_record;
    use chrono::TimeZone;
    use rand::SeedableRng;

    fn at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, day, 0, 0, 0)
            .single()
            .expect("valid timestamp")
    }

    #[test]
    fn test_earliest_death_wins() {
        let knowledge = Knowledge::standard().expect("standard knowledge");
        let record = blank_record(11, at(2025, 3, 14));
        let mut ctx = PatientGenerationContext::new(&knowledge, ChaCha8Rng::seed_from_u64(11), record);

        assert!(ctx.record_death(at(2024, 9, 1), ConditionId(5)));
        assert!(!ctx.record.patient.active);
        assert!(ctx.record_death(at(2024, 2, 1), ConditionId(41)));
        assert!(!ctx.record_death(at(2024, 11, 1), ConditionId(22)));
        assert!(!ctx.record_death(at(2024, 2, 1), ConditionId(22)));

        let death = ctx.record.death().expect("patient should be deceased");
        assert_eq!(death.at, at(2024, 2, 1));
        assert_eq!(death.cause, ConditionId(41));
        assert_eq!(ctx.horizon(), at(2024, 2, 1));
    }

    #[test]
    fn test_encounter_ids_count_up_from_one() {
        let knowledge = Knowledge::standard().expect("standard knowledge");
        let record = blank_record(12, at(2025, 3, 14));
        let mut ctx = PatientGenerationContext::new(&knowledge, ChaCha8Rng::seed_from_u64(12), record);

        assert_eq!(ctx.next_encounter_id(), EncounterId(1));
        assert_eq!(ctx.next_encounter_id(), EncounterId(2));
    }
}
