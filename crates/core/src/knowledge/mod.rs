//! Static knowledge tables.
//!
//! [`Knowledge`] bundles the condition and medication catalogs. It is validated once on
//! construction and then shared read-only (behind `Arc`) by every patient generation.

pub mod conditions;
pub mod medications;
pub mod names;

pub use conditions::{
    ConditionCatalogEntry, ConditionId, DeathClass, FollowUpPolicy, Gate, ProcedureFollowUp,
    ProcedureSpec, RecoveryClass, Screening, StayRange,
};
pub use medications::{
    DoseRate, MedicationCatalogEntry, MedicationId, RatePeriod, ResolvedRate,
};

use crate::{SynthError, SynthResult};
use std::collections::BTreeMap;

/// Validated condition and medication catalogs.
#[derive(Clone, Debug)]
pub struct Knowledge {
    conditions: Vec<ConditionCatalogEntry>,
    medications: Vec<MedicationCatalogEntry>,
    condition_index: BTreeMap<ConditionId, usize>,
    medication_index: BTreeMap<MedicationId, usize>,
}

impl Knowledge {
    /// The built-in catalogs (81 conditions, 46 medications).
    ///
    /// # Errors
    ///
    /// Returns `SynthError::InvalidCatalog` if the built-in tables are inconsistent.
    pub fn standard() -> SynthResult<Self> {
        Self::new(
            conditions::standard_conditions(),
            medications::standard_medications(),
        )
    }

    /// Build knowledge from explicit catalogs.
    ///
    /// # Errors
    ///
    /// Returns `SynthError::InvalidCatalog` if:
    /// - a condition or medication id is zero or repeated,
    /// - a condition links to a medication that does not exist,
    /// - a condition with a mortality chance has no time-to-death class,
    /// - a resolves-or-kills condition has no recovery class,
    /// - a condition with a procedure chance has no procedure,
    /// - a chance lies outside 0..=100,
    /// - a stay range is inverted,
    /// - two conditions share a mandatory gate.
    pub fn new(
        conditions: Vec<ConditionCatalogEntry>,
        medications: Vec<MedicationCatalogEntry>,
    ) -> SynthResult<Self> {
        let mut medication_index = BTreeMap::new();
        for (position, medication) in medications.iter().enumerate() {
            if medication.id.0 == 0 {
                return Err(SynthError::InvalidCatalog(
                    "medication id 0 is reserved for untreated conditions".into(),
                ));
            }
            if medication_index.insert(medication.id, position).is_some() {
                return Err(SynthError::InvalidCatalog(format!(
                    "duplicate medication id {}",
                    medication.id
                )));
            }
        }

        let mut condition_index = BTreeMap::new();
        let mut mandatory_gates = Vec::new();
        for (position, entry) in conditions.iter().enumerate() {
            validate_entry(entry, &medication_index)?;

            if condition_index.insert(entry.id, position).is_some() {
                return Err(SynthError::InvalidCatalog(format!(
                    "duplicate condition id {}",
                    entry.id
                )));
            }

            if entry.gate.is_mandatory() {
                if mandatory_gates.contains(&entry.gate) {
                    return Err(SynthError::InvalidCatalog(format!(
                        "more than one condition gated on {:?}",
                        entry.gate
                    )));
                }
                mandatory_gates.push(entry.gate);
            }
        }

        Ok(Self {
            conditions,
            medications,
            condition_index,
            medication_index,
        })
    }

    pub fn conditions(&self) -> &[ConditionCatalogEntry] {
        &self.conditions
    }

    pub fn medications(&self) -> &[MedicationCatalogEntry] {
        &self.medications
    }

    /// Look up a condition by id.
    ///
    /// # Errors
    ///
    /// Returns `SynthError::UnknownCondition` if the id is not in the catalog.
    pub fn condition(&self, id: ConditionId) -> SynthResult<&ConditionCatalogEntry> {
        self.condition_index
            .get(&id)
            .map(|&position| &self.conditions[position])
            .ok_or(SynthError::UnknownCondition(id))
    }

    /// Look up a medication by id.
    ///
    /// # Errors
    ///
    /// Returns `SynthError::UnknownMedication` if the id is not in the catalog.
    pub fn medication(&self, id: MedicationId) -> SynthResult<&MedicationCatalogEntry> {
        self.medication_index
            .get(&id)
            .map(|&position| &self.medications[position])
            .ok_or(SynthError::UnknownMedication(id))
    }

    pub fn contains_condition(&self, id: ConditionId) -> bool {
        self.condition_index.contains_key(&id)
    }

    /// The entry forced by a mandatory gate, if the catalog has one.
    pub fn gated(&self, gate: Gate) -> Option<&ConditionCatalogEntry> {
        self.conditions.iter().find(|entry| entry.gate == gate)
    }
}

fn validate_entry(
    entry: &ConditionCatalogEntry,
    medication_index: &BTreeMap<MedicationId, usize>,
) -> SynthResult<()> {
    let invalid = |reason: &str| {
        Err(SynthError::InvalidCatalog(format!(
            "condition {} ({}): {reason}",
            entry.id, entry.display
        )))
    };

    if entry.id.0 == 0 {
        return invalid("id 0 is not a valid condition id");
    }
    if let Some(medication) = entry.medication_id() {
        if !medication_index.contains_key(&medication) {
            return invalid(&format!("links to unknown medication {medication}"));
        }
    }
    if entry.mortality_chance > 0 && entry.death_class.is_none() {
        return invalid("mortality chance without a time-to-death class");
    }
    if entry.resolves_or_kills && entry.recovery.is_none() {
        return invalid("resolves-or-kills without a recovery class");
    }
    if entry.procedure_chance > 0 && entry.procedure.is_none() {
        return invalid("procedure chance without a procedure");
    }
    let chances = [
        entry.abatement_chance,
        entry.mortality_chance,
        entry.procedure_chance,
        entry.procedure_success,
    ];
    if chances.iter().any(|&chance| chance > 100) {
        return invalid("chance above 100 percent");
    }
    if entry.stay.min > entry.stay.max {
        return invalid("stay range is inverted");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::conditions::condition;
    use super::medications::medication;
    use super::*;

    fn one_medication() -> Vec<MedicationCatalogEntry> {
        vec![medication(
            1,
            "997224",
            Some("Aricept"),
            Some("Donepezil Hydrochloride 10mg Oral Tablet"),
            DoseRate::fixed(10.0, "mg", RatePeriod::Day),
        )]
    }

    fn expect_invalid(conditions: Vec<ConditionCatalogEntry>) -> String {
        match Knowledge::new(conditions, one_medication()) {
            Err(SynthError::InvalidCatalog(reason)) => reason,
            other => panic!("expected InvalidCatalog, got {other:?}"),
        }
    }

    #[test]
    fn test_standard_knowledge_is_valid() {
        let knowledge = Knowledge::standard().expect("standard tables should validate");
        assert_eq!(knowledge.conditions().len(), 81);
        assert_eq!(knowledge.medications().len(), 46);
        for entry in knowledge.conditions() {
            if let Some(id) = entry.medication_id() {
                knowledge.medication(id).expect("every link resolves");
            }
        }
        assert_eq!(
            knowledge.gated(Gate::PostOperative).map(|e| e.id),
            Some(conditions::POST_OPERATIVE_INFECTION)
        );
    }

    #[test]
    fn test_rejects_duplicate_condition_ids() {
        let reason = expect_invalid(vec![
            condition(3, "290.0", "Dementia").medication(1),
            condition(3, "290.0", "Dementia again"),
        ]);
        assert!(reason.contains("duplicate"), "reason: {reason}");
    }

    #[test]
    fn test_rejects_dangling_medication_link() {
        let reason = expect_invalid(vec![condition(3, "290.0", "Dementia").medication(9)]);
        assert!(reason.contains("unknown medication"), "reason: {reason}");
    }

    #[test]
    fn test_rejects_resolves_or_kills_without_recovery() {
        let reason = expect_invalid(vec![condition(8, "487.8", "Influenza").resolves_or_kills()]);
        assert!(reason.contains("recovery"), "reason: {reason}");
    }

    #[test]
    fn test_rejects_mortality_without_death_class() {
        let mut entry = condition(15, "492.8", "Emphysema");
        entry.mortality_chance = 30;
        let reason = expect_invalid(vec![entry]);
        assert!(reason.contains("time-to-death"), "reason: {reason}");
    }

    #[test]
    fn test_rejects_procedure_chance_without_procedure() {
        let mut entry = condition(49, "136.0", "Ainhum");
        entry.procedure_chance = 60;
        let reason = expect_invalid(vec![entry]);
        assert!(reason.contains("procedure"), "reason: {reason}");
    }

    #[test]
    fn test_unknown_lookups() {
        let knowledge = Knowledge::standard().expect("standard");
        assert!(matches!(
            knowledge.condition(ConditionId(500)),
            Err(SynthError::UnknownCondition(ConditionId(500)))
        ));
        assert!(matches!(
            knowledge.medication(MedicationId(0)),
            Err(SynthError::UnknownMedication(_))
        ));
    }
}
