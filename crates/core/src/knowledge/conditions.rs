//! The condition catalog.
//!
//! Each [`ConditionCatalogEntry`] is a static row describing one diagnosable condition: how long
//! it keeps the patient in hospital, how likely it is to resolve or kill, which procedure may be
//! performed for it and what follow-up care it implies. Entries are built with a small builder so
//! the table below reads one condition per block.

use super::medications::MedicationId;
use serde::Serialize;
use std::fmt;

/// Catalog identifier of a condition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ConditionId(pub u16);

impl fmt::Display for ConditionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub const HYPERTENSION: ConditionId = ConditionId(1);
pub const DIABETES: ConditionId = ConditionId(2);
pub const CONGESTIVE_HEART_FAILURE: ConditionId = ConditionId(5);
pub const CHRONIC_BRONCHITIS: ConditionId = ConditionId(10);
pub const EMPHYSEMA: ConditionId = ConditionId(15);
pub const PULMONARY_HEART_DISEASE: ConditionId = ConditionId(22);
pub const LUNG_CANCER: ConditionId = ConditionId(41);
pub const COLON_CANCER: ConditionId = ConditionId(42);
pub const UPPER_RESPIRATORY_TRACT_DISEASE: ConditionId = ConditionId(46);
pub const CIRRHOSIS: ConditionId = ConditionId(47);
pub const ALCOHOLIC_CIRRHOSIS: ConditionId = ConditionId(78);
pub const PROSTATE_CANCER: ConditionId = ConditionId(79);
pub const BREAST_CANCER: ConditionId = ConditionId(80);
pub const POST_OPERATIVE_INFECTION: ConditionId = ConditionId(81);

/// How long after onset a fatal condition kills.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeathClass {
    Day,
    ThreeWeeks,
    TwoYears,
    FourYears,
    SevenYears,
}

/// How long after onset a condition resolves.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecoveryClass {
    Week,
    ThreeMonths,
    SixMonths,
    ThreeYears,
}

/// Follow-up visit scheduled once a procedure was performed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProcedureFollowUp {
    WeekLater,
    CastRemoval,
}

/// Follow-up care implied by a diagnosis.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FollowUpPolicy {
    None,
    WeekLater,
    AfterProcedure(ProcedureFollowUp),
    Chemotherapy,
}

/// Patient attribute an entry depends on.
///
/// `Female`, `Male` and `HeavyDrinker` restrict which patients may draw the entry.
/// `Hyperglycaemia`, `HypertensiveBloodPressure` and `PostOperative` mark entries that are never
/// drawn at random: they are forced by the patient's physiology or procedure history.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Gate {
    None,
    Female,
    Male,
    HeavyDrinker,
    Hyperglycaemia,
    HypertensiveBloodPressure,
    PostOperative,
}

impl Gate {
    /// Gates whose entries are only ever forced, never drawn.
    pub fn is_mandatory(self) -> bool {
        matches!(
            self,
            Gate::Hyperglycaemia | Gate::HypertensiveBloodPressure | Gate::PostOperative
        )
    }
}

/// Screening examination performed shortly before a diagnosis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Screening {
    Mammography,
    Colonoscopy,
}

impl Screening {
    pub fn code(self) -> &'static str {
        match self {
            Screening::Mammography => "77056",
            Screening::Colonoscopy => "44388",
        }
    }

    pub fn display(self) -> &'static str {
        match self {
            Screening::Mammography => "Mammography",
            Screening::Colonoscopy => "Colonoscopy",
        }
    }
}

/// Inclusive range of overnight stays for the index encounter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StayRange {
    pub min: u16,
    pub max: u16,
}

/// Procedure that may be performed during the index encounter (CPT coded).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProcedureSpec {
    pub code: &'static str,
    pub name: &'static str,
    pub description: &'static str,
}

impl ProcedureSpec {
    pub const fn new(code: &'static str, name: &'static str, description: &'static str) -> Self {
        Self {
            code,
            name,
            description,
        }
    }
}

/// One row of the condition catalog.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConditionCatalogEntry {
    pub id: ConditionId,
    pub icd9: &'static str,
    pub display: &'static str,
    /// Linked medication; `MedicationId(0)` means the condition is untreated.
    pub medication: MedicationId,
    pub stay: StayRange,
    pub abatement_chance: u8,
    pub recovery: Option<RecoveryClass>,
    pub resolves_or_kills: bool,
    pub mortality_chance: u8,
    pub death_class: Option<DeathClass>,
    pub procedure_chance: u8,
    pub procedure_success: u8,
    pub procedure: Option<ProcedureSpec>,
    pub follow_up: FollowUpPolicy,
    pub common: bool,
    pub gate: Gate,
    pub screening: Option<Screening>,
}

/// Start a catalog entry with no treatment, no stay and no outcome.
pub fn condition(id: u16, icd9: &'static str, display: &'static str) -> ConditionCatalogEntry {
    ConditionCatalogEntry {
        id: ConditionId(id),
        icd9,
        display,
        medication: MedicationId(0),
        stay: StayRange { min: 0, max: 0 },
        abatement_chance: 0,
        recovery: None,
        resolves_or_kills: false,
        mortality_chance: 0,
        death_class: None,
        procedure_chance: 0,
        procedure_success: 0,
        procedure: None,
        follow_up: FollowUpPolicy::None,
        common: false,
        gate: Gate::None,
        screening: None,
    }
}

impl ConditionCatalogEntry {
    pub fn common(mut self) -> Self {
        self.common = true;
        self
    }

    pub fn gated(mut self, gate: Gate) -> Self {
        self.gate = gate;
        self
    }

    pub fn medication(mut self, id: u16) -> Self {
        self.medication = MedicationId(id);
        self
    }

    pub fn stay(mut self, min: u16, max: u16) -> Self {
        self.stay = StayRange { min, max };
        self
    }

    pub fn abatement(mut self, chance: u8) -> Self {
        self.abatement_chance = chance;
        self
    }

    pub fn recovery(mut self, class: RecoveryClass) -> Self {
        self.recovery = Some(class);
        self
    }

    pub fn resolves_or_kills(mut self) -> Self {
        self.resolves_or_kills = true;
        self
    }

    pub fn mortality(mut self, chance: u8, class: DeathClass) -> Self {
        self.mortality_chance = chance;
        self.death_class = Some(class);
        self
    }

    pub fn procedure(mut self, chance: u8, success: u8, spec: ProcedureSpec) -> Self {
        self.procedure_chance = chance;
        self.procedure_success = success;
        self.procedure = Some(spec);
        self
    }

    pub fn follow_up(mut self, policy: FollowUpPolicy) -> Self {
        self.follow_up = policy;
        self
    }

    pub fn screened_by(mut self, screening: Screening) -> Self {
        self.screening = Some(screening);
        self
    }

    /// The linked medication, if the condition is treated.
    pub fn medication_id(&self) -> Option<MedicationId> {
        (self.medication.0 != 0).then_some(self.medication)
    }

    /// Chance (percent) that the condition abates; resolves-or-kills conditions always do.
    pub fn effective_abatement_chance(&self) -> u8 {
        if self.resolves_or_kills {
            100
        } else {
            self.abatement_chance
        }
    }

    /// True for the liver diseases the drinking status decides between.
    pub fn is_liver_disease(&self) -> bool {
        self.id == CIRRHOSIS || self.id == ALCOHOLIC_CIRRHOSIS
    }
}

/// The standard catalog of 81 conditions.
pub fn standard_conditions() -> Vec<ConditionCatalogEntry> {
    vec![
        condition(1, "401.9", "Hypertension")
            .common()
            .gated(Gate::HypertensiveBloodPressure)
            .medication(8)
            .abatement(40)
            .recovery(RecoveryClass::SixMonths),
        condition(2, "250.00", "Diabetes")
            .common()
            .gated(Gate::Hyperglycaemia)
            .medication(4)
            .stay(1, 2),
        condition(3, "290.0", "Dementia").common().medication(1),
        condition(4, "482.9", "Bacterial Pneumonia")
            .common()
            .medication(2)
            .stay(4, 6)
            .abatement(100)
            .recovery(RecoveryClass::Week)
            .resolves_or_kills()
            .mortality(12, DeathClass::ThreeWeeks)
            .follow_up(FollowUpPolicy::WeekLater),
        condition(5, "428.0", "Congestive Heart Failure")
            .common()
            .medication(3)
            .stay(5, 7)
            .abatement(20)
            .recovery(RecoveryClass::SixMonths)
            .mortality(40, DeathClass::FourYears)
            .procedure(
                80,
                60,
                ProcedureSpec::new(
                    "34051",
                    "Arterial Embolectomy",
                    "Surgery to remove blockages from cardiovascular arteries and/or valves",
                ),
            )
            .follow_up(FollowUpPolicy::WeekLater),
        condition(6, "365.72", "Glaucoma")
            .common()
            .medication(5)
            .procedure(
                80,
                0,
                ProcedureSpec::new(
                    "66761",
                    "Iridotomy/Iridectomy by Laser Surgery",
                    "Laser eye surgery to reduce intraocular pressure",
                ),
            ),
        condition(7, "711.90", "Arthritis").common().medication(6),
        condition(8, "487.8", "Influenza")
            .common()
            .medication(7)
            .stay(3, 4)
            .abatement(100)
            .recovery(RecoveryClass::Week)
            .resolves_or_kills()
            .mortality(5, DeathClass::ThreeWeeks),
        condition(9, "733.01", "Osteoporosis")
            .common()
            .medication(9)
            .mortality(5, DeathClass::SevenYears)
            .procedure(
                20,
                0,
                ProcedureSpec::new(
                    "27220",
                    "Closed treatment of Acetabulum (Hip Socket) Fracture",
                    "Surgery to reset hip fracture",
                ),
            )
            .follow_up(FollowUpPolicy::AfterProcedure(ProcedureFollowUp::CastRemoval)),
        condition(10, "466.0", "Chronic Bronchitis")
            .common()
            .medication(18)
            .stay(4, 6)
            .abatement(40)
            .recovery(RecoveryClass::Week)
            .mortality(40, DeathClass::FourYears)
            .procedure(
                10,
                20,
                ProcedureSpec::new(
                    "32480",
                    "Lobectomy, Partial Removal of Lung",
                    "Surgery to remove damaged lung tissue",
                ),
            ),
        condition(11, "389.9", "Hearing Loss")
            .abatement(75)
            .recovery(RecoveryClass::ThreeMonths)
            .procedure(
                20,
                80,
                ProcedureSpec::new(
                    "69200",
                    "Removal of foreign body from external auditory canal",
                    "Surgery to remove blockages obstructing ear canal",
                ),
            ),
        condition(12, "535.00", "Gastritis")
            .medication(12)
            .stay(3, 4)
            .abatement(70)
            .recovery(RecoveryClass::Week)
            .mortality(3, DeathClass::TwoYears),
        condition(13, "244.9", "Hypothyroidism")
            .medication(13)
            .abatement(40)
            .recovery(RecoveryClass::SixMonths)
            .procedure(
                5,
                30,
                ProcedureSpec::new(
                    "60252",
                    "Partial Thyroidectomy",
                    "Surgery to remove parts or all of the thyroid",
                ),
            )
            .follow_up(FollowUpPolicy::AfterProcedure(ProcedureFollowUp::WeekLater)),
        condition(14, "285.9", "Anemia")
            .medication(14)
            .stay(4, 5)
            .abatement(80)
            .recovery(RecoveryClass::SixMonths)
            .mortality(5, DeathClass::TwoYears)
            .procedure(
                25,
                80,
                ProcedureSpec::new(
                    "36430",
                    "Blood Transfusion",
                    "Blood transfusion and stem cell transplant",
                ),
            ),
        condition(15, "492.8", "Emphysema")
            .medication(15)
            .stay(3, 5)
            .mortality(30, DeathClass::FourYears)
            .procedure(
                20,
                0,
                ProcedureSpec::new(
                    "32491",
                    "Lung Volume Reduction",
                    "Lung volume reduction surgery",
                ),
            )
            .follow_up(FollowUpPolicy::AfterProcedure(ProcedureFollowUp::WeekLater)),
        condition(16, "533.30", "Peptic Ulcer")
            .medication(16)
            .stay(6, 7)
            .abatement(80)
            .recovery(RecoveryClass::ThreeMonths)
            .procedure(
                5,
                50,
                ProcedureSpec::new(
                    "43631",
                    "Partial Gastrectomy",
                    "Widening/removing part of the stomach",
                ),
            )
            .follow_up(FollowUpPolicy::AfterProcedure(ProcedureFollowUp::WeekLater)),
        condition(17, "554.1", "Varicose Veins").medication(17).stay(5, 7),
        condition(18, "362.50", "Macular Degeneration")
            .medication(10)
            .procedure(
                5,
                0,
                ProcedureSpec::new(
                    "66985",
                    "Insertion of Intraocular Lens Prosthesis",
                    "Implanted miniature telescope in the patient's eye",
                ),
            ),
        condition(19, "274.9", "Gout")
            .medication(19)
            .stay(4, 6)
            .abatement(90)
            .recovery(RecoveryClass::SixMonths)
            .procedure(
                5,
                80,
                ProcedureSpec::new(
                    "27702",
                    "Ankle Replacement",
                    "Ankle replacement and uric acid crystal removal",
                ),
            ),
        condition(20, "564.00", "Constipation")
            .medication(20)
            .abatement(100)
            .recovery(RecoveryClass::Week),
        condition(21, "440.9", "Atherosclerosis")
            .medication(8)
            .stay(3, 5)
            .procedure(
                25,
                0,
                ProcedureSpec::new(
                    "33572",
                    "Coronary Endarterectomy",
                    "Surgery to remove plaque from arterial walls",
                ),
            )
            .follow_up(FollowUpPolicy::AfterProcedure(ProcedureFollowUp::WeekLater)),
        condition(22, "416.9", "Pulmonary Heart Disease")
            .medication(8)
            .stay(5, 7)
            .abatement(30)
            .recovery(RecoveryClass::SixMonths)
            .mortality(15, DeathClass::TwoYears)
            .procedure(
                15,
                30,
                ProcedureSpec::new(
                    "33910",
                    "Pulmonary Artery Embolectomy",
                    "Pulmonary Artery Embolectomy (Surgery to remove blockages and/or clots in the pulmonary system)",
                ),
            )
            .follow_up(FollowUpPolicy::AfterProcedure(ProcedureFollowUp::WeekLater)),
        condition(23, "530.81", "Esophageal Reflux")
            .medication(16)
            .abatement(70)
            .recovery(RecoveryClass::ThreeMonths)
            .procedure(
                30,
                90,
                ProcedureSpec::new(
                    "31760",
                    "Intrathoracic Tracheoplasty",
                    "Laparoscopic surgery to reinforce the passage between the esophagus and the stomach",
                ),
            )
            .follow_up(FollowUpPolicy::AfterProcedure(ProcedureFollowUp::WeekLater)),
        condition(24, "003.9", "Salmonella")
            .medication(21)
            .stay(3, 5)
            .abatement(100)
            .recovery(RecoveryClass::Week)
            .resolves_or_kills(),
        condition(25, "011.90", "Pulmonary Tuberculosis")
            .medication(22)
            .stay(15, 20)
            .abatement(80)
            .recovery(RecoveryClass::SixMonths)
            .mortality(20, DeathClass::ThreeWeeks)
            .procedure(
                10,
                30,
                ProcedureSpec::new(
                    "32140",
                    "Thoracotomy to remove bacteria-filled cyst",
                    "Surgery to remove pocket(s) of bacteria and repair lung damage",
                ),
            )
            .follow_up(FollowUpPolicy::AfterProcedure(ProcedureFollowUp::WeekLater)),
        condition(26, "265.0", "Beriberi")
            .medication(23)
            .abatement(100)
            .recovery(RecoveryClass::ThreeMonths),
        condition(27, "377.75", "Cortical Blindness").stay(1, 3),
        condition(28, "733.20", "Bone Cyst")
            .stay(4, 6)
            .abatement(90)
            .recovery(RecoveryClass::SixMonths)
            .procedure(
                10,
                90,
                ProcedureSpec::new(
                    "20615",
                    "Aspiration Treatment of Bone Cyst",
                    "Drained cyst and filled hole with bone chips from other locations within the patient",
                ),
            )
            .follow_up(FollowUpPolicy::AfterProcedure(ProcedureFollowUp::WeekLater)),
        condition(29, "814.00", "Carpal Bone Fracture")
            .stay(0, 1)
            .abatement(100)
            .recovery(RecoveryClass::ThreeMonths)
            .procedure(
                40,
                90,
                ProcedureSpec::new(
                    "26605",
                    "Reset Hand Fracture",
                    "Reset fractured hand bone",
                ),
            )
            .follow_up(FollowUpPolicy::AfterProcedure(ProcedureFollowUp::CastRemoval)),
        condition(30, "825.20", "Foot Fracture")
            .stay(0, 1)
            .abatement(100)
            .recovery(RecoveryClass::ThreeMonths)
            .procedure(
                40,
                90,
                ProcedureSpec::new(
                    "28435",
                    "Reset Foot Fracture",
                    "Reset fractured foot bone",
                ),
            )
            .follow_up(FollowUpPolicy::AfterProcedure(ProcedureFollowUp::CastRemoval)),
        condition(31, "541", "Appendicitis")
            .stay(3, 4)
            .abatement(100)
            .recovery(RecoveryClass::Week)
            .resolves_or_kills()
            .mortality(3, DeathClass::ThreeWeeks)
            .procedure(
                95,
                90,
                ProcedureSpec::new(
                    "44950",
                    "Appendectomy",
                    "Appendectomy",
                ),
            )
            .follow_up(FollowUpPolicy::AfterProcedure(ProcedureFollowUp::WeekLater)),
        condition(32, "943.01", "Forearm Burn")
            .stay(0, 2)
            .abatement(100)
            .recovery(RecoveryClass::Week),
        condition(33, "945.06", "Thigh Burn")
            .stay(2, 4)
            .abatement(100)
            .recovery(RecoveryClass::Week),
        condition(34, "004.2", "Shigella").stay(4, 5).abatement(90).recovery(RecoveryClass::Week),
        condition(35, "023.9", "Brucellosis")
            .medication(24)
            .stay(10, 15)
            .abatement(100)
            .recovery(RecoveryClass::SixMonths)
            .resolves_or_kills()
            .mortality(2, DeathClass::ThreeWeeks),
        condition(36, "033.0", "Whooping Cough (B. Pertussis)")
            .medication(25)
            .stay(3, 4)
            .abatement(100)
            .recovery(RecoveryClass::Week),
        condition(37, "081.9", "Typhus")
            .medication(2)
            .stay(3, 9)
            .abatement(100)
            .recovery(RecoveryClass::ThreeMonths)
            .resolves_or_kills()
            .mortality(30, DeathClass::ThreeWeeks)
            .follow_up(FollowUpPolicy::WeekLater),
        condition(38, "072.9", "Mumps").stay(3, 5).abatement(95).recovery(RecoveryClass::Week),
        condition(39, "272.4", "Hyperlipidemia")
            .medication(11)
            .abatement(70)
            .recovery(RecoveryClass::SixMonths)
            .procedure(
                20,
                95,
                ProcedureSpec::new(
                    "43847",
                    "Gastric Bypass",
                    "Gastric Bypass Surgery",
                ),
            )
            .follow_up(FollowUpPolicy::AfterProcedure(ProcedureFollowUp::WeekLater)),
        condition(40, "781.1", "Disturbances of Smell and Taste")
            .medication(11)
            .abatement(100)
            .recovery(RecoveryClass::SixMonths)
            .procedure(
                60,
                75,
                ProcedureSpec::new(
                    "97533",
                    "Sensory Integrative Techniques",
                    "Surgery to restore sensory pathways involving smell and taste",
                ),
            ),
        condition(41, "162.9", "Lung Cancer")
            .medication(29)
            .stay(5, 7)
            .abatement(15)
            .recovery(RecoveryClass::ThreeYears)
            .mortality(70, DeathClass::TwoYears)
            .procedure(
                40,
                20,
                ProcedureSpec::new(
                    "32503",
                    "Lung Tumor Removal",
                    "Surgery to remove tumors in the thoracic cavity",
                ),
            )
            .follow_up(FollowUpPolicy::Chemotherapy),
        condition(42, "153.9", "Colon Cancer")
            .medication(30)
            .stay(8, 10)
            .abatement(70)
            .recovery(RecoveryClass::ThreeYears)
            .mortality(50, DeathClass::TwoYears)
            .procedure(
                70,
                60,
                ProcedureSpec::new(
                    "44140",
                    "Partial Colectomy with Anastomosis",
                    "Colectomy (Surgery to remove a cancerous portion of the colon)",
                ),
            )
            .follow_up(FollowUpPolicy::Chemotherapy)
            .screened_by(Screening::Colonoscopy),
        condition(43, "172.9", "Skin Cancer (Melanoma)")
            .medication(31)
            .stay(4, 6)
            .abatement(95)
            .recovery(RecoveryClass::ThreeYears)
            .mortality(20, DeathClass::TwoYears)
            .procedure(
                75,
                98,
                ProcedureSpec::new(
                    "17311",
                    "Mohs Micrographic Technique",
                    "Mohs surgery (a form of skin grafting to replace cancerous skin cells)",
                ),
            ),
        condition(44, "585.3", "Chronic Kidney Disease")
            .stay(3, 5)
            .mortality(20, DeathClass::SevenYears)
            .procedure(
                10,
                0,
                ProcedureSpec::new(
                    "50360",
                    "Kidney Transplant",
                    "Kidney Transplant",
                ),
            ),
        condition(45, "155.2", "Liver Cancer")
            .medication(32)
            .stay(6, 8)
            .abatement(25)
            .recovery(RecoveryClass::ThreeYears)
            .mortality(85, DeathClass::FourYears)
            .procedure(
                25,
                40,
                ProcedureSpec::new(
                    "47120",
                    "Partial Hepatectomy",
                    "Hepatectomy (Surgery to remove a cancerous portion of the liver)",
                ),
            )
            .follow_up(FollowUpPolicy::Chemotherapy),
        condition(46, "478.9", "Upper Respiratory Tract Disease")
            .medication(15)
            .stay(0, 1)
            .abatement(90)
            .recovery(RecoveryClass::Week)
            .mortality(2, DeathClass::ThreeWeeks),
        condition(47, "571.5", "Cirrhosis of Liver")
            .medication(33)
            .stay(3, 5)
            .mortality(40, DeathClass::TwoYears)
            .procedure(
                20,
                50,
                ProcedureSpec::new(
                    "47136",
                    "Liver Transplant",
                    "Liver transplant",
                ),
            )
            .follow_up(FollowUpPolicy::AfterProcedure(ProcedureFollowUp::WeekLater)),
        condition(48, "117.3", "Aspergillosis")
            .medication(34)
            .stay(20, 30)
            .abatement(50)
            .recovery(RecoveryClass::ThreeYears)
            .mortality(60, DeathClass::TwoYears)
            .procedure(
                10,
                40,
                ProcedureSpec::new(
                    "32554",
                    "Thoracentesis",
                    "Thoracentesis (Surgery to drain and/or remove lung mass)",
                ),
            )
            .follow_up(FollowUpPolicy::AfterProcedure(ProcedureFollowUp::WeekLater)),
        condition(49, "136.0", "Ainhum")
            .procedure(
                60,
                30,
                ProcedureSpec::new(
                    "28820",
                    "Toe Amputation",
                    "Toe amputation",
                ),
            ),
        condition(50, "266.0", "Ariboflavinosis")
            .abatement(100)
            .recovery(RecoveryClass::ThreeMonths),
        condition(51, "276.2", "Acidosis")
            .medication(35)
            .stay(0, 1)
            .abatement(90)
            .recovery(RecoveryClass::ThreeYears)
            .mortality(5, DeathClass::TwoYears),
        condition(52, "041.00", "Streptococcus")
            .medication(36)
            .stay(0, 1)
            .abatement(100)
            .recovery(RecoveryClass::Week)
            .resolves_or_kills()
            .mortality(5, DeathClass::ThreeWeeks)
            .procedure(
                25,
                90,
                ProcedureSpec::new(
                    "42842",
                    "Tonsillectomy",
                    "Tonsillectomy to prevent future Strep Throat",
                ),
            )
            .follow_up(FollowUpPolicy::AfterProcedure(ProcedureFollowUp::WeekLater)),
        condition(53, "696.1", "Psoriasis").medication(37),
        condition(54, "204.90", "Lymphatic Leukemia")
            .medication(38)
            .stay(20, 35)
            .abatement(20)
            .recovery(RecoveryClass::ThreeYears)
            .mortality(75, DeathClass::FourYears)
            .follow_up(FollowUpPolicy::Chemotherapy),
        condition(55, "279.06", "Common Variable Immunodeficiency")
            .stay(3, 5)
            .abatement(5)
            .recovery(RecoveryClass::SixMonths)
            .procedure(
                30,
                75,
                ProcedureSpec::new(
                    "38241",
                    "Hematopoietic Progenitor Cell Transplantation",
                    "Bone Marrow/Stem Cell Transplant",
                ),
            )
            .follow_up(FollowUpPolicy::AfterProcedure(ProcedureFollowUp::WeekLater)),
        condition(56, "324.1", "Intraspinal Abscess")
            .abatement(85)
            .recovery(RecoveryClass::SixMonths)
            .procedure(
                60,
                95,
                ProcedureSpec::new(
                    "20005",
                    "Soft Tissue Drainage/Removal",
                    "Surgery to Remove Intraspinal Abscess",
                ),
            )
            .follow_up(FollowUpPolicy::WeekLater),
        condition(57, "324.0", "Intracranial Abscess")
            .abatement(85)
            .recovery(RecoveryClass::SixMonths)
            .procedure(
                60,
                95,
                ProcedureSpec::new(
                    "20005",
                    "Soft Tissue Drainage/Removal",
                    "Surgery to Remove Intracranial Abscess",
                ),
            )
            .follow_up(FollowUpPolicy::WeekLater),
        condition(58, "780.52", "Insomnia")
            .medication(39)
            .abatement(35)
            .recovery(RecoveryClass::SixMonths),
        condition(59, "346.70", "Chronic Migraines")
            .medication(40)
            .abatement(35)
            .recovery(RecoveryClass::SixMonths),
        condition(60, "345.90", "Epilepsy").medication(41).mortality(30, DeathClass::FourYears),
        condition(61, "360.60", "Foreign Body in Eye")
            .abatement(95)
            .recovery(RecoveryClass::Week)
            .mortality(2, DeathClass::ThreeWeeks)
            .procedure(
                95,
                95,
                ProcedureSpec::new(
                    "65210",
                    "Removal of Foreign Body from External Eye",
                    "Surgery to Remove Embedded Foreign Body in Eye",
                ),
            ),
        condition(62, "E819.0", "Injuries from a Motor Vehicle Accident")
            .stay(0, 2)
            .abatement(100)
            .recovery(RecoveryClass::Week)
            .resolves_or_kills()
            .mortality(10, DeathClass::Day)
            .follow_up(FollowUpPolicy::AfterProcedure(ProcedureFollowUp::WeekLater)),
        condition(63, "E880.9", "Injuries from a Fall on Stairs")
            .stay(0, 2)
            .abatement(100)
            .recovery(RecoveryClass::Week)
            .resolves_or_kills()
            .mortality(5, DeathClass::Day)
            .procedure(
                60,
                90,
                ProcedureSpec::new(
                    "27220",
                    "Closed treatment of Acetabulum (Hip Socket) Fracture",
                    "Surgery to reset hip fracture",
                ),
            )
            .follow_up(FollowUpPolicy::AfterProcedure(ProcedureFollowUp::WeekLater)),
        condition(64, "523.01", "Gingivitis").medication(42),
        condition(65, "692.70", "Dermatitis due to Sun Exposure").medication(15),
        condition(66, "737.30", "Scoliosis Idiopathic")
            .stay(2, 5)
            .procedure(
                50,
                0,
                ProcedureSpec::new(
                    "22802",
                    "Posterior Arthrodesis",
                    "Surgery to Correct Spine Curvature",
                ),
            )
            .follow_up(FollowUpPolicy::AfterProcedure(ProcedureFollowUp::WeekLater)),
        condition(67, "788.30", "Urinary Incontinence")
            .abatement(30)
            .recovery(RecoveryClass::SixMonths)
            .procedure(
                25,
                70,
                ProcedureSpec::new(
                    "53445",
                    "Insertion of Inflatable Urethral/Bladder Neck Sphincter",
                    "Insertion of Inflatable Urethral/Bladder Neck Sphincter",
                ),
            )
            .follow_up(FollowUpPolicy::WeekLater),
        condition(68, "432.9", "Intracranial Hemorrhaging")
            .stay(3, 10)
            .abatement(25)
            .recovery(RecoveryClass::SixMonths)
            .resolves_or_kills()
            .mortality(75, DeathClass::Day)
            .procedure(
                95,
                25,
                ProcedureSpec::new(
                    "61312",
                    "Craniectomy to Remove Hematoma",
                    "Craniectomy to Remove Hematoma",
                ),
            )
            .follow_up(FollowUpPolicy::WeekLater),
        condition(69, "388.70", "Otalgia (Earache)")
            .medication(43)
            .abatement(100)
            .recovery(RecoveryClass::Week),
        condition(70, "537.3", "Obstruction of Duodenum")
            .stay(4, 6)
            .abatement(100)
            .recovery(RecoveryClass::Week)
            .resolves_or_kills()
            .procedure(
                90,
                95,
                ProcedureSpec::new(
                    "44615",
                    "Intestinal Stricturoplasty",
                    "Surgery to remove Intestinal Blockage",
                ),
            ),
        condition(71, "550.90", "Inguinal Hernia")
            .stay(1, 2)
            .abatement(90)
            .recovery(RecoveryClass::Week)
            .procedure(
                95,
                90,
                ProcedureSpec::new(
                    "49650",
                    "Laparoscopic Surgery to Repair Inguinal Hernia",
                    "Laparoscopic Surgery to Repair Inguinal Hernia",
                ),
            )
            .follow_up(FollowUpPolicy::WeekLater),
        condition(72, "873.63", "Broken Tooth")
            .stay(0, 1)
            .abatement(100)
            .recovery(RecoveryClass::Week)
            .procedure(
                20,
                85,
                ProcedureSpec::new(
                    "41899",
                    "Root Canal",
                    "Root canal",
                ),
            ),
        condition(73, "787.20", "Dysphagia (Trouble Swallowing)")
            .stay(0, 1)
            .abatement(50)
            .recovery(RecoveryClass::ThreeMonths)
            .procedure(
                35,
                95,
                ProcedureSpec::new(
                    "43830",
                    "Gastrostomy (Feeding Tube)",
                    "Gastrostomy (Feeding Tube)",
                ),
            )
            .follow_up(FollowUpPolicy::AfterProcedure(ProcedureFollowUp::WeekLater)),
        condition(74, "599.0", "Urinary Tract Infection")
            .medication(44)
            .stay(2, 4)
            .abatement(90)
            .recovery(RecoveryClass::Week)
            .follow_up(FollowUpPolicy::WeekLater),
        condition(75, "434.90", "Stroke without Cerebral Infarction")
            .medication(45)
            .stay(4, 7)
            .abatement(75)
            .recovery(RecoveryClass::SixMonths)
            .mortality(40, DeathClass::Day)
            .procedure(
                75,
                10,
                ProcedureSpec::new(
                    "37195",
                    "Cerebral Thrombolysis by Intervention Fusion",
                    "Cerebral Thrombolysis by Intervention Fusion",
                ),
            )
            .follow_up(FollowUpPolicy::WeekLater),
        condition(76, "434.91", "Stroke with Cerebral Infarction")
            .medication(45)
            .stay(5, 8)
            .abatement(75)
            .recovery(RecoveryClass::ThreeYears)
            .mortality(60, DeathClass::Day)
            .procedure(
                95,
                5,
                ProcedureSpec::new(
                    "37195",
                    "Cerebral Thrombolysis by Intervention Fusion",
                    "Cerebral Thrombolysis by Intervention Fusion",
                ),
            )
            .follow_up(FollowUpPolicy::WeekLater),
        condition(77, "296.30", "Major Depressive Disorder").medication(46).abatement(60),
        condition(78, "571.2", "Alcoholic Cirrhosis of Liver")
            .gated(Gate::HeavyDrinker)
            .medication(33)
            .stay(5, 7)
            .mortality(40, DeathClass::TwoYears)
            .procedure(
                10,
                50,
                ProcedureSpec::new(
                    "47136",
                    "Liver Transplant",
                    "Liver transplant",
                ),
            )
            .follow_up(FollowUpPolicy::AfterProcedure(ProcedureFollowUp::WeekLater)),
        condition(79, "185", "Prostate Cancer")
            .gated(Gate::Male)
            .medication(27)
            .stay(2, 4)
            .abatement(90)
            .recovery(RecoveryClass::ThreeYears)
            .mortality(19, DeathClass::TwoYears)
            .procedure(
                75,
                98,
                ProcedureSpec::new(
                    "55810",
                    "Radical Prostatectomy",
                    "Radical Prostatectomy",
                ),
            )
            .follow_up(FollowUpPolicy::Chemotherapy),
        condition(80, "174.9", "Breast Cancer")
            .gated(Gate::Female)
            .medication(28)
            .stay(2, 3)
            .abatement(40)
            .recovery(RecoveryClass::ThreeYears)
            .mortality(24, DeathClass::TwoYears)
            .procedure(
                60,
                60,
                ProcedureSpec::new(
                    "19301",
                    "Partial Mastectomy",
                    "Mastectomy (Surgery to remove part or all of a cancerous breast)",
                ),
            )
            .follow_up(FollowUpPolicy::Chemotherapy)
            .screened_by(Screening::Mammography),
        condition(81, "998.59", "Post-Operative Infection")
            .gated(Gate::PostOperative)
            .medication(18)
            .stay(0, 2)
            .abatement(100)
            .recovery(RecoveryClass::Week)
            .resolves_or_kills()
            .mortality(5, DeathClass::ThreeWeeks)
            .procedure(
                5,
                95,
                ProcedureSpec::new(
                    "10180",
                    "Incision and Drainage of Postoperative Wound Infection",
                    "Incision and Drainage of Postoperative Wound Infection",
                ),
            )
            .follow_up(FollowUpPolicy::WeekLater),
    ]
}
