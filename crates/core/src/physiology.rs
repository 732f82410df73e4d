//! Baseline physiology, observations and allergies.
//!
//! Every metric is drawn from a range selected by a class label (blood-pressure class,
//! cholesterol class, body size, fall risk). Two of those draws feed the condition timeline:
//! a glucose level at or above the diabetes threshold forces Diabetes, and the Hypertension
//! blood-pressure class forces Hypertension.
//!
//! Observations are created before any encounter exists. Once the record is final,
//! [`attribute_observations`] assigns each one to the encounter that recorded it and fixes its
//! applies-period.

use crate::constants::{ALLERGY_PERCENT, DIABETES_GLUCOSE_THRESHOLD};
use crate::demographics::{Patient, Sex};
use crate::knowledge::Gate;
use crate::record::{EncounterId, PatientRecord};
use crate::{Knowledge, SynthResult};
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::Serialize;
use synth_types::Period;

// ============================================================================
// Class labels
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum SmokingStatus {
    Smoker,
    NeverSmoked,
    ExSmoker,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum DrinkingStatus {
    Casual,
    Heavy,
    NonDrinker,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum BloodPressureClass {
    Normal,
    PreHypertension,
    Hypertension,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum CholesterolClass {
    Optimal,
    NearOptimal,
    Borderline,
    High,
    VeryHigh,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum BodySize {
    Small,
    Medium,
    Large,
    ExtraLarge,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum FallRisk {
    High,
    Medium,
    Low,
}

/// Whether each parent had a condition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ParentalHistory {
    pub diabetes: [bool; 2],
    pub hypertension: [bool; 2],
    pub cancer: [bool; 2],
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Physiology {
    pub parents: ParentalHistory,
    pub smoking: SmokingStatus,
    pub drinking: DrinkingStatus,
    pub blood_pressure: BloodPressureClass,
    pub systolic_mmhg: u32,
    pub diastolic_mmhg: u32,
    pub cholesterol: CholesterolClass,
    pub ldl_mg_dl: u32,
    pub hdl_mg_dl: u32,
    pub triglycerides_mg_dl: u32,
    pub body_size: BodySize,
    pub height_in: u32,
    pub weight_lb: u32,
    pub glucose_mg_dl: u32,
    pub fall_risk: FallRisk,
}

impl Physiology {
    pub fn weight_kg(&self) -> f64 {
        f64::from(self.weight_lb) * 0.453_592_37
    }

    pub fn height_m(&self) -> f64 {
        f64::from(self.height_in) * 0.0254
    }

    /// Body mass index rounded to one decimal.
    pub fn bmi(&self) -> f64 {
        let height = self.height_m();
        (self.weight_kg() / (height * height) * 10.0).round() / 10.0
    }

    pub fn is_hyperglycaemic(&self) -> bool {
        self.glucose_mg_dl >= DIABETES_GLUCOSE_THRESHOLD
    }

    pub fn is_hypertensive(&self) -> bool {
        self.blood_pressure == BloodPressureClass::Hypertension
    }

    pub fn is_heavy_drinker(&self) -> bool {
        self.drinking == DrinkingStatus::Heavy
    }

    /// Whether a patient with this physiology and `sex` satisfies `gate`.
    ///
    /// `PostOperative` depends on procedure history, not physiology, and is never satisfied here.
    pub fn satisfies(&self, gate: Gate, sex: Sex) -> bool {
        match gate {
            Gate::None => true,
            Gate::Female => sex == Sex::Female,
            Gate::Male => sex == Sex::Male,
            Gate::HeavyDrinker => self.is_heavy_drinker(),
            Gate::Hyperglycaemia => self.is_hyperglycaemic(),
            Gate::HypertensiveBloodPressure => self.is_hypertensive(),
            Gate::PostOperative => false,
        }
    }

    /// Replace the blood-pressure class, redrawing both readings from the class's ranges.
    pub fn set_blood_pressure<R: Rng>(&mut self, rng: &mut R, class: BloodPressureClass) {
        let (systolic, diastolic) = blood_pressure_readings(rng, class);
        self.blood_pressure = class;
        self.systolic_mmhg = systolic;
        self.diastolic_mmhg = diastolic;
    }
}

fn weighted<R: Rng, T: Copy>(rng: &mut R, table: &[T]) -> T {
    table[rng.gen_range(0..table.len())]
}

fn blood_pressure_readings<R: Rng>(rng: &mut R, class: BloodPressureClass) -> (u32, u32) {
    match class {
        BloodPressureClass::Normal => (rng.gen_range(100..=119), rng.gen_range(65..=79)),
        BloodPressureClass::PreHypertension => (rng.gen_range(120..=139), rng.gen_range(80..=89)),
        BloodPressureClass::Hypertension => (rng.gen_range(140..=180), rng.gen_range(90..=110)),
    }
}

/// Height (inches) and weight (pounds) ranges by sex and body size.
fn body_ranges(sex: Sex, size: BodySize) -> ((u32, u32), (u32, u32)) {
    match (sex, size) {
        (Sex::Male, BodySize::Small) => ((60, 65), (100, 140)),
        (Sex::Male, BodySize::Medium) => ((65, 70), (140, 180)),
        (Sex::Male, BodySize::Large) => ((70, 75), (180, 230)),
        (Sex::Male, BodySize::ExtraLarge) => ((75, 80), (230, 300)),
        (Sex::Female, BodySize::Small) => ((55, 60), (80, 120)),
        (Sex::Female, BodySize::Medium) => ((60, 65), (120, 160)),
        (Sex::Female, BodySize::Large) => ((65, 70), (160, 200)),
        (Sex::Female, BodySize::ExtraLarge) => ((70, 75), (200, 250)),
    }
}

/// Draw baseline physiology for a patient of the given sex.
pub(crate) fn draw_physiology<R: Rng>(rng: &mut R, sex: Sex) -> Physiology {
    let parents = ParentalHistory {
        diabetes: [rng.gen_ratio(1, 5), rng.gen_ratio(1, 5)],
        hypertension: [rng.gen_ratio(1, 4), rng.gen_ratio(1, 4)],
        cancer: [rng.gen_ratio(1, 4), rng.gen_ratio(1, 4)],
    };

    use SmokingStatus::*;
    let smoking = weighted(rng, &[Smoker, Smoker, NeverSmoked, NeverSmoked, NeverSmoked, ExSmoker]);

    use DrinkingStatus::*;
    let drinking = weighted(rng, &[Casual, Casual, Casual, Casual, Heavy, NonDrinker]);

    use BloodPressureClass::*;
    let blood_pressure = if parents.hypertension == [true, true] {
        weighted(
            rng,
            &[Normal, PreHypertension, PreHypertension, PreHypertension, Hypertension, Hypertension, Hypertension],
        )
    } else {
        weighted(
            rng,
            &[Normal, Normal, Normal, PreHypertension, PreHypertension, Hypertension, Hypertension],
        )
    };
    let (systolic_mmhg, diastolic_mmhg) = blood_pressure_readings(rng, blood_pressure);

    use CholesterolClass::*;
    let cholesterol = weighted(
        rng,
        &[Optimal, Optimal, Optimal, NearOptimal, Borderline, Borderline, High, VeryHigh],
    );
    let (ldl_mg_dl, hdl_mg_dl, triglycerides_mg_dl) = match cholesterol {
        Optimal => (rng.gen_range(80..=99), rng.gen_range(60..=69), rng.gen_range(100..=139)),
        NearOptimal => (rng.gen_range(100..=129), rng.gen_range(50..=59), rng.gen_range(140..=159)),
        Borderline => (rng.gen_range(130..=159), rng.gen_range(40..=60), rng.gen_range(160..=199)),
        High => (rng.gen_range(160..=189), rng.gen_range(40..=49), rng.gen_range(200..=299)),
        VeryHigh => (rng.gen_range(190..=220), rng.gen_range(30..=39), rng.gen_range(300..=399)),
    };

    let body_size = weighted(
        rng,
        &[BodySize::Small, BodySize::Medium, BodySize::Large, BodySize::ExtraLarge],
    );
    let ((height_lo, height_hi), (weight_lo, weight_hi)) = body_ranges(sex, body_size);
    let height_in = rng.gen_range(height_lo..=height_hi);
    let weight_lb = rng.gen_range(weight_lo..=weight_hi);

    let glucose_mg_dl = if parents.diabetes == [true, true] {
        rng.gen_range(180..=250)
    } else {
        rng.gen_range(10..=230)
    };

    let fall_risk = weighted(
        rng,
        &[
            FallRisk::High,
            FallRisk::Medium,
            FallRisk::Medium,
            FallRisk::Low,
            FallRisk::Low,
            FallRisk::Low,
            FallRisk::Low,
        ],
    );

    Physiology {
        parents,
        smoking,
        drinking,
        blood_pressure,
        systolic_mmhg,
        diastolic_mmhg,
        cholesterol,
        ldl_mg_dl,
        hdl_mg_dl,
        triglycerides_mg_dl,
        body_size,
        height_in,
        weight_lb,
        glucose_mg_dl,
        fall_risk,
    }
}

// ============================================================================
// Observations
// ============================================================================

/// Every metric recorded for a patient.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum ObservationKind {
    SmokingStatus,
    DrinkingStatus,
    SystolicBloodPressure,
    DiastolicBloodPressure,
    Ldl,
    Hdl,
    Triglycerides,
    Age,
    Height,
    Weight,
    BodyMassIndex,
    Glucose,
    FallHistory,
    FallRiskTest,
}

/// Which encounter records an observation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Recorder {
    FirstPhysical,
    AnyPhysical,
    /// The index encounter of the condition forced by this gate, else any physical.
    Diagnosis(Gate),
}

impl ObservationKind {
    /// SNOMED CT code and display of the measured property.
    pub fn code(self) -> (&'static str, &'static str) {
        match self {
            ObservationKind::SmokingStatus => ("229819007", "Smoking Status"),
            ObservationKind::DrinkingStatus => ("228273003", "Drinking Status"),
            ObservationKind::SystolicBloodPressure => ("271649006", "Systolic Blood Pressure"),
            ObservationKind::DiastolicBloodPressure => ("271650006", "Diastolic Blood Pressure"),
            ObservationKind::Ldl => ("314036004", "Plasma LDL Cholesterol Measurement"),
            ObservationKind::Hdl => ("314035000", "Plasma HDL Cholesterol Measurement"),
            ObservationKind::Triglycerides => ("167082000", "Plasma Triglyceride Measurement"),
            ObservationKind::Age => ("397669002", "Age"),
            ObservationKind::Height => ("248327008", "Height"),
            ObservationKind::Weight => ("27113001", "Body Weight"),
            ObservationKind::BodyMassIndex => ("60621009", "Body Mass Index"),
            ObservationKind::Glucose => ("33747003", "Blood Glucose Level"),
            ObservationKind::FallHistory => ("161898004", "Falls History"),
            ObservationKind::FallRiskTest => ("282944008", "Ability to Bend to Pick Up Object"),
        }
    }

    pub fn recorder(self) -> Recorder {
        match self {
            ObservationKind::Age
            | ObservationKind::Height
            | ObservationKind::Weight
            | ObservationKind::BodyMassIndex => Recorder::FirstPhysical,
            ObservationKind::Glucose => Recorder::Diagnosis(Gate::Hyperglycaemia),
            ObservationKind::SystolicBloodPressure | ObservationKind::DiastolicBloodPressure => {
                Recorder::Diagnosis(Gate::HypertensiveBloodPressure)
            }
            _ => Recorder::AnyPhysical,
        }
    }

    /// Laboratory results; everything else is a vital sign or social history.
    pub fn is_laboratory(self) -> bool {
        matches!(
            self,
            ObservationKind::Ldl
                | ObservationKind::Hdl
                | ObservationKind::Triglycerides
                | ObservationKind::Glucose
        )
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum ObservationValue {
    Quantity {
        value: f64,
        unit: &'static str,
        ucum: &'static str,
    },
    Coded {
        code: &'static str,
        display: &'static str,
    },
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Observation {
    pub kind: ObservationKind,
    pub value: ObservationValue,
    pub recorded_by: Option<EncounterId>,
    pub applies: Option<Period>,
}

impl Observation {
    fn quantity(kind: ObservationKind, value: f64, unit: &'static str, ucum: &'static str) -> Self {
        Self {
            kind,
            value: ObservationValue::Quantity { value, unit, ucum },
            recorded_by: None,
            applies: None,
        }
    }

    fn coded(kind: ObservationKind, code: &'static str, display: &'static str) -> Self {
        Self {
            kind,
            value: ObservationValue::Coded { code, display },
            recorded_by: None,
            applies: None,
        }
    }
}

/// The fixed set of baseline observations for a patient.
pub(crate) fn baseline_observations(
    physiology: &Physiology,
    patient: &Patient,
    reference_time: DateTime<Utc>,
) -> Vec<Observation> {
    let smoking = match physiology.smoking {
        SmokingStatus::Smoker => ("77176002", "Smoker"),
        SmokingStatus::NeverSmoked => ("266919005", "Never Smoked Tobacco"),
        SmokingStatus::ExSmoker => ("8517006", "Ex-Smoker"),
    };
    let drinking = match physiology.drinking {
        DrinkingStatus::Casual => ("228276006", "Drinks Casually/Occasionally"),
        DrinkingStatus::Heavy => ("86933000", "Heavy Drinker"),
        DrinkingStatus::NonDrinker => ("105543003", "Non-Drinker"),
    };
    let (fall_history, bend_test) = match physiology.fall_risk {
        FallRisk::High => (
            ("298347004", "Falls Frequently"),
            ("282945009", "Can Not Bend to Pick Up Object Without Falling"),
        ),
        FallRisk::Medium => (
            ("298347004", "Falls Infrequently"),
            ("282946005", "Difficulty Bending to Pick Up Object Without Falling"),
        ),
        FallRisk::Low => (
            ("298345007", "Does Not Fall"),
            ("282944008", "Can Bend to Pick Up Object Without Falling"),
        ),
    };
    let age = patient.age_on(reference_time.date_naive());

    vec![
        Observation::coded(ObservationKind::SmokingStatus, smoking.0, smoking.1),
        Observation::coded(ObservationKind::DrinkingStatus, drinking.0, drinking.1),
        Observation::quantity(
            ObservationKind::SystolicBloodPressure,
            f64::from(physiology.systolic_mmhg),
            "mmHg",
            "mm[Hg]",
        ),
        Observation::quantity(
            ObservationKind::DiastolicBloodPressure,
            f64::from(physiology.diastolic_mmhg),
            "mmHg",
            "mm[Hg]",
        ),
        Observation::quantity(ObservationKind::Ldl, f64::from(physiology.ldl_mg_dl), "mg/dL", "mg/dL"),
        Observation::quantity(ObservationKind::Hdl, f64::from(physiology.hdl_mg_dl), "mg/dL", "mg/dL"),
        Observation::quantity(
            ObservationKind::Triglycerides,
            f64::from(physiology.triglycerides_mg_dl),
            "mg/dL",
            "mg/dL",
        ),
        Observation::quantity(ObservationKind::Age, f64::from(age), "years", "a"),
        Observation::quantity(ObservationKind::Height, f64::from(physiology.height_in), "inches", "[in_i]"),
        Observation::quantity(ObservationKind::Weight, f64::from(physiology.weight_lb), "pounds", "[lb_av]"),
        Observation::quantity(ObservationKind::BodyMassIndex, physiology.bmi(), "kg/m2", "kg/m2"),
        Observation::quantity(
            ObservationKind::Glucose,
            f64::from(physiology.glucose_mg_dl),
            "mg/dL",
            "mg/dL",
        ),
        Observation::coded(ObservationKind::FallHistory, fall_history.0, fall_history.1),
        Observation::coded(ObservationKind::FallRiskTest, bend_test.0, bend_test.1),
    ]
}

// ============================================================================
// Allergies
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum AllergySubstance {
    Mold,
    Bees,
    Latex,
    Penicillin,
}

impl AllergySubstance {
    pub fn code(self) -> &'static str {
        match self {
            AllergySubstance::Mold => "419474003",
            AllergySubstance::Bees => "424213003",
            AllergySubstance::Latex => "300916003",
            AllergySubstance::Penicillin => "91936005",
        }
    }

    pub fn display(self) -> &'static str {
        match self {
            AllergySubstance::Mold => "Allergy to Mold",
            AllergySubstance::Bees => "Allergy to Bees",
            AllergySubstance::Latex => "Allergy to Latex",
            AllergySubstance::Penicillin => "Allergy to Penicillin",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum AllergyCriticality {
    Low,
    High,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Allergy {
    pub substance: AllergySubstance,
    pub criticality: AllergyCriticality,
    pub recorded: Option<DateTime<Utc>>,
}

/// Draw the patient's allergy, if any.
pub(crate) fn draw_allergy<R: Rng>(rng: &mut R) -> Option<Allergy> {
    if rng.gen_range(0..100) >= ALLERGY_PERCENT {
        return None;
    }
    let substance = weighted(
        rng,
        &[
            AllergySubstance::Mold,
            AllergySubstance::Bees,
            AllergySubstance::Latex,
            AllergySubstance::Penicillin,
        ],
    );
    let criticality = if rng.gen_bool(0.5) {
        AllergyCriticality::Low
    } else {
        AllergyCriticality::High
    };
    Some(Allergy {
        substance,
        criticality,
        recorded: None,
    })
}

// ============================================================================
// Attribution
// ============================================================================

/// Assign every observation to the encounter that recorded it and fix its applies-period.
///
/// Runs after the mortality filter, so only surviving encounters are considered. The
/// applies-period runs from the recording encounter's start to the record's horizon. An
/// observation with no surviving recorder keeps neither.
pub(crate) fn attribute_observations<R: Rng>(
    record: &mut PatientRecord,
    knowledge: &Knowledge,
    rng: &mut R,
) -> SynthResult<()> {
    let horizon = record.horizon();
    let physicals: Vec<(EncounterId, DateTime<Utc>)> = record
        .yearly_physicals()
        .into_iter()
        .map(|e| (e.id, e.period.start()))
        .collect();
    let diagnosis_encounter = |gate: Gate| {
        knowledge
            .gated(gate)
            .and_then(|entry| record.index_encounter(entry.id))
            .map(|e| (e.id, e.period.start()))
    };
    let glucose_recorder = diagnosis_encounter(Gate::Hyperglycaemia);
    let pressure_recorder = diagnosis_encounter(Gate::HypertensiveBloodPressure);

    let mut assignments = Vec::with_capacity(record.observations.len());
    for observation in &record.observations {
        let any_physical = (!physicals.is_empty())
            .then(|| physicals[rng.gen_range(0..physicals.len())]);
        let recorder = match observation.kind.recorder() {
            Recorder::FirstPhysical => physicals.first().copied(),
            Recorder::AnyPhysical => any_physical,
            Recorder::Diagnosis(Gate::Hyperglycaemia) => glucose_recorder.or(any_physical),
            Recorder::Diagnosis(_) => pressure_recorder.or(any_physical),
        };
        assignments.push(recorder);
    }

    for (observation, recorder) in record.observations.iter_mut().zip(assignments) {
        match recorder {
            Some((encounter, start)) => {
                observation.recorded_by = Some(encounter);
                observation.applies = Some(Period::new(start, horizon.max(start))?);
            }
            None => {
                observation.recorded_by = None;
                observation.applies = None;
            }
        }
    }

    if let Some(allergy) = record.allergy.as_mut() {
        allergy.recorded = physicals.first().map(|&(_, start)| start);
    }

    Ok(())
}
