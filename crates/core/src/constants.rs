//! Constants used throughout the synth core crate.
//!
//! Generation tunables (slot distribution, retry budgets, probabilities) live here alongside the
//! default paths and labels so the engine modules read as pure control flow.

/// Default directory for exported bundles when no explicit directory is configured.
pub const DEFAULT_OUTPUT_DIR: &str = "synthetic_patients";

/// Default namespace label from which resource identifiers are derived.
pub const DEFAULT_NAMESPACE: &str = "synth.local";

/// Default number of patients generated per run.
pub const DEFAULT_PATIENT_COUNT: usize = 1;

/// Upper bound on patients per run.
pub const MAX_PATIENT_COUNT: usize = 100_000;

/// Default wall-clock budget for exporting one patient, in seconds.
pub const DEFAULT_PATIENT_BUDGET_SECS: u64 = 10;

/// Bound on re-draws when filling a condition slot.
pub const MAX_DRAW_ATTEMPTS: usize = 64;

/// How far back condition onsets may lie.
pub const ONSET_WINDOW_DAYS: i64 = 3 * 365;

/// Random condition slot counts; one entry is picked uniformly.
pub const SLOT_COUNT_TABLE: [usize; 20] = [0, 1, 1, 2, 2, 2, 2, 3, 3, 3, 3, 3, 3, 4, 4, 4, 5, 5, 6, 7];

/// A slot draws from the common conditions with probability one in this.
pub const COMMON_DRAW_ONE_IN: u32 = 3;

/// Chance (percent) that a patient with at least one procedure develops a wound infection.
pub const POST_OPERATIVE_INFECTION_PERCENT: u8 = 5;

/// Index encounters are readmission-eligible with probability one in this.
pub const READMISSION_ONE_IN: u32 = 5;

/// Chance (percent) that a patient carries an allergy.
pub const ALLERGY_PERCENT: u32 = 40;

/// Patient age at the reference date, in days (65 to 85 years).
pub const MIN_AGE_DAYS: i64 = 23_735;
pub const MAX_AGE_DAYS: i64 = 31_025;

/// Glucose level (mg/dL) at or above which Diabetes is diagnosed.
pub const DIABETES_GLUCOSE_THRESHOLD: u32 = 200;

/// Organization recorded as managing every generated patient.
pub const MANAGING_ORGANIZATION: &str = "MedStar Health";

/// Hospitals that may have assigned the patient's record number.
pub const HOSPITALS: [&str; 5] = [
    "Mayo Clinic",
    "Mount Sinai Hospital",
    "UCLA Medical Center",
    "Johns Hopkins Hospital",
    "Mass General Hospital",
];

/// Encounter reason codes (CPT).
pub const EMERGENCY_VISIT_CODE: &str = "99283";
pub const EMERGENCY_VISIT_DISPLAY: &str = "Emergency Department Visit";
pub const FOLLOW_UP_CODE: &str = "99215";
pub const FOLLOW_UP_DISPLAY: &str = "Office Outpatient Visit";
pub const POSTOPERATIVE_FOLLOW_UP_CODE: &str = "99024";
pub const POSTOPERATIVE_FOLLOW_UP_DISPLAY: &str = "Postoperative Follow-Up Visit";
pub const CAST_REMOVAL_CODE: &str = "29705";
pub const CAST_REMOVAL_DISPLAY: &str = "Cast Removal";
pub const CHEMOTHERAPY_CODE: &str = "96411";
pub const CHEMOTHERAPY_DISPLAY: &str = "Chemotherapy Treatment";
pub const READMISSION_DISPLAY: &str = "Post-Operative Follow-Up";
pub const YEARLY_PHYSICAL_CODE: &str = "2010F";
pub const YEARLY_PHYSICAL_DISPLAY: &str = "Vital Signs Recorded";

/// Cause-of-death observation code (SNOMED CT).
pub const CAUSE_OF_DEATH_CODE: &str = "419099009";
