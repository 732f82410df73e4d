//! Core runtime configuration.
//!
//! This module defines configuration that should be resolved once at process startup and then
//! passed into the generator. Environment variables are read by the binaries only; everything
//! here takes the raw `Option<String>` so that tests and worker threads never consult the
//! process environment.

use crate::constants::{
    DEFAULT_OUTPUT_DIR, DEFAULT_PATIENT_BUDGET_SECS, DEFAULT_PATIENT_COUNT, MAX_PATIENT_COUNT,
};
use crate::validation::validate_namespace_safe_for_uri;
use crate::{SynthError, SynthResult};
use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use std::path::{Path, PathBuf};
use std::time::Duration;
use synth_uuid::RunNamespace;

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    output_dir: PathBuf,
    namespace: String,
    run_namespace: RunNamespace,
    reference_time: DateTime<Utc>,
    patient_budget: Duration,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// # Arguments
    ///
    /// * `output_dir` - Directory under which patient bundles are exported.
    /// * `namespace` - Label from which all resource identifiers of the run are derived.
    /// * `reference_time` - "Today" for the run; no realised event may lie after it.
    /// * `patient_budget` - Wall-clock budget for exporting a single patient.
    ///
    /// # Errors
    ///
    /// Returns `SynthError::InvalidInput` if the namespace is not URI-safe or the budget is zero.
    pub fn new(
        output_dir: PathBuf,
        namespace: String,
        reference_time: DateTime<Utc>,
        patient_budget: Duration,
    ) -> SynthResult<Self> {
        validate_namespace_safe_for_uri(&namespace)?;

        if patient_budget.is_zero() {
            return Err(SynthError::InvalidInput(
                "patient budget must be greater than zero".into(),
            ));
        }

        let run_namespace = RunNamespace::new(&namespace)?;

        Ok(Self {
            output_dir,
            namespace,
            run_namespace,
            reference_time,
            patient_budget,
        })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn run_namespace(&self) -> &RunNamespace {
        &self.run_namespace
    }

    pub fn reference_time(&self) -> DateTime<Utc> {
        self.reference_time
    }

    pub fn patient_budget(&self) -> Duration {
        self.patient_budget
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse the run's reference time from an optional string value.
///
/// Accepts an RFC 3339 timestamp or a plain `YYYY-MM-DD` date (taken as midday UTC). If `value`
/// is `None` or empty/whitespace, returns the current time.
pub fn reference_time_from_env_value(value: Option<String>) -> SynthResult<DateTime<Utc>> {
    let Some(value) = non_empty(value) else {
        return Ok(Utc::now());
    };

    if let Ok(timestamp) = DateTime::parse_from_rfc3339(&value) {
        return Ok(timestamp.with_timezone(&Utc));
    }

    let date = NaiveDate::parse_from_str(&value, "%Y-%m-%d").map_err(|_| {
        SynthError::InvalidInput(format!(
            "reference date '{value}' is neither RFC 3339 nor YYYY-MM-DD"
        ))
    })?;
    let midday = NaiveTime::from_hms_opt(12, 0, 0)
        .ok_or_else(|| SynthError::DateOutOfRange("midday".into()))?;
    Ok(Utc.from_utc_datetime(&date.and_time(midday)))
}

/// Parse the number of patients to generate.
///
/// If `value` is `None` or empty/whitespace, returns [`DEFAULT_PATIENT_COUNT`].
pub fn patient_count_from_env_value(value: Option<String>) -> SynthResult<usize> {
    let Some(value) = non_empty(value) else {
        return Ok(DEFAULT_PATIENT_COUNT);
    };

    let count: usize = value
        .parse()
        .map_err(|_| SynthError::InvalidInput(format!("patient count '{value}' is not a number")))?;

    if count == 0 || count > MAX_PATIENT_COUNT {
        return Err(SynthError::InvalidInput(format!(
            "patient count must be between 1 and {MAX_PATIENT_COUNT}"
        )));
    }

    Ok(count)
}

/// Parse the run seed.
///
/// If `value` is `None` or empty/whitespace, a fresh random seed is drawn; the caller should log
/// it so the run can be reproduced.
pub fn seed_from_env_value(value: Option<String>) -> SynthResult<u64> {
    match non_empty(value) {
        Some(value) => value
            .parse()
            .map_err(|_| SynthError::InvalidInput(format!("seed '{value}' is not a u64"))),
        None => Ok(rand::random()),
    }
}

/// Parse the per-patient export budget in seconds.
///
/// If `value` is `None` or empty/whitespace, returns [`DEFAULT_PATIENT_BUDGET_SECS`].
pub fn patient_budget_from_env_value(value: Option<String>) -> SynthResult<Duration> {
    let Some(value) = non_empty(value) else {
        return Ok(Duration::from_secs(DEFAULT_PATIENT_BUDGET_SECS));
    };

    let secs: u64 = value.parse().map_err(|_| {
        SynthError::InvalidInput(format!("patient budget '{value}' is not a whole number of seconds"))
    })?;
    Ok(Duration::from_secs(secs))
}

/// Resolve the output directory, falling back to [`DEFAULT_OUTPUT_DIR`].
pub fn output_dir_from_env_value(value: Option<String>) -> PathBuf {
    non_empty(value)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0)
            .single()
            .expect("valid timestamp")
    }

    #[test]
    fn test_new_rejects_bad_namespace() {
        let err = CoreConfig::new(
            PathBuf::from("out"),
            "bad namespace!".into(),
            fixed_time(),
            Duration::from_secs(5),
        )
        .expect_err("namespace with space and '!' should fail");
        assert!(matches!(err, SynthError::InvalidInput(_)));
    }

    #[test]
    fn test_new_rejects_zero_budget() {
        let err = CoreConfig::new(
            PathBuf::from("out"),
            "synth.test".into(),
            fixed_time(),
            Duration::ZERO,
        )
        .expect_err("zero budget should fail");
        assert!(matches!(err, SynthError::InvalidInput(_)));
    }

    #[test]
    fn test_namespace_drives_identifiers() {
        let a = CoreConfig::new(
            PathBuf::from("out"),
            "synth.test".into(),
            fixed_time(),
            Duration::from_secs(5),
        )
        .expect("valid config");
        let b = a.clone();
        assert_eq!(
            a.run_namespace().derive("1/Patient"),
            b.run_namespace().derive("1/Patient")
        );
        assert_eq!(a.namespace(), "synth.test");
    }

    #[test]
    fn test_reference_time_parsing() {
        let date = reference_time_from_env_value(Some("2024-02-29".into())).expect("date");
        assert_eq!((date.year(), date.month(), date.day()), (2024, 2, 29));

        let ts = reference_time_from_env_value(Some("2024-01-01T08:30:00+02:00".into()))
            .expect("rfc3339");
        assert_eq!(ts, Utc.with_ymd_and_hms(2024, 1, 1, 6, 30, 0).single().expect("ts"));

        assert!(reference_time_from_env_value(Some("yesterday".into())).is_err());
        assert!(reference_time_from_env_value(Some("  ".into())).is_ok());
    }

    #[test]
    fn test_patient_count_parsing() {
        assert_eq!(patient_count_from_env_value(None).expect("default"), DEFAULT_PATIENT_COUNT);
        assert_eq!(patient_count_from_env_value(Some(" 25 ".into())).expect("count"), 25);
        assert!(patient_count_from_env_value(Some("0".into())).is_err());
        assert!(patient_count_from_env_value(Some("many".into())).is_err());
    }

    #[test]
    fn test_seed_and_budget_parsing() {
        assert_eq!(seed_from_env_value(Some("42".into())).expect("seed"), 42);
        assert!(seed_from_env_value(Some("-1".into())).is_err());
        assert_eq!(
            patient_budget_from_env_value(None).expect("default"),
            Duration::from_secs(DEFAULT_PATIENT_BUDGET_SECS)
        );
        assert_eq!(
            output_dir_from_env_value(Some("".into())),
            PathBuf::from(DEFAULT_OUTPUT_DIR)
        );
    }
}
