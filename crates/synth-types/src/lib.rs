//! Validated value types shared across the generator crates.
//!
//! [`Period`] is a UTC interval whose start never comes after its end. The invariant is enforced
//! once, at construction, so the timeline engine, the FHIR projection and the exporters can rely
//! on it without re-checking.

use chrono::{DateTime, Duration, Utc};

/// Errors that can occur when creating a [`Period`].
#[derive(Debug, thiserror::Error)]
pub enum PeriodError {
    #[error("period starts at {start} but ends earlier at {end}")]
    EndBeforeStart {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
}

/// A closed time interval `[start, end]` in UTC.
///
/// Encounters, procedures and observation applies-periods are all expressed as a `Period`.
/// The constructor rejects intervals that run backwards; a zero-length interval is allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct Period {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl Period {
    /// Creates a new period.
    ///
    /// # Errors
    ///
    /// Returns [`PeriodError::EndBeforeStart`] if `end < start`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, PeriodError> {
        if end < start {
            return Err(PeriodError::EndBeforeStart { start, end });
        }
        Ok(Self { start, end })
    }

    /// Creates a period of `length` starting at `start`.
    ///
    /// Negative lengths are treated as zero.
    pub fn starting_at(start: DateTime<Utc>, length: Duration) -> Self {
        let length = length.max(Duration::zero());
        Self {
            start,
            end: start + length,
        }
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Returns true if `other` lies entirely within this period.
    pub fn contains(&self, other: &Period) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Returns a copy of this period whose end is no later than `limit`.
    ///
    /// If `limit` is before the start, the result is a zero-length period at the start.
    pub fn clamp_end(&self, limit: DateTime<Utc>) -> Self {
        Self {
            start: self.start,
            end: self.end.min(limit).max(self.start),
        }
    }
}

impl<'de> serde::Deserialize<'de> for Period {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(serde::Deserialize)]
        struct Raw {
            start: DateTime<Utc>,
            end: DateTime<Utc>,
        }

        let raw = Raw::deserialize(deserializer)?;
        Period::new(raw.start, raw.end).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, hour, 0, 0).unwrap()
    }

    #[test]
    fn test_period_rejects_reversed_interval() {
        let err = Period::new(at(10), at(9)).expect_err("reversed period must fail");
        assert!(matches!(err, PeriodError::EndBeforeStart { .. }));
        assert!(Period::new(at(9), at(9)).is_ok(), "zero length is allowed");
    }

    #[test]
    fn test_period_contains_and_clamp() {
        let outer = Period::new(at(8), at(16)).expect("valid");
        let inner = Period::new(at(9), at(12)).expect("valid");
        assert!(outer.contains(&inner));
        assert!(!inner.contains(&outer));

        let clamped = outer.clamp_end(at(10));
        assert_eq!(clamped.end(), at(10));
        let collapsed = outer.clamp_end(at(2));
        assert_eq!(collapsed.start(), collapsed.end());
    }

    #[test]
    fn test_starting_at_ignores_negative_length() {
        let p = Period::starting_at(at(5), Duration::hours(-3));
        assert_eq!(p.start(), p.end());
    }

    #[test]
    fn test_period_deserialize_validates() {
        let ok: Period = serde_json::from_str(
            r#"{"start":"2025-03-01T08:00:00Z","end":"2025-03-01T09:00:00Z"}"#,
        )
        .expect("valid period json");
        assert_eq!(ok.start(), at(8));

        let bad = serde_json::from_str::<Period>(
            r#"{"start":"2025-03-01T09:00:00Z","end":"2025-03-01T08:00:00Z"}"#,
        );
        assert!(bad.is_err());
    }
}
