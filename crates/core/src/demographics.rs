//! Patient demographics.
//!
//! Draws the decorative identity of a generated patient: sex, name, birth date, contact details,
//! marital status, a spouse contact and a medical record number. Only the sex and birth date
//! influence the clinical timeline; everything else is carried through to the Patient resource.

use crate::calendar::{days_before, midnight};
use crate::constants::{HOSPITALS, MAX_AGE_DAYS, MIN_AGE_DAYS};
use crate::knowledge::names::{
    CITIES, EMAIL_DOMAINS, FEMALE_FIRST_NAMES, LAST_NAMES, MALE_FIRST_NAMES, NAME_SUFFIXES,
    STREET_NAMES, STREET_SUFFIXES,
};
use crate::knowledge::ConditionId;
use crate::SynthResult;
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rand::Rng;
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Sex {
    Male,
    Female,
}

impl Sex {
    pub fn opposite(self) -> Self {
        match self {
            Sex::Male => Sex::Female,
            Sex::Female => Sex::Male,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PersonName {
    pub given: String,
    pub family: String,
    pub suffix: Option<String>,
}

impl PersonName {
    /// Given and family name, without suffix.
    pub fn full(&self) -> String {
        format!("{} {}", self.given, self.family)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PostalAddress {
    pub line: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum MaritalStatus {
    Married,
    Unmarried,
}

impl MaritalStatus {
    pub fn code(self) -> &'static str {
        match self {
            MaritalStatus::Married => "M",
            MaritalStatus::Unmarried => "U",
        }
    }

    pub fn display(self) -> &'static str {
        match self {
            MaritalStatus::Married => "Married",
            MaritalStatus::Unmarried => "Unmarried",
        }
    }
}

/// The patient's spouse, listed as a contact.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Spouse {
    pub name: PersonName,
    pub phone: String,
}

/// Medical record number issued by a hospital.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RecordNumber {
    pub system: String,
    pub value: String,
    pub assigner: &'static str,
    pub issued: DateTime<Utc>,
}

/// Time and cause of the patient's death.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Death {
    pub at: DateTime<Utc>,
    pub cause: ConditionId,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Patient {
    pub sex: Sex,
    pub name: PersonName,
    pub birth_date: NaiveDate,
    pub active: bool,
    pub death: Option<Death>,
    pub address: PostalAddress,
    pub phone: String,
    pub email: String,
    pub marital_status: MaritalStatus,
    pub spouse: Spouse,
    pub record_number: RecordNumber,
}

impl Patient {
    /// Age in whole years on `date`.
    pub fn age_on(&self, date: NaiveDate) -> u32 {
        let mut age = date.year() - self.birth_date.year();
        if (date.month(), date.day()) < (self.birth_date.month(), self.birth_date.day()) {
            age -= 1;
        }
        age.max(0) as u32
    }

    pub fn is_deceased(&self) -> bool {
        self.death.is_some()
    }
}

fn pick<R: Rng>(rng: &mut R, values: &[&'static str]) -> &'static str {
    values[rng.gen_range(0..values.len())]
}

fn draw_name<R: Rng>(rng: &mut R, sex: Sex) -> PersonName {
    let given = match sex {
        Sex::Male => pick(rng, MALE_FIRST_NAMES),
        Sex::Female => pick(rng, FEMALE_FIRST_NAMES),
    };
    // Generational suffixes are only given to men.
    let suffix = (sex == Sex::Male && rng.gen_ratio(1, 4)).then(|| pick(rng, NAME_SUFFIXES));
    PersonName {
        given: given.to_string(),
        family: pick(rng, LAST_NAMES).to_string(),
        suffix: suffix.map(str::to_string),
    }
}

fn draw_phone<R: Rng>(rng: &mut R) -> String {
    format!(
        "({}) {}-{:04}",
        rng.gen_range(201..=989),
        rng.gen_range(200..=999),
        rng.gen_range(0..=9999)
    )
}

fn draw_address<R: Rng>(rng: &mut R) -> PostalAddress {
    let (city, state, zip_prefix) = CITIES[rng.gen_range(0..CITIES.len())];
    PostalAddress {
        line: format!(
            "{} {} {}",
            rng.gen_range(1..=9999),
            pick(rng, STREET_NAMES),
            pick(rng, STREET_SUFFIXES)
        ),
        city: city.to_string(),
        state: state.to_string(),
        postal_code: format!("{zip_prefix}{:02}", rng.gen_range(0..100)),
        country: "USA".to_string(),
    }
}

fn draw_record_number<R: Rng>(
    rng: &mut R,
    reference_time: DateTime<Utc>,
) -> SynthResult<RecordNumber> {
    let system = format!(
        "urn:oid:{}.{}.{}.{}.01",
        rng.gen_range(0..9),
        rng.gen_range(0..999),
        rng.gen_range(0..99),
        rng.gen_range(0..9)
    );
    // Issued between 13 and 18 months before the reference date.
    let issued_on = days_before(reference_time.date_naive(), rng.gen_range(395..=548))?;
    Ok(RecordNumber {
        system,
        value: rng.gen_range(0..999_999).to_string(),
        assigner: pick(rng, &HOSPITALS),
        issued: midnight(issued_on),
    })
}

/// Draw a patient aged 65 to 85 at `reference_time`.
///
/// # Errors
///
/// Returns `SynthError::DateOutOfRange` if the birth date cannot be represented.
pub(crate) fn draw_patient<R: Rng>(
    rng: &mut R,
    reference_time: DateTime<Utc>,
) -> SynthResult<Patient> {
    let sex = if rng.gen_bool(0.5) {
        Sex::Male
    } else {
        Sex::Female
    };
    let name = draw_name(rng, sex);
    let age_days = rng.gen_range(MIN_AGE_DAYS..=MAX_AGE_DAYS) as u64;
    let birth_date = days_before(reference_time.date_naive(), age_days)?;
    let address = draw_address(rng);
    let phone = draw_phone(rng);
    let email = format!(
        "{}.{}@{}",
        name.given.to_lowercase(),
        name.family.to_lowercase(),
        pick(rng, EMAIL_DOMAINS)
    );
    let marital_status = if rng.gen_bool(0.5) {
        MaritalStatus::Married
    } else {
        MaritalStatus::Unmarried
    };
    let spouse_name = draw_name(rng, sex.opposite());
    let spouse = Spouse {
        name: PersonName {
            suffix: None,
            ..spouse_name
        },
        phone: draw_phone(rng),
    };
    let record_number = draw_record_number(rng, reference_time)?;

    Ok(Patient {
        sex,
        name,
        birth_date,
        active: true,
        death: None,
        address,
        phone,
        email,
        marital_status,
        spouse,
        record_number,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn reference() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0)
            .single()
            .expect("valid timestamp")
    }

    #[test]
    fn test_patients_are_geriatric() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..200 {
            let patient = draw_patient(&mut rng, reference()).expect("patient");
            let age = patient.age_on(reference().date_naive());
            assert!((64..=85).contains(&age), "age {age} out of range");
            assert!(patient.active);
            assert!(!patient.is_deceased());
        }
    }

    #[test]
    fn test_only_men_get_suffixes() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        for _ in 0..200 {
            let patient = draw_patient(&mut rng, reference()).expect("patient");
            if patient.sex == Sex::Female {
                assert!(patient.name.suffix.is_none());
            }
            assert!(patient.spouse.name.suffix.is_none());
        }
    }

    #[test]
    fn test_record_number_issued_13_to_18_months_before() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let patient = draw_patient(&mut rng, reference()).expect("patient");
        let age = reference() - patient.record_number.issued;
        assert!(age.num_days() >= 395 && age.num_days() <= 549);
        assert!(HOSPITALS.contains(&patient.record_number.assigner));
    }

    #[test]
    fn test_age_on_birthday_boundary() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut patient = draw_patient(&mut rng, reference()).expect("patient");
        patient.birth_date = NaiveDate::from_ymd_opt(1950, 6, 2).expect("valid date");
        assert_eq!(patient.age_on(NaiveDate::from_ymd_opt(2025, 6, 1).expect("date")), 74);
        assert_eq!(patient.age_on(NaiveDate::from_ymd_opt(2025, 6, 2).expect("date")), 75);
    }
}
