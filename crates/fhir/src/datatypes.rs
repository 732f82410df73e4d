//! FHIR general-purpose datatypes shared by every resource module.
//!
//! These mirror the R4 datatypes closely enough for the generated resources to be read by
//! ordinary FHIR tooling. Only the elements the generator emits are modelled; anything else is
//! rejected on parse via `#[serde(deny_unknown_fields)]`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use synth_uuid::ResourceId;

/// SNOMED CT code system URI.
pub const SNOMED_CT: &str = "http://snomed.info/sct";
/// ICD-9-CM code system URI.
pub const ICD9_CM: &str = "http://hl7.org/fhir/sid/icd-9-cm";
/// RxNorm code system URI.
pub const RXNORM: &str = "http://www.nlm.nih.gov/research/umls/rxnorm";
/// CPT code system URI.
pub const CPT: &str = "http://www.ama-assn.org/go/cpt";
/// UCUM units of measure.
pub const UCUM: &str = "http://unitsofmeasure.org";

/// A code from a terminology.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Coding {
    pub system: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
}

impl Coding {
    pub fn new(system: &str, code: &str, display: &str) -> Self {
        Self {
            system: system.to_string(),
            code: code.to_string(),
            display: Some(display.to_string()),
        }
    }
}

/// A concept expressed as one or more codings plus optional text.
#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CodeableConcept {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub coding: Vec<Coding>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl CodeableConcept {
    /// A single-coding concept whose text repeats the coding's display.
    pub fn coded(coding: Coding) -> Self {
        let text = coding.display.clone();
        Self {
            coding: vec![coding],
            text,
        }
    }

    /// A text-only concept.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            coding: Vec::new(),
            text: Some(text.into()),
        }
    }

    /// Returns the code of the first coding, if any.
    pub fn first_code(&self) -> Option<&str> {
        self.coding.first().map(|c| c.code.as_str())
    }
}

/// A reference from one resource to another (`ResourceType/<id>`).
#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Reference {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
}

impl Reference {
    /// A literal reference to `resource_type/id`.
    pub fn to(resource_type: &str, id: &ResourceId) -> Self {
        Self {
            reference: Some(format!("{resource_type}/{id}")),
            display: None,
        }
    }

    /// A display-only reference (no resolvable target).
    pub fn display(text: impl Into<String>) -> Self {
        Self {
            reference: None,
            display: Some(text.into()),
        }
    }

    /// Splits a literal reference into its resource type and identifier.
    ///
    /// Returns `None` for display-only references or malformed targets.
    pub fn target(&self) -> Option<(&str, ResourceId)> {
        let (resource_type, id) = self.reference.as_deref()?.split_once('/')?;
        let id = ResourceId::parse(id).ok()?;
        Some((resource_type, id))
    }
}

/// A time range; `end` is absent for ongoing periods.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FhirPeriod {
    pub start: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<DateTime<Utc>>,
}

impl FhirPeriod {
    pub fn closed(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            start,
            end: Some(end),
        }
    }

    pub fn open(start: DateTime<Utc>) -> Self {
        Self { start, end: None }
    }
}

impl From<synth_types::Period> for FhirPeriod {
    fn from(period: synth_types::Period) -> Self {
        Self::closed(period.start(), period.end())
    }
}

/// A measured amount.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Quantity {
    pub value: f64,
    pub unit: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl Quantity {
    /// A UCUM-coded quantity.
    pub fn ucum(value: f64, unit: &str, code: &str) -> Self {
        Self {
            value,
            unit: unit.to_string(),
            system: Some(UCUM.to_string()),
            code: Some(code.to_string()),
        }
    }

    /// A quantity with a free-text unit.
    pub fn plain(value: f64, unit: &str) -> Self {
        Self {
            value,
            unit: unit.to_string(),
            system: None,
            code: None,
        }
    }
}

/// A ratio of two quantities, used for dosage rates.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Ratio {
    pub numerator: Quantity,
    pub denominator: Quantity,
}

/// A business identifier.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct Identifier {
    #[serde(rename = "use", skip_serializing_if = "Option::is_none")]
    pub use_type: Option<String>,
    pub system: String,
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<FhirPeriod>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigner: Option<Reference>,
}

/// Purpose of a human name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NameUse {
    Official,
    Usual,
    Nickname,
    Old,
    Maiden,
}

/// A person's name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HumanName {
    #[serde(rename = "use", skip_serializing_if = "Option::is_none")]
    pub use_type: Option<NameUse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub family: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub given: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suffix: Vec<String>,
}

/// A phone number, email address or similar.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ContactPoint {
    pub system: String,
    pub value: String,
    #[serde(rename = "use", skip_serializing_if = "Option::is_none")]
    pub use_type: Option<String>,
}

/// A postal address.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct Address {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub line: Vec<String>,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
}

/// A free-text note.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Annotation {
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use synth_uuid::RunNamespace;

    #[test]
    fn reference_target_round_trips() {
        let id = RunNamespace::new("datatypes").expect("ns").derive("1/Patient");
        let reference = Reference::to("Patient", &id);
        let (resource_type, parsed) = reference.target().expect("literal reference");
        assert_eq!(resource_type, "Patient");
        assert_eq!(parsed, id);
        assert!(Reference::display("MedStar").target().is_none());
    }

    #[test]
    fn coded_concept_copies_display_to_text() {
        let cc = CodeableConcept::coded(Coding::new(SNOMED_CT, "77176002", "Smoker"));
        assert_eq!(cc.text.as_deref(), Some("Smoker"));
        assert_eq!(cc.first_code(), Some("77176002"));
    }

    #[test]
    fn open_period_omits_end() {
        let start = "2025-01-01T00:00:00Z".parse().expect("timestamp");
        let json = serde_json::to_string(&FhirPeriod::open(start)).expect("serialize");
        assert!(!json.contains("end"));
    }

    #[test]
    fn coding_rejects_unknown_keys() {
        let err = serde_json::from_str::<Coding>(
            r#"{"system":"x","code":"1","display":"a","version":"2"}"#,
        );
        assert!(err.is_err());
    }
}
