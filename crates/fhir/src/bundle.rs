//! FHIR collection bundles holding one patient's complete record.
//!
//! A [`Bundle`] is the unit handed to exporters. Its entries are kept in *upload order*: the
//! Patient first, then Medications, then Encounters, then everything that references them. The
//! order is part of the contract because a server-side importer resolves references in a single
//! forward pass.
//!
//! Responsibilities:
//! - Define the [`Resource`] sum type, tagged on the wire by `resourceType`
//! - Validate bundle shape on construction and on parse
//! - Render/parse bundles and individual resources as JSON

use crate::allergy::AllergyIntolerance;
use crate::condition::Condition;
use crate::encounter::Encounter;
use crate::medication::{Medication, MedicationStatement};
use crate::observation::Observation;
use crate::patient::Patient;
use crate::procedure::Procedure;
use crate::{FhirError, FhirResult};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use synth_uuid::ResourceId;

// ============================================================================
// Public domain-level types
// ============================================================================

/// Any resource the generator can emit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "resourceType")]
pub enum Resource {
    Patient(Patient),
    Medication(Medication),
    Encounter(Encounter),
    Observation(Observation),
    Condition(Condition),
    Procedure(Procedure),
    MedicationStatement(MedicationStatement),
    AllergyIntolerance(AllergyIntolerance),
}

impl Resource {
    /// The FHIR resource type name.
    pub fn resource_type(&self) -> &'static str {
        match self {
            Resource::Patient(_) => "Patient",
            Resource::Medication(_) => "Medication",
            Resource::Encounter(_) => "Encounter",
            Resource::Observation(_) => "Observation",
            Resource::Condition(_) => "Condition",
            Resource::Procedure(_) => "Procedure",
            Resource::MedicationStatement(_) => "MedicationStatement",
            Resource::AllergyIntolerance(_) => "AllergyIntolerance",
        }
    }

    pub fn id(&self) -> ResourceId {
        match self {
            Resource::Patient(r) => r.id,
            Resource::Medication(r) => r.id,
            Resource::Encounter(r) => r.id,
            Resource::Observation(r) => r.id,
            Resource::Condition(r) => r.id,
            Resource::Procedure(r) => r.id,
            Resource::MedicationStatement(r) => r.id,
            Resource::AllergyIntolerance(r) => r.id,
        }
    }

    /// Upload tier: resources of a lower tier must precede higher tiers.
    fn tier(&self) -> u8 {
        match self {
            Resource::Patient(_) => 0,
            Resource::Medication(_) => 1,
            Resource::Encounter(_) => 2,
            _ => 3,
        }
    }

    /// Render a single resource as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`FhirError::Translation`] if serialisation fails.
    pub fn render(&self) -> FhirResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| FhirError::Translation(format!("Failed to serialise resource: {e}")))
    }

    /// Parse a single resource from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`FhirError::Translation`] with the failing path if the JSON does not match
    /// any known resource schema.
    pub fn parse(json_text: &str) -> FhirResult<Resource> {
        parse_json(json_text, "Resource")
    }
}

/// A patient bundle (domain level).
#[derive(Clone, Debug, PartialEq)]
pub struct Bundle {
    id: ResourceId,
    timestamp: DateTime<Utc>,
    entries: Vec<Resource>,
}

impl Bundle {
    /// Build a bundle from entries already in upload order.
    ///
    /// # Errors
    ///
    /// Returns [`FhirError::InvalidInput`] if:
    /// - the first entry is not the only Patient,
    /// - any entry appears before an entry of an earlier upload tier,
    /// - two entries share an identifier.
    pub fn new(
        id: ResourceId,
        timestamp: DateTime<Utc>,
        entries: Vec<Resource>,
    ) -> FhirResult<Self> {
        validate_entries(&entries)?;
        Ok(Self {
            id,
            timestamp,
            entries,
        })
    }

    pub fn id(&self) -> ResourceId {
        self.id
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn entries(&self) -> &[Resource] {
        &self.entries
    }

    /// The bundle's Patient resource.
    pub fn patient(&self) -> Option<&Patient> {
        match self.entries.first() {
            Some(Resource::Patient(patient)) => Some(patient),
            _ => None,
        }
    }

    /// Count of entries with the given resource type.
    pub fn count_of(&self, resource_type: &str) -> usize {
        self.entries
            .iter()
            .filter(|r| r.resource_type() == resource_type)
            .count()
    }

    /// Render the bundle as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`FhirError::Translation`] if serialisation fails.
    pub fn render(&self) -> FhirResult<String> {
        let wire = BundleWire {
            resource_type: "Bundle".to_string(),
            id: self.id,
            bundle_type: "collection".to_string(),
            timestamp: self.timestamp,
            entry: self
                .entries
                .iter()
                .map(|resource| BundleEntryWire {
                    full_url: full_url(&resource.id()),
                    resource: resource.clone(),
                })
                .collect(),
        };
        serde_json::to_string_pretty(&wire)
            .map_err(|e| FhirError::Translation(format!("Failed to serialise bundle: {e}")))
    }

    /// Parse a bundle from JSON text.
    ///
    /// This uses `serde_path_to_error` to report the path to the failing element
    /// (e.g. `entry[3].resource.period`) when the JSON does not match the schema.
    ///
    /// # Errors
    ///
    /// Returns [`FhirError`] if:
    /// - the JSON does not match the bundle schema,
    /// - `resourceType` is not `Bundle` or `type` is not `collection`,
    /// - an entry's `fullUrl` does not match its resource id,
    /// - the entries violate upload order (see [`Bundle::new`]).
    pub fn parse(json_text: &str) -> FhirResult<Bundle> {
        let wire: BundleWire = parse_json(json_text, "Bundle")?;

        if wire.resource_type != "Bundle" {
            return Err(FhirError::InvalidInput(format!(
                "Expected resourceType 'Bundle', got '{}'",
                wire.resource_type
            )));
        }
        if wire.bundle_type != "collection" {
            return Err(FhirError::InvalidInput(format!(
                "Expected bundle type 'collection', got '{}'",
                wire.bundle_type
            )));
        }

        let mut entries = Vec::with_capacity(wire.entry.len());
        for entry in wire.entry {
            let expected = full_url(&entry.resource.id());
            if entry.full_url != expected {
                return Err(FhirError::InvalidInput(format!(
                    "fullUrl '{}' does not match resource id (expected '{expected}')",
                    entry.full_url
                )));
            }
            entries.push(entry.resource);
        }

        Bundle::new(wire.id, wire.timestamp, entries)
    }
}

// ============================================================================
// Wire types (internal)
// ============================================================================

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct BundleWire {
    #[serde(rename = "resourceType")]
    resource_type: String,
    id: ResourceId,
    #[serde(rename = "type")]
    bundle_type: String,
    timestamp: DateTime<Utc>,
    #[serde(default)]
    entry: Vec<BundleEntryWire>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct BundleEntryWire {
    #[serde(rename = "fullUrl")]
    full_url: String,
    resource: Resource,
}

// ============================================================================
// Helper functions (internal)
// ============================================================================

fn full_url(id: &ResourceId) -> String {
    format!("urn:uuid:{}", id.uuid().hyphenated())
}

fn parse_json<T: DeserializeOwned>(json_text: &str, what: &str) -> FhirResult<T> {
    let mut deserializer = serde_json::Deserializer::from_str(json_text);
    serde_path_to_error::deserialize::<_, T>(&mut deserializer).map_err(|err| {
        let path = err.path().to_string();
        let source = err.into_inner();
        let path = if path.is_empty() || path == "." {
            "<root>".to_string()
        } else {
            path
        };
        FhirError::Translation(format!("{what} schema mismatch at {path}: {source}"))
    })
}

fn validate_entries(entries: &[Resource]) -> FhirResult<()> {
    match entries.first() {
        Some(Resource::Patient(_)) => {}
        Some(other) => {
            return Err(FhirError::InvalidInput(format!(
                "bundle must start with a Patient, found {}",
                other.resource_type()
            )))
        }
        None => {
            return Err(FhirError::InvalidInput(
                "bundle must contain a Patient".into(),
            ))
        }
    }

    let mut seen = std::collections::HashSet::with_capacity(entries.len());
    let mut tier = 0;
    for (index, resource) in entries.iter().enumerate() {
        if index > 0 && matches!(resource, Resource::Patient(_)) {
            return Err(FhirError::InvalidInput(
                "bundle must contain exactly one Patient".into(),
            ));
        }
        if resource.tier() < tier {
            return Err(FhirError::InvalidInput(format!(
                "{} at entry {index} is out of upload order",
                resource.resource_type()
            )));
        }
        tier = resource.tier();
        if !seen.insert(resource.id()) {
            return Err(FhirError::InvalidInput(format!(
                "duplicate resource id {}",
                resource.id()
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datatypes::{CodeableConcept, Coding, FhirPeriod, Reference, RXNORM};
    use crate::encounter::{EncounterClass, EncounterStatus};
    use crate::patient::AdministrativeGender;
    use chrono::NaiveDate;
    use synth_uuid::RunNamespace;

    fn ns() -> RunNamespace {
        RunNamespace::new("bundle-tests").expect("ns")
    }

    fn patient() -> Resource {
        Resource::Patient(Patient {
            id: ns().derive("7/Patient"),
            identifier: vec![],
            active: true,
            name: vec![],
            telecom: vec![],
            gender: AdministrativeGender::Male,
            birth_date: NaiveDate::from_ymd_opt(1950, 1, 2).expect("date"),
            deceased_boolean: Some(false),
            deceased_date_time: None,
            address: vec![],
            marital_status: None,
            contact: vec![],
            managing_organization: None,
        })
    }

    fn medication() -> Resource {
        Resource::Medication(Medication {
            id: ns().derive("7/Medication/8"),
            code: CodeableConcept::coded(Coding::new(RXNORM, "104377", "Zestril")),
        })
    }

    fn encounter() -> Resource {
        let start = "2025-05-01T00:00:00Z".parse().expect("timestamp");
        Resource::Encounter(Encounter {
            id: ns().derive("7/Encounter/0"),
            status: EncounterStatus::Finished,
            class: EncounterClass::Emergency.coding(),
            encounter_type: vec![],
            subject: Reference::to("Patient", &ns().derive("7/Patient")),
            period: FhirPeriod::closed(start, start),
            reason_code: vec![],
            reason_reference: vec![],
            hospitalization: None,
            part_of: None,
            service_provider: None,
        })
    }

    fn timestamp() -> DateTime<Utc> {
        "2026-01-01T00:00:00Z".parse().expect("timestamp")
    }

    #[test]
    fn test_render_then_parse_preserves_entries() {
        let bundle = Bundle::new(
            ns().derive("7/Bundle"),
            timestamp(),
            vec![patient(), medication(), encounter()],
        )
        .expect("valid bundle");

        let json = bundle.render().expect("render");
        assert!(json.contains("\"resourceType\": \"Bundle\""));
        assert!(json.contains("\"resourceType\": \"Encounter\""));
        assert!(json.contains("urn:uuid:"));

        let parsed = Bundle::parse(&json).expect("parse");
        assert_eq!(parsed, bundle);
        assert_eq!(parsed.count_of("Encounter"), 1);
        assert!(parsed.patient().is_some());
    }

    #[test]
    fn test_rejects_bundle_not_starting_with_patient() {
        let err = Bundle::new(ns().derive("b"), timestamp(), vec![medication(), patient()])
            .expect_err("must reject");
        assert!(matches!(err, FhirError::InvalidInput(msg) if msg.contains("start with a Patient")));
    }

    #[test]
    fn test_rejects_out_of_order_entries() {
        let err = Bundle::new(
            ns().derive("b"),
            timestamp(),
            vec![patient(), encounter(), medication()],
        )
        .expect_err("medication after encounter must be rejected");
        assert!(matches!(err, FhirError::InvalidInput(msg) if msg.contains("upload order")));
    }

    #[test]
    fn test_rejects_duplicate_ids() {
        let err = Bundle::new(
            ns().derive("b"),
            timestamp(),
            vec![patient(), medication(), medication()],
        )
        .expect_err("duplicate ids must be rejected");
        assert!(matches!(err, FhirError::InvalidInput(msg) if msg.contains("duplicate")));
    }

    #[test]
    fn test_parse_reports_path_of_bad_field() {
        let bundle = Bundle::new(ns().derive("b"), timestamp(), vec![patient()])
            .expect("valid bundle");
        let json = bundle.render().expect("render");
        let broken = json.replace("\"type\": \"collection\"", "\"type\": 17");

        let err = Bundle::parse(&broken).expect_err("wrong type must fail");
        match err {
            FhirError::Translation(msg) => assert!(msg.contains("type"), "{msg}"),
            other => panic!("expected Translation error, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_rejects_wrong_bundle_type() {
        let bundle = Bundle::new(ns().derive("b"), timestamp(), vec![patient()])
            .expect("valid bundle");
        let json = bundle
            .render()
            .expect("render")
            .replace("\"collection\"", "\"transaction\"");
        let err = Bundle::parse(&json).expect_err("transaction bundles are rejected");
        assert!(matches!(err, FhirError::InvalidInput(msg) if msg.contains("transaction")));
    }

    #[test]
    fn test_single_resource_round_trip() {
        let resource = encounter();
        let json = resource.render().expect("render");
        assert!(json.contains("\"resourceType\": \"Encounter\""));
        assert_eq!(Resource::parse(&json).expect("parse"), resource);
    }

    #[test]
    fn test_unknown_resource_type_is_rejected() {
        let err = Resource::parse(r#"{"resourceType":"Claim","id":"x"}"#)
            .expect_err("unknown type");
        assert!(matches!(err, FhirError::Translation(_)));
    }
}
