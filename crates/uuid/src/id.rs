//! Implementation of [`ResourceId`] and [`RunNamespace`].

use crate::{UuidError, UuidResult};
use std::path::{Path, PathBuf};
use std::{fmt, str::FromStr};
use uuid::Uuid;

/// A resource identifier in canonical form (32 lowercase hex characters, no hyphens).
///
/// Once constructed the inner UUID is always rendered canonically, so string forms can be used
/// directly as file names and in `ResourceType/<id>` references.
///
/// # Construction
/// - [`RunNamespace::derive`] derives a reproducible identifier.
/// - [`ResourceId::parse`] validates an externally supplied identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceId(Uuid);

impl ResourceId {
    /// Validates and parses an identifier that must already be canonical.
    ///
    /// Hyphenated or uppercase forms are rejected rather than normalised.
    ///
    /// # Errors
    ///
    /// Returns [`UuidError::InvalidInput`] if `input` is not in canonical form.
    pub fn parse(input: &str) -> UuidResult<Self> {
        if !Self::is_canonical(input) {
            return Err(UuidError::InvalidInput(format!(
                "identifier must be 32 lowercase hex characters without hyphens, got: '{input}'"
            )));
        }
        Uuid::parse_str(input)
            .map(Self)
            .map_err(|e| UuidError::InvalidInput(format!("{input}: {e}")))
    }

    /// Returns true if `input` is exactly 32 lowercase hex characters.
    pub fn is_canonical(input: &str) -> bool {
        input.len() == 32
            && input
                .bytes()
                .all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
    }

    pub fn uuid(&self) -> Uuid {
        self.0
    }

    /// Returns `parent_dir/<s1>/<s2>/<id>/` where `s1`/`s2` are the first two hex pairs.
    pub fn sharded_dir(&self, parent_dir: &Path) -> PathBuf {
        let canonical = self.0.simple().to_string();
        let s1 = &canonical[0..2];
        let s2 = &canonical[2..4];
        parent_dir.join(s1).join(s2).join(&canonical)
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

impl FromStr for ResourceId {
    type Err = UuidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ResourceId::parse(s)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for ResourceId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for ResourceId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        ResourceId::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// The namespace a generation run derives its identifiers from.
///
/// Built from a free-text label (for example `"synth.dev.1"`), so two runs with the same label
/// and seeds produce identical identifiers, while different labels never collide.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunNamespace(Uuid);

impl RunNamespace {
    /// Creates a namespace from a label.
    ///
    /// # Errors
    ///
    /// Returns [`UuidError::InvalidInput`] if the label is empty or whitespace.
    pub fn new(label: &str) -> UuidResult<Self> {
        let label = label.trim();
        if label.is_empty() {
            return Err(UuidError::InvalidInput(
                "namespace label cannot be empty".into(),
            ));
        }
        Ok(Self(Uuid::new_v5(&Uuid::NAMESPACE_URL, label.as_bytes())))
    }

    /// Derives the identifier for `name` within this namespace.
    pub fn derive(&self, name: &str) -> ResourceId {
        ResourceId(Uuid::new_v5(&self.0, name.as_bytes()))
    }
}
