//! Resource identifiers and sharded-path utilities.
//!
//! Every resource in an exported patient bundle carries a [`ResourceId`]: a UUID rendered in a
//! *canonical* form of **32 lowercase hexadecimal characters** (no hyphens).
//!
//! Identifiers are derived, not random. A run has a namespace (see [`RunNamespace`]) and each
//! resource is named by a stable path such as `"<seed>/Encounter/3"`; the identifier is the
//! UUIDv5 of that name within the namespace. Regenerating a patient from the same seed and
//! namespace therefore reproduces every identifier exactly.
//!
//! ## Sharded directory layout
//! For a canonical identifier `u`, exported patients live under:
//! `parent_dir/<u[0..2]>/<u[2..4]>/<u>/`
//!
//! This keeps directory fan-out small when many thousands of patients are exported.

mod id;

pub use id::{ResourceId, RunNamespace};

/// Error type for identifier operations.
#[derive(Debug, thiserror::Error)]
pub enum UuidError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for identifier operations.
pub type UuidResult<T> = Result<T, UuidError>;
