//! Bundle export to the file system.
//!
//! Each patient bundle is written under a sharded directory derived from the bundle id:
//!
//! ```text
//! {root}/{s1}/{s2}/{bundle_id}/
//!   00-Patient-{id}.json
//!   01-Medication-{id}.json
//!   ...
//!   bundle.json
//! ```
//!
//! Files are numbered in upload order. Export is all-or-nothing per patient: if any write fails
//! or the deadline passes, everything written for that patient is removed again.

use crate::{SynthError, SynthResult};
use fhir::Bundle;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;

#[cfg(test)]
use std::collections::HashSet;
#[cfg(test)]
use std::sync::{LazyLock, Mutex};

/// Where a bundle was written.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredBundle {
    pub dir: PathBuf,
    pub files: Vec<PathBuf>,
}

/// Writes patient bundles under a root directory.
#[derive(Clone, Debug)]
pub struct BundleStore {
    root: PathBuf,
}

impl BundleStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The directory a bundle is (or would be) written to.
    pub fn bundle_dir(&self, bundle: &Bundle) -> PathBuf {
        bundle.id().sharded_dir(&self.root)
    }

    /// Write every resource of `bundle` as its own file, then the whole bundle.
    ///
    /// # Arguments
    ///
    /// * `bundle` - The bundle to export.
    /// * `deadline` - If set, the export fails once this instant has passed.
    ///
    /// # Errors
    ///
    /// Returns:
    /// - `SynthError::AlreadyExported` if the bundle directory already exists,
    /// - `SynthError::StorageDirCreation` if the directory cannot be created,
    /// - `SynthError::FileWrite` or `SynthError::Fhir` if a file cannot be rendered or written,
    /// - `SynthError::BudgetExceeded` if the deadline passes.
    ///
    /// In each failure case after the directory was created, the directory is removed. If the
    /// removal itself fails, `SynthError::CleanupAfterExportFailed` carries both errors.
    pub fn write(&self, bundle: &Bundle, deadline: Option<Instant>) -> SynthResult<StoredBundle> {
        let dir = self.bundle_dir(bundle);
        if dir.exists() {
            return Err(SynthError::AlreadyExported(dir));
        }
        if let Some(parent) = dir.parent() {
            fs::create_dir_all(parent).map_err(SynthError::StorageDirCreation)?;
        }
        fs::create_dir(&dir).map_err(|e| match e.kind() {
            io::ErrorKind::AlreadyExists => SynthError::AlreadyExported(dir.clone()),
            _ => SynthError::StorageDirCreation(e),
        })?;

        let mut files = Vec::with_capacity(bundle.entries().len() + 1);
        let result = write_files(&dir, bundle, deadline, &mut files);

        match result {
            Ok(()) => {
                tracing::debug!("Wrote {} files to {}", files.len(), dir.display());
                Ok(StoredBundle { dir, files })
            }
            Err(export_error) => {
                tracing::warn!(
                    "Export to {} failed after {} files, rolling back: {}",
                    dir.display(),
                    files.len(),
                    export_error
                );
                match remove_bundle_dir_all(&dir) {
                    Ok(()) => Err(export_error),
                    Err(cleanup_error) => Err(SynthError::CleanupAfterExportFailed {
                        path: dir,
                        export_error: Box::new(export_error),
                        cleanup_error,
                    }),
                }
            }
        }
    }
}

fn check_deadline(deadline: Option<Instant>, written: usize) -> SynthResult<()> {
    match deadline {
        Some(deadline) if Instant::now() >= deadline => Err(SynthError::BudgetExceeded { written }),
        _ => Ok(()),
    }
}

fn write_files(
    dir: &Path,
    bundle: &Bundle,
    deadline: Option<Instant>,
    files: &mut Vec<PathBuf>,
) -> SynthResult<()> {
    for (position, resource) in bundle.entries().iter().enumerate() {
        check_deadline(deadline, files.len())?;
        let path = dir.join(format!(
            "{:02}-{}-{}.json",
            position,
            resource.resource_type(),
            resource.id()
        ));
        fs::write(&path, resource.render()?).map_err(SynthError::FileWrite)?;
        files.push(path);
    }

    check_deadline(deadline, files.len())?;
    let path = dir.join("bundle.json");
    fs::write(&path, bundle.render()?).map_err(SynthError::FileWrite)?;
    files.push(path);
    Ok(())
}

#[cfg(test)]
static FORCE_CLEANUP_ERROR_FOR_THREADS: LazyLock<Mutex<HashSet<std::thread::ThreadId>>> =
    LazyLock::new(|| Mutex::new(HashSet::new()));

#[cfg(test)]
fn force_cleanup_error_for_current_thread() {
    let mut guard = FORCE_CLEANUP_ERROR_FOR_THREADS
        .lock()
        .expect("FORCE_CLEANUP_ERROR_FOR_THREADS mutex poisoned");
    guard.insert(std::thread::current().id());
}

/// Removes a bundle directory and all its contents.
///
/// In test builds it can be forced to fail for the current thread.
fn remove_bundle_dir_all(dir: &Path) -> io::Result<()> {
    #[cfg(test)]
    {
        let current_id = std::thread::current().id();
        let mut guard = FORCE_CLEANUP_ERROR_FOR_THREADS
            .lock()
            .expect("FORCE_CLEANUP_ERROR_FOR_THREADS mutex poisoned");

        if guard.remove(&current_id) {
            return Err(io::Error::other("forced cleanup failure (test hook)"));
        }
    }

    fs::remove_dir_all(dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembly::assemble_bundle;
    use crate::generator::PatientGenerator;
    use crate::{CoreConfig, Knowledge};
    use chrono::{TimeZone, Utc};
    use std::sync::Arc;
    use std::time::Duration;
    use tempfile::TempDir;

    fn bundle_for(seed: u64, root: &Path) -> Bundle {
        let reference = Utc
            .with_ymd_and_hms(2025, 3, 14, 12, 0, 0)
            .single()
            .expect("valid timestamp");
        let config = Arc::new(
            CoreConfig::new(
                root.to_path_buf(),
                "synth.store".into(),
                reference,
                Duration::from_secs(5),
            )
            .expect("valid config"),
        );
        let knowledge = Arc::new(Knowledge::standard().expect("standard knowledge"));
        let generator = PatientGenerator::new(config.clone(), knowledge.clone());
        let record = generator.generate(seed).expect("generate");
        assemble_bundle(&record, &knowledge, &config).expect("assemble")
    }

    #[test]
    fn test_write_creates_one_file_per_resource() {
        let temp = TempDir::new().expect("temp dir");
        let bundle = bundle_for(1, temp.path());
        let store = BundleStore::new(temp.path());

        let stored = store.write(&bundle, None).expect("write");

        assert_eq!(stored.files.len(), bundle.entries().len() + 1);
        assert!(stored.dir.starts_with(temp.path()));
        let first = stored.files[0]
            .file_name()
            .and_then(|n| n.to_str())
            .expect("file name");
        assert!(first.starts_with("00-Patient-"), "first file {first}");

        let text = fs::read_to_string(stored.dir.join("bundle.json")).expect("read bundle");
        let parsed = Bundle::parse(&text).expect("parse bundle");
        assert_eq!(parsed, bundle);
    }

    #[test]
    fn test_second_write_is_rejected() {
        let temp = TempDir::new().expect("temp dir");
        let bundle = bundle_for(2, temp.path());
        let store = BundleStore::new(temp.path());

        store.write(&bundle, None).expect("first write");
        let err = store.write(&bundle, None).expect_err("second write");
        assert!(matches!(err, SynthError::AlreadyExported(_)));
    }

    #[test]
    fn test_deadline_rolls_back_everything() {
        let temp = TempDir::new().expect("temp dir");
        let bundle = bundle_for(3, temp.path());
        let store = BundleStore::new(temp.path());

        let err = store
            .write(&bundle, Some(Instant::now()))
            .expect_err("deadline already passed");

        assert!(matches!(err, SynthError::BudgetExceeded { written: 0 }));
        assert!(!store.bundle_dir(&bundle).exists());
    }

    #[test]
    fn test_failed_cleanup_reports_both_errors() {
        let temp = TempDir::new().expect("temp dir");
        let bundle = bundle_for(4, temp.path());
        let store = BundleStore::new(temp.path());

        force_cleanup_error_for_current_thread();
        let err = store
            .write(&bundle, Some(Instant::now()))
            .expect_err("deadline already passed");

        match err {
            SynthError::CleanupAfterExportFailed {
                path,
                export_error,
                cleanup_error,
            } => {
                assert!(matches!(*export_error, SynthError::BudgetExceeded { .. }));
                assert_eq!(cleanup_error.kind(), io::ErrorKind::Other);
                assert!(path.exists(), "bundle dir should still exist");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
