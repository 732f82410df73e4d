use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use synth_core::config::{
    output_dir_from_env_value, patient_budget_from_env_value, patient_count_from_env_value,
    reference_time_from_env_value, seed_from_env_value,
};
use synth_core::constants::DEFAULT_NAMESPACE;
use synth_core::{
    BundleStore, CoreConfig, ErrorKind, Knowledge, PatientGenerator, SynthError, assemble_bundle,
    patient_seed,
};

/// Patients generated concurrently before their bundles are exported.
const BATCH_SIZE: u64 = 64;

/// Outcome counts for one run.
#[derive(Debug, Default)]
struct RunSummary {
    exported: usize,
    generation_failed: usize,
    export_failed: usize,
}

/// Main entry point for the batch runner
///
/// Generates a run of synthetic patients and exports one bundle directory per patient.
/// Records are generated concurrently on blocking workers; each patient's bundle is exported
/// sequentially once its record is final, so a failure is attributable to one patient.
///
/// # Environment Variables
/// - `SYNTH_PATIENT_COUNT`: Number of patients (default: 1)
/// - `SYNTH_SEED`: Run seed (default: random, logged so the run can be reproduced)
/// - `SYNTH_OUTPUT_DIR`: Export directory (default: "synthetic_patients")
/// - `SYNTH_REFERENCE_DATE`: "Today" for the run, RFC 3339 or YYYY-MM-DD (default: now)
/// - `SYNTH_NAMESPACE`: Label resource ids are derived from (default: "synth.local")
/// - `SYNTH_PATIENT_BUDGET_SECS`: Export budget per patient (default: 10)
///
/// # Returns
/// * `Ok(())` - If the run completed, even when individual patients were skipped
/// * `Err(anyhow::Error)` - If configuration is invalid or the output directory is unusable
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive("synth=info".parse()?))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let count = patient_count_from_env_value(std::env::var("SYNTH_PATIENT_COUNT").ok())?;
    let run_seed = seed_from_env_value(std::env::var("SYNTH_SEED").ok())?;
    let output_dir = output_dir_from_env_value(std::env::var("SYNTH_OUTPUT_DIR").ok());
    let reference_time = reference_time_from_env_value(std::env::var("SYNTH_REFERENCE_DATE").ok())?;
    let namespace = std::env::var("SYNTH_NAMESPACE").unwrap_or_else(|_| DEFAULT_NAMESPACE.into());
    let budget = patient_budget_from_env_value(std::env::var("SYNTH_PATIENT_BUDGET_SECS").ok())?;

    let config = Arc::new(CoreConfig::new(
        output_dir,
        namespace,
        reference_time,
        budget,
    )?);
    let knowledge = Arc::new(Knowledge::standard()?);
    std::fs::create_dir_all(config.output_dir()).map_err(SynthError::StorageDirCreation)?;

    tracing::info!(
        "++ Generating {} patients with run seed {} (reference {}) into {}",
        count,
        run_seed,
        config.reference_time(),
        config.output_dir().display()
    );

    let generator = PatientGenerator::new(config.clone(), knowledge.clone());
    let store = BundleStore::new(config.output_dir());
    let mut summary = RunSummary::default();

    let count = count as u64;
    let mut batch_start = 0;
    while batch_start < count {
        let batch_end = (batch_start + BATCH_SIZE).min(count);
        let tasks: Vec<_> = (batch_start..batch_end)
            .map(|index| {
                let generator = generator.clone();
                let seed = patient_seed(run_seed, index);
                tokio::task::spawn_blocking(move || (index, seed, generator.generate(seed)))
            })
            .collect();

        for task in tasks {
            let (index, seed, result) = task.await?;
            export_patient(&generator, &store, index, seed, result, &mut summary)?;
        }
        batch_start = batch_end;
    }

    tracing::info!(
        "++ Run finished: {} exported, {} failed generation, {} failed export",
        summary.exported,
        summary.generation_failed,
        summary.export_failed
    );
    Ok(())
}

/// Assemble and export one generated patient, classifying any failure.
///
/// Configuration errors abort the run; generation and export errors skip the patient.
fn export_patient(
    generator: &PatientGenerator,
    store: &BundleStore,
    index: u64,
    seed: u64,
    result: Result<synth_core::PatientRecord, SynthError>,
    summary: &mut RunSummary,
) -> anyhow::Result<()> {
    let bundle = result.and_then(|record| {
        assemble_bundle(&record, generator.knowledge(), generator.config())
    });
    let bundle = match bundle {
        Ok(bundle) => bundle,
        Err(e) if e.kind() == ErrorKind::Configuration => return Err(e.into()),
        Err(e) => {
            tracing::error!("Skipping patient {} (seed {}): {}", index, seed, e);
            summary.generation_failed += 1;
            return Ok(());
        }
    };

    let deadline = Instant::now() + generator.config().patient_budget();
    match store.write(&bundle, Some(deadline)) {
        Ok(stored) => {
            tracing::debug!(
                "Exported patient {} (seed {}) to {}",
                index,
                seed,
                stored.dir.display()
            );
            summary.exported += 1;
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::Configuration => Err(e.into()),
        Err(e) => {
            tracing::error!("Export of patient {} (seed {}) failed: {}", index, seed, e);
            summary.export_failed += 1;
            Ok(())
        }
    }
}
