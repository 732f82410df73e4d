use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;
use synth_core::config::{
    output_dir_from_env_value, patient_budget_from_env_value, reference_time_from_env_value,
};
use synth_core::constants::DEFAULT_NAMESPACE;
use synth_core::record::PatientRecord;
use synth_core::{
    assemble_bundle, patient_seed, BloodPressureClass, BundleStore, CoreConfig,
    GenerationOverrides, Knowledge, PatientGenerator,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "synth")]
#[command(about = "Synthetic geriatric patient record generator CLI")]
struct Cli {
    /// Reference date ("today"), RFC 3339 or YYYY-MM-DD (defaults to SYNTH_REFERENCE_DATE, then now)
    #[arg(long, global = true)]
    reference_date: Option<String>,
    /// Namespace resource ids are derived from (defaults to SYNTH_NAMESPACE)
    #[arg(long, global = true)]
    namespace: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate patients and export their bundles
    Generate {
        /// Run seed
        seed: u64,
        /// Number of patients
        #[arg(long, default_value_t = 1)]
        count: u64,
        /// Output directory (defaults to SYNTH_OUTPUT_DIR)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Print one patient's timeline
    Timeline {
        /// Patient seed
        seed: u64,
        /// Fixed number of random condition slots
        #[arg(long)]
        slots: Option<usize>,
        /// Fixed blood glucose (mg/dL)
        #[arg(long)]
        glucose: Option<u32>,
        /// Fixed blood-pressure class
        #[arg(long, value_enum)]
        blood_pressure: Option<BloodPressureArg>,
        /// Print the whole record as JSON
        #[arg(long)]
        json: bool,
    },
    /// List the condition catalog
    Catalog {
        /// List medications instead
        #[arg(long)]
        medications: bool,
    },
    /// Summarise an exported bundle.json
    Inspect {
        /// Path to a bundle.json file
        path: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum BloodPressureArg {
    Normal,
    PreHypertension,
    Hypertension,
}

impl From<BloodPressureArg> for BloodPressureClass {
    fn from(value: BloodPressureArg) -> Self {
        match value {
            BloodPressureArg::Normal => BloodPressureClass::Normal,
            BloodPressureArg::PreHypertension => BloodPressureClass::PreHypertension,
            BloodPressureArg::Hypertension => BloodPressureClass::Hypertension,
        }
    }
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive("synth=info".parse()?))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Generate {
            seed,
            count,
            output,
        }) => {
            let output = output
                .unwrap_or_else(|| output_dir_from_env_value(std::env::var("SYNTH_OUTPUT_DIR").ok()));
            let generator = generator(cli.reference_date, cli.namespace, output)?;
            let store = BundleStore::new(generator.config().output_dir());

            for index in 0..count {
                let patient = patient_seed(seed, index);
                let record = match generator.generate(patient) {
                    Ok(record) => record,
                    Err(e) => {
                        tracing::error!("Error generating patient {} (seed {}): {}", index, patient, e);
                        continue;
                    }
                };
                let bundle = assemble_bundle(&record, generator.knowledge(), generator.config())?;
                match store.write(&bundle, None) {
                    Ok(stored) => println!(
                        "Patient {} (seed {}): {} files in {}",
                        index,
                        patient,
                        stored.files.len(),
                        stored.dir.display()
                    ),
                    Err(e) => tracing::error!("Error exporting patient {}: {}", index, e),
                }
            }
        }
        Some(Commands::Timeline {
            seed,
            slots,
            glucose,
            blood_pressure,
            json,
        }) => {
            let generator = generator(cli.reference_date, cli.namespace, PathBuf::from("unused"))?;
            let overrides = GenerationOverrides {
                slot_count: slots,
                glucose,
                blood_pressure: blood_pressure.map(BloodPressureClass::from),
            };
            let record = generator.generate_with(seed, &overrides)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&record)?);
            } else {
                print_timeline(&record, generator.knowledge())?;
            }
        }
        Some(Commands::Catalog { medications }) => {
            let knowledge = Knowledge::standard()?;
            if medications {
                for entry in knowledge.medications() {
                    println!("{:>3}  {:<8}  {}", entry.id.0, entry.rxnorm, entry.display());
                }
            } else {
                for entry in knowledge.conditions() {
                    println!(
                        "{:>3}  {:<7}  {:<45}  gate={:?}{}",
                        entry.id.0,
                        entry.icd9,
                        entry.display,
                        entry.gate,
                        if entry.common { "  common" } else { "" }
                    );
                }
            }
        }
        Some(Commands::Inspect { path }) => {
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("reading {}", path.display()))?;
            let bundle = fhir::Bundle::parse(&text)?;
            println!("Bundle {} at {}", bundle.id(), bundle.timestamp());
            for resource_type in [
                "Patient",
                "Medication",
                "Encounter",
                "Observation",
                "Condition",
                "Procedure",
                "MedicationStatement",
                "AllergyIntolerance",
            ] {
                println!("  {:<20} {}", resource_type, bundle.count_of(resource_type));
            }
        }
        None => {
            println!("Use 'synth --help' for commands");
        }
    }

    Ok(())
}

fn generator(
    reference_date: Option<String>,
    namespace: Option<String>,
    output_dir: PathBuf,
) -> anyhow::Result<PatientGenerator> {
    let reference_time = reference_time_from_env_value(
        reference_date.or_else(|| std::env::var("SYNTH_REFERENCE_DATE").ok()),
    )?;
    let namespace = namespace
        .or_else(|| std::env::var("SYNTH_NAMESPACE").ok())
        .unwrap_or_else(|| DEFAULT_NAMESPACE.into());
    let budget = patient_budget_from_env_value(std::env::var("SYNTH_PATIENT_BUDGET_SECS").ok())?;

    let config = CoreConfig::new(output_dir, namespace, reference_time, budget)?;
    Ok(PatientGenerator::new(
        Arc::new(config),
        Arc::new(Knowledge::standard()?),
    ))
}

fn print_timeline(record: &PatientRecord, knowledge: &Knowledge) -> anyhow::Result<()> {
    let patient = &record.patient;
    println!(
        "{} ({:?}), born {}, age {}",
        patient.name.full(),
        patient.sex,
        patient.birth_date,
        patient.age_on(record.reference_time.date_naive())
    );
    println!(
        "Glucose {} mg/dL, BP {}/{} ({:?}), BMI {}",
        record.physiology.glucose_mg_dl,
        record.physiology.systolic_mmhg,
        record.physiology.diastolic_mmhg,
        record.physiology.blood_pressure,
        record.physiology.bmi()
    );
    if let Some(death) = record.death() {
        let cause = knowledge.condition(death.cause)?;
        println!("Died {} of {}", death.at.format("%Y-%m-%d %H:%M"), cause.display);
    }

    println!("\nConditions:");
    for instance in &record.conditions {
        let entry = knowledge.condition(instance.condition)?;
        let outcome = match (instance.abatement, instance.fatal_at, instance.projected_resolution) {
            (Some(at), _, _) => format!("resolved {}", at.format("%Y-%m-%d")),
            (None, Some(at), _) => format!("fatal {}", at.format("%Y-%m-%d %H:%M")),
            (None, None, Some(at)) => format!("expected to resolve {}", at.format("%Y-%m-%d")),
            (None, None, None) => "active".to_string(),
        };
        println!(
            "  {}  {:<45} {}",
            instance.onset.format("%Y-%m-%d"),
            entry.display,
            outcome
        );
    }

    println!("\nEncounters:");
    let mut encounters: Vec<_> = record.encounters.iter().collect();
    encounters.sort_by_key(|e| e.period.start());
    for encounter in encounters {
        println!(
            "  {:>4}  {} -> {}  {:?}  {}",
            encounter.id.to_string(),
            encounter.period.start().format("%Y-%m-%d %H:%M"),
            encounter.period.end().format("%Y-%m-%d %H:%M"),
            encounter.kind,
            encounter.reason.text
        );
    }

    println!("\nProcedures:");
    for procedure in &record.procedures {
        println!(
            "  {}  {} ({})  {}",
            procedure.period.start().format("%Y-%m-%d %H:%M"),
            procedure.name,
            procedure.code,
            if procedure.successful { "successful" } else { "unsuccessful" }
        );
    }

    println!("\nMedications:");
    for course in &record.medication_courses {
        let end = course
            .end
            .map(|end| end.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "ongoing".into());
        println!(
            "  {} -> {}  {}",
            course.start.format("%Y-%m-%d"),
            end,
            course.display
        );
    }
    Ok(())
}
