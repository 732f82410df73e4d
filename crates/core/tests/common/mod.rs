#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use synth_core::{CoreConfig, Knowledge, PatientGenerator};

pub fn reference_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 14, 12, 0, 0)
        .single()
        .expect("valid timestamp")
}

pub fn config() -> Arc<CoreConfig> {
    Arc::new(
        CoreConfig::new(
            PathBuf::from("unused"),
            "synth.tests".into(),
            reference_time(),
            Duration::from_secs(5),
        )
        .expect("valid config"),
    )
}

pub fn generator_with(knowledge: Knowledge) -> PatientGenerator {
    PatientGenerator::new(config(), Arc::new(knowledge))
}

pub fn standard_generator() -> PatientGenerator {
    generator_with(Knowledge::standard().expect("standard knowledge"))
}
