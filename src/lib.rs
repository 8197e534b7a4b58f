pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{CsvRecordSource, FileRecordSink, LocalStorage};
pub use crate::core::{
    engine::{AssignmentEngine, EngineOptions, StepBudget},
    pipeline::SantaPipeline,
    runner::{RunReport, SantaRunner},
};
pub use domain::model::{Assignment, FieldMapping, ForbiddenPair, Pairing, Participant, Record};
pub use utils::error::{AssignmentError, Result, SantaError};
