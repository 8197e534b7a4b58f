pub mod engine;
pub mod matching;
pub mod pipeline;
pub mod runner;
pub mod search;

pub use crate::domain::model::{Assignment, DrawInput, DrawResult, ForbiddenPair, Participant};
pub use crate::domain::ports::{ConfigProvider, Pipeline, RecordSink, RecordSource, Storage};
pub use crate::utils::error::Result;
