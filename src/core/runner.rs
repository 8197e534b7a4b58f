use crate::domain::ports::Pipeline;
use crate::utils::error::Result;
use serde::Serialize;
use std::time::Instant;

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub output_paths: Vec<String>,
    pub pair_count: usize,
    pub seed: u64,
    pub attempts: u32,
    pub steps: usize,
}

pub struct SantaRunner<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> SantaRunner<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub async fn run(&self) -> Result<RunReport> {
        let started = Instant::now();
        tracing::info!("🎅 Starting Secret Santa draw");

        tracing::info!("📥 Reading participants and prior pairs...");
        let input = self.pipeline.extract().await?;
        tracing::info!(
            "📥 Read {} participants, {} prior pairs",
            input.participants.len(),
            input.prior_pairs.len()
        );

        tracing::info!("🎲 Drawing assignments...");
        let result = self.pipeline.transform(input).await?;
        tracing::info!(
            "🎲 Drew {} pairs (seed {}, attempts {}, steps {})",
            result.records.len(),
            result.assignment.seed,
            result.attempts,
            result.assignment.steps
        );

        let pair_count = result.records.len();
        let seed = result.assignment.seed;
        let attempts = result.attempts;
        let steps = result.assignment.steps;

        tracing::info!("💾 Writing results...");
        let output_paths = self.pipeline.load(result).await?;
        for path in &output_paths {
            tracing::info!("📁 Output saved to: {}", path);
        }

        tracing::info!("✅ Draw finished in {:?}", started.elapsed());
        Ok(RunReport {
            output_paths,
            pair_count,
            seed,
            attempts,
            steps,
        })
    }
}
