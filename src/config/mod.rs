pub mod toml_config;

#[cfg(feature = "cli")]
mod cli {
    use crate::core::engine::DEFAULT_BUDGET_FACTOR;
    use crate::domain::model::FieldMapping;
    use crate::domain::ports::ConfigProvider;
    use crate::utils::error::Result;
    use crate::utils::validation::{self, Validate};
    use clap::Parser;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, Serialize, Deserialize, Parser)]
    #[command(name = "secret-santa")]
    #[command(about = "Draw Secret Santa pairs that avoid last year's assignments")]
    pub struct CliConfig {
        /// CSV file with one row per participant
        #[arg(short, long)]
        pub participants: String,

        /// CSV file with previous assignments to avoid
        #[arg(long)]
        pub prior_pairs: Option<String>,

        #[arg(long, default_value = "./output")]
        pub output_path: String,

        #[arg(long, value_delimiter = ',', default_value = "csv")]
        pub output_formats: Vec<String>,

        /// Seed for a reproducible draw
        #[arg(long)]
        pub seed: Option<u64>,

        #[arg(long, default_value = "5")]
        pub max_attempts: u32,

        /// Search budget is this factor times the participant count squared
        #[arg(long, default_value_t = DEFAULT_BUDGET_FACTOR)]
        pub budget_factor: usize,

        /// Abandon the draw after this many seconds
        #[arg(long)]
        pub timeout_seconds: Option<u64>,

        #[arg(long, help = "Enable verbose output")]
        pub verbose: bool,

        #[arg(long, help = "Emit logs as JSON lines")]
        pub log_json: bool,

        #[arg(skip)]
        #[serde(default)]
        pub fields: FieldMapping,
    }

    impl ConfigProvider for CliConfig {
        fn participants_file(&self) -> &str {
            &self.participants
        }

        fn prior_pairs_file(&self) -> Option<&str> {
            self.prior_pairs.as_deref()
        }

        fn output_path(&self) -> &str {
            &self.output_path
        }

        fn output_formats(&self) -> &[String] {
            &self.output_formats
        }

        fn fields(&self) -> &FieldMapping {
            &self.fields
        }

        fn seed(&self) -> Option<u64> {
            self.seed
        }

        fn max_attempts(&self) -> u32 {
            self.max_attempts
        }

        fn budget_factor(&self) -> usize {
            self.budget_factor
        }

        fn timeout_seconds(&self) -> Option<u64> {
            self.timeout_seconds
        }
    }

    impl Validate for CliConfig {
        fn validate(&self) -> Result<()> {
            validation::validate_path("participants", &self.participants)?;
            let mut inputs = vec![self.participants.as_str()];
            if let Some(prior) = &self.prior_pairs {
                validation::validate_path("prior_pairs", prior)?;
                inputs.push(prior);
            }
            validation::validate_file_extensions("input files", &inputs, &["csv"])?;
            validation::validate_path("output_path", &self.output_path)?;
            validation::validate_output_formats("output_formats", &self.output_formats)?;
            validation::validate_range("max_attempts", self.max_attempts, 1, 100)?;
            validation::validate_positive_number("budget_factor", self.budget_factor, 1)?;
            if let Some(seconds) = self.timeout_seconds {
                validation::validate_range("timeout_seconds", seconds, 1, 3_600)?;
            }
            Ok(())
        }
    }

}

#[cfg(feature = "cli")]
pub use cli::CliConfig;
