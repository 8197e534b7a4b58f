use crate::core::engine::DEFAULT_BUDGET_FACTOR;
use crate::domain::model::FieldMapping;
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{Result, SantaError};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub draw: DrawConfig,
    pub source: SourceConfig,
    #[serde(default)]
    pub fields: FieldMapping,
    #[serde(default)]
    pub engine: EngineConfig,
    pub load: LoadConfig,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DrawConfig {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub participants_file: String,
    pub prior_pairs_file: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub seed: Option<u64>,
    pub max_attempts: Option<u32>,
    pub budget_factor: Option<usize>,
    pub timeout_seconds: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            seed: None,
            max_attempts: Some(5),
            budget_factor: Some(DEFAULT_BUDGET_FACTOR),
            timeout_seconds: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadConfig {
    pub output_path: String,
    pub output_formats: Vec<String>,
    /// Output file name without extension.
    pub filename: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub verbose: Option<bool>,
    pub json_logs: Option<bool>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(SantaError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| SantaError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${SANTA_DATA_DIR})，未設定的保持原樣
    fn substitute_env_vars(content: &str) -> String {
        static ENV_VAR: OnceLock<Regex> = OnceLock::new();
        let re = ENV_VAR.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("valid env pattern"));

        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .into_owned()
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_non_empty_string("draw.name", &self.draw.name)?;
        validation::validate_path("source.participants_file", &self.source.participants_file)?;

        let mut inputs = vec![self.source.participants_file.as_str()];
        if let Some(prior) = &self.source.prior_pairs_file {
            validation::validate_path("source.prior_pairs_file", prior)?;
            inputs.push(prior.as_str());
        }
        validation::validate_file_extensions("source", &inputs, &["csv"])?;

        validation::validate_path("load.output_path", &self.load.output_path)?;
        validation::validate_output_formats("load.output_formats", &self.load.output_formats)?;
        if let Some(filename) = &self.load.filename {
            validation::validate_non_empty_string("load.filename", filename)?;
        }

        let fields = &self.fields;
        for (name, value) in [
            ("fields.participant_id", &fields.participant_id),
            ("fields.participant_name", &fields.participant_name),
            ("fields.prior_giver_id", &fields.prior_giver_id),
            ("fields.prior_receiver_id", &fields.prior_receiver_id),
        ] {
            validation::validate_non_empty_string(name, value)?;
        }

        let max_attempts = *validation::validate_required_field(
            "engine.max_attempts",
            &self.engine.max_attempts,
        )?;
        validation::validate_range("engine.max_attempts", max_attempts, 1, 100)?;
        if let Some(factor) = self.engine.budget_factor {
            validation::validate_positive_number("engine.budget_factor", factor, 1)?;
        }
        if let Some(seconds) = self.engine.timeout_seconds {
            validation::validate_range("engine.timeout_seconds", seconds, 1, 3_600)?;
        }

        Ok(())
    }

    pub fn file_stem(&self) -> Option<&str> {
        self.load.filename.as_deref()
    }

    pub fn verbose(&self) -> bool {
        self.monitoring
            .as_ref()
            .and_then(|m| m.verbose)
            .unwrap_or(false)
    }

    pub fn json_logs(&self) -> bool {
        self.monitoring
            .as_ref()
            .and_then(|m| m.json_logs)
            .unwrap_or(false)
    }
}

impl ConfigProvider for TomlConfig {
    fn participants_file(&self) -> &str {
        &self.source.participants_file
    }

    fn prior_pairs_file(&self) -> Option<&str> {
        self.source.prior_pairs_file.as_deref()
    }

    fn output_path(&self) -> &str {
        &self.load.output_path
    }

    fn output_formats(&self) -> &[String] {
        &self.load.output_formats
    }

    fn fields(&self) -> &FieldMapping {
        &self.fields
    }

    fn seed(&self) -> Option<u64> {
        self.engine.seed
    }

    fn max_attempts(&self) -> u32 {
        self.engine.max_attempts.unwrap_or(5)
    }

    fn budget_factor(&self) -> usize {
        self.engine.budget_factor.unwrap_or(DEFAULT_BUDGET_FACTOR)
    }

    fn timeout_seconds(&self) -> Option<u64> {
        self.engine.timeout_seconds
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
