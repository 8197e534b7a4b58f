use thiserror::Error;

/// Failures of the assignment core. The engine returns exactly one of these
/// or a complete, valid assignment.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AssignmentError {
    #[error("At least 2 participants are required, got {count}")]
    InsufficientParticipants { count: usize },

    #[error(
        "No valid assignment exists: giver '{giver}' cannot be matched ({} givers share only {} allowed receivers)",
        .over_constrained.len(),
        .available_receivers.len()
    )]
    Infeasible {
        /// A giver left unmatched by the maximum matching.
        giver: String,
        /// Givers whose allowed receivers are fewer than themselves.
        over_constrained: Vec<String>,
        /// The receivers those givers may draw from.
        available_receivers: Vec<String>,
    },

    #[error("Randomized search gave up after {steps} steps (budget {budget})")]
    SearchExhausted { steps: usize, budget: usize },
}

impl AssignmentError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, AssignmentError::SearchExhausted { .. })
    }
}

#[derive(Error, Debug)]
pub enum SantaError {
    #[error(transparent)]
    Assignment(#[from] AssignmentError),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Record {record} is missing required field '{field}'")]
    MissingField { record: usize, field: String },

    #[error("Participant id '{id}' appears more than once (record {record})")]
    DuplicateParticipant { id: String, record: usize },

    #[error("No participants found in input")]
    NoParticipants,

    #[error("Assignment did not finish within {seconds}s")]
    Timeout { seconds: u64 },

    #[error("Background task failed: {message}")]
    TaskFailed { message: String },

    #[error("Unsupported output format: {format}")]
    UnsupportedFormat { format: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Constraint,
    Search,
    Io,
    Config,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ErrorSeverity {
    /// Process exit code for the CLI binaries.
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorSeverity::Low => 0,      // 警告，但成功
            ErrorSeverity::Medium => 2,   // 可重試
            ErrorSeverity::High => 1,     // 輸入或限制條件錯誤
            ErrorSeverity::Critical => 3, // 系統錯誤
        }
    }
}

impl SantaError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            SantaError::Assignment(AssignmentError::SearchExhausted { .. }) => {
                ErrorCategory::Search
            }
            SantaError::Assignment(_) => ErrorCategory::Constraint,
            SantaError::CsvError(_)
            | SantaError::MissingField { .. }
            | SantaError::DuplicateParticipant { .. }
            | SantaError::NoParticipants => ErrorCategory::Input,
            SantaError::IoError(_) | SantaError::SerializationError(_) => ErrorCategory::Io,
            SantaError::ConfigError { .. }
            | SantaError::ConfigValidationError { .. }
            | SantaError::InvalidConfigValueError { .. }
            | SantaError::MissingConfigError { .. }
            | SantaError::UnsupportedFormat { .. } => ErrorCategory::Config,
            SantaError::Timeout { .. } | SantaError::TaskFailed { .. } => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            SantaError::Assignment(e) if e.is_retryable() => ErrorSeverity::Medium,
            SantaError::Timeout { .. } => ErrorSeverity::Medium,
            SantaError::TaskFailed { .. } | SantaError::IoError(_) => ErrorSeverity::Critical,
            _ => ErrorSeverity::High,
        }
    }

    pub fn is_retryable(&self) -> bool {
        self.severity() == ErrorSeverity::Medium
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            SantaError::Assignment(AssignmentError::InsufficientParticipants { .. }) => {
                "Add at least two participants to the participants file".to_string()
            }
            SantaError::Assignment(AssignmentError::Infeasible {
                over_constrained, ..
            }) => format!(
                "Drop some prior pairs for {} or add more participants",
                over_constrained.join(", ")
            ),
            SantaError::Assignment(AssignmentError::SearchExhausted { .. }) => {
                "Run again with a different seed or raise the step budget factor".to_string()
            }
            SantaError::CsvError(_) => {
                "Check that the file is valid CSV with a header row".to_string()
            }
            SantaError::MissingField { field, .. } => {
                format!("Fill in the '{}' column for every row", field)
            }
            SantaError::DuplicateParticipant { id, .. } => {
                format!("Remove the duplicate row for '{}'", id)
            }
            SantaError::NoParticipants => {
                "The participants file has a header but no rows".to_string()
            }
            SantaError::IoError(_) => "Check file paths and permissions".to_string(),
            SantaError::Timeout { .. } => {
                "Increase the timeout or retry with a different seed".to_string()
            }
            SantaError::UnsupportedFormat { .. } => {
                "Use one of: csv, tsv, json".to_string()
            }
            SantaError::ConfigError { .. }
            | SantaError::ConfigValidationError { .. }
            | SantaError::InvalidConfigValueError { .. }
            | SantaError::MissingConfigError { .. } => {
                "Review the configuration file or command-line flags".to_string()
            }
            SantaError::SerializationError(_) | SantaError::TaskFailed { .. } => {
                "This is likely a bug; re-run with --verbose and report it".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            SantaError::Assignment(AssignmentError::Infeasible { giver, .. }) => format!(
                "Nobody is left for {} to draw without repeating a previous pairing",
                giver
            ),
            SantaError::Assignment(AssignmentError::InsufficientParticipants { count }) => {
                format!("A draw needs at least 2 people, found {}", count)
            }
            SantaError::NoParticipants => "No participants found in uploaded CSV.".to_string(),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SantaError>;
