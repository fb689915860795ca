use thiserror::Error;

pub type Result<T> = std::result::Result<T, CoverageError>;

#[derive(Debug, Error)]
pub enum CoverageError {
    /// Report endpoint was called without coverage data, or the aggregator
    /// had nothing to report.
    #[error("No report data provided")]
    NoReportData,

    #[error("Invalid exclude pattern `{pattern}`: {source}")]
    InvalidExcludePattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Could not read resource {path}: {message}")]
    Resource { path: String, message: String },

    #[error("Invalid glob `{pattern}`: {message}")]
    Glob { pattern: String, message: String },

    #[error("Instrumentation of {path} failed: {message}")]
    Instrumentation { path: String, message: String },

    #[error("Coverage report generation failed: {message}")]
    Report { message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CoverageError {
    pub fn resource(path: impl Into<String>, message: impl ToString) -> Self {
        Self::Resource {
            path: path.into(),
            message: message.to_string(),
        }
    }

    pub fn glob(pattern: impl Into<String>, message: impl ToString) -> Self {
        Self::Glob {
            pattern: pattern.into(),
            message: message.to_string(),
        }
    }

    pub fn instrumentation(path: impl Into<String>, message: impl ToString) -> Self {
        Self::Instrumentation {
            path: path.into(),
            message: message.to_string(),
        }
    }

    pub fn report(message: impl ToString) -> Self {
        Self::Report {
            message: message.to_string(),
        }
    }
}
