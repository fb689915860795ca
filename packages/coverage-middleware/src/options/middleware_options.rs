use serde_json::Value;

use super::instrumentation_config::InstrumentationConfig;
use crate::{
    excludes::{parse_configured_patterns, ExcludePattern},
    Result,
};

/// The `configuration` block handed to the middleware:
///
/// ```json
/// {
///   "cwd": "./",
///   "instrument": { "produceSourceMap": true },
///   "report": { "report-dir": "./tmp/coverage-reports", "reporter": ["html"] },
///   "excludePatterns": ["/resources/my/app/test/"]
/// }
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct MiddlewareOptions {
    pub config: InstrumentationConfig,
    /// `None` when the library descriptors decide what is excluded.
    pub exclude_patterns: Option<Vec<ExcludePattern>>,
}

impl MiddlewareOptions {
    pub fn from_configuration(configuration: Option<&Value>) -> Result<MiddlewareOptions> {
        let config = InstrumentationConfig::build(configuration);
        let exclude_patterns =
            parse_configured_patterns(configuration.and_then(|c| c.get("excludePatterns")))?;

        Ok(MiddlewareOptions {
            config,
            exclude_patterns,
        })
    }
}

impl Default for MiddlewareOptions {
    fn default() -> Self {
        MiddlewareOptions {
            config: Default::default(),
            exclude_patterns: None,
        }
    }
}
