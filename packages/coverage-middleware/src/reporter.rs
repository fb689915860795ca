use async_trait::async_trait;
use serde_json::Value;

use crate::{
    options::instrumentation_config::InstrumentationConfig, resources::ResourceReader, Result,
};

/// Turns coverage data collected by clients into reports below
/// `config.report.report_dir`.
#[async_trait]
pub trait CoverageReporter: Send + Sync {
    /// `Ok(None)` when the payload contributed nothing to report on.
    async fn report(
        &self,
        payload: &Value,
        config: &InstrumentationConfig,
        resources: &dyn ResourceReader,
    ) -> Result<Option<Value>>;
}

/// `null`, empty objects and empty arrays carry no coverage data.
pub fn is_empty_payload(payload: Option<&Value>) -> bool {
    match payload {
        None | Some(Value::Null) => true,
        Some(Value::Object(map)) => map.is_empty(),
        Some(Value::Array(items)) => items.is_empty(),
        Some(_) => false,
    }
}
