use async_trait::async_trait;

use crate::{options::instrumentation_config::InstrumentOptions, Result, SourceMap};

#[derive(Clone, Debug, PartialEq)]
pub struct InstrumentedSource {
    pub code: String,
    /// Map from the instrumented code back to the original source, when the
    /// engine produced one.
    pub source_map: Option<SourceMap>,
}

/// Coverage instrumentation engine. Rewrites script text so that executing it
/// records coverage for `file_name` on `options.coverage_global_scope`.
#[async_trait]
pub trait Instrumenter: Send + Sync {
    async fn instrument(
        &self,
        code: &str,
        file_name: &str,
        options: &InstrumentOptions,
    ) -> Result<InstrumentedSource>;
}
