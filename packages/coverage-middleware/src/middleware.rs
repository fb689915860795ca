use std::{path::PathBuf, sync::Arc};

use http::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::{
    eligibility::should_instrument_resource,
    excludes::EffectiveExcludeSet,
    instrumenter::Instrumenter,
    metadata::{CrateMetadata, MetadataSource, PackageMetadata},
    options::{instrumentation_config::InstrumentationConfig, middleware_options::MiddlewareOptions},
    reporter::{is_empty_payload, CoverageReporter},
    request::CoverageRequest,
    resources::ResourceReader,
    transform::{transform_resource, TransformedResource},
    CoverageError, Result,
};

pub const PING_PATH: &str = "/.ui5/coverage/ping";
pub const REPORT_PATH: &str = "/.ui5/coverage/report";
pub const REPORT_VIEWER_PATH: &str = "/.ui5/coverage/report/html";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PingResponse {
    pub version: String,
}

/// What the host should do with a request.
#[derive(Clone, Debug, PartialEq)]
pub enum Dispatch {
    Ping(PingResponse),
    /// Report produced by the coverage reporter, returned verbatim.
    Report(Value),
    /// Serve `path` from the static report files below `root`.
    ReportViewer { root: PathBuf, path: String },
    Instrumented(TransformedResource),
    /// Not handled here, pass on to the next stage.
    Next,
}

/// Coverage endpoints and on-the-fly instrumentation for one serving pipeline.
/// Everything request handling depends on is computed in [`CoverageMiddlewareBuilder::build`].
pub struct CoverageMiddleware {
    config: InstrumentationConfig,
    excludes: EffectiveExcludeSet,
    metadata: PackageMetadata,
    resources: Arc<dyn ResourceReader>,
    instrumenter: Arc<dyn Instrumenter>,
    reporter: Arc<dyn CoverageReporter>,
}

pub struct CoverageMiddlewareBuilder {
    configuration: Option<Value>,
    metadata: Arc<dyn MetadataSource>,
    resources: Arc<dyn ResourceReader>,
    instrumenter: Arc<dyn Instrumenter>,
    reporter: Arc<dyn CoverageReporter>,
}

impl CoverageMiddlewareBuilder {
    /// The middleware's `configuration` block, see [`MiddlewareOptions`].
    pub fn configuration(mut self, configuration: Value) -> Self {
        self.configuration = Some(configuration);
        self
    }

    pub fn metadata(mut self, metadata: Arc<dyn MetadataSource>) -> Self {
        self.metadata = metadata;
        self
    }

    pub async fn build(self) -> Result<CoverageMiddleware> {
        let MiddlewareOptions {
            config,
            exclude_patterns,
        } = MiddlewareOptions::from_configuration(self.configuration.as_ref())?;

        let excludes = EffectiveExcludeSet::resolve(exclude_patterns, self.resources.as_ref()).await?;
        let metadata = self.metadata.load().await?;

        debug!(
            "Coverage middleware {}@{} initialized with {} exclude pattern(s)",
            metadata.name,
            metadata.version,
            excludes.patterns().len()
        );

        Ok(CoverageMiddleware {
            config,
            excludes,
            metadata,
            resources: self.resources,
            instrumenter: self.instrumenter,
            reporter: self.reporter,
        })
    }
}

impl CoverageMiddleware {
    pub fn builder(
        resources: Arc<dyn ResourceReader>,
        instrumenter: Arc<dyn Instrumenter>,
        reporter: Arc<dyn CoverageReporter>,
    ) -> CoverageMiddlewareBuilder {
        CoverageMiddlewareBuilder {
            configuration: None,
            metadata: Arc::new(CrateMetadata),
            resources,
            instrumenter,
            reporter,
        }
    }

    pub fn config(&self) -> &InstrumentationConfig {
        &self.config
    }

    pub fn excludes(&self) -> &EffectiveExcludeSet {
        &self.excludes
    }

    pub fn metadata(&self) -> &PackageMetadata {
        &self.metadata
    }

    pub async fn handle(&self, request: &CoverageRequest) -> Result<Dispatch> {
        let path = request.path.as_str();

        if request.method == Method::GET && path == PING_PATH {
            return Ok(Dispatch::Ping(PingResponse {
                version: self.metadata.version.clone(),
            }));
        }

        if request.method == Method::POST && path == REPORT_PATH {
            return self.report(request.body.as_ref()).await;
        }

        if request.method == Method::GET && is_report_viewer_path(path) {
            return Ok(Dispatch::ReportViewer {
                root: self.config.report_root(),
                path: path[REPORT_PATH.len()..].to_string(),
            });
        }

        if request.method != Method::GET
            || !should_instrument_resource(request, self.excludes.patterns())
        {
            return Ok(Dispatch::Next);
        }

        let transformed = transform_resource(
            path,
            self.resources.as_ref(),
            self.instrumenter.as_ref(),
            &self.config.instrument,
        )
        .await?;

        Ok(transformed.map_or(Dispatch::Next, Dispatch::Instrumented))
    }

    async fn report(&self, payload: Option<&Value>) -> Result<Dispatch> {
        let payload = match payload {
            Some(payload) if !is_empty_payload(Some(payload)) => payload,
            _ => return Err(CoverageError::NoReportData),
        };

        let report = self
            .reporter
            .report(payload, &self.config, self.resources.as_ref())
            .await?;

        report.map(Dispatch::Report).ok_or(CoverageError::NoReportData)
    }
}

fn is_report_viewer_path(path: &str) -> bool {
    match path.strip_prefix(REPORT_VIEWER_PATH) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}
