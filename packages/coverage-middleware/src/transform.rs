use tracing::{debug, warn};

use crate::{
    instrumenter::Instrumenter, options::instrumentation_config::InstrumentOptions,
    resources::ResourceReader, source_map::inline_source_map_comment, Result,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContentType {
    JavaScript,
}

impl ContentType {
    pub fn extension(&self) -> &'static str {
        match self {
            ContentType::JavaScript => ".js",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ContentType::JavaScript => "application/javascript",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TransformedResource {
    pub text: String,
    pub content_type: ContentType,
}

/// Resolves `path`, instruments it and optionally appends the inline source
/// map. `Ok(None)` when no resource exists at `path`.
pub async fn transform_resource(
    path: &str,
    resources: &dyn ResourceReader,
    instrumenter: &dyn Instrumenter,
    options: &InstrumentOptions,
) -> Result<Option<TransformedResource>> {
    debug!("handling {}", path);

    let resource = match resources.by_path(path).await? {
        Some(resource) => resource,
        None => {
            warn!("No resource found for {}", path);
            return Ok(None);
        }
    };

    let instrumented = instrumenter
        .instrument(resource.as_str(), path, options)
        .await?;
    debug!("...instrumented {}", path);

    let mut text = instrumented.code;

    if options.produce_source_map {
        match &instrumented.source_map {
            Some(source_map) => {
                text.push_str(&inline_source_map_comment(source_map)?);
                debug!("...added source map to {}", path);
            }
            None => warn!("No source map available for {}", path),
        }
    }

    Ok(Some(TransformedResource {
        text,
        content_type: ContentType::JavaScript,
    }))
}

#[cfg(test)]
pub(crate) mod test_utils {
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    };

    use async_trait::async_trait;
    use tracing::{Event, Level, Subscriber};
    use tracing_subscriber::{layer::Context, prelude::*, Layer};

    use crate::{
        instrumenter::{InstrumentedSource, Instrumenter},
        options::instrumentation_config::InstrumentOptions,
        CoverageError, Result, SourceMap,
    };

    /// Wraps sources into a recognizable coverage header, the way a real
    /// engine registers the file path on the coverage object.
    #[derive(Default)]
    pub struct FakeInstrumenter {
        pub without_source_map: bool,
        pub fail: bool,
        pub calls: AtomicUsize,
    }

    #[async_trait]
    impl Instrumenter for FakeInstrumenter {
        async fn instrument(
            &self,
            code: &str,
            file_name: &str,
            options: &InstrumentOptions,
        ) -> Result<InstrumentedSource> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(CoverageError::instrumentation(file_name, "Unexpected token"));
            }

            let code = format!(
                "var cov = {}; cov.__coverage__ = {{ path=\"{}\" }};\n{}",
                options.coverage_global_scope, file_name, code
            );
            let source_map = (!self.without_source_map).then(|| SourceMap {
                sources: vec![file_name.to_string()],
                mappings: ";AAAA".to_string(),
                ..Default::default()
            });

            Ok(InstrumentedSource { code, source_map })
        }
    }

    #[derive(Clone, Debug, Default, PartialEq)]
    pub struct EventCounts {
        pub debug: usize,
        pub warn: usize,
    }

    struct CountingLayer(Arc<Mutex<EventCounts>>);

    impl<S: Subscriber> Layer<S> for CountingLayer {
        fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
            if !event.metadata().target().starts_with("coverage_middleware") {
                return;
            }

            let mut counts = self.0.lock().unwrap();
            match *event.metadata().level() {
                Level::DEBUG => counts.debug += 1,
                Level::WARN => counts.warn += 1,
                _ => {}
            }
        }
    }

    /// Counts this crate's events emitted on the current thread while the
    /// guard is alive.
    pub fn count_events() -> (Arc<Mutex<EventCounts>>, tracing::subscriber::DefaultGuard) {
        let counts = Arc::new(Mutex::new(EventCounts::default()));
        let subscriber = tracing_subscriber::registry().with(CountingLayer(counts.clone()));
        let guard = tracing::subscriber::set_default(subscriber);

        (counts, guard)
    }
}
