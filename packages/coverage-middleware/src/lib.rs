mod error;
pub use error::{CoverageError, Result};

mod eligibility;
pub use eligibility::{is_instrumentation_flag_set, should_instrument_resource};

pub mod excludes;
pub use excludes::{EffectiveExcludeSet, ExcludeOrigin, ExcludePattern};

mod instrumenter;
pub use instrumenter::{InstrumentedSource, Instrumenter};

mod metadata;
pub use metadata::{read_json_file, CrateMetadata, ManifestFile, MetadataSource, PackageMetadata};

mod middleware;
pub use middleware::*;

mod options;
pub use options::instrumentation_config::*;
pub use options::middleware_options::MiddlewareOptions;

mod reporter;
pub use reporter::{is_empty_payload, CoverageReporter};

mod request;
pub use request::CoverageRequest;

pub mod resources;
pub use resources::{FileSystemReader, MemoryReader, Resource, ResourceReader};

mod source_map;
pub use source_map::{inline_source_map_comment, inline_source_map_marker, SourceMap};

mod transform;
pub use transform::{transform_resource, ContentType, TransformedResource};

// Reexports
pub use http::Method;
