use regex::Regex;
use serde_json::Value;
use tracing::warn;

use crate::{resources::ResourceReader, CoverageError, Result};

mod library_descriptor;
mod library_excludes;

pub use library_descriptor::{ExcludeDeclaration, LibraryDescriptor};
pub use library_excludes::{
    compile_exclude_declaration, extract_library_exclude_patterns, LIBRARY_DESCRIPTOR_GLOB,
};

#[derive(Clone, Debug, PartialEq)]
pub enum ExcludeOrigin {
    /// Declared in the `.library` descriptor of `library`.
    Library { library: String, declaration: String },
    /// Listed in the middleware's `excludePatterns` configuration.
    Configured,
}

#[derive(Clone, Debug)]
pub struct ExcludePattern {
    regex: Regex,
    origin: ExcludeOrigin,
}

impl ExcludePattern {
    pub fn new(regex: Regex, origin: ExcludeOrigin) -> ExcludePattern {
        ExcludePattern { regex, origin }
    }

    pub fn configured(pattern: &str) -> Result<ExcludePattern> {
        let regex = Regex::new(pattern).map_err(|source| CoverageError::InvalidExcludePattern {
            pattern: pattern.to_string(),
            source,
        })?;

        Ok(ExcludePattern::new(regex, ExcludeOrigin::Configured))
    }

    pub fn is_match(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    pub fn origin(&self) -> &ExcludeOrigin {
        &self.origin
    }
}

impl PartialEq for ExcludePattern {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str() && self.origin == other.origin
    }
}

/// Exclude patterns applied to requests. A configured list replaces the
/// library-derived patterns entirely.
#[derive(Clone, Debug, PartialEq)]
pub enum EffectiveExcludeSet {
    Configured(Vec<ExcludePattern>),
    Library(Vec<ExcludePattern>),
}

impl EffectiveExcludeSet {
    /// Library descriptors are only scanned when no configured list is present.
    pub async fn resolve(
        configured: Option<Vec<ExcludePattern>>,
        reader: &dyn ResourceReader,
    ) -> Result<EffectiveExcludeSet> {
        match configured {
            Some(patterns) if !patterns.is_empty() => Ok(EffectiveExcludeSet::Configured(patterns)),
            _ => Ok(EffectiveExcludeSet::Library(
                extract_library_exclude_patterns(reader).await?,
            )),
        }
    }

    pub fn patterns(&self) -> &[ExcludePattern] {
        match self {
            EffectiveExcludeSet::Configured(patterns) | EffectiveExcludeSet::Library(patterns) => {
                patterns
            }
        }
    }
}

/// Reads `excludePatterns` from the middleware configuration. `null`, a missing
/// key and an empty list all mean "not configured".
pub fn parse_configured_patterns(value: Option<&Value>) -> Result<Option<Vec<ExcludePattern>>> {
    let entries = match value {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Array(entries)) => entries,
        Some(other) => {
            warn!("Ignoring excludePatterns, expected a list but got {}", other);
            return Ok(None);
        }
    };

    let mut patterns = Vec::with_capacity(entries.len());
    for entry in entries {
        match entry {
            Value::String(pattern) => patterns.push(ExcludePattern::configured(pattern)?),
            other => warn!("Ignoring exclude pattern {}, expected a string", other),
        }
    }

    Ok(if patterns.is_empty() {
        None
    } else {
        Some(patterns)
    })
}
