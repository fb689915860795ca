use async_trait::async_trait;
use indexmap::IndexMap;
use wax::{Glob, Pattern};

use super::{relative_virtual_path, Resource, ResourceReader};
use crate::{CoverageError, Result};

/// Resources held in memory, keyed by virtual path. Glob results keep
/// insertion order.
#[derive(Clone, Debug, Default)]
pub struct MemoryReader {
    resources: IndexMap<String, String>,
}

impl MemoryReader {
    pub fn new() -> MemoryReader {
        Default::default()
    }

    pub fn with_resource(mut self, path: impl Into<String>, contents: impl Into<String>) -> MemoryReader {
        self.insert(path, contents);
        self
    }

    pub fn insert(&mut self, path: impl Into<String>, contents: impl Into<String>) {
        let path: String = path.into();
        let path = format!("/{}", relative_virtual_path(&path));
        self.resources.insert(path, contents.into());
    }
}

#[async_trait]
impl ResourceReader for MemoryReader {
    async fn by_path(&self, path: &str) -> Result<Option<Resource>> {
        let path = format!("/{}", relative_virtual_path(path));
        Ok(self
            .resources
            .get(&path)
            .map(|contents| Resource::new(path.clone(), contents.clone())))
    }

    async fn by_glob(&self, pattern: &str) -> Result<Vec<Resource>> {
        let glob = Glob::new(relative_virtual_path(pattern))
            .map_err(|err| CoverageError::glob(pattern, err))?;

        Ok(self
            .resources
            .iter()
            .filter(|(path, _)| glob.is_match(relative_virtual_path(path)))
            .map(|(path, contents)| Resource::new(path.clone(), contents.clone()))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn resolves_by_path_with_or_without_leading_separator() {
        let reader = MemoryReader::new().with_resource("resources/a/B.js", "b");

        let resource = reader.by_path("/resources/a/B.js").await.unwrap().unwrap();
        assert_eq!(resource.path(), "/resources/a/B.js");
        assert_eq!(resource.as_str(), "b");

        assert!(reader.by_path("/resources/a/C.js").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn globs_in_insertion_order() {
        let reader = MemoryReader::new()
            .with_resource("/resources/z/.library", "z")
            .with_resource("/resources/a/Control.js", "c")
            .with_resource("/resources/a/b/.library", "a");

        let found = reader.by_glob("/resources/**/.library").await.unwrap();
        let paths: Vec<_> = found.iter().map(|r| r.path()).collect();
        assert_eq!(paths, vec!["/resources/z/.library", "/resources/a/b/.library"]);
    }
}
