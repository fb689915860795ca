use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;
use wax::Glob;

use super::{relative_virtual_path, Resource, ResourceReader};
use crate::{CoverageError, Result};

/// Serves virtual paths from files below `root`: `/resources/a/B.js` is read
/// from `<root>/resources/a/B.js`.
#[derive(Clone, Debug)]
pub struct FileSystemReader {
    root: PathBuf,
}

impl FileSystemReader {
    pub fn new(root: impl Into<PathBuf>) -> FileSystemReader {
        FileSystemReader { root: root.into() }
    }

    /// Returns `None` for paths escaping the root.
    fn resolve(&self, path: &str) -> Option<PathBuf> {
        let relative = Path::new(relative_virtual_path(path));
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));

        if escapes {
            None
        } else {
            Some(self.root.join(relative))
        }
    }
}

/// Virtual path for a file below `root`, always using forward slashes.
fn to_virtual_path(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let segments = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(segment) => segment.to_str(),
            _ => None,
        })
        .collect::<Vec<_>>();

    Some(format!("/{}", segments.join("/")))
}

async fn read_resource(path: &Path, virtual_path: String) -> Result<Option<Resource>> {
    match tokio::fs::read_to_string(path).await {
        Ok(contents) => Ok(Some(Resource::new(virtual_path, contents))),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(CoverageError::resource(virtual_path, err)),
    }
}

#[async_trait]
impl ResourceReader for FileSystemReader {
    async fn by_path(&self, path: &str) -> Result<Option<Resource>> {
        let file_path = match self.resolve(path) {
            Some(file_path) => file_path,
            None => {
                debug!("Refusing to resolve {} outside of {}", path, self.root.display());
                return Ok(None);
            }
        };

        if !file_path.is_file() {
            return Ok(None);
        }

        read_resource(&file_path, format!("/{}", relative_virtual_path(path))).await
    }

    async fn by_glob(&self, pattern: &str) -> Result<Vec<Resource>> {
        let glob_pattern = relative_virtual_path(pattern).to_string();
        let root = self.root.clone();

        // directory walking is blocking
        let matches = tokio::task::spawn_blocking(move || -> Result<Vec<(PathBuf, String)>> {
            let glob = Glob::new(&glob_pattern)
                .map_err(|err| CoverageError::glob(glob_pattern.as_str(), err))?;

            let mut matches = Vec::new();
            for entry in glob.walk(&root) {
                let entry = entry.map_err(|err| CoverageError::glob(glob_pattern.as_str(), err))?;
                let path = entry.path().to_path_buf();
                if !path.is_file() {
                    continue;
                }
                if let Some(virtual_path) = to_virtual_path(&root, &path) {
                    matches.push((path, virtual_path));
                }
            }

            matches.sort_by(|a, b| a.1.cmp(&b.1));
            Ok(matches)
        })
        .await
        .map_err(|err| CoverageError::glob(pattern, err))??;

        debug!("Glob {} matched {} file(s)", pattern, matches.len());

        let mut resources = Vec::with_capacity(matches.len());
        for (path, virtual_path) in matches {
            if let Some(resource) = read_resource(&path, virtual_path).await? {
                resources.push(resource);
            }
        }

        Ok(resources)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn write(root: &Path, relative: &str, contents: &str) {
        let path = root.join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, contents).unwrap();
    }

    #[tokio::test]
    async fn reads_resources_by_virtual_path() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "resources/ui5/lib/Control.js", "sap.ui.define([], () => {});");

        let reader = FileSystemReader::new(dir.path());
        let resource = reader
            .by_path("/resources/ui5/lib/Control.js")
            .await
            .unwrap()
            .unwrap();

        assert_eq!(resource.path(), "/resources/ui5/lib/Control.js");
        assert_eq!(resource.as_str(), "sap.ui.define([], () => {});");
    }

    #[tokio::test]
    async fn missing_and_escaping_paths_resolve_to_none() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "secret.txt", "nope");
        let reader = FileSystemReader::new(dir.path().join("webapp"));

        assert!(reader.by_path("/resources/Missing.js").await.unwrap().is_none());
        assert!(reader.by_path("/../secret.txt").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn globs_nested_library_descriptors_in_path_order() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "resources/ui5/lib2/.library", "<library/>");
        write(dir.path(), "resources/ui5/lib1/.library", "<library/>");
        write(dir.path(), "resources/ui5/lib1/Control.js", "");

        let reader = FileSystemReader::new(dir.path());
        let found = reader.by_glob("/resources/**/.library").await.unwrap();
        let paths: Vec<_> = found.iter().map(|r| r.path().to_string()).collect();

        assert_eq!(
            paths,
            vec![
                "/resources/ui5/lib1/.library".to_string(),
                "/resources/ui5/lib2/.library".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn invalid_glob_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let reader = FileSystemReader::new(dir.path());

        let err = reader.by_glob("/resources/{a").await.unwrap_err();
        assert!(matches!(err, CoverageError::Glob { .. }));
    }
}
