use async_trait::async_trait;

use crate::Result;

mod file_system;
mod memory;

pub use file_system::FileSystemReader;
pub use memory::MemoryReader;

/// A resolved resource, addressed by its virtual path (e.g. `/resources/ui5/lib/Control.js`).
#[derive(Clone, Debug, PartialEq)]
pub struct Resource {
    path: String,
    contents: String,
}

impl Resource {
    pub fn new(path: impl Into<String>, contents: impl Into<String>) -> Resource {
        Resource {
            path: path.into(),
            contents: contents.into(),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn as_str(&self) -> &str {
        &self.contents
    }
}

/// Resolution layer supplying resource content by path or glob.
#[async_trait]
pub trait ResourceReader: Send + Sync {
    /// `Ok(None)` when nothing exists at `path`.
    async fn by_path(&self, path: &str) -> Result<Option<Resource>>;

    async fn by_glob(&self, pattern: &str) -> Result<Vec<Resource>>;
}

/// Strips the leading separator; globs and virtual paths are matched relative.
pub(crate) fn relative_virtual_path(path: &str) -> &str {
    path.trim_start_matches('/')
}
