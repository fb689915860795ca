use regex::Regex;
use tracing::{debug, warn};

use super::{ExcludeDeclaration, ExcludeOrigin, ExcludePattern, LibraryDescriptor};
use crate::{resources::ResourceReader, Result};

/// Discovery pattern for library descriptors.
pub const LIBRARY_DESCRIPTOR_GLOB: &str = "/resources/**/.library";

/// Any number of directory levels, including none.
const ANY_DIRECTORIES: &str = "([^/]+[/])*";
const ANY_FILE_NAME: &str = "[^/]*";

/// Compiles one exclude declaration of `library`.
///
/// - `/my-file` matches `my-file.js` in any directory below `/resources/`
/// - `ui5.lib.utils.` matches every module below `/resources/ui5/lib/utils/`
/// - `ui5.lib.Control` matches exactly `/resources/ui5/lib/Control.js`
///
/// All of them also match the `-dbg` variant of the module.
pub fn compile_exclude_declaration(
    library: &str,
    declaration: &ExcludeDeclaration,
) -> Option<ExcludePattern> {
    let module_pattern = if let Some(path) = declaration.name.strip_prefix('/') {
        format!("{}{}", ANY_DIRECTORIES, regex::escape(path))
    } else {
        let namespace_path = declaration.name.replace('.', "/");
        match namespace_path.strip_suffix('/') {
            Some(prefix) => format!(
                "{}/{}{}",
                regex::escape(prefix),
                ANY_DIRECTORIES,
                ANY_FILE_NAME
            ),
            None => regex::escape(&namespace_path),
        }
    };

    let source = format!(r"/resources/(({}))(-dbg)?\.js$", module_pattern);

    match Regex::new(&source) {
        Ok(regex) => Some(ExcludePattern::new(
            regex,
            ExcludeOrigin::Library {
                library: library.to_string(),
                declaration: declaration.name.clone(),
            },
        )),
        Err(err) => {
            warn!(
                "Skipping exclude {} of library {}: {}",
                declaration.name, library, err
            );
            None
        }
    }
}

/// Collects the coverage excludes declared by every `.library` descriptor the
/// reader knows about, in discovery order.
pub async fn extract_library_exclude_patterns(
    reader: &dyn ResourceReader,
) -> Result<Vec<ExcludePattern>> {
    let descriptors = reader.by_glob(LIBRARY_DESCRIPTOR_GLOB).await?;
    let mut patterns = vec![];

    for resource in descriptors {
        let descriptor = match LibraryDescriptor::parse(resource.as_str()) {
            Ok(descriptor) => descriptor,
            Err(err) => {
                warn!(
                    "Could not parse library descriptor {}, no coverage excludes taken from it: {}",
                    resource.path(),
                    err
                );
                continue;
            }
        };

        let before = patterns.len();
        patterns.extend(
            descriptor
                .owned_excludes()
                .filter_map(|exclude| compile_exclude_declaration(&descriptor.name, exclude)),
        );

        debug!(
            "Library {} ({}) declares {} coverage exclude(s)",
            descriptor.name,
            resource.path(),
            patterns.len() - before
        );
    }

    Ok(patterns)
}
