//! Filesystem discovery of files which should contain creators. Every discovered file gets an
//! identifier derived from its name, which is later used to find the matching creator in a
//! [CreatorCatalog](crate::catalog::CreatorCatalog).

use crate::config::LoaderConfig;
use crate::error::LoaderError;
use heck::ToLowerCamelCase;
use itertools::Itertools;
use regex::Regex;
use std::path::{Path, PathBuf};
use tracing::trace;
use walkdir::WalkDir;

/// A file which passed all discovery filters.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct DiscoveredFile {
    /// Lower camel case name of the file, without the extension.
    pub identifier: String,
    pub location: PathBuf,
}

/// Normalizes given file name (without extension) to lower camel case, e.g. `messenger-service`
/// becomes `messengerService`.
#[inline]
pub fn to_identifier(name: &str) -> String {
    name.to_lower_camel_case()
}

/// Lazily walks given path in file name order, yielding files matching given configuration. A
/// path pointing to a file yields only that file, if it passes the filters. Symbolic links are
/// followed and reported under the link's own path, while link loops are reported as walk errors.
pub fn discover<P: AsRef<Path>>(
    path: P,
    config: &LoaderConfig,
) -> Result<impl Iterator<Item = Result<DiscoveredFile, LoaderError>>, LoaderError> {
    let exclusions = config
        .exclude
        .iter()
        .map(|pattern| Regex::new(pattern))
        .collect::<Result<Vec<_>, _>>()?;

    let extensions = config
        .supported_extensions
        .iter()
        .map(|extension| {
            if extension.starts_with('.') {
                extension.clone()
            } else {
                format!(".{extension}")
            }
        })
        .collect_vec();

    let mut walker = WalkDir::new(path).follow_links(true).sort_by_file_name();
    if let Ok(depth) = usize::try_from(config.dir_search_depth) {
        walker = walker.max_depth(depth);
    }

    Ok(walker.into_iter().filter_map(move |entry| {
        let entry = match entry {
            Ok(entry) => entry,
            Err(error) => return Some(Err(error.into())),
        };

        if !entry.file_type().is_file() {
            return None;
        }

        let location = entry.into_path();
        let stem = file_stem(&location, &extensions)?;

        let full_path = location.to_string_lossy();
        if exclusions.iter().any(|exclusion| exclusion.is_match(&full_path)) {
            trace!("Skipping excluded file: {}", full_path);
            return None;
        }

        Some(Ok(DiscoveredFile {
            identifier: to_identifier(stem),
            location,
        }))
    }))
}

// file name without the first matching extension, if any matches
fn file_stem<'a>(location: &'a Path, extensions: &[String]) -> Option<&'a str> {
    let file_name = location.file_name()?.to_str()?;
    extensions
        .iter()
        .find_map(|extension| file_name.strip_suffix(extension.as_str()))
        .filter(|stem| !stem.is_empty())
}
