use crate::error::{Result, SddError};
use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

/// Include/exclude glob filter evaluated against paths relative to a scan root.
#[derive(Debug, Clone)]
pub struct FileFilter {
    include: GlobSet,
    exclude: GlobSet,
}

impl FileFilter {
    /// Compile both pattern lists. An empty include list matches nothing.
    pub fn new(include: &[String], exclude: &[String]) -> Result<Self> {
        Ok(Self {
            include: build_set(include)?,
            exclude: build_set(exclude)?,
        })
    }

    pub fn is_match(&self, relative: &Path) -> bool {
        self.include.is_match(relative) && !self.exclude.is_match(relative)
    }
}

fn build_set(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|source| SddError::InvalidGlob {
            pattern: pattern.clone(),
            source,
        })?;
        builder.add(glob);
    }
    builder.build().map_err(|source| SddError::InvalidGlob {
        pattern: patterns.join(","),
        source,
    })
}

/// All regular files under `dir` accepted by `filter`, sorted by path.
///
/// A missing `dir` yields an empty list. Walk errors (permission denied,
/// vanished entries) skip the affected entry rather than failing the walk.
pub fn collect_files(dir: &Path, filter: &FileFilter) -> Vec<PathBuf> {
    if !dir.is_dir() {
        tracing::debug!(dir = %dir.display(), "scan directory does not exist");
        return Vec::new();
    }

    let walker = WalkBuilder::new(dir)
        .follow_links(true)
        .hidden(false)
        .git_ignore(true)
        .sort_by_file_name(|a, b| a.cmp(b))
        .build();

    let mut files = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(error = %e, "skipping unreadable directory entry");
                continue;
            }
        };
        if !entry.file_type().is_some_and(|ft| ft.is_file()) {
            continue;
        }
        let path = entry.path();
        let Ok(relative) = path.strip_prefix(dir) else {
            continue;
        };
        if filter.is_match(relative) {
            files.push(path.to_path_buf());
        }
    }
    files.sort();
    files
}
