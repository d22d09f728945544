//! Output file naming and the per-file occurrence counter

use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Path of the `index`-th template extracted from `source`
///
/// The first template takes the source's stem, later ones get a `-N` suffix:
/// `app/home.js` yields `app/home.html`, `app/home-2.html`, ...
pub fn template_path(source: &Path, index: usize, extension: &str) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = if index <= 1 {
        format!("{}.{}", stem, extension)
    } else {
        format!("{}-{}.{}", stem, index, extension)
    };
    match source.parent() {
        Some(dir) => dir.join(name),
        None => PathBuf::from(name),
    }
}

/// Path written into the source in place of the markup
///
/// Always uses `/` separators. The first occurrence of `template_base` is removed.
pub fn reference_path(path: &Path, template_base: Option<&str>) -> String {
    let display = path
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/");
    // RootDir renders as "/" and would double up
    let display = display.replacen("//", "/", 1);

    match template_base {
        Some(base) if !base.is_empty() => display.replacen(base, "", 1),
        _ => display,
    }
}

/// Number of templates extracted so far from each source file
#[derive(Debug, Clone, Default)]
pub struct OccurrenceCounter {
    counts: HashMap<PathBuf, usize>,
}

impl OccurrenceCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Templates extracted from `source` so far
    pub fn count(&self, source: &Path) -> usize {
        self.counts.get(source).copied().unwrap_or(0)
    }

    /// The occurrence index the next extraction from `source` will take
    pub fn next_index(&self, source: &Path) -> usize {
        self.count(source) + 1
    }

    /// Record a successful extraction and return its occurrence index
    pub fn record(&mut self, source: &Path) -> usize {
        let count = self.counts.entry(source.to_path_buf()).or_insert(0);
        *count += 1;
        *count
    }

    /// Total templates extracted across all files
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }
}
