//! Destinations for extracted templates

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

/// Receives each template as soon as it is extracted
pub trait TemplateSink {
    fn write_template(&mut self, path: &Path, contents: &str) -> io::Result<()>;
}

/// Writes templates to disk, creating parent directories as needed
#[derive(Debug, Default)]
pub struct FsSink {
    written: Vec<PathBuf>,
}

impl FsSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Files written so far, in order
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

impl TemplateSink for FsSink {
    fn write_template(&mut self, path: &Path, contents: &str) -> io::Result<()> {
        if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)?;
        }
        std::fs::write(path, contents)?;
        tracing::debug!("Wrote {}", path.display());
        self.written.push(path.to_path_buf());
        Ok(())
    }
}

/// Keeps templates in memory
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    files: BTreeMap<PathBuf, String>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn files(&self) -> &BTreeMap<PathBuf, String> {
        &self.files
    }

    pub fn get(&self, path: impl AsRef<Path>) -> Option<&str> {
        self.files.get(path.as_ref()).map(String::as_str)
    }
}

impl TemplateSink for MemorySink {
    fn write_template(&mut self, path: &Path, contents: &str) -> io::Result<()> {
        self.files.insert(path.to_path_buf(), contents.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_sink_collects() {
        let mut sink = MemorySink::new();
        sink.write_template(Path::new("a/b.html"), "<p></p>")
            .expect("Should write");
        assert_eq!(sink.get("a/b.html"), Some("<p></p>"));
        assert_eq!(sink.files().len(), 1);
    }

    #[test]
    fn test_fs_sink_creates_directories() {
        let dir = tempfile::tempdir().expect("Should create temp dir");
        let path = dir.path().join("nested/views/home.html");
        let mut sink = FsSink::new();
        sink.write_template(&path, "<div>home</div>")
            .expect("Should write");
        assert_eq!(
            std::fs::read_to_string(&path).expect("Should read back"),
            "<div>home</div>"
        );
        assert_eq!(sink.written(), &[path]);
    }
}
