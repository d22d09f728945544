//! Extraction settings, loadable from a TOML file

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur when loading or parsing a configuration file
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse config TOML: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Quote character used for the rewritten template reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuoteStyle {
    #[default]
    Single,
    Double,
}

impl QuoteStyle {
    pub fn as_char(self) -> char {
        match self {
            QuoteStyle::Single => '\'',
            QuoteStyle::Double => '"',
        }
    }

    /// Quote `text` as a JavaScript string literal
    pub fn quote(self, text: &str) -> String {
        let quote = self.as_char();
        let mut out = String::with_capacity(text.len() + 2);
        out.push(quote);
        for c in text.chars() {
            if c == quote || c == '\\' {
                out.push('\\');
            }
            out.push(c);
        }
        out.push(quote);
        out
    }
}

/// Configuration for template extraction
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExtractConfig {
    /// Property holding inline markup
    pub template_key: String,
    /// Name the property is renamed to once it holds a path
    pub reference_key: String,
    /// Sibling flag that suppresses the rename and is removed instead,
    /// unless it is set to `false`
    pub flag_key: String,
    /// Extension of extracted files, without the dot
    pub extension: String,
    /// Prefix removed from the path written into the source
    pub template_base: Option<String>,
    /// Quote character of the written reference
    pub quote: QuoteStyle,
    /// Extensions of source files picked up when walking directories
    pub include_extensions: Vec<String>,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            template_key: "template".to_string(),
            reference_key: "templateUrl".to_string(),
            flag_key: "plain".to_string(),
            extension: "html".to_string(),
            template_base: None,
            quote: QuoteStyle::Single,
            include_extensions: vec!["js".to_string()],
        }
    }
}

impl ExtractConfig {
    /// Load configuration from TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Load configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let parsed: ExtractConfig = toml::from_str(content)?;
        let extension = parsed.extension.clone();
        Ok(parsed.with_extension(extension))
    }

    /// Set the prefix stripped from written references
    pub fn with_template_base(mut self, base: impl Into<String>) -> Self {
        self.template_base = Some(base.into());
        self
    }

    /// Set the extension of extracted files; a leading dot is ignored
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into().trim_start_matches('.').to_string();
        self
    }

    /// Set the quote style of written references
    pub fn with_quote(mut self, quote: QuoteStyle) -> Self {
        self.quote = quote;
        self
    }

    /// Whether a file found while walking a directory should be transformed
    pub fn includes(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.include_extensions.iter().any(|inc| inc == ext))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ExtractConfig::default();
        assert_eq!(config.template_key, "template");
        assert_eq!(config.reference_key, "templateUrl");
        assert_eq!(config.flag_key, "plain");
        assert_eq!(config.extension, "html");
        assert_eq!(config.template_base, None);
        assert_eq!(config.quote, QuoteStyle::Single);
    }

    #[test]
    fn test_from_str_partial() {
        let config = ExtractConfig::from_str(
            r#"
            template_base = "../DIM/app/"
            extension = ".tpl.html"
            quote = "double"
            "#,
        )
        .expect("Should parse");
        assert_eq!(config.template_base.as_deref(), Some("../DIM/app/"));
        assert_eq!(config.extension, "tpl.html");
        assert_eq!(config.quote, QuoteStyle::Double);
        assert_eq!(config.template_key, "template");
    }

    #[test]
    fn test_unknown_key_rejected() {
        let result = ExtractConfig::from_str("templat_key = \"x\"");
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_missing_file() {
        let result = ExtractConfig::from_file(Path::new("/nonexistent/extract.toml"));
        assert!(matches!(result, Err(ConfigError::IoError(_))));
    }

    #[test]
    fn test_quote_escapes() {
        assert_eq!(QuoteStyle::Single.quote("a/b.html"), "'a/b.html'");
        assert_eq!(QuoteStyle::Single.quote("it's"), r"'it\'s'");
        assert_eq!(QuoteStyle::Double.quote(r"a\b"), r#""a\\b""#);
    }

    #[test]
    fn test_includes_by_extension() {
        let config = ExtractConfig::default();
        assert!(config.includes(Path::new("src/app.js")));
        assert!(!config.includes(Path::new("src/app.html")));
        assert!(!config.includes(Path::new("Makefile")));
    }
}
