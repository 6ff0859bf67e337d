//! Locating and loading the configuration document.
//!
//! The document lives at `~/.config/{app}/config.yml`, where `{app}` is the
//! lower-cased application name. A missing file, an unreadable file and a
//! malformed document all load as an empty document: a first run without a
//! config file behaves the same as one with an empty file.

use std::path::{Path, PathBuf};

use crate::document::Document;

pub const FILE_NAME: &str = "config.yml";

/// `~/.config/{app_name lower-cased}/config.yml`, or `None` when no home
/// directory can be determined.
pub fn default_config_path(app_name: &str) -> Option<PathBuf> {
    let user = directories::UserDirs::new()?;
    Some(
        user.home_dir()
            .join(".config")
            .join(app_name.to_lowercase())
            .join(FILE_NAME),
    )
}

/// Load the document at `path`, never failing.
///
/// Files ending in `.toml` are decoded as TOML, everything else as YAML.
pub fn load_document(path: &Path) -> Document {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "no config file");
            return Document::empty();
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "config file unreadable, ignoring");
            return Document::empty();
        }
    };

    let parsed = if path.extension().is_some_and(|ext| ext == "toml") {
        Document::from_toml_str(&content)
    } else {
        Document::from_yaml_str(&content)
    };

    match parsed {
        Ok(doc) => {
            tracing::debug!(path = %path.display(), "loaded config file");
            doc
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "config file malformed, ignoring");
            Document::empty()
        }
    }
}
