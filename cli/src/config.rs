//! Optional defaults from `~/.zog/config.toml`.
//!
//! ```toml
//! library_id = 475425
//! library_type = "group"
//! api_key = "..."
//! local = false
//! ```
//!
//! Command-line flags and environment variables always win over the file.

use std::io::ErrorKind;
use std::path::Path;
use std::path::PathBuf;

use thiserror::Error;
use toml_edit::DocumentMut;
use toml_edit::Item as TomlItem;
use toml_edit::Value as TomlValue;
use zog_zotero::LibraryType;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml_edit::TomlError,
    },

    #[error("{path}: `{key}` must be {expected}")]
    InvalidValue {
        path: PathBuf,
        key: &'static str,
        expected: &'static str,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileConfig {
    pub library_id: Option<String>,
    pub library_type: Option<LibraryType>,
    pub api_key: Option<String>,
    pub local: Option<bool>,
    pub api_base_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn new_default() -> anyhow::Result<Self> {
        let Some(home) = dirs::home_dir() else {
            anyhow::bail!("cannot determine home directory for config path");
        };
        Ok(Self::new(default_config_path(&home)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A missing file is an empty config; a malformed one is an error.
    pub fn load(&self) -> Result<FileConfig, ConfigError> {
        let Some(content) = read_document_string(&self.path)? else {
            return Ok(FileConfig::default());
        };

        let doc = content
            .parse::<DocumentMut>()
            .map_err(|source| ConfigError::Parse {
                path: self.path.clone(),
                source,
            })?;

        let library_type = match read_string(&doc, "library_type", &self.path)? {
            Some(raw) => Some(raw.parse::<LibraryType>().map_err(|_| {
                ConfigError::InvalidValue {
                    path: self.path.clone(),
                    key: "library_type",
                    expected: "\"user\" or \"group\"",
                }
            })?),
            None => None,
        };

        Ok(FileConfig {
            library_id: read_library_id(&doc, &self.path)?,
            library_type,
            api_key: read_string(&doc, "api_key", &self.path)?,
            local: read_bool(&doc, "local", &self.path)?,
            api_base_url: read_string(&doc, "api_base_url", &self.path)?,
        })
    }
}

fn default_config_path(home: &Path) -> PathBuf {
    home.join(".zog").join("config.toml")
}

fn read_document_string(path: &Path) -> Result<Option<String>, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(source) => Err(ConfigError::Read {
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn read_value<'a>(doc: &'a DocumentMut, key: &str) -> Option<&'a TomlValue> {
    doc.get(key).and_then(TomlItem::as_value)
}

fn read_string(
    doc: &DocumentMut,
    key: &'static str,
    path: &Path,
) -> Result<Option<String>, ConfigError> {
    let Some(value) = read_value(doc, key) else {
        return Ok(None);
    };
    value
        .as_str()
        .map(|s| Some(s.to_string()))
        .ok_or_else(|| ConfigError::InvalidValue {
            path: path.to_path_buf(),
            key,
            expected: "a string",
        })
}

fn read_bool(
    doc: &DocumentMut,
    key: &'static str,
    path: &Path,
) -> Result<Option<bool>, ConfigError> {
    let Some(value) = read_value(doc, key) else {
        return Ok(None);
    };
    value
        .as_bool()
        .map(Some)
        .ok_or_else(|| ConfigError::InvalidValue {
            path: path.to_path_buf(),
            key,
            expected: "a boolean",
        })
}

/// Library ids are numeric, but quoting them is just as common.
fn read_library_id(doc: &DocumentMut, path: &Path) -> Result<Option<String>, ConfigError> {
    match read_value(doc, "library_id") {
        None => Ok(None),
        Some(TomlValue::Integer(id)) => Ok(Some(id.value().to_string())),
        Some(TomlValue::String(id)) => Ok(Some(id.value().clone())),
        Some(_) => Err(ConfigError::InvalidValue {
            path: path.to_path_buf(),
            key: "library_id",
            expected: "an integer or a string",
        }),
    }
}
