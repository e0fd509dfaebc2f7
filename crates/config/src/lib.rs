//! Layered configuration for shelf.
//!
//! Sources, later ones overriding earlier ones:
//!
//! 1. Compiled defaults.
//! 2. A configuration file (`toml`, `yaml` or `json`). Either given
//!    explicitly, or `shelf.toml` in the platform configuration directory
//!    when it exists.
//! 3. Environment variables prefixed with `SHELF_`, nested keys separated by
//!    a double underscore: `SHELF_LLM__API_KEY`, `SHELF_QUOTA__DAILY_LIMIT`.
//!
//! Each section is the configuration type of the crate that uses it, so
//! components receive exactly their own section at construction.

pub mod error;

use crate::error::{ErrorKind, Result};
use directories::ProjectDirs;
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use serde::{Deserialize, Serialize};
use shelf_catalog::{CatalogConfig, DatabaseConfig, QuotaConfig};
use shelf_llm::LlmConfig;
use shelf_search::SearchConfig;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const ENV_PREFIX: &str = "SHELF_";
pub const FILE_NAME: &str = "shelf.toml";

/// Genre directory names and how they are displayed.
const DEFAULT_GENRES: &[(&str, &str)] = &[
    ("adventure", "Приключения"),
    ("classic", "Классика"),
    ("detective", "Детектив"),
    ("fantasy", "Фантастика"),
    ("romance", "Любовный роман"),
    ("thriller", "Триллер"),
];

/// Where the book files live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Library root; relative paths are resolved against the working directory.
    pub root: PathBuf,
    /// Genre directory name to display name. Directories not listed here are
    /// displayed as-is.
    pub genres: BTreeMap<String, String>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("books"),
            genres: DEFAULT_GENRES.iter().map(|(slug, name)| (slug.to_string(), name.to_string())).collect(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database: DatabaseConfig,
    pub storage: StorageConfig,
    pub search: SearchConfig,
    pub quota: QuotaConfig,
    pub catalog: CatalogConfig,
    pub llm: LlmConfig,
}

impl Config {
    /// Loads and validates the configuration.
    ///
    /// With `file` set, that file must exist. Without it, the default file
    /// location is used if there is a file there.
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let file = match file {
            Some(path) if !path.is_file() => exn::bail!(ErrorKind::NotFound(path.to_path_buf())),
            Some(path) => Some(path.to_path_buf()),
            None => Self::default_path().filter(|path| path.is_file()),
        };
        let figment = Self::figment(file.as_deref())?;
        let config: Self = figment.extract().or_raise(|| ErrorKind::Load)?;
        config.validate()?;
        tracing::debug!(file = ?file, "configuration loaded");
        Ok(config)
    }

    /// Default configuration file location, if the platform has one.
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "shelf").map(|dirs| dirs.config_dir().join(FILE_NAME))
    }

    /// The provider stack, without extracting or validating.
    pub fn figment(file: Option<&Path>) -> Result<Figment> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(path) = file {
            let extension = path.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase);
            figment = match extension.as_deref() {
                Some("toml") => figment.merge(Toml::file_exact(path)),
                Some("yaml" | "yml") => figment.merge(Yaml::file_exact(path)),
                Some("json") => figment.merge(Json::file_exact(path)),
                _ => exn::bail!(ErrorKind::UnsupportedFormat(path.to_path_buf())),
            };
        }
        Ok(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))
    }

    pub fn validate(&self) -> Result<()> {
        let search = &self.search;
        if search.title_weight < 0.0 || search.author_weight < 0.0 {
            exn::bail!(invalid("search weights", "must not be negative"));
        }
        if search.title_weight + search.author_weight == 0.0 {
            exn::bail!(invalid("search weights", "must not both be zero"));
        }
        if !(0.0..=100.0).contains(&search.min_score) {
            exn::bail!(invalid("search.min_score", "must be between 0 and 100"));
        }
        if search.limit == 0 {
            exn::bail!(invalid("search.limit", "must be greater than zero"));
        }
        if search.candidate_limit == 0 {
            exn::bail!(invalid("search.candidate_limit", "must be greater than zero"));
        }
        if self.catalog.page_size == 0 {
            exn::bail!(invalid("catalog.page_size", "must be greater than zero"));
        }
        if self.quota.daily_limit == 0 {
            exn::bail!(invalid("quota.daily_limit", "must be greater than zero"));
        }
        if self.database.max_connections == 0 {
            exn::bail!(invalid("database.max_connections", "must be greater than zero"));
        }
        if self.llm.timeout_secs == 0 {
            exn::bail!(invalid("llm.timeout_secs", "must be greater than zero"));
        }
        if self.llm.max_question_len == 0 {
            exn::bail!(invalid("llm.max_question_len", "must be greater than zero"));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: &'static str) -> ErrorKind {
    ErrorKind::Invalid { field, reason }
}
