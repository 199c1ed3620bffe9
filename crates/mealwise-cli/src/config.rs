//! Configuration file management for mealwise.
//!
//! Provides a TOML-based config file at `~/.config/mealwise/config.toml` and a
//! resolution chain: CLI flag > env var > config file > default.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use mealwise_core::gateway::DEFAULT_LANGUAGE;
use mealwise_core::gemini::{DEFAULT_BASE_URL, DEFAULT_MODEL, GeminiClient, GeminiSettings};
use mealwise_core::progress::{
    DEFAULT_CAPACITY_BYTES, DEFAULT_DATE_FORMAT, FileStore, ProgressLog,
};

// -----------------------------------------------------------------------
// Config file types
// -----------------------------------------------------------------------

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub api: ApiSection,
    #[serde(default)]
    pub storage: StorageSection,
    #[serde(default)]
    pub locale: LocaleSection,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ApiSection {
    /// Gemini API key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct StorageSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity_bytes: Option<usize>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct LocaleSection {
    /// Language the model answers in (e.g. "English").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// `chrono` format for progress entry dates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_format: Option<String>,
}

// -----------------------------------------------------------------------
// Paths
// -----------------------------------------------------------------------

/// Return the mealwise config directory.
///
/// Always uses XDG layout: `$XDG_CONFIG_HOME/mealwise` or `~/.config/mealwise`.
pub fn config_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join("mealwise");
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("mealwise")
}

/// Return the path to the mealwise config file.
pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

/// Default data directory: `$XDG_DATA_HOME/mealwise` or
/// `~/.local/share/mealwise`.
pub fn default_data_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_DATA_HOME") {
        return PathBuf::from(xdg).join("mealwise");
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".local")
        .join("share")
        .join("mealwise")
}

// -----------------------------------------------------------------------
// Read / write
// -----------------------------------------------------------------------

/// Load and parse the config file. Returns an error if it does not exist.
pub fn load_config() -> Result<ConfigFile> {
    let path = config_path();
    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read config file at {}", path.display()))?;
    let config: ConfigFile = toml::from_str(&contents).context("failed to parse config file")?;
    Ok(config)
}

/// Serialize and write the config file, creating parent dirs as needed.
/// Sets file permissions to 0600 on Unix.
pub fn save_config(config: &ConfigFile) -> Result<()> {
    let path = config_path();
    let dir = config_dir();
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create config directory {}", dir.display()))?;

    let contents = toml::to_string_pretty(config).context("failed to serialize config")?;
    std::fs::write(&path, &contents)
        .with_context(|| format!("failed to write config file at {}", path.display()))?;

    // The file may hold the API key.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(&path, perms)
            .with_context(|| format!("failed to set permissions on {}", path.display()))?;
    }

    Ok(())
}

// -----------------------------------------------------------------------
// Resolved config
// -----------------------------------------------------------------------

fn env_nonempty(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Fully resolved configuration, ready for use.
#[derive(Debug)]
pub struct MealwiseConfig {
    pub gemini: GeminiSettings,
    pub data_dir: PathBuf,
    pub capacity_bytes: usize,
    pub language: String,
    pub date_format: String,
}

impl MealwiseConfig {
    /// Resolve configuration using the chain: CLI flag > env var > config file > default.
    ///
    /// - API key: `cli_api_key` > `MEALWISE_API_KEY` > `GEMINI_API_KEY` > `api.key` > none
    /// - Model: `MEALWISE_MODEL` > `api.model` > [`DEFAULT_MODEL`]
    /// - Data dir: `MEALWISE_DATA_DIR` > `storage.data_dir` > [`default_data_dir`]
    /// - Language: `MEALWISE_LANGUAGE` > `locale.language` > [`DEFAULT_LANGUAGE`]
    ///
    /// A missing API key is not an error here; it surfaces on the first
    /// generation or chat call.
    pub fn resolve(cli_api_key: Option<&str>) -> Result<Self> {
        let file = if config_path().exists() {
            load_config()?
        } else {
            ConfigFile::default()
        };

        let api_key = cli_api_key
            .map(str::to_string)
            .or_else(|| env_nonempty("MEALWISE_API_KEY"))
            .or_else(|| env_nonempty("GEMINI_API_KEY"))
            .or(file.api.key);

        let model = env_nonempty("MEALWISE_MODEL")
            .or(file.api.model)
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let base_url = file
            .api
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let data_dir = env_nonempty("MEALWISE_DATA_DIR")
            .map(PathBuf::from)
            .or(file.storage.data_dir)
            .unwrap_or_else(default_data_dir);

        let language = env_nonempty("MEALWISE_LANGUAGE")
            .or(file.locale.language)
            .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string());

        Ok(Self {
            gemini: GeminiSettings {
                api_key,
                model,
                base_url,
            },
            data_dir,
            capacity_bytes: file
                .storage
                .capacity_bytes
                .unwrap_or(DEFAULT_CAPACITY_BYTES),
            language,
            date_format: file
                .locale
                .date_format
                .unwrap_or_else(|| DEFAULT_DATE_FORMAT.to_string()),
        })
    }

    pub fn client(&self) -> GeminiClient {
        GeminiClient::new(self.gemini.clone())
    }

    /// Open the progress log stored under the data directory.
    pub fn progress_log(&self) -> ProgressLog {
        let store = FileStore::with_capacity(&self.data_dir, self.capacity_bytes);
        ProgressLog::load(Box::new(store)).with_date_format(self.date_format.clone())
    }
}

// -----------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{lock_env, with_isolated_dirs};

    const KEY_VARS: [&str; 5] = [
        "MEALWISE_API_KEY",
        "GEMINI_API_KEY",
        "MEALWISE_MODEL",
        "MEALWISE_DATA_DIR",
        "MEALWISE_LANGUAGE",
    ];

    fn clear_vars() {
        for var in KEY_VARS {
            unsafe { std::env::remove_var(var) };
        }
    }

    #[test]
    fn config_file_roundtrip() {
        let original = ConfigFile {
            api: ApiSection {
                key: Some("secret".into()),
                model: Some("gemini-test".into()),
                base_url: None,
            },
            storage: StorageSection {
                data_dir: Some(PathBuf::from("/tmp/mealwise")),
                capacity_bytes: Some(1024),
            },
            locale: LocaleSection {
                language: Some("Portuguese".into()),
                date_format: Some("%m/%d".into()),
            },
        };
        let contents = toml::to_string_pretty(&original).unwrap();
        let loaded: ConfigFile = toml::from_str(&contents).unwrap();

        assert_eq!(loaded.api.key.as_deref(), Some("secret"));
        assert_eq!(loaded.storage.capacity_bytes, Some(1024));
        assert_eq!(loaded.locale.date_format.as_deref(), Some("%m/%d"));
    }

    #[test]
    fn empty_file_parses_to_defaults() {
        let loaded: ConfigFile = toml::from_str("").unwrap();
        assert!(loaded.api.key.is_none());
        assert!(loaded.storage.data_dir.is_none());
    }

    #[cfg(unix)]
    #[test]
    fn save_config_sets_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let _lock = lock_env();
        with_isolated_dirs(|_| {
            save_config(&ConfigFile::default()).unwrap();
            let meta = std::fs::metadata(config_path()).unwrap();
            assert_eq!(meta.permissions().mode() & 0o777, 0o600);
        });
    }

    #[test]
    fn resolve_with_cli_flag_overrides_all() {
        let _lock = lock_env();
        with_isolated_dirs(|_| {
            clear_vars();
            unsafe { std::env::set_var("MEALWISE_API_KEY", "from-env") };

            let config = MealwiseConfig::resolve(Some("from-cli")).unwrap();
            assert_eq!(config.gemini.api_key.as_deref(), Some("from-cli"));

            clear_vars();
        });
    }

    #[test]
    fn resolve_prefers_mealwise_key_over_gemini_key() {
        let _lock = lock_env();
        with_isolated_dirs(|_| {
            clear_vars();
            unsafe { std::env::set_var("GEMINI_API_KEY", "gemini") };
            assert_eq!(
                MealwiseConfig::resolve(None).unwrap().gemini.api_key.as_deref(),
                Some("gemini")
            );

            unsafe { std::env::set_var("MEALWISE_API_KEY", "mealwise") };
            assert_eq!(
                MealwiseConfig::resolve(None).unwrap().gemini.api_key.as_deref(),
                Some("mealwise")
            );
            clear_vars();
        });
    }

    #[test]
    fn resolve_with_env_var_overrides_config_file() {
        let _lock = lock_env();
        with_isolated_dirs(|_| {
            clear_vars();
            save_config(&ConfigFile {
                api: ApiSection {
                    key: Some("from-file".into()),
                    model: Some("file-model".into()),
                    base_url: None,
                },
                ..ConfigFile::default()
            })
            .unwrap();

            let config = MealwiseConfig::resolve(None).unwrap();
            assert_eq!(config.gemini.api_key.as_deref(), Some("from-file"));
            assert_eq!(config.gemini.model, "file-model");

            unsafe { std::env::set_var("MEALWISE_MODEL", "env-model") };
            let config = MealwiseConfig::resolve(None).unwrap();
            assert_eq!(config.gemini.model, "env-model");
            clear_vars();
        });
    }

    #[test]
    fn resolve_defaults_when_nothing_set() {
        let _lock = lock_env();
        with_isolated_dirs(|root| {
            clear_vars();
            let config = MealwiseConfig::resolve(None).unwrap();

            assert!(config.gemini.api_key.is_none());
            assert_eq!(config.gemini.model, DEFAULT_MODEL);
            assert_eq!(config.language, DEFAULT_LANGUAGE);
            assert_eq!(config.date_format, DEFAULT_DATE_FORMAT);
            assert_eq!(config.capacity_bytes, DEFAULT_CAPACITY_BYTES);
            assert_eq!(config.data_dir, root.join("data").join("mealwise"));
        });
    }

    #[test]
    fn resolve_rejects_malformed_config_file() {
        let _lock = lock_env();
        with_isolated_dirs(|_| {
            clear_vars();
            std::fs::create_dir_all(config_dir()).unwrap();
            std::fs::write(config_path(), "api = [not valid").unwrap();

            let err = MealwiseConfig::resolve(None).unwrap_err();
            assert!(
                format!("{err:#}").contains("failed to parse config file"),
                "unexpected error: {err:#}"
            );
        });
    }

    #[test]
    fn config_path_ends_with_expected_filename() {
        let path = config_path();
        assert!(
            path.ends_with("mealwise/config.toml"),
            "unexpected config path: {}",
            path.display()
        );
    }
}
