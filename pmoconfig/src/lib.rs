//! # PMOHome Configuration Module
//!
//! This module provides configuration management for PMOHome, including:
//! - Loading configuration from YAML files
//! - Merging with embedded default configuration
//! - Environment variable overrides
//! - Typed getters for the HTTP host, logging, Airplay and media shares
//!
//! ## Usage
//!
//! ```no_run
//! use pmoconfig::get_config;
//!
//! let config = get_config();
//! let port = config.get_http_port();
//! for share in config.get_shares() {
//!     println!("{} -> {}", share.label, share.path);
//! }
//! ```

use anyhow::{Context, Result, anyhow};
use dirs::home_dir;
use lazy_static::lazy_static;
use parking_lot::Mutex;
use serde_yaml::{Mapping, Number, Value};
use std::{env, fs, path::Path, sync::Arc, time::Duration};
use tracing::{info, warn};

mod net;
mod shares;

pub use net::guess_local_ip;
pub use shares::ShareConfig;

use shares::{SHARE_SECTIONS, ShareEntry};

// Configuration par défaut intégrée
const DEFAULT_CONFIG: &str = include_str!("pmohome.yaml");

lazy_static! {
    static ref CONFIG: Arc<Config> = Arc::new(Config::load_config("").unwrap_or_else(|e| {
        warn!(error = %e, "Cannot load PMOHome configuration, using embedded defaults");
        Config::from_defaults()
    }));
}

const ENV_CONFIG_DIR: &str = "PMOHOME_CONFIG";
const ENV_PREFIX: &str = "PMOHOME_CONFIG__";
const CONFIG_DIR_NAME: &str = ".pmohome";

// Default values for configuration
const DEFAULT_HTTP_PORT: u16 = 8080;
const DEFAULT_LOG_MIN_LEVEL: &str = "INFO";
const DEFAULT_LOG_ENABLE_CONSOLE: bool = true;
const DEFAULT_AIRPLAY_TIMEOUT_MS: u64 = 5000;
const DEFAULT_FRIENDLY_NAME: &str = "PMOHome";

/// Macro to generate getter/setter for bool values with default
macro_rules! impl_bool_config {
    ($getter:ident, $setter:ident, $path:expr, $default:expr) => {
        pub fn $getter(&self) -> bool {
            match self.get_value($path) {
                Ok(Value::Bool(b)) => b,
                _ => $default,
            }
        }

        pub fn $setter(&self, value: bool) -> Result<()> {
            self.set_value($path, Value::Bool(value))
        }
    };
}

/// Configuration manager for PMOHome
///
/// # Examples
///
/// ```
/// let dir = tempfile::tempdir().unwrap();
/// let config = pmoconfig::Config::load_config(dir.path().to_str().unwrap()).unwrap();
/// assert_eq!(config.get_http_port(), 8080);
/// assert!(config.get_shares().is_empty());
/// ```
#[derive(Debug)]
pub struct Config {
    config_dir: String,
    /// Vide pour une configuration en mémoire (jamais sauvegardée).
    path: String,
    data: Mutex<Value>,
}

impl Clone for Config {
    fn clone(&self) -> Self {
        Self {
            config_dir: self.config_dir.clone(),
            path: self.path.clone(),
            data: Mutex::new(self.data.lock().clone()),
        }
    }
}

impl Config {
    /// Finds a config directory by trying different locations in order
    fn find_config_dir(directory: &str) -> String {
        // 1. Try provided directory
        if !directory.is_empty() {
            return directory.to_string();
        }

        // 2. Try environment variable
        if let Ok(env_path) = env::var(ENV_CONFIG_DIR) {
            info!(env_var = ENV_CONFIG_DIR, path = %env_path, "Trying to load config from env");
            return env_path;
        }

        // 3. Try current directory
        if Path::new(CONFIG_DIR_NAME).exists() {
            return CONFIG_DIR_NAME.to_string();
        }

        // 4. Try home directory
        if let Some(home) = home_dir() {
            let home_config = home.join(CONFIG_DIR_NAME);
            if home_config.exists() {
                return home_config.to_string_lossy().to_string();
            }
        }

        // Default fallback
        CONFIG_DIR_NAME.to_string()
    }

    /// Validates and prepares a config directory
    fn validate_config_dir(path: &Path) -> Result<()> {
        if !path.exists() {
            fs::create_dir_all(path)
                .with_context(|| format!("Cannot create config directory {}", path.display()))?;
        }

        if !path.is_dir() {
            return Err(anyhow!("{} is not a directory", path.display()));
        }

        // Test write permission
        let test_file = path.join(".write_test");
        fs::write(&test_file, b"test")?;
        fs::remove_file(&test_file)?;

        Ok(())
    }

    /// Determines and validates the configuration directory
    ///
    /// The directory is searched in the following order:
    /// 1. The provided `directory` parameter if not empty
    /// 2. The `PMOHOME_CONFIG` environment variable
    /// 3. `.pmohome` in the current directory
    /// 4. `.pmohome` in the user's home directory
    ///
    /// The directory is created if it doesn't exist.
    pub fn config_dir(directory: &str) -> Result<String> {
        let dir_path = Self::find_config_dir(directory);
        Self::validate_config_dir(Path::new(&dir_path))?;
        Ok(dir_path)
    }

    /// Loads the configuration from the specified directory
    ///
    /// This method:
    /// 1. Determines the configuration directory
    /// 2. Loads the default embedded configuration
    /// 3. Merges it with the external config.yaml file if present
    /// 4. Applies environment variable overrides
    /// 5. Saves the merged configuration
    pub fn load_config(directory: &str) -> Result<Self> {
        let config_dir = Self::config_dir(directory)?;
        info!(config_dir = %config_dir, "Using config directory");

        let config_file_path = Path::new(&config_dir).join("config.yaml");
        let path = config_file_path.to_string_lossy().to_string();

        let mut config_value: Value = serde_yaml::from_str(DEFAULT_CONFIG)?;

        match fs::read(&path) {
            Ok(data) => {
                info!(config_file = %path, "Loaded config file");
                let external_value: Value = serde_yaml::from_slice(&data)
                    .with_context(|| format!("Invalid YAML in {}", path))?;
                if !external_value.is_null() {
                    merge_yaml(&mut config_value, &external_value);
                }
            }
            Err(_) => {
                info!(config_file = %path, "Config file not found, using default embedded config");
            }
        }

        let mut config_value = lower_keys_value(config_value);
        apply_overrides(&mut config_value, env::vars());

        let config = Config {
            config_dir,
            path,
            data: Mutex::new(config_value),
        };

        config.save()?;
        Ok(config)
    }

    /// Configuration en mémoire construite sur les valeurs intégrées.
    pub fn from_defaults() -> Self {
        let value = serde_yaml::from_str(DEFAULT_CONFIG).unwrap_or_else(|_| Value::Mapping(Mapping::new()));
        Self {
            config_dir: String::new(),
            path: String::new(),
            data: Mutex::new(lower_keys_value(value)),
        }
    }

    pub fn config_directory(&self) -> &str {
        &self.config_dir
    }

    /// Saves the current configuration to the config.yaml file
    pub fn save(&self) -> Result<()> {
        if self.path.is_empty() {
            return Ok(());
        }
        let yaml = serde_yaml::to_string(&*self.data.lock())?;
        fs::write(&self.path, yaml).with_context(|| format!("Cannot write {}", self.path))?;
        Ok(())
    }

    /// Sets a configuration value at the specified path and saves it
    ///
    /// * `path` - Array of keys representing the path (e.g., `&["host", "http_port"]`)
    pub fn set_value(&self, path: &[&str], value: Value) -> Result<()> {
        {
            let mut data = self.data.lock();
            set_value_internal(&mut data, path, value)?;
        }
        self.save()
    }

    /// Gets a configuration value at the specified path
    pub fn get_value(&self, path: &[&str]) -> Result<Value> {
        let data = self.data.lock();
        get_value_internal(&data, path)
    }

    /// Gets the base URL for the HTTP server
    ///
    /// Returns the configured base URL, or `http://<local ip>:<port>` if not
    /// configured.
    pub fn get_base_url(&self) -> String {
        match self.get_value(&["host", "base_url"]) {
            Ok(Value::String(s)) if !s.trim().is_empty() => s.trim_end_matches('/').to_string(),
            _ => format!("http://{}:{}", guess_local_ip(), self.get_http_port()),
        }
    }

    /// Gets the HTTP port from configuration
    ///
    /// Returns the configured HTTP port, or the default port (8080) if not configured or invalid.
    pub fn get_http_port(&self) -> u16 {
        match self.get_value(&["host", "http_port"]) {
            Ok(Value::Number(n)) => match n.as_u64().and_then(|p| u16::try_from(p).ok()) {
                Some(port) => port,
                None => {
                    warn!("Invalid HTTP port '{}', using default {}", n, DEFAULT_HTTP_PORT);
                    DEFAULT_HTTP_PORT
                }
            },
            Ok(Value::String(s)) => s.parse::<u16>().unwrap_or_else(|_| {
                warn!("Invalid HTTP port '{}', using default {}", s, DEFAULT_HTTP_PORT);
                DEFAULT_HTTP_PORT
            }),
            _ => DEFAULT_HTTP_PORT,
        }
    }

    pub fn set_http_port(&self, port: u16) -> Result<()> {
        self.set_value(&["host", "http_port"], Value::Number(Number::from(port)))
    }

    /// Nom affiché de la racine du catalogue.
    pub fn get_friendly_name(&self) -> String {
        match self.get_value(&["host", "friendly_name"]) {
            Ok(Value::String(s)) if !s.trim().is_empty() => s,
            _ => DEFAULT_FRIENDLY_NAME.to_string(),
        }
    }

    impl_bool_config!(
        get_log_enable_console,
        set_log_enable_console,
        &["host", "logger", "enable_console"],
        DEFAULT_LOG_ENABLE_CONSOLE
    );

    /// Récupère le niveau de log minimum depuis la configuration
    pub fn get_log_min_level(&self) -> String {
        match self.get_value(&["host", "logger", "min_level"]) {
            Ok(Value::String(s)) => s,
            _ => DEFAULT_LOG_MIN_LEVEL.to_string(),
        }
    }

    pub fn set_log_min_level(&self, level: String) -> Result<()> {
        self.set_value(&["host", "logger", "min_level"], Value::String(level))
    }

    /// Délai maximal d'une commande Airplay (connexion comprise).
    pub fn get_airplay_timeout(&self) -> Duration {
        let millis = match self.get_value(&["airplay", "timeout_ms"]) {
            Ok(Value::Number(n)) => n.as_u64().filter(|ms| *ms > 0),
            Ok(Value::String(s)) => s.parse::<u64>().ok().filter(|ms| *ms > 0),
            _ => None,
        };
        Duration::from_millis(millis.unwrap_or(DEFAULT_AIRPLAY_TIMEOUT_MS))
    }

    pub fn set_airplay_timeout(&self, timeout: Duration) -> Result<()> {
        let millis = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self.set_value(&["airplay", "timeout_ms"], Value::Number(Number::from(millis)))
    }

    /// Partages déclarés sous `shares.{videos,audios,pictures,podcasts}`.
    ///
    /// Les entrées mal formées sont journalisées et ignorées.
    pub fn get_shares(&self) -> Vec<ShareConfig> {
        let mut shares = Vec::new();
        for (section, category) in SHARE_SECTIONS {
            let entries = match self.get_value(&["shares", *section]) {
                Ok(Value::Sequence(entries)) => entries,
                Ok(Value::Null) | Err(_) => continue,
                Ok(other) => {
                    warn!(section = %section, value = ?other, "shares section is not a list");
                    continue;
                }
            };

            for entry in entries {
                match serde_yaml::from_value::<ShareEntry>(entry) {
                    Ok(entry) => shares.push(ShareConfig::from_entry(entry, *category)),
                    Err(e) => warn!(section = %section, error = %e, "Ignoring invalid share"),
                }
            }
        }
        shares
    }
}

/// Returns the global configuration instance
///
/// The configuration is lazily loaded on first access.
pub fn get_config() -> Arc<Config> {
    CONFIG.clone()
}

fn set_value_internal(data: &mut Value, path: &[&str], value: Value) -> Result<()> {
    let Some((first, rest)) = path.split_first() else {
        *data = value;
        return Ok(());
    };

    if let Value::Mapping(map) = data {
        let key = Value::String(first.to_lowercase());
        if rest.is_empty() {
            map.insert(key, value);
        } else {
            let entry = map.entry(key).or_insert(Value::Mapping(Mapping::new()));
            set_value_internal(entry, rest, value)?;
        }
        Ok(())
    } else {
        Err(anyhow!("Current node is not a map"))
    }
}

fn get_value_internal(data: &Value, path: &[&str]) -> Result<Value> {
    let mut current = data;
    for (i, key) in path.iter().enumerate() {
        if let Value::Mapping(map) = current {
            match map.get(Value::String(key.to_lowercase())) {
                Some(next) => current = next,
                None => return Err(anyhow!("Path {} does not exist", path[..=i].join("."))),
            }
        } else {
            return Err(anyhow!("Path {} is not a Config", path[..i].join(".")));
        }
    }
    Ok(current.clone())
}

/// Applique les variables `PMOHOME_CONFIG__SECTION__KEY=value`.
///
/// Les valeurs sont lues comme du YAML (`9000` est un nombre).
fn apply_overrides<I>(config: &mut Value, vars: I)
where
    I: IntoIterator<Item = (String, String)>,
{
    for (key, value) in vars {
        let Some(suffix) = key.strip_prefix(ENV_PREFIX) else {
            continue;
        };
        let key_path: Vec<&str> = suffix.split("__").collect();
        let yaml_value = serde_yaml::from_str::<Value>(&value).unwrap_or(Value::String(value));
        if let Err(e) = set_value_internal(config, &key_path, yaml_value) {
            warn!(variable = %key, error = %e, "Ignoring configuration override");
        }
    }
}

fn lower_keys_value(value: Value) -> Value {
    match value {
        Value::Mapping(map) => {
            let mut new_map = Mapping::new();
            for (k, v) in map {
                let key = match k {
                    Value::String(s) => Value::String(s.to_lowercase()),
                    other => other,
                };
                new_map.insert(key, lower_keys_value(v));
            }
            Value::Mapping(new_map)
        }
        Value::Sequence(seq) => Value::Sequence(seq.into_iter().map(lower_keys_value).collect()),
        _ => value,
    }
}

/// Merges external YAML configuration into default configuration
///
/// - For mappings, keys from external are merged into default
/// - For scalars and sequences, external values replace default values
fn merge_yaml(default: &mut Value, external: &Value) {
    match (default, external) {
        (Value::Mapping(dmap), Value::Mapping(emap)) => {
            for (k, v) in emap {
                match dmap.get_mut(k) {
                    Some(dv) => merge_yaml(dv, v),
                    None => {
                        dmap.insert(k.clone(), v.clone());
                    }
                }
            }
        }
        (d, e) => *d = e.clone(),
    }
}
