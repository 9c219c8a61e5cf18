use std::{fs, path::PathBuf};

use common::prelude::{ActorId, SecretKey};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const APP_NAME: &str = "hprv";
pub const CONFIG_FILE_NAME: &str = "config.toml";
pub const KEY_FILE_NAME: &str = "key.pem";
pub const STORE_DIR_NAME: &str = "store";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Actor id of the local identity
    pub actor_id: ActorId,
    /// Display name, purely informational
    #[serde(default)]
    pub name: Option<String>,
    /// Content store root (defaults to <hprv dir>/store)
    #[serde(default)]
    pub store_path: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            actor_id: Uuid::new_v4(),
            name: None,
            store_path: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppState {
    /// Path to the hprv directory (~/.hprv)
    pub hprv_dir: PathBuf,
    /// Path to the identity PEM file
    pub key_path: PathBuf,
    /// Path to the content store
    pub store_path: PathBuf,
    /// Path to the config file
    pub config_path: PathBuf,
    /// Loaded configuration
    pub config: AppConfig,
}

impl AppState {
    /// Get the hprv directory path (custom or default ~/.hprv)
    pub fn hprv_dir(custom_path: Option<PathBuf>) -> Result<PathBuf, StateError> {
        if let Some(path) = custom_path {
            return Ok(path);
        }

        let home = dirs::home_dir().ok_or(StateError::NoHomeDirectory)?;
        Ok(home.join(format!(".{}", APP_NAME)))
    }

    /// Initialize a new state directory with a fresh identity
    pub fn init(
        custom_path: Option<PathBuf>,
        config: Option<AppConfig>,
    ) -> Result<Self, StateError> {
        let hprv_dir = Self::hprv_dir(custom_path)?;

        if hprv_dir.exists() {
            return Err(StateError::AlreadyInitialized);
        }

        fs::create_dir_all(&hprv_dir)?;

        let config = config.unwrap_or_default();
        let store_path = Self::resolve_store_path(&hprv_dir, &config);
        fs::create_dir_all(&store_path)?;

        let key = SecretKey::generate();
        let key_path = hprv_dir.join(KEY_FILE_NAME);
        fs::write(&key_path, key.to_pem())?;

        let config_path = hprv_dir.join(CONFIG_FILE_NAME);
        let config_toml = toml::to_string_pretty(&config)?;
        fs::write(&config_path, config_toml)?;

        tracing::info!("initialized {} for actor {}", hprv_dir.display(), config.actor_id);

        Ok(Self {
            hprv_dir,
            key_path,
            store_path,
            config_path,
            config,
        })
    }

    /// Load existing state from the hprv directory
    pub fn load(custom_path: Option<PathBuf>) -> Result<Self, StateError> {
        let hprv_dir = Self::hprv_dir(custom_path)?;

        if !hprv_dir.exists() {
            return Err(StateError::NotInitialized);
        }

        let key_path = hprv_dir.join(KEY_FILE_NAME);
        let config_path = hprv_dir.join(CONFIG_FILE_NAME);

        if !key_path.exists() {
            return Err(StateError::MissingFile(KEY_FILE_NAME.to_string()));
        }
        if !config_path.exists() {
            return Err(StateError::MissingFile(CONFIG_FILE_NAME.to_string()));
        }

        let config_toml = fs::read_to_string(&config_path)?;
        let config: AppConfig = toml::from_str(&config_toml)?;

        let store_path = Self::resolve_store_path(&hprv_dir, &config);
        if !store_path.exists() {
            return Err(StateError::MissingFile(format!("{}/", STORE_DIR_NAME)));
        }

        Ok(Self {
            hprv_dir,
            key_path,
            store_path,
            config_path,
            config,
        })
    }

    /// Load the secret key from the key file
    pub fn load_key(&self) -> Result<SecretKey, StateError> {
        let pem = fs::read_to_string(&self.key_path)?;
        let key = SecretKey::from_pem(&pem).map_err(|e| StateError::InvalidKey(e.to_string()))?;
        Ok(key)
    }

    fn resolve_store_path(hprv_dir: &std::path::Path, config: &AppConfig) -> PathBuf {
        config
            .store_path
            .clone()
            .unwrap_or_else(|| hprv_dir.join(STORE_DIR_NAME))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("hprv directory not initialized. Run 'hprv init' first")]
    NotInitialized,

    #[error("hprv directory already initialized")]
    AlreadyInitialized,

    #[error("no home directory found")]
    NoHomeDirectory,

    #[error("missing required file: {0}")]
    MissingFile(String),

    #[error("invalid key: {0}")]
    InvalidKey(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("TOML deserialization error: {0}")]
    TomlDe(#[from] toml::de::Error),
}

#[cfg(test)]
mod test {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_init_then_load() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("hprv");

        let config = AppConfig {
            name: Some("alice".into()),
            ..Default::default()
        };
        let state = AppState::init(Some(dir.clone()), Some(config.clone())).unwrap();
        assert!(state.store_path.exists());

        let loaded = AppState::load(Some(dir)).unwrap();
        assert_eq!(loaded.config, config);
        assert_eq!(
            loaded.load_key().unwrap().public(),
            state.load_key().unwrap().public()
        );
    }

    #[test]
    fn test_init_twice_fails() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("hprv");

        AppState::init(Some(dir.clone()), None).unwrap();
        assert!(matches!(
            AppState::init(Some(dir), None),
            Err(StateError::AlreadyInitialized)
        ));
    }

    #[test]
    fn test_load_errors() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("hprv");
        assert!(matches!(
            AppState::load(Some(dir.clone())),
            Err(StateError::NotInitialized)
        ));

        AppState::init(Some(dir.clone()), None).unwrap();
        fs::remove_file(dir.join(KEY_FILE_NAME)).unwrap();
        assert!(matches!(
            AppState::load(Some(dir)),
            Err(StateError::MissingFile(f)) if f == KEY_FILE_NAME
        ));
    }

    #[test]
    fn test_optional_fields_default() {
        let id = Uuid::new_v4();
        let config: AppConfig = toml::from_str(&format!("actor_id = \"{}\"", id)).unwrap();
        assert_eq!(config.actor_id, id);
        assert!(config.name.is_none());
        assert!(config.store_path.is_none());
    }
}
