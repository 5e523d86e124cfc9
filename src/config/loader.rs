//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::config::definition::ApiDefinition;
use crate::config::schema::ServerConfig;
use crate::config::validation::{validate_api_definition, validate_config, ValidationError};
use crate::pipeline::MockApi;
use crate::store::DocumentStore;

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Json(serde_json::Error),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Json(e) => write!(f, "JSON error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Parse(e) => Some(e),
            ConfigError::Json(e) => Some(e),
            ConfigError::Validation(_) => None,
        }
    }
}

/// Load and validate configuration from a TOML file.
///
/// Relative `api_file` paths are resolved against the config file's directory.
pub fn load_config(path: &Path) -> Result<ServerConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let mut config: ServerConfig = toml::from_str(&content).map_err(ConfigError::Parse)?;

    if let Some(dir) = path.parent() {
        for api in &mut config.apis {
            if api.api_file.is_relative() {
                api.api_file = dir.join(&api.api_file);
            }
        }
    }

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Load and validate an API definition file.
pub fn load_api_definition(path: &Path) -> Result<ApiDefinition, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let definition: ApiDefinition = serde_json::from_str(&content).map_err(ConfigError::Json)?;

    validate_api_definition(&definition).map_err(ConfigError::Validation)?;

    Ok(definition)
}

/// Load a dataset. The document must be a JSON array.
pub fn load_dataset(path: &Path) -> Result<DocumentStore, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let data: Value = serde_json::from_str(&content).map_err(ConfigError::Json)?;

    DocumentStore::new(data).map_err(|e| {
        ConfigError::Validation(vec![ValidationError {
            field: path.display().to_string(),
            message: e.to_string(),
        }])
    })
}

/// Load an API definition together with its dataset.
///
/// A definition that cannot be read is an error. A dataset that cannot be
/// loaded leaves the API disabled.
pub fn load_api(path: &Path) -> Result<MockApi, ConfigError> {
    let definition = load_api_definition(path)?;
    let data_file = definition.data_file_path(path);

    match load_dataset(&data_file) {
        Ok(store) => Ok(serve(path, definition, store)),
        Err(e) => {
            tracing::error!(
                data_file = %data_file.display(),
                error = %e,
                "Data file could not be loaded. The {} API will be disabled",
                definition.base_url
            );
            Ok(MockApi::disabled(definition.base_url))
        }
    }
}

/// Load an API definition and its dataset for a hot reload.
///
/// Unlike [`load_api`], a dataset that cannot be loaded is an error, so the
/// caller keeps serving the API it already has.
pub fn reload_api(path: &Path) -> Result<MockApi, ConfigError> {
    let definition = load_api_definition(path)?;
    let store = load_dataset(&definition.data_file_path(path))?;
    Ok(serve(path, definition, store))
}

fn serve(path: &Path, definition: ApiDefinition, store: DocumentStore) -> MockApi {
    let api = definition.into_api(store);
    tracing::info!(
        api_file = %path.display(),
        base_url = %api.base_url(),
        routes = api.routes().len(),
        "Mock API loaded"
    );
    for template in api.routes().templates() {
        tracing::debug!(base_url = %api.base_url(), template, "Route registered");
    }
    api
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{tempdir, NamedTempFile};

    #[test]
    fn test_load_minimal_config() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[listener]\nbind_address = \"127.0.0.1:9000\"").unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.listener.bind_address, "127.0.0.1:9000");
        assert_eq!(config.timeouts.request_secs, 30);
        assert!(config.apis.is_empty());
    }

    #[test]
    fn test_relative_api_files_resolve_against_config_dir() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("mock.toml");
        fs::write(&path, "[[apis]]\napi_file = \"customers-api.json\"\nwatch = false\n").unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.apis[0].api_file, dir.path().join("customers-api.json"));
        assert!(!config.apis[0].watch);
    }

    #[test]
    fn test_invalid_config() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[listener]\nbind_address = \"nowhere\"").unwrap();

        let err = load_config(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref errors) if errors.len() == 1));
        assert!(err.to_string().contains("listener.bind_address"));

        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[listener").unwrap();
        assert!(matches!(load_config(file.path()), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_api() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("data.json"), r#"[{"id": 1}]"#).unwrap();
        let api_file = dir.path().join("api.json");
        fs::write(
            &api_file,
            r#"{ "baseUrl": "/api", "dataFile": "data.json", "actions": [{ "action": "getAll" }] }"#,
        )
        .unwrap();

        let api = load_api(&api_file).unwrap();
        assert!(api.is_enabled());
        assert_eq!(api.store().len(), 1);
    }

    #[test]
    fn test_missing_or_invalid_data_disables_api() {
        let dir = tempdir().unwrap();
        let api_file = dir.path().join("api.json");
        fs::write(
            &api_file,
            r#"{ "baseUrl": "/api", "dataFile": "data.json", "actions": [{ "action": "getAll" }] }"#,
        )
        .unwrap();

        let api = load_api(&api_file).unwrap();
        assert!(!api.is_enabled());

        fs::write(dir.path().join("data.json"), r#"{"id": 1}"#).unwrap();
        let api = load_api(&api_file).unwrap();
        assert!(!api.is_enabled());
    }

    #[test]
    fn test_reload_rejects_unusable_data() {
        let dir = tempdir().unwrap();
        let api_file = dir.path().join("api.json");
        fs::write(
            &api_file,
            r#"{ "baseUrl": "/api", "dataFile": "data.json", "actions": [{ "action": "getAll" }] }"#,
        )
        .unwrap();

        assert!(matches!(reload_api(&api_file), Err(ConfigError::Io(_))));

        fs::write(dir.path().join("data.json"), "").unwrap();
        assert!(matches!(reload_api(&api_file), Err(ConfigError::Json(_))));

        fs::write(dir.path().join("data.json"), r#"{"id": 1}"#).unwrap();
        assert!(matches!(reload_api(&api_file), Err(ConfigError::Validation(_))));

        fs::write(dir.path().join("data.json"), r#"[{"id": 1}, {"id": 2}]"#).unwrap();
        let api = reload_api(&api_file).unwrap();
        assert!(api.is_enabled());
        assert_eq!(api.store().len(), 2);
    }

    #[test]
    fn test_bad_definition_is_an_error() {
        let dir = tempdir().unwrap();
        let api_file = dir.path().join("api.json");
        fs::write(&api_file, "{ not json").unwrap();

        assert!(matches!(load_api(&api_file), Err(ConfigError::Json(_))));
        assert!(matches!(load_api(&dir.path().join("absent.json")), Err(ConfigError::Io(_))));
    }
}
