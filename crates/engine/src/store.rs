//! Persisted state for reconciled services.
//!
//! The store keeps, per service, the last configuration this engine
//! successfully applied together with the version number that activation
//! produced. It is read at the start of a reconciliation and written only
//! after a confirmed activation.
//!
//! # Storage layout
//!
//! ```text
//! {base_path}/
//! └── <service-id>.json    # one ServiceConfig document per service
//! ```

use std::fs;
use std::io;
use std::path::PathBuf;

use thiserror::Error;
use tracing::debug;

use edgesync_model::ServiceConfig;

/// Errors from reading or writing persisted service state.
#[derive(Debug, Error)]
pub enum StoreError {
  #[error("failed to create state directory: {0}")]
  CreateDir(#[source] io::Error),

  #[error("failed to read state file: {0}")]
  Read(#[source] io::Error),

  #[error("failed to write state file: {0}")]
  Write(#[source] io::Error),

  #[error("failed to parse state file: {0}")]
  Parse(#[source] serde_json::Error),

  #[error("failed to serialize state: {0}")]
  Serialize(#[source] serde_json::Error),
}

/// Access to the previously applied configuration per service.
pub trait StateStore {
  /// Load the last applied configuration, or `None` for an unknown service.
  fn load(&self, service_id: &str) -> Result<Option<ServiceConfig>, StoreError>;

  /// Persist a configuration as the last applied one for its service.
  fn save(&self, config: &ServiceConfig) -> Result<(), StoreError>;
}

/// File-backed state store, one JSON document per service.
///
/// Writes go through a temp file and a rename so a crash mid-write never
/// leaves a truncated document behind.
#[derive(Debug, Clone)]
pub struct JsonStateStore {
  base_path: PathBuf,
}

impl JsonStateStore {
  pub fn new(base_path: PathBuf) -> Self {
    JsonStateStore { base_path }
  }

  pub fn base_path(&self) -> &PathBuf {
    &self.base_path
  }

  fn service_path(&self, service_id: &str) -> PathBuf {
    self.base_path.join(format!("{service_id}.json"))
  }

  fn ensure_dir(&self) -> Result<(), StoreError> {
    fs::create_dir_all(&self.base_path).map_err(StoreError::CreateDir)
  }
}

impl StateStore for JsonStateStore {
  fn load(&self, service_id: &str) -> Result<Option<ServiceConfig>, StoreError> {
    let path = self.service_path(service_id);

    let content = match fs::read_to_string(&path) {
      Ok(content) => content,
      Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
      Err(e) => return Err(StoreError::Read(e)),
    };

    let config: ServiceConfig = serde_json::from_str(&content).map_err(StoreError::Parse)?;
    Ok(Some(config))
  }

  fn save(&self, config: &ServiceConfig) -> Result<(), StoreError> {
    self.ensure_dir()?;

    let path = self.service_path(&config.id);
    let temp_path = path.with_extension("json.tmp");

    let content = serde_json::to_string_pretty(config).map_err(StoreError::Serialize)?;
    fs::write(&temp_path, &content).map_err(StoreError::Write)?;
    fs::rename(&temp_path, &path).map_err(StoreError::Write)?;

    debug!(service = %config.id, version = config.active_version, "persisted service state");
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::TempDir;

  #[test]
  fn load_unknown_service_returns_none() {
    let dir = TempDir::new().unwrap();
    let store = JsonStateStore::new(dir.path().to_path_buf());
    assert!(store.load("svc1").unwrap().is_none());
  }

  #[test]
  fn save_then_load_round_trips() {
    let dir = TempDir::new().unwrap();
    let store = JsonStateStore::new(dir.path().to_path_buf());

    let mut config = ServiceConfig::empty("svc1", "my-service");
    config.active_version = 4;
    store.save(&config).unwrap();

    let loaded = store.load("svc1").unwrap().unwrap();
    assert_eq!(loaded, config);
    assert_eq!(loaded.active_version, 4);
  }

  #[test]
  fn save_overwrites_previous_state() {
    let dir = TempDir::new().unwrap();
    let store = JsonStateStore::new(dir.path().to_path_buf());

    let mut config = ServiceConfig::empty("svc1", "my-service");
    config.active_version = 1;
    store.save(&config).unwrap();

    config.active_version = 2;
    config.name = "renamed".to_string();
    store.save(&config).unwrap();

    let loaded = store.load("svc1").unwrap().unwrap();
    assert_eq!(loaded.active_version, 2);
    assert_eq!(loaded.name, "renamed");
  }

  #[test]
  fn no_temp_file_left_behind() {
    let dir = TempDir::new().unwrap();
    let store = JsonStateStore::new(dir.path().to_path_buf());

    store.save(&ServiceConfig::empty("svc1", "my-service")).unwrap();

    let leftovers: Vec<_> = fs::read_dir(dir.path())
      .unwrap()
      .map(|e| e.unwrap().file_name().into_string().unwrap())
      .filter(|n| n.ends_with(".tmp"))
      .collect();
    assert!(leftovers.is_empty());
  }
}
