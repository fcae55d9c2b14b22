//! The service-level configuration record.

use serde::{Deserialize, Serialize};

use crate::resource::{
  Backend, CacheSetting, Condition, Domain, GcsLogging, Gzip, Header, Healthcheck, Papertrail, RequestSetting,
  ResponseObject, S3Logging, Sumologic, Vcl,
};

/// The complete desired state of one edge service.
///
/// This is what callers declare and what the state store persists. The
/// reconciliation engine reads the whole record and, at the end of a
/// successful run, bumps `active_version` to the version it activated.
///
/// # Versioning
///
/// Published versions are immutable on the backend. `active_version` is `0`
/// for a service that has never been activated; such a service carries an
/// implicit, still-unlocked version 1 that can be mutated directly without
/// cloning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfig {
  /// Backend-assigned service identifier.
  pub id: String,
  /// Unique name for this service. Renames do not require a new version.
  pub name: String,
  /// The currently active (locked) version, `0` before first activation.
  #[serde(default)]
  pub active_version: u64,
  /// The default hostname for the version.
  #[serde(default)]
  pub default_host: Option<String>,
  /// The default time-to-live for the version, in seconds.
  #[serde(default = "default_ttl")]
  pub default_ttl: u32,

  #[serde(default)]
  pub conditions: Vec<Condition>,
  #[serde(default)]
  pub domains: Vec<Domain>,
  #[serde(default)]
  pub healthchecks: Vec<Healthcheck>,
  #[serde(default)]
  pub backends: Vec<Backend>,
  #[serde(default)]
  pub headers: Vec<Header>,
  #[serde(default)]
  pub gzips: Vec<Gzip>,
  #[serde(default)]
  pub s3_loggings: Vec<S3Logging>,
  #[serde(default)]
  pub papertrails: Vec<Papertrail>,
  #[serde(default)]
  pub sumologics: Vec<Sumologic>,
  #[serde(default)]
  pub gcs_loggings: Vec<GcsLogging>,
  #[serde(default)]
  pub response_objects: Vec<ResponseObject>,
  #[serde(default)]
  pub request_settings: Vec<RequestSetting>,
  #[serde(default)]
  pub vcls: Vec<Vcl>,
  #[serde(default)]
  pub cache_settings: Vec<CacheSetting>,
}

impl ServiceConfig {
  /// An empty configuration for a service that has never been reconciled.
  ///
  /// Used as the "previously applied" side when the state store has no
  /// record for the service: every desired record then shows up as an add,
  /// and `active_version = 0` routes the engine to the implicit version 1.
  pub fn empty(id: impl Into<String>, name: impl Into<String>) -> Self {
    ServiceConfig {
      id: id.into(),
      name: name.into(),
      active_version: 0,
      default_host: None,
      default_ttl: default_ttl(),
      conditions: Vec::new(),
      domains: Vec::new(),
      healthchecks: Vec::new(),
      backends: Vec::new(),
      headers: Vec::new(),
      gzips: Vec::new(),
      s3_loggings: Vec::new(),
      papertrails: Vec::new(),
      sumologics: Vec::new(),
      gcs_loggings: Vec::new(),
      response_objects: Vec::new(),
      request_settings: Vec::new(),
      vcls: Vec::new(),
      cache_settings: Vec::new(),
    }
  }
}

fn default_ttl() -> u32 {
  3600
}
