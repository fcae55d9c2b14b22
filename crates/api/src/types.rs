//! Creation inputs sent to the configuration backend.
//!
//! One input struct per resource kind, carrying exactly the fields the
//! backend's create call accepts. These are produced by the engine-side
//! builders from desired-state records: mostly a field-for-field mapping,
//! with the few normalizations the backend expects (condition statements
//! trimmed, gzip lists joined into space-separated strings).
//!
//! [`CreateResource`] is the closed union over all kinds; the engine
//! dispatches on it instead of doing any runtime type inspection.

use serde::Serialize;

use edgesync_model::{
  CacheAction, ConditionType, HeaderAction, HeaderType, MessageType, RequestAction, ResourceKind, Xff,
};

/// Version-level settings applied through `update_settings`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SettingsUpdate {
  pub default_host: Option<String>,
  pub default_ttl: u32,
}

/// Result of asking the backend to validate a draft version.
///
/// `valid = false` is not a transport error: the call succeeded and the
/// backend judged the version itself semantically invalid. `message` is
/// surfaced to the user verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionValidation {
  pub valid: bool,
  pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateCondition {
  pub name: String,
  /// Trimmed of leading/trailing whitespace by the builder.
  pub statement: String,
  pub priority: i32,
  #[serde(rename = "type")]
  pub condition_type: ConditionType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateDomain {
  pub name: String,
  pub comment: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateHealthcheck {
  pub name: String,
  pub host: String,
  pub path: String,
  pub check_interval: u32,
  pub expected_response: u32,
  pub http_version: String,
  pub initial: u32,
  pub method: String,
  pub threshold: u32,
  pub timeout: u32,
  pub window: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateBackend {
  pub name: String,
  pub address: String,
  pub auto_loadbalance: bool,
  pub between_bytes_timeout: u32,
  pub connect_timeout: u32,
  pub error_threshold: u32,
  pub first_byte_timeout: u32,
  pub healthcheck: String,
  pub max_conn: u32,
  pub port: u16,
  pub request_condition: String,
  pub shield: String,
  pub ssl_check_cert: bool,
  pub ssl_hostname: String,
  pub ssl_cert_hostname: String,
  pub ssl_sni_hostname: String,
  pub weight: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateHeader {
  pub name: String,
  pub action: HeaderAction,
  #[serde(rename = "type")]
  pub header_type: HeaderType,
  pub destination: String,
  pub ignore_if_set: bool,
  pub source: String,
  pub regex: String,
  pub substitution: String,
  pub priority: i32,
  pub request_condition: String,
  pub cache_condition: String,
  pub response_condition: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateGzip {
  pub name: String,
  /// Space-separated content types.
  pub content_types: String,
  /// Space-separated file extensions.
  pub extensions: String,
  pub cache_condition: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateS3Logging {
  pub name: String,
  pub bucket_name: String,
  pub access_key: String,
  pub secret_key: String,
  pub path: String,
  pub domain: String,
  pub gzip_level: u32,
  pub period: u32,
  pub format: String,
  pub format_version: u32,
  pub timestamp_format: String,
  pub response_condition: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreatePapertrail {
  pub name: String,
  pub address: String,
  pub port: u16,
  pub format: String,
  pub response_condition: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateSumologic {
  pub name: String,
  pub url: String,
  pub format: String,
  pub format_version: u32,
  pub response_condition: String,
  pub message_type: MessageType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateGcsLogging {
  pub name: String,
  pub email: String,
  pub bucket_name: String,
  pub secret_key: String,
  pub path: String,
  pub gzip_level: u32,
  pub period: u32,
  pub format: String,
  pub timestamp_format: String,
  pub response_condition: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateResponseObject {
  pub name: String,
  pub status: u32,
  pub response: String,
  pub content: String,
  pub content_type: String,
  pub request_condition: String,
  pub cache_condition: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateRequestSetting {
  pub name: String,
  pub request_condition: String,
  pub max_stale_age: u32,
  pub force_miss: bool,
  pub force_ssl: bool,
  pub action: Option<RequestAction>,
  pub bypass_busy_wait: bool,
  pub hash_keys: String,
  pub xff: Xff,
  pub timer_support: bool,
  pub geo_headers: bool,
  pub default_host: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateVcl {
  pub name: String,
  pub content: String,
  pub main: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateCacheSetting {
  pub name: String,
  pub action: Option<CacheAction>,
  pub cache_condition: String,
  pub stale_ttl: u32,
  pub ttl: Option<u32>,
}

/// A creation request for any sub-resource kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CreateResource {
  Condition(CreateCondition),
  Domain(CreateDomain),
  Healthcheck(CreateHealthcheck),
  Backend(CreateBackend),
  Header(CreateHeader),
  Gzip(CreateGzip),
  S3Logging(CreateS3Logging),
  Papertrail(CreatePapertrail),
  Sumologic(CreateSumologic),
  GcsLogging(CreateGcsLogging),
  ResponseObject(CreateResponseObject),
  RequestSetting(CreateRequestSetting),
  Vcl(CreateVcl),
  CacheSetting(CreateCacheSetting),
}

impl CreateResource {
  pub fn kind(&self) -> ResourceKind {
    match self {
      CreateResource::Condition(_) => ResourceKind::Condition,
      CreateResource::Domain(_) => ResourceKind::Domain,
      CreateResource::Healthcheck(_) => ResourceKind::Healthcheck,
      CreateResource::Backend(_) => ResourceKind::Backend,
      CreateResource::Header(_) => ResourceKind::Header,
      CreateResource::Gzip(_) => ResourceKind::Gzip,
      CreateResource::S3Logging(_) => ResourceKind::S3Logging,
      CreateResource::Papertrail(_) => ResourceKind::Papertrail,
      CreateResource::Sumologic(_) => ResourceKind::Sumologic,
      CreateResource::GcsLogging(_) => ResourceKind::GcsLogging,
      CreateResource::ResponseObject(_) => ResourceKind::ResponseObject,
      CreateResource::RequestSetting(_) => ResourceKind::RequestSetting,
      CreateResource::Vcl(_) => ResourceKind::Vcl,
      CreateResource::CacheSetting(_) => ResourceKind::CacheSetting,
    }
  }

  pub fn name(&self) -> &str {
    match self {
      CreateResource::Condition(r) => &r.name,
      CreateResource::Domain(r) => &r.name,
      CreateResource::Healthcheck(r) => &r.name,
      CreateResource::Backend(r) => &r.name,
      CreateResource::Header(r) => &r.name,
      CreateResource::Gzip(r) => &r.name,
      CreateResource::S3Logging(r) => &r.name,
      CreateResource::Papertrail(r) => &r.name,
      CreateResource::Sumologic(r) => &r.name,
      CreateResource::GcsLogging(r) => &r.name,
      CreateResource::ResponseObject(r) => &r.name,
      CreateResource::RequestSetting(r) => &r.name,
      CreateResource::Vcl(r) => &r.name,
      CreateResource::CacheSetting(r) => &r.name,
    }
  }
}
