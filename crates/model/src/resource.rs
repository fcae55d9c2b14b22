//! Sub-resource record types.
//!
//! Field sets and defaults mirror what the configuration backend accepts for
//! each resource kind. Every record is keyed by `name` within its collection
//! and compared by full value equality: the reconciliation engine never
//! issues in-place updates, so a changed field always means delete + create.
//!
//! References between kinds (a backend naming its healthcheck, most kinds
//! naming a condition) are soft: plain strings resolved by the backend at
//! version validation time, never ownership edges.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Access to the unique `name` key of a record.
///
/// Deletes only need the name; the generic diff and the per-collection
/// apply stages are written against this trait.
pub trait Named {
  fn name(&self) -> &str;
}

macro_rules! impl_named {
  ($($ty:ty),* $(,)?) => {
    $(impl Named for $ty {
      fn name(&self) -> &str {
        &self.name
      }
    })*
  };
}

/// The closed set of sub-resource kinds managed per service version.
///
/// The reconciliation order across kinds is fixed (see the engine crate);
/// this enum exists so errors and logs can say which collection an
/// operation was acting on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
  Condition,
  Domain,
  Healthcheck,
  Backend,
  Header,
  Gzip,
  S3Logging,
  Papertrail,
  Sumologic,
  GcsLogging,
  ResponseObject,
  RequestSetting,
  Vcl,
  CacheSetting,
}

impl ResourceKind {
  pub fn as_str(&self) -> &'static str {
    match self {
      ResourceKind::Condition => "condition",
      ResourceKind::Domain => "domain",
      ResourceKind::Healthcheck => "healthcheck",
      ResourceKind::Backend => "backend",
      ResourceKind::Header => "header",
      ResourceKind::Gzip => "gzip",
      ResourceKind::S3Logging => "s3logging",
      ResourceKind::Papertrail => "papertrail",
      ResourceKind::Sumologic => "sumologic",
      ResourceKind::GcsLogging => "gcslogging",
      ResourceKind::ResponseObject => "response_object",
      ResourceKind::RequestSetting => "request_setting",
      ResourceKind::Vcl => "vcl",
      ResourceKind::CacheSetting => "cache_setting",
    }
  }
}

impl fmt::Display for ResourceKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Condition type: which request phase the statement is evaluated in.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ConditionType {
  #[default]
  Request,
  Response,
  Cache,
}

/// A named VCL condition, referenced by name from most other kinds.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Condition {
  pub name: String,
  /// The statement used to determine if the condition is met.
  pub statement: String,
  /// Lower numbers execute first.
  pub priority: i32,
  #[serde(rename = "type")]
  pub condition_type: ConditionType,
}

/// A domain the service responds to.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Domain {
  pub name: String,
  pub comment: String,
}

/// An origin healthcheck, referenced by name from [`Backend::healthcheck`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Healthcheck {
  pub name: String,
  /// Which host to check.
  pub host: String,
  /// The path to check.
  pub path: String,
  /// How often to run the healthcheck, in milliseconds.
  pub check_interval: u32,
  /// The status code expected from the host.
  pub expected_response: u32,
  pub http_version: String,
  /// When loading a config, the initial number of probes to be seen as OK.
  pub initial: u32,
  pub method: String,
  /// How many healthchecks must succeed to be considered healthy.
  pub threshold: u32,
  /// Timeout in milliseconds.
  pub timeout: u32,
  /// The number of most recent healthcheck queries to keep.
  pub window: u32,
}

impl Default for Healthcheck {
  fn default() -> Self {
    Healthcheck {
      name: String::new(),
      host: String::new(),
      path: String::new(),
      check_interval: 5000,
      expected_response: 200,
      http_version: "1.1".to_string(),
      initial: 2,
      method: "HEAD".to_string(),
      threshold: 3,
      timeout: 500,
      window: 5,
    }
  }
}

/// An origin server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Backend {
  pub name: String,
  /// An IPv4, hostname, or IPv6 address for the backend.
  pub address: String,
  pub auto_loadbalance: bool,
  /// How long to wait between bytes, in milliseconds.
  pub between_bytes_timeout: u32,
  /// Connection timeout in milliseconds.
  pub connect_timeout: u32,
  /// Number of errors to allow before the backend is marked as down.
  pub error_threshold: u32,
  /// How long to wait for the first byte, in milliseconds.
  pub first_byte_timeout: u32,
  /// Name of the healthcheck used for this backend (soft reference).
  pub healthcheck: String,
  pub max_conn: u32,
  pub port: u16,
  /// Name of a condition which, if met, selects this backend (soft reference).
  pub request_condition: String,
  /// The POP of the shield designated to reduce inbound load.
  pub shield: String,
  pub ssl_check_cert: bool,
  pub ssl_hostname: String,
  pub ssl_cert_hostname: String,
  pub ssl_sni_hostname: String,
  /// The portion of traffic to send to this origin, out of the total weight.
  pub weight: u32,
}

impl Default for Backend {
  fn default() -> Self {
    Backend {
      name: String::new(),
      address: String::new(),
      auto_loadbalance: true,
      between_bytes_timeout: 10_000,
      connect_timeout: 1000,
      error_threshold: 0,
      first_byte_timeout: 15_000,
      healthcheck: String::new(),
      max_conn: 200,
      port: 80,
      request_condition: String::new(),
      shield: String::new(),
      ssl_check_cert: true,
      ssl_hostname: String::new(),
      ssl_cert_hostname: String::new(),
      ssl_sni_hostname: String::new(),
      weight: 100,
    }
  }
}

/// What a header rule does to its destination header.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeaderAction {
  #[default]
  Set,
  Append,
  Delete,
  Regex,
  RegexRepeat,
}

impl HeaderAction {
  pub fn as_str(&self) -> &'static str {
    match self {
      HeaderAction::Set => "set",
      HeaderAction::Append => "append",
      HeaderAction::Delete => "delete",
      HeaderAction::Regex => "regex",
      HeaderAction::RegexRepeat => "regex_repeat",
    }
  }
}

impl fmt::Display for HeaderAction {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Which object a header rule manipulates.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeaderType {
  #[default]
  Request,
  Fetch,
  Cache,
  Response,
}

/// A header manipulation rule.
///
/// Which of `source` / `regex` / `substitution` are meaningful depends on
/// `action`; the engine-side builder rejects inconsistent combinations
/// before any network call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Header {
  pub name: String,
  pub action: HeaderAction,
  #[serde(rename = "type")]
  pub header_type: HeaderType,
  /// The header this rule affects.
  pub destination: String,
  /// Don't add the header if it is already set (only for the `set` action).
  pub ignore_if_set: bool,
  /// Variable used as the source for the header content (not for `delete`).
  pub source: String,
  /// Regular expression to use (only for `regex` and `regex_repeat`).
  pub regex: String,
  /// Value substituted in place of the regex match.
  pub substitution: String,
  /// Lower priorities execute first.
  pub priority: i32,
  pub request_condition: String,
  pub cache_condition: String,
  pub response_condition: String,
}

impl Default for Header {
  fn default() -> Self {
    Header {
      name: String::new(),
      action: HeaderAction::default(),
      header_type: HeaderType::default(),
      destination: String::new(),
      ignore_if_set: false,
      source: String::new(),
      regex: String::new(),
      substitution: String::new(),
      priority: 100,
      request_condition: String::new(),
      cache_condition: String::new(),
      response_condition: String::new(),
    }
  }
}

/// Automatic gzip compression settings.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Gzip {
  pub name: String,
  /// Content types to compress.
  pub content_types: Vec<String>,
  /// File extensions to compress, without the leading dot.
  pub extensions: Vec<String>,
  pub cache_condition: String,
}

/// An S3 log-streaming endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct S3Logging {
  pub name: String,
  pub bucket_name: String,
  pub access_key: String,
  pub secret_key: String,
  /// Path to store the files. Must end with a trailing slash.
  pub path: String,
  /// Bucket endpoint.
  pub domain: String,
  pub gzip_level: u32,
  /// How frequently logs are transferred, in seconds.
  pub period: u32,
  /// Apache-style string or VCL variables to use for log formatting.
  pub format: String,
  pub format_version: u32,
  pub timestamp_format: String,
  pub response_condition: String,
}

impl Default for S3Logging {
  fn default() -> Self {
    S3Logging {
      name: String::new(),
      bucket_name: String::new(),
      access_key: String::new(),
      secret_key: String::new(),
      path: String::new(),
      domain: String::new(),
      gzip_level: 0,
      period: 3600,
      format: default_log_format(),
      format_version: 1,
      timestamp_format: default_timestamp_format(),
      response_condition: String::new(),
    }
  }
}

/// A Papertrail log-streaming endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Papertrail {
  pub name: String,
  pub address: String,
  pub port: u16,
  pub format: String,
  pub response_condition: String,
}

impl Default for Papertrail {
  fn default() -> Self {
    Papertrail {
      name: String::new(),
      address: String::new(),
      port: 0,
      format: default_log_format(),
      response_condition: String::new(),
    }
  }
}

/// How a Sumologic message is formatted.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
  #[default]
  Classic,
  Loggly,
  Logplex,
  Blank,
}

/// A Sumologic log-streaming endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Sumologic {
  pub name: String,
  /// The URL to POST to.
  pub url: String,
  pub format: String,
  pub format_version: u32,
  pub response_condition: String,
  pub message_type: MessageType,
}

impl Default for Sumologic {
  fn default() -> Self {
    Sumologic {
      name: String::new(),
      url: String::new(),
      format: default_log_format(),
      format_version: 1,
      response_condition: String::new(),
      message_type: MessageType::default(),
    }
  }
}

/// A Google Cloud Storage log-streaming endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GcsLogging {
  pub name: String,
  /// The email address associated with the target GCS bucket.
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

impl Default for GcsLogging {
  fn default() -> Self {
    GcsLogging {
      name: String::new(),
      email: String::new(),
      bucket_name: String::new(),
      secret_key: String::new(),
      path: String::new(),
      gzip_level: 0,
      period: 3600,
      format: default_log_format(),
      timestamp_format: default_timestamp_format(),
      response_condition: String::new(),
    }
  }
}

/// A synthetic response served directly from the edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResponseObject {
  pub name: String,
  /// The HTTP status code of the object.
  pub status: u32,
  /// The HTTP response phrase of the object.
  pub response: String,
  pub content: String,
  pub content_type: String,
  pub request_condition: String,
  pub cache_condition: String,
}

impl Default for ResponseObject {
  fn default() -> Self {
    ResponseObject {
      name: String::new(),
      status: 200,
      response: "OK".to_string(),
      content: String::new(),
      content_type: String::new(),
      request_condition: String::new(),
      cache_condition: String::new(),
    }
  }
}

/// Terminating action for a request setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestAction {
  Lookup,
  Pass,
}

/// X-Forwarded-For handling.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Xff {
  Clear,
  Leave,
  #[default]
  Append,
  AppendAll,
  Overwrite,
}

/// Request-phase settings applied when `request_condition` matches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestSetting {
  pub name: String,
  pub request_condition: String,
  /// How old an object is allowed to be, in seconds.
  pub max_stale_age: u32,
  pub force_miss: bool,
  pub force_ssl: bool,
  /// Terminate request handling and immediately perform this action.
  pub action: Option<RequestAction>,
  /// Disable collapsed forwarding.
  pub bypass_busy_wait: bool,
  /// Comma-separated list of request object fields to include in the hash key.
  pub hash_keys: String,
  pub xff: Xff,
  /// Inject X-Timer info into the request.
  pub timer_support: bool,
  /// Inject geo headers into the request.
  pub geo_headers: bool,
  /// Override for the host header.
  pub default_host: String,
}

impl Default for RequestSetting {
  fn default() -> Self {
    RequestSetting {
      name: String::new(),
      request_condition: String::new(),
      max_stale_age: 60,
      force_miss: false,
      force_ssl: false,
      action: None,
      bypass_busy_wait: false,
      hash_keys: String::new(),
      xff: Xff::default(),
      timer_support: false,
      geo_headers: false,
      default_host: String::new(),
    }
  }
}

/// A custom VCL file.
///
/// Among all VCL records of a version, at most one may be `main`; if the
/// collection is non-empty, exactly one must be. See the validate module.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Vcl {
  pub name: String,
  pub content: String,
  /// Whether this VCL is the entry point of the version.
  pub main: bool,
}

/// Caching action for a cache setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheAction {
  Cache,
  Pass,
  Restart,
}

/// Cache behavior applied when `cache_condition` matches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSetting {
  pub name: String,
  pub action: Option<CacheAction>,
  pub cache_condition: String,
  /// Max time-to-live for stale (unreachable) objects, in seconds.
  pub stale_ttl: u32,
  /// Time-to-live for the object, in seconds.
  pub ttl: Option<u32>,
}

impl Default for CacheSetting {
  fn default() -> Self {
    CacheSetting {
      name: String::new(),
      action: None,
      cache_condition: String::new(),
      stale_ttl: 300,
      ttl: None,
    }
  }
}

fn default_log_format() -> String {
  "%h %l %u %t %r %>s".to_string()
}

fn default_timestamp_format() -> String {
  "%Y-%m-%dT%H:%M:%S.000".to_string()
}

impl_named!(
  Condition,
  Domain,
  Healthcheck,
  Backend,
  Header,
  Gzip,
  S3Logging,
  Papertrail,
  Sumologic,
  GcsLogging,
  ResponseObject,
  RequestSetting,
  Vcl,
  CacheSetting,
);
