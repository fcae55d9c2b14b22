//! Per-kind builders: desired-state record -> creation input.
//!
//! Builders run only for the `to_add` side of a diff (deletes just need a
//! name). They enforce the inter-field constraints that plain per-field
//! validation cannot express, and they never touch the network: a builder
//! failure is a configuration error surfaced before any backend mutation.

use thiserror::Error;

use edgesync_api::{
  CreateBackend, CreateCacheSetting, CreateCondition, CreateDomain, CreateGcsLogging, CreateGzip, CreateHeader,
  CreateHealthcheck, CreatePapertrail, CreateRequestSetting, CreateResource, CreateResponseObject, CreateS3Logging,
  CreateSumologic, CreateVcl,
};
use edgesync_model::{
  Backend, CacheSetting, Condition, Domain, GcsLogging, Gzip, Header, HeaderAction, Healthcheck, Papertrail,
  RequestSetting, ResponseObject, S3Logging, Sumologic, Vcl,
};

/// A record whose field combination is inconsistent for its kind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
  /// `set` and `append` header actions need a content source.
  #[error("header action '{action}' requires a source")]
  MissingHeaderSource { action: HeaderAction },

  /// `regex` and `regex_repeat` header actions need a pattern.
  #[error("header action '{action}' requires a regex")]
  MissingHeaderRegex { action: HeaderAction },

  /// The backend silently accepts S3 endpoints without credentials and the
  /// logs then never arrive, so empty credentials are rejected here.
  #[error("no {field} found for S3 log stream '{name}'")]
  MissingS3Credential { name: String, field: &'static str },
}

pub fn build_condition(c: &Condition) -> Result<CreateResource, BuildError> {
  Ok(CreateResource::Condition(CreateCondition {
    name: c.name.clone(),
    // trim in case the statement came from HEREDOC-style config with a
    // trailing newline
    statement: c.statement.trim().to_string(),
    priority: c.priority,
    condition_type: c.condition_type,
  }))
}

pub fn build_domain(d: &Domain) -> Result<CreateResource, BuildError> {
  Ok(CreateResource::Domain(CreateDomain {
    name: d.name.clone(),
    comment: d.comment.clone(),
  }))
}

pub fn build_healthcheck(h: &Healthcheck) -> Result<CreateResource, BuildError> {
  Ok(CreateResource::Healthcheck(CreateHealthcheck {
    name: h.name.clone(),
    host: h.host.clone(),
    path: h.path.clone(),
    check_interval: h.check_interval,
    expected_response: h.expected_response,
    http_version: h.http_version.clone(),
    initial: h.initial,
    method: h.method.clone(),
    threshold: h.threshold,
    timeout: h.timeout,
    window: h.window,
  }))
}

pub fn build_backend(b: &Backend) -> Result<CreateResource, BuildError> {
  Ok(CreateResource::Backend(CreateBackend {
    name: b.name.clone(),
    address: b.address.clone(),
    auto_loadbalance: b.auto_loadbalance,
    between_bytes_timeout: b.between_bytes_timeout,
    connect_timeout: b.connect_timeout,
    error_threshold: b.error_threshold,
    first_byte_timeout: b.first_byte_timeout,
    healthcheck: b.healthcheck.clone(),
    max_conn: b.max_conn,
    port: b.port,
    request_condition: b.request_condition.clone(),
    shield: b.shield.clone(),
    ssl_check_cert: b.ssl_check_cert,
    ssl_hostname: b.ssl_hostname.clone(),
    ssl_cert_hostname: b.ssl_cert_hostname.clone(),
    ssl_sni_hostname: b.ssl_sni_hostname.clone(),
    weight: b.weight,
  }))
}

/// Build a header rule, checking that the fields its action relies on are
/// present.
pub fn build_header(h: &Header) -> Result<CreateResource, BuildError> {
  match h.action {
    HeaderAction::Set | HeaderAction::Append if h.source.is_empty() => {
      return Err(BuildError::MissingHeaderSource { action: h.action });
    }
    HeaderAction::Regex | HeaderAction::RegexRepeat if h.regex.is_empty() => {
      return Err(BuildError::MissingHeaderRegex { action: h.action });
    }
    _ => {}
  }

  Ok(CreateResource::Header(CreateHeader {
    name: h.name.clone(),
    action: h.action,
    header_type: h.header_type,
    destination: h.destination.clone(),
    ignore_if_set: h.ignore_if_set,
    source: h.source.clone(),
    regex: h.regex.clone(),
    substitution: h.substitution.clone(),
    priority: h.priority,
    request_condition: h.request_condition.clone(),
    cache_condition: h.cache_condition.clone(),
    response_condition: h.response_condition.clone(),
  }))
}

pub fn build_gzip(g: &Gzip) -> Result<CreateResource, BuildError> {
  Ok(CreateResource::Gzip(CreateGzip {
    name: g.name.clone(),
    content_types: g.content_types.join(" "),
    extensions: g.extensions.join(" "),
    cache_condition: g.cache_condition.clone(),
  }))
}

/// Build an S3 logging endpoint, rejecting empty credentials.
pub fn build_s3_logging(s: &S3Logging) -> Result<CreateResource, BuildError> {
  if s.access_key.is_empty() {
    return Err(BuildError::MissingS3Credential {
      name: s.name.clone(),
      field: "access_key",
    });
  }
  if s.secret_key.is_empty() {
    return Err(BuildError::MissingS3Credential {
      name: s.name.clone(),
      field: "secret_key",
    });
  }

  Ok(CreateResource::S3Logging(CreateS3Logging {
    name: s.name.clone(),
    bucket_name: s.bucket_name.clone(),
    access_key: s.access_key.clone(),
    secret_key: s.secret_key.clone(),
    path: s.path.clone(),
    domain: s.domain.clone(),
    gzip_level: s.gzip_level,
    period: s.period,
    format: s.format.clone(),
    format_version: s.format_version,
    timestamp_format: s.timestamp_format.clone(),
    response_condition: s.response_condition.clone(),
  }))
}

pub fn build_papertrail(p: &Papertrail) -> Result<CreateResource, BuildError> {
  Ok(CreateResource::Papertrail(CreatePapertrail {
    name: p.name.clone(),
    address: p.address.clone(),
    port: p.port,
    format: p.format.clone(),
    response_condition: p.response_condition.clone(),
  }))
}

pub fn build_sumologic(s: &Sumologic) -> Result<CreateResource, BuildError> {
  Ok(CreateResource::Sumologic(CreateSumologic {
    name: s.name.clone(),
    url: s.url.clone(),
    format: s.format.clone(),
    format_version: s.format_version,
    response_condition: s.response_condition.clone(),
    message_type: s.message_type,
  }))
}

pub fn build_gcs_logging(g: &GcsLogging) -> Result<CreateResource, BuildError> {
  Ok(CreateResource::GcsLogging(CreateGcsLogging {
    name: g.name.clone(),
    email: g.email.clone(),
    bucket_name: g.bucket_name.clone(),
    secret_key: g.secret_key.clone(),
    path: g.path.clone(),
    gzip_level: g.gzip_level,
    period: g.period,
    format: g.format.clone(),
    timestamp_format: g.timestamp_format.clone(),
    response_condition: g.response_condition.clone(),
  }))
}

pub fn build_response_object(r: &ResponseObject) -> Result<CreateResource, BuildError> {
  Ok(CreateResource::ResponseObject(CreateResponseObject {
    name: r.name.clone(),
    status: r.status,
    response: r.response.clone(),
    content: r.content.clone(),
    content_type: r.content_type.clone(),
    request_condition: r.request_condition.clone(),
    cache_condition: r.cache_condition.clone(),
  }))
}

pub fn build_request_setting(r: &RequestSetting) -> Result<CreateResource, BuildError> {
  Ok(CreateResource::RequestSetting(CreateRequestSetting {
    name: r.name.clone(),
    request_condition: r.request_condition.clone(),
    max_stale_age: r.max_stale_age,
    force_miss: r.force_miss,
    force_ssl: r.force_ssl,
    action: r.action,
    bypass_busy_wait: r.bypass_busy_wait,
    hash_keys: r.hash_keys.clone(),
    xff: r.xff,
    timer_support: r.timer_support,
    geo_headers: r.geo_headers,
    default_host: r.default_host.clone(),
  }))
}

pub fn build_vcl(v: &Vcl) -> Result<CreateResource, BuildError> {
  Ok(CreateResource::Vcl(CreateVcl {
    name: v.name.clone(),
    content: v.content.clone(),
    main: v.main,
  }))
}

pub fn build_cache_setting(c: &CacheSetting) -> Result<CreateResource, BuildError> {
  Ok(CreateResource::CacheSetting(CreateCacheSetting {
    name: c.name.clone(),
    action: c.action,
    cache_condition: c.cache_condition.clone(),
    stale_ttl: c.stale_ttl,
    ttl: c.ttl,
  }))
}
