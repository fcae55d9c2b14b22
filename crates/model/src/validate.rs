//! Local validation of a desired configuration.
//!
//! Everything here is checked before any network call. A failure is a
//! configuration error: it is never retried and no backend mutation has
//! happened when it surfaces.

use std::collections::HashSet;

use thiserror::Error;

use crate::resource::{Named, ResourceKind};
use crate::service::ServiceConfig;

/// Invariant violations detectable without the backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidateError {
  #[error("you cannot have more than one VCL configuration with main = true")]
  MultipleMainVcl,

  #[error("if you include VCL configurations, one of them should have main = true")]
  NoMainVcl,

  #[error("duplicate {kind} name: {name}")]
  DuplicateName { kind: ResourceKind, name: String },

  #[error("{kind} record with an empty name")]
  EmptyName { kind: ResourceKind },
}

/// Validate a desired configuration.
///
/// Checks the VCL `main` invariant and that every collection is uniquely
/// keyed by non-empty name.
pub fn validate(config: &ServiceConfig) -> Result<(), ValidateError> {
  validate_vcls(config)?;

  unique_names(ResourceKind::Condition, &config.conditions)?;
  unique_names(ResourceKind::Domain, &config.domains)?;
  unique_names(ResourceKind::Healthcheck, &config.healthchecks)?;
  unique_names(ResourceKind::Backend, &config.backends)?;
  unique_names(ResourceKind::Header, &config.headers)?;
  unique_names(ResourceKind::Gzip, &config.gzips)?;
  unique_names(ResourceKind::S3Logging, &config.s3_loggings)?;
  unique_names(ResourceKind::Papertrail, &config.papertrails)?;
  unique_names(ResourceKind::Sumologic, &config.sumologics)?;
  unique_names(ResourceKind::GcsLogging, &config.gcs_loggings)?;
  unique_names(ResourceKind::ResponseObject, &config.response_objects)?;
  unique_names(ResourceKind::RequestSetting, &config.request_settings)?;
  unique_names(ResourceKind::Vcl, &config.vcls)?;
  unique_names(ResourceKind::CacheSetting, &config.cache_settings)?;

  Ok(())
}

/// Among all VCL records, at most one may be `main`; a non-empty collection
/// must have exactly one.
fn validate_vcls(config: &ServiceConfig) -> Result<(), ValidateError> {
  let mains = config.vcls.iter().filter(|v| v.main).count();

  if mains > 1 {
    return Err(ValidateError::MultipleMainVcl);
  }
  if mains == 0 && !config.vcls.is_empty() {
    return Err(ValidateError::NoMainVcl);
  }
  Ok(())
}

fn unique_names<T: Named>(kind: ResourceKind, records: &[T]) -> Result<(), ValidateError> {
  let mut seen = HashSet::new();
  for record in records {
    if record.name().is_empty() {
      return Err(ValidateError::EmptyName { kind });
    }
    if !seen.insert(record.name()) {
      return Err(ValidateError::DuplicateName {
        kind,
        name: record.name().to_string(),
      });
    }
  }
  Ok(())
}
