//! The backend operations consumed by the reconciliation engine.

use edgesync_model::ResourceKind;

use crate::error::ApiError;
use crate::types::{CreateResource, SettingsUpdate, VersionValidation};

/// Operations the reconciliation engine performs against the configuration
/// backend.
///
/// Every call is synchronous from the engine's point of view: issued one at
/// a time, awaited to completion, failing fast. Implementations must not
/// retry internally; retry policy belongs to the caller of the engine.
///
/// # Versions
///
/// `version` parameters always refer to a draft (unlocked) version except
/// for [`clone_version`], which takes the locked active version, and
/// [`activate_version`], which locks the draft it is given.
///
/// [`clone_version`]: ConfigApi::clone_version
/// [`activate_version`]: ConfigApi::activate_version
#[allow(async_fn_in_trait)]
pub trait ConfigApi {
  /// Rename a service. Version-independent; needs no draft.
  async fn update_service(&self, service: &str, name: &str) -> Result<(), ApiError>;

  /// Clone a locked version, returning the number of the fresh draft.
  async fn clone_version(&self, service: &str, version: u64) -> Result<u64, ApiError>;

  /// Update version-level settings (default host, default TTL) on a draft.
  async fn update_settings(&self, service: &str, version: u64, settings: &SettingsUpdate) -> Result<(), ApiError>;

  /// Create one sub-resource on a draft version.
  async fn create_resource(&self, service: &str, version: u64, resource: &CreateResource) -> Result<(), ApiError>;

  /// Delete one sub-resource, by name, from a draft version.
  async fn delete_resource(
    &self,
    service: &str,
    version: u64,
    kind: ResourceKind,
    name: &str,
  ) -> Result<(), ApiError>;

  /// Mark a named VCL as the entry point of a draft version.
  ///
  /// Distinct from [`activate_version`](ConfigApi::activate_version); this
  /// selects which VCL is in force within the draft.
  async fn activate_vcl(&self, service: &str, version: u64, name: &str) -> Result<(), ApiError>;

  /// Ask the backend whether a draft version is semantically valid.
  async fn validate_version(&self, service: &str, version: u64) -> Result<VersionValidation, ApiError>;

  /// Lock a draft version and make it the one serving traffic. One-way.
  async fn activate_version(&self, service: &str, version: u64) -> Result<(), ApiError>;
}
