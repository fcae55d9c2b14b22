//! Reconciliation orchestration.
//!
//! The full flow for one run:
//!
//! 1. Validate local invariants of the desired configuration
//! 2. Rename the service if the name changed (needs no version)
//! 3. If any versioned attribute changed, obtain a working draft version
//! 4. Apply version-level settings
//! 5. Apply each collection diff, deletes before creates, in dependency order
//! 6. Validate the draft on the backend
//! 7. Activate it
//! 8. Report the new active version for the caller to persist
//!
//! Execution is strictly sequential: each call depends on backend-visible
//! state left by the previous one. Collection order is fixed because
//! conditions are referenced by name from nearly every later collection and
//! healthchecks are referenced by backends; referencing records must only
//! be created once their targets exist.

use std::time::Duration;

use tracing::{debug, info, warn};

use edgesync_api::{ConfigApi, CreateResource, SettingsUpdate};
use edgesync_model::{Named, ResourceKind, ServiceConfig, validate};

use crate::build::{
  BuildError, build_backend, build_cache_setting, build_condition, build_domain, build_gcs_logging, build_gzip,
  build_header, build_healthcheck, build_papertrail, build_request_setting, build_response_object, build_s3_logging,
  build_sumologic, build_vcl,
};
use crate::diff::diff;
use crate::error::ReconcileError;
use crate::store::StateStore;
use crate::version::working_version;

/// Default wait after cloning a version, to let the backend catch up.
const DEFAULT_CLONE_SETTLE_DELAY: Duration = Duration::from_secs(7);

/// Options for a reconciliation run.
#[derive(Debug, Clone)]
pub struct ReconcileOptions {
  /// How long to wait after cloning before mutating the fresh draft.
  pub clone_settle_delay: Duration,
}

impl Default for ReconcileOptions {
  fn default() -> Self {
    ReconcileOptions {
      clone_settle_delay: DEFAULT_CLONE_SETTLE_DELAY,
    }
  }
}

/// What a reconciliation run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileOutcome {
  /// The version now serving traffic. Unchanged when no versioned
  /// attribute differed.
  pub active_version: u64,
  /// Whether the service was renamed.
  pub renamed: bool,
  /// Whether a new version was assembled and activated.
  pub changed: bool,
}

/// Converge the backend from `old` (the previously applied configuration)
/// to `desired`.
///
/// On success the returned outcome carries the version number the caller
/// must persist as the service's active version. On any failure the run
/// aborts immediately; a partially mutated draft may be left on the
/// backend, but nothing is committed locally.
///
/// # Arguments
///
/// * `api` - The configuration backend
/// * `old` - The last configuration this engine successfully applied,
///   including the currently active version number
/// * `desired` - The target configuration
/// * `options` - Run options
pub async fn reconcile<A: ConfigApi>(
  api: &A,
  old: &ServiceConfig,
  desired: &ServiceConfig,
  options: &ReconcileOptions,
) -> Result<ReconcileOutcome, ReconcileError> {
  // Fail on invariant violations before touching the network.
  validate(desired)?;

  let service = desired.id.as_str();

  let renamed = old.name != desired.name;
  if renamed {
    info!(service, from = %old.name, to = %desired.name, "renaming service");
    api
      .update_service(service, &desired.name)
      .await
      .map_err(|source| ReconcileError::Api {
        op: "update_service",
        source,
      })?;
  }

  if !versioned_change(old, desired) {
    info!(service, "no versioned changes, nothing to apply");
    return Ok(ReconcileOutcome {
      active_version: old.active_version,
      renamed,
      changed: false,
    });
  }

  let version = working_version(api, service, old.active_version, options.clone_settle_delay).await?;
  info!(service, version, "applying changes to working version");

  if old.default_host != desired.default_host || old.default_ttl != desired.default_ttl {
    let settings = SettingsUpdate {
      default_host: desired.default_host.clone(),
      default_ttl: desired.default_ttl,
    };
    debug!(service, version, ?settings, "updating version settings");
    api
      .update_settings(service, version, &settings)
      .await
      .map_err(|source| ReconcileError::Api {
        op: "update_settings",
        source,
      })?;
  }

  // Conditions first: nearly every later kind references them by name.
  apply_stage(
    api,
    service,
    version,
    ResourceKind::Condition,
    &old.conditions,
    &desired.conditions,
    build_condition,
  )
  .await?;

  apply_stage(api, service, version, ResourceKind::Domain, &old.domains, &desired.domains, build_domain).await?;

  // Healthchecks before backends, which reference them.
  apply_stage(
    api,
    service,
    version,
    ResourceKind::Healthcheck,
    &old.healthchecks,
    &desired.healthchecks,
    build_healthcheck,
  )
  .await?;

  apply_stage(api, service, version, ResourceKind::Backend, &old.backends, &desired.backends, build_backend).await?;

  apply_stage(api, service, version, ResourceKind::Header, &old.headers, &desired.headers, build_header).await?;

  apply_stage(api, service, version, ResourceKind::Gzip, &old.gzips, &desired.gzips, build_gzip).await?;

  apply_stage(
    api,
    service,
    version,
    ResourceKind::S3Logging,
    &old.s3_loggings,
    &desired.s3_loggings,
    build_s3_logging,
  )
  .await?;

  apply_stage(
    api,
    service,
    version,
    ResourceKind::Papertrail,
    &old.papertrails,
    &desired.papertrails,
    build_papertrail,
  )
  .await?;

  apply_stage(
    api,
    service,
    version,
    ResourceKind::Sumologic,
    &old.sumologics,
    &desired.sumologics,
    build_sumologic,
  )
  .await?;

  apply_stage(
    api,
    service,
    version,
    ResourceKind::GcsLogging,
    &old.gcs_loggings,
    &desired.gcs_loggings,
    build_gcs_logging,
  )
  .await?;

  apply_stage(
    api,
    service,
    version,
    ResourceKind::ResponseObject,
    &old.response_objects,
    &desired.response_objects,
    build_response_object,
  )
  .await?;

  apply_stage(
    api,
    service,
    version,
    ResourceKind::RequestSetting,
    &old.request_settings,
    &desired.request_settings,
    build_request_setting,
  )
  .await?;

  apply_vcl_stage(api, service, version, old, desired).await?;

  apply_stage(
    api,
    service,
    version,
    ResourceKind::CacheSetting,
    &old.cache_settings,
    &desired.cache_settings,
    build_cache_setting,
  )
  .await?;

  debug!(service, version, "validating working version");
  let validation = api
    .validate_version(service, version)
    .await
    .map_err(|source| ReconcileError::Api {
      op: "validate_version",
      source,
    })?;

  if !validation.valid {
    warn!(service, version, message = %validation.message, "backend rejected version");
    return Err(ReconcileError::InvalidVersion {
      version,
      message: validation.message,
    });
  }

  api
    .activate_version(service, version)
    .await
    .map_err(|source| ReconcileError::Api {
      op: "activate_version",
      source,
    })?;

  info!(service, version, "activated version");

  Ok(ReconcileOutcome {
    active_version: version,
    renamed,
    changed: true,
  })
}

/// Reconcile against persisted state.
///
/// The host-facing entry point: loads the previously applied configuration
/// for `desired.id` from the store (an empty, never-activated configuration
/// if none exists), runs [`reconcile`], and persists the desired
/// configuration with the new active version. Persistence happens only
/// after a fully successful run, so the stored state never gets ahead of
/// what the backend is actually serving.
pub async fn reconcile_service<A: ConfigApi, S: StateStore>(
  api: &A,
  store: &S,
  desired: &ServiceConfig,
  options: &ReconcileOptions,
) -> Result<ReconcileOutcome, ReconcileError> {
  let old = match store.load(&desired.id)? {
    Some(prior) => prior,
    None => ServiceConfig::empty(desired.id.clone(), desired.name.clone()),
  };

  let outcome = reconcile(api, &old, desired, options).await?;

  let mut persisted = desired.clone();
  persisted.active_version = outcome.active_version;
  store.save(&persisted)?;

  Ok(outcome)
}

/// Whether any attribute that lives inside a version differs.
///
/// A rename alone does not require a new version; everything else does,
/// including the version-level default host and TTL.
fn versioned_change(old: &ServiceConfig, new: &ServiceConfig) -> bool {
  old.default_host != new.default_host
    || old.default_ttl != new.default_ttl
    || !diff(&old.conditions, &new.conditions).is_empty()
    || !diff(&old.domains, &new.domains).is_empty()
    || !diff(&old.healthchecks, &new.healthchecks).is_empty()
    || !diff(&old.backends, &new.backends).is_empty()
    || !diff(&old.headers, &new.headers).is_empty()
    || !diff(&old.gzips, &new.gzips).is_empty()
    || !diff(&old.s3_loggings, &new.s3_loggings).is_empty()
    || !diff(&old.papertrails, &new.papertrails).is_empty()
    || !diff(&old.sumologics, &new.sumologics).is_empty()
    || !diff(&old.gcs_loggings, &new.gcs_loggings).is_empty()
    || !diff(&old.response_objects, &new.response_objects).is_empty()
    || !diff(&old.request_settings, &new.request_settings).is_empty()
    || !diff(&old.vcls, &new.vcls).is_empty()
    || !diff(&old.cache_settings, &new.cache_settings).is_empty()
}

/// Apply one collection's diff: all deletes, then all creates.
///
/// Delete-before-create frees a record's old name before a renamed
/// equivalent is created and avoids transient duplicate-name errors from
/// the backend. Removal order needs no dependency analysis: a record is
/// only ever removed because nothing desires it anymore.
async fn apply_stage<A, T, B>(
  api: &A,
  service: &str,
  version: u64,
  kind: ResourceKind,
  old: &[T],
  new: &[T],
  build: B,
) -> Result<(), ReconcileError>
where
  A: ConfigApi,
  T: Named + PartialEq,
  B: Fn(&T) -> Result<CreateResource, BuildError>,
{
  let d = diff(old, new);
  if d.is_empty() {
    return Ok(());
  }

  info!(
    %kind,
    removes = d.to_remove.len(),
    adds = d.to_add.len(),
    "applying collection diff"
  );

  for &record in &d.to_remove {
    debug!(%kind, name = record.name(), "deleting");
    api
      .delete_resource(service, version, kind, record.name())
      .await
      .map_err(|source| ReconcileError::Resource {
        kind,
        name: record.name().to_string(),
        op: "delete",
        source,
      })?;
  }

  for &record in &d.to_add {
    let request = build(record).map_err(|source| ReconcileError::Build {
      kind,
      name: record.name().to_string(),
      source,
    })?;

    debug!(%kind, name = record.name(), "creating");
    api
      .create_resource(service, version, &request)
      .await
      .map_err(|source| ReconcileError::Resource {
        kind,
        name: record.name().to_string(),
        op: "create",
        source,
      })?;
  }

  Ok(())
}

/// The VCL stage.
///
/// Same delete-then-create shape as every other collection, with one extra
/// step: a created VCL marked `main` is activated as the draft's entry
/// point immediately after its create call.
async fn apply_vcl_stage<A: ConfigApi>(
  api: &A,
  service: &str,
  version: u64,
  old: &ServiceConfig,
  desired: &ServiceConfig,
) -> Result<(), ReconcileError> {
  let kind = ResourceKind::Vcl;
  let d = diff(&old.vcls, &desired.vcls);
  if d.is_empty() {
    return Ok(());
  }

  info!(%kind, removes = d.to_remove.len(), adds = d.to_add.len(), "applying collection diff");

  for &vcl in &d.to_remove {
    debug!(%kind, name = %vcl.name, "deleting");
    api
      .delete_resource(service, version, kind, &vcl.name)
      .await
      .map_err(|source| ReconcileError::Resource {
        kind,
        name: vcl.name.clone(),
        op: "delete",
        source,
      })?;
  }

  for &vcl in &d.to_add {
    let request = build_vcl(vcl).map_err(|source| ReconcileError::Build {
      kind,
      name: vcl.name.clone(),
      source,
    })?;

    debug!(%kind, name = %vcl.name, main = vcl.main, "creating");
    api
      .create_resource(service, version, &request)
      .await
      .map_err(|source| ReconcileError::Resource {
        kind,
        name: vcl.name.clone(),
        op: "create",
        source,
      })?;

    if vcl.main {
      debug!(name = %vcl.name, "activating main VCL");
      api
        .activate_vcl(service, version, &vcl.name)
        .await
        .map_err(|source| ReconcileError::Resource {
          kind,
          name: vcl.name.clone(),
          op: "activate",
          source,
        })?;
    }
  }

  Ok(())
}
