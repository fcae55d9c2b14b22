//! Working-version acquisition.

use std::time::Duration;

use tracing::{debug, info};

use edgesync_api::ConfigApi;

use crate::error::ReconcileError;

/// Obtain a mutable draft version to apply changes to.
///
/// A service that has never been activated (`active_version == 0`) carries
/// an implicit, still-unlocked version 1; that is returned without any
/// network call. Otherwise the active version is cloned and the fresh
/// draft's number returned.
///
/// # Settle delay
///
/// Freshly cloned versions are not immediately visible or mutable on the
/// backend, which offers no readiness signal to poll. The only known
/// workaround is a fixed wait after cloning; seven seconds is typically
/// enough. Callers configure the delay through
/// [`ReconcileOptions`](crate::ReconcileOptions); tests pass zero.
pub async fn working_version<A: ConfigApi>(
  api: &A,
  service: &str,
  active_version: u64,
  settle_delay: Duration,
) -> Result<u64, ReconcileError> {
  if active_version == 0 {
    debug!(service, "service never activated, using implicit version 1");
    return Ok(1);
  }

  let draft = api
    .clone_version(service, active_version)
    .await
    .map_err(|source| ReconcileError::Api {
      op: "clone_version",
      source,
    })?;

  info!(service, from = active_version, draft, "cloned active version");

  if !settle_delay.is_zero() {
    debug!(delay_secs = settle_delay.as_secs(), "waiting for cloned version to become available");
    tokio::time::sleep(settle_delay).await;
  }

  Ok(draft)
}
