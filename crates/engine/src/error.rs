//! Errors during reconciliation.

use thiserror::Error;

use edgesync_api::ApiError;
use edgesync_model::{ResourceKind, ValidateError};

use crate::build::BuildError;
use crate::store::StoreError;

/// Why a reconciliation run aborted.
///
/// Nothing is retried: every failure aborts the remaining sequence. A
/// failure after some collections were already mutated leaves the draft
/// version partially applied on the backend; that draft is orphaned litter,
/// not state corruption, because `active_version` is only committed after a
/// confirmed activation and the next run re-diffs against a fresh clone.
#[derive(Debug, Error)]
pub enum ReconcileError {
  /// The desired configuration violates a local invariant. Detected before
  /// any network call.
  #[error("invalid configuration: {0}")]
  Validate(#[from] ValidateError),

  /// A record's field combination is inconsistent for its kind. Also
  /// detected before the record's create call is issued.
  #[error("cannot build {kind} '{name}': {source}")]
  Build {
    kind: ResourceKind,
    name: String,
    #[source]
    source: BuildError,
  },

  /// A create or delete call against one collection failed.
  #[error("{op} {kind} '{name}' failed: {source}")]
  Resource {
    kind: ResourceKind,
    name: String,
    op: &'static str,
    #[source]
    source: ApiError,
  },

  /// A version-level or service-level backend call failed.
  #[error("{op} failed: {source}")]
  Api {
    op: &'static str,
    #[source]
    source: ApiError,
  },

  /// The backend judged the assembled draft version semantically invalid.
  ///
  /// The message is the backend's, verbatim. The draft is never activated
  /// and the persisted active version stays where it was.
  #[error("invalid service configuration, version {version}: {message}")]
  InvalidVersion { version: u64, message: String },

  /// Reading or writing persisted state failed.
  #[error("state store error: {0}")]
  Store(#[from] StoreError),
}
