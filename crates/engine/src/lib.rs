//! edgesync-engine: the diff-and-converge core.
//!
//! Given the previously applied configuration and a newly desired one, the
//! engine converges the remote backend to the desired state:
//!
//! 1. obtain a mutable working version (the implicit version 1 for a fresh
//!    service, otherwise a clone of the active version),
//! 2. compute a value-level diff for each sub-resource collection,
//! 3. apply the diffs as delete-then-create sequences in a fixed
//!    cross-collection order that honors name dependencies,
//! 4. validate and activate the working version, committing the new
//!    version number only on confirmed success.
//!
//! The backend offers no transactions; a mid-sequence failure leaves an
//! orphaned draft behind, but the persisted `active_version` only moves on
//! confirmed activation, so recorded state never diverges from what is
//! actually serving traffic.
//!
//! Two reconciliations must never run concurrently against the same
//! service; callers are responsible for per-service serialization.

mod build;
mod diff;
mod error;
mod reconcile;
mod store;
mod version;

pub use build::{
  BuildError, build_backend, build_cache_setting, build_condition, build_domain, build_gcs_logging, build_gzip,
  build_header, build_healthcheck, build_papertrail, build_request_setting, build_response_object, build_s3_logging,
  build_sumologic, build_vcl,
};
pub use diff::{ResourceDiff, diff};
pub use error::ReconcileError;
pub use reconcile::{ReconcileOptions, ReconcileOutcome, reconcile, reconcile_service};
pub use store::{JsonStateStore, StateStore, StoreError};
pub use version::working_version;
