//! edgesync-api: the configuration-backend boundary.
//!
//! This crate defines what the reconciliation engine needs from the
//! networked configuration backend and nothing else: the [`ConfigApi`]
//! trait, the per-kind creation inputs ([`CreateResource`]), and the
//! transport error type. The real HTTP client lives outside this
//! repository; tests implement the trait with an in-memory mock.
//!
//! The backend's two hard constraints shape this surface:
//! - versions become immutable once activated, so mutation always targets a
//!   draft version obtained via [`ConfigApi::clone_version`];
//! - sub-resources support only create and delete, never in-place update.

mod client;
mod error;
mod types;

pub use client::ConfigApi;
pub use error::ApiError;
pub use types::{
  CreateBackend, CreateCacheSetting, CreateCondition, CreateDomain, CreateGcsLogging, CreateGzip, CreateHeader,
  CreateHealthcheck, CreatePapertrail, CreateRequestSetting, CreateResource, CreateResponseObject, CreateS3Logging,
  CreateSumologic, CreateVcl, SettingsUpdate, VersionValidation,
};
