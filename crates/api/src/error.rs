//! Backend transport/API errors.

use thiserror::Error;

/// A failed call against the configuration backend.
///
/// This covers transport failures and API-level rejections of a single
/// call. It is distinct from a version failing semantic validation, which
/// the backend reports as a successful [`validate_version`] call with
/// `valid = false` (see [`VersionValidation`]).
///
/// [`validate_version`]: crate::ConfigApi::validate_version
/// [`VersionValidation`]: crate::VersionValidation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
  /// The backend answered with a non-success status.
  #[error("backend returned {status}: {message}")]
  Status { status: u16, message: String },

  /// The call never completed (connection, timeout, protocol).
  #[error("transport error: {0}")]
  Transport(String),
}

impl ApiError {
  pub fn transport(message: impl Into<String>) -> Self {
    ApiError::Transport(message.into())
  }
}
