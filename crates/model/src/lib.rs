//! edgesync-model: declarative data model for edge-service configuration.
//!
//! This crate defines the desired-state representation of a versioned edge
//! service: the service-level record ([`ServiceConfig`]) and one collection
//! per sub-resource kind (domains, backends, healthchecks, header rules,
//! logging endpoints, caching rules, custom VCL, ...).
//!
//! Records are plain serde structs with full value equality. Two records in
//! the same collection must not share a `name`; any field-level change is
//! modeled downstream as a remove of the old record and a create of the new
//! one, because the backend offers no partial updates for these kinds.

mod resource;
mod service;
mod validate;

pub use resource::{
  Backend, CacheAction, CacheSetting, Condition, ConditionType, Domain, GcsLogging, Gzip, Header, HeaderAction,
  HeaderType, Healthcheck, MessageType, Named, Papertrail, RequestAction, RequestSetting, ResourceKind,
  ResponseObject, S3Logging, Sumologic, Vcl, Xff,
};
pub use service::ServiceConfig;
pub use validate::{ValidateError, validate};
