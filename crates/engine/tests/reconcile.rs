//! Integration tests for the reconciliation orchestrator, driven against an
//! in-memory recording mock of the configuration backend.

use std::sync::Mutex;
use std::time::Duration;

use edgesync_api::{ApiError, ConfigApi, CreateResource, SettingsUpdate, VersionValidation};
use edgesync_engine::{
  JsonStateStore, ReconcileError, ReconcileOptions, StateStore, reconcile, reconcile_service,
};
use edgesync_model::{Backend, Condition, ConditionType, Domain, Healthcheck, ResourceKind, ServiceConfig, Vcl};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Call {
  UpdateService { name: String },
  CloneVersion { from: u64 },
  UpdateSettings { version: u64, default_ttl: u32 },
  Create { version: u64, kind: ResourceKind, name: String },
  Delete { version: u64, kind: ResourceKind, name: String },
  ActivateVcl { version: u64, name: String },
  ValidateVersion { version: u64 },
  ActivateVersion { version: u64 },
}

/// Records every call; answers clone with `from + 1` and validation with a
/// configurable verdict (valid by default).
#[derive(Debug, Default)]
struct MockApi {
  calls: Mutex<Vec<Call>>,
  validation: Mutex<Option<VersionValidation>>,
}

impl MockApi {
  fn invalid(message: &str) -> Self {
    let api = MockApi::default();
    *api.validation.lock().unwrap() = Some(VersionValidation {
      valid: false,
      message: message.to_string(),
    });
    api
  }

  fn record(&self, call: Call) {
    self.calls.lock().unwrap().push(call);
  }

  fn calls(&self) -> Vec<Call> {
    self.calls.lock().unwrap().clone()
  }

  fn position(&self, pred: impl Fn(&Call) -> bool) -> Option<usize> {
    self.calls().iter().position(pred)
  }
}

impl ConfigApi for MockApi {
  async fn update_service(&self, _service: &str, name: &str) -> Result<(), ApiError> {
    self.record(Call::UpdateService { name: name.to_string() });
    Ok(())
  }

  async fn clone_version(&self, _service: &str, version: u64) -> Result<u64, ApiError> {
    self.record(Call::CloneVersion { from: version });
    Ok(version + 1)
  }

  async fn update_settings(&self, _service: &str, version: u64, settings: &SettingsUpdate) -> Result<(), ApiError> {
    self.record(Call::UpdateSettings {
      version,
      default_ttl: settings.default_ttl,
    });
    Ok(())
  }

  async fn create_resource(&self, _service: &str, version: u64, resource: &CreateResource) -> Result<(), ApiError> {
    self.record(Call::Create {
      version,
      kind: resource.kind(),
      name: resource.name().to_string(),
    });
    Ok(())
  }

  async fn delete_resource(&self, _service: &str, version: u64, kind: ResourceKind, name: &str) -> Result<(), ApiError> {
    self.record(Call::Delete {
      version,
      kind,
      name: name.to_string(),
    });
    Ok(())
  }

  async fn activate_vcl(&self, _service: &str, version: u64, name: &str) -> Result<(), ApiError> {
    self.record(Call::ActivateVcl {
      version,
      name: name.to_string(),
    });
    Ok(())
  }

  async fn validate_version(&self, _service: &str, version: u64) -> Result<VersionValidation, ApiError> {
    self.record(Call::ValidateVersion { version });
    Ok(self.validation.lock().unwrap().clone().unwrap_or(VersionValidation {
      valid: true,
      message: String::new(),
    }))
  }

  async fn activate_version(&self, _service: &str, version: u64) -> Result<(), ApiError> {
    self.record(Call::ActivateVersion { version });
    Ok(())
  }
}

fn options() -> ReconcileOptions {
  ReconcileOptions {
    clone_settle_delay: Duration::ZERO,
  }
}

fn service(active_version: u64) -> ServiceConfig {
  let mut config = ServiceConfig::empty("svc1", "my-service");
  config.active_version = active_version;
  config
}

fn healthcheck(name: &str) -> Healthcheck {
  Healthcheck {
    name: name.to_string(),
    host: "example.com".to_string(),
    path: "/health".to_string(),
    ..Healthcheck::default()
  }
}

fn backend(name: &str) -> Backend {
  Backend {
    name: name.to_string(),
    address: "1.2.3.4".to_string(),
    ..Backend::default()
  }
}

fn vcl(name: &str, main: bool) -> Vcl {
  Vcl {
    name: name.to_string(),
    content: format!("# {name}"),
    main,
  }
}

#[tokio::test]
async fn unchanged_config_issues_zero_calls() {
  let api = MockApi::default();
  let mut config = service(3);
  config.domains = vec![Domain {
    name: "example.com".to_string(),
    comment: String::new(),
  }];

  let outcome = reconcile(&api, &config, &config, &options()).await.unwrap();

  assert!(!outcome.changed);
  assert_eq!(outcome.active_version, 3);
  assert!(api.calls().is_empty());
}

#[tokio::test]
async fn rename_only_issues_single_update_service() {
  let api = MockApi::default();
  let old = service(3);
  let mut desired = old.clone();
  desired.name = "renamed".to_string();

  let outcome = reconcile(&api, &old, &desired, &options()).await.unwrap();

  assert!(outcome.renamed);
  assert!(!outcome.changed);
  assert_eq!(outcome.active_version, 3);
  assert_eq!(
    api.calls(),
    vec![Call::UpdateService {
      name: "renamed".to_string()
    }]
  );
}

#[tokio::test]
async fn multiple_main_vcls_fail_before_any_call() {
  let api = MockApi::default();
  let old = service(3);
  let mut desired = old.clone();
  desired.vcls = vec![vcl("a", true), vcl("b", true)];

  let err = reconcile(&api, &old, &desired, &options()).await.unwrap_err();

  assert!(matches!(err, ReconcileError::Validate(_)));
  assert!(api.calls().is_empty());
}

#[tokio::test]
async fn condition_created_before_referencing_backend() {
  let api = MockApi::default();
  let old = service(3);
  let mut desired = old.clone();
  desired.conditions = vec![Condition {
    name: "x".to_string(),
    statement: "req.url ~ \"^/api\"".to_string(),
    priority: 10,
    condition_type: ConditionType::Request,
  }];
  let mut selected = backend("b1");
  selected.request_condition = "x".to_string();
  desired.backends = vec![selected];

  reconcile(&api, &old, &desired, &options()).await.unwrap();

  let condition_create = api
    .position(|c| matches!(c, Call::Create { kind: ResourceKind::Condition, .. }))
    .expect("condition created");
  let backend_create = api
    .position(|c| matches!(c, Call::Create { kind: ResourceKind::Backend, .. }))
    .expect("backend created");
  assert!(condition_create < backend_create);
}

#[tokio::test]
async fn healthcheck_and_backend_end_to_end() {
  let api = MockApi::default();
  let old = service(3);
  let mut desired = old.clone();
  desired.healthchecks = vec![healthcheck("hc1")];
  let mut b1 = backend("b1");
  b1.healthcheck = "hc1".to_string();
  desired.backends = vec![b1];

  let outcome = reconcile(&api, &old, &desired, &options()).await.unwrap();

  assert_eq!(outcome.active_version, 4);
  assert_eq!(
    api.calls(),
    vec![
      Call::CloneVersion { from: 3 },
      Call::Create {
        version: 4,
        kind: ResourceKind::Healthcheck,
        name: "hc1".to_string()
      },
      Call::Create {
        version: 4,
        kind: ResourceKind::Backend,
        name: "b1".to_string()
      },
      Call::ValidateVersion { version: 4 },
      Call::ActivateVersion { version: 4 },
    ]
  );
}

#[tokio::test]
async fn adding_non_main_vcl_touches_only_that_vcl() {
  let api = MockApi::default();
  let mut old = service(3);
  old.vcls = vec![vcl("a", true)];
  let mut desired = old.clone();
  desired.vcls.push(vcl("b", false));

  reconcile(&api, &old, &desired, &options()).await.unwrap();

  let creates: Vec<_> = api
    .calls()
    .into_iter()
    .filter(|c| matches!(c, Call::Create { .. }))
    .collect();
  assert_eq!(
    creates,
    vec![Call::Create {
      version: 4,
      kind: ResourceKind::Vcl,
      name: "b".to_string()
    }]
  );
  assert!(!api.calls().iter().any(|c| matches!(c, Call::Delete { .. })));
  assert!(!api.calls().iter().any(|c| matches!(c, Call::ActivateVcl { .. })));
}

#[tokio::test]
async fn created_main_vcl_is_activated_within_the_draft() {
  let api = MockApi::default();
  let old = service(3);
  let mut desired = old.clone();
  desired.vcls = vec![vcl("entry", true)];

  reconcile(&api, &old, &desired, &options()).await.unwrap();

  let create = api
    .position(|c| matches!(c, Call::Create { kind: ResourceKind::Vcl, .. }))
    .expect("vcl created");
  let activate = api
    .position(|c| matches!(c, Call::ActivateVcl { .. }))
    .expect("vcl activated");
  assert_eq!(activate, create + 1);
  assert_eq!(
    api.calls()[activate],
    Call::ActivateVcl {
      version: 4,
      name: "entry".to_string()
    }
  );
}

#[tokio::test]
async fn field_change_is_delete_then_create_never_update() {
  let api = MockApi::default();
  let mut old = service(3);
  old.backends = vec![backend("b1")]; // port 80 by default
  let mut desired = old.clone();
  desired.backends[0].port = 443;

  reconcile(&api, &old, &desired, &options()).await.unwrap();

  let backend_calls: Vec<_> = api
    .calls()
    .into_iter()
    .filter(|c| {
      matches!(
        c,
        Call::Create { kind: ResourceKind::Backend, .. } | Call::Delete { kind: ResourceKind::Backend, .. }
      )
    })
    .collect();
  assert_eq!(
    backend_calls,
    vec![
      Call::Delete {
        version: 4,
        kind: ResourceKind::Backend,
        name: "b1".to_string()
      },
      Call::Create {
        version: 4,
        kind: ResourceKind::Backend,
        name: "b1".to_string()
      },
    ]
  );
}

#[tokio::test]
async fn invalid_version_aborts_without_activation() {
  let api = MockApi::invalid("backend b1 has no address");
  let old = service(3);
  let mut desired = old.clone();
  desired.backends = vec![backend("b1")];

  let err = reconcile(&api, &old, &desired, &options()).await.unwrap_err();

  match err {
    ReconcileError::InvalidVersion { version, message } => {
      assert_eq!(version, 4);
      assert_eq!(message, "backend b1 has no address");
    }
    other => panic!("unexpected error: {other:?}"),
  }
  assert!(!api.calls().iter().any(|c| matches!(c, Call::ActivateVersion { .. })));
}

#[tokio::test]
async fn fresh_service_uses_implicit_version_one_without_cloning() {
  let api = MockApi::default();
  let old = service(0);
  let mut desired = old.clone();
  desired.domains = vec![Domain {
    name: "example.com".to_string(),
    comment: String::new(),
  }];

  let outcome = reconcile(&api, &old, &desired, &options()).await.unwrap();

  assert_eq!(outcome.active_version, 1);
  assert!(!api.calls().iter().any(|c| matches!(c, Call::CloneVersion { .. })));
  assert!(api.calls().contains(&Call::Create {
    version: 1,
    kind: ResourceKind::Domain,
    name: "example.com".to_string()
  }));
  assert!(api.calls().contains(&Call::ActivateVersion { version: 1 }));
}

#[tokio::test]
async fn settings_change_alone_clones_and_updates_settings() {
  let api = MockApi::default();
  let old = service(3);
  let mut desired = old.clone();
  desired.default_ttl = 60;

  let outcome = reconcile(&api, &old, &desired, &options()).await.unwrap();

  assert_eq!(outcome.active_version, 4);
  assert_eq!(
    api.calls(),
    vec![
      Call::CloneVersion { from: 3 },
      Call::UpdateSettings {
        version: 4,
        default_ttl: 60
      },
      Call::ValidateVersion { version: 4 },
      Call::ActivateVersion { version: 4 },
    ]
  );
}

#[tokio::test]
async fn reconcile_service_persists_only_on_success() {
  let dir = tempfile::TempDir::new().unwrap();
  let store = JsonStateStore::new(dir.path().to_path_buf());

  // First run: fresh service converges to version 1 and is persisted.
  let api = MockApi::default();
  let mut desired = ServiceConfig::empty("svc1", "my-service");
  desired.domains = vec![Domain {
    name: "example.com".to_string(),
    comment: String::new(),
  }];

  let outcome = reconcile_service(&api, &store, &desired, &options()).await.unwrap();
  assert_eq!(outcome.active_version, 1);
  assert_eq!(store.load("svc1").unwrap().unwrap().active_version, 1);

  // Second run fails backend validation: nothing is persisted.
  let api = MockApi::invalid("nope");
  let mut worse = desired.clone();
  worse.backends = vec![backend("b1")];

  let err = reconcile_service(&api, &store, &worse, &options()).await.unwrap_err();
  assert!(matches!(err, ReconcileError::InvalidVersion { .. }));

  let persisted = store.load("svc1").unwrap().unwrap();
  assert_eq!(persisted.active_version, 1);
  assert!(persisted.backends.is_empty());
}

#[tokio::test]
async fn second_run_diffs_against_persisted_state() {
  let dir = tempfile::TempDir::new().unwrap();
  let store = JsonStateStore::new(dir.path().to_path_buf());

  let api = MockApi::default();
  let mut desired = ServiceConfig::empty("svc1", "my-service");
  desired.healthchecks = vec![healthcheck("hc1")];
  reconcile_service(&api, &store, &desired, &options()).await.unwrap();

  // Add one backend; the unchanged healthcheck must not be touched again.
  let api = MockApi::default();
  desired.backends = vec![backend("b1")];
  let outcome = reconcile_service(&api, &store, &desired, &options()).await.unwrap();

  assert_eq!(outcome.active_version, 2);
  assert_eq!(
    api.calls(),
    vec![
      Call::CloneVersion { from: 1 },
      Call::Create {
        version: 2,
        kind: ResourceKind::Backend,
        name: "b1".to_string()
      },
      Call::ValidateVersion { version: 2 },
      Call::ActivateVersion { version: 2 },
    ]
  );
}
