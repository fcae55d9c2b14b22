//! Value-level set difference over named records.
//!
//! The backend cannot update a sub-resource in place, so there is no
//! "changed" category: a record whose name is unchanged but whose fields
//! differ shows up in `to_remove` with its old values and in `to_add` with
//! its new ones, and the apply stage deletes then recreates it.

/// Difference between the previously applied and newly desired records of
/// one collection.
///
/// Borrows from both inputs; computing a diff never mutates or clones the
/// collections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceDiff<'a, T> {
  /// Records present in the old set but not (value-identical) in the new.
  pub to_remove: Vec<&'a T>,
  /// Records present in the new set but not (value-identical) in the old.
  pub to_add: Vec<&'a T>,
}

impl<T> ResourceDiff<'_, T> {
  /// Returns true if the collection needs no backend calls.
  pub fn is_empty(&self) -> bool {
    self.to_remove.is_empty() && self.to_add.is_empty()
  }
}

/// Compute `old ∖ new` and `new ∖ old` under full value equality.
///
/// Input order is preserved within each side, which keeps delete and
/// create sequences deterministic for a given configuration.
pub fn diff<'a, T: PartialEq>(old: &'a [T], new: &'a [T]) -> ResourceDiff<'a, T> {
  ResourceDiff {
    to_remove: old.iter().filter(|o| !new.contains(o)).collect(),
    to_add: new.iter().filter(|n| !old.contains(n)).collect(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use edgesync_model::Backend;

  fn backend(name: &str, port: u16) -> Backend {
    Backend {
      name: name.to_string(),
      address: "203.0.113.5".to_string(),
      port,
      ..Backend::default()
    }
  }

  #[test]
  fn diff_of_identical_sets_is_empty() {
    let set = vec![backend("a", 80), backend("b", 443)];
    let d = diff(&set, &set);
    assert!(d.is_empty());
  }

  #[test]
  fn diff_of_empty_sets_is_empty() {
    let d = diff::<Backend>(&[], &[]);
    assert!(d.is_empty());
  }

  #[test]
  fn added_record_appears_only_in_to_add() {
    let old = vec![backend("a", 80)];
    let new = vec![backend("a", 80), backend("b", 443)];

    let d = diff(&old, &new);
    assert!(d.to_remove.is_empty());
    assert_eq!(d.to_add, vec![&new[1]]);
  }

  #[test]
  fn removed_record_appears_only_in_to_remove() {
    let old = vec![backend("a", 80), backend("b", 443)];
    let new = vec![backend("a", 80)];

    let d = diff(&old, &new);
    assert_eq!(d.to_remove, vec![&old[1]]);
    assert!(d.to_add.is_empty());
  }

  #[test]
  fn field_change_shows_as_remove_plus_add() {
    let old = vec![backend("a", 80)];
    let new = vec![backend("a", 443)];

    let d = diff(&old, &new);
    assert_eq!(d.to_remove, vec![&old[0]]);
    assert_eq!(d.to_add, vec![&new[0]]);
  }

  #[test]
  fn remove_and_add_are_disjoint() {
    let old = vec![backend("a", 80), backend("b", 443), backend("c", 8080)];
    let new = vec![backend("b", 443), backend("c", 8443), backend("d", 80)];

    let d = diff(&old, &new);
    for removed in &d.to_remove {
      assert!(!d.to_add.contains(removed));
    }
    assert_eq!(d.to_remove.len(), 2); // a gone, c changed
    assert_eq!(d.to_add.len(), 2); // c changed, d new
  }
}
