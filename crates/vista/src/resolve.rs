//! Nearest-ancestor manager lookup.
//!
//! A sub-application either registers its own manager or uses the one of
//! its closest configured ancestor. Siblings and descendants are never
//! consulted.

use tracing::trace;

use crate::realm::Realm;
use crate::registration::{views_state, ManagerHandle};

/// The manager registered directly on `realm`.
pub fn own_manager(realm: &Realm) -> Option<ManagerHandle> {
    views_state(realm).and_then(|state| state.manager().cloned())
}

/// Finds the manager of `start` or of its nearest ancestor that has one.
///
/// Returns `None` when no realm on the path to the root has a manager.
pub fn resolve_manager(start: &Realm) -> Option<ManagerHandle> {
    for (depth, realm) in start.ancestors().enumerate() {
        if let Some(manager) = own_manager(&realm) {
            trace!(
                start = start.display_name(),
                found = realm.display_name(),
                depth,
                "views manager resolved"
            );
            return Some(manager);
        }
    }
    trace!(start = start.display_name(), "no views manager on realm path");
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::realm::RealmSettings;
    use crate::registration::register_views;
    use std::sync::Arc;
    use vista_render::ManagerOptions;

    fn options() -> Option<ManagerOptions> {
        Some(ManagerOptions::new().with_template("t", "x"))
    }

    #[test]
    fn test_own_manager_wins() {
        let root = Realm::root(RealmSettings::new());
        let child = root.child(RealmSettings::new());
        register_views(&root, options()).unwrap();
        let mine = register_views(&child, options()).unwrap();

        assert!(Arc::ptr_eq(&resolve_manager(&child).unwrap(), &mine));
    }

    #[test]
    fn test_inherits_nearest_ancestor() {
        let root = Realm::root(RealmSettings::new());
        let mid = root.child(RealmSettings::new());
        let leaf = mid.child(RealmSettings::new());
        register_views(&root, options()).unwrap();
        let near = register_views(&mid, options()).unwrap();

        assert!(Arc::ptr_eq(&resolve_manager(&leaf).unwrap(), &near));
    }

    #[test]
    fn test_siblings_are_invisible() {
        let root = Realm::root(RealmSettings::new());
        let left = root.child(RealmSettings::new().name("left"));
        let right = root.child(RealmSettings::new().name("right"));
        register_views(&left, options()).unwrap();

        assert!(resolve_manager(&right).is_none());
        assert!(resolve_manager(&root).is_none());
    }

    #[test]
    fn test_no_manager_anywhere() {
        let root = Realm::root(RealmSettings::new());
        let leaf = root.child(RealmSettings::new()).child(RealmSettings::new());
        assert!(resolve_manager(&leaf).is_none());
        assert!(own_manager(&leaf).is_none());
    }
}
