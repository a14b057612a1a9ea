//! One-shot views manager registration.
//!
//! Every realm may own at most one manager. It lives in the realm's
//! [`PLUGIN_NAMESPACE`] plugin state inside a set-once cell, so the check
//! and the assignment are a single step.

use std::fmt;
use std::sync::{Arc, OnceLock};

use tracing::debug;
use vista_render::{ManagerOptions, TemplateManager, ViewsManager};

use crate::error::ViewsError;
use crate::realm::Realm;

/// Plugin namespace this crate stores its realm state under.
pub const PLUGIN_NAMESPACE: &str = "vista";

/// Shared handle to a registered manager.
pub type ManagerHandle = Arc<dyn ViewsManager>;

/// State kept in a realm's [`PLUGIN_NAMESPACE`].
#[derive(Default)]
pub struct ViewsState {
    manager: OnceLock<ManagerHandle>,
}

impl ViewsState {
    /// The manager registered on this realm, if any.
    pub fn manager(&self) -> Option<&ManagerHandle> {
        self.manager.get()
    }
}

impl fmt::Debug for ViewsState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewsState")
            .field("configured", &self.manager.get().is_some())
            .finish()
    }
}

/// The realm's own views state, without looking at ancestors.
pub fn views_state(realm: &Realm) -> Option<Arc<ViewsState>> {
    realm.plugins().get::<ViewsState>(PLUGIN_NAMESPACE)
}

fn ensure_state(realm: &Realm) -> Result<Arc<ViewsState>, ViewsError> {
    realm
        .plugins()
        .get_or_insert_with(PLUGIN_NAMESPACE, ViewsState::default)
        .ok_or_else(|| ViewsError::NamespaceConflict {
            namespace: PLUGIN_NAMESPACE.to_string(),
        })
}

/// Builds a [`TemplateManager`] from `options` and registers it on `realm`.
///
/// When `options` has no base path and the realm's settings do, the realm's
/// base path is filled in.
///
/// # Errors
///
/// - [`ViewsError::MissingOptions`] when `options` is `None`
/// - [`ViewsError::AlreadyConfigured`] when the realm already has a manager
/// - [`ViewsError::InvalidOptions`] when the manager rejects the options
pub fn register_views(
    realm: &Realm,
    options: Option<ManagerOptions>,
) -> Result<ManagerHandle, ViewsError> {
    let mut options = options.ok_or(ViewsError::MissingOptions)?;
    if options.relative_to.is_none() {
        if let Some(base) = realm.settings().base_path() {
            options.relative_to = Some(base.to_path_buf());
        }
    }

    if own_state_configured(realm) {
        return Err(ViewsError::AlreadyConfigured);
    }

    // The realm state is created only once the manager builds.
    let manager: ManagerHandle =
        Arc::new(TemplateManager::new(options).map_err(ViewsError::InvalidOptions)?);
    let state = ensure_state(realm)?;
    install(realm, &state, manager)
}

fn own_state_configured(realm: &Realm) -> bool {
    views_state(realm).is_some_and(|state| state.manager().is_some())
}

/// Registers a caller-built manager on `realm`.
///
/// Same one-shot rule as [`register_views`].
pub fn register_manager(
    realm: &Realm,
    manager: ManagerHandle,
) -> Result<ManagerHandle, ViewsError> {
    let state = ensure_state(realm)?;
    install(realm, &state, manager)
}

fn install(
    realm: &Realm,
    state: &ViewsState,
    manager: ManagerHandle,
) -> Result<ManagerHandle, ViewsError> {
    state
        .manager
        .set(Arc::clone(&manager))
        .map_err(|_| ViewsError::AlreadyConfigured)?;
    debug!(realm = realm.display_name(), "views manager registered");
    Ok(manager)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::realm::RealmSettings;
    use std::path::PathBuf;

    fn inline_options() -> ManagerOptions {
        ManagerOptions::new().with_template("t", "x")
    }

    #[test]
    fn test_missing_options() {
        let realm = Realm::root(RealmSettings::new());
        let err = register_views(&realm, None).err().unwrap();
        assert!(matches!(err, ViewsError::MissingOptions));
        assert!(views_state(&realm).is_none());
    }

    #[test]
    fn test_register_once() {
        let realm = Realm::root(RealmSettings::new());
        let manager = register_views(&realm, Some(inline_options())).unwrap();

        let stored = views_state(&realm).unwrap();
        assert!(Arc::ptr_eq(stored.manager().unwrap(), &manager));
    }

    #[test]
    fn test_second_registration_fails() {
        let realm = Realm::root(RealmSettings::new());
        let first = register_views(&realm, Some(inline_options())).unwrap();

        let err = register_views(&realm, Some(inline_options())).err().unwrap();
        assert!(matches!(err, ViewsError::AlreadyConfigured));

        let err = register_manager(&realm, Arc::clone(&first)).err().unwrap();
        assert!(matches!(err, ViewsError::AlreadyConfigured));

        // The first manager is untouched.
        let stored = views_state(&realm).unwrap();
        assert!(Arc::ptr_eq(stored.manager().unwrap(), &first));
    }

    #[test]
    fn test_invalid_options_leave_realm_unconfigured() {
        let realm = Realm::root(RealmSettings::new());
        let err = register_views(&realm, Some(ManagerOptions::new().with_layout_keyword("")))
            .err()
            .unwrap();
        assert!(matches!(err, ViewsError::InvalidOptions(_)));
        assert!(views_state(&realm).is_none());

        // A later valid registration still succeeds.
        assert!(register_views(&realm, Some(inline_options())).is_ok());
    }

    #[test]
    fn test_child_registration_independent() {
        let root = Realm::root(RealmSettings::new());
        let child = root.child(RealmSettings::new());
        register_views(&root, Some(inline_options())).unwrap();
        assert!(register_views(&child, Some(inline_options())).is_ok());
    }

    #[test]
    fn test_invalid_options() {
        let realm = Realm::root(RealmSettings::new());
        let err = register_views(&realm, Some(ManagerOptions::new().with_layout_keyword("")))
            .err()
            .unwrap();
        assert!(matches!(err, ViewsError::InvalidOptions(_)));
    }

    #[test]
    fn test_namespace_conflict() {
        let realm = Realm::root(RealmSettings::new());
        realm
            .plugins()
            .get_or_insert_with(PLUGIN_NAMESPACE, || PathBuf::from("other"));

        let err = register_views(&realm, Some(inline_options())).err().unwrap();
        assert!(matches!(err, ViewsError::NamespaceConflict { .. }));
    }
}
