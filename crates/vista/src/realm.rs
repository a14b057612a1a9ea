//! The realm tree.
//!
//! A [`Realm`] is one configuration scope of a server: the root realm for
//! the server itself and one child realm per isolated sub-application
//! (plugin). Parents own their children; a child only holds a [`Weak`]
//! handle back to its parent, so walking upward never keeps a dropped
//! subtree alive.
//!
//! ```text
//! root (server)
//! ├── auth          <- realm with its own views manager
//! │   └── auth/ui   <- inherits auth's manager
//! └── api           <- inherits root's manager, if any
//! ```
//!
//! Each realm carries [`RealmSettings`] and a [`PluginState`] map keyed by
//! plugin namespace.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock, Weak};

/// Static settings of a realm.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RealmSettings {
    name: Option<String>,
    relative_to: Option<PathBuf>,
}

impl RealmSettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the realm name used in diagnostics.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the base path for relative file lookups in this realm.
    pub fn relative_to(mut self, base: impl Into<PathBuf>) -> Self {
        self.relative_to = Some(base.into());
        self
    }

    pub fn name_ref(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn base_path(&self) -> Option<&Path> {
        self.relative_to.as_deref()
    }
}

type PluginValue = Arc<dyn Any + Send + Sync>;

/// Per-realm plugin state, keyed by plugin namespace.
///
/// Values are shared handles; a namespace is claimed by the first type
/// stored under it.
#[derive(Default)]
pub struct PluginState {
    entries: RwLock<HashMap<String, PluginValue>>,
}

impl PluginState {
    /// Returns the state stored under `namespace` if it has type `T`.
    pub fn get<T: Any + Send + Sync>(&self, namespace: &str) -> Option<Arc<T>> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries
            .get(namespace)
            .cloned()
            .and_then(|value| value.downcast::<T>().ok())
    }

    /// Returns the state under `namespace`, inserting `init()` when absent.
    ///
    /// Returns `None` when the namespace already holds a different type.
    pub fn get_or_insert_with<T, F>(&self, namespace: &str, init: F) -> Option<Arc<T>>
    where
        T: Any + Send + Sync,
        F: FnOnce() -> T,
    {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let value = entries
            .entry(namespace.to_string())
            .or_insert_with(|| Arc::new(init()) as PluginValue)
            .clone();
        value.downcast::<T>().ok()
    }

    /// Returns true if anything is stored under `namespace`.
    pub fn contains(&self, namespace: &str) -> bool {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(namespace)
    }

    /// Namespaces currently in use.
    pub fn namespaces(&self) -> Vec<String> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        let mut names: Vec<String> = entries.keys().cloned().collect();
        names.sort();
        names
    }
}

impl fmt::Debug for PluginState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginState")
            .field("namespaces", &self.namespaces())
            .finish()
    }
}

struct RealmNode {
    parent: Option<Weak<RealmNode>>,
    settings: RealmSettings,
    plugins: PluginState,
    children: RwLock<Vec<Arc<RealmNode>>>,
}

/// Handle to a node of the realm tree.
///
/// Cloning is cheap and yields another handle to the same node.
#[derive(Clone)]
pub struct Realm {
    node: Arc<RealmNode>,
}

impl Realm {
    /// Creates a root realm.
    pub fn root(settings: RealmSettings) -> Self {
        Self::from_parts(None, settings)
    }

    fn from_parts(parent: Option<Weak<RealmNode>>, settings: RealmSettings) -> Self {
        Self {
            node: Arc::new(RealmNode {
                parent,
                settings,
                plugins: PluginState::default(),
                children: RwLock::new(Vec::new()),
            }),
        }
    }

    /// Creates a child realm owned by this one.
    pub fn child(&self, settings: RealmSettings) -> Realm {
        let child = Self::from_parts(Some(Arc::downgrade(&self.node)), settings);
        self.node
            .children
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Arc::clone(&child.node));
        child
    }

    /// The parent realm, or `None` for a root (or a detached subtree).
    pub fn parent(&self) -> Option<Realm> {
        self.node
            .parent
            .as_ref()
            .and_then(Weak::upgrade)
            .map(|node| Realm { node })
    }

    pub fn children(&self) -> Vec<Realm> {
        self.node
            .children
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|node| Realm {
                node: Arc::clone(node),
            })
            .collect()
    }

    pub fn settings(&self) -> &RealmSettings {
        &self.node.settings
    }

    pub fn plugins(&self) -> &PluginState {
        &self.node.plugins
    }

    /// The realm name, or `"root"` / `"anonymous"` when unnamed.
    pub fn display_name(&self) -> &str {
        match self.node.settings.name_ref() {
            Some(name) => name,
            None if self.node.parent.is_none() => "root",
            None => "anonymous",
        }
    }

    pub fn is_root(&self) -> bool {
        self.node.parent.is_none()
    }

    /// This realm followed by each ancestor up to the root.
    pub fn ancestors(&self) -> Ancestors {
        Ancestors {
            next: Some(self.clone()),
        }
    }

    /// Returns true if both handles point to the same node.
    pub fn ptr_eq(&self, other: &Realm) -> bool {
        Arc::ptr_eq(&self.node, &other.node)
    }
}

impl fmt::Debug for Realm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Realm")
            .field("name", &self.display_name())
            .field("settings", &self.node.settings)
            .field("plugins", &self.node.plugins)
            .finish_non_exhaustive()
    }
}

/// Iterator over a realm and its ancestors, nearest first.
pub struct Ancestors {
    next: Option<Realm>,
}

impl Iterator for Ancestors {
    type Item = Realm;

    fn next(&mut self) -> Option<Realm> {
        let current = self.next.take()?;
        self.next = current.parent();
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_has_no_parent() {
        let root = Realm::root(RealmSettings::new());
        assert!(root.is_root());
        assert!(root.parent().is_none());
        assert_eq!(root.display_name(), "root");
    }

    #[test]
    fn test_child_links_to_parent() {
        let root = Realm::root(RealmSettings::new().name("server"));
        let child = root.child(RealmSettings::new().name("plugin"));

        assert!(child.parent().unwrap().ptr_eq(&root));
        assert_eq!(root.children().len(), 1);
        assert!(root.children()[0].ptr_eq(&child));
        assert_eq!(child.display_name(), "plugin");
    }

    #[test]
    fn test_ancestors_nearest_first() {
        let root = Realm::root(RealmSettings::new().name("a"));
        let mid = root.child(RealmSettings::new().name("b"));
        let leaf = mid.child(RealmSettings::new().name("c"));

        let names: Vec<String> = leaf
            .ancestors()
            .map(|r| r.display_name().to_string())
            .collect();
        assert_eq!(names, vec!["c", "b", "a"]);
    }

    #[test]
    fn test_child_does_not_keep_parent_alive() {
        let root = Realm::root(RealmSettings::new());
        let child = root.child(RealmSettings::new());
        drop(root);
        assert!(child.parent().is_none());
        assert_eq!(child.ancestors().count(), 1);
    }

    #[test]
    fn test_settings_accessors() {
        let settings = RealmSettings::new().name("x").relative_to("/srv");
        assert_eq!(settings.name_ref(), Some("x"));
        assert_eq!(settings.base_path(), Some(Path::new("/srv")));
    }

    #[test]
    fn test_plugin_state_typed_namespaces() {
        let state = PluginState::default();
        let first = state.get_or_insert_with("counter", || 1u32).unwrap();
        let second = state.get_or_insert_with("counter", || 2u32).unwrap();
        assert_eq!(*first, 1);
        assert!(Arc::ptr_eq(&first, &second));

        assert!(state.get_or_insert_with("counter", String::new).is_none());
        assert!(state.get::<String>("counter").is_none());
        assert!(state.contains("counter"));
        assert_eq!(state.namespaces(), vec!["counter".to_string()]);
    }
}
