//! Manager resolution over randomly shaped realm chains.

use std::sync::Arc;

use async_trait::async_trait;
use proptest::prelude::*;
use vista::{
    register_manager, resolve_manager, Context, ManagerHandle, Options, Realm, RealmSettings,
    RenderError, RenderedOutput, ViewsManager,
};

struct Tagged(usize);

#[async_trait]
impl ViewsManager for Tagged {
    async fn render(
        &self,
        _template: &str,
        _context: Option<&Context>,
        _options: &Options,
    ) -> Result<RenderedOutput, RenderError> {
        Ok(RenderedOutput::new(self.0.to_string(), "text/plain"))
    }
}

/// Root followed by `depth` nested children; index 0 is the root.
fn chain(depth: usize) -> Vec<Realm> {
    let mut realms = vec![Realm::root(RealmSettings::new())];
    for i in 0..depth {
        let child = realms[i].child(RealmSettings::new().name(format!("r{i}")));
        realms.push(child);
    }
    realms
}

fn same(a: &ManagerHandle, b: &ManagerHandle) -> bool {
    std::ptr::eq(Arc::as_ptr(a) as *const (), Arc::as_ptr(b) as *const ())
}

proptest! {
    #[test]
    fn resolves_to_nearest_configured_ancestor(
        depth in 0usize..8,
        configured in proptest::collection::vec(any::<bool>(), 9),
    ) {
        let realms = chain(depth);
        let mut handles: Vec<Option<ManagerHandle>> = Vec::new();
        for (i, realm) in realms.iter().enumerate() {
            if configured[i] {
                let handle: ManagerHandle = Arc::new(Tagged(i));
                register_manager(realm, Arc::clone(&handle)).unwrap();
                handles.push(Some(handle));
            } else {
                handles.push(None);
            }
        }

        for (start, realm) in realms.iter().enumerate() {
            let expected = (0..=start).rev().find_map(|i| handles[i].clone());
            let found = resolve_manager(realm);
            match (expected, found) {
                (Some(expected), Some(found)) => prop_assert!(same(&expected, &found)),
                (None, None) => {}
                (expected, found) => prop_assert!(
                    false,
                    "start {start}: expected {:?}, found {:?}",
                    expected.is_some(),
                    found.is_some()
                ),
            }
        }
    }

    #[test]
    fn descendants_are_never_consulted(depth in 1usize..8) {
        let realms = chain(depth);
        let deepest = &realms[depth];
        register_manager(deepest, Arc::new(Tagged(depth))).unwrap();

        for realm in &realms[..depth] {
            prop_assert!(resolve_manager(realm).is_none());
        }
        prop_assert!(resolve_manager(deepest).is_some());
    }
}
