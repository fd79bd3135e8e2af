//! Registry of the states a machine currently has declared.
//!
//! States are discovered at runtime: declaring content registers it, removing
//! the content unregisters it. The registry version moves only on observable
//! changes so dependents (available transitions, visible content) recompute
//! exactly when they have to.

mod declaration;
mod hook;

pub use declaration::StateDeclaration;
pub use hook::Hook;

use std::collections::HashMap;
use tracing::debug;

/// Mapping from state name to declaration.
///
/// # Example
///
/// ```rust
/// use hashstate::registry::{StateDeclaration, StateRegistry};
///
/// let mut registry = StateRegistry::new();
/// assert!(registry.register("page1", StateDeclaration::new("first page")));
/// assert_eq!(registry.get("page1").map(|d| *d.content()), Some("first page"));
///
/// assert!(registry.unregister("page1"));
/// assert!(!registry.unregister("page1"));
/// ```
#[derive(Debug)]
pub struct StateRegistry<C> {
    states: HashMap<String, StateDeclaration<C>>,
    version: u64,
}

impl<C> StateRegistry<C> {
    pub fn new() -> Self {
        Self {
            states: HashMap::new(),
            version: 0,
        }
    }

    /// Insert or replace a declaration.
    ///
    /// Returns `false` when an entry with the same hooks and allow-list
    /// already existed; its content is refreshed but the version is kept.
    pub fn register(&mut self, name: impl Into<String>, declaration: StateDeclaration<C>) -> bool {
        let name = name.into();
        let unchanged = self
            .states
            .get(&name)
            .is_some_and(|existing| existing.same_behavior(&declaration));

        self.states.insert(name.clone(), declaration);
        if unchanged {
            return false;
        }

        self.version += 1;
        debug!(state = %name, version = self.version, "registered state");
        true
    }

    /// Remove a declaration. Returns whether one was present.
    pub fn unregister(&mut self, name: &str) -> bool {
        if self.states.remove(name).is_none() {
            return false;
        }
        self.version += 1;
        debug!(state = %name, version = self.version, "unregistered state");
        true
    }

    pub fn get(&self, name: &str) -> Option<&StateDeclaration<C>> {
        self.states.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.states.contains_key(name)
    }

    /// Allow-list declared for `name`, if the state is declared and has one.
    pub fn allowed_transitions(&self, name: &str) -> Option<&[String]> {
        self.get(name).and_then(StateDeclaration::allowed_transitions)
    }

    /// Declared state names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.states.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Incremented on every observable change.
    pub fn version(&self) -> u64 {
        self.version
    }
}

impl<C> Default for StateRegistry<C> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_inserts_and_bumps_version() {
        let mut registry = StateRegistry::new();

        assert!(registry.register("a", StateDeclaration::new(())));
        assert!(registry.contains("a"));
        assert_eq!(registry.version(), 1);
    }

    #[test]
    fn identical_reregistration_is_silent() {
        let hook = Hook::new(|| {});
        let mut registry = StateRegistry::new();
        registry.register("a", StateDeclaration::new("v1").enter_hook(hook.clone()));

        let changed = registry.register("a", StateDeclaration::new("v2").enter_hook(hook));

        assert!(!changed);
        assert_eq!(registry.version(), 1);
        assert_eq!(*registry.get("a").unwrap().content(), "v2");
    }

    #[test]
    fn changed_allow_list_is_observable() {
        let mut registry = StateRegistry::new();
        registry.register("a", StateDeclaration::new(()).transitions(["b"]));

        assert!(registry.register("a", StateDeclaration::new(()).transitions(["c"])));
        assert_eq!(registry.allowed_transitions("a"), Some(&["c".to_string()][..]));
        assert_eq!(registry.version(), 2);
    }

    #[test]
    fn unregister_missing_is_noop() {
        let mut registry: StateRegistry<()> = StateRegistry::new();
        assert!(!registry.unregister("ghost"));
        assert_eq!(registry.version(), 0);
    }

    #[test]
    fn allowed_transitions_for_undeclared_state_is_none() {
        let registry: StateRegistry<()> = StateRegistry::new();
        assert!(registry.allowed_transitions("ghost").is_none());
    }

    #[test]
    fn names_are_sorted() {
        let mut registry = StateRegistry::new();
        registry.register("b", StateDeclaration::new(()));
        registry.register("a", StateDeclaration::new(()));

        assert_eq!(registry.names(), vec!["a", "b"]);
        assert_eq!(registry.len(), 2);
    }
}
