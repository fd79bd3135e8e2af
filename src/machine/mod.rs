//! Machines synchronized with the fragment.
//!
//! A [`Machine`] owns its registry and current-state pointer but never treats
//! them as the source of truth: the fragment is. Public operations rewrite the
//! fragment; the hash-change notification that follows every write is what
//! moves the current state, for this machine and every other one mounted on
//! the same [`Location`].
//!
//! # Example
//!
//! ```rust
//! use hashstate::core::{QueryUpdate, QueryValue};
//! use hashstate::location::Location;
//! use hashstate::machine::MachineBuilder;
//! use hashstate::registry::StateDeclaration;
//!
//! let location = Location::in_memory();
//! let machine = MachineBuilder::new()
//!     .name("app")
//!     .initial("step1")
//!     .state("step1", StateDeclaration::new("Step 1").transitions(["step2"]))
//!     .state("step2", StateDeclaration::new("Step 2"))
//!     .build(&location)
//!     .unwrap();
//!
//! assert_eq!(location.fragment(), "#?yg-app=step1");
//!
//! machine.goto_state_with("step2", QueryUpdate::new().set("userId", 123), false);
//! assert_eq!(machine.current_state().as_deref(), Some("step2"));
//! assert_eq!(machine.query()["userId"], QueryValue::Number(123.0));
//! assert_eq!(machine.active_content(), Some("Step 2"));
//! ```

mod builder;
mod declared;
mod error;

pub use builder::{MachineBuilder, MachineConfig};
pub use declared::DeclaredState;
pub use error::BuildError;

use crate::context::MachineScope;
use crate::core::{
    coerce, namespace_key, HashParams, Query, QueryUpdate, StateHistory, StateTransition,
};
use crate::engine::{self, CommitPlan, TransitionOutcome, TransitionPlan};
use crate::links;
use crate::location::{HashChangeListener, HistoryMode, ListenerId, Location};
use crate::registry::{StateDeclaration, StateRegistry};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};
use std::str::FromStr;
use tracing::{debug, warn};

/// Transitions a machine remembers unless configured otherwise.
pub const DEFAULT_HISTORY_LIMIT: usize = 64;

struct MachineState<C> {
    current: Option<String>,
    query: Query,
    registry: StateRegistry<C>,
    history: StateHistory,
    revision: u64,
}

struct MachineInner<C> {
    name: Option<String>,
    key: String,
    initial: Option<String>,
    location: Location,
    listener: Cell<Option<ListenerId>>,
    state: RefCell<MachineState<C>>,
}

/// Handle to a mounted machine. Clones share the same machine; the machine is
/// unmounted when the last handle is dropped.
pub struct Machine<C = ()> {
    inner: Rc<MachineInner<C>>,
}

/// Value of `key` in `params`, treating an empty value as absent.
fn state_param(params: &HashParams, key: &str) -> Option<String> {
    params
        .get(key)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

impl<C: 'static> Machine<C> {
    /// Mount a machine on `location`.
    ///
    /// The current state comes from the fragment, or from `initial` when the
    /// fragment has none; in that case `initial` is written back as a
    /// replacing history entry. Mounting fires no lifecycle hooks.
    pub(crate) fn mount(
        location: &Location,
        name: Option<String>,
        initial: Option<String>,
        history_limit: usize,
        states: Vec<(String, StateDeclaration<C>)>,
    ) -> Self {
        let key = namespace_key(name.as_deref());
        let params = location.params();
        let current = state_param(&params, &key).or_else(|| initial.clone());

        let mut registry = StateRegistry::new();
        for (state_name, declaration) in states {
            registry.register(state_name, declaration);
        }

        let inner = Rc::new(MachineInner {
            name,
            key,
            initial,
            location: location.clone(),
            listener: Cell::new(None),
            state: RefCell::new(MachineState {
                current,
                query: coerce(&params),
                registry,
                history: StateHistory::with_limit(history_limit),
                revision: 0,
            }),
        });

        let listener: Weak<dyn HashChangeListener> = Rc::downgrade(&inner) as _;
        inner.listener.set(Some(location.subscribe(listener)));

        debug!(
            machine = %inner.key,
            current = ?inner.state.borrow().current,
            "mounted machine"
        );

        inner.write_initial_state();
        inner.sync();

        Self { inner }
    }

    /// Register a state that lives as long as the returned guard.
    pub fn declare(
        &self,
        name: impl Into<String>,
        declaration: StateDeclaration<C>,
    ) -> DeclaredState<C> {
        let name = name.into();
        self.register_state(name.clone(), declaration);
        DeclaredState::new(Rc::downgrade(&self.inner), name)
    }

    /// Make this machine the innermost one for [`crate::context::use_state_machine`]
    /// until the returned scope is dropped.
    pub fn enter(&self) -> MachineScope {
        MachineScope::push(self.clone())
    }
}

impl<C> Machine<C> {
    /// Machine name as mounted.
    pub fn name(&self) -> Option<&str> {
        self.inner.name.as_deref()
    }

    /// The fragment key holding this machine's state.
    pub fn param(&self) -> &str {
        &self.inner.key
    }

    pub fn initial_state(&self) -> Option<&str> {
        self.inner.initial.as_deref()
    }

    pub fn location(&self) -> &Location {
        &self.inner.location
    }

    pub fn current_state(&self) -> Option<String> {
        self.inner.state.borrow().current.clone()
    }

    /// Parse the current state into a typed state name.
    pub fn current_as<S: FromStr>(&self) -> Option<S> {
        self.inner
            .state
            .borrow()
            .current
            .as_deref()
            .and_then(|name| name.parse().ok())
    }

    /// Whether `name` is the current state.
    pub fn is(&self, name: impl AsRef<str>) -> bool {
        self.inner.state.borrow().current.as_deref() == Some(name.as_ref())
    }

    /// Whether the machine has an active state.
    pub fn is_open(&self) -> bool {
        self.inner.state.borrow().current.is_some()
    }

    /// Legal next states: the current state's allow-list, or empty when the
    /// state is absent, undeclared or unrestricted.
    pub fn available_transitions(&self) -> Vec<String> {
        let state = self.inner.state.borrow();
        state
            .current
            .as_deref()
            .and_then(|current| state.registry.allowed_transitions(current))
            .map(<[String]>::to_vec)
            .unwrap_or_default()
    }

    /// Coerced view of every fragment parameter.
    pub fn query(&self) -> Query {
        self.inner.state.borrow().query.clone()
    }

    /// Committed transitions, oldest first, capped at the configured limit.
    pub fn history(&self) -> StateHistory {
        self.inner.state.borrow().history.clone()
    }

    /// Changes whenever state, query or declared states change observably.
    pub fn revision(&self) -> u64 {
        self.inner.state.borrow().revision
    }

    /// Declared state names, sorted.
    pub fn registered_states(&self) -> Vec<String> {
        self.inner
            .state
            .borrow()
            .registry
            .names()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    /// Run `f` on the content of the current state, if it is declared.
    ///
    /// No machine borrow is held while `f` runs, so it may drive the machine.
    pub fn with_active_content<R>(&self, f: impl FnOnce(&C) -> R) -> Option<R> {
        let content = {
            let state = self.inner.state.borrow();
            let current = state.current.as_deref()?;
            state.registry.get(current)?.shared_content()
        };
        Some(f(&content))
    }

    /// Content of the current state, if it is declared.
    pub fn active_content(&self) -> Option<C>
    where
        C: Clone,
    {
        self.with_active_content(C::clone)
    }

    /// Insert or replace a state declaration.
    ///
    /// Returns whether the change is observable. Registering never runs
    /// lifecycle hooks.
    pub fn register_state(&self, name: impl Into<String>, declaration: StateDeclaration<C>) -> bool {
        let mut state = self.inner.state.borrow_mut();
        let changed = state.registry.register(name, declaration);
        if changed {
            state.revision += 1;
        }
        changed
    }

    /// Remove a state declaration. Missing names are ignored.
    pub fn unregister_state(&self, name: &str) -> bool {
        self.inner.unregister_state(name)
    }

    /// Go to `next`, keeping query data as is.
    pub fn goto_state(&self, next: impl AsRef<str>) -> TransitionOutcome {
        self.inner.goto(next.as_ref(), None, false)
    }

    /// Go to `next` and edit query data in the same history entry.
    ///
    /// With `replace`, every page-level key is dropped first; machine state
    /// keys always survive. The request is a no-op only when `next` is already
    /// current, `data` is empty and `replace` is false.
    pub fn goto_state_with(
        &self,
        next: impl AsRef<str>,
        data: QueryUpdate,
        replace: bool,
    ) -> TransitionOutcome {
        self.inner.goto(next.as_ref(), Some(&data), replace)
    }

    /// Remove this machine's key from the fragment. The current state becomes
    /// absent once the resulting notification is handled.
    ///
    /// Returns `false` without writing when the key is already absent.
    pub fn close(&self) -> bool {
        let mut params = self.inner.location.params();
        if params.remove(&self.inner.key).is_none() {
            return false;
        }
        debug!(machine = %self.inner.key, "closing machine");
        self.inner.location.write(&params, HistoryMode::Push);
        true
    }

    /// Merge (or with `replace`, reset) page-level query data.
    pub fn set_query(&self, update: QueryUpdate, replace: bool) {
        let mut params = self.inner.location.params();
        if replace {
            params.retain_namespaced();
        }
        params.apply(&update);
        debug!(machine = %self.inner.key, replace, "setting query");
        self.inner.location.write(&params, HistoryMode::Push);
    }

    /// Fragment a link to `to` on this machine would point at.
    pub fn href(&self, to: impl AsRef<str>, data: &QueryUpdate, replace: bool) -> String {
        links::state_href(
            &self.inner.location.params(),
            &self.inner.key,
            to.as_ref(),
            data,
            replace,
        )
    }

    /// Both handles refer to the same mounted machine.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<C> MachineInner<C> {
    fn write_initial_state(&self) {
        let Some(initial) = &self.initial else {
            return;
        };
        let mut params = self.location.params();
        if state_param(&params, &self.key).is_some() {
            return;
        }
        params.set(self.key.clone(), initial.clone());
        debug!(machine = %self.key, initial = %initial, "writing initial state");
        self.location.write(&params, HistoryMode::Replace);
    }

    fn goto(&self, next: &str, data: Option<&QueryUpdate>, replace: bool) -> TransitionOutcome {
        let carries_data = data.is_some_and(|d| !d.is_empty()) || replace;
        {
            let state = self.state.borrow();
            match engine::plan(&state.registry, state.current.as_deref(), next, carries_data) {
                TransitionPlan::Unchanged => return TransitionOutcome::Unchanged,
                TransitionPlan::Rejected(rejected) => {
                    warn!(machine = %self.key, "{rejected}");
                    return TransitionOutcome::Rejected(rejected);
                }
                TransitionPlan::Commit(_) => {}
            }
        }

        let mut params = self.location.params();
        if let Some(data) = data {
            if replace {
                params.retain_namespaced();
            }
            params.apply(data);
        }
        params.set(self.key.clone(), next);
        self.location.write(&params, HistoryMode::Push);
        TransitionOutcome::Committed
    }

    fn unregister_state(&self, name: &str) -> bool {
        let mut state = self.state.borrow_mut();
        let changed = state.registry.unregister(name);
        if changed {
            state.revision += 1;
        }
        changed
    }

    /// Re-derive state and query from the fragment. Never writes.
    ///
    /// Lifecycle hooks run with no borrow held and before the new state is
    /// committed, so they observe the state being left.
    fn sync(&self) {
        let params = self.location.params();
        let next = state_param(&params, &self.key);
        let query = coerce(&params);

        let plan = {
            let mut state = self.state.borrow_mut();
            if state.query != query {
                state.query = query;
                state.revision += 1;
            }

            match next {
                Some(next) if state.current.as_deref() != Some(next.as_str()) => {
                    self.plan_internal(&state, &next)
                }
                Some(_) => None,
                None => {
                    if let Some(previous) = state.current.take() {
                        debug!(machine = %self.key, from = %previous, "state cleared");
                        state.history.push(StateTransition::now(Some(previous), None));
                        state.revision += 1;
                    }
                    None
                }
            }
        };

        if let Some(plan) = plan {
            plan.run_hooks();
            self.commit(plan);
        }
    }

    fn plan_internal(&self, state: &MachineState<C>, next: &str) -> Option<CommitPlan> {
        match engine::plan(&state.registry, state.current.as_deref(), next, false) {
            TransitionPlan::Unchanged => None,
            TransitionPlan::Rejected(rejected) => {
                warn!(machine = %self.key, "{rejected}");
                None
            }
            TransitionPlan::Commit(commit) => Some(commit),
        }
    }

    /// Point the machine at the planned target unless a nested sync already
    /// moved it while the hooks ran.
    fn commit(&self, plan: CommitPlan) {
        let mut state = self.state.borrow_mut();
        if state.current != plan.from {
            debug!(machine = %self.key, to = %plan.to, "transition superseded");
            return;
        }

        debug!(
            machine = %self.key,
            from = ?plan.from,
            to = %plan.to,
            "committing transition"
        );
        state.current = Some(plan.to.clone());
        state.history.push(StateTransition::now(plan.from, Some(plan.to)));
        state.revision += 1;
    }
}

impl<C> HashChangeListener for MachineInner<C> {
    fn hash_changed(&self) {
        self.sync();
    }
}

impl<C> Drop for MachineInner<C> {
    fn drop(&mut self) {
        if let Some(id) = self.listener.take() {
            self.location.unsubscribe(id);
        }
        debug!(machine = %self.key, "unmounted machine");
    }
}

impl<C> Clone for Machine<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<C> fmt::Debug for Machine<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.borrow();
        f.debug_struct("Machine")
            .field("key", &self.inner.key)
            .field("current", &state.current)
            .field("states", &state.registry.names())
            .field("revision", &state.revision)
            .finish()
    }
}
