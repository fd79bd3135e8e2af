//! Enclosing-machine scopes.
//!
//! Code nested inside a machine (its states, links, buttons) finds that
//! machine without threading a handle through every call: the machine is
//! entered for the duration of a scope, and lookups return the innermost
//! entered machine on the current thread.

use crate::machine::Machine;
use std::any::Any;
use std::cell::RefCell;
use std::marker::PhantomData;
use std::rc::Rc;
use thiserror::Error;

thread_local! {
    /// Stack of entered machines, innermost last.
    static MACHINE_STACK: RefCell<Vec<Box<dyn Any>>> = const { RefCell::new(Vec::new()) };
}

/// Errors from looking up the enclosing machine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UsageError {
    #[error("use_state_machine must be used inside a mounted machine scope")]
    NoEnclosingMachine,
}

/// Keeps a machine entered until dropped.
#[must_use = "the machine is only entered while the scope is alive"]
pub struct MachineScope {
    depth: usize,
    _not_send: PhantomData<Rc<()>>,
}

impl MachineScope {
    pub(crate) fn push<C: 'static>(machine: Machine<C>) -> Self {
        let depth = MACHINE_STACK.with(|stack| {
            let mut stack = stack.borrow_mut();
            let depth = stack.len();
            stack.push(Box::new(machine));
            depth
        });
        Self {
            depth,
            _not_send: PhantomData,
        }
    }
}

impl Drop for MachineScope {
    fn drop(&mut self) {
        // Popping may drop the last machine handle, so release the stack first.
        // An outer scope dropped earlier has already popped this one.
        let popped = MACHINE_STACK.with(|stack| {
            let mut stack = stack.borrow_mut();
            if self.depth >= stack.len() {
                Vec::new()
            } else {
                stack.split_off(self.depth)
            }
        });
        drop(popped);
    }
}

/// Number of machines currently entered on this thread.
pub fn scope_depth() -> usize {
    MACHINE_STACK.with(|stack| stack.borrow().len())
}

/// The innermost entered machine.
///
/// Fails when no machine is entered or when the innermost one has a
/// different content type.
pub fn try_use_state_machine<C: 'static>() -> Result<Machine<C>, UsageError> {
    MACHINE_STACK.with(|stack| {
        stack
            .borrow()
            .last()
            .and_then(|entry| entry.downcast_ref::<Machine<C>>())
            .cloned()
            .ok_or(UsageError::NoEnclosingMachine)
    })
}

/// The innermost entered machine.
///
/// # Panics
///
/// Panics when called outside every machine scope.
///
/// # Example
///
/// ```rust
/// use hashstate::context::use_state_machine;
/// use hashstate::location::Location;
/// use hashstate::machine::{Machine, MachineBuilder};
///
/// let location = Location::in_memory();
/// let machine: Machine = MachineBuilder::new().initial("home").build(&location).unwrap();
///
/// let _scope = machine.enter();
/// let inner: Machine = use_state_machine();
/// assert!(inner.is("home"));
/// ```
pub fn use_state_machine<C: 'static>() -> Machine<C> {
    match try_use_state_machine() {
        Ok(machine) => machine,
        Err(err) => panic!("{err}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::Location;
    use crate::machine::MachineBuilder;

    fn mount(location: &Location, name: &str) -> Machine {
        MachineBuilder::new().name(name).build(location).unwrap()
    }

    #[test]
    fn lookup_outside_scope_fails() {
        assert_eq!(
            try_use_state_machine::<()>().unwrap_err(),
            UsageError::NoEnclosingMachine
        );
    }

    #[test]
    #[should_panic(expected = "use_state_machine must be used inside a mounted machine scope")]
    fn use_outside_scope_panics() {
        let _ = use_state_machine::<()>();
    }

    #[test]
    fn innermost_machine_wins() {
        let location = Location::in_memory();
        let outer = mount(&location, "outer");
        let inner = mount(&location, "inner");

        let _outer_scope = outer.enter();
        {
            let _inner_scope = inner.enter();
            assert_eq!(use_state_machine::<()>().name(), Some("inner"));
            assert_eq!(scope_depth(), 2);
        }
        assert!(use_state_machine::<()>().ptr_eq(&outer));
        assert_eq!(scope_depth(), 1);
    }

    #[test]
    fn scopes_may_drop_out_of_order() {
        let location = Location::in_memory();
        let outer_machine = mount(&location, "outer");
        let inner_machine = mount(&location, "inner");

        let outer = outer_machine.enter();
        let inner = inner_machine.enter();
        drop(outer);
        assert_eq!(scope_depth(), 0);

        drop(inner);
        assert_eq!(scope_depth(), 0);
        assert!(try_use_state_machine::<()>().is_err());

        let _again = outer_machine.enter();
        assert!(use_state_machine::<()>().ptr_eq(&outer_machine));
    }

    #[test]
    fn content_type_must_match() {
        let location = Location::in_memory();
        let machine = mount(&location, "app");
        let _scope = machine.enter();

        assert!(try_use_state_machine::<String>().is_err());
    }

    #[test]
    fn scope_keeps_machine_mounted() {
        let location = Location::in_memory();
        let scope = mount(&location, "app").enter();

        assert_eq!(location.listener_count(), 1);
        drop(scope);
        assert_eq!(location.listener_count(), 0);
    }
}
