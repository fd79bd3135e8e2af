use super::MachineInner;
use crate::registry::StateDeclaration;
use std::fmt;
use std::rc::Weak;

/// A state registered for as long as this guard lives.
///
/// Dropping the guard unregisters the state. If the machine is already gone
/// there is nothing to unregister.
pub struct DeclaredState<C> {
    machine: Weak<MachineInner<C>>,
    name: String,
}

impl<C> DeclaredState<C> {
    pub(super) fn new(machine: Weak<MachineInner<C>>, name: String) -> Self {
        Self { machine, name }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Re-register with new props. Returns whether the change is observable.
    pub fn update(&self, declaration: StateDeclaration<C>) -> bool {
        let Some(machine) = self.machine.upgrade() else {
            return false;
        };
        let mut state = machine.state.borrow_mut();
        let changed = state.registry.register(self.name.clone(), declaration);
        if changed {
            state.revision += 1;
        }
        changed
    }

    /// Whether the machine this state belongs to is still mounted.
    pub fn is_mounted(&self) -> bool {
        self.machine.strong_count() > 0
    }
}

impl<C> Drop for DeclaredState<C> {
    fn drop(&mut self) {
        if let Some(machine) = self.machine.upgrade() {
            machine.unregister_state(&self.name);
        }
    }
}

impl<C> fmt::Debug for DeclaredState<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeclaredState")
            .field("name", &self.name)
            .field("mounted", &self.is_mounted())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use crate::location::Location;
    use crate::machine::{Machine, MachineBuilder};
    use crate::registry::StateDeclaration;

    fn machine(location: &Location) -> Machine<&'static str> {
        MachineBuilder::new().initial("page1").build(location).unwrap()
    }

    #[test]
    fn guard_unregisters_on_drop() {
        let location = Location::in_memory();
        let machine = machine(&location);

        let page1 = machine.declare("page1", StateDeclaration::new("first"));
        assert_eq!(machine.active_content(), Some("first"));

        drop(page1);
        assert!(machine.active_content().is_none());
        assert!(machine.is("page1"));
    }

    #[test]
    fn update_refreshes_content_and_allow_list() {
        let location = Location::in_memory();
        let machine = machine(&location);
        let page1 = machine.declare("page1", StateDeclaration::new("first"));

        assert!(page1.update(StateDeclaration::new("first").transitions(["page2"])));
        assert_eq!(machine.available_transitions(), vec!["page2".to_string()]);

        assert!(!page1.update(StateDeclaration::new("renamed").transitions(["page2"])));
        assert_eq!(machine.active_content(), Some("renamed"));
    }

    #[test]
    fn guard_outliving_machine_is_harmless() {
        let location = Location::in_memory();
        let machine = machine(&location);
        let page1 = machine.declare("page1", StateDeclaration::new("first"));

        drop(machine);

        assert!(!page1.is_mounted());
        assert!(!page1.update(StateDeclaration::new("again")));
    }
}
