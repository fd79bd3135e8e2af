//! Builder for mounting machines.

use super::error::BuildError;
use super::{Machine, DEFAULT_HISTORY_LIMIT};
use crate::location::Location;
use crate::registry::StateDeclaration;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Serializable part of a machine's setup.
///
/// # Example
///
/// ```rust
/// use hashstate::machine::MachineConfig;
///
/// let config = MachineConfig::from_json(r#"{ "name": "app", "initial": "step1" }"#).unwrap();
/// assert_eq!(config.name.as_deref(), Some("app"));
/// assert_eq!(config.initial.as_deref(), Some("step1"));
/// assert_eq!(config.history_limit, None);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MachineConfig {
    pub name: Option<String>,
    pub initial: Option<String>,
    /// Transitions kept in the machine's history.
    pub history_limit: Option<usize>,
}

impl MachineConfig {
    pub fn from_json(json: &str) -> Result<Self, BuildError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Builder for mounting machines with a fluent API.
pub struct MachineBuilder<C = ()> {
    name: Option<String>,
    initial: Option<String>,
    history_limit: usize,
    states: Vec<(String, StateDeclaration<C>)>,
}

impl<C: 'static> MachineBuilder<C> {
    /// Create a new builder for the default (unnamed) machine.
    pub fn new() -> Self {
        Self {
            name: None,
            initial: None,
            history_limit: DEFAULT_HISTORY_LIMIT,
            states: Vec::new(),
        }
    }

    /// Start from a loaded configuration.
    pub fn from_config(config: MachineConfig) -> Self {
        Self {
            name: config.name,
            initial: config.initial,
            history_limit: config.history_limit.unwrap_or(DEFAULT_HISTORY_LIMIT),
            states: Vec::new(),
        }
    }

    /// Name the machine. Its state lives under `yg-<name>`.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// State to use when the fragment has none.
    pub fn initial(mut self, state: impl AsRef<str>) -> Self {
        self.initial = Some(state.as_ref().to_string());
        self
    }

    /// Cap the recorded history; older transitions are dropped first.
    pub fn history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }

    /// Declare a state up front. More can be registered after mounting.
    pub fn state(mut self, name: impl AsRef<str>, declaration: StateDeclaration<C>) -> Self {
        self.states.push((name.as_ref().to_string(), declaration));
        self
    }

    /// Mount the machine on `location`.
    /// Returns an error if a name is empty or a state is declared twice.
    pub fn build(self, location: &Location) -> Result<Machine<C>, BuildError> {
        if self.name.as_deref() == Some("") {
            return Err(BuildError::EmptyMachineName);
        }
        if self.initial.as_deref() == Some("") {
            return Err(BuildError::EmptyInitialState);
        }

        let mut seen = HashSet::new();
        for (name, _) in &self.states {
            if name.is_empty() {
                return Err(BuildError::EmptyStateName);
            }
            if !seen.insert(name.as_str()) {
                return Err(BuildError::DuplicateState(name.clone()));
            }
        }

        Ok(Machine::mount(
            location,
            self.name,
            self.initial,
            self.history_limit,
            self.states,
        ))
    }
}

impl<C: 'static> Default for MachineBuilder<C> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_rejects_empty_initial_state() {
        let result = MachineBuilder::<()>::new()
            .initial("")
            .build(&Location::in_memory());

        assert!(matches!(result, Err(BuildError::EmptyInitialState)));
    }

    #[test]
    fn builder_rejects_empty_machine_name() {
        let result = MachineBuilder::<()>::new()
            .name("")
            .build(&Location::in_memory());

        assert!(matches!(result, Err(BuildError::EmptyMachineName)));
    }

    #[test]
    fn builder_rejects_duplicate_states() {
        let result = MachineBuilder::new()
            .state("a", StateDeclaration::new(()))
            .state("a", StateDeclaration::new(()))
            .build(&Location::in_memory());

        match result {
            Err(BuildError::DuplicateState(name)) => assert_eq!(name, "a"),
            other => panic!("Expected duplicate state error, got {other:?}"),
        }
    }

    #[test]
    fn builder_rejects_empty_state_name() {
        let result = MachineBuilder::new()
            .state("", StateDeclaration::new(()))
            .build(&Location::in_memory());

        assert!(matches!(result, Err(BuildError::EmptyStateName)));
    }

    #[test]
    fn fluent_api_mounts_machine() {
        let location = Location::in_memory();
        let machine = MachineBuilder::new()
            .name("settings")
            .initial("profile")
            .state("profile", StateDeclaration::new("Profile"))
            .state("security", StateDeclaration::new("Security"))
            .build(&location)
            .unwrap();

        assert_eq!(machine.name(), Some("settings"));
        assert_eq!(machine.param(), "yg-settings");
        assert_eq!(machine.initial_state(), Some("profile"));
        assert_eq!(machine.registered_states(), vec!["profile", "security"]);
    }

    #[test]
    fn config_feeds_builder() {
        let config = MachineConfig::from_json(r#"{ "name": "wizard", "initial": "step1" }"#).unwrap();
        let location = Location::in_memory();

        let machine: Machine = MachineBuilder::from_config(config).build(&location).unwrap();

        assert_eq!(location.fragment(), "#?yg-wizard=step1");
        assert!(machine.is("step1"));
    }

    #[test]
    fn config_sets_history_limit() {
        let config = MachineConfig::from_json(r#"{ "name": "m", "history_limit": 2 }"#).unwrap();
        let location = Location::in_memory();

        let machine: Machine = MachineBuilder::from_config(config).build(&location).unwrap();
        for next in ["a", "b", "c", "d"] {
            machine.goto_state(next);
        }

        assert_eq!(machine.history().limit(), Some(2));
        assert_eq!(machine.history().len(), 2);
    }

    #[test]
    fn config_fields_are_optional() {
        let config = MachineConfig::from_json("{}").unwrap();
        assert_eq!(config, MachineConfig::default());
    }

    #[test]
    fn invalid_config_is_reported() {
        let result = MachineConfig::from_json(r#"{ "name": 3 }"#);
        assert!(matches!(result, Err(BuildError::InvalidConfig(_))));
    }
}
