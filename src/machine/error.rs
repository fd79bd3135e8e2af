//! Build errors for machine builders.

use thiserror::Error;

/// Errors that can occur when building a machine.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Machine name is empty. Omit .name() to use the default machine")]
    EmptyMachineName,

    #[error("Initial state is empty. Call .initial(state) with a state name")]
    EmptyInitialState,

    #[error("State name is empty. Every .state(name, ..) needs a name")]
    EmptyStateName,

    #[error("State \"{0}\" is declared more than once")]
    DuplicateState(String),

    #[error("Invalid machine configuration: {0}")]
    InvalidConfig(#[from] serde_json::Error),
}
