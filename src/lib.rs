//! Hashstate: declarative state machines kept in the URL fragment
//!
//! Every machine stores its current state under a reserved fragment key
//! (`yg-<name>`), next to shared query data that all machines on the page can
//! read and write. The fragment is the single source of truth: machines never
//! change state directly. They rewrite the fragment and re-derive their state
//! from the notification that follows, so back/forward navigation, deep links
//! and programmatic transitions all take the same path.
//!
//! # Core Concepts
//!
//! - **Location**: the page fragment with push/replace history and hash-change
//!   notifications
//! - **Registry**: states declared at runtime, each with content, lifecycle
//!   hooks and an optional allow-list of next states
//! - **Machine**: a mounted handle that keeps one namespaced key in sync
//!
//! # Example
//!
//! ```rust
//! use hashstate::core::QueryUpdate;
//! use hashstate::location::Location;
//! use hashstate::machine::MachineBuilder;
//! use hashstate::registry::StateDeclaration;
//!
//! let location = Location::in_memory();
//!
//! let wizard = MachineBuilder::new()
//!     .name("app")
//!     .initial("step1")
//!     .state("step1", StateDeclaration::new("Step 1").transitions(["step2"]))
//!     .state("step2", StateDeclaration::new("Step 2"))
//!     .build(&location)
//!     .unwrap();
//!
//! let settings = MachineBuilder::new()
//!     .name("settings")
//!     .initial("profile")
//!     .state("profile", StateDeclaration::new("Profile"))
//!     .build(&location)
//!     .unwrap();
//!
//! wizard.goto_state_with("step2", QueryUpdate::new().set("userId", 123), false);
//!
//! assert_eq!(
//!     location.fragment(),
//!     "#?yg-app=step2&yg-settings=profile&userId=123"
//! );
//! assert!(settings.is("profile"));
//!
//! location.back();
//! assert!(wizard.is("step1"));
//! ```

pub mod context;
pub mod core;
pub mod engine;
pub mod links;
pub mod location;
pub mod machine;
pub mod registry;

mod macros;

// Re-export commonly used types
pub use crate::core::{HashParams, Query, QueryUpdate, QueryValue, StateHistory};
pub use context::{try_use_state_machine, use_state_machine, MachineScope, UsageError};
pub use engine::{TransitionOutcome, TransitionRejected};
pub use location::{HistoryMode, Location};
pub use machine::{BuildError, DeclaredState, Machine, MachineBuilder, MachineConfig};
pub use macros::ParseStateError;
pub use registry::{Hook, StateDeclaration};
