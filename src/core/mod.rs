//! Pure core of the fragment engine.
//!
//! This module contains the side-effect free pieces:
//! - Fragment encoding and decoding
//! - Read-time coercion of query values
//! - Machine key namespacing
//! - Immutable transition history
//!
//! Nothing in here touches a location or runs a lifecycle hook.

mod codec;
mod history;
mod namespace;
mod query;

pub use codec::{HashParams, FRAGMENT_MARKER};
pub use history::{StateHistory, StateTransition};
pub use namespace::{is_namespaced, namespace_key, DEFAULT_MACHINE_NAME, NAMESPACE_PREFIX};
pub use query::{coerce, coerce_value, Query, QueryUpdate, QueryValue};
