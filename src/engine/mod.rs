//! Transition engine.
//!
//! States are not fixed up front: the engine consults whatever the registry
//! holds at the moment a transition is proposed. Planning is pure; running the
//! resulting hooks is the only side effect, and the caller decides when.
//!
//! Two entry points share these rules:
//! - the internal path, driven by hash-change notifications, which never
//!   writes the fragment;
//! - the public path (`goto_state`), which writes the fragment and lets the
//!   resulting notification drive the internal path.

mod transition;

pub use transition::{
    check_allowed, plan, CommitPlan, TransitionOutcome, TransitionPlan, TransitionRejected,
};
