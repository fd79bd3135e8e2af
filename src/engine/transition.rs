//! Transition planning.

use crate::registry::{Hook, StateRegistry};
use thiserror::Error;

/// A transition refused by the source state's allow-list.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("Transition from \"{from}\" to \"{to}\" not allowed.")]
pub struct TransitionRejected {
    pub from: String,
    pub to: String,
}

/// What committing a transition involves.
#[derive(Clone, Debug, PartialEq)]
pub struct CommitPlan {
    pub from: Option<String>,
    pub to: String,
    /// `on_exit` of the state being left
    pub exit: Option<Hook>,
    /// `on_enter` of the state being entered
    pub enter: Option<Hook>,
}

impl CommitPlan {
    /// Run the lifecycle hooks: exit first, then enter.
    pub fn run_hooks(&self) {
        if let Some(exit) = &self.exit {
            exit.call();
        }
        if let Some(enter) = &self.enter {
            enter.call();
        }
    }
}

/// Decision for a proposed transition (pure).
#[derive(Clone, Debug, PartialEq)]
pub enum TransitionPlan {
    /// Target is already current and nothing else changes
    Unchanged,

    /// Source state's allow-list excludes the target
    Rejected(TransitionRejected),

    /// Transition is legal
    Commit(CommitPlan),
}

/// Result of a public transition request.
#[derive(Clone, Debug, PartialEq)]
pub enum TransitionOutcome {
    /// The fragment was rewritten and every machine re-synchronized
    Committed,

    /// Target is already current and no data was given; nothing happened
    Unchanged,

    /// Refused by the allow-list; the machine stays where it was
    Rejected(TransitionRejected),
}

impl TransitionOutcome {
    pub fn is_committed(&self) -> bool {
        matches!(self, Self::Committed)
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected(_))
    }
}

/// Check `prev`'s allow-list for `next`.
///
/// Undeclared sources and sources without an allow-list accept anything.
pub fn check_allowed<C>(
    registry: &StateRegistry<C>,
    prev: Option<&str>,
    next: &str,
) -> Result<(), TransitionRejected> {
    let Some(prev) = prev else {
        return Ok(());
    };
    match registry.get(prev) {
        Some(declaration) if !declaration.allows(next) => Err(TransitionRejected {
            from: prev.to_string(),
            to: next.to_string(),
        }),
        _ => Ok(()),
    }
}

/// Decide how to move from `prev` to `next`.
///
/// `carries_data` marks a request that also rewrites query data; such a
/// request is never a no-op even when the state does not change.
pub fn plan<C>(
    registry: &StateRegistry<C>,
    prev: Option<&str>,
    next: &str,
    carries_data: bool,
) -> TransitionPlan {
    if prev == Some(next) && !carries_data {
        return TransitionPlan::Unchanged;
    }

    if let Err(rejected) = check_allowed(registry, prev, next) {
        return TransitionPlan::Rejected(rejected);
    }

    TransitionPlan::Commit(CommitPlan {
        from: prev.map(str::to_string),
        to: next.to_string(),
        exit: prev
            .and_then(|p| registry.get(p))
            .and_then(|d| d.exited().cloned()),
        enter: registry.get(next).and_then(|d| d.entered().cloned()),
    })
}
