//! Transition history.
//!
//! Every committed change of a machine's current state is recorded as an
//! immutable value. A `None` end marks the machine having no active state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::Duration;

/// Record of a single change of current state.
///
/// # Example
///
/// ```rust
/// use hashstate::core::StateTransition;
/// use chrono::Utc;
///
/// let transition = StateTransition {
///     from: Some("page1".to_string()),
///     to: Some("page2".to_string()),
///     timestamp: Utc::now(),
/// };
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StateTransition {
    /// The state being left, if any
    pub from: Option<String>,
    /// The state being entered, if any
    pub to: Option<String>,
    /// When the change was committed
    pub timestamp: DateTime<Utc>,
}

impl StateTransition {
    /// Record a change happening now.
    pub fn now(from: Option<String>, to: Option<String>) -> Self {
        Self {
            from,
            to,
            timestamp: Utc::now(),
        }
    }
}

/// Ordered history of state changes, optionally bounded.
///
/// A bounded history keeps only the most recent `limit` transitions. `push`
/// records in place; `record` leaves `self` untouched and returns the
/// extended history.
///
/// # Example
///
/// ```rust
/// use hashstate::core::{StateHistory, StateTransition};
///
/// let history = StateHistory::new()
///     .record(StateTransition::now(Some("start".into()), Some("middle".into())))
///     .record(StateTransition::now(Some("middle".into()), None));
///
/// let path = history.get_path();
/// assert_eq!(path, vec![Some("start"), Some("middle"), None]);
///
/// let mut bounded = StateHistory::with_limit(1);
/// bounded.push(StateTransition::now(None, Some("a".into())));
/// bounded.push(StateTransition::now(Some("a".into()), Some("b".into())));
/// assert_eq!(bounded.get_path(), vec![Some("a"), Some("b")]);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StateHistory {
    transitions: VecDeque<StateTransition>,
    #[serde(default)]
    limit: Option<usize>,
}

impl StateHistory {
    /// Create a new empty, unbounded history.
    pub fn new() -> Self {
        Self {
            transitions: VecDeque::new(),
            limit: None,
        }
    }

    /// Create a history that keeps at most `limit` transitions.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            transitions: VecDeque::with_capacity(limit.min(64)),
            limit: Some(limit),
        }
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    /// Record a transition in place, evicting the oldest ones past the limit.
    pub fn push(&mut self, transition: StateTransition) {
        self.transitions.push_back(transition);
        if let Some(limit) = self.limit {
            while self.transitions.len() > limit {
                self.transitions.pop_front();
            }
        }
    }

    /// Record a transition, returning a new history.
    pub fn record(&self, transition: StateTransition) -> Self {
        let mut next = self.clone();
        next.push(transition);
        next
    }

    /// Get the path of states traversed.
    ///
    /// Starts with the `from` of the first transition, then the `to` of each
    /// transition in order.
    pub fn get_path(&self) -> Vec<Option<&str>> {
        let mut path = Vec::with_capacity(self.transitions.len() + 1);
        if let Some(first) = self.transitions.front() {
            path.push(first.from.as_deref());
        }
        for transition in &self.transitions {
            path.push(transition.to.as_deref());
        }
        path
    }

    /// Duration between the first and last recorded transition.
    ///
    /// Returns `None` if there are no transitions.
    pub fn duration(&self) -> Option<Duration> {
        if let (Some(first), Some(last)) = (self.transitions.front(), self.transitions.back()) {
            let duration = last.timestamp.signed_duration_since(first.timestamp);
            duration.to_std().ok()
        } else {
            None
        }
    }

    /// Most recent transition.
    pub fn last(&self) -> Option<&StateTransition> {
        self.transitions.back()
    }

    /// Transitions, oldest first.
    pub fn transitions(&self) -> impl Iterator<Item = &StateTransition> {
        self.transitions.iter()
    }

    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }
}
