//! State declarations.

use super::hook::Hook;
use std::fmt;
use std::rc::Rc;

/// Everything a machine knows about one named state.
///
/// The content is opaque to the engine: it is handed back to the caller while
/// the state is active. The optional allow-list is exhaustive for transitions
/// out of this state; without one any transition is allowed.
///
/// # Example
///
/// ```rust
/// use hashstate::registry::StateDeclaration;
///
/// let step1 = StateDeclaration::new("Step 1 form")
///     .on_enter(|| println!("entered step 1"))
///     .transitions(["step2"]);
///
/// assert!(step1.allows("step2"));
/// assert!(!step1.allows("step3"));
/// ```
pub struct StateDeclaration<C> {
    content: Rc<C>,
    on_enter: Option<Hook>,
    on_exit: Option<Hook>,
    transitions: Option<Vec<String>>,
}

impl<C> StateDeclaration<C> {
    pub fn new(content: C) -> Self {
        Self {
            content: Rc::new(content),
            on_enter: None,
            on_exit: None,
            transitions: None,
        }
    }

    /// Run `f` whenever this state becomes active.
    pub fn on_enter<F>(self, f: F) -> Self
    where
        F: Fn() + 'static,
    {
        self.enter_hook(Hook::new(f))
    }

    /// Run `f` whenever this state stops being active.
    pub fn on_exit<F>(self, f: F) -> Self
    where
        F: Fn() + 'static,
    {
        self.exit_hook(Hook::new(f))
    }

    /// Use an existing hook for entering, keeping its identity.
    pub fn enter_hook(mut self, hook: Hook) -> Self {
        self.on_enter = Some(hook);
        self
    }

    /// Use an existing hook for exiting, keeping its identity.
    pub fn exit_hook(mut self, hook: Hook) -> Self {
        self.on_exit = Some(hook);
        self
    }

    /// Restrict transitions out of this state to `targets`.
    pub fn transitions<I, S>(mut self, targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.transitions = Some(
            targets
                .into_iter()
                .map(|t| t.as_ref().to_string())
                .collect(),
        );
        self
    }

    pub fn content(&self) -> &C {
        &self.content
    }

    /// Shared handle to the content, usable after the declaration is gone.
    pub fn shared_content(&self) -> Rc<C> {
        Rc::clone(&self.content)
    }

    pub fn entered(&self) -> Option<&Hook> {
        self.on_enter.as_ref()
    }

    pub fn exited(&self) -> Option<&Hook> {
        self.on_exit.as_ref()
    }

    /// The declared allow-list, if any.
    pub fn allowed_transitions(&self) -> Option<&[String]> {
        self.transitions.as_deref()
    }

    /// Whether leaving this state for `target` is legal.
    pub fn allows(&self, target: &str) -> bool {
        match &self.transitions {
            Some(allowed) => allowed.iter().any(|t| t == target),
            None => true,
        }
    }

    /// Hooks (by identity) and allow-list match. Content is not compared.
    pub fn same_behavior(&self, other: &Self) -> bool {
        self.on_enter == other.on_enter
            && self.on_exit == other.on_exit
            && self.transitions == other.transitions
    }
}

impl<C> Clone for StateDeclaration<C> {
    fn clone(&self) -> Self {
        Self {
            content: Rc::clone(&self.content),
            on_enter: self.on_enter.clone(),
            on_exit: self.on_exit.clone(),
            transitions: self.transitions.clone(),
        }
    }
}

impl<C: Default> Default for StateDeclaration<C> {
    fn default() -> Self {
        Self::new(C::default())
    }
}

impl<C: fmt::Debug> fmt::Debug for StateDeclaration<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateDeclaration")
            .field("content", &self.content)
            .field("on_enter", &self.on_enter)
            .field("on_exit", &self.on_exit)
            .field("transitions", &self.transitions)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn without_allow_list_everything_is_allowed() {
        let decl = StateDeclaration::new(());
        assert!(decl.allowed_transitions().is_none());
        assert!(decl.allows("anything"));
    }

    #[test]
    fn allow_list_is_exhaustive() {
        let decl = StateDeclaration::new(()).transitions(["page2"]);

        assert_eq!(decl.allowed_transitions(), Some(&["page2".to_string()][..]));
        assert!(decl.allows("page2"));
        assert!(!decl.allows("page3"));
    }

    #[test]
    fn empty_allow_list_blocks_everything() {
        let decl = StateDeclaration::new(()).transitions(Vec::<String>::new());
        assert!(!decl.allows("page2"));
    }

    #[test]
    fn same_behavior_compares_hook_identity() {
        let hook = Hook::new(|| {});
        let a = StateDeclaration::new(1).enter_hook(hook.clone());
        let b = StateDeclaration::new(2).enter_hook(hook);
        let c = StateDeclaration::new(1).on_enter(|| {});

        assert!(a.same_behavior(&b));
        assert!(!a.same_behavior(&c));
    }

    #[test]
    fn same_behavior_compares_allow_list() {
        let a = StateDeclaration::new(()).transitions(["x"]);
        let b = StateDeclaration::new(()).transitions(["x"]);
        let c = StateDeclaration::new(()).transitions(["y"]);

        assert!(a.same_behavior(&b));
        assert!(!a.same_behavior(&c));
        assert!(!a.same_behavior(&StateDeclaration::new(())));
    }
}
