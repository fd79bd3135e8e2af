//! Lifecycle hooks compared by identity.

use std::fmt;
use std::rc::Rc;

/// A zero-argument lifecycle callback.
///
/// Two hooks are equal only when they share the same allocation, so
/// re-registering a declaration with clones of the same hooks is recognized
/// as unchanged while a freshly built closure is not.
///
/// # Example
///
/// ```rust
/// use hashstate::registry::Hook;
///
/// let hook = Hook::new(|| println!("entered"));
/// assert_eq!(hook, hook.clone());
/// assert_ne!(hook, Hook::new(|| println!("entered")));
/// ```
#[derive(Clone)]
pub struct Hook(Rc<dyn Fn()>);

impl Hook {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn() + 'static,
    {
        Self(Rc::new(f))
    }

    pub fn call(&self) {
        (self.0)()
    }

    fn addr(&self) -> *const () {
        Rc::as_ptr(&self.0) as *const ()
    }
}

impl PartialEq for Hook {
    fn eq(&self, other: &Self) -> bool {
        self.addr() == other.addr()
    }
}

impl Eq for Hook {}

impl fmt::Debug for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hook({:p})", self.addr())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn call_runs_the_closure() {
        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        let hook = Hook::new(move || c.set(c.get() + 1));

        hook.call();
        hook.call();

        assert_eq!(count.get(), 2);
    }

    #[test]
    fn clones_are_equal() {
        let hook = Hook::new(|| {});
        assert_eq!(hook, hook.clone());
    }

    #[test]
    fn distinct_closures_differ() {
        let count = Rc::new(Cell::new(0));
        let a = count.clone();
        let b = count.clone();
        assert_ne!(Hook::new(move || a.set(1)), Hook::new(move || b.set(1)));
    }
}
