use std::fmt;
use std::rc::Rc;

/// Cloneable dismissal trigger handed to presented content through its
/// [`Environment`](super::Environment).
#[derive(Clone)]
pub struct DismissAction(Rc<dyn Fn()>);

impl DismissAction {
    pub fn new(action: impl Fn() + 'static) -> Self {
        Self(Rc::new(action))
    }

    pub fn call(&self) {
        (self.0)()
    }
}

impl fmt::Debug for DismissAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DismissAction")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_clones_share_the_action() {
        let calls = Rc::new(Cell::new(0));
        let counter = calls.clone();
        let action = DismissAction::new(move || counter.set(counter.get() + 1));
        let copy = action.clone();

        action.call();
        copy.call();
        assert_eq!(calls.get(), 2);
    }
}
