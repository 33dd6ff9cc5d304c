//! Contextual values handed down to screens.

use std::any::Any;
use std::fmt;
use std::rc::Rc;

use super::dismiss::DismissAction;

struct Entry {
    parent: Option<Rc<Entry>>,
    value: Rc<dyn Any>,
}

/// Immutable chain of typed values. [`Environment::with`] returns a child
/// that sees its own value first and everything its ancestors hold after.
#[derive(Clone, Default)]
pub struct Environment {
    head: Option<Rc<Entry>>,
}

impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Environment")
            .field("values", &self.len())
            .finish()
    }
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Child environment holding `value` on top of this one.
    pub fn with<T: Any>(&self, value: T) -> Self {
        Self {
            head: Some(Rc::new(Entry {
                parent: self.head.clone(),
                value: Rc::new(value),
            })),
        }
    }

    /// Nearest value of type `T`.
    pub fn get<T: Any>(&self) -> Option<&T> {
        let mut entry = self.head.as_deref();
        while let Some(current) = entry {
            if let Some(value) = current.value.downcast_ref::<T>() {
                return Some(value);
            }
            entry = current.parent.as_deref();
        }
        None
    }

    pub fn len(&self) -> usize {
        let mut count = 0;
        let mut entry = self.head.as_deref();
        while let Some(current) = entry {
            count += 1;
            entry = current.parent.as_deref();
        }
        count
    }

    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    pub fn dismiss_action(&self) -> Option<DismissAction> {
        self.get::<DismissAction>().cloned()
    }

    /// Run the dismissal trigger, if one is reachable. Returns whether it was.
    pub fn dismiss(&self) -> bool {
        match self.dismiss_action() {
            Some(action) => {
                action.call();
                true
            }
            None => false,
        }
    }
}
