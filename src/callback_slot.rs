use std::cell::RefCell;
use std::rc::Rc;

/// Shared holder for a callback that re-arms itself (requestAnimationFrame).
///
/// The callback keeps a clone of its own slot, which forms a reference cycle;
/// `release` empties the slot and breaks it. Release must not run from inside
/// the callback itself.
pub struct CallbackSlot<C>(Rc<RefCell<Option<C>>>);

impl<C> Clone for CallbackSlot<C> {
    fn clone(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}

impl<C> Default for CallbackSlot<C> {
    fn default() -> Self {
        Self(Rc::new(RefCell::new(None)))
    }
}

impl<C> CallbackSlot<C> {
    pub fn fill(&self, callback: C) {
        *self.0.borrow_mut() = Some(callback);
    }

    /// Run `f` on the stored callback; `None` once released.
    pub fn with<R>(&self, f: impl FnOnce(&C) -> R) -> Option<R> {
        self.0.borrow().as_ref().map(f)
    }

    pub fn release(&self) -> Option<C> {
        self.0.borrow_mut().take()
    }
}
