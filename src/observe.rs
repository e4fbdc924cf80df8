use std::fmt;

/// Something with readable keys whose changes can be subscribed to.
pub trait AttributeSource {
    /// Current value of `key`, if set.
    fn read(&self, key: &str) -> Option<String>;

    /// Calls `on_change` after `key` changes. Notifications for other keys
    /// are never delivered to this subscriber.
    fn subscribe(&self, key: &str, on_change: Box<dyn Fn()>) -> Subscription;
}

/// Scoped registration. Released exactly once, on [`Subscription::release`]
/// or on drop, whichever comes first.
pub struct Subscription {
    release: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub fn new(release: impl FnOnce() + 'static) -> Self {
        Self {
            release: Some(Box::new(release)),
        }
    }

    /// A guard for an observation that was never established.
    pub fn inert() -> Self {
        Self { release: None }
    }

    pub fn is_active(&self) -> bool {
        self.release.is_some()
    }

    pub fn release(mut self) {
        self.release_now();
    }

    fn release_now(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release_now();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.is_active())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;

    #[test]
    fn releases_once_on_drop() {
        let released = Rc::new(Cell::new(0));
        {
            let r = released.clone();
            let sub = Subscription::new(move || r.set(r.get() + 1));
            assert!(sub.is_active());
        }
        assert_eq!(released.get(), 1);
    }

    #[test]
    fn inert_guard_is_not_active() {
        let sub = Subscription::inert();
        assert!(!sub.is_active());
        sub.release();
    }

    #[test]
    fn explicit_release_does_not_double_release() {
        let released = Rc::new(Cell::new(0));
        let r = released.clone();
        let sub = Subscription::new(move || r.set(r.get() + 1));
        sub.release();
        assert_eq!(released.get(), 1);
    }
}
