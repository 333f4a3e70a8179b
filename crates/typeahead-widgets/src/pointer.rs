#![forbid(unsafe_code)]

//! Document-level pointer observation.
//!
//! "Click outside closes the list" needs a pointer-down signal from the whole
//! screen, not just the widget. [`PointerHub`] is that capability: the host
//! owns one hub, feeds it every pointer-down, and each widget holds a
//! [`PointerRegistration`] that receives them. Dropping the registration
//! unregisters it.

use std::sync::mpsc;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// A pointer-down somewhere on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerDown {
    /// Column of the pointer.
    pub x: u16,
    /// Row of the pointer.
    pub y: u16,
}

impl PointerDown {
    /// Create a pointer-down at `(x, y)`.
    #[must_use]
    pub const fn new(x: u16, y: u16) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Default)]
struct HubInner {
    next_id: u64,
    subscribers: Vec<(u64, mpsc::Sender<PointerDown>)>,
}

/// Shared fan-out point for document-level pointer-downs.
///
/// Cloning yields another handle to the same hub.
#[derive(Debug, Clone, Default)]
pub struct PointerHub {
    inner: Arc<Mutex<HubInner>>,
}

impl PointerHub {
    /// Create a hub with no registrations.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HubInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a listener. Pointer-downs dispatched after this call queue on
    /// the returned registration until it is dropped.
    #[must_use]
    pub fn register(&self) -> PointerRegistration {
        let (sender, receiver) = mpsc::channel();
        let mut inner = self.lock();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.subscribers.push((id, sender));
        PointerRegistration {
            id,
            hub: self.clone(),
            receiver,
        }
    }

    /// Deliver a pointer-down to every registration.
    pub fn dispatch_pointer_down(&self, down: PointerDown) {
        let mut inner = self.lock();
        inner
            .subscribers
            .retain(|(_, sender)| sender.send(down).is_ok());
    }

    /// Number of live registrations.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.lock().subscribers.len()
    }

    fn unregister(&self, id: u64) {
        self.lock().subscribers.retain(|(sid, _)| *sid != id);
    }
}

/// A widget's registration on a [`PointerHub`]. Unregisters on drop.
#[derive(Debug)]
pub struct PointerRegistration {
    id: u64,
    hub: PointerHub,
    receiver: mpsc::Receiver<PointerDown>,
}

impl PointerRegistration {
    /// Next queued pointer-down, if any.
    pub fn try_next(&self) -> Option<PointerDown> {
        self.receiver.try_recv().ok()
    }
}

impl Drop for PointerRegistration {
    fn drop(&mut self) {
        self.hub.unregister(self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatch_reaches_every_registration() {
        let hub = PointerHub::new();
        let a = hub.register();
        let b = hub.register();
        hub.dispatch_pointer_down(PointerDown::new(3, 4));
        assert_eq!(a.try_next(), Some(PointerDown::new(3, 4)));
        assert_eq!(b.try_next(), Some(PointerDown::new(3, 4)));
        assert_eq!(a.try_next(), None);
    }

    #[test]
    fn drop_unregisters() {
        let hub = PointerHub::new();
        let a = hub.register();
        {
            let _b = hub.register();
            assert_eq!(hub.listener_count(), 2);
        }
        assert_eq!(hub.listener_count(), 1);
        drop(a);
        assert_eq!(hub.listener_count(), 0);
        hub.dispatch_pointer_down(PointerDown::new(0, 0));
    }

    #[test]
    fn registration_sees_only_later_dispatches() {
        let hub = PointerHub::new();
        hub.dispatch_pointer_down(PointerDown::new(1, 1));
        let a = hub.register();
        assert_eq!(a.try_next(), None);
    }

    #[test]
    fn clones_share_state() {
        let hub = PointerHub::new();
        let other = hub.clone();
        let reg = other.register();
        hub.dispatch_pointer_down(PointerDown::new(9, 9));
        assert_eq!(reg.try_next(), Some(PointerDown::new(9, 9)));
    }
}
