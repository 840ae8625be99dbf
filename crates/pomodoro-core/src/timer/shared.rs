use std::sync::{Arc, Mutex, MutexGuard};

use super::clock::{Clock, SystemClock};
use super::controller::TimerController;
use super::session::SessionSnapshot;
use crate::error::TimerError;
use crate::events::Event;

/// A controller shared between the tick source and user actions.
///
/// Every call takes the lock for the whole operation, so a tick can never
/// observe a half-applied `start` or `reset`.
pub struct SharedController<C: Clock = SystemClock> {
    inner: Arc<Mutex<TimerController<C>>>,
}

impl<C: Clock> SharedController<C> {
    pub fn new(controller: TimerController<C>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(controller)),
        }
    }

    /// Run `f` with exclusive access to the controller.
    pub fn with<R>(&self, f: impl FnOnce(&mut TimerController<C>) -> R) -> R {
        let mut guard = self.lock();
        f(&mut *guard)
    }

    pub fn tick(&self) -> Option<Event> {
        self.lock().tick()
    }

    pub fn start(&self, minutes: f64) -> Result<Event, TimerError> {
        self.lock().start(minutes)
    }

    pub fn reset(&self) -> Event {
        self.lock().reset()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.lock().snapshot()
    }

    fn lock(&self) -> MutexGuard<'_, TimerController<C>> {
        // Operations never panic mid-update, so a poisoned lock still
        // holds a consistent session.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl<C: Clock> Clone for SharedController<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::{ManualClock, Presets};

    #[test]
    fn clones_share_one_session() {
        let clock = ManualClock::default();
        let shared = SharedController::new(TimerController::with_clock(
            clock.clone(),
            Presets::default(),
        ));
        let other = shared.clone();

        shared.start(2.0).unwrap();
        clock.advance_secs(30);
        other.tick();

        let snap = shared.snapshot();
        assert!(snap.is_active);
        assert_eq!(snap.display, "1:30");
        assert_eq!(shared.with(|c| c.session().configured_minutes()), 2);

        other.reset();
        assert!(!shared.snapshot().is_active);
    }

    #[test]
    fn ticks_from_other_threads_are_serialized() {
        let clock = ManualClock::default();
        let shared = SharedController::new(TimerController::with_clock(
            clock.clone(),
            Presets::default(),
        ));
        shared.start(1.0).unwrap();
        clock.advance_secs(61);

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let s = shared.clone();
                std::thread::spawn(move || s.tick().is_some())
            })
            .collect();
        let expiries = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|expired| *expired)
            .count();
        assert_eq!(expiries, 1);
        assert!(shared.snapshot().alert_pending);
    }
}
