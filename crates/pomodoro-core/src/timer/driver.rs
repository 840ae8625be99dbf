//! Periodic tick source for hosts running on tokio.

use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::debug;

use super::clock::Clock;
use super::session::SessionSnapshot;
use super::shared::SharedController;
use crate::events::Event;

/// Default period between ticks.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Calls `tick()` on a shared controller once per period until shut down.
pub struct TickDriver<C: Clock> {
    shared: SharedController<C>,
    period: Duration,
}

impl<C: Clock + 'static> TickDriver<C> {
    pub fn new(shared: SharedController<C>, period: Duration) -> Self {
        Self {
            shared,
            period: period.max(Duration::from_millis(1)),
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Tick until `shutdown` carries `true` or its sender is dropped.
    ///
    /// `on_tick` sees the expiry event (if this tick produced one) and the
    /// session as it stands after the tick.
    pub async fn run<F>(self, mut shutdown: watch::Receiver<bool>, mut on_tick: F)
    where
        F: FnMut(Option<&Event>, &SessionSnapshot),
    {
        let mut interval = tokio::time::interval(self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    let (event, snapshot) = self.shared.with(|c| (c.tick(), c.snapshot()));
                    on_tick(event.as_ref(), &snapshot);
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        debug!("tick driver stopping");
                        break;
                    }
                }
            }
        }
    }

    pub fn spawn<F>(self, shutdown: watch::Receiver<bool>, on_tick: F) -> JoinHandle<()>
    where
        F: FnMut(Option<&Event>, &SessionSnapshot) + Send + 'static,
    {
        tokio::spawn(self.run(shutdown, on_tick))
    }
}
