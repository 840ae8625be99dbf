//! Timer session controller.
//!
//! The controller is a wall-clock-based state machine. It does not use
//! internal threads - the caller is responsible for calling `tick()`
//! periodically (nominally once per second).
//!
//! ## State Transitions
//!
//! ```text
//!            start               tick (diff <= 0)
//! Idle ---------------> Running -----------------> Idle + alert
//!  ^                       |                          |
//!  +------- reset ---------+      resolve_alert ------+--> Running
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut controller = TimerController::new();
//! controller.start(25.0)?;
//! // In a loop:
//! if let Some(Event::TimerExpired { .. }) = controller.tick() {
//!     controller.resolve_alert(AlertDecision::Accept)?;
//! }
//! ```

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info, warn};

use super::clock::{Clock, SystemClock};
use super::preset::{PresetMode, Presets};
use super::session::{Session, SessionSnapshot};
use super::transition::{next_block, AlertDecision, Phase};
use crate::error::TimerError;
use crate::events::Event;

/// Handle returned by [`TimerController::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Observer = Box<dyn Fn(&Event) + Send>;

/// Owns the session and applies every operation to it.
pub struct TimerController<C: Clock = SystemClock> {
    clock: C,
    presets: Presets,
    session: Session,
    observers: Vec<(SubscriptionId, Observer)>,
    next_subscription: u64,
}

impl TimerController<SystemClock> {
    /// Controller on wall-clock time with the default 25/5 and 50/10 presets.
    pub fn new() -> Self {
        Self::with_clock(SystemClock, Presets::default())
    }
}

impl Default for TimerController<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> TimerController<C> {
    pub fn with_clock(clock: C, presets: Presets) -> Self {
        Self::with_preset(clock, presets, PresetMode::Short)
    }

    /// Idle controller on `mode`, showing that preset's study length.
    pub fn with_preset(clock: C, presets: Presets, mode: PresetMode) -> Self {
        let mut session = Session::default();
        let study = u64::from(presets.study_minutes(mode)).max(1);
        session.preset_mode = mode;
        session.configured_minutes = study;
        session.last_started_minutes = study;
        session.total_duration_secs = study * 60;
        session.show_whole_minutes(study);
        Self {
            clock,
            presets,
            session,
            observers: Vec::new(),
            next_subscription: 0,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn presets(&self) -> &Presets {
        &self.presets
    }

    pub fn is_active(&self) -> bool {
        self.session.is_active
    }

    pub fn is_studying(&self) -> bool {
        self.session.is_studying
    }

    pub fn preset_mode(&self) -> PresetMode {
        self.session.preset_mode
    }

    pub fn remaining_fraction(&self) -> f64 {
        self.session.remaining_fraction
    }

    pub fn alert_pending(&self) -> bool {
        self.session.alert_pending
    }

    pub fn display(&self) -> String {
        self.session.display()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot::capture(&self.session, self.clock.now())
    }

    // ── Observers ────────────────────────────────────────────────────

    /// Register a callback invoked with every event, in subscription order.
    pub fn subscribe<F>(&mut self, observer: F) -> SubscriptionId
    where
        F: Fn(&Event) + Send + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(sid, _)| *sid != id);
        self.observers.len() != before
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Begin a countdown of `minutes`, rounded to whole minutes (at least one).
    ///
    /// Restarts the countdown if one is already running, and acknowledges
    /// any pending alert.
    pub fn start(&mut self, minutes: f64) -> Result<Event, TimerError> {
        let whole = whole_minutes(minutes)?;
        let now = self.clock.now();
        let end_at = end_after(now, whole).ok_or(TimerError::InvalidDuration { minutes })?;

        if self.session.alert_pending {
            debug!("start acknowledged a pending alert");
        }
        if self.session.is_active {
            debug!("restarting a running countdown");
        }

        let s = &mut self.session;
        s.alert_pending = false;
        s.total_duration_secs = whole.saturating_mul(60);
        s.end_at = Some(end_at);
        s.is_active = true;
        s.remaining_fraction = 1.0;
        s.configured_minutes = whole;
        s.last_started_minutes = whole;
        s.show_whole_minutes(whole);

        info!(
            minutes = whole,
            phase = ?s.phase(),
            preset = %s.preset_mode,
            "countdown started"
        );

        let event = Event::TimerStarted {
            minutes: whole,
            phase: s.phase(),
            preset: s.preset_mode,
            ends_at: end_at,
            at: now,
        };
        self.emit(&event);
        Ok(event)
    }

    /// Stop the countdown and show the duration of the last `start` again.
    ///
    /// Slider changes made since that start are discarded. Leaves the
    /// phase, preset and any pending alert untouched.
    pub fn reset(&mut self) -> Event {
        let s = &mut self.session;
        s.is_active = false;
        s.end_at = None;
        s.remaining_fraction = 0.0;
        let minutes = s.last_started_minutes;
        s.configured_minutes = minutes;
        s.show_whole_minutes(minutes);

        info!(minutes, "countdown reset");

        let event = Event::TimerReset {
            minutes,
            at: self.clock.now(),
        };
        self.emit(&event);
        event
    }

    /// Recompute derived display state. Returns `Some(Event::TimerExpired)`
    /// on the tick that observes expiry.
    pub fn tick(&mut self) -> Option<Event> {
        if !self.session.is_active {
            return None;
        }
        let end_at = self.session.end_at?;
        let now = self.clock.now();
        let diff = seconds_between(now, end_at);

        if diff <= 0.0 {
            let s = &mut self.session;
            s.is_active = false;
            s.end_at = None;
            s.display_minutes = 0;
            s.display_seconds = 0;
            s.remaining_fraction = 0.0;
            s.alert_pending = true;

            info!(phase = ?s.phase(), "countdown expired");

            let event = Event::TimerExpired {
                phase: s.phase(),
                preset: s.preset_mode,
                at: now,
            };
            self.emit(&event);
            return Some(event);
        }

        let s = &mut self.session;
        let total = s.total_duration_secs as f64;
        s.remaining_fraction = if total > 0.0 {
            (diff / total).clamp(0.0, 1.0)
        } else {
            0.0
        };
        s.display_minutes = (diff / 60.0).floor() as u64;
        s.display_seconds = (diff % 60.0).floor() as u64;

        debug!(
            display = %s.display(),
            fraction = s.remaining_fraction,
            "tick"
        );
        None
    }

    /// Acknowledge an expiry without starting anything. Returns whether an
    /// alert was pending.
    pub fn clear_alert(&mut self) -> bool {
        if !self.session.alert_pending {
            return false;
        }
        self.session.alert_pending = false;
        let event = Event::AlertCleared {
            at: self.clock.now(),
        };
        self.emit(&event);
        true
    }

    /// Answer the pending alert and start the chosen block.
    ///
    /// Emits `TransitionApplied` and returns the `TimerStarted` event of the
    /// new block.
    pub fn resolve_alert(&mut self, decision: AlertDecision) -> Result<Event, TimerError> {
        if !self.session.alert_pending {
            warn!(?decision, "alert response without a pending alert");
            return Err(TimerError::NoPendingAlert);
        }

        let from = self.session.phase();
        let next = next_block(from, decision, self.session.preset_mode, &self.presets);
        if next.minutes == 0 {
            return Err(TimerError::InvalidDuration { minutes: 0.0 });
        }

        self.session.alert_pending = false;
        self.session.is_studying = next.phase.is_studying();

        info!(?from, to = ?next.phase, ?decision, minutes = next.minutes, "transition applied");

        let event = Event::TransitionApplied {
            from,
            to: next.phase,
            decision,
            minutes: next.minutes,
            at: self.clock.now(),
        };
        self.emit(&event);
        self.start(f64::from(next.minutes))
    }

    pub fn select_preset(&mut self, mode: PresetMode) -> Event {
        self.session.preset_mode = mode;
        let event = Event::PresetChanged {
            preset: mode,
            at: self.clock.now(),
        };
        self.emit(&event);
        event
    }

    /// Select a preset and immediately start a block of `minutes`.
    pub fn start_with_preset(
        &mut self,
        mode: PresetMode,
        minutes: f64,
    ) -> Result<Event, TimerError> {
        whole_minutes(minutes)?;
        self.select_preset(mode);
        self.start(minutes)
    }

    /// Choose whether the next block is study or break. Only while idle.
    pub fn set_phase(&mut self, phase: Phase) -> Result<Event, TimerError> {
        if self.session.is_active {
            return Err(TimerError::SessionActive);
        }
        self.session.is_studying = phase.is_studying();
        let event = Event::PhaseChanged {
            phase,
            at: self.clock.now(),
        };
        self.emit(&event);
        Ok(event)
    }

    /// Slider feedback: set the duration shown while idle.
    ///
    /// Does not change what `reset` returns to.
    pub fn set_duration(&mut self, minutes: f64) -> Result<Event, TimerError> {
        if self.session.is_active {
            return Err(TimerError::SessionActive);
        }
        let whole = whole_minutes(minutes)?;
        self.session.configured_minutes = whole;
        self.session.show_whole_minutes(whole);
        let event = Event::DurationSelected {
            minutes: whole,
            at: self.clock.now(),
        };
        self.emit(&event);
        Ok(event)
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn emit(&self, event: &Event) {
        for (_, observer) in &self.observers {
            observer(event);
        }
    }
}

impl<C: Clock> std::fmt::Debug for TimerController<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimerController")
            .field("presets", &self.presets)
            .field("session", &self.session)
            .field("observers", &self.observers.len())
            .finish()
    }
}

fn whole_minutes(minutes: f64) -> Result<u64, TimerError> {
    if !minutes.is_finite() || minutes <= 0.0 {
        warn!(minutes, "rejected duration");
        return Err(TimerError::InvalidDuration { minutes });
    }
    Ok((minutes.round() as u64).max(1))
}

fn end_after(now: DateTime<Utc>, minutes: u64) -> Option<DateTime<Utc>> {
    let minutes = i64::try_from(minutes).ok()?;
    now.checked_add_signed(Duration::try_minutes(minutes)?)
}

/// Signed seconds from `now` until `end`, with millisecond resolution.
fn seconds_between(now: DateTime<Utc>, end: DateTime<Utc>) -> f64 {
    (end - now).num_milliseconds() as f64 / 1000.0
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::timer::clock::ManualClock;

    fn controller() -> (TimerController<ManualClock>, ManualClock) {
        let clock = ManualClock::default();
        (
            TimerController::with_clock(clock.clone(), Presets::default()),
            clock,
        )
    }

    #[test]
    fn start_sets_full_progress() {
        let (mut c, _) = controller();
        c.start(25.0).unwrap();
        assert!(c.is_active());
        assert_eq!(c.remaining_fraction(), 1.0);
        assert_eq!(c.session().total_duration_secs(), 1500);
        assert_eq!(c.display(), "25:00");
    }

    #[test]
    fn start_rejects_bad_durations() {
        let (mut c, _) = controller();
        for bad in [0.0, -1.0, f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            assert!(matches!(
                c.start(bad),
                Err(TimerError::InvalidDuration { .. })
            ));
        }
        assert!(!c.is_active());
    }

    #[test]
    fn start_rounds_to_whole_minutes() {
        let (mut c, _) = controller();
        c.start(24.6).unwrap();
        assert_eq!(c.session().configured_minutes(), 25);
        c.start(0.2).unwrap();
        assert_eq!(c.session().configured_minutes(), 1);
        assert_eq!(c.session().total_duration_secs(), 60);
    }

    #[test]
    fn start_rejects_unrepresentable_end() {
        let (mut c, _) = controller();
        assert!(c.start(1e300).is_err());
        assert!(!c.is_active());
    }

    #[test]
    fn tick_counts_down() {
        let (mut c, clock) = controller();
        c.start(5.0).unwrap();
        clock.advance_secs(53);
        assert!(c.tick().is_none());
        assert_eq!(c.display(), "4:07");
        assert_eq!(c.session().display_minutes(), 4);
        assert_eq!(c.session().display_seconds(), 7);
    }

    #[test]
    fn tick_while_idle_is_noop() {
        let (mut c, clock) = controller();
        clock.advance_secs(600);
        assert!(c.tick().is_none());
        assert_eq!(c.display(), "25:00");
        assert_eq!(c.remaining_fraction(), 1.0);
    }

    #[test]
    fn expiry_sets_alert_and_stops() {
        let (mut c, clock) = controller();
        c.start(1.0).unwrap();
        clock.advance_secs(60);
        let ev = c.tick();
        assert!(matches!(ev, Some(Event::TimerExpired { .. })));
        assert!(!c.is_active());
        assert!(c.alert_pending());
        assert_eq!(c.display(), "0:00");
        assert_eq!(c.remaining_fraction(), 0.0);
        assert!(c.session().end_at().is_none());
    }

    #[test]
    fn expiry_is_reported_once() {
        let (mut c, clock) = controller();
        c.start(1.0).unwrap();
        clock.advance_secs(61);
        assert!(c.tick().is_some());
        clock.advance_secs(5);
        assert!(c.tick().is_none());
        assert!(!c.is_active());
        assert_eq!(c.remaining_fraction(), 0.0);
    }

    #[test]
    fn restart_while_active_replaces_countdown() {
        let (mut c, clock) = controller();
        c.start(25.0).unwrap();
        clock.advance_secs(300);
        c.tick();
        c.start(10.0).unwrap();
        c.tick();
        assert_eq!(c.display(), "10:00");
        assert_eq!(c.remaining_fraction(), 1.0);
    }

    #[test]
    fn start_acknowledges_pending_alert() {
        let (mut c, clock) = controller();
        c.start(1.0).unwrap();
        clock.advance_secs(61);
        c.tick();
        assert!(c.alert_pending());
        c.start(3.0).unwrap();
        assert!(!c.alert_pending());
        assert!(c.is_active());
    }

    #[test]
    fn reset_restores_configured_minutes() {
        let (mut c, clock) = controller();
        c.start(40.0).unwrap();
        clock.advance_secs(125);
        c.tick();
        assert_eq!(c.display(), "37:55");
        c.reset();
        assert!(!c.is_active());
        assert_eq!(c.remaining_fraction(), 0.0);
        assert_eq!(c.display(), "40:00");
    }

    #[test]
    fn reset_ignores_slider_moves_after_start() {
        let (mut c, clock) = controller();
        c.start(25.0).unwrap();
        clock.advance_secs(1501);
        c.tick();
        c.clear_alert();
        c.set_duration(40.0).unwrap();
        assert_eq!(c.display(), "40:00");

        c.reset();
        assert_eq!(c.display(), "25:00");
        assert_eq!(c.session().configured_minutes(), 25);
        assert_eq!(c.session().last_started_minutes(), 25);
        assert_eq!(c.session().total_duration_secs(), 1500);
    }

    #[test]
    fn reset_before_any_start_shows_preset_study_length() {
        let (mut c, _) = controller();
        c.set_duration(45.0).unwrap();
        c.reset();
        assert_eq!(c.display(), "25:00");
    }

    #[test]
    fn with_preset_shows_that_study_length() {
        let mut c = TimerController::with_preset(
            ManualClock::default(),
            Presets::default(),
            PresetMode::Long,
        );
        assert_eq!(c.preset_mode(), PresetMode::Long);
        assert_eq!(c.display(), "50:00");
        c.reset();
        assert_eq!(c.display(), "50:00");
    }

    #[test]
    fn reset_keeps_alert_phase_and_preset() {
        let (mut c, clock) = controller();
        c.select_preset(PresetMode::Long);
        c.start(1.0).unwrap();
        clock.advance_secs(61);
        c.tick();
        c.reset();
        assert!(c.alert_pending());
        assert!(c.is_studying());
        assert_eq!(c.preset_mode(), PresetMode::Long);
    }

    #[test]
    fn clear_alert_is_explicit() {
        let (mut c, clock) = controller();
        assert!(!c.clear_alert());
        c.start(1.0).unwrap();
        clock.advance_secs(61);
        c.tick();
        assert!(c.clear_alert());
        assert!(!c.alert_pending());
        assert!(!c.clear_alert());
    }

    #[test]
    fn resolve_alert_requires_pending_alert() {
        let (mut c, _) = controller();
        assert_eq!(
            c.resolve_alert(AlertDecision::Accept),
            Err(TimerError::NoPendingAlert)
        );
    }

    #[test]
    fn accepting_break_after_study() {
        let (mut c, clock) = controller();
        c.start(25.0).unwrap();
        clock.advance_secs(25 * 60);
        c.tick();
        let ev = c.resolve_alert(AlertDecision::Accept).unwrap();
        assert!(matches!(ev, Event::TimerStarted { minutes: 5, phase: Phase::OnBreak, .. }));
        assert!(!c.is_studying());
        assert!(c.is_active());
        assert!(!c.alert_pending());
        assert_eq!(c.display(), "5:00");
    }

    #[test]
    fn declining_break_on_long_preset_restarts_study() {
        let (mut c, clock) = controller();
        c.select_preset(PresetMode::Long);
        c.start(50.0).unwrap();
        clock.advance_secs(50 * 60 + 1);
        c.tick();
        c.resolve_alert(AlertDecision::Decline).unwrap();
        assert!(c.is_studying());
        assert_eq!(c.session().configured_minutes(), 50);
    }

    #[test]
    fn break_over_accept_and_decline() {
        let (mut c, clock) = controller();
        c.set_phase(Phase::OnBreak).unwrap();
        c.start(5.0).unwrap();
        clock.advance_secs(301);
        c.tick();
        c.resolve_alert(AlertDecision::Decline).unwrap();
        assert!(!c.is_studying());
        assert_eq!(c.session().configured_minutes(), 5);

        clock.advance_secs(301);
        c.tick();
        c.resolve_alert(AlertDecision::Accept).unwrap();
        assert!(c.is_studying());
        assert_eq!(c.session().configured_minutes(), 25);
    }

    #[test]
    fn start_with_preset_selects_mode() {
        let (mut c, _) = controller();
        c.start_with_preset(PresetMode::Long, 60.0).unwrap();
        assert_eq!(c.preset_mode(), PresetMode::Long);
        assert_eq!(c.display(), "60:00");
    }

    #[test]
    fn start_with_preset_rejects_before_changing_mode() {
        let (mut c, _) = controller();
        assert!(c.start_with_preset(PresetMode::Long, 0.0).is_err());
        assert_eq!(c.preset_mode(), PresetMode::Short);
    }

    #[test]
    fn set_duration_updates_display_while_idle() {
        let (mut c, _) = controller();
        c.set_duration(42.0).unwrap();
        assert_eq!(c.display(), "42:00");
        assert_eq!(c.session().configured_minutes(), 42);
        c.start(42.0).unwrap();
        assert_eq!(c.set_duration(30.0), Err(TimerError::SessionActive));
        assert_eq!(c.set_phase(Phase::OnBreak), Err(TimerError::SessionActive));
    }

    #[test]
    fn observers_receive_events_in_order() {
        let (mut c, clock) = controller();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let id = c.subscribe(move |ev| {
            let name = match ev {
                Event::TimerStarted { .. } => "started",
                Event::TimerExpired { .. } => "expired",
                Event::TransitionApplied { .. } => "transition",
                _ => "other",
            };
            sink.lock().unwrap().push(name);
        });

        c.start(1.0).unwrap();
        clock.advance_secs(61);
        c.tick();
        c.resolve_alert(AlertDecision::Accept).unwrap();
        assert_eq!(
            *seen.lock().unwrap(),
            vec!["started", "expired", "transition", "started"]
        );

        assert!(c.unsubscribe(id));
        assert!(!c.unsubscribe(id));
        c.reset();
        assert_eq!(seen.lock().unwrap().len(), 4);
    }

    #[test]
    fn custom_presets_drive_initial_display() {
        let presets = Presets {
            short: crate::timer::PresetDurations {
                study_minutes: 30,
                break_minutes: 6,
            },
            ..Presets::default()
        };
        let c = TimerController::with_clock(ManualClock::default(), presets);
        assert_eq!(c.display(), "30:00");
    }
}
