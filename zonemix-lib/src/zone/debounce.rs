//! Stay-time debounce for trigger-activated zones.

/// What a listener exit should do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitAction {
    /// Nothing to do, the zone never activated.
    Ignore,
    /// Switch back right away.
    Immediate,
    /// A switch-back has been scheduled.
    Deferred,
}

/// Tracks how long a listener has stayed inside a local zone.
///
/// A zone activates once the listener accumulated `delay` seconds inside it.
/// Leaving schedules a switch-back `delay` seconds later, which is dropped if
/// the listener came back in the meantime.
#[derive(Debug, Clone, PartialEq)]
pub struct StayDebounce {
    delay: f32,
    stay_time: f32,
    last_enter: f32,
    switch_attempted: bool,
    pending_exit: Option<f32>,
}

impl StayDebounce {
    pub fn new(delay: f32) -> Self {
        Self {
            delay: delay.max(0.0),
            stay_time: 0.0,
            last_enter: f32::NEG_INFINITY,
            switch_attempted: false,
            pending_exit: None,
        }
    }

    pub fn delay(&self) -> f32 {
        self.delay
    }

    pub fn stay_time(&self) -> f32 {
        self.stay_time
    }

    pub fn pending_exit(&self) -> Option<f32> {
        self.pending_exit
    }

    /// Listener entered at `now`. Returns true when the zone should switch in
    /// immediately.
    pub fn enter(&mut self, now: f32) -> bool {
        self.last_enter = now;
        if self.delay > 0.0 {
            self.switch_attempted = false;
            self.stay_time = 0.0;
            return false;
        }
        true
    }

    /// Listener stayed inside for another `dt` seconds. Returns true exactly
    /// once per visit, when the stay delay has been reached.
    pub fn stay(&mut self, dt: f32, active: bool) -> bool {
        if active || self.delay <= 0.0 {
            return false;
        }
        self.stay_time += dt.max(0.0);
        if self.stay_time >= self.delay && !self.switch_attempted {
            self.switch_attempted = true;
            return true;
        }
        false
    }

    /// Listener left at `now`.
    pub fn exit(&mut self, now: f32, active: bool) -> ExitAction {
        if !active {
            return ExitAction::Ignore;
        }
        self.stay_time = 0.0;
        if self.delay > 0.0 {
            self.pending_exit = Some(now + self.delay);
            return ExitAction::Deferred;
        }
        ExitAction::Immediate
    }

    /// Poll the scheduled switch-back. Returns true when it fires at `now` and
    /// the listener did not re-enter within the delay window.
    pub fn fire(&mut self, now: f32) -> bool {
        match self.pending_exit {
            Some(at) if now >= at => {
                self.pending_exit = None;
                now >= self.last_enter + self.delay
            }
            _ => false,
        }
    }
}
