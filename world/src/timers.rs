//! Single-shot countdown timers driven by one cooperative scheduler.
//!
//! Timers are owned by the [`TimerScheduler`] and addressed through
//! [`TimerId`] handles. Expiry "callbacks" are plain values of type `T`
//! handed back to the caller of [`TimerScheduler::advance`]; the caller
//! dispatches them once the advance pass has completed, so a callback that
//! starts another timer can never be ticked within the same pass.

/// Lifecycle state of a timer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TimerState {
    /// Not scheduled; carries no callback.
    Stopped,
    /// Counting down on every scheduler advance.
    Running,
    /// Scheduled but frozen until unpaused.
    Paused,
    /// Expired and fired its callback.
    Finished,
}

/// Handle to a timer owned by a [`TimerScheduler`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u32);

impl TimerId {
    /// Retrieves the numeric representation of the handle.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

#[derive(Debug)]
struct Timer<T> {
    max_duration: f32,
    time_left: f32,
    state: TimerState,
    on_expire: Option<T>,
}

impl<T> Timer<T> {
    fn new() -> Self {
        Self {
            max_duration: 0.0,
            time_left: 0.0,
            state: TimerState::Stopped,
            on_expire: None,
        }
    }

    fn clear(&mut self, state: TimerState) {
        self.max_duration = 0.0;
        self.time_left = 0.0;
        self.state = state;
        self.on_expire = None;
    }
}

/// Owns every timer and advances the registered ones once per simulation tick.
#[derive(Debug)]
pub struct TimerScheduler<T> {
    timers: Vec<Timer<T>>,
    registered: Vec<TimerId>,
}

impl<T> TimerScheduler<T> {
    /// Creates an empty scheduler.
    #[must_use]
    pub fn new() -> Self {
        Self {
            timers: Vec::new(),
            registered: Vec::new(),
        }
    }

    /// Allocates a new timer in the `Stopped` state.
    pub fn create(&mut self) -> TimerId {
        let id = TimerId(self.timers.len() as u32);
        self.timers.push(Timer::new());
        id
    }

    /// Starts a stopped or finished timer, returning whether it was started.
    ///
    /// Starting a running or paused timer is a no-op so a timer is never
    /// registered twice.
    pub fn start(&mut self, id: TimerId, duration: f32, on_expire: T) -> bool {
        let Some(timer) = self.timers.get_mut(id.0 as usize) else {
            return false;
        };
        if !matches!(timer.state, TimerState::Stopped | TimerState::Finished) {
            return false;
        }

        timer.max_duration = duration;
        timer.time_left = duration;
        timer.state = TimerState::Running;
        timer.on_expire = Some(on_expire);
        self.registered.push(id);
        true
    }

    /// Cancels a running or paused timer and drops its callback.
    pub fn stop(&mut self, id: TimerId) -> bool {
        let Some(timer) = self.timers.get_mut(id.0 as usize) else {
            return false;
        };
        if !matches!(timer.state, TimerState::Running | TimerState::Paused) {
            return false;
        }

        timer.clear(TimerState::Stopped);
        self.registered.retain(|registered| *registered != id);
        true
    }

    /// Freezes a running timer.
    pub fn pause(&mut self, id: TimerId) -> bool {
        self.transition(id, TimerState::Running, TimerState::Paused)
    }

    /// Resumes a paused timer.
    pub fn unpause(&mut self, id: TimerId) -> bool {
        self.transition(id, TimerState::Paused, TimerState::Running)
    }

    /// Resets the remaining time to the full duration without changing state.
    ///
    /// A paused timer stays paused.
    pub fn restart(&mut self, id: TimerId) -> bool {
        let Some(timer) = self.timers.get_mut(id.0 as usize) else {
            return false;
        };
        if !matches!(timer.state, TimerState::Running | TimerState::Paused) {
            return false;
        }
        timer.time_left = timer.max_duration;
        true
    }

    /// Current state of the timer; unknown handles report `Stopped`.
    #[must_use]
    pub fn state(&self, id: TimerId) -> TimerState {
        self.timers
            .get(id.0 as usize)
            .map_or(TimerState::Stopped, |timer| timer.state)
    }

    /// Seconds left before the timer fires; zero unless running or paused.
    #[must_use]
    pub fn time_left(&self, id: TimerId) -> f32 {
        self.timers
            .get(id.0 as usize)
            .map_or(0.0, |timer| timer.time_left)
    }

    /// Number of timers currently registered for ticking.
    #[must_use]
    pub fn registered_len(&self) -> usize {
        self.registered.len()
    }

    /// Advances every running timer by `dt` seconds in registration order.
    ///
    /// Timers whose remaining time reaches zero move to `Finished`, are
    /// unregistered, and have their callback appended to `fired` exactly once.
    pub fn advance(&mut self, dt: f32, fired: &mut Vec<T>) {
        let mut expired = false;
        for id in &self.registered {
            let timer = &mut self.timers[id.0 as usize];
            if timer.state != TimerState::Running {
                continue;
            }

            timer.time_left -= dt;
            if timer.time_left <= 0.0 {
                if let Some(callback) = timer.on_expire.take() {
                    fired.push(callback);
                }
                timer.clear(TimerState::Finished);
                expired = true;
            }
        }

        if expired {
            let timers = &self.timers;
            self.registered
                .retain(|id| timers[id.0 as usize].state != TimerState::Finished);
        }
    }

    fn transition(&mut self, id: TimerId, from: TimerState, to: TimerState) -> bool {
        match self.timers.get_mut(id.0 as usize) {
            Some(timer) if timer.state == from => {
                timer.state = to;
                true
            }
            _ => false,
        }
    }
}

impl<T> Default for TimerScheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}
