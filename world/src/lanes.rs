use raindrop_core::{LaneIndex, PlayAreaGeometry};

use crate::{
    timers::{TimerId, TimerScheduler, TimerState},
    TimerEvent,
};

/// Tracks which lanes accept spawns and owns one cooldown timer per lane.
#[derive(Debug)]
pub(crate) struct LaneScheduler {
    cooldowns: Vec<TimerId>,
    lane_count: usize,
    available: Vec<LaneIndex>,
}

impl LaneScheduler {
    pub(crate) fn new(geometry: &PlayAreaGeometry, timers: &mut TimerScheduler<TimerEvent>) -> Self {
        let mut lanes = Self {
            cooldowns: Vec::new(),
            lane_count: 0,
            available: Vec::new(),
        };
        lanes.configure(geometry, timers);
        lanes
    }

    /// Rebuilds the lane set for new geometry, cancelling every cooldown.
    ///
    /// Keeps exactly one cooldown timer per lane; timers of dropped lanes are
    /// stopped before their handles are discarded.
    pub(crate) fn configure(
        &mut self,
        geometry: &PlayAreaGeometry,
        timers: &mut TimerScheduler<TimerEvent>,
    ) {
        self.lane_count = geometry.lane_count() as usize;
        let keep = self.lane_count.min(self.cooldowns.len());
        for timer in self.cooldowns.drain(keep..) {
            let _ = timers.stop(timer);
        }
        while self.cooldowns.len() < self.lane_count {
            self.cooldowns.push(timers.create());
        }
        self.reset(timers);
    }

    /// Cancels every cooldown and marks all lanes available.
    pub(crate) fn reset(&mut self, timers: &mut TimerScheduler<TimerEvent>) {
        for timer in &self.cooldowns {
            let _ = timers.stop(*timer);
        }
        self.available.clear();
        self.available
            .extend((0..self.lane_count as u32).map(LaneIndex::new));
    }

    pub(crate) fn lane_count(&self) -> usize {
        self.lane_count
    }

    /// Lanes accepting spawns, in ascending order.
    pub(crate) fn available(&self) -> &[LaneIndex] {
        &self.available
    }

    pub(crate) fn is_available(
        &self,
        lane: LaneIndex,
        timers: &TimerScheduler<TimerEvent>,
    ) -> bool {
        self.cooldown(lane)
            .is_some_and(|timer| timers.state(timer) != TimerState::Running)
    }

    /// Removes the lane from the available set until `release_after` seconds elapse.
    pub(crate) fn occupy(
        &mut self,
        lane: LaneIndex,
        release_after: f32,
        timers: &mut TimerScheduler<TimerEvent>,
    ) -> bool {
        let Some(timer) = self.cooldown(lane) else {
            return false;
        };
        if !timers.start(timer, release_after, TimerEvent::LaneReleased(lane)) {
            return false;
        }
        self.available.retain(|available| *available != lane);
        true
    }

    /// Returns a lane to the available set once its cooldown has fired.
    pub(crate) fn release(&mut self, lane: LaneIndex) {
        if lane.get() as usize >= self.lane_count {
            return;
        }
        if let Err(position) = self.available.binary_search(&lane) {
            self.available.insert(position, lane);
        }
    }

    fn cooldown(&self, lane: LaneIndex) -> Option<TimerId> {
        let index = lane.get() as usize;
        if index >= self.lane_count {
            return None;
        }
        self.cooldowns.get(index).copied()
    }
}
