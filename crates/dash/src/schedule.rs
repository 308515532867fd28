use bevy::prelude::*;

/// Identifies a deferred action so it can be cancelled before it fires.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ScheduleHandle(u64);

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Deadline {
    /// Seconds of presentation time.
    Seconds(f32),
    /// Physics tick boundaries.
    PhysicsTicks(u32),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DeferredAction {
    EndCameraZoom,
    EnforceMinimumSpeed { direction: Dir3, floor: f32 },
}

#[derive(Clone, Debug)]
struct Entry {
    handle: ScheduleHandle,
    deadline: Deadline,
    action: DeferredAction,
}

/// Per-actor list of actions waiting on a deadline.
///
/// Presentation deadlines advance with [`DashScheduler::advance_time`], physics deadlines with
/// [`DashScheduler::advance_physics_tick`]. Due actions come back in scheduling order.
#[derive(Clone, Debug, Default)]
pub struct DashScheduler {
    next_handle: u64,
    entries: Vec<Entry>,
}

impl DashScheduler {
    pub fn schedule(&mut self, deadline: Deadline, action: DeferredAction) -> ScheduleHandle {
        let handle = ScheduleHandle(self.next_handle);
        self.next_handle += 1;
        self.entries.push(Entry {
            handle,
            deadline,
            action,
        });
        handle
    }

    /// Returns `false` if the action already fired or was cancelled.
    pub fn cancel(&mut self, handle: ScheduleHandle) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.handle != handle);
        self.entries.len() != before
    }

    /// Pushes a pending [`Deadline::Seconds`] entry back by `seconds`. Returns `false` if the
    /// handle is not pending or waits on physics ticks.
    pub fn postpone(&mut self, handle: ScheduleHandle, seconds: f32) -> bool {
        let Some(entry) = self.entries.iter_mut().find(|entry| entry.handle == handle) else {
            return false;
        };
        match &mut entry.deadline {
            Deadline::Seconds(remaining) => {
                *remaining += seconds;
                true
            }
            Deadline::PhysicsTicks(_) => false,
        }
    }

    pub fn cancel_all(&mut self) -> Vec<DeferredAction> {
        self.entries.drain(..).map(|entry| entry.action).collect()
    }

    pub fn is_pending(&self, handle: ScheduleHandle) -> bool {
        self.entries.iter().any(|entry| entry.handle == handle)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn has_physics_work(&self) -> bool {
        self.entries
            .iter()
            .any(|entry| matches!(entry.deadline, Deadline::PhysicsTicks(_)))
    }

    pub fn advance_time(&mut self, dt: f32) -> Vec<DeferredAction> {
        self.take_due(|deadline| match deadline {
            Deadline::Seconds(remaining) => {
                *remaining -= dt;
                *remaining <= 0.0
            }
            Deadline::PhysicsTicks(_) => false,
        })
    }

    pub fn advance_physics_tick(&mut self) -> Vec<DeferredAction> {
        self.take_due(|deadline| match deadline {
            Deadline::PhysicsTicks(ticks) => {
                *ticks = ticks.saturating_sub(1);
                *ticks == 0
            }
            Deadline::Seconds(_) => false,
        })
    }

    fn take_due(&mut self, mut tick: impl FnMut(&mut Deadline) -> bool) -> Vec<DeferredAction> {
        let mut due = Vec::new();
        self.entries.retain_mut(|entry| {
            if tick(&mut entry.deadline) {
                due.push(entry.action);
                false
            } else {
                true
            }
        });
        due
    }
}
