use crate::timers::TIMER_PERIOD;
use std::time::Duration;

// Longest stretch of wall time a single `advance` will catch up on
pub const MAX_CATCH_UP: Duration = Duration::from_millis(250);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Step,
    Tick,
}

/// Fixed-timestep scheduler that reconciles the instruction clock with the
/// 60 Hz timer clock. Wall time goes in through `advance`, and the due
/// steps and ticks come out of `next_event` in virtual-time order.
#[derive(Debug, Clone)]
pub struct Clock {
    cycle_period: Duration,
    timer_period: Duration,
    now: Duration,
    next_step: Duration,
    next_tick: Duration,
}

impl Clock {
    pub fn new(cycle_period: Duration) -> Clock {
        Clock::with_timer_period(cycle_period, TIMER_PERIOD)
    }

    pub fn with_timer_period(cycle_period: Duration, timer_period: Duration) -> Clock {
        Clock {
            cycle_period,
            timer_period,
            now: Duration::ZERO,
            next_step: cycle_period,
            next_tick: timer_period,
        }
    }

    pub fn advance(&mut self, elapsed: Duration) {
        self.now += elapsed.min(MAX_CATCH_UP);
    }

    // Ties go to the timer so a step at the same instant sees the decremented value
    pub fn next_event(&mut self) -> Option<Event> {
        if self.next_tick <= self.now && self.next_tick <= self.next_step {
            self.next_tick += self.timer_period;
            Some(Event::Tick)
        } else if self.next_step <= self.now {
            self.next_step += self.cycle_period;
            Some(Event::Step)
        } else {
            None
        }
    }
}

impl Iterator for Clock {
    type Item = Event;

    fn next(&mut self) -> Option<Event> {
        self.next_event()
    }
}
