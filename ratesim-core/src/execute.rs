use crate::{SimTime, Simulation};
use std::time::Duration;

/// Real-time length of one frame when no wall clock drives the simulation (60 fps).
pub const DEFAULT_FRAME: Duration = Duration::from_nanos(16_666_667);

/// Simulation execution trait.
pub trait Execute {
    /// Executes the simulation until some stopping condition is reached.
    /// The condition is implementation-specific.
    fn execute(self, sim: &mut Simulation);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EndCondition {
    Time(SimTime),
    Frames(usize),
    Requests(u64),
}

/// Executor feeds fixed-size real-time frames to a [`Simulation`], standing
/// in for a UI's animation loop.
///
/// A paused simulation is never advanced, so executing one returns at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Executor {
    end_condition: EndCondition,
    frame: Duration,
}

impl Executor {
    /// Run until virtual time reaches `time`.
    #[must_use]
    pub fn timed(time: SimTime) -> Self {
        Self::with_end(EndCondition::Time(time))
    }

    /// Run exactly this many frames.
    #[must_use]
    pub fn frames(frames: usize) -> Self {
        Self::with_end(EndCondition::Frames(frames))
    }

    /// Run until at least this many requests were processed.
    #[must_use]
    pub fn requests(requests: u64) -> Self {
        Self::with_end(EndCondition::Requests(requests))
    }

    fn with_end(end_condition: EndCondition) -> Self {
        Self {
            end_condition,
            frame: DEFAULT_FRAME,
        }
    }

    /// Real-time length of each frame. Zero is bumped to one microsecond.
    #[must_use]
    pub fn frame(mut self, frame: Duration) -> Self {
        self.frame = frame.max(Duration::from_micros(1));
        self
    }

    /// Registers a side effect that is called _after_ each frame.
    #[must_use]
    pub fn side_effect<F>(self, func: F) -> ExecutorWithSideEffect<F>
    where
        F: FnMut(&Simulation),
    {
        ExecutorWithSideEffect {
            executor: self,
            side_effect: func,
        }
    }
}

impl Execute for Executor {
    fn execute(self, sim: &mut Simulation) {
        run_with(sim, self, |_| {});
    }
}

pub struct ExecutorWithSideEffect<F>
where
    F: FnMut(&Simulation),
{
    executor: Executor,
    side_effect: F,
}

impl<F> Execute for ExecutorWithSideEffect<F>
where
    F: FnMut(&Simulation),
{
    fn execute(self, sim: &mut Simulation) {
        run_with(sim, self.executor, self.side_effect);
    }
}

fn run_with<F>(sim: &mut Simulation, executor: Executor, mut side_effect: F)
where
    F: FnMut(&Simulation),
{
    let mut frames = 0usize;
    let mut requests = 0u64;

    loop {
        let done = match executor.end_condition {
            EndCondition::Time(time) => sim.time() >= time,
            EndCondition::Frames(limit) => frames >= limit,
            EndCondition::Requests(limit) => requests >= limit,
        };
        if done || !sim.time_config().is_playing {
            break;
        }

        requests += sim.advance(executor.frame) as u64;
        frames += 1;
        side_effect(sim);
    }
}
