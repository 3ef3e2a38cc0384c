//! The perception-to-actuation control loop.
//!
//! One synchronous loop pulls a frame, classifies it, conditionally issues a
//! motor command, checks the cooperative stop flag, and repeats. The actuator
//! is mutated by this loop alone; any future second thread must route its
//! commands through the loop's owner.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use anyhow::Result;

use crate::camera::FrameSource;
use crate::detect::GreenSignalDetector;
use crate::frame::Frame;
use crate::motor::MotorActuator;

/// Default cruise speed commanded when the signal appears.
pub const DEFAULT_CRUISE_SPEED: f64 = 0.5;
/// Default per-iteration pacing delay.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Loop state. Created once at startup; mutated only by `DriveLoop`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DriveState {
    /// Classifying every frame, motors idle.
    WaitingForSignal,
    /// Cruising; per-frame work delegated to the `MovingBehavior` hook.
    Moving,
}

/// Per-frame hook while the rover is moving.
///
/// The extension point for lane-following and obstacle avoidance: implement
/// this and the loop structure stays untouched. An error aborts the run
/// through the normal cleanup path.
pub trait MovingBehavior {
    fn on_frame(&mut self, frame: &Frame, actuator: &mut MotorActuator) -> Result<()>;
}

/// Default behavior: keep cruising.
pub struct Idle;

impl MovingBehavior for Idle {
    fn on_frame(&mut self, _frame: &Frame, _actuator: &mut MotorActuator) -> Result<()> {
        Ok(())
    }
}

/// Orchestrates detector and actuator over a frame source.
pub struct DriveLoop {
    detector: GreenSignalDetector,
    actuator: MotorActuator,
    behavior: Box<dyn MovingBehavior>,
    cruise_speed: f64,
    poll_interval: Duration,
    state: DriveState,
}

impl DriveLoop {
    pub fn new(detector: GreenSignalDetector, actuator: MotorActuator) -> Self {
        Self {
            detector,
            actuator,
            behavior: Box::new(Idle),
            cruise_speed: DEFAULT_CRUISE_SPEED,
            poll_interval: DEFAULT_POLL_INTERVAL,
            state: DriveState::WaitingForSignal,
        }
    }

    pub fn with_cruise_speed(mut self, speed: f64) -> Self {
        self.cruise_speed = speed;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_behavior(mut self, behavior: Box<dyn MovingBehavior>) -> Self {
        self.behavior = behavior;
        self
    }

    pub fn state(&self) -> DriveState {
        self.state
    }

    /// Process one frame according to the current state.
    ///
    /// The waiting-to-moving transition is edge-triggered by construction:
    /// entering `Moving` is the only place the forward command is issued, so
    /// N consecutive signal frames still produce exactly one command.
    pub fn step(&mut self, frame: &Frame) -> Result<()> {
        match self.state {
            DriveState::WaitingForSignal => {
                let result = self.detector.classify(frame);
                log::debug!(
                    "waiting: lit={} ratio={:.4} present={}",
                    result.lit_pixels,
                    result.lit_ratio,
                    result.signal_present
                );
                if result.signal_present {
                    log::info!(
                        "green signal detected (lit={} ratio={:.4}), moving at {:.2}",
                        result.lit_pixels,
                        result.lit_ratio,
                        self.cruise_speed
                    );
                    self.actuator.forward(self.cruise_speed);
                    self.state = DriveState::Moving;
                }
            }
            DriveState::Moving => {
                self.behavior.on_frame(frame, &mut self.actuator)?;
            }
        }
        Ok(())
    }

    /// Run until the stop flag is raised or the source fails.
    ///
    /// Cleanup is unconditional on every exit path, in this order: stop the
    /// motors, shut the actuator down, close the frame source. A failed frame
    /// read ends the run rather than being retried; the error comes back to
    /// the caller after cleanup.
    pub fn run(&mut self, source: &mut dyn FrameSource, stop: &AtomicBool) -> Result<()> {
        let result = self.run_inner(source, stop);
        self.actuator.stop();
        self.actuator.shutdown();
        source.close();
        if result.is_ok() {
            log::info!("drive loop finished in state {:?}", self.state);
        }
        result
    }

    fn run_inner(&mut self, source: &mut dyn FrameSource, stop: &AtomicBool) -> Result<()> {
        source.open()?;
        while !stop.load(Ordering::Relaxed) {
            let frame = source.read_frame()?;
            self.step(&frame)?;
            if !self.poll_interval.is_zero() {
                std::thread::sleep(self.poll_interval);
            }
        }
        log::info!("stop requested, leaving drive loop");
        Ok(())
    }
}
