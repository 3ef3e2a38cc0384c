//! Differential-drive actuator.
//!
//! A pure mapping from commanded speeds to hardware line states: per side,
//! one forward line, one backward line, one duty-cycle channel. Speeds are
//! clamped, never rejected; the only memory is the currently applied levels,
//! observable through the hardware alone.

use crate::motor::gpio::{DigitalOutput, PwmOutput};

/// The three output channels of one wheel.
pub struct WheelOutputs {
    pub forward: Box<dyn DigitalOutput>,
    pub backward: Box<dyn DigitalOutput>,
    pub throttle: Box<dyn PwmOutput>,
}

impl WheelOutputs {
    /// Apply one signed, clamped speed: sign picks the active direction line,
    /// magnitude becomes the duty cycle. Zero de-energizes both lines.
    fn apply(&mut self, speed: f64) {
        let speed = clamp_signed(speed);
        if speed > 0.0 {
            self.forward.set_level(true);
            self.backward.set_level(false);
            self.throttle.set_duty_cycle(speed);
        } else if speed < 0.0 {
            self.forward.set_level(false);
            self.backward.set_level(true);
            self.throttle.set_duty_cycle(-speed);
        } else {
            self.forward.set_level(false);
            self.backward.set_level(false);
            self.throttle.set_duty_cycle(0.0);
        }
    }

    fn release(&mut self) {
        self.throttle.release();
        self.forward.release();
        self.backward.release();
    }
}

/// Owns both wheels for the lifetime of the process.
///
/// `shutdown` stops motion and releases every channel; the `Drop` impl is the
/// backstop so no exit path leaves lines driven or channels held. The
/// released flag makes the release happen exactly once either way.
pub struct MotorActuator {
    left: WheelOutputs,
    right: WheelOutputs,
    released: bool,
}

// min/max chain instead of f64::clamp: silently saturates for any input,
// including NaN, instead of panicking.
fn clamp_signed(speed: f64) -> f64 {
    speed.min(1.0).max(-1.0)
}

fn clamp_unsigned(speed: f64) -> f64 {
    speed.min(1.0).max(0.0)
}

impl MotorActuator {
    /// Take ownership of both wheels, starting stopped.
    pub fn new(left: WheelOutputs, right: WheelOutputs) -> Self {
        let mut actuator = Self {
            left,
            right,
            released: false,
        };
        actuator.stop();
        actuator
    }

    /// Raw per-wheel control. Each speed is clamped to [-1,1]; sign encodes
    /// direction, magnitude encodes duty cycle.
    pub fn set_speeds(&mut self, left: f64, right: f64) {
        self.left.apply(left);
        self.right.apply(right);
    }

    /// Straight-line forward motion. Speed clamped to [0,1].
    pub fn forward(&mut self, speed: f64) {
        let speed = clamp_unsigned(speed);
        self.set_speeds(speed, speed);
    }

    /// Straight-line reverse motion. Speed clamped to [0,1].
    pub fn backward(&mut self, speed: f64) {
        let speed = clamp_unsigned(speed);
        self.set_speeds(-speed, -speed);
    }

    /// Arc turn to the left, pivoting on the stationary left wheel.
    pub fn turn_left(&mut self, speed: f64) {
        let speed = clamp_unsigned(speed);
        self.set_speeds(0.0, speed);
    }

    /// Arc turn to the right, pivoting on the stationary right wheel.
    pub fn turn_right(&mut self, speed: f64) {
        let speed = clamp_unsigned(speed);
        self.set_speeds(speed, 0.0);
    }

    /// In-place rotation to the left (zero turning radius).
    pub fn rotate_left(&mut self, speed: f64) {
        let speed = clamp_unsigned(speed);
        self.set_speeds(-speed, speed);
    }

    /// In-place rotation to the right.
    pub fn rotate_right(&mut self, speed: f64) {
        let speed = clamp_unsigned(speed);
        self.set_speeds(speed, -speed);
    }

    pub fn stop(&mut self) {
        self.set_speeds(0.0, 0.0);
    }

    /// Stop motion and release every owned channel. Idempotent.
    pub fn shutdown(&mut self) {
        if self.released {
            return;
        }
        self.stop();
        self.left.release();
        self.right.release();
        self.released = true;
        log::info!("motor channels released");
    }
}

impl Drop for MotorActuator {
    fn drop(&mut self) {
        self.shutdown();
    }
}
