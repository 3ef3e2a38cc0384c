//! Differential-drive actuation.

mod actuator;
mod gpio;

pub use actuator::{MotorActuator, WheelOutputs};
pub use gpio::{
    DigitalOutput, DigitalProbe, PwmOutput, PwmProbe, SimDigitalOutput, SimPwmOutput,
};
