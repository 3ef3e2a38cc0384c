//! greenlight-rover
//!
//! Control core for a small autonomous differential-drive rover: watch a
//! camera feed for a green traffic-light signal, and on detection transition
//! the motor controller from idle to forward motion.
//!
//! # Architecture
//!
//! Three components, leaf-first:
//!
//! - `motor`: differential-drive actuation. Normalized per-wheel speed
//!   commands become direction lines plus a duty cycle; no dependency on
//!   perception.
//! - `detect`: stateless-per-call color-ratio classification of a region of
//!   interest, tunable HSV range and thresholds.
//! - `drive`: the orchestrating state machine (wait -> go) polling a frame
//!   source and commanding the actuator.
//!
//! The loop is single-threaded, synchronous, and poll-driven. Cancellation is
//! cooperative (a stop flag checked once per iteration), and every exit path
//! stops the motors, releases the hardware channels, and closes the frame
//! source, in that order.
//!
//! # Module Structure
//!
//! - `frame`: owned BGR24 frame container
//! - `camera`: `FrameSource` trait, synthetic and V4L2 sources
//! - `detect`: HSV color math, mask morphology, `GreenSignalDetector`
//! - `motor`: hardware output seam, sim backends, `MotorActuator`
//! - `drive`: `DriveState`, `MovingBehavior` hook, `DriveLoop`
//! - `config`: JSON config file + env overrides, calibration persistence

pub mod camera;
pub mod config;
pub mod detect;
pub mod drive;
pub mod frame;
pub mod motor;

pub use camera::{open_source, FrameSource, SyntheticSource};
#[cfg(feature = "camera-v4l2")]
pub use camera::V4l2Source;
pub use config::{CameraSettings, DetectorSettings, DriveSettings, RoverConfig};
pub use detect::{
    ColorRange, DetectionResult, GreenSignalDetector, Hsv, PixelRect, RegionOfInterest,
};
pub use drive::{DriveLoop, DriveState, Idle, MovingBehavior};
pub use frame::Frame;
pub use motor::{
    DigitalOutput, DigitalProbe, MotorActuator, PwmOutput, PwmProbe, SimDigitalOutput,
    SimPwmOutput, WheelOutputs,
};
