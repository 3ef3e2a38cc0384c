//! Frame sources.
//!
//! The control loop consumes frames through the `FrameSource` trait and never
//! manages device formats itself. Two sources ship with the crate:
//! - `SyntheticSource` serves `stub://` device paths (bench runs, tests)
//! - `V4l2Source` serves real device nodes (feature: camera-v4l2)

mod synthetic;
#[cfg(feature = "camera-v4l2")]
mod v4l2;

use anyhow::Result;

use crate::config::CameraSettings;
use crate::frame::Frame;

pub use synthetic::SyntheticSource;
#[cfg(feature = "camera-v4l2")]
pub use v4l2::V4l2Source;

/// A camera from the loop's point of view.
///
/// `close` must be safe to call whether or not `open` succeeded; the drive
/// loop calls it unconditionally on every exit path.
pub trait FrameSource {
    /// Acquire the device. Failure is fatal to the run.
    fn open(&mut self) -> Result<()>;

    /// Capture the next frame. May block briefly on hardware I/O.
    fn read_frame(&mut self) -> Result<Frame>;

    /// Release the device.
    fn close(&mut self);
}

/// Pick a source for the configured device path.
///
/// `stub://` paths get the synthetic source; anything else needs the
/// camera-v4l2 feature.
pub fn open_source(settings: &CameraSettings) -> Result<Box<dyn FrameSource>> {
    if settings.device.starts_with("stub://") {
        return Ok(Box::new(SyntheticSource::new(settings.clone())));
    }
    open_device_source(settings)
}

#[cfg(feature = "camera-v4l2")]
fn open_device_source(settings: &CameraSettings) -> Result<Box<dyn FrameSource>> {
    Ok(Box::new(V4l2Source::new(settings.clone())))
}

#[cfg(not(feature = "camera-v4l2"))]
fn open_device_source(settings: &CameraSettings) -> Result<Box<dyn FrameSource>> {
    Err(anyhow::anyhow!(
        "device {} requires the camera-v4l2 feature (stub:// paths work without it)",
        settings.device
    ))
}
