//! Synthetic frame source for `stub://` devices.
//!
//! Stages the scenario the rover waits for: a dark scene for the first
//! `green_after` frames, then a green lamp rectangle lit in the upper middle
//! of the frame. Drives bench runs of `roverd` and the integration tests
//! without camera hardware.

use anyhow::{anyhow, Result};

use crate::camera::FrameSource;
use crate::config::CameraSettings;
use crate::frame::Frame;

/// Frames served before the lamp lights, by default.
const DEFAULT_GREEN_AFTER: u64 = 50;

/// Dim gray background so the scene is not degenerate black.
const BACKGROUND: [u8; 3] = [30, 30, 30];
/// Saturated lamp green, comfortably inside the default color range.
const LAMP: [u8; 3] = [40, 220, 40];

pub struct SyntheticSource {
    settings: CameraSettings,
    green_after: u64,
    frames_served: u64,
    opened: bool,
}

impl SyntheticSource {
    pub fn new(settings: CameraSettings) -> Self {
        Self {
            settings,
            green_after: DEFAULT_GREEN_AFTER,
            frames_served: 0,
            opened: false,
        }
    }

    /// Light the lamp after a given number of frames instead of the default.
    pub fn with_green_after(mut self, frames: u64) -> Self {
        self.green_after = frames;
        self
    }

    fn render(&self) -> Frame {
        let mut frame = Frame::filled(self.settings.width, self.settings.height, BACKGROUND);
        if self.frames_served >= self.green_after {
            // Lamp sits inside the detector's default upper-middle region.
            let w = self.settings.width / 4;
            let h = self.settings.height / 5;
            frame.fill_rect(self.settings.width / 2 - w / 2, h / 2, w, h, LAMP);
        }
        frame
    }
}

impl FrameSource for SyntheticSource {
    fn open(&mut self) -> Result<()> {
        self.opened = true;
        log::info!("SyntheticSource: opened {} (synthetic)", self.settings.device);
        Ok(())
    }

    fn read_frame(&mut self) -> Result<Frame> {
        if !self.opened {
            return Err(anyhow!("synthetic source not opened"));
        }
        let frame = self.render();
        self.frames_served += 1;
        Ok(frame)
    }

    fn close(&mut self) {
        if self.opened {
            log::info!(
                "SyntheticSource: closed {} after {} frames",
                self.settings.device,
                self.frames_served
            );
        }
        self.opened = false;
    }
}
