//! Green-signal classifier.
//!
//! `GreenSignalDetector` turns one frame into one `DetectionResult`: resolve
//! the fractional region of interest, segment it against the configured HSV
//! range, clean the mask (erode once, dilate twice), then apply an absolute
//! lit-pixel floor and a relative density floor. Both must hold, so a large
//! but sparse region does not trigger and neither does dense noise in a tiny
//! region.

use std::time::{Duration, Instant};

use anyhow::Result;

use crate::camera::FrameSource;
use crate::config::DetectorSettings;
use crate::detect::color::{bgr_to_hsv, ColorRange};
use crate::detect::morphology::Mask;
use crate::frame::Frame;

/// Default absolute floor on lit pixels.
pub const DEFAULT_MIN_LIT_AREA: u64 = 100;
/// Default relative floor on lit pixels over region pixels.
pub const DEFAULT_RATIO_THRESHOLD: f64 = 0.05;
/// Polling interval for `wait_for_signal`.
const SIGNAL_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Region of interest as frame-relative fractions.
///
/// Each component is clamped to [0,1] on construction. x+width and y+height
/// may run past 1.0; the resolved pixel rectangle is clamped to the frame
/// instead of rejecting the configuration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RegionOfInterest {
    x: f64,
    y: f64,
    width: f64,
    height: f64,
}

impl RegionOfInterest {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x: clamp_fraction(x),
            y: clamp_fraction(y),
            width: clamp_fraction(width),
            height: clamp_fraction(height),
        }
    }

    /// Resolve to pixel coordinates for a concrete frame size.
    pub fn resolve(&self, frame_width: u32, frame_height: u32) -> PixelRect {
        let x0 = (frame_width as f64 * self.x) as u32;
        let y0 = (frame_height as f64 * self.y) as u32;
        let x1 = x0.saturating_add((frame_width as f64 * self.width) as u32);
        let y1 = y0.saturating_add((frame_height as f64 * self.height) as u32);
        PixelRect {
            x0: x0.min(frame_width),
            y0: y0.min(frame_height),
            x1: x1.min(frame_width),
            y1: y1.min(frame_height),
        }
    }
}

impl Default for RegionOfInterest {
    /// Upper middle of the frame, where a roadside signal head sits.
    fn default() -> Self {
        Self::new(0.25, 0.0, 0.5, 0.3)
    }
}

fn clamp_fraction(value: f64) -> f64 {
    value.min(1.0).max(0.0)
}

/// Resolved pixel rectangle, half-open, clamped to the frame. May be empty.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PixelRect {
    pub x0: u32,
    pub y0: u32,
    pub x1: u32,
    pub y1: u32,
}

impl PixelRect {
    pub fn width(&self) -> u32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> u32 {
        self.y1 - self.y0
    }

    pub fn area(&self) -> u64 {
        self.width() as u64 * self.height() as u64
    }
}

/// Outcome of classifying one frame. Fresh per call, no identity beyond it.
#[derive(Clone, Debug, PartialEq)]
pub struct DetectionResult {
    /// Whether both detection floors held.
    pub signal_present: bool,
    /// Lit pixels after mask cleaning.
    pub lit_pixels: u64,
    /// Total pixels in the resolved region.
    pub region_pixels: u64,
    /// lit_pixels / region_pixels, 0.0 for an empty region.
    pub lit_ratio: f64,
    /// The pixel rectangle that was examined.
    pub region: PixelRect,
}

/// Color-ratio classifier for the green traffic-light signal.
pub struct GreenSignalDetector {
    range: ColorRange,
    roi: RegionOfInterest,
    min_lit_area: u64,
    ratio_threshold: f64,
}

impl GreenSignalDetector {
    pub fn new() -> Self {
        Self {
            range: ColorRange::green(),
            roi: RegionOfInterest::default(),
            min_lit_area: DEFAULT_MIN_LIT_AREA,
            ratio_threshold: DEFAULT_RATIO_THRESHOLD,
        }
    }

    /// Wire persisted calibration values (config `[detector]` section).
    pub fn from_settings(settings: &DetectorSettings) -> Self {
        let mut detector = Self::new();
        detector.set_color_range(settings.lower, settings.upper);
        let [x, y, w, h] = settings.roi;
        detector.set_region(x, y, w, h);
        detector.set_min_lit_area(settings.min_lit_area);
        detector.set_ratio_threshold(settings.ratio_threshold);
        detector
    }

    pub fn set_region(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.roi = RegionOfInterest::new(x, y, width, height);
    }

    pub fn set_ratio_threshold(&mut self, threshold: f64) {
        self.ratio_threshold = clamp_fraction(threshold);
    }

    pub fn set_color_range(&mut self, lower: [u8; 3], upper: [u8; 3]) {
        self.range = ColorRange::new(lower, upper);
    }

    pub fn set_min_lit_area(&mut self, area: u64) {
        self.min_lit_area = area;
    }

    pub fn color_range(&self) -> ColorRange {
        self.range
    }

    pub fn region(&self) -> RegionOfInterest {
        self.roi
    }

    /// Classify one frame. Deterministic; never fails for a well-formed
    /// frame; an empty region yields a zero ratio rather than dividing.
    pub fn classify(&self, frame: &Frame) -> DetectionResult {
        let rect = self.roi.resolve(frame.width(), frame.height());
        let region_pixels = rect.area();

        let mut mask = Mask::new(rect.width() as usize, rect.height() as usize);
        for y in rect.y0..rect.y1 {
            for x in rect.x0..rect.x1 {
                let [b, g, r] = frame.pixel(x, y);
                if self.range.contains(bgr_to_hsv(b, g, r)) {
                    mask.set((x - rect.x0) as usize, (y - rect.y0) as usize, true);
                }
            }
        }
        let mask = mask.erode().dilate().dilate();

        let lit_pixels = mask.count_set();
        let lit_ratio = if region_pixels > 0 {
            lit_pixels as f64 / region_pixels as f64
        } else {
            0.0
        };
        let signal_present = lit_pixels > self.min_lit_area && lit_ratio > self.ratio_threshold;

        DetectionResult {
            signal_present,
            lit_pixels,
            region_pixels,
            lit_ratio,
            region: rect,
        }
    }

    /// Block until the signal is present or the timeout elapses.
    ///
    /// Reads and classifies at a bounded 50 ms interval; the timeout is
    /// wall-clock, checked once per iteration after a miss. Read failures
    /// propagate to the caller.
    pub fn wait_for_signal(
        &self,
        source: &mut dyn FrameSource,
        timeout: Option<Duration>,
    ) -> Result<bool> {
        let started = Instant::now();
        loop {
            let frame = source.read_frame()?;
            let result = self.classify(&frame);
            if result.signal_present {
                log::debug!(
                    "signal present after {:.1}s (lit={} ratio={:.4})",
                    started.elapsed().as_secs_f64(),
                    result.lit_pixels,
                    result.lit_ratio
                );
                return Ok(true);
            }
            if let Some(limit) = timeout {
                if started.elapsed() > limit {
                    return Ok(false);
                }
            }
            std::thread::sleep(SIGNAL_POLL_INTERVAL);
        }
    }
}

impl Default for GreenSignalDetector {
    fn default() -> Self {
        Self::new()
    }
}
