//! Green-signal detection: HSV segmentation over a region of interest.

mod color;
mod detector;
mod morphology;

pub use color::{bgr_to_hsv, ColorRange, Hsv, HUE_MAX};
pub use detector::{
    DetectionResult, GreenSignalDetector, PixelRect, RegionOfInterest, DEFAULT_MIN_LIT_AREA,
    DEFAULT_RATIO_THRESHOLD,
};
pub use morphology::Mask;
