//! Runtime configuration.
//!
//! Defaults, then an optional JSON config file named by `ROVER_CONFIG`, then
//! env overrides, then validation. The `[detector]` section is the
//! calibration persistence surface: values written by the bench calibration
//! workflow land here and are fed to the detector setters at startup.

use anyhow::{anyhow, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

const DEFAULT_DEVICE: &str = "stub://camera";
const DEFAULT_WIDTH: u32 = 640;
const DEFAULT_HEIGHT: u32 = 480;
const DEFAULT_FPS: u32 = 10;
const DEFAULT_LOWER: [u8; 3] = [40, 50, 50];
const DEFAULT_UPPER: [u8; 3] = [90, 255, 255];
const DEFAULT_ROI: [f64; 4] = [0.25, 0.0, 0.5, 0.3];
const DEFAULT_MIN_LIT_AREA: u64 = 100;
const DEFAULT_RATIO_THRESHOLD: f64 = 0.05;
const DEFAULT_CRUISE_SPEED: f64 = 0.5;
const DEFAULT_POLL_INTERVAL_MS: u64 = 50;

#[derive(Debug, Deserialize, Default)]
struct RoverConfigFile {
    camera: Option<CameraConfigFile>,
    detector: Option<DetectorConfigFile>,
    drive: Option<DriveConfigFile>,
}

#[derive(Debug, Deserialize, Default)]
struct CameraConfigFile {
    device: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    target_fps: Option<u32>,
}

#[derive(Debug, Deserialize, Default)]
struct DetectorConfigFile {
    lower: Option<[u8; 3]>,
    upper: Option<[u8; 3]>,
    roi: Option<[f64; 4]>,
    min_lit_area: Option<u64>,
    ratio_threshold: Option<f64>,
}

#[derive(Debug, Deserialize, Default)]
struct DriveConfigFile {
    cruise_speed: Option<f64>,
    poll_interval_ms: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct RoverConfig {
    pub camera: CameraSettings,
    pub detector: DetectorSettings,
    pub drive: DriveSettings,
}

#[derive(Debug, Clone)]
pub struct CameraSettings {
    /// Device path: /dev/video* or stub://... for the synthetic source.
    pub device: String,
    pub width: u32,
    pub height: u32,
    pub target_fps: u32,
}

/// Persisted calibration values consumed by the detector at startup.
#[derive(Debug, Clone)]
pub struct DetectorSettings {
    pub lower: [u8; 3],
    pub upper: [u8; 3],
    /// Fractional x, y, width, height.
    pub roi: [f64; 4],
    pub min_lit_area: u64,
    pub ratio_threshold: f64,
}

#[derive(Debug, Clone)]
pub struct DriveSettings {
    pub cruise_speed: f64,
    pub poll_interval: Duration,
}

impl RoverConfig {
    pub fn load() -> Result<Self> {
        let config_path = std::env::var("ROVER_CONFIG").ok();
        let file_cfg = match config_path.as_deref() {
            Some(path) => Some(read_config_file(Path::new(path))?),
            None => None,
        };
        let mut cfg = Self::from_file(file_cfg.unwrap_or_default());
        cfg.apply_env()?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn from_file(file: RoverConfigFile) -> Self {
        let camera = CameraSettings {
            device: file
                .camera
                .as_ref()
                .and_then(|camera| camera.device.clone())
                .unwrap_or_else(|| DEFAULT_DEVICE.to_string()),
            width: file
                .camera
                .as_ref()
                .and_then(|camera| camera.width)
                .unwrap_or(DEFAULT_WIDTH),
            height: file
                .camera
                .as_ref()
                .and_then(|camera| camera.height)
                .unwrap_or(DEFAULT_HEIGHT),
            target_fps: file
                .camera
                .and_then(|camera| camera.target_fps)
                .unwrap_or(DEFAULT_FPS),
        };
        let detector = DetectorSettings {
            lower: file
                .detector
                .as_ref()
                .and_then(|detector| detector.lower)
                .unwrap_or(DEFAULT_LOWER),
            upper: file
                .detector
                .as_ref()
                .and_then(|detector| detector.upper)
                .unwrap_or(DEFAULT_UPPER),
            roi: file
                .detector
                .as_ref()
                .and_then(|detector| detector.roi)
                .unwrap_or(DEFAULT_ROI),
            min_lit_area: file
                .detector
                .as_ref()
                .and_then(|detector| detector.min_lit_area)
                .unwrap_or(DEFAULT_MIN_LIT_AREA),
            ratio_threshold: file
                .detector
                .and_then(|detector| detector.ratio_threshold)
                .unwrap_or(DEFAULT_RATIO_THRESHOLD),
        };
        let drive = DriveSettings {
            cruise_speed: file
                .drive
                .as_ref()
                .and_then(|drive| drive.cruise_speed)
                .unwrap_or(DEFAULT_CRUISE_SPEED),
            poll_interval: Duration::from_millis(
                file.drive
                    .and_then(|drive| drive.poll_interval_ms)
                    .unwrap_or(DEFAULT_POLL_INTERVAL_MS),
            ),
        };
        Self {
            camera,
            detector,
            drive,
        }
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Ok(device) = std::env::var("ROVER_CAMERA_DEVICE") {
            if !device.trim().is_empty() {
                self.camera.device = device;
            }
        }
        if let Ok(speed) = std::env::var("ROVER_CRUISE_SPEED") {
            let speed: f64 = speed
                .parse()
                .map_err(|_| anyhow!("ROVER_CRUISE_SPEED must be a number"))?;
            self.drive.cruise_speed = speed;
        }
        if let Ok(threshold) = std::env::var("ROVER_RATIO_THRESHOLD") {
            let threshold: f64 = threshold
                .parse()
                .map_err(|_| anyhow!("ROVER_RATIO_THRESHOLD must be a number"))?;
            self.detector.ratio_threshold = threshold;
        }
        if let Ok(interval) = std::env::var("ROVER_POLL_INTERVAL_MS") {
            let millis: u64 = interval.parse().map_err(|_| {
                anyhow!("ROVER_POLL_INTERVAL_MS must be an integer number of milliseconds")
            })?;
            self.drive.poll_interval = Duration::from_millis(millis);
        }
        Ok(())
    }

    fn validate(&mut self) -> Result<()> {
        if self.camera.device.trim().is_empty() {
            return Err(anyhow!("camera device must not be empty"));
        }
        if self.camera.width == 0 || self.camera.height == 0 {
            return Err(anyhow!("camera dimensions must be non-zero"));
        }
        // Tuning values are clamped, never rejected; the detector and
        // actuator clamp again at their own boundaries.
        self.drive.cruise_speed = self.drive.cruise_speed.min(1.0).max(0.0);
        self.detector.ratio_threshold = self.detector.ratio_threshold.min(1.0).max(0.0);
        Ok(())
    }
}

fn read_config_file(path: &Path) -> Result<RoverConfigFile> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow!("failed to read config file {}: {}", path.display(), e))?;
    let cfg = serde_json::from_str(&raw)
        .map_err(|e| anyhow!("invalid config file {}: {}", path.display(), e))?;
    Ok(cfg)
}
