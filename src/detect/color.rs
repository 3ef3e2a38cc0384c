//! HSV conversion and the tunable color range.
//!
//! Uses the 8-bit OpenCV convention so calibration values captured with the
//! usual tooling transfer directly: hue in [0,179] (degrees halved),
//! saturation and value in [0,255].

/// Maximum hue in the 8-bit convention (359 degrees / 2).
pub const HUE_MAX: u8 = 179;

/// One pixel in hue-saturation-value space.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Hsv {
    pub h: u8,
    pub s: u8,
    pub v: u8,
}

/// Convert a BGR sample to 8-bit HSV.
pub fn bgr_to_hsv(b: u8, g: u8, r: u8) -> Hsv {
    let (bf, gf, rf) = (b as f32, g as f32, r as f32);
    let v = bf.max(gf).max(rf);
    let min = bf.min(gf).min(rf);
    let delta = v - min;

    let s = if v == 0.0 { 0.0 } else { delta / v * 255.0 };

    let h_deg = if delta == 0.0 {
        0.0
    } else if v == rf {
        60.0 * (gf - bf) / delta
    } else if v == gf {
        120.0 + 60.0 * (bf - rf) / delta
    } else {
        240.0 + 60.0 * (rf - gf) / delta
    };
    let h_deg = if h_deg < 0.0 { h_deg + 360.0 } else { h_deg };

    Hsv {
        h: ((h_deg / 2.0).round() as u16 % 180) as u8,
        s: s.round() as u8,
        v: v as u8,
    }
}

/// Inclusive per-channel HSV bounds for the "lit" test.
///
/// Construction clamps hue into [0,179] and normalizes the pair so
/// lower <= upper holds per channel. Out-of-range input is adjusted, never
/// rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ColorRange {
    lower: [u8; 3],
    upper: [u8; 3],
}

impl ColorRange {
    pub fn new(lower: [u8; 3], upper: [u8; 3]) -> Self {
        let mut lo = lower;
        let mut hi = upper;
        lo[0] = lo[0].min(HUE_MAX);
        hi[0] = hi[0].min(HUE_MAX);
        for ch in 0..3 {
            if lo[ch] > hi[ch] {
                std::mem::swap(&mut lo[ch], &mut hi[ch]);
            }
        }
        Self {
            lower: lo,
            upper: hi,
        }
    }

    /// Default range for a green traffic-light lamp.
    pub fn green() -> Self {
        Self::new([40, 50, 50], [90, 255, 255])
    }

    pub fn lower(&self) -> [u8; 3] {
        self.lower
    }

    pub fn upper(&self) -> [u8; 3] {
        self.upper
    }

    /// All three channels within bounds, inclusive.
    pub fn contains(&self, px: Hsv) -> bool {
        let sample = [px.h, px.s, px.v];
        (0..3).all(|ch| self.lower[ch] <= sample[ch] && sample[ch] <= self.upper[ch])
    }
}

impl Default for ColorRange {
    fn default() -> Self {
        Self::green()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primary_colors_map_to_expected_hues() {
        // Pure green: 120 degrees -> 60 in 8-bit hue.
        assert_eq!(bgr_to_hsv(0, 255, 0), Hsv { h: 60, s: 255, v: 255 });
        // Pure red: 0 degrees.
        assert_eq!(bgr_to_hsv(0, 0, 255), Hsv { h: 0, s: 255, v: 255 });
        // Pure blue: 240 degrees -> 120.
        assert_eq!(bgr_to_hsv(255, 0, 0), Hsv { h: 120, s: 255, v: 255 });
    }

    #[test]
    fn achromatic_pixels_have_zero_saturation() {
        assert_eq!(bgr_to_hsv(0, 0, 0), Hsv { h: 0, s: 0, v: 0 });
        let gray = bgr_to_hsv(128, 128, 128);
        assert_eq!(gray.s, 0);
        assert_eq!(gray.v, 128);
    }

    #[test]
    fn default_green_range_accepts_green_lamp() {
        let range = ColorRange::green();
        assert!(range.contains(bgr_to_hsv(0, 255, 0)));
        assert!(!range.contains(bgr_to_hsv(0, 0, 255)));
        assert!(!range.contains(bgr_to_hsv(0, 0, 0)));
    }

    #[test]
    fn new_clamps_hue_and_normalizes_swapped_bounds() {
        let range = ColorRange::new([200, 255, 50], [90, 40, 255]);
        assert_eq!(range.lower(), [90, 40, 50]);
        assert_eq!(range.upper(), [179, 255, 255]);
    }

    #[test]
    fn bounds_are_inclusive() {
        let range = ColorRange::new([40, 50, 50], [90, 255, 255]);
        assert!(range.contains(Hsv { h: 40, s: 50, v: 50 }));
        assert!(range.contains(Hsv { h: 90, s: 255, v: 255 }));
        assert!(!range.contains(Hsv { h: 39, s: 50, v: 50 }));
        assert!(!range.contains(Hsv { h: 91, s: 255, v: 255 }));
    }
}
