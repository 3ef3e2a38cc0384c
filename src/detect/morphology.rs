//! Binary mask morphology.
//!
//! One erosion pass followed by two dilation passes with a 5x5 structuring
//! element strips isolated noise pixels, then restores and slightly grows the
//! surviving region. Out-of-bounds neighbors count as unset for both
//! operations, so a saturated mask loses a thin border to erosion and the
//! dilation passes grow it back.

/// Structuring-element radius: 2 on each side gives the 5x5 window.
const KERNEL_RADIUS: i64 = 2;

/// Flat binary mask over a region of interest.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Mask {
    bits: Vec<bool>,
    width: usize,
    height: usize,
}

impl Mask {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            bits: vec![false; width * height],
            width,
            height,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn get(&self, x: usize, y: usize) -> bool {
        self.bits[y * self.width + x]
    }

    pub fn set(&mut self, x: usize, y: usize, value: bool) {
        self.bits[y * self.width + x] = value;
    }

    /// Number of set bits.
    pub fn count_set(&self) -> u64 {
        self.bits.iter().filter(|&&b| b).count() as u64
    }

    /// A bit survives erosion iff every in-window neighbor is set.
    pub fn erode(&self) -> Mask {
        let mut out = Mask::new(self.width, self.height);
        for y in 0..self.height {
            for x in 0..self.width {
                out.set(x, y, self.all_in_window(x, y));
            }
        }
        out
    }

    /// A bit is set after dilation iff any in-window neighbor is set.
    pub fn dilate(&self) -> Mask {
        let mut out = Mask::new(self.width, self.height);
        for y in 0..self.height {
            for x in 0..self.width {
                out.set(x, y, self.any_in_window(x, y));
            }
        }
        out
    }

    fn all_in_window(&self, cx: usize, cy: usize) -> bool {
        for dy in -KERNEL_RADIUS..=KERNEL_RADIUS {
            for dx in -KERNEL_RADIUS..=KERNEL_RADIUS {
                let x = cx as i64 + dx;
                let y = cy as i64 + dy;
                if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
                    return false;
                }
                if !self.get(x as usize, y as usize) {
                    return false;
                }
            }
        }
        true
    }

    fn any_in_window(&self, cx: usize, cy: usize) -> bool {
        for dy in -KERNEL_RADIUS..=KERNEL_RADIUS {
            for dx in -KERNEL_RADIUS..=KERNEL_RADIUS {
                let x = cx as i64 + dx;
                let y = cy as i64 + dy;
                if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
                    continue;
                }
                if self.get(x as usize, y as usize) {
                    return true;
                }
            }
        }
        false
    }
}
