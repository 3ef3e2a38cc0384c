//! Camera frame container.
//!
//! A `Frame` is an owned grid of BGR24 samples, row-major, three bytes per
//! pixel. Sources produce frames; the detector borrows them read-only per
//! classification call and never keeps them.

use anyhow::{anyhow, Result};

/// Bytes per pixel (blue, green, red).
pub const BYTES_PER_PIXEL: usize = 3;

/// Owned BGR24 frame.
#[derive(Clone, Debug)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
}

impl Frame {
    /// Wrap an existing BGR24 buffer. The buffer length must match the
    /// dimensions exactly.
    pub fn from_bgr(data: Vec<u8>, width: u32, height: u32) -> Result<Self> {
        let expected = width as usize * height as usize * BYTES_PER_PIXEL;
        if data.len() != expected {
            return Err(anyhow!(
                "frame buffer length {} does not match {}x{} ({} bytes expected)",
                data.len(),
                width,
                height,
                expected
            ));
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Wrap an RGB24 buffer, swizzling to BGR. Used by sources that negotiate
    /// RGB output (e.g. V4L2 RGB3).
    pub fn from_rgb(mut data: Vec<u8>, width: u32, height: u32) -> Result<Self> {
        for pixel in data.chunks_exact_mut(BYTES_PER_PIXEL) {
            pixel.swap(0, 2);
        }
        Self::from_bgr(data, width, height)
    }

    /// A frame filled with a single BGR color.
    pub fn filled(width: u32, height: u32, bgr: [u8; 3]) -> Self {
        let pixels = width as usize * height as usize;
        let mut data = Vec::with_capacity(pixels * BYTES_PER_PIXEL);
        for _ in 0..pixels {
            data.extend_from_slice(&bgr);
        }
        Self {
            data,
            width,
            height,
        }
    }

    /// An all-zero (black) frame.
    pub fn black(width: u32, height: u32) -> Self {
        Self::filled(width, height, [0, 0, 0])
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// BGR triple at (x, y). Callers must stay within bounds.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
        debug_assert!(x < self.width && y < self.height);
        let idx = (y as usize * self.width as usize + x as usize) * BYTES_PER_PIXEL;
        [self.data[idx], self.data[idx + 1], self.data[idx + 2]]
    }

    /// Paint a rectangle with a BGR color, clipped to the frame. Used by the
    /// synthetic source and tests to stage scenes.
    pub fn fill_rect(&mut self, x: u32, y: u32, w: u32, h: u32, bgr: [u8; 3]) {
        let x1 = x.saturating_add(w).min(self.width);
        let y1 = y.saturating_add(h).min(self.height);
        for py in y.min(self.height)..y1 {
            for px in x.min(self.width)..x1 {
                let idx = (py as usize * self.width as usize + px as usize) * BYTES_PER_PIXEL;
                self.data[idx..idx + BYTES_PER_PIXEL].copy_from_slice(&bgr);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_bgr_rejects_short_buffer() {
        assert!(Frame::from_bgr(vec![0u8; 11], 2, 2).is_err());
        assert!(Frame::from_bgr(vec![0u8; 12], 2, 2).is_ok());
    }

    #[test]
    fn from_rgb_swizzles_channels() {
        let frame = Frame::from_rgb(vec![10, 20, 30], 1, 1).unwrap();
        assert_eq!(frame.pixel(0, 0), [30, 20, 10]);
    }

    #[test]
    fn fill_rect_clips_to_frame() {
        let mut frame = Frame::black(4, 4);
        frame.fill_rect(2, 2, 10, 10, [1, 2, 3]);
        assert_eq!(frame.pixel(3, 3), [1, 2, 3]);
        assert_eq!(frame.pixel(1, 1), [0, 0, 0]);
    }
}
