//! Owned RGBA pixel buffer.

use std::fmt;

/// Bytes per pixel in an [`RgbaBuffer`].
const CHANNELS: usize = 4;

/// Error returned when raw bytes do not describe a `width x height` RGBA image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BufferError {
    /// The byte count is not `width * height * 4`
    LengthMismatch {
        /// Bytes required by the dimensions
        expected: usize,
        /// Bytes actually supplied
        actual: usize,
    },
    /// `width * height * 4` does not fit in `usize`
    TooLarge {
        /// Requested width in pixels
        width: u32,
        /// Requested height in pixels
        height: u32,
    },
}

impl fmt::Display for BufferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BufferError::LengthMismatch { expected, actual } => write!(
                f,
                "RGBA buffer length mismatch: expected {} bytes, got {}",
                expected, actual
            ),
            BufferError::TooLarge { width, height } => {
                write!(f, "RGBA buffer {}x{} is too large", width, height)
            }
        }
    }
}

impl std::error::Error for BufferError {}

/// An 8-bit RGBA image stored row-major, four bytes per pixel.
///
/// The buffer owns its pixels. Dimensions are fixed at construction and no
/// operation in this crate changes them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbaBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl RgbaBuffer {
    /// Wrap raw RGBA bytes.
    ///
    /// # Errors
    ///
    /// Returns [`BufferError::LengthMismatch`] if `data.len()` is not
    /// `width * height * 4`.
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Result<Self, BufferError> {
        let expected = byte_len(width, height)?;
        if data.len() != expected {
            return Err(BufferError::LengthMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Build a buffer from a list of pixels in row-major order.
    pub fn from_pixels(width: u32, height: u32, pixels: &[[u8; 4]]) -> Result<Self, BufferError> {
        Self::from_raw(width, height, pixels.iter().flatten().copied().collect())
    }

    /// A `width x height` buffer with every pixel set to `pixel`.
    pub fn filled(width: u32, height: u32, pixel: [u8; 4]) -> Result<Self, BufferError> {
        let len = byte_len(width, height)?;
        let data = pixel.iter().copied().cycle().take(len).collect();
        Ok(Self {
            width,
            height,
            data,
        })
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of pixels (`width * height`).
    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.data.len() / CHANNELS
    }

    /// Pixel at `(x, y)`, or `None` when out of bounds.
    pub fn get(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * CHANNELS;
        let px = &self.data[offset..offset + CHANNELS];
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Iterate pixels in row-major order.
    pub fn pixels(&self) -> impl Iterator<Item = [u8; 4]> + '_ {
        self.data
            .chunks_exact(CHANNELS)
            .map(|px| [px[0], px[1], px[2], px[3]])
    }

    /// Mutable view of each pixel's four channels.
    pub fn pixels_mut(&mut self) -> impl Iterator<Item = &mut [u8]> + '_ {
        self.data.chunks_exact_mut(CHANNELS)
    }

    /// Raw RGBA bytes.
    #[inline]
    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }

    /// Consume the buffer and return its raw RGBA bytes.
    #[inline]
    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }
}

fn byte_len(width: u32, height: u32) -> Result<usize, BufferError> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(CHANNELS))
        .ok_or(BufferError::TooLarge { width, height })
}
