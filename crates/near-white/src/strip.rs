//! The near-white threshold transform.

use crate::buffer::RgbaBuffer;
use crate::tolerance::Tolerance;

/// Value written over every matched pixel: white RGB, zero alpha.
pub const CLEARED: [u8; 4] = [255, 255, 255, 0];

/// Whether `pixel` lies inside the near-white band for `tolerance`.
///
/// Only the color channels are tested; alpha is ignored.
#[inline]
pub fn is_near_white(pixel: [u8; 4], tolerance: Tolerance) -> bool {
    tolerance.admits(pixel[0]) && tolerance.admits(pixel[1]) && tolerance.admits(pixel[2])
}

/// Clear every near-white pixel of `image`, returning the transformed buffer.
///
/// Matched pixels become [`CLEARED`]; all others keep their exact value,
/// including alpha. Dimensions are unchanged. The input buffer is reused for
/// the output.
pub fn strip(mut image: RgbaBuffer, tolerance: Tolerance) -> RgbaBuffer {
    strip_in_place(&mut image, tolerance);
    image
}

/// Clear every near-white pixel of `image` in place.
///
/// Returns the number of pixels that matched. Pixels that were already
/// [`CLEARED`] are counted again since they still lie inside the band.
pub fn strip_in_place(image: &mut RgbaBuffer, tolerance: Tolerance) -> usize {
    let mut cleared = 0;
    for px in image.pixels_mut() {
        if is_near_white([px[0], px[1], px[2], px[3]], tolerance) {
            px.copy_from_slice(&CLEARED);
            cleared += 1;
        }
    }
    cleared
}
