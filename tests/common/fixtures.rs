//! Test fixtures and constants.

use near_white::CLEARED;
use std::io::Cursor;

/// The 2x2 reference image: white, near-white, black, transparent white
pub const REFERENCE_PIXELS: [[u8; 4]; 4] = [
    [255, 255, 255, 255],
    [250, 250, 250, 255],
    [0, 0, 0, 255],
    [255, 255, 255, 0],
];

/// Expected output of the reference image at tolerance 10
pub const REFERENCE_STRIPPED: [[u8; 4]; 4] = [CLEARED, CLEARED, [0, 0, 0, 255], CLEARED];

/// Encode RGBA pixels as PNG bytes
pub fn png_bytes(width: u32, height: u32, pixels: &[[u8; 4]]) -> Vec<u8> {
    encode(width, height, pixels, image::ImageFormat::Png)
}

/// Encode RGB (alpha dropped) as BMP bytes
pub fn bmp_bytes(width: u32, height: u32, pixels: &[[u8; 4]]) -> Vec<u8> {
    let rgb: Vec<u8> = pixels.iter().flat_map(|p| [p[0], p[1], p[2]]).collect();
    let img = image::RgbImage::from_raw(width, height, rgb).expect("pixel count");
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Bmp)
        .expect("encode bmp");
    bytes
}

/// The reference image as PNG
pub fn reference_png() -> Vec<u8> {
    png_bytes(2, 2, &REFERENCE_PIXELS)
}

fn encode(width: u32, height: u32, pixels: &[[u8; 4]], format: image::ImageFormat) -> Vec<u8> {
    let raw: Vec<u8> = pixels.iter().flatten().copied().collect();
    let img = image::RgbaImage::from_raw(width, height, raw).expect("pixel count");
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), format)
        .expect("encode image");
    bytes
}
