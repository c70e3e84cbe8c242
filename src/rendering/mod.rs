pub mod codec;

pub use codec::{decode_rgba, encode_png, PngOptions};
