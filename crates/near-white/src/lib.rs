//! near-white: strip near-white pixels to transparency
//!
//! This library classifies every pixel of an RGBA buffer against a tolerance
//! band below pure white and clears the ones that fall inside it. It is the
//! pixel core of the `whiteout` server and has no dependencies; decoding
//! and encoding image files is left to the caller.
//!
//! # Quick Start
//!
//! ```
//! use near_white::{strip, RgbaBuffer, Tolerance};
//!
//! let pixels = vec![
//!     255, 255, 255, 255, // pure white
//!     250, 250, 250, 255, // near white
//!     0, 0, 0, 255,       // black
//!     255, 255, 255, 0,   // already transparent
//! ];
//! let image = RgbaBuffer::from_raw(2, 2, pixels).unwrap();
//! let stripped = strip(image, Tolerance::new(10));
//!
//! assert_eq!(
//!     stripped.as_raw(),
//!     &[
//!         255, 255, 255, 0,
//!         255, 255, 255, 0,
//!         0, 0, 0, 255,
//!         255, 255, 255, 0,
//!     ]
//! );
//! ```
//!
//! # Classification
//!
//! A pixel `(r, g, b, a)` is near-white for tolerance `t` when each of
//! `r`, `g` and `b` is strictly greater than `255 - t`. Alpha is not part of
//! the test. Matched pixels are replaced by `(255, 255, 255, 0)`: alpha is
//! zeroed and the color is normalized to pure white. Every other pixel is
//! left exactly as it was, alpha included.
//!
//! The cut is a hard threshold. Pixels just outside the band stay fully
//! opaque, so anti-aliased edges of a removed background keep a visible
//! fringe. There is no feathering.
//!
//! # Tolerance Range
//!
//! [`Tolerance`] wraps any `i32` and never rejects a value:
//!
//! | Tolerance | Effect |
//! |-----------|--------|
//! | `<= 0`    | nothing matches (`0` would need channels above 255) |
//! | `1`       | only `(255, 255, 255, _)` matches |
//! | `10`      | default; channels `246..=255` match |
//! | `>= 256`  | every pixel matches |
//!
//! Out-of-range values give degenerate but well-defined output instead of
//! an error.

mod buffer;
mod strip;
mod tolerance;

pub use buffer::{BufferError, RgbaBuffer};
pub use strip::{is_near_white, strip, strip_in_place, CLEARED};
pub use tolerance::Tolerance;
