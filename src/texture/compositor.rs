use image::{imageops, RgbaImage};

use crate::{
    error::TextureResult,
    texture::{decode_raw, encode_raw, SKIN_WIDTH},
};

/// Where the ears overlay lands on the skin canvas.
const EARS_OFFSET: (i64, i64) = (24, 0);

/// Draws an ears overlay onto a copy of a skin canvas at the fixed (24, 0)
/// anchor, source-over, leaving the canvas dimensions unchanged.
///
/// The skin arrives in the raw rgba8 interchange layout; its height is
/// derived from the byte length, so both 32- and 64-row variants work. On any
/// failure the caller's buffer is untouched and the error propagates as a
/// composite failure.
pub fn overlay_ears(skin_raw: &[u8], overlay: &RgbaImage) -> TextureResult<Vec<u8>> {
    let mut canvas = decode_raw(skin_raw, SKIN_WIDTH)?;

    imageops::overlay(&mut canvas, overlay, EARS_OFFSET.0, EARS_OFFSET.1);

    Ok(encode_raw(canvas))
}
