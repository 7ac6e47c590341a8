use image::{codecs::png::PngEncoder, imageops, imageops::FilterType, ImageEncoder, RgbaImage};
use tracing::trace_span;

use crate::error::{TextureError, TextureResult};

pub mod compositor;

/// Skins are always 64 pixels wide; only the row count varies.
pub const SKIN_WIDTH: u32 = 64;

/// Canonical cape dimensions expected by the host skin model.
pub const CAPE_WIDTH: u32 = 64;
pub const CAPE_HEIGHT: u32 = 32;

/// Decodes a compressed transport image (png) into an rgba8 pixel buffer.
pub fn decode_png(data: &[u8]) -> TextureResult<RgbaImage> {
    Ok(image::load_from_memory(data)?.into_rgba8())
}

/// Encodes a pixel buffer into png. Only used as the canonical form for
/// placeholder content hashing; persisted textures use the raw layout.
pub fn encode_png(image: &RgbaImage) -> TextureResult<Vec<u8>> {
    let mut out = Vec::new();

    let _guard = trace_span!("write_image_bytes").entered();

    let encoder = PngEncoder::new(&mut out);

    encoder.write_image(
        image.as_raw(),
        image.width(),
        image.height(),
        image::ExtendedColorType::Rgba8,
    )?;

    Ok(out)
}

/// Reconstructs a pixel buffer from the flat rgba8 interchange layout,
/// deriving the height from the byte length.
pub fn decode_raw(data: &[u8], width: u32) -> TextureResult<RgbaImage> {
    let row_bytes = width as usize * 4;

    if row_bytes == 0 || data.len() % row_bytes != 0 {
        return Err(TextureError::InvalidRawLength {
            len: data.len(),
            width,
        });
    }

    let height = (data.len() / row_bytes) as u32;

    RgbaImage::from_raw(width, height, data.to_vec()).ok_or(TextureError::InvalidRawLength {
        len: data.len(),
        width,
    })
}

/// Flattens a pixel buffer into the raw rgba8 interchange layout.
#[must_use]
pub fn encode_raw(image: RgbaImage) -> Vec<u8> {
    image.into_raw()
}

/// Bilinear resize.
#[must_use]
pub fn resize(image: &RgbaImage, width: u32, height: u32) -> RgbaImage {
    imageops::resize(image, width, height, FilterType::Triangle)
}

/// Brings a cape texture to the canonical 64x32 size.
///
/// A cape that is already 64x32 passes through untouched. Anything else is
/// drawn unscaled onto a transparent canvas that starts at 64x32 and doubles
/// until it covers the source, and that canvas is then bilinearly downscaled
/// to 64x32. Capes at or below canonical size keep their pixels intact while
/// larger or odd-aspect sources still land on exact canonical dimensions.
#[must_use]
pub fn normalize_cape(image: RgbaImage) -> RgbaImage {
    if image.dimensions() == (CAPE_WIDTH, CAPE_HEIGHT) {
        return image;
    }

    let (mut width, mut height) = (CAPE_WIDTH, CAPE_HEIGHT);
    while width < image.width() || height < image.height() {
        width *= 2;
        height *= 2;
    }

    let mut canvas = RgbaImage::new(width, height);
    imageops::replace(&mut canvas, &image, 0, 0);

    // Sub-canonical capes already fit the starting canvas; skipping the
    // no-op resample keeps their pixels byte-exact.
    if canvas.dimensions() == (CAPE_WIDTH, CAPE_HEIGHT) {
        return canvas;
    }

    resize(&canvas, CAPE_WIDTH, CAPE_HEIGHT)
}

#[cfg(test)]
mod tests {
    use image::Rgba;

    use super::*;

    fn solid(width: u32, height: u32, pixel: [u8; 4]) -> RgbaImage {
        RgbaImage::from_pixel(width, height, Rgba(pixel))
    }

    #[test]
    fn raw_round_trip_is_lossless() {
        let mut image = solid(CAPE_WIDTH, CAPE_HEIGHT, [255, 0, 0, 255]);
        image.put_pixel(3, 7, Rgba([1, 2, 3, 4]));

        let raw = encode_raw(image.clone());
        assert_eq!(raw.len(), (CAPE_WIDTH * CAPE_HEIGHT * 4) as usize);
        assert_eq!(&raw[0..4], &[255, 0, 0, 255]);

        let decoded = decode_raw(&raw, CAPE_WIDTH).expect("raw data should decode");
        assert_eq!(decoded, image);
    }

    #[test]
    fn png_round_trip_is_lossless() {
        let mut image = solid(SKIN_WIDTH, 64, [0, 128, 255, 200]);
        image.put_pixel(24, 0, Rgba([9, 8, 7, 6]));

        let png = encode_png(&image).expect("png should encode");
        let decoded = decode_png(&png).expect("png should decode");

        assert_eq!(decoded, image);
    }

    #[test]
    fn decode_png_rejects_garbage() {
        assert!(decode_png(&[0, 1, 2, 3]).is_err());
    }

    #[test]
    fn decode_raw_rejects_partial_rows() {
        let result = decode_raw(&[0; 100], SKIN_WIDTH);

        assert!(matches!(
            result,
            Err(TextureError::InvalidRawLength { len: 100, width: 64 })
        ));
    }

    #[test]
    fn canonical_cape_passes_through_unchanged() {
        let image = solid(CAPE_WIDTH, CAPE_HEIGHT, [10, 20, 30, 40]);

        assert_eq!(normalize_cape(image.clone()), image);
    }

    #[test]
    fn double_size_cape_downscales_to_canonical() {
        let normalized = normalize_cape(solid(128, 64, [50, 60, 70, 255]));

        assert_eq!(normalized.dimensions(), (CAPE_WIDTH, CAPE_HEIGHT));
        // A solid source stays solid through the downscale.
        assert_eq!(normalized.get_pixel(0, 0), &Rgba([50, 60, 70, 255]));
    }

    #[test]
    fn odd_aspect_cape_lands_on_canonical_dimensions() {
        let normalized = normalize_cape(solid(100, 50, [1, 1, 1, 255]));

        assert_eq!(normalized.dimensions(), (CAPE_WIDTH, CAPE_HEIGHT));
    }

    #[test]
    fn small_cape_is_padded_not_scaled() {
        let mut small = solid(22, 17, [200, 100, 50, 255]);
        small.put_pixel(0, 0, Rgba([7, 7, 7, 255]));

        let normalized = normalize_cape(small);

        assert_eq!(normalized.dimensions(), (CAPE_WIDTH, CAPE_HEIGHT));
        // The starting canvas already covers a sub-canonical cape, so its
        // pixels land untouched at the top-left.
        assert_eq!(normalized.get_pixel(0, 0), &Rgba([7, 7, 7, 255]));
        assert_eq!(normalized.get_pixel(1, 1), &Rgba([200, 100, 50, 255]));
        assert_eq!(normalized.get_pixel(40, 20), &Rgba([0, 0, 0, 0]));
    }
}
