use bytes::Bytes;
use image::RgbImage;
use libheif_rs::{ColorSpace, HeifContext, LibHeif, RgbChroma};

use crate::codec::{encode_jpeg, encode_rgb, is_heif_container, jpeg_quality};
use crate::{Codec, CodecError};

/// Decodes HEIF/HEIC through libheif and re-encodes the primary image as JPEG.
///
/// Anything that is not a HEIF container goes through the `image` decoders,
/// same as [`crate::ImageJpegCodec`].
#[derive(Debug, Default, Clone, Copy)]
pub struct HeifJpegCodec;

#[async_trait::async_trait]
impl Codec for HeifJpegCodec {
    async fn convert(&self, input: Bytes, quality: f32) -> Result<Vec<Bytes>, CodecError> {
        let quality = jpeg_quality(quality);
        let encoded = tokio::task::spawn_blocking(move || {
            if is_heif_container(&input) {
                decode_heif(&input).and_then(|rgb| encode_rgb(&rgb, quality))
            } else {
                encode_jpeg(&input, quality)
            }
        })
        .await
        .map_err(|err| CodecError::Aborted(err.to_string()))??;
        Ok(vec![encoded])
    }
}

fn decode_heif(input: &[u8]) -> Result<RgbImage, CodecError> {
    let decode_err = |err: libheif_rs::HeifError| CodecError::Decode(err.to_string());

    let lib_heif = LibHeif::new();
    let ctx = HeifContext::read_from_bytes(input).map_err(decode_err)?;
    let handle = ctx.primary_image_handle().map_err(decode_err)?;
    // Rotation and mirroring from the container are applied here.
    let image = lib_heif
        .decode(&handle, ColorSpace::Rgb(RgbChroma::Rgb), None)
        .map_err(decode_err)?;

    let planes = image.planes();
    let plane = planes
        .interleaved
        .ok_or_else(|| CodecError::Decode("no interleaved RGB plane".to_string()))?;
    let (width, height) = (plane.width, plane.height);
    let row_len = width as usize * 3;

    let mut pixels = Vec::with_capacity(row_len * height as usize);
    for row in plane.data.chunks(plane.stride.max(1)).take(height as usize) {
        let row = row
            .get(..row_len)
            .ok_or_else(|| CodecError::Decode("short RGB row".to_string()))?;
        pixels.extend_from_slice(row);
    }
    RgbImage::from_raw(width, height, pixels)
        .ok_or_else(|| CodecError::Decode(format!("truncated {width}x{height} image")))
}
