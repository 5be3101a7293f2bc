use bytes::Bytes;
use image::codecs::jpeg::JpegEncoder;
use image::RgbImage;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("unsupported input: {0}")]
    Unsupported(String),
    #[error("decode failed: {0}")]
    Decode(String),
    #[error("encode failed: {0}")]
    Encode(String),
    #[error("codec task aborted: {0}")]
    Aborted(String),
}

/// Byte-level source → JPEG transformation.
///
/// Implementations may return several encoded images (e.g. an image sequence);
/// the queue keeps the first one.
#[async_trait::async_trait]
pub trait Codec: Send + Sync {
    async fn convert(&self, input: Bytes, quality: f32) -> Result<Vec<Bytes>, CodecError>;
}

/// Re-encodes anything the enabled `image` decoders understand as baseline JPEG.
///
/// HEIC containers are not among them; a libheif-backed codec plugs in through
/// [`Codec`] for that.
#[derive(Debug, Default, Clone, Copy)]
pub struct ImageJpegCodec;

#[async_trait::async_trait]
impl Codec for ImageJpegCodec {
    async fn convert(&self, input: Bytes, quality: f32) -> Result<Vec<Bytes>, CodecError> {
        if is_heif_container(&input) {
            return Err(CodecError::Unsupported(
                "HEIF container needs a HEIF-capable codec".to_string(),
            ));
        }
        let quality = jpeg_quality(quality);
        let encoded = tokio::task::spawn_blocking(move || encode_jpeg(&input, quality))
            .await
            .map_err(|err| CodecError::Aborted(err.to_string()))??;
        Ok(vec![encoded])
    }
}

/// Maps a 0..=1 quality onto the encoder's 1..=100 scale.
pub fn jpeg_quality(quality: f32) -> u8 {
    let scaled = (quality.clamp(0.0, 1.0) * 100.0).round();
    scaled.max(1.0) as u8
}

/// ISO-BMFF brands written by HEIF/HEIC encoders.
const HEIF_BRANDS: [&[u8; 4]; 8] = [
    b"heic", b"heix", b"hevc", b"hevx", b"heim", b"heis", b"mif1", b"msf1",
];

/// True when `input` opens with an `ftyp` box naming a HEIF brand, either as
/// the major brand or among the compatible ones.
pub fn is_heif_container(input: &[u8]) -> bool {
    if input.len() < 16 || &input[4..8] != b"ftyp" {
        return false;
    }
    let box_len = u32::from_be_bytes([input[0], input[1], input[2], input[3]]) as usize;
    let end = box_len.clamp(16, input.len());
    let major = &input[8..12];
    // Bytes 12..16 hold the minor version.
    std::iter::once(major)
        .chain(input[16..end].chunks_exact(4))
        .any(|brand| HEIF_BRANDS.iter().any(|known| brand == &known[..]))
}

pub(crate) fn encode_jpeg(input: &[u8], quality: u8) -> Result<Bytes, CodecError> {
    let decoded = image::load_from_memory(input).map_err(|err| match err {
        image::ImageError::Unsupported(inner) => CodecError::Unsupported(inner.to_string()),
        other => CodecError::Decode(other.to_string()),
    })?;
    // JPEG carries no alpha channel.
    encode_rgb(&decoded.to_rgb8(), quality)
}

pub(crate) fn encode_rgb(rgb: &RgbImage, quality: u8) -> Result<Bytes, CodecError> {
    let mut out = Vec::new();
    JpegEncoder::new_with_quality(&mut out, quality)
        .encode_image(rgb)
        .map_err(|err| CodecError::Encode(err.to_string()))?;
    Ok(Bytes::from(out))
}

/// Codec installed when the caller does not pick one.
#[cfg(feature = "heif")]
pub fn default_codec() -> std::sync::Arc<dyn Codec> {
    std::sync::Arc::new(crate::heif::HeifJpegCodec)
}

/// Codec installed when the caller does not pick one.
#[cfg(not(feature = "heif"))]
pub fn default_codec() -> std::sync::Arc<dyn Codec> {
    std::sync::Arc::new(ImageJpegCodec)
}

/// Whether [`default_codec`] decodes HEIF/HEIC containers.
pub const HEIF_SUPPORT: bool = cfg!(feature = "heif");
