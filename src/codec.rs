use std::fmt::{Display, Formatter};

use image_crate::{DynamicImage, GenericImageView};
use log::debug;

use crate::decoder::{DecodeError, GuessingImageDecoder, ImageDecoder};
use crate::encoder::{AllInOneImageEncoder, EncodedImage, EncodingError, ImageEncoder, OutputFormat};

#[derive(Debug)]
pub enum CodecError {
    Decode(DecodeError),
    Encode(EncodingError),
}

impl Display for CodecError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CodecError::Decode(e) => write!(f, "cannot identify image: {}", e),
            CodecError::Encode(e) => write!(f, "cannot encode image: {}", e),
        }
    }
}

impl From<DecodeError> for CodecError {
    fn from(e: DecodeError) -> Self {
        CodecError::Decode(e)
    }
}

impl From<EncodingError> for CodecError {
    fn from(e: EncodingError) -> Self {
        CodecError::Encode(e)
    }
}

/// Decode, flatten to 8-bit RGB, re-encode.
pub struct ImageCodec {
    decoder: Box<dyn ImageDecoder + Send + Sync>,
    encoder: Box<dyn ImageEncoder + Send + Sync>,
}

impl ImageCodec {
    pub fn new(
        decoder: Box<dyn ImageDecoder + Send + Sync>,
        encoder: Box<dyn ImageEncoder + Send + Sync>,
    ) -> ImageCodec {
        ImageCodec { decoder, encoder }
    }

    /// Re-encodes `raw` into `target` using the RGB8 color model.
    ///
    /// The conversion is lossy and cannot be undone: any alpha channel is
    /// dropped, and palette, grayscale, 16-bit and float sources are all
    /// mapped to three 8-bit channels. Dropping alpha keeps each pixel's
    /// color channels as they are; nothing is blended against a background
    /// color, so a fully transparent pixel comes out with its stored color.
    /// Dimensions are preserved.
    pub fn normalize(&self, raw: &[u8], target: &OutputFormat) -> Result<EncodedImage, CodecError> {
        let decoded = self.decoder.decode(raw)?;
        let (width, height) = decoded.dimensions();
        debug!("Decoded {}x{} {:?} image", width, height, decoded.color());

        let normalized = DynamicImage::ImageRgb8(decoded.to_rgb8());

        Ok(self.encoder.encode(&normalized, target)?)
    }
}

impl Default for ImageCodec {
    fn default() -> Self {
        ImageCodec::new(Box::new(GuessingImageDecoder), Box::new(AllInOneImageEncoder))
    }
}
