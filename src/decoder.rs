use std::fmt::{Display, Formatter};
use std::io::Cursor;

use image_crate::io::Reader as ImageReader;
use image_crate::{DynamicImage, ImageError};

#[derive(Debug)]
pub enum DecodeError {
    UnknownFormat,
    Corrupt(String),
}

impl Display for DecodeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            DecodeError::UnknownFormat => write!(f, "content is not a recognizable image"),
            DecodeError::Corrupt(cause) => write!(f, "{}", cause),
        }
    }
}

impl From<ImageError> for DecodeError {
    fn from(e: ImageError) -> Self {
        DecodeError::Corrupt(e.to_string())
    }
}

impl From<std::io::Error> for DecodeError {
    fn from(e: std::io::Error) -> Self {
        DecodeError::Corrupt(e.to_string())
    }
}

pub trait ImageDecoder {
    fn decode(&self, content: &[u8]) -> Result<DynamicImage, DecodeError>;
}

/// Picks the decoder from the leading magic bytes. Content-Type headers and
/// file names are never consulted.
pub struct GuessingImageDecoder;

impl ImageDecoder for GuessingImageDecoder {
    fn decode(&self, content: &[u8]) -> Result<DynamicImage, DecodeError> {
        let reader = ImageReader::new(Cursor::new(content)).with_guessed_format()?;

        if reader.format().is_none() {
            return Err(DecodeError::UnknownFormat);
        }

        Ok(reader.decode()?)
    }
}
