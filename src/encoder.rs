use std::fmt::{Display, Formatter};
use std::io::Cursor;
use std::num::ParseIntError;
use std::path::Path;
use std::str::FromStr;

use image_crate::{DynamicImage, ImageError, ImageOutputFormat};
use serde::{Deserialize, Serialize};

pub const DEFAULT_JPEG_QUALITY: u8 = 75;

/// Serialized as the same short names `FromStr` accepts (`jpeg85`, `png`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum OutputFormat {
    Jpeg(u8),
    Png,
    Bmp,
    Tiff,
    Tga,
}

impl OutputFormat {
    /// Chooses the format from the file extension. Unknown or missing
    /// extensions fall back to JPEG.
    pub fn from_path(path: &Path, jpeg_quality: u8) -> OutputFormat {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "png" => OutputFormat::Png,
            "bmp" => OutputFormat::Bmp,
            "tif" | "tiff" => OutputFormat::Tiff,
            "tga" => OutputFormat::Tga,
            _ => OutputFormat::Jpeg(jpeg_quality),
        }
    }

    pub fn content_type(&self) -> String {
        match self {
            OutputFormat::Jpeg(_) => mime::IMAGE_JPEG.to_string(),
            OutputFormat::Png => mime::IMAGE_PNG.to_string(),
            OutputFormat::Bmp => mime::IMAGE_BMP.to_string(),
            OutputFormat::Tiff => String::from("image/tiff"),
            OutputFormat::Tga => String::from("image/x-tga"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "png" | "image/png" => return Ok(OutputFormat::Png),
            "bmp" | "image/bmp" => return Ok(OutputFormat::Bmp),
            "tif" | "tiff" | "image/tiff" => return Ok(OutputFormat::Tiff),
            "tga" | "image/x-tga" | "image/x-targa" => return Ok(OutputFormat::Tga),
            "image/jpeg" => return Ok(OutputFormat::Jpeg(DEFAULT_JPEG_QUALITY)),
            _ => {}
        }
        for prefix in ["jpeg", "jpg"] {
            if let Some(quality) = s.strip_prefix(prefix) {
                if quality.is_empty() {
                    return Ok(OutputFormat::Jpeg(DEFAULT_JPEG_QUALITY));
                }
                let quality: u32 = quality.parse()?;
                if quality > 100 {
                    return Err(ParseError::QualityOutOfRange(String::from("Jpeg quality must be between 0 (worst) to 100 (best)")));
                }
                return Ok(OutputFormat::Jpeg(quality as u8));
            }
        }
        Err(ParseError::InvalidFormat(s.to_string()))
    }
}

impl TryFrom<String> for OutputFormat {
    type Error = ParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<OutputFormat> for String {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Jpeg(q) => format!("jpeg{}", q),
            OutputFormat::Png => String::from("png"),
            OutputFormat::Bmp => String::from("bmp"),
            OutputFormat::Tiff => String::from("tiff"),
            OutputFormat::Tga => String::from("tga"),
        }
    }
}

impl Display for OutputFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Jpeg(q) => write!(f, "image/jpeg - quality: {}", q),
            other => write!(f, "{}", other.content_type()),
        }
    }
}

#[derive(Debug, PartialEq)]
pub enum ParseError {
    InvalidIntQuality(ParseIntError),
    QualityOutOfRange(String),
    InvalidFormat(String),
}

impl Display for ParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::InvalidIntQuality(e) => write!(f, "invalid quality: {}", e),
            ParseError::QualityOutOfRange(message) => write!(f, "{}", message),
            ParseError::InvalidFormat(format) => write!(f, "unknown output format: {}", format),
        }
    }
}

impl From<ParseIntError> for ParseError {
    fn from(e: ParseIntError) -> Self {
        ParseError::InvalidIntQuality(e)
    }
}

#[derive(Debug)]
pub enum EncodingError {
    Unsupported(String),
    Unknown(String),
}

impl Display for EncodingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            EncodingError::Unsupported(cause) => write!(f, "unsupported by encoder: {}", cause),
            EncodingError::Unknown(cause) => write!(f, "{}", cause),
        }
    }
}

impl From<ImageError> for EncodingError {
    fn from(e: ImageError) -> Self {
        match e {
            ImageError::Unsupported(_) => EncodingError::Unsupported(e.to_string()),
            _ => EncodingError::Unknown(e.to_string()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct EncodedImage {
    pub content_type: String,
    pub image: Vec<u8>,
}

pub trait ImageEncoder {
    fn encode(&self, resource: &DynamicImage, output_format: &OutputFormat) -> Result<EncodedImage, EncodingError>;
}

pub struct AllInOneImageEncoder;

impl ImageEncoder for AllInOneImageEncoder {
    fn encode(&self, resource: &DynamicImage, output_format: &OutputFormat) -> Result<EncodedImage, EncodingError> {
        let format = match output_format {
            OutputFormat::Jpeg(quality) => ImageOutputFormat::Jpeg(*quality),
            OutputFormat::Png => ImageOutputFormat::Png,
            OutputFormat::Bmp => ImageOutputFormat::Bmp,
            OutputFormat::Tiff => ImageOutputFormat::Tiff,
            OutputFormat::Tga => ImageOutputFormat::Tga,
        };

        let mut image = Cursor::new(Vec::new());
        resource.write_to(&mut image, format)?;

        Ok(EncodedImage {
            content_type: output_format.content_type(),
            image: image.into_inner(),
        })
    }
}

#[cfg(test)]
mod tests {
    use image_crate::{GenericImageView, ImageFormat};

    use super::*;
    use crate::test_support::gradient_image;

    #[test]
    fn test_from_path() {
        assert_eq!(OutputFormat::from_path(Path::new("nurses/team.jpg"), 80), OutputFormat::Jpeg(80));
        assert_eq!(OutputFormat::from_path(Path::new("nurses/team.JPEG"), 80), OutputFormat::Jpeg(80));
        assert_eq!(OutputFormat::from_path(Path::new("nurses/team.png"), 80), OutputFormat::Png);
        assert_eq!(OutputFormat::from_path(Path::new("nurses/team.tif"), 80), OutputFormat::Tiff);
        assert_eq!(OutputFormat::from_path(Path::new("nurses/team.Bmp"), 80), OutputFormat::Bmp);
        assert_eq!(OutputFormat::from_path(Path::new("nurses/team.tga"), 80), OutputFormat::Tga);
    }

    #[test]
    fn test_from_path_falls_back_to_jpeg() {
        assert_eq!(OutputFormat::from_path(Path::new("nurses/team.webp"), 75), OutputFormat::Jpeg(75));
        assert_eq!(OutputFormat::from_path(Path::new("nurses/team"), 75), OutputFormat::Jpeg(75));
    }

    #[test]
    fn test_parse() {
        assert_eq!("png".parse::<OutputFormat>(), Ok(OutputFormat::Png));
        assert_eq!("image/jpeg".parse::<OutputFormat>(), Ok(OutputFormat::Jpeg(DEFAULT_JPEG_QUALITY)));
        assert_eq!("jpeg".parse::<OutputFormat>(), Ok(OutputFormat::Jpeg(DEFAULT_JPEG_QUALITY)));
        assert_eq!("jpg40".parse::<OutputFormat>(), Ok(OutputFormat::Jpeg(40)));
        assert_eq!("jpeg100".parse::<OutputFormat>(), Ok(OutputFormat::Jpeg(100)));
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!("jpeg101".parse::<OutputFormat>(), Err(ParseError::QualityOutOfRange(_))));
        assert!(matches!("jpegbest".parse::<OutputFormat>(), Err(ParseError::InvalidIntQuality(_))));
        assert_eq!("gif".parse::<OutputFormat>(), Err(ParseError::InvalidFormat(String::from("gif"))));
    }

    #[test]
    fn test_short_name_parses_back() {
        for format in [OutputFormat::Jpeg(85), OutputFormat::Png, OutputFormat::Bmp, OutputFormat::Tiff, OutputFormat::Tga] {
            assert_eq!(String::from(format).parse::<OutputFormat>(), Ok(format));
        }
    }

    #[test]
    fn test_encode_matches_requested_format() {
        let image = gradient_image(8, 6);
        let cases = [
            (OutputFormat::Jpeg(90), ImageFormat::Jpeg),
            (OutputFormat::Png, ImageFormat::Png),
            (OutputFormat::Bmp, ImageFormat::Bmp),
            (OutputFormat::Tiff, ImageFormat::Tiff),
        ];

        for (output_format, expected) in cases {
            let encoded = AllInOneImageEncoder.encode(&image, &output_format).unwrap();

            assert_eq!(encoded.content_type, output_format.content_type());
            assert_eq!(image_crate::guess_format(&encoded.image).unwrap(), expected);
            let decoded = image_crate::load_from_memory_with_format(&encoded.image, expected).unwrap();
            assert_eq!(decoded.dimensions(), (8, 6));
        }
    }
}
