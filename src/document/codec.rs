//! Attachment image handling: data-URI decoding, fit-to-box sizing,
//! resampling and re-encoding into a PDF-ready image stream.

use base64::Engine;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ExtendedColorType, GenericImageView, ImageEncoder, ImageFormat};
use std::io::Write;

use super::canvas::{PAGE_HEIGHT, PAGE_WIDTH};
use super::{AttachmentKind, DecodeError, EncodeError, PageError};

/// Maximum drawable area for an attachment image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Budget {
    pub max_width: f32,
    pub max_height: f32,
}

impl Budget {
    pub fn for_kind(kind: AttachmentKind) -> Self {
        let (width_margin, height_margin) = match kind {
            AttachmentKind::Photo => (100.0, 200.0),
            AttachmentKind::IdProof => (80.0, 220.0),
            AttachmentKind::Signature => (200.0, 300.0),
        };
        Self {
            max_width: PAGE_WIDTH - width_margin,
            max_height: PAGE_HEIGHT - height_margin,
        }
    }

    pub fn contains(&self, width: u32, height: u32) -> bool {
        width as f32 <= self.max_width && height as f32 <= self.max_height
    }
}

/// Uniform scale that fits `width x height` inside the budget, truncated to
/// whole pixels. Upscales when the image is smaller than the budget.
pub fn fitted_size(width: u32, height: u32, budget: Budget) -> (u32, u32) {
    let scale_x = budget.max_width / width as f32;
    let scale_y = budget.max_height / height as f32;
    let scale = scale_x.min(scale_y);

    let new_width = ((width as f32 * scale) as u32).max(1);
    let new_height = ((height as f32 * scale) as u32).max(1);
    (new_width, new_height)
}

/// How the final image stream is encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QualityPolicy {
    /// Deflate-compressed raw samples.
    Lossless,
    /// Raw samples in a stored (level 0) deflate stream.
    LosslessUncompressed,
    /// Baseline JPEG.
    Jpeg { quality: u8 },
}

impl QualityPolicy {
    pub fn for_attachment(kind: AttachmentKind, source: Option<ImageFormat>) -> Self {
        match kind {
            AttachmentKind::Photo | AttachmentKind::Signature => QualityPolicy::Lossless,
            AttachmentKind::IdProof => match source {
                Some(ImageFormat::Jpeg) => QualityPolicy::Jpeg { quality: 100 },
                _ => QualityPolicy::LosslessUncompressed,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamFilter {
    Flate,
    Dct,
}

impl StreamFilter {
    pub fn pdf_name(self) -> &'static str {
        match self {
            StreamFilter::Flate => "FlateDecode",
            StreamFilter::Dct => "DCTDecode",
        }
    }
}

/// Image samples ready to be embedded as an image XObject (DeviceRGB,
/// 8 bits per component). `alpha` holds a deflated soft mask when the source
/// had transparency.
#[derive(Debug, Clone)]
pub struct EncodedImage {
    pub width: u32,
    pub height: u32,
    pub filter: StreamFilter,
    pub data: Vec<u8>,
    pub alpha: Option<Vec<u8>>,
}

/// A decoded attachment, with the container format it arrived in.
#[derive(Debug)]
pub struct DecodedImage {
    pub image: DynamicImage,
    pub format: Option<ImageFormat>,
}

impl DecodedImage {
    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }
}

/// Result of preparing one attachment for its page.
#[derive(Debug)]
pub struct PreparedImage {
    pub source_size: (u32, u32),
    pub resampled: bool,
    pub encoded: EncodedImage,
}

impl PreparedImage {
    pub fn size(&self) -> (u32, u32) {
        (self.encoded.width, self.encoded.height)
    }
}

/// Decode the base64 payload after the first comma of a data URI.
pub fn decode_data_uri(data_uri: &str) -> Result<DecodedImage, DecodeError> {
    let (_, payload) = data_uri
        .split_once(',')
        .ok_or(DecodeError::MissingPayload)?;

    // MIME-wrapped payloads carry line breaks every 76 characters.
    let payload: Vec<u8> = payload.bytes().filter(|b| !b.is_ascii_whitespace()).collect();
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(&payload)
        .map_err(DecodeError::Base64)?;

    let format = image::guess_format(&bytes).ok();
    let image = image::load_from_memory(&bytes).map_err(DecodeError::Image)?;

    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(DecodeError::EmptyImage);
    }

    Ok(DecodedImage { image, format })
}

/// Size and encode an attachment according to its kind.
pub fn prepare_attachment(kind: AttachmentKind, decoded: DecodedImage) -> Result<PreparedImage, PageError> {
    let budget = Budget::for_kind(kind);
    let source_size = decoded.dimensions();
    let policy = QualityPolicy::for_attachment(kind, decoded.format);

    let needs_resample = match kind {
        AttachmentKind::Photo | AttachmentKind::Signature => true,
        AttachmentKind::IdProof => !budget.contains(source_size.0, source_size.1),
    };

    let image = if needs_resample {
        let (width, height) = fitted_size(source_size.0, source_size.1, budget);
        log::debug!(
            "Resampling {} from {}x{} to {}x{}",
            kind,
            source_size.0,
            source_size.1,
            width,
            height
        );
        decoded.image.resize_exact(width, height, FilterType::Lanczos3)
    } else {
        decoded.image
    };

    let encoded = encode_image(&image, policy)?;
    Ok(PreparedImage {
        source_size,
        resampled: needs_resample,
        encoded,
    })
}

/// Encode a raster image under the given quality policy.
pub fn encode_image(image: &DynamicImage, policy: QualityPolicy) -> Result<EncodedImage, EncodeError> {
    let (width, height) = image.dimensions();

    match policy {
        QualityPolicy::Jpeg { quality } => {
            let rgb = image.to_rgb8();
            let mut data = Vec::new();
            JpegEncoder::new_with_quality(&mut data, quality)
                .write_image(rgb.as_raw(), width, height, ExtendedColorType::Rgb8)
                .map_err(EncodeError::Jpeg)?;
            Ok(EncodedImage {
                width,
                height,
                filter: StreamFilter::Dct,
                data,
                alpha: None,
            })
        }
        QualityPolicy::Lossless | QualityPolicy::LosslessUncompressed => {
            let level = if policy == QualityPolicy::Lossless {
                Compression::default()
            } else {
                Compression::none()
            };

            let (rgb, alpha) = split_alpha(image);
            let data = deflate(&rgb, level)?;
            let alpha = match alpha {
                Some(mask) => Some(deflate(&mask, level)?),
                None => None,
            };
            Ok(EncodedImage {
                width,
                height,
                filter: StreamFilter::Flate,
                data,
                alpha,
            })
        }
    }
}

/// Separate RGB samples from the alpha channel. The mask is dropped when the
/// image is fully opaque.
fn split_alpha(image: &DynamicImage) -> (Vec<u8>, Option<Vec<u8>>) {
    if !image.color().has_alpha() {
        return (image.to_rgb8().into_raw(), None);
    }

    let rgba = image.to_rgba8();
    let pixel_count = rgba.width() as usize * rgba.height() as usize;
    let mut rgb = Vec::with_capacity(pixel_count * 3);
    let mut alpha = Vec::with_capacity(pixel_count);
    let mut translucent = false;

    for pixel in rgba.pixels() {
        let [r, g, b, a] = pixel.0;
        rgb.extend_from_slice(&[r, g, b]);
        alpha.push(a);
        translucent |= a != 255;
    }

    (rgb, translucent.then_some(alpha))
}

fn deflate(data: &[u8], level: Compression) -> Result<Vec<u8>, EncodeError> {
    let mut encoder = ZlibEncoder::new(Vec::new(), level);
    encoder.write_all(data).map_err(EncodeError::Deflate)?;
    encoder.finish().map_err(EncodeError::Deflate)
}
