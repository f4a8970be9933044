//! Format-specific re-encoding of media images.
//!
//! The output codec follows the file's extension, so the entry keeps its name
//! and the format Word expects. Lossless formats never come back larger than
//! they went in.

use std::io::Cursor;

use image::codecs::png::{FilterType, PngEncoder};
use image::{ColorType, DynamicImage, GenericImageView, ImageReader};
use jpeg_encoder::{ColorType as JpegColorType, Encoder};

use crate::core::PngCompression;
use crate::utils::{ImageFormat, OptimizerError, OptimizerResult};

/// Encoder settings for one job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodePolicy {
    /// JPEG quality (1-100)
    pub quality: u8,
    pub png_compression: PngCompression,
}

impl EncodePolicy {
    pub fn new(quality: u32, png_compression: PngCompression) -> Self {
        Self {
            quality: quality.clamp(1, 100) as u8,
            png_compression,
        }
    }
}

/// Re-encodes `bytes` for `format`.
///
/// - JPEG: decoded and re-encoded lossy at the policy quality.
/// - PNG: re-encoded losslessly at the policy effort, keeping the original
///   bytes when that is not smaller.
/// - BMP: checked to decode, then passed through unchanged.
pub fn recompress(bytes: &[u8], format: ImageFormat, policy: &EncodePolicy) -> OptimizerResult<Vec<u8>> {
    match format {
        ImageFormat::JPEG => encode_jpeg(&decode(bytes)?, policy.quality),
        ImageFormat::PNG => {
            let encoded = recompress_png(bytes, policy.png_compression)?;
            Ok(smaller_of(bytes, encoded))
        }
        ImageFormat::BMP => {
            decode(bytes)?;
            Ok(bytes.to_vec())
        }
    }
}

fn smaller_of(original: &[u8], encoded: Vec<u8>) -> Vec<u8> {
    if encoded.len() < original.len() {
        encoded
    } else {
        original.to_vec()
    }
}

fn decode(bytes: &[u8]) -> OptimizerResult<DynamicImage> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| OptimizerError::image(format!("Cannot detect image format: {e}")))?;
    Ok(reader.decode()?)
}

/// Real PNG content goes through [`reencode_png_raw`]; anything else wearing a
/// `.png` name is decoded generically and written as RGB(A) PNG.
fn recompress_png(bytes: &[u8], compression: PngCompression) -> OptimizerResult<Vec<u8>> {
    match image::guess_format(bytes) {
        Ok(image::ImageFormat::Png) => reencode_png_raw(bytes, compression),
        _ => encode_png(&decode(bytes)?, compression),
    }
}

/// Re-deflates a PNG without touching its pixels.
///
/// Colour type, bit depth, palette and transparency chunk are carried over
/// as-is, so indexed and low-depth images stay indexed and low-depth.
/// Animated PNGs are refused.
pub fn reencode_png_raw(bytes: &[u8], compression: PngCompression) -> OptimizerResult<Vec<u8>> {
    let mut decoder = png::Decoder::new(Cursor::new(bytes));
    decoder.set_transformations(png::Transformations::IDENTITY);
    let mut reader = decoder
        .read_info()
        .map_err(|e| OptimizerError::image(format!("PNG header unreadable: {e}")))?;

    if reader.info().animation_control.is_some() {
        return Err(OptimizerError::image("Animated PNG left as is"));
    }

    let mut pixels = vec![0; reader.output_buffer_size()];
    let frame = reader
        .next_frame(&mut pixels)
        .map_err(|e| OptimizerError::image(format!("PNG data unreadable: {e}")))?;
    pixels.truncate(frame.buffer_size());

    let info = reader.info();
    let mut output = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut output, info.width, info.height);
        encoder.set_color(info.color_type);
        encoder.set_depth(info.bit_depth);
        if let Some(palette) = &info.palette {
            encoder.set_palette(palette.to_vec());
        }
        if let Some(trns) = &info.trns {
            encoder.set_trns(trns.to_vec());
        }
        if let Some(gamma) = info.source_gamma {
            encoder.set_source_gamma(gamma);
        }
        if let Some(chromaticities) = info.source_chromaticities {
            encoder.set_source_chromaticities(chromaticities);
        }
        if let Some(intent) = info.srgb {
            encoder.set_srgb(intent);
        }
        encoder.set_compression(compression.into());
        encoder.set_adaptive_filter(png::AdaptiveFilterType::Adaptive);

        let mut writer = encoder
            .write_header()
            .map_err(|e| OptimizerError::image(format!("PNG encoding failed: {e}")))?;
        writer
            .write_image_data(&pixels)
            .map_err(|e| OptimizerError::image(format!("PNG encoding failed: {e}")))?;
        writer
            .finish()
            .map_err(|e| OptimizerError::image(format!("PNG encoding failed: {e}")))?;
    }

    Ok(output)
}

/// Lossy JPEG at `quality` with optimized Huffman tables.
///
/// Grayscale sources stay single-channel; alpha is dropped.
pub fn encode_jpeg(image: &DynamicImage, quality: u8) -> OptimizerResult<Vec<u8>> {
    let (width, height) = image.dimensions();
    let (width, height) = match (u16::try_from(width), u16::try_from(height)) {
        (Ok(w), Ok(h)) => (w, h),
        _ => return Err(OptimizerError::image(format!(
            "Image too large for JPEG: {width}x{height}"
        ))),
    };

    let (pixels, color) = match image.color() {
        ColorType::L8 | ColorType::L16 | ColorType::La8 | ColorType::La16 => {
            (image.to_luma8().into_raw(), JpegColorType::Luma)
        }
        _ => (image.to_rgb8().into_raw(), JpegColorType::Rgb),
    };

    let mut output = Vec::new();
    let mut encoder = Encoder::new(&mut output, quality);
    encoder.set_optimized_huffman_tables(true);
    encoder
        .encode(&pixels, width, height, color)
        .map_err(|e| OptimizerError::image(format!("JPEG encoding failed: {e}")))?;

    Ok(output)
}

/// Lossless 8/16-bit PNG of a decoded image with adaptive filtering.
pub fn encode_png(image: &DynamicImage, compression: PngCompression) -> OptimizerResult<Vec<u8>> {
    let mut output = Vec::new();
    let encoder = PngEncoder::new_with_quality(&mut output, compression.into(), FilterType::Adaptive);
    image
        .write_with_encoder(encoder)
        .map_err(|e| OptimizerError::image(format!("PNG encoding failed: {e}")))?;
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, Rgb, RgbImage, Rgba, RgbaImage};

    fn gradient(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x * 7 % 256) as u8, (y * 5 % 256) as u8, ((x + y) * 3 % 256) as u8])
        }))
    }

    fn policy(quality: u32) -> EncodePolicy {
        EncodePolicy::new(quality, PngCompression::Best)
    }

    #[test]
    fn jpeg_lower_quality_is_smaller() {
        let source = encode_jpeg(&gradient(128, 96), 100).unwrap();
        let low = recompress(&source, ImageFormat::JPEG, &policy(30)).unwrap();
        assert!(low.len() < source.len());
        assert_eq!(&low[..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn jpeg_output_is_deterministic() {
        let source = encode_jpeg(&gradient(64, 64), 95).unwrap();
        let first = recompress(&source, ImageFormat::JPEG, &policy(75)).unwrap();
        let second = recompress(&source, ImageFormat::JPEG, &policy(75)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn grayscale_jpeg_stays_grayscale() {
        let gray = DynamicImage::ImageLuma8(GrayImage::from_fn(32, 32, |x, _| Luma([(x * 8) as u8])));
        let encoded = encode_jpeg(&gray, 80).unwrap();
        let decoded = image::load_from_memory(&encoded).unwrap();
        assert_eq!(decoded.color(), ColorType::L8);
        assert_eq!(decoded.dimensions(), (32, 32));
    }

    #[test]
    fn png_is_lossless_and_keeps_alpha() {
        let rgba = DynamicImage::ImageRgba8(RgbaImage::from_fn(40, 30, |x, y| {
            Rgba([x as u8, y as u8, 200, (x * 6) as u8])
        }));
        let source = {
            let mut out = Vec::new();
            let encoder = PngEncoder::new_with_quality(
                &mut out,
                image::codecs::png::CompressionType::Fast,
                FilterType::NoFilter,
            );
            rgba.write_with_encoder(encoder).unwrap();
            out
        };

        let recompressed = recompress(&source, ImageFormat::PNG, &policy(10)).unwrap();
        let decoded = image::load_from_memory(&recompressed).unwrap();
        assert_eq!(decoded.color(), ColorType::Rgba8);
        assert_eq!(decoded.to_rgba8(), rgba.to_rgba8());
    }

    fn bmp(image: &DynamicImage) -> Vec<u8> {
        let mut out = Cursor::new(Vec::new());
        image.write_to(&mut out, image::ImageFormat::Bmp).unwrap();
        out.into_inner()
    }

    /// 16-colour indexed PNG with a transparent first palette entry
    fn indexed_png(width: u32, height: u32) -> Vec<u8> {
        let palette: Vec<u8> = (0..16u8).flat_map(|i| [i * 16, 255 - i * 16, i * 8]).collect();
        let pixels: Vec<u8> = (0..height)
            .flat_map(|y| (0..width).map(move |x| ((x / 25 + y / 20) % 16) as u8))
            .collect();

        let mut out = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut out, width, height);
            encoder.set_color(png::ColorType::Indexed);
            encoder.set_depth(png::BitDepth::Eight);
            encoder.set_palette(palette);
            encoder.set_trns(vec![0u8]);
            encoder.set_compression(png::Compression::Fast);
            encoder.set_filter(png::FilterType::NoFilter);
            let mut writer = encoder.write_header().unwrap();
            writer.write_image_data(&pixels).unwrap();
            writer.finish().unwrap();
        }
        out
    }

    /// Header info and raw (unexpanded) pixel bytes of a PNG
    fn raw_png(bytes: &[u8]) -> (png::ColorType, png::BitDepth, Vec<u8>, Vec<u8>, Vec<u8>) {
        let mut decoder = png::Decoder::new(Cursor::new(bytes));
        decoder.set_transformations(png::Transformations::IDENTITY);
        let mut reader = decoder.read_info().unwrap();
        let mut pixels = vec![0; reader.output_buffer_size()];
        let frame = reader.next_frame(&mut pixels).unwrap();
        pixels.truncate(frame.buffer_size());
        let info = reader.info();
        (
            info.color_type,
            info.bit_depth,
            info.palette.as_deref().unwrap_or_default().to_vec(),
            info.trns.as_deref().unwrap_or_default().to_vec(),
            pixels,
        )
    }

    #[test]
    fn bmp_passes_through_byte_for_byte() {
        let source = bmp(&gradient(16, 8));
        let recompressed = recompress(&source, ImageFormat::BMP, &policy(50)).unwrap();
        assert_eq!(recompressed, source);
    }

    #[test]
    fn corrupt_bmp_is_still_an_image_error() {
        let err = recompress(b"BM but truncated", ImageFormat::BMP, &policy(50)).unwrap_err();
        assert!(matches!(err, OptimizerError::Image(_)));
    }

    #[test]
    fn indexed_png_keeps_palette_and_pixels() {
        let source = indexed_png(400, 300);
        let reencoded = reencode_png_raw(&source, PngCompression::Best).unwrap();

        let (color, depth, palette, trns, pixels) = raw_png(&reencoded);
        let (_, _, src_palette, src_trns, src_pixels) = raw_png(&source);
        assert_eq!(color, png::ColorType::Indexed);
        assert_eq!(depth, png::BitDepth::Eight);
        assert_eq!(palette, src_palette);
        assert_eq!(trns, src_trns);
        assert_eq!(pixels, src_pixels);
    }

    #[test]
    fn indexed_png_never_grows() {
        let source = indexed_png(400, 300);
        let recompressed = recompress(&source, ImageFormat::PNG, &policy(75)).unwrap();
        assert!(recompressed.len() <= source.len(), "{} > {}", recompressed.len(), source.len());
        assert_eq!(raw_png(&recompressed).0, png::ColorType::Indexed);
    }

    #[test]
    fn grayscale_png_keeps_bit_depth() {
        let gray = DynamicImage::ImageLuma16(image::ImageBuffer::from_fn(24, 24, |x, y| Luma([(x * y * 97) as u16])));
        let source = encode_png(&gray, PngCompression::Fast).unwrap();
        let reencoded = reencode_png_raw(&source, PngCompression::Best).unwrap();
        let (color, depth, _, _, pixels) = raw_png(&reencoded);
        assert_eq!(color, png::ColorType::Grayscale);
        assert_eq!(depth, png::BitDepth::Sixteen);
        assert_eq!(pixels, raw_png(&source).4);
    }

    #[test]
    fn garbage_bytes_fail_as_image_errors() {
        let err = recompress(b"definitely not an image", ImageFormat::PNG, &policy(75)).unwrap_err();
        assert!(matches!(err, OptimizerError::Image(_)));
    }

    #[test]
    fn content_decides_decoder_extension_decides_encoder() {
        let png_bytes = encode_png(&gradient(20, 20), PngCompression::Fast).unwrap();
        let as_jpeg = recompress(&png_bytes, ImageFormat::JPEG, &policy(70)).unwrap();
        assert_eq!(image::guess_format(&as_jpeg).unwrap(), image::ImageFormat::Jpeg);
    }
}
