//! Fixture documents for integration tests.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{Cursor, Read, Write};
use std::path::Path;

use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{DynamicImage, Rgb, RgbImage};
use zip::ZipArchive;
use zip::write::{SimpleFileOptions, ZipWriter};

pub const CONTENT_TYPES: &[u8] = br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="jpeg" ContentType="image/jpeg"/><Default Extension="png" ContentType="image/png"/></Types>"#;
pub const RELS: &[u8] = br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Target="word/document.xml"/></Relationships>"#;
pub const DOCUMENT: &[u8] = br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body><w:p/></w:body></w:document>"#;

/// A noisy photo-like image so JPEG quality actually matters
pub fn photo(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
        let noise = (x.wrapping_mul(2_654_435_761) ^ y.wrapping_mul(40_503)) % 64;
        Rgb([
            ((x * 255 / width) as u8).wrapping_add(noise as u8),
            ((y * 255 / height) as u8).wrapping_add((noise / 2) as u8),
            (((x + y) * 128 / (width + height)) as u8).wrapping_add(noise as u8),
        ])
    }))
}

/// High-quality baseline JPEG, as a word processor would embed it
pub fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    let rgb = photo(width, height).to_rgb8();
    let mut out = Vec::new();
    let encoder = jpeg_encoder::Encoder::new(&mut out, 98);
    encoder
        .encode(rgb.as_raw(), width as u16, height as u16, jpeg_encoder::ColorType::Rgb)
        .unwrap();
    out
}

/// PNG written with the fastest, unfiltered settings
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let mut out = Vec::new();
    let encoder = PngEncoder::new_with_quality(&mut out, CompressionType::Fast, FilterType::NoFilter);
    photo(width, height).write_with_encoder(encoder).unwrap();
    out
}

pub fn bmp_bytes(width: u32, height: u32) -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    photo(width, height).write_to(&mut out, image::ImageFormat::Bmp).unwrap();
    out.into_inner()
}

/// Builder for zip containers laid out like a Word package.
#[derive(Default)]
pub struct DocxBuilder {
    entries: Vec<(String, Option<Vec<u8>>)>,
}

impl DocxBuilder {
    /// Package parts without any media
    pub fn new() -> Self {
        Self::default()
            .file("[Content_Types].xml", CONTENT_TYPES)
            .file("_rels/.rels", RELS)
            .file("word/document.xml", DOCUMENT)
            .file("docProps/core.xml", b"<cp:coreProperties/>")
    }

    pub fn file(mut self, name: &str, bytes: &[u8]) -> Self {
        self.entries.push((name.to_string(), Some(bytes.to_vec())));
        self
    }

    pub fn dir(mut self, name: &str) -> Self {
        self.entries.push((name.to_string(), None));
        self
    }

    pub fn media(self, name: &str, bytes: &[u8]) -> Self {
        self.file(&format!("word/media/{name}"), bytes)
    }

    pub fn write(self, path: &Path) {
        let mut zip = ZipWriter::new(File::create(path).unwrap());
        let options = SimpleFileOptions::default();
        for (name, content) in self.entries {
            match content {
                Some(bytes) => {
                    zip.start_file(name, options).unwrap();
                    zip.write_all(&bytes).unwrap();
                }
                None => zip.add_directory(name, options).unwrap(),
            }
        }
        zip.finish().unwrap();
    }
}

/// All entries of a container: name -> bytes (directories map to empty)
pub fn read_entries(path: &Path) -> BTreeMap<String, Vec<u8>> {
    let mut archive = ZipArchive::new(File::open(path).unwrap()).unwrap();
    let mut entries = BTreeMap::new();
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i).unwrap();
        let mut bytes = Vec::new();
        entry.read_to_end(&mut bytes).unwrap();
        entries.insert(entry.name().to_string(), bytes);
    }
    entries
}

pub fn is_media(name: &str) -> bool {
    name.starts_with("word/media/") && !name.ends_with('/')
}

/// Whether `dir` has no children left
pub fn dir_is_empty(dir: &Path) -> bool {
    std::fs::read_dir(dir).unwrap().next().is_none()
}
