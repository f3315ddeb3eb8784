#![allow(dead_code)]

use image::{DynamicImage, ImageBuffer, Rgb, Rgba};
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use thumb_squeeze::{Container, Encoder, RasterEncoder, Result};

fn mix(x: u32, y: u32, salt: u32) -> u8 {
    let mut h = x.wrapping_mul(0x9E37_79B1)
        ^ y.wrapping_mul(0x85EB_CA77)
        ^ salt.wrapping_mul(0xC2B2_AE3D);
    h ^= h >> 15;
    h = h.wrapping_mul(0x2C1B_3C6D);
    h ^= h >> 12;
    (h & 0xFF) as u8
}

/// Deterministic per-pixel noise; JPEG cannot shrink it much.
pub fn noisy_rgb(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(ImageBuffer::from_fn(width, height, |x, y| {
        Rgb([mix(x, y, 1), mix(x, y, 2), mix(x, y, 3)])
    }))
}

pub fn gradient_rgb(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(ImageBuffer::from_fn(width, height, |x, y| {
        Rgb([
            (x * 255 / width.max(1)) as u8,
            (y * 255 / height.max(1)) as u8,
            128,
        ])
    }))
}

/// Opaque disc on a fully transparent background
pub fn transparent_badge(size: u32) -> DynamicImage {
    let center = size as i64 / 2;
    let radius_sq = center * center / 2;
    DynamicImage::ImageRgba8(ImageBuffer::from_fn(size, size, |x, y| {
        let dx = x as i64 - center;
        let dy = y as i64 - center;
        if dx * dx + dy * dy <= radius_sq {
            Rgba([220, 40, 40, 255])
        } else {
            Rgba([0, 0, 0, 0])
        }
    }))
}

pub fn create_temp_directory() -> TempDir {
    TempDir::new().unwrap()
}

pub fn write_test_image(dir: &Path, name: &str, img: &DynamicImage) -> PathBuf {
    let path = dir.join(name);
    img.save(&path).unwrap();
    path
}

/// Wraps the real encoder and records every (quality, output length) pair.
#[derive(Default)]
pub struct RecordingEncoder {
    inner: RasterEncoder,
    pub calls: RefCell<Vec<(u8, usize)>>,
}

impl RecordingEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }

    pub fn qualities(&self) -> Vec<u8> {
        self.calls.borrow().iter().map(|(q, _)| *q).collect()
    }

    pub fn sizes(&self) -> Vec<usize> {
        self.calls.borrow().iter().map(|(_, len)| *len).collect()
    }
}

impl Encoder for RecordingEncoder {
    fn encode(&self, image: &DynamicImage, container: Container, quality: u8) -> Result<Vec<u8>> {
        let bytes = self.inner.encode(image, container, quality)?;
        self.calls.borrow_mut().push((quality, bytes.len()));
        Ok(bytes)
    }
}
