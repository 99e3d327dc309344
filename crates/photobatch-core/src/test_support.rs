//! Fixture builders shared by the unit tests.

use std::io::Cursor;

use image::{ImageFormat, RgbImage, RgbaImage};

use crate::decode::{RasterBuffer, SourceFile, SourceImage};

/// Route log output through the test harness. `RUST_LOG` controls the level.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .with_test_writer()
        .compact()
        .try_init();
}

/// RGB gradient: red follows x, green follows y, blue is constant.
pub fn gradient_image(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([
            ((x * 255) / width.max(1)) as u8,
            ((y * 255) / height.max(1)) as u8,
            96,
        ])
    })
}

fn encode(img: image::DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, format).unwrap();
    out.into_inner()
}

pub fn png_file(width: u32, height: u32, name: &str) -> SourceFile {
    let bytes = encode(
        image::DynamicImage::ImageRgb8(gradient_image(width, height)),
        ImageFormat::Png,
    );
    SourceFile::new(bytes, name, "image/png")
}

/// PNG with a half-transparent alpha channel.
pub fn rgba_png_file(width: u32, height: u32, name: &str) -> SourceFile {
    let img = RgbaImage::from_pixel(width, height, image::Rgba([10, 200, 30, 128]));
    let bytes = encode(image::DynamicImage::ImageRgba8(img), ImageFormat::Png);
    SourceFile::new(bytes, name, "image/png")
}

pub fn jpeg_file(width: u32, height: u32, name: &str) -> SourceFile {
    let bytes = encode(
        image::DynamicImage::ImageRgb8(gradient_image(width, height)),
        ImageFormat::Jpeg,
    );
    SourceFile::new(bytes, name, "image/jpeg")
}

/// Opaque solid-colour source, built without going through a codec.
pub fn solid_source(width: u32, height: u32, rgb: [u8; 3]) -> SourceImage {
    let mut pixels = Vec::with_capacity(width as usize * height as usize * 4);
    for _ in 0..(width as usize * height as usize) {
        pixels.extend_from_slice(&[rgb[0], rgb[1], rgb[2], 255]);
    }
    SourceImage::new(RasterBuffer::new(width, height, pixels), "solid.png", "image/png")
}
