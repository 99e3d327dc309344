//! Geometric pass: draw a rotated source centred on a canvas.
//!
//! Quarter turns are exact pixel permutations. Any other angle uses inverse
//! mapping: for each canvas pixel we find the source position it came from
//! and interpolate bilinearly.
//!
//! With the y axis pointing down, a positive angle turns the image clockwise
//! on screen. The inverse transform for a canvas point `(x, y)` relative to
//! the canvas centre is:
//! ```text
//! src_x =  x * cos(θ) + y * sin(θ) + src_cx
//! src_y = -x * sin(θ) + y * cos(θ) + src_cy
//! ```
//! Canvas pixels that map outside the source stay fully transparent.

use image::imageops;

use crate::decode::RasterBuffer;

/// Draw `source` rotated by `rotation_degrees` onto a transparent canvas of
/// `canvas` size, centred.
pub fn composite(source: &RasterBuffer, rotation_degrees: f64, canvas: (u32, u32)) -> RasterBuffer {
    let normalized = rotation_degrees.rem_euclid(360.0);

    if let Some(quarter) = quarter_turns(normalized) {
        if let Some(rotated) = rotate_quarter(source, quarter) {
            return place_centered(rotated, canvas);
        }
    }

    rotate_bilinear(source, normalized, canvas)
}

/// Number of clockwise quarter turns, if the angle is an exact multiple of 90.
fn quarter_turns(normalized: f64) -> Option<u8> {
    if normalized.fract() != 0.0 {
        return None;
    }
    match normalized as u32 {
        0 => Some(0),
        90 => Some(1),
        180 => Some(2),
        270 => Some(3),
        _ => None,
    }
}

fn rotate_quarter(source: &RasterBuffer, quarter: u8) -> Option<image::RgbaImage> {
    let img = source.to_rgba_image()?;
    Some(match quarter {
        0 => img,
        1 => imageops::rotate90(&img),
        2 => imageops::rotate180(&img),
        _ => imageops::rotate270(&img),
    })
}

fn place_centered(img: image::RgbaImage, canvas: (u32, u32)) -> RasterBuffer {
    if img.dimensions() == canvas {
        return RasterBuffer::from_rgba_image(img);
    }

    let mut out = image::RgbaImage::new(canvas.0, canvas.1);
    let x = (canvas.0 as i64 - img.width() as i64) / 2;
    let y = (canvas.1 as i64 - img.height() as i64) / 2;
    imageops::replace(&mut out, &img, x, y);
    RasterBuffer::from_rgba_image(out)
}

fn rotate_bilinear(source: &RasterBuffer, degrees: f64, canvas: (u32, u32)) -> RasterBuffer {
    let (dst_w, dst_h) = canvas;
    let mut output = RasterBuffer::transparent(dst_w, dst_h);

    if source.is_empty() {
        return output;
    }

    let theta = degrees.to_radians();
    let cos = theta.cos();
    let sin = theta.sin();

    let src_cx = source.width as f64 / 2.0;
    let src_cy = source.height as f64 / 2.0;
    let dst_cx = dst_w as f64 / 2.0;
    let dst_cy = dst_h as f64 / 2.0;

    for dst_y in 0..dst_h {
        for dst_x in 0..dst_w {
            // Pixel centre, relative to canvas centre
            let dx = dst_x as f64 + 0.5 - dst_cx;
            let dy = dst_y as f64 + 0.5 - dst_cy;

            // Back to source pixel-index space (centres at integer + 0.5)
            let src_x = dx * cos + dy * sin + src_cx - 0.5;
            let src_y = -dx * sin + dy * cos + src_cy - 0.5;

            if let Some(pixel) = sample_bilinear(source, src_x, src_y) {
                let idx = (dst_y as usize * dst_w as usize + dst_x as usize) * 4;
                output.pixels[idx..idx + 4].copy_from_slice(&pixel);
            }
        }
    }

    output
}

/// Bilinear sample with alpha weighting. Neighbours outside the source count
/// as transparent. Returns `None` when the point is entirely outside.
fn sample_bilinear(image: &RasterBuffer, x: f64, y: f64) -> Option<[u8; 4]> {
    let (w, h) = (image.width as i64, image.height as i64);

    if x <= -1.0 || y <= -1.0 || x >= w as f64 || y >= h as f64 {
        return None;
    }

    let x0 = x.floor() as i64;
    let y0 = y.floor() as i64;
    let fx = x - x0 as f64;
    let fy = y - y0 as f64;

    let taps = [
        (x0, y0, (1.0 - fx) * (1.0 - fy)),
        (x0 + 1, y0, fx * (1.0 - fy)),
        (x0, y0 + 1, (1.0 - fx) * fy),
        (x0 + 1, y0 + 1, fx * fy),
    ];

    // Premultiplied accumulation so transparent neighbours do not darken RGB
    let mut rgb = [0.0f64; 3];
    let mut alpha = 0.0f64;

    for (px, py, weight) in taps {
        if px < 0 || py < 0 || px >= w || py >= h || weight == 0.0 {
            continue;
        }
        let idx = (py as usize * image.width as usize + px as usize) * 4;
        let a = image.pixels[idx + 3] as f64 * weight;
        rgb[0] += image.pixels[idx] as f64 * a;
        rgb[1] += image.pixels[idx + 1] as f64 * a;
        rgb[2] += image.pixels[idx + 2] as f64 * a;
        alpha += a;
    }

    if alpha <= 0.0 {
        return None;
    }

    Some([
        (rgb[0] / alpha).clamp(0.0, 255.0).round() as u8,
        (rgb[1] / alpha).clamp(0.0, 255.0).round() as u8,
        (rgb[2] / alpha).clamp(0.0, 255.0).round() as u8,
        alpha.clamp(0.0, 255.0).round() as u8,
    ])
}
