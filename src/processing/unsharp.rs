use image::DynamicImage;

use super::blur;

pub const DEFAULT_RADIUS: f32 = 2.5;
pub const DEFAULT_AMOUNT: f32 = 0.5;

/// Unsharp mask: `src + amount * (src - blur(src, radius))`, alpha preserved.
pub fn apply(img: DynamicImage, radius: f32, amount: f32) -> DynamicImage {
    if radius < 0.1 || amount.abs() < 0.001 {
        return img;
    }

    let rgba = img.to_rgba8();
    let blurred = blur::gaussian(&rgba, radius);

    let mut out = rgba.clone();
    for (o, (s, b)) in out.pixels_mut().zip(rgba.pixels().zip(blurred.pixels())) {
        for c in 0..3 {
            let sharp = s[c] as f32 + amount * (s[c] as f32 - b[c] as f32);
            o[c] = sharp.round().clamp(0.0, 255.0) as u8;
        }
    }

    DynamicImage::ImageRgba8(out)
}
