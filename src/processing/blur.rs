use image::imageops::{self, FilterType};
use image::{DynamicImage, RgbaImage};
use imageproc::filter::gaussian_blur_f32;

/// Largest sigma blurred at full resolution. Larger sigmas are blurred on a
/// proportionally smaller copy and scaled back up.
const DIRECT_SIGMA_MAX: f32 = 6.0;

/// Gaussian blur with sigma equal to `radius`.
pub fn apply(img: DynamicImage, radius: f32) -> DynamicImage {
    if radius < 0.1 {
        return img;
    }
    DynamicImage::ImageRgba8(gaussian(&img.to_rgba8(), radius))
}

/// Blurs `src` with the given sigma, keeping its dimensions.
pub fn gaussian(src: &RgbaImage, sigma: f32) -> RgbaImage {
    let (w, h) = src.dimensions();
    if sigma <= DIRECT_SIGMA_MAX || w == 0 || h == 0 {
        return gaussian_blur_f32(src, sigma.max(0.1));
    }

    let factor = sigma / DIRECT_SIGMA_MAX;
    let small_w = ((w as f32 / factor).round() as u32).max(1);
    let small_h = ((h as f32 / factor).round() as u32).max(1);
    let small = imageops::resize(src, small_w, small_h, FilterType::Triangle);
    let blurred = gaussian_blur_f32(&small, DIRECT_SIGMA_MAX);
    imageops::resize(&blurred, w, h, FilterType::Triangle)
}
