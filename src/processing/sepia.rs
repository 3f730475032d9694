use image::DynamicImage;

/// Blends toward a sepia tone. `intensity` is clamped to 0.0–1.0.
pub fn apply(img: DynamicImage, intensity: f32) -> DynamicImage {
    let amount = intensity.clamp(0.0, 1.0);
    if amount < 0.001 {
        return img;
    }

    let mut rgba = img.to_rgba8();
    for px in rgba.pixels_mut() {
        let r = px[0] as f32;
        let g = px[1] as f32;
        let b = px[2] as f32;

        let toned = [
            0.393 * r + 0.769 * g + 0.189 * b,
            0.349 * r + 0.686 * g + 0.168 * b,
            0.272 * r + 0.534 * g + 0.131 * b,
        ];
        for c in 0..3 {
            let src = px[c] as f32;
            let v = src + (toned[c] - src) * amount;
            px[c] = v.round().clamp(0.0, 255.0) as u8;
        }
    }

    DynamicImage::ImageRgba8(rgba)
}
