use image::DynamicImage;

pub const DEFAULT_RADIUS: f32 = 1.0;

/// Darkens toward the corners. `radius` is relative to the half diagonal.
pub fn apply(img: DynamicImage, intensity: f32, radius: f32) -> DynamicImage {
    let intensity = intensity.clamp(-1.0, 1.0);
    if intensity.abs() < 0.001 || radius <= 0.0 {
        return img;
    }

    let mut rgba = img.to_rgba8();
    let (w, h) = rgba.dimensions();
    let cx = (w as f32 - 1.0) * 0.5;
    let cy = (h as f32 - 1.0) * 0.5;
    let half_diag = (cx * cx + cy * cy).sqrt().max(1e-3);

    for (x, y, px) in rgba.enumerate_pixels_mut() {
        let dx = x as f32 - cx;
        let dy = y as f32 - cy;
        let d = (dx * dx + dy * dy).sqrt() / half_diag;
        let weight = smoothstep(0.25 * radius, radius, d);
        let gain = (1.0 - intensity * weight).max(0.0);
        for c in 0..3 {
            px[c] = (px[c] as f32 * gain).round().clamp(0.0, 255.0) as u8;
        }
    }

    DynamicImage::ImageRgba8(rgba)
}

fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

#[cfg(test)]
mod tests {
    use image::{DynamicImage, ImageBuffer, Rgba};

    use super::{DEFAULT_RADIUS, apply};

    fn white(w: u32, h: u32) -> DynamicImage {
        DynamicImage::ImageRgba8(ImageBuffer::from_pixel(w, h, Rgba([255, 255, 255, 255])))
    }

    #[test]
    fn zero_intensity_is_identity() {
        let img = white(9, 9);
        assert_eq!(apply(img.clone(), 0.0, DEFAULT_RADIUS).to_rgba8(), img.to_rgba8());
    }

    #[test]
    fn corners_darken_and_centre_holds() {
        let out = apply(white(9, 9), 1.0, DEFAULT_RADIUS).to_rgba8();
        assert_eq!(out.get_pixel(4, 4)[0], 255);
        assert_eq!(out.get_pixel(0, 0)[0], 0);
        assert!(out.get_pixel(0, 4)[0] < 255);
    }

    #[test]
    fn stronger_intensity_darkens_more() {
        let weak = apply(white(9, 9), 0.3, DEFAULT_RADIUS).to_rgba8();
        let strong = apply(white(9, 9), 0.9, DEFAULT_RADIUS).to_rgba8();
        assert!(strong.get_pixel(1, 1)[0] < weak.get_pixel(1, 1)[0]);
    }
}
